// Standard MIDI File output.
//
// Encodes a song as SMF Format 1 at 480 ticks per quarter note: a tempo/meta
// track followed by one track per lane, in lane order. Every channel event is
// written with its full status byte (no running status) so the output is
// byte-for-byte predictable. Note-on/note-off pairs are merged into one
// tick-ordered list per lane, stable on ties, and written with minimal VLQ
// delta times.
//
// The encoder validates rather than clamps: an event outside the MIDI data
// ranges, a zero duration, or a tick past the 28-bit VLQ limit is reported as
// `Error::DataIntegrity` and no bytes are produced.

use crate::error::{Error, Result};
use crate::event::{Event, PPQ};
use crate::song::Song;
use crate::track::{Lanes, TrackId};
use log::debug;
use std::path::Path;

const HEADER_TAG: &[u8; 4] = b"MThd";
const TRACK_TAG: &[u8; 4] = b"MTrk";

/// SMF format 1: simultaneous tracks.
const FORMAT_PARALLEL: u16 = 1;

/// Largest value a four-byte variable-length quantity can hold.
pub const MAX_VLQ: u32 = 0x0FFF_FFFF;

/// Largest tempo value the three-byte tempo meta can hold.
const MAX_TEMPO_MICROS: u32 = 0x00FF_FFFF;

const META: u8 = 0xFF;
const META_TRACK_NAME: u8 = 0x03;
const META_END_OF_TRACK: u8 = 0x2F;
const META_TEMPO: u8 = 0x51;
const META_TIME_SIGNATURE: u8 = 0x58;

const NOTE_OFF: u8 = 0x80;
const NOTE_ON: u8 = 0x90;
const PROGRAM_CHANGE: u8 = 0xC0;

/// 4/4, quarter-note clicks, eight 32nds per quarter.
const TIME_SIGNATURE_4_4: [u8; 4] = [0x04, 0x02, 0x18, 0x08];

/// Append `value` as a minimal variable-length quantity.
pub fn write_vlq(out: &mut Vec<u8>, value: u32) -> Result<()> {
    if value > MAX_VLQ {
        return Err(Error::DataIntegrity(format!(
            "value {value} exceeds the variable-length quantity limit {MAX_VLQ}"
        )));
    }
    let mut groups = [0u8; 4];
    let mut len = 0;
    let mut rest = value;
    loop {
        groups[len] = (rest & 0x7F) as u8;
        len += 1;
        rest >>= 7;
        if rest == 0 {
            break;
        }
    }
    for (i, group) in groups[..len].iter().enumerate().rev() {
        let continued = if i > 0 { 0x80 } else { 0 };
        out.push(group | continued);
    }
    Ok(())
}

/// `value` as a standalone variable-length quantity.
pub fn encode_vlq(value: u32) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(4);
    write_vlq(&mut out, value)?;
    Ok(out)
}

/// Frame `payload` as a chunk: tag, big-endian length, payload.
fn write_chunk(out: &mut Vec<u8>, tag: &[u8; 4], payload: &[u8]) -> Result<()> {
    let len = u32::try_from(payload.len())
        .map_err(|_| Error::DataIntegrity(format!("chunk payload of {} bytes is too large", payload.len())))?;
    out.extend_from_slice(tag);
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(payload);
    Ok(())
}

fn write_meta(out: &mut Vec<u8>, kind: u8, data: &[u8]) -> Result<()> {
    out.push(META);
    out.push(kind);
    let len = u32::try_from(data.len()).unwrap_or(u32::MAX);
    write_vlq(out, len)?;
    out.extend_from_slice(data);
    Ok(())
}

fn write_end_of_track(out: &mut Vec<u8>) -> Result<()> {
    write_vlq(out, 0)?;
    write_meta(out, META_END_OF_TRACK, &[])
}

/// Microseconds per quarter note for a tempo, `round(60_000_000 / bpm)`.
pub fn tempo_micros(bpm: u16) -> Result<u32> {
    if bpm == 0 {
        return Err(Error::DataIntegrity("tempo of 0 BPM".to_string()));
    }
    let micros = (60_000_000.0 / f64::from(bpm)).round() as u32;
    if micros > MAX_TEMPO_MICROS {
        return Err(Error::DataIntegrity(format!("tempo of {bpm} BPM is too slow to encode")));
    }
    Ok(micros)
}

fn tempo_track(bpm: u16, name: &str) -> Result<Vec<u8>> {
    let mut out = Vec::new();

    write_vlq(&mut out, 0)?;
    write_meta(&mut out, META_TIME_SIGNATURE, &TIME_SIGNATURE_4_4)?;

    write_vlq(&mut out, 0)?;
    let micros = tempo_micros(bpm)?.to_be_bytes();
    write_meta(&mut out, META_TEMPO, &micros[1..])?;

    write_vlq(&mut out, 0)?;
    write_meta(&mut out, META_TRACK_NAME, name.as_bytes())?;

    write_end_of_track(&mut out)?;
    Ok(out)
}

/// A channel message at an absolute tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TimedMessage {
    tick: u32,
    status: u8,
    key: u8,
    velocity: u8,
}

fn check_event(track: TrackId, event: &Event) -> Result<()> {
    let fail = |what: String| Err(Error::DataIntegrity(format!("{} lane: {what}", track.label())));
    if event.pitch > 127 {
        return fail(format!("pitch {} at tick {}", event.pitch, event.start_tick));
    }
    if !(1..=127).contains(&event.velocity) {
        return fail(format!("velocity {} at tick {}", event.velocity, event.start_tick));
    }
    if event.duration_tick == 0 {
        return fail(format!("zero-length event at tick {}", event.start_tick));
    }
    if event.end_tick() > u64::from(MAX_VLQ) {
        return fail(format!("event ending at tick {} is past the encodable range", event.end_tick()));
    }
    Ok(())
}

/// Note-on/note-off pairs for a lane, stably ordered by tick.
fn lane_messages(track: TrackId, events: &[Event]) -> Result<Vec<TimedMessage>> {
    let channel = track.channel();
    let mut messages = Vec::with_capacity(events.len() * 2);
    for event in events {
        check_event(track, event)?;
        messages.push(TimedMessage {
            tick: event.start_tick,
            status: NOTE_ON | channel,
            key: event.pitch,
            velocity: event.velocity,
        });
        messages.push(TimedMessage {
            tick: event.start_tick + event.duration_tick,
            status: NOTE_OFF | channel,
            key: event.pitch,
            velocity: 0,
        });
    }
    messages.sort_by_key(|m| m.tick);
    Ok(messages)
}

fn lane_track(track: TrackId, events: &[Event]) -> Result<Vec<u8>> {
    let mut out = Vec::new();

    write_vlq(&mut out, 0)?;
    write_meta(&mut out, META_TRACK_NAME, track.label().as_bytes())?;

    if let Some(program) = track.program() {
        write_vlq(&mut out, 0)?;
        out.push(PROGRAM_CHANGE | track.channel());
        out.push(program);
    }

    let mut last_tick = 0;
    for message in lane_messages(track, events)? {
        write_vlq(&mut out, message.tick - last_tick)?;
        out.extend_from_slice(&[message.status, message.key, message.velocity]);
        last_tick = message.tick;
    }

    write_end_of_track(&mut out)?;
    Ok(out)
}

/// Encode a tempo, a tempo-track name and every lane as SMF bytes.
pub fn encode(bpm: u16, name: &str, lanes: &Lanes) -> Result<Vec<u8>> {
    let track_count = 1 + TrackId::COUNT as u16;

    let mut header = Vec::with_capacity(6);
    header.extend_from_slice(&FORMAT_PARALLEL.to_be_bytes());
    header.extend_from_slice(&track_count.to_be_bytes());
    header.extend_from_slice(&(PPQ as u16).to_be_bytes());

    let mut out = Vec::new();
    write_chunk(&mut out, HEADER_TAG, &header)?;
    write_chunk(&mut out, TRACK_TAG, &tempo_track(bpm, name)?)?;
    for (track, events) in lanes.iter() {
        write_chunk(&mut out, TRACK_TAG, &lane_track(track, events)?)?;
    }

    debug!("encoded {} tracks, {} bytes", track_count, out.len());
    Ok(out)
}

/// Encode a song as SMF bytes.
pub fn encode_song(song: &Song) -> Result<Vec<u8>> {
    encode(song.params.bpm, &song.track_name(), &song.tracks)
}

/// Encode a song and write it to `path`.
pub fn write_smf(song: &Song, path: &Path) -> Result<()> {
    let bytes = encode_song(song)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::drum_key;

    /// Reads one VLQ from the front of `bytes`; returns the value and bytes used.
    fn read_vlq(bytes: &[u8]) -> (u32, usize) {
        let mut value = 0u32;
        for (i, &b) in bytes.iter().enumerate() {
            value = (value << 7) | u32::from(b & 0x7F);
            if b & 0x80 == 0 {
                return (value, i + 1);
            }
        }
        panic!("unterminated vlq");
    }

    /// Splits a file into `(tag, payload)` chunks, checking the framing.
    fn chunks(bytes: &[u8]) -> Vec<([u8; 4], &[u8])> {
        let mut out = Vec::new();
        let mut pos = 0;
        while pos < bytes.len() {
            let tag: [u8; 4] = bytes[pos..pos + 4].try_into().unwrap();
            let len = u32::from_be_bytes(bytes[pos + 4..pos + 8].try_into().unwrap()) as usize;
            out.push((tag, &bytes[pos + 8..pos + 8 + len]));
            pos += 8 + len;
        }
        assert_eq!(pos, bytes.len(), "chunk lengths must sum to the file length");
        out
    }

    fn sample_lanes() -> Lanes {
        let mut lanes = Lanes::new();
        lanes[TrackId::Lead].push(Event::note(0, 240, 69, 100));
        lanes[TrackId::Lead].push(Event::note(120, 480, 72, 90));
        lanes[TrackId::Kick].push(Event::drum(0, 120, drum_key::KICK, 120));
        lanes[TrackId::Kick].push(Event::drum(960, 120, drum_key::KICK, 110));
        lanes
    }

    #[test]
    fn test_vlq_boundaries() {
        let cases: [(u32, &[u8]); 8] = [
            (0, &[0x00]),
            (0x40, &[0x40]),
            (0x7F, &[0x7F]),
            (0x80, &[0x81, 0x00]),
            (0x2000, &[0xC0, 0x00]),
            (0x3FFF, &[0xFF, 0x7F]),
            (0x4000, &[0x81, 0x80, 0x00]),
            (MAX_VLQ, &[0xFF, 0xFF, 0xFF, 0x7F]),
        ];
        for (value, expected) in cases {
            let bytes = encode_vlq(value).unwrap();
            assert_eq!(bytes, expected, "value {value:#x}");
            assert_eq!(read_vlq(&bytes), (value, bytes.len()));
        }
    }

    #[test]
    fn test_vlq_decodes_sampled_values() {
        for value in (0..MAX_VLQ).step_by(9_973).chain([MAX_VLQ - 1, 1 << 21, (1 << 21) - 1]) {
            let bytes = encode_vlq(value).unwrap();
            assert_eq!(read_vlq(&bytes), (value, bytes.len()));
            assert_ne!(bytes[0], 0x80, "no leading zero group for {value}");
        }
    }

    #[test]
    fn test_vlq_rejects_out_of_range() {
        assert!(matches!(encode_vlq(MAX_VLQ + 1), Err(Error::DataIntegrity(_))));
    }

    #[test]
    fn test_tempo_micros() {
        assert_eq!(tempo_micros(120).unwrap(), 500_000);
        assert_eq!(tempo_micros(170).unwrap(), 352_941);
        assert_eq!(tempo_micros(60).unwrap(), 1_000_000);
        assert!(tempo_micros(0).is_err());
        assert!(tempo_micros(3).is_err());
    }

    #[test]
    fn test_header_and_framing() {
        let bytes = encode(170, "TEST", &sample_lanes()).unwrap();
        assert_eq!(
            &bytes[..14],
            &[0x4D, 0x54, 0x68, 0x64, 0, 0, 0, 6, 0, 1, 0, 9, 0x01, 0xE0]
        );
        let chunks = chunks(&bytes);
        assert_eq!(chunks.len(), 10);
        assert!(chunks[1..].iter().all(|(tag, _)| tag == TRACK_TAG));
    }

    #[test]
    fn test_tempo_track_bytes() {
        let bytes = encode(120, "AB", &Lanes::new()).unwrap();
        let chunks = chunks(&bytes);
        assert_eq!(
            chunks[1].1,
            &[
                0x00, 0xFF, 0x58, 0x04, 0x04, 0x02, 0x18, 0x08, // time signature
                0x00, 0xFF, 0x51, 0x03, 0x07, 0xA1, 0x20, // 500000 us
                0x00, 0xFF, 0x03, 0x02, b'A', b'B', // name
                0x00, 0xFF, 0x2F, 0x00,
            ]
        );
    }

    #[test]
    fn test_lane_track_bytes() {
        let bytes = encode(120, "", &sample_lanes()).unwrap();
        let chunks = chunks(&bytes);

        // Lead: name, program 81 on channel 1, overlapping notes.
        let mut expected = vec![0x00, 0xFF, 0x03, 0x04];
        expected.extend_from_slice(b"LEAD");
        expected.extend_from_slice(&[0x00, 0xC1, 81]);
        expected.extend_from_slice(&[0x00, 0x91, 69, 100]);
        expected.extend_from_slice(&[0x78, 0x91, 72, 90]);
        expected.extend_from_slice(&[0x78, 0x81, 69, 0]);
        expected.extend_from_slice(&[0x82, 0x68, 0x81, 72, 0]);
        expected.extend_from_slice(&[0x00, 0xFF, 0x2F, 0x00]);
        assert_eq!(chunks[2 + TrackId::Lead.index()].1, expected.as_slice());

        // Kick: drum lane, no program change, channel 9.
        let kick = chunks[1 + 1 + TrackId::Kick.index()].1;
        assert_eq!(&kick[..8], &[0x00, 0xFF, 0x03, 0x04, b'K', b'I', b'C', b'K']);
        assert_eq!(&kick[8..12], &[0x00, 0x99, drum_key::KICK, 120]);
    }

    #[test]
    fn test_empty_lane_is_name_and_program_only() {
        let bytes = encode(120, "", &Lanes::new()).unwrap();
        let chunks = chunks(&bytes);
        let pad = chunks[2].1;
        let mut expected = vec![0x00, 0xFF, 0x03, 0x09];
        expected.extend_from_slice(b"PAD/CHORD");
        expected.extend_from_slice(&[0x00, 0xC0, 89, 0x00, 0xFF, 0x2F, 0x00]);
        assert_eq!(pad, expected.as_slice());
    }

    #[test]
    fn test_shared_tick_keeps_generation_order() {
        let mut lanes = Lanes::new();
        lanes[TrackId::Hats].push(Event::drum(0, 120, drum_key::HAT_CLOSED, 80));
        lanes[TrackId::Hats].push(Event::drum(120, 120, drum_key::HAT_CLOSED, 70));
        let messages = lane_messages(TrackId::Hats, &lanes[TrackId::Hats]).unwrap();
        let at_120: Vec<u8> = messages.iter().filter(|m| m.tick == 120).map(|m| m.status).collect();
        // The first hat's off was generated before the second hat's on.
        assert_eq!(at_120, vec![0x89, 0x99]);
    }

    #[test]
    fn test_invalid_events_rejected() {
        let bad = [
            Event { pitch: 128, ..Event::note(0, 10, 60, 90) },
            Event { velocity: 0, ..Event::note(0, 10, 60, 90) },
            Event { velocity: 200, ..Event::note(0, 10, 60, 90) },
            Event { duration_tick: 0, ..Event::note(0, 10, 60, 90) },
            Event::note(i64::from(MAX_VLQ), 10, 60, 90),
        ];
        for event in bad {
            let mut lanes = Lanes::new();
            lanes[TrackId::Bell].push(event);
            match encode(120, "", &lanes) {
                Err(Error::DataIntegrity(msg)) => assert!(msg.starts_with("BELL/COUNTER")),
                other => panic!("expected DataIntegrity for {event:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_midly_reads_output() {
        let bytes = encode(150, "PARSE", &sample_lanes()).unwrap();
        let smf = midly::Smf::parse(&bytes).unwrap();
        assert_eq!(smf.header.format, midly::Format::Parallel);
        assert_eq!(smf.header.timing, midly::Timing::Metrical(midly::num::u15::new(480)));
        assert_eq!(smf.tracks.len(), 9);
        let tempo = smf.tracks[0].iter().find_map(|e| match e.kind {
            midly::TrackEventKind::Meta(midly::MetaMessage::Tempo(t)) => Some(t.as_int()),
            _ => None,
        });
        assert_eq!(tempo, Some(400_000));
    }
}
