// Arrangement expansion: tile the composed loop across song sections.
//
// Without the extended structure the song is a single LOOP section: each
// lane keeps only events starting inside the loop (roll tails and slide
// landings can spill past it) and nothing is drawn. With it, the loop is
// laid out as INTRO / DROP / BREAK / RETURN. Each section tiles the loop at loop-length
// offsets, silences its muted lanes, and may cut a half-bar "pull-out" gap
// into each remaining lane.
//
// Draw order: lanes in file order, sections in song order. Muted sections
// draw nothing; a pull-out draws its window position and then one removal
// roll per event inside the window.

use crate::event::{BAR, Event, LOOP_TICKS};
use crate::profile::StyleParams;
use crate::track::{Lanes, TrackId};
use log::debug;
use serde::Serialize;
use y2k_prng::SongRng;

/// Floor of the per-section pull-out probability.
pub const PULL_OUT_MIN: f64 = 0.20;
/// Ceiling of the per-section pull-out probability.
pub const PULL_OUT_MAX: f64 = 0.40;
/// Pull-out probability before the space contribution.
pub const PULL_OUT_BASE: f64 = 0.20;
/// How much the style's space tendency raises the pull-out probability.
pub const PULL_OUT_SPACE_SCALE: f64 = 0.20;
/// Chance that each event inside a pull-out window is dropped.
pub const PULL_OUT_DROP_PROBABILITY: f64 = 0.65;

const INTRO_MUTES: &[TrackId] = &[TrackId::Kick, TrackId::Bass];
const BREAK_MUTES: &[TrackId] = &[TrackId::Kick, TrackId::Bass, TrackId::Hats];

/// A contiguous stretch of the song.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub name: &'static str,
    pub start_tick: u32,
    pub length_tick: u32,
    /// Lanes silenced for the whole section.
    pub muted: &'static [TrackId],
}

impl Section {
    pub fn end_tick(&self) -> u32 {
        self.start_tick + self.length_tick
    }

    pub fn is_muted(&self, track: TrackId) -> bool {
        self.muted.contains(&track)
    }

    /// Length in whole bars.
    pub fn bars(&self) -> u32 {
        self.length_tick / BAR
    }
}

/// Lay out the song's sections back to back from tick 0.
pub fn plan_sections(extended: bool) -> Vec<Section> {
    if !extended {
        return vec![Section {
            name: "LOOP",
            start_tick: 0,
            length_tick: LOOP_TICKS,
            muted: &[],
        }];
    }

    let layout: [(&'static str, u32, &'static [TrackId]); 4] = [
        ("INTRO", LOOP_TICKS / 2, INTRO_MUTES),
        ("DROP", LOOP_TICKS, &[]),
        ("BREAK", LOOP_TICKS / 2, BREAK_MUTES),
        ("RETURN", LOOP_TICKS, &[]),
    ];
    let mut start = 0;
    layout
        .into_iter()
        .map(|(name, length_tick, muted)| {
            let section = Section {
                name,
                start_tick: start,
                length_tick,
                muted,
            };
            start += length_tick;
            section
        })
        .collect()
}

/// Expand one loop of lanes into the full song.
///
/// Consumes the loop lanes; returns the section plan and the expanded,
/// start-sorted lanes.
pub fn arrange(loop_lanes: Lanes, extended: bool, style: &StyleParams, rng: &mut SongRng) -> (Vec<Section>, Lanes) {
    let sections = plan_sections(extended);
    let pull_out_p = pull_out_probability(style.space);
    let mut song = Lanes::new();

    for (track, events) in loop_lanes.iter() {
        let out = &mut song[track];
        for section in &sections {
            if section.is_muted(track) {
                continue;
            }
            let mut placed = tile(events, section);
            if extended && rng.chance(pull_out_p) {
                let before = placed.len();
                pull_out(&mut placed, section, rng);
                debug!(
                    "pull-out in {} on {}: {} -> {} events",
                    section.name,
                    track.label(),
                    before,
                    placed.len()
                );
            }
            out.extend(placed);
        }
    }

    song.sort_by_start();
    (sections, song)
}

/// Per-section chance of a pull-out for a style's space tendency.
pub fn pull_out_probability(space: f64) -> f64 {
    (PULL_OUT_BASE + PULL_OUT_SPACE_SCALE * space).clamp(PULL_OUT_MIN, PULL_OUT_MAX)
}

/// Copies of the loop shifted into `section`, keeping those that start inside it.
fn tile(events: &[Event], section: &Section) -> Vec<Event> {
    let copies = section.length_tick.div_ceil(LOOP_TICKS);
    (0..copies)
        .flat_map(|c| {
            let offset = section.start_tick + c * LOOP_TICKS;
            events.iter().map(move |e| e.shifted(offset))
        })
        .filter(|e| (section.start_tick..section.end_tick()).contains(&e.start_tick))
        .collect()
}

/// Cut a half-bar breathing gap: pick a bar in the section, then its first or
/// second half, and drop events starting inside that window.
fn pull_out(events: &mut Vec<Event>, section: &Section, rng: &mut SongRng) {
    let bar = (rng.next_f64() * f64::from(section.bars())).floor() as u32;
    let half = if rng.chance(0.5) { BAR / 2 } else { 0 };
    let window_start = section.start_tick + bar * BAR + half;
    let window = window_start..window_start + BAR / 2;

    events.retain(|e| !(window.contains(&e.start_tick) && rng.chance(PULL_OUT_DROP_PROBABILITY)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::find_style;
    use crate::track::drum_key;

    fn style() -> StyleParams {
        find_style("BLADEE").unwrap().params
    }

    fn loop_lanes() -> Lanes {
        let mut lanes = Lanes::new();
        for bar in 0..8 {
            lanes[TrackId::Kick].push(Event::drum(i64::from(bar * BAR), 120, drum_key::KICK, 110));
            lanes[TrackId::Pad].push(Event::note(i64::from(bar * BAR), i64::from(BAR), 57, 60));
            lanes[TrackId::Hats].push(Event::drum(i64::from(bar * BAR + 240), 60, drum_key::HAT_CLOSED, 80));
        }
        lanes
    }

    #[test]
    fn test_single_loop_section() {
        let sections = plan_sections(false);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].name, "LOOP");
        assert_eq!((sections[0].start_tick, sections[0].end_tick()), (0, LOOP_TICKS));
        assert!(sections[0].muted.is_empty());
    }

    #[test]
    fn test_extended_sections_are_contiguous() {
        let sections = plan_sections(true);
        let names: Vec<&str> = sections.iter().map(|s| s.name).collect();
        assert_eq!(names, ["INTRO", "DROP", "BREAK", "RETURN"]);
        assert_eq!(sections[0].start_tick, 0);
        for pair in sections.windows(2) {
            assert_eq!(pair[0].end_tick(), pair[1].start_tick);
        }
        let total: u32 = sections.iter().map(|s| s.length_tick).sum();
        assert_eq!(total, LOOP_TICKS * 3);
        assert_eq!(sections[0].bars(), 4);
        assert_eq!(sections[1].bars(), 8);
        assert!(sections[2].is_muted(TrackId::Hats));
        assert!(!sections[0].is_muted(TrackId::Hats));
    }

    #[test]
    fn test_loop_mode_passes_events_through_without_draws() {
        let lanes = loop_lanes();
        let mut rng = SongRng::new(11);
        let (_, out) = arrange(lanes.clone(), false, &style(), &mut rng);
        assert_eq!(out, lanes);
        assert_eq!(rng, SongRng::new(11));
    }

    #[test]
    fn test_loop_mode_trims_events_past_the_loop() {
        let mut lanes = loop_lanes();
        lanes[TrackId::Hats].push(Event::drum(i64::from(LOOP_TICKS + 55), 30, drum_key::HAT_CLOSED, 70));
        lanes[TrackId::Bass].push(Event::note(i64::from(LOOP_TICKS), 480, 45, 100));
        let mut rng = SongRng::new(4);
        let (sections, out) = arrange(lanes, false, &style(), &mut rng);
        let end = sections[0].end_tick();
        for (_, events) in out.iter() {
            assert!(events.iter().all(|e| e.start_tick < end));
        }
        assert!(out[TrackId::Bass].is_empty());
        assert_eq!(out[TrackId::Hats].len(), 8);
        assert_eq!(rng, SongRng::new(4));
    }

    #[test]
    fn test_pull_out_probability_is_clamped() {
        let cases = [(-1.0, 0.20), (0.0, 0.20), (0.5, 0.30), (1.0, 0.40), (3.0, 0.40)];
        for (space, expected) in cases {
            let p = pull_out_probability(space);
            assert!((p - expected).abs() < 1e-12, "space {space}: {p}");
        }
    }

    #[test]
    fn test_muted_lanes_silent_in_their_sections() {
        for seed in 0..50 {
            let (sections, out) = arrange(loop_lanes(), true, &style(), &mut SongRng::new(seed));
            for section in &sections {
                for track in section.muted {
                    assert!(
                        !out[*track]
                            .iter()
                            .any(|e| (section.start_tick..section.end_tick()).contains(&e.start_tick)),
                        "{:?} sounds in {}",
                        track,
                        section.name
                    );
                }
            }
            // Pad is never muted: intro keeps its first half loop of chords,
            // minus at most one pulled-out window.
            let intro_pads = out[TrackId::Pad].iter().filter(|e| e.start_tick < LOOP_TICKS / 2).count();
            assert!(intro_pads >= 3);
        }
    }

    #[test]
    fn test_extended_lanes_sorted_and_inside_song() {
        let (sections, out) = arrange(loop_lanes(), true, &style(), &mut SongRng::new(3));
        let end = sections.last().unwrap().end_tick();
        for (_, events) in out.iter() {
            assert!(events.windows(2).all(|w| w[0].start_tick <= w[1].start_tick));
            assert!(events.iter().all(|e| e.start_tick < end));
        }
        // DROP and RETURN both carry a full loop of kicks, less any pull-out.
        let kicks = out[TrackId::Kick].len();
        assert!((14..=16).contains(&kicks), "{kicks} kicks");
    }

    #[test]
    fn test_pull_out_only_touches_one_half_bar() {
        let section = &plan_sections(true)[1];
        let events: Vec<Event> = (0..64)
            .map(|i| Event::drum(i64::from(section.start_tick + i * 240), 60, drum_key::HAT_CLOSED, 80))
            .collect();
        for seed in 0..100 {
            let mut kept = events.clone();
            pull_out(&mut kept, section, &mut SongRng::new(seed));
            let missing: Vec<u32> = events
                .iter()
                .filter(|e| !kept.contains(e))
                .map(|e| e.start_tick)
                .collect();
            assert!(missing.len() <= 4);
            if let (Some(first), Some(last)) = (missing.first(), missing.last()) {
                assert!(last - first < BAR / 2);
                assert_eq!((first - section.start_tick) / (BAR / 2), (last - section.start_tick) / (BAR / 2));
            }
        }
    }
}
