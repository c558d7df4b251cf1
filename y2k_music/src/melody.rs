// Melodic lanes: the lead motif, the bell counter-line, and the texture bed.
//
// The lead is a short motif (1, 2 or 4 bars) tiled across the loop. The
// first two repetitions are exact; later ones mutate note by note with a
// probability that falls as the style's repetition tendency rises. The bell
// and texture lanes are optional sparse layers, each switched on by its own
// roll.

use crate::compose::{lerp, velocity};
use crate::event::{BAR, BEAT, EIGHTH, Event, LOOP_TICKS, SIXTEENTH};
use crate::profile::StyleParams;
use crate::resolve::ResolvedParameters;
use crate::theory::wrap_degree;
use y2k_prng::SongRng;

/// Motif length in bars.
const MOTIF_BAR_WEIGHTS: [(u32, f64); 3] = [(1, 0.55), (2, 0.35), (4, 0.10)];

/// Lead degree pool: chord tones 1, 3, 5, 7 favoured over 2, 4, 6.
const LEAD_DEGREES: [(u8, f64); 7] = [
    (1, 2.2),
    (3, 1.8),
    (5, 2.0),
    (7, 1.6),
    (2, 0.9),
    (4, 0.9),
    (6, 0.6),
];

const BELL_DEGREES: [(u8, f64); 6] = [(1, 2.0), (3, 1.3), (5, 1.8), (7, 1.2), (2, 0.7), (4, 0.7)];

const TEXTURE_DEGREES: [(u8, f64); 4] = [(1, 2.0), (5, 1.5), (7, 1.0), (3, 1.0)];

/// Repetitions copied verbatim before mutation starts.
const EXACT_REPETITIONS: u32 = 2;

/// One note of the lead motif, relative to the motif start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MotifNote {
    offset: u32,
    pitch: i32,
    duration: u32,
}

/// Outcome of a triggered mutation check on a tiled motif note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mutation {
    /// Transpose by this many semitones.
    Transpose(i32),
    Drop,
    /// Sound a grace note one semitone above (+1) or below (-1) first.
    Grace(i32),
    Keep,
}

fn draw_mutation(rng: &mut SongRng) -> Mutation {
    let band = rng.next_f64();
    if band < 0.30 {
        Mutation::Transpose(if rng.chance(0.5) { 2 } else { -2 })
    } else if band < 0.50 {
        Mutation::Transpose(if rng.chance(0.5) { 1 } else { -1 })
    } else if band < 0.65 {
        Mutation::Drop
    } else if band < 0.75 {
        Mutation::Grace(if rng.chance(0.5) { 1 } else { -1 })
    } else {
        Mutation::Keep
    }
}

fn build_motif(
    motif_ticks: u32,
    params: &ResolvedParameters,
    style: &StyleParams,
    rng: &mut SongRng,
) -> Vec<MotifNote> {
    let note_count = lerp(3.0, 6.0, style.density).round() as usize;
    let mut motif = Vec::with_capacity(note_count);
    let mut prev_degree: u8 = 1;

    for _ in 0..note_count {
        let picked = rng.pick_weighted(&LEAD_DEGREES);
        let degree = if rng.chance(0.60) {
            let dir = if rng.chance(0.5) { -1 } else { 1 };
            wrap_degree(i32::from(prev_degree) + dir)
        } else {
            picked
        };
        prev_degree = degree;

        let grid = if rng.chance(0.30 + style.aggression * 0.20) {
            SIXTEENTH
        } else {
            EIGHTH
        };
        let offset = quantize(rng.next_f64() * f64::from(motif_ticks), grid);

        if rng.chance(0.22 + style.space * 0.25) {
            continue;
        }

        let octave = if rng.chance(0.55) { 1 } else { 0 };
        let pitch = params.melodic_pitch(degree, octave);
        let duration = if rng.chance(0.70) { grid } else { grid * 2 };
        motif.push(MotifNote { offset, pitch, duration });
    }

    motif.sort_by_key(|n| n.offset);
    motif
}

/// Generate the lead lane for one loop.
pub fn compose_lead(params: &ResolvedParameters, style: &StyleParams, rng: &mut SongRng) -> Vec<Event> {
    let motif_ticks = rng.pick_weighted(&MOTIF_BAR_WEIGHTS) * BAR;
    let motif = build_motif(motif_ticks, params, style, rng);
    tile_motif(&motif, motif_ticks, style, rng)
}

/// Lay the motif end to end across the loop, mutating repetitions after the
/// exact ones.
fn tile_motif(motif: &[MotifNote], motif_ticks: u32, style: &StyleParams, rng: &mut SongRng) -> Vec<Event> {
    let mut events = Vec::new();

    for rep in 0..LOOP_TICKS / motif_ticks {
        let base = rep * motif_ticks;
        let mutate_p = if rep < EXACT_REPETITIONS {
            0.0
        } else {
            (1.0 - style.repetition) * 0.9
        };

        for note in motif {
            let t = i64::from(base + note.offset);
            let mut pitch = note.pitch;

            if rng.chance(mutate_p) {
                match draw_mutation(rng) {
                    Mutation::Transpose(semitones) => pitch += semitones,
                    Mutation::Drop => continue,
                    Mutation::Grace(dir) => {
                        let grace_len = i64::from(SIXTEENTH / 2);
                        let vel = velocity(rng, 55, 85);
                        events.push(Event::note(t - grace_len, grace_len, pitch + dir, vel));
                    }
                    Mutation::Keep => {}
                }
            }

            let vel = velocity(rng, 70, 112);
            events.push(Event::note(t, i64::from(note.duration), pitch, vel));
        }
    }

    events
}

/// Generate the optional bell counter-line, two octaves above the melodic
/// reference on pushed offbeats.
pub fn compose_bell(params: &ResolvedParameters, style: &StyleParams, rng: &mut SongRng) -> Vec<Event> {
    if !rng.chance(0.35 + style.bells * 0.55) {
        return Vec::new();
    }

    let count = (lerp(2.0, 4.0, style.density).round() as usize).max(2);
    let mut notes: Vec<(u32, i32)> = Vec::with_capacity(count);
    for _ in 0..count {
        let degree = rng.pick_weighted(&BELL_DEGREES);
        let pitch = params.melodic_pitch(degree, 2);
        let step = quantize(rng.next_f64() * f64::from(LOOP_TICKS), EIGHTH);
        let t = (step + SIXTEENTH).min(LOOP_TICKS - SIXTEENTH);
        notes.push((t, pitch));
    }
    notes.sort_by_key(|&(t, _)| t);

    let mut events = Vec::new();
    for (t, pitch) in notes {
        if rng.chance(0.30 + style.space * 0.25) {
            continue;
        }
        let vel = velocity(rng, 55, 92);
        events.push(Event::note(i64::from(t), i64::from(SIXTEENTH), pitch, vel));
    }
    events
}

/// Generate the optional texture bed: sparse, quiet, beat-long notes.
pub fn compose_texture(params: &ResolvedParameters, style: &StyleParams, rng: &mut SongRng) -> Vec<Event> {
    if !rng.chance(0.30 + style.texture * 0.60) {
        return Vec::new();
    }

    let hits = lerp(4.0, 10.0, style.texture).round() as usize;
    let mut events = Vec::new();
    for _ in 0..hits {
        if rng.chance(0.25 + style.space * 0.25) {
            continue;
        }
        let t = quantize(rng.next_f64() * f64::from(LOOP_TICKS), BEAT);
        let degree = rng.pick_weighted(&TEXTURE_DEGREES);
        let octave = if rng.chance(0.5) { -1 } else { 0 };
        let pitch = params.melodic_pitch(degree, octave);
        let vel = velocity(rng, 20, 55);
        events.push(Event::note(i64::from(t), i64::from(BEAT), pitch, vel));
    }
    events
}

/// Floor a tick position onto a grid.
fn quantize(position: f64, grid: u32) -> u32 {
    (position / f64::from(grid)).floor() as u32 * grid
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{HarmonyType, find_style};
    use crate::theory::ScaleMode;

    fn params() -> ResolvedParameters {
        ResolvedParameters {
            scale: ScaleMode::Natural,
            root: 4,
            bpm: 170,
            half_time: false,
            harmony: HarmonyType::Drone,
        }
    }

    fn style(name: &str) -> StyleParams {
        find_style(name).unwrap().params
    }

    #[test]
    fn test_quantize_floors_to_grid() {
        assert_eq!(quantize(0.0, SIXTEENTH), 0);
        assert_eq!(quantize(239.9, SIXTEENTH), 120);
        assert_eq!(quantize(479.0, BEAT), 0);
        assert_eq!(quantize(15_359.0, EIGHTH), 15_120);
    }

    #[test]
    fn test_lead_stays_in_loop_and_velocity_range() {
        let params = params();
        let style = style("ESDEEKID");
        for seed in 0..200 {
            let lead = compose_lead(&params, &style, &mut SongRng::new(seed));
            for e in &lead {
                assert!(e.start_tick < LOOP_TICKS);
                assert!(e.duration_tick >= 1);
                let grace = e.duration_tick == SIXTEENTH / 2;
                if grace {
                    assert!((55..=85).contains(&e.velocity));
                } else {
                    assert!((70..=112).contains(&e.velocity));
                }
            }
        }
    }

    #[test]
    fn test_full_repetition_keeps_tiles_identical() {
        let params = params();
        let mut style = style("FAKEMINK");
        style.repetition = 1.0;
        for seed in 0..100 {
            let lead = compose_lead(&params, &style, &mut SongRng::new(seed));
            // With no mutation every tile is a shifted copy of the first.
            let first_bar: Vec<(u32, u8)> = lead
                .iter()
                .filter(|e| e.start_tick < BAR * 4)
                .map(|e| (e.start_tick, e.pitch))
                .collect();
            let second_half: Vec<(u32, u8)> = lead
                .iter()
                .filter(|e| e.start_tick >= BAR * 4)
                .map(|e| (e.start_tick - BAR * 4, e.pitch))
                .collect();
            assert_eq!(first_bar, second_half, "seed {seed}");
        }
    }

    #[test]
    fn test_first_two_repetitions_are_exact() {
        let motif = [
            MotifNote {
                offset: 0,
                pitch: 69,
                duration: EIGHTH,
            },
            MotifNote {
                offset: BEAT,
                pitch: 72,
                duration: EIGHTH + SIXTEENTH,
            },
        ];
        let mut style = style("ESDEEKID");
        style.repetition = 0.0;
        let exact_end = EXACT_REPETITIONS * BAR - SIXTEENTH / 2;
        let expected: Vec<(u32, u8, u32)> = (0..EXACT_REPETITIONS)
            .flat_map(|rep| motif.iter().map(move |n| (rep * BAR + n.offset, n.pitch as u8, n.duration)))
            .collect();

        let mut mutated_seeds = 0;
        for seed in 0..100 {
            let lead = tile_motif(&motif, BAR, &style, &mut SongRng::new(seed));
            let head: Vec<(u32, u8, u32)> = lead
                .iter()
                .filter(|e| e.start_tick < exact_end)
                .map(|e| (e.start_tick, e.pitch, e.duration_tick))
                .collect();
            assert_eq!(head, expected, "seed {seed}");

            let tail: Vec<(u32, u8, u32)> = lead
                .iter()
                .filter(|e| e.start_tick >= exact_end)
                .map(|e| (e.start_tick % BAR, e.pitch, e.duration_tick))
                .collect();
            let untouched = tail.len() == 2 * (8 - EXACT_REPETITIONS as usize)
                && tail.chunks(2).all(|pair| *pair == expected[..2]);
            if !untouched {
                mutated_seeds += 1;
            }
        }
        assert!(mutated_seeds > 50, "{mutated_seeds} seeds mutated");
    }

    #[test]
    fn test_bell_offbeats_and_register() {
        let params = params();
        let mut style = style("BLADEE");
        style.bells = 1.0;
        let mut heard = 0;
        for seed in 0..100 {
            let bell = compose_bell(&params, &style, &mut SongRng::new(seed));
            heard += bell.len();
            for e in &bell {
                assert_eq!(e.start_tick % EIGHTH, SIXTEENTH);
                assert_eq!(e.duration_tick, SIXTEENTH);
                assert!(i32::from(e.pitch) >= params.melodic_pitch(1, 2));
                assert!((55..=92).contains(&e.velocity));
            }
        }
        assert!(heard > 0);
    }

    #[test]
    fn test_texture_beats() {
        let params = params();
        let mut style = style("FENG");
        style.texture = 1.0;
        for seed in 0..100 {
            for e in compose_texture(&params, &style, &mut SongRng::new(seed)) {
                assert_eq!(e.start_tick % BEAT, 0);
                assert_eq!(e.duration_tick, BEAT);
                assert!((20..=55).contains(&e.velocity));
            }
        }
    }

    #[test]
    fn test_mutation_bands_cover_all_outcomes() {
        let mut rng = SongRng::new(2024);
        let mut seen = [false; 4];
        for _ in 0..2000 {
            match draw_mutation(&mut rng) {
                Mutation::Transpose(s) => {
                    assert!([-2, -1, 1, 2].contains(&s));
                    seen[0] = true;
                }
                Mutation::Drop => seen[1] = true,
                Mutation::Grace(d) => {
                    assert!(d == 1 || d == -1);
                    seen[2] = true;
                }
                Mutation::Keep => seen[3] = true,
            }
        }
        assert!(seen.iter().all(|&s| s));
    }
}
