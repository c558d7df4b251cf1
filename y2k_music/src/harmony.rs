// Chord progression and the pad/chord lane.
//
// The progression is one scale degree per bar of the loop, shaped by the
// resolved harmony type. The pad voices each bar's degree as a low root plus
// a perfect fifth, sometimes with a scale third on top; chords on degrees
// other than the tonic may get their third raised for a brighter colour.

use crate::compose::velocity;
use crate::event::{BAR, Event, LOOP_BARS};
use crate::profile::HarmonyType;
use crate::resolve::ResolvedParameters;
use crate::theory::wrap_degree;
use serde::{Deserialize, Serialize};
use y2k_prng::SongRng;

/// Fixed cycle used by the three-chord shape.
const THREE_CHORD_CYCLE: [u8; LOOP_BARS] = [1, 1, 6, 6, 7, 7, 1, 1];

/// One scale degree per bar, plus the shape that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progression {
    pub harmony: HarmonyType,
    pub degrees: [u8; LOOP_BARS],
}

/// Build the eight-bar progression for a harmony shape.
pub fn build_progression(harmony: HarmonyType, rng: &mut SongRng) -> Progression {
    let degrees = match harmony {
        HarmonyType::Drone => [1; LOOP_BARS],
        HarmonyType::Power => {
            let mut degrees = [1; LOOP_BARS];
            if rng.chance(0.22) {
                degrees[LOOP_BARS - 1] = 7;
            }
            degrees
        }
        HarmonyType::TwoChord => {
            let second = if rng.chance(0.55) { 6 } else { 7 };
            let mut degrees = [1; LOOP_BARS];
            for d in &mut degrees[LOOP_BARS / 2..] {
                *d = second;
            }
            degrees
        }
        HarmonyType::ThreeChord => THREE_CHORD_CYCLE,
    };
    Progression { harmony, degrees }
}

/// Generate the pad lane for one loop.
///
/// Per bar: an omit-third roll (70%) and, when the third survives, a triad
/// roll (80%); a brighter-third roll (55%) on non-tonic bars; a full-bar
/// versus half-bar roll (65% full); then a soft-repeat roll (30%) that only
/// sounds after a half-bar chord.
pub fn compose_pad(progression: &Progression, params: &ResolvedParameters, rng: &mut SongRng) -> Vec<Event> {
    let mut events = Vec::new();

    for (bar, &degree) in progression.degrees.iter().enumerate() {
        let t0 = i64::from(BAR) * bar as i64;

        let omit_third = rng.chance(0.70);
        let use_triad = !omit_third && rng.chance(0.80);

        let root = params.melodic_pitch(degree, -1);
        let fifth = root + 7;
        let mut third = params.melodic_pitch(wrap_degree(i32::from(degree) + 2), -1);
        if degree != 1 && rng.chance(0.55) {
            third += 1;
        }

        let mut voicing = vec![root, fifth];
        if use_triad {
            voicing.push(third);
        }

        let full_bar = rng.chance(0.65);
        let len = if full_bar { BAR } else { BAR / 2 };
        let vel = velocity(rng, 48, 72);
        push_chord(&mut events, t0, i64::from(len), &voicing, vel);

        let repeat = rng.chance(0.30);
        if repeat && !full_bar {
            let vel = velocity(rng, 30, 52);
            push_chord(&mut events, t0 + i64::from(BAR / 2), i64::from(BAR / 2), &voicing, vel);
        }
    }

    events
}

fn push_chord(events: &mut Vec<Event>, start: i64, duration: i64, pitches: &[i32], vel: u8) {
    events.extend(pitches.iter().map(|&p| Event::note(start, duration, p, vel)));
}
