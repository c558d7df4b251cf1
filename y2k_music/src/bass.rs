// The 808/bass lane.
//
// Each bar repeats the bar's chord root in the bass register a few times on
// an eighth-note grid. The last hit of a bar can slide in from a fourth or
// fifth away, and a late hit can trigger an octave-up accent at the end of
// the bar. Under half-time feel, hits that would land on the backbeat snare
// are pushed one eighth later.

use crate::compose::{lerp, velocity};
use crate::event::{BAR, BEAT, EIGHTH, Event, SIXTEENTH};
use crate::harmony::Progression;
use crate::profile::StyleParams;
use crate::resolve::ResolvedParameters;
use y2k_prng::SongRng;

/// Slide probability is the style's slide tendency clamped into this range.
const SLIDE_MIN: f64 = 0.10;
const SLIDE_MAX: f64 = 0.65;

/// Generate the bass lane for one loop.
pub fn compose_bass(
    progression: &Progression,
    params: &ResolvedParameters,
    style: &StyleParams,
    rng: &mut SongRng,
) -> Vec<Event> {
    let slide_p = style.slides.clamp(SLIDE_MIN, SLIDE_MAX);
    let hits = lerp(1.0, 3.0, style.density).round() as usize;
    let mut events = Vec::new();

    for (bar, &degree) in progression.degrees.iter().enumerate() {
        let base = i64::from(BAR) * bar as i64;
        let root = params.bass_pitch(degree, 0);

        for i in 0..hits {
            if rng.chance(0.20 + style.space * 0.30) {
                continue;
            }
            let mut step = (rng.next_f64() * f64::from(BAR) / f64::from(EIGHTH)).floor() as u32 * EIGHTH;
            if params.half_time && step.abs_diff(BEAT * 2) < SIXTEENTH {
                step += EIGHTH;
            }
            let len = if rng.chance(0.55) { EIGHTH * 2 } else { EIGHTH * 3 };
            let t = base + i64::from(step);

            let slide = rng.chance(slide_p);
            if slide && i == hits - 1 {
                let interval = if rng.chance(0.5) { 5 } else { 7 };
                let from = root + if rng.chance(0.5) { -interval } else { interval };
                let approach_vel = velocity(rng, 70, 110);
                events.push(Event::note(t, i64::from(EIGHTH), from, approach_vel));
                let land_vel = velocity(rng, 85, 120);
                events.push(Event::note(t + i64::from(EIGHTH), i64::from(len), root, land_vel));
            } else {
                let vel = velocity(rng, 78, 120);
                events.push(Event::note(t, i64::from(len), root, vel));
            }

            if rng.chance(0.10) && step > BAR - BEAT {
                let vel = velocity(rng, 70, 110);
                events.push(Event::note(
                    base + i64::from(BAR - EIGHTH),
                    i64::from(EIGHTH),
                    root + 12,
                    vel,
                ));
            }
        }
    }

    events
}
