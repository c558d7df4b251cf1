// Drum lanes: snare/clap backbeat, templated kick, hats with rolls, and
// bar-end fills.
//
// Generation order matters for reproducibility: snare, kick, hats, then
// fills (which write into the snare and hats lanes). The kick template is
// chosen once per song; everything else is rolled per bar.

use crate::compose::{lerp, velocity};
use crate::event::{BAR, BEAT, EIGHTH, Event, LOOP_BARS, LOOP_TICKS, SIXTEENTH};
use crate::profile::StyleParams;
use crate::track::drum_key;
use std::collections::BTreeSet;
use y2k_prng::SongRng;

/// Aggression above which ghost claps may appear.
const GHOST_CLAP_AGGRESSION: f64 = 0.6;
/// Aggression above which kick stutters may appear.
const STUTTER_AGGRESSION: f64 = 0.5;

/// Roll sub-rates: sixteenths, triplet-ish two-thirds of a sixteenth, and
/// thirty-seconds.
const ROLL_RATES: [(u32, f64); 3] = [(SIXTEENTH, 0.55), (SIXTEENTH * 2 / 3, 0.25), (SIXTEENTH / 2, 0.20)];

/// Per-song kick pattern family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KickTemplate {
    /// One, (and-of-two), three, (just after four).
    Straight,
    /// One, e-of-two, (and-of-three), (just before four).
    Bounce,
    /// One, and-of-two, three, and-of-three, (and-of-four).
    Driving,
}

const KICK_TEMPLATES: [(KickTemplate, f64); 3] = [
    (KickTemplate::Straight, 0.42),
    (KickTemplate::Bounce, 0.38),
    (KickTemplate::Driving, 0.20),
];

/// The three drum lanes for one loop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrumLanes {
    pub kick: Vec<Event>,
    pub snare: Vec<Event>,
    pub hats: Vec<Event>,
}

/// Tick of the backbeat within a bar: beat 2, or beat 3 under half-time.
pub fn snare_offset(half_time: bool) -> u32 {
    if half_time { BEAT * 2 } else { BEAT }
}

/// Generate all drum lanes in the fixed order snare, kick, hats, fills.
pub fn compose_drums(half_time: bool, style: &StyleParams, rng: &mut SongRng) -> DrumLanes {
    let snare = compose_snare(half_time, style, rng);
    let kick = compose_kick(half_time, style, rng);
    let hats = compose_hats(style, rng);
    let mut lanes = DrumLanes { kick, snare, hats };
    add_fills(&mut lanes, style, rng);
    lanes
}

fn compose_snare(half_time: bool, style: &StyleParams, rng: &mut SongRng) -> Vec<Event> {
    let mut events = Vec::new();
    for bar in 0..LOOP_BARS as u32 {
        let t = i64::from(bar * BAR + snare_offset(half_time));
        let vel = velocity(rng, 92, 122);
        events.push(Event::drum(t, i64::from(SIXTEENTH), drum_key::SNARE, vel));

        if rng.chance(0.70) {
            let vel = velocity(rng, 72, 102);
            events.push(Event::drum(t, i64::from(SIXTEENTH), drum_key::CLAP, vel));
        }

        if style.aggression > GHOST_CLAP_AGGRESSION && rng.chance(0.30) {
            let half = i64::from(SIXTEENTH / 2);
            let vel = velocity(rng, 45, 70);
            events.push(Event::drum(t - half, half, drum_key::CLAP, vel));
        }
    }
    events
}

/// Snap a tick onto the sixteenth grid inside one bar.
fn kick_slot(tick: f64) -> u32 {
    let q = (tick / f64::from(SIXTEENTH)).floor() as i64 * i64::from(SIXTEENTH);
    q.clamp(0, i64::from(BAR - SIXTEENTH)) as u32
}

fn template_positions(template: KickTemplate, positions: &mut BTreeSet<u32>, rng: &mut SongRng) {
    let mut add = |tick: u32| {
        positions.insert(kick_slot(f64::from(tick)));
    };
    match template {
        KickTemplate::Straight => {
            add(0);
            if rng.chance(0.55) {
                add(BEAT + SIXTEENTH * 2);
            }
            add(BEAT * 2);
            if rng.chance(0.35) {
                add(BEAT * 3 + SIXTEENTH);
            }
        }
        KickTemplate::Bounce => {
            add(0);
            add(BEAT + SIXTEENTH);
            if rng.chance(0.45) {
                add(BEAT * 2 + SIXTEENTH * 2);
            }
            if rng.chance(0.55) {
                add(BEAT * 3 - SIXTEENTH);
            }
        }
        KickTemplate::Driving => {
            add(0);
            add(SIXTEENTH * 6);
            add(BEAT * 2);
            add(BEAT * 2 + SIXTEENTH * 2);
            if rng.chance(0.50) {
                add(BEAT * 3 + SIXTEENTH * 2);
            }
        }
    }
}

fn compose_kick(half_time: bool, style: &StyleParams, rng: &mut SongRng) -> Vec<Event> {
    let template = rng.pick_weighted(&KICK_TEMPLATES);
    let target = lerp(2.0, 6.0, style.density).round() as usize;
    let snare_at = snare_offset(half_time);
    let mut events = Vec::new();

    for bar in 0..LOOP_BARS as u32 {
        let base = i64::from(bar * BAR);
        let mut positions = BTreeSet::new();
        template_positions(template, &mut positions, rng);

        while positions.len() < target {
            if rng.chance(0.25 + style.space * 0.25) {
                break;
            }
            positions.insert(kick_slot(rng.next_f64() * f64::from(BAR)));
        }

        if rng.chance(0.80) {
            positions.remove(&snare_at);
        }

        if rng.chance(0.20) && style.aggression > STUTTER_AGGRESSION {
            positions.insert(BAR - SIXTEENTH * 2);
            positions.insert(BAR - SIXTEENTH);
        }

        for pos in positions {
            let vel = velocity(rng, 98, 124);
            events.push(Event::drum(base + i64::from(pos), i64::from(SIXTEENTH), drum_key::KICK, vel));
        }
    }
    events
}

fn compose_hats(style: &StyleParams, rng: &mut SongRng) -> Vec<Event> {
    let mut events = Vec::new();

    let grid = if rng.chance(0.70) { EIGHTH } else { SIXTEENTH };
    for t in (0..LOOP_TICKS).step_by(grid as usize) {
        if rng.chance(0.10 + style.space * 0.25) {
            continue;
        }
        let vel = velocity(rng, 60, 96);
        events.push(Event::drum(i64::from(t), i64::from(grid / 2), drum_key::HAT_CLOSED, vel));
    }

    let roll_p = (0.15 + style.aggression * 0.35).clamp(0.15, 0.60);
    for bar in 0..LOOP_BARS as u32 {
        let base = bar * BAR;
        if rng.chance(roll_p) {
            let start = base + (rng.next_f64() * f64::from(BAR - BEAT)).floor() as u32;
            let len = if rng.chance(0.60) { SIXTEENTH * 4 } else { SIXTEENTH * 8 };
            let rate = rng.pick_weighted(&ROLL_RATES);
            let mut t = start;
            while t < start + len {
                let vel = velocity(rng, 55, 92);
                events.push(Event::drum(i64::from(t), i64::from(rate / 2), drum_key::HAT_CLOSED, vel));
                t += rate;
            }
        }

        if rng.chance(0.15) {
            let vel = velocity(rng, 60, 95);
            events.push(Event::drum(
                i64::from(base + BAR - EIGHTH),
                i64::from(SIXTEENTH),
                drum_key::HAT_OPEN,
                vel,
            ));
        }
    }

    events
}

/// Bar-end fills: a two-hit snare flam in the last sixteenth, or a six-hit
/// hat burst across the last eighth.
fn add_fills(lanes: &mut DrumLanes, style: &StyleParams, rng: &mut SongRng) {
    for bar in 0..LOOP_BARS as u32 {
        if !rng.chance(style.fills) {
            continue;
        }
        let bar_end = i64::from((bar + 1) * BAR);
        if rng.chance(0.55) {
            let half = i64::from(SIXTEENTH / 2);
            let vel = velocity(rng, 80, 115);
            lanes.snare.push(Event::drum(bar_end - 2 * half, half, drum_key::SNARE, vel));
            let vel = velocity(rng, 92, 124);
            lanes.snare.push(Event::drum(bar_end - half, half, drum_key::SNARE, vel));
        } else {
            let spacing = i64::from(SIXTEENTH / 3);
            let burst_start = bar_end - i64::from(EIGHTH);
            for k in 0..6 {
                let vel = velocity(rng, 60, 98);
                lanes.hats.push(Event::drum(
                    burst_start + k * spacing,
                    i64::from(SIXTEENTH / 6),
                    drum_key::HAT_CLOSED,
                    vel,
                ));
            }
        }
    }
}
