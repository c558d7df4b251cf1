// The composition engine: one eight-bar loop for every lane.
//
// All generators share a single `SongRng` and run in a fixed order:
// progression, pad, lead, bell, bass, drums (snare, kick, hats, fills),
// texture, then the lead/bass conflict pass. Every later draw depends on the
// stream position left by the earlier ones, so reordering these calls
// changes the song produced by every seed.
//
// See harmony.rs, melody.rs, bass.rs and drums.rs for the individual lanes.

use crate::bass::compose_bass;
use crate::drums::compose_drums;
use crate::event::{BEAT, Event, SIXTEENTH};
use crate::harmony::{Progression, build_progression, compose_pad};
use crate::melody::{compose_bell, compose_lead, compose_texture};
use crate::profile::StyleParams;
use crate::resolve::ResolvedParameters;
use crate::track::{Lanes, TrackId};
use log::{debug, warn};
use std::collections::HashSet;
use y2k_prng::SongRng;

/// On-beat lead/bass collisions needed before the conflict pass thins the lead.
pub const CLASH_THRESHOLD: usize = 6;

/// Chance that each colliding on-beat lead note is removed once the
/// threshold is reached.
pub const CLASH_REMOVAL_PROBABILITY: f64 = 0.35;

/// Linear interpolation without a draw.
pub(crate) fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Draw a velocity uniformly between `lo` and `hi`, rounded and clamped to
/// 1..=127.
pub(crate) fn velocity(rng: &mut SongRng, lo: u8, hi: u8) -> u8 {
    rng.range_f64(f64::from(lo), f64::from(hi)).round().clamp(1.0, 127.0) as u8
}

/// One composed loop: the progression and every lane's events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedLoop {
    pub progression: Progression,
    pub lanes: Lanes,
}

/// Compose one loop. Pure in `(params, style, rng state)`.
pub fn compose_loop(params: &ResolvedParameters, style: &StyleParams, rng: &mut SongRng) -> ComposedLoop {
    let progression = build_progression(params.harmony, rng);
    debug!("progression {:?}: {:?}", progression.harmony, progression.degrees);

    let mut lanes = Lanes::new();
    lanes[TrackId::Pad] = compose_pad(&progression, params, rng);
    lanes[TrackId::Lead] = compose_lead(params, style, rng);
    lanes[TrackId::Bell] = compose_bell(params, style, rng);
    lanes[TrackId::Bass] = compose_bass(&progression, params, style, rng);

    let drums = compose_drums(params.half_time, style, rng);
    lanes[TrackId::Kick] = drums.kick;
    lanes[TrackId::Snare] = drums.snare;
    lanes[TrackId::Hats] = drums.hats;

    lanes[TrackId::Texture] = compose_texture(params, style, rng);

    let mut lead = std::mem::take(&mut lanes[TrackId::Lead]);
    let removed = resolve_conflicts(&mut lead, &lanes[TrackId::Bass], rng);
    if removed > 0 {
        warn!("conflict pass removed {removed} on-beat lead notes clashing with bass");
    }
    lanes[TrackId::Lead] = lead;

    for (id, events) in lanes.iter() {
        debug!("loop lane {:<12} {} events", id.label(), events.len());
    }

    ComposedLoop { progression, lanes }
}

/// True when a lead note sits exactly on a beat and shares its sixteenth slot
/// with a bass note.
fn collides(note: &Event, bass_slots: &HashSet<u32>) -> bool {
    note.start_tick % BEAT == 0 && bass_slots.contains(&(note.start_tick / SIXTEENTH))
}

/// Thin on-beat lead notes that collide with the bass.
///
/// Counts colliding lead notes; if there are at least `CLASH_THRESHOLD`,
/// removes each colliding note with probability `CLASH_REMOVAL_PROBABILITY`
/// (one draw per colliding note, walking the lane from its last note to its
/// first). Non-colliding notes are never touched and cost no draws. Returns
/// the number of notes removed.
pub fn resolve_conflicts(lead: &mut Vec<Event>, bass: &[Event], rng: &mut SongRng) -> usize {
    let bass_slots: HashSet<u32> = bass.iter().map(|e| e.start_tick / SIXTEENTH).collect();
    let clashes = lead.iter().filter(|e| collides(e, &bass_slots)).count();
    if clashes < CLASH_THRESHOLD {
        return 0;
    }

    let mut remove = vec![false; lead.len()];
    for (i, note) in lead.iter().enumerate().rev() {
        remove[i] = collides(note, &bass_slots) && rng.chance(CLASH_REMOVAL_PROBABILITY);
    }
    let before = lead.len();
    let mut flags = remove.into_iter();
    lead.retain(|_| !flags.next().unwrap_or(false));
    before - lead.len()
}
