// Parameter resolution: turn a config plus a blended profile into concrete
// musical parameters.
//
// Draw order is fixed: scale, root, tempo, half-time, harmony shape. Pinned
// values (fixed scale, fixed key, fixed or manual tempo) consume no draws, so
// pinning one parameter shifts every later draw. Every tempo is rounded and
// clamped into [MIN_BPM, MAX_BPM].

use crate::config::{GenerationConfig, MAX_BPM, MIN_BPM, TempoMode};
use crate::profile::{BlendedProfile, HarmonyType};
use crate::theory::{BASS_REFERENCE, MELODIC_REFERENCE, ScaleMode, degree_to_pitch};
use serde::{Deserialize, Serialize};
use y2k_prng::SongRng;

/// Scale weights for automatic selection.
const SCALE_WEIGHTS: [(ScaleMode, f64); 3] = [
    (ScaleMode::Natural, 0.70),
    (ScaleMode::Harmonic, 0.20),
    (ScaleMode::Phrygian, 0.10),
];

/// Concrete parameters shared by every generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedParameters {
    pub scale: ScaleMode,
    /// Root pitch class, 0 = C.
    pub root: u8,
    pub bpm: u16,
    pub half_time: bool,
    pub harmony: HarmonyType,
}

impl ResolvedParameters {
    /// Pitch of a scale degree in the melodic register (around C4 + root).
    pub fn melodic_pitch(&self, degree: u8, octave_shift: i32) -> i32 {
        degree_to_pitch(MELODIC_REFERENCE + i32::from(self.root), self.scale, degree, octave_shift)
    }

    /// Pitch of a scale degree in the bass register (around C2 + root).
    pub fn bass_pitch(&self, degree: u8, octave_shift: i32) -> i32 {
        degree_to_pitch(BASS_REFERENCE + i32::from(self.root), self.scale, degree, octave_shift)
    }
}

/// Clamp a tempo into the supported range.
pub fn clamp_bpm(bpm: i64) -> u16 {
    bpm.clamp(i64::from(MIN_BPM), i64::from(MAX_BPM)) as u16
}

/// Root pitch-class weights: A, E and F are favoured.
fn root_weights() -> [(u8, f64); 12] {
    let mut weights = [(0u8, 1.0); 12];
    for (pc, slot) in weights.iter_mut().enumerate() {
        let w = match pc {
            9 => 2.0,
            4 => 1.6,
            5 => 1.4,
            _ => 1.0,
        };
        *slot = (pc as u8, w);
    }
    weights
}

fn resolve_scale(config: &GenerationConfig, rng: &mut SongRng) -> ScaleMode {
    match config.fixed_scale {
        Some(scale) => scale,
        None => rng.pick_weighted(&SCALE_WEIGHTS),
    }
}

fn resolve_root(config: &GenerationConfig, rng: &mut SongRng) -> u8 {
    match config.fixed_key {
        Some(pc) => pc % 12,
        None => rng.pick_weighted(&root_weights()),
    }
}

fn resolve_bpm(config: &GenerationConfig, blend: &BlendedProfile, rng: &mut SongRng) -> u16 {
    match config.tempo {
        TempoMode::Fixed { bpm } | TempoMode::Manual { bpm } => clamp_bpm(i64::from(bpm)),
        TempoMode::Range { min, max } => {
            let a = clamp_bpm(i64::from(min.min(max)));
            let b = clamp_bpm(i64::from(min.max(max)));
            clamp_bpm(rng.range_f64(f64::from(a), f64::from(b)).round() as i64)
        }
        TempoMode::Style => {
            let p = &blend.params;
            clamp_bpm(rng.range_f64(p.tempo_min, p.tempo_max).round() as i64)
        }
    }
}

/// Resolve every generation parameter, in draw order.
pub fn resolve(config: &GenerationConfig, blend: &BlendedProfile, rng: &mut SongRng) -> ResolvedParameters {
    let scale = resolve_scale(config, rng);
    let root = resolve_root(config, rng);
    let bpm = resolve_bpm(config, blend, rng);
    let half_time = rng.chance(blend.params.half_time);
    let harmony = rng.pick_weighted(&blend.params.harmony.choices());

    ResolvedParameters {
        scale,
        root,
        bpm,
        half_time,
        harmony,
    }
}
