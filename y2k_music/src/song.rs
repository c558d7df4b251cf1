// The Song value and the top-level generation pipeline.
//
// `Song::generate` is the library's entry point: validate the config, blend
// the selected styles, seed a fresh `SongRng`, then resolve parameters,
// compose one loop and expand the arrangement. The returned Song is an
// immutable value; the SMF encoder (smf.rs) and any renderer only read it.
//
// Labeling helpers (file name, summary text, tempo-track name) and the
// tick/seconds conversions a renderer needs also live here.

use crate::arrangement::{Section, arrange};
use crate::compose::compose_loop;
use crate::config::GenerationConfig;
use crate::error::Result;
use crate::event::{BAR, PPQ};
use crate::harmony::Progression;
use crate::profile::{BlendMode, BlendedProfile, blend};
use crate::resolve::{ResolvedParameters, resolve};
use crate::smf;
use crate::theory::pitch_class_name;
use crate::track::Lanes;
use log::{debug, info};
use serde::Serialize;
use y2k_prng::SongRng;

/// A generated song.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Song {
    pub seed: u32,
    /// Selected style names, in selection order.
    pub styles: Vec<&'static str>,
    pub main_style: &'static str,
    pub mode: BlendMode,
    pub params: ResolvedParameters,
    pub progression: Progression,
    /// Arrangement-expanded events per lane, sorted by start tick.
    pub tracks: Lanes,
    pub sections: Vec<Section>,
}

impl Song {
    /// Generate a song from a config and a seed.
    ///
    /// Fails only if the config's style list is empty or names an unknown
    /// style. The same `(config, seed)` always yields the same song.
    pub fn generate(config: &GenerationConfig, seed: u32) -> Result<Song> {
        let selected = config.validate()?;
        let profile = blend(&selected);
        let mut rng = SongRng::new(seed);
        Ok(compose_song(config, &profile, seed, &mut rng))
    }

    /// Name for the tempo track: the style selection and blend mode.
    pub fn track_name(&self) -> String {
        format!("Y2K MIDI GEN - {} - {}", self.styles.join(" + "), self.mode.label())
    }

    /// Suggested file name encoding style, tempo, key, scale and seed.
    pub fn file_name(&self) -> String {
        let style = match self.mode {
            BlendMode::Mix => "MIX".to_string(),
            BlendMode::Solo => self.main_style.split_whitespace().collect(),
        };
        format!(
            "Y2K_MIDI_{}_{}BPM_{}_{}_SEED{}.mid",
            style,
            self.params.bpm,
            pitch_class_name(self.params.root),
            self.params.scale.name().to_uppercase(),
            self.seed
        )
    }

    /// Tick at which the last section ends.
    pub fn total_ticks(&self) -> u32 {
        self.sections.last().map_or(0, Section::end_tick)
    }

    pub fn total_bars(&self) -> u32 {
        self.total_ticks() / BAR
    }

    /// Wall-clock length of one tick at the song's tempo.
    pub fn seconds_per_tick(&self) -> f64 {
        60.0 / f64::from(self.params.bpm) / f64::from(PPQ)
    }

    pub fn duration_seconds(&self) -> f64 {
        f64::from(self.total_ticks()) * self.seconds_per_tick()
    }

    /// Multi-line description: session, per-lane counts, arrangement.
    ///
    /// Display text only; never written into the MIDI file, whose names stay
    /// ASCII.
    pub fn summary(&self) -> String {
        let mut lines = vec![format!(
            "{} BARS • {} BPM • {} {} • {}",
            self.total_bars(),
            self.params.bpm,
            pitch_class_name(self.params.root),
            self.params.scale.name().to_uppercase(),
            self.mode.label()
        )];
        for (track, events) in self.tracks.iter() {
            let count = if events.is_empty() {
                "—".to_string()
            } else {
                format!("{} NOTES", events.len())
            };
            lines.push(format!("{:<13}{}", track.label(), count));
        }
        lines.push(
            self.sections
                .iter()
                .map(|s| format!("{}:{}b", s.name, s.bars()))
                .collect::<Vec<_>>()
                .join(" • "),
        );
        lines.join("\n")
    }

    /// Encode as Standard MIDI File bytes.
    pub fn to_smf(&self) -> Result<Vec<u8>> {
        smf::encode_song(self)
    }
}

/// Run the generation pipeline with an explicit profile and RNG.
///
/// Draws happen in a fixed order: parameter resolution, the loop's lanes,
/// then arrangement pull-outs.
pub fn compose_song(config: &GenerationConfig, profile: &BlendedProfile, seed: u32, rng: &mut SongRng) -> Song {
    let params = resolve(config, profile, rng);
    debug!(
        "resolved {} {} at {} BPM, half-time {}, harmony {:?}",
        pitch_class_name(params.root),
        params.scale.name(),
        params.bpm,
        params.half_time,
        params.harmony
    );

    let composed = compose_loop(&params, &profile.params, rng);
    let (sections, tracks) = arrange(composed.lanes, config.extended, &profile.params, rng);

    let song = Song {
        seed,
        styles: profile.styles.clone(),
        main_style: profile.main,
        mode: profile.mode,
        params,
        progression: composed.progression,
        tracks,
        sections,
    };
    info!(
        "generated {} seed {}: {} events over {} bars",
        song.track_name(),
        seed,
        song.tracks.event_count(),
        song.total_bars()
    );
    song
}
