// Y2K MIDI Loop Generator
//
// A seeded composer for eight-bar, eight-lane trap/hyperpop loops. One or
// more style profiles are blended into a single set of tendencies, a
// Mulberry32 stream (y2k_prng) resolves key, scale, tempo and feel, and a
// fixed sequence of lane generators places every note on a 480 PPQ tick
// grid. The result can be expanded into an intro/drop/break/return
// arrangement and written as a byte-exact Standard MIDI File.
//
// Architecture:
// - event.rs: Tick constants and the Event value
// - track.rs: The eight lanes, their MIDI channels/programs, and `Lanes`
// - theory.rs: Scale families, degree-to-pitch mapping, pitch-class names
// - profile.rs: The built-in style store and the SOLO/MIX blender
// - config.rs: `GenerationConfig` (serde/JSON) and style validation
// - resolve.rs: Scale, root, tempo, half-time and harmony resolution
// - harmony.rs: Chord progression and the pad lane
// - melody.rs: Lead motif, bell counter-line and texture bed
// - bass.rs: 808/bass lane with slides and octave accents
// - drums.rs: Snare/clap, templated kick, hats with rolls, fills
// - compose.rs: One-loop composition order and the lead/bass conflict pass
// - arrangement.rs: Section planning, tiling, mutes and pull-outs
// - song.rs: The Song value, the generation entry point, labeling
// - smf.rs: Standard MIDI File (format 1) encoder
// - error.rs: Error type
//
// Generation is deterministic: the same config and seed always produce the
// same Song and the same file bytes.

pub mod arrangement;
pub mod bass;
pub mod compose;
pub mod config;
pub mod drums;
pub mod error;
pub mod event;
pub mod harmony;
pub mod melody;
pub mod profile;
pub mod resolve;
pub mod smf;
pub mod song;
pub mod theory;
pub mod track;

pub use config::{GenerationConfig, TempoMode};
pub use error::{Error, Result};
pub use song::Song;
