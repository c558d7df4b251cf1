// Scale families and scale-degree pitch mapping.
//
// The generator works in three minor-flavoured scale families. Every melodic
// generator picks 1-based scale degrees (1 = root … 7 = seventh) and maps
// them to MIDI pitches through `degree_to_pitch`, anchored at a fixed octave
// reference per register (melodic around C4, bass around C2).
//
// Used by resolve.rs (scale selection), harmony.rs, melody.rs and bass.rs.

use serde::{Deserialize, Serialize};

/// MIDI pitch of C4, the melodic register reference before adding the root.
pub const MELODIC_REFERENCE: i32 = 60;

/// MIDI pitch of C2, the bass register reference before adding the root.
pub const BASS_REFERENCE: i32 = 36;

/// Pitch-class names, sharps only.
const PITCH_CLASS_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// The three supported scale families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleMode {
    /// Natural minor: 1 2 b3 4 5 b6 b7.
    Natural,
    /// Harmonic minor: natural minor with a raised 7th.
    Harmonic,
    /// Phrygian: natural minor with a flat 2nd.
    Phrygian,
}

impl ScaleMode {
    pub const ALL: [ScaleMode; 3] = [ScaleMode::Natural, ScaleMode::Harmonic, ScaleMode::Phrygian];

    /// Semitone offsets from the root for degrees 1..=7.
    pub fn intervals(self) -> [i32; 7] {
        match self {
            ScaleMode::Natural => [0, 2, 3, 5, 7, 8, 10],
            ScaleMode::Harmonic => [0, 2, 3, 5, 7, 8, 11],
            ScaleMode::Phrygian => [0, 1, 3, 5, 7, 8, 10],
        }
    }

    /// Lowercase name, as used in config files and on the command line.
    pub fn name(self) -> &'static str {
        match self {
            ScaleMode::Natural => "natural",
            ScaleMode::Harmonic => "harmonic",
            ScaleMode::Phrygian => "phrygian",
        }
    }

    pub fn from_name(name: &str) -> Option<ScaleMode> {
        ScaleMode::ALL
            .into_iter()
            .find(|s| s.name().eq_ignore_ascii_case(name.trim()))
    }
}

/// Wrap any integer degree into 1..=7.
pub fn wrap_degree(degree: i32) -> u8 {
    ((degree - 1).rem_euclid(7) + 1) as u8
}

/// Map a 1-based scale degree to a MIDI pitch.
///
/// `pitch = register_root + intervals[(degree - 1) mod 7] + 12 * octave_shift`.
/// The degree wraps without carrying an octave, so degree 8 maps to the same
/// pitch as degree 1.
pub fn degree_to_pitch(register_root: i32, scale: ScaleMode, degree: u8, octave_shift: i32) -> i32 {
    let index = (i32::from(degree) - 1).rem_euclid(7) as usize;
    register_root + scale.intervals()[index] + 12 * octave_shift
}

/// Name of a pitch class (taken modulo 12).
pub fn pitch_class_name(pc: u8) -> &'static str {
    PITCH_CLASS_NAMES[usize::from(pc % 12)]
}

/// Parse a pitch class from a note name (`"A"`, `"c#"`, `"Bb"`) or a number
/// (`"9"`, taken modulo 12).
pub fn parse_pitch_class(text: &str) -> Option<u8> {
    let text = text.trim();
    if let Ok(n) = text.parse::<u32>() {
        return Some((n % 12) as u8);
    }
    if let Some(pc) = PITCH_CLASS_NAMES
        .iter()
        .position(|name| name.eq_ignore_ascii_case(text))
    {
        return Some(pc as u8);
    }
    // Flat spellings: one semitone below the natural.
    if text.len() == 2 && text.is_ascii() {
        let (letter, accidental) = text.split_at(1);
        if !accidental.eq_ignore_ascii_case("b") {
            return None;
        }
        let natural = PITCH_CLASS_NAMES
            .iter()
            .position(|name| name.eq_ignore_ascii_case(letter))?;
        return Some(((natural + 11) % 12) as u8);
    }
    None
}
