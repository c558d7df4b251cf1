// Tick-domain timing constants and the `Event` value.
//
// All generators place events on an integer tick timeline at 480 ticks per
// quarter note. One loop is eight bars of 4/4. Events are plain values: a
// start tick, a duration, a pitch, a velocity, and whether the lane is
// melodic or percussive. MIDI and any renderer are derived from them.

use serde::{Deserialize, Serialize};

/// Ticks per quarter note (SMF division).
pub const PPQ: u32 = 480;
/// One beat (quarter note).
pub const BEAT: u32 = PPQ;
/// One eighth note.
pub const EIGHTH: u32 = PPQ / 2;
/// One sixteenth note.
pub const SIXTEENTH: u32 = PPQ / 4;
/// One 4/4 bar.
pub const BAR: u32 = PPQ * 4;
/// Bars in the generated loop.
pub const LOOP_BARS: usize = 8;
/// Length of the generated loop in ticks.
pub const LOOP_TICKS: u32 = LOOP_BARS as u32 * BAR;

/// Whether an event sounds a pitched note or a drum hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Note,
    Drum,
}

/// A single timed note or drum hit.
///
/// Invariants for events built by the constructors: `duration_tick >= 1`,
/// `pitch <= 127`, `1 <= velocity <= 127`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Event {
    pub start_tick: u32,
    pub duration_tick: u32,
    pub pitch: u8,
    pub velocity: u8,
    pub kind: EventKind,
}

impl Event {
    /// A melodic note. Negative starts snap to 0, durations below 1 become 1,
    /// and the pitch is clamped into the MIDI range.
    pub fn note(start: i64, duration: i64, pitch: i32, velocity: u8) -> Self {
        Self::build(start, duration, pitch, velocity, EventKind::Note)
    }

    /// A drum hit on a fixed GM percussion key.
    pub fn drum(start: i64, duration: i64, key: u8, velocity: u8) -> Self {
        Self::build(start, duration, i32::from(key), velocity, EventKind::Drum)
    }

    fn build(start: i64, duration: i64, pitch: i32, velocity: u8, kind: EventKind) -> Self {
        Event {
            start_tick: start.clamp(0, i64::from(u32::MAX)) as u32,
            duration_tick: duration.clamp(1, i64::from(u32::MAX)) as u32,
            pitch: pitch.clamp(0, 127) as u8,
            velocity: velocity.clamp(1, 127),
            kind,
        }
    }

    /// Tick at which the event stops sounding.
    pub fn end_tick(&self) -> u64 {
        u64::from(self.start_tick) + u64::from(self.duration_tick)
    }

    /// Copy of this event moved by `offset` ticks.
    pub fn shifted(&self, offset: u32) -> Self {
        Event {
            start_tick: self.start_tick.saturating_add(offset),
            ..*self
        }
    }
}
