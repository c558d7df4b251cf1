// Instrument lanes and their fixed MIDI identities.
//
// The song always has the same eight lanes in the same order. Each lane has a
// display name, a MIDI channel, and either a General MIDI program (melodic
// lanes) or the drum flag (channel 10 percussion). `Lanes` holds one event
// list per lane, indexed by `TrackId`.

use crate::event::Event;
use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// GM percussion keys used by the drum lanes.
pub mod drum_key {
    pub const KICK: u8 = 36;
    pub const SNARE: u8 = 38;
    pub const CLAP: u8 = 39;
    pub const HAT_CLOSED: u8 = 42;
    pub const HAT_OPEN: u8 = 46;
}

/// Lane identity, in file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TrackId {
    Pad = 0,
    Lead = 1,
    Bell = 2,
    Bass = 3,
    Kick = 4,
    Snare = 5,
    Hats = 6,
    Texture = 7,
}

impl TrackId {
    pub const COUNT: usize = 8;

    pub const ALL: [TrackId; TrackId::COUNT] = [
        TrackId::Pad,
        TrackId::Lead,
        TrackId::Bell,
        TrackId::Bass,
        TrackId::Kick,
        TrackId::Snare,
        TrackId::Hats,
        TrackId::Texture,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Name written into the lane's track-name meta event.
    pub fn label(self) -> &'static str {
        match self {
            TrackId::Pad => "PAD/CHORD",
            TrackId::Lead => "LEAD",
            TrackId::Bell => "BELL/COUNTER",
            TrackId::Bass => "808/BASS",
            TrackId::Kick => "KICK",
            TrackId::Snare => "SNARE/CLAP",
            TrackId::Hats => "HATS",
            TrackId::Texture => "TEXTURE",
        }
    }

    /// Zero-based MIDI channel. All drum lanes share channel 9 (GM channel 10).
    pub fn channel(self) -> u8 {
        match self {
            TrackId::Pad => 0,
            TrackId::Lead => 1,
            TrackId::Bell => 2,
            TrackId::Bass => 3,
            TrackId::Texture => 4,
            TrackId::Kick | TrackId::Snare | TrackId::Hats => 9,
        }
    }

    /// General MIDI program for melodic lanes, `None` for drum lanes.
    pub fn program(self) -> Option<u8> {
        match self {
            TrackId::Pad => Some(89),     // Pad 2 (warm)
            TrackId::Lead => Some(81),    // Lead 2 (sawtooth)
            TrackId::Bell => Some(10),    // Music box
            TrackId::Bass => Some(38),    // Synth bass 1
            TrackId::Texture => Some(92), // Pad 5 (bowed)
            TrackId::Kick | TrackId::Snare | TrackId::Hats => None,
        }
    }

    pub fn is_drum(self) -> bool {
        self.program().is_none()
    }
}

/// One event list per lane.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lanes {
    lanes: [Vec<Event>; TrackId::COUNT],
}

impl Lanes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Iterate `(lane, events)` in file order.
    pub fn iter(&self) -> impl Iterator<Item = (TrackId, &[Event])> {
        TrackId::ALL
            .into_iter()
            .map(move |id| (id, self.lanes[id.index()].as_slice()))
    }

    /// Total number of events across every lane.
    pub fn event_count(&self) -> usize {
        self.lanes.iter().map(Vec::len).sum()
    }

    /// Stable-sort every lane by start tick.
    pub fn sort_by_start(&mut self) {
        for lane in &mut self.lanes {
            lane.sort_by_key(|e| e.start_tick);
        }
    }
}

impl Index<TrackId> for Lanes {
    type Output = Vec<Event>;

    fn index(&self, id: TrackId) -> &Vec<Event> {
        &self.lanes[id.index()]
    }
}

impl IndexMut<TrackId> for Lanes {
    fn index_mut(&mut self, id: TrackId) -> &mut Vec<Event> {
        &mut self.lanes[id.index()]
    }
}
