// Generation configuration: the caller-facing control surface.
//
// `GenerationConfig` is a plain serde value (loadable from JSON, every field
// defaulted) describing which styles to blend and which musical parameters to
// pin. Numeric overrides are clamped later by resolve.rs; the only thing that
// can make a config unusable is its style list, which `validate` checks
// against the style store before any generation starts.

use crate::error::{Error, Result};
use crate::profile::{StyleProfile, find_style};
use crate::theory::ScaleMode;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Lowest tempo the resolver will produce.
pub const MIN_BPM: i32 = 60;
/// Highest tempo the resolver will produce.
pub const MAX_BPM: i32 = 220;

/// Style used when no configuration is given.
pub const DEFAULT_STYLE: &str = "FAKEMINK";

/// How the tempo is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TempoMode {
    /// Uniform draw inside the blended profile's tempo range.
    #[default]
    Style,
    /// A fixed tempo entered by the user.
    Fixed { bpm: i32 },
    /// A tempo nudged by hand (same semantics as `Fixed`).
    Manual { bpm: i32 },
    /// Uniform draw inside an explicit range; bounds may be given in either order.
    Range { min: i32, max: i32 },
}

/// Everything a generation call needs besides the seed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Ordered style selection. The first entry is the main style.
    pub styles: Vec<String>,
    pub tempo: TempoMode,
    /// Explicit root pitch class (taken modulo 12); `None` picks one.
    pub fixed_key: Option<u8>,
    /// Explicit scale family; `None` picks one.
    pub fixed_scale: Option<ScaleMode>,
    /// Expand the loop into intro/drop/break/return.
    pub extended: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        GenerationConfig {
            styles: vec![DEFAULT_STYLE.to_string()],
            tempo: TempoMode::default(),
            fixed_key: None,
            fixed_scale: None,
            extended: false,
        }
    }
}

impl GenerationConfig {
    /// Load a config from a JSON file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Resolve the style names against the store, preserving order.
    pub fn validate(&self) -> Result<Vec<&'static StyleProfile>> {
        if self.styles.is_empty() {
            return Err(Error::EmptyStyleList);
        }
        self.styles
            .iter()
            .map(|name| find_style(name).ok_or_else(|| Error::UnknownStyle(name.clone())))
            .collect()
    }
}
