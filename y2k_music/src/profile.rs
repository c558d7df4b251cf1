// Style profiles and the profile blender.
//
// A style profile is a fixed record of generation tendencies: a tempo range,
// ten intensity scalars in [0, 1] and a weight set over the four harmony
// shapes. The store is a static table; profiles are `Copy` values and are
// never mutated. `blend` combines an ordered selection into one effective
// parameter set: a single style passes through unchanged (SOLO), several are
// mixed with the first ("main") style weighted 0.52 and the rest sharing 0.48
// (MIX).
//
// Consumed by resolve.rs (tempo, half-time, harmony choice) and by every
// generator in the composition engine.

use serde::{Deserialize, Serialize};

/// Weight given to the first (main) style when blending several.
pub const MAIN_STYLE_WEIGHT: f64 = 0.52;

/// The four chord-progression shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HarmonyType {
    /// Degree 1 held for every bar.
    Drone,
    /// Degree 1 with an occasional flat-seven turnaround.
    Power,
    /// Degree 1 for four bars, then 6 or 7.
    TwoChord,
    /// Fixed 1-1-6-6-7-7-1-1 cycle.
    ThreeChord,
}

/// Relative weights over `HarmonyType`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HarmonyWeights {
    pub drone: f64,
    pub power: f64,
    pub two: f64,
    pub three: f64,
}

impl HarmonyWeights {
    pub fn sum(&self) -> f64 {
        self.drone + self.power + self.two + self.three
    }

    /// Divide every weight by the sum (or by 1 when the sum is zero).
    pub fn normalized(&self) -> HarmonyWeights {
        let sum = self.sum();
        let divisor = if sum == 0.0 { 1.0 } else { sum };
        HarmonyWeights {
            drone: self.drone / divisor,
            power: self.power / divisor,
            two: self.two / divisor,
            three: self.three / divisor,
        }
    }

    /// Ordered `(shape, weight)` pairs for a weighted pick.
    pub fn choices(&self) -> [(HarmonyType, f64); 4] {
        [
            (HarmonyType::Drone, self.drone),
            (HarmonyType::Power, self.power),
            (HarmonyType::TwoChord, self.two),
            (HarmonyType::ThreeChord, self.three),
        ]
    }
}

/// Generation tendencies shared by stored and blended profiles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StyleParams {
    pub tempo_min: f64,
    pub tempo_max: f64,
    /// How many notes/hits each generator places.
    pub density: f64,
    /// Sixteenth-grid lead rhythms, hat rolls, ghost claps, kick stutters.
    pub aggression: f64,
    /// Rest and drop probabilities across all generators.
    pub space: f64,
    /// How faithfully later motif repetitions copy the first two.
    pub repetition: f64,
    pub hats_roll: f64,
    pub fills: f64,
    pub slides: f64,
    pub half_time: f64,
    pub bells: f64,
    pub texture: f64,
    pub harmony: HarmonyWeights,
}

/// A named entry in the style store.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StyleProfile {
    pub name: &'static str,
    pub params: StyleParams,
}

/// The built-in style table, in display order.
pub static STYLES: [StyleProfile; 7] = [
    StyleProfile {
        name: "2HOLLIS",
        params: StyleParams {
            tempo_min: 150.0,
            tempo_max: 175.0,
            density: 0.35,
            aggression: 0.30,
            space: 0.65,
            repetition: 0.78,
            hats_roll: 0.12,
            fills: 0.18,
            slides: 0.18,
            half_time: 0.20,
            bells: 0.25,
            texture: 0.55,
            harmony: HarmonyWeights { drone: 0.50, power: 0.32, two: 0.16, three: 0.02 },
        },
    },
    StyleProfile {
        name: "FAKEMINK",
        params: StyleParams {
            tempo_min: 155.0,
            tempo_max: 180.0,
            density: 0.55,
            aggression: 0.45,
            space: 0.45,
            repetition: 0.65,
            hats_roll: 0.22,
            fills: 0.28,
            slides: 0.28,
            half_time: 0.22,
            bells: 0.65,
            texture: 0.45,
            harmony: HarmonyWeights { drone: 0.32, power: 0.28, two: 0.34, three: 0.06 },
        },
    },
    StyleProfile {
        name: "ESDEEKID",
        params: StyleParams {
            tempo_min: 165.0,
            tempo_max: 190.0,
            density: 0.78,
            aggression: 0.82,
            space: 0.22,
            repetition: 0.55,
            hats_roll: 0.52,
            fills: 0.45,
            slides: 0.55,
            half_time: 0.18,
            bells: 0.35,
            texture: 0.35,
            harmony: HarmonyWeights { drone: 0.18, power: 0.32, two: 0.44, three: 0.06 },
        },
    },
    StyleProfile {
        name: "FENG",
        params: StyleParams {
            tempo_min: 145.0,
            tempo_max: 170.0,
            density: 0.48,
            aggression: 0.58,
            space: 0.55,
            repetition: 0.70,
            hats_roll: 0.22,
            fills: 0.26,
            slides: 0.30,
            half_time: 0.50,
            bells: 0.20,
            texture: 0.62,
            harmony: HarmonyWeights { drone: 0.44, power: 0.32, two: 0.22, three: 0.02 },
        },
    },
    StyleProfile {
        name: "BLADEE",
        params: StyleParams {
            tempo_min: 140.0,
            tempo_max: 170.0,
            density: 0.50,
            aggression: 0.40,
            space: 0.60,
            repetition: 0.68,
            hats_roll: 0.20,
            fills: 0.22,
            slides: 0.20,
            half_time: 0.20,
            bells: 0.70,
            texture: 0.48,
            harmony: HarmonyWeights { drone: 0.26, power: 0.24, two: 0.42, three: 0.08 },
        },
    },
    StyleProfile {
        name: "FIMIGUERRERO",
        params: StyleParams {
            tempo_min: 160.0,
            tempo_max: 190.0,
            density: 0.76,
            aggression: 0.74,
            space: 0.28,
            repetition: 0.56,
            hats_roll: 0.46,
            fills: 0.46,
            slides: 0.44,
            half_time: 0.25,
            bells: 0.30,
            texture: 0.42,
            harmony: HarmonyWeights { drone: 0.20, power: 0.30, two: 0.44, three: 0.06 },
        },
    },
    StyleProfile {
        name: "KEN CARSON",
        params: StyleParams {
            tempo_min: 150.0,
            tempo_max: 180.0,
            density: 0.72,
            aggression: 0.70,
            space: 0.28,
            repetition: 0.58,
            hats_roll: 0.40,
            fills: 0.40,
            slides: 0.42,
            half_time: 0.16,
            bells: 0.22,
            texture: 0.30,
            harmony: HarmonyWeights { drone: 0.14, power: 0.46, two: 0.36, three: 0.04 },
        },
    },
];

/// Look up a style by name, ignoring case and surrounding whitespace.
pub fn find_style(name: &str) -> Option<&'static StyleProfile> {
    let name = name.trim();
    STYLES.iter().find(|s| s.name.eq_ignore_ascii_case(name))
}

/// SOLO for a single style, MIX for a blend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BlendMode {
    Solo,
    Mix,
}

impl BlendMode {
    pub fn label(self) -> &'static str {
        match self {
            BlendMode::Solo => "SOLO",
            BlendMode::Mix => "MIX",
        }
    }
}

/// The effective profile for one generation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlendedProfile {
    /// First selected style; used for labeling only.
    pub main: &'static str,
    /// Every selected style, in selection order.
    pub styles: Vec<&'static str>,
    pub mode: BlendMode,
    pub params: StyleParams,
}

/// Blend an ordered, non-empty selection of styles.
///
/// Panics if `selected` is empty. Callers validate the selection first (see
/// `GenerationConfig::validate`).
pub fn blend(selected: &[&'static StyleProfile]) -> BlendedProfile {
    assert!(!selected.is_empty(), "blend: at least one style is required");
    let main = selected[0];
    let styles: Vec<&'static str> = selected.iter().map(|s| s.name).collect();

    if selected.len() == 1 {
        return BlendedProfile {
            main: main.name,
            styles,
            mode: BlendMode::Solo,
            params: main.params,
        };
    }

    let rest_weight = (1.0 - MAIN_STYLE_WEIGHT) / (selected.len() - 1) as f64;
    let weights: Vec<f64> = (0..selected.len())
        .map(|i| if i == 0 { MAIN_STYLE_WEIGHT } else { rest_weight })
        .collect();
    let mix = |field: fn(&StyleParams) -> f64| -> f64 {
        selected
            .iter()
            .zip(&weights)
            .map(|(s, w)| field(&s.params) * w)
            .sum()
    };

    let harmony = HarmonyWeights {
        drone: mix(|p| p.harmony.drone),
        power: mix(|p| p.harmony.power),
        two: mix(|p| p.harmony.two),
        three: mix(|p| p.harmony.three),
    }
    .normalized();

    let params = StyleParams {
        tempo_min: mix(|p| p.tempo_min).round(),
        tempo_max: mix(|p| p.tempo_max).round(),
        density: mix(|p| p.density),
        aggression: mix(|p| p.aggression),
        space: mix(|p| p.space),
        repetition: mix(|p| p.repetition),
        hats_roll: mix(|p| p.hats_roll),
        fills: mix(|p| p.fills),
        slides: mix(|p| p.slides),
        half_time: mix(|p| p.half_time),
        bells: mix(|p| p.bells),
        texture: mix(|p| p.texture),
        harmony,
    };

    BlendedProfile {
        main: main.name,
        styles,
        mode: BlendMode::Mix,
        params,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style(name: &str) -> &'static StyleProfile {
        find_style(name).unwrap()
    }

    #[test]
    fn test_store_weights_are_normalized() {
        for s in &STYLES {
            let sum = s.params.harmony.sum();
            assert!((sum - 1.0).abs() < 1e-9, "{} harmony sums to {sum}", s.name);
            assert!(s.params.tempo_min <= s.params.tempo_max);
        }
    }

    #[test]
    fn test_find_style_is_case_insensitive() {
        assert_eq!(style(" fakemink ").name, "FAKEMINK");
        assert_eq!(style("ken carson").name, "KEN CARSON");
        assert!(find_style("NOBODY").is_none());
    }

    #[test]
    fn test_solo_blend_passes_through() {
        let b = blend(&[style("FENG")]);
        assert_eq!(b.mode, BlendMode::Solo);
        assert_eq!(b.main, "FENG");
        assert_eq!(b.params, style("FENG").params);
    }

    #[test]
    fn test_two_style_blend_weights() {
        let a = style("2HOLLIS");
        let e = style("ESDEEKID");
        let b = blend(&[a, e]);
        assert_eq!(b.mode, BlendMode::Mix);
        assert_eq!(b.main, "2HOLLIS");
        assert_eq!(b.styles, vec!["2HOLLIS", "ESDEEKID"]);

        let expected_density = 0.35 * 0.52 + 0.78 * 0.48;
        assert!((b.params.density - expected_density).abs() < 1e-12);
        // 150*0.52 + 165*0.48 = 157.2 -> 157
        assert_eq!(b.params.tempo_min, 157.0);
        // 175*0.52 + 190*0.48 = 182.2 -> 182
        assert_eq!(b.params.tempo_max, 182.0);
    }

    #[test]
    fn test_blended_harmony_sums_to_one() {
        let selections: Vec<Vec<&'static StyleProfile>> = vec![
            vec![style("FAKEMINK"), style("BLADEE")],
            vec![style("KEN CARSON"), style("FENG"), style("2HOLLIS")],
            STYLES.iter().collect(),
        ];
        for sel in selections {
            let h = blend(&sel).params.harmony;
            for w in [h.drone, h.power, h.two, h.three] {
                assert!(w >= 0.0);
            }
            assert!((h.sum() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_normalize_zero_sum() {
        let zero = HarmonyWeights { drone: 0.0, power: 0.0, two: 0.0, three: 0.0 };
        assert_eq!(zero.normalized(), zero);
    }

    #[test]
    fn test_main_style_dominates_order() {
        let ab = blend(&[style("ESDEEKID"), style("2HOLLIS")]);
        let ba = blend(&[style("2HOLLIS"), style("ESDEEKID")]);
        assert!(ab.params.aggression > ba.params.aggression);
    }
}
