//! Element system with advantage wheel
//!
//! 9 elements: None, Fire, Water, Ice, Earth, Lightning, Nature, Dark, Light
//! Strong matchups deal 1.5x, weak matchups 0.5x, same element 0.75x.
//! None on either side is always neutral (1.0x).

use elementum_core::Color;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// The 9 combat elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Element {
    #[default]
    None,
    Fire,
    Water,
    Ice,
    Earth,
    Lightning,
    Nature,
    Dark,
    Light,
}

/// Total number of elements (for array indexing)
pub const ELEMENT_COUNT: usize = 9;

/// Multiplier for an attacker strong against the defender
pub const STRONG_MULTIPLIER: f32 = 1.5;
/// Multiplier for an attacker weak against the defender
pub const WEAK_MULTIPLIER: f32 = 0.5;
/// Multiplier for an attacker hitting its own element
pub const SAME_ELEMENT_MULTIPLIER: f32 = 0.75;

impl Element {
    /// Array index for this element
    pub fn index(self) -> usize {
        match self {
            Self::None => 0,
            Self::Fire => 1,
            Self::Water => 2,
            Self::Ice => 3,
            Self::Earth => 4,
            Self::Lightning => 5,
            Self::Nature => 6,
            Self::Dark => 7,
            Self::Light => 8,
        }
    }

    /// Display name
    pub fn name(self) -> &'static str {
        match self {
            Self::None => "Neutral",
            Self::Fire => "Fire",
            Self::Water => "Water",
            Self::Ice => "Ice",
            Self::Earth => "Earth",
            Self::Lightning => "Lightning",
            Self::Nature => "Nature",
            Self::Dark => "Dark",
            Self::Light => "Light",
        }
    }

    /// Signature color used to tint projectiles, impacts and zones
    pub fn color(self) -> Color {
        match self {
            Self::None => Color::WHITE,
            Self::Fire => Color::rgb(1.0, 0.3, 0.0),
            Self::Water => Color::rgb(0.0, 0.5, 1.0),
            Self::Ice => Color::rgb(0.5, 0.9, 1.0),
            Self::Earth => Color::rgb(0.6, 0.4, 0.2),
            Self::Lightning => Color::rgb(1.0, 1.0, 0.3),
            Self::Nature => Color::rgb(0.2, 0.8, 0.2),
            Self::Dark => Color::rgb(0.3, 0.0, 0.5),
            Self::Light => Color::rgb(1.0, 1.0, 0.8),
        }
    }

    /// Whether this element is strong against the target
    pub fn is_strong_against(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Fire, Self::Ice)
                | (Self::Fire, Self::Nature)
                | (Self::Water, Self::Fire)
                | (Self::Water, Self::Earth)
                | (Self::Ice, Self::Water)
                | (Self::Ice, Self::Earth)
                | (Self::Earth, Self::Lightning)
                | (Self::Lightning, Self::Water)
                | (Self::Nature, Self::Water)
                | (Self::Nature, Self::Earth)
                | (Self::Light, Self::Dark)
                | (Self::Dark, Self::Light)
        )
    }

    /// Whether this element is weak against the target
    pub fn is_weak_against(self, target: Self) -> bool {
        target.is_strong_against(self)
    }

    /// Damage multiplier when attacking a target of the given element
    pub fn multiplier_against(self, target: Self) -> f32 {
        if self == Self::None || target == Self::None {
            return 1.0;
        }

        if self == target {
            return SAME_ELEMENT_MULTIPLIER;
        }

        if self.is_strong_against(target) {
            STRONG_MULTIPLIER
        } else if self.is_weak_against(target) {
            WEAK_MULTIPLIER
        } else {
            1.0
        }
    }

    /// All element variants
    pub fn all() -> &'static [Element] {
        &[
            Self::None,
            Self::Fire,
            Self::Water,
            Self::Ice,
            Self::Earth,
            Self::Lightning,
            Self::Nature,
            Self::Dark,
            Self::Light,
        ]
    }
}

/// Log every non-neutral matchup at debug level (balancing aid)
pub fn log_matchup_table() {
    for &attacker in Element::all().iter().skip(1) {
        let matchups: Vec<String> = Element::all()
            .iter()
            .skip(1)
            .filter_map(|&defender| {
                let mult = attacker.multiplier_against(defender);
                (mult != 1.0).then(|| format!("{}({mult}x)", defender.name()))
            })
            .collect();
        debug!("{}: {}", attacker.name(), matchups.join(" "));
    }
}
