//! Status effects and the per-target status registry
//!
//! Burn and Poison deal damage over time, Freeze stops movement outright and
//! Slow scales it. Each variant carries its own stacking and refresh policy.

mod registry;

pub use registry::{ApplyOutcome, SpeedControl, StatusEvent, StatusRegistry, StatusTick};

use serde::{Deserialize, Serialize};

use crate::element::Element;

/// Burn deals damage every half second
pub const BURN_TICK_INTERVAL: f32 = 0.5;
/// Poison ticks slower than burn
pub const POISON_TICK_INTERVAL: f32 = 1.0;

/// Types of status effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusEffectType {
    Burn,
    Freeze,
    Slow,
    Poison,
    Stun,
    Bleed,
    Weakness,
    Armor,
    Speed,
}

impl StatusEffectType {
    /// Display name
    pub fn name(self) -> &'static str {
        match self {
            Self::Burn => "Burning",
            Self::Freeze => "Frozen",
            Self::Slow => "Slowed",
            Self::Poison => "Poisoned",
            Self::Stun => "Stunned",
            Self::Bleed => "Bleeding",
            Self::Weakness => "Weakened",
            Self::Armor => "Armored",
            Self::Speed => "Hastened",
        }
    }

    /// Element of the damage this effect deals over time
    pub fn element(self) -> Option<Element> {
        match self {
            Self::Burn => Some(Element::Fire),
            Self::Poison => Some(Element::Nature),
            _ => None,
        }
    }

    /// Whether an effect of this type can be instantiated
    pub fn is_implemented(self) -> bool {
        matches!(self, Self::Burn | Self::Freeze | Self::Slow | Self::Poison)
    }
}

/// Per-variant state of an active effect
#[derive(Debug, Clone, PartialEq)]
pub enum EffectState {
    Burn { dps: f32, tick_timer: f32 },
    Freeze,
    Slow { multiplier: f32 },
    Poison { dps: f32, tick_timer: f32 },
}

/// One damage-over-time tick, to be applied to the target's health
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DotTick {
    pub kind: StatusEffectType,
    pub amount: i32,
    pub element: Element,
}

/// An active status effect instance
#[derive(Debug, Clone, PartialEq)]
pub struct StatusEffect {
    state: EffectState,
    remaining: f32,
    max_duration: f32,
    stack_count: u32,
}

impl StatusEffect {
    fn with_state(state: EffectState, duration: f32) -> Self {
        Self {
            state,
            remaining: duration,
            max_duration: duration,
            stack_count: 1,
        }
    }

    /// Fire damage over time
    pub fn burn(dps: f32, duration: f32) -> Self {
        Self::with_state(
            EffectState::Burn {
                dps,
                tick_timer: 0.0,
            },
            duration,
        )
    }

    /// Complete movement stop
    pub fn freeze(duration: f32) -> Self {
        Self::with_state(EffectState::Freeze, duration)
    }

    /// Movement speed reduction. `speed_multiplier` is clamped to 0.0-1.0
    /// (0.5 = half speed).
    pub fn slow(speed_multiplier: f32, duration: f32) -> Self {
        Self::with_state(
            EffectState::Slow {
                multiplier: speed_multiplier.clamp(0.0, 1.0),
            },
            duration,
        )
    }

    /// Nature damage over time, stacking higher than burn
    pub fn poison(dps: f32, duration: f32) -> Self {
        Self::with_state(
            EffectState::Poison {
                dps,
                tick_timer: 0.0,
            },
            duration,
        )
    }

    pub fn kind(&self) -> StatusEffectType {
        match self.state {
            EffectState::Burn { .. } => StatusEffectType::Burn,
            EffectState::Freeze => StatusEffectType::Freeze,
            EffectState::Slow { .. } => StatusEffectType::Slow,
            EffectState::Poison { .. } => StatusEffectType::Poison,
        }
    }

    pub fn state(&self) -> &EffectState {
        &self.state
    }

    pub fn max_stacks(&self) -> u32 {
        match self.state {
            EffectState::Burn { .. } => 3,
            EffectState::Poison { .. } => 5,
            EffectState::Freeze | EffectState::Slow { .. } => 1,
        }
    }

    pub fn is_stackable(&self) -> bool {
        self.max_stacks() > 1
    }

    /// Freeze does not refresh: chaining it would lock a target in place
    pub fn refresh_on_reapply(&self) -> bool {
        !matches!(self.state, EffectState::Freeze)
    }

    /// Interval between damage ticks, for damage-over-time variants
    pub fn tick_interval(&self) -> Option<f32> {
        match self.state {
            EffectState::Burn { .. } => Some(BURN_TICK_INTERVAL),
            EffectState::Poison { .. } => Some(POISON_TICK_INTERVAL),
            _ => None,
        }
    }

    /// Unrounded damage of one tick at the current stack count
    pub fn tick_damage(&self) -> f32 {
        let stacks = self.stack_count as f32;
        match self.state {
            EffectState::Burn { dps, .. } => dps * BURN_TICK_INTERVAL * stacks,
            EffectState::Poison { dps, .. } => {
                let stack_multiplier = 1.0 + (stacks - 1.0) * 0.5;
                dps * POISON_TICK_INTERVAL * stack_multiplier
            }
            _ => 0.0,
        }
    }

    /// Speed multiplier contributed by a slow effect
    pub fn slow_multiplier(&self) -> Option<f32> {
        match self.state {
            EffectState::Slow { multiplier } => Some(multiplier),
            _ => None,
        }
    }

    /// Bind a fresh application: full duration, single stack
    pub(crate) fn initialize(&mut self, duration: f32) {
        self.max_duration = duration;
        self.remaining = duration;
        self.stack_count = 1;
    }

    /// Advance the effect. Returns a damage tick when the interval elapses.
    pub fn tick(&mut self, delta: f32) -> Option<DotTick> {
        self.remaining -= delta;

        let interval = self.tick_interval()?;
        let damage = self.tick_damage();
        let kind = self.kind();
        let timer = match &mut self.state {
            EffectState::Burn { tick_timer, .. } | EffectState::Poison { tick_timer, .. } => {
                tick_timer
            }
            _ => return None,
        };

        *timer += delta;
        if *timer < interval {
            return None;
        }
        *timer = 0.0;

        Some(DotTick {
            kind,
            amount: damage.round_ties_even() as i32,
            element: kind.element().unwrap_or_default(),
        })
    }

    /// Add a stack if stackable and below the cap. Returns true if added.
    pub fn add_stack(&mut self) -> bool {
        if self.is_stackable() && self.stack_count < self.max_stacks() {
            self.stack_count += 1;
            true
        } else {
            false
        }
    }

    /// Reset remaining duration if the refresh policy allows. Returns true if refreshed.
    pub fn refresh(&mut self) -> bool {
        if self.refresh_on_reapply() {
            self.remaining = self.max_duration;
            true
        } else {
            false
        }
    }

    pub fn is_expired(&self) -> bool {
        self.remaining <= 0.0
    }

    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    pub fn max_duration(&self) -> f32 {
        self.max_duration
    }

    pub fn stack_count(&self) -> u32 {
        self.stack_count
    }

    /// Remaining fraction (0-1) for duration bars
    pub fn progress(&self) -> f32 {
        if self.max_duration > 0.0 {
            (self.remaining / self.max_duration).max(0.0)
        } else {
            0.0
        }
    }

    pub fn snapshot(&self) -> EffectSnapshot {
        EffectSnapshot {
            kind: self.kind(),
            name: self.kind().name(),
            remaining: self.remaining,
            max_duration: self.max_duration,
            progress: self.progress(),
            stacks: self.stack_count,
        }
    }
}

/// Read-only view of an active effect, for status icons
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectSnapshot {
    pub kind: StatusEffectType,
    pub name: &'static str,
    pub remaining: f32,
    pub max_duration: f32,
    pub progress: f32,
    pub stacks: u32,
}
