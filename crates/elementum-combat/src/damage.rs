//! Hit resolution
//!
//! Combines base damage, the elemental multiplier and the status-effect roll
//! into a single operation. Health is changed by the target, not here.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::element::Element;
use crate::status::{StatusEffect, StatusEffectType, StatusRegistry};

/// Status effect a hit may apply
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectDescriptor {
    pub kind: StatusEffectType,
    /// Application chance in percent (0-100)
    pub chance: f32,
    /// Duration in seconds
    pub duration: f32,
    /// DPS for Burn/Poison, speed multiplier for Slow, unused for Freeze
    pub strength: f32,
}

impl EffectDescriptor {
    pub fn new(kind: StatusEffectType, chance: f32, duration: f32, strength: f32) -> Self {
        Self {
            kind,
            chance,
            duration,
            strength,
        }
    }

    /// Build the matching effect variant. Kinds without behavior yield `None`.
    pub fn instantiate(&self) -> Option<StatusEffect> {
        match self.kind {
            StatusEffectType::Burn => Some(StatusEffect::burn(self.strength, self.duration)),
            StatusEffectType::Freeze => Some(StatusEffect::freeze(self.duration)),
            StatusEffectType::Slow => Some(StatusEffect::slow(self.strength, self.duration)),
            StatusEffectType::Poison => Some(StatusEffect::poison(self.strength, self.duration)),
            _ => None,
        }
    }
}

/// Rounding policy for resolved damage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DamagePolicy {
    /// Lowest damage a hit may deal after rounding. `None` delivers zero or
    /// negative damage as-is.
    pub minimum_damage: Option<i32>,
}

impl DamagePolicy {
    pub fn apply(&self, damage: i32) -> i32 {
        match self.minimum_damage {
            Some(floor) => damage.max(floor),
            None => damage,
        }
    }
}

/// Result of resolving one hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitOutcome {
    /// Final damage to deliver to the target
    pub damage: i32,
    /// Elemental multiplier that was applied
    pub multiplier: f32,
    /// Effect submitted to the target's registry, if the roll succeeded
    pub applied: Option<StatusEffectType>,
}

/// Resolves hits against a target's element and status registry.
///
/// Owns a seedable RNG so simulations are reproducible.
#[derive(Debug, Clone)]
pub struct DamageResolver {
    policy: DamagePolicy,
    rng: StdRng,
    hits_resolved: u64,
}

impl DamageResolver {
    pub fn new(policy: DamagePolicy) -> Self {
        Self::from_rng(policy, StdRng::from_entropy())
    }

    pub fn with_seed(policy: DamagePolicy, seed: u64) -> Self {
        Self::from_rng(policy, StdRng::seed_from_u64(seed))
    }

    fn from_rng(policy: DamagePolicy, rng: StdRng) -> Self {
        Self {
            policy,
            rng,
            hits_resolved: 0,
        }
    }

    pub fn policy(&self) -> &DamagePolicy {
        &self.policy
    }

    /// Number of hits resolved since creation
    pub fn hits_resolved(&self) -> u64 {
        self.hits_resolved
    }

    /// Resolve one hit.
    ///
    /// `chance_scale` scales the effect's chance (1.0 for direct hits, lower
    /// for splash).
    pub fn resolve_hit(
        &mut self,
        attacker: Element,
        defender: Element,
        base_damage: f32,
        effect: Option<&EffectDescriptor>,
        chance_scale: f32,
        registry: &mut StatusRegistry,
    ) -> HitOutcome {
        self.hits_resolved += 1;

        // Element multiplier
        let multiplier = attacker.multiplier_against(defender);

        // Round half to even, then floor per policy
        let damage = self.policy.apply((base_damage * multiplier).round_ties_even() as i32);

        // Status roll
        let applied =
            effect.and_then(|descriptor| self.roll_effect(descriptor, chance_scale, registry));

        debug!(
            "{} -> {}: {:.1} x{} = {}{}",
            attacker.name(),
            defender.name(),
            base_damage,
            multiplier,
            damage,
            applied.map(|kind| format!(" +{}", kind.name())).unwrap_or_default()
        );

        HitOutcome {
            damage,
            multiplier,
            applied,
        }
    }

    fn roll_effect(
        &mut self,
        descriptor: &EffectDescriptor,
        chance_scale: f32,
        registry: &mut StatusRegistry,
    ) -> Option<StatusEffectType> {
        if descriptor.chance <= 0.0 {
            return None;
        }

        let roll: f32 = self.rng.gen_range(0.0..=100.0);
        if roll > descriptor.chance * chance_scale {
            return None;
        }

        let Some(effect) = descriptor.instantiate() else {
            debug!("{} has no behavior, skipped", descriptor.kind.name());
            return None;
        };

        registry.apply(effect);
        Some(descriptor.kind)
    }
}

impl Default for DamageResolver {
    fn default() -> Self {
        Self::new(DamagePolicy::default())
    }
}
