//! Persistent area-of-effect zones
//!
//! A zone is left behind by a projectile impact and ticks on its own until
//! its duration runs out.

use elementum_ecs::{Arena, Entity};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::damage::{DamageResolver, EffectDescriptor};
use crate::element::Element;
use crate::enemy::{Enemy, IncomingHit};
use crate::projectile::HitRecord;
use crate::status::StatusEffect;

/// Shape and strength of a zone
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneConfig {
    pub radius: f32,
    /// Seconds before the zone disappears
    pub duration: f32,
    /// Seconds between damage pulses
    pub tick_interval: f32,
    pub damage_per_tick: f32,
    /// Speed multiplier applied to enemies inside, refreshed each pulse
    pub slow: Option<f32>,
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            radius: 4.0,
            duration: 5.0,
            tick_interval: 0.5,
            damage_per_tick: 5.0,
            slow: None,
        }
    }
}

/// What a zone did this tick
#[derive(Debug, Clone, PartialEq)]
pub enum ZoneTick {
    Idle,
    Pulsed(Vec<HitRecord>),
    Expired,
}

/// A damaging area on the ground
#[derive(Debug, Clone, PartialEq)]
pub struct AoeZone {
    position: Vec3,
    config: ZoneConfig,
    element: Element,
    effect: Option<EffectDescriptor>,
    attacker: Option<Entity>,
    lifetime: f32,
    tick_timer: f32,
}

impl AoeZone {
    pub fn new(
        position: Vec3,
        config: ZoneConfig,
        element: Element,
        effect: Option<EffectDescriptor>,
        attacker: Option<Entity>,
    ) -> Self {
        debug!(
            "{} zone at {:?} (r={}, {}s)",
            element.name(),
            position,
            config.radius,
            config.duration
        );
        Self {
            position,
            config,
            element,
            effect,
            attacker,
            lifetime: 0.0,
            tick_timer: 0.0,
        }
    }

    /// Advance the zone. Once its duration has elapsed it reports `Expired`
    /// without pulsing.
    pub fn tick(
        &mut self,
        delta: f32,
        enemies: &mut Arena<Enemy>,
        resolver: &mut DamageResolver,
    ) -> ZoneTick {
        self.lifetime += delta;
        self.tick_timer += delta;

        if self.is_expired() {
            return ZoneTick::Expired;
        }

        if self.tick_timer < self.config.tick_interval {
            return ZoneTick::Idle;
        }
        self.tick_timer = 0.0;

        ZoneTick::Pulsed(self.pulse(enemies, resolver))
    }

    fn pulse(&self, enemies: &mut Arena<Enemy>, resolver: &mut DamageResolver) -> Vec<HitRecord> {
        let hit = IncomingHit::new(self.element, self.config.damage_per_tick.round_ties_even())
            .with_effect(self.effect.as_ref(), 1.0)
            .from_attacker(self.attacker);

        let mut records = Vec::new();
        for (entity, enemy) in enemies.iter_mut() {
            if !enemy.is_alive() || !self.contains(enemy.position()) {
                continue;
            }

            let (outcome, taken) = enemy.receive_hit(resolver, &hit);
            if let Some(amount) = self.config.slow {
                enemy
                    .status
                    .apply(StatusEffect::slow(amount, self.config.tick_interval + 0.1));
            }
            records.push(HitRecord {
                enemy: entity,
                outcome,
                taken,
                splash: true,
            });
        }

        if !records.is_empty() {
            debug!("{} zone pulsed {} enemies", self.element.name(), records.len());
        }
        records
    }

    /// Whether a point lies inside the zone
    pub fn contains(&self, point: Vec3) -> bool {
        self.position.distance(point) <= self.config.radius
    }

    pub fn is_expired(&self) -> bool {
        self.lifetime >= self.config.duration
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn config(&self) -> &ZoneConfig {
        &self.config
    }

    pub fn element(&self) -> Element {
        self.element
    }

    /// Remaining fraction (0-1) of the zone's duration
    pub fn remaining_fraction(&self) -> f32 {
        if self.config.duration > 0.0 {
            (1.0 - self.lifetime / self.config.duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}
