//! Turrets: target acquisition, fire cadence and lead prediction

use elementum_ecs::{Arena, Entity};
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::damage::EffectDescriptor;
use crate::element::Element;
use crate::enemy::Enemy;

/// Projectile speed assumed for lead prediction, before the multiplier
pub const BASE_PROJECTILE_SPEED: f32 = 15.0;
/// Targets slower than this are aimed at directly
pub const MIN_LEAD_SPEED: f32 = 0.1;

/// Aim point leading a moving target by the projectile's travel time
pub fn predict_aim_point(
    shooter: Vec3,
    target_position: Vec3,
    target_velocity: Vec3,
    projectile_speed: f32,
) -> Vec3 {
    if target_velocity.length() <= MIN_LEAD_SPEED || projectile_speed <= 0.0 {
        return target_position;
    }
    let time_to_reach = shooter.distance(target_position) / projectile_speed;
    target_position + target_velocity * time_to_reach
}

/// Turret combat statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurretStats {
    pub name: String,
    pub damage: f32,
    /// Shots per second
    pub fire_rate: f32,
    pub range: f32,
    pub element: Element,
    pub effect: Option<EffectDescriptor>,
    /// Projectile template to fire; `None` hits instantly
    pub projectile: Option<String>,
    pub projectile_speed_multiplier: f32,
    /// Muzzle offset from the turret position
    pub spawn_offset: Vec3,
}

impl Default for TurretStats {
    fn default() -> Self {
        Self {
            name: "Turret".to_string(),
            damage: 10.0,
            fire_rate: 1.0,
            range: 8.0,
            element: Element::None,
            effect: None,
            projectile: None,
            projectile_speed_multiplier: 1.0,
            spawn_offset: Vec3::new(0.0, 1.0, 0.0),
        }
    }
}

impl TurretStats {
    /// Seconds between shots
    pub fn cooldown(&self) -> f32 {
        if self.fire_rate > 0.0 {
            1.0 / self.fire_rate
        } else {
            f32::INFINITY
        }
    }

    /// Speed assumed when leading targets
    pub fn lead_speed(&self) -> f32 {
        if self.projectile_speed_multiplier > 0.0 {
            BASE_PROJECTILE_SPEED * self.projectile_speed_multiplier
        } else {
            BASE_PROJECTILE_SPEED
        }
    }
}

/// A request to fire, produced when the cooldown elapses with a target held
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FireOrder {
    pub target: Entity,
    /// Where the shot spawns
    pub muzzle: Vec3,
    /// Where the shot is aimed, leading the target
    pub aim_point: Vec3,
}

/// A stationary attacker
#[derive(Debug, Clone, PartialEq)]
pub struct Turret {
    pub position: Vec3,
    pub stats: TurretStats,
    cooldown: f32,
    current_target: Option<Entity>,
    shots_fired: u64,
}

impl Turret {
    pub fn new(position: Vec3, stats: TurretStats) -> Self {
        Self {
            position,
            stats,
            cooldown: 0.0,
            current_target: None,
            shots_fired: 0,
        }
    }

    pub fn muzzle(&self) -> Vec3 {
        self.position + self.stats.spawn_offset
    }

    pub fn in_range(&self, enemy: &Enemy) -> bool {
        enemy.is_alive() && self.position.distance(enemy.position()) <= self.stats.range
    }

    /// Keep the current target while it lives and stays in range, else pick
    /// the nearest enemy in range.
    pub fn acquire_target(&mut self, enemies: &Arena<Enemy>) -> Option<Entity> {
        let keep = self
            .current_target
            .and_then(|target| enemies.get(target))
            .is_some_and(|enemy| self.in_range(enemy));

        if !keep {
            self.current_target = enemies
                .iter()
                .filter(|(_, enemy)| self.in_range(enemy))
                .min_by(|(_, a), (_, b)| {
                    let da = self.position.distance_squared(a.position());
                    let db = self.position.distance_squared(b.position());
                    da.total_cmp(&db)
                })
                .map(|(entity, _)| entity);
        }

        self.current_target
    }

    /// Count down, track a target and fire when ready
    pub fn tick(&mut self, delta: f32, enemies: &Arena<Enemy>) -> Option<FireOrder> {
        self.cooldown -= delta;

        let target = self.acquire_target(enemies)?;
        if self.cooldown > 0.0 {
            return None;
        }
        let enemy = enemies.get(target)?;

        self.cooldown = self.stats.cooldown();
        self.shots_fired += 1;

        let muzzle = self.muzzle();
        let aim_point = if self.stats.projectile.is_some() {
            predict_aim_point(muzzle, enemy.center(), enemy.velocity(), self.stats.lead_speed())
        } else {
            enemy.center()
        };

        Some(FireOrder {
            target,
            muzzle,
            aim_point,
        })
    }

    pub fn current_target(&self) -> Option<Entity> {
        self.current_target
    }

    pub fn cooldown_remaining(&self) -> f32 {
        self.cooldown.max(0.0)
    }

    pub fn shots_fired(&self) -> u64 {
        self.shots_fired
    }
}
