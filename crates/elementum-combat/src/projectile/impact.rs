//! Impact policies: what a projectile does when it lands

use elementum_ecs::{Arena, Entity};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::HitPayload;
use crate::damage::{DamageResolver, HitOutcome};
use crate::enemy::{DamageTaken, Enemy, IncomingHit};
use crate::zone::{AoeZone, ZoneConfig};

/// Radial damage around the impact point with linear falloff
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Explosion {
    pub radius: f32,
    pub damage_multiplier: f32,
    /// Scale applied to the status chance of every victim
    pub chance_scale: f32,
    /// Whether the primary target takes falloff damage like everyone else.
    /// When false it takes full damage and is skipped by the splash.
    pub include_primary: bool,
}

impl Explosion {
    /// Rocket-style blast: full hit on the primary, splash on the rest
    pub fn splash() -> Self {
        Self {
            radius: 3.0,
            damage_multiplier: 0.7,
            chance_scale: 0.5,
            include_primary: false,
        }
    }

    /// Reduced blast on landing before a zone spawns
    pub fn landing() -> Self {
        Self {
            radius: 2.0,
            damage_multiplier: 0.5,
            chance_scale: 0.3,
            include_primary: true,
        }
    }

    /// Linear falloff: 1 at the center, 0 at the edge
    pub fn falloff(&self, distance: f32) -> f32 {
        if self.radius <= 0.0 {
            return 0.0;
        }
        (1.0 - distance / self.radius).clamp(0.0, 1.0)
    }
}

/// What happens when a projectile impacts
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Impact {
    /// Damage and status roll on the primary target only
    #[default]
    Single,
    Explosion(Explosion),
    /// Optional landing blast, then a persistent zone
    Zone {
        explosion: Option<Explosion>,
        zone: ZoneConfig,
    },
}

impl Impact {
    pub fn splash() -> Self {
        Self::Explosion(Explosion::splash())
    }

    pub fn zone() -> Self {
        Self::Zone {
            explosion: Some(Explosion::landing()),
            zone: ZoneConfig::default(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Explosion(_) => "explosion",
            Self::Zone { .. } => "zone",
        }
    }

    /// Whether impact happens at the ground beneath the landing point
    pub fn lands_on_ground(&self) -> bool {
        matches!(self, Self::Zone { .. })
    }

    /// Apply this impact at `point`. `primary` is the enemy that triggered it.
    pub fn resolve(
        &self,
        point: Vec3,
        primary: Option<Entity>,
        payload: &HitPayload,
        enemies: &mut Arena<Enemy>,
        resolver: &mut DamageResolver,
    ) -> ImpactReport {
        let mut report = ImpactReport::default();

        match self {
            Self::Single => {
                let hit = IncomingHit::new(payload.element, payload.damage)
                    .with_effect(payload.effect.as_ref(), 1.0)
                    .from_attacker(payload.attacker);
                if let Some(record) = hit_primary(primary, &hit, enemies, resolver) {
                    report.hits.push(record);
                }
            }
            Self::Explosion(explosion) => {
                explode(explosion, point, primary, payload, enemies, resolver, &mut report);
            }
            Self::Zone { explosion, zone } => {
                let ground = Vec3::new(point.x, 0.0, point.z);
                if let Some(explosion) = explosion {
                    explode(explosion, ground, primary, payload, enemies, resolver, &mut report);
                }
                report.zone = Some(AoeZone::new(
                    ground,
                    *zone,
                    payload.element,
                    payload.effect,
                    payload.attacker,
                ));
            }
        }

        report
    }
}

/// One enemy hit during an impact
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitRecord {
    pub enemy: Entity,
    pub outcome: HitOutcome,
    pub taken: DamageTaken,
    /// Area damage rather than a direct hit
    pub splash: bool,
}

/// Everything an impact produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImpactReport {
    pub hits: Vec<HitRecord>,
    pub zone: Option<AoeZone>,
}

impl ImpactReport {
    pub fn total_damage(&self) -> i32 {
        self.hits.iter().map(|hit| hit.taken.dealt).sum()
    }

    pub fn kills(&self) -> usize {
        self.hits.iter().filter(|hit| hit.taken.killed).count()
    }
}

fn hit_primary(
    primary: Option<Entity>,
    hit: &IncomingHit<'_>,
    enemies: &mut Arena<Enemy>,
    resolver: &mut DamageResolver,
) -> Option<HitRecord> {
    let entity = primary?;
    let enemy = enemies.get_mut(entity).filter(|enemy| enemy.is_alive())?;
    let (outcome, taken) = enemy.receive_hit(resolver, hit);
    Some(HitRecord {
        enemy: entity,
        outcome,
        taken,
        splash: false,
    })
}

fn explode(
    explosion: &Explosion,
    center: Vec3,
    primary: Option<Entity>,
    payload: &HitPayload,
    enemies: &mut Arena<Enemy>,
    resolver: &mut DamageResolver,
    report: &mut ImpactReport,
) {
    if !explosion.include_primary {
        // Full damage, no status roll
        let hit = IncomingHit::new(payload.element, payload.damage).from_attacker(payload.attacker);
        if let Some(record) = hit_primary(primary, &hit, enemies, resolver) {
            report.hits.push(record);
        }
    }

    let mut splashed = 0;
    for (entity, enemy) in enemies.iter_mut() {
        if !explosion.include_primary && Some(entity) == primary {
            continue;
        }
        if !enemy.is_alive() {
            continue;
        }

        let distance = center.distance(enemy.center());
        if distance > explosion.radius {
            continue;
        }

        // Splash damage is whole before the element multiplier applies
        let scale = explosion.damage_multiplier * explosion.falloff(distance);
        let damage = (payload.damage * scale).round_ties_even();
        if damage <= 0.0 {
            continue;
        }

        let hit = IncomingHit::new(payload.element, damage)
            .with_effect(payload.effect.as_ref(), explosion.chance_scale)
            .from_attacker(payload.attacker);
        let (outcome, taken) = enemy.receive_hit(resolver, &hit);
        report.hits.push(HitRecord {
            enemy: entity,
            outcome,
            taken,
            splash: true,
        });
        splashed += 1;
    }

    debug!(
        "{} explosion hit {} enemies in {}m",
        payload.element.name(),
        splashed,
        explosion.radius
    );
}
