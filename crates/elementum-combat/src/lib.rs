//! Elementum Combat - Elemental tower-defense combat core
//!
//! Provides the element matchup table, status effects, damage resolution,
//! projectile flight and impact behaviors, projectile pooling, and a
//! `Battlefield` that drives turrets, enemies and zones with explicit ticks.

pub mod battlefield;
pub mod config;
pub mod damage;
pub mod element;
pub mod enemy;
pub mod projectile;
pub mod stats;
pub mod status;
pub mod turret;
pub mod zone;

pub use battlefield::{Battlefield, CombatEvent, DamageSource};
pub use config::{CombatConfig, ConfigError};
pub use damage::{DamagePolicy, DamageResolver, EffectDescriptor, HitOutcome};
pub use element::{log_matchup_table, Element};
pub use enemy::{DamageTaken, Enemy, EnemyTick, Health, IncomingHit, PathMover};
pub use projectile::{
    Flight, HitPayload, Impact, PoolConfig, Projectile, ProjectileArsenal, ProjectileHandle,
    ProjectilePool, ProjectileStep, ProjectileTemplate,
};
pub use stats::ProjectileStats;
pub use status::{
    DotTick, SpeedControl, StatusEffect, StatusEffectType, StatusEvent, StatusRegistry, StatusTick,
};
pub use turret::{FireOrder, Turret, TurretStats};
pub use zone::{AoeZone, ZoneConfig, ZoneTick};
