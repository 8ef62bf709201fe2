//! Single-threaded combat driver
//!
//! Owns enemies, turrets, projectile pools and zones, and advances them in a
//! fixed order each tick:
//! enemies (status, then movement) -> turrets -> projectiles -> zones -> cleanup.

use elementum_core::Transform;
use elementum_ecs::{Arena, Entity};
use glam::Vec3;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{CombatConfig, ConfigError};
use crate::damage::DamageResolver;
use crate::element::Element;
use crate::enemy::{Enemy, IncomingHit};
use crate::projectile::{
    HitPayload, HitRecord, Impact, PoolOccupancy, ProjectileArsenal, ProjectileHandle,
    ProjectileStep, TargetInfo,
};
use crate::stats::ProjectileStats;
use crate::status::StatusEffectType;
use crate::turret::{FireOrder, Turret};
use crate::zone::{AoeZone, ZoneTick};

/// Stats key for turrets without a projectile template
pub const INSTANT_SHOT: &str = "instant";

/// How damage reached its target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DamageSource {
    Direct,
    Splash,
    Zone,
    OverTime(StatusEffectType),
}

/// Notifications for observers (damage numbers, kill feeds, HUDs)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CombatEvent {
    Damage {
        enemy: Entity,
        amount: i32,
        element: Element,
        source: DamageSource,
    },
    StatusApplied {
        enemy: Entity,
        kind: StatusEffectType,
    },
    Killed {
        enemy: Entity,
        killer: Option<Entity>,
        gold: u32,
    },
    Leaked {
        enemy: Entity,
        damage: i32,
    },
    ProjectileExpired {
        template: String,
    },
    ZoneSpawned {
        position: Vec3,
        element: Element,
    },
    ZoneExpired {
        position: Vec3,
    },
}

struct PendingImpact {
    template: String,
    impact: Impact,
    point: Vec3,
    primary: Option<Entity>,
    payload: HitPayload,
}

/// The combat simulation
pub struct Battlefield {
    config: CombatConfig,
    enemies: Arena<Enemy>,
    turrets: Arena<Turret>,
    arsenal: ProjectileArsenal,
    zones: Vec<AoeZone>,
    resolver: DamageResolver,
    stats: ProjectileStats,
    events: Vec<CombatEvent>,
    gold_earned: u64,
    base_damage_taken: i64,
    enemies_killed: u32,
    enemies_leaked: u32,
    elapsed: f64,
}

impl Battlefield {
    pub fn new(config: CombatConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let resolver = match config.seed {
            Some(seed) => DamageResolver::with_seed(config.damage, seed),
            None => DamageResolver::new(config.damage),
        };

        let mut arsenal = ProjectileArsenal::new(config.pool);
        for template in &config.projectiles {
            arsenal.register(template.clone());
        }

        info!(
            "Battlefield ready: {} projectile templates, pool {}..{}",
            config.projectiles.len(),
            config.pool.initial_size,
            config.pool.max_size
        );

        Ok(Self {
            config,
            enemies: Arena::new(),
            turrets: Arena::new(),
            arsenal,
            zones: Vec::new(),
            resolver,
            stats: ProjectileStats::new(),
            events: Vec::new(),
            gold_earned: 0,
            base_damage_taken: 0,
            enemies_killed: 0,
            enemies_leaked: 0,
            elapsed: 0.0,
        })
    }

    pub fn spawn_enemy(&mut self, enemy: Enemy) -> Entity {
        debug!("Spawning {} ({})", enemy.name, enemy.element.name());
        self.enemies.insert(enemy)
    }

    /// Add a turret. Invalid stats are logged; the turret is still placed.
    pub fn add_turret(&mut self, turret: Turret) -> Entity {
        if let Err(err) = self.config.validate_turret(&turret.stats) {
            warn!("{}", err);
        }
        debug!("Placing {} at {:?}", turret.stats.name, turret.position);
        self.turrets.insert(turret)
    }

    pub fn remove_turret(&mut self, handle: Entity) -> Option<Turret> {
        self.turrets.remove(handle)
    }

    pub fn enemy(&self, handle: Entity) -> Option<&Enemy> {
        self.enemies.get(handle)
    }

    pub fn enemy_mut(&mut self, handle: Entity) -> Option<&mut Enemy> {
        self.enemies.get_mut(handle)
    }

    /// Whether the handle names an enemy that is still alive
    pub fn is_alive(&self, handle: Entity) -> bool {
        self.enemies.get(handle).is_some_and(Enemy::is_alive)
    }

    pub fn enemies(&self) -> &Arena<Enemy> {
        &self.enemies
    }

    pub fn turret(&self, handle: Entity) -> Option<&Turret> {
        self.turrets.get(handle)
    }

    pub fn turrets(&self) -> &Arena<Turret> {
        &self.turrets
    }

    pub fn zones(&self) -> &[AoeZone] {
        &self.zones
    }

    pub fn arsenal(&self) -> &ProjectileArsenal {
        &self.arsenal
    }

    pub fn resolver(&self) -> &DamageResolver {
        &self.resolver
    }

    pub fn stats(&self) -> &ProjectileStats {
        &self.stats
    }

    pub fn stats_mut(&mut self) -> &mut ProjectileStats {
        &mut self.stats
    }

    /// Occupancy of every pool, by template name
    pub fn pool_occupancy(&self) -> Vec<PoolOccupancy> {
        self.arsenal.pools().map(|(_, pool)| pool.occupancy()).collect()
    }

    pub fn gold_earned(&self) -> u64 {
        self.gold_earned
    }

    pub fn base_damage_taken(&self) -> i64 {
        self.base_damage_taken
    }

    pub fn enemies_killed(&self) -> u32 {
        self.enemies_killed
    }

    pub fn enemies_leaked(&self) -> u32 {
        self.enemies_leaked
    }

    /// Simulated seconds
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// True when no enemies, projectiles or zones remain
    pub fn is_quiet(&self) -> bool {
        self.enemies.is_empty() && self.arsenal.active_count() == 0 && self.zones.is_empty()
    }

    /// Take all events recorded since the last drain
    pub fn drain_events(&mut self) -> Vec<CombatEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn tick(&mut self, delta: f32) {
        self.elapsed += f64::from(delta);

        let leaked = self.tick_enemies(delta);
        self.tick_turrets(delta);
        self.tick_projectiles(delta);
        self.tick_zones(delta);
        self.cleanup(&leaked);
    }

    fn tick_enemies(&mut self, delta: f32) -> Vec<Entity> {
        let mut leaked = Vec::new();
        let mut kills = Vec::new();

        for (entity, enemy) in self.enemies.iter_mut() {
            if !enemy.is_alive() {
                continue;
            }

            let tick = enemy.tick(delta);
            for (dot, taken) in &tick.dot_damage {
                self.stats.record_damage(taken.dealt);
                self.events.push(CombatEvent::Damage {
                    enemy: entity,
                    amount: taken.dealt,
                    element: dot.element,
                    source: DamageSource::OverTime(dot.kind),
                });
                if taken.killed {
                    kills.push(entity);
                }
            }
            if tick.reached_end {
                leaked.push(entity);
            }
        }

        for entity in kills {
            self.on_kill(entity);
        }
        leaked
    }

    fn tick_turrets(&mut self, delta: f32) {
        let mut orders = Vec::new();
        for (handle, turret) in self.turrets.iter_mut() {
            if let Some(order) = turret.tick(delta, &self.enemies) {
                orders.push((handle, order));
            }
        }

        for (handle, order) in orders {
            self.fire(handle, order);
        }
    }

    fn fire(&mut self, turret_handle: Entity, order: FireOrder) {
        let Some(turret) = self.turrets.get(turret_handle) else {
            return;
        };
        let stats = &turret.stats;
        let payload = HitPayload {
            damage: stats.damage,
            element: stats.element,
            effect: stats.effect,
            attacker: Some(turret_handle),
        };

        let speed_multiplier = stats.projectile_speed_multiplier;
        let Some(template) = stats.projectile.clone() else {
            self.fire_instant(order.target, &payload);
            return;
        };

        let mut muzzle = Transform::from_position(order.muzzle);
        muzzle.look_at(order.aim_point);
        let recycled_before = self.recycled_count(&template);
        let Some(handle) = self.arsenal.spawn(&template, muzzle.position, muzzle.rotation) else {
            return;
        };
        if self.recycled_count(&template) > recycled_before {
            // The reclaimed shot never resolves
            self.stats.record_recycled();
        }
        self.launch(&template, handle, payload, order, speed_multiplier);
        self.stats.record_shot(&template);
    }

    fn recycled_count(&self, template: &str) -> u64 {
        self.arsenal
            .pool(template)
            .map_or(0, |pool| pool.recycled_count())
    }

    fn launch(
        &mut self,
        template: &str,
        handle: ProjectileHandle,
        payload: HitPayload,
        order: FireOrder,
        speed_multiplier: f32,
    ) {
        let Some(projectile) = self
            .arsenal
            .pool_mut(template)
            .and_then(|pool| pool.get_mut(handle))
        else {
            return;
        };
        if speed_multiplier > 0.0 {
            projectile.speed *= speed_multiplier;
        }
        projectile.launch(payload, Some(order.target), Some(order.aim_point));
    }

    fn fire_instant(&mut self, target: Entity, payload: &HitPayload) {
        let Some(enemy) = self.enemies.get_mut(target).filter(|enemy| enemy.is_alive()) else {
            return;
        };

        let hit = IncomingHit::new(payload.element, payload.damage)
            .with_effect(payload.effect.as_ref(), 1.0)
            .from_attacker(payload.attacker);
        let (outcome, taken) = enemy.receive_hit(&mut self.resolver, &hit);

        self.stats.record_shot(INSTANT_SHOT);
        self.stats.record_hit(INSTANT_SHOT);
        let record = HitRecord {
            enemy: target,
            outcome,
            taken,
            splash: false,
        };
        self.record_hit(&record, payload.element, DamageSource::Direct);
    }

    fn tick_projectiles(&mut self, delta: f32) {
        let targets: Vec<TargetInfo> = self
            .enemies
            .iter()
            .filter(|(_, enemy)| enemy.is_alive())
            .map(|(entity, enemy)| TargetInfo {
                entity,
                center: enemy.center(),
                radius: enemy.hit_radius,
            })
            .collect();

        let mut impacts = Vec::new();
        let mut expired = Vec::new();

        for (name, pool) in self.arsenal.pools_mut() {
            for handle in pool.active_handles() {
                let Some(projectile) = pool.get_mut(handle) else {
                    continue;
                };

                match projectile.tick(delta, &targets) {
                    ProjectileStep::Impacted { point, primary } => {
                        impacts.push(PendingImpact {
                            template: name.to_string(),
                            impact: projectile.impact,
                            point,
                            primary,
                            payload: projectile.payload,
                        });
                        pool.release(handle);
                    }
                    ProjectileStep::Expired => {
                        expired.push(name.to_string());
                        pool.release(handle);
                    }
                    ProjectileStep::Flying | ProjectileStep::Idle => {}
                }
            }
        }

        for template in expired {
            self.stats.record_miss();
            self.events.push(CombatEvent::ProjectileExpired { template });
        }

        for pending in impacts {
            self.apply_impact(pending);
        }
    }

    fn apply_impact(&mut self, pending: PendingImpact) {
        let report = pending.impact.resolve(
            pending.point,
            pending.primary,
            &pending.payload,
            &mut self.enemies,
            &mut self.resolver,
        );

        if !report.hits.is_empty() {
            self.stats.record_hit(&pending.template);
        }

        for record in &report.hits {
            let source = if record.splash {
                DamageSource::Splash
            } else {
                DamageSource::Direct
            };
            self.record_hit(record, pending.payload.element, source);
        }

        if let Some(zone) = report.zone {
            self.events.push(CombatEvent::ZoneSpawned {
                position: zone.position(),
                element: zone.element(),
            });
            self.zones.push(zone);
        }
    }

    fn tick_zones(&mut self, delta: f32) {
        let zones = std::mem::take(&mut self.zones);
        let mut active = Vec::with_capacity(zones.len());

        for mut zone in zones {
            match zone.tick(delta, &mut self.enemies, &mut self.resolver) {
                ZoneTick::Idle => active.push(zone),
                ZoneTick::Pulsed(records) => {
                    for record in &records {
                        self.record_hit(record, zone.element(), DamageSource::Zone);
                    }
                    active.push(zone);
                }
                ZoneTick::Expired => {
                    debug!("Zone at {:?} expired", zone.position());
                    self.events.push(CombatEvent::ZoneExpired {
                        position: zone.position(),
                    });
                }
            }
        }

        self.zones = active;
    }

    fn record_hit(&mut self, record: &HitRecord, element: Element, source: DamageSource) {
        self.stats.record_damage(record.taken.dealt);
        if record.splash {
            self.stats.record_aoe_hit();
        }

        self.events.push(CombatEvent::Damage {
            enemy: record.enemy,
            amount: record.taken.dealt,
            element,
            source,
        });
        if let Some(kind) = record.outcome.applied {
            self.events.push(CombatEvent::StatusApplied {
                enemy: record.enemy,
                kind,
            });
        }
        if record.taken.killed {
            self.on_kill(record.enemy);
        }
    }

    fn on_kill(&mut self, entity: Entity) {
        let Some(enemy) = self.enemies.get(entity) else {
            return;
        };

        let killer = enemy.health.killer();
        let gold = if killer.is_some() {
            enemy.health.gold_reward()
        } else {
            0
        };
        info!("{} killed (+{} gold)", enemy.name, gold);

        self.gold_earned += u64::from(gold);
        self.enemies_killed += 1;
        self.stats.record_kill();
        self.events.push(CombatEvent::Killed {
            enemy: entity,
            killer,
            gold,
        });
    }

    fn cleanup(&mut self, leaked: &[Entity]) {
        for &entity in leaked {
            let Some(enemy) = self.enemies.get(entity) else {
                continue;
            };
            if !enemy.is_alive() {
                continue;
            }
            let damage = enemy.base_damage;
            info!("{} reached the base, dealing {} damage", enemy.name, damage);
            self.base_damage_taken += i64::from(damage);
            self.enemies_leaked += 1;
            self.events.push(CombatEvent::Leaked {
                enemy: entity,
                damage,
            });
            self.enemies.remove(entity);
        }

        let dead: Vec<Entity> = self
            .enemies
            .iter()
            .filter(|(_, enemy)| !enemy.is_alive())
            .map(|(entity, _)| entity)
            .collect();
        for entity in dead {
            self.enemies.remove(entity);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::damage::{DamagePolicy, EffectDescriptor};
    use crate::enemy::{Health, PathMover};
    use crate::projectile::{PoolConfig, ProjectileTemplate};
    use crate::turret::TurretStats;

    fn config(projectiles: Vec<ProjectileTemplate>) -> CombatConfig {
        CombatConfig {
            seed: Some(1),
            damage: DamagePolicy::default(),
            pool: PoolConfig {
                initial_size: 2,
                max_size: 4,
            },
            projectiles,
        }
    }

    fn dummy(position: Vec3, hp: i32) -> Enemy {
        let far = position + Vec3::new(0.0, 0.0, 100.0);
        let mover = PathMover::new(position, vec![far], 0.0);
        Enemy::new("dummy", Element::None, Health::new(hp, 3), mover)
    }

    fn turret(projectile: Option<&str>, damage: f32) -> Turret {
        Turret::new(
            Vec3::ZERO,
            TurretStats {
                damage,
                projectile: projectile.map(str::to_string),
                spawn_offset: Vec3::new(0.0, 0.5, 0.0),
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_instant_turret_kills_and_earns_gold() {
        let mut field = Battlefield::new(config(Vec::new())).unwrap();
        let enemy = field.spawn_enemy(dummy(Vec3::new(3.0, 0.0, 0.0), 10));
        let tower = field.add_turret(turret(None, 10.0));

        field.tick(0.1);
        assert!(!field.is_alive(enemy));
        assert!(field.enemy(enemy).is_none());
        assert_eq!(field.gold_earned(), 3);
        assert_eq!(field.enemies_killed(), 1);

        let events = field.drain_events();
        assert!(events.contains(&CombatEvent::Killed {
            enemy,
            killer: Some(tower),
            gold: 3
        }));
        assert_eq!(field.stats().type_accuracy(INSTANT_SHOT), 100.0);
    }

    #[test]
    fn test_projectile_travels_then_hits() {
        let bullets = config(vec![ProjectileTemplate::straight("bullet")]);
        let mut field = Battlefield::new(bullets).unwrap();
        let enemy = field.spawn_enemy(dummy(Vec3::new(5.0, 0.0, 0.0), 100));
        field.add_turret(turret(Some("bullet"), 10.0));

        field.tick(0.1);
        assert_eq!(field.arsenal().active_count(), 1);
        assert_eq!(field.enemy(enemy).unwrap().health.current(), 100);

        for _ in 0..5 {
            field.tick(0.1);
        }
        assert_eq!(field.enemy(enemy).unwrap().health.current(), 90);
        assert_eq!(field.stats().hits, 1);
        assert_eq!(field.resolver().hits_resolved(), 1);
    }

    #[test]
    fn test_expired_projectile_never_resolves() {
        let short_lived = ProjectileTemplate {
            lifetime: 0.1,
            ..ProjectileTemplate::straight("dart")
        };
        let mut field = Battlefield::new(config(vec![short_lived])).unwrap();
        field.spawn_enemy(dummy(Vec3::new(6.0, 0.0, 0.0), 100));
        let stats = TurretStats {
            projectile: Some("dart".to_string()),
            fire_rate: 0.5,
            ..Default::default()
        };
        field.add_turret(Turret::new(Vec3::ZERO, stats));

        for _ in 0..4 {
            field.tick(0.05);
        }
        assert_eq!(field.resolver().hits_resolved(), 0);
        assert_eq!(field.stats().misses, 1);
        assert_eq!(field.arsenal().active_count(), 0);
        assert!(field
            .drain_events()
            .contains(&CombatEvent::ProjectileExpired {
                template: "dart".to_string()
            }));
    }

    #[test]
    fn test_unknown_projectile_skips_shot() {
        let mut field = Battlefield::new(config(Vec::new())).unwrap();
        let enemy = field.spawn_enemy(dummy(Vec3::new(2.0, 0.0, 0.0), 10));
        field.add_turret(turret(Some("laser"), 10.0));

        field.tick(0.1);
        assert!(field.is_alive(enemy));
        assert_eq!(field.stats().shots_fired, 0);
    }

    #[test]
    fn test_leaked_enemy_damages_base() {
        let mut field = Battlefield::new(config(Vec::new())).unwrap();
        let mover = PathMover::new(Vec3::ZERO, vec![Vec3::new(1.0, 0.0, 0.0)], 4.0);
        let runner = Enemy::new("runner", Element::None, Health::new(5, 1), mover);
        let runner = field.spawn_enemy(runner);

        for _ in 0..4 {
            field.tick(0.25);
        }
        assert!(field.enemy(runner).is_none());
        assert_eq!(field.base_damage_taken(), 10);
        assert_eq!(field.enemies_leaked(), 1);
        assert!(field.drain_events().contains(&CombatEvent::Leaked {
            enemy: runner,
            damage: 10
        }));
    }

    #[test]
    fn test_burn_kill_has_no_killer() {
        let mut field = Battlefield::new(config(Vec::new())).unwrap();
        let enemy = field.spawn_enemy(dummy(Vec3::ZERO, 5));
        let burn = EffectDescriptor::new(StatusEffectType::Burn, 100.0, 3.0, 20.0)
            .instantiate()
            .unwrap();
        field.enemy_mut(enemy).unwrap().status.apply(burn);

        field.tick(0.5);
        assert!(field.enemy(enemy).is_none());
        assert_eq!(field.gold_earned(), 0);
        let events = field.drain_events();
        assert!(events.contains(&CombatEvent::Damage {
            enemy,
            amount: 10,
            element: Element::Fire,
            source: DamageSource::OverTime(StatusEffectType::Burn),
        }));
        assert!(events.contains(&CombatEvent::Killed {
            enemy,
            killer: None,
            gold: 0
        }));
    }

    #[test]
    fn test_firebomb_leaves_burning_zone() {
        let firebomb = ProjectileTemplate::persistent_zone("firebomb");
        let mut field = Battlefield::new(config(vec![firebomb])).unwrap();
        let enemy = field.spawn_enemy(dummy(Vec3::new(3.0, 0.0, 0.0), 1000));
        let stats = TurretStats {
            projectile: Some("firebomb".to_string()),
            fire_rate: 0.01,
            spawn_offset: Vec3::new(0.0, 0.5, 0.0),
            ..Default::default()
        };
        field.add_turret(Turret::new(Vec3::ZERO, stats));

        for _ in 0..4 {
            field.tick(0.1);
        }
        assert_eq!(field.zones().len(), 1);
        let after_impact = field.enemy(enemy).unwrap().health.current();
        assert!(after_impact < 1000);

        for _ in 0..10 {
            field.tick(0.1);
        }
        assert!(field.enemy(enemy).unwrap().health.current() < after_impact);
        assert!(field.stats().aoe_hits >= 2);

        for _ in 0..50 {
            field.tick(0.1);
        }
        assert!(field.zones().is_empty());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut bad = config(Vec::new());
        bad.pool.max_size = 0;
        assert!(Battlefield::new(bad).is_err());
    }

    #[test]
    fn test_pool_occupancy_reported() {
        let missiles = config(vec![ProjectileTemplate::homing("missile")]);
        let mut field = Battlefield::new(missiles).unwrap();
        field.spawn_enemy(dummy(Vec3::new(4.0, 0.0, 0.0), 100));
        field.add_turret(turret(Some("missile"), 1.0));

        field.tick(0.1);
        let occupancy = field.pool_occupancy();
        assert_eq!(occupancy.len(), 1);
        assert_eq!(occupancy[0].name, "missile");
        assert_eq!(occupancy[0].active, 1);
        assert_eq!(occupancy[0].total, 2);
    }

    #[test]
    fn test_recycled_projectile_counted_as_miss() {
        let mut single = config(vec![ProjectileTemplate::straight("bullet")]);
        single.pool = PoolConfig {
            initial_size: 1,
            max_size: 1,
        };
        let mut field = Battlefield::new(single).unwrap();
        field.spawn_enemy(dummy(Vec3::new(7.0, 0.0, 0.0), 100));
        let stats = TurretStats {
            projectile: Some("bullet".to_string()),
            fire_rate: 10.0,
            ..Default::default()
        };
        field.add_turret(Turret::new(Vec3::ZERO, stats));

        field.tick(0.1);
        field.tick(0.1);
        assert_eq!(field.stats().shots_fired, 2);
        assert_eq!(field.stats().recycled, 1);
        assert_eq!(field.stats().misses, 1);
        assert_eq!(field.stats().hits, 0);
        assert_eq!(field.arsenal().active_count(), 1);
        assert_eq!(field.pool_occupancy()[0].recycled, 1);
    }
}
