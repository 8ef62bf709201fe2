//! Enemies: health, waypoint movement and status effects
//!
//! An enemy walks a fixed waypoint path toward the base. Status effects tick
//! before movement so a freeze applied this frame already stops it.

use elementum_ecs::Entity;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::damage::{DamageResolver, EffectDescriptor, HitOutcome};
use crate::element::Element;
use crate::status::{DotTick, SpeedControl, StatusRegistry, StatusTick};

/// Distance at which a waypoint counts as reached
pub const WAYPOINT_REACH_DISTANCE: f32 = 0.2;
/// Damage dealt to the base when an enemy finishes its path
pub const DEFAULT_BASE_DAMAGE: i32 = 10;
/// Height of the hit-volume center above the enemy's feet
pub const AIM_HEIGHT: f32 = 0.5;
/// Default hit-volume radius
pub const DEFAULT_HIT_RADIUS: f32 = 0.5;

/// Result of a single damage application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DamageTaken {
    pub dealt: i32,
    /// True only for the hit that brought health to zero
    pub killed: bool,
}

/// Hit points with a one-shot kill notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Health {
    current: i32,
    max: i32,
    gold_reward: u32,
    killer: Option<Entity>,
    kill_reported: bool,
}

impl Health {
    pub fn new(max: i32, gold_reward: u32) -> Self {
        Self {
            current: max,
            max,
            gold_reward,
            killer: None,
            kill_reported: false,
        }
    }

    /// Subtract `amount`. The kill is reported on the first hit that reaches
    /// zero and never again.
    pub fn take_damage(&mut self, amount: i32, attacker: Option<Entity>) -> DamageTaken {
        self.current -= amount;

        let killed = self.current <= 0 && !self.kill_reported;
        if killed {
            self.kill_reported = true;
            self.killer = attacker;
        }

        DamageTaken {
            dealt: amount,
            killed,
        }
    }

    pub fn current(&self) -> i32 {
        self.current
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    /// Health fraction (0-1) for health bars
    pub fn fraction(&self) -> f32 {
        if self.max > 0 {
            (self.current as f32 / self.max as f32).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    pub fn is_dead(&self) -> bool {
        self.current <= 0
    }

    pub fn gold_reward(&self) -> u32 {
        self.gold_reward
    }

    /// Attacker credited with the kill, if any
    pub fn killer(&self) -> Option<Entity> {
        self.killer
    }
}

/// Outcome of one movement step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveStep {
    Moving,
    /// Passed the last waypoint this step
    ReachedEnd,
    /// Already finished on an earlier step
    Finished,
}

/// Walks a waypoint list at `base_speed * speed_modifier`
#[derive(Debug, Clone, PartialEq)]
pub struct PathMover {
    waypoints: Vec<Vec3>,
    next: usize,
    position: Vec3,
    base_speed: f32,
    speed_modifier: f32,
    velocity: Vec3,
    finished: bool,
}

impl PathMover {
    pub fn new(start: Vec3, waypoints: Vec<Vec3>, base_speed: f32) -> Self {
        let mut mover = Self {
            waypoints,
            next: 0,
            position: start,
            base_speed,
            speed_modifier: 1.0,
            velocity: Vec3::ZERO,
            finished: false,
        };
        mover.refresh_path();
        mover
    }

    pub fn tick(&mut self, delta: f32) -> MoveStep {
        if self.finished {
            return MoveStep::Finished;
        }

        while let Some(&waypoint) = self.waypoints.get(self.next) {
            if self.position.distance(waypoint) >= WAYPOINT_REACH_DISTANCE {
                break;
            }
            self.next += 1;
        }

        let Some(&waypoint) = self.waypoints.get(self.next) else {
            self.finished = true;
            self.velocity = Vec3::ZERO;
            return MoveStep::ReachedEnd;
        };

        let to_waypoint = waypoint - self.position;
        let distance = to_waypoint.length();
        let step = (self.current_speed() * delta).min(distance);
        let direction = to_waypoint / distance;
        self.position += direction * step;
        self.velocity = direction * self.current_speed();

        MoveStep::Moving
    }

    pub fn current_speed(&self) -> f32 {
        self.base_speed * self.speed_modifier
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Current velocity, for lead prediction
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    pub fn speed_modifier(&self) -> f32 {
        self.speed_modifier
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Index of the waypoint currently being walked toward
    pub fn next_waypoint(&self) -> usize {
        self.next
    }
}

impl SpeedControl for PathMover {
    fn set_speed_modifier(&mut self, modifier: f32) {
        self.speed_modifier = modifier.max(0.0);
    }

    fn refresh_path(&mut self) {
        self.velocity = match self.waypoints.get(self.next) {
            Some(&waypoint) if !self.finished => {
                (waypoint - self.position).normalize_or_zero() * self.current_speed()
            }
            _ => Vec3::ZERO,
        };
    }
}

/// Everything that happened to an enemy during one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnemyTick {
    pub status: StatusTick,
    /// Damage-over-time ticks paired with their effect on health
    pub dot_damage: Vec<(DotTick, DamageTaken)>,
    pub reached_end: bool,
}

impl EnemyTick {
    pub fn killed(&self) -> bool {
        self.dot_damage.iter().any(|(_, taken)| taken.killed)
    }
}

/// A combat target walking toward the base
#[derive(Debug, Clone)]
pub struct Enemy {
    pub name: String,
    pub element: Element,
    pub health: Health,
    pub mover: PathMover,
    pub status: StatusRegistry,
    pub hit_radius: f32,
    pub base_damage: i32,
}

impl Enemy {
    pub fn new(
        name: impl Into<String>,
        element: Element,
        health: Health,
        mover: PathMover,
    ) -> Self {
        Self {
            name: name.into(),
            element,
            health,
            mover,
            status: StatusRegistry::new(),
            hit_radius: DEFAULT_HIT_RADIUS,
            base_damage: DEFAULT_BASE_DAMAGE,
        }
    }

    pub fn with_hit_radius(mut self, radius: f32) -> Self {
        self.hit_radius = radius;
        self
    }

    pub fn with_base_damage(mut self, damage: i32) -> Self {
        self.base_damage = damage;
        self
    }

    /// Feet position
    pub fn position(&self) -> Vec3 {
        self.mover.position()
    }

    /// Center of the hit volume
    pub fn center(&self) -> Vec3 {
        self.position() + Vec3::Y * AIM_HEIGHT
    }

    pub fn velocity(&self) -> Vec3 {
        self.mover.velocity()
    }

    pub fn is_alive(&self) -> bool {
        !self.health.is_dead()
    }

    /// Deal damage directly, bypassing element and status resolution
    pub fn take_damage(&mut self, amount: i32, attacker: Option<Entity>) -> DamageTaken {
        let taken = self.health.take_damage(amount, attacker);
        if taken.killed {
            debug!("{} killed", self.name);
        }
        taken
    }

    /// Resolve a hit through `resolver` and apply its damage
    pub fn receive_hit(
        &mut self,
        resolver: &mut DamageResolver,
        hit: &IncomingHit<'_>,
    ) -> (HitOutcome, DamageTaken) {
        let outcome = resolver.resolve_hit(
            hit.element,
            self.element,
            hit.base_damage,
            hit.effect,
            hit.chance_scale,
            &mut self.status,
        );
        let taken = self.take_damage(outcome.damage, hit.attacker);
        (outcome, taken)
    }

    /// Advance status effects, apply their damage, then move
    pub fn tick(&mut self, delta: f32) -> EnemyTick {
        let status = self.status.tick(delta, &mut self.mover);

        let mut dot_damage = Vec::with_capacity(status.damage.len());
        for dot in &status.damage {
            let taken = self.take_damage(dot.amount, None);
            dot_damage.push((*dot, taken));
        }

        let reached_end = if self.is_alive() {
            self.mover.tick(delta) == MoveStep::ReachedEnd
        } else {
            false
        };

        EnemyTick {
            status,
            dot_damage,
            reached_end,
        }
    }
}

/// Parameters of one incoming hit
#[derive(Debug, Clone, Copy)]
pub struct IncomingHit<'a> {
    pub element: Element,
    pub base_damage: f32,
    pub effect: Option<&'a EffectDescriptor>,
    pub chance_scale: f32,
    pub attacker: Option<Entity>,
}

impl<'a> IncomingHit<'a> {
    pub fn new(element: Element, base_damage: f32) -> Self {
        Self {
            element,
            base_damage,
            effect: None,
            chance_scale: 1.0,
            attacker: None,
        }
    }

    pub fn with_effect(mut self, effect: Option<&'a EffectDescriptor>, chance_scale: f32) -> Self {
        self.effect = effect;
        self.chance_scale = chance_scale;
        self
    }

    pub fn from_attacker(mut self, attacker: Option<Entity>) -> Self {
        self.attacker = attacker;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::damage::DamagePolicy;
    use crate::status::{StatusEffect, StatusEffectType};

    fn walker(speed: f32) -> PathMover {
        PathMover::new(
            Vec3::ZERO,
            vec![Vec3::new(4.0, 0.0, 0.0), Vec3::new(4.0, 0.0, 4.0)],
            speed,
        )
    }

    #[test]
    fn test_kill_reported_once() {
        let mut health = Health::new(20, 5);
        let turret = Entity::from_raw(0, 0);

        assert!(!health.take_damage(15, Some(turret)).killed);
        assert!(health.take_damage(10, Some(turret)).killed);
        assert!(!health.take_damage(10, None).killed);
        assert!(health.is_dead());
        assert_eq!(health.killer(), Some(turret));
        assert_eq!(health.fraction(), 0.0);
    }

    #[test]
    fn test_mover_walks_waypoints() {
        let mut mover = walker(2.0);
        assert_eq!(mover.tick(1.0), MoveStep::Moving);
        assert_eq!(mover.position(), Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(mover.velocity(), Vec3::new(2.0, 0.0, 0.0));

        mover.tick(1.0);
        assert_eq!(mover.position(), Vec3::new(4.0, 0.0, 0.0));
        mover.tick(1.0);
        assert_eq!(mover.next_waypoint(), 1);
        assert_eq!(mover.position(), Vec3::new(4.0, 0.0, 2.0));

        mover.tick(1.0);
        assert_eq!(mover.tick(1.0), MoveStep::ReachedEnd);
        assert_eq!(mover.tick(1.0), MoveStep::Finished);
        assert_eq!(mover.velocity(), Vec3::ZERO);
    }

    #[test]
    fn test_speed_modifier_scales_movement() {
        let mut mover = walker(2.0);
        mover.set_speed_modifier(0.5);
        mover.tick(1.0);
        assert_eq!(mover.position(), Vec3::new(1.0, 0.0, 0.0));

        mover.set_speed_modifier(0.0);
        mover.refresh_path();
        assert_eq!(mover.velocity(), Vec3::ZERO);
        mover.tick(1.0);
        assert_eq!(mover.position(), Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_frozen_enemy_stands_still() {
        let mut enemy = Enemy::new("grunt", Element::Earth, Health::new(50, 1), walker(2.0));
        enemy.status.apply(StatusEffect::freeze(1.0));

        enemy.tick(0.5);
        assert_eq!(enemy.position(), Vec3::ZERO);

        let tick = enemy.tick(0.5);
        assert!(tick.status.freeze_ended());
        assert_eq!(enemy.mover.speed_modifier(), 1.0);
        assert_eq!(enemy.position(), Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_dot_damages_health() {
        let mut enemy = Enemy::new("grunt", Element::Earth, Health::new(5, 1), walker(1.0));
        enemy.status.apply(StatusEffect::burn(10.0, 2.0));

        let tick = enemy.tick(0.5);
        assert_eq!(tick.status.total_damage(), 5);
        assert!(tick.killed());
        assert!(!enemy.is_alive());
        assert!(!tick.reached_end);
    }

    #[test]
    fn test_receive_hit_applies_element_and_status() {
        let mut enemy = Enemy::new("slime", Element::Water, Health::new(100, 3), walker(1.0));
        let mut resolver = DamageResolver::with_seed(DamagePolicy::default(), 3);
        let slow = EffectDescriptor::new(StatusEffectType::Slow, 100.0, 2.0, 0.5);

        let hit = IncomingHit::new(Element::Lightning, 20.0).with_effect(Some(&slow), 1.0);
        let (outcome, taken) = enemy.receive_hit(&mut resolver, &hit);

        assert_eq!(outcome.damage, 30);
        assert_eq!(taken.dealt, 30);
        assert_eq!(enemy.health.current(), 70);
        assert!(enemy.status.has(StatusEffectType::Slow));
    }

    #[test]
    fn test_hit_center_above_feet() {
        let enemy = Enemy::new("bat", Element::Dark, Health::new(1, 0), walker(1.0));
        assert_eq!(enemy.center(), Vec3::new(0.0, AIM_HEIGHT, 0.0));
    }
}
