//! Projectiles
//!
//! A projectile pairs a flight law with an impact policy. Straight, homing
//! and arc flights combine freely with single-target, explosion and zone
//! impacts (an arc with a zone impact is a grenade).
//!
//! Lifecycle: acquired from a pool, launched, ticked until it impacts or its
//! lifetime runs out, then released back to the pool.

mod arsenal;
mod flight;
mod impact;
mod pool;

pub use arsenal::ProjectileArsenal;
pub use flight::{steer, ArcCurve, ArcPath, Flight, DEFAULT_ARC_HEIGHT, DEFAULT_TURN_RATE};
pub use impact::{Explosion, HitRecord, Impact, ImpactReport};
pub use pool::{PoolConfig, PoolOccupancy, ProjectileHandle, ProjectilePool};

use elementum_core::Transform;
use elementum_ecs::Entity;
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::damage::EffectDescriptor;
use crate::element::Element;

/// Default flight speed in units per second
pub const DEFAULT_SPEED: f32 = 10.0;
/// Default seconds before an unimpacted projectile expires
pub const DEFAULT_LIFETIME: f32 = 5.0;
/// Default collision radius of a projectile
pub const DEFAULT_RADIUS: f32 = 0.2;
/// Distance ahead of the launch point used when there is no target
pub const UNTARGETED_RANGE: f32 = 10.0;

/// Combat data carried to the impact
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HitPayload {
    pub damage: f32,
    pub element: Element,
    pub effect: Option<EffectDescriptor>,
    /// Turret that fired, credited with kills
    pub attacker: Option<Entity>,
}

/// Live enemy hit volume, as seen by projectiles this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetInfo {
    pub entity: Entity,
    /// Center of the hit volume
    pub center: Vec3,
    pub radius: f32,
}

/// Blueprint for every projectile in one pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileTemplate {
    pub name: String,
    pub flight: Flight,
    pub impact: Impact,
    pub speed: f32,
    pub lifetime: f32,
    pub radius: f32,
}

impl Default for ProjectileTemplate {
    fn default() -> Self {
        Self {
            name: "bolt".to_string(),
            flight: Flight::Straight,
            impact: Impact::Single,
            speed: DEFAULT_SPEED,
            lifetime: DEFAULT_LIFETIME,
            radius: DEFAULT_RADIUS,
        }
    }
}

impl ProjectileTemplate {
    pub fn new(name: impl Into<String>, flight: Flight, impact: Impact) -> Self {
        Self {
            name: name.into(),
            flight,
            impact,
            ..Default::default()
        }
    }

    /// Fast bullet
    pub fn straight(name: impl Into<String>) -> Self {
        Self::new(name, Flight::Straight, Impact::Single)
    }

    /// Seeking missile
    pub fn homing(name: impl Into<String>) -> Self {
        Self::new(name, Flight::homing(), Impact::Single)
    }

    /// Mortar shell
    pub fn arc(name: impl Into<String>) -> Self {
        Self::new(name, Flight::arc(), Impact::Single)
    }

    /// Rocket with splash damage
    pub fn aoe(name: impl Into<String>) -> Self {
        Self::new(name, Flight::Straight, Impact::splash())
    }

    /// Fire bomb leaving a burning zone
    pub fn persistent_zone(name: impl Into<String>) -> Self {
        Self::new(name, Flight::Straight, Impact::zone())
    }

    /// Grenade: lobbed, then leaves a zone
    pub fn grenade(name: impl Into<String>) -> Self {
        Self::new(name, Flight::arc(), Impact::zone())
    }
}

/// Where a projectile is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ProjectileState {
    /// Pooled, waiting to be launched
    #[default]
    Idle,
    Flying,
    Impacted,
    Expired,
}

/// Outcome of one projectile tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectileStep {
    /// Not flying, nothing happened
    Idle,
    Flying,
    /// Reached something; the caller resolves the impact
    Impacted {
        point: Vec3,
        primary: Option<Entity>,
    },
    /// Lifetime ran out or the arc landed with no target
    Expired,
}

/// A projectile instance owned by a pool
#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    pub transform: Transform,
    pub flight: Flight,
    pub impact: Impact,
    pub payload: HitPayload,
    pub speed: f32,
    pub lifetime: f32,
    pub radius: f32,
    target: Option<Entity>,
    target_point: Vec3,
    heading: Vec3,
    arc: Option<ArcPath>,
    age: f32,
    state: ProjectileState,
}

impl Projectile {
    pub fn from_template(template: &ProjectileTemplate) -> Self {
        Self {
            transform: Transform::default(),
            flight: template.flight,
            impact: template.impact,
            payload: HitPayload::default(),
            speed: template.speed,
            lifetime: template.lifetime,
            radius: template.radius,
            target: None,
            target_point: Vec3::ZERO,
            heading: Vec3::NEG_Z,
            arc: None,
            age: 0.0,
            state: ProjectileState::Idle,
        }
    }

    /// Return to the idle state at a new pose, keeping the template settings
    pub(crate) fn reset(&mut self, position: Vec3, rotation: Quat, template: &ProjectileTemplate) {
        *self = Self::from_template(template);
        self.transform = Transform::from_position_rotation(position, rotation);
        self.heading = self.transform.forward();
    }

    /// Start flying. `target_point` is where to aim; without one the
    /// projectile heads a fixed distance along its facing.
    pub fn launch(
        &mut self,
        payload: HitPayload,
        target: Option<Entity>,
        target_point: Option<Vec3>,
    ) {
        let position = self.transform.position;
        let target_point =
            target_point.unwrap_or_else(|| position + self.transform.forward() * UNTARGETED_RANGE);

        self.payload = payload;
        self.target = target;
        self.target_point = target_point;
        self.age = 0.0;
        self.state = ProjectileState::Flying;

        let direction = (target_point - position).normalize_or_zero();
        if direction != Vec3::ZERO {
            self.heading = direction;
            self.transform.rotation = Transform::look_rotation(direction);
        }

        self.arc = match self.flight {
            Flight::Arc { .. } => Some(ArcPath::new(position, target_point)),
            _ => None,
        };
    }

    /// Advance one step. Lifetime is checked before movement, so an expired
    /// projectile never impacts.
    pub fn tick(&mut self, delta: f32, targets: &[TargetInfo]) -> ProjectileStep {
        if self.state != ProjectileState::Flying {
            return ProjectileStep::Idle;
        }

        self.age += delta;
        if self.age >= self.lifetime {
            self.state = ProjectileState::Expired;
            return ProjectileStep::Expired;
        }

        let tracked = self
            .target
            .and_then(|target| targets.iter().find(|info| info.entity == target));
        if tracked.is_none() {
            self.target = None;
        }

        let step = match self.flight {
            Flight::Straight => self.fly_forward(delta, targets),
            Flight::Homing {
                strength,
                max_turn_rate,
            } => {
                if let Some(info) = tracked {
                    let to_target = (info.center - self.transform.position).normalize_or_zero();
                    let max_turn = max_turn_rate.map(|rate| rate.to_radians() * delta);
                    self.heading = steer(self.heading, to_target, strength, max_turn);
                }
                self.fly_forward(delta, targets)
            }
            Flight::Arc {
                height,
                curve,
                proximity_radius,
            } => self.fly_arc(delta, height, curve, proximity_radius, tracked.copied()),
        };

        if let ProjectileStep::Impacted { .. } = step {
            self.state = ProjectileState::Impacted;
        } else if step == ProjectileStep::Expired {
            self.state = ProjectileState::Expired;
        }
        step
    }

    fn fly_forward(&mut self, delta: f32, targets: &[TargetInfo]) -> ProjectileStep {
        self.transform.position += self.heading * self.speed * delta;
        self.transform.rotation = Transform::look_rotation(self.heading);

        let position = self.transform.position;
        match targets
            .iter()
            .find(|info| info.center.distance(position) <= info.radius + self.radius)
        {
            Some(info) => ProjectileStep::Impacted {
                point: position,
                primary: Some(info.entity),
            },
            None => ProjectileStep::Flying,
        }
    }

    fn fly_arc(
        &mut self,
        delta: f32,
        height: f32,
        curve: ArcCurve,
        proximity_radius: Option<f32>,
        tracked: Option<TargetInfo>,
    ) -> ProjectileStep {
        let Some(path) = self.arc.as_mut() else {
            return ProjectileStep::Expired;
        };

        let progress = path.advance(self.speed * delta);
        let next = path.point_at(progress, height, curve);
        let motion = (next - self.transform.position).normalize_or_zero();
        if motion != Vec3::ZERO {
            self.heading = motion;
            self.transform.rotation = Transform::look_rotation(motion);
        }
        self.transform.position = next;

        if let (Some(radius), Some(info)) = (proximity_radius, tracked) {
            if info.center.distance(next) <= radius + info.radius {
                return ProjectileStep::Impacted {
                    point: next,
                    primary: Some(info.entity),
                };
            }
        }

        if progress < 1.0 {
            return ProjectileStep::Flying;
        }

        match tracked {
            Some(info) => ProjectileStep::Impacted {
                point: next,
                primary: Some(info.entity),
            },
            None => ProjectileStep::Expired,
        }
    }

    pub fn state(&self) -> ProjectileState {
        self.state
    }

    pub fn is_flying(&self) -> bool {
        self.state == ProjectileState::Flying
    }

    /// Live target handle, cleared once the target is gone
    pub fn target(&self) -> Option<Entity> {
        self.target
    }

    pub fn target_point(&self) -> Vec3 {
        self.target_point
    }

    pub fn heading(&self) -> Vec3 {
        self.heading
    }

    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    /// Seconds since launch
    pub fn age(&self) -> f32 {
        self.age
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(index: u32, center: Vec3) -> TargetInfo {
        TargetInfo {
            entity: Entity::from_raw(index, 0),
            center,
            radius: 0.5,
        }
    }

    fn launched(template: &ProjectileTemplate, target: Option<&TargetInfo>) -> Projectile {
        let mut projectile = Projectile::from_template(template);
        projectile.reset(Vec3::ZERO, Quat::IDENTITY, template);
        projectile.launch(
            HitPayload {
                damage: 10.0,
                ..Default::default()
            },
            target.map(|t| t.entity),
            target.map(|t| t.center),
        );
        projectile
    }

    #[test]
    fn test_straight_hits_on_overlap() {
        let enemy = target(0, Vec3::new(5.0, 0.0, 0.0));
        let mut projectile = launched(&ProjectileTemplate::straight("bullet"), Some(&enemy));
        assert_eq!(projectile.heading(), Vec3::X);

        assert_eq!(projectile.tick(0.25, &[enemy]), ProjectileStep::Flying);
        let step = projectile.tick(0.25, &[enemy]);
        assert_eq!(
            step,
            ProjectileStep::Impacted {
                point: Vec3::new(5.0, 0.0, 0.0),
                primary: Some(enemy.entity)
            }
        );
        assert_eq!(projectile.state(), ProjectileState::Impacted);
        assert_eq!(projectile.tick(0.25, &[enemy]), ProjectileStep::Idle);
    }

    #[test]
    fn test_straight_hits_any_enemy_in_path() {
        let aimed = target(0, Vec3::new(8.0, 0.0, 0.0));
        let blocker = target(1, Vec3::new(2.5, 0.0, 0.0));
        let mut projectile = launched(&ProjectileTemplate::straight("bullet"), Some(&aimed));

        let step = projectile.tick(0.25, &[aimed, blocker]);
        assert_eq!(
            step,
            ProjectileStep::Impacted {
                point: Vec3::new(2.5, 0.0, 0.0),
                primary: Some(blocker.entity)
            }
        );
    }

    #[test]
    fn test_lifetime_expires_before_movement() {
        let enemy = target(0, Vec3::new(100.0, 0.0, 0.0));
        let mut projectile = launched(&ProjectileTemplate::straight("bullet"), Some(&enemy));

        for _ in 0..19 {
            assert_eq!(projectile.tick(0.25, &[enemy]), ProjectileStep::Flying);
        }
        let before = projectile.position();
        assert_eq!(projectile.tick(0.25, &[enemy]), ProjectileStep::Expired);
        assert_eq!(projectile.position(), before);
        assert_eq!(projectile.state(), ProjectileState::Expired);
    }

    #[test]
    fn test_homing_follows_moving_target() {
        let start = target(0, Vec3::new(0.0, 0.0, -20.0));
        let template = ProjectileTemplate::new(
            "missile",
            Flight::Homing {
                strength: 1.0,
                max_turn_rate: None,
            },
            Impact::Single,
        );
        let mut projectile = launched(&template, Some(&start));
        assert_eq!(projectile.heading(), Vec3::NEG_Z);

        let moved = target(0, Vec3::new(20.0, 0.0, 0.0));
        projectile.tick(0.1, &[moved]);
        assert!((projectile.heading() - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn test_homing_flies_straight_when_target_gone() {
        let enemy = target(0, Vec3::new(0.0, 0.0, -20.0));
        let mut projectile = launched(&ProjectileTemplate::homing("missile"), Some(&enemy));

        assert_eq!(projectile.tick(0.5, &[]), ProjectileStep::Flying);
        assert_eq!(projectile.target(), None);
        assert_eq!(projectile.heading(), Vec3::NEG_Z);
        assert_eq!(projectile.position(), Vec3::new(0.0, 0.0, -5.0));
    }

    #[test]
    fn test_arc_impacts_live_target_at_end() {
        let enemy = target(0, Vec3::new(10.0, 0.0, 0.0));
        let mut projectile = launched(&ProjectileTemplate::arc("shell"), Some(&enemy));

        assert_eq!(projectile.tick(0.5, &[enemy]), ProjectileStep::Flying);
        assert_eq!(projectile.position(), Vec3::new(5.0, DEFAULT_ARC_HEIGHT, 0.0));

        let step = projectile.tick(0.5, &[enemy]);
        assert_eq!(
            step,
            ProjectileStep::Impacted {
                point: Vec3::new(10.0, 0.0, 0.0),
                primary: Some(enemy.entity)
            }
        );
    }

    #[test]
    fn test_arc_expires_when_target_gone() {
        let enemy = target(0, Vec3::new(10.0, 0.0, 0.0));
        let mut projectile = launched(&ProjectileTemplate::arc("shell"), Some(&enemy));

        projectile.tick(0.5, &[enemy]);
        assert_eq!(projectile.tick(0.5, &[]), ProjectileStep::Expired);
        assert_eq!(projectile.state(), ProjectileState::Expired);
    }

    #[test]
    fn test_arc_ignores_bystanders_without_proximity() {
        let enemy = target(0, Vec3::new(10.0, 0.0, 0.0));
        let bystander = target(1, Vec3::new(5.0, DEFAULT_ARC_HEIGHT, 0.0));
        let mut projectile = launched(&ProjectileTemplate::arc("shell"), Some(&enemy));

        assert_eq!(projectile.tick(0.5, &[enemy, bystander]), ProjectileStep::Flying);
    }

    #[test]
    fn test_arc_proximity_catches_target_midflight() {
        let enemy = target(0, Vec3::new(10.0, 0.0, 0.0));
        let template =
            ProjectileTemplate::new("shell", Flight::arc_with_proximity(1.0), Impact::Single);
        let mut projectile = launched(&template, Some(&enemy));

        let moved = target(0, Vec3::new(5.0, DEFAULT_ARC_HEIGHT - 1.0, 0.0));
        let step = projectile.tick(0.5, &[moved]);
        assert!(matches!(
            step,
            ProjectileStep::Impacted { primary: Some(e), .. } if e == enemy.entity
        ));
    }

    #[test]
    fn test_degenerate_arc_lands_on_first_tick() {
        let enemy = target(0, Vec3::new(0.005, 0.0, 0.0));
        let mut projectile = launched(&ProjectileTemplate::arc("shell"), Some(&enemy));

        let step = projectile.tick(0.001, &[enemy]);
        assert!(matches!(
            step,
            ProjectileStep::Impacted { primary: Some(e), .. } if e == enemy.entity
        ));
        assert_eq!(projectile.state(), ProjectileState::Impacted);
    }

    #[test]
    fn test_untargeted_launch_flies_forward() {
        let template = ProjectileTemplate::straight("bullet");
        let mut projectile = Projectile::from_template(&template);
        projectile.reset(Vec3::ZERO, Quat::IDENTITY, &template);
        projectile.launch(HitPayload::default(), None, None);

        assert_eq!(projectile.target_point(), Vec3::new(0.0, 0.0, -UNTARGETED_RANGE));
        assert_eq!(projectile.tick(0.5, &[]), ProjectileStep::Flying);
    }
}
