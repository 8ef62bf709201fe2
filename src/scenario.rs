//! Scenario description: enemy path, waves and turret placements

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::info;

use elementum_combat::damage::EffectDescriptor;
use elementum_combat::enemy::{DEFAULT_BASE_DAMAGE, DEFAULT_HIT_RADIUS};
use elementum_combat::{Element, Enemy, Health, PathMover, StatusEffectType, Turret, TurretStats};

/// One kind of enemy in a wave
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemySpec {
    pub name: String,
    pub element: Element,
    pub health: i32,
    /// Units per second before status modifiers
    pub speed: f32,
    pub gold: u32,
    pub hit_radius: f32,
    pub base_damage: i32,
}

impl Default for EnemySpec {
    fn default() -> Self {
        Self {
            name: "Grunt".to_string(),
            element: Element::None,
            health: 100,
            speed: 2.0,
            gold: 5,
            hit_radius: DEFAULT_HIT_RADIUS,
            base_damage: DEFAULT_BASE_DAMAGE,
        }
    }
}

impl EnemySpec {
    /// Build an enemy standing at the first waypoint of `path`
    pub fn spawn(&self, path: &[Vec3]) -> Enemy {
        let start = path.first().copied().unwrap_or(Vec3::ZERO);
        let waypoints = path.iter().skip(1).copied().collect();
        let mover = PathMover::new(start, waypoints, self.speed);

        Enemy::new(
            self.name.clone(),
            self.element,
            Health::new(self.health, self.gold),
            mover,
        )
        .with_hit_radius(self.hit_radius)
        .with_base_damage(self.base_damage)
    }
}

/// A group of identical enemies released at a fixed interval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Wave {
    pub enemy: EnemySpec,
    pub count: u32,
    /// Seconds between spawns within the wave
    pub interval: f32,
    /// Seconds after the scenario starts before the first spawn
    pub start: f32,
}

impl Default for Wave {
    fn default() -> Self {
        Self {
            enemy: EnemySpec::default(),
            count: 5,
            interval: 1.0,
            start: 0.0,
        }
    }
}

/// A turret and where it stands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurretPlacement {
    pub position: Vec3,
    #[serde(default)]
    pub stats: TurretStats,
}

impl TurretPlacement {
    pub fn build(&self) -> Turret {
        Turret::new(self.position, self.stats.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    /// Waypoints from spawn to base
    pub path: Vec<Vec3>,
    pub waves: Vec<Wave>,
    pub turrets: Vec<TurretPlacement>,
}

impl Default for Scenario {
    fn default() -> Self {
        let path = vec![
            Vec3::new(-12.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 12.0),
            Vec3::new(12.0, 0.0, 12.0),
        ];

        let waves = vec![
            Wave {
                enemy: EnemySpec {
                    name: "Ember Imp".to_string(),
                    element: Element::Fire,
                    health: 60,
                    speed: 3.0,
                    ..Default::default()
                },
                count: 6,
                interval: 0.8,
                start: 0.0,
            },
            Wave {
                enemy: EnemySpec {
                    name: "Tide Golem".to_string(),
                    element: Element::Water,
                    health: 220,
                    speed: 1.5,
                    gold: 15,
                    hit_radius: 0.8,
                    base_damage: 25,
                },
                count: 3,
                interval: 2.0,
                start: 6.0,
            },
            Wave {
                enemy: EnemySpec {
                    name: "Thorn Runner".to_string(),
                    element: Element::Nature,
                    health: 90,
                    speed: 4.0,
                    gold: 8,
                    ..Default::default()
                },
                count: 5,
                interval: 0.6,
                start: 12.0,
            },
        ];

        let turrets = vec![
            TurretPlacement {
                position: Vec3::new(-6.0, 0.0, 3.0),
                stats: TurretStats {
                    name: "Frost Gun".to_string(),
                    damage: 8.0,
                    fire_rate: 2.0,
                    element: Element::Ice,
                    effect: Some(EffectDescriptor::new(StatusEffectType::Freeze, 15.0, 1.0, 0.0)),
                    projectile: Some("bullet".to_string()),
                    projectile_speed_multiplier: 1.5,
                    ..Default::default()
                },
            },
            TurretPlacement {
                position: Vec3::new(3.0, 0.0, 4.0),
                stats: TurretStats {
                    name: "Storm Launcher".to_string(),
                    damage: 18.0,
                    fire_rate: 0.8,
                    range: 10.0,
                    element: Element::Lightning,
                    projectile: Some("missile".to_string()),
                    ..Default::default()
                },
            },
            TurretPlacement {
                position: Vec3::new(-3.0, 0.0, 8.0),
                stats: TurretStats {
                    name: "Brazier".to_string(),
                    damage: 20.0,
                    fire_rate: 0.4,
                    element: Element::Fire,
                    effect: Some(EffectDescriptor::new(StatusEffectType::Burn, 50.0, 3.0, 6.0)),
                    projectile: Some("firebomb".to_string()),
                    ..Default::default()
                },
            },
            TurretPlacement {
                position: Vec3::new(6.0, 0.0, 8.0),
                stats: TurretStats {
                    name: "Bramble Mortar".to_string(),
                    damage: 25.0,
                    fire_rate: 0.5,
                    range: 12.0,
                    element: Element::Nature,
                    effect: Some(EffectDescriptor::new(StatusEffectType::Poison, 40.0, 4.0, 4.0)),
                    projectile: Some("grenade".to_string()),
                    ..Default::default()
                },
            },
            TurretPlacement {
                position: Vec3::new(2.0, 0.0, -2.0),
                stats: TurretStats {
                    name: "Stone Sentinel".to_string(),
                    damage: 6.0,
                    fire_rate: 1.5,
                    range: 6.0,
                    element: Element::Earth,
                    effect: Some(EffectDescriptor::new(StatusEffectType::Slow, 30.0, 2.0, 0.6)),
                    ..Default::default()
                },
            },
        ];

        Self {
            path,
            waves,
            turrets,
        }
    }
}

impl Scenario {
    pub fn total_enemies(&self) -> u32 {
        self.waves.iter().map(|wave| wave.count).sum()
    }
}

/// Releases wave enemies as simulated time passes
#[derive(Debug, Clone, Default)]
pub struct WaveSpawner {
    elapsed: f32,
    spawned: Vec<u32>,
}

impl WaveSpawner {
    pub fn new(scenario: &Scenario) -> Self {
        Self {
            elapsed: 0.0,
            spawned: vec![0; scenario.waves.len()],
        }
    }

    /// Advance the clock and return the enemies due this step
    pub fn tick(&mut self, delta: f32, scenario: &Scenario) -> Vec<Enemy> {
        self.elapsed += delta;

        let mut due = Vec::new();
        for (index, wave) in scenario.waves.iter().enumerate() {
            let Some(spawned) = self.spawned.get_mut(index) else {
                continue;
            };
            if *spawned == 0 && wave.count > 0 && self.elapsed >= wave.start {
                info!("Wave {} started: {} x {}", index + 1, wave.count, wave.enemy.name);
            }
            while *spawned < wave.count
                && self.elapsed >= wave.start + wave.interval * *spawned as f32
            {
                due.push(wave.enemy.spawn(&scenario.path));
                *spawned += 1;
            }
        }
        due
    }

    /// Whether every wave has released all of its enemies
    pub fn is_done(&self, scenario: &Scenario) -> bool {
        scenario
            .waves
            .iter()
            .zip(&self.spawned)
            .all(|(wave, &spawned)| spawned >= wave.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scenario_is_consistent() {
        let scenario = Scenario::default();
        let config = elementum_combat::CombatConfig::default();
        for placement in &scenario.turrets {
            assert!(config.validate_turret(&placement.stats).is_ok());
        }
        assert_eq!(scenario.total_enemies(), 14);
    }

    #[test]
    fn test_enemy_starts_on_path() {
        let path = vec![Vec3::new(1.0, 0.0, 2.0), Vec3::new(5.0, 0.0, 2.0)];
        let enemy = EnemySpec::default().spawn(&path);
        assert_eq!(enemy.position(), path[0]);
        assert_eq!(enemy.health.max(), 100);
    }

    #[test]
    fn test_spawner_releases_on_schedule() {
        let scenario = Scenario {
            path: vec![Vec3::ZERO, Vec3::X],
            waves: vec![Wave {
                count: 3,
                interval: 1.0,
                start: 0.5,
                ..Default::default()
            }],
            turrets: Vec::new(),
        };
        let mut spawner = WaveSpawner::new(&scenario);

        assert!(spawner.tick(0.25, &scenario).is_empty());
        assert_eq!(spawner.tick(0.25, &scenario).len(), 1);
        assert!(spawner.tick(0.5, &scenario).is_empty());
        assert_eq!(spawner.tick(0.5, &scenario).len(), 1);
        assert!(!spawner.is_done(&scenario));
        assert_eq!(spawner.tick(1.0, &scenario).len(), 1);
        assert!(spawner.is_done(&scenario));
    }

    #[test]
    fn test_scenario_from_toml() {
        let toml = r#"
            path = [[0.0, 0.0, 0.0], [10.0, 0.0, 0.0]]

            [[waves]]
            count = 2
            [waves.enemy]
            name = "Shade"
            element = "Dark"

            [[turrets]]
            position = [5.0, 0.0, 2.0]
            [turrets.stats]
            projectile = "missile"
        "#;
        let scenario: Scenario = toml::from_str(toml).unwrap();
        assert_eq!(scenario.path.len(), 2);
        assert_eq!(scenario.waves[0].enemy.element, Element::Dark);
        assert_eq!(scenario.waves[0].enemy.health, 100);
        assert_eq!(scenario.turrets[0].stats.projectile.as_deref(), Some("missile"));
    }
}
