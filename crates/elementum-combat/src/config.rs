//! Combat configuration and validation

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::damage::DamagePolicy;
use crate::projectile::{Impact, PoolConfig, ProjectileTemplate};
use crate::turret::TurretStats;

/// Configuration problems found before a simulation starts
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("projectile pool max size must be at least 1")]
    EmptyPool,
    #[error("projectile pool initial size {initial} exceeds max size {max}")]
    PoolSize { initial: usize, max: usize },
    #[error("{what} must be positive, got {value}")]
    NonPositive { what: String, value: f32 },
    #[error("projectile template '{0}' defined more than once")]
    DuplicateTemplate(String),
    #[error("turret '{turret}' fires unknown projectile '{projectile}'")]
    UnknownProjectile { turret: String, projectile: String },
}

fn positive(what: impl FnOnce() -> String, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive {
            what: what(),
            value,
        })
    }
}

/// Library-level combat settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// RNG seed for status rolls; `None` seeds from entropy
    pub seed: Option<u64>,
    pub damage: DamagePolicy,
    pub pool: PoolConfig,
    pub projectiles: Vec<ProjectileTemplate>,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            seed: None,
            damage: DamagePolicy::default(),
            pool: PoolConfig::default(),
            projectiles: vec![
                ProjectileTemplate::straight("bullet"),
                ProjectileTemplate::homing("missile"),
                ProjectileTemplate::arc("shell"),
                ProjectileTemplate::aoe("rocket"),
                ProjectileTemplate::persistent_zone("firebomb"),
                ProjectileTemplate::grenade("grenade"),
            ],
        }
    }
}

impl CombatConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.pool.validate()?;

        let mut names = HashSet::new();
        for template in &self.projectiles {
            if !names.insert(template.name.as_str()) {
                return Err(ConfigError::DuplicateTemplate(template.name.clone()));
            }
            validate_template(template)?;
        }
        Ok(())
    }

    /// Check a turret against this configuration's projectile templates
    pub fn validate_turret(&self, stats: &TurretStats) -> Result<(), ConfigError> {
        positive(|| format!("turret '{}' fire rate", stats.name), stats.fire_rate)?;
        positive(|| format!("turret '{}' range", stats.name), stats.range)?;

        if let Some(projectile) = &stats.projectile {
            if !self.projectiles.iter().any(|t| &t.name == projectile) {
                return Err(ConfigError::UnknownProjectile {
                    turret: stats.name.clone(),
                    projectile: projectile.clone(),
                });
            }
        }
        Ok(())
    }
}

fn validate_template(template: &ProjectileTemplate) -> Result<(), ConfigError> {
    let name = &template.name;
    positive(|| format!("projectile '{name}' speed"), template.speed)?;
    positive(|| format!("projectile '{name}' lifetime"), template.lifetime)?;

    let (explosion, zone) = match &template.impact {
        Impact::Single => (None, None),
        Impact::Explosion(explosion) => (Some(explosion), None),
        Impact::Zone { explosion, zone } => (explosion.as_ref(), Some(zone)),
    };
    if let Some(explosion) = explosion {
        positive(|| format!("projectile '{name}' explosion radius"), explosion.radius)?;
    }
    if let Some(zone) = zone {
        positive(|| format!("projectile '{name}' zone radius"), zone.radius)?;
        positive(|| format!("projectile '{name}' zone tick interval"), zone.tick_interval)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projectile::Explosion;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(CombatConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_duplicate_template_rejected() {
        let mut config = CombatConfig::default();
        config.projectiles.push(ProjectileTemplate::straight("bullet"));
        assert_eq!(
            config.validate(),
            Err(ConfigError::DuplicateTemplate("bullet".to_string()))
        );
    }

    #[test]
    fn test_bad_explosion_rejected() {
        let mut config = CombatConfig::default();
        config.projectiles.push(ProjectileTemplate::new(
            "dud",
            Default::default(),
            Impact::Explosion(Explosion {
                radius: 0.0,
                ..Explosion::splash()
            }),
        ));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("'dud' explosion radius"));
    }

    #[test]
    fn test_turret_validation() {
        let config = CombatConfig::default();
        assert!(config.validate_turret(&TurretStats::default()).is_ok());

        let unknown = TurretStats {
            projectile: Some("laser".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            config.validate_turret(&unknown),
            Err(ConfigError::UnknownProjectile { .. })
        ));

        let stalled = TurretStats {
            fire_rate: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate_turret(&stalled),
            Err(ConfigError::NonPositive { .. })
        ));
    }

    #[test]
    fn test_deserializes_from_toml_shape() {
        let json = r#"{
            "seed": 7,
            "damage": { "minimum_damage": 1 },
            "pool": { "initial_size": 5, "max_size": 10 },
            "projectiles": [
                { "name": "mortar", "flight": { "type": "arc", "height": 4.0 },
                  "impact": { "type": "zone", "zone": { "radius": 3.0 } } }
            ]
        }"#;
        let config: CombatConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.damage.minimum_damage, Some(1));
        assert_eq!(config.projectiles[0].speed, 10.0);
        assert!(config.validate().is_ok());
    }
}
