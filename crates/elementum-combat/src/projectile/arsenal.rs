use std::collections::BTreeMap;

use glam::{Quat, Vec3};
use tracing::{info, warn};

use super::{PoolConfig, ProjectileHandle, ProjectilePool, ProjectileTemplate};

/// Registered projectile templates, each with its own lazily created pool.
/// Pools iterate in name order so seeded runs replay identically.
#[derive(Debug, Default)]
pub struct ProjectileArsenal {
    templates: BTreeMap<String, ProjectileTemplate>,
    pools: BTreeMap<String, ProjectilePool>,
    pool_config: PoolConfig,
}

impl ProjectileArsenal {
    pub fn new(pool_config: PoolConfig) -> Self {
        Self {
            templates: BTreeMap::new(),
            pools: BTreeMap::new(),
            pool_config,
        }
    }

    /// Register a template. Replacing an existing one drops its pool.
    pub fn register(&mut self, template: ProjectileTemplate) {
        let name = template.name.clone();
        if self.templates.insert(name.clone(), template).is_some() {
            warn!("Projectile template '{}' replaced", name);
            self.pools.remove(&name);
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    pub fn template(&self, name: &str) -> Option<&ProjectileTemplate> {
        self.templates.get(name)
    }

    /// Acquire from the named template's pool, creating the pool on first use.
    /// Unknown names are logged and yield `None`.
    pub fn spawn(
        &mut self,
        name: &str,
        position: Vec3,
        rotation: Quat,
    ) -> Option<ProjectileHandle> {
        let Some(template) = self.templates.get(name) else {
            warn!("No projectile template named '{}'", name);
            return None;
        };

        let config = self.pool_config;
        let pool = self.pools.entry(name.to_string()).or_insert_with(|| {
            info!("Creating pool for '{}'", name);
            ProjectilePool::new(template.clone(), config)
        });
        Some(pool.acquire(position, rotation))
    }

    pub fn pool(&self, name: &str) -> Option<&ProjectilePool> {
        self.pools.get(name)
    }

    pub fn pool_mut(&mut self, name: &str) -> Option<&mut ProjectilePool> {
        self.pools.get_mut(name)
    }

    /// All pools created so far
    pub fn pools_mut(&mut self) -> impl Iterator<Item = (&str, &mut ProjectilePool)> {
        self.pools.iter_mut().map(|(name, pool)| (name.as_str(), pool))
    }

    pub fn pools(&self) -> impl Iterator<Item = (&str, &ProjectilePool)> {
        self.pools.iter().map(|(name, pool)| (name.as_str(), pool))
    }

    /// Projectiles in flight across all pools
    pub fn active_count(&self) -> usize {
        self.pools.values().map(ProjectilePool::active_count).sum()
    }

    pub fn clear_active(&mut self) {
        for pool in self.pools.values_mut() {
            pool.clear_active();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_created_on_first_spawn() {
        let mut arsenal = ProjectileArsenal::new(PoolConfig {
            initial_size: 4,
            max_size: 8,
        });
        arsenal.register(ProjectileTemplate::homing("missile"));
        assert!(arsenal.pool("missile").is_none());

        let handle = arsenal.spawn("missile", Vec3::ZERO, Quat::IDENTITY);
        assert!(handle.is_some());
        let pool = arsenal.pool("missile").unwrap();
        assert_eq!(pool.total_count(), 4);
        assert_eq!(pool.active_count(), 1);
        assert_eq!(arsenal.active_count(), 1);
    }

    #[test]
    fn test_unknown_template_is_skipped() {
        let mut arsenal = ProjectileArsenal::default();
        assert_eq!(arsenal.spawn("ghost", Vec3::ZERO, Quat::IDENTITY), None);
        assert_eq!(arsenal.pools().count(), 0);
    }

    #[test]
    fn test_pools_are_per_template() {
        let mut arsenal = ProjectileArsenal::new(PoolConfig::default());
        arsenal.register(ProjectileTemplate::straight("bullet"));
        arsenal.register(ProjectileTemplate::grenade("grenade"));

        arsenal.spawn("bullet", Vec3::ZERO, Quat::IDENTITY);
        arsenal.spawn("bullet", Vec3::ZERO, Quat::IDENTITY);
        arsenal.spawn("grenade", Vec3::ZERO, Quat::IDENTITY);

        assert_eq!(arsenal.pool("bullet").unwrap().active_count(), 2);
        assert_eq!(arsenal.pool("grenade").unwrap().active_count(), 1);

        arsenal.clear_active();
        assert_eq!(arsenal.active_count(), 0);
    }
}
