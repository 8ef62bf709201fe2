use std::collections::VecDeque;
use std::fmt;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{Projectile, ProjectileTemplate};
use crate::config::ConfigError;

/// Pool sizing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Instances created up front
    pub initial_size: usize,
    /// Instances the pool may grow to before recycling active ones
    pub max_size: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            initial_size: 20,
            max_size: 100,
        }
    }
}

impl PoolConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_size == 0 {
            return Err(ConfigError::EmptyPool);
        }
        if self.max_size < self.initial_size {
            return Err(ConfigError::PoolSize {
                initial: self.initial_size,
                max: self.max_size,
            });
        }
        Ok(())
    }
}

/// Generational handle to a pooled projectile. Becomes stale once the
/// instance is released or recycled.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectileHandle {
    index: u32,
    generation: u32,
}

impl ProjectileHandle {
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for ProjectileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Projectile({}v{})", self.index, self.generation)
    }
}

/// Pool counters for debug displays
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolOccupancy {
    pub name: String,
    pub active: usize,
    pub available: usize,
    pub total: usize,
    pub recycled: u64,
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    active: bool,
    projectile: Projectile,
}

/// Reuses projectile instances of one template.
///
/// When every instance is in flight and the pool is at `max_size`, the oldest
/// active instance is recycled rather than failing the request.
#[derive(Debug)]
pub struct ProjectilePool {
    template: ProjectileTemplate,
    config: PoolConfig,
    slots: Vec<Slot>,
    available: VecDeque<u32>,
    /// Oldest first
    active: VecDeque<u32>,
    recycled: u64,
}

impl ProjectilePool {
    pub fn new(template: ProjectileTemplate, config: PoolConfig) -> Self {
        let mut pool = Self {
            template,
            config,
            slots: Vec::new(),
            available: VecDeque::new(),
            active: VecDeque::new(),
            recycled: 0,
        };

        let prewarm = config.initial_size.min(config.max_size);
        for _ in 0..prewarm {
            let index = pool.grow();
            pool.available.push_back(index);
        }

        debug!(
            "Pool '{}' created with {} instances (max {})",
            pool.template.name, prewarm, config.max_size
        );
        pool
    }

    fn grow(&mut self) -> u32 {
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            active: false,
            projectile: Projectile::from_template(&self.template),
        });
        index
    }

    /// Take an instance, reset to `position`/`rotation`. Never fails.
    pub fn acquire(&mut self, position: Vec3, rotation: Quat) -> ProjectileHandle {
        let index = match self.available.pop_front() {
            Some(index) => index,
            None if self.slots.len() < self.config.max_size => self.grow(),
            None => match self.active.pop_front() {
                Some(oldest) => {
                    self.recycled += 1;
                    warn!(
                        "Pool '{}' exhausted at {}, recycling oldest projectile",
                        self.template.name, self.config.max_size
                    );
                    let slot = &mut self.slots[oldest as usize];
                    slot.generation = slot.generation.wrapping_add(1);
                    oldest
                }
                None => self.grow(),
            },
        };

        let slot = &mut self.slots[index as usize];
        slot.active = true;
        slot.projectile.reset(position, rotation, &self.template);
        self.active.push_back(index);

        ProjectileHandle {
            index,
            generation: slot.generation,
        }
    }

    /// Deactivate and re-queue. Returns false for stale or inactive handles.
    pub fn release(&mut self, handle: ProjectileHandle) -> bool {
        let Some(slot) = self.slots.get_mut(handle.index as usize) else {
            return false;
        };
        if slot.generation != handle.generation || !slot.active {
            return false;
        }

        slot.active = false;
        slot.generation = slot.generation.wrapping_add(1);
        slot.projectile.reset(Vec3::ZERO, Quat::IDENTITY, &self.template);

        if let Some(pos) = self.active.iter().position(|&index| index == handle.index) {
            self.active.remove(pos);
        }
        self.available.push_back(handle.index);
        true
    }

    /// Release every active instance
    pub fn clear_active(&mut self) {
        for handle in self.active_handles() {
            self.release(handle);
        }
    }

    pub fn get(&self, handle: ProjectileHandle) -> Option<&Projectile> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.active && slot.generation == handle.generation)
            .map(|slot| &slot.projectile)
    }

    pub fn get_mut(&mut self, handle: ProjectileHandle) -> Option<&mut Projectile> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.active && slot.generation == handle.generation)
            .map(|slot| &mut slot.projectile)
    }

    pub fn is_active(&self, handle: ProjectileHandle) -> bool {
        self.get(handle).is_some()
    }

    /// Handles of active instances, oldest first
    pub fn active_handles(&self) -> Vec<ProjectileHandle> {
        self.active
            .iter()
            .map(|&index| ProjectileHandle {
                index,
                generation: self.slots[index as usize].generation,
            })
            .collect()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn available_count(&self) -> usize {
        self.available.len()
    }

    /// Instances owned by the pool, active or not
    pub fn total_count(&self) -> usize {
        self.slots.len()
    }

    /// Active instances forcibly recycled because the pool was full
    pub fn recycled_count(&self) -> u64 {
        self.recycled
    }

    pub fn occupancy(&self) -> PoolOccupancy {
        PoolOccupancy {
            name: self.template.name.clone(),
            active: self.active_count(),
            available: self.available_count(),
            total: self.total_count(),
            recycled: self.recycled,
        }
    }

    pub fn template(&self) -> &ProjectileTemplate {
        &self.template
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }
}
