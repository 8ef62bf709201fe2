//! Elementum ECS - generational entity storage
//!
//! Entities are compact index + generation handles. A handle outlives the value
//! it names: once the slot is freed or reused, lookups through the old handle
//! fail instead of reaching the new occupant.

mod arena;
mod entity;

pub use arena::Arena;
pub use entity::Entity;
