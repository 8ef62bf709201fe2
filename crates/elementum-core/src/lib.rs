//! Elementum Core - Core types and utilities for the Elementum combat simulation
//!
//! This crate provides the foundational types used throughout the workspace:
//! - Mathematical primitives (re-exported from glam)
//! - Transform used for projectile and turret orientation
//! - Fixed-step simulation clock
//! - Colors for element tinting

pub mod time;
pub mod types;

pub use glam::{Quat, Vec3};
pub use time::{GameTime, TimeConfig, TimeConfigError};
pub use types::{Color, Transform};
