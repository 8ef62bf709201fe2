//! Flight laws: how a projectile moves between launch and impact

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Default homing turn rate in degrees per second
pub const DEFAULT_TURN_RATE: f32 = 200.0;
/// Default peak height of an arc
pub const DEFAULT_ARC_HEIGHT: f32 = 3.0;
/// Journeys shorter than this land immediately
pub const MIN_JOURNEY: f32 = 0.01;

/// Vertical profile of an arc, evaluated on progress 0..1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArcCurve {
    /// Rises and falls back to the ground: 4p(1-p)
    #[default]
    Parabola,
    /// Smoothstep from 0 to full height
    EaseInOut,
}

impl ArcCurve {
    pub fn height_factor(self, progress: f32) -> f32 {
        let p = progress.clamp(0.0, 1.0);
        match self {
            Self::Parabola => 4.0 * p * (1.0 - p),
            Self::EaseInOut => p * p * (3.0 - 2.0 * p),
        }
    }
}

/// Movement law of a projectile
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Flight {
    /// Fixed heading toward the launch target point
    #[default]
    Straight,
    /// Blends heading toward the live target every tick
    Homing {
        /// 0 = never turns, 1 = faces the target outright
        strength: f32,
        /// Degrees per second; `None` turns without limit
        max_turn_rate: Option<f32>,
    },
    /// Parametric lob from launch position to the target point
    Arc {
        height: f32,
        #[serde(default)]
        curve: ArcCurve,
        /// Impact early when the live target comes this close
        proximity_radius: Option<f32>,
    },
}

impl Flight {
    pub fn homing() -> Self {
        Self::Homing {
            strength: 1.0,
            max_turn_rate: Some(DEFAULT_TURN_RATE),
        }
    }

    pub fn arc() -> Self {
        Self::Arc {
            height: DEFAULT_ARC_HEIGHT,
            curve: ArcCurve::Parabola,
            proximity_radius: None,
        }
    }

    /// Arc that also checks for its target along the way
    pub fn arc_with_proximity(radius: f32) -> Self {
        Self::Arc {
            height: DEFAULT_ARC_HEIGHT,
            curve: ArcCurve::Parabola,
            proximity_radius: Some(radius),
        }
    }

    /// Whether impact is detected by overlap with enemy hit volumes
    pub fn uses_overlap(&self) -> bool {
        !matches!(self, Self::Arc { .. })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Straight => "straight",
            Self::Homing { .. } => "homing",
            Self::Arc { .. } => "arc",
        }
    }
}

/// Ground track of an arc flight
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcPath {
    start: Vec3,
    end: Vec3,
    journey: f32,
    traveled: f32,
}

impl ArcPath {
    pub fn new(start: Vec3, end: Vec3) -> Self {
        Self {
            start,
            end,
            journey: start.distance(end),
            traveled: 0.0,
        }
    }

    /// Move along the track and return progress in 0..1
    pub fn advance(&mut self, distance: f32) -> f32 {
        self.traveled += distance;
        self.progress()
    }

    pub fn progress(&self) -> f32 {
        if self.journey <= MIN_JOURNEY {
            return 1.0;
        }
        (self.traveled / self.journey).clamp(0.0, 1.0)
    }

    pub fn point_at(&self, progress: f32, height: f32, curve: ArcCurve) -> Vec3 {
        self.start.lerp(self.end, progress) + Vec3::Y * curve.height_factor(progress) * height
    }

    pub fn journey(&self) -> f32 {
        self.journey
    }
}

/// Blend `heading` toward `to_target` by `strength`, turning at most
/// `max_turn` radians.
pub fn steer(heading: Vec3, to_target: Vec3, strength: f32, max_turn: Option<f32>) -> Vec3 {
    let desired = heading
        .lerp(to_target, strength.clamp(0.0, 1.0))
        .normalize_or_zero();
    if desired == Vec3::ZERO {
        return heading;
    }

    let Some(max_turn) = max_turn else {
        return desired;
    };

    let angle = heading.angle_between(desired);
    if angle <= max_turn {
        return desired;
    }

    let axis = heading.cross(desired).normalize_or_zero();
    let axis = if axis == Vec3::ZERO {
        heading.any_orthonormal_vector()
    } else {
        axis
    };
    (Quat::from_axis_angle(axis, max_turn) * heading).normalize()
}
