use tracing::debug;

use super::{DotTick, EffectSnapshot, EffectState, StatusEffect, StatusEffectType};

/// Movement system driven by the registry's aggregate speed modifier.
pub trait SpeedControl {
    /// Set the multiplier applied to base movement speed (0.0 = stopped).
    fn set_speed_modifier(&mut self, modifier: f32);

    /// Recompute cached velocity after a slow or freeze ends.
    fn refresh_path(&mut self) {}
}

/// Targets without movement (training dummies, tests).
impl SpeedControl for () {
    fn set_speed_modifier(&mut self, _modifier: f32) {}
}

/// Lifecycle notifications, drained by observers such as status icon displays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatusEvent {
    Applied { kind: StatusEffectType, duration: f32 },
    Stacked { kind: StatusEffectType, stacks: u32 },
    Refreshed { kind: StatusEffectType },
    Expired { kind: StatusEffectType },
    Removed { kind: StatusEffectType },
}

/// What happened when an effect was submitted to the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// No effect of this kind was active; the new one was inserted.
    Inserted,
    /// An effect of this kind was active; the incoming one was discarded.
    Reapplied { stacked: bool, refreshed: bool },
}

impl ApplyOutcome {
    /// True when a re-application changed nothing (e.g. Freeze while frozen).
    pub fn is_ignored(self) -> bool {
        matches!(
            self,
            Self::Reapplied {
                stacked: false,
                refreshed: false
            }
        )
    }
}

/// Result of one registry tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusTick {
    /// Damage-over-time ticks produced this step, in effect order
    pub damage: Vec<DotTick>,
    /// Kinds that expired this step
    pub ended: Vec<StatusEffectType>,
}

impl StatusTick {
    pub fn slow_ended(&self) -> bool {
        self.ended.contains(&StatusEffectType::Slow)
    }

    pub fn freeze_ended(&self) -> bool {
        self.ended.contains(&StatusEffectType::Freeze)
    }

    pub fn total_damage(&self) -> i32 {
        self.damage.iter().map(|tick| tick.amount).sum()
    }
}

/// Owns all active status effects on one target.
///
/// At most one effect per kind is active; re-application stacks and/or
/// refreshes the existing instance.
#[derive(Debug, Clone)]
pub struct StatusRegistry {
    effects: Vec<StatusEffect>,
    speed_multiplier: f32,
    frozen: bool,
    events: Vec<StatusEvent>,
}

impl Default for StatusRegistry {
    fn default() -> Self {
        Self {
            effects: Vec::new(),
            speed_multiplier: 1.0,
            frozen: false,
            events: Vec::new(),
        }
    }
}

impl StatusRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Submit an effect. Stacking and refreshing are checked independently.
    pub fn apply(&mut self, mut effect: StatusEffect) -> ApplyOutcome {
        let kind = effect.kind();

        if let Some(existing) = self.effects.iter_mut().find(|e| e.kind() == kind) {
            let stacked = existing.add_stack();
            if stacked {
                self.events.push(StatusEvent::Stacked {
                    kind,
                    stacks: existing.stack_count(),
                });
            }

            let refreshed = existing.refresh();
            if refreshed {
                self.events.push(StatusEvent::Refreshed { kind });
            }

            debug!(
                "{} reapplied (stacks {}/{}, refreshed: {})",
                kind.name(),
                existing.stack_count(),
                existing.max_stacks(),
                refreshed
            );
            return ApplyOutcome::Reapplied { stacked, refreshed };
        }

        let duration = effect.max_duration();
        effect.initialize(duration);
        debug!("{} applied for {:.1}s", kind.name(), duration);
        self.events.push(StatusEvent::Applied { kind, duration });
        self.effects.push(effect);
        self.recalculate();
        ApplyOutcome::Inserted
    }

    /// Forcibly remove an effect (cleanse). Returns true if one was active.
    pub fn remove(&mut self, kind: StatusEffectType) -> bool {
        let Some(pos) = self.effects.iter().position(|e| e.kind() == kind) else {
            return false;
        };
        self.effects.remove(pos);
        self.events.push(StatusEvent::Removed { kind });
        self.recalculate();
        true
    }

    /// Remove all effects
    pub fn clear(&mut self) {
        for effect in self.effects.drain(..) {
            self.events.push(StatusEvent::Removed {
                kind: effect.kind(),
            });
        }
        self.recalculate();
    }

    /// Advance every effect, drop expired ones, and push the new speed
    /// modifier into `movement`.
    pub fn tick<M: SpeedControl + ?Sized>(&mut self, delta: f32, movement: &mut M) -> StatusTick {
        let mut report = StatusTick::default();

        for effect in &mut self.effects {
            if let Some(dot) = effect.tick(delta) {
                report.damage.push(dot);
            }
        }

        let events = &mut self.events;
        self.effects.retain(|effect| {
            if !effect.is_expired() {
                return true;
            }
            let kind = effect.kind();
            debug!("{} expired", kind.name());
            events.push(StatusEvent::Expired { kind });
            report.ended.push(kind);
            false
        });

        self.recalculate();
        movement.set_speed_modifier(self.speed_multiplier);
        if report.slow_ended() || report.freeze_ended() {
            movement.refresh_path();
        }

        report
    }

    fn recalculate(&mut self) {
        self.speed_multiplier = 1.0;
        self.frozen = false;

        for effect in &self.effects {
            match effect.state() {
                EffectState::Freeze => {
                    self.frozen = true;
                    self.speed_multiplier = 0.0;
                    return;
                }
                EffectState::Slow { multiplier } => self.speed_multiplier *= multiplier,
                _ => {}
            }
        }
    }

    /// Product of active slow multipliers, or 0.0 while frozen
    pub fn speed_multiplier(&self) -> f32 {
        self.speed_multiplier
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn get(&self, kind: StatusEffectType) -> Option<&StatusEffect> {
        self.effects.iter().find(|e| e.kind() == kind)
    }

    pub fn has(&self, kind: StatusEffectType) -> bool {
        self.get(kind).is_some()
    }

    /// Active effects in application order
    pub fn effects(&self) -> &[StatusEffect] {
        &self.effects
    }

    pub fn snapshot(&self) -> Vec<EffectSnapshot> {
        self.effects.iter().map(StatusEffect::snapshot).collect()
    }

    /// Take all lifecycle events recorded since the last drain
    pub fn drain_events(&mut self) -> Vec<StatusEvent> {
        std::mem::take(&mut self.events)
    }

    /// Number of active effects
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}
