//! Projectile and damage statistics for balancing

use std::collections::BTreeMap;
use std::fmt::Write;

use serde::Serialize;

/// Shots and hits for one projectile type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TypeCounters {
    pub shots: u64,
    pub hits: u64,
}

impl TypeCounters {
    pub fn accuracy(&self) -> f32 {
        accuracy(self.hits, self.shots)
    }
}

/// Running combat counters
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProjectileStats {
    pub shots_fired: u64,
    pub hits: u64,
    pub kills: u64,
    pub damage_dealt: i64,
    pub aoe_hits: u64,
    /// Projectiles that expired without impact, or were recycled in flight
    pub misses: u64,
    /// In-flight projectiles reclaimed by a full pool
    pub recycled: u64,
    pub by_type: BTreeMap<String, TypeCounters>,
}

fn accuracy(hits: u64, shots: u64) -> f32 {
    if shots == 0 {
        0.0
    } else {
        hits as f32 / shots as f32 * 100.0
    }
}

impl ProjectileStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_shot(&mut self, kind: &str) {
        self.shots_fired += 1;
        self.by_type.entry(kind.to_string()).or_default().shots += 1;
    }

    /// A shot that connected. Counted once per projectile, however many
    /// enemies its impact touched.
    pub fn record_hit(&mut self, kind: &str) {
        self.hits += 1;
        self.by_type.entry(kind.to_string()).or_default().hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    /// A shot cut short because its pool handed the instance to a new shot
    pub fn record_recycled(&mut self) {
        self.recycled += 1;
        self.misses += 1;
    }

    pub fn record_damage(&mut self, amount: i32) {
        self.damage_dealt += i64::from(amount);
    }

    pub fn record_aoe_hit(&mut self) {
        self.aoe_hits += 1;
    }

    pub fn record_kill(&mut self) {
        self.kills += 1;
    }

    /// Hit percentage over all shots
    pub fn accuracy(&self) -> f32 {
        accuracy(self.hits, self.shots_fired)
    }

    pub fn type_accuracy(&self, kind: &str) -> f32 {
        self.by_type.get(kind).map_or(0.0, TypeCounters::accuracy)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Human-readable summary
    pub fn report(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Shots fired: {}", self.shots_fired);
        let _ = writeln!(out, "Hits: {} ({:.1}% accuracy)", self.hits, self.accuracy());
        let _ = writeln!(out, "Misses: {} ({} recycled)", self.misses, self.recycled);
        let _ = writeln!(out, "AOE hits: {}", self.aoe_hits);
        let _ = writeln!(out, "Kills: {}", self.kills);
        let _ = writeln!(out, "Damage dealt: {}", self.damage_dealt);
        for (kind, counters) in &self.by_type {
            let _ = writeln!(
                out,
                "  {kind}: {}/{} ({:.1}%)",
                counters.hits,
                counters.shots,
                counters.accuracy()
            );
        }
        out
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
