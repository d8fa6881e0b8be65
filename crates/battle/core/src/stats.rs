//! Stat collections and resource pools.
//!
//! A [`StatCollection`] is either the default stats stored in a template or
//! the live stats owned by one combatant. Combatants receive a copy at
//! creation, so mutating live stats never leaks back into shared content.
//!
//! Resource pools (`hp`, `nova`) are always clamped into `[0, max]`. Going out
//! of range is never an error.

use crate::error::{CoreError, Result};

/// A resource pool that can be damaged or healed.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumIter, strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Resource {
    /// Health points. Reaching zero knocks the owner out.
    #[default]
    Hp,
    /// Secondary pool spent on elemental attacks and special moves.
    Nova,
}

/// Flat record of current and maximum stat values.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatCollection {
    pub hp: i32,
    pub max_hp: i32,
    pub nova: i32,
    pub max_nova: i32,

    pub attack: i32,
    pub defense: i32,
    pub el_attack: i32,
    pub el_defense: i32,
    pub speed: i32,

    pub evasion: i32,
    pub accuracy: i32,
    pub critical: i32,

    pub level: i32,
    pub xp: i32,
}

impl StatCollection {
    /// Creates a collection with full pools and neutral combat stats.
    pub const fn with_pools(max_hp: i32, max_nova: i32) -> Self {
        Self {
            hp: max_hp,
            max_hp,
            nova: max_nova,
            max_nova,
            attack: 1,
            defense: 0,
            el_attack: 1,
            el_defense: 0,
            speed: 1,
            evasion: 0,
            accuracy: 100,
            critical: 0,
            level: 1,
            xp: 0,
        }
    }

    /// Current value of a resource pool.
    pub const fn current(&self, resource: Resource) -> i32 {
        match resource {
            Resource::Hp => self.hp,
            Resource::Nova => self.nova,
        }
    }

    /// Maximum value of a resource pool.
    pub const fn maximum(&self, resource: Resource) -> i32 {
        match resource {
            Resource::Hp => self.max_hp,
            Resource::Nova => self.max_nova,
        }
    }

    /// Sets a resource pool, clamped into `[0, max]`. Returns the stored value.
    pub fn set_clamped(&mut self, resource: Resource, value: i64) -> i32 {
        let max = self.maximum(resource).max(0);
        let value = value.clamp(0, max as i64) as i32;
        match resource {
            Resource::Hp => self.hp = value,
            Resource::Nova => self.nova = value,
        }
        value
    }

    /// Subtracts from a pool, clamping at zero. Returns the new value.
    pub fn subtract(&mut self, resource: Resource, amount: i64) -> i32 {
        let next = self.current(resource) as i64 - amount;
        self.set_clamped(resource, next)
    }

    /// Adds to a pool, clamping at its maximum. Returns the new value.
    pub fn add(&mut self, resource: Resource, amount: i64) -> i32 {
        let next = self.current(resource) as i64 + amount;
        self.set_clamped(resource, next)
    }

    /// Checks the pool invariants. Used for hand-authored content and restored snapshots.
    pub fn validate(&self) -> Result<()> {
        for resource in [Resource::Hp, Resource::Nova] {
            let current = self.current(resource);
            let maximum = self.maximum(resource);
            if current < 0 || current > maximum {
                return Err(CoreError::InvalidStats {
                    resource,
                    current,
                    maximum,
                });
            }
        }
        Ok(())
    }
}

impl Default for StatCollection {
    fn default() -> Self {
        Self::with_pools(10, 10)
    }
}

/// Rounds a floating amount to the nearest integer, halves away from zero.
pub fn round_amount(amount: f64) -> i64 {
    if amount.is_finite() {
        amount.round() as i64
    } else if amount.is_sign_positive() {
        i64::MAX / 2
    } else {
        i64::MIN / 2
    }
}
