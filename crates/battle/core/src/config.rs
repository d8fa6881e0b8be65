use crate::error::{CoreError, Result};

/// Battle tunables shared by every combatant in a session.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BattleConfig {
    /// Damage constant `k` in `attack * k / (k + defense)`.
    pub damage_constant: f64,
    /// Nova cost of an elemental attack before the element's cost multiplier.
    pub elemental_base_cost: i32,
    /// Maximum number of items a combatant can carry.
    pub inventory_capacity: usize,
    /// Flee chance used by templates that do not set their own.
    pub default_flee_chance: f64,
}

impl BattleConfig {
    // ===== runtime-tunable defaults =====
    pub const DEFAULT_DAMAGE_CONSTANT: f64 = 10.0;
    pub const DEFAULT_ELEMENTAL_BASE_COST: i32 = 1;
    pub const DEFAULT_INVENTORY_CAPACITY: usize = 8;
    pub const DEFAULT_FLEE_CHANCE: f64 = 0.5;

    pub const fn new() -> Self {
        Self {
            damage_constant: Self::DEFAULT_DAMAGE_CONSTANT,
            elemental_base_cost: Self::DEFAULT_ELEMENTAL_BASE_COST,
            inventory_capacity: Self::DEFAULT_INVENTORY_CAPACITY,
            default_flee_chance: Self::DEFAULT_FLEE_CHANCE,
        }
    }

    /// Rejects tunables that would make the formulas meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.damage_constant <= 0.0 {
            return Err(CoreError::NonPositive {
                name: "damage_constant",
                value: self.damage_constant,
            });
        }
        if !(0.0..=1.0).contains(&self.default_flee_chance) {
            return Err(CoreError::ChanceOutOfRange {
                name: "default_flee_chance",
                value: self.default_flee_chance,
            });
        }
        Ok(())
    }
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self::new()
    }
}
