//! Elemental affinities.
//!
//! Elements are immutable content shared behind `Arc`. An element knows how
//! strongly it hits every other element; pairs it does not list hit at 1x.

use std::collections::HashMap;

/// Identity of an element.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumIter, strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum ElementKind {
    Fire,
    Stone,
    Earth,
    Ice,
    Air,
    Water,
}

/// An elemental affinity a combatant can attack with or defend as.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Element {
    pub kind: ElementKind,
    pub name: String,
    /// Scales the base nova cost of attacking with this element.
    pub apply_cost_multiplier: f64,
    /// Damage multiplier when this element hits the keyed element.
    pub multipliers: HashMap<ElementKind, f64>,
}

impl Element {
    /// Creates an element with neutral multipliers against everything.
    pub fn new(kind: ElementKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            apply_cost_multiplier: 1.0,
            multipliers: HashMap::new(),
        }
    }

    /// Sets the multiplier against another element (builder pattern).
    #[must_use]
    pub fn with_multiplier(mut self, against: ElementKind, multiplier: f64) -> Self {
        self.multipliers.insert(against, multiplier);
        self
    }

    /// Sets the cost multiplier (builder pattern).
    #[must_use]
    pub fn with_cost_multiplier(mut self, multiplier: f64) -> Self {
        self.apply_cost_multiplier = multiplier;
        self
    }

    /// Multiplier of this element against `defending`; 1.0 when unlisted.
    pub fn multiplier_against(&self, defending: ElementKind) -> f64 {
        self.multipliers.get(&defending).copied().unwrap_or(1.0)
    }
}
