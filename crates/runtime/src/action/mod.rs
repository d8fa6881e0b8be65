//! Actions: what a combatant does with its turn.
//!
//! An [`Action`] is decided before the round starts and executed later, so
//! its legality is checked again at execution time. Impossible actions are
//! skipped silently rather than failing the round.

mod execute;
mod validation;

use std::fmt;
use std::sync::Arc;

use battle_core::Element;
use rand::Rng;

pub use validation::Impossible;

use crate::combatant::Combatant;
use crate::content::{Usable, UsableItem};

/// Number of uniform random draws an action carries.
pub const RANDOM_DRAWS: usize = 4;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// Basic or elemental attack against one target.
    Attack,
    /// A move, item, or mask.
    Use,
    Pass,
    Flee,
    /// Hands a usable item to an ally.
    Give,
    /// An action type the engine does not know how to execute.
    Custom(String),
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attack => f.write_str("attack"),
            Self::Use => f.write_str("use"),
            Self::Pass => f.write_str("pass"),
            Self::Flee => f.write_str("flee"),
            Self::Give => f.write_str("give"),
            Self::Custom(name) => f.write_str(name),
        }
    }
}

/// Who an action is aimed at.
#[derive(Clone, Debug, Default)]
pub enum Target {
    #[default]
    None,
    Single(Combatant),
    Multiple(Vec<Combatant>),
}

impl Target {
    pub fn single(&self) -> Option<&Combatant> {
        match self {
            Self::Single(target) => Some(target),
            _ => None,
        }
    }
}

/// A decided move for one turn.
///
/// Actions are plain values; listeners that receive one in an event may
/// rewrite any field, and the rewritten copy is what resolution continues
/// with.
#[derive(Clone, Debug)]
pub struct Action {
    pub kind: ActionKind,
    pub executor: Combatant,
    pub target: Target,
    /// Required for `Use` and `Give`.
    pub usable: Option<Usable>,
    /// Turns an attack into an elemental attack.
    pub element: Option<Arc<Element>>,
    /// Uniform draws in `[0, 1)`, taken when the action is created so that a
    /// decided action resolves deterministically.
    pub randoms: [f64; RANDOM_DRAWS],
    /// Computed when an attack executes.
    pub damage: Option<i64>,
    pub instantaneous: bool,
}

impl Action {
    pub fn new(kind: ActionKind, executor: Combatant, target: Target) -> Self {
        Self {
            kind,
            executor,
            target,
            usable: None,
            element: None,
            randoms: draw_randoms(&mut rand::thread_rng()),
            damage: None,
            instantaneous: false,
        }
    }

    pub fn attack(executor: Combatant, target: Combatant) -> Self {
        Self::new(ActionKind::Attack, executor, Target::Single(target))
    }

    pub fn elemental_attack(executor: Combatant, target: Combatant, element: Arc<Element>) -> Self {
        let mut action = Self::attack(executor, target);
        action.element = Some(element);
        action
    }

    pub fn use_on(executor: Combatant, usable: Usable, target: Target) -> Self {
        let mut action = Self::new(ActionKind::Use, executor, target);
        action.usable = Some(usable);
        action
    }

    pub fn pass(executor: Combatant) -> Self {
        Self::new(ActionKind::Pass, executor, Target::None)
    }

    pub fn flee(executor: Combatant) -> Self {
        Self::new(ActionKind::Flee, executor, Target::None)
    }

    pub fn give(executor: Combatant, recipient: Combatant, item: Arc<UsableItem>) -> Self {
        let mut action = Self::new(ActionKind::Give, executor, Target::Single(recipient));
        action.usable = Some(Usable::Item(item));
        action
    }

    #[must_use]
    pub fn instantaneous(mut self, instantaneous: bool) -> Self {
        self.instantaneous = instantaneous;
        self
    }

    #[must_use]
    pub fn with_randoms(mut self, randoms: [f64; RANDOM_DRAWS]) -> Self {
        self.randoms = randoms;
        self
    }

    /// Replaces the random draws with ones from `rng`.
    pub fn redraw(&mut self, rng: &mut impl Rng) {
        self.randoms = draw_randoms(rng);
    }
}

pub fn draw_randoms(rng: &mut impl Rng) -> [f64; RANDOM_DRAWS] {
    std::array::from_fn(|_| rng.r#gen::<f64>())
}
