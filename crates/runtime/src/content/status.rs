use std::fmt;
use std::sync::Arc;

use super::hooks::{BearerHooks, no_hooks};
use crate::combatant::Combatant;

/// A condition that can sit on a combatant for a number of rounds.
///
/// Status effects are shared content; a combatant tracks its own remaining
/// turns in an [`AppliedStatusEffect`]. Two statuses are the same status only
/// when they are the same allocation.
pub struct StatusEffect {
    pub name: String,
    pub description: String,
    /// Whether non-forced removal (cures) may take it off.
    pub curable: bool,
    /// Upper bound on remaining turns.
    pub max_turns: u32,
    /// Dropped when the battle ends instead of persisting on the combatant.
    pub removed_at_battle_end: bool,
    hooks: Arc<dyn BearerHooks>,
}

impl StatusEffect {
    pub fn new(name: impl Into<String>, max_turns: u32) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            curable: true,
            max_turns,
            removed_at_battle_end: true,
            hooks: no_hooks(),
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_curable(mut self, curable: bool) -> Self {
        self.curable = curable;
        self
    }

    #[must_use]
    pub fn with_removed_at_battle_end(mut self, removed: bool) -> Self {
        self.removed_at_battle_end = removed;
        self
    }

    #[must_use]
    pub fn with_hooks(mut self, hooks: Arc<dyn BearerHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn init(&self, bearer: &Combatant) {
        self.hooks.init(bearer);
    }

    pub fn deinit(&self, bearer: &Combatant) {
        self.hooks.deinit(bearer);
    }
}

impl fmt::Debug for StatusEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusEffect")
            .field("name", &self.name)
            .field("curable", &self.curable)
            .field("max_turns", &self.max_turns)
            .field("removed_at_battle_end", &self.removed_at_battle_end)
            .finish_non_exhaustive()
    }
}

/// A status effect on a specific combatant.
#[derive(Clone, Debug)]
pub struct AppliedStatusEffect {
    pub status: Arc<StatusEffect>,
    pub turns_remaining: u32,
}

impl AppliedStatusEffect {
    pub fn is(&self, status: &Arc<StatusEffect>) -> bool {
        Arc::ptr_eq(&self.status, status)
    }
}
