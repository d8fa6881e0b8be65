//! Asynchronous abstraction for sourcing combatant intent.
//!
//! The session asks every combatant for an action at the start of each
//! round through an [`ActionProvider`], so a battle can run with player
//! input, scripted fixtures, or AI policies.
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::errors::Result;
use crate::action::{Action, ActionKind, Target};
use crate::combatant::{Combatant, CombatantId};
use crate::lock;
use crate::session::BattleSession;

/// Decides what a combatant does this round.
///
/// Implementations usually pick from `combatant.get_all_actions(..)`, which
/// is already filtered down to legal actions.
#[async_trait]
pub trait ActionProvider: Send + Sync {
    async fn determine_action(
        &self,
        session: &BattleSession,
        combatant: &Combatant,
        instantaneous: bool,
    ) -> Result<Action>;
}

/// Always passes. Useful for tests or as a fallback.
pub struct PassActionProvider;

#[async_trait]
impl ActionProvider for PassActionProvider {
    async fn determine_action(
        &self,
        _session: &BattleSession,
        combatant: &Combatant,
        instantaneous: bool,
    ) -> Result<Action> {
        Ok(Action::pass(combatant.clone()).instantaneous(instantaneous))
    }
}

/// Attacks the first conscious enemy with a plain attack, or passes.
pub struct AggressiveActionProvider;

#[async_trait]
impl ActionProvider for AggressiveActionProvider {
    async fn determine_action(
        &self,
        _session: &BattleSession,
        combatant: &Combatant,
        instantaneous: bool,
    ) -> Result<Action> {
        let action = combatant
            .enemies()
            .into_iter()
            .find(|enemy| !enemy.is_knocked_out())
            .map(|enemy| Action::attack(combatant.clone(), enemy))
            .unwrap_or_else(|| Action::pass(combatant.clone()));
        Ok(action.instantaneous(instantaneous))
    }
}

/// Picks uniformly among legal actions from a seeded generator.
///
/// Actions aimed only at knocked-out combatants are skipped, and fleeing is
/// never chosen. The generator also supplies each action's random draws,
/// so a seed fully determines a battle.
pub struct RandomActionProvider {
    rng: Mutex<StdRng>,
}

impl RandomActionProvider {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

fn worth_taking(action: &Action) -> bool {
    match (&action.kind, &action.target) {
        (ActionKind::Flee, _) => false,
        (_, Target::Single(target)) => !target.is_knocked_out(),
        (_, Target::Multiple(targets)) => targets.iter().any(|t| !t.is_knocked_out()),
        (_, Target::None) => true,
    }
}

#[async_trait]
impl ActionProvider for RandomActionProvider {
    async fn determine_action(
        &self,
        _session: &BattleSession,
        combatant: &Combatant,
        instantaneous: bool,
    ) -> Result<Action> {
        let mut candidates: Vec<Action> = combatant
            .get_all_actions(instantaneous)
            .into_iter()
            .filter(worth_taking)
            .collect();

        let action = {
            let mut rng = lock(&self.rng);
            let mut action = if candidates.is_empty() {
                Action::pass(combatant.clone()).instantaneous(instantaneous)
            } else {
                let index = rng.gen_range(0..candidates.len());
                candidates.swap_remove(index)
            };
            action.redraw(&mut *rng);
            action
        };
        Ok(action)
    }
}

/// Replays queued actions per executor, then passes.
///
/// Useful for fixtures and replays. Queued actions keep their own random
/// draws; only the `instantaneous` flag is overwritten.
#[derive(Default)]
pub struct ScriptedActionProvider {
    queues: Mutex<HashMap<CombatantId, VecDeque<Action>>>,
}

impl ScriptedActionProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `action` for its executor.
    #[must_use]
    pub fn then(self, action: Action) -> Self {
        self.push(action);
        self
    }

    pub fn push(&self, action: Action) {
        lock(&self.queues)
            .entry(action.executor.id())
            .or_default()
            .push_back(action);
    }

    /// Actions still queued for `combatant`.
    pub fn remaining(&self, combatant: &Combatant) -> usize {
        lock(&self.queues)
            .get(&combatant.id())
            .map_or(0, VecDeque::len)
    }
}

#[async_trait]
impl ActionProvider for ScriptedActionProvider {
    async fn determine_action(
        &self,
        _session: &BattleSession,
        combatant: &Combatant,
        instantaneous: bool,
    ) -> Result<Action> {
        let scripted = lock(&self.queues)
            .get_mut(&combatant.id())
            .and_then(VecDeque::pop_front);
        let action = scripted.unwrap_or_else(|| Action::pass(combatant.clone()));
        Ok(action.instantaneous(instantaneous))
    }
}
