//! Round lifecycle.

use battle_core::{BattleError, Outcome};
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use super::{BattleSession, SessionStatus};
use crate::action::Action;
use crate::api::{Result, RuntimeError};
use crate::combatant::Combatant;
use crate::events::SessionEvent;
use crate::lock;

impl BattleSession {
    /// Executes decided actions one after another, each as its executor's
    /// turn, then reports the win condition.
    pub async fn do_actions(
        &self,
        actions: Vec<Action>,
        instantaneous: bool,
    ) -> Result<Option<Outcome>> {
        if actions.is_empty() {
            return Err(RuntimeError::NoActions);
        }
        for action in actions {
            let executor = action.executor.clone();
            executor.do_turn(action, instantaneous).await?;
        }
        Ok(self.check_win_condition())
    }

    /// Plays rounds until the battle ends and returns the outcome.
    ///
    /// Stops with an error when a round fails or the configured round cap is
    /// reached; the session is then marked failed.
    pub async fn start_round(&self, instantaneous: bool) -> Result<Outcome> {
        loop {
            if let Some(outcome) = self.play_round(instantaneous).await? {
                return Ok(outcome);
            }
            let cap = self.config().max_rounds;
            if cap > 0 && self.round() >= cap {
                let err = RuntimeError::RoundLimitReached(cap);
                self.fail(&err);
                return Err(err);
            }
        }
    }

    /// Plays one round.
    ///
    /// Returns the outcome if the battle ended this round. Any error aborts
    /// the round where it happened, marks the session failed, and is
    /// returned; later rounds then refuse to start.
    pub async fn play_round(&self, instantaneous: bool) -> Result<Option<Outcome>> {
        if self.is_over() {
            return Err(RuntimeError::SessionOver);
        }
        let result = self.resolve_round(instantaneous).await;
        if let Err(err) = &result {
            self.fail(err);
        }
        result
    }

    async fn resolve_round(&self, instantaneous: bool) -> Result<Option<Outcome>> {
        let round = {
            let mut state = lock(&self.shared.state);
            state.round += 1;
            state.round
        };
        if round == 1 {
            self.publish(SessionEvent::BattleStarted {
                allies: self.allies().len(),
                foes: self.foes().len(),
            });
        }
        info!(target: "battle::session", round, "Round started");
        self.publish(SessionEvent::RoundStarted { round });

        let order = self.turn_order();
        if order.is_empty() {
            return Err(RuntimeError::NoActiveCombatants);
        }

        let actions = self.decide_actions(&order, instantaneous).await?;
        for combatant in &order {
            combatant.begin_round(instantaneous).await?;
        }
        self.do_actions(actions, instantaneous).await?;

        for combatant in &self.turn_order() {
            combatant.end_round(instantaneous).await?;
        }
        self.prune_eliminated(round);
        self.publish(SessionEvent::RoundEnded { round });

        let outcome = self.check_win_condition();
        if let Some(outcome) = outcome {
            self.finish(round, outcome);
        }
        Ok(outcome)
    }

    /// Asks every combatant for an action concurrently. Results keep turn
    /// order regardless of completion order.
    async fn decide_actions(
        &self,
        order: &[Combatant],
        instantaneous: bool,
    ) -> Result<Vec<Action>> {
        let mut pending = JoinSet::new();
        for (index, combatant) in order.iter().cloned().enumerate() {
            let session = self.clone();
            pending.spawn(async move {
                let decided = combatant.determine_action(&session, instantaneous).await;
                (index, decided)
            });
        }

        let mut decided: Vec<Option<Action>> = vec![None; order.len()];
        while let Some(joined) = pending.join_next().await {
            let (index, action) = joined.map_err(RuntimeError::ProviderJoin)?;
            decided[index] = Some(action?);
        }
        debug!(target: "battle::session", count = decided.len(), "Actions decided");
        Ok(decided.into_iter().flatten().collect())
    }

    /// Removes knocked-out combatants that do not survive knockout.
    fn prune_eliminated(&self, round: u32) {
        let eliminated: Vec<Combatant> = {
            let mut guard = lock(&self.shared.state);
            let state = &mut *guard;
            let mut eliminated = Vec::new();
            for roster in [&mut state.allies, &mut state.foes] {
                roster.retain(|combatant| {
                    let gone = combatant.is_knocked_out() && !combatant.survives_knockout();
                    if gone {
                        eliminated.push(combatant.clone());
                    }
                    !gone
                });
            }
            eliminated
        };

        for combatant in eliminated {
            info!(target: "battle::session", round, combatant = %combatant, "Combatant eliminated");
            self.publish(SessionEvent::CombatantEliminated {
                round,
                name: combatant.name().to_owned(),
            });
        }
    }

    fn finish(&self, round: u32, outcome: Outcome) {
        lock(&self.shared.state).status = SessionStatus::Over(outcome);
        for combatant in self.allies().iter().chain(&self.foes()) {
            combatant.remove_battle_end_statuses();
        }
        info!(target: "battle::session", round, %outcome, "Battle over");
        self.publish(SessionEvent::BattleOver { round, outcome });
    }

    fn fail(&self, err: &RuntimeError) {
        let round = {
            let mut state = lock(&self.shared.state);
            state.status = SessionStatus::Failed(err.to_string());
            state.round
        };
        error!(
            target: "battle::session",
            round,
            error = %err,
            code = err.error_code(),
            severity = err.severity().as_str(),
            "Round aborted"
        );
        self.publish(SessionEvent::SessionFailed {
            round,
            error: err.to_string(),
        });
    }
}
