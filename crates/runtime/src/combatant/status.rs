use std::sync::Arc;

use tracing::{debug, trace};

use super::Combatant;
use super::resources::unexpected;
use crate::api::Result;
use crate::content::{AppliedStatusEffect, StatusEffect};
use crate::events::{BattlerEvent, EventKind, EventPayload};

impl Combatant {
    pub fn has_status(&self, status: &Arc<StatusEffect>) -> bool {
        self.status_turns(status).is_some()
    }

    /// Remaining turns of `status`, if applied.
    pub fn status_turns(&self, status: &Arc<StatusEffect>) -> Option<u32> {
        self.with_state(|state| {
            state
                .statuses
                .iter()
                .find(|applied| applied.is(status))
                .map(|applied| applied.turns_remaining)
        })
    }

    /// Applies `status` for `turns` rounds.
    ///
    /// Immune combatants ignore it. A status that is already applied gains
    /// `turns` (capped at its maximum) without any event. Otherwise
    /// `StatusApplied` is dispatched, listeners may change the turn count,
    /// and the status is inserted and its `init` hook runs. Returns the
    /// dispatched event, if there was one.
    pub async fn apply_status(
        &self,
        status: &Arc<StatusEffect>,
        turns: u32,
        instantaneous: bool,
    ) -> Result<Option<BattlerEvent>> {
        if self.template().is_immune_to(status) {
            trace!(target: "battle::status", combatant = %self, status = %status.name, "Immune");
            return Ok(None);
        }
        if self.extend_status(status, turns) {
            return Ok(None);
        }

        let event = self
            .dispatch(self.event(
                instantaneous,
                EventPayload::StatusApplied {
                    status: Arc::clone(status),
                    turns,
                },
            ))
            .await?;
        let EventPayload::StatusApplied { status, turns } = &event.payload else {
            return Err(unexpected(EventKind::StatusApplied, &event.payload));
        };

        // a listener may have applied it in the meantime
        if self.extend_status(status, *turns) {
            return Ok(Some(event));
        }
        self.with_state_mut(|state| {
            state.statuses.push(AppliedStatusEffect {
                status: Arc::clone(status),
                turns_remaining: (*turns).min(status.max_turns),
            })
        });
        status.init(self);
        debug!(
            target: "battle::status",
            combatant = %self,
            status = %status.name,
            turns,
            "Status applied"
        );
        Ok(Some(event))
    }

    fn extend_status(&self, status: &Arc<StatusEffect>, turns: u32) -> bool {
        self.with_state_mut(|state| {
            match state.statuses.iter_mut().find(|applied| applied.is(status)) {
                Some(applied) => {
                    applied.turns_remaining = applied
                        .turns_remaining
                        .saturating_add(turns)
                        .min(status.max_turns);
                    true
                }
                None => false,
            }
        })
    }

    /// Removes `status` if applied and either curable or `force` is set.
    ///
    /// Dispatches `StatusRemoved` first; a rejecting listener keeps the
    /// status in place. The `deinit` hook runs after removal. Returns the
    /// dispatched event, if there was one.
    pub async fn remove_status(
        &self,
        status: &Arc<StatusEffect>,
        force: bool,
        instantaneous: bool,
    ) -> Result<Option<BattlerEvent>> {
        if !self.has_status(status) || !(status.curable || force) {
            return Ok(None);
        }

        let event = self
            .dispatch(self.event(
                instantaneous,
                EventPayload::StatusRemoved {
                    status: Arc::clone(status),
                    forced: force,
                },
            ))
            .await?;

        let removed = self.with_state_mut(|state| {
            let before = state.statuses.len();
            state.statuses.retain(|applied| !applied.is(status));
            state.statuses.len() != before
        });
        if removed {
            status.deinit(self);
            debug!(
                target: "battle::status",
                combatant = %self,
                status = %status.name,
                forced = force,
                "Status removed"
            );
        }
        Ok(Some(event))
    }

    /// Removes every curable status, or every status when `force` is set.
    ///
    /// This is a bulk reset: each `deinit` hook runs but no `StatusRemoved`
    /// events are dispatched.
    pub fn remove_all_statuses(&self, force: bool) {
        let removed = self.drain_statuses(|applied| applied.status.curable || force);
        for applied in &removed {
            applied.status.deinit(self);
        }
    }

    /// Drops statuses flagged to end with the battle. Same bulk semantics as
    /// [`remove_all_statuses`](Self::remove_all_statuses).
    pub(crate) fn remove_battle_end_statuses(&self) {
        let removed = self.drain_statuses(|applied| applied.status.removed_at_battle_end);
        for applied in &removed {
            applied.status.deinit(self);
        }
    }

    fn drain_statuses(
        &self,
        mut predicate: impl FnMut(&AppliedStatusEffect) -> bool,
    ) -> Vec<AppliedStatusEffect> {
        self.with_state_mut(|state| {
            let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut state.statuses)
                .into_iter()
                .partition(|applied| predicate(applied));
            state.statuses = kept;
            removed
        })
    }

    /// Ticks every status down by one, force-removes the expired ones one
    /// after another, then dispatches `EndRound`.
    pub async fn end_round(&self, instantaneous: bool) -> Result<BattlerEvent> {
        let expired: Vec<Arc<StatusEffect>> = self.with_state_mut(|state| {
            state
                .statuses
                .iter_mut()
                .filter_map(|applied| {
                    applied.turns_remaining = applied.turns_remaining.saturating_sub(1);
                    (applied.turns_remaining == 0).then(|| Arc::clone(&applied.status))
                })
                .collect()
        });

        for status in &expired {
            self.remove_status(status, true, instantaneous).await?;
        }
        self.dispatch(self.event(instantaneous, EventPayload::EndRound))
            .await
    }

    pub async fn begin_round(&self, instantaneous: bool) -> Result<BattlerEvent> {
        self.dispatch(self.event(instantaneous, EventPayload::BeginRound))
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::api::RuntimeError;
    use crate::combatant::test_support::template;
    use crate::content::{Template, hooks_fn};
    use crate::events::handler_fn;

    fn counted_status(inits: &Arc<AtomicUsize>, deinits: &Arc<AtomicUsize>) -> Arc<StatusEffect> {
        let inits = Arc::clone(inits);
        let deinits = Arc::clone(deinits);
        Arc::new(
            StatusEffect::new("Burn", 100)
                .with_curable(false)
                .with_hooks(hooks_fn(
                    move |_| {
                        inits.fetch_add(1, Ordering::SeqCst);
                    },
                    move |_| {
                        deinits.fetch_add(1, Ordering::SeqCst);
                    },
                )),
        )
    }

    #[tokio::test]
    async fn status_lifecycle() {
        let inits = Arc::new(AtomicUsize::new(0));
        let deinits = Arc::new(AtomicUsize::new(0));
        let status = counted_status(&inits, &deinits);
        let combatant = Combatant::new(template());

        assert!(combatant.apply_status(&status, 3, true).await.unwrap().is_some());
        assert_eq!(combatant.status_turns(&status), Some(3));

        // second application stacks turns without an event
        assert!(combatant.apply_status(&status, 5, true).await.unwrap().is_none());
        assert_eq!(combatant.status_turns(&status), Some(8));
        assert_eq!(combatant.statuses().len(), 1);

        // not curable, not forced
        assert!(combatant.remove_status(&status, false, true).await.unwrap().is_none());
        assert!(combatant.has_status(&status));
        assert!(combatant.remove_status(&status, true, true).await.unwrap().is_some());
        assert!(!combatant.has_status(&status));

        combatant.apply_status(&status, 2, true).await.unwrap();
        combatant.end_round(true).await.unwrap();
        assert_eq!(combatant.status_turns(&status), Some(1));
        combatant.end_round(true).await.unwrap();
        assert!(combatant.statuses().is_empty());

        assert_eq!(inits.load(Ordering::SeqCst), 2);
        assert_eq!(deinits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn turns_are_capped_at_max() {
        let status = Arc::new(StatusEffect::new("Sleep", 4));
        let combatant = Combatant::new(template());

        combatant.apply_status(&status, 10, true).await.unwrap();
        assert_eq!(combatant.status_turns(&status), Some(4));
        combatant.apply_status(&status, 10, true).await.unwrap();
        assert_eq!(combatant.status_turns(&status), Some(4));
    }

    #[tokio::test]
    async fn immunity_ignores_status() {
        let status = Arc::new(StatusEffect::new("Freeze", 3));
        let template = Template::builder("Golem")
            .immunity(Arc::clone(&status))
            .build();
        let combatant = Combatant::new(template);

        assert!(combatant.apply_status(&status, 3, true).await.unwrap().is_none());
        assert!(combatant.statuses().is_empty());
    }

    #[tokio::test]
    async fn listeners_shorten_applied_turns() {
        let status = Arc::new(StatusEffect::new("Stun", 10));
        let combatant = Combatant::new(template());
        combatant.subscribe(
            EventKind::StatusApplied,
            handler_fn(|mut event: BattlerEvent| async move {
                if let EventPayload::StatusApplied { turns, .. } = &mut event.payload {
                    *turns = 1;
                }
                Ok(event)
            }),
            0,
            false,
        );

        combatant.apply_status(&status, 6, true).await.unwrap();
        assert_eq!(combatant.status_turns(&status), Some(1));
    }

    #[tokio::test]
    async fn removing_an_absent_status_is_a_no_op() {
        let status = Arc::new(StatusEffect::new("Blind", 3));
        let combatant = Combatant::new(template());
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        combatant.subscribe(
            EventKind::StatusRemoved,
            handler_fn(move |event: BattlerEvent| {
                counter.fetch_add(1, Ordering::SeqCst);
                async move { Ok(event) }
            }),
            0,
            false,
        );

        assert!(combatant.remove_status(&status, false, true).await.unwrap().is_none());
        assert!(combatant.remove_status(&status, true, true).await.unwrap().is_none());
        assert!(combatant.statuses().is_empty());
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn rejected_removal_keeps_status() {
        let status = Arc::new(StatusEffect::new("Curse", 5));
        let combatant = Combatant::new(template());
        combatant.apply_status(&status, 5, true).await.unwrap();
        combatant.subscribe(
            EventKind::StatusRemoved,
            handler_fn(|_: BattlerEvent| async { Err(RuntimeError::rejected("cursed")) }),
            0,
            true,
        );

        assert!(combatant.remove_status(&status, false, true).await.is_err());
        assert!(combatant.has_status(&status));
        assert!(combatant.remove_status(&status, false, true).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn end_round_observers_see_expired_statuses_gone() {
        let status = Arc::new(StatusEffect::new("Haste", 1));
        let combatant = Combatant::new(template());
        combatant.apply_status(&status, 1, true).await.unwrap();

        let observed = Arc::new(AtomicUsize::new(usize::MAX));
        let sink = Arc::clone(&observed);
        combatant.subscribe(
            EventKind::EndRound,
            handler_fn(move |event: BattlerEvent| {
                sink.store(event.combatant.statuses().len(), Ordering::SeqCst);
                async move { Ok(event) }
            }),
            0,
            false,
        );

        combatant.end_round(true).await.unwrap();
        assert_eq!(observed.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn bulk_removal_respects_curable() {
        let curable = Arc::new(StatusEffect::new("Wet", 3));
        let stubborn = Arc::new(StatusEffect::new("Doom", 3).with_curable(false));
        let combatant = Combatant::new(template());
        combatant.apply_status(&curable, 3, true).await.unwrap();
        combatant.apply_status(&stubborn, 3, true).await.unwrap();

        combatant.remove_all_statuses(false);
        assert!(!combatant.has_status(&curable));
        assert!(combatant.has_status(&stubborn));

        combatant.remove_all_statuses(true);
        assert!(combatant.statuses().is_empty());
    }
}
