use std::future::Future;
use std::sync::Arc;

use tracing::{debug, warn};

use super::Combatant;
use crate::action::Action;
use crate::api::{Result, RuntimeError};
use crate::events::{BattlerEvent, EventHandler, EventKind, EventPayload};
use crate::session::BattleSession;

impl Combatant {
    /// Registers a listener on this combatant's bus.
    pub fn subscribe(
        &self,
        kind: EventKind,
        handler: Arc<dyn EventHandler<BattlerEvent>>,
        priority: i32,
        once: bool,
    ) {
        self.bus().subscribe(kind, handler, priority, once);
    }

    pub fn unsubscribe(
        &self,
        kind: EventKind,
        handler: &Arc<dyn EventHandler<BattlerEvent>>,
        priority: i32,
        once: bool,
    ) {
        self.bus().unsubscribe(kind, handler, priority, once);
    }

    /// Runs `event` through this combatant's listeners.
    pub async fn dispatch(&self, event: BattlerEvent) -> Result<BattlerEvent> {
        self.bus().dispatch(event).await
    }

    /// Dispatches `before`, runs `execute` with the resolved before-event,
    /// then dispatches the after-event `execute` produced.
    ///
    /// Listeners can rewrite whatever the before-event carries (for example
    /// redirect an action) and `execute` sees the rewritten version. Nothing
    /// runs past the first error.
    pub async fn dispatch_event_triad<F, Fut>(
        &self,
        before: BattlerEvent,
        execute: F,
    ) -> Result<BattlerEvent>
    where
        F: FnOnce(BattlerEvent) -> Fut,
        Fut: Future<Output = Result<BattlerEvent>>,
    {
        let before = self.dispatch(before).await?;
        let after = execute(before).await?;
        self.dispatch(after).await
    }

    /// Multi-target form of [`dispatch_event_triad`](Self::dispatch_event_triad)
    /// with strict phase barriers.
    ///
    /// Every before-event is dispatched in order, then every execution is
    /// awaited in order, then every after-event is dispatched in order. The
    /// executions must be lazy futures; none of them runs before the last
    /// before-event resolves.
    pub async fn dispatch_multiple_event_triads<Fut>(
        entities: &[Combatant],
        before: Vec<BattlerEvent>,
        after: Vec<BattlerEvent>,
        executions: Vec<Fut>,
    ) -> Result<Vec<BattlerEvent>>
    where
        Fut: Future<Output = Result<()>>,
    {
        let count = entities.len();
        if before.len() != count || after.len() != count || executions.len() != count {
            return Err(RuntimeError::TriadLengthMismatch {
                entities: count,
                before: before.len(),
                after: after.len(),
                executions: executions.len(),
            });
        }

        for (entity, event) in entities.iter().zip(before) {
            entity.dispatch(event).await?;
        }
        for execution in executions {
            execution.await?;
        }
        let mut resolved = Vec::with_capacity(count);
        for (entity, event) in entities.iter().zip(after) {
            resolved.push(entity.dispatch(event).await?);
        }
        Ok(resolved)
    }

    /// Takes a turn: `BeginTurn`, the action, then `EndTurn`.
    ///
    /// `BeginTurn` listeners may rewrite the action before it executes and
    /// `EndTurn` listeners may rewrite it afterwards; the final version is
    /// returned. Fails if `action` was not built for this combatant.
    pub async fn do_turn(&self, action: Action, instantaneous: bool) -> Result<Action> {
        if action.executor != *self {
            return Err(RuntimeError::ExecutorMismatch {
                combatant: self.to_string(),
                executor: action.executor.to_string(),
            });
        }
        debug!(
            target: "battle::turn",
            combatant = %self,
            action = %action.kind,
            "Turn started"
        );

        let begin = self.event(instantaneous, EventPayload::BeginTurn { action });
        let end = self
            .dispatch_event_triad(begin, |event| async move {
                let mut action = event.into_action()?;
                action.execute().await?;
                Ok(self.event(instantaneous, EventPayload::EndTurn { action }))
            })
            .await
            .inspect_err(|err| {
                warn!(target: "battle::turn", combatant = %self, error = %err, "Turn rejected");
            })?;
        end.into_action()
    }

    /// Asks this combatant's provider, or the session default, for an action.
    pub async fn determine_action(
        &self,
        session: &BattleSession,
        instantaneous: bool,
    ) -> Result<Action> {
        if self.session().is_none() {
            self.attach(session);
        }
        let provider = self
            .provider()
            .unwrap_or_else(|| session.default_provider());
        provider.determine_action(session, self, instantaneous).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::combatant::test_support::template;
    use crate::events::handler_fn;

    fn recorder(log: &Arc<Mutex<Vec<String>>>, label: String) -> Arc<dyn EventHandler<BattlerEvent>> {
        let log = Arc::clone(log);
        handler_fn(move |event: BattlerEvent| {
            log.lock().unwrap().push(label.clone());
            async move { Ok(event) }
        })
    }

    #[tokio::test]
    async fn triads_keep_phase_barriers() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let entities: Vec<Combatant> = (0..3).map(|_| Combatant::new(template())).collect();
        for (i, entity) in entities.iter().enumerate() {
            entity.subscribe(EventKind::BeforeAffected, recorder(&log, format!("b{i}")), 0, false);
            entity.subscribe(EventKind::AfterAffected, recorder(&log, format!("a{i}")), 0, false);
        }

        let action = Action::pass(entities[0].clone());
        let before = entities
            .iter()
            .map(|e| e.event(true, EventPayload::BeforeAffected { action: action.clone() }))
            .collect();
        let after = entities
            .iter()
            .map(|e| e.event(true, EventPayload::AfterAffected { action: action.clone() }))
            .collect();
        let executions = (0..3)
            .map(|i| {
                let log = Arc::clone(&log);
                async move {
                    log.lock().unwrap().push(format!("e{i}"));
                    Ok::<_, RuntimeError>(())
                }
            })
            .collect();

        Combatant::dispatch_multiple_event_triads(&entities, before, after, executions)
            .await
            .unwrap();
        assert_eq!(
            *log.lock().unwrap(),
            ["b0", "b1", "b2", "e0", "e1", "e2", "a0", "a1", "a2"]
        );
    }

    #[tokio::test]
    async fn mismatched_triads_are_rejected() {
        let entity = Combatant::new(template());
        let executions: Vec<std::future::Ready<Result<()>>> = Vec::new();
        let err = Combatant::dispatch_multiple_event_triads(
            &[entity.clone()],
            vec![entity.event(true, EventPayload::BeginRound)],
            Vec::new(),
            executions,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RuntimeError::TriadLengthMismatch { .. }));
    }

    #[tokio::test]
    async fn begin_turn_listeners_can_swap_the_action() {
        let combatant = Combatant::new(template());
        let victim = Combatant::new(template());
        let target = victim.clone();
        combatant.subscribe(
            EventKind::BeginTurn,
            handler_fn(move |mut event: BattlerEvent| {
                let target = target.clone();
                async move {
                    if let Some(action) = event.action_mut() {
                        *action = Action::attack(action.executor.clone(), target);
                    }
                    Ok(event)
                }
            }),
            0,
            false,
        );

        let done = combatant
            .do_turn(Action::pass(combatant.clone()), true)
            .await
            .unwrap();
        assert_eq!(done.kind, crate::action::ActionKind::Attack);
        assert!(victim.stats().hp < 10);
    }

    #[tokio::test]
    async fn foreign_actions_are_refused() {
        let combatant = Combatant::new(template());
        let other = Combatant::new(template());
        let err = combatant
            .do_turn(Action::pass(other), true)
            .await
            .unwrap_err();
        assert!(matches!(err, RuntimeError::ExecutorMismatch { .. }));
    }
}
