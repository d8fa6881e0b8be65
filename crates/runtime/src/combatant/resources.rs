use battle_core::{Resource, round_amount};
use tracing::{debug, info};

use super::Combatant;
use crate::api::{Result, RuntimeError};
use crate::events::{BattlerEvent, Cause, EventKind, EventPayload};

impl Combatant {
    /// Subtracts `amount` from a resource after the `Damage` listeners have
    /// had their say.
    ///
    /// Listeners may rewrite amount, resource, and cause. The final amount is
    /// rounded and the pool clamped at zero. Hp reaching zero knocks the
    /// combatant out unless it already is.
    pub async fn damage(
        &self,
        amount: f64,
        resource: Resource,
        cause: Option<Cause>,
        instantaneous: bool,
    ) -> Result<()> {
        let event = self
            .dispatch(self.event(
                instantaneous,
                EventPayload::Damage {
                    amount,
                    resource,
                    cause,
                },
            ))
            .await?;
        let EventPayload::Damage {
            amount,
            resource,
            cause,
        } = event.payload
        else {
            return Err(unexpected(EventKind::Damage, &event.payload));
        };

        let amount = round_amount(amount);
        let (remaining, already_out) = self.with_state_mut(|state| {
            (state.stats.subtract(resource, amount), state.knocked_out)
        });
        debug!(
            target: "battle::combatant",
            combatant = %self,
            %resource,
            amount,
            remaining,
            "Damaged"
        );

        if resource == Resource::Hp && remaining == 0 && !already_out {
            self.knock_out(cause, instantaneous).await?;
        }
        Ok(())
    }

    /// Adds `amount` to a resource after the `Heal` listeners have run.
    /// The pool is clamped at its maximum. Healing never revives.
    pub async fn heal(
        &self,
        amount: f64,
        resource: Resource,
        cause: Option<Cause>,
        instantaneous: bool,
    ) -> Result<()> {
        let event = self
            .dispatch(self.event(
                instantaneous,
                EventPayload::Heal {
                    amount,
                    resource,
                    cause,
                },
            ))
            .await?;
        let EventPayload::Heal {
            amount, resource, ..
        } = event.payload
        else {
            return Err(unexpected(EventKind::Heal, &event.payload));
        };

        let amount = round_amount(amount);
        let current = self.with_stats_mut(|stats| stats.add(resource, amount));
        debug!(
            target: "battle::combatant",
            combatant = %self,
            %resource,
            amount,
            current,
            "Healed"
        );
        Ok(())
    }

    /// Knocks the combatant out.
    ///
    /// Dispatches `KnockOut`, then force-removes every status (running each
    /// `deinit`, without `StatusRemoved` events) and raises the flag.
    pub async fn knock_out(&self, cause: Option<Cause>, instantaneous: bool) -> Result<()> {
        self.dispatch(self.event(instantaneous, EventPayload::KnockOut { cause }))
            .await?;
        self.remove_all_statuses(true);
        self.with_state_mut(|state| state.knocked_out = true);
        info!(target: "battle::combatant", combatant = %self, "Knocked out");
        Ok(())
    }

    /// Brings the combatant back with `hp` health (clamped to its maximum),
    /// then dispatches `Revive`.
    pub async fn revive(&self, hp: f64, cause: Option<Cause>, instantaneous: bool) -> Result<()> {
        let restored = self.with_state_mut(|state| {
            state.knocked_out = false;
            state.stats.set_clamped(Resource::Hp, round_amount(hp))
        });
        info!(target: "battle::combatant", combatant = %self, hp = restored, "Revived");
        self.dispatch(self.event(instantaneous, EventPayload::Revive { hp, cause }))
            .await?;
        Ok(())
    }

    pub(crate) fn event(&self, instantaneous: bool, payload: EventPayload) -> BattlerEvent {
        BattlerEvent::new(self.clone(), instantaneous, payload)
    }
}

pub(crate) fn unexpected(expected: EventKind, found: &EventPayload) -> RuntimeError {
    RuntimeError::EventKindChanged {
        expected: expected.to_string(),
        found: found.kind().to_string(),
    }
}
