use std::sync::Arc;

use crate::combatant::Combatant;

/// Lifecycle hooks for anything a combatant can bear: status effects,
/// equipment, and masks.
///
/// `init` runs when the thing is attached and `deinit` when it is detached.
/// Hooks run synchronously while no combatant state is locked, so they may
/// freely read and write the bearer.
pub trait BearerHooks: Send + Sync {
    fn init(&self, _bearer: &Combatant) {}
    fn deinit(&self, _bearer: &Combatant) {}
}

/// Hooks that do nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoHooks;

impl BearerHooks for NoHooks {}

struct FnHooks<I, D> {
    init: I,
    deinit: D,
}

impl<I, D> BearerHooks for FnHooks<I, D>
where
    I: Fn(&Combatant) + Send + Sync,
    D: Fn(&Combatant) + Send + Sync,
{
    fn init(&self, bearer: &Combatant) {
        (self.init)(bearer)
    }

    fn deinit(&self, bearer: &Combatant) {
        (self.deinit)(bearer)
    }
}

/// Builds hooks from a pair of closures.
pub fn hooks_fn<I, D>(init: I, deinit: D) -> Arc<dyn BearerHooks>
where
    I: Fn(&Combatant) + Send + Sync + 'static,
    D: Fn(&Combatant) + Send + Sync + 'static,
{
    Arc::new(FnHooks { init, deinit })
}

pub(crate) fn no_hooks() -> Arc<dyn BearerHooks> {
    Arc::new(NoHooks)
}
