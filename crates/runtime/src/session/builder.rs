use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;
use tracing::info;

use super::{BattleSession, SessionShared, SessionState, SessionStatus};
use crate::api::{ActionProvider, InstantPresenter, PassActionProvider, Presenter};
use crate::combatant::Combatant;
use crate::config::SessionConfig;

/// Builder for [`BattleSession`].
///
/// Without further configuration the session uses default tunables,
/// resolves cues instantly, and lets combatants without their own provider
/// pass.
pub struct BattleSessionBuilder {
    config: SessionConfig,
    allies: Vec<Combatant>,
    foes: Vec<Combatant>,
    presenter: Arc<dyn Presenter>,
    default_provider: Arc<dyn ActionProvider>,
}

impl BattleSessionBuilder {
    pub(super) fn new() -> Self {
        Self {
            config: SessionConfig::default(),
            allies: Vec::new(),
            foes: Vec::new(),
            presenter: Arc::new(InstantPresenter),
            default_provider: Arc::new(PassActionProvider),
        }
    }

    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn ally(mut self, combatant: Combatant) -> Self {
        self.allies.push(combatant);
        self
    }

    pub fn allies(mut self, combatants: impl IntoIterator<Item = Combatant>) -> Self {
        self.allies.extend(combatants);
        self
    }

    pub fn foe(mut self, combatant: Combatant) -> Self {
        self.foes.push(combatant);
        self
    }

    pub fn foes(mut self, combatants: impl IntoIterator<Item = Combatant>) -> Self {
        self.foes.extend(combatants);
        self
    }

    /// Presenter for animated resolution.
    pub fn presenter(mut self, presenter: impl Presenter + 'static) -> Self {
        self.presenter = Arc::new(presenter);
        self
    }

    /// Provider for combatants that have none of their own.
    pub fn default_provider(mut self, provider: impl ActionProvider + 'static) -> Self {
        self.default_provider = Arc::new(provider);
        self
    }

    /// Builds the session and points every roster member at it.
    pub fn build(self) -> BattleSession {
        let (events, _) = broadcast::channel(self.config.event_buffer_size.max(1));
        let (allies, foes) = (self.allies.len(), self.foes.len());

        let session = BattleSession::from_shared(Arc::new(SessionShared {
            state: Mutex::new(SessionState {
                allies: self.allies,
                foes: self.foes,
                round: 0,
                status: SessionStatus::Active,
            }),
            config: self.config,
            presenter: self.presenter,
            default_provider: self.default_provider,
            events,
            stage: Mutex::new(None),
        }));

        for combatant in session.allies().iter().chain(&session.foes()) {
            combatant.attach(&session);
        }
        info!(target: "battle::session", allies, foes, "Battle session created");
        session
    }
}
