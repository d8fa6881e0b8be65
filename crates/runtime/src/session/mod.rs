//! Battle sessions.
//!
//! A [`BattleSession`] owns the two rosters and drives rounds: it collects
//! decisions concurrently, resolves turns sequentially in turn order, prunes
//! eliminated combatants, and checks the win condition. It is a cheap-clone
//! handle; combatants hold a weak back-reference to it.

mod builder;
mod round;

use std::sync::{Arc, Mutex, Weak};

use battle_core::{Outcome, turn_order, win_condition};
use tokio::sync::broadcast;
use tracing::trace;

pub use builder::BattleSessionBuilder;

use crate::api::{ActionProvider, Presenter};
use crate::combatant::Combatant;
use crate::config::SessionConfig;
use crate::events::SessionEvent;
use crate::lock;
use crate::timeline::{Timeline, TimelinePlayback};

/// One of the two rosters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Side {
    Allies,
    Foes,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Allies => Side::Foes,
            Side::Foes => Side::Allies,
        }
    }
}

/// Where the session is in its lifecycle.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionStatus {
    Active,
    Over(Outcome),
    /// A round was aborted by an error; no further rounds will run.
    Failed(String),
}

#[derive(Debug)]
struct SessionState {
    allies: Vec<Combatant>,
    foes: Vec<Combatant>,
    round: u32,
    status: SessionStatus,
}

pub(crate) struct SessionShared {
    state: Mutex<SessionState>,
    config: SessionConfig,
    presenter: Arc<dyn Presenter>,
    default_provider: Arc<dyn ActionProvider>,
    events: broadcast::Sender<SessionEvent>,
    stage: Mutex<Option<Timeline>>,
}

/// Handle to a running battle.
#[derive(Clone)]
pub struct BattleSession {
    shared: Arc<SessionShared>,
}

impl BattleSession {
    pub fn builder() -> BattleSessionBuilder {
        BattleSessionBuilder::new()
    }

    pub(crate) fn from_shared(shared: Arc<SessionShared>) -> Self {
        Self { shared }
    }

    pub(crate) fn downgrade(&self) -> Weak<SessionShared> {
        Arc::downgrade(&self.shared)
    }

    pub fn config(&self) -> &SessionConfig {
        &self.shared.config
    }

    pub fn flee_allowed(&self) -> bool {
        self.shared.config.allow_flee
    }

    pub fn presenter(&self) -> Arc<dyn Presenter> {
        Arc::clone(&self.shared.presenter)
    }

    pub(crate) fn default_provider(&self) -> Arc<dyn ActionProvider> {
        Arc::clone(&self.shared.default_provider)
    }

    /// Lifecycle notifications. Subscribe before driving rounds.
    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.shared.events.subscribe()
    }

    pub(crate) fn publish(&self, event: SessionEvent) {
        if self.shared.events.send(event).is_err() {
            trace!(target: "battle::session", "No session event subscribers");
        }
    }

    pub fn allies(&self) -> Vec<Combatant> {
        lock(&self.shared.state).allies.clone()
    }

    pub fn foes(&self) -> Vec<Combatant> {
        lock(&self.shared.state).foes.clone()
    }

    pub fn roster(&self, side: Side) -> Vec<Combatant> {
        match side {
            Side::Allies => self.allies(),
            Side::Foes => self.foes(),
        }
    }

    pub fn side_of(&self, combatant: &Combatant) -> Option<Side> {
        let state = lock(&self.shared.state);
        if state.allies.contains(combatant) {
            Some(Side::Allies)
        } else if state.foes.contains(combatant) {
            Some(Side::Foes)
        } else {
            None
        }
    }

    pub fn round(&self) -> u32 {
        lock(&self.shared.state).round
    }

    pub fn status(&self) -> SessionStatus {
        lock(&self.shared.state).status.clone()
    }

    pub fn is_over(&self) -> bool {
        !matches!(self.status(), SessionStatus::Active)
    }

    /// Adds a combatant to a roster and points it at this session.
    pub fn join(&self, side: Side, combatant: Combatant) {
        combatant.attach(self);
        let mut state = lock(&self.shared.state);
        match side {
            Side::Allies => state.allies.push(combatant),
            Side::Foes => state.foes.push(combatant),
        }
    }

    /// Everyone who can act this round, fastest first.
    pub fn turn_order(&self) -> Vec<Combatant> {
        let pool: Vec<Combatant> = {
            let state = lock(&self.shared.state);
            state.allies.iter().chain(&state.foes).cloned().collect()
        };
        turn_order(&pool)
    }

    pub fn check_win_condition(&self) -> Option<Outcome> {
        let (allies, foes) = {
            let state = lock(&self.shared.state);
            (state.allies.clone(), state.foes.clone())
        };
        win_condition(&allies, &foes)
    }

    /// Starts `timeline` on the session stage, rejecting whatever was
    /// playing there.
    pub fn play_timeline(&self, mut timeline: Timeline) -> TimelinePlayback {
        let playback = timeline.play();
        let mut stage = lock(&self.shared.stage);
        if let Some(mut previous) = stage.replace(timeline) {
            previous.stop(true);
        }
        playback
    }

    /// Advances the staged timeline by one frame.
    pub fn frame(&self) {
        let mut stage = lock(&self.shared.stage);
        if let Some(timeline) = stage.as_mut() {
            timeline.tick();
            if !timeline.is_playing() {
                *stage = None;
            }
        }
    }

    pub fn has_staged_timeline(&self) -> bool {
        lock(&self.shared.stage).is_some()
    }
}

impl std::fmt::Debug for BattleSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BattleSession")
            .field("state", &*lock(&self.shared.state))
            .field("config", &self.shared.config)
            .finish_non_exhaustive()
    }
}
