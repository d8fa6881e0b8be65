//! Presentation seam for animated resolution.
//!
//! When an action resolves in animated (non-instantaneous) mode, it hands a
//! [`Cue`] to the session's [`Presenter`] and waits for it before applying
//! consequences. Headless hosts use [`InstantPresenter`]; hosts that drive
//! frames call [`BattleSession::frame`](crate::BattleSession::frame) and use [`TimelinePresenter`].
use async_trait::async_trait;

use super::errors::Result;
use crate::combatant::Combatant;
use crate::timeline::Timeline;

/// Something worth showing before it takes effect.
#[derive(Clone, Debug)]
pub enum Cue {
    Attack {
        attacker: Combatant,
        target: Combatant,
        damage: i64,
    },
}

impl Cue {
    pub fn actor(&self) -> &Combatant {
        match self {
            Cue::Attack { attacker, .. } => attacker,
        }
    }
}

#[async_trait]
pub trait Presenter: Send + Sync {
    /// Resolves once the cue has finished playing.
    async fn present(&self, cue: Cue) -> Result<()>;
}

/// Resolves every cue immediately.
pub struct InstantPresenter;

#[async_trait]
impl Presenter for InstantPresenter {
    async fn present(&self, _cue: Cue) -> Result<()> {
        Ok(())
    }
}

/// Plays a fixed-length timeline on the actor's session stage per cue.
///
/// The returned future resolves only as the host advances frames with
/// [`BattleSession::frame`](crate::BattleSession::frame).
pub struct TimelinePresenter {
    pub frames: u32,
    pub padding: u32,
}

impl TimelinePresenter {
    pub fn new(frames: u32, padding: u32) -> Self {
        Self { frames, padding }
    }
}

#[async_trait]
impl Presenter for TimelinePresenter {
    async fn present(&self, cue: Cue) -> Result<()> {
        let Some(session) = cue.actor().session() else {
            return Ok(());
        };
        let playback = session.play_timeline(Timeline::new(self.frames, |_| {}, self.padding));
        playback.await
    }
}
