use battle_core::Outcome;

/// Lifecycle notifications published by a battle session.
///
/// These are observational: they go out on a broadcast channel after the
/// fact and cannot veto anything.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    BattleStarted { allies: usize, foes: usize },
    RoundStarted { round: u32 },
    RoundEnded { round: u32 },
    /// A knocked-out combatant was removed from its roster.
    CombatantEliminated { round: u32, name: String },
    BattleOver { round: u32, outcome: Outcome },
    /// A listener or provider error aborted the round.
    SessionFailed { round: u32, error: String },
}
