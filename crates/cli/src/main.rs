//! Runs a demo battle between two AI-controlled rosters.
mod config;
mod roster;

use std::sync::Arc;

use anyhow::{Context, Result};
use battle_runtime::{BattleSession, RandomActionProvider, SessionConfig, SessionEvent};
use config::CliConfig;
use tokio::sync::broadcast::error::RecvError;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = CliConfig::from_env();
    let session_config = match &config.session_config {
        Some(path) => SessionConfig::load(path)
            .with_context(|| format!("loading session config from {}", path.display()))?,
        None => SessionConfig::default(),
    };
    let seed = config.seed.unwrap_or_else(rand::random);
    tracing::info!(seed, allies = config.allies, foes = config.foes, "Starting demo battle");

    let allies = roster::allies(config.allies);
    let foes = roster::foes(config.foes);
    for (offset, combatant) in allies.iter().chain(&foes).enumerate() {
        let provider = RandomActionProvider::new(seed.wrapping_add(offset as u64));
        combatant.set_provider(Arc::new(provider));
    }

    let instantaneous = session_config.instantaneous;
    let session = BattleSession::builder()
        .config(session_config)
        .allies(allies)
        .foes(foes)
        .build();

    let mut events = session.subscribe_events();
    let narrator = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => narrate(&event),
                Err(RecvError::Lagged(missed)) => println!("... {missed} events skipped"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    let outcome = session.start_round(instantaneous).await;
    drop(session);
    narrator.await.context("narrator task panicked")?;

    let outcome = outcome.context("battle aborted")?;
    println!("Outcome: {outcome}");
    Ok(())
}

fn narrate(event: &SessionEvent) {
    match event {
        SessionEvent::BattleStarted { allies, foes } => {
            println!("{allies} heroes face {foes} monsters");
        }
        SessionEvent::RoundStarted { round } => println!("-- round {round} --"),
        SessionEvent::RoundEnded { .. } => {}
        SessionEvent::CombatantEliminated { name, .. } => println!("{name} is defeated"),
        SessionEvent::BattleOver { round, outcome } => {
            println!("Battle over after {round} rounds: {outcome}");
        }
        SessionEvent::SessionFailed { round, error } => {
            println!("Battle aborted in round {round}: {error}");
        }
    }
}
