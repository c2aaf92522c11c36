use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use imageparty::clock::ScaledClock;
use imageparty::driver::GameDriver;
use imageparty::events::GameEvent;
use imageparty::state::GameState;
use imageparty::types::{GameConfig, GamePhase};

/// Demo harness: runs a full scripted game at 20x speed with three bot
/// players and logs everything a UI would render.
#[tokio::main]
async fn main() {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if .env doesn't exist, only log if it's a different issue
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "imageparty=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting AI Image Party...");

    let config = GameConfig::from_env();
    let state = GameState::new(config, &["Player 1", "Player 2", "Player 3"]);

    spawn_event_logger(state.clone());
    spawn_bots(state.clone());

    // Accelerated clock and the fast tick cadence, as in the browser demo
    let clock = Arc::new(ScaledClock::system(20.0));
    let driver = GameDriver::new(state.clone(), clock, Duration::from_millis(100));
    driver.run().await;

    for (rank, player) in state.leaderboard().await.iter().enumerate() {
        tracing::info!("#{} {} - {} point(s)", rank + 1, player.name, player.score);
    }
}

/// Log every state change a presentation layer would consume.
fn spawn_event_logger(state: GameState) {
    let mut events = state.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(GameEvent::TimerTick { seconds }) => tracing::trace!(seconds, "tick"),
                Ok(event) => tracing::info!(?event, "event"),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Event logger lagged behind")
                }
                Err(RecvError::Closed) => break,
            }
        }
    });
}

/// Scripted players: everyone submits during PROMPTING, the judge votes for
/// a random image during VOTING.
fn spawn_bots(state: GameState) {
    tokio::spawn(async move {
        let mut events = state.subscribe();
        // Round 1 starts in PROMPTING without a transition event
        submit_all(&state).await;

        loop {
            match events.recv().await {
                Ok(GameEvent::Phase {
                    phase: GamePhase::Prompting,
                    ..
                }) => submit_all(&state).await,
                Ok(GameEvent::Phase {
                    phase: GamePhase::Voting,
                    ..
                }) => {
                    if let Some(judge) = state.current_judge().await {
                        let gallery = state.game.read().await.generated_images.len();
                        if gallery > 0 {
                            let pick = rand::rng().random_range(0..gallery);
                            if let Err(e) = state.cast_vote(&judge.id, pick).await {
                                tracing::warn!("Bot vote rejected: {e}");
                            }
                        }
                    }
                }
                Ok(GameEvent::Phase {
                    phase: GamePhase::GameOver,
                    ..
                })
                | Err(RecvError::Closed) => break,
                Ok(_) | Err(RecvError::Lagged(_)) => {}
            }
        }
    });
}

async fn submit_all(state: &GameState) {
    for player in state.roster().await {
        let prompt = format!("{} imagines something unforgettable", player.name);
        if let Err(e) = state.submit_prompt(&player.id, prompt).await {
            tracing::warn!("Bot submission rejected: {e}");
        }
    }
}
