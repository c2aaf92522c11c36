mod game;
mod player;
mod score;
mod submission;
mod vote;

use crate::events::{GameEvent, GameSnapshot, PlayerScore, SubmissionInfo};
use crate::types::*;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

/// A user action was rejected. Invalid actions are reported explicitly
/// instead of silently dropped, so callers can tell "ignored" from
/// "succeeded".
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error("invalid phase transition from {from:?} to {to:?}")]
    InvalidTransition { from: GamePhase, to: GamePhase },

    #[error("action not available during the {0:?} phase")]
    WrongPhase(GamePhase),

    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),

    #[error("player {0} already submitted this round")]
    AlreadySubmitted(PlayerId),

    #[error("only the current judge may vote")]
    NotJudge,

    #[error("image index {index} out of range for a gallery of {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("the game is over")]
    GameOver,
}

/// Shared game state. Cheap to clone; all clones observe the same game.
///
/// Lock order is `game` before `players` everywhere.
#[derive(Clone)]
pub struct GameState {
    pub game: Arc<RwLock<Game>>,
    pub players: Arc<RwLock<Vec<Player>>>,
    pub config: Arc<GameConfig>,
    /// Broadcast channel feeding presentation layers
    pub events: broadcast::Sender<GameEvent>,
    time_remaining_ms: Arc<AtomicI64>,
}

impl GameState {
    pub fn new(config: GameConfig, player_names: &[&str]) -> Self {
        let players: Vec<Player> = player_names
            .iter()
            .map(|name| Player {
                id: ulid::Ulid::new().to_string(),
                name: name.to_string(),
                score: 0,
            })
            .collect();

        let game = Game {
            id: ulid::Ulid::new().to_string(),
            version: 1,
            phase: GamePhase::Prompting,
            round_no: 1,
            // The second player opens as Card Czar; rotation then cycles
            // the roster once per round.
            judge_index: if players.is_empty() {
                0
            } else {
                1 % players.len()
            },
            question_index: 0,
            current_question: QUESTIONS[0].to_string(),
            submissions: Vec::new(),
            generated_images: Vec::new(),
            selected_winner: None,
            scored_at: None,
        };

        let (tx, _rx) = broadcast::channel(100);
        Self {
            game: Arc::new(RwLock::new(game)),
            players: Arc::new(RwLock::new(players)),
            config: Arc::new(config),
            events: tx,
            time_remaining_ms: Arc::new(AtomicI64::new(0)),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GameEvent> {
        self.events.subscribe()
    }

    /// Send errors (no subscribers) are fine and ignored.
    pub(crate) fn publish(&self, event: GameEvent) {
        let _ = self.events.send(event);
    }

    /// Cache the latest timer value and fan it out. Called from the timer's
    /// tick callback, so this is deliberately lock-free and synchronous.
    pub fn record_tick(&self, seconds: f64) {
        self.time_remaining_ms
            .store((seconds * 1000.0) as i64, Ordering::Relaxed);
        self.publish(GameEvent::TimerTick { seconds });
    }

    /// Latest timer value as of the last tick; negative while in overtime.
    pub fn time_remaining(&self) -> f64 {
        self.time_remaining_ms.load(Ordering::Relaxed) as f64 / 1000.0
    }

    pub async fn phase(&self) -> GamePhase {
        self.game.read().await.phase
    }

    pub async fn snapshot(&self) -> GameSnapshot {
        let game = self.game.read().await;
        let players = self.players.read().await;
        let time_remaining = self.time_remaining();

        GameSnapshot {
            phase: game.phase,
            round_no: game.round_no,
            total_rounds: self.config.total_rounds,
            current_question: game.current_question.clone(),
            time_remaining,
            is_overtime: time_remaining < 0.0,
            judge_id: players.get(game.judge_index).map(|p| p.id.clone()),
            players: players.iter().map(PlayerScore::from).collect(),
            submissions: game.submissions.iter().map(SubmissionInfo::from).collect(),
            generated_images: game.generated_images.clone(),
            selected_winner: game.selected_winner,
        }
    }
}
