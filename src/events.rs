//! Read-only surface consumed by presentation layers: a broadcast event
//! stream plus full-state snapshots. Everything serializes to JSON so a UI
//! can render straight from it.

use crate::types::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum GameEvent {
    Phase {
        phase: GamePhase,
        round_no: u32,
    },
    TimerTick {
        seconds: f64,
    },
    Submissions {
        list: Vec<SubmissionInfo>,
    },
    VoteCast {
        image_index: usize,
    },
    /// Emitted after the round winner is resolved on entering RESULTS.
    Scores {
        players: Vec<PlayerScore>,
    },
    GameOver {
        players: Vec<PlayerScore>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionInfo {
    pub player_id: PlayerId,
    pub prompt: String,
}

impl From<&Submission> for SubmissionInfo {
    fn from(submission: &Submission) -> Self {
        Self {
            player_id: submission.player_id.clone(),
            prompt: submission.prompt.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerScore {
    pub id: PlayerId,
    pub name: String,
    pub score: u32,
}

impl From<&Player> for PlayerScore {
    fn from(player: &Player) -> Self {
        Self {
            id: player.id.clone(),
            name: player.name.clone(),
            score: player.score,
        }
    }
}

/// Complete render state, rebuilt on demand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub phase: GamePhase,
    pub round_no: u32,
    pub total_rounds: u32,
    pub current_question: String,
    pub time_remaining: f64,
    pub is_overtime: bool,
    pub judge_id: Option<PlayerId>,
    pub players: Vec<PlayerScore>,
    pub submissions: Vec<SubmissionInfo>,
    pub generated_images: Vec<String>,
    pub selected_winner: Option<usize>,
}
