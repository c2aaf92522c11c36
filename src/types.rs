use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Opaque ID types for type safety
pub type GameId = String;
pub type PlayerId = String;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GamePhase {
    Prompting,
    Generating,
    Voting,
    Results,
    GameOver,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    pub total_rounds: u32,
    pub prompting_seconds: f64,
    pub generating_seconds: f64,
    pub voting_seconds: f64,
    pub results_seconds: f64,
    /// Pause between an accepted vote and the expedited jump to RESULTS,
    /// so the table sees the pick land before the phase flips.
    pub vote_feedback_delay: Duration,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            total_rounds: 3,
            prompting_seconds: 30.0,
            generating_seconds: 5.0,
            voting_seconds: 20.0,
            results_seconds: 5.0,
            vote_feedback_delay: Duration::from_millis(800),
        }
    }
}

impl GameConfig {
    /// Load config from environment variables, falling back to defaults
    /// for anything missing or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            total_rounds: env_or("IMAGEPARTY_TOTAL_ROUNDS", defaults.total_rounds),
            prompting_seconds: env_or("IMAGEPARTY_PROMPTING_SECONDS", defaults.prompting_seconds),
            generating_seconds: env_or("IMAGEPARTY_GENERATING_SECONDS", defaults.generating_seconds),
            voting_seconds: env_or("IMAGEPARTY_VOTING_SECONDS", defaults.voting_seconds),
            results_seconds: env_or("IMAGEPARTY_RESULTS_SECONDS", defaults.results_seconds),
            vote_feedback_delay: Duration::from_millis(env_or(
                "IMAGEPARTY_VOTE_FEEDBACK_MS",
                defaults.vote_feedback_delay.as_millis() as u64,
            )),
        }
    }

    /// Countdown length for a phase; `None` for the terminal state.
    pub fn phase_duration(&self, phase: GamePhase) -> Option<f64> {
        match phase {
            GamePhase::Prompting => Some(self.prompting_seconds),
            GamePhase::Generating => Some(self.generating_seconds),
            GamePhase::Voting => Some(self.voting_seconds),
            GamePhase::Results => Some(self.results_seconds),
            GamePhase::GameOver => None,
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!("Ignoring unparseable {}={:?}, using default", key, raw);
                default
            }
        },
        Err(_) => default,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub score: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Submission {
    pub player_id: PlayerId,
    pub prompt: String,
    /// Filled in once a generated image exists for this prompt; the demo
    /// gallery uses the shared placeholder table instead.
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    pub version: u64,
    pub phase: GamePhase,
    /// 1-based round counter.
    pub round_no: u32,
    /// Index into the roster of the current judge (Card Czar).
    pub judge_index: usize,
    pub question_index: usize,
    pub current_question: String,
    /// At most one entry per player; cleared on entering PROMPTING.
    pub submissions: Vec<Submission>,
    /// Gallery shown during VOTING/RESULTS; slot `i` belongs to roster entry `i`.
    pub generated_images: Vec<String>,
    pub selected_winner: Option<usize>,
    /// Timestamp when the round's point was awarded (for idempotency)
    pub scored_at: Option<String>,
}

/// Round questions, advanced once per round and held at the last entry
/// if the game outlasts the table.
pub const QUESTIONS: &[&str] = &[
    "What would a cat say at a job interview?",
    "The worst superhero power",
    "What aliens think of Earth",
    "The secret life of rubber ducks",
    "Why the chicken REALLY crossed the road",
    "What your phone does while you sleep",
    "The real reason dinosaurs went extinct",
    "What clouds gossip about",
    "A toaster's biggest fear",
    "What fish dream about",
];

/// Placeholder gallery URLs, repeated as needed to cover the roster.
pub const PLACEHOLDER_IMAGES: &[&str] = &[
    "https://via.placeholder.com/400x400/8B5CF6/FFFFFF?text=Image+1",
    "https://via.placeholder.com/400x400/F97316/FFFFFF?text=Image+2",
    "https://via.placeholder.com/400x400/10B981/FFFFFF?text=Image+3",
    "https://via.placeholder.com/400x400/EF4444/FFFFFF?text=Image+4",
    "https://via.placeholder.com/400x400/3B82F6/FFFFFF?text=Image+5",
];

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    // Mutates process-wide environment variables
    #[test]
    #[serial]
    fn test_config_from_env() {
        // Defaults when nothing is set
        let config = GameConfig::from_env();
        assert_eq!(config.total_rounds, 3);
        assert_eq!(config.voting_seconds, 20.0);

        // Overrides apply, garbage falls back to the default
        std::env::set_var("IMAGEPARTY_TOTAL_ROUNDS", "7");
        std::env::set_var("IMAGEPARTY_VOTING_SECONDS", "not-a-number");
        let config = GameConfig::from_env();
        assert_eq!(config.total_rounds, 7);
        assert_eq!(config.voting_seconds, 20.0);
        std::env::remove_var("IMAGEPARTY_TOTAL_ROUNDS");
        std::env::remove_var("IMAGEPARTY_VOTING_SECONDS");
    }

    #[test]
    fn test_phase_durations() {
        let config = GameConfig::default();
        assert_eq!(config.phase_duration(GamePhase::Prompting), Some(30.0));
        assert_eq!(config.phase_duration(GamePhase::Generating), Some(5.0));
        assert_eq!(config.phase_duration(GamePhase::GameOver), None);
    }
}
