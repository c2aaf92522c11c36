use super::{ActionError, GameState};
use crate::events::{GameEvent, PlayerScore};
use crate::types::*;

impl GameState {
    /// Check if a phase transition is valid
    fn is_valid_phase_transition(from: GamePhase, to: GamePhase) -> bool {
        use GamePhase::*;

        match (from, to) {
            // Normal forward flow
            (Prompting, Generating) => true,
            (Generating, Voting) => true,
            (Voting, Results) => true,

            // From Results: next round, or out of rounds
            (Results, Prompting) => true,
            (Results, GameOver) => true,

            // GameOver is terminal; everything else is invalid
            _ => false,
        }
    }

    /// Advance to the successor of the current phase, looping back to
    /// PROMPTING until the configured rounds are exhausted.
    pub async fn advance_phase(&self) -> Result<GamePhase, ActionError> {
        let from = self.game.read().await.phase;
        self.advance_phase_from(from).await
    }

    /// Advance to the successor of `from`, the phase the caller observed.
    /// If the game has since moved on (an expedited vote racing a timer
    /// expiry), the transition is rejected under the write lock instead of
    /// advancing the new phase a second time. This is what the driver calls
    /// on timer expiry.
    pub async fn advance_phase_from(&self, from: GamePhase) -> Result<GamePhase, ActionError> {
        let next = match from {
            GamePhase::Prompting => GamePhase::Generating,
            GamePhase::Generating => GamePhase::Voting,
            GamePhase::Voting => GamePhase::Results,
            GamePhase::Results => {
                if self.game.read().await.round_no < self.config.total_rounds {
                    GamePhase::Prompting
                } else {
                    GamePhase::GameOver
                }
            }
            GamePhase::GameOver => return Err(ActionError::GameOver),
        };

        self.transition_phase(next).await?;
        Ok(next)
    }

    /// Transition game phase with validation, applying the new phase's
    /// entry effects under the game write lock.
    pub async fn transition_phase(&self, to: GamePhase) -> Result<(), ActionError> {
        let mut game = self.game.write().await;
        let from = game.phase;

        if !Self::is_valid_phase_transition(from, to) {
            return Err(ActionError::InvalidTransition { from, to });
        }

        game.phase = to;
        game.version += 1;

        match to {
            GamePhase::Prompting => {
                let player_count = self.players.read().await.len();
                game.round_no += 1;
                game.submissions.clear();
                game.generated_images.clear();
                game.selected_winner = None;
                game.scored_at = None;
                game.question_index = (game.question_index + 1).min(QUESTIONS.len() - 1);
                game.current_question = QUESTIONS[game.question_index].to_string();
                if player_count > 0 {
                    game.judge_index = (game.judge_index + 1) % player_count;
                }
            }
            GamePhase::Generating => {
                let player_count = self.players.read().await.len();
                game.generated_images = PLACEHOLDER_IMAGES
                    .iter()
                    .cycle()
                    .take(player_count)
                    .map(|url| url.to_string())
                    .collect();
            }
            GamePhase::Voting => {
                // The judge becomes eligible to vote; no state to mutate
            }
            GamePhase::Results => {
                self.finalize_results(&mut game).await;
            }
            GamePhase::GameOver => {
                // Terminal; scores are frozen from here on
            }
        }

        let round_no = game.round_no;
        drop(game);

        tracing::info!(?from, ?to, round_no, "Phase transition");
        self.publish(GameEvent::Phase {
            phase: to,
            round_no,
        });

        match to {
            GamePhase::Results => {
                let players = self.scoreboard().await;
                self.publish(GameEvent::Scores { players });
            }
            GamePhase::GameOver => {
                let players = self.scoreboard().await;
                self.publish(GameEvent::GameOver { players });
            }
            _ => {}
        }

        Ok(())
    }

    async fn scoreboard(&self) -> Vec<PlayerScore> {
        self.leaderboard()
            .await
            .iter()
            .map(PlayerScore::from)
            .collect()
    }
}
