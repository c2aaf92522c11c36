use super::{ActionError, GameState};
use crate::events::GameEvent;
use crate::types::*;

impl GameState {
    /// Cast the judge's vote for a gallery image. Only the current judge
    /// may vote, only during VOTING. An accepted vote schedules an
    /// expedited jump to RESULTS after the configured feedback delay.
    pub async fn cast_vote(&self, player_id: &str, image_index: usize) -> Result<(), ActionError> {
        let round_no = {
            let mut game = self.game.write().await;
            if game.phase != GamePhase::Voting {
                return Err(ActionError::WrongPhase(game.phase));
            }

            let players = self.players.read().await;
            let is_judge = players
                .get(game.judge_index)
                .is_some_and(|judge| judge.id == player_id);
            drop(players);
            if !is_judge {
                return Err(ActionError::NotJudge);
            }

            let len = game.generated_images.len();
            if image_index >= len {
                return Err(ActionError::IndexOutOfRange {
                    index: image_index,
                    len,
                });
            }

            game.selected_winner = Some(image_index);
            game.version += 1;
            game.round_no
        };

        tracing::info!(player_id, image_index, "Judge voted");
        self.publish(GameEvent::VoteCast { image_index });

        // Give the UI a beat to show the pick landing, then move on. The
        // guard re-checks the phase so a concurrent timer expiry or round
        // change wins over this task.
        let state = self.clone();
        let delay = self.config.vote_feedback_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let still_voting = {
                let game = state.game.read().await;
                game.phase == GamePhase::Voting && game.round_no == round_no
            };
            if still_voting {
                if let Err(e) = state.transition_phase(GamePhase::Results).await {
                    tracing::warn!("Expedited results transition failed: {e}");
                }
            }
        });

        Ok(())
    }
}
