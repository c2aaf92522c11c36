use super::{ActionError, GameState};
use crate::events::{GameEvent, SubmissionInfo};
use crate::types::*;

impl GameState {
    /// Submit a prompt for the current round. Accepted once per player per
    /// round during PROMPTING; the first submission wins and later ones are
    /// rejected.
    pub async fn submit_prompt(
        &self,
        player_id: &str,
        text: String,
    ) -> Result<Submission, ActionError> {
        let known = self
            .players
            .read()
            .await
            .iter()
            .any(|p| p.id == player_id);
        if !known {
            return Err(ActionError::UnknownPlayer(player_id.to_string()));
        }

        let mut game = self.game.write().await;
        if game.phase != GamePhase::Prompting {
            return Err(ActionError::WrongPhase(game.phase));
        }
        if game.submissions.iter().any(|s| s.player_id == player_id) {
            return Err(ActionError::AlreadySubmitted(player_id.to_string()));
        }

        let submission = Submission {
            player_id: player_id.to_string(),
            prompt: text,
            image_url: None,
        };
        game.submissions.push(submission.clone());
        game.version += 1;

        let list: Vec<SubmissionInfo> = game.submissions.iter().map(SubmissionInfo::from).collect();
        drop(game);

        tracing::debug!(player_id, count = list.len(), "Prompt submitted");
        self.publish(GameEvent::Submissions { list });

        Ok(submission)
    }

    /// Get the current round's submissions
    pub async fn submissions(&self) -> Vec<Submission> {
        self.game.read().await.submissions.clone()
    }
}
