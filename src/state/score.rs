use super::GameState;
use crate::types::*;
use rand::Rng;

impl GameState {
    /// Resolve the round winner and award the point. Runs under the game
    /// write lock on entering RESULTS; `scored_at` makes it idempotent so a
    /// round can never pay out twice.
    ///
    /// When the judge never voted, a winner is still drawn uniformly from
    /// the gallery. That guarantees a point every round, matching the
    /// original client; see DESIGN.md for the open product question.
    pub(crate) async fn finalize_results(&self, game: &mut Game) {
        if game.scored_at.is_some() {
            return;
        }

        let gallery = game.generated_images.len();
        if gallery == 0 {
            game.scored_at = Some(chrono::Utc::now().to_rfc3339());
            return;
        }

        let winner = match game.selected_winner {
            Some(index) => index,
            None => {
                let index = rand::rng().random_range(0..gallery);
                tracing::info!(index, "Judge did not vote, drawing a random winner");
                index
            }
        };
        game.selected_winner = Some(winner);

        let mut players = self.players.write().await;
        if let Some(player) = players.get_mut(winner) {
            player.score += 1;
            tracing::info!(winner = %player.name, score = player.score, "Round winner");
        }
        game.scored_at = Some(chrono::Utc::now().to_rfc3339());
    }

    /// Players sorted by score, best first. Ties keep seat order.
    pub async fn leaderboard(&self) -> Vec<Player> {
        let mut players = self.players.read().await.clone();
        players.sort_by(|a, b| b.score.cmp(&a.score));
        players
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::GameState;
    use crate::types::{GameConfig, GamePhase};

    async fn results_state_with_vote(image_index: Option<usize>) -> GameState {
        let state = GameState::new(GameConfig::default(), &["Alice", "Bob", "Carol"]);
        state.transition_phase(GamePhase::Generating).await.unwrap();
        state.transition_phase(GamePhase::Voting).await.unwrap();
        if let Some(index) = image_index {
            let mut game = state.game.write().await;
            game.selected_winner = Some(index);
        }
        state.transition_phase(GamePhase::Results).await.unwrap();
        state
    }

    #[tokio::test]
    async fn test_voted_winner_gets_exactly_one_point() {
        let state = results_state_with_vote(Some(0)).await;

        let players = state.roster().await;
        assert_eq!(players[0].score, 1);
        assert_eq!(players[1].score, 0);
        assert_eq!(players[2].score, 0);
    }

    #[tokio::test]
    async fn test_no_vote_falls_back_to_random_winner_in_range() {
        let state = results_state_with_vote(None).await;

        let game = state.game.read().await;
        let winner = game.selected_winner.expect("fallback winner expected");
        assert!(winner < 3);
        drop(game);

        let total: u32 = state.roster().await.iter().map(|p| p.score).sum();
        assert_eq!(total, 1);
    }

    #[tokio::test]
    async fn test_scoring_is_idempotent() {
        let state = results_state_with_vote(Some(2)).await;

        // A second pass over an already-scored round awards nothing
        let mut game = state.game.write().await;
        state.finalize_results(&mut game).await;
        drop(game);

        let players = state.roster().await;
        assert_eq!(players[2].score, 1);
        let total: u32 = players.iter().map(|p| p.score).sum();
        assert_eq!(total, 1);
    }

    #[tokio::test]
    async fn test_leaderboard_sorts_by_score() {
        let state = GameState::new(GameConfig::default(), &["Alice", "Bob", "Carol"]);
        {
            let mut players = state.players.write().await;
            players[0].score = 1;
            players[2].score = 4;
        }

        let board = state.leaderboard().await;
        assert_eq!(board[0].name, "Carol");
        assert_eq!(board[1].name, "Alice");
        assert_eq!(board[2].name, "Bob");
    }
}
