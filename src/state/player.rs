use super::GameState;
use crate::types::*;

impl GameState {
    /// Get the roster in seat order
    pub async fn roster(&self) -> Vec<Player> {
        self.players.read().await.clone()
    }

    /// Look up a player by id
    pub async fn player(&self, player_id: &str) -> Option<Player> {
        self.players
            .read()
            .await
            .iter()
            .find(|p| p.id == player_id)
            .cloned()
    }

    /// The current Card Czar, if the roster is non-empty.
    pub async fn current_judge(&self) -> Option<Player> {
        let judge_index = self.game.read().await.judge_index;
        self.players.read().await.get(judge_index).cloned()
    }
}
