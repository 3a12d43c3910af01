mod errors;

pub use errors::StoreError;

use std::sync::Arc;

use tracing::{info, warn};

use crate::database::DatabaseError;
use crate::models::matches::Match;
use crate::models::responses::{
    MatchInfoResponse, MatchSummary, PlayerRef, ProfileResponse, RankingEntry,
};
use crate::models::user::User;
use crate::repositories::match_repository::MatchRepository;
use crate::repositories::user_repository::UserRepository;

/// Entity persistence plus the read aggregations that assemble API-facing
/// view objects. Pass-through over the persistent store; multi-step writes
/// (`start_match`, the win-plus-result pair) are non-atomic protocols.
pub struct MatchStore {
    users: Arc<dyn UserRepository + Send + Sync>,
    matches: Arc<dyn MatchRepository + Send + Sync>,
}

impl MatchStore {
    pub fn new(
        users: Arc<dyn UserRepository + Send + Sync>,
        matches: Arc<dyn MatchRepository + Send + Sync>,
    ) -> Self {
        MatchStore { users, matches }
    }

    pub async fn create_user(&self, user: &User) -> Result<(), StoreError> {
        info!("Creating user: {}", user.id);
        self.users.create_user(user).await.map_err(StoreError::Database)
    }

    pub async fn get_user(&self, user_id: &str) -> Result<User, StoreError> {
        self.users.get_user(user_id).await.map_err(|e| match e {
            DatabaseError::Empty => StoreError::UserNotFound(user_id.to_string()),
            _ => StoreError::Database(e),
        })
    }

    pub async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        self.users.list_users().await.map_err(StoreError::Database)
    }

    /// Inserts the match and writes the generated id back onto it before
    /// returning. Callers rely on this to reference the match afterward.
    pub async fn create_match(&self, m: &mut Match) -> Result<(), StoreError> {
        let id = self
            .matches
            .create_match(m)
            .await
            .map_err(StoreError::Database)?;
        m.id = id;
        info!("Created match {} for players {:?}", m.id, m.players);
        Ok(())
    }

    pub async fn get_match(&self, match_id: &str) -> Result<Match, StoreError> {
        self.matches.get_match(match_id).await.map_err(|e| match e {
            DatabaseError::Empty => StoreError::MatchNotFound(match_id.to_string()),
            _ => StoreError::Database(e),
        })
    }

    pub async fn list_matches(&self) -> Result<Vec<Match>, StoreError> {
        self.matches
            .list_matches()
            .await
            .map_err(StoreError::Database)
    }

    /// Full-record replace by id; used for mid-match progress and for the
    /// final result commit.
    pub async fn update_match(&self, m: &Match) -> Result<(), StoreError> {
        self.matches.update_match(m).await.map_err(|e| match e {
            DatabaseError::Empty => StoreError::MatchNotFound(m.id.clone()),
            _ => StoreError::Database(e),
        })
    }

    /// Prepends `match_id` to both participants' match lists. The two
    /// updates are not atomic; a failure names the participant so the caller
    /// can retry the remainder.
    pub async fn start_match(
        &self,
        players: &[String; 2],
        match_id: &str,
    ) -> Result<(), StoreError> {
        info!(
            "Starting match {} for players {} and {}",
            match_id, players[0], players[1]
        );
        for player_id in players {
            if let Err(e) = self.enlist(player_id, match_id).await {
                return Err(StoreError::MatchStartIncomplete {
                    player_id: player_id.clone(),
                    cause: e.to_string(),
                });
            }
        }
        Ok(())
    }

    async fn enlist(&self, player_id: &str, match_id: &str) -> Result<(), StoreError> {
        let mut user = self.get_user(player_id).await?;
        // A retry after a partial failure must not prepend twice.
        if user.matches.iter().any(|m| m == match_id) {
            return Ok(());
        }
        user.matches.insert(0, match_id.to_string());
        self.users
            .update_user(&user)
            .await
            .map_err(StoreError::Database)
    }

    /// Increments the win counter by exactly 1. Recording the winner on the
    /// corresponding match is the caller's separate step of the same
    /// win-confirmation protocol.
    pub async fn update_win(&self, user_id: &str) -> Result<(), StoreError> {
        let mut user = self.get_user(user_id).await?;
        user.win += 1;
        info!("Win recorded for {} (total {})", user.id, user.win);
        self.users
            .update_user(&user)
            .await
            .map_err(StoreError::Database)
    }

    /// 1-based position in the descending-by-win order, -1 when the user
    /// never appears. O(n) in the number of users.
    pub async fn get_user_rank(&self, user_id: &str) -> Result<i32, StoreError> {
        let users = self
            .users
            .ranked_by_win(None)
            .await
            .map_err(StoreError::Database)?;
        for (position, user) in users.iter().enumerate() {
            if user.id == user_id {
                return Ok((position + 1) as i32);
            }
        }
        Ok(-1)
    }

    /// Integer mean of turn counts over the referenced matches; 0 for an
    /// empty list.
    pub async fn average_turn(&self, match_ids: &[String]) -> Result<u32, StoreError> {
        if match_ids.is_empty() {
            return Ok(0);
        }
        let mut total = 0u32;
        for match_id in match_ids {
            total += self.get_match(match_id).await?.turn;
        }
        Ok(total / match_ids.len() as u32)
    }

    pub async fn get_profile(
        &self,
        user_id: &str,
        match_limit: usize,
    ) -> Result<ProfileResponse, StoreError> {
        let user = self.get_user(user_id).await?;

        // One fetch pass serves both the average and the summaries.
        let mut matches = Vec::with_capacity(user.matches.len());
        for match_id in &user.matches {
            matches.push(self.get_match(match_id).await?);
        }
        let average_turn = average_of(&matches);
        let rank = self.get_user_rank(user_id).await?;

        let summaries = matches
            .iter()
            .take(match_limit)
            .map(|m| MatchSummary {
                id: m.id.clone(),
                opponent: m.opponent_of(user_id).to_string(),
                winner: m.winner.clone().unwrap_or_default(),
                turn: m.turn,
                time: m.formatted_time(),
            })
            .collect();

        Ok(ProfileResponse {
            id: user.id.clone(),
            name: user.name.clone(),
            fbprofile: format!("https://facebook.com/{}", user.id),
            total_match: user.matches.len(),
            win: user.win,
            rank,
            average_turn: average_turn as i32,
            matches: summaries,
        })
    }

    /// Top `limit` users by win count. Ranks are global because the query is
    /// globally ordered before truncation.
    pub async fn get_ranking(&self, limit: usize) -> Result<Vec<RankingEntry>, StoreError> {
        let users = self
            .users
            .ranked_by_win(Some(limit))
            .await
            .map_err(StoreError::Database)?;
        let mut entries = Vec::with_capacity(users.len());
        for (position, user) in users.iter().enumerate() {
            // A bad match reference degrades this row instead of aborting
            // the whole list.
            let average_turn = match self.average_turn(&user.matches).await {
                Ok(average) => average as i32,
                Err(e) => {
                    warn!("Average turn unavailable for {}: {}", user.id, e);
                    -1
                }
            };
            entries.push(RankingEntry {
                id: user.id.clone(),
                name: user.name.clone(),
                total_match: user.matches.len(),
                win: user.win,
                average_turn,
                rank: (position + 1) as u32,
            });
        }
        Ok(entries)
    }

    pub async fn get_match_info(&self, match_id: &str) -> Result<MatchInfoResponse, StoreError> {
        let m = self.get_match(match_id).await?;
        let first = self.get_user(&m.players[0]).await?;
        let second = self.get_user(&m.players[1]).await?;
        let players = [
            PlayerRef {
                id: first.id,
                name: first.name,
            },
            PlayerRef {
                id: second.id,
                name: second.name,
            },
        ];
        let winner = m
            .winner
            .as_deref()
            .and_then(|w| players.iter().find(|p| p.id == w).cloned());
        let time = m.formatted_time();
        Ok(MatchInfoResponse {
            id: m.id,
            players,
            winner,
            turn: m.turn,
            time,
        })
    }
}

fn average_of(matches: &[Match]) -> u32 {
    if matches.is_empty() {
        return 0;
    }
    matches.iter().map(|m| m.turn).sum::<u32>() / matches.len() as u32
}
