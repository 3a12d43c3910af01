use crate::database::DatabaseError;

#[derive(Debug)]
pub enum StoreError {
    UserNotFound(String),
    MatchNotFound(String),
    /// A participant update failed partway through `start_match`. The other
    /// participant may already carry the match id; retrying is safe because
    /// an id already present is never prepended twice.
    MatchStartIncomplete {
        player_id: String,
        cause: String,
    },
    Database(DatabaseError),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::UserNotFound(id) => write!(f, "User not found: {}", id),
            StoreError::MatchNotFound(id) => write!(f, "Match not found: {}", id),
            StoreError::MatchStartIncomplete { player_id, cause } => {
                write!(f, "Match start failed at player {}: {}", player_id, cause)
            }
            StoreError::Database(err) => write!(f, "Database error: {}", err),
        }
    }
}

impl std::error::Error for StoreError {}
