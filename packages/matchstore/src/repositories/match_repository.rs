use std::sync::Arc;

use async_trait::async_trait;

use crate::database::{Database, DatabaseError, WriteQuery};
use crate::models::matches::Match;

#[cfg(test)]
use mockall::automock;

pub struct DynamoDbMatchRepository {
    pub db: Arc<Database>,
    pub table_name: String,
}

impl DynamoDbMatchRepository {
    pub fn new(db: Arc<Database>) -> Self {
        let table_name =
            std::env::var("MATCHES_TABLE").expect("MATCHES_TABLE environment variable must be set");
        Self { db, table_name }
    }
}

#[async_trait]
#[cfg_attr(test, automock)]
pub trait MatchRepository: Send + Sync {
    /// Inserts the match and returns its primary key, generating one when
    /// the match carries none.
    async fn create_match(&self, m: &Match) -> Result<String, DatabaseError>;
    async fn get_match(&self, match_id: &str) -> Result<Match, DatabaseError>;
    async fn list_matches(&self) -> Result<Vec<Match>, DatabaseError>;
    async fn update_match(&self, m: &Match) -> Result<(), DatabaseError>;
}

#[async_trait]
impl MatchRepository for DynamoDbMatchRepository {
    async fn create_match(&self, m: &Match) -> Result<String, DatabaseError> {
        let table = self.db.table(&self.table_name);
        let ack = self.db.exec_write(WriteQuery::insert(&table, m)?).await?;
        Ok(ack
            .generated_keys
            .into_iter()
            .next()
            .unwrap_or_else(|| m.id.clone()))
    }

    async fn get_match(&self, match_id: &str) -> Result<Match, DatabaseError> {
        let table = self.db.table(&self.table_name);
        self.db.one(table.get(match_id)).await
    }

    async fn list_matches(&self) -> Result<Vec<Match>, DatabaseError> {
        let table = self.db.table(&self.table_name);
        self.db.all(table.scan()).await
    }

    async fn update_match(&self, m: &Match) -> Result<(), DatabaseError> {
        let table = self.db.table(&self.table_name);
        self.db.exec_write(WriteQuery::replace(&table, m)?).await?;
        Ok(())
    }
}
