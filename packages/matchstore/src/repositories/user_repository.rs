use std::sync::Arc;

use async_trait::async_trait;

use crate::database::{Database, DatabaseError, WriteQuery};
use crate::models::user::User;

#[cfg(test)]
use mockall::automock;

/// Secondary index over the win counter, used by the ranking queries.
pub const WIN_INDEX: &str = "win";

pub struct DynamoDbUserRepository {
    pub db: Arc<Database>,
    pub table_name: String,
}

impl DynamoDbUserRepository {
    pub fn new(db: Arc<Database>) -> Self {
        let table_name =
            std::env::var("USERS_TABLE").expect("USERS_TABLE environment variable must be set");
        Self { db, table_name }
    }
}

#[async_trait]
#[cfg_attr(test, automock)]
pub trait UserRepository: Send + Sync {
    async fn create_user(&self, user: &User) -> Result<(), DatabaseError>;
    async fn get_user(&self, user_id: &str) -> Result<User, DatabaseError>;
    async fn list_users(&self) -> Result<Vec<User>, DatabaseError>;
    async fn update_user(&self, user: &User) -> Result<(), DatabaseError>;
    /// Users ordered descending by win count, globally ordered before any
    /// truncation. `None` means all users.
    async fn ranked_by_win(&self, limit: Option<usize>) -> Result<Vec<User>, DatabaseError>;
}

#[async_trait]
impl UserRepository for DynamoDbUserRepository {
    async fn create_user(&self, user: &User) -> Result<(), DatabaseError> {
        let table = self.db.table(&self.table_name);
        self.db.exec_write(WriteQuery::insert(&table, user)?).await?;
        Ok(())
    }

    async fn get_user(&self, user_id: &str) -> Result<User, DatabaseError> {
        let table = self.db.table(&self.table_name);
        self.db.one(table.get(user_id)).await
    }

    async fn list_users(&self) -> Result<Vec<User>, DatabaseError> {
        let table = self.db.table(&self.table_name);
        self.db.all(table.scan()).await
    }

    async fn update_user(&self, user: &User) -> Result<(), DatabaseError> {
        let table = self.db.table(&self.table_name);
        self.db
            .exec_write(WriteQuery::replace(&table, user)?)
            .await?;
        Ok(())
    }

    async fn ranked_by_win(&self, limit: Option<usize>) -> Result<Vec<User>, DatabaseError> {
        let table = self.db.table(&self.table_name);
        let query = table.scan().order_by_desc(WIN_INDEX);
        let mut cursor = self.db.exec_read(query, limit).await?;
        let mut users = Vec::new();
        while let Some(user) = cursor.next::<User>().await? {
            users.push(user);
        }
        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_repository_trait_object_safety() {
        let _ = |repo: &dyn UserRepository| {
            let _ = repo;
        };
    }
}
