use std::sync::Arc;

use tracing::info;

use matchstore::database::Database;
use matchstore::repositories::match_repository::DynamoDbMatchRepository;
use matchstore::repositories::user_repository::DynamoDbUserRepository;
use matchstore::store::MatchStore;

/// Prints the current ranking as JSON. Usage: ranking-report [limit]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().init();

    let limit: usize = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(10);

    let config = aws_config::load_from_env().await;
    let db = Arc::new(Database::connect(config).await?);
    let users = Arc::new(DynamoDbUserRepository::new(db.clone()));
    let matches = Arc::new(DynamoDbMatchRepository::new(db));
    let store = MatchStore::new(users, matches);

    info!("Fetching top {} players", limit);
    let ranking = store.get_ranking(limit).await?;

    println!("{}", serde_json::to_string_pretty(&ranking)?);
    Ok(())
}
