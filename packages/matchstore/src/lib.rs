pub mod database;
pub mod models;
pub mod repositories;
pub mod store;

pub use models::matches::Match;
pub use models::user::User;
pub use store::{MatchStore, StoreError};
