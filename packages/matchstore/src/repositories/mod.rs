pub mod match_repository;
pub mod user_repository;
