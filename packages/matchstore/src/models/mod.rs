pub mod matches;
pub mod responses;
pub mod user;
