#[derive(Debug)]
pub enum DatabaseError {
    Connection(String),
    Query(String),
    Serialization(String),
    Empty,
}

impl std::fmt::Display for DatabaseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatabaseError::Connection(msg) => write!(f, "Connection error: {}", msg),
            DatabaseError::Query(msg) => write!(f, "Query error: {}", msg),
            DatabaseError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            DatabaseError::Empty => write!(f, "Query returned no rows"),
        }
    }
}

impl std::error::Error for DatabaseError {}
