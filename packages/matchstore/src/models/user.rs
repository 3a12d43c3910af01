use serde::{Deserialize, Serialize};

fn default_shard() -> String {
    "0".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub fbprofile: String,
    /// Match ids, most recent first. New matches are prepended on start.
    #[serde(rename = "match")]
    pub matches: Vec<String>,
    pub win: u32,
    /// Constant partition attribute carried so the `win` secondary index can
    /// be queried in global sort order. Storage detail, never exposed.
    #[serde(default = "default_shard")]
    pub shard: String,
}

impl User {
    pub fn new(id: &str, name: &str) -> Self {
        User {
            id: id.to_string(),
            name: name.to_string(),
            fbprofile: format!("https://facebook.com/{}", id),
            matches: vec![],
            win: 0,
            shard: default_shard(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_fields() {
        let user = User::new("user-1", "Alice");

        assert_eq!(user.id, "user-1");
        assert_eq!(user.name, "Alice");
        assert_eq!(user.fbprofile, "https://facebook.com/user-1");
        assert!(user.matches.is_empty());
        assert_eq!(user.win, 0);
        assert_eq!(user.shard, "0");
    }

    #[test]
    fn test_match_list_serializes_under_stored_attribute_name() {
        let mut user = User::new("user-1", "Alice");
        user.matches = vec!["m2".to_string(), "m1".to_string()];

        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value["match"][0], "m2");
        assert_eq!(value["match"][1], "m1");
        assert!(value.get("matches").is_none());
    }

    #[test]
    fn test_deserialize_defaults_shard_for_existing_rows() {
        let user: User = serde_json::from_str(
            r#"{"id":"u","name":"n","fbprofile":"f","match":[],"win":3}"#,
        )
        .unwrap();
        assert_eq!(user.shard, "0");
        assert_eq!(user.win, 3);
    }

    #[test]
    fn test_serde_roundtrip() {
        let mut user = User::new("user-2", "Bob");
        user.matches = vec!["m1".to_string()];
        user.win = 7;

        let serialized = serde_json::to_string(&user).unwrap();
        let deserialized: User = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, user);
    }
}
