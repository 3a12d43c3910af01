mod cursor;
mod errors;

pub use cursor::RowCursor;
pub use errors::DatabaseError;

use std::collections::HashMap;

use aws_config::SdkConfig;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_dynamo::to_item;
use uuid::Uuid;

/// Every table that carries an ordered secondary index stores this constant
/// partition attribute, so the index can be queried in global sort order.
pub const SHARD_ATTRIBUTE: &str = "shard";
pub const SHARD_VALUE: &str = "0";

/// Thin query execution surface over a single logical DynamoDB database.
///
/// The SDK client is connectionless HTTP, so "reconnect before every
/// operation" becomes a client rebuild from the stored config; transport
/// failures are reported per request as `DatabaseError::Connection` rather
/// than terminating the process.
pub struct Database {
    config: SdkConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableRef {
    name: String,
}

impl TableRef {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Point lookup by primary key.
    pub fn get(&self, id: &str) -> ReadQuery {
        ReadQuery {
            table: self.name.clone(),
            kind: ReadKind::Get { id: id.to_string() },
        }
    }

    /// Unordered read of the whole table.
    pub fn scan(&self) -> ReadQuery {
        ReadQuery {
            table: self.name.clone(),
            kind: ReadKind::Scan,
        }
    }

    /// Rows ordered by `index` ascending, restricted to `[start, end)`.
    pub fn range(&self, index: &str, start: i64, end: i64) -> ReadQuery {
        ReadQuery {
            table: self.name.clone(),
            kind: ReadKind::Ordered {
                index: index.to_string(),
                descending: false,
                range: Some((start, end)),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReadQuery {
    pub(crate) table: String,
    pub(crate) kind: ReadKind,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ReadKind {
    Get {
        id: String,
    },
    Scan,
    Ordered {
        index: String,
        descending: bool,
        range: Option<(i64, i64)>,
    },
}

impl ReadQuery {
    pub fn order_by_desc(self, index: &str) -> ReadQuery {
        self.ordered(index, true)
    }

    pub fn order_by_asc(self, index: &str) -> ReadQuery {
        self.ordered(index, false)
    }

    fn ordered(self, index: &str, descending: bool) -> ReadQuery {
        let range = match self.kind {
            ReadKind::Ordered { range, .. } => range,
            _ => None,
        };
        ReadQuery {
            table: self.table,
            kind: ReadKind::Ordered {
                index: index.to_string(),
                descending,
                range,
            },
        }
    }
}

pub enum WriteQuery {
    Insert {
        table: String,
        item: HashMap<String, AttributeValue>,
    },
    Replace {
        table: String,
        item: HashMap<String, AttributeValue>,
    },
}

impl WriteQuery {
    /// Fresh insert; fails when a record with the same id already exists.
    pub fn insert<T: Serialize>(table: &TableRef, value: &T) -> Result<WriteQuery, DatabaseError> {
        Ok(WriteQuery::Insert {
            table: table.name().to_string(),
            item: serialize_item(value)?,
        })
    }

    /// Full-record replace, conditioned on the record already existing.
    pub fn replace<T: Serialize>(table: &TableRef, value: &T) -> Result<WriteQuery, DatabaseError> {
        Ok(WriteQuery::Replace {
            table: table.name().to_string(),
            item: serialize_item(value)?,
        })
    }
}

/// Result of a mutating query, including any generated identifiers.
#[derive(Debug, Default)]
pub struct WriteAck {
    pub generated_keys: Vec<String>,
}

impl Database {
    /// Establishes a session against the configured endpoint. An unreachable
    /// endpoint is a returned `Connection` error; callers own retry policy.
    pub async fn connect(config: SdkConfig) -> Result<Database, DatabaseError> {
        let db = Database { config };
        db.session()
            .list_tables()
            .limit(1)
            .send()
            .await
            .map_err(|e| DatabaseError::Connection(e.to_string()))?;
        Ok(db)
    }

    pub(crate) fn session(&self) -> Client {
        Client::new(&self.config)
    }

    /// Opaque handle to a table within the configured database. No I/O.
    pub fn table(&self, name: &str) -> TableRef {
        TableRef {
            name: name.to_string(),
        }
    }

    pub async fn exec_write(&self, query: WriteQuery) -> Result<WriteAck, DatabaseError> {
        let client = self.session();
        match query {
            WriteQuery::Insert { table, mut item } => {
                let mut ack = WriteAck::default();
                if let Some(key) = ensure_item_key(&mut item) {
                    ack.generated_keys.push(key);
                }
                client
                    .put_item()
                    .table_name(&table)
                    .set_item(Some(item))
                    .condition_expression("attribute_not_exists(id)")
                    .send()
                    .await
                    .map_err(|e| insert_failure(e.to_string()))?;
                Ok(ack)
            }
            WriteQuery::Replace { table, item } => {
                client
                    .put_item()
                    .table_name(&table)
                    .set_item(Some(item))
                    .condition_expression("attribute_exists(id)")
                    .send()
                    .await
                    .map_err(|e| replace_failure(e.to_string()))?;
                Ok(WriteAck::default())
            }
        }
    }

    /// Runs a read query and returns a lazy, finite, non-restartable row
    /// sequence. `None` means unlimited. The cursor must be drained (or
    /// dropped) before further paging state is released.
    pub async fn exec_read(
        &self,
        query: ReadQuery,
        limit: Option<usize>,
    ) -> Result<RowCursor, DatabaseError> {
        // An empty half-open range can never match; the key condition it
        // would build (BETWEEN with inverted bounds) is rejected server-side.
        if let ReadKind::Ordered {
            range: Some((start, end)),
            ..
        } = &query.kind
        {
            if end <= start {
                return Ok(RowCursor::empty());
            }
        }
        let client = self.session();
        match query.kind {
            ReadKind::Get { id } => {
                let output = client
                    .get_item()
                    .table_name(&query.table)
                    .key("id", AttributeValue::S(id))
                    .send()
                    .await
                    .map_err(|e| classify_sdk_error(e.to_string()))?;
                Ok(RowCursor::from_item(output.item))
            }
            ReadKind::Scan => Ok(RowCursor::paged(client, query.table, None, limit)),
            ReadKind::Ordered {
                index,
                descending,
                range,
            } => Ok(RowCursor::paged(
                client,
                query.table,
                Some(cursor::OrderedScan {
                    index,
                    descending,
                    range,
                }),
                limit,
            )),
        }
    }

    /// Decodes a read query into a single record. `Empty` when no row
    /// matches, `Serialization` on shape mismatch.
    pub async fn one<T: DeserializeOwned>(&self, query: ReadQuery) -> Result<T, DatabaseError> {
        let mut cursor = self.exec_read(query, Some(1)).await?;
        match cursor.next::<T>().await? {
            Some(record) => Ok(record),
            None => Err(DatabaseError::Empty),
        }
    }

    /// Decodes a read query into the full ordered sequence of records,
    /// draining the cursor before returning.
    pub async fn all<T: DeserializeOwned>(&self, query: ReadQuery) -> Result<Vec<T>, DatabaseError> {
        let mut cursor = self.exec_read(query, None).await?;
        let mut records = Vec::new();
        while let Some(record) = cursor.next::<T>().await? {
            records.push(record);
        }
        Ok(records)
    }
}

fn serialize_item<T: Serialize>(value: &T) -> Result<HashMap<String, AttributeValue>, DatabaseError> {
    to_item(value).map_err(|e| DatabaseError::Serialization(e.to_string()))
}

/// Generates a primary key for items that carry none, mirroring a
/// server-assigned key. Returns the generated key, if any.
fn ensure_item_key(item: &mut HashMap<String, AttributeValue>) -> Option<String> {
    let present = matches!(item.get("id"), Some(AttributeValue::S(s)) if !s.is_empty());
    if present {
        return None;
    }
    let key = Uuid::new_v4().to_string();
    item.insert("id".to_string(), AttributeValue::S(key.clone()));
    Some(key)
}

/// A duplicate primary key surfaces as a failed condition check; that is a
/// constraint failure, not a missing row.
fn insert_failure(error: String) -> DatabaseError {
    if error.contains("ConditionalCheckFailedException") {
        DatabaseError::Query(error)
    } else {
        classify_sdk_error(error)
    }
}

fn replace_failure(error: String) -> DatabaseError {
    if error.contains("ConditionalCheckFailedException") {
        DatabaseError::Empty
    } else {
        classify_sdk_error(error)
    }
}

fn classify_sdk_error(error: String) -> DatabaseError {
    if error.contains("dispatch failure")
        || error.contains("connection")
        || error.contains("timeout")
    {
        DatabaseError::Connection(error)
    } else {
        DatabaseError::Query(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> TableRef {
        TableRef {
            name: "users".to_string(),
        }
    }

    #[test]
    fn test_get_query_construction() {
        let query = table().get("user-1");
        assert_eq!(query.table, "users");
        assert_eq!(
            query.kind,
            ReadKind::Get {
                id: "user-1".to_string()
            }
        );
    }

    #[test]
    fn test_range_is_half_open_ascending() {
        let query = table().range("win", 0, 10);
        assert_eq!(
            query.kind,
            ReadKind::Ordered {
                index: "win".to_string(),
                descending: false,
                range: Some((0, 10)),
            }
        );
    }

    #[test]
    fn test_order_by_desc_wraps_scan() {
        let query = table().scan().order_by_desc("win");
        assert_eq!(
            query.kind,
            ReadKind::Ordered {
                index: "win".to_string(),
                descending: true,
                range: None,
            }
        );
    }

    #[test]
    fn test_order_by_desc_keeps_existing_range() {
        let query = table().range("win", 3, 8).order_by_desc("win");
        assert_eq!(
            query.kind,
            ReadKind::Ordered {
                index: "win".to_string(),
                descending: true,
                range: Some((3, 8)),
            }
        );
    }

    #[test]
    fn test_ensure_item_key_generates_when_absent() {
        let mut item = HashMap::new();
        let key = ensure_item_key(&mut item).expect("key should be generated");
        assert!(!key.is_empty());
        assert_eq!(item.get("id"), Some(&AttributeValue::S(key)));
    }

    #[test]
    fn test_ensure_item_key_replaces_empty_id() {
        let mut item = HashMap::new();
        item.insert("id".to_string(), AttributeValue::S(String::new()));
        assert!(ensure_item_key(&mut item).is_some());
    }

    #[test]
    fn test_ensure_item_key_keeps_caller_key() {
        let mut item = HashMap::new();
        item.insert("id".to_string(), AttributeValue::S("fixed".to_string()));
        assert!(ensure_item_key(&mut item).is_none());
        assert_eq!(item.get("id"), Some(&AttributeValue::S("fixed".to_string())));
    }

    #[test]
    fn test_insert_duplicate_key_is_constraint_failure() {
        let error =
            "ConditionalCheckFailedException: The conditional request failed".to_string();
        assert!(matches!(insert_failure(error), DatabaseError::Query(_)));
        assert!(matches!(
            insert_failure("dispatch failure: io error".to_string()),
            DatabaseError::Connection(_)
        ));
    }

    #[test]
    fn test_replace_missing_record_maps_to_empty() {
        let error =
            "ConditionalCheckFailedException: The conditional request failed".to_string();
        assert!(matches!(replace_failure(error), DatabaseError::Empty));
        assert!(matches!(
            replace_failure("ValidationException: bad expression".to_string()),
            DatabaseError::Query(_)
        ));
    }

    #[tokio::test]
    async fn test_empty_range_reads_no_rows() {
        let db = Database {
            config: SdkConfig::builder().build(),
        };

        let query = db.table("users").range("win", 5, 5);
        let mut cursor = db.exec_read(query, None).await.unwrap();
        assert!(cursor.next::<serde_json::Value>().await.unwrap().is_none());

        let query = db.table("users").range("win", 8, 3);
        let mut cursor = db.exec_read(query, None).await.unwrap();
        assert!(cursor.next::<serde_json::Value>().await.unwrap().is_none());
    }

    #[test]
    fn test_transport_errors_classified_as_connection() {
        assert!(matches!(
            classify_sdk_error("dispatch failure: io error".to_string()),
            DatabaseError::Connection(_)
        ));
        assert!(matches!(
            classify_sdk_error("ValidationException: bad expression".to_string()),
            DatabaseError::Query(_)
        ));
    }
}
