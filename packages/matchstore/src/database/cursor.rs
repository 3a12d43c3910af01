use std::collections::{HashMap, VecDeque};

use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use serde::de::DeserializeOwned;
use serde_dynamo::from_item;

use super::{DatabaseError, SHARD_ATTRIBUTE, SHARD_VALUE};

pub(crate) struct OrderedScan {
    pub index: String,
    pub descending: bool,
    pub range: Option<(i64, i64)>,
}

/// Lazy, finite, non-restartable row sequence. Rows are fetched a page at a
/// time; once the source is exhausted the paging state is dropped.
pub struct RowCursor {
    source: Option<PageSource>,
    buffer: VecDeque<HashMap<String, AttributeValue>>,
    remaining: Option<usize>,
}

struct PageSource {
    client: Client,
    table: String,
    ordered: Option<OrderedScan>,
    last_key: Option<HashMap<String, AttributeValue>>,
}

impl RowCursor {
    /// Already-drained cursor, for queries known to match nothing.
    pub(crate) fn empty() -> RowCursor {
        RowCursor::from_item(None)
    }

    /// Cursor over an already-resolved point lookup.
    pub(crate) fn from_item(item: Option<HashMap<String, AttributeValue>>) -> RowCursor {
        RowCursor {
            source: None,
            buffer: item.into_iter().collect(),
            remaining: None,
        }
    }

    pub(crate) fn paged(
        client: Client,
        table: String,
        ordered: Option<OrderedScan>,
        limit: Option<usize>,
    ) -> RowCursor {
        RowCursor {
            source: Some(PageSource {
                client,
                table,
                ordered,
                last_key: None,
            }),
            buffer: VecDeque::new(),
            remaining: limit,
        }
    }

    /// Decodes the next row, or returns `None` once the sequence is drained.
    pub async fn next<T: DeserializeOwned>(&mut self) -> Result<Option<T>, DatabaseError> {
        match self.next_row().await? {
            Some(row) => {
                let record =
                    from_item(row).map_err(|e| DatabaseError::Serialization(e.to_string()))?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    async fn next_row(
        &mut self,
    ) -> Result<Option<HashMap<String, AttributeValue>>, DatabaseError> {
        if self.remaining == Some(0) {
            self.source = None;
            self.buffer.clear();
            return Ok(None);
        }
        while self.buffer.is_empty() && self.source.is_some() {
            self.fetch_page().await?;
        }
        let row = self.buffer.pop_front();
        if row.is_some() {
            if let Some(remaining) = self.remaining.as_mut() {
                *remaining -= 1;
            }
        }
        Ok(row)
    }

    async fn fetch_page(&mut self) -> Result<(), DatabaseError> {
        let source = match self.source.as_mut() {
            Some(source) => source,
            None => return Ok(()),
        };
        let page_limit = self.remaining.map(|r| r.max(1) as i32);

        let (items, last_key) = match &source.ordered {
            None => {
                let mut request = source.client.scan().table_name(&source.table);
                if let Some(limit) = page_limit {
                    request = request.limit(limit);
                }
                if let Some(key) = source.last_key.take() {
                    request = request.set_exclusive_start_key(Some(key));
                }
                let output = request
                    .send()
                    .await
                    .map_err(|e| super::classify_sdk_error(e.to_string()))?;
                (output.items.unwrap_or_default(), output.last_evaluated_key)
            }
            Some(scan) => {
                let mut request = source
                    .client
                    .query()
                    .table_name(&source.table)
                    .index_name(&scan.index)
                    .scan_index_forward(!scan.descending)
                    .expression_attribute_names("#shard", SHARD_ATTRIBUTE)
                    .expression_attribute_values(
                        ":shard",
                        AttributeValue::S(SHARD_VALUE.to_string()),
                    );
                request = match scan.range {
                    // Key conditions are inclusive; [start, end) becomes
                    // BETWEEN start AND end - 1 over integer index values.
                    Some((start, end)) => request
                        .key_condition_expression(
                            "#shard = :shard AND #index BETWEEN :start AND :end",
                        )
                        .expression_attribute_names("#index", &scan.index)
                        .expression_attribute_values(
                            ":start",
                            AttributeValue::N(start.to_string()),
                        )
                        .expression_attribute_values(
                            ":end",
                            AttributeValue::N((end - 1).to_string()),
                        ),
                    None => request.key_condition_expression("#shard = :shard"),
                };
                if let Some(limit) = page_limit {
                    request = request.limit(limit);
                }
                if let Some(key) = source.last_key.take() {
                    request = request.set_exclusive_start_key(Some(key));
                }
                let output = request
                    .send()
                    .await
                    .map_err(|e| super::classify_sdk_error(e.to_string()))?;
                (output.items.unwrap_or_default(), output.last_evaluated_key)
            }
        };

        self.buffer.extend(items);
        match last_key {
            Some(key) => source.last_key = Some(key),
            None => self.source = None,
        }
        Ok(())
    }
}
