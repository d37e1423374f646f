//! Key-value store capability.
//!
//! The engine never talks to a concrete database client. Instead the caller
//! constructs something implementing [`KeyValueStore`] and hands it to
//! [`crate::Linnet::new`]. The trait mirrors the handful of operations a
//! DynamoDB-style table offers: conditional put, batch write, batch get,
//! range query with continuation, and a ttl update.

mod memory;

pub use memory::MemoryStore;

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::error::Result;
use crate::record::PrimaryKey;
use crate::value::Fields;

/// Continuation key reported by a query, keyed by attribute name.
pub type StartKey = BTreeMap<String, String>;

/// Maximum number of write requests in one batch write.
pub const MAX_BATCH_WRITE: usize = 25;
/// Maximum number of keys in one batch get.
pub const MAX_BATCH_GET: usize = 100;

/// Condition attached to a single put.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PutCondition {
    /// Overwrite whatever is stored.
    #[default]
    Always,
    /// Fail with [`crate::Error::ConditionalCheckFailed`] if the key exists.
    IfNotExists,
}

/// One put inside a batch write.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteRequest {
    /// Full attribute map, including key attributes.
    pub item: Fields,
}

impl WriteRequest {
    /// Creates a put request.
    #[must_use]
    pub fn put(item: Fields) -> Self {
        Self { item }
    }
}

/// A key-condition query: partition equality plus sort-key prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryInput {
    /// Secondary index to query, or the base table when `None`.
    pub index_name: Option<String>,
    /// Partition attribute of the table or index.
    pub partition_key: String,
    /// Partition value.
    pub partition_value: String,
    /// `begins_with` prefix on `linnet:dataType`.
    pub sort_prefix: String,
    /// Maximum number of rows evaluated.
    pub limit: usize,
    /// Resume after this key.
    pub exclusive_start_key: Option<StartKey>,
    /// Keep only rows without a ttl or with a ttl greater than this value.
    /// Applied after `limit`, as a filter expression would be.
    pub ttl_above: Option<i64>,
}

impl QueryInput {
    /// Query on the base table partition `id`.
    #[must_use]
    pub fn partition(id: &str) -> Self {
        Self {
            index_name: None,
            partition_key: crate::record::ID.to_string(),
            partition_value: id.to_string(),
            sort_prefix: String::new(),
            limit: 1000,
            exclusive_start_key: None,
            ttl_above: None,
        }
    }

    /// Query on a secondary index.
    #[must_use]
    pub fn index(index_name: &str, partition_key: &str, value: &str) -> Self {
        Self {
            index_name: Some(index_name.to_string()),
            partition_key: partition_key.to_string(),
            partition_value: value.to_string(),
            ..Self::partition(value)
        }
    }

    /// Sets the sort-key prefix (builder pattern).
    #[must_use]
    pub fn with_sort_prefix(mut self, prefix: &str) -> Self {
        self.sort_prefix = prefix.to_string();
        self
    }

    /// Sets the limit (builder pattern).
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Sets the exclusive start key (builder pattern).
    #[must_use]
    pub fn with_start_key(mut self, key: Option<StartKey>) -> Self {
        self.exclusive_start_key = key;
        self
    }

    /// Sets the ttl filter (builder pattern).
    #[must_use]
    pub fn with_ttl_above(mut self, ttl: i64) -> Self {
        self.ttl_above = Some(ttl);
        self
    }
}

/// One page of query results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOutput {
    /// Rows that passed the key condition and filter.
    pub items: Vec<Fields>,
    /// Present when more rows may follow.
    pub last_evaluated_key: Option<StartKey>,
}

/// Storage capability consumed by the engine.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Writes one item.
    async fn put_item(&self, table: &str, item: Fields, condition: PutCondition) -> Result<()>;

    /// Writes up to [`MAX_BATCH_WRITE`] items, returning those left unprocessed.
    async fn batch_write(&self, table: &str, requests: Vec<WriteRequest>)
        -> Result<Vec<WriteRequest>>;

    /// Reads up to [`MAX_BATCH_GET`] items by key. Missing keys are omitted.
    async fn batch_get(&self, table: &str, keys: Vec<PrimaryKey>) -> Result<Vec<Fields>>;

    /// Runs one page of a key-condition query.
    async fn query(&self, table: &str, input: QueryInput) -> Result<QueryOutput>;

    /// Sets `linnet:ttl` on an existing row.
    async fn update_ttl(&self, table: &str, key: &PrimaryKey, ttl: i64) -> Result<()>;
}
