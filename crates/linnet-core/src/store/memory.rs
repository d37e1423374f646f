//! In-process [`KeyValueStore`] backend.
//!
//! Rows are kept per table in a `BTreeMap` ordered by primary key. The
//! `edge-dataType` secondary index is emulated by re-ordering rows that
//! carry `linnet:edge` on `(linnet:edge, linnet:dataType, id)`. Pagination
//! follows DynamoDB: `limit` bounds the rows evaluated, the ttl filter is
//! applied afterwards, and a last evaluated key is reported whenever more
//! rows match the key condition.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::trace;

use super::{
    KeyValueStore, PutCondition, QueryInput, QueryOutput, StartKey, WriteRequest,
    MAX_BATCH_GET, MAX_BATCH_WRITE,
};
use crate::error::{Error, Result};
use crate::record::{string_attr, PrimaryKey, DATA_TYPE, EDGE, ID, TTL};
use crate::value::{Fields, Value};

type Table = BTreeMap<PrimaryKey, Fields>;

/// Ordering position of a row within a table or index partition.
type Position = (String, String, String);

/// In-memory store with optional fault injection.
#[derive(Debug)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, Table>>,
    index_name: String,
    unprocessed_rounds: AtomicUsize,
    throttled_calls: AtomicUsize,
    failing_ids: RwLock<HashSet<String>>,
    batch_write_calls: AtomicUsize,
    query_calls: AtomicUsize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Creates an empty store exposing the `edge-dataType` index.
    #[must_use]
    pub fn new() -> Self {
        Self::with_index_name("edge-dataType")
    }

    /// Creates an empty store exposing the edge index under `index_name`.
    #[must_use]
    pub fn with_index_name(index_name: &str) -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
            index_name: index_name.to_string(),
            unprocessed_rounds: AtomicUsize::new(0),
            throttled_calls: AtomicUsize::new(0),
            failing_ids: RwLock::new(HashSet::new()),
            batch_write_calls: AtomicUsize::new(0),
            query_calls: AtomicUsize::new(0),
        }
    }

    /// The next `rounds` batch writes leave their last request unprocessed.
    pub fn inject_unprocessed(&self, rounds: usize) {
        self.unprocessed_rounds.store(rounds, Ordering::SeqCst);
    }

    /// The next `calls` write or read calls fail with a throughput error.
    pub fn inject_throttling(&self, calls: usize) {
        self.throttled_calls.store(calls, Ordering::SeqCst);
    }

    /// Every put of a row partitioned on `id` fails with a store error.
    pub fn fail_writes_for(&self, id: &str) {
        self.failing_ids.write().insert(id.to_string());
    }

    /// Number of batch write calls received.
    #[must_use]
    pub fn batch_write_calls(&self) -> usize {
        self.batch_write_calls.load(Ordering::SeqCst)
    }

    /// Number of query calls received.
    #[must_use]
    pub fn query_calls(&self) -> usize {
        self.query_calls.load(Ordering::SeqCst)
    }

    /// Returns a copy of the row stored under `key`.
    #[must_use]
    pub fn get(&self, table: &str, key: &PrimaryKey) -> Option<Fields> {
        self.tables.read().get(table).and_then(|t| t.get(key)).cloned()
    }

    /// Number of rows in `table`, expired or not.
    #[must_use]
    pub fn len(&self, table: &str) -> usize {
        self.tables.read().get(table).map_or(0, BTreeMap::len)
    }

    /// Inserts a raw row, bypassing conditions and fault injection.
    pub fn insert(&self, table: &str, item: Fields) -> Result<()> {
        let key = key_of(&item)?;
        self.tables
            .write()
            .entry(table.to_string())
            .or_default()
            .insert(key, item);
        Ok(())
    }

    fn take_throttle(&self) -> Result<()> {
        let taken = self
            .throttled_calls
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        if taken.is_ok() {
            return Err(Error::Throughput(
                "provisioned throughput exceeded".to_string(),
            ));
        }
        Ok(())
    }

    fn check_writable(&self, key: &PrimaryKey) -> Result<()> {
        if self.failing_ids.read().contains(&key.id) {
            return Err(Error::Store(format!("write rejected for {}", key.id)));
        }
        Ok(())
    }

    fn evaluate(&self, rows: &Table, input: &QueryInput) -> Result<QueryOutput> {
        let on_index = match input.index_name.as_deref() {
            None => false,
            Some(name) if name == self.index_name => true,
            Some(name) => return Err(Error::Store(format!("index {name} does not exist"))),
        };
        let expected = if on_index { EDGE } else { ID };
        if input.partition_key != expected {
            return Err(Error::Store(format!(
                "{} is not the partition key of the queried table or index",
                input.partition_key
            )));
        }
        if input.limit == 0 {
            return Err(Error::Store("limit must be positive".to_string()));
        }

        let mut candidates: Vec<(Position, &Fields)> = rows
            .iter()
            .filter_map(|(key, attrs)| {
                let position = if on_index {
                    let edge = string_attr(attrs, EDGE)?;
                    (edge.to_string(), key.data_type.clone(), key.id.clone())
                } else {
                    (key.id.clone(), key.data_type.clone(), String::new())
                };
                (position.0 == input.partition_value
                    && position.1.starts_with(&input.sort_prefix))
                .then_some((position, attrs))
            })
            .collect();
        candidates.sort_by(|a, b| a.0.cmp(&b.0));

        if let Some(start) = &input.exclusive_start_key {
            let start = position_of(start, on_index)?;
            candidates.retain(|(position, _)| *position > start);
        }

        let more = candidates.len() > input.limit;
        candidates.truncate(input.limit);

        let last_evaluated_key = if more {
            candidates
                .last()
                .map(|(_, attrs)| start_key_of(attrs, on_index))
        } else {
            None
        };

        let items = candidates
            .into_iter()
            .filter(|(_, attrs)| {
                input.ttl_above.map_or(true, |cutoff| {
                    attrs
                        .get(TTL)
                        .and_then(Value::as_i64)
                        .map_or(true, |ttl| ttl > cutoff)
                })
            })
            .map(|(_, attrs)| attrs.clone())
            .collect();

        Ok(QueryOutput {
            items,
            last_evaluated_key,
        })
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn put_item(&self, table: &str, item: Fields, condition: PutCondition) -> Result<()> {
        self.take_throttle()?;
        let key = key_of(&item)?;
        self.check_writable(&key)?;

        let mut tables = self.tables.write();
        let rows = tables.entry(table.to_string()).or_default();
        if condition == PutCondition::IfNotExists && rows.contains_key(&key) {
            return Err(Error::ConditionalCheckFailed(format!(
                "{} / {}",
                key.id, key.data_type
            )));
        }
        trace!(id = %key.id, data_type = %key.data_type, "put item");
        rows.insert(key, item);
        Ok(())
    }

    async fn batch_write(
        &self,
        table: &str,
        mut requests: Vec<WriteRequest>,
    ) -> Result<Vec<WriteRequest>> {
        self.batch_write_calls.fetch_add(1, Ordering::SeqCst);
        if requests.len() > MAX_BATCH_WRITE {
            return Err(Error::Store(format!(
                "batch write of {} requests exceeds {MAX_BATCH_WRITE}",
                requests.len()
            )));
        }
        self.take_throttle()?;

        let unprocessed = if self
            .unprocessed_rounds
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            requests.pop().into_iter().collect()
        } else {
            Vec::new()
        };

        let keyed = requests
            .into_iter()
            .map(|request| key_of(&request.item).map(|key| (key, request.item)))
            .collect::<Result<Vec<_>>>()?;
        for (key, _) in &keyed {
            self.check_writable(key)?;
        }

        let mut tables = self.tables.write();
        let rows = tables.entry(table.to_string()).or_default();
        for (key, item) in keyed {
            rows.insert(key, item);
        }
        Ok(unprocessed)
    }

    async fn batch_get(&self, table: &str, keys: Vec<PrimaryKey>) -> Result<Vec<Fields>> {
        if keys.len() > MAX_BATCH_GET {
            return Err(Error::Store(format!(
                "batch get of {} keys exceeds {MAX_BATCH_GET}",
                keys.len()
            )));
        }
        self.take_throttle()?;

        let tables = self.tables.read();
        let Some(rows) = tables.get(table) else {
            return Ok(Vec::new());
        };
        Ok(keys.iter().filter_map(|key| rows.get(key).cloned()).collect())
    }

    async fn query(&self, table: &str, input: QueryInput) -> Result<QueryOutput> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        let tables = self.tables.read();
        match tables.get(table) {
            Some(rows) => self.evaluate(rows, &input),
            None => Ok(QueryOutput::default()),
        }
    }

    async fn update_ttl(&self, table: &str, key: &PrimaryKey, ttl: i64) -> Result<()> {
        self.take_throttle()?;
        self.check_writable(key)?;
        let mut tables = self.tables.write();
        let row = tables
            .get_mut(table)
            .and_then(|rows| rows.get_mut(key))
            .ok_or_else(|| Error::NotFound(format!("{} / {}", key.id, key.data_type)))?;
        row.insert(TTL.to_string(), Value::Int(ttl));
        Ok(())
    }
}

fn key_of(item: &Fields) -> Result<PrimaryKey> {
    match (string_attr(item, ID), string_attr(item, DATA_TYPE)) {
        (Some(id), Some(data_type)) => Ok(PrimaryKey::new(id, data_type)),
        _ => Err(Error::Store(format!(
            "item is missing key attributes {ID} and {DATA_TYPE}"
        ))),
    }
}

fn start_key_of(attrs: &Fields, on_index: bool) -> StartKey {
    let mut names = vec![ID, DATA_TYPE];
    if on_index {
        names.push(EDGE);
    }
    names
        .into_iter()
        .filter_map(|name| string_attr(attrs, name).map(|v| (name.to_string(), v.to_string())))
        .collect()
}

fn position_of(key: &StartKey, on_index: bool) -> Result<Position> {
    let get = |name: &str| {
        key.get(name)
            .cloned()
            .ok_or_else(|| Error::InvalidCursor(format!("start key is missing {name}")))
    };
    if on_index {
        Ok((get(EDGE)?, get(DATA_TYPE)?, get(ID)?))
    } else {
        Ok((get(ID)?, get(DATA_TYPE)?, String::new()))
    }
}
