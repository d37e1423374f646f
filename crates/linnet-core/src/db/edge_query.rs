//! Adjacency lookups for one edge of one root entity.
//!
//! From the principal side the root id is the partition of the base table;
//! from the other side the query goes through the edge index, whose
//! partition is `linnet:edge`. Either way the sort key prefix is
//! `<edgeName>::`.

use indexmap::IndexSet;
use tracing::{debug, trace, warn};

use crate::cursor;
use crate::error::Result;
use crate::record::{EdgeRecord, Item, EDGE, SORT_SEPARATOR};
use crate::schema::EdgeDefinition;
use crate::store::{KeyValueStore, QueryInput, StartKey};

/// One page of neighbors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgePage {
    /// Distinct neighbor ids in store order.
    pub neighbors: Vec<String>,
    /// Live adjacency rows read for this page.
    pub records: Vec<EdgeRecord>,
    /// Cursor for the next page, `None` when exhausted.
    pub cursor: Option<String>,
}

/// Issues edge queries against one table.
pub struct EdgeQuery<'a, S: KeyValueStore + ?Sized> {
    store: &'a S,
    table: &'a str,
    index_name: &'a str,
    now: i64,
}

impl<'a, S: KeyValueStore + ?Sized> EdgeQuery<'a, S> {
    /// Creates a query helper; rows with `ttl <= now` are skipped.
    #[must_use]
    pub fn new(store: &'a S, table: &'a str, index_name: &'a str, now: i64) -> Self {
        Self {
            store,
            table,
            index_name,
            now,
        }
    }

    /// Reads one page of at most `limit` rows, resuming from `cursor`.
    #[tracing::instrument(skip(self, edge), fields(edge = %edge.edge_name, principal = edge.principal))]
    pub async fn page(
        &self,
        root_id: &str,
        edge: &EdgeDefinition,
        limit: usize,
        cursor: Option<&str>,
    ) -> Result<EdgePage> {
        let start = cursor::decode_optional(cursor)?;
        let (records, next) = self.fetch(root_id, edge, limit, start).await?;
        let cursor = next.as_ref().map(cursor::encode).transpose()?;
        let neighbors = distinct_neighbors(edge, &records, &mut IndexSet::new());
        debug!(found = neighbors.len(), more = cursor.is_some(), "edge page");
        Ok(EdgePage {
            neighbors,
            records,
            cursor,
        })
    }

    /// Reads every page, starting from `cursor`, with `page_limit` rows per
    /// request. The returned cursor is always `None`.
    #[tracing::instrument(skip(self, edge), fields(edge = %edge.edge_name, principal = edge.principal))]
    pub async fn all(
        &self,
        root_id: &str,
        edge: &EdgeDefinition,
        page_limit: usize,
        cursor: Option<&str>,
    ) -> Result<EdgePage> {
        let mut start = cursor::decode_optional(cursor)?;
        let mut seen = IndexSet::new();
        let mut out = EdgePage::default();
        let mut pages = 0usize;
        loop {
            let (records, next) = self.fetch(root_id, edge, page_limit, start.take()).await?;
            pages += 1;
            out.neighbors
                .extend(distinct_neighbors(edge, &records, &mut seen));
            out.records.extend(records);
            match next {
                Some(key) => start = Some(key),
                None => break,
            }
        }
        debug!(found = out.neighbors.len(), pages, "edge query exhausted");
        Ok(out)
    }

    async fn fetch(
        &self,
        root_id: &str,
        edge: &EdgeDefinition,
        limit: usize,
        start: Option<StartKey>,
    ) -> Result<(Vec<EdgeRecord>, Option<StartKey>)> {
        let input = if edge.principal {
            QueryInput::partition(root_id)
        } else {
            QueryInput::index(self.index_name, EDGE, root_id)
        }
        .with_sort_prefix(&format!("{}{SORT_SEPARATOR}", edge.edge_name))
        .with_limit(limit)
        .with_start_key(start)
        .with_ttl_above(self.now);

        let output = self.store.query(self.table, input).await?;
        let mut records = Vec::with_capacity(output.items.len());
        for attrs in output.items {
            match Item::from_attributes(attrs)? {
                Item::Edge(record) if !record_expired(&record, self.now) => records.push(record),
                Item::Edge(record) => trace!(id = %record.id, "skipping expired edge"),
                Item::Node(node) => warn!(id = %node.id, "node row returned by edge query"),
            }
        }
        Ok((records, output.last_evaluated_key))
    }
}

fn record_expired(record: &EdgeRecord, now: i64) -> bool {
    record.ttl.is_some_and(|ttl| ttl <= now)
}

/// Neighbor id of each record from the queried side, skipping ids already in `seen`.
fn distinct_neighbors(
    edge: &EdgeDefinition,
    records: &[EdgeRecord],
    seen: &mut IndexSet<String>,
) -> Vec<String> {
    records
        .iter()
        .filter(|record| record.edge_name == edge.edge_name)
        .map(|record| {
            if edge.principal {
                &record.neighbor
            } else {
                &record.id
            }
        })
        .filter(|id| !id.is_empty() && seen.insert((*id).clone()))
        .cloned()
        .collect()
}
