//! Resolves entity ids into Node rows with parallel batch gets.

use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, warn};

use super::chunk::chunk;
use crate::error::{Error, Result};
use crate::record::{Item, NodeRecord, PrimaryKey};
use crate::store::KeyValueStore;
use crate::value::Fields;

/// Nodes read plus per-batch failures.
#[derive(Debug, Default)]
pub struct Hydrated {
    /// Live nodes, in store response order.
    pub nodes: Vec<NodeRecord>,
    /// One entry per failed batch or undecodable row.
    pub errors: Vec<Error>,
}

/// Reads Node rows by id.
pub struct Hydrator<S: KeyValueStore + ?Sized> {
    store: Arc<S>,
    table: String,
    batch_size: usize,
    now: i64,
}

impl<S: KeyValueStore + ?Sized + 'static> Hydrator<S> {
    /// Creates a hydrator issuing batches of `batch_size` keys.
    #[must_use]
    pub fn new(store: Arc<S>, table: &str, batch_size: usize, now: i64) -> Self {
        Self {
            store,
            table: table.to_string(),
            batch_size,
            now,
        }
    }

    /// Fetches the Node row of every id. Missing and expired nodes are left out.
    #[tracing::instrument(skip_all, fields(table = %self.table, ids = ids.len()))]
    pub async fn hydrate(&self, ids: &[String]) -> Hydrated {
        let mut set = JoinSet::new();
        for part in chunk(ids, self.batch_size) {
            let keys: Vec<PrimaryKey> = part.iter().map(|id| PrimaryKey::node(id.as_str())).collect();
            let store = Arc::clone(&self.store);
            let table = self.table.clone();
            set.spawn(async move { store.batch_get(&table, keys).await });
        }

        let mut out = Hydrated::default();
        while let Some(joined) = set.join_next().await {
            let rows = match joined {
                Ok(Ok(rows)) => rows,
                Ok(Err(error)) => {
                    warn!(error = %error, "batch get failed");
                    out.errors.push(error);
                    continue;
                }
                Err(join_error) => {
                    out.errors
                        .push(Error::Internal(format!("batch get task failed: {join_error}")));
                    continue;
                }
            };
            for attrs in rows {
                match decode_node(attrs) {
                    Ok(Some(node)) if !node.ttl.is_some_and(|ttl| ttl <= self.now) => {
                        out.nodes.push(node);
                    }
                    Ok(_) => {}
                    Err(error) => out.errors.push(error),
                }
            }
        }
        debug!(found = out.nodes.len(), errors = out.errors.len(), "hydrated");
        out
    }
}

fn decode_node(attrs: Fields) -> Result<Option<NodeRecord>> {
    Ok(match Item::from_attributes(attrs)? {
        Item::Node(node) => Some(node),
        Item::Edge(_) => None,
    })
}
