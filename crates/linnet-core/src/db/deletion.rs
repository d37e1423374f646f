//! Soft deletion by ttl.
//!
//! Rows are never removed. Deleting an entity sets `linnet:ttl` on every
//! row partitioned on its id: the Node row and the adjacency rows where it
//! is the principal side.

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::record::PrimaryKey;
use crate::store::{KeyValueStore, QueryInput};
use crate::value::Fields;

/// Seconds per minute.
const MINUTE: i64 = 60;

/// The ttl actually written: the supplied value (or `now`), but never
/// earlier than `now - grace_minutes`.
#[must_use]
pub fn effective_ttl(supplied: Option<i64>, now: i64, grace_minutes: i64) -> i64 {
    let floor = now.saturating_sub(grace_minutes.saturating_mul(MINUTE));
    supplied.unwrap_or(now).max(floor)
}

/// Rows marked plus the failures met along the way.
#[derive(Debug, Default)]
pub struct Deleted {
    /// Rows whose ttl was set.
    pub count: usize,
    /// One entry per failed query or update.
    pub errors: Vec<Error>,
}

/// Finds and marks every live row of a partition.
pub struct DeletionScanner<'a, S: KeyValueStore + ?Sized> {
    store: &'a S,
    table: &'a str,
    page_limit: usize,
}

impl<'a, S: KeyValueStore + ?Sized> DeletionScanner<'a, S> {
    /// Creates a scanner reading `page_limit` rows per query.
    #[must_use]
    pub fn new(store: &'a S, table: &'a str, page_limit: usize) -> Self {
        Self {
            store,
            table,
            page_limit,
        }
    }

    /// Sets `ttl` on every row of `id` that has no ttl or a ttl later than
    /// both `ttl` and `now`. A failed update is recorded and the scan moves
    /// on; a failed query ends the scan of this partition.
    #[tracing::instrument(skip(self))]
    pub async fn soft_delete(&self, id: &str, ttl: i64, now: i64) -> Deleted {
        let cutoff = ttl.max(now);
        let mut start = None;
        let mut deleted = Deleted::default();
        loop {
            let input = QueryInput::partition(id)
                .with_limit(self.page_limit)
                .with_start_key(start.take())
                .with_ttl_above(cutoff);
            let output = match self.store.query(self.table, input).await {
                Ok(output) => output,
                Err(error) => {
                    warn!(error = %error, "deletion scan aborted");
                    deleted.errors.push(error);
                    break;
                }
            };
            for attrs in &output.items {
                if let Err(error) = self.mark(attrs, ttl).await {
                    warn!(error = %error, "row not marked for deletion");
                    deleted.errors.push(error);
                    continue;
                }
                deleted.count += 1;
            }
            match output.last_evaluated_key {
                Some(key) => start = Some(key),
                None => break,
            }
        }
        debug!(count = deleted.count, errors = deleted.errors.len(), "rows marked for deletion");
        deleted
    }

    async fn mark(&self, attrs: &Fields, ttl: i64) -> Result<()> {
        let key = PrimaryKey::from_attributes(attrs)?;
        self.store.update_ttl(self.table, &key, ttl).await
    }

    /// Applies [`Self::soft_delete`] to each id in turn. Failures on one id
    /// never stop the others.
    #[tracing::instrument(skip(self, ids), fields(ids = ids.len()))]
    pub async fn soft_delete_many(&self, ids: &[String], ttl: i64, now: i64) -> Deleted {
        let mut total = Deleted::default();
        for id in ids {
            let deleted = self.soft_delete(id, ttl, now).await;
            total.count += deleted.count;
            total.errors.extend(deleted.errors);
        }
        info!(total = total.count, errors = total.errors.len(), "soft delete finished");
        total
    }
}
