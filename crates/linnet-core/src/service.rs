//! The `Linnet` facade: every caller-facing operation.
//!
//! Create: generate items, write them, reduce the root.
//! Traverse: query edges, hydrate, optionally filter.
//! Delete: mark rows with a ttl.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::api::{
    ConnectionPage, ConnectionRequest, CreateArgs, DeleteArgs, DeleteCount, Response, UpsertArgs,
    UpsertOutput,
};
use crate::config::LinnetConfig;
use crate::db::{
    effective_ttl, BatchWriter, DeletionScanner, EdgeQuery, Hydrator, RetryPolicy,
};
use crate::error::{Error, Result};
use crate::filter::json_to_filter;
use crate::graph::{Generated, ItemGenerator, RootNodeReducer};
use crate::record::{Item, NodeRecord, Stamp};
use crate::schema::{EdgeDefinition, EdgeSchema};
use crate::store::{KeyValueStore, PutCondition};
use crate::value::Fields;

/// Graph operations over one table.
pub struct Linnet<S: KeyValueStore + ?Sized> {
    store: Arc<S>,
    schema: EdgeSchema,
    config: LinnetConfig,
}

impl<S: KeyValueStore + ?Sized> Clone for Linnet<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            schema: self.schema.clone(),
            config: self.config.clone(),
        }
    }
}

impl<S: KeyValueStore + ?Sized + 'static> Linnet<S> {
    /// Creates the facade. The store client's lifecycle stays with the caller.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] when an edge definition lacks its
    /// mirror, and [`Error::Config`] when `config` is out of range.
    pub fn new(store: Arc<S>, schema: EdgeSchema, config: LinnetConfig) -> Result<Self> {
        schema.validate()?;
        config.validate()?;
        Ok(Self {
            store,
            schema,
            config,
        })
    }

    /// Edge schema in use.
    #[must_use]
    pub fn schema(&self) -> &EdgeSchema {
        &self.schema
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &LinnetConfig {
        &self.config
    }

    /// Store client.
    #[must_use]
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    fn table(&self) -> &str {
        &self.config.store.table_name
    }

    fn generate(
        &self,
        type_name: &str,
        args: &CreateArgs,
        root_id: Option<&str>,
        stamp: Stamp,
    ) -> Result<Generated> {
        ItemGenerator::new(&self.schema, stamp).generate(
            type_name,
            args.data.as_ref(),
            args.connections.as_ref(),
            root_id,
        )
    }

    /// Creates a nested graph. Each row is written with its own conditional
    /// put, concurrently; a failed put never cancels its siblings. Returns the
    /// reduced first root node and one message per failed put.
    #[tracing::instrument(skip(self, args))]
    pub async fn create(&self, type_name: &str, args: CreateArgs) -> Response<Option<Fields>> {
        let now = Utc::now();
        let stamp = Stamp::new(now, &self.config.write.created_by);
        let generated = match self.generate(type_name, &args, None, stamp) {
            Ok(generated) => generated,
            Err(error) => return Response::failed(None, error),
        };
        let Some(root_id) = generated.roots.first().cloned() else {
            return Response::ok(None);
        };

        let errors = self.put_all(&generated.items).await;
        let root = RootNodeReducer::new(&self.schema, now.timestamp()).reduce(&root_id, &generated.items);
        info!(root = %root_id, items = generated.items.len(), errors = errors.len(), "create finished");
        Response::partial(root, errors)
    }

    async fn put_all(&self, items: &[Item]) -> Vec<Error> {
        let mut set = JoinSet::new();
        for item in items {
            let store = Arc::clone(&self.store);
            let table = self.table().to_string();
            let key = item.key();
            let attrs = item.to_attributes();
            set.spawn(async move {
                let result = store.put_item(&table, attrs, PutCondition::IfNotExists).await;
                (key, result)
            });
        }

        let mut errors = Vec::new();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((_, Ok(()))) => {}
                Ok((key, Err(error))) => {
                    warn!(id = %key.id, data_type = %key.data_type, error = %error, "put failed");
                    errors.push(error);
                }
                Err(join_error) => {
                    errors.push(Error::Internal(format!("put task failed: {join_error}")));
                }
            }
        }
        errors
    }

    /// Creates or overwrites a nested graph through batch writes. The first
    /// top-level node takes `where.id` when given.
    #[tracing::instrument(skip(self, args))]
    pub async fn upsert(&self, type_name: &str, args: UpsertArgs) -> Response<UpsertOutput> {
        let now = Utc::now();
        let stamp = Stamp::new(now, &self.config.write.created_by);
        let root_id = args.where_args.as_ref().and_then(|w| w.id.as_deref());
        let generated = match self.generate(type_name, &args.create, root_id, stamp) {
            Ok(generated) => generated,
            Err(error) => return Response::failed(UpsertOutput::default(), error),
        };
        let Some(root_id) = generated.roots.first().cloned() else {
            return Response::ok(UpsertOutput::default());
        };

        let writer = BatchWriter::new(
            self.store.as_ref(),
            self.table(),
            self.config.write.batch_size,
            RetryPolicy::from(&self.config.write),
        );
        let outcome = writer.write(&generated.items).await;
        let node = RootNodeReducer::new(&self.schema, now.timestamp()).reduce(&root_id, &generated.items);
        let output = UpsertOutput {
            node,
            unprocessed: outcome.unprocessed.into_iter().map(|r| r.item).collect(),
        };
        Response::partial(output, outcome.errors)
    }

    /// Reads a root node with every declared edge field resolved.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Response<Option<Fields>> {
        let now = Utc::now().timestamp();
        let hydrated = self.hydrator(now).hydrate(&[id.to_string()]).await;
        let mut errors = hydrated.errors;
        let Some(root) = hydrated.nodes.into_iter().next() else {
            errors.push(Error::NotFound(format!("no node with id {id}")));
            return Response::partial(None, errors);
        };

        let query = self.edge_query(now);
        let mut items = Vec::new();
        for edge in self.schema.edges_on_type(&root.type_name) {
            match query.all(id, edge, self.config.query.query_all_limit, None).await {
                Ok(page) => items.extend(page.records.into_iter().map(Item::Edge)),
                Err(error) => errors.push(error),
            }
        }
        items.push(Item::Node(root));

        let node = RootNodeReducer::new(&self.schema, now).reduce(id, &items);
        Response::partial(node, errors)
    }

    /// Singular traversal: the first live neighbor along `type_name.field`.
    #[tracing::instrument(skip(self, request), fields(type_name = %request.type_name, field = %request.field))]
    pub async fn connection(&self, request: &ConnectionRequest) -> Response<Option<Fields>> {
        let (edge, root_id) = match self.resolve(request) {
            Ok(resolved) => resolved,
            Err(error) => return Response::failed(None, error),
        };
        let limit = positive(request.arguments.limit).unwrap_or(self.config.query.singular_limit);
        let now = Utc::now().timestamp();
        let query = self.edge_query(now);

        let mut cursor: Option<String> = None;
        let neighbors = loop {
            match query.page(root_id, edge, limit, cursor.as_deref()).await {
                Ok(page) if !page.neighbors.is_empty() || page.cursor.is_none() => {
                    break page.neighbors
                }
                Ok(page) => cursor = page.cursor,
                Err(error) => return Response::failed(None, error),
            }
        };

        let hydrated = self.hydrator(now).hydrate(&neighbors).await;
        let node = order_by(hydrated.nodes, &neighbors)
            .into_iter()
            .next()
            .map(|n| n.to_output());
        Response::partial(node, hydrated.errors)
    }

    /// Plural traversal. Without a filter (or with one whose operators are
    /// all null) this returns one page and the cursor for the next. With a filter every remaining neighbor is read,
    /// filtered in memory and truncated to `limit`; the cursor is then null.
    #[tracing::instrument(skip(self, request), fields(type_name = %request.type_name, field = %request.field))]
    pub async fn connection_plural(&self, request: &ConnectionRequest) -> Response<ConnectionPage> {
        let (edge, root_id) = match self.resolve(request) {
            Ok(resolved) => resolved,
            Err(error) => return Response::failed(ConnectionPage::default(), error),
        };
        let args = &request.arguments;
        let limit = positive(args.limit).unwrap_or(self.config.query.default_limit);
        let filter = match args.filter.as_ref().filter(|f| !f.is_null()) {
            Some(json) => match json_to_filter(json) {
                Ok(filter) if filter.is_empty() => None,
                Ok(filter) => Some(filter),
                Err(error) => return Response::failed(ConnectionPage::default(), error),
            },
            None => None,
        };
        let now = Utc::now().timestamp();
        let query = self.edge_query(now);
        let cursor = args.cursor.as_deref();

        let page = match &filter {
            Some(_) => query.all(root_id, edge, self.config.query.query_all_limit, cursor).await,
            None => query.page(root_id, edge, limit, cursor).await,
        };
        let page = match page {
            Ok(page) => page,
            Err(error) => return Response::failed(ConnectionPage::default(), error),
        };

        let hydrated = self.hydrator(now).hydrate(&page.neighbors).await;
        let mut edges: Vec<Fields> = order_by(hydrated.nodes, &page.neighbors)
            .iter()
            .map(NodeRecord::to_output)
            .collect();
        if let Some(filter) = &filter {
            let before = edges.len();
            edges = filter.filter_nodes(edges);
            edges.truncate(limit);
            debug!(before, after = edges.len(), "filtered connection");
        }

        let data = ConnectionPage {
            count: edges.len().to_string(),
            edges,
            cursor: page.cursor,
        };
        Response::partial(data, hydrated.errors)
    }

    /// Soft-deletes one entity. Rows that could not be marked are reported
    /// as errors next to the count of rows that were.
    #[tracing::instrument(skip(self, args))]
    pub async fn delete(&self, args: DeleteArgs) -> Response<DeleteCount> {
        let Some(id) = args.where_args.id.as_deref().filter(|id| !id.is_empty()) else {
            return Response::failed(
                DeleteCount::default(),
                Error::InvalidInput("cannot delete, no id passed".to_string()),
            );
        };
        let (ttl, now) = self.delete_ttl(&args);
        let deleted = self.scanner().soft_delete(id, ttl, now).await;
        Response::partial(DeleteCount { count: deleted.count }, deleted.errors)
    }

    /// Soft-deletes several entities with one ttl.
    #[tracing::instrument(skip(self, args), fields(ids = args.where_args.ids.len()))]
    pub async fn delete_many(&self, args: DeleteArgs) -> Response<DeleteCount> {
        if args.where_args.ids.is_empty() {
            return Response::failed(
                DeleteCount::default(),
                Error::InvalidInput("cannot delete, no ids passed".to_string()),
            );
        }
        let (ttl, now) = self.delete_ttl(&args);
        let deleted = self
            .scanner()
            .soft_delete_many(&args.where_args.ids, ttl, now)
            .await;
        Response::partial(DeleteCount { count: deleted.count }, deleted.errors)
    }

    fn delete_ttl(&self, args: &DeleteArgs) -> (i64, i64) {
        let now = Utc::now().timestamp();
        let ttl = effective_ttl(args.time_to_live(), now, self.config.delete.grace_minutes);
        if args.time_to_live().is_some_and(|supplied| supplied != ttl) {
            warn!(ttl, "supplied ttl is older than the grace window, clamped");
        }
        (ttl, now)
    }

    fn resolve<'r>(&self, request: &'r ConnectionRequest) -> Result<(&EdgeDefinition, &'r str)> {
        let edge = self
            .schema
            .edge_for_field(&request.type_name, &request.field)
            .ok_or_else(|| {
                Error::InvalidInput(format!(
                    "no edge definition for {}.{}",
                    request.type_name, request.field
                ))
            })?;
        let root_id = request
            .root_id()
            .ok_or_else(|| Error::InvalidInput("no root id passed".to_string()))?;
        Ok((edge, root_id))
    }

    fn edge_query(&self, now: i64) -> EdgeQuery<'_, S> {
        EdgeQuery::new(
            self.store.as_ref(),
            self.table(),
            &self.config.store.edge_index_name,
            now,
        )
    }

    fn hydrator(&self, now: i64) -> Hydrator<S> {
        Hydrator::new(
            Arc::clone(&self.store),
            self.table(),
            self.config.query.get_batch_size,
            now,
        )
    }

    fn scanner(&self) -> DeletionScanner<'_, S> {
        DeletionScanner::new(
            self.store.as_ref(),
            self.table(),
            self.config.query.query_all_limit,
        )
    }
}

fn positive(limit: Option<usize>) -> Option<usize> {
    limit.filter(|&l| l > 0)
}

/// Sorts hydrated nodes into the order their ids were queried in.
fn order_by(mut nodes: Vec<NodeRecord>, ids: &[String]) -> Vec<NodeRecord> {
    let position: HashMap<&str, usize> = ids
        .iter()
        .enumerate()
        .map(|(i, id)| (id.as_str(), i))
        .collect();
    nodes.sort_by_key(|n| position.get(n.id.as_str()).copied().unwrap_or(usize::MAX));
    nodes
}
