//! # Linnet Core
//!
//! A property graph (typed Nodes connected by typed Edges) encoded in a
//! single key-value table with a composite partition/sort key.
//!
//! ## Features
//!
//! - **Nested creates**: one payload expands into Node rows plus adjacency rows
//! - **Bidirectional edges**: one physical row per relationship, traversable
//!   from either side through the `edge-dataType` index
//! - **Cursor pagination**: opaque base64 cursors over the store's continuation key
//! - **In-memory filtering**: per-field operators for when the store cannot push predicates down
//! - **Soft deletes**: rows are marked with a ttl, never removed
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use linnet_core::{
//!     ConnectionRequest, CreateArgs, EdgeDefinition, EdgeSchema, Linnet, LinnetConfig,
//!     MemoryStore,
//! };
//! use serde_json::json;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let schema = EdgeSchema::new(vec![
//!     EdgeDefinition::new("Customer", "orders", "Order", "OrdersOnCustomer")
//!         .with_counterpart("Order", "customer"),
//!     EdgeDefinition::new("Order", "customer", "Customer", "OrdersOnCustomer")
//!         .with_principal(false)
//!         .with_counterpart("Customer", "orders"),
//! ]);
//! let linnet = Linnet::new(Arc::new(MemoryStore::new()), schema, LinnetConfig::default())?;
//!
//! let created = linnet
//!     .create(
//!         "Customer",
//!         CreateArgs::data(json!({ "name": "A", "orders": { "data": [{ "status": "X" }] } })),
//!     )
//!     .await;
//! let customer = created.data.ok_or("create failed")?;
//! let id = customer.get("id").and_then(|v| v.as_str()).ok_or("no id")?;
//!
//! let page = linnet
//!     .connection_plural(&ConnectionRequest::new("Customer", "orders").with_source_id(id))
//!     .await;
//! assert_eq!(page.data.edges.len(), 1);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
// Clippy lints configured in workspace Cargo.toml [workspace.lints.clippy]
#![cfg_attr(
    test,
    allow(
        clippy::doc_markdown,
        clippy::uninlined_format_args,
        clippy::single_match_else,
        clippy::cast_lossless,
        clippy::manual_assert
    )
)]

pub mod api;
pub mod config;
pub mod cursor;
pub mod db;
pub mod error;
pub mod filter;
pub mod graph;
pub mod logging;
pub mod record;
#[cfg(test)]
mod record_tests;
pub mod schema;
#[cfg(test)]
mod schema_tests;
pub mod service;
pub mod store;
#[cfg(test)]
mod test_support;
pub mod value;
#[cfg(test)]
mod value_tests;

pub use api::{
    ConnectionArgs, ConnectionPage, ConnectionRequest, CreateArgs, DeleteArgs, DeleteCount,
    Response, SetArgs, UpsertArgs, UpsertOutput, WhereArgs,
};
pub use config::LinnetConfig;
pub use error::{Error, Result};
pub use filter::{json_to_filter, FilterConfig, Operator, Predicate};
pub use graph::{Generated, ItemGenerator, RootNodeReducer};
pub use logging::init_tracing;
pub use record::{EdgeRecord, Item, NodeRecord, PrimaryKey};
pub use schema::{Cardinality, EdgeDefinition, EdgeSchema};
pub use service::Linnet;
pub use store::{KeyValueStore, MemoryStore};
pub use value::{Fields, ScalarKind, Value};
