//! Request and response envelopes.
//!
//! These mirror the resolver event JSON: arguments arrive as
//! `{ where, data, connections, limit, cursor, filter, set }` and every
//! operation answers with `{ data, errors }`.

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use crate::error::Error;
use crate::value::Fields;

/// Operation result: possibly partial data plus user-visible error strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response<T> {
    /// Result data.
    pub data: T,
    /// Error messages, empty on full success.
    pub errors: Vec<String>,
}

impl<T> Response<T> {
    /// Successful response.
    #[must_use]
    pub fn ok(data: T) -> Self {
        Self {
            data,
            errors: Vec::new(),
        }
    }

    /// Response carrying `data` and the messages of `errors`.
    #[must_use]
    pub fn partial(data: T, errors: impl IntoIterator<Item = Error>) -> Self {
        Self {
            data,
            errors: errors.into_iter().map(|e| e.to_string()).collect(),
        }
    }

    /// Response carrying `data` and a single error.
    #[must_use]
    pub fn failed(data: T, error: Error) -> Self {
        Self::partial(data, [error])
    }

    /// True when no error was reported.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// `where` argument.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhereArgs {
    /// Single target id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Several target ids.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ids: Vec<String>,
}

impl WhereArgs {
    /// `where: { id }`.
    #[must_use]
    pub fn id(id: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            ids: Vec::new(),
        }
    }
}

/// Arguments of a create.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateArgs {
    /// A single object or an array of objects.
    #[serde(default)]
    pub data: Option<Json>,
    /// Links to existing nodes. Not supported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connections: Option<Json>,
}

impl CreateArgs {
    /// `{ data }`.
    #[must_use]
    pub fn data(data: Json) -> Self {
        Self {
            data: Some(data),
            connections: None,
        }
    }
}

/// Arguments of an upsert: a create whose first node may reuse `where.id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpsertArgs {
    /// Id to write the first top-level node under.
    #[serde(rename = "where", default)]
    pub where_args: Option<WhereArgs>,
    /// Payload.
    #[serde(flatten)]
    pub create: CreateArgs,
}

/// Result of an upsert.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpsertOutput {
    /// Reduced root node.
    pub node: Option<Fields>,
    /// Rows the store did not accept after retries.
    pub unprocessed: Vec<Fields>,
}

/// Arguments of a connection traversal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectionArgs {
    /// Fallback root id.
    #[serde(rename = "where", default)]
    pub where_args: Option<WhereArgs>,
    /// Page size; zero or absent selects the configured default.
    #[serde(default)]
    pub limit: Option<usize>,
    /// Opaque cursor from a previous page.
    #[serde(default)]
    pub cursor: Option<String>,
    /// Per-field predicates.
    #[serde(default)]
    pub filter: Option<Json>,
}

/// A traversal of one edge field from one root node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionRequest {
    /// Type owning the edge field.
    pub type_name: String,
    /// Edge field name.
    pub field: String,
    /// Parent object resolved so far; its `id` is the preferred root id.
    #[serde(default)]
    pub source: Option<Json>,
    /// Arguments.
    #[serde(default)]
    pub arguments: ConnectionArgs,
}

impl ConnectionRequest {
    /// Request for `type_name.field`.
    #[must_use]
    pub fn new(type_name: &str, field: &str) -> Self {
        Self {
            type_name: type_name.to_string(),
            field: field.to_string(),
            ..Self::default()
        }
    }

    /// Sets `source.id` (builder pattern).
    #[must_use]
    pub fn with_source_id(mut self, id: &str) -> Self {
        self.source = Some(serde_json::json!({ "id": id }));
        self
    }

    /// Sets the arguments (builder pattern).
    #[must_use]
    pub fn with_arguments(mut self, arguments: ConnectionArgs) -> Self {
        self.arguments = arguments;
        self
    }

    /// `source.id` when non-empty, otherwise `where.id`.
    #[must_use]
    pub fn root_id(&self) -> Option<&str> {
        self.source
            .as_ref()
            .and_then(|s| s.get("id"))
            .and_then(Json::as_str)
            .filter(|id| !id.is_empty())
            .or_else(|| {
                self.arguments
                    .where_args
                    .as_ref()
                    .and_then(|w| w.id.as_deref())
                    .filter(|id| !id.is_empty())
            })
    }
}

/// One page of a plural traversal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionPage {
    /// Hydrated neighbors.
    pub edges: Vec<Fields>,
    /// Number of edges in this page.
    pub count: String,
    /// Cursor for the next page.
    pub cursor: Option<String>,
}

impl Default for ConnectionPage {
    fn default() -> Self {
        Self {
            edges: Vec::new(),
            count: "0".to_string(),
            cursor: None,
        }
    }
}

/// `set` argument of a delete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetArgs {
    /// Unix seconds at which the rows expire.
    #[serde(default)]
    pub time_to_live: Option<i64>,
}

/// Arguments of a delete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteArgs {
    /// Target id or ids.
    #[serde(rename = "where", default)]
    pub where_args: WhereArgs,
    /// Ttl override.
    #[serde(default)]
    pub set: Option<SetArgs>,
}

impl DeleteArgs {
    /// Supplied ttl, if any.
    #[must_use]
    pub fn time_to_live(&self) -> Option<i64> {
        self.set.as_ref().and_then(|s| s.time_to_live)
    }
}

/// Result of a delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteCount {
    /// Rows marked.
    pub count: usize,
}
