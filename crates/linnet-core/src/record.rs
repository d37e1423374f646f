//! Stored row types: Node records and adjacency (edge) records.
//!
//! Every row lives in a single table keyed by `id` (partition) and
//! `linnet:dataType` (sort). Node rows use the literal [`NODE_MARKER`] as
//! sort key; edge rows use `<edgeName>::<neighborId>`.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::{Error, Result};
use crate::schema::EdgeDefinition;
use crate::value::{Fields, Value};

/// Partition key attribute.
pub const ID: &str = "id";
/// Sort key attribute: [`NODE_MARKER`] or `<edgeName>::<neighborId>`.
pub const DATA_TYPE: &str = "linnet:dataType";
/// Non-partition endpoint of an edge row; partition key of the edge index.
pub const EDGE: &str = "linnet:edge";
/// Declared type name of the row.
pub const NAMED_TYPE: &str = "linnet:namedType";
/// Soft-delete marker, unix seconds.
pub const TTL: &str = "linnet:ttl";
/// Creation timestamp (RFC 3339).
pub const CREATED_AT: &str = "createdAt";
/// Update timestamp (RFC 3339).
pub const UPDATED_AT: &str = "updatedAt";
/// Creator tag.
pub const CREATED_BY: &str = "createdBy";

/// Sort key value of Node rows.
pub const NODE_MARKER: &str = "Node";
/// Prefix shared by every internal attribute.
pub const RESERVED_PREFIX: &str = "linnet:";
/// Separator between edge name and neighbor id in edge sort keys.
pub const SORT_SEPARATOR: &str = "::";

/// Internal attributes removed from every node returned to a caller.
pub const LINNET_FIELDS: [&str; 4] = [DATA_TYPE, EDGE, NAMED_TYPE, TTL];

/// Returns true when `field` may not be supplied by a caller.
#[must_use]
pub fn is_reserved_field(field: &str) -> bool {
    field == ID
        || field.starts_with(RESERVED_PREFIX)
        || matches!(field, CREATED_AT | UPDATED_AT | CREATED_BY)
}

/// Formats a timestamp the way rows store it.
#[must_use]
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Full primary key of a row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PrimaryKey {
    /// Partition value.
    pub id: String,
    /// Sort value.
    pub data_type: String,
}

impl PrimaryKey {
    /// Creates a key.
    #[must_use]
    pub fn new(id: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            data_type: data_type.into(),
        }
    }

    /// Key of the Node row for `id`.
    #[must_use]
    pub fn node(id: impl Into<String>) -> Self {
        Self::new(id, NODE_MARKER)
    }

    /// Reads the key attributes of a raw row.
    pub fn from_attributes(attrs: &Fields) -> Result<Self> {
        match (string_attr(attrs, ID), string_attr(attrs, DATA_TYPE)) {
            (Some(id), Some(data_type)) => Ok(Self::new(id, data_type)),
            _ => Err(Error::Internal(format!(
                "row is missing key attributes {ID} and {DATA_TYPE}"
            ))),
        }
    }
}

/// Bookkeeping attributes shared by node and edge rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stamp {
    /// Creation time.
    pub created_at: String,
    /// Last update time.
    pub updated_at: String,
    /// Creator tag.
    pub created_by: String,
}

impl Stamp {
    /// Stamp with identical created/updated times.
    #[must_use]
    pub fn new(at: DateTime<Utc>, created_by: &str) -> Self {
        let at = format_timestamp(at);
        Self {
            created_at: at.clone(),
            updated_at: at,
            created_by: created_by.to_string(),
        }
    }

    fn write(&self, attrs: &mut Fields) {
        attrs.insert(CREATED_AT.to_string(), Value::from(self.created_at.as_str()));
        attrs.insert(UPDATED_AT.to_string(), Value::from(self.updated_at.as_str()));
        attrs.insert(CREATED_BY.to_string(), Value::from(self.created_by.as_str()));
    }

    fn read(attrs: &mut Fields) -> Self {
        let mut take = |name: &str| match attrs.shift_remove(name) {
            Some(Value::String(s)) => s,
            _ => String::new(),
        };
        Self {
            created_at: take(CREATED_AT),
            updated_at: take(UPDATED_AT),
            created_by: take(CREATED_BY),
        }
    }
}

/// A stored entity.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRecord {
    /// Entity identifier.
    pub id: String,
    /// Declared type name.
    pub type_name: String,
    /// Bookkeeping.
    pub stamp: Stamp,
    /// Soft-delete marker.
    pub ttl: Option<i64>,
    /// User fields.
    pub fields: Fields,
}

impl NodeRecord {
    /// Creates an empty node.
    #[must_use]
    pub fn new(id: impl Into<String>, type_name: impl Into<String>, stamp: Stamp) -> Self {
        Self {
            id: id.into(),
            type_name: type_name.into(),
            stamp,
            ttl: None,
            fields: Fields::new(),
        }
    }

    /// Sets a user field (builder pattern).
    #[must_use]
    pub fn with_field(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    /// Node view with every `linnet:*` attribute removed and bookkeeping kept.
    #[must_use]
    pub fn to_output(&self) -> Fields {
        let mut out = Fields::new();
        out.insert(ID.to_string(), Value::from(self.id.as_str()));
        self.stamp.write(&mut out);
        for (name, value) in &self.fields {
            out.insert(name.clone(), value.clone());
        }
        out
    }
}

/// A stored adjacency row.
///
/// `id` is always the principal-side entity and `neighbor` the other
/// endpoint, so one physical row serves both traversal directions.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeRecord {
    /// Partition value.
    pub id: String,
    /// Shared edge name.
    pub edge_name: String,
    /// Value of `linnet:edge`.
    pub neighbor: String,
    /// Value of `linnet:namedType`.
    pub named_type: String,
    /// Bookkeeping.
    pub stamp: Stamp,
    /// Soft-delete marker.
    pub ttl: Option<i64>,
}

impl EdgeRecord {
    /// Synthesizes the row linking `parent` to `child` along `edge`, where
    /// `edge` is declared on the parent's type.
    #[must_use]
    pub fn link(edge: &EdgeDefinition, parent: &str, child: &str, stamp: Stamp) -> Self {
        let (id, neighbor, named_type) = if edge.principal {
            (parent, child, edge.field_type.as_str())
        } else {
            (child, parent, edge.counterpart.type_name.as_str())
        };
        Self {
            id: id.to_string(),
            edge_name: edge.edge_name.clone(),
            neighbor: neighbor.to_string(),
            named_type: named_type.to_string(),
            stamp,
            ttl: None,
        }
    }

    /// `<edgeName>::<neighbor>`.
    #[must_use]
    pub fn sort_key(&self) -> String {
        format!("{}{SORT_SEPARATOR}{}", self.edge_name, self.neighbor)
    }
}

/// Any row of the table.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    /// Entity row.
    Node(NodeRecord),
    /// Adjacency row.
    Edge(EdgeRecord),
}

impl Item {
    /// Partition value.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Node(node) => &node.id,
            Self::Edge(edge) => &edge.id,
        }
    }

    /// Full primary key.
    #[must_use]
    pub fn key(&self) -> PrimaryKey {
        match self {
            Self::Node(node) => PrimaryKey::node(node.id.as_str()),
            Self::Edge(edge) => PrimaryKey::new(edge.id.as_str(), edge.sort_key()),
        }
    }

    /// Soft-delete marker.
    #[must_use]
    pub fn ttl(&self) -> Option<i64> {
        match self {
            Self::Node(node) => node.ttl,
            Self::Edge(edge) => edge.ttl,
        }
    }

    /// True when a ttl is set and not later than `now` (unix seconds).
    #[must_use]
    pub fn is_expired(&self, now: i64) -> bool {
        self.ttl().is_some_and(|ttl| ttl <= now)
    }

    /// Returns the node if this is a Node row.
    #[must_use]
    pub fn as_node(&self) -> Option<&NodeRecord> {
        match self {
            Self::Node(node) => Some(node),
            Self::Edge(_) => None,
        }
    }

    /// Returns the edge if this is an adjacency row.
    #[must_use]
    pub fn as_edge(&self) -> Option<&EdgeRecord> {
        match self {
            Self::Edge(edge) => Some(edge),
            Self::Node(_) => None,
        }
    }

    /// Marshals into raw store attributes.
    #[must_use]
    pub fn to_attributes(&self) -> Fields {
        let mut attrs = Fields::new();
        attrs.insert(ID.to_string(), Value::from(self.id()));
        match self {
            Self::Node(node) => {
                attrs.insert(DATA_TYPE.to_string(), Value::from(NODE_MARKER));
                attrs.insert(NAMED_TYPE.to_string(), Value::from(node.type_name.as_str()));
                node.stamp.write(&mut attrs);
                for (name, value) in &node.fields {
                    attrs.insert(name.clone(), value.clone());
                }
            }
            Self::Edge(edge) => {
                attrs.insert(DATA_TYPE.to_string(), Value::from(edge.sort_key()));
                attrs.insert(NAMED_TYPE.to_string(), Value::from(edge.named_type.as_str()));
                attrs.insert(EDGE.to_string(), Value::from(edge.neighbor.as_str()));
                edge.stamp.write(&mut attrs);
            }
        }
        if let Some(ttl) = self.ttl() {
            attrs.insert(TTL.to_string(), Value::Int(ttl));
        }
        attrs
    }

    /// Unmarshals raw store attributes.
    pub fn from_attributes(mut attrs: Fields) -> Result<Self> {
        let id = take_string(&mut attrs, ID)?;
        let data_type = take_string(&mut attrs, DATA_TYPE)?;
        let named_type = take_string(&mut attrs, NAMED_TYPE).unwrap_or_default();
        let ttl = match attrs.shift_remove(TTL) {
            None => None,
            Some(Value::Int(ttl)) => Some(ttl),
            Some(other) => {
                return Err(Error::Internal(format!(
                    "{TTL} on {id} is not an integer: {other:?}"
                )))
            }
        };
        let stamp = Stamp::read(&mut attrs);

        if data_type == NODE_MARKER {
            attrs.shift_remove(EDGE);
            return Ok(Self::Node(NodeRecord {
                id,
                type_name: named_type,
                stamp,
                ttl,
                fields: attrs,
            }));
        }

        let neighbor = take_string(&mut attrs, EDGE)?;
        let edge_name = data_type
            .strip_suffix(&format!("{SORT_SEPARATOR}{neighbor}"))
            .ok_or_else(|| {
                Error::Internal(format!(
                    "sort key {data_type} on {id} does not end with neighbor {neighbor}"
                ))
            })?
            .to_string();
        Ok(Self::Edge(EdgeRecord {
            id,
            edge_name,
            neighbor,
            named_type,
            stamp,
            ttl,
        }))
    }
}

impl From<NodeRecord> for Item {
    fn from(node: NodeRecord) -> Self {
        Self::Node(node)
    }
}

impl From<EdgeRecord> for Item {
    fn from(edge: EdgeRecord) -> Self {
        Self::Edge(edge)
    }
}

/// Reads a string attribute from raw attributes without removing it.
#[must_use]
pub fn string_attr<'a>(attrs: &'a Fields, name: &str) -> Option<&'a str> {
    attrs.get(name).and_then(Value::as_str)
}

fn take_string(attrs: &mut Fields, name: &str) -> Result<String> {
    match attrs.shift_remove(name) {
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(Error::Internal(format!(
            "attribute {name} is not a string: {other:?}"
        ))),
        None => Err(Error::Internal(format!("attribute {name} is missing"))),
    }
}
