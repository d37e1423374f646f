//! Folds a flat item list back into a graph-shaped root node.

use crate::record::{Item, NodeRecord};
use crate::schema::{EdgeDefinition, EdgeSchema};
use crate::value::{Fields, Value};

/// Reference to a neighbor attached under an edge field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeItem {
    /// Neighbor id.
    pub id: String,
    /// Root id.
    pub parent_id: String,
    /// Shared edge name.
    pub edge_name: String,
}

impl EdgeItem {
    fn to_value(&self) -> Value {
        let mut fields = Fields::new();
        fields.insert("id".to_string(), Value::from(self.id.as_str()));
        fields.insert("parentId".to_string(), Value::from(self.parent_id.as_str()));
        fields.insert("edgeName".to_string(), Value::from(self.edge_name.as_str()));
        Value::Node(fields)
    }
}

/// Builds the caller-facing view of a root node.
#[derive(Debug, Clone, Copy)]
pub struct RootNodeReducer<'a> {
    schema: &'a EdgeSchema,
    now: i64,
}

impl<'a> RootNodeReducer<'a> {
    /// Creates a reducer treating rows with `ttl <= now` as deleted.
    #[must_use]
    pub fn new(schema: &'a EdgeSchema, now: i64) -> Self {
        Self { schema, now }
    }

    /// Finds the live Node row for `root_id`.
    #[must_use]
    pub fn find_root<'i>(&self, root_id: &str, items: &'i [Item]) -> Option<&'i NodeRecord> {
        items
            .iter()
            .filter(|item| !item.is_expired(self.now))
            .filter_map(Item::as_node)
            .find(|node| node.id == root_id)
    }

    /// Neighbors of `root_id` along `edge` found among `items`.
    #[must_use]
    pub fn edge_items(&self, root_id: &str, edge: &EdgeDefinition, items: &[Item]) -> Vec<EdgeItem> {
        items
            .iter()
            .filter(|item| !item.is_expired(self.now))
            .filter_map(Item::as_edge)
            .filter(|record| record.edge_name == edge.edge_name)
            .filter_map(|record| {
                let (own, neighbor) = if edge.principal {
                    (&record.id, &record.neighbor)
                } else {
                    (&record.neighbor, &record.id)
                };
                (own == root_id).then(|| EdgeItem {
                    id: neighbor.clone(),
                    parent_id: root_id.to_string(),
                    edge_name: edge.edge_name.clone(),
                })
            })
            .collect()
    }

    /// Strips internal attributes from the root node and attaches
    /// `{ items: [{ id, parentId, edgeName }] }` under each declared edge
    /// field of its type. Returns `None` when no live root node is present.
    #[must_use]
    pub fn reduce(&self, root_id: &str, items: &[Item]) -> Option<Fields> {
        let root = self.find_root(root_id, items)?;
        let mut out = root.to_output();
        for edge in self.schema.edges_on_type(&root.type_name) {
            let edge_items = self
                .edge_items(root_id, edge, items)
                .iter()
                .map(EdgeItem::to_value)
                .collect();
            let mut connection = Fields::new();
            connection.insert("items".to_string(), Value::List(edge_items));
            out.insert(edge.field.clone(), Value::Node(connection));
        }
        Some(out)
    }
}
