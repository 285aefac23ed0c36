//! The workflow document: the JSON shape a canvas is saved as and loaded
//! from.
//!
//! A document is a nodes array plus the connections adjacency object — the
//! at-rest serialization of the connection store. Persistence itself happens
//! elsewhere (the enclosing application saves the document over HTTP); this
//! module only guarantees the round-trip is lossless: load → save reproduces
//! an observably identical store, same enumeration order included.
//!
//! Shape validation happens here, once, at the boundary. Targets are strict
//! records with required fields; `null` fan-out slots are coerced to empty
//! slots; anything else malformed rejects the whole document.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::info;

use crate::connections::ConnectionMap;
use crate::geometry::Point;
use crate::render::NodeIndex;

/// Errors from reading or writing a workflow document.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to parse workflow document: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("failed to serialize workflow document: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// One node as stored in a workflow document.
///
/// Only what this core needs: the unique `name` (the key the connection
/// store uses), the node-type identifier, the canvas position, and the
/// parameter object carried through untouched for the backend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeStub {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub position: Point,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub parameters: Map<String, Value>,
}

impl NodeStub {
    pub fn new(name: impl Into<String>, kind: impl Into<String>, position: Point) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            position,
            parameters: Map::new(),
        }
    }
}

/// A complete workflow document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub nodes: Vec<NodeStub>,
    #[serde(default)]
    pub connections: ConnectionMap,
}

impl WorkflowDocument {
    /// Parse a document from JSON, rejecting malformed shapes.
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        let document: Self = serde_json::from_str(json).map_err(DocumentError::Parse)?;
        info!(
            name = document.name.as_deref().unwrap_or("(unnamed)"),
            nodes = document.nodes.len(),
            edges = document.connections.edge_count(),
            "workflow document loaded"
        );
        Ok(document)
    }

    /// Serialize the document to JSON.
    pub fn to_json(&self) -> Result<String, DocumentError> {
        serde_json::to_string_pretty(self).map_err(DocumentError::Serialize)
    }

    /// Build the position index from the nodes array.
    ///
    /// Names are unique per workflow; should a malformed document repeat
    /// one, the last occurrence wins rather than erroring.
    pub fn node_index(&self) -> NodeIndex {
        let mut index = NodeIndex::new();
        for node in &self.nodes {
            index.set(node.name.clone(), node.position);
        }
        index
    }
}
