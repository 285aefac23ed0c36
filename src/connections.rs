//! The connection store: a nested adjacency structure mapping a source node's
//! name, per channel kind and per output slot, to an ordered fan-out list of
//! targets.
//!
//! The store is purely structural. It does not know whether the node names it
//! holds resolve to live nodes — dangling references are reported like any
//! other edge, and it is the render pass that drops them (see
//! [`crate::render::project_edges`]). No operation here fails: missing keys
//! degrade to no-ops or empty iterators, and duplicate edges are kept as-is.
//!
//! Enumeration order is part of the contract: channel kinds in insertion
//! order of first appearance, then slot index ascending, then fan-out
//! insertion order. Rebuilding a store from its own edge list reproduces the
//! same order, which is what makes the serialized form lossless.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

/// The conventional data channel kind.
pub const MAIN_CHANNEL: &str = "main";

/// One entry in a fan-out list: the input side of an edge.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionTarget {
    /// Name of the target node.
    pub node: String,
    /// Channel kind on the target side. Independent of the source-side kind;
    /// the store does not require them to match.
    #[serde(rename = "type")]
    pub kind: String,
    /// Input slot index on the target node.
    pub index: usize,
}

impl ConnectionTarget {
    pub fn new(node: impl Into<String>, kind: impl Into<String>, index: usize) -> Self {
        Self {
            node: node.into(),
            kind: kind.into(),
            index,
        }
    }
}

/// A fully-resolved edge record.
///
/// Edges have no standalone id; this six-field tuple *is* the identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Edge {
    pub source: String,
    pub source_kind: String,
    pub source_index: usize,
    pub target: String,
    pub target_kind: String,
    pub target_index: usize,
}

impl Edge {
    pub fn new(
        source: impl Into<String>,
        source_kind: impl Into<String>,
        source_index: usize,
        target: impl Into<String>,
        target_kind: impl Into<String>,
        target_index: usize,
    ) -> Self {
        Self {
            source: source.into(),
            source_kind: source_kind.into(),
            source_index,
            target: target.into(),
            target_kind: target_kind.into(),
            target_index,
        }
    }
}

/// Per-output-slot fan-out lists for one channel kind.
///
/// The outer list is indexed by output slot and may be sparse — an empty
/// inner list is an unused slot. Some producers serialize unused slots as
/// `null` instead of `[]`; deserialization coerces those to empty slots.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SlotList(pub Vec<Vec<ConnectionTarget>>);

impl<'de> Deserialize<'de> for SlotList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Vec<Option<Vec<ConnectionTarget>>> = Deserialize::deserialize(deserializer)?;
        Ok(SlotList(
            raw.into_iter().map(Option::unwrap_or_default).collect(),
        ))
    }
}

/// The adjacency structure itself.
///
/// Serializes as the workflow document's `connections` object:
///
/// ```json
/// {
///     "A": {
///         "main": [[{ "node": "B", "type": "main", "index": 0 }]]
///     }
/// }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionMap {
    by_source: IndexMap<String, IndexMap<String, SlotList>>,
}

impl ConnectionMap {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from a flat edge list.
    ///
    /// Inserting the edges of [`iter_edges`](Self::iter_edges) back through
    /// this constructor reproduces a store with identical enumeration order.
    pub fn from_edges<I>(edges: I) -> Self
    where
        I: IntoIterator<Item = Edge>,
    {
        let mut map = Self::new();
        for edge in edges {
            map.add(
                &edge.source,
                &edge.source_kind,
                edge.source_index,
                ConnectionTarget::new(edge.target, edge.target_kind, edge.target_index),
            );
        }
        map
    }

    /// Add an edge from `source`'s output slot to `target`.
    ///
    /// Outer levels are created lazily and the slot list is padded with empty
    /// slots as needed. Duplicates are permitted and never collapsed.
    pub fn add(&mut self, source: &str, source_kind: &str, source_index: usize, target: ConnectionTarget) {
        debug!(
            source,
            kind = source_kind,
            slot = source_index,
            target = %target.node,
            "connection added"
        );

        let slots = self
            .by_source
            .entry(source.to_string())
            .or_default()
            .entry(source_kind.to_string())
            .or_default();

        if slots.0.len() <= source_index {
            slots.0.resize_with(source_index + 1, Vec::new);
        }
        slots.0[source_index].push(target);
    }

    /// Remove every edge from `source` to `target` under channel `kind`,
    /// across all slot and target-index combinations.
    ///
    /// Deletion is deliberately coarser than creation: one call severs the
    /// whole type-level relationship between two nodes, while [`add`](Self::add)
    /// is slot-specific. Returns the number of edges removed; removing a
    /// relationship that does not exist is a no-op.
    pub fn remove(&mut self, source: &str, target: &str, kind: &str) -> usize {
        let Some(channels) = self.by_source.get_mut(source) else {
            return 0;
        };
        let Some(slots) = channels.get_mut(kind) else {
            return 0;
        };

        let mut removed = 0;
        for fanout in &mut slots.0 {
            let before = fanout.len();
            fanout.retain(|t| t.node != target);
            removed += before - fanout.len();
        }

        if removed > 0 {
            debug!(source, target, kind, removed, "connections removed");
        }
        removed
    }

    /// Whether this exact edge (all six fields) is present.
    pub fn contains(&self, edge: &Edge) -> bool {
        self.by_source
            .get(&edge.source)
            .and_then(|channels| channels.get(&edge.source_kind))
            .and_then(|slots| slots.0.get(edge.source_index))
            .is_some_and(|fanout| {
                fanout.iter().any(|t| {
                    t.node == edge.target && t.kind == edge.target_kind && t.index == edge.target_index
                })
            })
    }

    /// All outgoing edges of `source`, in enumeration order.
    pub fn edges_from<'a>(&'a self, source: &str) -> impl Iterator<Item = Edge> + 'a {
        self.by_source
            .get_key_value(source)
            .into_iter()
            .flat_map(|(name, channels)| Self::source_edges(name, channels))
    }

    /// All incoming edges of `target`.
    ///
    /// This is a full scan over every source's edge lists — the store keeps
    /// no reverse index. Callers that need fan-in per node on every render
    /// should build an [`IncomingIndex`](crate::render::IncomingIndex) once
    /// per pass instead of calling this per node.
    pub fn edges_to<'a>(&'a self, target: &str) -> impl Iterator<Item = Edge> + 'a {
        let target = target.to_string();
        self.iter_edges().filter(move |edge| edge.target == target)
    }

    /// Every edge in the store, in enumeration order.
    pub fn iter_edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.by_source
            .iter()
            .flat_map(|(name, channels)| Self::source_edges(name, channels))
    }

    fn source_edges<'a>(
        name: &'a str,
        channels: &'a IndexMap<String, SlotList>,
    ) -> impl Iterator<Item = Edge> + 'a {
        channels.iter().flat_map(move |(kind, slots)| {
            slots.0.iter().enumerate().flat_map(move |(slot, fanout)| {
                fanout.iter().map(move |t| Edge {
                    source: name.to_string(),
                    source_kind: kind.clone(),
                    source_index: slot,
                    target: t.node.clone(),
                    target_kind: t.kind.clone(),
                    target_index: t.index,
                })
            })
        })
    }

    /// Names of all source nodes that have (or had) outgoing edges.
    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.by_source.keys().map(String::as_str)
    }

    /// Total number of edges.
    pub fn edge_count(&self) -> usize {
        self.by_source
            .values()
            .flat_map(|channels| channels.values())
            .flat_map(|slots| slots.0.iter())
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.edge_count() == 0
    }

    /// Drop every edge.
    pub fn clear(&mut self) {
        self.by_source.clear();
    }
}
