//! The per-frame projection pass: connection store in, drawable curves out.
//!
//! On every render the editor walks the store, resolves each edge's endpoints
//! through a [`NodeLocator`], and emits one [`EdgeCurve`] per edge. There is
//! no incremental diffing — everything is re-derived from scratch, which is
//! fine at the graph sizes this canvas handles (tens of nodes).
//!
//! Dangling references are the renderer's problem, not the store's: an edge
//! whose endpoint no longer resolves to a live node stays in the store but is
//! silently excluded here.

use std::collections::HashMap;

use tracing::trace;

use crate::connections::{ConnectionMap, Edge};
use crate::geometry::{CurvePath, NodeFootprint, Point, SlotKind};
use crate::viewport::ViewportState;

/// Node position provider and existence check in one seam.
///
/// `None` means "no live node by that name" — the render pass drops edges
/// referencing such names.
pub trait NodeLocator {
    fn position(&self, name: &str) -> Option<Point>;

    fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }
}

/// Ready-made [`NodeLocator`] backed by a name → position map.
#[derive(Clone, Debug, Default)]
pub struct NodeIndex {
    positions: HashMap<String, Point>,
}

impl NodeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or reposition a node. Last write wins on duplicate names.
    pub fn set(&mut self, name: impl Into<String>, position: Point) {
        self.positions.insert(name.into(), position);
    }

    /// Remove a node. Edges referencing it become dangling, which is
    /// tolerated everywhere downstream.
    pub fn remove(&mut self, name: &str) -> Option<Point> {
        self.positions.remove(name)
    }

    /// Translate a node by a delta. Unknown names are a no-op.
    pub fn move_by(&mut self, name: &str, dx: f32, dy: f32) {
        if let Some(p) = self.positions.get_mut(name) {
            p.x += dx;
            p.y += dy;
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.positions.keys().map(String::as_str)
    }
}

impl NodeLocator for NodeIndex {
    fn position(&self, name: &str) -> Option<Point> {
        self.positions.get(name).copied()
    }
}

/// One drawable connection: the edge identity, its two anchor points, and
/// the curve between them. The anchors double as the click hit-targets.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeCurve {
    pub edge: Edge,
    pub start: Point,
    pub end: Point,
    pub curve: CurvePath,
}

/// Project every renderable edge into world-space curves.
///
/// Edges whose source or target does not resolve are skipped; the store
/// still reports them structurally via [`ConnectionMap::iter_edges`].
pub fn project_edges(
    connections: &ConnectionMap,
    nodes: &impl NodeLocator,
    footprint: NodeFootprint,
) -> Vec<EdgeCurve> {
    connections
        .iter_edges()
        .filter_map(|edge| {
            let Some(source_pos) = nodes.position(&edge.source) else {
                trace!(source = %edge.source, "skipping edge with dangling source");
                return None;
            };
            let Some(target_pos) = nodes.position(&edge.target) else {
                trace!(target = %edge.target, "skipping edge with dangling target");
                return None;
            };

            let start = footprint.anchor(source_pos, SlotKind::Output);
            let end = footprint.anchor(target_pos, SlotKind::Input);

            Some(EdgeCurve {
                edge,
                start,
                end,
                curve: CurvePath::between(start, end),
            })
        })
        .collect()
}

/// Project every renderable edge into screen-space curves for the given
/// viewport. Anchors are derived in world space and transformed, then the
/// curve is built between the transformed endpoints so control-point offsets
/// scale with zoom the way the rendered canvas does.
pub fn project_edges_screen(
    connections: &ConnectionMap,
    nodes: &impl NodeLocator,
    footprint: NodeFootprint,
    viewport: ViewportState,
) -> Vec<EdgeCurve> {
    project_edges(connections, nodes, footprint)
        .into_iter()
        .map(|ec| {
            let start = viewport.to_screen(ec.start);
            let end = viewport.to_screen(ec.end);
            EdgeCurve {
                edge: ec.edge,
                start,
                end,
                curve: CurvePath::between(start, end),
            }
        })
        .collect()
}

/// Per-render-pass cache of incoming edges by target name.
///
/// [`ConnectionMap::edges_to`] is a full scan; calling it once per node per
/// frame turns O(nodes × edges) into O(nodes² × edges). Build this once per
/// pass instead and look up per node.
#[derive(Clone, Debug, Default)]
pub struct IncomingIndex {
    by_target: HashMap<String, Vec<Edge>>,
}

impl IncomingIndex {
    /// Build the reverse index with a single walk over the store.
    pub fn build(connections: &ConnectionMap) -> Self {
        let mut by_target: HashMap<String, Vec<Edge>> = HashMap::new();
        for edge in connections.iter_edges() {
            by_target.entry(edge.target.clone()).or_default().push(edge);
        }
        Self { by_target }
    }

    /// Incoming edges for one node; empty if none.
    pub fn edges_to(&self, target: &str) -> &[Edge] {
        self.by_target.get(target).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of incoming edges for one node.
    pub fn fan_in(&self, target: &str) -> usize {
        self.edges_to(target).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connections::{ConnectionTarget, MAIN_CHANNEL};

    fn two_node_setup() -> (ConnectionMap, NodeIndex) {
        let mut connections = ConnectionMap::new();
        connections.add(
            "A",
            MAIN_CHANNEL,
            0,
            ConnectionTarget::new("B", MAIN_CHANNEL, 0),
        );

        let mut nodes = NodeIndex::new();
        nodes.set("A", Point::new(0.0, 0.0));
        nodes.set("B", Point::new(300.0, 40.0));

        (connections, nodes)
    }

    // ========================================================================
    // project_edges() - World-Space Projection
    // ========================================================================

    #[test]
    fn test_project_connect_and_render_scenario() {
        let (connections, nodes) = two_node_setup();

        let curves = project_edges(&connections, &nodes, NodeFootprint::default());

        assert_eq!(curves.len(), 1);
        let ec = &curves[0];
        assert_eq!(ec.start, Point::new(181.5, 32.5));
        assert_eq!(ec.end, Point::new(298.5, 72.5));
        // |dx| = 117 -> control offset min(58.5, 100) = 58.5
        assert_eq!(ec.curve.control1, Point::new(240.0, 32.5));
        assert_eq!(ec.curve.control2, Point::new(240.0, 72.5));
    }

    #[test]
    fn test_project_skips_dangling_target() {
        let (mut connections, nodes) = two_node_setup();
        connections.add(
            "A",
            MAIN_CHANNEL,
            0,
            ConnectionTarget::new("X", MAIN_CHANNEL, 0),
        );

        let curves = project_edges(&connections, &nodes, NodeFootprint::default());

        // Store still reports both edges; the render pass drops the dangling one
        assert_eq!(connections.iter_edges().count(), 2);
        assert_eq!(curves.len(), 1);
        assert_eq!(curves[0].edge.target, "B");
    }

    #[test]
    fn test_project_skips_dangling_source() {
        let (connections, mut nodes) = two_node_setup();
        nodes.remove("A");

        let curves = project_edges(&connections, &nodes, NodeFootprint::default());

        assert!(curves.is_empty());
        assert_eq!(connections.iter_edges().count(), 1);
    }

    #[test]
    fn test_project_empty_store() {
        let connections = ConnectionMap::new();
        let nodes = NodeIndex::new();

        let curves = project_edges(&connections, &nodes, NodeFootprint::default());
        assert!(curves.is_empty());
    }

    #[test]
    fn test_project_recomputes_after_move() {
        let (connections, mut nodes) = two_node_setup();

        let before = project_edges(&connections, &nodes, NodeFootprint::default());
        nodes.move_by("B", 50.0, 0.0);
        let after = project_edges(&connections, &nodes, NodeFootprint::default());

        assert_eq!(after[0].end.x, before[0].end.x + 50.0);
    }

    // ========================================================================
    // project_edges_screen() - Viewport Composition
    // ========================================================================

    #[test]
    fn test_screen_projection_identity_viewport() {
        let (connections, nodes) = two_node_setup();

        let world = project_edges(&connections, &nodes, NodeFootprint::default());
        let screen = project_edges_screen(
            &connections,
            &nodes,
            NodeFootprint::default(),
            ViewportState::default(),
        );

        assert_eq!(world, screen);
    }

    #[test]
    fn test_screen_projection_applies_zoom_and_pan() {
        let (connections, nodes) = two_node_setup();
        let viewport = ViewportState::new(2.0, 10.0, -5.0);

        let screen = project_edges_screen(&connections, &nodes, NodeFootprint::default(), viewport);

        assert_eq!(screen[0].start, Point::new(181.5 * 2.0 + 10.0, 32.5 * 2.0 - 5.0));
        assert_eq!(screen[0].end, Point::new(298.5 * 2.0 + 10.0, 72.5 * 2.0 - 5.0));
    }

    // ========================================================================
    // NodeIndex
    // ========================================================================

    #[test]
    fn test_node_index_last_write_wins() {
        let mut nodes = NodeIndex::new();
        nodes.set("A", Point::new(0.0, 0.0));
        nodes.set("A", Point::new(9.0, 9.0));

        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes.position("A"), Some(Point::new(9.0, 9.0)));
    }

    #[test]
    fn test_node_index_move_unknown_is_noop() {
        let mut nodes = NodeIndex::new();
        nodes.move_by("ghost", 10.0, 10.0);
        assert!(nodes.is_empty());
    }

    #[test]
    fn test_node_locator_contains() {
        let (_, nodes) = two_node_setup();
        assert!(nodes.contains("A"));
        assert!(!nodes.contains("X"));
    }

    // ========================================================================
    // IncomingIndex - Per-Pass Fan-In Cache
    // ========================================================================

    #[test]
    fn test_incoming_index_groups_by_target() {
        let mut connections = ConnectionMap::new();
        connections.add("A", MAIN_CHANNEL, 0, ConnectionTarget::new("X", MAIN_CHANNEL, 0));
        connections.add("B", MAIN_CHANNEL, 0, ConnectionTarget::new("X", MAIN_CHANNEL, 1));
        connections.add("B", MAIN_CHANNEL, 1, ConnectionTarget::new("Y", MAIN_CHANNEL, 0));

        let index = IncomingIndex::build(&connections);

        assert_eq!(index.fan_in("X"), 2);
        assert_eq!(index.fan_in("Y"), 1);
        assert_eq!(index.fan_in("Z"), 0);
        assert_eq!(index.edges_to("X")[0].source, "A");
    }

    #[test]
    fn test_incoming_index_matches_store_scan() {
        let mut connections = ConnectionMap::new();
        connections.add("A", MAIN_CHANNEL, 0, ConnectionTarget::new("X", MAIN_CHANNEL, 0));
        connections.add("C", "aux", 0, ConnectionTarget::new("X", "aux", 0));

        let index = IncomingIndex::build(&connections);
        let scanned: Vec<Edge> = connections.edges_to("X").collect();

        assert_eq!(index.edges_to("X"), scanned.as_slice());
    }
}
