//! User-intent layer: the state one open workflow canvas needs and the
//! handlers its input events call.
//!
//! [`WorkflowEditor`] owns node positions, the connection store, the viewport
//! and an optional in-progress connection gesture. All mutations happen on
//! discrete user-input events through `&mut self` methods — there is one
//! mutator at a time, so no locking and no interior mutability.
//!
//! Screen-space input (pointer positions) is converted at this boundary; the
//! store and geometry below it only ever see world coordinates.

use thiserror::Error;
use tracing::debug;

use crate::connections::{ConnectionMap, ConnectionTarget, Edge};
use crate::document::WorkflowDocument;
use crate::geometry::{CurvePath, NodeFootprint, Point, SlotKind};
use crate::hit_test::{find_anchor_at, find_edge_at, AnchorHit};
use crate::render::{project_edges, project_edges_screen, EdgeCurve, NodeIndex, NodeLocator};
use crate::validation::{CompositeValidator, ConnectionValidator, ValidationError, ValidationResult};
use crate::viewport::{ViewportEvent, ViewportState};

/// Pointer distance within which a click selects a curve.
pub const HOVER_DISTANCE: f32 = 10.0;
/// Pointer distance within which a click hits an anchor.
pub const ANCHOR_RADIUS: f32 = 8.0;
/// Bezier samples used for hit-testing.
pub const HIT_SAMPLES: usize = 20;

/// A drag-to-connect gesture in progress: anchored at a specific output
/// slot, following the pointer until completed or cancelled.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingConnection {
    pub source: String,
    pub kind: String,
    pub slot: usize,
}

/// Why completing a connection gesture failed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConnectError {
    #[error("no connection gesture in progress")]
    NoPendingConnection,

    #[error(transparent)]
    Rejected(#[from] ValidationError),
}

/// State and intent handlers for one open workflow.
pub struct WorkflowEditor {
    nodes: NodeIndex,
    connections: ConnectionMap,
    viewport: ViewportState,
    footprint: NodeFootprint,
    validator: Box<dyn ConnectionValidator>,
    pending: Option<PendingConnection>,
}

impl Default for WorkflowEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkflowEditor {
    /// An empty canvas with the default footprint and drawing rules.
    pub fn new() -> Self {
        Self {
            nodes: NodeIndex::new(),
            connections: ConnectionMap::new(),
            viewport: ViewportState::default(),
            footprint: NodeFootprint::default(),
            validator: Box::new(CompositeValidator::drawing_rules()),
            pending: None,
        }
    }

    /// Open a workflow document, replacing nodes and connections wholesale.
    pub fn from_document(document: &WorkflowDocument) -> Self {
        let mut editor = Self::new();
        editor.nodes = document.node_index();
        editor.connections = document.connections.clone();
        editor
    }

    /// Replace the drawing-time validation rules.
    pub fn with_validator<V: ConnectionValidator + 'static>(mut self, validator: V) -> Self {
        self.validator = Box::new(validator);
        self
    }

    /// Override the node footprint used for anchor derivation.
    pub fn with_footprint(mut self, footprint: NodeFootprint) -> Self {
        self.footprint = footprint;
        self
    }

    // === Nodes ===

    pub fn add_node(&mut self, name: impl Into<String>, position: Point) {
        let name = name.into();
        debug!(node = %name, "node added");
        self.nodes.set(name, position);
    }

    /// Remove a node. Its edges stay in the store as dangling references,
    /// which the render pass drops.
    pub fn remove_node(&mut self, name: &str) {
        debug!(node = name, "node removed");
        self.nodes.remove(name);
    }

    /// Drag a node by a world-space delta.
    pub fn move_node(&mut self, name: &str, dx: f32, dy: f32) {
        self.nodes.move_by(name, dx, dy);
    }

    pub fn set_node_position(&mut self, name: &str, position: Point) {
        self.nodes.set(name, position);
    }

    pub fn node_position(&self, name: &str) -> Option<Point> {
        self.nodes.position(name)
    }

    pub fn nodes(&self) -> &NodeIndex {
        &self.nodes
    }

    pub fn connections(&self) -> &ConnectionMap {
        &self.connections
    }

    // === Viewport ===

    pub fn viewport(&self) -> ViewportState {
        self.viewport
    }

    pub fn apply_viewport(&mut self, event: ViewportEvent) {
        self.viewport = self.viewport.apply(event);
    }

    // === Drag-to-connect lifecycle ===

    /// Start a connection gesture from a specific output slot.
    ///
    /// A gesture already in progress is replaced.
    pub fn begin_connection(&mut self, source: impl Into<String>, kind: impl Into<String>, slot: usize) {
        let pending = PendingConnection {
            source: source.into(),
            kind: kind.into(),
            slot,
        };
        debug!(source = %pending.source, kind = %pending.kind, slot, "connection gesture started");
        self.pending = Some(pending);
    }

    pub fn pending_connection(&self) -> Option<&PendingConnection> {
        self.pending.as_ref()
    }

    /// Screen-space preview curve from the pending source anchor to the
    /// pointer. `None` when no gesture is in progress or the source node is
    /// gone.
    pub fn preview_curve(&self, pointer_screen: Point) -> Option<CurvePath> {
        let pending = self.pending.as_ref()?;
        let position = self.nodes.position(&pending.source)?;
        let anchor = self.footprint.anchor(position, SlotKind::Output);
        Some(CurvePath::between(
            self.viewport.to_screen(anchor),
            pointer_screen,
        ))
    }

    /// Complete the gesture on a specific input slot.
    ///
    /// The candidate edge is validated with the editor's drawing rules; on
    /// success it is inserted and the resulting edge returned. The gesture
    /// ends either way except when validation rejects it — a rejected drop
    /// keeps the gesture alive so the user can retarget.
    pub fn complete_connection(
        &mut self,
        target: impl Into<String>,
        target_kind: impl Into<String>,
        target_slot: usize,
    ) -> Result<Edge, ConnectError> {
        let pending = self
            .pending
            .as_ref()
            .ok_or(ConnectError::NoPendingConnection)?;

        let edge = Edge::new(
            pending.source.clone(),
            pending.kind.clone(),
            pending.slot,
            target,
            target_kind,
            target_slot,
        );

        match self.validator.validate(&edge, &self.connections) {
            ValidationResult::Valid => {}
            ValidationResult::Invalid(err) => {
                debug!(error = %err, "connection rejected");
                return Err(err.into());
            }
        }

        self.connections.add(
            &edge.source,
            &edge.source_kind,
            edge.source_index,
            ConnectionTarget::new(edge.target.clone(), edge.target_kind.clone(), edge.target_index),
        );
        self.pending = None;
        Ok(edge)
    }

    /// Abandon the gesture, if any.
    pub fn cancel_connection(&mut self) {
        if self.pending.take().is_some() {
            debug!("connection gesture cancelled");
        }
    }

    // === Deletion ===

    /// Sever the whole type-level relationship between two nodes.
    ///
    /// Returns the number of edges removed; zero for a relationship that
    /// does not exist.
    pub fn remove_connection(&mut self, source: &str, target: &str, kind: &str) -> usize {
        self.connections.remove(source, target, kind)
    }

    // === Rendering and hit facades ===

    /// The per-frame render pass in world space.
    pub fn render(&self) -> Vec<EdgeCurve> {
        project_edges(&self.connections, &self.nodes, self.footprint)
    }

    /// The per-frame render pass through the current viewport.
    pub fn render_screen(&self) -> Vec<EdgeCurve> {
        project_edges_screen(&self.connections, &self.nodes, self.footprint, self.viewport)
    }

    /// The edge under a screen-space pointer, if any. The caller decides
    /// what to do with it (typically confirm, then
    /// [`remove_connection`](Self::remove_connection)).
    pub fn edge_at(&self, pointer_screen: Point) -> Option<Edge> {
        let curves = self.render_screen();
        find_edge_at(pointer_screen, &curves, HOVER_DISTANCE, HIT_SAMPLES).map(|ec| ec.edge.clone())
    }

    /// The anchor under a screen-space pointer, if any.
    pub fn anchor_at(&self, pointer_screen: Point) -> Option<(Edge, SlotKind)> {
        let curves = self.render_screen();
        find_anchor_at(pointer_screen, &curves, ANCHOR_RADIUS)
            .map(|AnchorHit { curve, kind }| (curve.edge.clone(), kind))
    }
}
