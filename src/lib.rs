//! # Workflow Canvas
//!
//! Connection model and geometry core for a visual workflow editor: the
//! in-memory adjacency structure wiring automation nodes into directed
//! graphs, and the pure geometry that turns node positions into drawable
//! connection curves.
//!
//! The crate is deliberately headless. Rendering, persistence and execution
//! belong to the surrounding application; this core owns:
//!
//! - **Connection store** — nodes are keyed by unique name; edges are
//!   per-channel-kind, per-slot fan-out lists with insertion-order
//!   enumeration and a lossless JSON projection
//! - **Geometry** — fixed-footprint anchor points and horizontal-biased
//!   cubic bezier curves, recomputed from scratch every render
//! - **Viewport** — pan/zoom as an explicit per-frame value with an event
//!   reducer
//! - **Editor intents** — drag-to-connect, click-to-delete, node drags
//!
//! ## Quick Start
//!
//! ```
//! use workflow_canvas::{Point, WorkflowEditor};
//!
//! let mut editor = WorkflowEditor::new();
//! editor.add_node("Webhook", Point::new(0.0, 0.0));
//! editor.add_node("Send email", Point::new(300.0, 40.0));
//!
//! editor.begin_connection("Webhook", "main", 0);
//! editor.complete_connection("Send email", "main", 0).unwrap();
//!
//! for edge_curve in editor.render() {
//!     let _svg = edge_curve.curve.to_svg();
//! }
//! ```
//!
//! ## Core Components
//!
//! - [`ConnectionMap`] - the adjacency store
//! - [`WorkflowEditor`] - state and intent handlers for one open canvas
//! - [`WorkflowDocument`] - the at-rest JSON document
//! - [`NodeFootprint`] / [`CurvePath`] - anchor and curve geometry
//! - [`ViewportState`] - pan/zoom value and reducer
//! - [`project_edges`] / [`find_edge_at`] - render pass and hit-testing

pub mod connections;
pub mod document;
pub mod editor;
pub mod geometry;
pub mod render;
pub mod validation;
pub mod viewport;

pub use connections::{ConnectionMap, ConnectionTarget, Edge, SlotList, MAIN_CHANNEL};
pub use document::{DocumentError, NodeStub, WorkflowDocument};
pub use editor::{ConnectError, PendingConnection, WorkflowEditor};
pub use geometry::{
    distance_to_curve, CurvePath, NodeFootprint, Point, SlotKind, ANCHOR_STUB, MAX_CONTROL_OFFSET,
};
pub use hit_test::{find_anchor_at, find_edge_at, AnchorHit};
pub use render::{
    project_edges, project_edges_screen, EdgeCurve, IncomingIndex, NodeIndex, NodeLocator,
};
pub use validation::{
    CompositeValidator, ConnectionValidator, KindMatch, NoDuplicate, NoSelfLoop, ValidationError,
    ValidationResult,
};
pub use viewport::{ViewportEvent, ViewportState, MAX_ZOOM, MIN_ZOOM};
