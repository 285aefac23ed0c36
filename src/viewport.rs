//! Viewport state: pan and zoom as an explicit per-frame value.
//!
//! The canvas viewport is modeled as an immutable value updated through an
//! event reducer, rather than mutable fields scattered across event handlers.
//! Geometry stays in world (logical) coordinates everywhere else; screen
//! conversion happens only at this boundary:
//!
//! ```text
//! screen = world * zoom + pan
//! world  = (screen - pan) / zoom
//! ```

use crate::geometry::Point;

/// Zoom bounds applied by the reducer.
pub const MIN_ZOOM: f32 = 0.1;
pub const MAX_ZOOM: f32 = 4.0;

/// Pan/zoom state of the canvas for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportState {
    pub zoom: f32,
    pub pan_x: f32,
    pub pan_y: f32,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
        }
    }
}

/// A user-input event that changes the viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ViewportEvent {
    /// Pan by a screen-space delta.
    PanBy { dx: f32, dy: f32 },
    /// Scale zoom by `factor`, keeping the screen-space `focus` point fixed
    /// (the world point under the cursor stays under the cursor).
    ZoomAt { focus: Point, factor: f32 },
    /// Back to zoom 1, pan 0.
    Reset,
}

impl ViewportState {
    pub fn new(zoom: f32, pan_x: f32, pan_y: f32) -> Self {
        Self { zoom, pan_x, pan_y }
    }

    /// Apply one event, producing the next frame's viewport.
    pub fn apply(self, event: ViewportEvent) -> Self {
        match event {
            ViewportEvent::PanBy { dx, dy } => Self {
                pan_x: self.pan_x + dx,
                pan_y: self.pan_y + dy,
                ..self
            },
            ViewportEvent::ZoomAt { focus, factor } => {
                let zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
                // Solve pan so that focus maps to the same world point before
                // and after the zoom change.
                let scale = zoom / self.zoom;
                Self {
                    zoom,
                    pan_x: focus.x - (focus.x - self.pan_x) * scale,
                    pan_y: focus.y - (focus.y - self.pan_y) * scale,
                }
            }
            ViewportEvent::Reset => Self::default(),
        }
    }

    /// World (logical) coordinates to screen coordinates.
    pub fn to_screen(&self, world: Point) -> Point {
        Point::new(
            world.x * self.zoom + self.pan_x,
            world.y * self.zoom + self.pan_y,
        )
    }

    /// Screen coordinates back to world coordinates.
    pub fn to_world(&self, screen: Point) -> Point {
        let z = if self.zoom > 0.0 { self.zoom } else { 1.0 };
        Point::new((screen.x - self.pan_x) / z, (screen.y - self.pan_y) / z)
    }
}
