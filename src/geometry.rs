//! Geometry primitives for the canvas: anchor points and connection curves.
//!
//! Everything in this module is a pure function of its inputs. Anchor points
//! are derived from a node's logical position and a fixed footprint; curves
//! are horizontal-biased cubic beziers between two anchors. Callers recompute
//! on every position change — nothing here caches.

use serde::{Deserialize, Serialize};

/// A point in logical canvas coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "(f32, f32)", into = "(f32, f32)")]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

impl From<Point> for (f32, f32) {
    fn from(p: Point) -> Self {
        (p.x, p.y)
    }
}

/// Which side of a node an anchor sits on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotKind {
    Input,
    Output,
}

/// Horizontal gap between a node's edge and its anchor point.
pub const ANCHOR_STUB: f32 = 1.5;

/// Cap on the horizontal control-point offset of a connection curve.
pub const MAX_CONTROL_OFFSET: f32 = 100.0;

/// Fixed rendered footprint of a node.
///
/// This is an approximation, not a measurement of actual rendered size: every
/// node is treated as the same rectangle for anchor derivation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeFootprint {
    pub width: f32,
    pub height: f32,
}

impl Default for NodeFootprint {
    fn default() -> Self {
        Self {
            width: 180.0,
            height: 65.0,
        }
    }
}

impl NodeFootprint {
    /// Anchor point for a node at `position`.
    ///
    /// Outputs attach just past the right edge, inputs just before the left
    /// edge, both at vertical center:
    ///
    /// - output: `(x + width + ANCHOR_STUB, y + height / 2)`
    /// - input:  `(x - ANCHOR_STUB, y + height / 2)`
    pub fn anchor(&self, position: Point, kind: SlotKind) -> Point {
        let y = position.y + self.height / 2.0;
        match kind {
            SlotKind::Output => Point::new(position.x + self.width + ANCHOR_STUB, y),
            SlotKind::Input => Point::new(position.x - ANCHOR_STUB, y),
        }
    }
}

/// A cubic bezier connecting an output anchor to an input anchor.
///
/// Control points extend horizontally from each endpoint by
/// `min(|end.x - start.x| / 2, MAX_CONTROL_OFFSET)`, keeping each control
/// point's y equal to its own endpoint's y. The result is a horizontal-biased
/// S-curve regardless of vertical offset; when the endpoints share an x the
/// offset collapses to zero and the curve is a straight vertical line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CurvePath {
    pub start: Point,
    pub control1: Point,
    pub control2: Point,
    pub end: Point,
}

impl CurvePath {
    /// Build the curve between two anchor points.
    pub fn between(start: Point, end: Point) -> Self {
        let offset = ((end.x - start.x).abs() / 2.0).min(MAX_CONTROL_OFFSET);

        Self {
            start,
            control1: Point::new(start.x + offset, start.y),
            control2: Point::new(end.x - offset, end.y),
            end,
        }
    }

    /// Evaluate the curve at parameter `t` in `[0, 1]`.
    pub fn eval(&self, t: f32) -> Point {
        let t2 = t * t;
        let t3 = t2 * t;
        let mt = 1.0 - t;
        let mt2 = mt * mt;
        let mt3 = mt2 * mt;

        Point::new(
            mt3 * self.start.x
                + 3.0 * mt2 * t * self.control1.x
                + 3.0 * mt * t2 * self.control2.x
                + t3 * self.end.x,
            mt3 * self.start.y
                + 3.0 * mt2 * t * self.control1.y
                + 3.0 * mt * t2 * self.control2.y
                + t3 * self.end.y,
        )
    }

    /// SVG path command string for the curve.
    ///
    /// Format: `M start_x start_y C c1_x c1_y c2_x c2_y end_x end_y`.
    pub fn to_svg(&self) -> String {
        format!(
            "M {} {} C {} {} {} {} {} {}",
            self.start.x,
            self.start.y,
            self.control1.x,
            self.control1.y,
            self.control2.x,
            self.control2.y,
            self.end.x,
            self.end.y
        )
    }
}

/// Squared distance from a point to a line segment.
fn distance_to_segment_sq(point: Point, a: Point, b: Point) -> f32 {
    let ab = (b.x - a.x, b.y - a.y);
    let ap = (point.x - a.x, point.y - a.y);

    let ab_len_sq = ab.0 * ab.0 + ab.1 * ab.1;

    if ab_len_sq < f32::EPSILON {
        // Degenerate segment (a == b)
        return ap.0 * ap.0 + ap.1 * ap.1;
    }

    let t = ((ap.0 * ab.0 + ap.1 * ab.1) / ab_len_sq).clamp(0.0, 1.0);

    let closest = Point::new(a.x + t * ab.0, a.y + t * ab.1);

    let dx = point.x - closest.x;
    let dy = point.y - closest.y;
    dx * dx + dy * dy
}

/// Minimum distance from a point to a curve.
///
/// Subdivision approach: sample the curve at regular intervals and take the
/// closest segment. `num_samples == 0` falls back to 20.
pub fn distance_to_curve(point: Point, curve: &CurvePath, num_samples: usize) -> f32 {
    let num_samples = if num_samples == 0 { 20 } else { num_samples };

    let mut min_dist_sq = f32::MAX;
    let mut prev = curve.eval(0.0);

    for i in 1..=num_samples {
        let t = i as f32 / num_samples as f32;
        let curr = curve.eval(t);

        let dist_sq = distance_to_segment_sq(point, prev, curr);
        if dist_sq < min_dist_sq {
            min_dist_sq = dist_sq;
        }

        prev = curr;
    }

    min_dist_sq.sqrt()
}
