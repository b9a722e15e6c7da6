//! Planar geometry over normalized image coordinates.
//!
//! All inputs are in the `[0, 1]` range relative to image width/height. No
//! unit conversion happens here, so thresholds built on these values are
//! either raw normalized offsets or ratios of two measured distances.
//!
//! Every function is total: coincident points are legal and produce `0.0`.

/// A 2D point in normalized image space. `y` grows downwards.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point2D {
    pub x: f32,
    pub y: f32,
}

impl Point2D {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Interior angle at `vertex` between the rays to `a` and `c`, in degrees.
///
/// Always within `[0, 180]` and independent of winding order.
pub fn angle_at_vertex(a: Point2D, vertex: Point2D, c: Point2D) -> f32 {
    let mut angle = bearing(vertex, c) - bearing(vertex, a);
    if angle < 0.0 {
        angle += 360.0;
    }
    if angle > 180.0 {
        angle = 360.0 - angle;
    }
    angle
}

/// Euclidean distance between two points.
pub fn distance(a: Point2D, b: Point2D) -> f32 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    (dx * dx + dy * dy).sqrt()
}

/// Bearing of the line `from → to` in degrees, in `(-180, 180]`.
///
/// Not wrapped or folded: callers comparing two bearings see the raw
/// `atan2` discontinuity at ±180°.
pub fn bearing(from: Point2D, to: Point2D) -> f32 {
    (to.y - from.y).atan2(to.x - from.x).to_degrees()
}
