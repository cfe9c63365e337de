// SPDX-License-Identifier: MIT OR Apache-2.0
//! Canvas geometry: points, socket anchors and rendered edge paths.
//!
//! The model itself only stores a socket's `(index, side)`. Turning that into
//! canvas coordinates is the job of a [`GeometryProvider`], normally supplied
//! by the presentation layer. [`NodeGeometry`] is the stock layout.

use crate::edge::EdgeType;
use crate::node::Node;
use crate::socket::SocketSide;
use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// Vertical control point offset used when a bezier edge doubles back
pub const EDGE_CP_ROUNDNESS: f64 = 100.0;

/// Default number of straight segments a bezier edge is flattened into
pub const DEFAULT_CURVE_SEGMENTS: usize = 24;

/// A point in abstract canvas (scene) coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate
    pub x: f64,
    /// Vertical coordinate
    pub y: f64,
}

impl Point {
    /// Origin
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Create a new point
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn lerp(self, other: Self, t: f64) -> Self {
        Self::new(self.x + (other.x - self.x) * t, self.y + (other.y - self.y) * t)
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Supplies socket anchor positions relative to the node origin.
pub trait GeometryProvider {
    /// Anchor of the socket at `index` on `side` of `node`, relative to the node position
    fn socket_anchor(&self, node: &Node, index: usize, side: SocketSide) -> Point;
}

/// Fixed-size node layout.
///
/// Sockets anchored to a bottom corner stack upward from the bottom edge,
/// sockets anchored to a top corner stack downward below the title bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeGeometry {
    /// Node body width
    pub width: f64,
    /// Node body height
    pub height: f64,
    /// Height of the title bar
    pub title_height: f64,
    /// Inner padding
    pub padding: f64,
    /// Corner rounding size
    pub edge_size: f64,
    /// Vertical distance between neighbouring sockets
    pub socket_spacing: f64,
}

impl Default for NodeGeometry {
    fn default() -> Self {
        Self {
            width: 180.0,
            height: 240.0,
            title_height: 24.0,
            padding: 4.0,
            edge_size: 10.0,
            socket_spacing: 22.0,
        }
    }
}

impl GeometryProvider for NodeGeometry {
    fn socket_anchor(&self, _node: &Node, index: usize, side: SocketSide) -> Point {
        let x = if side.is_left() { 0.0 } else { self.width };
        let offset = index as f64 * self.socket_spacing;
        let y = if side.is_bottom() {
            self.height - self.edge_size - self.padding - offset
        } else {
            self.title_height + self.padding + self.edge_size + offset
        };
        Point::new(x, y)
    }
}

/// Rendered path of an edge as a polyline.
///
/// Direct edges are a single segment. Bezier edges are flattened into
/// `segments` pieces.
pub fn edge_path(
    edge_type: EdgeType,
    source: Point,
    destination: Point,
    start_side: SocketSide,
    segments: usize,
) -> Vec<Point> {
    match edge_type {
        EdgeType::Direct => vec![source, destination],
        EdgeType::Bezier => bezier_path(source, destination, start_side, segments),
    }
}

fn bezier_path(s: Point, d: Point, start_side: SocketSide, segments: usize) -> Vec<Point> {
    let dist = (d.x - s.x) * 0.5;

    let mut cpx_s = dist;
    let mut cpx_d = -dist;
    let mut cpy_s = 0.0;
    let mut cpy_d = 0.0;

    let doubles_back = (s.x > d.x && !start_side.is_left()) || (s.x < d.x && start_side.is_left());
    if doubles_back {
        cpx_d *= -1.0;
        cpx_s *= -1.0;
        cpy_d = signum_or_zero(s.y - d.y) * EDGE_CP_ROUNDNESS;
        cpy_s = signum_or_zero(d.y - s.y) * EDGE_CP_ROUNDNESS;
    }

    let c1 = Point::new(s.x + cpx_s, s.y + cpy_s);
    let c2 = Point::new(d.x + cpx_d, d.y + cpy_d);

    let segments = segments.max(1);
    (0..=segments)
        .map(|i| cubic_point(s, c1, c2, d, i as f64 / segments as f64))
        .collect()
}

fn signum_or_zero(v: f64) -> f64 {
    if v == 0.0 {
        0.0
    } else {
        v.signum()
    }
}

fn cubic_point(p0: Point, p1: Point, p2: Point, p3: Point, t: f64) -> Point {
    // De Casteljau
    let a = p0.lerp(p1, t);
    let b = p1.lerp(p2, t);
    let c = p2.lerp(p3, t);
    let ab = a.lerp(b, t);
    let bc = b.lerp(c, t);
    ab.lerp(bc, t)
}

/// Whether any segment of `path` touches the segment `a`-`b`
pub fn path_intersects_segment(path: &[Point], a: Point, b: Point) -> bool {
    path.windows(2)
        .any(|pair| segments_intersect(pair[0], pair[1], a, b))
}

/// Closed segment intersection test, collinear overlaps included
pub fn segments_intersect(p1: Point, p2: Point, q1: Point, q2: Point) -> bool {
    let d1 = cross(q1, q2, p1);
    let d2 = cross(q1, q2, p2);
    let d3 = cross(p1, p2, q1);
    let d4 = cross(p1, p2, q2);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    (d1 == 0.0 && on_segment(q1, q2, p1))
        || (d2 == 0.0 && on_segment(q1, q2, p2))
        || (d3 == 0.0 && on_segment(p1, p2, q1))
        || (d4 == 0.0 && on_segment(p1, p2, q2))
}

fn cross(o: Point, a: Point, b: Point) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

fn on_segment(a: Point, b: Point, p: Point) -> bool {
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

/// Center of the axis-aligned bounding box around `points`
pub fn bounding_box_center(points: impl IntoIterator<Item = Point>) -> Option<Point> {
    let mut points = points.into_iter();
    let first = points.next()?;
    let (mut min, mut max) = (first, first);
    for p in points {
        min = Point::new(min.x.min(p.x), min.y.min(p.y));
        max = Point::new(max.x.max(p.x), max.y.max(p.y));
    }
    Some(Point::new((min.x + max.x) / 2.0, (min.y + max.y) / 2.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crossing_segments() {
        let hit = segments_intersect(
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
            Point::new(10.0, 0.0),
        );
        assert!(hit);
    }

    #[test]
    fn test_parallel_segments_miss() {
        let hit = segments_intersect(
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(0.0, 5.0),
            Point::new(10.0, 5.0),
        );
        assert!(!hit);
    }

    #[test]
    fn test_touching_endpoint_counts() {
        let hit = segments_intersect(
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
        );
        assert!(hit);
    }

    #[test]
    fn test_bezier_path_endpoints() {
        let s = Point::new(0.0, 0.0);
        let d = Point::new(200.0, 100.0);
        let path = edge_path(EdgeType::Bezier, s, d, SocketSide::RightTop, 8);
        assert_eq!(path.len(), 9);
        assert_eq!(path[0], s);
        assert_eq!(path[8], d);
    }

    #[test]
    fn test_bezier_cut_across_middle() {
        let path = edge_path(
            EdgeType::Bezier,
            Point::new(0.0, 0.0),
            Point::new(200.0, 0.0),
            SocketSide::RightTop,
            DEFAULT_CURVE_SEGMENTS,
        );
        assert!(path_intersects_segment(&path, Point::new(100.0, -50.0), Point::new(100.0, 50.0)));
        assert!(!path_intersects_segment(&path, Point::new(300.0, -50.0), Point::new(300.0, 50.0)));
    }

    #[test]
    fn test_bounding_box_center() {
        let center = bounding_box_center([
            Point::new(0.0, 0.0),
            Point::new(100.0, 40.0),
            Point::new(50.0, -20.0),
        ]);
        assert_eq!(center, Some(Point::new(50.0, 10.0)));
        assert_eq!(bounding_box_center(Vec::new()), None);
    }
}
