// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometric primitives and geometric queries on graph entities.
//!
//! Segment math, point-to-segment distance, line intersection and the
//! collinearity test, using `nalgebra` points and vectors.

use nalgebra::{Point2, Vector2};

use crate::graph::WallGraph;
use crate::keys::{NodeKey, WallKey};

/// Lengths below this are treated as zero when normalizing directions.
const DEGENERATE_LENGTH: f64 = 1e-12;

/// Z-component of the cross product of two 2D vectors.
#[inline]
pub fn cross(u: &Vector2<f64>, v: &Vector2<f64>) -> f64 {
    u.x * v.y - u.y * v.x
}

/// Returns `true` if two directions are parallel or anti-parallel.
///
/// Both vectors are normalized first, so `eps` bounds the sine of the angle
/// between them. Degenerate vectors are never collinear.
pub fn are_collinear(d1: &Vector2<f64>, d2: &Vector2<f64>, eps: f64) -> bool {
    let (n1, n2) = (d1.norm(), d2.norm());
    if n1 < DEGENERATE_LENGTH || n2 < DEGENERATE_LENGTH {
        return false;
    }
    (cross(d1, d2) / (n1 * n2)).abs() < eps
}

/// A line segment between two points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub a: Point2<f64>,
    pub b: Point2<f64>,
}

impl Segment {
    pub fn new(a: Point2<f64>, b: Point2<f64>) -> Self {
        Self { a, b }
    }

    /// Vector from `a` to `b`.
    pub fn vector(&self) -> Vector2<f64> {
        self.b - self.a
    }

    pub fn length(&self) -> f64 {
        self.vector().norm()
    }

    /// Unit direction from `a` to `b`, or `None` for a zero-length segment.
    pub fn direction(&self) -> Option<Vector2<f64>> {
        let v = self.vector();
        let len = v.norm();
        (len >= DEGENERATE_LENGTH).then(|| v / len)
    }

    pub fn midpoint(&self) -> Point2<f64> {
        nalgebra::center(&self.a, &self.b)
    }

    /// Point at parameter `t` (0 at `a`, 1 at `b`).
    pub fn point_at(&self, t: f64) -> Point2<f64> {
        self.a + self.vector() * t
    }

    /// Parameter of the orthogonal projection of `p` onto the supporting line.
    ///
    /// Not clamped. A degenerate segment projects everything onto `t = 0`.
    pub fn project(&self, p: &Point2<f64>) -> f64 {
        let v = self.vector();
        let len_sq = v.norm_squared();
        if len_sq < DEGENERATE_LENGTH * DEGENERATE_LENGTH {
            return 0.0;
        }
        (*p - self.a).dot(&v) / len_sq
    }

    /// Closest point on the segment to `p`.
    pub fn closest_point(&self, p: &Point2<f64>) -> Point2<f64> {
        self.point_at(self.project(p).clamp(0.0, 1.0))
    }

    /// Euclidean distance from `p` to the segment.
    pub fn distance_to(&self, p: &Point2<f64>) -> f64 {
        (*p - self.closest_point(p)).norm()
    }
}

/// Intersection of two segments with the parameters on each of them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    pub point: Point2<f64>,
    /// Parameter along the first segment.
    pub t: f64,
    /// Parameter along the second segment.
    pub u: f64,
}

/// Intersects two segments.
///
/// Returns `None` for parallel (including collinear) segments and when the
/// supporting lines meet outside either segment.
pub fn segment_intersection(s1: &Segment, s2: &Segment) -> Option<Intersection> {
    let r = s1.vector();
    let s = s2.vector();
    let denom = cross(&r, &s);
    let scale = r.norm() * s.norm();
    if scale < DEGENERATE_LENGTH || denom.abs() <= 1e-12 * scale {
        return None;
    }

    let qp = s2.a - s1.a;
    let t = cross(&qp, &s) / denom;
    let u = cross(&qp, &r) / denom;
    if !(0.0..=1.0).contains(&t) || !(0.0..=1.0).contains(&u) {
        return None;
    }

    Some(Intersection {
        point: s1.point_at(t),
        t,
        u,
    })
}

impl WallGraph {
    /// Returns the position of a node.
    pub fn node_point(&self, key: NodeKey) -> Option<Point2<f64>> {
        self.nodes.get(key).map(|n| Point2::new(n.x, n.y))
    }

    /// Returns the segment from a wall's start node to its end node.
    pub fn wall_segment(&self, key: WallKey) -> Option<Segment> {
        let wall = self.walls.get(key)?;
        Some(Segment::new(
            self.node_point(wall.start)?,
            self.node_point(wall.end)?,
        ))
    }

    /// Computes the Euclidean length of a wall.
    pub fn wall_length(&self, key: WallKey) -> Option<f64> {
        self.wall_segment(key).map(|s| s.length())
    }
}
