// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polygon measurements for room faces.
//!
//! Rings are open (the last vertex is not repeated). With the y axis pointing
//! up, counter-clockwise rings have positive signed area.

use nalgebra::{Point2, Vector2};

/// Signed area of a ring by the shoelace formula.
pub fn signed_area(ring: &[Point2<f64>]) -> f64 {
    let n = ring.len();
    if n < 3 {
        return 0.0;
    }

    let mut twice = 0.0;
    for i in 0..n {
        let p = &ring[i];
        let q = &ring[(i + 1) % n];
        twice += p.x * q.y - q.x * p.y;
    }
    twice / 2.0
}

/// Area centroid of a ring.
///
/// Falls back to the vertex mean when the ring has (near) zero area.
pub fn centroid(ring: &[Point2<f64>]) -> Option<Point2<f64>> {
    if ring.is_empty() {
        return None;
    }

    let area = signed_area(ring);
    if area.abs() < 1e-12 {
        let sum = ring.iter().fold(Vector2::zeros(), |acc, p| acc + p.coords);
        return Some(Point2::from(sum / ring.len() as f64));
    }

    let n = ring.len();
    let (mut cx, mut cy) = (0.0, 0.0);
    for i in 0..n {
        let p = &ring[i];
        let q = &ring[(i + 1) % n];
        let f = p.x * q.y - q.x * p.y;
        cx += (p.x + q.x) * f;
        cy += (p.y + q.y) * f;
    }
    Some(Point2::new(cx / (6.0 * area), cy / (6.0 * area)))
}

/// Even-odd point-in-polygon test.
///
/// Points exactly on the boundary may land on either side.
pub fn contains(ring: &[Point2<f64>], p: &Point2<f64>) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (a, b) = (&ring[i], &ring[j]);
        if (a.y > p.y) != (b.y > p.y) {
            let x_cross = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// A point guaranteed to lie strictly inside the ring.
///
/// Triangulates the ring and returns the centroid of the largest triangle,
/// which also works for L-shaped and other concave rooms. Falls back to the
/// area centroid if triangulation fails.
pub fn interior_point(ring: &[Point2<f64>]) -> Option<Point2<f64>> {
    if ring.len() < 3 {
        return centroid(ring);
    }

    let coords: Vec<f64> = ring.iter().flat_map(|p| [p.x, p.y]).collect();
    let indices = match earcutr::earcut(&coords, &[], 2) {
        Ok(indices) if !indices.is_empty() => indices,
        _ => return centroid(ring),
    };

    indices
        .chunks_exact(3)
        .map(|tri| {
            let (a, b, c) = (ring[tri[0]], ring[tri[1]], ring[tri[2]]);
            let area = signed_area(&[a, b, c]).abs();
            let center = Point2::from((a.coords + b.coords + c.coords) / 3.0);
            (area, center)
        })
        .max_by(|x, y| x.0.total_cmp(&y.0))
        .map(|(_, center)| center)
        .or_else(|| centroid(ring))
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Point2<f64>,
    pub max: Point2<f64>,
}

impl Bounds {
    /// Computes the bounds of a set of points, or `None` if empty.
    pub fn from_points(points: &[Point2<f64>]) -> Option<Self> {
        let first = points.first()?;
        let mut bounds = Bounds {
            min: *first,
            max: *first,
        };
        for p in &points[1..] {
            bounds.min.x = bounds.min.x.min(p.x);
            bounds.min.y = bounds.min.y.min(p.y);
            bounds.max.x = bounds.max.x.max(p.x);
            bounds.max.y = bounds.max.y.max(p.y);
        }
        Some(bounds)
    }

    pub fn size(&self) -> Vector2<f64> {
        self.max - self.min
    }

    /// Point at a proportional offset, `(0, 0)` being `min` and `(1, 1)` `max`.
    pub fn lerp(&self, fraction: &Vector2<f64>) -> Point2<f64> {
        self.min + self.size().component_mul(fraction)
    }

    /// Proportional offset of a point; the inverse of [`Bounds::lerp`].
    ///
    /// A zero-extent axis maps to 0.5.
    pub fn fraction_of(&self, p: &Point2<f64>) -> Vector2<f64> {
        let size = self.size();
        let axis = |offset: f64, extent: f64| {
            if extent.abs() < 1e-12 {
                0.5
            } else {
                offset / extent
            }
        };
        Vector2::new(axis(p.x - self.min.x, size.x), axis(p.y - self.min.y, size.y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ring(coords: &[(f64, f64)]) -> Vec<Point2<f64>> {
        coords.iter().map(|&(x, y)| Point2::new(x, y)).collect()
    }

    fn l_shape() -> Vec<Point2<f64>> {
        ring(&[
            (0.0, 0.0),
            (10.0, 0.0),
            (10.0, 2.0),
            (2.0, 2.0),
            (2.0, 10.0),
            (0.0, 10.0),
        ])
    }

    #[test]
    fn shoelace_sign_follows_winding() {
        let ccw = ring(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
        let cw: Vec<_> = ccw.iter().rev().copied().collect();
        assert_relative_eq!(signed_area(&ccw), 100.0);
        assert_relative_eq!(signed_area(&cw), -100.0);
        assert_eq!(signed_area(&ccw[..2]), 0.0);
    }

    #[test]
    fn square_centroid() {
        let sq = ring(&[(0.0, 0.0), (4.0, 0.0), (4.0, 2.0), (0.0, 2.0)]);
        let c = centroid(&sq).unwrap();
        assert_relative_eq!(c.x, 2.0);
        assert_relative_eq!(c.y, 1.0);
    }

    #[test]
    fn l_shape_centroid_lies_outside_but_interior_point_inside() {
        let l = l_shape();
        let c = centroid(&l).unwrap();
        // The centroid of this thin L sits in the notch.
        assert!(!contains(&l, &c));

        let p = interior_point(&l).unwrap();
        assert!(contains(&l, &p));
    }

    #[test]
    fn containment() {
        let sq = ring(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
        assert!(contains(&sq, &Point2::new(5.0, 5.0)));
        assert!(!contains(&sq, &Point2::new(15.0, 5.0)));
        assert!(!contains(&sq, &Point2::new(5.0, -0.1)));
    }

    #[test]
    fn bounds_lerp_round_trips_fraction() {
        let b = Bounds::from_points(&l_shape()).unwrap();
        let p = Point2::new(2.5, 7.5);
        let f = b.fraction_of(&p);
        assert_relative_eq!(f, Vector2::new(0.25, 0.75));
        assert_relative_eq!(b.lerp(&f), p);
    }

    #[test]
    fn flat_bounds_use_half_fraction() {
        let b = Bounds::from_points(&ring(&[(0.0, 3.0), (10.0, 3.0)])).unwrap();
        assert_relative_eq!(b.fraction_of(&Point2::new(5.0, 3.0)), Vector2::new(0.5, 0.5));
        assert!(Bounds::from_points(&[]).is_none());
    }
}
