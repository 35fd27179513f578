//! Polygon primitives for the planar backend.
//!
//! Surfaces are simple polygons in the (r, z) plane; boolean arrangement
//! splits them by infinite lines, so coincident fragments end up with
//! identical vertex sets and can be unified by key.

use crate::math::{Point2, TOLERANCE};

/// Minimum area for a polygon fragment to survive a split.
pub const MIN_AREA: f64 = 1e-9;

/// Signed area of a polygon (positive for counter-clockwise winding).
#[must_use]
pub fn signed_area(poly: &[Point2]) -> f64 {
    let n = poly.len();
    let mut acc = 0.0;
    for i in 0..n {
        let a = &poly[i];
        let b = &poly[(i + 1) % n];
        acc += a.x * b.y - b.x * a.y;
    }
    acc / 2.0
}

/// Area centroid of a polygon.
#[must_use]
pub fn centroid(poly: &[Point2]) -> Point2 {
    let area = signed_area(poly);
    if area.abs() < TOLERANCE {
        // degenerate: fall back to vertex average
        let n = poly.len().max(1) as f64;
        let (sx, sy) = poly.iter().fold((0.0, 0.0), |(x, y), p| (x + p.x, y + p.y));
        return Point2::new(sx / n, sy / n);
    }
    let n = poly.len();
    let mut cx = 0.0;
    let mut cy = 0.0;
    for i in 0..n {
        let a = &poly[i];
        let b = &poly[(i + 1) % n];
        let w = a.x * b.y - b.x * a.y;
        cx += (a.x + b.x) * w;
        cy += (a.y + b.y) * w;
    }
    let f = 1.0 / (6.0 * area);
    Point2::new(cx * f, cy * f)
}

/// Whether `p` lies inside the polygon (boundary counts as inside).
#[must_use]
pub fn contains(poly: &[Point2], p: &Point2) -> bool {
    if distance_to_boundary(poly, p) < TOLERANCE.sqrt() {
        return true;
    }
    // ray cast to +x
    let n = poly.len();
    let mut inside = false;
    for i in 0..n {
        let a = &poly[i];
        let b = &poly[(i + 1) % n];
        if (a.y > p.y) != (b.y > p.y) {
            let t = (p.y - a.y) / (b.y - a.y);
            let x = a.x + t * (b.x - a.x);
            if x > p.x {
                inside = !inside;
            }
        }
    }
    inside
}

/// Distance from `p` to the closest point on the polygon boundary.
#[must_use]
pub fn distance_to_boundary(poly: &[Point2], p: &Point2) -> f64 {
    let n = poly.len();
    let mut best = f64::INFINITY;
    for i in 0..n {
        let d = distance_to_segment(&poly[i], &poly[(i + 1) % n], p);
        if d < best {
            best = d;
        }
    }
    best
}

/// Distance from `p` to the segment `a`-`b`.
#[must_use]
pub fn distance_to_segment(a: &Point2, b: &Point2, p: &Point2) -> f64 {
    let ab = b - a;
    let len2 = ab.norm_squared();
    if len2 < TOLERANCE * TOLERANCE {
        return (p - a).norm();
    }
    let t = ((p - a).dot(&ab) / len2).clamp(0.0, 1.0);
    let proj = a + ab * t;
    (p - proj).norm()
}

/// Splits a polygon by the infinite line through `lp0`-`lp1`.
///
/// Returns one polygon (no real split) or two. Vertices lying on the line
/// (within tolerance) are shared by both sides.
#[must_use]
pub fn split_by_line(poly: &[Point2], lp0: &Point2, lp1: &Point2) -> Vec<Vec<Point2>> {
    let n = poly.len();
    if n < 3 {
        return vec![poly.to_vec()];
    }

    let lu = lp1.x - lp0.x;
    let lv = lp1.y - lp0.y;
    let norm = (lu * lu + lv * lv).sqrt();
    if norm < TOLERANCE {
        return vec![poly.to_vec()];
    }
    // scale-aware side tolerance
    let eps = TOLERANCE.sqrt() * norm.max(1.0);

    let signs: Vec<f64> = poly
        .iter()
        .map(|p| {
            let du = p.x - lp0.x;
            let dv = p.y - lp0.y;
            (lu * dv - lv * du) / norm
        })
        .collect();

    let has_positive = signs.iter().any(|&s| s > eps);
    let has_negative = signs.iter().any(|&s| s < -eps);
    if !has_positive || !has_negative {
        return vec![poly.to_vec()];
    }

    let mut side_a: Vec<Point2> = Vec::new();
    let mut side_b: Vec<Point2> = Vec::new();

    for i in 0..n {
        let j = (i + 1) % n;
        let si = signs[i];
        let sj = signs[j];

        if si >= -eps {
            side_a.push(poly[i]);
        }
        if si <= eps {
            side_b.push(poly[i]);
        }

        if (si > eps && sj < -eps) || (si < -eps && sj > eps) {
            let t = si / (si - sj);
            let crossing = Point2::new(
                poly[i].x + t * (poly[j].x - poly[i].x),
                poly[i].y + t * (poly[j].y - poly[i].y),
            );
            side_a.push(crossing);
            side_b.push(crossing);
        }
    }

    let mut result = Vec::new();
    if side_a.len() >= 3 && signed_area(&side_a).abs() > MIN_AREA {
        result.push(side_a);
    }
    if side_b.len() >= 3 && signed_area(&side_b).abs() > MIN_AREA {
        result.push(side_b);
    }
    if result.is_empty() {
        result.push(poly.to_vec());
    }
    result
}

/// Parameter of the transversal intersection of segment `a0`-`a1` with
/// segment `b0`-`b1`, on the first segment, if any.
#[must_use]
pub fn segment_intersection_t(
    a0: &Point2,
    a1: &Point2,
    b0: &Point2,
    b1: &Point2,
) -> Option<f64> {
    let r = a1 - a0;
    let s = b1 - b0;
    let denom = r.x * s.y - r.y * s.x;
    if denom.abs() < TOLERANCE {
        return None; // parallel or collinear
    }
    let qp = b0 - a0;
    let t = (qp.x * s.y - qp.y * s.x) / denom;
    let u = (qp.x * r.y - qp.y * r.x) / denom;
    let eps = 1e-9;
    if t > eps && t < 1.0 - eps && u >= -eps && u <= 1.0 + eps {
        Some(t)
    } else {
        None
    }
}

/// Rotates a point around the origin.
#[must_use]
pub fn rotate_point(p: &Point2, angle: f64) -> Point2 {
    let (sin, cos) = angle.sin_cos();
    Point2::new(p.x * cos - p.y * sin, p.x * sin + p.y * cos)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<Point2> {
        vec![
            Point2::new(x0, y0),
            Point2::new(x1, y0),
            Point2::new(x1, y1),
            Point2::new(x0, y1),
        ]
    }

    #[test]
    fn area_and_centroid_of_rectangle() {
        let r = rect(100.0, -50.0, 150.0, 50.0);
        assert_relative_eq!(signed_area(&r), 5000.0);
        let c = centroid(&r);
        assert_relative_eq!(c.x, 125.0);
        assert_relative_eq!(c.y, 0.0);
    }

    #[test]
    fn split_through_middle_gives_two_parts() {
        let r = rect(100.0, -50.0, 150.0, 50.0);
        let parts = split_by_line(&r, &Point2::new(120.0, -50.0), &Point2::new(120.0, 50.0));
        assert_eq!(parts.len(), 2);
        let total: f64 = parts.iter().map(|p| signed_area(p).abs()).sum();
        assert_relative_eq!(total, 5000.0, epsilon = 1e-6);
    }

    #[test]
    fn split_outside_returns_whole() {
        let r = rect(0.0, 0.0, 1.0, 1.0);
        let parts = split_by_line(&r, &Point2::new(5.0, 0.0), &Point2::new(5.0, 1.0));
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].len(), 4);
    }

    #[test]
    fn split_along_edge_is_a_noop() {
        let r = rect(0.0, 0.0, 1.0, 1.0);
        let parts = split_by_line(&r, &Point2::new(0.0, 0.0), &Point2::new(0.0, 1.0));
        assert_eq!(parts.len(), 1);
    }

    #[test]
    fn containment_includes_boundary() {
        let r = rect(0.0, 0.0, 2.0, 1.0);
        assert!(contains(&r, &Point2::new(1.0, 0.5)));
        assert!(contains(&r, &Point2::new(0.0, 0.5)));
        assert!(!contains(&r, &Point2::new(3.0, 0.5)));
    }

    #[test]
    fn transversal_segment_intersection() {
        let t = segment_intersection_t(
            &Point2::new(0.0, 0.0),
            &Point2::new(2.0, 0.0),
            &Point2::new(1.0, -1.0),
            &Point2::new(1.0, 1.0),
        )
        .unwrap();
        assert_relative_eq!(t, 0.5);
    }
}
