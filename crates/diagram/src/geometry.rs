//! Stateless geometric predicates
//!
//! Used by face tracing (signed area, point-in-polygon), the planarity guard
//! (proper segment intersection), and interactive hit testing (projection and
//! distance to an edge body).

use glam::DVec2;

use crate::constants::{CROSSING_MARGIN, PARALLEL_EPSILON};

/// Ray-casting parity test.
///
/// Returns false for polygons with fewer than 3 vertices. Points exactly on
/// the boundary are not handled specially.
pub fn point_in_polygon(p: DVec2, polygon: &[DVec2]) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let pi = polygon[i];
        let pj = polygon[j];
        if (pi.y > p.y) != (pj.y > p.y)
            && p.x < (pj.x - pi.x) * (p.y - pi.y) / (pj.y - pi.y) + pi.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Proper-interior crossing test for segments `p1-p2` and `p3-p4`.
///
/// Solves the parametric intersection and accepts only parameters strictly
/// inside `(CROSSING_MARGIN, 1 - CROSSING_MARGIN)`, so touching at or near an
/// endpoint does not count. (Near-)parallel pairs never count. Segments that
/// share an endpoint *by vertex identity* must be excluded by the caller; the
/// margin only protects against coordinate coincidence.
pub fn segments_intersect(p1: DVec2, p2: DVec2, p3: DVec2, p4: DVec2) -> bool {
    let d1 = p2 - p1;
    let d2 = p4 - p3;

    let denom = d1.perp_dot(d2);
    if denom.abs() < PARALLEL_EPSILON {
        return false;
    }

    let d3 = p3 - p1;
    let t = d3.perp_dot(d2) / denom;
    let u = d3.perp_dot(d1) / denom;

    let lo = CROSSING_MARGIN;
    let hi = 1.0 - CROSSING_MARGIN;
    t > lo && t < hi && u > lo && u < hi
}

/// Orthogonal projection of `p` onto segment `a-b`, clamped to the segment.
///
/// Returns the projected point and the fractional position `t` in `[0, 1]`.
/// A zero-length segment projects to `a` with `t = 0`.
pub fn closest_point_on_segment(p: DVec2, a: DVec2, b: DVec2) -> (DVec2, f64) {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq == 0.0 {
        return (a, 0.0);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    (a + ab * t, t)
}

/// Euclidean distance from `p` to segment `a-b`.
pub fn distance_point_to_segment(p: DVec2, a: DVec2, b: DVec2) -> f64 {
    let (q, _) = closest_point_on_segment(p, a, b);
    p.distance(q)
}

/// Shoelace signed area; positive for counter-clockwise winding.
pub fn signed_area(polygon: &[DVec2]) -> f64 {
    let mut area = 0.0;
    for i in 0..polygon.len() {
        let p1 = polygon[i];
        let p2 = polygon[(i + 1) % polygon.len()];
        area += p1.x * p2.y - p2.x * p1.y;
    }
    area / 2.0
}
