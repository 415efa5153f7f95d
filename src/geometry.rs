//! Geometry kernel: parabola intersections and circumcenters, plus the tolerance policy shared by
//! every approximate comparison of the sweep.
//!
//! All parabolas here have a horizontal directrix `y = directrix` below their focus (the sweep
//! line moves towards increasing `y`), so they open towards decreasing `y`.

use crate::Point;

/// The single tolerance used for every approximate comparison in the crate.
///
/// Degeneracy decisions (is this arc degenerate? is the site on a breakpoint? do two circle
/// events coincide?) must agree between components, so nothing re-derives its own epsilon.
pub const EPSILON: f32 = 1e-4;

/// `v ≈ 0`.
#[inline]
pub fn approx_eq(v: f32, zero: f32) -> bool {
    (v - zero).abs() < EPSILON
}

/// `v ≳ 0`, tolerance inclusive.
#[inline]
pub fn approx_ge(v: f32, zero: f32) -> bool {
    v - zero > -EPSILON
}

/// The x coordinate of the breakpoint between the arc of `left` and the arc of `right` (in that
/// order along the beach line), with the sweep line at `directrix`.
///
/// Neither focus may lie on the directrix; the caller handles degenerate arcs.
pub fn intersect_parabola_x(left: Point, right: Point, directrix: f32) -> f32 {
    if approx_eq(left.y - right.y, 0.0) {
        return (left.x + right.x) / 2.0;
    }

    let dl = directrix - left.y;
    let dr = directrix - right.y;
    // Both factors are non-negative for a valid sweep; rounding can push the product below zero.
    let disc = (dl * dr * (left - right).length_squared()).max(0.0);

    (left.x * dr - right.x * dl + disc.sqrt()) / (left.y - right.y)
}

/// The y coordinate, at `x`, of the parabola with focus `(focus_x, focus_y)` and the given
/// directrix.
pub fn eval_parabola(focus_x: f32, focus_y: f32, directrix: f32, x: f32) -> f32 {
    let dx = x - focus_x;
    (dx * dx + focus_y * focus_y - directrix * directrix) / (2.0 * (focus_y - directrix))
}

/// The circumcenter of the triangle `a, b, c`, as an offset from `a`.
///
/// Returns `None` if the triangle is degenerate (the three points are collinear within
/// [`EPSILON`]).
pub fn circumcenter_offset(a: Point, b: Point, c: Point) -> Option<Point> {
    let b = b - a;
    let c = c - a;

    let d = b.perp_dot(c);
    if approx_eq(d, 0.0) {
        return None;
    }

    let mb = b.length_squared();
    let mc = c.length_squared();

    Some(Point::new(
        (c.y * mb - b.y * mc) / (2.0 * d),
        (b.x * mc - c.x * mb) / (2.0 * d),
    ))
}
