//! Point-in-spherical-quadrilateral test

use super::SkyPoint;
use std::f64::consts::TAU;

/// Wrap `angle` into `[wrap - 2*pi, wrap)`
fn wrap_at(angle: f64, wrap: f64) -> f64 {
    wrap - TAU + (angle - wrap).rem_euclid(TAU)
}

/// Test whether the position angle of `point` seen from `apex` falls
/// between the position angles of the two adjacent corners, with all three
/// angles wrapped at the smaller corner angle so the comparison happens on
/// one branch.
fn half_test(apex: SkyPoint, a: SkyPoint, b: SkyPoint, point: SkyPoint) -> bool {
    let pa_a = apex.position_angle(&a);
    let pa_b = apex.position_angle(&b);
    let wrap = pa_a.min(pa_b);

    let wa = wrap_at(pa_a, wrap);
    let wb = wrap_at(pa_b, wrap);
    let (lo, hi) = if wa <= wb { (wa, wb) } else { (wb, wa) };

    let pa_point = wrap_at(apex.position_angle(&point), wrap);
    lo <= pa_point && pa_point <= hi
}

/// Test whether `point` is interior to the spherical quadrilateral described
/// by `corners`.
///
/// Corner order is arbitrary: the diagonal is identified as the pair of
/// mutually farthest corners, and the point must pass the position-angle
/// interval test from both diagonal endpoints. Intended for small convex
/// quadrilaterals such as single-exposure footprints; not a general
/// winding-number test.
pub fn interior_test(point: SkyPoint, corners: &[SkyPoint; 4]) -> bool {
    // corners[0] and its farthest peer are diagonal; the other two are
    // adjacent to corners[0]
    let mut order = [1usize, 2, 3];
    order.sort_by(|&a, &b| {
        corners[0]
            .separation(&corners[a])
            .total_cmp(&corners[0].separation(&corners[b]))
    });
    let [i, j, k] = order;

    half_test(corners[0], corners[i], corners[j], point)
        && half_test(corners[k], corners[i], corners[j], point)
}
