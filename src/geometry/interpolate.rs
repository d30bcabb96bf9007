//! Great-circle interpolation and space-time bounding volumes

use super::vector::vector_rotate;
use super::{SkyPoint, SpaceTimeBox, MJD_OFFSET};

/// Interpolate a sky position along the great circle from `c0` (time `t0`)
/// to `c1` (time `t1`), assuming constant angular velocity.
///
/// The interpolation fraction `(t2 - t0) / (t1 - t0)` may fall outside
/// `[0, 1]`, in which case the position is extrapolated along the same
/// circle. Coincident anchors have no defined rotation axis; `c0` is
/// returned unchanged in that case.
pub fn spherical_interpolation(c0: SkyPoint, c1: SkyPoint, t0: f64, t1: f64, t2: f64) -> SkyPoint {
    let w = c0.separation(&c1);
    if w == 0.0 {
        return c0;
    }

    let dt = (t2 - t0) / (t1 - t0);
    let a = c0.to_xyz();
    let b = c1.to_xyz();
    let axis = a.cross(&b).normalized();

    SkyPoint::from_xyz(&vector_rotate(a, axis, w * dt))
}

/// Space-time limits of a three-point ephemeris window.
///
/// Takes three consecutive sampled positions centered on `eph[1]` and finds
/// the x, y, z and time range spanning `half_step` on either side of the
/// middle point: the trajectory is interpolated against each neighbor at
/// `jd[1] - half_step` and `jd[1] + half_step`, the three positions are
/// converted to Cartesian, and the per-axis extrema are widened by the
/// chord-sagitta bound `1 - cos(w/2)` of the longer half-arc so that every
/// point of the swept great-circle path is inside the box, not just its
/// endpoints. Times are stored as modified Julian dates to match the
/// R-tree convention.
pub fn eph_to_limits(eph: &[SkyPoint; 3], jd: &[f64; 3], half_step: f64) -> SpaceTimeBox {
    let jda = jd[1] - half_step;
    let jdc = jd[1] + half_step;

    let a = spherical_interpolation(eph[0], eph[1], jd[0], jd[1], jda);
    let b = eph[1];
    let c = spherical_interpolation(eph[1], eph[2], jd[1], jd[2], jdc);

    let arc = a.separation(&b).max(b.separation(&c));
    let pad = 1.0 - (arc / 2.0).cos();

    let xyz = [a.to_xyz(), b.to_xyz(), c.to_xyz()];
    let (mut x0, mut x1) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut y0, mut y1) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut z0, mut z1) = (f64::INFINITY, f64::NEG_INFINITY);
    for v in &xyz {
        x0 = x0.min(v.x);
        x1 = x1.max(v.x);
        y0 = y0.min(v.y);
        y1 = y1.max(v.y);
        z0 = z0.min(v.z);
        z1 = z1.max(v.z);
    }

    SpaceTimeBox {
        mjd0: jda - MJD_OFFSET,
        mjd1: jdc - MJD_OFFSET,
        x0: x0 - pad,
        x1: x1 + pad,
        y0: y0 - pad,
        y1: y1 + pad,
        z0: z0 - pad,
        z1: z1 + pad,
    }
}

/// Space-time limits of an exposure footprint.
///
/// The box spans the four footprint corners plus the field center in
/// Cartesian space and the exposure interval in time. Spatial extents are
/// widened by twice the chord-sagitta bound of the largest corner
/// separation: edge and interior points of the spherical quadrilateral bow
/// out from the corner hull by at most that much.
pub fn footprint_limits(
    corners: &[SkyPoint; 4],
    center: SkyPoint,
    jd_start: f64,
    jd_stop: f64,
) -> SpaceTimeBox {
    let mut w_max: f64 = 0.0;
    for i in 0..4 {
        for j in (i + 1)..4 {
            w_max = w_max.max(corners[i].separation(&corners[j]));
        }
    }
    let pad = 2.0 * (1.0 - (w_max / 2.0).cos());

    let mut xyz = vec![center.to_xyz()];
    xyz.extend(corners.iter().map(|c| c.to_xyz()));

    let (mut x0, mut x1) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut y0, mut y1) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut z0, mut z1) = (f64::INFINITY, f64::NEG_INFINITY);
    for v in &xyz {
        x0 = x0.min(v.x);
        x1 = x1.max(v.x);
        y0 = y0.min(v.y);
        y1 = y1.max(v.y);
        z0 = z0.min(v.z);
        z1 = z1.max(v.z);
    }

    SpaceTimeBox {
        mjd0: jd_start - MJD_OFFSET,
        mjd1: jd_stop - MJD_OFFSET,
        x0: x0 - pad,
        x1: x1 + pad,
        y0: y0 - pad,
        y1: y1 + pad,
        z0: z0 - pad,
        z1: z1 + pad,
    }
}

/// Convenience for [`eph_to_limits`] callers holding RA/Dec in radians
pub fn radec_triplet(ra: [f64; 3], dec: [f64; 3]) -> [SkyPoint; 3] {
    [
        SkyPoint::new(ra[0], dec[0]),
        SkyPoint::new(ra[1], dec[1]),
        SkyPoint::new(ra[2], dec[2]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_interpolation_midpoint() {
        let c0 = SkyPoint::new(-0.1, 0.1);
        let c1 = SkyPoint::new(0.1, -0.1);
        let c2 = spherical_interpolation(c0, c1, 0.0, 2.0, 1.0);
        assert_relative_eq!(c2.separation(&SkyPoint::new(0.0, 0.0)), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_interpolation_endpoints() {
        let c0 = SkyPoint::new(-0.1, 0.1);
        let c1 = SkyPoint::new(0.1, -0.1);

        let at_t0 = spherical_interpolation(c0, c1, 0.0, 2.0, 0.0);
        assert_relative_eq!(at_t0.separation(&c0), 0.0, epsilon = 1e-9);

        let at_t1 = spherical_interpolation(c0, c1, 0.0, 2.0, 2.0);
        assert_relative_eq!(at_t1.separation(&c1), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_interpolation_extrapolates() {
        let c0 = SkyPoint::new(0.0, 0.0);
        let c1 = SkyPoint::new(0.02, 0.0);

        // dt = 2 doubles the arc, dt = -1 mirrors it
        let ahead = spherical_interpolation(c0, c1, 0.0, 1.0, 2.0);
        assert_relative_eq!(ahead.separation(&c0), 0.04, epsilon = 1e-9);

        let behind = spherical_interpolation(c0, c1, 0.0, 1.0, -1.0);
        assert_relative_eq!(behind.separation(&c0), 0.02, epsilon = 1e-9);
        assert_relative_eq!(behind.separation(&c1), 0.04, epsilon = 1e-9);
    }

    #[test]
    fn test_interpolation_coincident_anchors() {
        let c0 = SkyPoint::new(1.2, -0.4);
        let c2 = spherical_interpolation(c0, c0, 0.0, 1.0, 0.5);
        assert_eq!(c2, c0);
    }

    #[test]
    fn test_eph_to_limits() {
        // pole-to-pole track through the origin, daily cadence
        let eph = radec_triplet([0.0, 0.0, 0.0], [-FRAC_PI_2, 0.0, FRAC_PI_2]);
        let jd = [2400000.5, 2400001.5, 2400002.5];
        let b = eph_to_limits(&eph, &jd, 0.5);

        // interpolated endpoints sit at dec +/-45 deg; each half-arc spans
        // 45 deg, so the sagitta pad is 1 - cos(22.5 deg)
        let r = std::f64::consts::FRAC_1_SQRT_2;
        let pad = 1.0 - (FRAC_PI_2 / 4.0).cos();

        assert_relative_eq!(b.mjd0, 0.5, epsilon = 1e-9);
        assert_relative_eq!(b.mjd1, 1.5, epsilon = 1e-9);
        assert_relative_eq!(b.x0, r - pad, epsilon = 1e-6);
        assert_relative_eq!(b.x1, 1.0 + pad, epsilon = 1e-6);
        assert_relative_eq!(b.y0, -pad, epsilon = 1e-6);
        assert_relative_eq!(b.y1, pad, epsilon = 1e-6);
        assert_relative_eq!(b.z0, -r - pad, epsilon = 1e-6);
        assert_relative_eq!(b.z1, r + pad, epsilon = 1e-6);
    }

    #[test]
    fn test_eph_to_limits_stationary() {
        let p = SkyPoint::new(1.0, 0.5);
        let b = eph_to_limits(&[p, p, p], &[0.0, 1.0, 2.0], 0.5);
        let v = p.to_xyz();
        assert_relative_eq!(b.x0, v.x, epsilon = 1e-12);
        assert_relative_eq!(b.x1, v.x, epsilon = 1e-12);
        assert_relative_eq!(b.z0, v.z, epsilon = 1e-12);
    }

    #[test]
    fn test_eph_to_limits_conservative() {
        // randomized great-circle trajectories: every true position inside a
        // box's time interval must fall inside its spatial bounds
        use super::super::vector::{vector_rotate, Vec3};
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(20180101);

        for _ in 0..200 {
            let axis = Vec3::new(
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
            )
            .normalized();
            if axis.norm() == 0.0 {
                continue;
            }

            // a start point perpendicular to the axis
            let seed = Vec3::new(
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
            );
            let p0 = seed
                .add(&axis.scale(-axis.dot(&seed)))
                .normalized();
            if p0.norm() == 0.0 {
                continue;
            }

            let omega = rng.gen_range(1e-4..0.2); // rad/day
            let d1 = rng.gen_range(0.25..2.0);
            let d2 = rng.gen_range(0.25..2.0);
            let jd = [2458119.5, 2458119.5 + d1, 2458119.5 + d1 + d2];

            let pos = |t: f64| vector_rotate(p0, axis, omega * (t - jd[0]));
            let eph = [
                SkyPoint::from_xyz(&pos(jd[0])),
                SkyPoint::from_xyz(&pos(jd[1])),
                SkyPoint::from_xyz(&pos(jd[2])),
            ];

            let half_step = (jd[2] - jd[0]) / 4.0;
            let b = eph_to_limits(&eph, &jd, half_step);

            for s in 0..=50 {
                let t = jd[1] - half_step + (s as f64 / 50.0) * 2.0 * half_step;
                assert!(
                    b.contains(&pos(t)),
                    "position at t={} escaped box {:?}",
                    t,
                    b
                );
            }
        }
    }

    #[test]
    fn test_footprint_limits_contains_corners() {
        let corners = [
            SkyPoint::from_degrees(10.0, 10.0),
            SkyPoint::from_degrees(11.0, 10.0),
            SkyPoint::from_degrees(11.0, 11.0),
            SkyPoint::from_degrees(10.0, 11.0),
        ];
        let center = SkyPoint::from_degrees(10.5, 10.5);
        let b = footprint_limits(&corners, center, 2458119.5, 2458119.6);

        assert_relative_eq!(b.mjd0, 2458119.5 - MJD_OFFSET, epsilon = 1e-9);
        for c in corners.iter().chain(std::iter::once(&center)) {
            assert!(b.contains(&c.to_xyz()));
        }
    }
}
