//! Low-precision solar position
//!
//! Truncated series for the apparent geocentric solar coordinates, good to
//! roughly an arcminute over the current few centuries. Used to derive
//! solar elongation, phase angle, and the sunward position angle for match
//! records; survey astrometry never flows through this.

use crate::geometry::SkyPoint;
use std::f64::consts::TAU;

/// Julian date of the J2000.0 epoch
const J2000_JD: f64 = 2_451_545.0;

/// Apparent geocentric RA/Dec of the Sun and the Sun-Earth distance in au
/// at Julian date `jd`.
pub fn sun_position(jd: f64) -> (SkyPoint, f64) {
    let n = jd - J2000_JD;

    // mean anomaly and mean longitude of the Sun
    let g = (357.529 + 0.985_600_28 * n).to_radians();
    let q = 280.459 + 0.985_647_36 * n;

    // ecliptic longitude with the equation of center
    let lambda = (q + 1.915 * g.sin() + 0.020 * (2.0 * g).sin()).to_radians();

    let r = 1.00014 - 0.01671 * g.cos() - 0.00014 * (2.0 * g).cos();
    let epsilon = (23.439 - 0.000_000_36 * n).to_radians();

    let ra = (epsilon.cos() * lambda.sin()).atan2(lambda.cos()).rem_euclid(TAU);
    let dec = (epsilon.sin() * lambda.sin()).asin();

    (SkyPoint::new(ra, dec), r)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sun_near_equinox() {
        // 2018 March equinox, 2018-03-20 ~16:15 UTC
        let (sun, r) = sun_position(2458198.18);
        assert!(sun.dec.to_degrees().abs() < 0.5, "dec = {}", sun.dec_deg());
        let sep = sun.separation(&SkyPoint::new(0.0, 0.0)).to_degrees();
        assert!(sep < 1.0, "separation from equinox point = {}", sep);
        assert!((0.98..1.02).contains(&r));
    }

    #[test]
    fn test_sun_near_solstice() {
        // 2018 June solstice, 2018-06-21 ~10:07 UTC
        let (sun, _) = sun_position(2458290.92);
        assert!((sun.dec_deg() - 23.44).abs() < 0.3, "dec = {}", sun.dec_deg());
        assert!((sun.ra_deg() - 90.0).abs() < 1.5, "ra = {}", sun.ra_deg());
    }

    #[test]
    fn test_sun_distance_annual_extremes() {
        // perihelion in early January, aphelion in early July
        let (_, r_jan) = sun_position(2458122.0);
        let (_, r_jul) = sun_position(2458303.0);
        assert!(r_jan < 0.99);
        assert!(r_jul > 1.01);
    }
}
