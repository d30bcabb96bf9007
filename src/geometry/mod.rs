//! Spherical geometry kernel
//!
//! Pure, stateless functions over sky coordinates: Cartesian conversion,
//! rotation, great-circle interpolation, space-time bounding volumes, and
//! the point-in-spherical-quadrilateral test used to refine candidate
//! matches. All angles are radians unless a name says otherwise.

pub mod interior;
pub mod interpolate;
pub mod vector;

pub use interior::interior_test;
pub use interpolate::{eph_to_limits, footprint_limits, spherical_interpolation};
pub use vector::{radec_to_xyz, radec_to_xyz_batch, vector_rotate, Vec3};

use std::f64::consts::TAU;

/// Offset between Julian and modified Julian dates
pub const MJD_OFFSET: f64 = 2_400_000.5;

/// Radians to arcseconds
pub const RAD_TO_ARCSEC: f64 = 206_264.806_247_096_36;

/// A position on the celestial sphere, RA and Dec in radians
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkyPoint {
    pub ra: f64,
    pub dec: f64,
}

impl SkyPoint {
    pub fn new(ra: f64, dec: f64) -> Self {
        Self { ra, dec }
    }

    /// Construct from RA and Dec in degrees
    pub fn from_degrees(ra_deg: f64, dec_deg: f64) -> Self {
        Self::new(ra_deg.to_radians(), dec_deg.to_radians())
    }

    pub fn ra_deg(&self) -> f64 {
        self.ra.to_degrees()
    }

    pub fn dec_deg(&self) -> f64 {
        self.dec.to_degrees()
    }

    /// Unit vector on the celestial sphere
    pub fn to_xyz(&self) -> Vec3 {
        radec_to_xyz(self.ra, self.dec)
    }

    /// Sky position of a Cartesian direction; RA is normalized to `[0, 2pi)`
    pub fn from_xyz(v: &Vec3) -> Self {
        let ra = v.y.atan2(v.x).rem_euclid(TAU);
        let dec = (v.z / v.norm()).asin();
        Self::new(ra, dec)
    }

    /// Great-circle separation to `other` (Vincenty form, stable at all
    /// separations)
    pub fn separation(&self, other: &SkyPoint) -> f64 {
        let dra = other.ra - self.ra;
        let (sin_dra, cos_dra) = dra.sin_cos();
        let (sin_d1, cos_d1) = self.dec.sin_cos();
        let (sin_d2, cos_d2) = other.dec.sin_cos();

        let num = ((cos_d2 * sin_dra).powi(2)
            + (cos_d1 * sin_d2 - sin_d1 * cos_d2 * cos_dra).powi(2))
        .sqrt();
        let den = sin_d1 * sin_d2 + cos_d1 * cos_d2 * cos_dra;
        num.atan2(den)
    }

    /// Position angle of `other` as seen from `self`, east of north,
    /// in `[0, 2pi)`
    pub fn position_angle(&self, other: &SkyPoint) -> f64 {
        let dra = other.ra - self.ra;
        let (sin_dra, cos_dra) = dra.sin_cos();
        let (sin_d1, cos_d1) = self.dec.sin_cos();
        let (sin_d2, cos_d2) = other.dec.sin_cos();

        let y = sin_dra * cos_d2;
        let x = cos_d1 * sin_d2 - sin_d1 * cos_d2 * cos_dra;
        y.atan2(x).rem_euclid(TAU)
    }
}

/// An axis-aligned box in Cartesian x, y, z plus a time interval in
/// modified Julian dates; the conservative key stored in the spatial index
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpaceTimeBox {
    pub mjd0: f64,
    pub mjd1: f64,
    pub x0: f64,
    pub x1: f64,
    pub y0: f64,
    pub y1: f64,
    pub z0: f64,
    pub z1: f64,
}

impl SpaceTimeBox {
    /// Whether the spatial bounds contain `v`, boundary inclusive
    pub fn contains(&self, v: &Vec3) -> bool {
        self.x0 <= v.x
            && v.x <= self.x1
            && self.y0 <= v.y
            && v.y <= self.y1
            && self.z0 <= v.z
            && v.z <= self.z1
    }

    /// Whether the boxes overlap on all four axes, boundary inclusive
    pub fn intersects(&self, other: &SpaceTimeBox) -> bool {
        self.mjd0 <= other.mjd1
            && other.mjd0 <= self.mjd1
            && self.x0 <= other.x1
            && other.x0 <= self.x1
            && self.y0 <= other.y1
            && other.y0 <= self.y1
            && self.z0 <= other.z1
            && other.z0 <= self.z1
    }
}
