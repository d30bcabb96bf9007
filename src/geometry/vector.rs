//! Cartesian vector operations on the unit sphere

use super::SkyPoint;

/// A 3D Cartesian vector
///
/// Sky positions are converted to unit vectors for rotation and bounding-box
/// work: `x` points toward (RA 0, Dec 0), `y` toward RA 90 deg on the
/// equator, and `z` toward the north celestial pole.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Dot product
    pub fn dot(&self, other: &Vec3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Cross product
    pub fn cross(&self, other: &Vec3) -> Vec3 {
        Vec3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    /// Euclidean norm
    pub fn norm(&self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Unit vector in the same direction; the zero vector is returned
    /// unchanged (callers must special-case it)
    pub fn normalized(&self) -> Vec3 {
        let n = self.norm();
        if n == 0.0 {
            *self
        } else {
            Vec3::new(self.x / n, self.y / n, self.z / n)
        }
    }

    pub fn scale(&self, s: f64) -> Vec3 {
        Vec3::new(self.x * s, self.y * s, self.z * s)
    }

    pub fn add(&self, other: &Vec3) -> Vec3 {
        Vec3::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

/// RA, Dec (radians) to a Cartesian unit vector
pub fn radec_to_xyz(ra: f64, dec: f64) -> Vec3 {
    Vec3::new(
        dec.cos() * ra.cos(),
        dec.cos() * ra.sin(),
        dec.sin(),
    )
}

/// Batch form of [`radec_to_xyz`]
pub fn radec_to_xyz_batch(points: &[SkyPoint]) -> Vec<Vec3> {
    points.iter().map(|p| p.to_xyz()).collect()
}

/// Rotate vector `r` an angle `angle` counter-clockwise about the unit
/// vector `axis` (Rodrigues formula).
///
/// The rotation preserves the norm of `r`; rotating by zero is the identity,
/// and rotating by `angle` then `-angle` recovers the original vector to
/// floating-point tolerance.
pub fn vector_rotate(r: Vec3, axis: Vec3, angle: f64) -> Vec3 {
    let (sin_a, cos_a) = angle.sin_cos();
    r.scale(cos_a)
        .add(&axis.cross(&r).scale(sin_a))
        .add(&axis.scale(axis.dot(&r) * (1.0 - cos_a)))
}
