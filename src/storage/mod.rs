//! Storage layer for sbsearch-rs
//!
//! Embedded SQLite with two R-tree indexes: one over ephemeris segments,
//! one over exposure footprints. All multi-row writes are transactional;
//! deleting a base row removes its dependents in the same transaction.

pub mod database;
pub mod schema;

pub use database::{Database, DatabaseStats, Segment, SegmentIter};

use crate::geometry::{footprint_limits, SkyPoint, SpaceTimeBox};
use serde::{Deserialize, Serialize};

/// Reference to a registered object, by row id or designation
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectRef {
    Id(i64),
    Designation(String),
}

impl From<i64> for ObjectRef {
    fn from(objid: i64) -> Self {
        ObjectRef::Id(objid)
    }
}

impl From<&str> for ObjectRef {
    fn from(desg: &str) -> Self {
        ObjectRef::Designation(desg.to_string())
    }
}

impl From<String> for ObjectRef {
    fn from(desg: String) -> Self {
        ObjectRef::Designation(desg)
    }
}

impl std::str::FromStr for ObjectRef {
    type Err = std::convert::Infallible;

    /// Integers become id references, everything else a designation
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s.parse::<i64>() {
            Ok(objid) => ObjectRef::Id(objid),
            Err(_) => ObjectRef::Designation(s.to_string()),
        })
    }
}

impl std::fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObjectRef::Id(objid) => write!(f, "{}", objid),
            ObjectRef::Designation(desg) => write!(f, "{}", desg),
        }
    }
}

/// A stored ephemeris point
///
/// RA and Dec are degrees, rates arcsec/hr, distances au. `retrieved` is
/// the UTC timestamp of the provider response this row came from.
#[derive(Debug, Clone, PartialEq)]
pub struct EphemerisPoint {
    pub ephid: i64,
    pub objid: i64,
    pub jd: f64,
    pub rh: f64,
    pub delta: f64,
    pub ra: f64,
    pub dec: f64,
    pub dra: f64,
    pub ddec: f64,
    pub unc: Option<f64>,
    pub vmag: f64,
    pub retrieved: String,
}

impl EphemerisPoint {
    /// Sky position in radians
    pub fn position(&self) -> SkyPoint {
        SkyPoint::from_degrees(self.ra, self.dec)
    }
}

/// A survey exposure: time interval, field center, and the four footprint
/// corners, all angles in degrees. Immutable once ingested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub obsid: i64,
    pub jd_start: f64,
    pub jd_stop: f64,
    pub ra: f64,
    pub dec: f64,
    /// Footprint corners as `[ra, dec]` pairs; traversal order is free
    pub corners: [[f64; 2]; 4],
}

impl Observation {
    /// Midpoint of the exposure interval
    pub fn midpoint_jd(&self) -> f64 {
        (self.jd_start + self.jd_stop) / 2.0
    }

    /// Field center in radians
    pub fn center(&self) -> SkyPoint {
        SkyPoint::from_degrees(self.ra, self.dec)
    }

    /// Footprint corners in radians
    pub fn footprint(&self) -> [SkyPoint; 4] {
        self.corners
            .map(|[ra, dec]| SkyPoint::from_degrees(ra, dec))
    }

    /// Conservative space-time box over the footprint and exposure interval
    pub fn limits(&self) -> SpaceTimeBox {
        footprint_limits(&self.footprint(), self.center(), self.jd_start, self.jd_stop)
    }
}

/// A confirmed match: the object's interpolated circumstances at the
/// exposure midpoint. Angles in degrees, distances au, `rdot` km/s.
#[derive(Debug, Clone, PartialEq)]
pub struct Found {
    pub foundid: i64,
    pub objid: i64,
    pub obsid: i64,
    pub jd: f64,
    pub ra: f64,
    pub dec: f64,
    pub dra: f64,
    pub ddec: f64,
    pub unc: f64,
    pub vmag: f64,
    pub rh: f64,
    pub delta: f64,
    pub rdot: f64,
    pub phase: f64,
    pub selong: f64,
    pub sangle: f64,
    pub vangle: f64,
}
