//! Observing circumstances at an interpolated epoch
//!
//! Everything a found record carries, derived from the two stored ephemeris
//! points bracketing the epoch plus the solar position: sky position by
//! great-circle interpolation, scalar quantities by linear interpolation,
//! and the angular circumstances from the Sun-observer-object geometry.

use crate::ephemeris::sun_position;
use crate::geometry::{spherical_interpolation, RAD_TO_ARCSEC};
use crate::storage::{EphemerisPoint, Found};
use std::f64::consts::{PI, TAU};

/// Kilometers per astronomical unit
const AU_KM: f64 = 1.495_978_707e8;

/// Seconds per day
const DAY_S: f64 = 86400.0;

/// Interpolated observing circumstances; angles in degrees, distances in
/// au, `rdot` in km/s, `unc` in arcsec
#[derive(Debug, Clone, PartialEq)]
pub struct Circumstances {
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

impl Circumstances {
    /// Package as a found record for the given object and observation
    pub fn into_found(self, objid: i64, obsid: i64) -> Found {
        Found {
            foundid: 0,
            objid,
            obsid,
            jd: self.jd,
            ra: self.ra,
            dec: self.dec,
            dra: self.dra,
            ddec: self.ddec,
            unc: self.unc,
            vmag: self.vmag,
            rh: self.rh,
            delta: self.delta,
            rdot: self.rdot,
            phase: self.phase,
            selong: self.selong,
            sangle: self.sangle,
            vangle: self.vangle,
        }
    }
}

/// Derive the circumstances at `jd` from the bracketing stored points
/// `p0 <= jd <= p1`.
///
/// The position follows the great-circle arc between the points; rates,
/// magnitude, and distances interpolate linearly. The phase angle comes
/// from the heliocentric/geocentric triangle closed with the Sun-observer
/// distance, the solar elongation and sunward position angle from the
/// low-precision solar position. When the stored points carry no provider
/// uncertainty, the interpolation chord bound stands in for it.
pub fn circumstances_at(p0: &EphemerisPoint, p1: &EphemerisPoint, jd: f64) -> Circumstances {
    let span = p1.jd - p0.jd;
    let f = if span.abs() < f64::EPSILON {
        0.0
    } else {
        (jd - p0.jd) / span
    };
    let lerp = |a: f64, b: f64| a + f * (b - a);

    let position = spherical_interpolation(p0.position(), p1.position(), p0.jd, p1.jd, jd);

    let rh = lerp(p0.rh, p1.rh);
    let delta = lerp(p0.delta, p1.delta);
    let dra = lerp(p0.dra, p1.dra);
    let ddec = lerp(p0.ddec, p1.ddec);
    let vmag = lerp(p0.vmag, p1.vmag);

    let rdot = if span.abs() < f64::EPSILON {
        0.0
    } else {
        (p1.rh - p0.rh) / span * AU_KM / DAY_S
    };

    let (sun, r_sun) = sun_position(jd);
    let selong = position.separation(&sun).to_degrees();

    let phase = if rh > 0.0 && delta > 0.0 {
        let cos_phase = (rh * rh + delta * delta - r_sun * r_sun) / (2.0 * rh * delta);
        cos_phase.clamp(-1.0, 1.0).acos().to_degrees()
    } else {
        0.0
    };

    // position angles of the anti-solar direction and of the motion vector,
    // east of north
    let sangle = (position.position_angle(&sun) + PI).rem_euclid(TAU).to_degrees();
    let vangle = dra.atan2(ddec).rem_euclid(TAU).to_degrees();

    let unc = match (p0.unc, p1.unc) {
        (Some(a), Some(b)) => lerp(a, b),
        _ => {
            let w = p0.position().separation(&p1.position());
            w * w / 8.0 * RAD_TO_ARCSEC
        }
    };

    Circumstances {
        jd,
        ra: position.ra_deg(),
        dec: position.dec_deg(),
        dra,
        ddec,
        unc,
        vmag,
        rh,
        delta,
        rdot,
        phase,
        selong,
        sangle,
        vangle,
    }
}
