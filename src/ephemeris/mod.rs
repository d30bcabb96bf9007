//! Ephemeris provider boundary
//!
//! Types for requesting sampled ephemerides from an orbit-computation
//! service. The network protocol itself lives outside this crate; providers
//! plug in through [`EphemerisProvider`] and everything here treats them as
//! blocking request/response collaborators.

pub mod provider;
pub mod sun;

pub use provider::{CachedProvider, EphemerisProvider, TableProvider};
pub use sun::sun_position;

use crate::error::{Result, SbSearchError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Ephemeris service a request should be computed by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Minor Planet Center ephemeris service
    Mpc,
    /// JPL Horizons
    Jpl,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Mpc => write!(f, "mpc"),
            Source::Jpl => write!(f, "jpl"),
        }
    }
}

impl FromStr for Source {
    type Err = SbSearchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "mpc" => Ok(Source::Mpc),
            "jpl" => Ok(Source::Jpl),
            other => Err(SbSearchError::Config(format!(
                "Unknown ephemeris source: {}",
                other
            ))),
        }
    }
}

static STEP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+(?:\.\d+)?)\s*([dhms])$").unwrap());

/// Fixed sampling cadence for ephemeris requests
///
/// Parsed from strings like `1d`, `12h`, `30m`, `45s`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    days: f64,
}

impl Step {
    /// Cadence in days
    pub fn days(&self) -> f64 {
        self.days
    }
}

impl FromStr for Step {
    type Err = SbSearchError;

    fn from_str(s: &str) -> Result<Self> {
        let caps = STEP_RE
            .captures(s.trim())
            .ok_or_else(|| SbSearchError::InvalidStep(s.to_string()))?;

        let value: f64 = caps[1]
            .parse()
            .map_err(|_| SbSearchError::InvalidStep(s.to_string()))?;
        let scale = match &caps[2] {
            "d" => 1.0,
            "h" => 1.0 / 24.0,
            "m" => 1.0 / 1440.0,
            "s" => 1.0 / 86400.0,
            _ => unreachable!(),
        };

        let days = value * scale;
        if days <= 0.0 {
            return Err(SbSearchError::InvalidStep(s.to_string()));
        }
        Ok(Step { days })
    }
}

/// One sampled point of a physical ephemeris, as returned by a provider
///
/// RA and Dec are degrees; `dra` and `ddec` are sky-motion rates in
/// arcsec/hr (`dra` includes the cos(Dec) factor); `rh` and `delta` are the
/// heliocentric and geocentric distances in au; `unc` is the 3-sigma
/// positional uncertainty in arcsec when the service reports one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EphemerisSample {
    pub jd: f64,
    pub ra: f64,
    pub dec: f64,
    pub dra: f64,
    pub ddec: f64,
    pub rh: f64,
    pub delta: f64,
    pub vmag: f64,
    #[serde(default)]
    pub unc: Option<f64>,
}
