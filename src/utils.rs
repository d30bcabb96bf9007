//! Utility functions for sbsearch-rs

use crate::error::{Result, SbSearchError};
use chrono::NaiveDate;

/// Julian date of the Unix epoch (1970-01-01 00:00 UTC)
const UNIX_EPOCH_JD: f64 = 2_440_587.5;

/// Parse a flexible epoch string into a Julian date.
///
/// Accepts a plain number (taken as a Julian date) or a `YYYY-MM-DD` calendar
/// date (taken as 00:00 UTC).
pub fn parse_epoch(s: &str) -> Result<f64> {
    let s = s.trim();

    if let Ok(jd) = s.parse::<f64>() {
        if !jd.is_finite() {
            return Err(SbSearchError::InvalidEpoch(s.to_string()));
        }
        return Ok(jd);
    }

    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| SbSearchError::InvalidEpoch(format!("{}: {}", s, e)))?;
    let seconds = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| SbSearchError::InvalidEpoch(s.to_string()))?
        .and_utc()
        .timestamp();

    Ok(seconds as f64 / 86400.0 + UNIX_EPOCH_JD)
}

/// Parse an optional epoch argument
pub fn parse_epoch_opt(s: Option<&str>) -> Result<Option<f64>> {
    s.map(parse_epoch).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_epoch_jd() {
        assert_relative_eq!(parse_epoch("2458119.5").unwrap(), 2458119.5);
        assert_relative_eq!(parse_epoch(" 2455000.5 ").unwrap(), 2455000.5);
    }

    #[test]
    fn test_parse_epoch_date() {
        assert_relative_eq!(parse_epoch("2018-01-01").unwrap(), 2458119.5);
        assert_relative_eq!(parse_epoch("1970-01-01").unwrap(), 2440587.5);
    }

    #[test]
    fn test_parse_epoch_invalid() {
        assert!(parse_epoch("yesterday").is_err());
        assert!(parse_epoch("2018-13-40").is_err());
        assert!(parse_epoch("nan").is_err());
    }

    #[test]
    fn test_parse_epoch_opt() {
        assert_eq!(parse_epoch_opt(None).unwrap(), None);
        assert_eq!(parse_epoch_opt(Some("2458119.5")).unwrap(), Some(2458119.5));
        assert!(parse_epoch_opt(Some("bad")).is_err());
    }
}
