//! # sbsearch-rs
//!
//! Find solar system objects in astronomical survey images. Sampled
//! ephemerides and exposure footprints are indexed as conservative
//! space-time boxes in embedded SQLite R-trees; candidate matches from box
//! intersection are refined with exact spherical-polygon containment at
//! each exposure midpoint.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sbsearch_rs::{Config, SbSearch, TableProvider};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // provider of pre-fetched ephemeris samples (an HTTP client for
//!     // MPC/JPL plugs in through the same trait)
//!     let provider = TableProvider::from_file("ephemerides.json")?;
//!     let mut sbs = SbSearch::new(Config::default(), Box::new(provider))?;
//!
//!     // store a daily-cadence ephemeris, then search the indexed survey
//!     sbs.update_ephemeris(
//!         &"2P".into(),
//!         2458119.5,
//!         2458121.5,
//!         Some("1d".parse()?),
//!         true,
//!         false,
//!     )?;
//!     let obsids = sbs.find_observations(&"2P".into(), None, None, true)?;
//!     println!("2P appears in {} exposures", obsids.len());
//!
//!     Ok(())
//! }
//! ```

// Core modules
pub mod api;
pub mod config;
pub mod ephemeris;
pub mod error;
pub mod geometry;
pub mod storage;
pub mod utils;

// Re-export main API types
pub use api::{circumstances_at, Circumstances, SbSearch};
pub use config::Config;
pub use ephemeris::{
    CachedProvider, EphemerisProvider, EphemerisSample, Source, Step, TableProvider,
};
pub use error::{Result, SbSearchError};
pub use storage::{
    Database, DatabaseStats, EphemerisPoint, Found, ObjectRef, Observation, Segment,
};

// Re-export commonly used geometry types
pub use geometry::{SkyPoint, SpaceTimeBox};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_imports() {
        // Ensure the major types can be constructed
        let _config = Config::default();
        let _provider = TableProvider::new();
    }
}
