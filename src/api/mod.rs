//! API layer for sbsearch-rs
//!
//! High-level interface composing the ephemeris store, the spatial index,
//! and the geometry kernel.

pub mod circumstances;
pub mod search;

pub use circumstances::{circumstances_at, Circumstances};
pub use search::SbSearch;
