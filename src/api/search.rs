//! SbSearch - the overlap search API
//!
//! Ties the ephemeris store, the spatial index, and the geometry kernel
//! together: candidate exposures come from R-tree box intersection with the
//! object's trajectory segments, and each candidate is confirmed by exact
//! spherical containment of the interpolated position at its exposure
//! midpoint.

use crate::api::circumstances::circumstances_at;
use crate::config::Config;
use crate::ephemeris::{EphemerisProvider, EphemerisSample, Step};
use crate::error::{Result, SbSearchError};
use crate::geometry::{interior_test, spherical_interpolation};
use crate::storage::{Database, ObjectRef, Observation};
use std::collections::BTreeSet;

/// Main handle for ephemeris management and overlap searches
pub struct SbSearch {
    config: Config,
    db: Database,
    provider: Box<dyn EphemerisProvider>,
}

impl SbSearch {
    /// Open the configured database, verify its schema, and wire in the
    /// ephemeris provider
    pub fn new(config: Config, provider: Box<dyn EphemerisProvider>) -> Result<Self> {
        let db = Database::new(&config.database, &config.obs_table)?;
        log::info!(
            "SbSearch ready: database {} (observation table {})",
            config.database,
            config.obs_table
        );
        Ok(Self {
            config,
            db,
            provider,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn db_mut(&mut self) -> &mut Database {
        &mut self.db
    }

    /// Register an object, returning its stable id
    pub fn add_object(&self, desg: &str) -> Result<i64> {
        self.db.add_object(desg)
    }

    /// Resolve an id or designation to `(objid, designation)`; never
    /// creates objects
    pub fn resolve_object(&self, target: &ObjectRef) -> Result<(i64, String)> {
        self.db.resolve_object(target)
    }

    /// Ingest a batch of survey observations
    pub fn add_observations(&mut self, observations: &[Observation]) -> Result<usize> {
        self.db.add_observations(observations)
    }

    /// Fetch and store an ephemeris for `target` over `[jd_start, jd_stop]`.
    ///
    /// A designation not yet registered is created on first reference. With
    /// `clean` set, stored points in the range are removed first so the
    /// refreshed provider data replaces them. Returns the number of points
    /// stored.
    pub fn update_ephemeris(
        &mut self,
        target: &ObjectRef,
        jd_start: f64,
        jd_stop: f64,
        step: Option<Step>,
        cache: bool,
        clean: bool,
    ) -> Result<usize> {
        let objid = match self.db.resolve_object(target) {
            Ok((objid, _)) => objid,
            Err(SbSearchError::UnknownObject(_)) => match target {
                ObjectRef::Designation(desg) => self.db.add_object(desg)?,
                ObjectRef::Id(_) => return Err(SbSearchError::UnknownObject(target.to_string())),
            },
            Err(e) => return Err(e),
        };

        if clean {
            self.db
                .clean_ephemeris(objid, Some(jd_start), Some(jd_stop))?;
        }

        self.db.add_ephemeris(
            objid,
            &self.config.location,
            jd_start,
            jd_stop,
            step,
            self.config.source,
            cache,
            self.provider.as_ref(),
        )
    }

    /// Fetch an ephemeris at exact epochs without storing anything
    pub fn ephemeris_exact(
        &self,
        desg: &str,
        epochs: &[f64],
        cache: bool,
    ) -> Result<Vec<EphemerisSample>> {
        self.db.get_ephemeris_exact(
            desg,
            &self.config.location,
            epochs,
            self.config.source,
            cache,
            self.provider.as_ref(),
        )
    }

    /// Remove stored ephemeris points for `target`, optionally bounded in
    /// time; returns the number of points removed
    pub fn clean_ephemeris(
        &mut self,
        target: &ObjectRef,
        jd_start: Option<f64>,
        jd_stop: Option<f64>,
    ) -> Result<usize> {
        let (objid, _) = self.db.resolve_object(target)?;
        self.db.clean_ephemeris(objid, jd_start, jd_stop)
    }

    /// Find observations that may have imaged `target`.
    ///
    /// Trajectory segments in the requested range (all of them when no
    /// bounds are given) drive R-tree intersection queries for candidate
    /// exposures; each candidate is confirmed by interpolating the object's
    /// position to the exposure midpoint and testing it against the actual
    /// footprint corners. Fails with [`SbSearchError::NoEphemeris`] when no
    /// segments exist in range. Returns confirmed observation ids in
    /// ascending order; with `save` set, a found record with full
    /// circumstances is stored per match.
    pub fn find_observations(
        &mut self,
        target: &ObjectRef,
        jd_start: Option<f64>,
        jd_stop: Option<f64>,
        save: bool,
    ) -> Result<Vec<i64>> {
        let (objid, desg) = self.db.resolve_object(target)?;

        let mut candidates: BTreeSet<i64> = BTreeSet::new();
        let mut n_segments = 0usize;
        for segment in self.db.get_ephemeris_segments(Some(objid), jd_start, jd_stop) {
            let segment = segment?;
            n_segments += 1;
            candidates.extend(self.db.query_observations_intersecting(&segment.limits)?);
        }

        if n_segments == 0 {
            return Err(SbSearchError::NoEphemeris(objid));
        }
        log::debug!(
            "{} candidate observations from {} segments for {}",
            candidates.len(),
            n_segments,
            desg
        );

        let mut confirmed = Vec::new();
        for &obsid in &candidates {
            let Some(obs) = self.db.get_observation(obsid)? else {
                continue;
            };
            let midpoint = obs.midpoint_jd();

            let (p0, p1) = match self.db.bracket(objid, midpoint) {
                Ok(bracket) => bracket,
                Err(SbSearchError::InsufficientData(_)) => {
                    // candidate exposure outside the stored trajectory; the
                    // index box only covers part of it
                    log::debug!("No bracketing points at {} for obs {}", midpoint, obsid);
                    continue;
                }
                Err(e) => return Err(e),
            };

            let position =
                spherical_interpolation(p0.position(), p1.position(), p0.jd, p1.jd, midpoint);
            if interior_test(position, &obs.footprint()) {
                confirmed.push((obsid, p0, p1, midpoint));
            }
        }

        if save {
            for (obsid, p0, p1, midpoint) in &confirmed {
                let circ = circumstances_at(p0, p1, *midpoint);
                self.db.add_found(&circ.into_found(objid, *obsid))?;
            }
        }

        let obsids: Vec<i64> = confirmed.iter().map(|(obsid, ..)| *obsid).collect();
        log::info!("{} confirmed observations of {}", obsids.len(), desg);
        Ok(obsids)
    }

    /// The inverse search: objects whose indexed trajectory segments
    /// intersect an exposure's space-time box, as `(objid, designation)`
    /// pairs in ascending id order
    pub fn objects_in_observation(&self, obsid: i64) -> Result<Vec<(i64, String)>> {
        let obs = self.db.get_observation(obsid)?.ok_or_else(|| {
            SbSearchError::Storage(format!("No observation with obsid {}", obsid))
        })?;

        let objids: BTreeSet<i64> = self
            .db
            .query_ephemeris_intersecting(&obs.limits())?
            .into_iter()
            .map(|(objid, _)| objid)
            .collect();

        objids
            .into_iter()
            .map(|objid| self.db.resolve_object(&ObjectRef::Id(objid)))
            .collect()
    }
}
