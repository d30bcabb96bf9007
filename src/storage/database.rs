//! SQLite database operations for sbsearch-rs
//!
//! One connection, two R-trees. Every write that touches a base table and
//! its index entry runs inside a single transaction; a base row and its box
//! are never observable apart. Deletions cascade explicitly inside the same
//! transaction instead of relying on triggers.

use crate::ephemeris::{EphemerisProvider, EphemerisSample, Source, Step};
use crate::error::{Result, SbSearchError};
use crate::geometry::{eph_to_limits, spherical_interpolation, SkyPoint, SpaceTimeBox, MJD_OFFSET};
use crate::storage::schema;
use crate::storage::{EphemerisPoint, Found, ObjectRef, Observation};
use rayon::prelude::*;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::collections::VecDeque;
use std::path::Path;

/// Rows fetched per page while iterating ephemeris segments
const SEGMENT_PAGE: usize = 256;

/// Database connection and operations
pub struct Database {
    conn: Connection,
    obs_table: String,
}

impl Database {
    /// Open (or create) a database file and verify the schema
    pub fn new<P: AsRef<Path>>(path: P, obs_table: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .map_err(|e| SbSearchError::Storage(format!("Failed to open database: {}", e)))?;

        let mut db = Self {
            conn,
            obs_table: obs_table.to_string(),
        };
        db.initialize()?;
        Ok(db)
    }

    /// Create an in-memory database (used by tests and one-off runs)
    pub fn memory(obs_table: &str) -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| {
            SbSearchError::Storage(format!("Failed to create in-memory database: {}", e))
        })?;

        let mut db = Self {
            conn,
            obs_table: obs_table.to_string(),
        };
        db.initialize()?;
        Ok(db)
    }

    /// Observation table name this connection serves
    pub fn obs_table(&self) -> &str {
        &self.obs_table
    }

    fn initialize(&mut self) -> Result<()> {
        // WAL for concurrent readers on file databases; a no-op in memory
        let _: String = self
            .conn
            .query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))
            .map_err(|e| SbSearchError::Storage(format!("Failed to set journal mode: {}", e)))?;

        // explicit cascades do the real work; the declared foreign keys are
        // a backstop against ordering mistakes
        self.conn
            .pragma_update(None, "foreign_keys", true)
            .map_err(|e| SbSearchError::Storage(format!("Failed to enable foreign keys: {}", e)))?;

        self.verify_tables()
    }

    /// Ensure all required tables and index structures exist.
    ///
    /// Idempotent: existing tables are untouched, missing ones are
    /// (re)created from the schema script. Fails with
    /// [`SbSearchError::SchemaInconsistency`] if the schema is still
    /// incomplete afterwards.
    pub fn verify_tables(&mut self) -> Result<()> {
        let expected = schema::required_tables(&self.obs_table);
        if self.count_structures()? == expected.len() {
            log::debug!("Database schema verified");
            return Ok(());
        }

        log::info!("Creating missing database tables");
        self.conn
            .execute_batch(&schema::create_schema_sql(&self.obs_table))
            .map_err(|e| SbSearchError::Storage(format!("Failed to create schema: {}", e)))?;

        let count = self.count_structures()?;
        if count != expected.len() {
            return Err(SbSearchError::SchemaInconsistency(format!(
                "{} of {} required structures present after schema creation",
                count,
                expected.len()
            )));
        }
        Ok(())
    }

    fn count_structures(&self) -> Result<usize> {
        let names = schema::required_tables(&self.obs_table);
        let count: i64 = self.conn.query_row(
            "SELECT count() FROM sqlite_master WHERE type='table' AND name IN (?,?,?,?,?,?)",
            params![names[0], names[1], names[2], names[3], names[4], names[5]],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    // ------------------------------------------------------------------
    // objects

    /// Register an object, returning its id; an already registered
    /// designation returns the existing id (identities are never merged or
    /// reassigned)
    pub fn add_object(&self, desg: &str) -> Result<i64> {
        if let Some(objid) = self
            .conn
            .query_row(
                "SELECT objid FROM obj WHERE desg = ?",
                params![desg],
                |row| row.get(0),
            )
            .optional()?
        {
            return Ok(objid);
        }

        self.conn
            .execute("INSERT INTO obj (desg) VALUES (?)", params![desg])?;
        let objid = self.conn.last_insert_rowid();
        log::info!("Added object {} with objid {}", desg, objid);
        Ok(objid)
    }

    /// Resolve an object reference to `(objid, designation)`.
    ///
    /// Never creates objects; an unregistered id or designation is an
    /// [`SbSearchError::UnknownObject`].
    pub fn resolve_object(&self, target: &ObjectRef) -> Result<(i64, String)> {
        let row = match target {
            ObjectRef::Id(objid) => self
                .conn
                .query_row(
                    "SELECT objid, desg FROM obj WHERE objid = ?",
                    params![objid],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?,
            ObjectRef::Designation(desg) => self
                .conn
                .query_row(
                    "SELECT objid, desg FROM obj WHERE desg = ?",
                    params![desg],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?,
        };

        row.ok_or_else(|| SbSearchError::UnknownObject(target.to_string()))
    }

    /// Delete an object and, in the same transaction, its ephemeris points,
    /// their index entries, and its found records
    pub fn remove_object(&mut self, objid: i64) -> Result<()> {
        let (objid, desg) = self.resolve_object(&ObjectRef::Id(objid))?;

        let found_table = format!("{}_found", self.obs_table);
        let tx = self.conn.transaction()?;
        tx.execute(
            &format!("DELETE FROM {} WHERE objid = ?", found_table),
            params![objid],
        )?;
        tx.execute(
            "DELETE FROM eph_tree WHERE ephid IN (SELECT ephid FROM eph WHERE objid = ?)",
            params![objid],
        )?;
        tx.execute("DELETE FROM eph WHERE objid = ?", params![objid])?;
        tx.execute("DELETE FROM obj WHERE objid = ?", params![objid])?;
        tx.commit()?;

        log::info!("Removed object {} ({})", desg, objid);
        Ok(())
    }

    // ------------------------------------------------------------------
    // ephemerides

    /// Fetch an ephemeris from `provider` over `[jd_start, jd_stop]` and
    /// store it.
    ///
    /// With `step` given, fixed-cadence samples are requested; without it
    /// the provider chooses its own spacing. Each interior point of the
    /// returned sequence gets a space-time box in the ephemeris R-tree,
    /// computed from the triplet centered on it with a half-step of half
    /// the local sampling interval. Points and boxes are committed in one
    /// transaction. Returns the number of points stored.
    pub fn add_ephemeris(
        &mut self,
        objid: i64,
        location: &str,
        jd_start: f64,
        jd_stop: f64,
        step: Option<Step>,
        source: Source,
        cache: bool,
        provider: &dyn EphemerisProvider,
    ) -> Result<usize> {
        let (objid, desg) = self.resolve_object(&ObjectRef::Id(objid))?;

        let samples =
            provider.fetch_range(&desg, location, jd_start, jd_stop, step, source, cache)?;
        let retrieved = chrono::Utc::now().to_rfc3339();

        let tx = self.conn.transaction()?;
        let mut inserted: Vec<(i64, f64, SkyPoint)> = Vec::with_capacity(samples.len());
        {
            let mut stmt = tx.prepare(
                "INSERT INTO eph (objid, jd, rh, delta, ra, dec, dra, ddec, unc, vmag, retrieved)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )?;
            for sample in &samples {
                stmt.execute(params![
                    objid,
                    sample.jd,
                    sample.rh,
                    sample.delta,
                    sample.ra,
                    sample.dec,
                    sample.dra,
                    sample.ddec,
                    sample.unc,
                    sample.vmag,
                    retrieved,
                ])?;
                inserted.push((
                    tx.last_insert_rowid(),
                    sample.jd,
                    SkyPoint::from_degrees(sample.ra, sample.dec),
                ));
            }

            let mut tree = tx.prepare(
                "INSERT INTO eph_tree (ephid, mjd0, mjd1, x0, x1, y0, y1, z0, z1)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )?;
            for window in inserted.windows(3) {
                let [(_, jd0, c0), (ephid, jd1, c1), (_, jd2, c2)] = window else {
                    unreachable!()
                };
                let half_step = (jd2 - jd0) / 4.0;
                let limits = eph_to_limits(&[*c0, *c1, *c2], &[*jd0, *jd1, *jd2], half_step);
                tree.execute(params![
                    ephid,
                    limits.mjd0,
                    limits.mjd1,
                    limits.x0,
                    limits.x1,
                    limits.y0,
                    limits.y1,
                    limits.z0,
                    limits.z1,
                ])?;
            }
        }
        tx.commit()?;

        log::info!(
            "Added {} ephemeris points for {} over [{}, {}]",
            inserted.len(),
            desg,
            jd_start,
            jd_stop
        );
        Ok(inserted.len())
    }

    /// Fetch an ephemeris at exactly the given epochs, without touching
    /// storage or the index; used for one-off comparisons
    pub fn get_ephemeris_exact(
        &self,
        desg: &str,
        location: &str,
        epochs: &[f64],
        source: Source,
        cache: bool,
        provider: &dyn EphemerisProvider,
    ) -> Result<Vec<EphemerisSample>> {
        let samples = provider.fetch_epochs(desg, location, epochs, source, cache)?;
        if samples.len() != epochs.len() {
            return Err(SbSearchError::Provider(format!(
                "Provider returned {} of {} requested epochs for {}",
                samples.len(),
                epochs.len(),
                desg
            )));
        }
        Ok(samples)
    }

    /// Stored ephemeris points for an object, ordered by `jd`, optionally
    /// bounded below and/or above
    pub fn get_ephemeris(
        &self,
        objid: i64,
        jd_start: Option<f64>,
        jd_stop: Option<f64>,
    ) -> Result<Vec<EphemerisPoint>> {
        let mut constraints = vec![("objid = ?".to_string(), Some(Value::from(objid)))];
        constraints.extend(date_constraints(jd_start, jd_stop));

        let (sql, values) = assemble_sql(
            "SELECT ephid, objid, jd, rh, delta, ra, dec, dra, ddec, unc, vmag, retrieved \
             FROM eph",
            constraints,
        );
        let sql = format!("{} ORDER BY jd", sql);

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values), row_to_eph)?;
        rows.map(|r| r.map_err(SbSearchError::from)).collect()
    }

    /// The stored points bracketing `jd` for an object.
    ///
    /// An epoch matching a stored point exactly brackets itself on both
    /// sides. Fails with [`SbSearchError::InsufficientData`] when either
    /// side is missing.
    pub fn bracket(&self, objid: i64, jd: f64) -> Result<(EphemerisPoint, EphemerisPoint)> {
        let before = self
            .conn
            .query_row(
                "SELECT ephid, objid, jd, rh, delta, ra, dec, dra, ddec, unc, vmag, retrieved \
                 FROM eph WHERE objid = ? AND jd <= ? ORDER BY jd DESC LIMIT 1",
                params![objid, jd],
                row_to_eph,
            )
            .optional()?;
        let after = self
            .conn
            .query_row(
                "SELECT ephid, objid, jd, rh, delta, ra, dec, dra, ddec, unc, vmag, retrieved \
                 FROM eph WHERE objid = ? AND jd >= ? ORDER BY jd ASC LIMIT 1",
                params![objid, jd],
                row_to_eph,
            )
            .optional()?;

        match (before, after) {
            (Some(p0), Some(p1)) => Ok((p0, p1)),
            _ => Err(SbSearchError::InsufficientData(format!(
                "No stored points bracket jd {} for object {}",
                jd, objid
            ))),
        }
    }

    /// Interpolated sky positions at each epoch, derived from the stored
    /// points and the great-circle kernel; no side storage is consulted
    pub fn get_ephemeris_interp(&self, objid: i64, epochs: &[f64]) -> Result<Vec<SkyPoint>> {
        epochs
            .iter()
            .map(|&jd| {
                let (p0, p1) = self.bracket(objid, jd)?;
                Ok(spherical_interpolation(
                    p0.position(),
                    p1.position(),
                    p0.jd,
                    p1.jd,
                    jd,
                ))
            })
            .collect()
    }

    /// Lazy, restartable iterator over ephemeris segments and their
    /// precomputed boxes, optionally filtered by object and by overlap with
    /// a time range
    pub fn get_ephemeris_segments(
        &self,
        objid: Option<i64>,
        jd_start: Option<f64>,
        jd_stop: Option<f64>,
    ) -> SegmentIter<'_> {
        SegmentIter {
            db: self,
            objid,
            start_mjd: jd_start.map(|jd| jd - MJD_OFFSET),
            stop_mjd: jd_stop.map(|jd| jd - MJD_OFFSET),
            last_ephid: 0,
            buffer: VecDeque::new(),
            exhausted: false,
        }
    }

    /// Delete stored ephemeris points (and their index entries) for an
    /// object, optionally bounded in time; returns the number of points
    /// deleted
    pub fn clean_ephemeris(
        &mut self,
        objid: i64,
        jd_start: Option<f64>,
        jd_stop: Option<f64>,
    ) -> Result<usize> {
        let mut constraints = vec![("objid = ?".to_string(), Some(Value::from(objid)))];
        constraints.extend(date_constraints(jd_start, jd_stop));
        let (subquery, values) = assemble_sql("SELECT ephid FROM eph", constraints);

        let tx = self.conn.transaction()?;
        tx.execute(
            &format!("DELETE FROM eph_tree WHERE ephid IN ({})", subquery),
            params_from_iter(values.clone()),
        )?;
        let count = tx.execute(
            &format!("DELETE FROM eph WHERE ephid IN ({})", subquery),
            params_from_iter(values),
        )?;
        tx.commit()?;

        log::info!("Removed {} ephemeris points for object {}", count, objid);
        Ok(count)
    }

    // ------------------------------------------------------------------
    // observations

    /// Ingest a batch of observations.
    ///
    /// Each row is stored together with its footprint box in the
    /// observation R-tree, all in one transaction. Boxes are computed in
    /// parallel beforehand. Returns the number of observations stored.
    pub fn add_observations(&mut self, observations: &[Observation]) -> Result<usize> {
        let boxes: Vec<SpaceTimeBox> = observations.par_iter().map(|obs| obs.limits()).collect();

        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO {} (obsid, jd_start, jd_stop, ra, dec, \
                 ra1, dec1, ra2, dec2, ra3, dec3, ra4, dec4) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                self.obs_table
            ))?;
            let mut tree = tx.prepare(&format!(
                "INSERT INTO {}_tree (obsid, mjd0, mjd1, x0, x1, y0, y1, z0, z1) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
                self.obs_table
            ))?;

            for (obs, limits) in observations.iter().zip(&boxes) {
                stmt.execute(params![
                    obs.obsid,
                    obs.jd_start,
                    obs.jd_stop,
                    obs.ra,
                    obs.dec,
                    obs.corners[0][0],
                    obs.corners[0][1],
                    obs.corners[1][0],
                    obs.corners[1][1],
                    obs.corners[2][0],
                    obs.corners[2][1],
                    obs.corners[3][0],
                    obs.corners[3][1],
                ])?;
                tree.execute(params![
                    obs.obsid,
                    limits.mjd0,
                    limits.mjd1,
                    limits.x0,
                    limits.x1,
                    limits.y0,
                    limits.y1,
                    limits.z0,
                    limits.z1,
                ])?;
            }
        }
        tx.commit()?;

        log::info!("Added {} observations", observations.len());
        Ok(observations.len())
    }

    /// Fetch a single observation by id
    pub fn get_observation(&self, obsid: i64) -> Result<Option<Observation>> {
        let obs = self
            .conn
            .query_row(
                &format!(
                    "SELECT obsid, jd_start, jd_stop, ra, dec, \
                     ra1, dec1, ra2, dec2, ra3, dec3, ra4, dec4 \
                     FROM {} WHERE obsid = ?",
                    self.obs_table
                ),
                params![obsid],
                row_to_obs,
            )
            .optional()?;
        Ok(obs)
    }

    /// Delete an observation and, in the same transaction, its index entry
    /// and found records
    pub fn remove_observation(&mut self, obsid: i64) -> Result<()> {
        let found_table = format!("{}_found", self.obs_table);
        let tree_table = format!("{}_tree", self.obs_table);

        let tx = self.conn.transaction()?;
        tx.execute(
            &format!("DELETE FROM {} WHERE obsid = ?", found_table),
            params![obsid],
        )?;
        tx.execute(
            &format!("DELETE FROM {} WHERE obsid = ?", tree_table),
            params![obsid],
        )?;
        tx.execute(
            &format!("DELETE FROM {} WHERE obsid = ?", self.obs_table),
            params![obsid],
        )?;
        tx.commit()?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // spatial queries

    /// Observation ids whose index boxes overlap `limits` on all four axes,
    /// boundary touching included
    pub fn query_observations_intersecting(&self, limits: &SpaceTimeBox) -> Result<Vec<i64>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT obsid FROM {}_tree \
             WHERE mjd1 >= ? AND mjd0 <= ? AND x1 >= ? AND x0 <= ? \
             AND y1 >= ? AND y0 <= ? AND z1 >= ? AND z0 <= ? \
             ORDER BY obsid",
            self.obs_table
        ))?;
        let rows = stmt.query_map(
            params![
                limits.mjd0,
                limits.mjd1,
                limits.x0,
                limits.x1,
                limits.y0,
                limits.y1,
                limits.z0,
                limits.z1,
            ],
            |row| row.get(0),
        )?;
        rows.map(|r| r.map_err(SbSearchError::from)).collect()
    }

    /// The symmetric query over ephemeris segments: `(objid, ephid)` pairs
    /// whose boxes overlap `limits`; used for the inverse search of what
    /// objects might be in an exposure
    pub fn query_ephemeris_intersecting(
        &self,
        limits: &SpaceTimeBox,
    ) -> Result<Vec<(i64, i64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT e.objid, t.ephid FROM eph_tree t \
             JOIN eph e ON e.ephid = t.ephid \
             WHERE t.mjd1 >= ? AND t.mjd0 <= ? AND t.x1 >= ? AND t.x0 <= ? \
             AND t.y1 >= ? AND t.y0 <= ? AND t.z1 >= ? AND t.z0 <= ? \
             ORDER BY t.ephid",
        )?;
        let rows = stmt.query_map(
            params![
                limits.mjd0,
                limits.mjd1,
                limits.x0,
                limits.x1,
                limits.y0,
                limits.y1,
                limits.z0,
                limits.z1,
            ],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        rows.map(|r| r.map_err(SbSearchError::from)).collect()
    }

    // ------------------------------------------------------------------
    // found records

    /// Record a confirmed match; returns the new found id
    pub fn add_found(&self, found: &Found) -> Result<i64> {
        self.conn.execute(
            &format!(
                "INSERT INTO {}_found (objid, obsid, jd, ra, dec, dra, ddec, unc, vmag, \
                 rh, delta, rdot, phase, selong, sangle, vangle) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                self.obs_table
            ),
            params![
                found.objid,
                found.obsid,
                found.jd,
                found.ra,
                found.dec,
                found.dra,
                found.ddec,
                found.unc,
                found.vmag,
                found.rh,
                found.delta,
                found.rdot,
                found.phase,
                found.selong,
                found.sangle,
                found.vangle,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Found records for an object, ordered by observation id
    pub fn get_found(&self, objid: i64) -> Result<Vec<Found>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT foundid, objid, obsid, jd, ra, dec, dra, ddec, unc, vmag, \
             rh, delta, rdot, phase, selong, sangle, vangle \
             FROM {}_found WHERE objid = ? ORDER BY obsid",
            self.obs_table
        ))?;
        let rows = stmt.query_map(params![objid], row_to_found)?;
        rows.map(|r| r.map_err(SbSearchError::from)).collect()
    }

    // ------------------------------------------------------------------

    /// Row counts for the major tables
    pub fn get_stats(&self) -> Result<DatabaseStats> {
        let count = |sql: &str| -> Result<usize> {
            let n: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
            Ok(n as usize)
        };

        Ok(DatabaseStats {
            objects: count("SELECT count() FROM obj")?,
            ephemeris_points: count("SELECT count() FROM eph")?,
            observations: count(&format!("SELECT count() FROM {}", self.obs_table))?,
            found: count(&format!("SELECT count() FROM {}_found", self.obs_table))?,
        })
    }

    /// Direct access to the connection for callers that need it (tests,
    /// maintenance scripts)
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

/// Database row counts
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseStats {
    pub objects: usize,
    pub ephemeris_points: usize,
    pub observations: usize,
    pub found: usize,
}

/// An ephemeris segment: the interior point it is centered on, its object,
/// and the precomputed space-time box
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub ephid: i64,
    pub objid: i64,
    pub limits: SpaceTimeBox,
}

/// Iterator over ephemeris segments, paging through the R-tree by ephid so
/// no statement stays open between items; restart by calling
/// [`Database::get_ephemeris_segments`] again
pub struct SegmentIter<'a> {
    db: &'a Database,
    objid: Option<i64>,
    start_mjd: Option<f64>,
    stop_mjd: Option<f64>,
    last_ephid: i64,
    buffer: VecDeque<Segment>,
    exhausted: bool,
}

impl SegmentIter<'_> {
    fn fetch_page(&mut self) -> Result<()> {
        let mut constraints = vec![(
            "t.ephid > ?".to_string(),
            Some(Value::from(self.last_ephid)),
        )];
        if let Some(objid) = self.objid {
            constraints.push(("e.objid = ?".to_string(), Some(Value::from(objid))));
        }
        if let Some(mjd) = self.start_mjd {
            constraints.push(("t.mjd1 >= ?".to_string(), Some(Value::from(mjd))));
        }
        if let Some(mjd) = self.stop_mjd {
            constraints.push(("t.mjd0 <= ?".to_string(), Some(Value::from(mjd))));
        }

        let (sql, values) = assemble_sql(
            "SELECT t.ephid, e.objid, t.mjd0, t.mjd1, t.x0, t.x1, t.y0, t.y1, t.z0, t.z1 \
             FROM eph_tree t JOIN eph e ON e.ephid = t.ephid",
            constraints,
        );
        let sql = format!("{} ORDER BY t.ephid LIMIT {}", sql, SEGMENT_PAGE);

        let mut stmt = self.db.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values), |row| {
            Ok(Segment {
                ephid: row.get(0)?,
                objid: row.get(1)?,
                limits: SpaceTimeBox {
                    mjd0: row.get(2)?,
                    mjd1: row.get(3)?,
                    x0: row.get(4)?,
                    x1: row.get(5)?,
                    y0: row.get(6)?,
                    y1: row.get(7)?,
                    z0: row.get(8)?,
                    z1: row.get(9)?,
                },
            })
        })?;

        let mut fetched = 0;
        for segment in rows {
            let segment = segment?;
            self.last_ephid = segment.ephid;
            self.buffer.push_back(segment);
            fetched += 1;
        }
        if fetched < SEGMENT_PAGE {
            self.exhausted = true;
        }
        Ok(())
    }
}

impl Iterator for SegmentIter<'_> {
    type Item = Result<Segment>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.buffer.is_empty() && !self.exhausted {
            if let Err(e) = self.fetch_page() {
                self.exhausted = true;
                return Some(Err(e));
            }
        }
        self.buffer.pop_front().map(Ok)
    }
}

// ----------------------------------------------------------------------

/// Append optional constraints to a SELECT/DELETE statement; each
/// constraint is an SQL expression and an optional substitution parameter
fn assemble_sql(cmd: &str, constraints: Vec<(String, Option<Value>)>) -> (String, Vec<Value>) {
    if constraints.is_empty() {
        return (cmd.to_string(), Vec::new());
    }

    let exprs: Vec<&str> = constraints.iter().map(|(e, _)| e.as_str()).collect();
    let sql = format!("{} WHERE {}", cmd, exprs.join(" AND "));
    let values = constraints.into_iter().filter_map(|(_, v)| v).collect();
    (sql, values)
}

/// Date constraints for [`assemble_sql`]
fn date_constraints(jd_start: Option<f64>, jd_stop: Option<f64>) -> Vec<(String, Option<Value>)> {
    let mut constraints = Vec::new();
    if let Some(jd) = jd_start {
        constraints.push(("jd >= ?".to_string(), Some(Value::from(jd))));
    }
    if let Some(jd) = jd_stop {
        constraints.push(("jd <= ?".to_string(), Some(Value::from(jd))));
    }
    constraints
}

fn row_to_eph(row: &Row) -> rusqlite::Result<EphemerisPoint> {
    Ok(EphemerisPoint {
        ephid: row.get(0)?,
        objid: row.get(1)?,
        jd: row.get(2)?,
        rh: row.get(3)?,
        delta: row.get(4)?,
        ra: row.get(5)?,
        dec: row.get(6)?,
        dra: row.get(7)?,
        ddec: row.get(8)?,
        unc: row.get(9)?,
        vmag: row.get(10)?,
        retrieved: row.get(11)?,
    })
}

fn row_to_obs(row: &Row) -> rusqlite::Result<Observation> {
    Ok(Observation {
        obsid: row.get(0)?,
        jd_start: row.get(1)?,
        jd_stop: row.get(2)?,
        ra: row.get(3)?,
        dec: row.get(4)?,
        corners: [
            [row.get(5)?, row.get(6)?],
            [row.get(7)?, row.get(8)?],
            [row.get(9)?, row.get(10)?],
            [row.get(11)?, row.get(12)?],
        ],
    })
}

fn row_to_found(row: &Row) -> rusqlite::Result<Found> {
    Ok(Found {
        foundid: row.get(0)?,
        objid: row.get(1)?,
        obsid: row.get(2)?,
        jd: row.get(3)?,
        ra: row.get(4)?,
        dec: row.get(5)?,
        dra: row.get(6)?,
        ddec: row.get(7)?,
        unc: row.get(8)?,
        vmag: row.get(9)?,
        rh: row.get(10)?,
        delta: row.get(11)?,
        rdot: row.get(12)?,
        phase: row.get(13)?,
        selong: row.get(14)?,
        sangle: row.get(15)?,
        vangle: row.get(16)?,
    })
}
