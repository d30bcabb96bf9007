//! Database schema definitions
//!
//! Six persistent structures: objects, ephemeris points, the ephemeris
//! R-tree, the survey observation table (name configurable per survey), the
//! observation R-tree, and found records. Dependent rows are removed by
//! explicit transactional cascades in the database layer, not by triggers;
//! the foreign keys remain declared as a backstop.

/// Names of the required structures for a given observation table
pub fn required_tables(obs_table: &str) -> [String; 6] {
    [
        "obj".to_string(),
        "eph".to_string(),
        "eph_tree".to_string(),
        obs_table.to_string(),
        format!("{}_tree", obs_table),
        format!("{}_found", obs_table),
    ]
}

/// Full schema creation script; every statement is `IF NOT EXISTS` so the
/// script is safe to re-run over a partially existing database
pub fn create_schema_sql(obs_table: &str) -> String {
    format!(
        r#"
CREATE TABLE IF NOT EXISTS obj(
    objid INTEGER PRIMARY KEY,
    desg TEXT UNIQUE NOT NULL
);

/* ephemeris points; RA, Dec in degrees, rates in arcsec/hr */
CREATE TABLE IF NOT EXISTS eph(
    ephid INTEGER PRIMARY KEY,
    objid INTEGER NOT NULL,
    jd FLOAT NOT NULL,
    rh FLOAT,
    delta FLOAT,
    ra FLOAT NOT NULL,
    dec FLOAT NOT NULL,
    dra FLOAT,
    ddec FLOAT,
    unc FLOAT,
    vmag FLOAT,
    retrieved TEXT,
    FOREIGN KEY(objid) REFERENCES obj(objid)
);

CREATE INDEX IF NOT EXISTS idx_eph_objid_jd ON eph(objid, jd);

/* space-time index over ephemeris segments; times are MJD */
CREATE VIRTUAL TABLE IF NOT EXISTS eph_tree USING rtree(
    ephid INTEGER PRIMARY KEY,
    mjd0 FLOAT,
    mjd1 FLOAT,
    x0 FLOAT,
    x1 FLOAT,
    y0 FLOAT,
    y1 FLOAT,
    z0 FLOAT,
    z1 FLOAT
);

/* survey exposures; RA, Dec and footprint corners in degrees */
CREATE TABLE IF NOT EXISTS {obs}(
    obsid INTEGER PRIMARY KEY,
    jd_start FLOAT NOT NULL,
    jd_stop FLOAT NOT NULL,
    ra FLOAT NOT NULL,
    dec FLOAT NOT NULL,
    ra1 FLOAT NOT NULL,
    dec1 FLOAT NOT NULL,
    ra2 FLOAT NOT NULL,
    dec2 FLOAT NOT NULL,
    ra3 FLOAT NOT NULL,
    dec3 FLOAT NOT NULL,
    ra4 FLOAT NOT NULL,
    dec4 FLOAT NOT NULL
);

/* space-time index over exposure footprints */
CREATE VIRTUAL TABLE IF NOT EXISTS {obs}_tree USING rtree(
    obsid INTEGER PRIMARY KEY,
    mjd0 FLOAT,
    mjd1 FLOAT,
    x0 FLOAT,
    x1 FLOAT,
    y0 FLOAT,
    y1 FLOAT,
    z0 FLOAT,
    z1 FLOAT
);

/* objects found in exposures; angles in degrees, distances in au */
CREATE TABLE IF NOT EXISTS {obs}_found(
    foundid INTEGER PRIMARY KEY,
    objid INTEGER NOT NULL,
    obsid INTEGER NOT NULL,
    jd FLOAT NOT NULL,
    ra FLOAT,
    dec FLOAT,
    dra FLOAT,
    ddec FLOAT,
    unc FLOAT,
    vmag FLOAT,
    rh FLOAT,
    delta FLOAT,
    rdot FLOAT,
    phase FLOAT,
    selong FLOAT,
    sangle FLOAT,
    vangle FLOAT,
    FOREIGN KEY(objid) REFERENCES obj(objid),
    FOREIGN KEY(obsid) REFERENCES {obs}(obsid)
);

CREATE INDEX IF NOT EXISTS idx_{obs}_found_objid ON {obs}_found(objid);
"#,
        obs = obs_table
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_tables() {
        let tables = required_tables("ztf");
        assert_eq!(tables.len(), 6);
        assert!(tables.contains(&"ztf_tree".to_string()));
        assert!(tables.contains(&"ztf_found".to_string()));
        assert!(tables.contains(&"eph_tree".to_string()));
    }

    #[test]
    fn test_schema_uses_obs_table_name() {
        let sql = create_schema_sql("ztf");
        assert!(sql.contains("CREATE TABLE IF NOT EXISTS ztf("));
        assert!(sql.contains("ztf_tree"));
        assert!(sql.contains("ztf_found"));
        assert!(!sql.contains("{obs}"));
    }
}
