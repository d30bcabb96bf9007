//! End-to-end overlap search scenarios
//!
//! Synthetic surveys plus synthetic ephemerides with hand-computable
//! expected match sets, exercising ingest, indexing, candidate generation,
//! and exact containment together.

use sbsearch_rs::{Config, EphemerisSample, ObjectRef, Observation, SbSearch, TableProvider};
use std::f64::consts::PI;

/// Synthetic survey: 1000 contiguous 30 s exposures sweeping RA 0..360 deg
/// and Dec -45..45 deg with 1 x 1 deg footprints
fn survey_observations(jd0: f64) -> Vec<Observation> {
    let n = 1000;
    let half = 0.5f64.to_radians();

    (0..n)
        .map(|k| {
            let f = k as f64 / (n - 1) as f64;
            let ra = 2.0 * PI * f;
            let dec = -PI / 4.0 + PI / 2.0 * f;
            let w = half * dec.cos();

            let corner = |dra: f64, ddec: f64| [(ra + dra).to_degrees(), (dec + ddec).to_degrees()];

            Observation {
                obsid: k as i64,
                jd_start: jd0 + k as f64 * 30.0 / 86400.0,
                jd_stop: jd0 + (k + 1) as f64 * 30.0 / 86400.0,
                ra: ra.to_degrees(),
                dec: dec.to_degrees(),
                corners: [
                    corner(-w, -half),
                    corner(-w, half),
                    corner(w, -half),
                    corner(w, half),
                ],
            }
        })
        .collect()
}

/// Center of survey exposure `k`, in degrees
fn survey_center(k: usize) -> (f64, f64) {
    let f = k as f64 / 999.0;
    (
        (2.0 * PI * f).to_degrees(),
        (-PI / 4.0 + PI / 2.0 * f).to_degrees(),
    )
}

/// 10 x 10 tiling of the whole sky: 36 deg wide, 18 deg tall tiles, one
/// 30 s exposure each starting at `jd0`
fn sky_tiles(jd0: f64) -> Vec<Observation> {
    let n_tiles = 10;
    let mut observations = Vec::new();

    for i in 0..n_tiles {
        for j in 0..n_tiles {
            let k = i * n_tiles + j;
            let ra0 = 360.0 * i as f64 / n_tiles as f64;
            let ra1 = 360.0 * (i + 1) as f64 / n_tiles as f64;
            let dec0 = -90.0 + 180.0 * j as f64 / n_tiles as f64;
            let dec1 = -90.0 + 180.0 * (j + 1) as f64 / n_tiles as f64;

            observations.push(Observation {
                obsid: k as i64,
                jd_start: jd0 + k as f64 * 30.0 / 86400.0,
                jd_stop: jd0 + (k as f64 + 1.0) * 30.0 / 86400.0,
                ra: (ra0 + ra1) / 2.0,
                dec: (dec0 + dec1) / 2.0,
                corners: [[ra0, dec0], [ra0, dec1], [ra1, dec1], [ra1, dec0]],
            });
        }
    }
    observations
}

/// Daily-cadence samples moving linearly in RA/Dec (degrees, deg/day)
fn daily_samples(t0: f64, n: usize, ra0: f64, dec0: f64, ra_rate: f64, dec_rate: f64) -> Vec<EphemerisSample> {
    (0..n)
        .map(|i| {
            let dt = i as f64;
            EphemerisSample {
                jd: t0 + dt,
                ra: ra0 + ra_rate * dt,
                dec: dec0 + dec_rate * dt,
                dra: ra_rate * 150.0,
                ddec: dec_rate * 150.0,
                rh: 3.0,
                delta: 2.2,
                vmag: 18.0,
                unc: None,
            }
        })
        .collect()
}

fn searcher(samples: Vec<EphemerisSample>) -> SbSearch {
    let mut provider = TableProvider::new();
    provider.insert("2P", samples);
    SbSearch::new(Config::memory(), Box::new(provider)).unwrap()
}

#[test]
fn test_sweep_survey_outside_trajectory() {
    // 1000 exposures starting at 2458119.5, all within the first 8.3 hours;
    // a daily-cadence 3-point ephemeris leaves one indexed segment covering
    // [2458120.0, 2458121.0]. The object descends from Dec 60 to Dec 20 but
    // is still above Dec 53 while any shutter is open, and the survey never
    // reaches above Dec 45.5: no exposure truly contains it, and none is
    // reported.
    let mut sbs = searcher(daily_samples(2458119.5, 3, 10.0, 60.0, 0.0, -20.0));
    sbs.add_observations(&survey_observations(2458119.5)).unwrap();
    sbs.update_ephemeris(
        &"2P".into(),
        2458119.5,
        2458121.5,
        Some("1d".parse().unwrap()),
        false,
        false,
    )
    .unwrap();

    let (objid, _) = sbs.resolve_object(&"2P".into()).unwrap();
    assert_eq!(sbs.db().get_ephemeris(objid, None, None).unwrap().len(), 3);

    let obsids = sbs.find_observations(&"2P".into(), None, None, false).unwrap();
    assert!(obsids.is_empty(), "unexpected matches: {:?}", obsids);
}

#[test]
fn test_sweep_survey_matching_fields() {
    // the same sweep, but shot while the indexed segment is live and with
    // the object parked at the center of exposure 300. Consecutive field
    // centers advance 0.360 deg in RA against a 0.475 deg footprint
    // half-width (0.5 deg scaled by cos Dec), so exposures 299-301 contain
    // the object and 298/302 fall short.
    let (ra, dec) = survey_center(300);
    let mut sbs = searcher(daily_samples(2458119.5, 3, ra, dec, 0.0, 0.0));
    sbs.add_observations(&survey_observations(2458120.3)).unwrap();
    sbs.update_ephemeris(
        &"2P".into(),
        2458119.5,
        2458121.5,
        Some("1d".parse().unwrap()),
        false,
        false,
    )
    .unwrap();

    let obsids = sbs.find_observations(&"2P".into(), None, None, true).unwrap();
    assert_eq!(obsids, vec![299, 300, 301]);

    // saved circumstances land on the parked position
    let (objid, _) = sbs.resolve_object(&"2P".into()).unwrap();
    let found = sbs.db().get_found(objid).unwrap();
    assert_eq!(found.len(), 3);
    for f in &found {
        assert!((f.ra - ra).abs() < 1e-6);
        assert!((f.dec - dec).abs() < 1e-6);
    }
}

#[test]
fn test_half_sky_tiling() {
    // whole-sky tiling in 36 x 18 deg tiles; a slow mover inside tile
    // (RA 36..72, Dec 0..18) = exposure 15 is found there and nowhere else
    let mut sbs = searcher(daily_samples(2458119.5, 3, 50.0, 9.0, 0.05, 0.02));
    sbs.add_observations(&sky_tiles(2458120.3)).unwrap();
    sbs.update_ephemeris(
        &"2P".into(),
        2458119.5,
        2458121.5,
        Some("1d".parse().unwrap()),
        false,
        false,
    )
    .unwrap();

    let obsids = sbs.find_observations(&"2P".into(), None, None, false).unwrap();
    assert_eq!(obsids, vec![15]);
}

#[test]
fn test_search_window_and_cascade() {
    let (ra, dec) = survey_center(300);
    let mut sbs = searcher(daily_samples(2458119.5, 3, ra, dec, 0.0, 0.0));
    sbs.add_observations(&survey_observations(2458120.3)).unwrap();
    sbs.update_ephemeris(
        &"2P".into(),
        2458119.5,
        2458121.5,
        Some("1d".parse().unwrap()),
        false,
        false,
    )
    .unwrap();

    // a search window beyond the stored trajectory has no segments
    let result = sbs.find_observations(&"2P".into(), Some(2458125.0), Some(2458126.0), false);
    assert!(matches!(
        result,
        Err(sbsearch_rs::SbSearchError::NoEphemeris(_))
    ));

    // removing the object takes its ephemeris, index entries, and found
    // records with it
    let obsids = sbs.find_observations(&"2P".into(), None, None, true).unwrap();
    assert_eq!(obsids.len(), 3);

    let (objid, _) = sbs.resolve_object(&"2P".into()).unwrap();
    sbs.db_mut().remove_object(objid).unwrap();
    assert!(sbs.resolve_object(&ObjectRef::Id(objid)).is_err());
    assert_eq!(sbs.db().get_found(objid).unwrap().len(), 0);
    assert!(matches!(
        sbs.find_observations(&ObjectRef::Id(objid), None, None, false),
        Err(sbsearch_rs::SbSearchError::UnknownObject(_))
    ));
}
