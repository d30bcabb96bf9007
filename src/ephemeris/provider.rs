//! Ephemeris provider implementations
//!
//! [`EphemerisProvider`] is the one fetch contract every source variant
//! implements. [`TableProvider`] serves pre-fetched samples from memory or a
//! JSON file; [`CachedProvider`] wraps any provider with an LRU cache of raw
//! responses, consulted when the caller sets the cache flag.

use super::{EphemerisSample, Source, Step};
use crate::error::{Result, SbSearchError};
use lru::LruCache;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::Mutex;

/// Common fetch contract for ephemeris services
///
/// Implementations are blocking; failures surface as
/// [`SbSearchError::Provider`]. Retry policy, if any, belongs to the
/// implementation, not the callers.
pub trait EphemerisProvider {
    /// Fetch samples over `[jd_start, jd_stop]`.
    ///
    /// With `step` set, samples are requested at that fixed cadence starting
    /// at `jd_start`; with `step` absent, the provider chooses its own
    /// spacing. Results are ordered by increasing `jd`.
    fn fetch_range(
        &self,
        designation: &str,
        location: &str,
        jd_start: f64,
        jd_stop: f64,
        step: Option<Step>,
        source: Source,
        cache: bool,
    ) -> Result<Vec<EphemerisSample>>;

    /// Fetch samples at exactly the given epochs, in epoch order.
    fn fetch_epochs(
        &self,
        designation: &str,
        location: &str,
        epochs: &[f64],
        source: Source,
        cache: bool,
    ) -> Result<Vec<EphemerisSample>>;
}

/// Provider backed by a table of pre-fetched samples
///
/// Native rows double as the provider's adaptive spacing; fixed-cadence and
/// exact-epoch requests are served by interpolating linearly between the
/// bracketing rows. Requests outside the table's time coverage fail.
#[derive(Debug, Default)]
pub struct TableProvider {
    tables: HashMap<String, Vec<EphemerisSample>>,
}

impl TableProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a table from a JSON file of the form
    /// `{"<designation>": [<sample>, ...], ...}`
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let tables: HashMap<String, Vec<EphemerisSample>> = serde_json::from_str(&text)?;
        let mut provider = Self::new();
        for (desg, samples) in tables {
            provider.insert(&desg, samples);
        }
        Ok(provider)
    }

    /// Register samples for a designation, keeping them ordered by epoch
    pub fn insert(&mut self, designation: &str, mut samples: Vec<EphemerisSample>) {
        samples.sort_by(|a, b| a.jd.total_cmp(&b.jd));
        self.tables.insert(designation.to_string(), samples);
    }

    fn table(&self, designation: &str) -> Result<&[EphemerisSample]> {
        self.tables
            .get(designation)
            .map(|t| t.as_slice())
            .ok_or_else(|| {
                SbSearchError::Provider(format!("No ephemeris table for {}", designation))
            })
    }

    /// Linear interpolation of all sample quantities at `jd`
    fn sample_at(table: &[EphemerisSample], designation: &str, jd: f64) -> Result<EphemerisSample> {
        let after = table.partition_point(|s| s.jd < jd);
        if after < table.len() && table[after].jd == jd {
            return Ok(table[after].clone());
        }
        if after == 0 || after == table.len() {
            return Err(SbSearchError::Provider(format!(
                "Epoch {} outside table coverage for {}",
                jd, designation
            )));
        }

        let (p0, p1) = (&table[after - 1], &table[after]);
        let f = (jd - p0.jd) / (p1.jd - p0.jd);
        let lerp = |a: f64, b: f64| a + f * (b - a);

        Ok(EphemerisSample {
            jd,
            ra: lerp(p0.ra, p1.ra),
            dec: lerp(p0.dec, p1.dec),
            dra: lerp(p0.dra, p1.dra),
            ddec: lerp(p0.ddec, p1.ddec),
            rh: lerp(p0.rh, p1.rh),
            delta: lerp(p0.delta, p1.delta),
            vmag: lerp(p0.vmag, p1.vmag),
            unc: match (p0.unc, p1.unc) {
                (Some(a), Some(b)) => Some(lerp(a, b)),
                _ => None,
            },
        })
    }
}

impl EphemerisProvider for TableProvider {
    fn fetch_range(
        &self,
        designation: &str,
        location: &str,
        jd_start: f64,
        jd_stop: f64,
        step: Option<Step>,
        _source: Source,
        _cache: bool,
    ) -> Result<Vec<EphemerisSample>> {
        let _ = location;
        let table = self.table(designation)?;

        match step {
            None => Ok(table
                .iter()
                .filter(|s| s.jd >= jd_start && s.jd <= jd_stop)
                .cloned()
                .collect()),
            Some(step) => {
                let mut samples = Vec::new();
                let mut jd = jd_start;
                // half-step slack on the final epoch absorbs accumulated
                // floating-point drift
                while jd <= jd_stop + step.days() * 1e-9 {
                    samples.push(Self::sample_at(table, designation, jd)?);
                    jd += step.days();
                }
                Ok(samples)
            }
        }
    }

    fn fetch_epochs(
        &self,
        designation: &str,
        location: &str,
        epochs: &[f64],
        _source: Source,
        _cache: bool,
    ) -> Result<Vec<EphemerisSample>> {
        let _ = location;
        let table = self.table(designation)?;
        epochs
            .iter()
            .map(|&jd| Self::sample_at(table, designation, jd))
            .collect()
    }
}

/// LRU-caching wrapper around another provider
///
/// Raw responses are keyed by the complete request. The cache is consulted
/// and populated only for requests made with the cache flag set, matching
/// the remote-reuse semantics of the underlying services.
pub struct CachedProvider<P> {
    inner: P,
    responses: Mutex<LruCache<String, Vec<EphemerisSample>>>,
}

impl<P: EphemerisProvider> CachedProvider<P> {
    pub fn new(inner: P, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap();
        Self {
            inner,
            responses: Mutex::new(LruCache::new(capacity)),
        }
    }

    fn lookup(&self, key: &str) -> Option<Vec<EphemerisSample>> {
        self.responses.lock().unwrap().get(key).cloned()
    }

    fn store(&self, key: String, samples: &[EphemerisSample]) {
        self.responses.lock().unwrap().put(key, samples.to_vec());
    }
}

fn range_key(
    designation: &str,
    location: &str,
    jd_start: f64,
    jd_stop: f64,
    step: Option<Step>,
    source: Source,
) -> String {
    format!(
        "range|{}|{}|{:x}|{:x}|{}|{}",
        designation,
        location,
        jd_start.to_bits(),
        jd_stop.to_bits(),
        step.map(|s| format!("{:x}", s.days().to_bits()))
            .unwrap_or_default(),
        source
    )
}

fn epochs_key(designation: &str, location: &str, epochs: &[f64], source: Source) -> String {
    let mut key = format!("epochs|{}|{}|{}", designation, location, source);
    for jd in epochs {
        key.push_str(&format!("|{:x}", jd.to_bits()));
    }
    key
}

impl<P: EphemerisProvider> EphemerisProvider for CachedProvider<P> {
    fn fetch_range(
        &self,
        designation: &str,
        location: &str,
        jd_start: f64,
        jd_stop: f64,
        step: Option<Step>,
        source: Source,
        cache: bool,
    ) -> Result<Vec<EphemerisSample>> {
        let key = range_key(designation, location, jd_start, jd_stop, step, source);
        if cache {
            if let Some(samples) = self.lookup(&key) {
                log::debug!("Provider cache hit for {}", designation);
                return Ok(samples);
            }
        }

        let samples =
            self.inner
                .fetch_range(designation, location, jd_start, jd_stop, step, source, cache)?;
        if cache {
            self.store(key, &samples);
        }
        Ok(samples)
    }

    fn fetch_epochs(
        &self,
        designation: &str,
        location: &str,
        epochs: &[f64],
        source: Source,
        cache: bool,
    ) -> Result<Vec<EphemerisSample>> {
        let key = epochs_key(designation, location, epochs, source);
        if cache {
            if let Some(samples) = self.lookup(&key) {
                log::debug!("Provider cache hit for {}", designation);
                return Ok(samples);
            }
        }

        let samples = self
            .inner
            .fetch_epochs(designation, location, epochs, source, cache)?;
        if cache {
            self.store(key, &samples);
        }
        Ok(samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn linear_table(t0: f64, n: usize, step: f64) -> Vec<EphemerisSample> {
        (0..n)
            .map(|i| {
                let jd = t0 + i as f64 * step;
                EphemerisSample {
                    jd,
                    ra: 10.0 + (jd - t0) * 0.5,
                    dec: -2.0 + (jd - t0) * 0.1,
                    dra: 12.0,
                    ddec: -3.0,
                    rh: 3.0 + (jd - t0) * 0.01,
                    delta: 2.5,
                    vmag: 18.0,
                    unc: Some(1.0),
                }
            })
            .collect()
    }

    #[test]
    fn test_table_native_spacing() {
        let mut provider = TableProvider::new();
        provider.insert("2P", linear_table(2458119.5, 10, 0.25));

        let samples = provider
            .fetch_range("2P", "500", 2458119.5, 2458120.5, None, Source::Mpc, false)
            .unwrap();
        assert_eq!(samples.len(), 5);
        assert_relative_eq!(samples[0].jd, 2458119.5);
        assert_relative_eq!(samples[4].jd, 2458120.5);
    }

    #[test]
    fn test_table_fixed_step() {
        let mut provider = TableProvider::new();
        provider.insert("2P", linear_table(2458119.5, 10, 0.25));

        let samples = provider
            .fetch_range(
                "2P",
                "500",
                2458119.5,
                2458121.5,
                Some("1d".parse().unwrap()),
                Source::Mpc,
                false,
            )
            .unwrap();
        assert_eq!(samples.len(), 3);
        assert_relative_eq!(samples[1].jd, 2458120.5);
        // linear quantities interpolate exactly
        assert_relative_eq!(samples[1].ra, 10.5, epsilon = 1e-9);
    }

    #[test]
    fn test_table_exact_epochs() {
        let mut provider = TableProvider::new();
        provider.insert("2P", linear_table(2458119.5, 10, 0.25));

        let epochs = [2458119.6, 2458120.0, 2458121.0];
        let samples = provider
            .fetch_epochs("2P", "500", &epochs, Source::Jpl, false)
            .unwrap();
        assert_eq!(samples.len(), epochs.len());
        for (sample, jd) in samples.iter().zip(epochs) {
            assert_relative_eq!(sample.jd, jd);
        }
    }

    #[test]
    fn test_table_out_of_coverage() {
        let mut provider = TableProvider::new();
        provider.insert("2P", linear_table(2458119.5, 3, 1.0));

        let result = provider.fetch_epochs("2P", "500", &[2458125.0], Source::Mpc, false);
        assert!(matches!(result, Err(SbSearchError::Provider(_))));

        let result = provider.fetch_range(
            "2P",
            "500",
            2458118.0,
            2458122.0,
            Some("1d".parse().unwrap()),
            Source::Mpc,
            false,
        );
        assert!(matches!(result, Err(SbSearchError::Provider(_))));
    }

    #[test]
    fn test_table_unknown_object() {
        let provider = TableProvider::new();
        let result = provider.fetch_range("1P", "500", 0.0, 1.0, None, Source::Mpc, false);
        assert!(matches!(result, Err(SbSearchError::Provider(_))));
    }

    /// Provider that counts fetches, for cache behavior tests
    struct Counting {
        inner: TableProvider,
        calls: std::sync::atomic::AtomicUsize,
    }

    impl EphemerisProvider for Counting {
        fn fetch_range(
            &self,
            designation: &str,
            location: &str,
            jd_start: f64,
            jd_stop: f64,
            step: Option<Step>,
            source: Source,
            cache: bool,
        ) -> Result<Vec<EphemerisSample>> {
            self.calls
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            self.inner
                .fetch_range(designation, location, jd_start, jd_stop, step, source, cache)
        }

        fn fetch_epochs(
            &self,
            designation: &str,
            location: &str,
            epochs: &[f64],
            source: Source,
            cache: bool,
        ) -> Result<Vec<EphemerisSample>> {
            self.calls
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            self.inner
                .fetch_epochs(designation, location, epochs, source, cache)
        }
    }

    #[test]
    fn test_cached_provider_reuses_responses() {
        let mut inner = TableProvider::new();
        inner.insert("2P", linear_table(2458119.5, 10, 0.25));
        let counting = Counting {
            inner,
            calls: std::sync::atomic::AtomicUsize::new(0),
        };
        let provider = CachedProvider::new(counting, 8);

        for _ in 0..3 {
            provider
                .fetch_range("2P", "500", 2458119.5, 2458120.5, None, Source::Mpc, true)
                .unwrap();
        }
        assert_eq!(
            provider.inner.calls.load(std::sync::atomic::Ordering::SeqCst),
            1
        );

        // cache flag off bypasses the cache entirely
        provider
            .fetch_range("2P", "500", 2458119.5, 2458120.5, None, Source::Mpc, false)
            .unwrap();
        assert_eq!(
            provider.inner.calls.load(std::sync::atomic::Ordering::SeqCst),
            2
        );
    }
}
