//! sbsearch-rs CLI application
//!
//! Command-line interface for the sbsearch-rs library.

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use sbsearch_rs::utils::parse_epoch_opt;
use sbsearch_rs::{
    CachedProvider, Config, ObjectRef, Observation, SbSearch, Source, Step, TableProvider,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sbsearch-rs")]
#[command(about = "Find solar system objects in astronomical survey images")]
#[command(version)]
struct Cli {
    /// Configuration file (JSON); defaults apply when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register an object designation
    AddObject {
        /// Designation, e.g. "2P" or "C/1995 O1"
        designation: String,
    },

    /// Ingest survey observations from a JSON file
    Ingest {
        /// JSON array of observations (obsid, exposure interval, center,
        /// footprint corners)
        file: PathBuf,
    },

    /// Fetch and store an ephemeris for an object
    Eph {
        /// Object id or designation
        target: String,

        /// Start of the time range (Julian date or YYYY-MM-DD)
        #[arg(long)]
        start: String,

        /// End of the time range (Julian date or YYYY-MM-DD)
        #[arg(long)]
        stop: String,

        /// Fixed cadence, e.g. 1d, 12h, 30m; provider-chosen spacing when
        /// omitted
        #[arg(long)]
        step: Option<String>,

        /// Ephemeris source service (mpc or jpl)
        #[arg(long)]
        source: Option<String>,

        /// JSON file of pre-fetched ephemeris samples serving as the
        /// provider
        #[arg(long)]
        samples: PathBuf,

        /// Reuse previously fetched provider responses when available
        #[arg(long)]
        cache: bool,

        /// Remove stored points in the range before storing fresh ones
        #[arg(long)]
        clean: bool,
    },

    /// Search the indexed survey for observations of an object
    Search {
        /// Object id or designation
        target: String,

        /// Limit the search to segments after this epoch
        #[arg(long)]
        start: Option<String>,

        /// Limit the search to segments before this epoch
        #[arg(long)]
        stop: Option<String>,

        /// Persist a found record with full circumstances per match
        #[arg(long)]
        save: bool,
    },

    /// Remove stored ephemeris points for an object
    Clean {
        /// Object id or designation
        target: String,

        #[arg(long)]
        start: Option<String>,

        #[arg(long)]
        stop: Option<String>,
    },

    /// Resolve an object id or designation
    Resolve {
        target: String,
    },

    /// Show saved found records for an object
    Found {
        target: String,
    },

    /// Show database row counts
    Stats,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    match cli.command {
        Commands::AddObject { designation } => add_object_command(config, designation),
        Commands::Ingest { file } => ingest_command(config, file),
        Commands::Eph {
            target,
            start,
            stop,
            step,
            source,
            samples,
            cache,
            clean,
        } => eph_command(config, target, start, stop, step, source, samples, cache, clean),
        Commands::Search {
            target,
            start,
            stop,
            save,
        } => search_command(config, target, start, stop, save),
        Commands::Clean {
            target,
            start,
            stop,
        } => clean_command(config, target, start, stop),
        Commands::Resolve { target } => resolve_command(config, target),
        Commands::Found { target } => found_command(config, target),
        Commands::Stats => stats_command(config),
    }
}

fn open(config: Config) -> Result<SbSearch, Box<dyn std::error::Error>> {
    // commands that never fetch get an empty provider
    Ok(SbSearch::new(config, Box::new(TableProvider::new()))?)
}

fn parse_target(target: &str) -> ObjectRef {
    target.parse().expect("object references parse from any string")
}

fn add_object_command(
    config: Config,
    designation: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let sbs = open(config)?;
    let objid = sbs.add_object(&designation)?;
    println!("{} registered with objid {}", designation, objid);
    Ok(())
}

fn ingest_command(config: Config, file: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(&file)?;
    let observations: Vec<Observation> = serde_json::from_str(&text)?;
    println!("Ingesting {} observations from {}", observations.len(), file.display());

    let mut sbs = open(config)?;

    let bar = ProgressBar::new(observations.len() as u64);
    bar.set_style(ProgressStyle::with_template(
        "{bar:40} {pos}/{len} ({eta})",
    )?);

    let mut total = 0;
    for chunk in observations.chunks(1000) {
        total += sbs.add_observations(chunk)?;
        bar.inc(chunk.len() as u64);
    }
    bar.finish();

    println!("Ingested {} observations", total);
    Ok(())
}

fn eph_command(
    mut config: Config,
    target: String,
    start: String,
    stop: String,
    step: Option<String>,
    source: Option<String>,
    samples: PathBuf,
    cache: bool,
    clean: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(source) = source {
        config.source = source.parse::<Source>()?;
    }

    let jd_start = sbsearch_rs::utils::parse_epoch(&start)?;
    let jd_stop = sbsearch_rs::utils::parse_epoch(&stop)?;
    let step = step.map(|s| s.parse::<Step>()).transpose()?;

    let cache_size = config.provider_cache_size;
    let provider = CachedProvider::new(TableProvider::from_file(&samples)?, cache_size);
    let mut sbs = SbSearch::new(config, Box::new(provider))?;

    let count =
        sbs.update_ephemeris(&parse_target(&target), jd_start, jd_stop, step, cache, clean)?;
    println!("Stored {} ephemeris points for {}", count, target);
    Ok(())
}

fn search_command(
    config: Config,
    target: String,
    start: Option<String>,
    stop: Option<String>,
    save: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let jd_start = parse_epoch_opt(start.as_deref())?;
    let jd_stop = parse_epoch_opt(stop.as_deref())?;

    let mut sbs = open(config)?;
    let obsids = sbs.find_observations(&parse_target(&target), jd_start, jd_stop, save)?;

    if obsids.is_empty() {
        println!("No observations of {} found", target);
        return Ok(());
    }

    println!("{} observations of {}:", obsids.len(), target);
    for obsid in obsids {
        println!("  {}", obsid);
    }
    if save {
        println!("Found records saved");
    }
    Ok(())
}

fn clean_command(
    config: Config,
    target: String,
    start: Option<String>,
    stop: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let jd_start = parse_epoch_opt(start.as_deref())?;
    let jd_stop = parse_epoch_opt(stop.as_deref())?;

    let mut sbs = open(config)?;
    let count = sbs.clean_ephemeris(&parse_target(&target), jd_start, jd_stop)?;
    println!("Removed {} ephemeris points for {}", count, target);
    Ok(())
}

fn resolve_command(config: Config, target: String) -> Result<(), Box<dyn std::error::Error>> {
    let sbs = open(config)?;
    let (objid, desg) = sbs.resolve_object(&parse_target(&target))?;
    println!("{} = objid {}", desg, objid);
    Ok(())
}

fn found_command(config: Config, target: String) -> Result<(), Box<dyn std::error::Error>> {
    let sbs = open(config)?;
    let (objid, desg) = sbs.resolve_object(&parse_target(&target))?;
    let records = sbs.db().get_found(objid)?;

    if records.is_empty() {
        println!("No found records for {}", desg);
        return Ok(());
    }

    println!("{} found records for {}:", records.len(), desg);
    for f in records {
        println!(
            "  obs {}: jd {:.5}  ra {:.4} dec {:+.4}  V {:.1}  rh {:.2} au  delta {:.2} au  phase {:.1}",
            f.obsid, f.jd, f.ra, f.dec, f.vmag, f.rh, f.delta, f.phase
        );
    }
    Ok(())
}

fn stats_command(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let sbs = open(config)?;
    let stats = sbs.db().get_stats()?;
    println!("Objects:          {}", stats.objects);
    println!("Ephemeris points: {}", stats.ephemeris_points);
    println!("Observations:     {}", stats.observations);
    println!("Found records:    {}", stats.found);
    Ok(())
}
