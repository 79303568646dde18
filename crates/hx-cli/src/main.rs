//! heat-exposure — compute per-agent heat exposure from a simulator event log.
//!
//! Loads the network, temperature profiles and routes named in a TOML config,
//! streams the event log through the processor once, and publishes the
//! agents / activities / legs / segments tables to SQLite or CSV.  Nothing is
//! published unless the whole run succeeds.
//!
//! ```text
//! RUST_LOG=info heat-exposure --config run.toml
//! heat-exposure --config run.toml --events other_events.csv --dry-run
//! ```

mod config;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};

use hx_engine::{EventProcessor, LogObserver, MemorySink, RunSummary};
use hx_events::EventReader;
use hx_output::{CsvStore, ExportStore, Exporter, SqliteStore};
use hx_spatial::{NetworkFiles, RouteTable, load_network_csv, load_routes_csv};

use config::{AppConfig, Backend, ExportConfig};

// ── Command line ──────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "heat-exposure")]
#[command(about = "Integrate ambient and in-vehicle temperature over each agent's itinerary")]
struct Cli {
    /// Run configuration (TOML)
    #[arg(long, short)]
    config: PathBuf,

    /// Event log, overriding `inputs.events`
    #[arg(long)]
    events: Option<PathBuf>,

    /// Export destination, overriding `export.path`
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Export backend, overriding `export.backend`
    #[arg(long, value_enum)]
    backend: Option<Backend>,

    /// Process the log without exporting anything
    #[arg(long)]
    dry_run: bool,

    /// Log progress every N events (0 = never)
    #[arg(long, default_value = "1000000")]
    progress: u64,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut config = AppConfig::load(&cli.config)?;
    if let Some(events) = cli.events {
        config.inputs.events = events;
    }
    if let Some(output) = cli.output {
        config.export.path = output;
    }
    if let Some(backend) = cli.backend {
        config.export.backend = backend;
    }

    run(config, cli.dry_run, cli.progress)
}

// ── Run ───────────────────────────────────────────────────────────────────────

fn run(config: AppConfig, dry_run: bool, progress: u64) -> Result<()> {
    let started = Instant::now();

    let network = load_network_csv(
        &NetworkFiles {
            nodes:        &config.network.nodes,
            links:        &config.network.links,
            centroids:    &config.network.centroids,
            temperatures: &config.network.temperatures,
        },
        config.network.max_profile_distance,
    )
    .context("loading network")?;

    let routes = match &config.inputs.routes {
        Some(path) => load_routes_csv(path, &network)
            .with_context(|| format!("loading routes from {}", path.display()))?,
        None => {
            warn!("no route table configured; every un-simulated leg uses the ambient fallback");
            RouteTable::new()
        }
    };
    info!(
        "loaded {} links, {} profiles, {} routes in {:.2?}",
        network.link_count(),
        network.profile_count(),
        routes.len(),
        started.elapsed()
    );

    let processor = hx_engine::ProcessorBuilder::new(config.engine, &network)
        .routes(&routes)
        .build()?;
    let events = EventReader::from_path(&config.inputs.events)
        .with_context(|| format!("opening event log {}", config.inputs.events.display()))?;
    let mut observer = LogObserver::new(progress);

    let summary = if dry_run {
        let mut sink = MemorySink::new();
        let summary = processor.run(events, &mut sink, &mut observer)?;
        info!("dry run: nothing exported");
        summary
    } else {
        let export = &config.export;
        match export.backend {
            Backend::Sqlite => export_run(processor, events, SqliteStore::open(&export.path)?, export, &mut observer)?,
            Backend::Csv => export_run(processor, events, CsvStore::new(&export.path)?, export, &mut observer)?,
        }
    };

    info!(
        "{} agents ({} aborted), {} route misses, {} rows in {:.2?}",
        summary.agents,
        summary.aborted,
        summary.route_misses,
        summary.rows.total(),
        started.elapsed()
    );
    Ok(())
}

/// Run the processor into staging and publish only on success.
fn export_run<S, I>(
    processor: EventProcessor<'_>,
    events: I,
    store: S,
    export: &ExportConfig,
    observer: &mut LogObserver,
) -> Result<RunSummary>
where
    S: ExportStore,
    I: IntoIterator<Item = hx_events::EventResult<hx_events::Event>>,
{
    let mut exporter = Exporter::begin(store, export.batch_rows)?;
    if let Some(agents) = export.expected_agents {
        exporter.expect_agents(agents);
    }

    match processor.run(events, &mut exporter, observer) {
        Ok(summary) => {
            exporter.commit(summary.rows)?;
            info!("exported to {}", export.path.display());
            Ok(summary)
        }
        Err(e) => {
            if let Err(cleanup) = exporter.discard() {
                warn!("could not discard staging: {cleanup}");
            }
            Err(e.into())
        }
    }
}
