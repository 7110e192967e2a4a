//! Alien Invasion
//!
//! Lands N aliens on a city map and lets them wander until they have
//! destroyed each other or the move budget runs out.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use invasion_core::{ConfigError, EventLogger, SimConfig, Simulation};
use invasion_viz::{MapService, SvgRenderer};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Command line arguments for the simulation
#[derive(Parser, Debug)]
#[command(name = "alien_invasion")]
#[command(about = "Simulates an alien invasion of a city map")]
struct Args {
    /// Number of aliens to land
    num_aliens: Option<usize>,

    /// Map file
    #[arg(short = 'f', long = "file")]
    map_file: Option<PathBuf>,

    /// Milliseconds between ticks
    #[arg(short = 't', long = "tick")]
    tick_interval_ms: Option<u64>,

    /// Max number of moves
    #[arg(short = 'm', long)]
    max_moves: Option<u64>,

    /// Map service address, -1 to disable
    #[arg(short = 'a', long = "address", allow_hyphen_values = true)]
    http_address: Option<String>,

    /// Directory the final map is written to
    #[arg(short = 'o', long)]
    output_dir: Option<PathBuf>,

    /// Write every event to this JSONL file
    #[arg(long = "events")]
    events_file: Option<PathBuf>,

    /// Random seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// TOML configuration file, overridden by the flags above
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,
}

impl Args {
    fn into_config(self) -> Result<SimConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => SimConfig::from_file(path)?,
            None => SimConfig::default(),
        };
        if let Some(map_file) = self.map_file {
            config.map_file = map_file;
        }
        if let Some(ms) = self.tick_interval_ms {
            config.tick_interval_ms = ms;
        }
        if let Some(max_moves) = self.max_moves {
            config.max_moves = max_moves;
        }
        if let Some(address) = self.http_address {
            config.http_address = Some(address);
        }
        if let Some(output_dir) = self.output_dir {
            config.output_dir = output_dir;
        }
        if let Some(events_file) = self.events_file {
            config.events_file = Some(events_file);
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(num_aliens) = self.num_aliens {
            config.num_aliens = num_aliens;
        }
        config.validate()?;
        Ok(config)
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let config = match Args::parse().into_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            eprintln!("{}", Args::command().render_usage());
            return ExitCode::from(2);
        }
    };

    let events = match &config.events_file {
        Some(path) => match EventLogger::new(path) {
            Ok(logger) => Some(logger),
            Err(e) => {
                error!(path = %path.display(), error = %e, "opening event log");
                return ExitCode::FAILURE;
            }
        },
        None => None,
    };

    info!("starting invasion app");
    let address = config.http_address().map(str::to_string);
    let mut sim = match Simulation::load(config) {
        Ok(sim) => sim,
        Err(_) => return ExitCode::FAILURE,
    };
    if let Some(events) = events {
        sim = sim.with_event_logger(events);
    }

    if let Some(address) = address {
        let service = MapService::new(sim.snapshot_source(), SvgRenderer::default());
        tokio::spawn(async move {
            if let Err(e) = service.run(&address).await {
                error!(%address, error = %e, "map service stopped");
            }
        });
    }

    let summary = sim.run(ctrl_c()).await;
    if let Some(path) = &summary.map_path {
        println!("{}", path.display());
    }
    ExitCode::SUCCESS
}
