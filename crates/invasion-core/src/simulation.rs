//! Simulation Engine
//!
//! Drives an invasion through `Loading -> Seeding -> Running -> Terminating
//! -> Stopped`. One tick moves every alien, then resolves fights, with the
//! store's write lock held for the whole tick.

use std::future::Future;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{Local, SecondsFormat};
use invasion_events::{EventKind, StopReason};
use invasion_viz::SnapshotSource;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::config::SimConfig;
use crate::error::WorldError;
use crate::events::{EventLogger, PendingEvents};
use crate::setup::land_aliens;
use crate::systems::{move_aliens, resolve_fights};
use crate::world::{InMemoryWorld, SharedWorld, WorldStore};

/// Engine lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Seeding,
    Running,
    Terminating,
    Stopped,
}

/// What one tick did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    pub tick: u64,
    pub moved: usize,
    pub stayed: usize,
    pub failed: usize,
    /// Names of cities destroyed this tick
    pub destroyed: Vec<String>,
    pub aliens_remaining: usize,
}

/// Outcome of a whole run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub aliens_remaining: usize,
    pub cities_remaining: usize,
    /// Final map file, if it was written
    pub map_path: Option<PathBuf>,
    pub reason: StopReason,
}

pub struct Simulation<W: WorldStore> {
    world: SharedWorld<W>,
    config: SimConfig,
    rng: SmallRng,
    phase: Phase,
    tick: u64,
    published_tick: Arc<AtomicU64>,
    events: EventLogger,
    pending: PendingEvents,
    stop_reason: Option<StopReason>,
}

impl Simulation<InMemoryWorld> {
    /// Loads `config.map_file` and builds an engine ready for seeding.
    ///
    /// The random source is seeded from `config.seed`, or from entropy.
    pub fn load(config: SimConfig) -> Result<Self, WorldError> {
        info!(map = %config.map_file.display(), "loading map");
        let world = match InMemoryWorld::from_file(&config.map_file) {
            Ok(world) => world,
            Err(e) => {
                error!(map = %config.map_file.display(), error = %e, "error loading map");
                return Err(e);
            }
        };
        info!(
            cities = world.num_cities(),
            width = world.width(),
            height = world.height(),
            "map loaded"
        );

        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Ok(Self::new(SharedWorld::new(world), config, rng))
    }
}

impl<W: WorldStore> Simulation<W> {
    /// Engine over an already loaded world.
    pub fn new(world: SharedWorld<W>, config: SimConfig, rng: SmallRng) -> Self {
        Self {
            world,
            config,
            rng,
            phase: Phase::Seeding,
            tick: 0,
            published_tick: Arc::new(AtomicU64::new(0)),
            events: EventLogger::null(),
            pending: PendingEvents::new(),
            stop_reason: None,
        }
    }

    pub fn with_event_logger(mut self, events: EventLogger) -> Self {
        self.events = events;
        self
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn world(&self) -> &SharedWorld<W> {
        &self.world
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Snapshots of the live world, stamped with the last finished tick.
    pub fn snapshot_source(&self) -> SnapshotSource {
        let world = self.world.clone();
        let tick = Arc::clone(&self.published_tick);
        Arc::new(move || {
            let world = world.read();
            world.snapshot(tick.load(Ordering::Relaxed))
        })
    }

    /// Lands `config.num_aliens` aliens and enters Running, even if none
    /// could be placed. Returns how many landed.
    pub fn seed_aliens(&mut self) -> usize {
        if self.phase != Phase::Seeding {
            warn!(phase = ?self.phase, "seeding outside the seeding phase");
            return 0;
        }

        let landed = {
            let mut world = self.world.write();
            let landed = land_aliens(&mut *world, self.config.num_aliens, &mut self.rng);
            for alien in &landed {
                let city = world
                    .city(alien.city)
                    .map(|c| c.name.clone())
                    .unwrap_or_default();
                self.pending.push(EventKind::Landing {
                    alien: alien.to_ref(),
                    city_id: alien.city,
                    city,
                });
            }
            landed.len()
        };
        self.flush_pending();

        info!(landed, requested = self.config.num_aliens, "invasion started");
        self.phase = Phase::Running;
        landed
    }

    /// Runs one tick. Returns `None` unless the engine is Running.
    ///
    /// Moves to Terminating once the tick count exceeds `max_moves` or no
    /// alien is left.
    pub fn step(&mut self) -> Option<TickReport> {
        if self.phase != Phase::Running {
            return None;
        }
        self.tick += 1;

        let report = {
            let mut world = self.world.write();
            let moves = move_aliens(&mut *world, &mut self.rng, &mut self.pending);
            let destroyed = resolve_fights(&mut *world, &mut self.pending);
            let report = TickReport {
                tick: self.tick,
                moved: moves.moved,
                stayed: moves.stayed,
                failed: moves.failed,
                destroyed: destroyed.into_iter().map(|r| r.city.name).collect(),
                aliens_remaining: world.aliens().len(),
            };
            // stamped under the write lock
            self.published_tick.store(self.tick, Ordering::Relaxed);
            report
        };
        self.flush_pending();

        debug!(
            tick = report.tick,
            moved = report.moved,
            stayed = report.stayed,
            failed = report.failed,
            fights = report.destroyed.len(),
            aliens = report.aliens_remaining,
            "tick"
        );

        if self.tick > self.config.max_moves {
            self.stop(StopReason::MaxMoves);
        } else if report.aliens_remaining == 0 {
            self.stop(StopReason::NoAliensLeft);
        }
        Some(report)
    }

    /// Stops scheduling ticks; the map is still written by `finish`.
    pub fn request_shutdown(&mut self) {
        if matches!(self.phase, Phase::Seeding | Phase::Running) {
            info!(tick = self.tick, "shutdown requested");
            self.stop(StopReason::Shutdown);
        }
    }

    /// Writes the final map and stops. Safe to call more than once; only the
    /// first call persists.
    pub fn finish(&mut self) -> RunSummary {
        if matches!(self.phase, Phase::Seeding | Phase::Running) {
            self.stop(StopReason::Shutdown);
        }
        let reason = self.stop_reason.unwrap_or(StopReason::Shutdown);

        let (aliens_remaining, cities_remaining) = {
            let world = self.world.read();
            (world.aliens().len(), world.num_cities())
        };

        let mut map_path = None;
        if self.phase == Phase::Terminating {
            let path = self.final_map_path();
            match self.world.read().save(&path) {
                Ok(()) => {
                    info!(path = %path.display(), "final map written");
                    map_path = Some(path);
                }
                Err(e) => error!(path = %path.display(), error = %e, "writing final map"),
            }

            self.pending.push(EventKind::End {
                reason,
                aliens_remaining,
                cities_remaining,
            });
            self.flush_pending();
            if let Err(e) = self.events.flush() {
                warn!(error = %e, "flushing event log");
            }
            self.phase = Phase::Stopped;
        }

        info!(
            ticks = self.tick,
            aliens = aliens_remaining,
            cities = cities_remaining,
            %reason,
            "invasion over"
        );
        RunSummary {
            ticks: self.tick,
            aliens_remaining,
            cities_remaining,
            map_path,
            reason,
        }
    }

    /// Seeds if needed, ticks every `tick_interval` until termination or
    /// until `shutdown` resolves, then finishes.
    ///
    /// The first tick fires one interval after start. A tick in progress
    /// always completes before shutdown is observed.
    pub async fn run<F>(mut self, shutdown: F) -> RunSummary
    where
        F: Future<Output = ()>,
    {
        if self.phase == Phase::Seeding {
            self.seed_aliens();
        }

        let period = self.config.tick_interval();
        let mut interval = time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        while self.phase == Phase::Running {
            tokio::select! {
                _ = &mut shutdown => self.request_shutdown(),
                _ = interval.tick() => {
                    self.step();
                }
            }
        }
        self.finish()
    }

    fn stop(&mut self, reason: StopReason) {
        self.stop_reason = Some(reason);
        self.phase = Phase::Terminating;
    }

    /// `<RFC3339 local time>.map` inside `output_dir`
    fn final_map_path(&self) -> PathBuf {
        let stamp = Local::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        self.config.output_dir.join(format!("{stamp}.map"))
    }

    fn flush_pending(&mut self) {
        for kind in self.pending.drain() {
            if let Err(e) = self.events.record(self.tick, kind) {
                warn!(error = %e, "writing event log");
            }
        }
    }
}
