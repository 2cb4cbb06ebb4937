// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-icsim project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio::time;
use tokio_modbus::server::tcp::{accept_tcp_connection, Server};

use crate::config::Config;
use crate::modbus::ProcessModbusServer;
use crate::plant::{
    LogObserver, PointStore, ProcessModel, RandomSource, Scheduler, SchedulerStats,
};

/// How often background tasks look at the running flag.
const SHUTDOWN_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// How long the Modbus server gets to stop after being aborted.
const MODBUS_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Owns the background tasks of the simulator: the process scheduler, the
/// Modbus TCP server and the heartbeat.
pub struct Daemon {
    tasks: Vec<JoinHandle<Result<()>>>,
    running: Arc<AtomicBool>,
    store: Arc<PointStore>,
    stats: Arc<SchedulerStats>,
    modbus_addr: Option<SocketAddr>,
    started_at: DateTime<Utc>,
}

impl Default for Daemon {
    fn default() -> Self {
        Self::new()
    }
}

impl Daemon {
    /// Create a new daemon instance
    pub fn new() -> Self {
        Daemon {
            tasks: Vec::new(),
            running: Arc::new(AtomicBool::new(true)),
            store: Arc::new(PointStore::default()),
            stats: Arc::new(SchedulerStats::default()),
            modbus_addr: None,
            started_at: Utc::now(),
        }
    }

    /// Launch all configured tasks based on configuration
    ///
    /// The point store is reset to the initial image of the configuration.
    /// A random source that cannot be seeded or a Modbus address that cannot
    /// be bound aborts the launch, and the tasks already started are told to
    /// stop.
    pub async fn launch(&mut self, config: &Config) -> Result<()> {
        self.started_at = Utc::now();
        self.store.commit(config.simulation.initial_image());

        if let Err(err) = self.start_tasks(config).await {
            self.shutdown();
            return Err(err);
        }
        Ok(())
    }

    async fn start_tasks(&mut self, config: &Config) -> Result<()> {
        self.start_process_scheduler(config)?;

        if config.modbus.enabled {
            self.start_modbus_server(config).await?;
        } else {
            warn!("Modbus server disabled, the process cannot be observed or driven");
        }

        self.start_heartbeat(config.simulation.heartbeat_interval())?;

        Ok(())
    }

    /// Shared point store of the running plant.
    pub fn store(&self) -> Arc<PointStore> {
        Arc::clone(&self.store)
    }

    /// Counters of the process scheduler.
    pub fn stats(&self) -> Arc<SchedulerStats> {
        Arc::clone(&self.stats)
    }

    /// Address the Modbus server is listening on, once launched.
    pub fn modbus_addr(&self) -> Option<SocketAddr> {
        self.modbus_addr
    }

    /// Time of the last call to [`Daemon::launch`].
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Start the periodic process step
    fn start_process_scheduler(&mut self, config: &Config) -> Result<()> {
        let random = RandomSource::from_seed_option(config.simulation.seed)
            .context("Failed to initialize the process random source")?;
        match config.simulation.seed {
            Some(seed) => info!("Process random source seeded with {}", seed),
            None => debug!("Process random source seeded from the operating system"),
        }

        let scheduler = Scheduler::new(
            Arc::clone(&self.store),
            ProcessModel::new(random),
            config.simulation.tick_interval(),
        )
        .context("Failed to create the process scheduler")?
        .with_observer(LogObserver::new(config.simulation.log_process_values));
        self.stats = scheduler.stats();

        self.tasks.push(scheduler.spawn(self.running.clone()));
        Ok(())
    }

    /// Launch the modbus server daemon
    ///
    /// Binds the configured address, then spawns a task serving every
    /// connection with a [`ProcessModbusServer`] sharing the daemon's point
    /// store. The server runs until the daemon's `running` flag is cleared.
    ///
    /// # Errors
    ///
    /// This function fails if the address cannot be resolved or bound.
    async fn start_modbus_server(&mut self, config: &Config) -> Result<()> {
        info!(
            "Starting modbus server on {}:{}",
            config.modbus.address, config.modbus.port
        );

        let listener = TcpListener::bind((config.modbus.address.as_str(), config.modbus.port))
            .await
            .with_context(|| {
                format!(
                    "Failed to bind Modbus server to {}:{}",
                    config.modbus.address, config.modbus.port
                )
            })?;
        let local_addr = listener.local_addr()?;
        self.modbus_addr = Some(local_addr);

        let service =
            ProcessModbusServer::from_config(self.store(), &config.modbus, &config.identity);
        let running = self.running.clone();

        let task = tokio::spawn(async move {
            let server = Server::new(listener);

            let on_connected = move |stream, socket_addr| {
                let service = service.clone();
                async move {
                    accept_tcp_connection(stream, socket_addr, move |client_addr| {
                        info!("Modbus client connected from {}", client_addr);
                        Ok(Some(service.clone()))
                    })
                }
            };

            let on_process_error = |err| {
                error!("Modbus server error: {err}");
            };

            let server_handle = tokio::spawn(async move {
                if let Err(e) = server.serve(&on_connected, on_process_error).await {
                    error!("Modbus server error: {}", e);
                }
            });

            while running.load(Ordering::SeqCst) {
                time::sleep(SHUTDOWN_POLL_INTERVAL).await;
            }

            info!("Shutting down Modbus server...");
            server_handle.abort();

            match time::timeout(MODBUS_SHUTDOWN_TIMEOUT, server_handle).await {
                Ok(_) => info!("Modbus server shut down successfully"),
                Err(_) => warn!("Modbus server shutdown timed out, forcing termination"),
            }

            Ok(())
        });

        self.tasks.push(task);
        info!("Modbus server started on {}", local_addr);
        Ok(())
    }

    /// Start a heartbeat task that logs the plant status periodically
    fn start_heartbeat(&mut self, period: Duration) -> Result<()> {
        if period.is_zero() {
            bail!("Heartbeat interval must be greater than zero");
        }
        debug!("Starting heartbeat monitor every {:?}", period);

        let running = self.running.clone();
        let stats = self.stats();
        let store = self.store();
        let started_at = self.started_at;
        let task = tokio::spawn(async move {
            let mut next = time::Instant::now() + period;
            while running.load(Ordering::SeqCst) {
                if time::Instant::now() >= next {
                    let image = store.snapshot();
                    let uptime = Utc::now().signed_duration_since(started_at);
                    info!(
                        "Daemon heartbeat: up {}s, {} ticks, {} trips, motor {}, tank level {}",
                        uptime.num_seconds(),
                        stats.ticks(),
                        stats.trips(),
                        if image.motor_running { "running" } else { "stopped" },
                        image.tank_level
                    );
                    next += period;
                }
                time::sleep(SHUTDOWN_POLL_INTERVAL.min(period)).await;
            }
            Ok(())
        });

        self.tasks.push(task);
        Ok(())
    }

    /// Stop all running tasks
    pub fn shutdown(&self) {
        info!("Shutting down daemon tasks");
        self.running.store(false, Ordering::SeqCst);
        // Tasks should check the running flag and terminate gracefully
    }

    /// Wait for all tasks to complete
    ///
    /// Every task is awaited. The first error returned by a task, or the first
    /// panic, is reported once all of them are done.
    pub async fn join(self) -> Result<()> {
        let mut first_error = None;
        for task in self.tasks {
            match task.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    error!("Task failed: {:#}", e);
                    first_error.get_or_insert(e);
                }
                Err(e) => {
                    error!("Task panicked: {}", e);
                    first_error
                        .get_or_insert(anyhow::Error::new(e).context("Daemon task panicked"));
                }
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
