// src/cluster.rs
//! Top-level wiring: device, display regions, periodic tasks, quit handling

use crate::clock::ClockJob;
use crate::config::ClusterConfig;
use crate::display::terminal::TerminalUi;
use crate::error::Result;
use crate::ingest::TelemetryJob;
use crate::sched::{spawn_periodic, Shutdown, TaskReport};
use crate::serial::{self, LineSource};
use crossterm::event::{self, Event, KeyCode, KeyModifiers};
use std::time::Duration;
use tokio::task::JoinHandle;

pub struct Cluster {
    config: ClusterConfig,
}

impl Cluster {
    pub fn new(config: ClusterConfig) -> Self {
        Self { config }
    }

    /// Run the cluster until the quit signal fires.
    ///
    /// The serial device is opened before any terminal setup: without it the
    /// process has nothing to show, so an open failure propagates out with a
    /// plain diagnostic instead of flashing a UI first. Every resource here
    /// is scoped; the terminal and the device are released however this
    /// function exits.
    pub async fn run(&self) -> Result<()> {
        let port = serial::open_port(&self.config.serial)?;
        let source = LineSource::from_config(port, &self.config.serial);

        let ui = TerminalUi::init()?;
        let shutdown = Shutdown::new();

        let telemetry = TelemetryJob::new(source, ui.speed_region(), ui.position_region());
        let telemetry_handle = spawn_periodic(
            self.config.telemetry_interval(),
            shutdown.clone(),
            telemetry,
        );

        let clock = ClockJob::new(ui.clock_region());
        let clock_handle =
            spawn_periodic(self.config.clock_interval(), shutdown.clone(), clock);

        spawn_quit_watchers(shutdown.clone());

        shutdown.fired().await;
        join_task(telemetry_handle).await;
        join_task(clock_handle).await;

        drop(ui);
        Ok(())
    }
}

async fn join_task(handle: JoinHandle<TaskReport>) {
    match handle.await {
        Ok(report) => log::info!(
            "{}: {} ticks, {} errors",
            report.name,
            report.ticks,
            report.errors
        ),
        Err(e) => log::error!("task panicked: {}", e),
    }
}

/// Watch for the quit keypress and Ctrl-C, firing the shared shutdown token.
fn spawn_quit_watchers(shutdown: Shutdown) {
    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal_shutdown.fire();
        }
    });

    // Keyboard polling is blocking crossterm; park it on a blocking thread
    // with a short poll so it also notices a shutdown fired elsewhere.
    tokio::task::spawn_blocking(move || {
        while !shutdown.is_fired() {
            match event::poll(Duration::from_millis(100)) {
                Ok(true) => {
                    if let Ok(Event::Key(key)) = event::read() {
                        let quit = matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q'))
                            || (key.code == KeyCode::Char('c')
                                && key.modifiers.contains(KeyModifiers::CONTROL));
                        if quit {
                            shutdown.fire();
                            break;
                        }
                    }
                }
                Ok(false) => {}
                Err(_) => break,
            }
        }
    });
}
