// src/lib.rs
//! Instrument cluster library
//!
//! A terminal instrument cluster that refreshes its widgets on fixed
//! intervals: a wall clock and live telemetry ingested from a serial NMEA
//! GPS receiver.

pub mod clock;
pub mod cluster;
pub mod config;
pub mod display;
pub mod error;
pub mod ingest;
pub mod nmea;
pub mod sched;
pub mod serial;

// Re-export main types for convenience
pub use cluster::Cluster;
pub use config::{ClusterConfig, SerialConfig};
pub use error::{ClusterError, Result};
pub use ingest::TelemetrySnapshot;
pub use sched::{PeriodicJob, Shutdown};
