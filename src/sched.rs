// src/sched.rs
//! Fixed-interval background tasks gated by a shared shutdown signal

use crate::error::Result;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

/// Process-wide cancellation token.
///
/// Created once by the orchestrator and handed to every background task by
/// parameter. Transitions from active to fired exactly once and never
/// reverses; `fire` is idempotent.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self { tx: Arc::new(tx), rx }
    }

    /// Signal every task observing this token to wind down.
    pub fn fire(&self) {
        let _ = self.tx.send(true);
    }

    pub fn is_fired(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the token has fired. Completes immediately if it
    /// already has.
    pub async fn fired(&self) {
        let mut rx = self.rx.clone();
        let _ = rx.wait_for(|fired| *fired).await;
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// A unit of recurring work driven by [`spawn_periodic`].
pub trait PeriodicJob: Send + 'static {
    fn name(&self) -> &'static str;

    /// Run one tick of the job.
    ///
    /// Errors are surfaced to the log and counted, but never stop the
    /// schedule; the dashboard keeps running through a bad tick.
    fn tick(&mut self) -> impl Future<Output = Result<()>> + Send;
}

/// What a periodic task did over its lifetime, returned through the join
/// handle when the shutdown token fires.
#[derive(Debug, Clone)]
pub struct TaskReport {
    pub name: &'static str,
    pub ticks: u64,
    pub errors: u64,
}

/// Start a background task that runs `job.tick()` once per `period`.
///
/// The first tick fires after one full period, not immediately. Each cycle
/// races the interval timer against the shutdown token; shutdown wins the
/// race, so once it fires no further tick runs, including one already due
/// from the same cycle. Missed ticks are skipped, never queued. An in-flight
/// tick always runs to completion before the task observes shutdown.
pub fn spawn_periodic<J>(period: Duration, shutdown: Shutdown, mut job: J) -> JoinHandle<TaskReport>
where
    J: PeriodicJob,
{
    tokio::spawn(async move {
        let mut report = TaskReport {
            name: job.name(),
            ticks: 0,
            errors: 0,
        };

        let mut timer = time::interval_at(time::Instant::now() + period, period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.fired() => break,
                _ = timer.tick() => {
                    report.ticks += 1;
                    if let Err(e) = job.tick().await {
                        report.errors += 1;
                        log::warn!("{}: tick failed: {}", report.name, e);
                    }
                }
            }
        }

        log::debug!(
            "{}: stopped after {} ticks ({} errors)",
            report.name,
            report.ticks,
            report.errors
        );
        report
    })
}
