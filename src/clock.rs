// src/clock.rs
//! Wall clock widget job

use crate::display::{DisplaySink, Style};
use crate::error::Result;
use crate::sched::PeriodicJob;
use chrono::{DateTime, Local};
use crossterm::style::Color;

pub fn clock_text(now: DateTime<Local>) -> String {
    now.format("%H:%M:%S").to_string()
}

/// Once a second, clear the clock region and write the current local time.
pub struct ClockJob<S> {
    sink: S,
}

impl<S: DisplaySink + 'static> ClockJob<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }
}

impl<S: DisplaySink + 'static> PeriodicJob for ClockJob<S> {
    fn name(&self) -> &'static str {
        "clock"
    }

    async fn tick(&mut self) -> Result<()> {
        // The sink is a persistent surface, so stale digits must be cleared
        // before the new time lands.
        self.sink.reset();
        self.sink
            .write(&clock_text(Local::now()), Style::fg_bg(Color::Red, Color::Cyan))
    }
}
