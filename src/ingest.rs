// src/ingest.rs
//! Telemetry ingestion: drain serial lines, keep the latest RMC fix

use crate::display::{DisplaySink, Style};
use crate::error::Result;
use crate::nmea::{self, RmcData, Sentence};
use crate::sched::PeriodicJob;
use crate::serial::LineSource;
use crossterm::style::Color;
use tokio::io::AsyncRead;

/// The most recent successfully parsed RMC fix. Overwritten in place; no
/// history is kept.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetrySnapshot {
    pub speed_knots: f64,
    pub latitude: f64,
    pub longitude: f64,
}

impl From<RmcData> for TelemetrySnapshot {
    fn from(data: RmcData) -> Self {
        Self {
            speed_knots: data.speed_knots,
            latitude: data.latitude,
            longitude: data.longitude,
        }
    }
}

/// Speedometer readout: whole knots.
pub fn format_speed(speed_knots: f64) -> String {
    format!("{:.0}", speed_knots)
}

/// Position detail: speed to two decimals, coordinates to four.
pub fn format_position(snapshot: &TelemetrySnapshot) -> String {
    format!(
        "Speed: {:.2} kn\nLat:   {:.4}\nLong:  {:.4}",
        snapshot.speed_knots, snapshot.latitude, snapshot.longitude
    )
}

/// Periodic job that pumps the serial line source into the display sinks.
///
/// Owns the line source exclusively; nothing else reads the device.
pub struct TelemetryJob<R, S> {
    source: LineSource<R>,
    speed_sink: S,
    position_sink: S,
    last: Option<TelemetrySnapshot>,
}

impl<R, S> TelemetryJob<R, S>
where
    R: AsyncRead + Unpin + Send + 'static,
    S: DisplaySink + 'static,
{
    pub fn new(source: LineSource<R>, speed_sink: S, position_sink: S) -> Self {
        Self {
            source,
            speed_sink,
            position_sink,
            last: None,
        }
    }

    pub fn last(&self) -> Option<&TelemetrySnapshot> {
        self.last.as_ref()
    }

    /// Drain currently available lines, bounded to one display update.
    ///
    /// Non-RMC sentences are skipped within the same call; the first RMC
    /// updates both sinks and ends the drain, so the display refreshes at
    /// most once per tick no matter how many fixes are buffered. A parse
    /// failure aborts this pump with the error; the source stays open and
    /// the next tick pumps afresh. Running out of lines is not an error.
    pub async fn pump(&mut self) -> Result<bool> {
        while let Some(line) = self.source.next_line().await? {
            match nmea::parse_sentence(&line)? {
                Sentence::Rmc(data) => {
                    let snapshot = TelemetrySnapshot::from(data);
                    self.speed_sink
                        .write(&format_speed(snapshot.speed_knots), Style::fg(Color::Green))?;
                    self.position_sink.reset();
                    self.position_sink
                        .write(&format_position(&snapshot), Style::default())?;
                    self.last = Some(snapshot);
                    return Ok(true);
                }
                Sentence::Other(kind) => {
                    log::trace!("skipping {} sentence", kind);
                }
            }
        }
        Ok(false)
    }
}

impl<R, S> PeriodicJob for TelemetryJob<R, S>
where
    R: AsyncRead + Unpin + Send + 'static,
    S: DisplaySink + 'static,
{
    fn name(&self) -> &'static str {
        "telemetry"
    }

    async fn tick(&mut self) -> Result<()> {
        self.pump().await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    const RMC: &str = "$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A";
    const GGA: &str = "$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47";

    #[derive(Clone, Default)]
    struct RecordingSink {
        writes: Arc<Mutex<Vec<(String, Style)>>>,
        resets: Arc<Mutex<usize>>,
    }

    impl RecordingSink {
        fn writes(&self) -> Vec<(String, Style)> {
            self.writes.lock().unwrap().clone()
        }

        fn resets(&self) -> usize {
            *self.resets.lock().unwrap()
        }
    }

    impl DisplaySink for RecordingSink {
        fn reset(&mut self) {
            *self.resets.lock().unwrap() += 1;
        }

        fn write(&mut self, content: &str, style: Style) -> Result<()> {
            self.writes.lock().unwrap().push((content.to_string(), style));
            Ok(())
        }
    }

    fn job_over(
        feed: String,
    ) -> (
        TelemetryJob<std::io::Cursor<Vec<u8>>, RecordingSink>,
        RecordingSink,
        RecordingSink,
    ) {
        let source = LineSource::new(
            std::io::Cursor::new(feed.into_bytes()),
            4,
            Duration::from_millis(250),
        );
        let speed = RecordingSink::default();
        let position = RecordingSink::default();
        let job = TelemetryJob::new(source, speed.clone(), position.clone());
        (job, speed, position)
    }

    #[tokio::test]
    async fn test_rmc_after_gga_updates_once() {
        let (mut job, speed, position) = job_over(format!("{}\r\n{}\r\n", GGA, RMC));

        assert!(job.pump().await.unwrap());

        let speed_writes = speed.writes();
        assert_eq!(speed_writes.len(), 1);
        assert_eq!(speed_writes[0].0, "22");
        assert_eq!(speed_writes[0].1.fg, Some(Color::Green));

        assert_eq!(position.resets(), 1);
        let position_writes = position.writes();
        assert_eq!(position_writes.len(), 1);
        assert!(position_writes[0].0.contains("22.40"));
        assert!(position_writes[0].0.contains("48.1173"));
        assert!(position_writes[0].0.contains("11.5167"));

        let snapshot = job.last().unwrap();
        assert_eq!(snapshot.speed_knots, 22.4);
        assert!((snapshot.latitude - 48.1173).abs() < 0.0001);
        assert!((snapshot.longitude - 11.5167).abs() < 0.0001);
    }

    #[tokio::test]
    async fn test_garbage_aborts_the_pump_without_updates() {
        let (mut job, speed, position) = job_over("garbage,not,nmea\r\n".to_string());

        assert!(job.pump().await.is_err());
        assert!(speed.writes().is_empty());
        assert!(position.writes().is_empty());
        assert_eq!(position.resets(), 0);
        assert!(job.last().is_none());
    }

    #[tokio::test]
    async fn test_empty_feed_is_no_update_no_error() {
        let (mut job, speed, position) = job_over(String::new());

        assert!(!job.pump().await.unwrap());
        assert!(speed.writes().is_empty());
        assert!(position.writes().is_empty());
    }

    #[tokio::test]
    async fn test_at_most_one_update_per_pump() {
        let (mut job, speed, _position) = job_over(format!("{}\r\n{}\r\n", RMC, RMC));

        assert!(job.pump().await.unwrap());
        assert_eq!(speed.writes().len(), 1);

        // The second buffered fix belongs to the next tick.
        assert!(job.pump().await.unwrap());
        assert_eq!(speed.writes().len(), 2);

        assert!(!job.pump().await.unwrap());
        assert_eq!(speed.writes().len(), 2);
    }

    #[tokio::test]
    async fn test_non_rmc_sentences_are_drained_silently() {
        let (mut job, speed, position) = job_over(format!("{}\r\n{}\r\n", GGA, GGA));

        assert!(!job.pump().await.unwrap());
        assert!(speed.writes().is_empty());
        assert!(position.writes().is_empty());
    }

    #[test]
    fn test_speed_is_rounded_to_whole_knots() {
        assert_eq!(format_speed(22.4), "22");
        assert_eq!(format_speed(22.5), "22");
        assert_eq!(format_speed(0.0), "0");
        assert_eq!(format_speed(99.9), "100");
    }
}
