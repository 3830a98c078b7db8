// src/serial.rs
//! Serial device access and line-oriented scanning

use crate::config::SerialConfig;
use crate::error::{ClusterError, Result};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::time;
use tokio_serial::{Parity, SerialPortBuilderExt, SerialStream};

/// Smallest chunk we ask the device for in one read.
const MIN_READ_CHUNK: usize = 64;

/// Open the telemetry receiver with the configured framing.
///
/// Failure here is fatal to the process: the cluster is useless without its
/// telemetry device, so the caller reports the diagnostic and exits instead
/// of retrying.
pub fn open_port(config: &SerialConfig) -> Result<SerialStream> {
    let stream = tokio_serial::new(&config.port, config.baud_rate)
        .data_bits(config.data_bits()?)
        .stop_bits(config.stop_bits()?)
        .parity(Parity::None)
        .timeout(config.read_timeout())
        .open_native_async()
        .map_err(|e| {
            ClusterError::Connection(format!("failed to open serial port {}: {}", config.port, e))
        })?;

    log::info!("opened {} at {} baud", config.port, config.baud_rate);
    Ok(stream)
}

/// List serial ports visible on this machine.
pub fn list_ports() -> Result<()> {
    let ports = tokio_serial::available_ports()
        .map_err(|e| ClusterError::Other(format!("failed to list serial ports: {}", e)))?;

    if ports.is_empty() {
        println!("No serial ports found.");
    } else {
        println!("Available serial ports:");
        for port in ports {
            println!("  {} - {:?}", port.port_name, port.port_type);
        }
    }

    Ok(())
}

/// Buffered line scanner over a byte stream.
///
/// Bytes accumulate in an internal buffer with a resumable scan position;
/// a partial line at the end of the stream stays buffered until more bytes
/// arrive. The scanner owns the underlying stream, so dropping it on any
/// exit path closes the device exactly once.
pub struct LineSource<R> {
    reader: R,
    buf: Vec<u8>,
    scan: usize,
    min_read: usize,
    read_timeout: Duration,
}

impl<R: AsyncRead + Unpin> LineSource<R> {
    pub fn new(reader: R, min_read: usize, read_timeout: Duration) -> Self {
        Self {
            reader,
            buf: Vec::with_capacity(min_read.max(MIN_READ_CHUNK)),
            scan: 0,
            min_read,
            read_timeout,
        }
    }

    pub fn from_config(reader: R, config: &SerialConfig) -> Self {
        Self::new(reader, config.min_read_size, config.read_timeout())
    }

    /// Return the next complete line, with CR/LF stripped and empty lines
    /// skipped.
    ///
    /// `Ok(None)` means no data: the stream hit end-of-input, or no full
    /// line arrived before the read timeout. Neither is an error, and the
    /// call never blocks past the timeout, so a fired shutdown is always
    /// observed promptly by the caller's loop.
    pub async fn next_line(&mut self) -> Result<Option<String>> {
        loop {
            while let Some(rel) = self.buf[self.scan..].iter().position(|&b| b == b'\n') {
                let end = self.scan + rel;
                let raw: Vec<u8> = self.buf.drain(..=end).collect();
                self.scan = 0;

                let mut line = &raw[..raw.len() - 1];
                if line.last() == Some(&b'\r') {
                    line = &line[..line.len() - 1];
                }
                if line.is_empty() {
                    continue;
                }
                return Ok(Some(String::from_utf8_lossy(line).into_owned()));
            }

            // No terminator in the buffer; remember where scanning stopped
            // and pull more bytes from the device.
            self.scan = self.buf.len();
            self.buf.reserve(self.min_read.max(MIN_READ_CHUNK));
            match time::timeout(self.read_timeout, self.reader.read_buf(&mut self.buf)).await {
                Err(_) => return Ok(None),
                Ok(Ok(0)) => return Ok(None),
                Ok(Ok(_)) => {}
                Ok(Err(e)) => return Err(e.into()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    fn source_over(bytes: &'static [u8]) -> LineSource<&'static [u8]> {
        LineSource::new(bytes, 4, Duration::from_millis(250))
    }

    #[tokio::test]
    async fn test_lines_are_split_and_trimmed() {
        let mut source = source_over(b"$GPGGA,1\r\n$GPRMC,2\n");
        assert_eq!(source.next_line().await.unwrap().as_deref(), Some("$GPGGA,1"));
        assert_eq!(source.next_line().await.unwrap().as_deref(), Some("$GPRMC,2"));
        assert_eq!(source.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_empty_input_is_end_of_stream() {
        let mut source = source_over(b"");
        assert_eq!(source.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_blank_lines_are_skipped() {
        let mut source = source_over(b"\r\n\n$GPGGA,1\r\n");
        assert_eq!(source.next_line().await.unwrap().as_deref(), Some("$GPGGA,1"));
        assert_eq!(source.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_trailing_partial_line_is_not_returned() {
        let mut source = source_over(b"$GPGGA,1\n$GPRMC,half");
        assert_eq!(source.next_line().await.unwrap().as_deref(), Some("$GPGGA,1"));
        assert_eq!(source.next_line().await.unwrap(), None);
        // Still buffered, still no terminator.
        assert_eq!(source.next_line().await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_partial_line_resumes_across_reads() {
        let (mut tx, rx) = tokio::io::duplex(64);
        let mut source = LineSource::new(rx, 4, Duration::from_millis(250));

        tx.write_all(b"$GP").await.unwrap();
        assert_eq!(source.next_line().await.unwrap(), None);

        tx.write_all(b"RMC,rest\r\n").await.unwrap();
        assert_eq!(
            source.next_line().await.unwrap().as_deref(),
            Some("$GPRMC,rest")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_silent_device_times_out_as_no_data() {
        let (mut tx, rx) = tokio::io::duplex(64);
        let mut source = LineSource::new(rx, 4, Duration::from_millis(250));

        // Writer alive but silent: the read deadline turns this into a
        // clean "no data" instead of an indefinite block.
        assert_eq!(source.next_line().await.unwrap(), None);

        tx.write_all(b"$GPGGA,later\n").await.unwrap();
        assert_eq!(
            source.next_line().await.unwrap().as_deref(),
            Some("$GPGGA,later")
        );
    }
}
