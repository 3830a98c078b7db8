// src/nmea.rs
//! NMEA 0183 sentence parsing
//!
//! The cluster only acts on RMC (recommended minimum) sentences; every other
//! well-formed sentence type decodes to [`Sentence::Other`] so callers can
//! skip it without treating it as a fault.

use crate::error::{ClusterError, Result};

/// Navigation fields extracted from an RMC sentence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RmcData {
    pub speed_knots: f64,
    pub latitude: f64,
    pub longitude: f64,
}

/// A decoded NMEA sentence.
#[derive(Debug, Clone, PartialEq)]
pub enum Sentence {
    Rmc(RmcData),
    /// Any other valid sentence, tagged with its three-letter type.
    Other(String),
}

/// Parse a single NMEA sentence line.
///
/// The line must start with `$` and carry a two-letter talker plus
/// three-letter type. A trailing `*hh` checksum is optional but verified
/// when present.
pub fn parse_sentence(line: &str) -> Result<Sentence> {
    let line = line.trim();
    let body = line
        .strip_prefix('$')
        .ok_or_else(|| ClusterError::Parse(format!("not an NMEA sentence: {:?}", line)))?;

    let body = match body.split_once('*') {
        Some((data, checksum)) => {
            verify_checksum(data, checksum)?;
            data
        }
        None => body,
    };

    let fields: Vec<&str> = body.split(',').collect();
    let address = fields[0];
    if address.len() != 5 || !address.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ClusterError::Parse(format!("bad sentence address: {:?}", address)));
    }

    let sentence_type = &address[2..];
    if sentence_type == "RMC" {
        parse_rmc(&fields).map(Sentence::Rmc)
    } else {
        Ok(Sentence::Other(sentence_type.to_string()))
    }
}

fn verify_checksum(data: &str, checksum: &str) -> Result<()> {
    let expected = u8::from_str_radix(checksum.trim(), 16)
        .map_err(|_| ClusterError::Parse(format!("bad checksum field: {:?}", checksum)))?;

    let actual = data.bytes().fold(0u8, |acc, b| acc ^ b);
    if actual != expected {
        return Err(ClusterError::Parse(format!(
            "checksum mismatch: computed {:02X}, sentence says {:02X}",
            actual, expected
        )));
    }
    Ok(())
}

/// Field layout: $xxRMC,time,status,lat,N/S,lon,E/W,speed,course,date,...
fn parse_rmc(fields: &[&str]) -> Result<RmcData> {
    if fields.len() < 10 {
        return Err(ClusterError::Parse(format!(
            "RMC sentence too short: {} fields",
            fields.len()
        )));
    }

    let speed_knots = fields[7]
        .parse::<f64>()
        .map_err(|_| ClusterError::Parse(format!("bad RMC speed: {:?}", fields[7])))?;
    let latitude = parse_coordinate(fields[3], fields[4], 'N', 'S')?;
    let longitude = parse_coordinate(fields[5], fields[6], 'E', 'W')?;

    Ok(RmcData {
        speed_knots,
        latitude,
        longitude,
    })
}

/// Convert an NMEA `ddmm.mmmm` coordinate and hemisphere letter into signed
/// decimal degrees.
fn parse_coordinate(value: &str, hemisphere: &str, positive: char, negative: char) -> Result<f64> {
    let raw = value
        .parse::<f64>()
        .map_err(|_| ClusterError::Parse(format!("bad coordinate: {:?}", value)))?;

    let degrees = (raw / 100.0).trunc();
    let minutes = raw - degrees * 100.0;
    let decimal = degrees + minutes / 60.0;

    match hemisphere.chars().next() {
        Some(h) if h == positive => Ok(decimal),
        Some(h) if h == negative => Ok(-decimal),
        _ => Err(ClusterError::Parse(format!(
            "bad hemisphere: {:?}",
            hemisphere
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RMC: &str = "$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A";
    const GGA: &str = "$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47";

    #[test]
    fn test_rmc_parsing() {
        let sentence = parse_sentence(RMC).unwrap();
        let Sentence::Rmc(data) = sentence else {
            panic!("expected RMC, got {:?}", sentence);
        };

        assert_eq!(data.speed_knots, 22.4);
        assert!((data.latitude - 48.1173).abs() < 0.0001);
        assert!((data.longitude - 11.5167).abs() < 0.0001);
    }

    #[test]
    fn test_non_rmc_is_other() {
        assert_eq!(
            parse_sentence(GGA).unwrap(),
            Sentence::Other("GGA".to_string())
        );
    }

    #[test]
    fn test_garbage_is_an_error() {
        assert!(parse_sentence("garbage,not,nmea").is_err());
        assert!(parse_sentence("").is_err());
        assert!(parse_sentence("$,,,").is_err());
    }

    #[test]
    fn test_checksum_mismatch_is_an_error() {
        let tampered = RMC.replace("022.4", "922.4");
        assert!(parse_sentence(&tampered).is_err());
    }

    #[test]
    fn test_southern_and_western_hemispheres_negate() {
        // Checksum omitted; it is optional on the wire.
        let line = "$GPRMC,123519,A,4807.038,S,01131.000,W,022.4,084.4,230394,003.1,W";
        let Sentence::Rmc(data) = parse_sentence(line).unwrap() else {
            panic!("expected RMC");
        };

        assert!(data.latitude < 0.0);
        assert!(data.longitude < 0.0);
        assert!((data.latitude + 48.1173).abs() < 0.0001);
        assert!((data.longitude + 11.5167).abs() < 0.0001);
    }

    #[test]
    fn test_short_rmc_is_an_error() {
        assert!(parse_sentence("$GPRMC,123519,A").is_err());
    }

    #[test]
    fn test_unparsable_rmc_fields_are_an_error() {
        let line = "$GPRMC,123519,A,xxxx.xxx,N,01131.000,E,022.4,084.4,230394,003.1,W";
        assert!(parse_sentence(line).is_err());
        let line = "$GPRMC,123519,A,4807.038,N,01131.000,E,fast,084.4,230394,003.1,W";
        assert!(parse_sentence(line).is_err());
    }
}
