// src/error.rs
//! Error types for the instrument cluster

use std::fmt;

pub type Result<T> = std::result::Result<T, ClusterError>;

#[derive(Debug)]
pub enum ClusterError {
    Io(std::io::Error),
    Serial(tokio_serial::Error),
    Connection(String),
    Parse(String),
    Config(String),
    Other(String),
}

impl fmt::Display for ClusterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClusterError::Io(e) => write!(f, "IO error: {}", e),
            ClusterError::Serial(e) => write!(f, "Serial error: {}", e),
            ClusterError::Connection(msg) => write!(f, "Connection error: {}", msg),
            ClusterError::Parse(msg) => write!(f, "Parse error: {}", msg),
            ClusterError::Config(msg) => write!(f, "Config error: {}", msg),
            ClusterError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for ClusterError {}

impl From<std::io::Error> for ClusterError {
    fn from(error: std::io::Error) -> Self {
        ClusterError::Io(error)
    }
}

impl From<tokio_serial::Error> for ClusterError {
    fn from(error: tokio_serial::Error) -> Self {
        ClusterError::Serial(error)
    }
}

impl From<serde_json::Error> for ClusterError {
    fn from(error: serde_json::Error) -> Self {
        ClusterError::Config(error.to_string())
    }
}

impl From<anyhow::Error> for ClusterError {
    fn from(error: anyhow::Error) -> Self {
        ClusterError::Other(error.to_string())
    }
}
