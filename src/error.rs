use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Custom error type for antecflux
#[derive(Error, Debug)]
pub enum FluxError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Sensor resolution failed: {0}")]
    Resolve(#[from] ResolveError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for antecflux
pub type Result<T> = std::result::Result<T, FluxError>;

impl FluxError {
    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        FluxError::Config(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        FluxError::Other(msg.into())
    }
}

/// Failure to map a sensor descriptor onto a readable source.
///
/// Both variants are fatal for the monitoring loop: a configured sensor
/// that cannot be found is a setup error, not a transient one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("no temperature file found for sensor={kind}, label={label}")]
    NotFound { kind: String, label: String },

    #[error("no sensor directory found at {}", path.display())]
    TreeUnavailable { path: PathBuf },
}

/// Faults raised while delivering a frame to the display.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("USB device {vendor_id:04x}:{product_id:04x} not found")]
    NotFound { vendor_id: u16, product_id: u16 },

    #[error("could not find OUT endpoint")]
    EndpointMissing,

    #[error("failed to send payload: {0}")]
    WriteFailed(String),

    #[error("error communicating with USB device: {0}")]
    Other(String),
}

impl From<rusb::Error> for TransportError {
    fn from(err: rusb::Error) -> Self {
        TransportError::Other(err.to_string())
    }
}
