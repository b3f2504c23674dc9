// antecflux Library - Public API

// Re-export error types
pub mod error;
pub use error::{FluxError, ResolveError, Result, TransportError};

// Module declarations
pub mod cli;
pub mod commands;
pub mod core;
pub mod logging;
pub mod platform;
pub mod ui;

// Re-export commonly used types
pub use crate::core::{Frame, Monitor, SensorConfig, SensorDescriptor, SensorResolver};

