use std::fs;
use std::io;
use std::path::Path;

use super::ResolvedSource;
use crate::core::observer::{Level, SharedObserver};
use crate::error::{FluxError, Result};

/// Value returned when a source cannot be read.
pub const FALLBACK_TEMPERATURE: f64 = 0.0;

/// Reads temperatures from resolved sources.
///
/// Never fails: the display expects a frame every cycle, so a broken source
/// degrades to [`FALLBACK_TEMPERATURE`] and the fault goes to the observer.
pub struct TemperatureReader {
    observer: SharedObserver,
}

impl TemperatureReader {
    pub fn new(observer: SharedObserver) -> Self {
        Self { observer }
    }

    pub fn read(&self, source: &ResolvedSource) -> f64 {
        let path = source.path();
        match read_celsius(path) {
            Ok(temp) => {
                self.observer.observe(
                    Level::Debug,
                    &format!("Read temperature from {}: {}°C", path.display(), temp),
                    &[],
                );
                temp
            }
            Err(FluxError::Io(err)) if err.kind() == io::ErrorKind::NotFound => {
                self.observer.observe(
                    Level::Error,
                    &format!("Temperature source not found at {}!", path.display()),
                    &[("path", path.display().to_string())],
                );
                FALLBACK_TEMPERATURE
            }
            Err(err) => {
                self.observer.observe(
                    Level::Error,
                    &format!("Error reading temperature from {}: {}", path.display(), err),
                    &[("path", path.display().to_string())],
                );
                FALLBACK_TEMPERATURE
            }
        }
    }
}

/// Read a millidegree value file and convert it to °C.
pub fn read_celsius(path: &Path) -> Result<f64> {
    let raw = fs::read_to_string(path)?;
    parse_millidegrees(&raw)
}

pub(crate) fn parse_millidegrees(raw: &str) -> Result<f64> {
    let trimmed = raw.trim();
    let millis: f64 = trimmed
        .parse()
        .map_err(|_| FluxError::other(format!("invalid temperature value '{}'", trimmed)))?;
    if !millis.is_finite() {
        return Err(FluxError::other(format!(
            "invalid temperature value '{}'",
            trimmed
        )));
    }
    Ok(millis / 1000.0)
}
