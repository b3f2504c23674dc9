//! Sensor configuration file.
//!
//! ```ini
//! [cpu]
//! sensor = asusec
//! name = CPU
//!
//! [gpu]
//! sensor = amdgpu
//! name = edge
//! ```

use ini::{EscapePolicy, Ini, ParseOption};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::sensors::SensorDescriptor;
use crate::error::{FluxError, Result};

pub const DEFAULT_CONFIG_PATH: &str = "/etc/antec/sensors.conf";

const SENSOR_KEY: &str = "sensor";
const NAME_KEY: &str = "name";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorConfig {
    pub cpu: SensorDescriptor,
    pub gpu: SensorDescriptor,
}

impl SensorConfig {
    pub fn new(cpu: SensorDescriptor, gpu: SensorDescriptor) -> Self {
        Self { cpu, gpu }
    }

    pub fn default_path() -> PathBuf {
        PathBuf::from(DEFAULT_CONFIG_PATH)
    }

    /// Load the configuration.
    ///
    /// `Ok(None)` means there is no file; a file that exists but cannot be
    /// used is an error.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(path)?;
        Self::parse(&contents).map(Some)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        // values are taken literally: no escapes, quotes stay part of the value
        let options = ParseOption {
            enabled_escape: false,
            enabled_quote: false,
            ..Default::default()
        };
        let ini = Ini::load_from_str_opt(contents, options)
            .map_err(|e| FluxError::config(format!("Error reading config file: {}", e)))?;

        if ini.section(Some("cpu")).is_none() || ini.section(Some("gpu")).is_none() {
            return Err(FluxError::config(
                "Config file does not contain required cpu and gpu sections",
            ));
        }

        Ok(Self {
            cpu: descriptor(&ini, "cpu")?,
            gpu: descriptor(&ini, "gpu")?,
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut ini = Ini::new();
        ini.with_section(Some("cpu"))
            .set(SENSOR_KEY, self.cpu.kind.as_str())
            .set(NAME_KEY, self.cpu.label.as_str());
        ini.with_section(Some("gpu"))
            .set(SENSOR_KEY, self.gpu.kind.as_str())
            .set(NAME_KEY, self.gpu.label.as_str());

        ini.write_to_file_policy(path, EscapePolicy::Nothing)?;
        Ok(())
    }
}

fn descriptor(ini: &Ini, section: &str) -> Result<SensorDescriptor> {
    let props = ini
        .section(Some(section))
        .ok_or_else(|| FluxError::config(format!("missing [{}] section", section)))?;

    // keys are case-insensitive, section names are not
    let value = |key: &str| {
        props
            .iter()
            .filter(|(k, _)| k.trim().eq_ignore_ascii_case(key))
            .map(|(_, v)| v.trim())
            .last()
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .ok_or_else(|| FluxError::config(format!("missing '{}' in [{}] section", key, section)))
    };

    Ok(SensorDescriptor::new(value(SENSOR_KEY)?, value(NAME_KEY)?))
}
