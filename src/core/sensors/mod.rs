//! hwmon sensor discovery, resolution and reading.
//!
//! The sensor tree is any directory shaped like `/sys/class/hwmon`: one
//! directory per driver holding a `name` file and `tempN_label` /
//! `tempN_input` pairs, with inputs in millidegrees Celsius.

pub mod reader;
pub mod resolver;
pub mod tree;

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

pub use reader::TemperatureReader;
pub use resolver::SensorResolver;
pub use tree::{SensorChannel, SensorDevice, SensorTree};

/// Default location of the kernel's hardware monitoring tree.
pub const HWMON_ROOT: &str = "/sys/class/hwmon";

/// Identifies one temperature channel by driver name and channel label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SensorDescriptor {
    /// Driver name as reported by the `name` file (e.g. `asusec`)
    pub kind: String,
    /// Channel label as reported by `tempN_label` (e.g. `CPU`)
    pub label: String,
}

impl SensorDescriptor {
    pub fn new<K: Into<String>, L: Into<String>>(kind: K, label: L) -> Self {
        Self {
            kind: kind.into(),
            label: label.into(),
        }
    }
}

impl fmt::Display for SensorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.label)
    }
}

/// A concrete value file a temperature can be read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSource {
    path: PathBuf,
}

impl ResolvedSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl fmt::Display for ResolvedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// The two sources the display shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePair {
    pub cpu: ResolvedSource,
    pub gpu: ResolvedSource,
}
