//! Point-in-time snapshot of the sensor tree.

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use super::reader::read_celsius;
use super::ResolvedSource;
use crate::core::observer::{Level, SharedObserver};
use crate::error::ResolveError;

/// One `tempN` channel of a device.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorChannel {
    /// Channel id, e.g. `temp1`
    pub id: String,
    pub label: String,
    /// Current reading in °C, `None` when the input is missing or unreadable
    pub value: Option<f64>,
    #[serde(skip)]
    pub input: PathBuf,
}

impl SensorChannel {
    pub fn source(&self) -> ResolvedSource {
        ResolvedSource::new(&self.input)
    }
}

/// One driver directory of the tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorDevice {
    pub path: PathBuf,
    pub name: String,
    pub channels: Vec<SensorChannel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SensorTree {
    pub devices: Vec<SensorDevice>,
}

impl SensorTree {
    /// Walk `root` and read every labelled temperature channel.
    ///
    /// A channel that fails to read is reported and skipped; it never aborts
    /// the listing.
    pub fn scan(root: &Path, observer: &SharedObserver) -> Result<Self, ResolveError> {
        let mut devices = Vec::new();

        for dir in device_dirs(root)? {
            let Some(name) = read_trimmed(&dir.join("name")) else {
                continue;
            };

            let mut channels = Vec::new();
            for label_file in label_files(&dir) {
                let label = match fs::read_to_string(&label_file.label_path) {
                    Ok(label) => label.trim().to_string(),
                    Err(e) => {
                        observer.observe(
                            Level::Error,
                            &format!("Error reading label or temperature: {}", e),
                            &[("path", label_file.label_path.display().to_string())],
                        );
                        continue;
                    }
                };
                let input = label_file.input_path(&dir);
                let value = if input.exists() {
                    match read_celsius(&input) {
                        Ok(v) => Some(v),
                        Err(e) => {
                            observer.observe(
                                Level::Error,
                                &format!("Error reading label or temperature: {}", e),
                                &[("path", input.display().to_string())],
                            );
                            None
                        }
                    }
                } else {
                    None
                };

                observer.observe(
                    Level::Debug,
                    &format!(
                        "Found sensor: {}, label: {}, temp: {}",
                        name,
                        label,
                        value.map_or("None".to_string(), |v| v.to_string())
                    ),
                    &[],
                );
                channels.push(SensorChannel {
                    id: label_file.id,
                    label,
                    value,
                    input,
                });
            }

            devices.push(SensorDevice {
                path: dir,
                name,
                channels,
            });
        }

        Ok(Self { devices })
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn channel_count(&self) -> usize {
        self.devices.iter().map(|d| d.channels.len()).sum()
    }
}

/// A `tempN_label` file found in a device directory.
pub(crate) struct LabelFile {
    pub index: u32,
    pub id: String,
    pub label_path: PathBuf,
}

impl LabelFile {
    pub fn input_path(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}_input", self.id))
    }
}

/// Device directories under `root`, sorted by name.
pub(crate) fn device_dirs(root: &Path) -> Result<Vec<PathBuf>, ResolveError> {
    let entries = fs::read_dir(root).map_err(|_| ResolveError::TreeUnavailable {
        path: root.to_path_buf(),
    })?;

    let mut dirs: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    dirs.sort();
    Ok(dirs)
}

/// `tempN_label` files of a device, sorted by channel number.
pub(crate) fn label_files(dir: &Path) -> Vec<LabelFile> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut files: Vec<LabelFile> = entries
        .flatten()
        .filter_map(|entry| {
            let file_name = entry.file_name();
            let file_name = file_name.to_str()?;
            let id = file_name.strip_suffix("_label")?;
            let index = id.strip_prefix("temp")?.parse().ok()?;
            Some(LabelFile {
                index,
                id: id.to_string(),
                label_path: entry.path(),
            })
        })
        .collect();
    files.sort_by_key(|f| f.index);
    files
}

pub(crate) fn read_trimmed(path: &Path) -> Option<String> {
    fs::read_to_string(path).ok().map(|s| s.trim().to_string())
}
