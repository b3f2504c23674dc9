use std::fs;
use std::path::{Path, PathBuf};

use super::tree::{device_dirs, label_files, read_trimmed};
use super::{ResolvedSource, SensorDescriptor, SensorTree, SourcePair, HWMON_ROOT};
use crate::core::observer::{Level, SharedObserver};
use crate::error::ResolveError;

/// Maps sensor descriptors onto value files of a sensor tree.
///
/// The tree is enumerated afresh on every call. When several drivers share
/// the same name, the first one in directory order wins; that order is not
/// guaranteed to survive a reboot.
pub struct SensorResolver {
    root: PathBuf,
    observer: SharedObserver,
}

impl SensorResolver {
    pub fn new<P: Into<PathBuf>>(root: P, observer: SharedObserver) -> Self {
        Self {
            root: root.into(),
            observer,
        }
    }

    /// Resolver over the host's `/sys/class/hwmon`.
    pub fn system(observer: SharedObserver) -> Self {
        Self::new(HWMON_ROOT, observer)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn resolve(&self, descriptor: &SensorDescriptor) -> Result<ResolvedSource, ResolveError> {
        self.observer.observe(
            Level::Info,
            &format!(
                "Searching for temperature file: sensor={}, label={}",
                descriptor.kind, descriptor.label
            ),
            &[],
        );

        match self.find(descriptor) {
            Ok(source) => {
                self.observer.observe(
                    Level::Info,
                    &format!(
                        "Found temperature file for {}: {}",
                        descriptor.label,
                        source.path().display()
                    ),
                    &[("sensor", descriptor.kind.clone())],
                );
                Ok(source)
            }
            Err(err) => {
                self.observer.observe(
                    Level::Error,
                    &format!(
                        "No temperature file found for sensor={}, label={}",
                        descriptor.kind, descriptor.label
                    ),
                    &[("root", self.root.display().to_string())],
                );
                Err(err)
            }
        }
    }

    /// Resolve both channels; the first failure wins.
    pub fn resolve_pair(
        &self,
        cpu: &SensorDescriptor,
        gpu: &SensorDescriptor,
    ) -> Result<SourcePair, ResolveError> {
        Ok(SourcePair {
            cpu: self.resolve(cpu)?,
            gpu: self.resolve(gpu)?,
        })
    }

    /// Snapshot every labelled channel with its current reading.
    pub fn list_all(&self) -> Result<SensorTree, ResolveError> {
        self.observer
            .observe(Level::Info, "Listing available hwmon sensors", &[]);

        match SensorTree::scan(&self.root, &self.observer) {
            Ok(tree) => {
                self.observer.observe(
                    Level::Info,
                    &format!("Found {} sensor devices", tree.len()),
                    &[],
                );
                Ok(tree)
            }
            Err(err) => {
                self.observer.observe(
                    Level::Error,
                    &format!("No hwmon directory found at {}!", self.root.display()),
                    &[],
                );
                Err(err)
            }
        }
    }

    fn find(&self, descriptor: &SensorDescriptor) -> Result<ResolvedSource, ResolveError> {
        for dir in device_dirs(&self.root)? {
            if read_trimmed(&dir.join("name")).as_deref() != Some(descriptor.kind.as_str()) {
                continue;
            }
            self.observer.observe(
                Level::Debug,
                &format!("Found matching sensor {} at {}", descriptor.kind, dir.display()),
                &[],
            );

            for label_file in label_files(&dir) {
                let matches = fs::read_to_string(&label_file.label_path)
                    .map(|label| label.trim() == descriptor.label)
                    .unwrap_or(false);
                if matches {
                    return Ok(ResolvedSource::new(label_file.input_path(&dir)));
                }
            }
        }

        Err(ResolveError::NotFound {
            kind: descriptor.kind.clone(),
            label: descriptor.label.clone(),
        })
    }
}
