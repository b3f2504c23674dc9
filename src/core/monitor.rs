//! The polling loop that keeps the display fed.
//!
//! State flow:
//!
//! ```text
//! Idle -> Resolving -> Running <-> Faulted
//!              |          |          |
//!              +----------+----------+--> Stopped
//! ```
//!
//! Resolution failures stop the loop for good. Read faults degrade to the
//! fallback temperature and transport faults skip one send; neither leaves
//! `Running`. Anything else escaping a cycle (an error outside the transport
//! taxonomy, or a panic) moves to `Faulted` for a cooldown before resuming.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use super::frame::Frame;
use super::observer::{Level, SharedObserver};
use super::sensors::{SensorDescriptor, SensorResolver, SourcePair, TemperatureReader};
use super::transport::FrameSink;
use crate::error::{FluxError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Idle,
    Resolving,
    Running,
    Faulted,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorSettings {
    pub period: Duration,
    pub fault_cooldown: Duration,
    /// Every n-th cycle logs temperatures at info level instead of debug
    pub summary_every: u64,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            period: Duration::from_millis(500),
            fault_cooldown: Duration::from_secs(5),
            summary_every: 10,
        }
    }
}

/// Where the two temperature sources come from.
#[derive(Debug, Clone)]
pub enum Sources {
    /// Descriptors from the configuration file, resolved when the loop starts
    Configured {
        cpu: SensorDescriptor,
        gpu: SensorDescriptor,
    },
    /// Paths already picked, e.g. interactively
    Resolved(SourcePair),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonitorReport {
    /// Completed read-encode-send cycles
    pub cycles: u64,
    /// Frames the sink accepted
    pub sent: u64,
    pub transport_failures: u64,
    /// Cycles that ended in the faulted state
    pub faults: u64,
}

/// Blocking wait between cycles.
pub trait Sleeper {
    /// Wait for `duration` or until `stop` is raised, whichever comes first.
    fn sleep(&self, duration: Duration, stop: &AtomicBool);
}

/// Sleeps on the current thread in short slices so a stop request is
/// honoured promptly.
#[derive(Debug, Clone, Copy)]
pub struct ThreadSleeper {
    slice: Duration,
}

impl ThreadSleeper {
    const MIN_SLICE: Duration = Duration::from_millis(1);

    /// Slices shorter than 1 ms are raised to 1 ms.
    pub fn with_slice(slice: Duration) -> Self {
        Self {
            slice: slice.max(Self::MIN_SLICE),
        }
    }

    pub fn slice(&self) -> Duration {
        self.slice
    }
}

impl Default for ThreadSleeper {
    fn default() -> Self {
        Self::with_slice(Duration::from_millis(50))
    }
}

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration, stop: &AtomicBool) {
        let mut remaining = duration;
        while !remaining.is_zero() && !stop.load(Ordering::Relaxed) {
            let step = remaining.min(self.slice);
            std::thread::sleep(step);
            remaining = remaining.saturating_sub(step);
        }
    }
}

pub struct Monitor<S: FrameSink> {
    sources: Sources,
    resolver: SensorResolver,
    reader: TemperatureReader,
    sink: S,
    sleeper: Box<dyn Sleeper>,
    observer: SharedObserver,
    settings: MonitorSettings,
    state: MonitorState,
    report: MonitorReport,
}

impl<S: FrameSink> Monitor<S> {
    pub fn new(sources: Sources, resolver: SensorResolver, sink: S, observer: SharedObserver) -> Self {
        Self {
            sources,
            resolver,
            reader: TemperatureReader::new(observer.clone()),
            sink,
            sleeper: Box::new(ThreadSleeper::default()),
            observer,
            settings: MonitorSettings::default(),
            state: MonitorState::Idle,
            report: MonitorReport::default(),
        }
    }

    pub fn with_settings(mut self, settings: MonitorSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_sleeper<T: Sleeper + 'static>(mut self, sleeper: T) -> Self {
        self.sleeper = Box::new(sleeper);
        self
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    pub fn report(&self) -> MonitorReport {
        self.report
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Run until `stop` is raised.
    ///
    /// Returns an error only when the sources cannot be resolved.
    pub fn run(&mut self, stop: &AtomicBool) -> Result<MonitorReport> {
        self.state = MonitorState::Resolving;
        let pair = match self.resolve_sources() {
            Ok(pair) => pair,
            Err(err) => {
                self.observer.observe(
                    Level::Critical,
                    "Could not find temperature files for the configured sensors",
                    &[("error", err.to_string())],
                );
                self.state = MonitorState::Stopped;
                return Err(err);
            }
        };

        self.observer.observe(
            Level::Info,
            &format!("Using CPU temperature from: {}", pair.cpu),
            &[],
        );
        self.observer.observe(
            Level::Info,
            &format!("Using GPU temperature from: {}", pair.gpu),
            &[],
        );
        self.observer
            .observe(Level::Info, "Starting temperature monitoring loop", &[]);
        self.state = MonitorState::Running;

        while !stop.load(Ordering::Relaxed) {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.cycle(&pair)));
            let failure = match outcome {
                Ok(Ok(())) => None,
                Ok(Err(err)) => Some(err.to_string()),
                Err(payload) => Some(panic_message(payload.as_ref())),
            };

            match failure {
                None => self.sleeper.sleep(self.settings.period, stop),
                Some(reason) => {
                    self.state = MonitorState::Faulted;
                    self.report.faults += 1;
                    self.observer.observe(
                        Level::Error,
                        &format!("Error in monitoring loop: {}", reason),
                        &[("cooldown_ms", self.settings.fault_cooldown.as_millis().to_string())],
                    );
                    self.sleeper.sleep(self.settings.fault_cooldown, stop);
                    self.state = MonitorState::Running;
                }
            }
        }

        self.state = MonitorState::Stopped;
        self.observer
            .observe(Level::Info, "Service stopped by user", &[("cycles", self.report.cycles.to_string())]);
        Ok(self.report)
    }

    fn resolve_sources(&self) -> Result<SourcePair> {
        match &self.sources {
            Sources::Resolved(pair) => Ok(pair.clone()),
            Sources::Configured { cpu, gpu } => Ok(self.resolver.resolve_pair(cpu, gpu)?),
        }
    }

    /// One read-encode-send pass.
    fn cycle(&mut self, pair: &SourcePair) -> Result<()> {
        let cpu_temp = self.reader.read(&pair.cpu);
        let gpu_temp = self.reader.read(&pair.gpu);

        let level = if self.report.cycles % self.settings.summary_every.max(1) == 0 {
            Level::Info
        } else {
            Level::Debug
        };
        self.observer.observe(
            level,
            &format!(
                "Current temperatures - CPU: {:.1}°C, GPU: {:.1}°C",
                cpu_temp, gpu_temp
            ),
            &[
                ("cycle", self.report.cycles.to_string()),
                ("cpu", format!("{:.1}", cpu_temp)),
                ("gpu", format!("{:.1}", gpu_temp)),
            ],
        );

        let frame = Frame::encode(cpu_temp, gpu_temp);
        match self.sink.send(&frame) {
            Ok(()) => {
                self.report.sent += 1;
                self.observer.observe(
                    Level::Debug,
                    "Successfully sent payload to device",
                    &[("frame", frame.to_hex())],
                );
            }
            Err(FluxError::Transport(err)) => {
                self.report.transport_failures += 1;
                self.observer.observe(
                    Level::Error,
                    &err.to_string(),
                    &[("frame", frame.to_hex())],
                );
            }
            Err(err) => return Err(err),
        }

        self.report.cycles += 1;
        Ok(())
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
