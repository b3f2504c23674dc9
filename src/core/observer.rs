//! Event reporting for the core components.
//!
//! Components never touch the global logger directly. They receive an
//! [`Observer`] at construction and report what happened through it; the
//! binary wires in [`LogObserver`], tests use [`RecordingObserver`].

use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// Severity of an observed event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
            Level::Critical => "CRITICAL",
        };
        f.write_str(name)
    }
}

/// Receiver of log-worthy events.
pub trait Observer: Send + Sync {
    fn observe(&self, level: Level, message: &str, fields: &[(&str, String)]);
}

/// Observer handle shared between components.
pub type SharedObserver = Arc<dyn Observer>;

/// Forwards events to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl LogObserver {
    pub fn shared() -> SharedObserver {
        Arc::new(LogObserver)
    }
}

impl Observer for LogObserver {
    fn observe(&self, level: Level, message: &str, fields: &[(&str, String)]) {
        let line = render(message, fields);
        match level {
            Level::Debug => log::debug!("{}", line),
            Level::Info => log::info!("{}", line),
            Level::Warning => log::warn!("{}", line),
            Level::Error => log::error!("{}", line),
            // `log` has no level above error
            Level::Critical => log::error!("CRITICAL: {}", line),
        }
    }
}

fn render(message: &str, fields: &[(&str, String)]) -> String {
    if fields.is_empty() {
        return message.to_string();
    }
    let pairs: Vec<String> = fields.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
    format!("{} [{}]", message, pairs.join(" "))
}

/// One event captured by [`RecordingObserver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedEvent {
    pub level: Level,
    pub message: String,
    pub fields: Vec<(String, String)>,
}

impl ObservedEvent {
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<ObservedEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<ObservedEvent> {
        self.events.lock().clone()
    }

    pub fn at_level(&self, level: Level) -> Vec<ObservedEvent> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.level == level)
            .cloned()
            .collect()
    }

    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.events
            .lock()
            .iter()
            .any(|e| e.level == level && e.message.contains(needle))
    }
}

impl Observer for RecordingObserver {
    fn observe(&self, level: Level, message: &str, fields: &[(&str, String)]) {
        self.events.lock().push(ObservedEvent {
            level,
            message: message.to_string(),
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        });
    }
}
