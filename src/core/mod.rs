// Core business logic module

pub mod config;
pub mod frame;
pub mod monitor;
pub mod observer;
pub mod sensors;
pub mod transport;

// Re-export commonly used items
pub use config::SensorConfig;
pub use frame::Frame;
pub use monitor::{Monitor, MonitorReport, MonitorSettings, MonitorState, Sources};
pub use observer::{Level, LogObserver, Observer, RecordingObserver, SharedObserver};
pub use sensors::{ResolvedSource, SensorDescriptor, SensorResolver, SensorTree, SourcePair};
pub use transport::{FrameSink, UsbDisplay, UsbSettings};
