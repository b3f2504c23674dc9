// Integration tests for the monitoring loop's cadence and failure policy

use antecflux::core::frame::Frame;
use antecflux::core::monitor::{Monitor, MonitorSettings, MonitorState, Sources};
use antecflux::core::observer::{Level, RecordingObserver};
use antecflux::core::sensors::{ResolvedSource, SensorDescriptor, SensorResolver, SourcePair};
use antecflux::error::{FluxError, ResolveError, TransportError};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use super::support::{FakeHwmon, InstantSleeper, ScriptedSink, Step};

const PERIOD: Duration = Duration::from_millis(500);
const COOLDOWN: Duration = Duration::from_secs(5);

fn fixture() -> (FakeHwmon, SourcePair) {
    let hwmon = FakeHwmon::new();
    let cpu = hwmon.add_device("hwmon0", "asusec", &[(1, "CPU", Some("65400"))]);
    let gpu = hwmon.add_device("hwmon1", "amdgpu", &[(1, "edge", Some("30000"))]);
    let pair = SourcePair {
        cpu: ResolvedSource::new(cpu.join("temp1_input")),
        gpu: ResolvedSource::new(gpu.join("temp1_input")),
    };
    (hwmon, pair)
}

fn monitor(
    hwmon: &FakeHwmon,
    sources: Sources,
    sink: ScriptedSink,
    observer: &Arc<RecordingObserver>,
    sleeper: &InstantSleeper,
) -> Monitor<ScriptedSink> {
    Monitor::new(
        sources,
        SensorResolver::new(hwmon.root(), observer.clone()),
        sink,
        observer.clone(),
    )
    .with_sleeper(sleeper.clone())
}

#[test]
fn test_transport_fault_does_not_block_next_cycle() {
    let (hwmon, pair) = fixture();
    let observer = RecordingObserver::new();
    let sleeper = InstantSleeper::stopping_after(2);
    let sink = ScriptedSink::new(vec![Step::Fail(TransportError::NotFound {
        vendor_id: 0x2022,
        product_id: 0x0522,
    })]);

    let mut monitor = monitor(&hwmon, Sources::Resolved(pair), sink, &observer, &sleeper);
    let report = monitor.run(&AtomicBool::new(false)).unwrap();

    assert_eq!(report.cycles, 2);
    assert_eq!(report.sent, 1);
    assert_eq!(report.transport_failures, 1);
    assert_eq!(report.faults, 0);
    assert_eq!(monitor.sink().frames.len(), 2);
    // a failed send keeps the normal cadence
    assert_eq!(*sleeper.sleeps.lock(), vec![PERIOD, PERIOD]);
    assert!(observer.contains(Level::Error, "USB device 2022:0522 not found"));
    assert_eq!(monitor.state(), MonitorState::Stopped);
}

#[test]
fn test_frames_carry_current_temperatures() {
    let (hwmon, pair) = fixture();
    let observer = RecordingObserver::new();
    let sleeper = InstantSleeper::stopping_after(1);

    let mut monitor = monitor(&hwmon, Sources::Resolved(pair), ScriptedSink::accepting(), &observer, &sleeper);
    monitor.run(&AtomicBool::new(false)).unwrap();

    let frames = &monitor.sink().frames;
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0], Frame::encode(65.4, 30.0));
    assert_eq!(frames[0].to_hex(), "55aa01010606050403000019");
}

#[test]
fn test_unexpected_error_enters_cooldown_then_resumes() {
    let (hwmon, pair) = fixture();
    let observer = RecordingObserver::new();
    let sleeper = InstantSleeper::stopping_after(2);
    let sink = ScriptedSink::new(vec![Step::Unexpected("boom"), Step::Deliver]);

    let mut monitor = monitor(&hwmon, Sources::Resolved(pair), sink, &observer, &sleeper);
    let report = monitor.run(&AtomicBool::new(false)).unwrap();

    assert_eq!(report.faults, 1);
    assert_eq!(report.cycles, 1);
    assert_eq!(report.sent, 1);
    assert_eq!(*sleeper.sleeps.lock(), vec![COOLDOWN, PERIOD]);
    assert!(observer.contains(Level::Error, "Error in monitoring loop: boom"));
}

#[test]
fn test_panic_in_cycle_is_contained() {
    let (hwmon, pair) = fixture();
    let observer = RecordingObserver::new();
    let sleeper = InstantSleeper::stopping_after(3);
    let sink = ScriptedSink::new(vec![Step::Deliver, Step::Panic("endpoint vanished"), Step::Deliver]);

    let mut monitor = monitor(&hwmon, Sources::Resolved(pair), sink, &observer, &sleeper);
    let report = monitor.run(&AtomicBool::new(false)).unwrap();

    assert_eq!(report.faults, 1);
    assert_eq!(report.cycles, 2);
    assert_eq!(report.sent, 2);
    assert_eq!(*sleeper.sleeps.lock(), vec![PERIOD, COOLDOWN, PERIOD]);
    assert!(observer.contains(Level::Error, "endpoint vanished"));
    assert_eq!(monitor.state(), MonitorState::Stopped);
}

#[test]
fn test_summary_every_tenth_cycle() {
    let (hwmon, pair) = fixture();
    let observer = RecordingObserver::new();
    let sleeper = InstantSleeper::stopping_after(12);

    let mut monitor = monitor(&hwmon, Sources::Resolved(pair), ScriptedSink::accepting(), &observer, &sleeper);
    let report = monitor.run(&AtomicBool::new(false)).unwrap();
    assert_eq!(report.cycles, 12);

    let temperature_events = |level| {
        observer
            .at_level(level)
            .into_iter()
            .filter(|e| e.message.starts_with("Current temperatures"))
            .collect::<Vec<_>>()
    };
    let info = temperature_events(Level::Info);
    assert_eq!(info.len(), 2);
    assert_eq!(info[0].field("cycle"), Some("0"));
    assert_eq!(info[1].field("cycle"), Some("10"));
    assert_eq!(info[0].message, "Current temperatures - CPU: 65.4°C, GPU: 30.0°C");
    assert_eq!(temperature_events(Level::Debug).len(), 10);
}

#[test]
fn test_configured_sources_are_resolved_at_start() {
    let (hwmon, _) = fixture();
    let observer = RecordingObserver::new();
    let sleeper = InstantSleeper::stopping_after(1);
    let sources = Sources::Configured {
        cpu: SensorDescriptor::new("asusec", "CPU"),
        gpu: SensorDescriptor::new("amdgpu", "edge"),
    };

    let mut monitor = monitor(&hwmon, sources, ScriptedSink::accepting(), &observer, &sleeper);
    let report = monitor.run(&AtomicBool::new(false)).unwrap();

    assert_eq!(report.sent, 1);
    assert_eq!(monitor.sink().frames[0], Frame::encode(65.4, 30.0));
    assert!(observer.contains(Level::Info, "Using CPU temperature from"));
}

#[test]
fn test_resolution_failure_stops_without_sending() {
    let (hwmon, _) = fixture();
    let observer = RecordingObserver::new();
    let sleeper = InstantSleeper::stopping_after(1);
    let sources = Sources::Configured {
        cpu: SensorDescriptor::new("asusec", "CPU"),
        gpu: SensorDescriptor::new("nvidia", "GPU"),
    };

    let mut monitor = monitor(&hwmon, sources, ScriptedSink::accepting(), &observer, &sleeper);
    assert_eq!(monitor.state(), MonitorState::Idle);

    let err = monitor.run(&AtomicBool::new(false)).unwrap_err();

    assert!(matches!(
        err,
        FluxError::Resolve(ResolveError::NotFound { ref kind, .. }) if kind == "nvidia"
    ));
    assert_eq!(monitor.state(), MonitorState::Stopped);
    assert!(monitor.sink().frames.is_empty());
    assert!(sleeper.sleeps.lock().is_empty());
    assert_eq!(observer.at_level(Level::Critical).len(), 1);
}

#[test]
fn test_missing_source_sends_fallback_reading() {
    let (hwmon, mut pair) = fixture();
    pair.gpu = ResolvedSource::new(hwmon.root().join("hwmon9").join("temp1_input"));
    let observer = RecordingObserver::new();
    let sleeper = InstantSleeper::stopping_after(1);

    let mut monitor = monitor(&hwmon, Sources::Resolved(pair), ScriptedSink::accepting(), &observer, &sleeper);
    let report = monitor.run(&AtomicBool::new(false)).unwrap();

    assert_eq!(report.faults, 0);
    assert_eq!(monitor.sink().frames[0], Frame::encode(65.4, 0.0));
    assert!(observer.contains(Level::Error, "Temperature source not found"));
}

#[test]
fn test_stop_requested_before_first_cycle() {
    let (hwmon, pair) = fixture();
    let observer = RecordingObserver::new();
    let sleeper = InstantSleeper::stopping_after(1);

    let mut monitor = monitor(&hwmon, Sources::Resolved(pair), ScriptedSink::accepting(), &observer, &sleeper);
    let report = monitor.run(&AtomicBool::new(true)).unwrap();

    assert_eq!(report.cycles, 0);
    assert!(monitor.sink().frames.is_empty());
    assert_eq!(monitor.state(), MonitorState::Stopped);
    assert!(observer.contains(Level::Info, "Service stopped by user"));
}

#[test]
fn test_custom_period_is_used() {
    let (hwmon, pair) = fixture();
    let observer = RecordingObserver::new();
    let sleeper = InstantSleeper::stopping_after(1);
    let settings = MonitorSettings {
        period: Duration::from_millis(250),
        ..MonitorSettings::default()
    };

    let mut monitor = monitor(&hwmon, Sources::Resolved(pair), ScriptedSink::accepting(), &observer, &sleeper)
        .with_settings(settings);
    monitor.run(&AtomicBool::new(false)).unwrap();

    assert_eq!(*sleeper.sleeps.lock(), vec![Duration::from_millis(250)]);
}
