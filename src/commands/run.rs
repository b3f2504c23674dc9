use anyhow::{Context, Result};
use colored::Colorize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::select::{config_path, interactive_selection};
use super::sensors::sensor_root;
use crate::core::config::SensorConfig;
use crate::core::monitor::{Monitor, MonitorSettings, Sources};
use crate::core::observer::LogObserver;
use crate::core::sensors::SensorResolver;
use crate::core::transport::{UsbDisplay, UsbSettings};
use crate::platform::is_elevated;
use crate::ui;

/// Handle 'run' command - feed the display until Ctrl+C
pub fn execute(matches: &clap::ArgMatches) -> Result<()> {
    log::info!("Starting Antec FLUX Pro Display Service");

    let observer = LogObserver::shared();
    let resolver = SensorResolver::new(sensor_root(matches), observer.clone());
    let path = config_path(matches);

    log::info!("Attempting to load config from {}", path.display());
    let sources = match SensorConfig::load(&path) {
        Ok(Some(config)) => {
            log::info!(
                "Loaded config: CPU sensor={}, name={}, GPU sensor={}, name={}",
                config.cpu.kind,
                config.cpu.label,
                config.gpu.kind,
                config.gpu.label
            );
            Sources::Configured {
                cpu: config.cpu,
                gpu: config.gpu,
            }
        }
        Ok(None) => {
            log::warn!("Config file not found at {}", path.display());
            log::info!("No config file found. Falling back to interactive sensor selection.");
            Sources::Resolved(interactive_selection(&resolver)?.sources())
        }
        Err(e) => {
            log::error!("{}", e);
            log::info!("Unusable config file. Falling back to interactive sensor selection.");
            Sources::Resolved(interactive_selection(&resolver)?.sources())
        }
    };

    if !is_elevated() {
        ui::warn("Not running as root; USB access needs a udev rule for the display");
    }

    let mut settings = MonitorSettings::default();
    if let Some(&ms) = matches.get_one::<u64>("interval-ms") {
        settings.period = Duration::from_millis(ms);
    }

    let display = UsbDisplay::new(UsbSettings::default()).context("Failed to initialize libusb")?;

    // Create shared cancellation flag
    let stop = Arc::new(AtomicBool::new(false));
    let stop_clone = stop.clone();

    // Setup Ctrl+C handler
    ctrlc::set_handler(move || {
        println!();
        println!("{}", "Stopping display service...".yellow().bold());
        stop_clone.store(true, Ordering::Relaxed);
    })
    .map_err(|e| anyhow::anyhow!("Failed to set Ctrl+C handler: {}", e))?;

    ui::dimmed("Press Ctrl+C to stop");

    let mut monitor = Monitor::new(sources, resolver, display, observer).with_settings(settings);
    let report = monitor.run(&stop)?;

    ui::print_report(&report);
    Ok(())
}
