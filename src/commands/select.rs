use anyhow::{bail, Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};

use super::sensors::sensor_root;
use crate::core::config::SensorConfig;
use crate::core::observer::LogObserver;
use crate::core::sensors::{SensorResolver, SourcePair};
use crate::ui::{self, SelectedChannel};

/// CPU and GPU channels picked interactively.
pub struct Selection {
    pub cpu: SelectedChannel,
    pub gpu: SelectedChannel,
}

impl Selection {
    pub fn sources(&self) -> SourcePair {
        SourcePair {
            cpu: self.cpu.channel.source(),
            gpu: self.gpu.channel.source(),
        }
    }

    pub fn config(&self) -> SensorConfig {
        SensorConfig::new(self.cpu.descriptor(), self.gpu.descriptor())
    }
}

/// Walk the user through picking both channels.
pub fn interactive_selection(resolver: &SensorResolver) -> Result<Selection> {
    log::info!("Starting interactive sensor selection");
    let tree = resolver
        .list_all()
        .with_context(|| format!("Failed to list sensors under {}", resolver.root().display()))?;

    let Some(cpu) = ui::select_channel("Select CPU temperature source:", &tree)? else {
        bail!("Sensor selection cancelled");
    };
    let Some(gpu) = ui::select_channel("Select GPU temperature source:", &tree)? else {
        bail!("Sensor selection cancelled");
    };
    Ok(Selection { cpu, gpu })
}

/// Handle 'select' command - pick sensors and optionally save them
pub fn execute(matches: &clap::ArgMatches) -> Result<()> {
    let resolver = SensorResolver::new(sensor_root(matches), LogObserver::shared());
    let selection = interactive_selection(&resolver)?;
    let config = selection.config();

    println!("{}", "Selected sensors:".white().bold());
    println!("  CPU: {} {}", config.cpu.to_string().cyan(), format!("({})", selection.cpu.channel.input.display()).dimmed());
    println!("  GPU: {} {}", config.gpu.to_string().cyan(), format!("({})", selection.gpu.channel.input.display()).dimmed());

    if matches.get_flag("save") {
        let path = config_path(matches);
        save_config(&config, &path)?;
    }
    Ok(())
}

fn save_config(config: &SensorConfig, path: &Path) -> Result<()> {
    if path.exists() && !ui::confirm(&format!("Overwrite {}?", path.display()))? {
        ui::dimmed("Configuration left unchanged.");
        return Ok(());
    }

    config
        .save(path)
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;
    ui::success(&format!("Configuration saved to {}", path.display()));
    Ok(())
}

/// `--config`, defaulting to /etc/antec/sensors.conf
pub fn config_path(matches: &clap::ArgMatches) -> PathBuf {
    matches
        .get_one::<PathBuf>("config")
        .cloned()
        .unwrap_or_else(SensorConfig::default_path)
}
