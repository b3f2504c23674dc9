// UI prompts and user interaction module

use anyhow::{bail, Result};
use colored::Colorize;
use dialoguer::{Confirm, Select};

use super::formatters::format_temperature;
use crate::core::sensors::{SensorChannel, SensorDescriptor, SensorDevice, SensorTree};

/// Display a warning message
pub fn warn(message: &str) {
    println!("{}", format!("⚠️  Warning: {}", message).yellow().bold());
}

/// Display a success message
pub fn success(message: &str) {
    println!("{}", message.green().bold());
}

/// Display a dimmed/secondary message
pub fn dimmed(message: &str) {
    println!("{}", message.dimmed());
}

/// Ask user for yes/no confirmation, defaulting to no
pub fn confirm(message: &str) -> Result<bool> {
    Ok(Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()?)
}

/// A channel picked interactively.
#[derive(Debug, Clone)]
pub struct SelectedChannel {
    pub device: SensorDevice,
    pub channel: SensorChannel,
}

impl SelectedChannel {
    pub fn descriptor(&self) -> SensorDescriptor {
        SensorDescriptor::new(self.device.name.clone(), self.channel.label.clone())
    }
}

/// Let the user pick a device and then one of its temperature channels.
///
/// Returns `None` if the user cancels with Esc or q.
pub fn select_channel(title: &str, tree: &SensorTree) -> Result<Option<SelectedChannel>> {
    if tree.is_empty() {
        bail!("No sensors found!");
    }

    println!();
    println!("{}", title.white().bold());

    let device_items: Vec<String> = tree
        .devices
        .iter()
        .map(|d| format!("{} ({})", d.name, d.path.display()))
        .collect();
    let Some(device_idx) = Select::new()
        .with_prompt("Select a sensor")
        .items(&device_items)
        .default(0)
        .interact_opt()?
    else {
        return Ok(None);
    };
    let device = &tree.devices[device_idx];

    if device.channels.is_empty() {
        bail!("Sensor '{}' exposes no temperature labels", device.name);
    }

    let channel_items: Vec<String> = device.channels.iter().map(channel_line).collect();
    let Some(channel_idx) = Select::new()
        .with_prompt("Select a temperature label")
        .items(&channel_items)
        .default(0)
        .interact_opt()?
    else {
        return Ok(None);
    };

    let selected = SelectedChannel {
        device: device.clone(),
        channel: device.channels[channel_idx].clone(),
    };
    log::info!(
        "User selected sensor: {}, label: {}, path: {}",
        selected.device.name,
        selected.channel.label,
        selected.channel.input.display()
    );
    Ok(Some(selected))
}

fn channel_line(channel: &SensorChannel) -> String {
    format!(
        "{} ({}) - {}",
        channel.label,
        channel.id,
        format_temperature(channel.value)
    )
}
