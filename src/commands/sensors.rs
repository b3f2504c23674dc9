use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::core::observer::LogObserver;
use crate::core::sensors::{SensorResolver, HWMON_ROOT};
use crate::ui::print_sensor_tree;

/// Handle 'sensors' command - list every temperature channel with its reading
pub fn execute(matches: &clap::ArgMatches) -> Result<()> {
    let root = sensor_root(matches);
    let resolver = SensorResolver::new(root, LogObserver::shared());

    let tree = resolver
        .list_all()
        .with_context(|| format!("Failed to list sensors under {}", resolver.root().display()))?;

    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&tree)?);
    } else {
        print_sensor_tree(&tree);
    }
    Ok(())
}

/// `--sensor-root`, defaulting to the kernel's hwmon tree
pub fn sensor_root(matches: &clap::ArgMatches) -> PathBuf {
    matches
        .get_one::<PathBuf>("sensor-root")
        .cloned()
        .unwrap_or_else(|| PathBuf::from(HWMON_ROOT))
}
