use anyhow::{Context, Result};
use colored::Colorize;

use crate::core::frame::Frame;

/// Handle 'frame' command - show the bytes the display would receive
pub fn execute(matches: &clap::ArgMatches) -> Result<()> {
    let cpu = *matches
        .get_one::<f64>("cpu")
        .context("CPU temperature is required")?;
    let gpu = *matches
        .get_one::<f64>("gpu")
        .context("GPU temperature is required")?;

    let frame = Frame::encode(cpu, gpu);
    println!("{}", frame.to_hex().white().bold());
    println!("{}", frame.to_string().dimmed());
    println!(
        "CPU digits: {:?}  GPU digits: {:?}  checksum: {:#04x}",
        frame.cpu_digits(),
        frame.gpu_digits(),
        frame.checksum()
    );
    Ok(())
}
