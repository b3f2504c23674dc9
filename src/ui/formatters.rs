use colored::Colorize;

use crate::core::monitor::MonitorReport;
use crate::core::sensors::SensorTree;

/// Format a reading as `41.0°C`, or `N/A` when unavailable
pub fn format_temperature(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.1}°C", v),
        None => "N/A".to_string(),
    }
}

/// Print the sensor tree, one device per block
pub fn print_sensor_tree(tree: &SensorTree) {
    if tree.is_empty() {
        println!("{}", "No sensors found!".red().bold());
        return;
    }

    println!("{}", "Available sensors:".white().bold());
    for (idx, device) in tree.devices.iter().enumerate() {
        println!(
            "{}: {} {}",
            idx + 1,
            device.name.cyan().bold(),
            format!("({})", device.path.display()).dimmed()
        );
        if device.channels.is_empty() {
            println!("   {}", "no temperature labels".dimmed());
        }
        for (label_idx, channel) in device.channels.iter().enumerate() {
            let reading = format_temperature(channel.value);
            let reading = match channel.value {
                Some(v) => temperature_color(v, &reading),
                None => reading.bright_black().to_string(),
            };
            println!(
                "   {}: {} {} - {}",
                label_idx + 1,
                channel.label,
                format!("({})", channel.id).dimmed(),
                reading
            );
        }
    }
}

fn temperature_color(celsius: f64, text: &str) -> String {
    if celsius >= 80.0 {
        text.red().bold().to_string()
    } else if celsius >= 60.0 {
        text.yellow().to_string()
    } else {
        text.green().to_string()
    }
}

/// Print the summary shown when the service stops
pub fn print_report(report: &MonitorReport) {
    println!();
    println!("{}", "Monitoring stopped".white().bold());
    println!("  Cycles:             {}", report.cycles.to_string().cyan());
    println!("  Frames sent:        {}", report.sent.to_string().green());
    let failures = report.transport_failures.to_string();
    println!(
        "  Transport failures: {}",
        if report.transport_failures > 0 {
            failures.yellow()
        } else {
            failures.normal()
        }
    );
    let faults = report.faults.to_string();
    println!(
        "  Loop faults:        {}",
        if report.faults > 0 { faults.red() } else { faults.normal() }
    );
}
