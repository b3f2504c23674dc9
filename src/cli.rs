//! Command-line definition.
//!
//! `--config`, `--sensor-root` and `--interval-ms` are global so they are
//! parsed the same way before or after the subcommand, and `run` (the
//! default when no subcommand is given) sees them either way.

use clap::{Arg, ArgAction, Command};
use std::path::PathBuf;

pub fn build() -> Command {
    Command::new("antecflux")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Shows live CPU and GPU temperatures on the Antec FLUX Pro display")
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Log every cycle (debug level)")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .value_name("PATH")
                .help("Log file (default: /var/log/antecflux/antec_display.log)")
                .value_parser(clap::value_parser!(PathBuf))
                .global(true),
        )
        .arg(
            Arg::new("no-log-file")
                .long("no-log-file")
                .help("Log to stderr only")
                .action(ArgAction::SetTrue)
                .conflicts_with("log-file")
                .global(true),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("PATH")
                .help("Sensor configuration file (default: /etc/antec/sensors.conf)")
                .value_parser(clap::value_parser!(PathBuf))
                .global(true),
        )
        .arg(
            Arg::new("sensor-root")
                .long("sensor-root")
                .value_name("DIR")
                .help("Root of the hwmon sensor tree (default: /sys/class/hwmon)")
                .value_parser(clap::value_parser!(PathBuf))
                .global(true),
        )
        .arg(
            Arg::new("interval-ms")
                .long("interval-ms")
                .value_name("MS")
                .help("Milliseconds between display updates when running (default: 500)")
                .value_parser(clap::value_parser!(u64).range(50..))
                .global(true),
        )
        .subcommand(
            Command::new("run").about("Send temperatures to the display until Ctrl+C (default)"),
        )
        .subcommand(
            Command::new("sensors")
                .about("List hwmon temperature sensors with current readings")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print the sensor tree as JSON")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("select")
                .about("Pick CPU and GPU sensors interactively")
                .arg(
                    Arg::new("save")
                        .long("save")
                        .help("Write the selection to the configuration file")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("frame")
                .about("Print the frame the display would receive for two temperatures")
                .arg(
                    Arg::new("cpu")
                        .help("CPU temperature in °C")
                        .required(true)
                        .allow_negative_numbers(true)
                        .value_parser(clap::value_parser!(f64))
                        .index(1),
                )
                .arg(
                    Arg::new("gpu")
                        .help("GPU temperature in °C")
                        .required(true)
                        .allow_negative_numbers(true)
                        .value_parser(clap::value_parser!(f64))
                        .index(2),
                ),
        )
        .subcommand(Command::new("version").about("Shows version information"))
}
