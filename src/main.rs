use anyhow::Result;
use clap::ArgMatches;
use std::path::PathBuf;

use antecflux::{cli, commands};
use antecflux::logging::{self, LogOptions};

fn main() -> Result<()> {
    let matches = cli::build().get_matches();
    logging::init(&log_options(&matches));

    match matches.subcommand() {
        Some(("run", sub_matches)) => commands::run::execute(sub_matches),
        Some(("sensors", sub_matches)) => commands::sensors::execute(sub_matches),
        Some(("select", sub_matches)) => commands::select::execute(sub_matches),
        Some(("frame", sub_matches)) => commands::frame::execute(sub_matches),
        Some(("version", _)) => commands::version(),
        _ => commands::run::execute(&matches),
    }
    .inspect_err(|e| log::error!("Fatal error: {:#}", e))
}

fn log_options(matches: &ArgMatches) -> LogOptions {
    // only the service writes the log file unless one is asked for
    let is_service = matches!(matches.subcommand_name(), None | Some("run"));
    // global flags propagate down, so read them where they were parsed last
    let matches = matches.subcommand().map_or(matches, |(_, sub)| sub);

    let file = if matches.get_flag("no-log-file") {
        None
    } else if let Some(path) = matches.get_one::<PathBuf>("log-file") {
        Some(path.clone())
    } else if is_service {
        Some(logging::default_log_path())
    } else {
        None
    };

    LogOptions {
        verbose: matches.get_flag("verbose"),
        file,
    }
}
