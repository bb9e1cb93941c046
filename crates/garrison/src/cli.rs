//! Command line interface for the garrison server binary.

use std::path::PathBuf;

use clap::{Arg, ArgMatches, Command};

/// Parsed command line arguments.
#[derive(Debug, Clone)]
pub struct CliArgs {
    /// Resource root: the directory holding `garrison.lock`, `config/` and
    /// `plugins/`. Becomes the process working directory.
    pub resource_root: PathBuf,
    /// Initial log level, until the core configuration applies its own.
    pub log_level: String,
    pub json_logs: bool,
}

fn command() -> Command {
    Command::new("Garrison Server")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Plugin-based game server bootstrap")
        .arg(
            Arg::new("resource-root")
                .short('r')
                .long("resource-root")
                .value_name("DIR")
                .help("Resource root containing garrison.lock, config/ and plugins/")
                .default_value("."),
        )
        .arg(
            Arg::new("log-level")
                .short('l')
                .long("log-level")
                .value_name("LEVEL")
                .help("Initial log level (trace, debug, info, warn, error)")
                .default_value("info"),
        )
        .arg(
            Arg::new("json-logs")
                .long("json-logs")
                .help("Output logs in JSON format")
                .action(clap::ArgAction::SetTrue),
        )
}

impl CliArgs {
    pub fn parse() -> Self {
        Self::from_matches(&command().get_matches())
    }

    fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            resource_root: matches
                .get_one::<String>("resource-root")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            log_level: matches
                .get_one::<String>("log-level")
                .cloned()
                .unwrap_or_else(|| "info".to_string()),
            json_logs: matches.get_flag("json-logs"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let matches = command().get_matches_from(["garrison"]);
        let args = CliArgs::from_matches(&matches);

        assert_eq!(args.resource_root, PathBuf::from("."));
        assert_eq!(args.log_level, "info");
        assert!(!args.json_logs);
    }

    #[test]
    fn overrides() {
        let matches = command().get_matches_from([
            "garrison",
            "--resource-root",
            "/srv/garrison",
            "--log-level",
            "debug",
            "--json-logs",
        ]);
        let args = CliArgs::from_matches(&matches);

        assert_eq!(args.resource_root, PathBuf::from("/srv/garrison"));
        assert_eq!(args.log_level, "debug");
        assert!(args.json_logs);
    }
}
