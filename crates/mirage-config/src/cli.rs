//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// mirage command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "mirage", about = "Virtual identifier synchronization server")]
pub struct CliArgs {
    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Re-define non-virtual item groups on capable clients.
    #[arg(long)]
    pub force_group_resync: Option<bool>,

    /// Log per-client synchronization timings.
    #[arg(long)]
    pub log_sync_time: Option<bool>,

    /// Send the unfiltered block-state table after full syncs.
    #[arg(long)]
    pub debug_validate_states: Option<bool>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
        if let Some(force) = args.force_group_resync {
            self.sync.force_group_resync = force;
        }
        if let Some(log_time) = args.log_sync_time {
            self.sync.log_sync_time = log_time;
        }
        if let Some(validate) = args.debug_validate_states {
            self.sync.debug_validate_states = validate;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            log_level: Some("trace".to_string()),
            force_group_resync: Some(true),
            ..Default::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.debug.log_level, "trace");
        assert!(config.sync.force_group_resync);
        // Non-overridden fields retain defaults
        assert!(config.sync.log_sync_time);
        assert!(!config.sync.debug_validate_states);
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, original);
    }

    #[test]
    fn test_cli_parses_flags() {
        let args = CliArgs::try_parse_from([
            "mirage",
            "--log-sync-time",
            "false",
            "--config",
            "/tmp/mirage",
        ])
        .unwrap();
        assert_eq!(args.log_sync_time, Some(false));
        assert_eq!(args.config, Some(PathBuf::from("/tmp/mirage")));
    }
}
