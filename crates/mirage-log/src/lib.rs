//! Structured logging for the mirage sync server.
//!
//! Console output with uptime timestamps and module paths, plus JSON file
//! logging in debug builds. The filter honours `RUST_LOG` first and falls back
//! to the configured `debug.log_level`.

use std::fs::File;
use std::path::Path;

use mirage_config::Config;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when neither `RUST_LOG` nor the config provide one.
const DEFAULT_FILTER: &str = "info";

/// Name of the JSON log file written in debug builds.
pub const LOG_FILE_NAME: &str = "mirage.log";

/// Installs the global tracing subscriber.
///
/// `log_dir` is only used when `debug_build` is set; if the directory or file
/// cannot be created, logging continues on the console alone.
///
/// ```no_run
/// use mirage_config::Config;
///
/// let config = Config::default();
/// mirage_log::init_logging(Some("./logs".as_ref()), cfg!(debug_assertions), Some(&config));
/// ```
pub fn init_logging(log_dir: Option<&Path>, debug_build: bool, config: Option<&Config>) {
    let directives = filter_string(config);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&directives));

    let console = fmt::layer()
        .with_target(true)
        .with_thread_names(true)
        .with_timer(fmt::time::uptime());

    let json_file = log_dir
        .filter(|_| debug_build)
        .and_then(open_log_file)
        .map(|file| {
            fmt::layer()
                .json()
                .with_writer(file)
                .with_ansi(false)
                .with_timer(fmt::time::uptime())
        });

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(json_file)
        .init();
}

fn open_log_file(log_dir: &Path) -> Option<File> {
    std::fs::create_dir_all(log_dir).ok()?;
    File::create(log_dir.join(LOG_FILE_NAME)).ok()
}

/// Filter directives from the config, or [`DEFAULT_FILTER`].
fn filter_string(config: Option<&Config>) -> String {
    config
        .map(|config| config.debug.log_level.trim())
        .filter(|level| !level.is_empty())
        .unwrap_or(DEFAULT_FILTER)
        .to_string()
}

/// `EnvFilter` with the default directives.
pub fn default_env_filter() -> EnvFilter {
    EnvFilter::new(DEFAULT_FILTER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_level() {
        assert!(default_env_filter().to_string().contains("info"));
    }

    #[test]
    fn test_filter_string_from_config() {
        let mut config = Config::default();
        config.debug.log_level = " warn,mirage_sync=trace ".to_string();
        assert_eq!(filter_string(Some(&config)), "warn,mirage_sync=trace");
    }

    #[test]
    fn test_empty_level_falls_back_to_default() {
        let mut config = Config::default();
        config.debug.log_level.clear();
        assert_eq!(filter_string(Some(&config)), DEFAULT_FILTER);
        assert_eq!(filter_string(None), DEFAULT_FILTER);
    }

    #[test]
    fn test_crate_directives_parse() {
        for directives in [
            "debug,mirage_sync=trace",
            "warn,mirage_net=debug,mirage_registry=trace",
            "mirage_sync::orchestrator=info",
        ] {
            assert!(EnvFilter::try_new(directives).is_ok(), "{directives}");
        }
    }

    #[test]
    fn test_log_file_is_created_in_missing_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let nested = temp_dir.path().join("logs").join("today");
        assert!(open_log_file(&nested).is_some());
        assert!(nested.join(LOG_FILE_NAME).exists());
    }
}
