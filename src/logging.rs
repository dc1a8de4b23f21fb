//! Logging initialization.
//!
//! The terminal is taken over by the UI, so log records go to a file.  All
//! modules log through the [`log`] facade; this module only installs the
//! backend.

use std::fs::File;
use std::path::Path;

use log::LevelFilter;
use simplelog::{Config, ConfigBuilder, WriteLogger};

/// Install a file logger writing to `path`.
///
/// The file is truncated on start.  If it cannot be created, or another
/// logger is already installed, a warning is printed and the application runs
/// without file logging.  Returns whether the file logger was installed.
pub fn initialize(path: &Path, level: LevelFilter) -> bool {
    let file = match File::create(path) {
        Ok(file) => file,
        Err(err) => {
            eprintln!("Warning: could not create log file at {}: {err}", path.display());
            return false;
        }
    };

    match WriteLogger::init(level, build_config(), file) {
        Ok(()) => true,
        Err(err) => {
            eprintln!("Warning: could not install logger: {err}");
            false
        }
    }
}

fn build_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .build()
}

/// Initialize a terminal logger for unit tests.
///
/// No-ops if another test already installed a logger.
#[cfg(test)]
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, TermLogger, TerminalMode};

    let _ = TermLogger::init(
        LevelFilter::Debug,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    );
}
