//! Logger setup.
//!
//! The terminal belongs to the UI while the app runs, so log output goes to
//! a file.  Tests get a terminal logger instead.

use std::fs::{self, File};
use std::path::Path;

use log::LevelFilter;
use simplelog::{Config, ConfigBuilder, WriteLogger};

/// Install a file logger writing to `path`.
///
/// If the file cannot be created a warning goes to stderr and the app runs
/// without logging.
pub fn initialize(path: &Path, level: LevelFilter) {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            if let Err(err) = fs::create_dir_all(parent) {
                eprintln!("Warning: Could not create log directory {:?}: {}", parent, err);
                return;
            }
        }
    }

    match File::create(path) {
        Ok(file) => {
            let _ = WriteLogger::init(level, build_config(), file);
        }
        Err(err) => {
            eprintln!("Warning: Could not create log file at {:?}: {}", path, err);
        }
    }
}

fn build_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .build()
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
#[cfg(test)]
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, TermLogger, TerminalMode};

    let level = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = TermLogger::init(level, Config::default(), TerminalMode::Mixed, ColorChoice::Auto);
}
