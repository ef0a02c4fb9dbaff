//! Log setup. The terminal belongs to the UI, so log lines go to a file.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use crate::config::{self, LoggingSettings};

fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Where logs go: the configured file, else the XDG state default.
pub fn log_path(settings: &LoggingSettings) -> Option<PathBuf> {
    settings.file.clone().or_else(config::default_log_path)
}

/// Install the global logger. `RUST_LOG` overrides `logging.level`.
///
/// If no log file can be opened, logging is discarded.
pub fn init(settings: &LoggingSettings) {
    let target = match log_path(settings).map(|p| (open_log_file(&p), p)) {
        Some((Ok(file), _)) => env_logger::Target::Pipe(Box::new(file)),
        Some((Err(e), path)) => {
            eprintln!("muse: cannot open log file {}: {e}", path.display());
            env_logger::Target::Pipe(Box::new(io::sink()))
        }
        None => env_logger::Target::Pipe(Box::new(io::sink())),
    };

    let result = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(settings.level.as_str()))
        .target(target)
        .try_init();
    if let Err(e) = result {
        eprintln!("muse: logger already initialised: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_file_wins() {
        let settings = LoggingSettings {
            file: Some(PathBuf::from("/tmp/custom.log")),
            level: "debug".to_string(),
        };
        assert_eq!(log_path(&settings), Some(PathBuf::from("/tmp/custom.log")));
    }

    #[test]
    fn log_file_and_parent_dirs_are_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("muse.log");

        open_log_file(&path).unwrap();

        assert!(path.exists());
    }
}
