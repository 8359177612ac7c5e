//! Where the CLI keeps its files.
//!
//! The session database lives in the platform data directory. Each
//! `--log-file` run writes its own timestamped file under `<cache>/logs`,
//! and only the newest [`MAX_KEPT_LOGS`] are kept.

use std::fs;
use std::fs::File;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use directories::ProjectDirs;

const LOG_PREFIX: &str = "datagrid-";
const LOG_SUFFIX: &str = ".log";

/// Log files kept across runs, including the one being written.
pub const MAX_KEPT_LOGS: usize = 10;

/// Resolved application directories.
#[derive(Debug, Clone)]
pub struct AppDirs {
    data: PathBuf,
    cache: PathBuf,
}

/// A freshly opened log file and anything that went wrong pruning old ones.
///
/// Pruning problems are returned instead of logged because the logger is not
/// installed yet when the file is opened.
pub struct LogFile {
    pub file: File,
    pub path: PathBuf,
    pub problems: Vec<String>,
}

impl AppDirs {
    /// Platform locations (XDG on Linux), or `None` without a home directory.
    pub fn discover() -> Option<Self> {
        ProjectDirs::from("dev", "datagrid", "datagrid").map(|dirs| Self {
            data: dirs.data_dir().to_path_buf(),
            cache: dirs.cache_dir().to_path_buf(),
        })
    }

    /// Everything under one root; `data/` and `cache/` below it.
    #[cfg(test)]
    pub fn under(root: &Path) -> Self {
        Self {
            data: root.join("data"),
            cache: root.join("cache"),
        }
    }

    /// Default session database.
    pub fn session_db(&self) -> PathBuf {
        self.data.join("session.db")
    }

    /// Directory holding the per-run log files.
    pub fn logs_dir(&self) -> PathBuf {
        self.cache.join("logs")
    }

    /// Creates a new log file for this run and prunes old ones.
    pub fn open_log_file(&self) -> io::Result<LogFile> {
        let dir = self.logs_dir();
        fs::create_dir_all(&dir)?;

        let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S%.3f");
        let path = dir.join(format!("{}{}{}", LOG_PREFIX, stamp, LOG_SUFFIX));
        let file = File::create(&path)?;
        let problems = prune_logs(&dir, MAX_KEPT_LOGS);

        Ok(LogFile {
            file,
            path,
            problems,
        })
    }
}

fn is_log_name(name: &str) -> bool {
    name.starts_with(LOG_PREFIX) && name.ends_with(LOG_SUFFIX)
}

/// Deletes all but the `keep` newest log files in `dir`.
///
/// File names carry a sortable timestamp, so name order is age order.
fn prune_logs(dir: &Path, keep: usize) -> Vec<String> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => return vec![format!("cannot list {}: {}", dir.display(), e)],
    };

    let mut logs: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .filter(|e| is_log_name(&e.file_name().to_string_lossy()))
        .map(|e| e.path())
        .collect();
    logs.sort();

    let excess = logs.len().saturating_sub(keep);
    logs.iter()
        .take(excess)
        .filter_map(|path| {
            fs::remove_file(path)
                .err()
                .map(|e| format!("cannot remove old log {}: {}", path.display(), e))
        })
        .collect()
}
