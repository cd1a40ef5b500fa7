//! Platform-specific directory paths and log rotation.
//!
//! Uses XDG on Linux, standard locations on macOS/Windows.

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use directories::ProjectDirs;

const QUALIFIER: &str = "dev";
const ORGANIZATION: &str = "roster";
const APPLICATION: &str = "roster";

const LATEST: &str = "latest.log";

/// Maximum number of archived log files to keep.
const MAX_OLD_LOGS: usize = 25;

/// Get the cache directory, where logs are written.
///
/// - Linux: `$XDG_CACHE_HOME/roster` or `~/.cache/roster`
/// - macOS: `~/Library/Caches/dev.roster.roster`
/// - Windows: `C:\Users\<User>\AppData\Local\roster\roster\cache`
pub fn cache_dir() -> Option<PathBuf> {
    ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION).map(|dirs| dirs.cache_dir().to_path_buf())
}

/// Archives `latest.log` in `dir` under a timestamped name and prunes old
/// archives. Returns the path for the new log.
///
/// Call this at startup before creating the new log file.
pub fn rotate_logs(dir: &Path) -> PathBuf {
    let latest = dir.join(LATEST);

    if latest.exists() {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let _ = fs::rename(&latest, dir.join(format!("{timestamp}.log")));
    }

    prune_logs(dir, MAX_OLD_LOGS);
    latest
}

/// Removes the oldest archived logs beyond `keep`.
fn prune_logs(dir: &Path, keep: usize) {
    let Ok(entries) = fs::read_dir(dir) else { return };

    let mut archived: Vec<_> = entries
        .filter_map(|e| e.ok())
        .filter(|e| {
            let name = e.file_name();
            let name = name.to_string_lossy();
            name.ends_with(".log") && name != LATEST
        })
        .collect();

    if archived.len() <= keep {
        return;
    }

    // oldest first
    archived.sort_by_key(|e| e.metadata().and_then(|m| m.modified()).ok());
    for entry in archived.iter().take(archived.len() - keep) {
        let _ = fs::remove_file(entry.path());
    }
}
