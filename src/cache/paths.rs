// Filesystem locations used by docview.
// Resolves the per-user cache, config, and log paths.

use std::path::PathBuf;

use directories::ProjectDirs;

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "docview")
}

/// Get the base cache directory (~/.cache/docview on Linux).
pub fn cache_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.cache_dir().to_path_buf())
}

/// Directory holding the cached listing, bodies, and generation stamp.
pub fn entries_dir() -> Option<PathBuf> {
    cache_dir().map(|dir| dir.join("entries"))
}

/// Default path of the TOML configuration file.
pub fn config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Default path of the log file.
pub fn log_path() -> Option<PathBuf> {
    cache_dir().map(|dir| dir.join("docview.log"))
}
