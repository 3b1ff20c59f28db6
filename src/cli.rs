// Command line arguments.
// Flags override values from the config file.

use std::path::PathBuf;

use clap::Parser;

use crate::config::Config;
use crate::state::Route;

#[derive(Debug, Parser)]
#[command(
    name = "docview",
    version,
    about = "Browse markdown guides hosted in a GitHub repository"
)]
pub struct Cli {
    /// Guide to open first (filename without .md).
    #[arg(value_name = "SLUG")]
    pub slug: Option<String>,

    /// Config file (default: per-user config directory).
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Repository owner.
    #[arg(long)]
    pub owner: Option<String>,

    /// Repository name.
    #[arg(long)]
    pub repo: Option<String>,

    /// Branch to read guides from.
    #[arg(long)]
    pub branch: Option<String>,

    /// Documentation directory inside the repository.
    #[arg(long = "docs-path", value_name = "PATH")]
    pub docs_path: Option<String>,

    /// Log level filter (overridden by RUST_LOG).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Drop the cached listing and bodies before starting.
    #[arg(long = "clear-cache")]
    pub clear_cache: bool,
}

impl Cli {
    /// Apply flag overrides on top of a loaded config.
    pub fn apply(&self, config: &mut Config) {
        let source = &mut config.source;
        if let Some(owner) = &self.owner {
            source.owner = owner.clone();
        }
        if let Some(repo) = &self.repo {
            source.repo = repo.clone();
        }
        if let Some(branch) = &self.branch {
            source.branch = branch.clone();
        }
        if let Some(docs_path) = &self.docs_path {
            source.docs_path = docs_path.clone();
        }
        if let Some(level) = &self.log_level {
            config.log.level = level.clone();
        }
    }

    /// Location to start at: the requested guide, or the docs index.
    pub fn start_location(&self, route_prefix: &str) -> String {
        let route = match self.slug.as_deref().map(|s| s.trim_end_matches(".md")) {
            Some(slug) if !slug.is_empty() => Route::Document(slug.to_string()),
            _ => Route::Index,
        };
        route.path(route_prefix)
    }
}
