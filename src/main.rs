// docview: terminal viewer for markdown guides hosted on GitHub.
// Wires config, logging, cache, provider and the TUI together.

mod app;
mod cache;
mod cli;
mod config;
mod docs;
mod error;
mod github;
mod logging;
mod state;
mod ui;

use std::io;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;

use crate::app::App;
use crate::cache::{CacheMedium, CacheStore, FileMedium, MemoryMedium, SystemClock};
use crate::cli::Cli;
use crate::config::Config;
use crate::docs::links::LinkResolver;
use crate::error::Result;
use crate::github::{GitHubClient, GitHubProvider};
use crate::state::{DocsController, History};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("docview: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    cli.apply(&mut config);
    config.validate()?;

    let _log_guard = logging::init(&config.log)?;
    tracing::info!(
        owner = %config.source.owner,
        repo = %config.source.repo,
        branch = %config.source.branch,
        docs_path = %config.source.docs_path,
        "starting docview"
    );

    let mut store = CacheStore::new(
        cache_medium(&config),
        Arc::new(SystemClock),
        &config.cache.namespace,
        config.cache_ttl(),
    );
    if cli.clear_cache {
        tracing::info!("clearing cache");
        store.invalidate();
    } else if store.is_valid() {
        tracing::info!(
            stamp = ?store.generation_stamp(),
            ttl_secs = store.ttl().as_secs(),
            "reusing cached generation"
        );
    } else {
        tracing::debug!("no valid cache generation");
    }

    let client = GitHubClient::new(
        &config.source.api_base,
        &config.source.raw_base,
        config.request_timeout(),
    )?;
    let provider = GitHubProvider::shared(client, &config.source);
    let resolver = LinkResolver::new(config.layout(), config.docs.route_prefix.clone());
    let history = History::new(cli.start_location(&config.docs.route_prefix));
    let controller = DocsController::new(
        provider,
        store,
        resolver,
        history,
        config.docs.default_slug.clone(),
    );

    let source_label = format!(
        "{}/{}@{}",
        config.source.owner, config.source.repo, config.source.branch
    );
    let mut app = App::new(controller, source_label);

    let mut terminal = setup_terminal()?;
    let result = app.run(&mut terminal);
    restore_terminal(&mut terminal)?;
    result?;

    tracing::info!("exiting");
    Ok(())
}

/// File-backed medium in the cache directory, or memory when there is none.
fn cache_medium(config: &Config) -> Box<dyn CacheMedium> {
    match config.cache_dir() {
        Some(dir) => match std::fs::create_dir_all(&dir) {
            Ok(()) => {
                tracing::debug!(dir = %dir.display(), "using file cache");
                Box::new(FileMedium::new(dir))
            }
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "cache directory unavailable, using memory");
                Box::new(MemoryMedium::new())
            }
        },
        None => {
            tracing::warn!("no cache directory for this platform, using memory");
            Box::new(MemoryMedium::new())
        }
    }
}

fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Terminal::new(CrosstermBackend::new(stdout))
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()
}
