// GitHub API module.
// Client, contents API types, and the content provider built on them.

pub mod client;
pub mod endpoints;
pub mod provider;
pub mod types;

pub use client::GitHubClient;
pub use provider::{ContentProvider, GitHubProvider};
pub use types::RateLimit;
