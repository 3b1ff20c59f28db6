// Remote content provider.
// Lists the markdown guides of the docs directory and fetches their bodies.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::SourceConfig;
use crate::docs::slug::is_markdown;
use crate::error::Result;

use super::client::GitHubClient;
use super::types::{ContentEntry, EntryKind, RateLimit};

/// Source of the document listing and raw document bodies.
#[async_trait]
pub trait ContentProvider: Send + Sync {
    /// Markdown filenames in the docs directory, in remote order.
    async fn list_documents(&self) -> Result<Vec<String>>;

    /// Raw body of one document.
    async fn fetch_document(&self, filename: &str) -> Result<String>;

    /// Latest rate limit seen, if the provider tracks one.
    fn rate_limit(&self) -> Option<RateLimit> {
        None
    }
}

/// Provider backed by a public GitHub repository.
pub struct GitHubProvider {
    client: GitHubClient,
    owner: String,
    repo: String,
    branch: String,
    docs_path: String,
}

impl GitHubProvider {
    pub fn new(client: GitHubClient, source: &SourceConfig) -> Self {
        Self {
            client,
            owner: source.owner.clone(),
            repo: source.repo.clone(),
            branch: source.branch.clone(),
            docs_path: source.docs_path.trim_matches('/').to_string(),
        }
    }

    pub fn shared(client: GitHubClient, source: &SourceConfig) -> Arc<dyn ContentProvider> {
        Arc::new(Self::new(client, source))
    }

    fn document_path(&self, filename: &str) -> String {
        if self.docs_path.is_empty() {
            filename.to_string()
        } else {
            format!("{}/{}", self.docs_path, filename)
        }
    }
}

#[async_trait]
impl ContentProvider for GitHubProvider {
    async fn list_documents(&self) -> Result<Vec<String>> {
        let entries = self
            .client
            .list_directory(&self.owner, &self.repo, &self.docs_path, &self.branch)
            .await?;
        let names = markdown_filenames(&entries);
        tracing::info!(
            entries = entries.len(),
            documents = names.len(),
            "listed docs directory"
        );
        Ok(names)
    }

    async fn fetch_document(&self, filename: &str) -> Result<String> {
        let path = self.document_path(filename);
        let body = self
            .client
            .get_raw_file(&self.owner, &self.repo, &self.branch, &path)
            .await?;
        tracing::info!(filename, bytes = body.len(), "fetched document");
        Ok(body)
    }

    fn rate_limit(&self) -> Option<RateLimit> {
        Some(self.client.rate_limit()).filter(RateLimit::is_known)
    }
}

/// Names of markdown files in a directory listing, deduplicated, in listing order.
pub fn markdown_filenames(entries: &[ContentEntry]) -> Vec<String> {
    let mut seen = HashSet::new();
    entries
        .iter()
        .filter(|entry| entry.kind == EntryKind::File && is_markdown(&entry.name))
        .filter(|entry| seen.insert(entry.name.as_str()))
        .map(|entry| entry.name.clone())
        .collect()
}
