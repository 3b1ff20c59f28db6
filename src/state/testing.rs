// Test doubles for the controller.
// Scripted content provider and a cache fixture on a temp directory.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;

use crate::cache::clock::FakeClock;
use crate::cache::{CacheStore, DEFAULT_TTL, FileMedium};
use crate::docs::links::{LinkResolver, RepoLayout};
use crate::error::{DocsError, Result};
use crate::github::ContentProvider;

use super::controller::DocsController;
use super::navigation::History;

/// Provider serving a fixed listing and bodies, counting every call.
///
/// Listing requests fail with HTTP 500 while failures remain; bodies
/// that were never added fail with HTTP 404.
#[derive(Default)]
pub struct FakeProvider {
    listing: Vec<String>,
    documents: Mutex<HashMap<String, String>>,
    listing_failures: AtomicUsize,
    listing_calls: AtomicUsize,
    fetch_calls: Mutex<Vec<String>>,
}

impl FakeProvider {
    pub fn new(listing: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            listing: listing.iter().map(|name| name.to_string()).collect(),
            ..Self::default()
        })
    }

    pub fn with_document(self: Arc<Self>, filename: &str, body: &str) -> Arc<Self> {
        self.add_document(filename, body);
        self
    }

    pub fn fail_listing(self: Arc<Self>, times: usize) -> Arc<Self> {
        self.listing_failures.store(times, Ordering::SeqCst);
        self
    }

    pub fn add_document(&self, filename: &str, body: &str) {
        if let Ok(mut documents) = self.documents.lock() {
            documents.insert(filename.to_string(), body.to_string());
        }
    }

    pub fn listing_calls(&self) -> usize {
        self.listing_calls.load(Ordering::SeqCst)
    }

    /// Filenames fetched so far, in request order.
    pub fn fetch_calls(&self) -> Vec<String> {
        self.fetch_calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ContentProvider for FakeProvider {
    async fn list_documents(&self) -> Result<Vec<String>> {
        self.listing_calls.fetch_add(1, Ordering::SeqCst);
        let failing = self
            .listing_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(DocsError::RemoteUnavailable {
                url: "https://api.github.com/repos/clovalink/clovalink/contents/docs".to_string(),
                status: 500,
            });
        }
        Ok(self.listing.clone())
    }

    async fn fetch_document(&self, filename: &str) -> Result<String> {
        if let Ok(mut calls) = self.fetch_calls.lock() {
            calls.push(filename.to_string());
        }
        let body = self
            .documents
            .lock()
            .ok()
            .and_then(|documents| documents.get(filename).cloned());
        body.ok_or_else(|| DocsError::RemoteUnavailable {
            url: format!(
                "https://raw.githubusercontent.com/clovalink/clovalink/main/docs/{}",
                filename
            ),
            status: 404,
        })
    }
}

/// Cache directory and clock shared by a controller and the test body.
pub struct Fixture {
    dir: TempDir,
    pub clock: Arc<FakeClock>,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
            clock: Arc::new(FakeClock::default()),
        }
    }

    /// A fresh store over the fixture's cache directory.
    pub fn store(&self) -> CacheStore {
        CacheStore::new(
            Box::new(FileMedium::new(self.dir.path())),
            self.clock.clone(),
            "docview",
            DEFAULT_TTL,
        )
    }

    pub fn resolver() -> LinkResolver {
        let layout = RepoLayout::new(
            "https://raw.githubusercontent.com",
            "clovalink",
            "clovalink",
            "main",
            "docs",
            None,
        );
        LinkResolver::new(layout, "/docs")
    }

    pub fn controller(
        &self,
        provider: Arc<FakeProvider>,
        location: &str,
    ) -> DocsController<History> {
        DocsController::new(
            provider,
            self.store(),
            Self::resolver(),
            History::new(location),
            "Home",
        )
    }
}
