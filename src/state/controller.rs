// Docs view controller.
// Drives the listing and active-document load states from the cache and the provider.

use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::cache::CacheStore;
use crate::docs::links::LinkResolver;
use crate::docs::model::{DocumentRecord, contains_slug, default_document, records_for};
use crate::docs::slug::{filename_for, slug_for};
use crate::error::{DocsError, Result};
use crate::github::{ContentProvider, RateLimit};

use super::load::{Failure, LoadState, RetryAction, SiteView};
use super::navigation::{History, NavigateOptions, Navigator, Route};

/// Result of a spawned request, tagged with the ticket it was issued under.
#[derive(Debug)]
pub enum Settled {
    Listing {
        ticket: u64,
        result: Result<Vec<String>>,
    },
    Document {
        ticket: u64,
        filename: String,
        result: Result<String>,
    },
}

/// Orchestrates cache, provider and link rewriting for the docs section.
///
/// Requests run as tokio tasks and report back over a channel; the owner
/// applies results with [`DocsController::poll_settled`] or
/// [`DocsController::settle_next`]. Each call site keeps a ticket, and a
/// result whose ticket is no longer current is dropped.
pub struct DocsController<N: Navigator = History> {
    provider: Arc<dyn ContentProvider>,
    cache: CacheStore,
    resolver: LinkResolver,
    navigator: N,
    default_slug: String,

    route: Route,
    listing: LoadState<Vec<DocumentRecord>>,
    document: LoadState<DocumentRecord>,
    /// Filename the document site is currently targeting.
    active: Option<String>,
    /// Document site is waiting for the listing before it can resolve.
    awaiting_listing: bool,

    listing_ticket: u64,
    document_ticket: u64,
    in_flight: usize,
    tx: UnboundedSender<Settled>,
    rx: UnboundedReceiver<Settled>,
}

impl<N: Navigator> DocsController<N> {
    pub fn new(
        provider: Arc<dyn ContentProvider>,
        cache: CacheStore,
        resolver: LinkResolver,
        navigator: N,
        default_slug: impl Into<String>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let route = Route::parse(navigator.location(), resolver.route_prefix());
        Self {
            provider,
            cache,
            resolver,
            navigator,
            default_slug: default_slug.into(),
            route,
            listing: LoadState::Idle,
            document: LoadState::Idle,
            active: None,
            awaiting_listing: false,
            listing_ticket: 0,
            document_ticket: 0,
            in_flight: 0,
            tx,
            rx,
        }
    }

    pub fn listing(&self) -> &LoadState<Vec<DocumentRecord>> {
        &self.listing
    }

    pub fn document(&self) -> &LoadState<DocumentRecord> {
        &self.document
    }

    pub fn listing_view(&self) -> SiteView<'_, Vec<DocumentRecord>> {
        self.listing.view()
    }

    pub fn document_view(&self) -> SiteView<'_, DocumentRecord> {
        self.document.view()
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    /// Slug of the document the content pane is showing or loading.
    pub fn active_slug(&self) -> Option<&str> {
        self.active.as_deref().map(slug_for)
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    pub fn route_prefix(&self) -> &str {
        self.resolver.route_prefix()
    }

    pub fn rate_limit(&self) -> Option<RateLimit> {
        self.provider.rate_limit()
    }

    /// Whether any request is still outstanding.
    pub fn is_busy(&self) -> bool {
        self.in_flight > 0
    }

    /// Load the listing (cache first) and resolve the current route.
    pub fn mount(&mut self) {
        match self.cache.get_listing() {
            Some(names) => {
                self.listing = LoadState::Success(records_for(&names));
            }
            None => {
                tracing::debug!("listing cache miss");
                self.fetch_listing();
            }
        }
        self.sync_route();
    }

    /// Navigate to a location and resolve it.
    pub fn navigate(&mut self, path: &str) {
        self.navigator.navigate(path, NavigateOptions::default());
        self.sync_route();
    }

    /// Open a document by slug.
    pub fn open(&mut self, slug: &str) {
        let path = Route::Document(slug.to_string()).path(self.resolver.route_prefix());
        self.navigate(&path);
    }

    /// Re-read the navigator's location and bring the document site in line with it.
    pub fn sync_route(&mut self) {
        self.route = Route::parse(self.navigator.location(), self.resolver.route_prefix());

        match self.route.clone() {
            Route::Outside(path) => {
                tracing::debug!(%path, "left docs section");
                self.reset_document();
            }
            Route::Index => {
                self.reset_document();
                self.redirect_to_default();
            }
            Route::Document(slug) => {
                let filename = filename_for(&slug);
                let unchanged = self.active.as_deref() == Some(filename.as_str())
                    && !matches!(self.document, LoadState::Idle);
                if !unchanged {
                    self.active = Some(filename);
                    self.load_document();
                }
            }
        }
    }

    /// Re-run whatever the current error offers to retry, bypassing the cache.
    ///
    /// Returns false when nothing is retryable.
    pub fn retry(&mut self) -> bool {
        let action = self
            .document
            .failure()
            .and_then(|f| f.retry.clone())
            .or_else(|| self.listing.failure().and_then(|f| f.retry.clone()));

        match action {
            Some(RetryAction::Listing) => {
                tracing::info!("retrying listing");
                self.fetch_listing();
                if self.active.is_some() {
                    self.load_document();
                }
                true
            }
            Some(RetryAction::Document { filename }) => {
                if self.active.as_deref() != Some(filename.as_str()) {
                    return false;
                }
                tracing::info!(%filename, "retrying document");
                self.fetch_document(filename);
                true
            }
            None => false,
        }
    }

    /// Drop the cached generation and reload the listing and active document.
    pub fn refresh(&mut self) {
        tracing::info!("refreshing docs");
        self.cache.invalidate();
        self.fetch_listing();
        if self.active.is_some() {
            self.load_document();
        }
    }

    /// Apply every result that has already arrived. Returns true if any was applied.
    pub fn poll_settled(&mut self) -> bool {
        let mut applied = false;
        while let Ok(settled) = self.rx.try_recv() {
            self.apply(settled);
            applied = true;
        }
        applied
    }

    /// Wait for the next result and apply it. Returns false if nothing is in flight.
    pub async fn settle_next(&mut self) -> bool {
        if self.in_flight == 0 {
            return false;
        }
        match self.rx.recv().await {
            Some(settled) => {
                self.apply(settled);
                true
            }
            None => false,
        }
    }

    /// Wait until every outstanding request has settled.
    pub async fn settle_all(&mut self) {
        while self.settle_next().await {}
    }

    fn apply(&mut self, settled: Settled) {
        self.in_flight = self.in_flight.saturating_sub(1);
        match settled {
            Settled::Listing { ticket, result } => self.apply_listing(ticket, result),
            Settled::Document {
                ticket,
                filename,
                result,
            } => self.apply_document(ticket, filename, result),
        }
    }

    fn apply_listing(&mut self, ticket: u64, result: Result<Vec<String>>) {
        if ticket != self.listing_ticket {
            tracing::debug!(ticket, current = self.listing_ticket, "discarding stale listing");
            return;
        }

        match result {
            Ok(names) => {
                self.cache.set_listing(&names);
                self.listing = LoadState::Success(records_for(&names));
            }
            Err(e) => {
                tracing::warn!(error = %e, "listing failed");
                self.listing = LoadState::Error(Failure::from_error(&e, RetryAction::Listing));
            }
        }

        if self.awaiting_listing {
            self.load_document();
        }
        self.redirect_to_default();
    }

    fn apply_document(&mut self, ticket: u64, filename: String, result: Result<String>) {
        if ticket != self.document_ticket || self.active.as_deref() != Some(filename.as_str()) {
            tracing::debug!(%filename, ticket, current = self.document_ticket, "discarding stale document");
            return;
        }

        match result {
            Ok(body) => {
                self.cache.set_content(&filename, &body);
                self.document = LoadState::Success(self.render(&filename, &body));
            }
            Err(e) => {
                tracing::warn!(%filename, error = %e, "document failed");
                self.document =
                    LoadState::Error(Failure::from_error(&e, RetryAction::Document { filename }));
            }
        }
    }

    /// Resolve the active filename against the listing, then the cache, then the network.
    fn load_document(&mut self) {
        self.document_ticket += 1;
        self.awaiting_listing = false;
        let Some(filename) = self.active.clone() else {
            self.document = LoadState::Idle;
            return;
        };

        let records = match &self.listing {
            LoadState::Success(records) => records,
            LoadState::Error(failure) => {
                self.document = LoadState::Error(Failure::new(
                    failure.message.clone(),
                    failure.retry.clone(),
                ));
                return;
            }
            LoadState::Idle | LoadState::Loading => {
                self.awaiting_listing = true;
                self.document = LoadState::Loading;
                return;
            }
        };

        let slug = slug_for(&filename);
        if !contains_slug(records, slug) {
            let error = DocsError::NotFound(slug.to_string());
            tracing::info!(%filename, "document not in listing");
            self.document = LoadState::Error(Failure::new(error.user_message(), None));
            return;
        }

        match self.cache.get_content(&filename) {
            Some(body) => {
                self.document = LoadState::Success(self.render(&filename, &body));
            }
            None => {
                tracing::debug!(%filename, "document cache miss");
                self.fetch_document(filename);
            }
        }
    }

    fn fetch_listing(&mut self) {
        self.listing_ticket += 1;
        self.listing = LoadState::Loading;

        let ticket = self.listing_ticket;
        let provider = Arc::clone(&self.provider);
        let tx = self.tx.clone();
        self.in_flight += 1;
        tokio::spawn(async move {
            let result = provider.list_documents().await;
            let _ = tx.send(Settled::Listing { ticket, result });
        });
    }

    fn fetch_document(&mut self, filename: String) {
        self.document_ticket += 1;
        self.awaiting_listing = false;
        self.document = LoadState::Loading;

        let ticket = self.document_ticket;
        let provider = Arc::clone(&self.provider);
        let tx = self.tx.clone();
        self.in_flight += 1;
        tokio::spawn(async move {
            let result = provider.fetch_document(&filename).await;
            let _ = tx.send(Settled::Document {
                ticket,
                filename,
                result,
            });
        });
    }

    fn reset_document(&mut self) {
        self.document_ticket += 1;
        self.active = None;
        self.awaiting_listing = false;
        self.document = LoadState::Idle;
    }

    fn redirect_to_default(&mut self) {
        if self.route != Route::Index {
            return;
        }
        let Some(records) = self.listing.data() else {
            return;
        };
        let Some(doc) = default_document(records, &self.default_slug) else {
            tracing::debug!("listing is empty, no default document");
            return;
        };

        let prefix = self.resolver.route_prefix();
        let target = Route::Document(doc.slug.clone());
        let path = target.path(prefix);
        if Route::parse(&path, prefix) != target {
            tracing::warn!(%path, "default document has no stable route, not redirecting");
            return;
        }
        tracing::info!(%path, "redirecting to default document");
        self.navigator
            .navigate(&path, NavigateOptions { replace: true });
        self.sync_route();
    }

    fn render(&self, filename: &str, body: &str) -> DocumentRecord {
        DocumentRecord::from_filename(filename).with_content(self.resolver.rewrite(body))
    }
}

impl DocsController<History> {
    /// Go back one history entry. Returns false at the first entry.
    pub fn go_back(&mut self) -> bool {
        if self.navigator.back() {
            self.sync_route();
            true
        } else {
            false
        }
    }

    pub fn can_go_back(&self) -> bool {
        self.navigator.can_go_back()
    }
}
