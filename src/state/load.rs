// Load state for async data.
// One state machine per call site, plus the snapshot handed to the UI.

use crate::error::DocsError;

/// What retrying a failed load re-runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryAction {
    /// Fetch the listing again.
    Listing,
    /// Fetch one document body again.
    Document { filename: String },
}

/// Why a call site is in the error state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub message: String,
    /// `None` for terminal errors such as a missing document.
    pub retry: Option<RetryAction>,
}

impl Failure {
    pub fn new(message: impl Into<String>, retry: Option<RetryAction>) -> Self {
        Self {
            message: message.into(),
            retry,
        }
    }

    /// Failure for an error, retryable with `action` when the error class allows it.
    pub fn from_error(error: &DocsError, action: RetryAction) -> Self {
        let retry = error.is_retryable().then_some(action);
        Self::new(error.user_message(), retry)
    }
}

/// Loading state for async data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadState<T> {
    #[default]
    Idle,
    Loading,
    Success(T),
    Error(Failure),
}

impl<T> LoadState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadState::Success(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, LoadState::Error(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            LoadState::Success(data) => Some(data),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            LoadState::Error(failure) => Some(failure),
            _ => None,
        }
    }

    pub fn status(&self) -> LoadStatus {
        match self {
            LoadState::Idle => LoadStatus::Idle,
            LoadState::Loading => LoadStatus::Loading,
            LoadState::Success(_) => LoadStatus::Success,
            LoadState::Error(_) => LoadStatus::Error,
        }
    }

    /// Borrowed snapshot for the presentation layer.
    pub fn view(&self) -> SiteView<'_, T> {
        let failure = self.failure();
        SiteView {
            status: self.status(),
            data: self.data(),
            error: failure.map(|f| f.message.as_str()),
            retry: failure.and_then(|f| f.retry.as_ref()),
        }
    }
}

/// Status tag of a [`LoadState`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    Idle,
    Loading,
    Success,
    Error,
}

/// What the UI reads for one call site.
#[derive(Debug, PartialEq, Eq)]
pub struct SiteView<'a, T> {
    pub status: LoadStatus,
    pub data: Option<&'a T>,
    pub error: Option<&'a str>,
    pub retry: Option<&'a RetryAction>,
}

impl<T> Clone for SiteView<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for SiteView<'_, T> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_idle() {
        let state: LoadState<u32> = LoadState::default();
        assert_eq!(state.status(), LoadStatus::Idle);
        assert!(!state.is_loading());
        assert!(state.data().is_none());
    }

    #[test]
    fn test_view_of_success() {
        let state = LoadState::Success(vec!["Home.md".to_string()]);
        let view = state.view();
        assert_eq!(view.status, LoadStatus::Success);
        assert_eq!(view.data.map(Vec::len), Some(1));
        assert!(view.error.is_none());
        assert!(view.retry.is_none());
    }

    #[test]
    fn test_view_of_error() {
        let state: LoadState<()> =
            LoadState::Error(Failure::new("boom", Some(RetryAction::Listing)));
        let view = state.view();
        assert_eq!(view.status, LoadStatus::Error);
        assert_eq!(view.error, Some("boom"));
        assert_eq!(view.retry, Some(&RetryAction::Listing));
        assert!(view.data.is_none());
    }

    #[test]
    fn test_failure_from_error() {
        let remote = DocsError::RemoteUnavailable {
            url: "https://api.github.com/x".to_string(),
            status: 503,
        };
        let failure = Failure::from_error(&remote, RetryAction::Listing);
        assert_eq!(failure.retry, Some(RetryAction::Listing));
        assert!(failure.message.contains("503"));

        let missing = DocsError::NotFound("Missing-Doc".to_string());
        let failure = Failure::from_error(
            &missing,
            RetryAction::Document {
                filename: "Missing-Doc.md".to_string(),
            },
        );
        assert_eq!(failure.retry, None);
    }
}
