// Navigation state management.
// Routes under the docs prefix and the history stack that holds them.

use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};
use serde::{Deserialize, Serialize};

/// Characters escaped in a route segment so a slug survives a round trip.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`');

/// Where the current location points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Route {
    /// The docs section with no document chosen.
    Index,
    /// One document by slug.
    Document(String),
    /// Anywhere outside the docs section.
    Outside(String),
}

impl Route {
    /// Parse a location path against the docs route prefix.
    ///
    /// Query strings and fragments are ignored.
    pub fn parse(path: &str, route_prefix: &str) -> Self {
        let bare = path
            .split(['#', '?'])
            .next()
            .unwrap_or_default()
            .trim_end_matches('/');
        let prefix = route_prefix.trim_end_matches('/');

        let Some(rest) = bare.strip_prefix(prefix) else {
            return Route::Outside(path.to_string());
        };
        if rest.is_empty() {
            return Route::Index;
        }
        match rest.strip_prefix('/') {
            Some(segment) if !segment.is_empty() && !segment.contains('/') => {
                let slug = percent_decode_str(segment).decode_utf8_lossy();
                Route::Document(slug.into_owned())
            }
            _ => Route::Outside(path.to_string()),
        }
    }

    /// Location path for this route. The slug is percent-encoded.
    pub fn path(&self, route_prefix: &str) -> String {
        let prefix = route_prefix.trim_end_matches('/');
        match self {
            Route::Index => prefix.to_string(),
            Route::Document(slug) => {
                format!("{}/{}", prefix, utf8_percent_encode(slug, SEGMENT))
            }
            Route::Outside(path) => path.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavigateOptions {
    /// Replace the current entry instead of pushing a new one.
    pub replace: bool,
}

/// Route boundary the controller reads and drives.
pub trait Navigator {
    /// Current location path.
    fn location(&self) -> &str;

    fn navigate(&mut self, path: &str, options: NavigateOptions);
}

/// Location history stack.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct History {
    /// Stack of locations (bottom = root, top = current)
    stack: Vec<String>,
}

impl History {
    /// Create a new history starting at the given location.
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            stack: vec![root.into()],
        }
    }

    /// Get the current location.
    pub fn current(&self) -> &str {
        self.stack.last().map(String::as_str).unwrap_or_default()
    }

    /// Push a new location onto the stack.
    pub fn push(&mut self, path: impl Into<String>) {
        self.stack.push(path.into());
    }

    /// Replace the current location in place.
    pub fn replace(&mut self, path: impl Into<String>) {
        match self.stack.last_mut() {
            Some(top) => *top = path.into(),
            None => self.stack.push(path.into()),
        }
    }

    /// Pop the current location (go back). Returns false if at root.
    pub fn back(&mut self) -> bool {
        if self.stack.len() > 1 {
            self.stack.pop();
            true
        } else {
            false
        }
    }

    /// Check if we can go back (not at root).
    pub fn can_go_back(&self) -> bool {
        self.stack.len() > 1
    }
}

impl Navigator for History {
    fn location(&self) -> &str {
        self.current()
    }

    fn navigate(&mut self, path: &str, options: NavigateOptions) {
        if path == self.current() {
            return;
        }
        if options.replace {
            self.replace(path);
        } else {
            self.push(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_routes() {
        assert_eq!(Route::parse("/docs", "/docs"), Route::Index);
        assert_eq!(Route::parse("/docs/", "/docs"), Route::Index);
        assert_eq!(
            Route::parse("/docs/Deployment-Guide", "/docs"),
            Route::Document("Deployment-Guide".to_string())
        );
        assert_eq!(
            Route::parse("/docs/Security#tls", "/docs"),
            Route::Document("Security".to_string())
        );
        assert_eq!(
            Route::parse("/settings", "/docs"),
            Route::Outside("/settings".to_string())
        );
        assert_eq!(
            Route::parse("/docsearch", "/docs"),
            Route::Outside("/docsearch".to_string())
        );
        assert_eq!(
            Route::parse("/docs/a/b", "/docs"),
            Route::Outside("/docs/a/b".to_string())
        );
    }

    #[test]
    fn test_route_path_round_trip() {
        let route = Route::Document("Home".to_string());
        assert_eq!(route.path("/docs/"), "/docs/Home");
        assert_eq!(Route::parse(&route.path("/docs"), "/docs"), route);
        assert_eq!(Route::Index.path("/docs"), "/docs");
    }

    #[test]
    fn test_route_path_escapes_reserved_characters() {
        for slug in ["C#-Guide", "#Notes", "What?", "100%", "API Reference", "a/b"] {
            let route = Route::Document(slug.to_string());
            let path = route.path("/docs");
            assert!(!path["/docs/".len()..].contains(['#', '?', '/', ' ']));
            assert_eq!(Route::parse(&path, "/docs"), route);
        }
        assert_eq!(
            Route::Document("C#-Guide".to_string()).path("/docs"),
            "/docs/C%23-Guide"
        );
        assert_eq!(
            Route::parse("/docs/C%23-Guide#setup", "/docs"),
            Route::Document("C#-Guide".to_string())
        );
    }

    #[test]
    fn test_history_stack() {
        let mut history = History::new("/docs");

        assert!(!history.can_go_back());

        history.push("/docs/Home");
        history.push("/docs/Security");
        assert!(history.can_go_back());
        assert_eq!(history.current(), "/docs/Security");

        assert!(history.back());
        assert_eq!(history.current(), "/docs/Home");
        assert!(history.back());

        // Can't pop past root
        assert!(!history.back());
        assert_eq!(history.current(), "/docs");
    }

    #[test]
    fn test_navigate_replace() {
        let mut history = History::new("/docs");
        history.navigate("/docs/Home", NavigateOptions { replace: true });
        assert!(!history.can_go_back());
        assert_eq!(history.location(), "/docs/Home");

        history.navigate("/docs/Security", NavigateOptions::default());
        // Navigating to the current location is a no-op
        history.navigate("/docs/Security", NavigateOptions::default());
        assert!(history.back());
        assert_eq!(history.location(), "/docs/Home");
        assert!(!history.back());
    }
}
