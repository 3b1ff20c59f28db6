// Document records derived from the remote listing.
// Slug and title are always computed from the filename.

use serde::{Deserialize, Serialize};

use super::slug::{filename_for, slug_for, title_for};

/// A document known to the viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub slug: String,
    pub filename: String,
    pub title: String,
    /// Body with links rewritten, absent until fetched.
    pub content: Option<String>,
}

impl DocumentRecord {
    pub fn from_filename(filename: &str) -> Self {
        Self {
            slug: slug_for(filename).to_string(),
            filename: filename.to_string(),
            title: title_for(filename),
            content: None,
        }
    }

    pub fn with_content(mut self, content: String) -> Self {
        self.content = Some(content);
        self
    }
}

/// Records for every filename in a listing, in listing order.
pub fn records_for(listing: &[String]) -> Vec<DocumentRecord> {
    listing
        .iter()
        .map(|filename| DocumentRecord::from_filename(filename))
        .collect()
}

/// Whether the listing contains the document for `slug`.
pub fn contains_slug(listing: &[DocumentRecord], slug: &str) -> bool {
    let filename = filename_for(slug);
    listing.iter().any(|doc| doc.filename == filename)
}

/// Pick the document to open when no slug was requested.
///
/// Prefers a case-insensitive match on `default_slug`, otherwise the first entry.
pub fn default_document<'a>(
    listing: &'a [DocumentRecord],
    default_slug: &str,
) -> Option<&'a DocumentRecord> {
    listing
        .iter()
        .find(|doc| doc.slug.eq_ignore_ascii_case(default_slug))
        .or_else(|| listing.first())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(names: &[&str]) -> Vec<DocumentRecord> {
        let names: Vec<String> = names.iter().map(|n| n.to_string()).collect();
        records_for(&names)
    }

    #[test]
    fn test_from_filename() {
        let doc = DocumentRecord::from_filename("Deployment-Guide.md");
        assert_eq!(doc.slug, "Deployment-Guide");
        assert_eq!(doc.title, "Deployment Guide");
        assert_eq!(doc.filename, "Deployment-Guide.md");
        assert_eq!(doc.content, None);
    }

    #[test]
    fn test_records_keep_listing_order() {
        let docs = listing(&["Security.md", "Home.md"]);
        let slugs: Vec<&str> = docs.iter().map(|d| d.slug.as_str()).collect();
        assert_eq!(slugs, vec!["Security", "Home"]);
    }

    #[test]
    fn test_contains_slug() {
        let docs = listing(&["Home.md", "Security.md"]);
        assert!(contains_slug(&docs, "Home"));
        assert!(!contains_slug(&docs, "home"));
        assert!(!contains_slug(&docs, "Missing-Doc"));
    }

    #[test]
    fn test_default_prefers_case_insensitive_match() {
        let docs = listing(&["Admin-Guide.md", "Home.md"]);
        assert_eq!(default_document(&docs, "home").unwrap().slug, "Home");
        assert_eq!(default_document(&docs, "Home").unwrap().slug, "Home");
    }

    #[test]
    fn test_default_falls_back_to_first() {
        let docs = listing(&["Admin-Guide.md", "Security.md"]);
        assert_eq!(default_document(&docs, "Home").unwrap().slug, "Admin-Guide");
        assert!(default_document(&[], "Home").is_none());
    }
}
