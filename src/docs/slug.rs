// Slug and title derivation for remote document filenames.
// Pure functions; existence is checked by callers against the listing.

/// Extension of documents served by the viewer.
pub const MARKDOWN_EXT: &str = ".md";

/// Whether `name` looks like a markdown document.
pub fn is_markdown(name: &str) -> bool {
    name.len() > MARKDOWN_EXT.len() && name.ends_with(MARKDOWN_EXT)
}

/// Slug for a filename: the name without its markdown extension.
pub fn slug_for(filename: &str) -> &str {
    filename.strip_suffix(MARKDOWN_EXT).unwrap_or(filename)
}

/// Display title: slug with `-` and `_` replaced by spaces.
pub fn title_for(filename: &str) -> String {
    slug_for(filename).replace(['-', '_'], " ")
}

/// Remote filename for a slug.
pub fn filename_for(slug: &str) -> String {
    format!("{}{}", slug, MARKDOWN_EXT)
}
