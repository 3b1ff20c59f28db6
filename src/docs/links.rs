// Link and image rewriting for fetched documents.
// Turns repository-relative references into raw-content URLs and in-app routes.

use std::ops::Range;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::slug::{is_markdown, slug_for};

/// Inline markdown link or image, allowing one nested image in the link text.
static INLINE_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(!?)\[((?:[^\[\]]|\[[^\[\]]*\])*)\]\(\s*([^()\s]*)((?:\s+(?:"[^"]*"|'[^']*'))?)\s*\)"#,
    )
    .expect("inline link regex is valid")
});

/// `src=` / `href=` attributes in raw HTML.
static HTML_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b(src|href)(\s*=\s*)(?:"([^"]*)"|'([^']*)')"#)
        .expect("html attribute regex is valid")
});

/// Reference-style link definitions (`[label]: target`), excluding footnotes.
static REFERENCE_DEF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^( {0,3}\[[^\]^][^\]]*\]:[ \t]*)(\S+)")
        .expect("reference definition regex is valid")
});

/// Where documentation files live inside the remote repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoLayout {
    /// Raw-content URL of the repository root at the configured branch.
    pub raw_content_base: String,
    /// Documentation directory, relative to the repository root.
    pub docs_root: String,
    /// Directory that `../` in a document refers to.
    pub parent_root: String,
}

impl RepoLayout {
    /// Build a layout; `parent_root` defaults to the parent of `docs_root`.
    pub fn new(
        raw_base: &str,
        owner: &str,
        repo: &str,
        branch: &str,
        docs_root: &str,
        parent_root: Option<&str>,
    ) -> Self {
        let docs_root = docs_root.trim_matches('/').to_string();
        let parent_root = match parent_root {
            Some(parent) => parent.trim_matches('/').to_string(),
            None => docs_root
                .rsplit_once('/')
                .map(|(parent, _)| parent.to_string())
                .unwrap_or_default(),
        };

        Self {
            raw_content_base: join_url(&[raw_base.trim_end_matches('/'), owner, repo, branch]),
            docs_root,
            parent_root,
        }
    }

    fn raw_url(&self, root: &str, path: &str) -> String {
        join_url(&[&self.raw_content_base, root, path])
    }
}

/// Join URL parts with single slashes, skipping empty parts.
fn join_url(parts: &[&str]) -> String {
    parts
        .iter()
        .enumerate()
        .map(|(i, part)| {
            if i == 0 {
                part.trim_end_matches('/')
            } else {
                part.trim_matches('/')
            }
        })
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Whether a reference already names a full location.
fn is_absolute(raw: &str) -> bool {
    if raw.starts_with("http") || raw.starts_with("//") {
        return true;
    }

    // Any other URI scheme (mailto:, data:, ...)
    match raw.split_once(':') {
        Some((scheme, _)) => {
            let mut chars = scheme.chars();
            chars.next().is_some_and(|c| c.is_ascii_alphabetic())
                && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}

/// Resolve an image or file reference found in a document to a fetchable URL.
pub fn resolve_asset_url(raw: &str, layout: &RepoLayout) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') || is_absolute(trimmed) {
        return raw.to_string();
    }

    if let Some(mut rest) = trimmed.strip_prefix("../") {
        let mut base: Vec<&str> = layout
            .parent_root
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();
        while let Some(next) = rest.strip_prefix("../") {
            base.pop();
            rest = next;
        }
        return layout.raw_url(&base.join("/"), rest);
    }

    if let Some(rest) = trimmed.strip_prefix('/') {
        return layout.raw_url("", rest);
    }

    let rest = trimmed.strip_prefix("./").unwrap_or(trimmed);
    layout.raw_url(&layout.docs_root, rest)
}

/// Rewrite a link to another markdown document into an in-app route.
pub fn resolve_cross_doc_link(raw: &str, route_prefix: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() || is_absolute(trimmed) {
        return raw.to_string();
    }

    let (path, fragment) = match trimmed.split_once('#') {
        Some((path, fragment)) => (path, Some(fragment)),
        None => (trimmed, None),
    };
    let filename = path.rsplit('/').next().unwrap_or(path);
    if !is_markdown(filename) {
        return raw.to_string();
    }

    let mut route = format!(
        "{}/{}",
        route_prefix.trim_end_matches('/'),
        slug_for(filename)
    );
    if let Some(fragment) = fragment {
        route.push('#');
        route.push_str(fragment);
    }
    route
}

/// Rewrites every reference in a document body in one pass.
#[derive(Debug, Clone)]
pub struct LinkResolver {
    layout: RepoLayout,
    route_prefix: String,
}

impl LinkResolver {
    pub fn new(layout: RepoLayout, route_prefix: impl Into<String>) -> Self {
        Self {
            layout,
            route_prefix: route_prefix.into(),
        }
    }

    pub fn route_prefix(&self) -> &str {
        &self.route_prefix
    }

    /// Resolve an image source.
    pub fn resolve_asset(&self, raw: &str) -> String {
        resolve_asset_url(raw, &self.layout)
    }

    /// Resolve a link target: documents become routes, other relative files raw URLs.
    pub fn resolve_link(&self, raw: &str) -> String {
        let routed = resolve_cross_doc_link(raw, &self.route_prefix);
        if routed != raw {
            return routed;
        }
        resolve_asset_url(raw, &self.layout)
    }

    /// Rewrite links and images in a markdown body, leaving fenced code untouched.
    pub fn rewrite(&self, body: &str) -> String {
        let mut output = String::with_capacity(body.len());
        let mut prose = String::new();
        let mut fence: Option<&str> = None;

        for line in body.split_inclusive('\n') {
            let marker = fence_marker(line);
            match (fence, marker) {
                (None, Some(open)) => {
                    output.push_str(&self.rewrite_prose(&prose));
                    prose.clear();
                    output.push_str(line);
                    fence = Some(open);
                }
                (None, None) => prose.push_str(line),
                (Some(open), Some(close)) if close == open => {
                    output.push_str(line);
                    fence = None;
                }
                (Some(_), _) => output.push_str(line),
            }
        }
        output.push_str(&self.rewrite_prose(&prose));
        output
    }

    fn rewrite_prose(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }
        let text = self.rewrite_inline(text);
        let code = code_spans(&text);
        let text = HTML_ATTR.replace_all(&text, |caps: &Captures| {
            if in_code(&code, caps.get(0).map_or(0, |m| m.start())) {
                return caps[0].to_string();
            }
            let attr = &caps[1];
            let (quote, value) = match (caps.get(3), caps.get(4)) {
                (Some(value), _) => ('"', value.as_str()),
                (None, Some(value)) => ('\'', value.as_str()),
                (None, None) => ('"', ""),
            };
            let resolved = if attr.eq_ignore_ascii_case("src") {
                self.resolve_asset(value)
            } else {
                self.resolve_link(value)
            };
            format!("{}{}{}{}{}", attr, &caps[2], quote, resolved, quote)
        });
        REFERENCE_DEF
            .replace_all(&text, |caps: &Captures| {
                format!("{}{}", &caps[1], self.resolve_link(&caps[2]))
            })
            .into_owned()
    }

    fn rewrite_inline(&self, text: &str) -> String {
        let code = code_spans(text);
        INLINE_LINK
            .replace_all(text, |caps: &Captures| {
                if in_code(&code, caps.get(0).map_or(0, |m| m.start())) {
                    return caps[0].to_string();
                }
                let is_image = !caps[1].is_empty();
                let title = &caps[4];
                if is_image {
                    format!("![{}]({}{})", &caps[2], self.resolve_asset(&caps[3]), title)
                } else {
                    format!(
                        "[{}]({}{})",
                        self.rewrite_inline(&caps[2]),
                        self.resolve_link(&caps[3]),
                        title
                    )
                }
            })
            .into_owned()
    }
}

/// Byte ranges of inline code spans: a backtick run up to the next run of the same length.
fn code_spans(text: &str) -> Vec<Range<usize>> {
    let bytes = text.as_bytes();
    let run_at = |start: usize| bytes[start..].iter().take_while(|&&b| b == b'`').count();

    let mut spans = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'`' {
            i += 1;
            continue;
        }
        let open = run_at(i);
        let mut j = i + open;
        let mut close = None;
        while j < bytes.len() {
            if bytes[j] == b'`' {
                let run = run_at(j);
                if run == open {
                    close = Some(j + run);
                    break;
                }
                j += run;
            } else {
                j += 1;
            }
        }
        match close {
            Some(end) => {
                spans.push(i..end);
                i = end;
            }
            // Unmatched run is literal text
            None => i += open,
        }
    }
    spans
}

fn in_code(spans: &[Range<usize>], offset: usize) -> bool {
    spans.iter().any(|span| span.contains(&offset))
}

/// Fence marker (``` or ~~~) opening or closing a code block on this line.
fn fence_marker(line: &str) -> Option<&'static str> {
    let trimmed = line.trim_start();
    if trimmed.starts_with("```") {
        Some("```")
    } else if trimmed.starts_with("~~~") {
        Some("~~~")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAW: &str = "https://raw.githubusercontent.com/clovalink/clovalink/main";

    fn layout() -> RepoLayout {
        RepoLayout::new(
            "https://raw.githubusercontent.com",
            "clovalink",
            "clovalink",
            "main",
            "docs",
            None,
        )
    }

    fn resolver() -> LinkResolver {
        LinkResolver::new(layout(), "/docs")
    }

    #[test]
    fn test_layout_defaults_parent_to_docs_parent() {
        let top = layout();
        assert_eq!(top.raw_content_base, RAW);
        assert_eq!(top.docs_root, "docs");
        assert_eq!(top.parent_root, "");

        let nested = RepoLayout::new(
            "https://raw.githubusercontent.com/",
            "o",
            "r",
            "dev",
            "/docs/wiki/",
            None,
        );
        assert_eq!(nested.raw_content_base, "https://raw.githubusercontent.com/o/r/dev");
        assert_eq!(nested.docs_root, "docs/wiki");
        assert_eq!(nested.parent_root, "docs");
    }

    #[test]
    fn test_asset_parent_marker_maps_to_sibling() {
        assert_eq!(
            resolve_asset_url("../assets/diagram.png", &layout()),
            format!("{}/assets/diagram.png", RAW)
        );

        let nested = RepoLayout::new(
            "https://raw.githubusercontent.com",
            "clovalink",
            "clovalink",
            "main",
            "docs/wiki",
            None,
        );
        assert_eq!(
            resolve_asset_url("../assets/diagram.png", &nested),
            format!("{}/docs/assets/diagram.png", RAW)
        );
        assert_eq!(
            resolve_asset_url("../../logo.svg", &nested),
            format!("{}/logo.svg", RAW)
        );
    }

    #[test]
    fn test_asset_parent_root_is_configurable() {
        let custom = RepoLayout::new(
            "https://raw.githubusercontent.com",
            "clovalink",
            "clovalink",
            "main",
            "docs",
            Some("website/public"),
        );
        assert_eq!(
            resolve_asset_url("../assets/diagram.png", &custom),
            format!("{}/website/public/assets/diagram.png", RAW)
        );
    }

    #[test]
    fn test_asset_relative_to_docs_root() {
        assert_eq!(
            resolve_asset_url("images/a.png", &layout()),
            format!("{}/docs/images/a.png", RAW)
        );
        assert_eq!(
            resolve_asset_url("./images/a.png", &layout()),
            format!("{}/docs/images/a.png", RAW)
        );
        assert_eq!(
            resolve_asset_url("/branding/logo.png", &layout()),
            format!("{}/branding/logo.png", RAW)
        );
    }

    #[test]
    fn test_asset_pass_through() {
        for raw in [
            "",
            "   ",
            "https://example.com/a.png",
            "http://example.com/a.png",
            "//cdn.example.com/a.png",
            "data:image/png;base64,AAAA",
            "mailto:team@example.com",
            "#section",
        ] {
            assert_eq!(resolve_asset_url(raw, &layout()), raw);
        }
    }

    #[test]
    fn test_asset_resolution_is_idempotent() {
        for raw in ["../assets/diagram.png", "images/a.png", "/x.png", "https://a/b"] {
            let once = resolve_asset_url(raw, &layout());
            assert_eq!(resolve_asset_url(&once, &layout()), once);
        }
    }

    #[test]
    fn test_cross_doc_links() {
        assert_eq!(resolve_cross_doc_link("Security.md", "/docs"), "/docs/Security");
        assert_eq!(resolve_cross_doc_link("./Admin-Guide.md", "/docs"), "/docs/Admin-Guide");
        assert_eq!(
            resolve_cross_doc_link("../wiki/API-Reference.md#auth", "/docs/"),
            "/docs/API-Reference#auth"
        );
        assert_eq!(resolve_cross_doc_link("https://x.org/a.md", "/docs"), "https://x.org/a.md");
        assert_eq!(resolve_cross_doc_link("image.png", "/docs"), "image.png");
        assert_eq!(resolve_cross_doc_link("#top", "/docs"), "#top");
        assert_eq!(resolve_cross_doc_link("", "/docs"), "");
    }

    #[test]
    fn test_resolve_link_falls_back_to_asset() {
        let resolver = resolver();
        assert_eq!(resolver.resolve_link("Home.md"), "/docs/Home");
        assert_eq!(
            resolver.resolve_link("../LICENSE"),
            format!("{}/LICENSE", RAW)
        );
        assert_eq!(resolver.resolve_link("#install"), "#install");
    }

    #[test]
    fn test_rewrite_html_image() {
        let body = "# Architecture\n\n<img src=\"../assets/diagram.png\" width=\"600\">\n";
        let rewritten = resolver().rewrite(body);
        assert_eq!(
            rewritten,
            format!(
                "# Architecture\n\n<img src=\"{}/assets/diagram.png\" width=\"600\">\n",
                RAW
            )
        );
    }

    #[test]
    fn test_rewrite_markdown_links_and_images() {
        let body = "See [Security](Security.md \"Security\") and ![chart](img/chart.png).\n\
                    Visit [site](https://clovalink.org).\n";
        let rewritten = resolver().rewrite(body);
        assert_eq!(
            rewritten,
            format!(
                "See [Security](/docs/Security \"Security\") and ![chart]({}/docs/img/chart.png).\n\
                 Visit [site](https://clovalink.org).\n",
                RAW
            )
        );
    }

    #[test]
    fn test_rewrite_image_nested_in_link() {
        let body = "[![badge](../assets/badge.svg)](Deployment-Guide.md)";
        assert_eq!(
            resolver().rewrite(body),
            format!("[![badge]({}/assets/badge.svg)](/docs/Deployment-Guide)", RAW)
        );
    }

    #[test]
    fn test_rewrite_skips_inline_code() {
        let body = "Use `<img src=\"a.png\">` or ``[x](Home.md)``, then ![y](y.png) and [`code`](Home.md).\n";
        assert_eq!(
            resolver().rewrite(body),
            format!(
                "Use `<img src=\"a.png\">` or ``[x](Home.md)``, then ![y]({}/docs/y.png) and [`code`](/docs/Home).\n",
                RAW
            )
        );
    }

    #[test]
    fn test_code_spans() {
        let text = "a `b` c ``d`e`` f `unclosed";
        let spans: Vec<&str> = code_spans(text).into_iter().map(|r| &text[r]).collect();
        assert_eq!(spans, vec!["`b`", "``d`e``"]);
    }

    #[test]
    fn test_rewrite_reference_definitions() {
        let body = "Read the [guide][g].\n\n[g]: Admin-Guide.md\n[^1]: footnote text\n";
        assert_eq!(
            resolver().rewrite(body),
            "Read the [guide][g].\n\n[g]: /docs/Admin-Guide\n[^1]: footnote text\n"
        );
    }

    #[test]
    fn test_rewrite_skips_fenced_code() {
        let body = "```md\n![x](../assets/x.png)\n```\n![y](../assets/y.png)\n";
        assert_eq!(
            resolver().rewrite(body),
            format!(
                "```md\n![x](../assets/x.png)\n```\n![y]({}/assets/y.png)\n",
                RAW
            )
        );
    }

    #[test]
    fn test_rewrite_single_quoted_href() {
        let body = "<a href='Security.md'>Security</a>";
        assert_eq!(
            resolver().rewrite(body),
            "<a href='/docs/Security'>Security</a>"
        );
    }

    #[test]
    fn test_rewrite_plain_text_unchanged() {
        let body = "Nothing to see here.\nJust [brackets] and (parens).";
        assert_eq!(resolver().rewrite(body), body);
    }
}
