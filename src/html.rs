//! Heuristic structure checks for the entry-point HTML file.
//!
//! This is deliberately not a parser. Each check is a case-insensitive
//! regular expression run over the raw text, so unusual formatting (a tag
//! split so its attributes escape the pattern, markup inside comments) can
//! give a false result either way. Every check is advisory.
//!
//! ## Checks
//!
//! | Check | Passes when the document contains |
//! |-------|-----------------------------------|
//! | doctype | `<!DOCTYPE html>` |
//! | html | an `<html>` start tag |
//! | head | a `<head>` start tag (not `<header>`) |
//! | body | a `<body>` start tag |
//! | title | a `<title>` element with non-blank text |
//! | viewport | `<meta name="viewport" …>` |
//! | charset | a `<meta>` tag mentioning `charset` |
//!
//! ## Image References
//!
//! Every `<img … src="…">` is extracted. Sources starting with `http://` or
//! `https://` are external and not looked at further. Anything else is a path
//! relative to the project root (one leading `/` is stripped) and is checked
//! for existence on disk.

use regex::Regex;
use serde::{Serialize, Serializer};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HtmlError {
    #[error("Cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One structural presence check, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HtmlCheck {
    Doctype,
    Html,
    Head,
    Body,
    Title,
    Viewport,
    Charset,
}

impl HtmlCheck {
    pub const ALL: [HtmlCheck; 7] = [
        HtmlCheck::Doctype,
        HtmlCheck::Html,
        HtmlCheck::Head,
        HtmlCheck::Body,
        HtmlCheck::Title,
        HtmlCheck::Viewport,
        HtmlCheck::Charset,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            HtmlCheck::Doctype => "doctype",
            HtmlCheck::Html => "html",
            HtmlCheck::Head => "head",
            HtmlCheck::Body => "body",
            HtmlCheck::Title => "title",
            HtmlCheck::Viewport => "viewport",
            HtmlCheck::Charset => "charset",
        }
    }

    /// Human label used in the report.
    pub fn label(&self) -> &'static str {
        match self {
            HtmlCheck::Doctype => "DOCTYPE declaration",
            HtmlCheck::Html => "<html> tag",
            HtmlCheck::Head => "<head> tag",
            HtmlCheck::Body => "<body> tag",
            HtmlCheck::Title => "<title> tag",
            HtmlCheck::Viewport => "viewport meta tag",
            HtmlCheck::Charset => "charset meta tag",
        }
    }

    fn passes(&self, html: &str) -> bool {
        match self {
            HtmlCheck::Doctype => DOCTYPE.is_match(html),
            HtmlCheck::Html => HTML_TAG.is_match(html),
            HtmlCheck::Head => HEAD_TAG.is_match(html),
            HtmlCheck::Body => BODY_TAG.is_match(html),
            HtmlCheck::Title => TITLE
                .captures_iter(html)
                .any(|c| !c[1].trim().is_empty()),
            HtmlCheck::Viewport => META_VIEWPORT.is_match(html),
            HtmlCheck::Charset => META_CHARSET.is_match(html),
        }
    }
}

impl fmt::Display for HtmlCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

static DOCTYPE: LazyLock<Regex> = LazyLock::new(|| regex(r"(?i)<!doctype\s+html\s*>"));
static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| regex(r"(?i)<html\b[^>]*>"));
static HEAD_TAG: LazyLock<Regex> = LazyLock::new(|| regex(r"(?i)<head\b[^>]*>"));
static BODY_TAG: LazyLock<Regex> = LazyLock::new(|| regex(r"(?i)<body\b[^>]*>"));
static TITLE: LazyLock<Regex> = LazyLock::new(|| regex(r"(?is)<title\b[^>]*>(.*?)</title\s*>"));
static META_VIEWPORT: LazyLock<Regex> =
    LazyLock::new(|| regex(r#"(?i)<meta\b[^>]*\sname\s*=\s*["']viewport["'][^>]*>"#));
static META_CHARSET: LazyLock<Regex> = LazyLock::new(|| regex(r"(?i)<meta\b[^>]*charset[^>]*>"));
static IMG_SRC: LazyLock<Regex> =
    LazyLock::new(|| regex(r#"(?i)<img\b[^>]*?\ssrc\s*=\s*["']([^"']+)["'][^>]*>"#));

// Patterns are literals; a failure here is a programming error caught by tests.
fn regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid built-in pattern {pattern}: {e}"))
}

/// Where an image reference points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ImageLocation {
    External,
    Local { found: bool },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageRef {
    pub src: String,
    pub location: ImageLocation,
}

impl ImageRef {
    pub fn is_missing(&self) -> bool {
        self.location == ImageLocation::Local { found: false }
    }
}

/// Pass/fail for each [`HtmlCheck`] plus the classified image references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HtmlCheckResult {
    /// One entry per check, in [`HtmlCheck::ALL`] order. Serialized as a
    /// name → passed map.
    #[serde(serialize_with = "serialize_checks")]
    pub checks: Vec<(HtmlCheck, bool)>,
    pub images: Vec<ImageRef>,
}

fn serialize_checks<S: Serializer>(
    checks: &[(HtmlCheck, bool)],
    s: S,
) -> Result<S::Ok, S::Error> {
    s.collect_map(checks.iter().map(|(check, passed)| (check.name(), passed)))
}

impl HtmlCheckResult {
    pub fn passed(&self, check: HtmlCheck) -> bool {
        self.checks
            .iter()
            .any(|(c, passed)| *c == check && *passed)
    }

    /// Checks that failed, in report order.
    pub fn missing(&self) -> Vec<HtmlCheck> {
        self.checks
            .iter()
            .filter(|(_, passed)| !passed)
            .map(|(c, _)| *c)
            .collect()
    }

    pub fn missing_images(&self) -> impl Iterator<Item = &ImageRef> {
        self.images.iter().filter(|i| i.is_missing())
    }
}

/// Run every structural check on `html` and resolve local images under `root`.
pub fn check_html(html: &str, root: &Path) -> HtmlCheckResult {
    let checks = HtmlCheck::ALL
        .iter()
        .map(|check| (*check, check.passes(html)))
        .collect();

    let images = image_sources(html)
        .into_iter()
        .map(|src| {
            let location = if is_external(&src) {
                ImageLocation::External
            } else {
                ImageLocation::Local {
                    found: local_image_path(root, &src).exists(),
                }
            };
            ImageRef { src, location }
        })
        .collect();

    HtmlCheckResult { checks, images }
}

/// Read an HTML file as text.
///
/// Invalid UTF-8 (a GBK or Latin-1 page) is decoded lossily; only I/O
/// failures are errors.
pub fn read_html(path: &Path) -> Result<String, HtmlError> {
    let bytes = fs::read(path).map_err(|source| HtmlError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Read the entry file and check it. A read failure is only fatal to this check.
pub fn check_entry_file(path: &Path, root: &Path) -> Result<HtmlCheckResult, HtmlError> {
    let html = read_html(path)?;
    Ok(check_html(&html, root))
}

/// Every `<img>` `src` value in document order.
pub fn image_sources(html: &str) -> Vec<String> {
    IMG_SRC
        .captures_iter(html)
        .map(|c| c[1].to_string())
        .collect()
}

fn is_external(src: &str) -> bool {
    let lower = src.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn local_image_path(root: &Path, src: &str) -> PathBuf {
    root.join(src.strip_prefix('/').unwrap_or(src))
}
