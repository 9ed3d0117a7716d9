//! Shared test utilities for the edgeone-deploy test suite.
//!
//! Tests build throwaway project trees with [`ProjectBuilder`] instead of
//! depending on checked-in fixtures, so each test states exactly which files
//! it cares about.
//!
//! ```rust
//! let project = ProjectBuilder::new()
//!     .file("index.html", MINIMAL_HTML)
//!     .file("assets/logo.png", "fake image")
//!     .sized_file("video.webm", 60 * 1024 * 1024)
//!     .build();
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// The smallest document that passes the structural tag checks but has no
/// viewport or charset meta tag.
pub const MINIMAL_HTML: &str =
    "<!DOCTYPE html><html><head><title>T</title></head><body></body></html>";

/// A complete entry page that passes every structural check.
pub const COMPLETE_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>Love Money</title>
</head>
<body>
  <img src="assets/logo.png" alt="logo">
</body>
</html>
"#;

enum Entry {
    Content(Vec<u8>),
    Sized(u64),
}

/// Declarative builder for a project tree inside a fresh `TempDir`.
#[derive(Default)]
pub struct ProjectBuilder {
    files: Vec<(PathBuf, Entry)>,
}

impl ProjectBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file with text content. Parent directories are created.
    pub fn file(mut self, rel: &str, content: &str) -> Self {
        self.files
            .push((PathBuf::from(rel), Entry::Content(content.as_bytes().to_vec())));
        self
    }

    /// Add a file with raw bytes, e.g. a page in a non-UTF-8 encoding.
    pub fn bytes(mut self, rel: &str, content: &[u8]) -> Self {
        self.files
            .push((PathBuf::from(rel), Entry::Content(content.to_vec())));
        self
    }

    /// Add a sparse file of exactly `len` bytes without writing them.
    pub fn sized_file(mut self, rel: &str, len: u64) -> Self {
        self.files.push((PathBuf::from(rel), Entry::Sized(len)));
        self
    }

    pub fn build(self) -> TempDir {
        let tmp = TempDir::new().unwrap();
        for (rel, entry) in self.files {
            let path = tmp.path().join(&rel);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            match entry {
                Entry::Content(content) => fs::write(&path, content).unwrap(),
                Entry::Sized(len) => fs::File::create(&path).unwrap().set_len(len).unwrap(),
            }
        }
        tmp
    }
}

/// Copy `fixtures/site/` to a temp directory and return it.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/site");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}
