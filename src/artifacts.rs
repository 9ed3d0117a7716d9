//! Sitemap and robots.txt generation.
//!
//! Both files come from fixed templates: the sitemap holds a single entry for
//! the site root stamped with the run date, and robots.txt allows everything
//! and points at the sitemap. Existing files are overwritten without merging
//! or backup.

use crate::config::{ArtifactsConfig, SiteConfig};
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

pub const SITEMAP_FILE: &str = "sitemap.xml";
pub const ROBOTS_FILE: &str = "robots.txt";

#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("Cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Today's date in UTC.
pub fn today() -> NaiveDate {
    chrono::Utc::now().date_naive()
}

/// Render the sitemap for the site root.
pub fn render_sitemap(site: &SiteConfig, artifacts: &ArtifactsConfig, date: NaiveDate) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url>
    <loc>{base}/</loc>
    <lastmod>{date}</lastmod>
    <changefreq>{changefreq}</changefreq>
    <priority>{priority}</priority>
  </url>
</urlset>
"#,
        base = site.base_url(),
        date = date.format("%Y-%m-%d"),
        changefreq = artifacts.changefreq,
        priority = artifacts.priority,
    )
}

/// Render robots.txt allowing all crawlers.
pub fn render_robots(site: &SiteConfig) -> String {
    format!(
        "User-agent: *\nAllow: /\n\nSitemap: {}/{SITEMAP_FILE}\n",
        site.base_url()
    )
}

/// Write the enabled artifacts into `root`, returning the paths written.
pub fn write_artifacts(
    root: &Path,
    site: &SiteConfig,
    artifacts: &ArtifactsConfig,
    date: NaiveDate,
) -> Result<Vec<PathBuf>, ArtifactError> {
    let mut written = Vec::new();

    if artifacts.sitemap {
        let path = root.join(SITEMAP_FILE);
        write(&path, &render_sitemap(site, artifacts, date))?;
        info!(path = %path.display(), "generated sitemap");
        written.push(path);
    }

    if artifacts.robots {
        let path = root.join(ROBOTS_FILE);
        write(&path, &render_robots(site))?;
        info!(path = %path.display(), "generated robots.txt");
        written.push(path);
    }

    Ok(written)
}

fn write(path: &Path, content: &str) -> Result<(), ArtifactError> {
    fs::write(path, content).map_err(|source| ArtifactError::Write {
        path: path.to_path_buf(),
        source,
    })
}
