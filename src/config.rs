//! Project configuration module.
//!
//! Handles loading, validating, and merging an optional `deploy.toml` in the
//! project root. Stock defaults describe the game this tool was written for;
//! a project overrides just the keys it needs.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [site]
//! base_url = "https://lovemoneygame.co"   # Canonical URL used in sitemap/robots
//! entry_file = "index.html"               # Page served at the site root
//!
//! [validation]
//! max_file_size = 52428800                # 50 MiB per file
//! allowed_extensions = ["html", "css", "js", "png", "jpg", "jpeg",
//!                       "gif", "svg", "webp", "ico", "json", "txt"]
//! required_files = ["index.html"]
//! pruned_dirs = ["node_modules"]          # Never descended into
//! exclude = ["node_modules", ".git", "package", "deploy", "validate.js"]
//!
//! [performance]
//! large_image_bytes = 1048576
//! inline_style_bytes = 10000
//! inline_script_bytes = 20000
//!
//! [artifacts]
//! sitemap = true
//! robots = true
//! changefreq = "weekly"
//! priority = "1.0"
//!
//! [deploy]
//! project_name = "lovemoney-game"
//! package = "edgeone-pages-mcp"
//! install_check = true
//! command = ["npx", "edgeone-pages-mcp"]
//! ```
//!
//! Unknown keys are rejected to catch typos early. The project name can also
//! come from `EDGEONE_PAGES_PROJECT_NAME`, which wins over the file; see
//! [`crate::deploy::DeployEnv`].

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name looked up in the project root.
pub const CONFIG_FILE: &str = "deploy.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Full configuration for one project.
///
/// Built once at startup and passed by reference into each component.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeployConfig {
    /// Canonical site identity.
    pub site: SiteConfig,
    /// File discovery and classification rules.
    pub validation: ValidationConfig,
    /// Thresholds for performance suggestions.
    pub performance: PerformanceConfig,
    /// Sitemap and robots generation.
    pub artifacts: ArtifactsConfig,
    /// External deployment tool settings.
    pub deploy: DeployTargetConfig,
}

impl DeployConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.site.entry_file.trim().is_empty() {
            return Err(ConfigError::Validation(
                "site.entry_file must not be empty".into(),
            ));
        }
        if !(self.site.base_url.starts_with("http://") || self.site.base_url.starts_with("https://"))
        {
            return Err(ConfigError::Validation(
                "site.base_url must start with http:// or https://".into(),
            ));
        }
        if self.validation.max_file_size == 0 {
            return Err(ConfigError::Validation(
                "validation.max_file_size must be greater than zero".into(),
            ));
        }
        if self.validation.allowed_extensions.is_empty() {
            return Err(ConfigError::Validation(
                "validation.allowed_extensions must not be empty".into(),
            ));
        }
        if self.deploy.command.is_empty() {
            return Err(ConfigError::Validation(
                "deploy.command must not be empty".into(),
            ));
        }
        if !CHANGEFREQ_VALUES.contains(&self.artifacts.changefreq.as_str()) {
            return Err(ConfigError::Validation(format!(
                "artifacts.changefreq must be one of {}",
                CHANGEFREQ_VALUES.join(", ")
            )));
        }
        Ok(())
    }
}

/// Values accepted by the sitemap protocol for `<changefreq>`.
const CHANGEFREQ_VALUES: &[&str] = &[
    "always", "hourly", "daily", "weekly", "monthly", "yearly", "never",
];

/// Canonical site identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Absolute URL of the deployed site, without trailing slash.
    pub base_url: String,
    /// Entry-point HTML file, relative to the project root.
    pub entry_file: String,
}

impl SiteConfig {
    /// Base URL with any trailing slashes removed.
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://lovemoneygame.co".to_string(),
            entry_file: "index.html".to_string(),
        }
    }
}

/// Discovery and classification rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidationConfig {
    /// Largest permitted file size in bytes.
    pub max_file_size: u64,
    /// Deployable extensions. A leading dot is optional; case is ignored.
    pub allowed_extensions: Vec<String>,
    /// Files that must exist in the project root.
    pub required_files: Vec<String>,
    /// Directory names the walk never descends into (hidden dirs always are).
    pub pruned_dirs: Vec<String>,
    /// Path substrings that drop a file from classification entirely.
    pub exclude: Vec<String>,
}

impl ValidationConfig {
    /// Whether `extension` (lowercase, no dot) is on the allow-list.
    pub fn allows(&self, extension: &str) -> bool {
        !extension.is_empty()
            && self
                .allowed_extensions
                .iter()
                .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(extension))
    }

    /// Whether a root-relative path matches one of the exclusion substrings.
    pub fn is_excluded(&self, relative_path: &str) -> bool {
        self.exclude
            .iter()
            .any(|pattern| !pattern.is_empty() && relative_path.contains(pattern.as_str()))
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_file_size: 50 * 1024 * 1024,
            allowed_extensions: [
                "html", "css", "js", "png", "jpg", "jpeg", "gif", "svg", "webp", "ico", "json",
                "txt",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            required_files: vec!["index.html".to_string()],
            pruned_dirs: vec!["node_modules".to_string()],
            exclude: ["node_modules", ".git", "package", "deploy", "validate.js"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Thresholds for the performance advisor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PerformanceConfig {
    /// Raster images above this size get an optimization suggestion.
    pub large_image_bytes: u64,
    /// Combined inline `<style>` size that triggers an extraction suggestion.
    pub inline_style_bytes: u64,
    /// Combined inline `<script>` size that triggers an extraction suggestion.
    pub inline_script_bytes: u64,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            large_image_bytes: 1024 * 1024,
            inline_style_bytes: 10_000,
            inline_script_bytes: 20_000,
        }
    }
}

/// Sitemap and robots generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArtifactsConfig {
    /// Write `sitemap.xml`.
    pub sitemap: bool,
    /// Write `robots.txt`.
    pub robots: bool,
    /// `<changefreq>` value for the single sitemap entry.
    pub changefreq: String,
    /// `<priority>` value for the single sitemap entry.
    pub priority: String,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            sitemap: true,
            robots: true,
            changefreq: "weekly".to_string(),
            priority: "1.0".to_string(),
        }
    }
}

/// External deployment tool settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeployTargetConfig {
    /// Project name used when `EDGEONE_PAGES_PROJECT_NAME` is unset.
    pub project_name: String,
    /// npm package that provides the deployment command.
    pub package: String,
    /// Check for the package with `npm list` and install it when missing.
    pub install_check: bool,
    /// Program and arguments run to perform the deployment.
    pub command: Vec<String>,
}

impl Default for DeployTargetConfig {
    fn default() -> Self {
        Self {
            project_name: "lovemoney-game".to_string(),
            package: "edgeone-pages-mcp".to_string(),
            install_check: true,
            command: vec!["npx".to_string(), "edgeone-pages-mcp".to_string()],
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// Base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(DeployConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely, so arrays
///   such as `allowed_extensions` are replaced, not appended to.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `deploy.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = root.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<DeployConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: DeployConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the project config from `root`, falling back to stock defaults.
pub fn load_config(root: &Path) -> Result<DeployConfig, ConfigError> {
    let overlay = load_raw_config(root)?;
    resolve_config(overlay)
}

/// Returns a fully-commented stock `deploy.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# edgeone-deploy configuration
# ============================
# Place this file as deploy.toml in the project root. Every setting is
# optional; the values below are the defaults. Unknown keys are an error.

# ---------------------------------------------------------------------------
# Site identity
# ---------------------------------------------------------------------------
[site]
# Canonical URL, used for the sitemap entry and the robots.txt Sitemap line.
base_url = "https://lovemoneygame.co"

# Page served at the site root. Checked for HTML structure and deployed
# alone by `deploy-single`.
entry_file = "index.html"

# ---------------------------------------------------------------------------
# Project validation
# ---------------------------------------------------------------------------
[validation]
# Largest permitted file size in bytes (50 MiB).
max_file_size = 52428800

# Extensions the hosting platform serves. Anything else is reported as a
# possibly unsupported file type.
allowed_extensions = ["html", "css", "js", "png", "jpg", "jpeg", "gif", "svg", "webp", "ico", "json", "txt"]

# Files that must exist in the project root. A missing one fails validation.
required_files = ["index.html"]

# Directory names never walked into. Hidden directories are always skipped.
pruned_dirs = ["node_modules"]

# Files whose path contains any of these substrings are left out of the
# report entirely (tooling, package manifests, version control).
exclude = ["node_modules", ".git", "package", "deploy", "validate.js"]

# ---------------------------------------------------------------------------
# Performance suggestions
# ---------------------------------------------------------------------------
[performance]
# Raster images larger than this get an optimization suggestion.
large_image_bytes = 1048576

# Total inline <style> size that suggests moving CSS to a file.
inline_style_bytes = 10000

# Total inline <script> size that suggests moving JS to a file.
inline_script_bytes = 20000

# ---------------------------------------------------------------------------
# Generated files (overwritten on every validate run)
# ---------------------------------------------------------------------------
[artifacts]
sitemap = true
robots = true
changefreq = "weekly"
priority = "1.0"

# ---------------------------------------------------------------------------
# Deployment
# ---------------------------------------------------------------------------
[deploy]
# Used when EDGEONE_PAGES_PROJECT_NAME is not set.
project_name = "lovemoney-game"

# npm package providing the deployment command.
package = "edgeone-pages-mcp"

# Check for the package with `npm list` and install it when missing.
install_check = true

# Program and arguments run in the project root to deploy.
command = ["npx", "edgeone-pages-mcp"]
"##
}
