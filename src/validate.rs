//! The readiness-check pipeline behind `edgeone-deploy validate`.
//!
//! Stages run in a fixed order, each feeding the report:
//!
//! 1. **Required files**: fatal if any are missing
//! 2. **Discovery + classification**: fatal only if the walk fails
//! 3. **Entry HTML checks**: a read failure is recorded, not fatal
//! 4. **Performance advice**: needs the entry HTML, skipped without it
//! 5. **Artifacts**: `sitemap.xml` and `robots.txt` written to the root
//!
//! Every other finding is advisory and lands in [`ValidationOutcome`].

use crate::artifacts::{self, ArtifactError};
use crate::classify::{self, RequiredFiles, ValidationReport};
use crate::config::DeployConfig;
use crate::discovery::{Discovery, DiscoveryError};
use crate::html::{self, HtmlCheckResult};
use crate::perf::{self, PerformanceReport};
use chrono::NaiveDate;
use serde::Serialize;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ValidateError {
    #[error("Missing required files: {}", .0.missing.join(", "))]
    MissingRequired(RequiredFiles),
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}

/// Result of the entry-file checks. A read failure keeps its message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HtmlOutcome {
    Checked(HtmlCheckResult),
    Unreadable { error: String },
}

impl HtmlOutcome {
    pub fn result(&self) -> Option<&HtmlCheckResult> {
        match self {
            HtmlOutcome::Checked(result) => Some(result),
            HtmlOutcome::Unreadable { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationOutcome {
    pub entry_file: String,
    pub required: RequiredFiles,
    pub report: ValidationReport,
    pub html: HtmlOutcome,
    pub performance: Option<PerformanceReport>,
    /// Artifacts written, relative to the project root.
    pub artifacts: Vec<String>,
}

impl ValidationOutcome {
    /// Count of advisory findings across all stages.
    pub fn advisory_count(&self) -> usize {
        let html = match &self.html {
            HtmlOutcome::Checked(result) => {
                result.missing().len() + result.missing_images().count()
            }
            HtmlOutcome::Unreadable { .. } => 1,
        };
        let perf = self
            .performance
            .as_ref()
            .map_or(0, |p| p.suggestions.len());
        self.report.warnings.len() + html + perf
    }
}

/// What to write besides reporting.
#[derive(Debug, Clone, Copy)]
pub struct ValidateOptions {
    pub write_artifacts: bool,
    pub date: NaiveDate,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self {
            write_artifacts: true,
            date: artifacts::today(),
        }
    }
}

/// Run the full pipeline against `root`.
///
/// Fails on a missing required file, a failed walk, or an artifact write
/// error. The missing-file error carries the full present/missing listing.
pub fn validate(
    root: &Path,
    config: &DeployConfig,
    options: ValidateOptions,
) -> Result<ValidationOutcome, ValidateError> {
    let required = classify::check_required_files(root, &config.validation);
    if !required.all_present() {
        return Err(ValidateError::MissingRequired(required));
    }

    info!(root = %root.display(), "classifying files");
    let discovery = Discovery::new(root, &config.validation.pruned_dirs)?;
    let files = discovery.collect()?;
    // Artifacts from a previous run are this tool's output, not site content.
    let generated = generated_names(config);
    let mut report = classify::classify(
        files
            .iter()
            .filter(|file| !generated.iter().any(|g| file.path == Path::new(g)))
            .cloned()
            .map(Ok),
        &config.validation,
    )?;
    report.required_files_present = required.present.clone();

    let entry = root.join(&config.site.entry_file);
    info!(entry = %entry.display(), "checking entry HTML");
    let (html, performance) = match html::read_html(&entry) {
        Ok(text) => {
            let checked = html::check_html(&text, root);
            // Images count whatever the allow-list and exclusions say
            let perf = perf::analyze(&text, &files, &config.performance);
            (HtmlOutcome::Checked(checked), Some(perf))
        }
        Err(error) => {
            warn!("{error}");
            (
                HtmlOutcome::Unreadable {
                    error: error.to_string(),
                },
                None,
            )
        }
    };

    let written = if options.write_artifacts {
        artifacts::write_artifacts(root, &config.site, &config.artifacts, options.date)?
    } else {
        Vec::new()
    };

    Ok(ValidationOutcome {
        entry_file: config.site.entry_file.clone(),
        required,
        report,
        html,
        performance,
        artifacts: written.iter().map(|p| relative_name(root, p)).collect(),
    })
}

fn generated_names(config: &DeployConfig) -> Vec<&'static str> {
    let mut names = Vec::new();
    if config.artifacts.sitemap {
        names.push(artifacts::SITEMAP_FILE);
    }
    if config.artifacts.robots {
        names.push(artifacts::ROBOTS_FILE);
    }
    names
}

fn relative_name(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .into_owned()
}
