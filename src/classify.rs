//! File classification against the deployable allow-list.
//!
//! Consumes the discovery walk and builds a [`ValidationReport`]. Per-file
//! problems are never errors: an unsupported type or an oversized file becomes
//! a [`Warning`] and classification carries on. Only a failure of the walk
//! itself (an unreadable directory) aborts.
//!
//! ## Rules
//!
//! For every discovered file whose path does not contain an exclusion
//! substring:
//!
//! - its size is added to the total
//! - an allowed extension counts it as a valid file
//! - a disallowed extension emits [`Warning::UnsupportedType`]
//! - a size above the limit emits [`Warning::OversizedFile`], whatever the type
//!
//! Required files are checked separately by [`check_required_files`], since a
//! missing one is fatal for validation.

use crate::config::ValidationConfig;
use crate::discovery::{Discovery, DiscoveryError, FileRecord};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

/// Advisory finding about a single file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    UnsupportedType { path: String, extension: String },
    OversizedFile { path: String, size_bytes: u64 },
}

impl Warning {
    pub fn path(&self) -> &str {
        match self {
            Warning::UnsupportedType { path, .. } | Warning::OversizedFile { path, .. } => path,
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::UnsupportedType { path, extension } if extension.is_empty() => {
                write!(f, "{path}: possibly unsupported file type (no extension)")
            }
            Warning::UnsupportedType { path, extension } => {
                write!(f, "{path}: possibly unsupported file type .{extension}")
            }
            Warning::OversizedFile { path, size_bytes } => write!(
                f,
                "{path}: file too large ({})",
                crate::output::format_file_size(*size_bytes)
            ),
        }
    }
}

/// Outcome of the required-files check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RequiredFiles {
    pub present: BTreeSet<String>,
    pub missing: Vec<String>,
}

impl RequiredFiles {
    pub fn all_present(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Aggregate result of classifying a project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// Required files found in the project root.
    pub required_files_present: BTreeSet<String>,
    /// Sum of the sizes of all non-excluded files.
    pub total_size_bytes: u64,
    /// Non-excluded files with an allowed extension.
    pub valid_file_count: usize,
    /// Valid files in discovery order, for the human-readable listing.
    pub valid_files: Vec<FileRecord>,
    /// Append-only, in discovery order.
    pub warnings: Vec<Warning>,
}

impl ValidationReport {
    fn record(&mut self, file: FileRecord, config: &ValidationConfig) {
        let path = file.display_path();
        let allowed = config.allows(&file.extension);
        self.total_size_bytes += file.size_bytes;

        if allowed {
            self.valid_file_count += 1;
        } else {
            self.warnings.push(Warning::UnsupportedType {
                path: path.clone(),
                extension: file.extension.clone(),
            });
        }

        if file.size_bytes > config.max_file_size {
            self.warnings.push(Warning::OversizedFile {
                path,
                size_bytes: file.size_bytes,
            });
        }

        if allowed {
            self.valid_files.push(file);
        }
    }
}

/// Check which configured required files exist in `root`.
pub fn check_required_files(root: &Path, config: &ValidationConfig) -> RequiredFiles {
    let mut required = RequiredFiles::default();
    for name in &config.required_files {
        if root.join(name).is_file() {
            required.present.insert(name.clone());
        } else {
            required.missing.push(name.clone());
        }
    }
    required
}

/// Classify every file the walk yields.
///
/// Fails only if the walk itself fails.
pub fn classify<I>(files: I, config: &ValidationConfig) -> Result<ValidationReport, DiscoveryError>
where
    I: IntoIterator<Item = Result<FileRecord, DiscoveryError>>,
{
    let mut report = ValidationReport::default();
    for file in files {
        let file = file?;
        if config.is_excluded(&file.display_path()) {
            continue;
        }
        report.record(file, config);
    }
    Ok(report)
}

/// Walk and classify a project in one step, filling in required files.
pub fn classify_project(
    discovery: &Discovery,
    config: &ValidationConfig,
) -> Result<ValidationReport, DiscoveryError> {
    let mut report = classify(discovery.files(), config)?;
    report.required_files_present = check_required_files(discovery.root(), config).present;
    Ok(report)
}
