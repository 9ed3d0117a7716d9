//! CLI output formatting for validation and deployment.
//!
//! Reports are written for an operator at a terminal: one status line per
//! finding, grouped under a heading, with details indented below. Advisories
//! are marked `⚠️`, passes `✅`, fatal conditions `❌`.
//!
//! # Output Format
//!
//! ## Validate
//!
//! ```text
//! Required files
//!     ✅ index.html
//!
//! Files
//!     assets/logo.png (23 Bytes)
//!     index.html (630 Bytes)
//!     style.css (81 Bytes)
//!     Valid files: 3
//!     Total size: 806 Bytes
//!     ⚠️ notes.md: possibly unsupported file type .md
//!
//! HTML (index.html)
//!     ✅ DOCTYPE declaration
//!     ✅ viewport meta tag
//!     ✅ Local image: assets/logo.png
//!     🌐 External image: https://cdn.example.com/banner.jpg
//!
//! Performance
//!     HTML size: 630 Bytes
//!     Inline styles: 0 (0 Bytes)
//!     Inline scripts: 1 (74 Bytes)
//!     Images: 1 (23 Bytes)
//!     ✅ No performance issues found
//!
//! Generated
//!     sitemap.xml
//!     robots.txt
//!
//! Validation complete: 3 valid files, 1 advisory
//! ```
//!
//! ## Deploy
//!
//! ```text
//! Deploy environment
//!     ⚠️ EDGEONE_PAGES_API_TOKEN is not set
//!         A temporary link will be created instead of updating the project
//!     Project: lovemoney-game
//!     Source: .
//! ```
//!
//! # Architecture
//!
//! Each report has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout or stderr.
//! Format functions are pure: no I/O, no side effects.

use crate::classify::{RequiredFiles, ValidationReport};
use crate::deploy::{API_TOKEN_VAR, DeployEnv, DeployError, DeployMode, DeployOutcome, ToolStatus};
use crate::html::{ImageLocation, ImageRef};
use crate::perf::{BlockStats, PerformanceReport};
use crate::validate::{HtmlOutcome, ValidationOutcome};
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Human-readable size in base-1024 units, at most two decimals.
///
/// ```text
/// 0        → 0 Bytes
/// 1024     → 1 KB
/// 1536     → 1.5 KB
/// 52428800 → 50 MB
/// ```
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let fixed = format!("{value:.2}");
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", SIZE_UNITS[unit])
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

fn block_line(label: &str, stats: &BlockStats) -> String {
    format!(
        "{}{label}: {} ({})",
        indent(1),
        stats.count,
        format_file_size(stats.bytes)
    )
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}

// ============================================================================
// Validate
// ============================================================================

pub fn format_required_files(required: &RequiredFiles) -> Vec<String> {
    let mut lines = vec!["Required files".to_string()];
    for name in &required.present {
        lines.push(format!("{}✅ {name}", indent(1)));
    }
    for name in &required.missing {
        lines.push(format!("{}❌ {name} is missing", indent(1)));
    }
    lines
}

pub fn print_required_files(required: &RequiredFiles) {
    print_lines(&format_required_files(required));
}

pub fn format_validation_report(report: &ValidationReport) -> Vec<String> {
    let mut lines = vec!["Files".to_string()];
    for file in &report.valid_files {
        lines.push(format!(
            "{}{} ({})",
            indent(1),
            file.display_path(),
            format_file_size(file.size_bytes)
        ));
    }
    lines.push(format!("{}Valid files: {}", indent(1), report.valid_file_count));
    lines.push(format!(
        "{}Total size: {}",
        indent(1),
        format_file_size(report.total_size_bytes)
    ));
    for warning in &report.warnings {
        lines.push(format!("{}⚠️ {warning}", indent(1)));
    }
    lines
}

fn image_status(image: &ImageRef) -> String {
    match image.location {
        ImageLocation::External => format!("🌐 External image: {}", image.src),
        ImageLocation::Local { found: true } => format!("✅ Local image: {}", image.src),
        ImageLocation::Local { found: false } => format!("⚠️ Missing image: {}", image.src),
    }
}

pub fn format_html_report(entry_file: &str, html: &HtmlOutcome) -> Vec<String> {
    let mut lines = vec![format!("HTML ({entry_file})")];
    match html {
        HtmlOutcome::Checked(result) => {
            for (check, passed) in &result.checks {
                if *passed {
                    lines.push(format!("{}✅ {}", indent(1), check.label()));
                } else {
                    lines.push(format!("{}⚠️ Missing {}", indent(1), check.label()));
                }
            }
            for image in &result.images {
                lines.push(format!("{}{}", indent(1), image_status(image)));
            }
        }
        HtmlOutcome::Unreadable { error } => {
            lines.push(format!("{}❌ {error}", indent(1)));
        }
    }
    lines
}

pub fn format_performance(report: &PerformanceReport) -> Vec<String> {
    let mut lines = vec![
        "Performance".to_string(),
        format!("{}HTML size: {}", indent(1), format_file_size(report.html_bytes)),
        block_line("Inline styles", &report.inline_styles),
        block_line("Inline scripts", &report.inline_scripts),
        block_line("Images", &report.images),
    ];
    if report.is_optimized() {
        lines.push(format!("{}✅ No performance issues found", indent(1)));
    }
    for suggestion in &report.suggestions {
        lines.push(format!("{}💡 {suggestion}", indent(1)));
    }
    lines
}

pub fn format_artifacts(artifacts: &[String]) -> Vec<String> {
    let mut lines = vec!["Generated".to_string()];
    lines.extend(artifacts.iter().map(|a| format!("{}{a}", indent(1))));
    lines
}

/// Full validation report, sections separated by blank lines.
pub fn format_validation_outcome(outcome: &ValidationOutcome) -> Vec<String> {
    let mut sections = vec![
        format_required_files(&outcome.required),
        format_validation_report(&outcome.report),
        format_html_report(&outcome.entry_file, &outcome.html),
    ];
    if let Some(perf) = &outcome.performance {
        sections.push(format_performance(perf));
    }
    if !outcome.artifacts.is_empty() {
        sections.push(format_artifacts(&outcome.artifacts));
    }

    let mut lines = Vec::new();
    for section in sections {
        lines.extend(section);
        lines.push(String::new());
    }
    lines.push(format!(
        "Validation complete: {}, {}",
        plural(outcome.report.valid_file_count, "valid file", "valid files"),
        plural(outcome.advisory_count(), "advisory", "advisories")
    ));
    lines
}

pub fn print_validation_outcome(outcome: &ValidationOutcome) {
    print_lines(&format_validation_outcome(outcome));
}

// ============================================================================
// Deploy
// ============================================================================

pub fn format_deploy_env(env: &DeployEnv, source: &Path) -> Vec<String> {
    let mut lines = vec!["Deploy environment".to_string()];
    match env.mode() {
        DeployMode::Project => lines.push(format!("{}✅ API token configured", indent(1))),
        DeployMode::Anonymous => {
            lines.push(format!("{}⚠️ {API_TOKEN_VAR} is not set", indent(1)));
            lines.push(format!(
                "{}A temporary link will be created instead of updating the project",
                indent(2)
            ));
        }
    }
    lines.push(format!("{}Project: {}", indent(1), env.project_name));
    lines.push(format!("{}Source: {}", indent(1), source.display()));
    lines
}

pub fn print_deploy_env(env: &DeployEnv, source: &Path) {
    print_lines(&format_deploy_env(env, source));
}

/// Entry file confirmation plus the top-level images that will be uploaded.
pub fn format_project_files(entry_file: &str, images: &[String]) -> Vec<String> {
    let mut lines = vec![
        "Project files".to_string(),
        format!("{}✅ {entry_file} found", indent(1)),
    ];
    if images.is_empty() {
        lines.push(format!("{}No top-level images", indent(1)));
    } else {
        lines.push(format!(
            "{}✅ {}: {}",
            indent(1),
            plural(images.len(), "image", "images"),
            images.join(", ")
        ));
    }
    lines
}

pub fn print_project_files(entry_file: &str, images: &[String]) {
    print_lines(&format_project_files(entry_file, images));
}

pub fn format_single_file_notes() -> Vec<String> {
    vec![
        "Single-file deployment".to_string(),
        format!("{}ℹ️ Only the entry page is uploaded", indent(1)),
        format!(
            "{}Images and other assets are not included; run `deploy` for the full site",
            indent(2)
        ),
    ]
}

pub fn print_single_file_notes() {
    print_lines(&format_single_file_notes());
}

pub fn format_deploy_success(outcome: &DeployOutcome) -> Vec<String> {
    let mut lines = Vec::new();
    match outcome.tool {
        ToolStatus::Installed => lines.push("✅ Deployment tool installed".to_string()),
        ToolStatus::AlreadyInstalled => {
            lines.push("✅ Deployment tool already installed".to_string())
        }
        ToolStatus::Skipped => {}
    }
    match outcome.mode {
        DeployMode::Project => lines.push(format!(
            "✅ Deployed to EdgeOne Pages project {}",
            outcome.project_name
        )),
        DeployMode::Anonymous => {
            lines.push("✅ Deployed to EdgeOne Pages (temporary link)".to_string());
            lines.push(String::new());
            lines.extend(format_anonymous_guidance());
        }
    }
    lines
}

pub fn print_deploy_success(outcome: &DeployOutcome) {
    print_lines(&format_deploy_success(outcome));
}

/// Steps to tie future deployments to a project.
pub fn format_anonymous_guidance() -> Vec<String> {
    vec![
        "💡 To deploy to a specific project:".to_string(),
        format!("{}1. Get an EdgeOne Pages API token", indent(1)),
        format!("{}2. Set {API_TOKEN_VAR}", indent(1)),
        format!("{}3. Run the deployment again", indent(1)),
    ]
}

/// Remediation hints for a failed deployment.
pub fn format_troubleshooting(error: &DeployError, single: bool) -> Vec<String> {
    let hints: Vec<&str> = match error {
        DeployError::EntryMissing(_) => vec!["Run from the project root or pass --source"],
        DeployError::Read { .. } | DeployError::Stage(_) => {
            vec!["Check file permissions in the project directory"]
        }
        DeployError::Spawn { .. } => vec![
            "Make sure Node.js and npm are installed and on PATH",
            "Check the [deploy] command in deploy.toml",
        ],
        DeployError::InstallFailed { .. } => vec![
            "Check your network connection",
            "Try installing the package manually with npm",
        ],
        DeployError::Failed { .. } if single => vec![
            "Try a full deployment with `edgeone-deploy deploy`",
            "Check your network connection",
            "Check that the HTML file is well formed",
        ],
        DeployError::Failed { .. } => vec![
            "Check your network connection",
            "Verify the API token",
            "Confirm the project name is valid",
            "Review the full log above",
        ],
    };

    let mut lines = vec!["🔧 Troubleshooting:".to_string()];
    lines.extend(
        hints
            .iter()
            .enumerate()
            .map(|(i, hint)| format!("{}{}. {hint}", indent(1), i + 1)),
    );
    lines
}

pub fn print_troubleshooting(error: &DeployError, single: bool) {
    for line in format_troubleshooting(error, single) {
        eprintln!("{line}");
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Warning;
    use crate::deploy::RunStatus;
    use crate::discovery::FileRecord;
    use crate::html::{HtmlCheck, HtmlCheckResult};
    use std::path::PathBuf;

    // =========================================================================
    // Helper tests
    // =========================================================================

    #[test]
    fn file_size_zero() {
        assert_eq!(format_file_size(0), "0 Bytes");
    }

    #[test]
    fn file_size_bytes() {
        assert_eq!(format_file_size(500), "500 Bytes");
        assert_eq!(format_file_size(1023), "1023 Bytes");
    }

    #[test]
    fn file_size_trims_trailing_zeros() {
        assert_eq!(format_file_size(1024), "1 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(1100), "1.07 KB");
    }

    #[test]
    fn file_size_larger_units() {
        assert_eq!(format_file_size(50 * 1024 * 1024), "50 MB");
        assert_eq!(format_file_size(3 * 1024 * 1024 * 1024), "3 GB");
    }

    #[test]
    fn file_size_caps_at_gb() {
        assert_eq!(format_file_size(2048 * 1024 * 1024 * 1024), "2048 GB");
    }

    #[test]
    fn indent_levels() {
        assert_eq!(indent(0), "");
        assert_eq!(indent(2), "        ");
    }

    #[test]
    fn plural_forms() {
        assert_eq!(plural(1, "image", "images"), "1 image");
        assert_eq!(plural(0, "image", "images"), "0 images");
    }

    // =========================================================================
    // Validate formatting tests
    // =========================================================================

    #[test]
    fn required_files_lists_missing_after_present() {
        let required = RequiredFiles {
            present: ["index.html".to_string()].into(),
            missing: vec!["favicon.ico".to_string()],
        };
        assert_eq!(
            format_required_files(&required),
            vec![
                "Required files",
                "    ✅ index.html",
                "    ❌ favicon.ico is missing"
            ]
        );
    }

    #[test]
    fn validation_report_lists_files_then_warnings() {
        let report = ValidationReport {
            total_size_bytes: 2048,
            valid_file_count: 1,
            valid_files: vec![FileRecord {
                path: PathBuf::from("index.html"),
                size_bytes: 1536,
                extension: "html".to_string(),
            }],
            warnings: vec![Warning::UnsupportedType {
                path: "notes.md".to_string(),
                extension: "md".to_string(),
            }],
            ..ValidationReport::default()
        };
        assert_eq!(
            format_validation_report(&report),
            vec![
                "Files",
                "    index.html (1.5 KB)",
                "    Valid files: 1",
                "    Total size: 2 KB",
                "    ⚠️ notes.md: possibly unsupported file type .md",
            ]
        );
    }

    #[test]
    fn html_report_marks_failures_and_images() {
        let result = HtmlCheckResult {
            checks: vec![(HtmlCheck::Doctype, true), (HtmlCheck::Viewport, false)],
            images: vec![
                ImageRef {
                    src: "a.png".to_string(),
                    location: ImageLocation::Local { found: false },
                },
                ImageRef {
                    src: "https://x.com/b.png".to_string(),
                    location: ImageLocation::External,
                },
            ],
        };
        let lines = format_html_report("index.html", &HtmlOutcome::Checked(result));
        assert_eq!(
            lines,
            vec![
                "HTML (index.html)",
                "    ✅ DOCTYPE declaration",
                "    ⚠️ Missing viewport meta tag",
                "    ⚠️ Missing image: a.png",
                "    🌐 External image: https://x.com/b.png",
            ]
        );
    }

    #[test]
    fn html_report_shows_read_error() {
        let outcome = HtmlOutcome::Unreadable {
            error: "Cannot read index.html: denied".to_string(),
        };
        let lines = format_html_report("index.html", &outcome);
        assert_eq!(lines[1], "    ❌ Cannot read index.html: denied");
    }

    #[test]
    fn performance_with_suggestions() {
        let report = PerformanceReport {
            html_bytes: 100,
            suggestions: vec!["Optimize large image: bg.jpg (2 MB)".to_string()],
            ..PerformanceReport::default()
        };
        let lines = format_performance(&report);
        assert_eq!(lines[1], "    HTML size: 100 Bytes");
        assert_eq!(lines[2], "    Inline styles: 0 (0 Bytes)");
        assert_eq!(
            lines.last().unwrap(),
            "    💡 Optimize large image: bg.jpg (2 MB)"
        );
        assert!(!lines.iter().any(|l| l.contains("No performance issues")));
    }

    // =========================================================================
    // Deploy formatting tests
    // =========================================================================

    fn anonymous_env() -> DeployEnv {
        DeployEnv {
            project_name: "lovemoney-game".to_string(),
            api_token: None,
        }
    }

    #[test]
    fn deploy_env_warns_without_token() {
        let lines = format_deploy_env(&anonymous_env(), Path::new("."));
        assert_eq!(lines[1], "    ⚠️ EDGEONE_PAGES_API_TOKEN is not set");
        assert!(lines.contains(&"    Project: lovemoney-game".to_string()));
        assert!(lines.contains(&"    Source: .".to_string()));
    }

    #[test]
    fn deploy_env_with_token() {
        let env = DeployEnv {
            api_token: Some("secret-token".to_string()),
            ..anonymous_env()
        };
        let lines = format_deploy_env(&env, Path::new("site"));
        assert_eq!(lines[1], "    ✅ API token configured");
        // The token itself never appears
        assert!(!lines.iter().any(|l| l.contains("secret")));
    }

    #[test]
    fn project_files_lists_images() {
        let images = vec!["a.png".to_string(), "b.svg".to_string()];
        assert_eq!(
            format_project_files("index.html", &images),
            vec![
                "Project files",
                "    ✅ index.html found",
                "    ✅ 2 images: a.png, b.svg"
            ]
        );
    }

    #[test]
    fn anonymous_success_includes_guidance() {
        let outcome = DeployOutcome {
            mode: DeployMode::Anonymous,
            project_name: "lovemoney-game".to_string(),
            tool: ToolStatus::Skipped,
        };
        let lines = format_deploy_success(&outcome);
        assert_eq!(lines[0], "✅ Deployed to EdgeOne Pages (temporary link)");
        assert!(lines.contains(&"    2. Set EDGEONE_PAGES_API_TOKEN".to_string()));
    }

    #[test]
    fn project_success_has_no_guidance() {
        let outcome = DeployOutcome {
            mode: DeployMode::Project,
            project_name: "lovemoney-game".to_string(),
            tool: ToolStatus::AlreadyInstalled,
        };
        assert_eq!(
            format_deploy_success(&outcome),
            vec![
                "✅ Deployment tool already installed",
                "✅ Deployed to EdgeOne Pages project lovemoney-game"
            ]
        );
    }

    #[test]
    fn troubleshooting_for_failed_command() {
        let error = DeployError::Failed {
            command: "npx edgeone-pages-mcp".to_string(),
            status: RunStatus::exit(1),
        };
        let full = format_troubleshooting(&error, false);
        assert_eq!(full[0], "🔧 Troubleshooting:");
        assert_eq!(full[2], "    2. Verify the API token");

        let single = format_troubleshooting(&error, true);
        assert!(single[1].contains("edgeone-deploy deploy"));
    }
}
