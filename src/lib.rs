//! # EdgeOne Deploy
//!
//! Readiness checks and deployment hand-off for a single-page static web game
//! hosted on EdgeOne Pages.
//!
//! # Architecture: Linear Pipelines
//!
//! Each command is a single-shot pipeline that runs top to bottom and exits:
//!
//! ```text
//! validate       required files → discover → classify → HTML checks → perf → sitemap/robots
//! deploy         env → entry file → install check → external deploy command
//! deploy-single  env → entry file → stage as index.html → external deploy command
//! ```
//!
//! Findings are split into two tiers. **Advisories** (unsupported file types,
//! oversized files, missing meta tags, missing local images, performance
//! suggestions) are collected into reports and never stop a run. **Fatal**
//! conditions (missing required file, unreadable project root, failed
//! subprocess) are returned as `Err` and end the process with exit code 1.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`discovery`] | Sorted recursive walk of the project, pruning hidden and dependency directories |
//! | [`classify`] | Extension allow-list, size limit and exclusion rules → [`classify::ValidationReport`] |
//! | [`html`] | Regex-based structural checks and `<img>` resolution for the entry page |
//! | [`perf`] | Inline style/script weight and large-image suggestions |
//! | [`artifacts`] | `sitemap.xml` and `robots.txt` templates |
//! | [`validate`] | The validation pipeline tying the above together |
//! | [`deploy`] | Environment resolution and the external deploy command |
//! | [`config`] | `deploy.toml` loading, merging over stock defaults, validation |
//! | [`output`] | CLI output formatting for every report |
//!
//! # Design Decisions
//!
//! ## Heuristics, Not Parsing
//!
//! The HTML checks are case-insensitive regular expressions over raw text.
//! The entry page of a small game is hand-written and well formed in practice;
//! when it is not, the worst outcome is a spurious advisory.
//!
//! ## The Deploy Tool Is External
//!
//! Uploading is done by the `edgeone-pages-mcp` npm package. This crate only
//! decides what to run and with which environment, behind the
//! [`deploy::CommandRunner`] trait so the flow is testable without Node.

pub mod artifacts;
pub mod classify;
pub mod config;
pub mod deploy;
pub mod discovery;
pub mod html;
pub mod output;
pub mod perf;
pub mod validate;

#[cfg(test)]
pub(crate) mod test_helpers;

/// Install the global tracing subscriber.
///
/// `verbose` maps 0 → WARN, 1 → INFO, 2 → DEBUG, 3+ → TRACE. `RUST_LOG`
/// directives are honored on top. Logs go to stderr so stdout carries only
/// reports.
pub fn init_tracing(verbose: u8) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}
