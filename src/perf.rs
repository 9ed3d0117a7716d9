//! Performance suggestions for the entry page and its images.
//!
//! Measures inline `<style>` and `<script>` weight in the entry HTML and the
//! size of raster images in the project, then emits plain-text suggestions
//! when a configured threshold is crossed. Structured-data scripts
//! (`application/ld+json`) are not counted as inline JavaScript.

use crate::config::PerformanceConfig;
use crate::discovery::FileRecord;
use crate::output::format_file_size;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

static INLINE_STYLE: LazyLock<Regex> = LazyLock::new(|| block_regex("style"));
static INLINE_SCRIPT: LazyLock<Regex> = LazyLock::new(|| block_regex("script"));

fn block_regex(tag: &str) -> Regex {
    let pattern = format!(r"(?is)<{tag}\b[^>]*>.*?</{tag}\s*>");
    Regex::new(&pattern).unwrap_or_else(|e| panic!("invalid block pattern for {tag}: {e}"))
}

const RASTER_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// Count and combined byte length of a set of inline blocks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BlockStats {
    pub count: usize,
    pub bytes: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PerformanceReport {
    pub html_bytes: u64,
    pub inline_styles: BlockStats,
    pub inline_scripts: BlockStats,
    pub images: BlockStats,
    pub suggestions: Vec<String>,
}

impl PerformanceReport {
    pub fn is_optimized(&self) -> bool {
        self.suggestions.is_empty()
    }
}

/// Analyze the entry HTML and the discovered files.
pub fn analyze(html: &str, files: &[FileRecord], config: &PerformanceConfig) -> PerformanceReport {
    let mut report = PerformanceReport {
        html_bytes: html.len() as u64,
        inline_styles: block_stats(INLINE_STYLE.find_iter(html).map(|m| m.as_str())),
        inline_scripts: block_stats(
            INLINE_SCRIPT
                .find_iter(html)
                .map(|m| m.as_str())
                .filter(|block| !block.contains("application/ld+json")),
        ),
        ..PerformanceReport::default()
    };

    if report.inline_styles.bytes > config.inline_style_bytes {
        report
            .suggestions
            .push("Consider moving large inline styles into an external CSS file".to_string());
    }
    if report.inline_scripts.bytes > config.inline_script_bytes {
        report
            .suggestions
            .push("Consider moving large inline scripts into an external JS file".to_string());
    }

    for image in files
        .iter()
        .filter(|f| RASTER_EXTENSIONS.contains(&f.extension.as_str()))
    {
        report.images.count += 1;
        report.images.bytes += image.size_bytes;
        if image.size_bytes > config.large_image_bytes {
            report.suggestions.push(format!(
                "Optimize large image: {} ({})",
                image.display_path(),
                format_file_size(image.size_bytes)
            ));
        }
    }

    report
}

fn block_stats<'a>(blocks: impl Iterator<Item = &'a str>) -> BlockStats {
    blocks.fold(BlockStats::default(), |acc, block| BlockStats {
        count: acc.count + 1,
        bytes: acc.bytes + block.len() as u64,
    })
}
