//! Terminal and JSON rendering for the command-line surface.

use clap::ValueEnum;
use colored::{ColoredString, Colorize};
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

use crate::cache::CacheStats;
use crate::classify::{SentimentLabel, StanceLabel};
use crate::errors::Error;
use crate::interface::{ErrorResponse, LabelMap};
use crate::performance::{PerformanceStats, SystemStats};
use crate::pipeline::AnalysisOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn sentiment_color(label: SentimentLabel, text: &str) -> ColoredString {
    match label {
        SentimentLabel::Positive => text.green().bold(),
        SentimentLabel::Negative => text.red().bold(),
        SentimentLabel::Neutral => text.yellow(),
    }
}

fn stance_color(label: StanceLabel, text: &str) -> ColoredString {
    match label {
        StanceLabel::Supportive => text.green().bold(),
        StanceLabel::Opposing => text.red().bold(),
        StanceLabel::Neutral => text.yellow(),
    }
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| format!(r#"{{"error":"{}"}}"#, e))
}

/// One analysis, as a single line of text or JSON
pub fn render_outcome(outcome: &AnalysisOutcome, labels: &LabelMap, format: OutputFormat) -> String {
    if format == OutputFormat::Json {
        return to_json(&outcome.response(labels));
    }

    let cache = if outcome.cache_hit() {
        " (cached)".dimmed().to_string()
    } else {
        String::new()
    };
    match outcome {
        AnalysisOutcome::Sentiment(analysis) => {
            let result = &analysis.result;
            format!(
                "sentiment: {}  confidence: {}{}",
                sentiment_color(result.label, labels.sentiment(result.label)),
                result.confidence,
                cache
            )
        }
        AnalysisOutcome::Stance(analysis) => {
            let result = &analysis.result;
            format!(
                "stance toward {}: {}  confidence: {}{}",
                result.target.bold(),
                stance_color(result.label, labels.stance(result.label)),
                result.confidence,
                cache
            )
        }
    }
}

pub fn render_error(error: &Error, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => to_json(&ErrorResponse::from(error)),
        OutputFormat::Text => format!("{} [{}] {}", "error:".red().bold(), error.code(), error),
    }
}

fn metric_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Metric", "Value"]);
    table
}

pub fn cache_stats_table(stats: &CacheStats) -> Table {
    let mut table = metric_table();
    table
        .add_row(vec!["entries".to_string(), format!("{} / {}", stats.size, stats.max_size)])
        .add_row(vec!["requests".to_string(), stats.total_requests.to_string()])
        .add_row(vec!["hits".to_string(), stats.hits.to_string()])
        .add_row(vec!["misses".to_string(), stats.misses.to_string()])
        .add_row(vec!["hit rate".to_string(), format!("{:.2}%", stats.hit_rate_percent)])
        .add_row(vec!["evictions".to_string(), stats.evictions.to_string()])
        .add_row(vec!["expired".to_string(), stats.expired_removals.to_string()])
        .add_row(vec!["removed".to_string(), stats.manual_removals.to_string()])
        .add_row(vec!["default ttl".to_string(), format!("{}s", stats.default_ttl_secs)])
        .add_row(vec![
            "memory".to_string(),
            format!("{:.3} MB", stats.memory.total_megabytes()),
        ]);
    table
}

pub fn performance_table(stats: &PerformanceStats) -> Table {
    let mut table = metric_table();
    let latency = &stats.latency;
    table
        .add_row(vec!["requests".to_string(), stats.total_requests.to_string()])
        .add_row(vec![
            "success rate".to_string(),
            format!("{:.2}%", stats.success_rate * 100.0),
        ])
        .add_row(vec![
            "cache hit rate".to_string(),
            format!("{:.2}%", stats.cache_hit_rate * 100.0),
        ])
        .add_row(vec!["avg latency".to_string(), format!("{:.2} ms", latency.avg_ms)])
        .add_row(vec!["p95 latency".to_string(), format!("{:.2} ms", latency.p95_ms)])
        .add_row(vec!["p99 latency".to_string(), format!("{:.2} ms", latency.p99_ms)])
        .add_row(vec!["max latency".to_string(), format!("{:.2} ms", latency.max_ms)])
        .add_row(vec!["peak memory".to_string(), format!("{:.2} MB", stats.memory.peak_mb)]);
    table
}

pub fn endpoint_table(stats: &PerformanceStats) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Endpoint", "Requests", "Failed", "Avg ms", "Cache hits"]);
    for (name, endpoint) in &stats.endpoints {
        table.add_row(vec![
            name.clone(),
            endpoint.total_requests.to_string(),
            endpoint.failed.to_string(),
            format!("{:.2}", endpoint.avg_latency_ms),
            endpoint.cache_hits.to_string(),
        ]);
    }
    table
}

pub fn system_table(stats: &SystemStats) -> Table {
    let mut table = metric_table();
    table
        .add_row(vec!["cpu".to_string(), format!("{:.1}%", stats.cpu_percent)])
        .add_row(vec!["memory".to_string(), format!("{:.1}%", stats.memory_percent)])
        .add_row(vec![
            "memory available".to_string(),
            format!("{:.0} MB", stats.memory_available_mb),
        ])
        .add_row(vec!["disk".to_string(), format!("{:.1}%", stats.disk_percent)])
        .add_row(vec!["sampled".to_string(), stats.sampled_at.to_rfc3339()]);
    table
}

#[derive(Serialize)]
struct StatsReport<'a> {
    cache: &'a CacheStats,
    performance: &'a PerformanceStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a SystemStats>,
}

/// Cache, performance and, when sampled, host statistics together
pub fn render_stats(
    cache: &CacheStats,
    performance: &PerformanceStats,
    system: Option<&SystemStats>,
    format: OutputFormat,
) -> String {
    match format {
        OutputFormat::Json => to_json(&StatsReport {
            cache,
            performance,
            system,
        }),
        OutputFormat::Text => {
            let mut out = format!(
                "{}\n{}\n{}\n{}\n{}",
                "Cache".bold(),
                cache_stats_table(cache),
                "Performance".bold(),
                performance_table(performance),
                endpoint_table(performance)
            );
            if let Some(system) = system {
                out.push_str(&format!("\n{}\n{}", "System".bold(), system_table(system)));
            }
            out
        }
    }
}
