use anyhow::{Context, Result};
use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::errors::Error;
use crate::interface::{ErrorResponse, ValidatedRequest};
use crate::output::{render_stats, OutputFormat};
use crate::pipeline::{AnalysisResponse, Analyzer};

#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    /// Classify stance toward this target instead of sentiment
    pub target: Option<String>,
    /// Worker threads; defaults to the number of CPUs
    pub jobs: Option<usize>,
    pub stats: bool,
    pub format: OutputFormat,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum BatchBody {
    Response(AnalysisResponse),
    Error(ErrorResponse),
}

/// One output line; `line` is the 1-based line number in the input file
#[derive(Debug, Serialize)]
struct BatchRecord {
    line: usize,
    #[serde(flatten)]
    body: BatchBody,
}

fn analyze_line(analyzer: &Analyzer, text: &str, target: Option<&str>) -> BatchBody {
    let request = match target {
        Some(target) => ValidatedRequest::stance(text, target),
        None => ValidatedRequest::sentiment(text),
    };
    match request
        .map_err(Error::from)
        .and_then(|request| analyzer.respond(&request))
    {
        Ok(response) => BatchBody::Response(response),
        Err(error) => BatchBody::Error(ErrorResponse::from(&error)),
    }
}

fn progress_bar(len: usize) -> ProgressBar {
    let bar = ProgressBar::new(len as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} texts")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░  "),
    );
    bar
}

/// Classify every non-blank line of `path`, printing one JSON line per text
/// in input order. Returns the number of lines that failed validation or
/// analysis.
pub fn run_batch(analyzer: &Analyzer, path: &Path, options: &BatchOptions) -> Result<usize> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let lines: Vec<(usize, &str)> = contents
        .lines()
        .enumerate()
        .filter(|(_, text)| !text.trim().is_empty())
        .map(|(index, text)| (index + 1, text))
        .collect();

    let jobs = options.jobs.unwrap_or_else(num_cpus::get).max(1);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build()
        .context("failed to build worker pool")?;
    tracing::info!(texts = lines.len(), jobs, "starting batch");

    let bar = progress_bar(lines.len());
    let target = options.target.as_deref();
    let records: Vec<BatchRecord> = pool.install(|| {
        lines
            .par_iter()
            .progress_with(bar.clone())
            .map(|&(line, text)| BatchRecord {
                line,
                body: analyze_line(analyzer, text, target),
            })
            .collect()
    });
    bar.finish_and_clear();

    let mut failures = 0;
    for record in &records {
        if matches!(record.body, BatchBody::Error(_)) {
            failures += 1;
        }
        println!("{}", serde_json::to_string(record)?);
    }

    if options.stats {
        println!(
            "{}",
            render_stats(
                &analyzer.cache().stats(),
                &analyzer.monitor().stats(),
                analyzer.monitor().system_stats().as_ref(),
                options.format
            )
        );
    }

    Ok(failures)
}
