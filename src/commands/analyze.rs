use anyhow::Result;

use crate::errors::Error;
use crate::interface::ValidatedRequest;
use crate::output::{render_error, render_outcome, OutputFormat};
use crate::pipeline::Analyzer;

/// Validate and classify one text. With a target this is a stance request,
/// otherwise a sentiment request.
pub fn run_single(
    analyzer: &Analyzer,
    text: &str,
    target: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let request = match target {
        Some(target) => ValidatedRequest::stance(text, target),
        None => ValidatedRequest::sentiment(text),
    };

    match request
        .map_err(Error::from)
        .and_then(|request| analyzer.analyze(&request))
    {
        Ok(outcome) => {
            println!("{}", render_outcome(&outcome, analyzer.labels(), format));
            Ok(())
        }
        Err(error) => {
            if format == OutputFormat::Json {
                println!("{}", render_error(&error, format));
            }
            Err(error.into())
        }
    }
}
