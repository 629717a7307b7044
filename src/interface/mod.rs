//! The boundary between callers and the analysis pipeline.
//!
//! Raw input is checked here and turned into a [`ValidatedRequest`];
//! results leave through the response shapes with labels localized by
//! [`LabelMap`].

mod labels;
mod response;
pub mod validation;

pub use labels::LabelMap;
pub use response::{ErrorResponse, SentimentResponse, StanceResponse};
pub use validation::{
    SentimentRequest, StanceRequest, ValidatedRequest, MAX_TARGET_CHARS, MAX_TEXT_CHARS,
};
