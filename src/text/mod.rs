//! Text normalization: cleaning, sentence splitting, tokenization,
//! English-eligibility and target mention search.

mod contractions;
pub mod eligibility;
pub mod mentions;
pub mod normalizer;

pub use contractions::expand_contractions;
pub use mentions::{canonical_target, find_mentions, Mention, TargetVariants};
pub use normalizer::{clean, tokenize, NormalizedText, Normalizer, Sentence, Token};
