use crate::config::ScoringConfig;
use crate::text::Token;

/// Surface emphasis signals of the scored span
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EmphasisContext {
    pub exclamations: usize,
    /// Share of tokens written in ALL-CAPS
    pub caps_ratio: f64,
}

impl EmphasisContext {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn from_tokens(tokens: &[Token], exclamations: usize) -> Self {
        let caps = tokens.iter().filter(|t| t.all_caps).count();
        let caps_ratio = if tokens.is_empty() {
            0.0
        } else {
            caps as f64 / tokens.len() as f64
        };
        Self {
            exclamations,
            caps_ratio,
        }
    }

    /// Unsigned bonus, capped per signal
    pub fn bonus(&self, config: &ScoringConfig) -> f64 {
        let exclamation =
            (self.exclamations as f64 * config.exclamation_bonus).min(config.exclamation_cap);
        let caps = (self.caps_ratio * config.caps_bonus).min(config.caps_cap);
        exclamation + caps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bonuses_are_capped() {
        let config = ScoringConfig::default();
        let loud = EmphasisContext {
            exclamations: 20,
            caps_ratio: 1.0,
        };
        assert!((loud.bonus(&config) - (1.2 + 0.6)).abs() < 1e-9);
        assert_eq!(EmphasisContext::none().bonus(&config), 0.0);
    }
}
