use crate::classify::{SentimentLabel, StanceLabel};
use crate::config::LabelsConfig;

/// Translates classifier labels into the configured display strings.
///
/// This is the only place a label enum becomes text at the interface.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LabelMap {
    labels: LabelsConfig,
}

impl LabelMap {
    pub fn new(labels: LabelsConfig) -> Self {
        Self { labels }
    }

    pub fn sentiment(&self, label: SentimentLabel) -> &str {
        let names = &self.labels.sentiment;
        match label {
            SentimentLabel::Positive => &names.positive,
            SentimentLabel::Negative => &names.negative,
            SentimentLabel::Neutral => &names.neutral,
        }
    }

    pub fn stance(&self, label: StanceLabel) -> &str {
        let names = &self.labels.stance;
        match label {
            StanceLabel::Supportive => &names.supportive,
            StanceLabel::Opposing => &names.opposing,
            StanceLabel::Neutral => &names.neutral,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StanceLabels;

    #[test]
    fn defaults_render_normal_and_arabic() {
        let map = LabelMap::default();
        assert_eq!(map.sentiment(SentimentLabel::Neutral), "normal");
        assert_eq!(map.sentiment(SentimentLabel::Positive), "positive");
        assert_eq!(map.stance(StanceLabel::Supportive), "مؤيد");
        assert_eq!(map.stance(StanceLabel::Opposing), "معارض");
        assert_eq!(map.stance(StanceLabel::Neutral), "محايد");
    }

    #[test]
    fn english_stance_labels() {
        let map = LabelMap::new(LabelsConfig {
            stance: StanceLabels::english(),
            ..LabelsConfig::default()
        });
        assert_eq!(map.stance(StanceLabel::Opposing), "opposing");
    }
}
