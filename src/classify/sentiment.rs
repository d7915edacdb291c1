use image::Rgba;
use tracing::trace;

const NEGATIVE_BELOW: f64 = -0.1;
const POSITIVE_ABOVE: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    pub fn color(&self) -> Rgba<u8> {
        match self {
            SentimentLabel::Positive => Rgba([0u8, 200u8, 0u8, 255u8]),
            SentimentLabel::Negative => Rgba([220u8, 0u8, 0u8, 255u8]),
            SentimentLabel::Neutral => Rgba([128u8, 128u8, 128u8, 255u8]),
        }
    }
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SentimentLabel::Positive => write!(f, "Positive"),
            SentimentLabel::Negative => write!(f, "Negative"),
            SentimentLabel::Neutral => write!(f, "Neutral"),
        }
    }
}

/// Buckets a paragraph sentiment score. Scores outside [-1, 1] are bucketed the same way;
/// both thresholds belong to Neutral.
pub fn classify_sentiment(score: f64) -> SentimentLabel {
    let label = if score < NEGATIVE_BELOW {
        SentimentLabel::Negative
    } else if score > POSITIVE_ABOVE {
        SentimentLabel::Positive
    } else {
        SentimentLabel::Neutral
    };

    trace!("Sentiment score {score} -> {label}");
    label
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thresholds() {
        assert_eq!(classify_sentiment(-0.1), SentimentLabel::Neutral);
        assert_eq!(classify_sentiment(-0.1000001), SentimentLabel::Negative);
        assert_eq!(classify_sentiment(0.1), SentimentLabel::Neutral);
        assert_eq!(classify_sentiment(0.1000001), SentimentLabel::Positive);
        assert_eq!(classify_sentiment(0.), SentimentLabel::Neutral);
    }

    #[test]
    fn test_out_of_range_scores() {
        assert_eq!(classify_sentiment(-3.5), SentimentLabel::Negative);
        assert_eq!(classify_sentiment(12.), SentimentLabel::Positive);
        assert_eq!(classify_sentiment(f64::INFINITY), SentimentLabel::Positive);
    }

    #[test]
    fn test_colors() {
        assert_eq!(SentimentLabel::Positive.color()[1], 200);
        assert_eq!(SentimentLabel::Negative.color()[0], 220);
        let gray = SentimentLabel::Neutral.color();
        assert!(gray[0] == gray[1] && gray[1] == gray[2]);
    }

    #[test]
    fn test_display() {
        let labels: Vec<String> = [
            SentimentLabel::Positive,
            SentimentLabel::Negative,
            SentimentLabel::Neutral,
        ]
        .iter()
        .map(|l| l.to_string())
        .collect();
        assert_eq!(labels, ["Positive", "Negative", "Neutral"]);
    }
}
