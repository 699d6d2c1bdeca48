use super::geography::JoinedFeature;
use super::score::ScoreType;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TooltipLine {
    pub label: &'static str,
    pub value: Option<f64>,
    pub display: String,
}

impl TooltipLine {
    fn new(label: &'static str, value: Option<f64>) -> Self {
        let display = match value {
            Some(value) => format!("{value:.2}"),
            None => "No data".to_string(),
        };
        Self {
            label,
            value,
            display,
        }
    }
}

/// Hover details for one county: the active score first, then the scores
/// it is compared against.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tooltip {
    pub title: String,
    pub primary: TooltipLine,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub secondary: Vec<TooltipLine>,
}

impl JoinedFeature {
    pub fn tooltip(&self, score_type: ScoreType) -> Tooltip {
        let affordability = TooltipLine::new(
            ScoreType::Affordability.label(),
            self.affordability_score,
        );
        let prosperity = TooltipLine::new(ScoreType::Prosperity.label(), self.prosperity_score);

        let (primary, secondary) = match score_type {
            ScoreType::Affordability => (affordability, vec![prosperity]),
            ScoreType::Prosperity => (prosperity, vec![affordability]),
            ScoreType::Recommendation => (
                TooltipLine::new(ScoreType::Recommendation.label(), self.score),
                vec![affordability, prosperity],
            ),
        };

        Tooltip {
            title: self.full_name.clone(),
            primary,
            secondary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::geography::{join, Boundaries};
    use crate::atlas::matcher::{CountyScore, CountyScores};

    fn joined(score_type: ScoreType, scored: bool) -> JoinedFeature {
        let boundaries = Boundaries::from_geojson(
            r#"{"type":"FeatureCollection","features":[{"type":"Feature","id":"51059","properties":{"NAME":"Fairfax"},"geometry":null}]}"#,
        )
        .expect("fixture parses");
        let mut scores = CountyScores::new();
        if scored {
            scores.insert(
                "Fairfax County VA".to_string(),
                CountyScore {
                    county: "Fairfax County VA".to_string(),
                    affordability_score: 0.8,
                    prosperity_score: 1.5,
                },
            );
        }
        join(boundaries.features(), &scores, score_type)
            .features
            .remove(0)
    }

    #[test]
    fn affordability_shows_prosperity_as_complement() {
        let tooltip = joined(ScoreType::Affordability, true).tooltip(ScoreType::Affordability);
        assert_eq!(tooltip.title, "Fairfax VA");
        assert_eq!(tooltip.primary.display, "0.80");
        assert_eq!(tooltip.secondary.len(), 1);
        assert_eq!(tooltip.secondary[0].label, "Prosperity");
        assert_eq!(tooltip.secondary[0].value, Some(1.5));
    }

    #[test]
    fn recommendation_shows_both_sources() {
        let tooltip = joined(ScoreType::Recommendation, true).tooltip(ScoreType::Recommendation);
        assert_eq!(tooltip.primary.label, "Recommendation");
        assert_eq!(tooltip.secondary.len(), 2);
    }

    #[test]
    fn missing_scores_read_as_no_data() {
        let tooltip = joined(ScoreType::Prosperity, false).tooltip(ScoreType::Prosperity);
        assert_eq!(tooltip.primary.display, "No data");
        assert_eq!(tooltip.primary.value, None);
    }
}
