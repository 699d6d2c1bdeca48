use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fixed domain shared by every displayed score.
pub const SCORE_DOMAIN_MIN: f64 = -1.0;
pub const SCORE_DOMAIN_MAX: f64 = 2.0;

/// Which score a map is currently coloured by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreType {
    #[default]
    Affordability,
    Prosperity,
    Recommendation,
}

impl ScoreType {
    pub const fn ordered() -> [Self; 3] {
        [Self::Affordability, Self::Prosperity, Self::Recommendation]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Affordability => "Affordability",
            Self::Prosperity => "Prosperity",
            Self::Recommendation => "Recommendation",
        }
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Affordability => "affordability",
            Self::Prosperity => "prosperity",
            Self::Recommendation => "recommendation",
        }
    }

    /// Lower affordability scores mean cheaper living, so the colour ramp
    /// runs backwards for that score.
    pub const fn lower_is_better(self) -> bool {
        matches!(self, Self::Affordability)
    }

    /// Displayed score for a county with the given source scores.
    pub fn select(self, affordability: Option<f64>, prosperity: Option<f64>) -> Option<f64> {
        match self {
            Self::Affordability => affordability,
            Self::Prosperity => prosperity,
            Self::Recommendation => Some(recommendation_score(affordability?, prosperity?)),
        }
    }
}

impl fmt::Display for ScoreType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownScoreType(pub String);

impl fmt::Display for UnknownScoreType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown score type '{}' (expected affordability, prosperity or recommendation)",
            self.0
        )
    }
}

impl std::error::Error for UnknownScoreType {}

impl FromStr for ScoreType {
    type Err = UnknownScoreType;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "affordability" => Ok(Self::Affordability),
            "prosperity" => Ok(Self::Prosperity),
            "recommendation" | "recommended" => Ok(Self::Recommendation),
            _ => Err(UnknownScoreType(value.to_string())),
        }
    }
}

/// Position of `score` inside the score domain, clamped to `[0, 1]`.
pub fn normalize_to_unit(score: f64) -> f64 {
    let span = SCORE_DOMAIN_MAX - SCORE_DOMAIN_MIN;
    ((score - SCORE_DOMAIN_MIN) / span).clamp(0.0, 1.0)
}

/// Blends affordability (inverted) and prosperity into one score on the
/// same domain as its inputs.
pub fn recommendation_score(affordability: f64, prosperity: f64) -> f64 {
    let affordability = 1.0 - normalize_to_unit(affordability);
    let prosperity = normalize_to_unit(prosperity);
    let blended = (affordability + prosperity) / 2.0;
    SCORE_DOMAIN_MIN + blended * (SCORE_DOMAIN_MAX - SCORE_DOMAIN_MIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(left: f64, right: f64) -> bool {
        (left - right).abs() < 1e-9
    }

    #[test]
    fn recommendation_hits_domain_extremes() {
        assert!(approx(recommendation_score(-1.0, 2.0), SCORE_DOMAIN_MAX));
        assert!(approx(recommendation_score(2.0, -1.0), SCORE_DOMAIN_MIN));
    }

    #[test]
    fn recommendation_clamps_inputs_outside_domain() {
        assert!(approx(recommendation_score(-7.5, 9.0), SCORE_DOMAIN_MAX));
        assert!(approx(recommendation_score(0.5, 0.5), 0.5));
    }

    #[test]
    fn select_uses_requested_score() {
        assert_eq!(ScoreType::Affordability.select(Some(0.8), Some(1.5)), Some(0.8));
        assert_eq!(ScoreType::Prosperity.select(Some(0.8), Some(1.5)), Some(1.5));
        assert_eq!(ScoreType::Recommendation.select(None, Some(1.5)), None);
    }

    #[test]
    fn parses_score_type_names() {
        assert_eq!("Prosperity".parse::<ScoreType>(), Ok(ScoreType::Prosperity));
        assert_eq!(
            " recommendation ".parse::<ScoreType>(),
            Ok(ScoreType::Recommendation)
        );
        assert!("rent".parse::<ScoreType>().is_err());
    }
}
