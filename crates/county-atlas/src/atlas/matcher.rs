use super::loader::ScoreRow;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Kid counts at or above this value share one bucket in the dataset.
pub const KIDS_BUCKET_CAP: u32 = 3;

/// Household answers driving which dataset rows apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionnaireAnswers {
    /// `None` matches both metro and rural rows.
    #[serde(default)]
    pub is_metro: Option<bool>,
    pub num_kids: u32,
    pub num_adults: u8,
    #[serde(default)]
    pub high_food: bool,
    #[serde(default)]
    pub low_transportation: bool,
    #[serde(default)]
    pub high_health_conditions: bool,
}

impl Default for QuestionnaireAnswers {
    fn default() -> Self {
        Self {
            is_metro: None,
            num_kids: 0,
            num_adults: 1,
            high_food: false,
            low_transportation: false,
            high_health_conditions: false,
        }
    }
}

impl QuestionnaireAnswers {
    pub fn effective_kids(&self) -> u32 {
        self.num_kids.min(KIDS_BUCKET_CAP)
    }

    pub fn matches(&self, row: &ScoreRow) -> bool {
        let metro_matches = match self.is_metro {
            None => true,
            Some(expected) => row.is_metro == Some(expected),
        };

        metro_matches
            && row.num_kids.map(u32::from) == Some(self.effective_kids())
            && row.num_adults == Some(self.num_adults)
            && row.high_food == Some(self.high_food)
            && row.low_transportation == Some(self.low_transportation)
            && row.high_health_conditions == Some(self.high_health_conditions)
    }
}

/// Scores for one county under a single answer set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountyScore {
    pub county: String,
    pub affordability_score: f64,
    pub prosperity_score: f64,
}

/// Matched scores keyed by the dataset's composite county key.
pub type CountyScores = BTreeMap<String, CountyScore>;

/// Filters `rows` down to those matching `answers`, yielding at most one
/// score per county. Repeated counties (the metro wildcard) are merged as a
/// running mean in input order.
pub fn match_rows(rows: &[ScoreRow], answers: &QuestionnaireAnswers) -> CountyScores {
    let mut scores = CountyScores::new();
    let mut occurrences: HashMap<&str, u32> = HashMap::new();

    for row in rows.iter().filter(|row| answers.matches(row)) {
        let seen = occurrences.entry(row.county.as_str()).or_insert(0);
        *seen += 1;
        let n = f64::from(*seen);

        scores
            .entry(row.county.clone())
            .and_modify(|score| {
                score.affordability_score =
                    (score.affordability_score * (n - 1.0) + row.affordability_score) / n;
                score.prosperity_score =
                    (score.prosperity_score * (n - 1.0) + row.prosperity_score) / n;
            })
            .or_insert_with(|| CountyScore {
                county: row.county.clone(),
                affordability_score: row.affordability_score,
                prosperity_score: row.prosperity_score,
            });
    }

    debug!(
        rows = rows.len(),
        counties = scores.len(),
        ?answers,
        "matched score rows"
    );
    scores
}
