use super::color::{ColorScale, Legend};
use super::geography::{join, Boundaries, Join};
use super::loader::{LoadStats, ScoreTable};
use super::matcher::{match_rows, QuestionnaireAnswers};
use super::score::ScoreType;
use super::AtlasError;
use crate::config::DataConfig;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;
use tracing::{info, warn};

/// Both datasets, loaded together and replaced as a unit.
#[derive(Debug)]
pub struct Datasets {
    pub scores: ScoreTable,
    pub boundaries: Boundaries,
    pub loaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum DatasetStatus {
    Loading,
    Failed(String),
    Ready,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AtlasUnavailable {
    #[error("datasets are still loading")]
    Loading,
    #[error("datasets failed to load: {0}")]
    Failed(String),
}

impl AtlasUnavailable {
    pub fn state(&self) -> &'static str {
        match self {
            AtlasUnavailable::Loading => "loading",
            AtlasUnavailable::Failed(_) => "failed",
        }
    }
}

#[derive(Debug)]
enum SessionState {
    Loading,
    Failed(String),
    Ready(Arc<Datasets>),
}

/// Holds the loaded datasets and the colour scale the map is drawn with.
#[derive(Debug)]
pub struct AtlasSession {
    state: RwLock<SessionState>,
    scale: ColorScale,
}

impl Default for AtlasSession {
    fn default() -> Self {
        Self::new(ColorScale::default())
    }
}

impl AtlasSession {
    pub fn new(scale: ColorScale) -> Self {
        Self {
            state: RwLock::new(SessionState::Loading),
            scale,
        }
    }

    pub fn scale(&self) -> &ColorScale {
        &self.scale
    }

    /// Reads both datasets concurrently. The session only becomes ready
    /// once both succeed; any failure leaves it in the failed state.
    pub async fn load(&self, config: &DataConfig) -> Result<Arc<Datasets>, AtlasError> {
        self.set_state(SessionState::Loading);

        let (scores, boundaries) = tokio::join!(
            ScoreTable::from_path(&config.scores_path, config.delimiter),
            Boundaries::from_path(&config.boundaries_path),
        );

        match scores.and_then(|scores| boundaries.map(|boundaries| (scores, boundaries))) {
            Ok((scores, boundaries)) => Ok(self.install(scores, boundaries)),
            Err(err) => {
                warn!(%err, "dataset load failed");
                self.set_state(SessionState::Failed(err.to_string()));
                Err(err)
            }
        }
    }

    pub fn install(&self, scores: ScoreTable, boundaries: Boundaries) -> Arc<Datasets> {
        let datasets = Arc::new(Datasets {
            scores,
            boundaries,
            loaded_at: Utc::now(),
        });
        info!(
            rows = datasets.scores.stats().rows,
            features = datasets.boundaries.len(),
            "datasets ready"
        );
        self.set_state(SessionState::Ready(Arc::clone(&datasets)));
        datasets
    }

    pub fn status(&self) -> DatasetStatus {
        match &*self.state.read().unwrap_or_else(PoisonError::into_inner) {
            SessionState::Loading => DatasetStatus::Loading,
            SessionState::Failed(message) => DatasetStatus::Failed(message.clone()),
            SessionState::Ready(_) => DatasetStatus::Ready,
        }
    }

    pub fn datasets(&self) -> Result<Arc<Datasets>, AtlasUnavailable> {
        match &*self.state.read().unwrap_or_else(PoisonError::into_inner) {
            SessionState::Loading => Err(AtlasUnavailable::Loading),
            SessionState::Failed(message) => Err(AtlasUnavailable::Failed(message.clone())),
            SessionState::Ready(datasets) => Ok(Arc::clone(datasets)),
        }
    }

    pub fn render(
        &self,
        answers: &QuestionnaireAnswers,
        score_type: ScoreType,
    ) -> Result<MapView, AtlasUnavailable> {
        let datasets = self.datasets()?;
        Ok(MapView::build(
            &datasets.scores,
            &datasets.boundaries,
            answers,
            score_type,
            &self.scale,
        ))
    }

    fn set_state(&self, state: SessionState) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = state;
    }
}

/// Everything a renderer needs for one answer set and score type.
#[derive(Debug, Clone)]
pub struct MapView {
    pub answers: QuestionnaireAnswers,
    pub matched_counties: usize,
    /// No dataset row matched the answers.
    pub no_data: bool,
    pub join: Join,
    pub legend: Legend,
    scale: ColorScale,
}

impl MapView {
    pub fn build(
        scores: &ScoreTable,
        boundaries: &Boundaries,
        answers: &QuestionnaireAnswers,
        score_type: ScoreType,
        scale: &ColorScale,
    ) -> Self {
        let matched = match_rows(scores.rows(), answers);
        let join = join(boundaries.features(), &matched, score_type);

        Self {
            answers: *answers,
            matched_counties: matched.len(),
            no_data: matched.is_empty(),
            join,
            legend: scale.legend(score_type),
            scale: *scale,
        }
    }

    pub fn score_type(&self) -> ScoreType {
        self.join.score_type
    }

    /// GeoJSON FeatureCollection with the legend, answers and join report
    /// as foreign members.
    pub fn to_geojson(&self) -> Value {
        let mut document = self.join.to_geojson(&self.scale);
        if let Value::Object(members) = &mut document {
            members.insert("scoreType".to_string(), json!(self.score_type()));
            members.insert("answers".to_string(), json!(self.answers));
            members.insert("noData".to_string(), json!(self.no_data));
            members.insert("matchedCounties".to_string(), json!(self.matched_counties));
            members.insert("legend".to_string(), json!(self.legend));
            members.insert("report".to_string(), json!(self.join.report));
        }
        document
    }
}

/// Load statistics and freshness of the installed datasets.
#[derive(Debug, Clone, Serialize)]
pub struct DatasetSummary {
    pub status: DatasetStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scores: Option<LoadStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loaded_at: Option<DateTime<Utc>>,
}

impl AtlasSession {
    pub fn summary(&self) -> DatasetSummary {
        match self.datasets() {
            Ok(datasets) => DatasetSummary {
                status: DatasetStatus::Ready,
                scores: Some(datasets.scores.stats()),
                features: Some(datasets.boundaries.len()),
                loaded_at: Some(datasets.loaded_at),
            },
            Err(_) => DatasetSummary {
                status: self.status(),
                scores: None,
                features: None,
                loaded_at: None,
            },
        }
    }
}
