mod color;
mod fips;
mod geography;
mod loader;
mod matcher;
mod normalizer;
mod router;
mod score;
mod session;
mod tooltip;

use std::path::PathBuf;
use thiserror::Error;

pub use color::{ColorScale, Legend, LegendStop, Rgb};
pub use fips::{state_abbreviation, state_code_from_identifier};
pub use geography::{join, Boundaries, GeoFeature, Join, JoinReport, JoinedFeature};
pub use loader::{LoadStats, ScoreRow, ScoreTable};
pub use matcher::{match_rows, CountyScore, CountyScores, QuestionnaireAnswers, KIDS_BUCKET_CAP};
pub use normalizer::{normalize_county_name, split_composite_key};
pub use router::{atlas_router, ChoroplethRequest};
pub use score::{
    normalize_to_unit, recommendation_score, ScoreType, UnknownScoreType, SCORE_DOMAIN_MAX,
    SCORE_DOMAIN_MIN,
};
pub use session::{
    AtlasSession, AtlasUnavailable, DatasetStatus, DatasetSummary, Datasets, MapView,
};
pub use tooltip::{Tooltip, TooltipLine};

#[derive(Debug, Error)]
pub enum AtlasError {
    #[error("failed to read dataset {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid boundary GeoJSON: {0}")]
    Geojson(#[from] serde_json::Error),
    #[error("boundary document is not a GeoJSON FeatureCollection")]
    NotFeatureCollection,
}
