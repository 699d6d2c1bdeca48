use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::matcher::QuestionnaireAnswers;
use super::score::ScoreType;
use super::session::AtlasSession;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ChoroplethRequest {
    pub answers: QuestionnaireAnswers,
    #[serde(default)]
    pub score_type: ScoreType,
}

/// Router builder exposing the choropleth, legend and dataset endpoints.
pub fn atlas_router(session: Arc<AtlasSession>) -> Router {
    Router::new()
        .route("/api/v1/choropleth", post(choropleth_handler))
        .route("/api/v1/legend/:score_type", get(legend_handler))
        .route("/api/v1/datasets", get(datasets_handler))
        .with_state(session)
}

pub(crate) async fn choropleth_handler(
    State(session): State<Arc<AtlasSession>>,
    Json(request): Json<ChoroplethRequest>,
) -> Result<Response, AppError> {
    let view = session.render(&request.answers, request.score_type)?;
    Ok((StatusCode::OK, Json(view.to_geojson())).into_response())
}

pub(crate) async fn legend_handler(
    State(session): State<Arc<AtlasSession>>,
    Path(score_type): Path<String>,
) -> Response {
    match score_type.parse::<ScoreType>() {
        Ok(score_type) => {
            (StatusCode::OK, Json(session.scale().legend(score_type))).into_response()
        }
        Err(error) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::BAD_REQUEST, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn datasets_handler(State(session): State<Arc<AtlasSession>>) -> Response {
    (StatusCode::OK, Json(session.summary())).into_response()
}
