use super::color::ColorScale;
use super::fips::{state_abbreviation, state_code_from_identifier};
use super::matcher::{CountyScore, CountyScores};
use super::normalizer::{normalize_county_name, split_composite_key};
use super::score::ScoreType;
use super::AtlasError;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

const NAME_KEYS: &[&str] = &["name", "NAME"];
const STATE_CODE_KEYS: &[&str] = &["STATEFP", "STATE", "statefp", "state"];
const IDENTIFIER_KEYS: &[&str] = &["GEOID", "GEO_ID", "geoid", "fips", "FIPS"];

/// One boundary feature as read from the GeoJSON source.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoFeature {
    pub id: Option<Value>,
    pub name: String,
    pub state_fips: Option<String>,
    pub geometry: Value,
    pub properties: Map<String, Value>,
}

impl GeoFeature {
    fn from_value(value: Value) -> Self {
        let Value::Object(mut object) = value else {
            return Self::empty();
        };

        let properties = match object.remove("properties") {
            Some(Value::Object(properties)) => properties,
            _ => Map::new(),
        };
        let id = object.remove("id").filter(|id| !id.is_null());
        let geometry = object.remove("geometry").unwrap_or(Value::Null);

        let name = NAME_KEYS
            .iter()
            .find_map(|key| properties.get(*key).and_then(Value::as_str))
            .unwrap_or_default()
            .trim()
            .to_string();

        let state_fips = STATE_CODE_KEYS
            .iter()
            .filter_map(|key| properties.get(*key))
            .chain(IDENTIFIER_KEYS.iter().filter_map(|key| properties.get(*key)))
            .chain(id.iter())
            .find_map(state_code_from_value);

        Self {
            id,
            name,
            state_fips,
            geometry,
            properties,
        }
    }

    fn empty() -> Self {
        Self {
            id: None,
            name: String::new(),
            state_fips: None,
            geometry: Value::Null,
            properties: Map::new(),
        }
    }

    pub fn state_abbrev(&self) -> Option<&'static str> {
        self.state_fips.as_deref().and_then(state_abbreviation)
    }
}

/// Numeric identifiers lose their leading zero in some exports, so they are
/// padded back to five digits before the state code is read.
fn state_code_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(raw) => state_code_from_identifier(raw).map(str::to_string),
        Value::Number(number) => {
            let number = number.as_u64()?;
            let padded = if number < 100 {
                format!("{number:02}")
            } else {
                format!("{number:05}")
            };
            state_code_from_identifier(&padded).map(str::to_string)
        }
        _ => None,
    }
}

/// Boundary dataset, shared read-only between joins.
#[derive(Debug, Clone, Default)]
pub struct Boundaries {
    features: Vec<Arc<GeoFeature>>,
}

impl Boundaries {
    pub async fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, AtlasError> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| AtlasError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_geojson(&text)
    }

    pub fn from_geojson(text: &str) -> Result<Self, AtlasError> {
        let document: Value = serde_json::from_str(text)?;
        let Value::Object(mut document) = document else {
            return Err(AtlasError::NotFeatureCollection);
        };
        if document.get("type").and_then(Value::as_str) != Some("FeatureCollection") {
            return Err(AtlasError::NotFeatureCollection);
        }
        let Some(Value::Array(features)) = document.remove("features") else {
            return Err(AtlasError::NotFeatureCollection);
        };

        let features: Vec<Arc<GeoFeature>> = features
            .into_iter()
            .map(|feature| Arc::new(GeoFeature::from_value(feature)))
            .collect();

        info!(features = features.len(), "boundary features parsed");
        Ok(Self { features })
    }

    pub fn features(&self) -> &[Arc<GeoFeature>] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// A boundary feature with the scores attached for one answer set.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinedFeature {
    #[serde(skip)]
    pub feature: Arc<GeoFeature>,
    pub county_name: String,
    pub state_abbrev: Option<&'static str>,
    pub full_name: String,
    pub score: Option<f64>,
    pub affordability_score: Option<f64>,
    pub prosperity_score: Option<f64>,
    pub matched_county: Option<String>,
}

impl JoinedFeature {
    fn unscored(feature: &Arc<GeoFeature>) -> Self {
        let state_abbrev = feature.state_abbrev();
        let full_name = match state_abbrev {
            Some(state) => format!("{} {}", feature.name, state),
            None => feature.name.clone(),
        };

        Self {
            feature: Arc::clone(feature),
            county_name: feature.name.clone(),
            state_abbrev,
            full_name,
            score: None,
            affordability_score: None,
            prosperity_score: None,
            matched_county: None,
        }
    }

    fn with_score(mut self, county: &CountyScore, score_type: ScoreType) -> Self {
        self.affordability_score = Some(county.affordability_score);
        self.prosperity_score = Some(county.prosperity_score);
        self.score = score_type.select(self.affordability_score, self.prosperity_score);
        self.matched_county = Some(county.county.clone());
        self
    }

    pub fn has_data(&self) -> bool {
        self.matched_county.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JoinReport {
    pub matched: usize,
    pub unmatched_features: Vec<String>,
    pub unmatched_counties: Vec<String>,
    /// True when there were no scores to join and the lookup was skipped.
    pub skipped: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub score_type: ScoreType,
    pub features: Vec<JoinedFeature>,
    pub report: JoinReport,
}

impl Join {
    pub fn to_geojson(&self, scale: &ColorScale) -> Value {
        let features: Vec<Value> = self
            .features
            .iter()
            .map(|joined| {
                let mut properties = joined.feature.properties.clone();
                if let Ok(Value::Object(extra)) = serde_json::to_value(joined) {
                    properties.extend(extra);
                }
                properties.insert(
                    "fill".to_string(),
                    json!(scale.color_for(joined.score, self.score_type).to_string()),
                );
                properties.insert(
                    "tooltip".to_string(),
                    json!(joined.tooltip(self.score_type)),
                );

                let mut feature = Map::new();
                feature.insert("type".to_string(), json!("Feature"));
                if let Some(id) = &joined.feature.id {
                    feature.insert("id".to_string(), id.clone());
                }
                feature.insert("geometry".to_string(), joined.feature.geometry.clone());
                feature.insert("properties".to_string(), Value::Object(properties));
                Value::Object(feature)
            })
            .collect();

        json!({
            "type": "FeatureCollection",
            "features": features,
        })
    }
}

struct Candidate<'a> {
    normalized: String,
    score: &'a CountyScore,
}

/// Attaches matched scores to every boundary feature. Counties are only
/// compared within the feature's state; an exact normalized name wins,
/// otherwise the containing/contained name sharing the most text does.
pub fn join(features: &[Arc<GeoFeature>], scores: &CountyScores, score_type: ScoreType) -> Join {
    if scores.is_empty() {
        debug!(features = features.len(), "no matched scores; skipping join");
        return Join {
            score_type,
            features: features.iter().map(JoinedFeature::unscored).collect(),
            report: JoinReport {
                skipped: true,
                ..JoinReport::default()
            },
        };
    }

    let mut by_state: BTreeMap<String, Vec<Candidate<'_>>> = BTreeMap::new();
    let mut unmatched_counties: BTreeSet<&str> = BTreeSet::new();
    for (key, score) in scores {
        match split_composite_key(key) {
            (name, Some(state)) => by_state
                .entry(state.to_ascii_uppercase())
                .or_default()
                .push(Candidate {
                    normalized: normalize_county_name(name),
                    score,
                }),
            (_, None) => {
                unmatched_counties.insert(key.as_str());
            }
        }
    }

    let mut used: BTreeSet<&str> = BTreeSet::new();
    let mut report = JoinReport::default();
    let mut joined = Vec::with_capacity(features.len());

    for feature in features {
        let base = JoinedFeature::unscored(feature);
        let candidate = base
            .state_abbrev
            .and_then(|state| by_state.get(state))
            .and_then(|candidates| best_candidate(candidates, &normalize_county_name(&feature.name)));

        match candidate {
            Some(candidate) => {
                report.matched += 1;
                used.insert(candidate.score.county.as_str());
                joined.push(base.with_score(candidate.score, score_type));
            }
            None => {
                report.unmatched_features.push(base.full_name.clone());
                joined.push(base);
            }
        }
    }

    unmatched_counties.extend(
        scores
            .keys()
            .map(String::as_str)
            .filter(|key| !used.contains(key)),
    );
    report.unmatched_counties = unmatched_counties.into_iter().map(str::to_string).collect();

    info!(
        %score_type,
        matched = report.matched,
        unmatched_features = report.unmatched_features.len(),
        unmatched_counties = report.unmatched_counties.len(),
        "joined scores onto boundaries"
    );
    debug!(
        unmatched_features = ?report.unmatched_features,
        unmatched_counties = ?report.unmatched_counties,
        "unmatched join entries"
    );

    Join {
        score_type,
        features: joined,
        report,
    }
}

fn best_candidate<'c, 'a>(candidates: &'c [Candidate<'a>], name: &str) -> Option<&'c Candidate<'a>> {
    if name.is_empty() {
        return None;
    }

    if let Some(exact) = candidates.iter().find(|candidate| candidate.normalized == name) {
        return Some(exact);
    }

    candidates
        .iter()
        .filter(|candidate| {
            !candidate.normalized.is_empty()
                && (candidate.normalized.contains(name) || name.contains(&candidate.normalized))
        })
        .min_by_key(|candidate| {
            let len = candidate.normalized.len();
            (Reverse(len.min(name.len())), len.abs_diff(name.len()))
        })
}
