use super::AtlasError;
use serde::Serialize;
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

const MIN_FIELDS: usize = 9;

/// One scored attribute combination for a county.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreRow {
    /// Composite `"<name> <ST>"` key as written in the dataset.
    pub county: String,
    pub is_metro: Option<bool>,
    /// `3` stands for "3 or more".
    pub num_kids: Option<u8>,
    pub num_adults: Option<u8>,
    pub high_food: Option<bool>,
    pub low_transportation: Option<bool>,
    pub high_health_conditions: Option<bool>,
    pub affordability_score: f64,
    pub prosperity_score: f64,
}

type AttributeKey = (
    String,
    Option<bool>,
    Option<u8>,
    Option<u8>,
    Option<bool>,
    Option<bool>,
    Option<bool>,
);

impl ScoreRow {
    fn attribute_key(&self) -> AttributeKey {
        (
            self.county.clone(),
            self.is_metro,
            self.num_kids,
            self.num_adults,
            self.high_food,
            self.low_transportation,
            self.high_health_conditions,
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadStats {
    pub rows: usize,
    pub skipped: usize,
    pub duplicates: usize,
}

/// Parsed score dataset. Rows are immutable once loaded.
#[derive(Debug, Clone, Default)]
pub struct ScoreTable {
    rows: Vec<ScoreRow>,
    stats: LoadStats,
}

impl ScoreTable {
    pub async fn from_path<P: AsRef<Path>>(path: P, delimiter: u8) -> Result<Self, AtlasError> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| AtlasError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::parse_with_delimiter(&text, delimiter))
    }

    pub fn from_reader<R: Read>(mut reader: R, delimiter: u8) -> Result<Self, AtlasError> {
        let mut text = String::new();
        reader
            .read_to_string(&mut text)
            .map_err(|source| AtlasError::Read {
                path: "<reader>".into(),
                source,
            })?;
        Ok(Self::parse_with_delimiter(&text, delimiter))
    }

    pub fn parse(text: &str) -> Self {
        Self::parse_with_delimiter(text, b',')
    }

    /// Never fails: malformed lines are skipped and unparsable scores
    /// become `0.0`. When the same county repeats an attribute
    /// combination the first row wins.
    pub fn parse_with_delimiter(text: &str, delimiter: u8) -> Self {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .quoting(false)
            .delimiter(delimiter)
            .from_reader(text.as_bytes());

        let mut records = csv_reader.records();
        let header_token = match records.next() {
            Some(Ok(header)) => header.get(0).unwrap_or_default().to_string(),
            Some(Err(_)) | None => String::new(),
        };

        let mut rows = Vec::new();
        let mut seen: HashSet<AttributeKey> = HashSet::new();
        let mut stats = LoadStats::default();

        for record in records {
            let record = match record {
                Ok(record) => record,
                Err(err) => {
                    debug!(%err, "skipping unreadable score line");
                    stats.skipped += 1;
                    continue;
                }
            };

            let Some(row) = parse_row(&record, &header_token) else {
                stats.skipped += 1;
                continue;
            };

            if !seen.insert(row.attribute_key()) {
                stats.duplicates += 1;
                continue;
            }
            rows.push(row);
        }

        stats.rows = rows.len();
        info!(
            rows = stats.rows,
            skipped = stats.skipped,
            duplicates = stats.duplicates,
            "score table parsed"
        );

        Self { rows, stats }
    }

    pub fn rows(&self) -> &[ScoreRow] {
        &self.rows
    }

    pub fn stats(&self) -> LoadStats {
        self.stats
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn parse_row(record: &csv::StringRecord, header_token: &str) -> Option<ScoreRow> {
    if record.len() < MIN_FIELDS {
        return None;
    }

    let county = record.get(0)?.trim();
    if county.is_empty() || county.eq_ignore_ascii_case(header_token) {
        return None;
    }

    Some(ScoreRow {
        county: county.to_string(),
        is_metro: record.get(1).and_then(parse_flag),
        num_kids: record.get(2).and_then(parse_count),
        num_adults: record.get(3).and_then(parse_count),
        high_food: record.get(4).and_then(parse_flag),
        low_transportation: record.get(5).and_then(parse_flag),
        high_health_conditions: record.get(6).and_then(parse_flag),
        affordability_score: record.get(7).map(parse_score).unwrap_or(0.0),
        prosperity_score: record.get(8).map(parse_score).unwrap_or(0.0),
    })
}

/// Accepts the `Y`/`N` and `TRUE`/`FALSE` encodings in any case.
pub(crate) fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" | "true" => Some(true),
        "n" | "no" | "false" => Some(false),
        _ => None,
    }
}

fn parse_count(value: &str) -> Option<u8> {
    value.trim().trim_end_matches('+').parse().ok()
}

fn parse_score(value: &str) -> f64 {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|score| score.is_finite())
        .unwrap_or(0.0)
}
