use crate::infra::{parse_score_type, HouseholdArgs};
use clap::Args;
use county_atlas::atlas::{
    Boundaries, ColorScale, Legend, MapView, ScoreTable, ScoreType,
};
use county_atlas::config::{parse_delimiter, DataConfig};
use county_atlas::error::AppError;
use std::path::PathBuf;
use tracing::info;

const SAMPLE_SCORES: &str = include_str!("../../../crates/county-atlas/data/sample_scores.csv");
const SAMPLE_BOUNDARIES: &str =
    include_str!("../../../crates/county-atlas/data/sample_counties.geojson");

#[derive(Args, Debug)]
pub(crate) struct RenderArgs {
    /// Score table (delimited text with a header row)
    #[arg(long, default_value = DataConfig::DEFAULT_SCORES_PATH)]
    pub(crate) scores: PathBuf,
    /// County boundaries as a GeoJSON FeatureCollection
    #[arg(long, default_value = DataConfig::DEFAULT_BOUNDARIES_PATH)]
    pub(crate) boundaries: PathBuf,
    /// Field delimiter of the score table
    #[arg(long, default_value = ",", value_parser = parse_delimiter_arg)]
    pub(crate) delimiter: u8,
    /// Score used to colour the map
    #[arg(long, default_value = "affordability", value_parser = parse_score_type)]
    pub(crate) score_type: ScoreType,
    #[command(flatten)]
    pub(crate) household: HouseholdArgs,
    /// Write the GeoJSON here instead of stdout
    #[arg(long)]
    pub(crate) out: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct LegendArgs {
    /// Score the legend describes
    #[arg(long, default_value = "affordability", value_parser = parse_score_type)]
    pub(crate) score_type: ScoreType,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    #[command(flatten)]
    pub(crate) household: HouseholdArgs,
    /// Only show one score type instead of all three
    #[arg(long, value_parser = parse_score_type)]
    pub(crate) score_type: Option<ScoreType>,
}

fn parse_delimiter_arg(raw: &str) -> Result<u8, String> {
    parse_delimiter(raw).map_err(|err| err.to_string())
}

pub(crate) async fn run_render(args: RenderArgs) -> Result<(), AppError> {
    let RenderArgs {
        scores,
        boundaries,
        delimiter,
        score_type,
        household,
        out,
    } = args;

    let (scores, boundaries) = tokio::join!(
        ScoreTable::from_path(&scores, delimiter),
        Boundaries::from_path(&boundaries),
    );
    let (scores, boundaries) = (scores?, boundaries?);

    let view = MapView::build(
        &scores,
        &boundaries,
        &household.answers(),
        score_type,
        &ColorScale::default(),
    );
    let document = serde_json::to_string_pretty(&view.to_geojson())?;

    match out {
        Some(path) => {
            tokio::fs::write(&path, document).await?;
            info!(path = %path.display(), features = view.join.features.len(), "choropleth written");
        }
        None => println!("{document}"),
    }

    Ok(())
}

pub(crate) fn run_legend(args: LegendArgs) -> Result<(), AppError> {
    let legend = ColorScale::default().legend(args.score_type);
    render_legend(&legend);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        household,
        score_type,
    } = args;

    let scores = ScoreTable::parse(SAMPLE_SCORES);
    let boundaries = Boundaries::from_geojson(SAMPLE_BOUNDARIES)?;
    let scale = ColorScale::default();
    let answers = household.answers();

    println!("County atlas demo");
    let stats = scores.stats();
    println!(
        "Sample data: {} score rows ({} skipped, {} duplicates), {} boundary features",
        stats.rows,
        stats.skipped,
        stats.duplicates,
        boundaries.len()
    );
    println!(
        "Household: {} | {} kid(s) (bucket {}) | {} adult(s) | high food {} | low transportation {} | high health {}",
        match answers.is_metro {
            Some(true) => "metro",
            Some(false) => "rural",
            None => "metro + rural",
        },
        answers.num_kids,
        answers.effective_kids(),
        answers.num_adults,
        yes_no(answers.high_food),
        yes_no(answers.low_transportation),
        yes_no(answers.high_health_conditions),
    );

    let score_types = match score_type {
        Some(score_type) => vec![score_type],
        None => ScoreType::ordered().to_vec(),
    };

    for score_type in score_types {
        let view = MapView::build(&scores, &boundaries, &answers, score_type, &scale);
        println!("\n{} map", score_type.label());
        if view.no_data {
            println!("- No counties match this household; every region shows as no data");
            continue;
        }

        for feature in &view.join.features {
            let tooltip = feature.tooltip(score_type);
            let complements = tooltip
                .secondary
                .iter()
                .map(|line| format!("{} {}", line.label, line.display))
                .collect::<Vec<_>>()
                .join(", ");
            println!(
                "- {}: {} {} | fill {} | {}",
                tooltip.title,
                tooltip.primary.label,
                tooltip.primary.display,
                scale.color_for(feature.score, score_type),
                complements
            );
        }

        let report = &view.join.report;
        if !report.unmatched_features.is_empty() {
            println!(
                "  Regions without data: {}",
                report.unmatched_features.join(", ")
            );
        }
        if !report.unmatched_counties.is_empty() {
            println!(
                "  Scored counties missing from the map: {}",
                report.unmatched_counties.join(", ")
            );
        }
        render_legend(&view.legend);
    }

    Ok(())
}

fn render_legend(legend: &Legend) {
    println!(
        "Legend: {} ({} at {:.1} -> {} at {:.1})",
        legend.title, legend.min_label, legend.min, legend.max_label, legend.max
    );
    for stop in &legend.stops {
        println!("  {:>5.2} {}", stop.value, stop.color);
    }
    println!("  no data {}", legend.no_data);
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::MetroArg;

    fn household() -> HouseholdArgs {
        HouseholdArgs {
            metro: MetroArg::Metro,
            kids: 1,
            adults: 2,
            high_food: false,
            low_transportation: false,
            high_health_conditions: false,
        }
    }

    #[test]
    fn demo_runs_on_bundled_data() {
        run_demo(DemoArgs {
            household: household(),
            score_type: None,
        })
        .expect("demo runs");
    }

    #[tokio::test]
    async fn render_writes_geojson_file() {
        let out = std::env::temp_dir().join(format!(
            "county-atlas-render-{}.geojson",
            std::process::id()
        ));
        let crate_root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../crates/county-atlas/data");

        run_render(RenderArgs {
            scores: crate_root.join("sample_scores.csv"),
            boundaries: crate_root.join("sample_counties.geojson"),
            delimiter: b',',
            score_type: ScoreType::Prosperity,
            household: household(),
            out: Some(out.clone()),
        })
        .await
        .expect("render succeeds");

        let written = std::fs::read_to_string(&out).expect("output written");
        let document: serde_json::Value = serde_json::from_str(&written).expect("valid json");
        assert_eq!(document["type"], "FeatureCollection");
        assert_eq!(document["scoreType"], "prosperity");
        assert_eq!(document["features"].as_array().map(Vec::len), Some(7));
        std::fs::remove_file(&out).ok();
    }

    #[tokio::test]
    async fn render_surfaces_missing_datasets() {
        let error = run_render(RenderArgs {
            scores: PathBuf::from("./missing.csv"),
            boundaries: PathBuf::from("./missing.geojson"),
            delimiter: b',',
            score_type: ScoreType::Affordability,
            household: household(),
            out: None,
        })
        .await
        .expect_err("render fails");
        assert!(matches!(error, AppError::Atlas(_)));
    }
}
