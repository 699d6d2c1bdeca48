use county_atlas::atlas::{
    join, match_rows, AtlasSession, Boundaries, ColorScale, MapView, QuestionnaireAnswers,
    ScoreTable, ScoreType,
};

const SAMPLE_SCORES: &str = include_str!("../data/sample_scores.csv");
const SAMPLE_BOUNDARIES: &str = include_str!("../data/sample_counties.geojson");

fn sample_answers() -> QuestionnaireAnswers {
    QuestionnaireAnswers {
        is_metro: Some(true),
        num_kids: 1,
        num_adults: 2,
        high_food: false,
        low_transportation: false,
        high_health_conditions: false,
    }
}

#[test]
fn single_row_dataset_joins_onto_matching_feature() {
    let csv = "county,isMetro,numKids,numAdults,highFood,lowTransportation,highHealthConditions,affordabilityScore,prosperityScore\n\
Fairfax County VA,TRUE,1,2,N,N,N,0.8,1.5\n";
    let table = ScoreTable::parse(csv);
    let scores = match_rows(table.rows(), &sample_answers());

    assert_eq!(scores.len(), 1);
    let fairfax = &scores["Fairfax County VA"];
    assert_eq!(fairfax.affordability_score, 0.8);
    assert_eq!(fairfax.prosperity_score, 1.5);

    let boundaries = Boundaries::from_geojson(
        r#"{"type":"FeatureCollection","features":[{"type":"Feature","properties":{"NAME":"Fairfax","STATE":"51"},"geometry":null}]}"#,
    )
    .expect("boundaries parse");
    let joined = join(boundaries.features(), &scores, ScoreType::Affordability);

    assert_eq!(joined.features.len(), 1);
    assert_eq!(joined.features[0].score, Some(0.8));
    assert_eq!(joined.features[0].state_abbrev, Some("VA"));
    assert_eq!(joined.features[0].county_name, "Fairfax");
}

#[test]
fn sample_datasets_load_cleanly() {
    let table = ScoreTable::parse(SAMPLE_SCORES);
    let stats = table.stats();
    assert_eq!(stats.rows, 6 * 128);
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.duplicates, 0);

    let boundaries = Boundaries::from_geojson(SAMPLE_BOUNDARIES).expect("boundaries parse");
    assert_eq!(boundaries.len(), 7);
}

#[test]
fn sample_join_matches_every_scored_county() {
    let table = ScoreTable::parse(SAMPLE_SCORES);
    let boundaries = Boundaries::from_geojson(SAMPLE_BOUNDARIES).expect("boundaries parse");
    let view = MapView::build(
        &table,
        &boundaries,
        &sample_answers(),
        ScoreType::Recommendation,
        &ColorScale::default(),
    );

    assert!(!view.no_data);
    assert_eq!(view.matched_counties, 6);
    assert_eq!(view.join.report.matched, 6);
    assert_eq!(view.join.report.unmatched_features, vec!["Loudoun VA"]);
    assert!(view.join.report.unmatched_counties.is_empty());

    let juneau = view
        .join
        .features
        .iter()
        .find(|feature| feature.full_name == "Juneau AK")
        .expect("juneau present");
    assert_eq!(
        juneau.matched_county.as_deref(),
        Some("Juneau City and Borough AK")
    );

    let prince_georges = view
        .join
        .features
        .iter()
        .find(|feature| feature.county_name == "Prince George's")
        .expect("prince george's present");
    assert!(prince_georges.has_data());
}

#[test]
fn wildcard_metro_blends_metro_and_rural_rows() {
    let table = ScoreTable::parse(SAMPLE_SCORES);
    let mut answers = sample_answers();
    answers.is_metro = None;
    let scores = match_rows(table.rows(), &answers);

    let fairfax = &scores["Fairfax County VA"];
    assert!((fairfax.affordability_score - 0.39).abs() < 1e-9);
    assert!((fairfax.prosperity_score - 1.54).abs() < 1e-9);
}

#[test]
fn switching_score_type_recolours_without_reloading() {
    let session = AtlasSession::default();
    session.install(
        ScoreTable::parse(SAMPLE_SCORES),
        Boundaries::from_geojson(SAMPLE_BOUNDARIES).expect("boundaries parse"),
    );

    let affordability = session
        .render(&sample_answers(), ScoreType::Affordability)
        .expect("ready")
        .to_geojson();
    let prosperity = session
        .render(&sample_answers(), ScoreType::Prosperity)
        .expect("ready")
        .to_geojson();

    assert_eq!(affordability["features"][0]["properties"]["score"], 0.34);
    assert_eq!(prosperity["features"][0]["properties"]["score"], 1.64);
    assert_ne!(
        affordability["features"][0]["properties"]["fill"],
        prosperity["features"][0]["properties"]["fill"]
    );
    assert_eq!(affordability["legend"]["score_type"], "affordability");
}
