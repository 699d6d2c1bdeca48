use clap::{Args, ValueEnum};
use county_atlas::atlas::{AtlasSession, QuestionnaireAnswers, ScoreType};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) session: Arc<AtlasSession>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub(crate) enum MetroArg {
    Metro,
    Rural,
    #[default]
    Both,
}

impl MetroArg {
    fn as_answer(self) -> Option<bool> {
        match self {
            Self::Metro => Some(true),
            Self::Rural => Some(false),
            Self::Both => None,
        }
    }
}

/// Questionnaire answers as command-line flags.
#[derive(Args, Debug, Clone)]
pub(crate) struct HouseholdArgs {
    /// Metro or rural counties; `both` averages the two
    #[arg(long, value_enum, default_value_t = MetroArg::Both)]
    pub(crate) metro: MetroArg,
    /// Number of children (3 or more share one bucket)
    #[arg(long, default_value_t = 0)]
    pub(crate) kids: u32,
    /// Number of adults (1 or 2)
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=2))]
    pub(crate) adults: u8,
    /// Household spends heavily on food
    #[arg(long)]
    pub(crate) high_food: bool,
    /// Household relies on low transportation spending
    #[arg(long)]
    pub(crate) low_transportation: bool,
    /// Household has high health-care needs
    #[arg(long)]
    pub(crate) high_health_conditions: bool,
}

impl HouseholdArgs {
    pub(crate) fn answers(&self) -> QuestionnaireAnswers {
        QuestionnaireAnswers {
            is_metro: self.metro.as_answer(),
            num_kids: self.kids,
            num_adults: self.adults,
            high_food: self.high_food,
            low_transportation: self.low_transportation,
            high_health_conditions: self.high_health_conditions,
        }
    }
}

pub(crate) fn parse_score_type(raw: &str) -> Result<ScoreType, String> {
    raw.parse::<ScoreType>().map_err(|err| err.to_string())
}
