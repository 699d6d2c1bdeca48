//! Colour ramp shared by every score type.

use super::score::{normalize_to_unit, ScoreType, SCORE_DOMAIN_MAX, SCORE_DOMAIN_MIN};
use serde::{Serialize, Serializer};
use std::fmt;

/// Simple RGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channel-wise `floor(c0 + t * (c1 - c0))` with `t` in `[0, 1]`.
    fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let channel = |from: u8, to: u8| {
            let from = f64::from(from);
            (from + t * (f64::from(to) - from)).floor().clamp(0.0, 255.0) as u8
        };
        Rgb {
            r: channel(self.r, other.r),
            g: channel(self.g, other.g),
            b: channel(self.b, other.b),
        }
    }
}

impl fmt::Display for Rgb {
    /// Format as CSS: rgb(r,g,b)
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({},{},{})", self.r, self.g, self.b)
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Three-stop ramp plus the colour used for counties without data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColorScale {
    pub low: Rgb,
    pub mid: Rgb,
    pub high: Rgb,
    pub neutral: Rgb,
}

impl Default for ColorScale {
    fn default() -> Self {
        Self {
            low: Rgb::new(215, 48, 39),
            mid: Rgb::new(254, 224, 139),
            high: Rgb::new(26, 152, 80),
            neutral: Rgb::new(204, 204, 204),
        }
    }
}

impl ColorScale {
    /// Fill colour for a displayed score. Missing scores and an exact `0`
    /// both render neutral.
    pub fn color_for(&self, score: Option<f64>, score_type: ScoreType) -> Rgb {
        let Some(score) = score.filter(|value| *value != 0.0 && !value.is_nan()) else {
            return self.neutral;
        };

        let mut t = normalize_to_unit(score);
        if score_type.lower_is_better() {
            t = 1.0 - t;
        }

        if t < 0.5 {
            self.low.lerp(self.mid, t / 0.5)
        } else {
            self.mid.lerp(self.high, (t - 0.5) / 0.5)
        }
    }

    pub fn legend(&self, score_type: ScoreType) -> Legend {
        let midpoint = (SCORE_DOMAIN_MIN + SCORE_DOMAIN_MAX) / 2.0;
        let stops = [SCORE_DOMAIN_MIN, midpoint, SCORE_DOMAIN_MAX]
            .into_iter()
            .map(|value| LegendStop {
                value,
                color: self.color_for(Some(value), score_type),
            })
            .collect();

        let (min_label, max_label) = match score_type {
            ScoreType::Affordability => ("More affordable", "Less affordable"),
            ScoreType::Prosperity => ("Less prosperous", "More prosperous"),
            ScoreType::Recommendation => ("Less recommended", "More recommended"),
        };

        Legend {
            score_type,
            title: score_type.label(),
            min: SCORE_DOMAIN_MIN,
            max: SCORE_DOMAIN_MAX,
            min_label,
            max_label,
            stops,
            no_data: self.neutral,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LegendStop {
    pub value: f64,
    pub color: Rgb,
}

#[derive(Debug, Clone, Serialize)]
pub struct Legend {
    pub score_type: ScoreType,
    pub title: &'static str,
    pub min: f64,
    pub max: f64,
    pub min_label: &'static str,
    pub max_label: &'static str,
    pub stops: Vec<LegendStop>,
    pub no_data: Rgb,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_and_missing_scores_are_neutral() {
        let scale = ColorScale::default();
        for score_type in ScoreType::ordered() {
            assert_eq!(scale.color_for(Some(0.0), score_type), scale.neutral);
            assert_eq!(scale.color_for(None, score_type), scale.neutral);
        }
    }

    #[test]
    fn domain_endpoints_hit_ramp_stops() {
        let scale = ColorScale::default();
        assert_eq!(scale.color_for(Some(2.0), ScoreType::Prosperity), scale.high);
        assert_eq!(scale.color_for(Some(-1.0), ScoreType::Prosperity), scale.low);
        assert_eq!(scale.color_for(Some(0.5), ScoreType::Prosperity), scale.mid);
    }

    #[test]
    fn affordability_runs_backwards() {
        let scale = ColorScale::default();
        assert_eq!(scale.color_for(Some(-1.0), ScoreType::Affordability), scale.high);
        assert_eq!(scale.color_for(Some(2.0), ScoreType::Affordability), scale.low);
    }

    #[test]
    fn out_of_domain_scores_clamp() {
        let scale = ColorScale::default();
        assert_eq!(scale.color_for(Some(40.0), ScoreType::Recommendation), scale.high);
        assert_eq!(scale.color_for(Some(-3.0), ScoreType::Recommendation), scale.low);
    }

    #[test]
    fn interpolation_floors_channels() {
        let scale = ColorScale {
            low: Rgb::new(0, 0, 0),
            mid: Rgb::new(101, 200, 0),
            high: Rgb::new(255, 255, 255),
            neutral: Rgb::new(1, 1, 1),
        };
        // -0.25 normalizes to 0.25, half way between low and mid.
        assert_eq!(
            scale.color_for(Some(-0.25), ScoreType::Prosperity),
            Rgb::new(50, 100, 0)
        );
    }

    #[test]
    fn formats_as_css() {
        assert_eq!(Rgb::new(1, 2, 3).to_string(), "rgb(1,2,3)");
        assert_eq!(
            serde_json::to_value(Rgb::new(1, 2, 3)).expect("serializes"),
            serde_json::json!("rgb(1,2,3)")
        );
    }

    #[test]
    fn legend_spans_domain() {
        let scale = ColorScale::default();
        let legend = scale.legend(ScoreType::Affordability);
        assert_eq!(legend.min, -1.0);
        assert_eq!(legend.max, 2.0);
        assert_eq!(legend.stops.len(), 3);
        assert_eq!(legend.stops[0].color, scale.high);
        assert_eq!(legend.stops[2].color, scale.low);
    }
}
