use std::collections::HashMap;
use std::sync::OnceLock;

static STATE_FIPS_MAP: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();

/// USPS abbreviation for a two-digit state FIPS code.
pub fn state_abbreviation(code: &str) -> Option<&'static str> {
    state_fips_map().get(code.trim()).copied()
}

/// Leading two-digit state code of a FIPS-bearing identifier such as
/// `"51059"` or the Census `"0500000US51059"` form.
pub fn state_code_from_identifier(identifier: &str) -> Option<&str> {
    let trimmed = identifier.trim();
    let digits = match trimmed.rfind("US") {
        Some(index) => &trimmed[index + 2..],
        None => trimmed,
    };

    let code = digits.get(..2)?;
    code.bytes().all(|byte| byte.is_ascii_digit()).then_some(code)
}

fn state_fips_map() -> &'static HashMap<&'static str, &'static str> {
    STATE_FIPS_MAP.get_or_init(|| {
        const CODE_TO_STATE: &[(&str, &str)] = &[
            ("01", "AL"),
            ("02", "AK"),
            ("04", "AZ"),
            ("05", "AR"),
            ("06", "CA"),
            ("08", "CO"),
            ("09", "CT"),
            ("10", "DE"),
            ("11", "DC"),
            ("12", "FL"),
            ("13", "GA"),
            ("15", "HI"),
            ("16", "ID"),
            ("17", "IL"),
            ("18", "IN"),
            ("19", "IA"),
            ("20", "KS"),
            ("21", "KY"),
            ("22", "LA"),
            ("23", "ME"),
            ("24", "MD"),
            ("25", "MA"),
            ("26", "MI"),
            ("27", "MN"),
            ("28", "MS"),
            ("29", "MO"),
            ("30", "MT"),
            ("31", "NE"),
            ("32", "NV"),
            ("33", "NH"),
            ("34", "NJ"),
            ("35", "NM"),
            ("36", "NY"),
            ("37", "NC"),
            ("38", "ND"),
            ("39", "OH"),
            ("40", "OK"),
            ("41", "OR"),
            ("42", "PA"),
            ("44", "RI"),
            ("45", "SC"),
            ("46", "SD"),
            ("47", "TN"),
            ("48", "TX"),
            ("49", "UT"),
            ("50", "VT"),
            ("51", "VA"),
            ("53", "WA"),
            ("54", "WV"),
            ("55", "WI"),
            ("56", "WY"),
            // Territories
            ("60", "AS"),
            ("66", "GU"),
            ("69", "MP"),
            ("72", "PR"),
            ("74", "UM"),
            ("78", "VI"),
        ];

        CODE_TO_STATE.iter().copied().collect()
    })
}
