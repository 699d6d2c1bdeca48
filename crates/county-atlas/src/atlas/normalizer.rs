/// Administrative suffixes removed before comparing county names. Longer
/// suffixes come first so "city and borough" is not cut down to "city and".
const ADMIN_SUFFIXES: &[&str] = &[
    " city and borough",
    " census area",
    " municipality",
    " municipio",
    " borough",
    " parish",
    " county",
];

/// Canonical form of a county or parish name used on both sides of the
/// dataset/boundary join.
pub fn normalize_county_name(value: &str) -> String {
    // Lowercasing can emit combining marks, so it runs before the filter.
    let cleaned: String = value
        .to_lowercase()
        .chars()
        .filter(|ch| ch.is_alphanumeric() || ch.is_whitespace())
        .collect();
    let mut normalized = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");

    while let Some(suffix) = ADMIN_SUFFIXES
        .iter()
        .find(|suffix| normalized.len() > suffix.len() && normalized.ends_with(*suffix))
    {
        normalized.truncate(normalized.len() - suffix.len());
    }

    normalized.trim().to_string()
}

/// Splits a `"<name> <ST>"` composite key into the county name and the
/// trailing two-letter state token.
pub fn split_composite_key(key: &str) -> (&str, Option<&str>) {
    let trimmed = key.trim();
    match trimmed.rsplit_once(char::is_whitespace) {
        Some((name, state))
            if state.len() == 2 && state.chars().all(|ch| ch.is_ascii_alphabetic()) =>
        {
            (name.trim_end(), Some(state))
        }
        _ => (trimmed, None),
    }
}
