use serde::{Deserialize, Deserializer};

/// Canonical text form of a climate identifier.
///
/// Inventory exports and observation files disagree on whether the id is
/// numeric or textual, and numeric ids sometimes arrive as `6158355.0`.
/// Both sides of the join go through this function so equal ids compare equal.
///
/// # Examples
/// ```
/// use eccc_processor::utils::normalize_climate_id;
///
/// assert_eq!(normalize_climate_id("6158355.0"), "6158355");
/// assert_eq!(normalize_climate_id(" 301C3D4 "), "301C3D4");
/// ```
pub fn normalize_climate_id(raw: &str) -> String {
    let trimmed = raw.trim();

    if let Some((whole, fraction)) = trimmed.split_once('.') {
        if !whole.is_empty()
            && whole.chars().all(|c| c.is_ascii_digit())
            && !fraction.is_empty()
            && fraction.chars().all(|c| c == '0')
        {
            return whole.to_string();
        }
    }

    trimmed.to_string()
}

/// Serde hook applying [`normalize_climate_id`] while reading CSV rows.
pub fn deserialize_climate_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(normalize_climate_id(&raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_forms_collapse() {
        assert_eq!(normalize_climate_id("6158355"), "6158355");
        assert_eq!(normalize_climate_id("6158355.0"), "6158355");
        assert_eq!(normalize_climate_id("6158355.000"), "6158355");
    }

    #[test]
    fn test_textual_ids_survive() {
        assert_eq!(normalize_climate_id("301C3D4"), "301C3D4");
        assert_eq!(normalize_climate_id("1.5"), "1.5");
        assert_eq!(normalize_climate_id("ABC.0"), "ABC.0");
        assert_eq!(normalize_climate_id("  "), "");
    }
}
