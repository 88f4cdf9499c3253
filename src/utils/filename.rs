use crate::models::QueryScope;
use crate::utils::constants::FILTERED_DATA_FILE;

/// Blob key for a scope's cleaned data: `{folder}/{CITY}/{year}/filtered_data.csv`
pub fn filtered_data_key(folder: &str, scope: &QueryScope) -> String {
    let folder = folder.trim_matches('/');
    if folder.is_empty() {
        format!("{}/{}/{}", scope.city, scope.year, FILTERED_DATA_FILE)
    } else {
        format!(
            "{}/{}/{}/{}",
            folder, scope.city, scope.year, FILTERED_DATA_FILE
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filtered_data_key() {
        let scope = QueryScope::new("toronto", 2020).unwrap();
        assert_eq!(
            filtered_data_key("wave", &scope),
            "wave/TORONTO/2020/filtered_data.csv"
        );
    }

    #[test]
    fn test_filtered_data_key_trims_slashes() {
        let scope = QueryScope::new("Ottawa", 2021).unwrap();
        assert_eq!(
            filtered_data_key("/wave/", &scope),
            "wave/OTTAWA/2021/filtered_data.csv"
        );
        assert_eq!(
            filtered_data_key("", &scope),
            "OTTAWA/2021/filtered_data.csv"
        );
    }
}
