use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{ProcessingError, Result};
use crate::utils::constants::EARLIEST_SUPPORTED_YEAR;

/// The (city, year) a run is asked about. City is always uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct QueryScope {
    #[validate(length(min = 1))]
    pub city: String,

    #[validate(range(min = 2018))]
    pub year: i32,
}

impl QueryScope {
    pub fn new(city: &str, year: i32) -> Result<Self> {
        if year < EARLIEST_SUPPORTED_YEAR {
            return Err(ProcessingError::InputValidation(format!(
                "Please provide a year that is greater than or equal to {} (got {})",
                EARLIEST_SUPPORTED_YEAR, year
            )));
        }

        let city = city.trim().to_uppercase();
        if city.is_empty() {
            return Err(ProcessingError::InputValidation(
                "City name must not be empty".to_string(),
            ));
        }

        let scope = Self { city, year };
        scope.validate()?;
        Ok(scope)
    }

    /// Years covered by a run, newest first: `year, year - 1, ...`.
    pub fn years(&self, count: u32) -> Vec<i32> {
        (0..count as i32).map(|offset| self.year - offset).collect()
    }

    pub fn previous_years(&self) -> [i32; 2] {
        [self.year - 1, self.year - 2]
    }
}
