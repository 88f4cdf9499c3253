use crate::error::{ProcessingError, Result};
use crate::models::{CleanedRecord, QueryScope};
use crate::readers::read_cleaned_records;
use crate::writers::BlobStore;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Extremes {
    pub max_temp: f64,
    pub min_temp: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct YearlyComparison {
    pub year: i32,
    pub avg_current: Option<f64>,
    pub avg_previous: Option<f64>,
    pub percent_diff: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthlyAverage {
    pub month: u32,
    pub average: Option<f64>,
    /// Change from the previous listed month; absent for the first
    pub difference: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticsReport {
    pub scope: QueryScope,
    pub scoped_records: usize,
    pub total_records: usize,
    pub extremes: Option<Extremes>,
    pub yearly: YearlyComparison,
    pub monthly: Vec<MonthlyAverage>,
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

fn format_temp(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.2} °C", v))
        .unwrap_or_else(|| "n/a".to_string())
}

pub struct StatisticsEngine;

impl StatisticsEngine {
    pub fn new() -> Self {
        Self
    }

    /// Read the persisted record set back from the store
    pub fn load<B: BlobStore + ?Sized>(&self, store: &B, key: &str) -> Result<Vec<CleanedRecord>> {
        let body = store.get_object(key)?;
        let records = read_cleaned_records(&body)?;
        info!("Loaded {} records from {}", records.len(), store.describe(key));
        Ok(records)
    }

    pub fn query_scope<'a>(
        &self,
        records: &'a [CleanedRecord],
        scope: &QueryScope,
    ) -> Vec<&'a CleanedRecord> {
        records
            .iter()
            .filter(|r| r.year == scope.year && r.station_name == scope.city)
            .collect()
    }

    pub fn extremes(&self, scoped: &[&CleanedRecord], scope: &QueryScope) -> Result<Extremes> {
        let no_data = || ProcessingError::NoData {
            city: scope.city.clone(),
            year: scope.year,
        };

        let max_temp = scoped
            .iter()
            .map(|r| r.max_temp)
            .reduce(f64::max)
            .ok_or_else(no_data)?;
        let min_temp = scoped
            .iter()
            .map(|r| r.min_temp)
            .reduce(f64::min)
            .ok_or_else(no_data)?;

        Ok(Extremes { max_temp, min_temp })
    }

    /// Mean temperature of `year` against the two years before it, over every record given.
    ///
    /// A previous average of exactly zero yields a difference of 0.0, with or without a current average.
    pub fn yearly_comparison(&self, all: &[CleanedRecord], year: i32) -> YearlyComparison {
        let avg_current = mean(
            all.iter()
                .filter(|r| r.year == year)
                .filter_map(|r| r.mean_temp),
        );
        let avg_previous = mean(
            all.iter()
                .filter(|r| r.year == year - 1 || r.year == year - 2)
                .filter_map(|r| r.mean_temp),
        );

        let percent_diff = match (avg_current, avg_previous) {
            (_, Some(prev)) if prev == 0.0 => Some(0.0),
            (Some(cur), Some(prev)) => Some((cur - prev) / prev * 100.0),
            _ => None,
        };

        YearlyComparison {
            year,
            avg_current,
            avg_previous,
            percent_diff,
        }
    }

    pub fn monthly_profile(&self, scoped: &[&CleanedRecord]) -> Vec<MonthlyAverage> {
        let mut by_month: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
        for record in scoped {
            let temps = by_month.entry(record.month).or_default();
            if let Some(mean_temp) = record.mean_temp {
                temps.push(mean_temp);
            }
        }

        let mut previous: Option<Option<f64>> = None;
        by_month
            .into_iter()
            .map(|(month, temps)| {
                let average = mean(temps.into_iter());
                let difference = match previous {
                    Some(Some(prev)) => average.map(|avg| avg - prev),
                    _ => None,
                };
                previous = Some(average);
                MonthlyAverage {
                    month,
                    average,
                    difference,
                }
            })
            .collect()
    }

    /// Everything reported for a scope. An empty scope yields a report without extremes.
    pub fn analyze(&self, all: &[CleanedRecord], scope: &QueryScope) -> StatisticsReport {
        let scoped = self.query_scope(all, scope);
        debug!(
            city = %scope.city,
            year = scope.year,
            scoped = scoped.len(),
            "query scope applied"
        );

        let extremes = match self.extremes(&scoped, scope) {
            Ok(extremes) => Some(extremes),
            Err(err) => {
                info!("{}", err);
                None
            }
        };

        StatisticsReport {
            scope: scope.clone(),
            scoped_records: scoped.len(),
            total_records: all.len(),
            extremes,
            yearly: self.yearly_comparison(all, scope.year),
            monthly: self.monthly_profile(&scoped),
        }
    }
}

impl Default for StatisticsEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl StatisticsReport {
    pub fn has_data(&self) -> bool {
        self.scoped_records > 0
    }

    pub fn summary(&self) -> String {
        let city = &self.scope.city;
        let year = self.scope.year;

        let mut out = match &self.extremes {
            Some(extremes) => format!(
                "Max temperature for {year} in {city}: {:.1} °C\n\
                Min temperature for {year} in {city}: {:.1} °C\n",
                extremes.max_temp, extremes.min_temp
            ),
            None => format!("No data for {city} in {year}\n"),
        };

        out.push_str(&format!(
            "Average temperature for {year} in {city}: {}\n\
            Average temperature for the previous two years: {}\n",
            format_temp(self.yearly.avg_current),
            format_temp(self.yearly.avg_previous),
        ));
        match self.yearly.percent_diff {
            Some(diff) => out.push_str(&format!("Percentage difference: {:.2}%\n", diff)),
            None => out.push_str("Percentage difference: n/a\n"),
        }

        if !self.monthly.is_empty() {
            out.push_str(&format!("Average temperature per month for {year} in {city}:\n"));
            for month in &self.monthly {
                let difference = month
                    .difference
                    .map(|d| format!("{:+.2} °C", d))
                    .unwrap_or_else(|| "-".to_string());
                out.push_str(&format!(
                    "  {:>2}: {:>10}  {:>10}\n",
                    month.month,
                    format_temp(month.average),
                    difference
                ));
            }
        }

        out.trim_end().to_string()
    }
}
