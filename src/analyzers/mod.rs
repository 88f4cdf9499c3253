pub mod statistics_engine;

pub use statistics_engine::{
    Extremes, MonthlyAverage, StatisticsEngine, StatisticsReport, YearlyComparison,
};
