use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "eccc-processor")]
#[command(about = "Environment Canada daily climate data fetcher and trend reporter")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Configuration file (TOML, YAML or JSON)")]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch three years of observations for a city, clean, store and report
    Run {
        #[arg(long, help = "Station name as listed in the inventory (case-insensitive)")]
        city: String,

        #[arg(long, help = "Target year (2018 or later)")]
        year: i32,

        #[arg(long, help = "Print the outcome as JSON")]
        json: bool,

        #[arg(long, help = "Do not write the per-year workbook")]
        skip_workbook: bool,
    },

    /// Report statistics from data stored by an earlier run
    Report {
        #[arg(long)]
        city: String,

        #[arg(long)]
        year: i32,

        #[arg(long, help = "Print the report as JSON")]
        json: bool,
    },

    /// Search the station inventory by name
    Stations {
        #[arg(short, long, help = "Case-insensitive name fragment")]
        name: String,
    },
}
