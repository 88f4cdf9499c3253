use crate::analyzers::StatisticsEngine;
use crate::cli::args::{Cli, Commands};
use crate::config::PipelineConfig;
use crate::error::{Result, Stage};
use crate::fetchers::HttpObservationSource;
use crate::models::QueryScope;
use crate::processors::Pipeline;
use crate::readers::StationDirectory;
use crate::utils::filename::filtered_data_key;
use crate::utils::logging::init_tracing;
use crate::utils::progress::ProgressReporter;
use crate::writers::FsBlobStore;
use chrono::Local;
use tracing::info;

pub async fn run(cli: Cli) -> Result<()> {
    let start_logging = || init_tracing(cli.verbose, cli.log_file.as_deref());

    match cli.command {
        Commands::Run {
            city,
            year,
            json,
            skip_workbook,
        } => {
            // Validated before the log file, config, inventory or network is touched
            let scope = QueryScope::new(&city, year)?;
            start_logging()?;
            let config = PipelineConfig::load(cli.config.as_deref())?;

            info!(
                "Running {} {} against {}",
                scope.city, scope.year, config.fetch.base_url
            );

            let source = HttpObservationSource::new(&config.fetch)?;
            let store = FsBlobStore::from_config(&config.storage);
            let mut pipeline =
                Pipeline::from_config(config, source, store)?.with_skip_workbook(skip_workbook);

            let progress = ProgressReporter::new_spinner("Starting...", json);
            let today = Local::now().date_naive();
            let outcome = pipeline.run(&scope, today, Some(&progress)).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                println!("\n{}", outcome.summary());
            }
        }

        Commands::Report { city, year, json } => {
            let scope = QueryScope::new(&city, year)?;
            start_logging()?;
            let config = PipelineConfig::load(cli.config.as_deref())?;

            let store = FsBlobStore::from_config(&config.storage);
            let key = filtered_data_key(&config.storage.folder, &scope);
            let engine = StatisticsEngine::new();

            let records = engine
                .load(&store, &key)
                .map_err(|e| e.at(Stage::Querying))?;
            let report = engine.analyze(&records, &scope);

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", report.summary());
            }
        }

        Commands::Stations { name } => {
            start_logging()?;
            let config = PipelineConfig::load(cli.config.as_deref())?;
            let directory =
                StationDirectory::load(&config.directory.path, config.directory.header_lines)?;

            let matches = directory.find_by_name(&name);
            if matches.is_empty() {
                println!("No stations matching '{}'", name);
                return Ok(());
            }

            println!(
                "{:<40} {:<26} {:>10} {:>10}",
                "Name", "Province", "Station ID", "Climate ID"
            );
            for station in &matches {
                println!(
                    "{:<40} {:<26} {:>10} {:>10}",
                    station.name, station.province, station.station_id, station.climate_id
                );
            }
            println!("\n{} of {} stations match", matches.len(), directory.len());
        }
    }

    Ok(())
}
