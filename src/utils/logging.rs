use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing::Level;

use crate::error::Result;

/// Install the global fmt subscriber: INFO by default, DEBUG with `verbose`,
/// appended to `log_file` (without colours) when one is given.
pub fn init_tracing(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let builder = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false);

    // A subscriber may already be installed (tests, embedding); keep it.
    match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let _ = builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init();
        }
        None => {
            let _ = builder.with_writer(std::io::stderr).try_init();
        }
    }

    Ok(())
}
