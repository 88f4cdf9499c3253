use clap::Parser;
use eccc_processor::cli::{run, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        eprintln!("Error: {}", err);
        std::process::exit(err.exit_code());
    }
}
