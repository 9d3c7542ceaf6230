use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use runway::core::Catalog;

#[derive(Parser, Debug)]
#[command(
    name = "runway",
    about = "Startup use-of-funds calculator (runway scaling, category breakdown, contingency)"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the budget engine over HTTP.
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
        #[arg(long, default_value = "data/budget.json")]
        catalog: PathBuf,
    },
    /// Validate a catalog file and exit.
    Check {
        #[arg(long, default_value = "data/budget.json")]
        catalog: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve { port, catalog } => {
            let catalog = match Catalog::load(&catalog) {
                Ok(catalog) => catalog,
                Err(e) => {
                    eprintln!("Cannot start: {e}");
                    return ExitCode::FAILURE;
                }
            };
            if let Err(e) = runway::api::run_http_server(port, catalog).await {
                eprintln!("Server error: {e}");
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Command::Check { catalog } => match Catalog::load(&catalog) {
            Ok(loaded) => {
                println!(
                    "Catalog OK: {} fixed, {} monthly, {} optional cost items",
                    loaded.fixed_costs().len(),
                    loaded.monthly_costs().len(),
                    loaded.optional_costs().len()
                );
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Invalid catalog: {e}");
                ExitCode::FAILURE
            }
        },
    }
}
