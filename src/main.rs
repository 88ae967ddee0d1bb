use anyhow::Result;
use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use etfcagr::cli::returns::ReturnsOptions;
use etfcagr::core::evaluation::{MIN_YEAR, current_year};
use etfcagr::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Increase logging verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display total return and CAGR for each instrument
    Returns {
        /// First calendar year of the range (from Jan 1)
        #[arg(short, long, default_value_t = MIN_YEAR)]
        start_year: i32,

        /// Last calendar year of the range (to Dec 31), at most and by default the current year
        #[arg(short, long)]
        end_year: Option<i32>,

        /// Print the records as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// List the configured instruments
    Instruments,
}

impl From<Commands> for etfcagr::AppCommand {
    fn from(cmd: Commands) -> etfcagr::AppCommand {
        match cmd {
            Commands::Returns {
                start_year,
                end_year,
                json,
            } => etfcagr::AppCommand::Returns(ReturnsOptions {
                start_year,
                end_year: end_year.unwrap_or_else(current_year),
                json,
            }),
            Commands::Instruments => etfcagr::AppCommand::Instruments,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => etfcagr::cli::setup::setup(),
        Some(cmd) => etfcagr::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
