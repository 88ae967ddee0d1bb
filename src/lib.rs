pub mod cli;
pub mod core;
pub mod providers;

pub use crate::core::config;

use crate::cli::returns::ReturnsOptions;
use crate::providers::yahoo_finance::YahooFinanceProvider;
use anyhow::Result;
use tracing::{debug, info};

pub enum AppCommand {
    Returns(ReturnsOptions),
    Instruments,
}

fn load_config(config_path: Option<&str>) -> Result<config::AppConfig> {
    let config = match config_path {
        Some(path) => config::AppConfig::load_from_path(path)?,
        None => config::AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");
    Ok(config)
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("etfcagr starting...");

    let config = load_config(config_path)?;

    match command {
        AppCommand::Returns(options) => {
            let provider = YahooFinanceProvider::new(config.yahoo_base_url());
            cli::returns::run(&config, &provider, &options).await?;
        }
        AppCommand::Instruments => {
            println!("{}", cli::instruments::display_instruments(&config.instruments));
        }
    }
    Ok(())
}
