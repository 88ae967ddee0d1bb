use super::ui;
use crate::core::{
    ElapsedYearsPolicy, LaunchYear, MarketDataProvider, RecordStatus, ReturnRecord, YearRange,
    config::AppConfig, evaluation, evaluation::current_year,
};
use anyhow::Result;
use comfy_table::{Cell, Color};
use serde::Serialize;
use tracing::info;

/// User-selected inputs for the returns report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReturnsOptions {
    pub start_year: i32,
    pub end_year: i32,
    pub json: bool,
}

#[derive(Serialize)]
struct ReturnsReport<'a> {
    start_year: i32,
    end_year: i32,
    elapsed_years: ElapsedYearsPolicy,
    records: &'a [ReturnRecord],
}

/// Evaluates every configured instrument and prints the report.
///
/// Returns the records in configuration order.
pub async fn run(
    config: &AppConfig,
    provider: &(dyn MarketDataProvider + Send + Sync),
    options: &ReturnsOptions,
) -> Result<Vec<ReturnRecord>> {
    let range = YearRange::new(options.start_year, options.end_year)?;
    info!(
        start_year = range.start_year(),
        end_year = range.end_year(),
        "Calculating returns for {} instruments",
        config.instruments.len()
    );

    if config.instruments.is_empty() {
        println!("No instruments configured.");
        return Ok(Vec::new());
    }

    let pb = ui::new_progress_bar(config.instruments.len() as u64);
    let records = evaluation::evaluate_all(
        provider,
        &config.instruments,
        range,
        config.elapsed_years,
        &|| pb.inc(1),
    )
    .await;
    pb.finish_and_clear();

    if options.json {
        let report = ReturnsReport {
            start_year: range.start_year(),
            end_year: range.end_year(),
            elapsed_years: config.elapsed_years,
            records: &records,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", display_returns(&records, range, config.elapsed_years));
    }

    Ok(records)
}

fn launch_year_cell(launch_year: LaunchYear) -> Cell {
    let cell = Cell::new(launch_year.to_string());
    match launch_year {
        LaunchYear::Year(_) => cell,
        LaunchYear::Unknown => cell.fg(Color::DarkGrey),
        LaunchYear::Error => cell.fg(Color::Red),
    }
}

fn period_note(range: YearRange, policy: ElapsedYearsPolicy) -> String {
    match policy {
        ElapsedYearsPolicy::RequestedWindow => format!(
            "Period measured from Jan 1 {} to Dec 31 {}, not from the first and last trading day.",
            range.start_year(),
            range.end_year()
        ),
        ElapsedYearsPolicy::TradingDays => {
            "Period measured from the first to the last trading day in range.".to_string()
        }
    }
}

/// Renders records as a table followed by per-instrument notices.
pub fn display_returns(
    records: &[ReturnRecord],
    range: YearRange,
    policy: ElapsedYearsPolicy,
) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Instrument"),
        ui::header_cell("Symbol"),
        ui::header_cell("Launch Year"),
        ui::header_cell("Total Return"),
        ui::header_cell("CAGR"),
        ui::header_cell("Period"),
    ]);

    let mut notices = Vec::new();
    for record in records {
        let missing = if record.status == RecordStatus::Error {
            ui::Missing::Failed
        } else {
            ui::Missing::NotApplicable
        };

        table.add_row(vec![
            Cell::new(&record.name),
            Cell::new(&record.symbol),
            launch_year_cell(record.launch_year),
            ui::rate_cell(record.total_return(), missing),
            ui::rate_cell(record.cagr(), missing),
            ui::years_cell(record.years(), missing),
        ]);

        match record.status {
            RecordStatus::NoPriceData | RecordStatus::NoLaunchData => notices.push(
                ui::style_text(&format!("No data for {}", record.name), ui::StyleType::Warning),
            ),
            RecordStatus::PreLaunch => notices.push(ui::style_text(
                &format!(
                    "{} launched in {}, after {}",
                    record.name,
                    record.launch_year,
                    range.start_year()
                ),
                ui::StyleType::Subtle,
            )),
            RecordStatus::Error => notices.push(ui::style_text(
                &format!(
                    "Error loading {}: {}",
                    record.name,
                    record.message.as_deref().unwrap_or("unknown error")
                ),
                ui::StyleType::Error,
            )),
            RecordStatus::Computed => {}
        }
    }

    let title = format!(
        "Returns {}-{}",
        range.start_year(),
        range.end_year()
    );
    let mut output = format!("{}\n\n", ui::style_text(&title, ui::StyleType::Title));
    output.push_str(&table.to_string());
    output.push_str(&format!(
        "\n{}",
        ui::style_text(&period_note(range, policy), ui::StyleType::Subtle)
    ));
    if policy == ElapsedYearsPolicy::RequestedWindow && range.end_year() >= current_year() {
        output.push_str(&format!(
            "\n{}",
            ui::style_text(
                &format!(
                    "{} is not over yet; CAGR is annualized as if the period ran to Dec 31 {}.",
                    range.end_year(),
                    range.end_year()
                ),
                ui::StyleType::Warning,
            )
        ));
    }
    for notice in notices {
        output.push_str(&format!("\n{notice}"));
    }
    output
}
