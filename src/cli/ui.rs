use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    Warning,
    Error,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::Warning => style(text).yellow(),
        StyleType::Error => style(text).red(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Creates a new `comfy_table::Table` with rounded borders.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

/// Why a metric cell has no value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Missing {
    /// No data for the range, rendered grey.
    NotApplicable,
    /// Fetch or calculation failed, rendered red.
    Failed,
}

fn missing_cell(missing: Missing) -> Cell {
    let color = match missing {
        Missing::NotApplicable => Color::DarkGrey,
        Missing::Failed => Color::Red,
    };
    Cell::new("N/A")
        .fg(color)
        .set_alignment(CellAlignment::Right)
}

/// Right-aligned cell for a fractional rate, `0.125` renders as `12.50%`
/// in green and negative rates in red.
pub fn rate_cell(rate: Option<f64>, missing: Missing) -> Cell {
    let Some(rate) = rate else {
        return missing_cell(missing);
    };
    let color = if rate >= 0.0 { Color::Green } else { Color::Red };
    Cell::new(format!("{:.2}%", rate * 100.0))
        .fg(color)
        .set_alignment(CellAlignment::Right)
}

/// Right-aligned cell for a period length in years.
pub fn years_cell(years: Option<f64>, missing: Missing) -> Cell {
    match years {
        Some(years) => Cell::new(format!("{years:.2} years")).set_alignment(CellAlignment::Right),
        None => missing_cell(missing),
    }
}

/// Progress bar counting finished instruments.
pub fn new_progress_bar(len: u64) -> ProgressBar {
    let template = "{spinner:.green} {msg} [{bar:40.cyan/blue}] {pos}/{len}";

    let pb = ProgressBar::new(len);
    if let Ok(bar_style) = ProgressStyle::default_bar().template(template) {
        pb.set_style(bar_style.progress_chars("#>-"));
    }
    pb.set_message("Fetching prices");
    pb
}
