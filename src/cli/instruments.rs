use super::ui;
use crate::core::config::Instrument;
use comfy_table::Cell;

/// Renders the configured instrument list.
pub fn display_instruments(instruments: &[Instrument]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Instrument"), ui::header_cell("Symbol")]);
    for instrument in instruments {
        table.add_row(vec![Cell::new(&instrument.name), Cell::new(&instrument.symbol)]);
    }
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::default_instruments;

    #[test]
    fn lists_every_instrument() {
        let output = display_instruments(&default_instruments());
        assert!(output.contains("S&P 500 (SPY)"));
        assert!(output.contains("^NSEBANK"));
    }
}
