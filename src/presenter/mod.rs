use std::io::{self, Write};

use rust_decimal::Decimal;

use crate::ledger::LedgerContents;

pub mod charts;
pub mod view;

pub use charts::{snapshot, Chart, ChartKind, ChartView};
pub use view::run_chart_view;

const RULE_WIDTH: usize = 40;

/// Formats an amount with the display currency symbol and two decimals.
pub fn money(symbol: &str, amount: Decimal) -> String {
    format!("{}{:.2}", symbol, amount.round_dp(2))
}

/// Writes every row pipe-joined as raw text, header first, followed by the
/// total. Rows are printed whatever their field count.
pub fn render_list<W: Write>(out: &mut W, contents: &LedgerContents, total: Decimal, symbol: &str) -> io::Result<()> {
    writeln!(out, "{}", contents.header().join(" | "))?;
    writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;

    for row in contents.records() {
        writeln!(out, "{}", row.join(" | "))?;
    }

    writeln!(out)?;
    writeln!(out, "Total Spent: {}", money(symbol, total))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::ledger::LedgerStore;

    #[test]
    fn test_money() {
        assert_eq!(money("₹", dec!(30.5)), "₹30.50");
        assert_eq!(money("$", dec!(0)), "$0.00");
        assert_eq!(money("", dec!(1.005)), "1.00");
        assert_eq!(money("€", dec!(12.345)), "€12.34");
    }

    #[test]
    fn test_render_list() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("expenses.csv");
        std::fs::write(
            &path,
            "Date,Category,Amount,Note\n2024-01-15,Food,250.50,Lunch with team\n2024-01-16,Travel\n",
        )?;
        let contents = LedgerStore::new(&path).read_all()?;

        let mut out = Vec::new();
        render_list(&mut out, &contents, dec!(250.50), "₹")?;

        let expected = "Date | Category | Amount | Note\n\
                        ----------------------------------------\n\
                        2024-01-15 | Food | 250.50 | Lunch with team\n\
                        2024-01-16 | Travel\n\
                        \n\
                        Total Spent: ₹250.50\n";
        assert_eq!(String::from_utf8(out)?, expected);

        Ok(())
    }
}
