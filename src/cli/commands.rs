use std::io::Write;

use anyhow::Result;
use log::info;

use crate::config::Config;
use crate::ledger::ExpenseRecord;
use crate::presenter::{money, render_list, run_chart_view, snapshot, Chart, ChartKind};

pub fn add<W: Write>(config: &Config, record: &ExpenseRecord, out: &mut W) -> Result<()> {
    config.store().append(record)?;
    info!("added expense, category={}, amount={}", record.category(), record.amount());

    writeln!(
        out,
        "Expense added: {} | {} | {}",
        record.date(),
        record.category(),
        money(&config.currency_symbol, record.amount())
    )?;

    Ok(())
}

pub fn list<W: Write>(config: &Config, out: &mut W) -> Result<()> {
    let contents = config.store().read_all()?;
    let total = config.aggregator().total_spent(contents.records());
    render_list(out, &contents, total, &config.currency_symbol)?;

    Ok(())
}

/// Reads the ledger once and builds the requested charts from it.
pub fn build_charts(config: &Config, kinds: &[ChartKind]) -> Result<Vec<Chart>> {
    let contents = config.store().read_all()?;
    let aggregator = config.aggregator();

    Ok(kinds
        .iter()
        .map(|kind| Chart::build(*kind, contents.records(), &aggregator, config.histogram_bins))
        .collect())
}

pub fn print_charts<W: Write>(config: &Config, kinds: &[ChartKind], width: u16, height: u16, out: &mut W) -> Result<()> {
    for chart in build_charts(config, kinds)? {
        writeln!(out, "{}", snapshot(&chart, width, height))?;
        writeln!(out)?;
    }

    Ok(())
}

pub fn show_charts(config: &Config, kinds: &[ChartKind]) -> Result<()> {
    run_chart_view(&build_charts(config, kinds)?)
}

pub fn clear<W: Write>(config: &Config, out: &mut W) -> Result<()> {
    config.store().truncate()?;
    writeln!(out, "All expenses cleared.")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use anyhow::{bail, Result};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::aggregate::SkipPolicy;
    use crate::ledger::LedgerError;

    fn scratch_config() -> Result<(tempfile::TempDir, Config)> {
        let dir = tempfile::tempdir()?;
        let config = Config {
            ledger_path: dir.path().join("expenses.csv"),
            currency_symbol: "$".to_string(),
            ..Config::default()
        };
        config.store().ensure_initialized()?;
        Ok((dir, config))
    }

    fn record(day: u32, category: &str, amount: rust_decimal::Decimal, note: &str) -> Result<ExpenseRecord> {
        let date = NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
        Ok(ExpenseRecord::new(date, category, amount, note)?)
    }

    fn output<F: FnOnce(&mut Vec<u8>) -> Result<()>>(f: F) -> Result<String> {
        let mut out = Vec::new();
        f(&mut out)?;
        Ok(String::from_utf8(out)?)
    }

    #[test]
    fn test_add_then_list() -> Result<()> {
        let (_dir, config) = scratch_config()?;

        let added = output(|out| add(&config, &record(15, "Food", dec!(10.00), "lunch, team")?, out))?;
        assert_eq!(added, "Expense added: 2024-01-15 | Food | $10.00\n");
        output(|out| add(&config, &record(16, "Travel", dec!(20.50), "")?, out))?;

        let listed = output(|out| list(&config, out))?;
        let expected = "Date | Category | Amount | Note\n\
                        ----------------------------------------\n\
                        2024-01-15 | Food | 10.00 | lunch, team\n\
                        2024-01-16 | Travel | 20.50 | \n\
                        \n\
                        Total Spent: $30.50\n";
        assert_eq!(listed, expected);

        Ok(())
    }

    #[test]
    fn test_list_total_skips_bad_amounts() -> Result<()> {
        let (_dir, config) = scratch_config()?;
        std::fs::write(
            &config.ledger_path,
            "Date,Category,Amount,Note\n2024-01-15,Food,10.00,\n2024-01-16,Food,20.50,\n2024-01-17,Food,bad,\n",
        )?;

        let listed = output(|out| list(&config, out))?;
        assert!(listed.contains("2024-01-17 | Food | bad | "));
        assert!(listed.ends_with("Total Spent: $30.50\n"));

        Ok(())
    }

    #[test]
    fn test_strict_total_drops_badly_dated_rows() -> Result<()> {
        let (_dir, mut config) = scratch_config()?;
        std::fs::write(
            &config.ledger_path,
            "Date,Category,Amount,Note\n2024-01-15,Food,10,\n15/01/2024,Food,5,\n",
        )?;

        assert!(output(|out| list(&config, out))?.ends_with("Total Spent: $15.00\n"));

        config.skip_policy = SkipPolicy::Strict;
        assert!(output(|out| list(&config, out))?.ends_with("Total Spent: $10.00\n"));

        Ok(())
    }

    #[test]
    fn test_list_missing_ledger_fails() -> Result<()> {
        let (_dir, config) = scratch_config()?;
        std::fs::remove_file(&config.ledger_path)?;

        match list(&config, &mut Vec::new()) {
            Err(err) => assert!(matches!(err.downcast_ref::<LedgerError>(), Some(LedgerError::Missing(_)))),
            Ok(()) => bail!("listing a missing ledger should fail"),
        }

        Ok(())
    }

    #[test]
    fn test_clear_keeps_header_only() -> Result<()> {
        let (_dir, config) = scratch_config()?;
        output(|out| add(&config, &record(1, "Food", dec!(3), "")?, out))?;

        let cleared = output(|out| clear(&config, out))?;
        assert_eq!(cleared, "All expenses cleared.\n");
        assert_eq!(std::fs::read_to_string(&config.ledger_path)?, "Date,Category,Amount,Note\n");

        Ok(())
    }

    #[test]
    fn test_print_charts() -> Result<()> {
        let (_dir, config) = scratch_config()?;
        output(|out| add(&config, &record(15, "Food", dec!(25), "")?, out))?;
        output(|out| add(&config, &record(20, "Travel", dec!(15), "")?, out))?;

        let printed = output(|out| print_charts(&config, &ChartKind::ALL, 80, 20, out))?;
        assert!(printed.contains("Expense Distribution by Category"));
        assert!(printed.contains("Food (62.5%)"));
        assert!(printed.contains("Histogram of Expense Amounts"));
        assert!(printed.contains("Expenses Over Time"));

        Ok(())
    }

    #[test]
    fn test_build_charts_respects_requested_kinds() -> Result<()> {
        let (_dir, config) = scratch_config()?;

        let charts = build_charts(&config, &[ChartKind::Timeline])?;
        assert_eq!(charts.len(), 1);
        assert!(matches!(charts[0], Chart::SpendingOverTime(_)));

        Ok(())
    }
}
