use std::io::{self, Write};

use anyhow::Result;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};
use log::warn;

use super::{commands, today};
use crate::config::Config;
use crate::ledger::record::{parse_amount, parse_date};
use crate::ledger::{ExpenseRecord, DATE_FORMAT};
use crate::presenter::ChartKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuItem {
    AddExpense,
    ViewExpenses,
    GraphicalView,
    ClearExpenses,
    Exit,
}

impl MenuItem {
    const ALL: [MenuItem; 5] = [
        MenuItem::AddExpense,
        MenuItem::ViewExpenses,
        MenuItem::GraphicalView,
        MenuItem::ClearExpenses,
        MenuItem::Exit,
    ];

    fn label(&self) -> &'static str {
        match self {
            MenuItem::AddExpense => "Add Expense",
            MenuItem::ViewExpenses => "View Expenses",
            MenuItem::GraphicalView => "Graphical View",
            MenuItem::ClearExpenses => "Clear All Expenses",
            MenuItem::Exit => "Exit",
        }
    }
}

/// Interactive loop. Exit only ends the session; clearing the ledger is a
/// separate item that always asks first.
pub fn run(config: &Config) -> Result<()> {
    let theme = ColorfulTheme::default();
    let labels: Vec<&str> = MenuItem::ALL.iter().map(MenuItem::label).collect();
    let mut out = io::stdout();

    writeln!(out, "Expense Tracker ({})", config.ledger_path.display())?;

    loop {
        let index = Select::with_theme(&theme)
            .with_prompt("Select an option")
            .items(&labels)
            .default(0)
            .interact()?;

        let outcome = match MenuItem::ALL[index] {
            MenuItem::AddExpense => prompt_expense(&theme).and_then(|record| commands::add(config, &record, &mut out)),
            MenuItem::ViewExpenses => commands::list(config, &mut out),
            MenuItem::GraphicalView => commands::show_charts(config, &ChartKind::ALL),
            MenuItem::ClearExpenses => match confirm_clear(config) {
                Ok(true) => commands::clear(config, &mut out),
                Ok(false) => Ok(()),
                Err(err) => Err(err),
            },
            MenuItem::Exit => {
                writeln!(out, "Goodbye! Your expenses are kept in {}.", config.ledger_path.display())?;
                return Ok(());
            },
        };

        if let Err(err) = outcome {
            warn!("menu action failed, err={:#}", err);
            eprintln!("Error: {err:#}");
        }
    }
}

pub fn confirm_clear(config: &Config) -> Result<bool> {
    Ok(Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(format!(
            "Delete every expense in {}? This cannot be undone",
            config.ledger_path.display()
        ))
        .default(false)
        .interact()?)
}

fn prompt_expense(theme: &ColorfulTheme) -> Result<ExpenseRecord> {
    let date: String = Input::with_theme(theme)
        .with_prompt("Date (YYYY-MM-DD)")
        .default(today().format(DATE_FORMAT).to_string())
        .validate_with(|text: &String| parse_date(text).map(|_| ()).map_err(|err| err.to_string()))
        .interact_text()?;

    let category: String = Input::with_theme(theme)
        .with_prompt("Category (e.g. Food, Travel)")
        .interact_text()?;

    let amount: String = Input::with_theme(theme)
        .with_prompt("Amount")
        .validate_with(|text: &String| parse_amount(text).map(|_| ()).map_err(|err| err.to_string()))
        .interact_text()?;

    let note: String = Input::with_theme(theme)
        .with_prompt("Note (optional)")
        .allow_empty(true)
        .interact_text()?;

    Ok(ExpenseRecord::new(parse_date(&date)?, category, parse_amount(&amount)?, note)?)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_exit_and_clear_are_separate_items() {
        let labels: Vec<&str> = MenuItem::ALL.iter().map(MenuItem::label).collect();

        assert_eq!(
            labels,
            vec!["Add Expense", "View Expenses", "Graphical View", "Clear All Expenses", "Exit"]
        );
        assert_eq!(MenuItem::ALL.last(), Some(&MenuItem::Exit));
    }
}
