use std::io::{self, IsTerminal, Write};
use std::num::NonZeroUsize;
use std::path::PathBuf;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use log::debug;
use rust_decimal::Decimal;

use crate::aggregate::{SkipPolicy, MAX_HISTOGRAM_BINS};
use crate::config::{Config, DEFAULT_CURRENCY, DEFAULT_LEDGER_FILE};
use crate::ledger::record::{parse_amount, parse_date};
use crate::ledger::ExpenseRecord;
use crate::presenter::ChartKind;

pub mod commands;
pub mod menu;

#[derive(Debug, Parser)]
#[command(name = "expenso", version, about = "Log expenses to a CSV ledger, list them and chart them")]
pub struct Cli {
    #[command(flatten)]
    pub options: Options,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Args)]
pub struct Options {
    /// Ledger file to read and write
    #[arg(long, global = true, env = "EXPENSO_LEDGER", default_value = DEFAULT_LEDGER_FILE)]
    pub ledger: PathBuf,

    /// Symbol printed in front of totals
    #[arg(long, global = true, default_value = DEFAULT_CURRENCY)]
    pub currency: String,

    /// Number of histogram bins
    #[arg(long, global = true, default_value = "10", value_parser = parse_bins)]
    pub bins: NonZeroUsize,

    /// Which rows the totals and charts are allowed to use
    #[arg(long, global = true, value_enum, default_value_t = SkipPolicy::PerView)]
    pub skip_policy: SkipPolicy,
}

impl From<&Options> for Config {
    fn from(options: &Options) -> Self {
        Config {
            ledger_path: options.ledger.clone(),
            currency_symbol: options.currency.clone(),
            histogram_bins: options.bins,
            skip_policy: options.skip_policy,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Append one expense to the ledger
    Add {
        /// Short label such as Food or Travel
        #[arg(long)]
        category: String,

        /// Plain decimal amount, no currency symbol
        #[arg(long, value_parser = parse_amount)]
        amount: Decimal,

        /// YYYY-MM-DD, defaults to today
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,

        #[arg(long, default_value = "")]
        note: String,
    },
    /// Print every expense and the total spent
    List,
    /// Chart the ledger
    Chart {
        /// Charts to show, all of them when omitted
        #[arg(long = "kind", value_enum)]
        kinds: Vec<ChartKind>,

        /// Print text snapshots instead of opening the interactive view
        #[arg(long)]
        print: bool,

        #[arg(long, default_value_t = 80)]
        width: u16,

        #[arg(long, default_value_t = 20)]
        height: u16,
    },
    /// Delete every expense, keeping only the header row
    Clear {
        /// Do not ask for confirmation
        #[arg(long)]
        yes: bool,
    },
    /// Interactive menu (the default)
    Menu,
}

fn parse_bins(text: &str) -> Result<NonZeroUsize, String> {
    let bins: NonZeroUsize = text.parse().map_err(|err| format!("{err}"))?;
    if bins.get() > MAX_HISTOGRAM_BINS {
        return Err(format!("at most {MAX_HISTOGRAM_BINS} bins are supported"));
    }

    Ok(bins)
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn run(cli: Cli) -> Result<()> {
    let config = Config::from(&cli.options);
    debug!("running with config={:?}", config);

    config.store().ensure_initialized()?;

    let mut out = io::stdout();
    match cli.command.unwrap_or(Commands::Menu) {
        Commands::Add {
            category,
            amount,
            date,
            note,
        } => {
            let record = ExpenseRecord::new(date.unwrap_or_else(today), category, amount, note)?;
            commands::add(&config, &record, &mut out)
        },
        Commands::List => commands::list(&config, &mut out),
        Commands::Chart {
            kinds,
            print,
            width,
            height,
        } => {
            let kinds = if kinds.is_empty() { ChartKind::ALL.to_vec() } else { kinds };
            if print || !out.is_terminal() {
                commands::print_charts(&config, &kinds, width, height, &mut out)
            } else {
                commands::show_charts(&config, &kinds)
            }
        },
        Commands::Clear { yes } => {
            if yes || menu::confirm_clear(&config)? {
                commands::clear(&config, &mut out)
            } else {
                writeln!(out, "Nothing was cleared.")?;
                Ok(())
            }
        },
        Commands::Menu => menu::run(&config),
    }
}
