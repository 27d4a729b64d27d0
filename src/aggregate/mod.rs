use std::collections::BTreeMap;

use chrono::NaiveDate;
use clap::ValueEnum;
use log::debug;
use rust_decimal::Decimal;

use crate::ledger::record::{check_shape, parse_amount, parse_date};
use crate::ledger::{RawRow, RecordError, AMOUNT_FIELD, CATEGORY_FIELD, DATE_FIELD};

pub mod histogram;


pub use histogram::{histogram, HistogramBin, MAX_HISTOGRAM_BINS};

/// Which rows an aggregation is allowed to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum SkipPolicy {
    /// Each aggregation checks only what it reads. Totals need a valid amount,
    /// category totals also need a complete row, and the time series also
    /// needs a valid date.
    #[default]
    PerView,
    /// Every aggregation drops rows that are not complete, valid records.
    Strict,
}

/// What a given aggregation needs from a row, from least to most.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Requirement {
    Amount,
    Complete,
    Dated,
}

#[derive(Debug)]
struct Entry<'r> {
    date: Option<NaiveDate>,
    category: &'r str,
    amount: Decimal,
}

/// Derives totals and series from raw ledger rows. Nothing is cached; every
/// call walks the rows it is given.
#[derive(Debug, Clone, Copy, Default)]
pub struct Aggregator {
    policy: SkipPolicy,
}

impl Aggregator {
    pub fn new(policy: SkipPolicy) -> Aggregator {
        Aggregator { policy }
    }

    pub fn policy(&self) -> SkipPolicy {
        self.policy
    }

    /// Sum of every usable amount. Unusable rows are left out of the sum
    /// without an error.
    pub fn total_spent(&self, records: &[RawRow]) -> Decimal {
        self.entries(records, Requirement::Amount)
            .fold(Decimal::ZERO, |total, entry| add_or_skip(total, entry.amount))
    }

    /// Amount per category. Category labels are compared exactly.
    pub fn category_totals(&self, records: &[RawRow]) -> BTreeMap<String, Decimal> {
        let mut totals = BTreeMap::new();
        for entry in self.entries(records, Requirement::Complete) {
            let total = totals.entry(entry.category.to_string()).or_insert(Decimal::ZERO);
            *total = add_or_skip(*total, entry.amount);
        }

        totals
    }

    /// Dated amounts sorted by date, ties broken by amount.
    pub fn time_series(&self, records: &[RawRow]) -> Vec<(NaiveDate, Decimal)> {
        let mut series: Vec<(NaiveDate, Decimal)> = self
            .entries(records, Requirement::Dated)
            .filter_map(|entry| entry.date.map(|date| (date, entry.amount)))
            .collect();
        series.sort();

        series
    }

    /// Amounts of the rows that make it into the time series, in ledger order.
    pub fn amounts(&self, records: &[RawRow]) -> Vec<Decimal> {
        self.entries(records, Requirement::Dated).map(|entry| entry.amount).collect()
    }

    fn entries<'r>(&self, records: &'r [RawRow], requirement: Requirement) -> impl Iterator<Item = Entry<'r>> + 'r {
        let requirement = match self.policy {
            SkipPolicy::PerView => requirement,
            SkipPolicy::Strict => Requirement::Dated,
        };

        records
            .iter()
            .enumerate()
            .filter_map(move |(index, row)| match check_row(row, requirement) {
                Ok(entry) => Some(entry),
                Err(err) => {
                    debug!("skipping ledger record {}, err={}", index + 1, err);
                    None
                },
            })
    }
}

/// Adds `amount` to `total`, leaving the total unchanged if the sum would
/// overflow.
fn add_or_skip(total: Decimal, amount: Decimal) -> Decimal {
    total.checked_add(amount).unwrap_or_else(|| {
        debug!("skipping ledger record, err={}", RecordError::TotalOverflow(amount));
        total
    })
}

fn check_row(row: &RawRow, requirement: Requirement) -> Result<Entry<'_>, RecordError> {
    if requirement >= Requirement::Complete {
        check_shape(row)?;
    }

    let amount_text = row.get(AMOUNT_FIELD).ok_or(RecordError::MissingField("amount"))?;
    let amount = parse_amount(amount_text)?;

    let date = if requirement >= Requirement::Dated {
        Some(parse_date(&row[DATE_FIELD])?)
    } else {
        None
    };

    Ok(Entry {
        date,
        category: row.get(CATEGORY_FIELD).map(String::as_str).unwrap_or_default(),
        amount,
    })
}
