use std::path::PathBuf;

use rust_decimal::Decimal;
use thiserror::Error;

pub mod record;
pub mod store;

pub use record::{ExpenseRecord, RawRow};
pub use store::{LedgerContents, LedgerStore};

/// Header row written at the top of every ledger file.
pub const HEADER: [&str; 4] = ["Date", "Category", "Amount", "Note"];

pub const DATE_FIELD: usize = 0;
pub const CATEGORY_FIELD: usize = 1;
pub const AMOUNT_FIELD: usize = 2;
pub const NOTE_FIELD: usize = 3;

/// Largest amount a single record may carry.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0);

/// Dates are stored as `YYYY-MM-DD`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger file {0} does not exist")]
    Missing(PathBuf),
    #[error("ledger file {0} has no header row")]
    MissingHeader(PathBuf),
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, PartialEq, Error)]
pub enum RecordError {
    #[error("expected {expected} fields, found {found}")]
    WrongFieldCount { expected: usize, found: usize },
    #[error("missing {0} field")]
    MissingField(&'static str),
    #[error("invalid amount {0:?}")]
    InvalidAmount(String),
    #[error("negative amount {0}")]
    NegativeAmount(Decimal),
    #[error("amount {0} is larger than {max}", max = MAX_AMOUNT)]
    AmountTooLarge(Decimal),
    #[error("adding amount {0} overflows the running total")]
    TotalOverflow(Decimal),
    #[error("invalid date {0:?}, expected YYYY-MM-DD")]
    InvalidDate(String),
}
