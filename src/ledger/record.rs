use std::str::FromStr;

use chrono::NaiveDate;
use getset::{CopyGetters, Getters};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

use super::{
    RecordError, AMOUNT_FIELD, CATEGORY_FIELD, DATE_FIELD, DATE_FORMAT, HEADER, MAX_AMOUNT, NOTE_FIELD,
};

/// A ledger row exactly as read from disk, one string per field.
pub type RawRow = Vec<String>;

/// One logged expense. Field order matches the ledger header.
#[derive(Debug, Clone, PartialEq, Serialize, Getters, CopyGetters)]
pub struct ExpenseRecord {
    #[getset(get_copy = "pub")]
    date: NaiveDate,
    #[getset(get = "pub")]
    category: String,
    #[getset(get_copy = "pub")]
    amount: Decimal,
    #[getset(get = "pub")]
    note: String,
}

impl ExpenseRecord {
    pub fn new(
        date: NaiveDate,
        category: impl Into<String>,
        amount: Decimal,
        note: impl Into<String>,
    ) -> Result<ExpenseRecord, RecordError> {
        check_amount(amount)?;

        Ok(ExpenseRecord {
            date,
            category: category.into(),
            amount,
            note: note.into(),
        })
    }
}

impl TryFrom<&RawRow> for ExpenseRecord {
    type Error = RecordError;

    fn try_from(row: &RawRow) -> Result<Self, Self::Error> {
        check_shape(row)?;

        let amount = parse_amount(&row[AMOUNT_FIELD])?;
        let date = parse_date(&row[DATE_FIELD])?;

        Ok(ExpenseRecord {
            date,
            category: row[CATEGORY_FIELD].clone(),
            amount,
            note: row[NOTE_FIELD].clone(),
        })
    }
}

pub fn check_shape(row: &RawRow) -> Result<(), RecordError> {
    if row.len() != HEADER.len() {
        return Err(RecordError::WrongFieldCount {
            expected: HEADER.len(),
            found: row.len(),
        });
    }

    Ok(())
}

fn check_amount(amount: Decimal) -> Result<Decimal, RecordError> {
    if amount < dec!(0) {
        return Err(RecordError::NegativeAmount(amount));
    }

    if amount > MAX_AMOUNT {
        return Err(RecordError::AmountTooLarge(amount));
    }

    Ok(amount)
}

/// Parses an amount field. Surrounding whitespace is ignored, scientific
/// notation is accepted, and negative or oversized values are rejected.
pub fn parse_amount(text: &str) -> Result<Decimal, RecordError> {
    let trimmed = text.trim();
    let amount = Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| RecordError::InvalidAmount(text.to_string()))?;

    check_amount(amount)
}

/// Parses a date field that must be exactly `YYYY-MM-DD`.
pub fn parse_date(text: &str) -> Result<NaiveDate, RecordError> {
    let bytes = text.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });

    if !well_formed {
        return Err(RecordError::InvalidDate(text.to_string()));
    }

    NaiveDate::parse_from_str(text, DATE_FORMAT).map_err(|_| RecordError::InvalidDate(text.to_string()))
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use pretty_assertions::assert_eq;

    use super::*;

    fn row(fields: &[&str]) -> RawRow {
        fields.iter().map(|f| f.to_string()).collect()
    }

    #[test]
    fn test_new_rejects_negative_amount() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(
            ExpenseRecord::new(date, "Food", dec!(-1), ""),
            Err(RecordError::NegativeAmount(dec!(-1)))
        );
    }

    #[test]
    fn test_new_accepts_zero_amount() -> Result<()> {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let record = ExpenseRecord::new(date, "Gift", dec!(0), "free lunch")?;
        assert_eq!(record.amount(), dec!(0));
        assert_eq!(record.category(), "Gift");
        assert_eq!(record.note(), "free lunch");
        Ok(())
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("250.50"), Ok(dec!(250.50)));
        assert_eq!(parse_amount(" 12 "), Ok(dec!(12)));
        assert_eq!(parse_amount("1e2"), Ok(dec!(100)));
        assert_eq!(parse_amount("bad"), Err(RecordError::InvalidAmount("bad".to_string())));
        assert_eq!(parse_amount(""), Err(RecordError::InvalidAmount(String::new())));
        assert_eq!(parse_amount("-3"), Err(RecordError::NegativeAmount(dec!(-3))));
    }

    #[test]
    fn test_parse_amount_rejects_oversized_values() {
        assert_eq!(MAX_AMOUNT, dec!(1_000_000_000_000_000));
        assert_eq!(parse_amount("1000000000000000"), Ok(MAX_AMOUNT));
        assert_eq!(
            parse_amount("50000000000000000000000000000"),
            Err(RecordError::AmountTooLarge(dec!(50000000000000000000000000000)))
        );
        assert!(matches!(parse_amount("1e27"), Err(RecordError::AmountTooLarge(_))));

        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert!(matches!(
            ExpenseRecord::new(date, "Food", MAX_AMOUNT + dec!(1), ""),
            Err(RecordError::AmountTooLarge(_))
        ));
    }

    #[test]
    fn test_parse_date_requires_padded_fields() {
        assert_eq!(parse_date("2024-03-01"), Ok(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()));
        assert!(parse_date("2024-3-1").is_err());
        assert!(parse_date("24-03-01").is_err());
        assert!(parse_date("2024/03/01").is_err());
        assert!(parse_date("2024-03-01 ").is_err());
        assert!(parse_date("2024-02-30").is_err());
    }

    #[test]
    fn test_try_from_row() -> Result<()> {
        let record = ExpenseRecord::try_from(&row(&["2024-01-15", "Food", "250.50", "Lunch with team"]))?;
        assert_eq!(record.date(), NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(record.category(), "Food");
        assert_eq!(record.amount(), dec!(250.50));
        assert_eq!(record.note(), "Lunch with team");
        Ok(())
    }

    #[test]
    fn test_try_from_row_wrong_shape() {
        assert_eq!(
            ExpenseRecord::try_from(&row(&["2024-01-15", "Food", "1", "a", "b"])),
            Err(RecordError::WrongFieldCount { expected: 4, found: 5 })
        );
    }
}
