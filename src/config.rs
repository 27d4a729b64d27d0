use std::num::NonZeroUsize;
use std::path::PathBuf;

use crate::aggregate::{Aggregator, SkipPolicy};
use crate::ledger::LedgerStore;

pub const DEFAULT_LEDGER_FILE: &str = "expenses.csv";
pub const DEFAULT_CURRENCY: &str = "₹";
pub const DEFAULT_HISTOGRAM_BINS: usize = 10;

/// Everything an action needs to know about where the ledger lives and how to
/// present it. Built once at startup and passed down explicitly.
#[derive(Debug, Clone)]
pub struct Config {
    pub ledger_path: PathBuf,
    pub currency_symbol: String,
    pub histogram_bins: NonZeroUsize,
    pub skip_policy: SkipPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            ledger_path: PathBuf::from(DEFAULT_LEDGER_FILE),
            currency_symbol: DEFAULT_CURRENCY.to_string(),
            histogram_bins: NonZeroUsize::new(DEFAULT_HISTOGRAM_BINS).unwrap_or(NonZeroUsize::MIN),
            skip_policy: SkipPolicy::default(),
        }
    }
}

impl Config {
    pub fn store(&self) -> LedgerStore {
        LedgerStore::new(&self.ledger_path)
    }

    pub fn aggregator(&self) -> Aggregator {
        Aggregator::new(self.skip_policy)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.ledger_path, PathBuf::from("expenses.csv"));
        assert_eq!(config.currency_symbol, "₹");
        assert_eq!(config.histogram_bins.get(), 10);
        assert_eq!(config.aggregator().policy(), SkipPolicy::PerView);
        assert_eq!(config.store().path(), PathBuf::from("expenses.csv").as_path());
    }
}
