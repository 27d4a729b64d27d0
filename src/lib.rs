pub mod aggregate;
pub mod cli;
pub mod config;
pub mod ledger;
pub mod presenter;
