pub mod export;
pub mod merge;
pub mod series;

pub use export::write_ledger_csv;
pub use merge::{AccountColumn, ChangeLedger, FilledLedger, MergedLedger};
