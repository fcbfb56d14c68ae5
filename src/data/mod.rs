pub mod balance;
pub mod cache;
pub mod loader;

pub use balance::{AccountSeries, BalanceRecord};
pub use cache::{fingerprint_sheets, workbook_fingerprint, LedgerCache};
pub use loader::{load_sheet, load_workbook, parse_workbook, read_workbook, SheetBytes};
