use crate::data::balance::{parse_balance, parse_date, AccountSeries, BalanceRecord};
use crate::error::{DashboardError, Result};
use csv::ReaderBuilder;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const DATE_COLUMN: &str = "Date";
pub const BALANCE_COLUMN: &str = "Balance";

//lists the sheet files of a workbook directory in file-name order
pub fn workbook_sheets<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let mut sheets = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_csv = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);

        if path.is_file() && is_csv {
            sheets.push(path);
        }
    }

    sheets.sort();

    if sheets.is_empty() {
        return Err(DashboardError::data_format(format!(
            "no account sheets (*.csv) found in {:?}",
            dir
        )));
    }

    Ok(sheets)
}

//account identifier of a sheet: its file stem
pub fn account_name(path: &Path) -> Result<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(|stem| stem.to_string())
        .ok_or_else(|| DashboardError::data_format(format!("invalid sheet name {:?}", path)))
}

//the raw content of one sheet, read once so the same bytes are fingerprinted and parsed
#[derive(Debug, Clone, PartialEq)]
pub struct SheetBytes {
    pub account: String,
    pub bytes: Vec<u8>,
}

//reads every sheet of a workbook directory into memory
pub fn read_workbook<P: AsRef<Path>>(dir: P) -> Result<Vec<SheetBytes>> {
    let paths = workbook_sheets(dir)?;

    let mut sheets = Vec::with_capacity(paths.len());
    for path in &paths {
        sheets.push(SheetBytes {
            account: account_name(path)?,
            bytes: std::fs::read(path)?,
        });
    }

    Ok(sheets)
}

//parses sheets already read into memory
pub fn parse_workbook(sheets: &[SheetBytes]) -> Result<Vec<AccountSeries>> {
    sheets
        .iter()
        .map(|sheet| load_sheet(&sheet.account, sheet.bytes.as_slice()))
        .collect()
}

//loads every sheet of a workbook directory
pub fn load_workbook<P: AsRef<Path>>(dir: P) -> Result<Vec<AccountSeries>> {
    let dir = dir.as_ref();
    let accounts = parse_workbook(&read_workbook(dir)?)?;

    info!(dir = ?dir, accounts = accounts.len(), "loaded workbook");
    Ok(accounts)
}

//parses one account sheet with Date and Balance columns
pub fn load_sheet<R: Read>(account: &str, reader: R) -> Result<AccountSeries> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let column = |wanted: &str| {
        headers
            .iter()
            .position(|h| h.trim() == wanted)
            .ok_or_else(|| {
                DashboardError::data_format(format!(
                    "sheet '{}' is missing required column '{}'",
                    account, wanted
                ))
            })
    };
    let date_idx = column(DATE_COLUMN)?;
    let balance_idx = column(BALANCE_COLUMN)?;

    let mut records = Vec::new();

    for (index, result) in rdr.records().enumerate() {
        let record = result?;
        let line = index + 2;

        let date_raw = record.get(date_idx).unwrap_or("");
        if date_raw.is_empty() && record.iter().all(|cell| cell.is_empty()) {
            //blank trailing rows are common in exported sheets
            continue;
        }

        let date = parse_date(date_raw).ok_or_else(|| {
            DashboardError::data_format(format!(
                "sheet '{}': unparseable date '{}' at line {}",
                account, date_raw, line
            ))
        })?;

        let balance = record.get(balance_idx).and_then(parse_balance);
        records.push(BalanceRecord::new(date, balance));
    }

    debug!(account, rows = records.len(), "parsed sheet");
    Ok(AccountSeries::new(account, records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_load_sheet_coerces_non_numeric() {
        let data = "Date,Balance,Note\n2024-01-01,100,\n2024-02-01,oops,typo\n2024-03-01,,\n";
        let series = load_sheet("Checking", data.as_bytes()).unwrap();

        assert_eq!(series.name, "Checking");
        assert_eq!(series.len(), 3);
        assert_eq!(series.records()[0].balance, Some(100.0));
        assert_eq!(series.records()[1].balance, None);
        assert_eq!(series.records()[2].balance, None);
    }

    #[test]
    fn test_load_sheet_missing_column_is_data_format_error() {
        let data = "Date,Amount\n2024-01-01,100\n";
        let err = load_sheet("Savings", data.as_bytes()).unwrap_err();

        assert!(matches!(err, DashboardError::DataFormat(_)));
        assert!(err.to_string().contains("Balance"));
    }

    #[test]
    fn test_load_sheet_bad_date_reports_line() {
        let data = "Date,Balance\n2024-01-01,1\nnot-a-date,2\n";
        let err = load_sheet("Brokerage", data.as_bytes()).unwrap_err();

        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn test_load_sheet_skips_blank_rows_and_sorts() {
        let data = "Balance,Date\n20,2024-02-01\n,\n10,2024-01-01\n";
        let series = load_sheet("Cash", data.as_bytes()).unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(
            series.records()[0].date,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
    }

    #[test]
    fn test_parse_workbook_uses_bytes_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Checking.csv");
        std::fs::write(&path, "Date,Balance\n2024-01-01,100\n").unwrap();

        let sheets = read_workbook(dir.path()).unwrap();
        std::fs::write(&path, "Date,Balance\n2024-01-01,999\n").unwrap();

        let accounts = parse_workbook(&sheets).unwrap();
        assert_eq!(sheets[0].account, "Checking");
        assert_eq!(accounts[0].records()[0].balance, Some(100.0));
    }
}
