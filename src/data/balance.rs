use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::warn;

//a single balance observation for one account; None means the balance was blank or not a number
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BalanceRecord {
    pub date: NaiveDate,
    pub balance: Option<f64>,
}

impl BalanceRecord {
    pub fn new(date: NaiveDate, balance: Option<f64>) -> Self {
        BalanceRecord { date, balance }
    }
}

//the balance history of one account (one sheet of the workbook)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccountSeries {
    pub name: String,
    records: Vec<BalanceRecord>,
}

impl AccountSeries {
    //creates a series sorted by date; when a date repeats the later record wins
    pub fn new(name: impl Into<String>, mut records: Vec<BalanceRecord>) -> Self {
        let name = name.into();

        //stable sort keeps file order among equal dates
        records.sort_by_key(|r| r.date);

        let mut deduped: Vec<BalanceRecord> = Vec::with_capacity(records.len());
        for record in records {
            match deduped.last_mut() {
                Some(last) if last.date == record.date => {
                    warn!(account = %name, date = %record.date, "duplicate date replaced");
                    *last = record;
                }
                _ => deduped.push(record),
            }
        }

        AccountSeries {
            name,
            records: deduped,
        }
    }

    //builds a series from (date, balance) pairs
    pub fn from_pairs(name: impl Into<String>, pairs: &[(NaiveDate, Option<f64>)]) -> Self {
        let records = pairs
            .iter()
            .map(|&(date, balance)| BalanceRecord::new(date, balance))
            .collect();
        Self::new(name, records)
    }

    pub fn records(&self) -> &[BalanceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    //balance recorded on the given date, if the date is present and the balance known
    pub fn balance_on(&self, date: NaiveDate) -> Option<f64> {
        self.records
            .binary_search_by_key(&date, |r| r.date)
            .ok()
            .and_then(|idx| self.records[idx].balance)
    }
}

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

//parses a sheet date cell; time components are discarded
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(date);
        }
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.date())
}

//coerces a balance cell to a number; anything unparseable becomes None
pub fn parse_balance(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(*c, '€' | '$' | '£' | ' '))
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    let digits = strip_thousands_separators(&cleaned)?;
    digits.parse::<f64>().ok().filter(|v| v.is_finite())
}

//removes `,` only where it groups the integer part in threes (1,234,567.89);
//a decimal comma or irregular grouping is rejected
fn strip_thousands_separators(raw: &str) -> Option<String> {
    if !raw.contains(',') {
        return Some(raw.to_string());
    }

    let unsigned = raw
        .strip_prefix(|c: char| c == '-' || c == '+')
        .unwrap_or(raw);
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (unsigned, None),
    };

    if fraction.is_some_and(|f| f.contains(',')) {
        return None;
    }

    let mut groups = integer.split(',');
    let lead = groups.next()?;
    let lead_ok = (1..=3).contains(&lead.len()) && lead.bytes().all(|b| b.is_ascii_digit());
    let rest_ok = groups.all(|g| g.len() == 3 && g.bytes().all(|b| b.is_ascii_digit()));

    if lead_ok && rest_ok {
        Some(raw.replace(',', ""))
    } else {
        None
    }
}
