use crate::ledger::series::{
    add_months, linear_fit, month_end, month_start, month_starts_through, months_between,
};
use crate::ledger::MergedLedger;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

//a labelled point of a derived chart series
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

impl SeriesPoint {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        SeriesPoint { date, value }
    }
}

//running total of monthly net-worth changes up to `as_of`, labelled at month end
pub fn cumulative_savings(ledger: &MergedLedger, as_of: NaiveDate) -> Vec<SeriesPoint> {
    let rows: Vec<(NaiveDate, f64)> = ledger
        .dates
        .iter()
        .zip(&ledger.changes.net_worth)
        .filter(|(date, _)| **date <= as_of)
        .map(|(date, change)| (*date, change.unwrap_or(0.0)))
        .collect();

    let Some(&(first, _)) = rows.first() else {
        return Vec::new();
    };
    let last = rows.last().map(|r| r.0).unwrap_or(first);

    let origin = month_start(first);
    let mut monthly = vec![0.0; months_between(origin, last) as usize + 1];
    for (date, change) in &rows {
        monthly[months_between(origin, *date) as usize] += change;
    }

    let mut total = 0.0;
    monthly
        .into_iter()
        .enumerate()
        .map(|(i, sum)| {
            total += sum;
            SeriesPoint::new(month_end(add_months(origin, i as u32)), total)
        })
        .collect()
}

//least-squares trend over valid net worth by position, extended monthly to the end of the last year
pub fn net_worth_trend(ledger: &MergedLedger) -> Vec<SeriesPoint> {
    let valid = ledger.valid_net_worth();
    let y: Vec<f64> = valid.iter().map(|(_, v)| *v).collect();

    let (Some(&(first, _)), Some(&(last, _))) = (valid.first(), valid.last()) else {
        return Vec::new();
    };
    let Some((slope, intercept)) = linear_fit(&y) else {
        return Vec::new();
    };

    let year_end = NaiveDate::from_ymd_opt(last.year(), 12, 31).unwrap_or(last);
    month_starts_through(first, year_end)
        .into_iter()
        .enumerate()
        .map(|(i, date)| SeriesPoint::new(date, intercept + slope * i as f64))
        .collect()
}
