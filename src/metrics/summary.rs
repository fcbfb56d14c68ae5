use crate::error::{DashboardError, Result};
use crate::ledger::series::{first_extreme, monthly_last, trailing_mean};
use crate::ledger::{FilledLedger, MergedLedger};
use chrono::{Datelike, NaiveDate};
use prettytable::{Cell, Row, Table};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

pub const ROLLING_WINDOW: usize = 12;

//a metric value and the date it was observed
pub type DatedValue = (f64, NaiveDate);

//summary metrics for the dashboard; None marks a metric that could not be computed
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DashboardStats {
    pub avg_12m: Option<f64>,
    pub last_month_change: Option<f64>,
    pub best_month: Option<DatedValue>,
    pub worst_month: Option<DatedValue>,
    pub ytd_savings: Option<f64>,
    pub average_monthly_save: Option<f64>,
    pub max_value: Option<f64>,
    pub max_date: Option<NaiveDate>,
}

impl DashboardStats {
    //computes every metric independently from the forward-filled ledger
    pub fn from_ledger(ledger: &MergedLedger, as_of: NaiveDate) -> Result<Self> {
        if ledger.accounts.is_empty() {
            return Err(DashboardError::data_format(
                "ledger has no account columns, net worth cannot be derived",
            ));
        }

        let filled = ledger.forward_filled();
        let max = first_extreme(&filled.net_worth, true);

        Ok(DashboardStats {
            avg_12m: trailing_mean(&filled.net_worth, ROLLING_WINDOW),
            last_month_change: filled.net_worth_change.last().copied().flatten(),
            best_month: extreme_change(&filled, true),
            worst_month: extreme_change(&filled, false),
            ytd_savings: ytd_savings(&filled, as_of.year()),
            average_monthly_save: average_monthly_save(&filled),
            max_value: max.map(|(_, v)| v),
            max_date: max.map(|(idx, _)| filled.dates[idx]),
        })
    }

    //prints metrics in a formatted table
    pub fn pretty_print_table(&self) {
        self.to_table().printstd();
    }

    pub fn to_table(&self) -> Table {
        let mut table = Table::new();

        table.add_row(Row::new(vec![Cell::new("Metric"), Cell::new("Value")]));

        let rows = [
            ("12-Month Avg Net Worth", money(self.avg_12m)),
            ("Last Month Change", money(self.last_month_change)),
            ("Best Month", dated(self.best_month, "%Y-%m")),
            ("Worst Month", dated(self.worst_month, "%Y-%m")),
            ("YTD Savings", money(self.ytd_savings)),
            ("Avg Monthly Savings", money(self.average_monthly_save)),
            (
                "Highest Net Worth",
                dated(self.max_value.zip(self.max_date), "%Y-%m-%d"),
            ),
        ];

        for (label, value) in rows {
            table.add_row(Row::new(vec![Cell::new(label), Cell::new(&value)]));
        }

        table
    }
}

//convenience wrapper mirroring the dashboard's statistics call
pub fn compute_statistics(ledger: &MergedLedger, as_of: NaiveDate) -> Result<DashboardStats> {
    DashboardStats::from_ledger(ledger, as_of)
}

fn money(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("€{:.2}", v),
        None => "n/a".to_string(),
    }
}

fn dated(value: Option<DatedValue>, fmt: &str) -> String {
    match value {
        Some((v, date)) => format!("€{:.2} ({})", v, date.format(fmt)),
        None => "n/a".to_string(),
    }
}

//best or worst net-worth change, first occurrence on ties
fn extreme_change(filled: &FilledLedger<'_>, best: bool) -> Option<DatedValue> {
    first_extreme(&filled.net_worth_change, best).map(|(idx, v)| (v, filled.dates[idx]))
}

//latest minus first known net worth inside the given calendar year
fn ytd_savings(filled: &FilledLedger<'_>, year: i32) -> Option<f64> {
    let mut in_year = filled
        .dates
        .iter()
        .zip(&filled.net_worth)
        .filter(|(date, _)| date.year() == year)
        .filter_map(|(_, value)| *value);

    let first = in_year.next()?;
    let latest = in_year.last().unwrap_or(first);
    Some(latest - first)
}

//mean month-over-month difference of month-end net worth
fn average_monthly_save(filled: &FilledLedger<'_>) -> Option<f64> {
    let monthly = monthly_last(filled.dates, &filled.net_worth);

    let savings: Vec<f64> = monthly
        .windows(2)
        .filter_map(|pair| match (pair[0].1, pair[1].1) {
            (Some(prev), Some(curr)) => Some(curr - prev),
            _ => None,
        })
        .collect();

    if savings.is_empty() {
        return None;
    }

    Some(savings.mean())
}
