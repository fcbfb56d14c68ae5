use crate::error::{DashboardError, Result};
use crate::ledger::series::{month_starts_through, months_between};
use crate::ledger::MergedLedger;
use crate::metrics::SeriesPoint;
use chrono::NaiveDate;
use prettytable::{Cell, Row, Table};
use serde::{Deserialize, Serialize};

pub const DEFAULT_EXPECTED_TARGET: f64 = 50_000.0;

pub fn default_expected_target_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 12, 31).unwrap_or(NaiveDate::MAX)
}

//a fixed goal tracked as a straight line from the first observation to the target
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ExpectedPath {
    pub target_amount: f64,
    pub target_date: NaiveDate,
}

impl Default for ExpectedPath {
    fn default() -> Self {
        ExpectedPath {
            target_amount: DEFAULT_EXPECTED_TARGET,
            target_date: default_expected_target_date(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProgressReport {
    pub start_date: NaiveDate,
    pub start_value: f64,
    pub monthly_increase: f64,
    pub expected_path: Vec<SeriesPoint>,
    pub expected_today: f64,
    pub actual_today: f64,
    pub gap: f64,
    pub time_progress_pct: f64,
    pub target_progress_pct: f64,
}

impl ExpectedPath {
    pub fn new(target_amount: f64, target_date: NaiveDate) -> Self {
        ExpectedPath {
            target_amount,
            target_date,
        }
    }

    //compares actual net worth with where the linear path says it should be today
    pub fn evaluate(&self, ledger: &MergedLedger, today: NaiveDate) -> Result<ProgressReport> {
        let start_date = *ledger
            .dates
            .first()
            .ok_or_else(|| DashboardError::data_format("ledger is empty"))?;

        let filled = ledger.forward_filled();
        let no_net_worth = || DashboardError::data_format("no net worth observations to track");
        let start_value = filled
            .net_worth
            .iter()
            .find_map(|v| *v)
            .ok_or_else(no_net_worth)?;
        let actual_today = filled.current_net_worth().ok_or_else(no_net_worth)?;

        let total_months = months_between(start_date, self.target_date).max(1);
        let monthly_increase = (self.target_amount - start_value) / total_months as f64;

        let expected_path: Vec<SeriesPoint> = month_starts_through(start_date, self.target_date)
            .into_iter()
            .enumerate()
            .map(|(i, date)| SeriesPoint::new(date, start_value + monthly_increase * i as f64))
            .collect();

        //value on the path whose date is closest to today (first on ties)
        let expected_today = expected_path
            .iter()
            .min_by_key(|p| (p.date - today).num_days().abs())
            .map(|p| p.value)
            .unwrap_or(start_value);

        let total_days = (self.target_date - start_date).num_days();
        let days_passed = (today - start_date).num_days();
        let time_progress_pct = if total_days > 0 {
            (days_passed as f64 / total_days as f64 * 100.0).clamp(0.0, 100.0)
        } else {
            100.0
        };

        let target_progress_pct = if self.target_amount != 0.0 {
            (actual_today / self.target_amount * 100.0).min(100.0)
        } else {
            100.0
        };

        Ok(ProgressReport {
            start_date,
            start_value,
            monthly_increase,
            expected_path,
            expected_today,
            actual_today,
            gap: actual_today - expected_today,
            time_progress_pct,
            target_progress_pct,
        })
    }
}

impl ProgressReport {
    pub fn to_table(&self) -> Table {
        let mut table = Table::new();
        table.add_row(Row::new(vec![Cell::new("Metric"), Cell::new("Value")]));

        let arrow = if self.gap > 0.0 {
            "▲"
        } else if self.gap < 0.0 {
            "▼"
        } else {
            "—"
        };

        let rows = [
            ("Expected Today", format!("€{:.2}", self.expected_today)),
            ("Actual Today", format!("€{:.2}", self.actual_today)),
            ("Gap To Date", format!("{} €{:.2}", arrow, self.gap)),
            (
                "Progress Toward Target",
                format!("{:.1}%", self.target_progress_pct),
            ),
            ("Time Passed", format!("{:.1}%", self.time_progress_pct)),
        ];
        for (label, value) in rows {
            table.add_row(Row::new(vec![Cell::new(label), Cell::new(&value)]));
        }

        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::AccountSeries;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_expected_path_and_gap() {
        let a = AccountSeries::from_pairs(
            "A",
            &[
                (d(2024, 1, 1), Some(10_000.0)),
                (d(2024, 4, 1), Some(13_500.0)),
            ],
        );
        let ledger = MergedLedger::merge(&[a]).unwrap();
        let path = ExpectedPath::new(22_000.0, d(2024, 12, 31));

        let report = path.evaluate(&ledger, d(2024, 4, 3)).unwrap();

        assert_eq!(report.start_value, 10_000.0);
        assert_eq!(report.monthly_increase, 12_000.0 / 11.0);
        assert_eq!(report.expected_path.len(), 12);
        assert_eq!(report.expected_path[3].date, d(2024, 4, 1));
        assert!((report.expected_today - (10_000.0 + 3.0 * 12_000.0 / 11.0)).abs() < 1e-9);
        assert_eq!(report.actual_today, 13_500.0);
        assert!(report.gap > 0.0);
        assert!(report.time_progress_pct > 24.0 && report.time_progress_pct < 26.0);
        assert!((report.target_progress_pct - 13_500.0 / 220.0).abs() < 1e-9);
    }

    #[test]
    fn test_progress_clamped() {
        let a = AccountSeries::from_pairs("A", &[(d(2024, 1, 1), Some(90_000.0))]);
        let ledger = MergedLedger::merge(&[a]).unwrap();
        let report = ExpectedPath::new(50_000.0, d(2024, 12, 31))
            .evaluate(&ledger, d(2030, 1, 1))
            .unwrap();

        assert_eq!(report.target_progress_pct, 100.0);
        assert_eq!(report.time_progress_pct, 100.0);
        assert!((report.expected_today - 50_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_missing_net_worth_is_data_format_error() {
        let a = AccountSeries::from_pairs("A", &[(d(2024, 1, 1), None)]);
        let ledger = MergedLedger::merge(&[a]).unwrap();
        let err = ExpectedPath::default()
            .evaluate(&ledger, d(2024, 6, 1))
            .unwrap_err();
        assert!(matches!(err, DashboardError::DataFormat(_)));
    }
}
