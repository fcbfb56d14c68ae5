use crate::data::AccountSeries;
use crate::error::{DashboardError, Result};
use crate::ledger::series::{forward_fill, gap_aware_diff, sum_present};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

//one column of the ledger, aligned to the ledger's date index
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccountColumn {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

impl AccountColumn {
    pub fn new(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        AccountColumn {
            name: name.into(),
            values,
        }
    }
}

//per-column changes against the previous known value
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChangeLedger {
    pub accounts: Vec<AccountColumn>,
    pub net_worth: Vec<Option<f64>>,
}

impl ChangeLedger {
    pub fn account(&self, name: &str) -> Option<&AccountColumn> {
        self.accounts.iter().find(|c| c.name == name)
    }
}

//all accounts outer-joined on date, with derived net worth and changes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MergedLedger {
    pub dates: Vec<NaiveDate>,
    pub accounts: Vec<AccountColumn>,
    pub net_worth: Vec<Option<f64>>,
    pub changes: ChangeLedger,
}

impl MergedLedger {
    //outer-joins the account series on date and derives net worth and changes
    pub fn merge(series: &[AccountSeries]) -> Result<Self> {
        let mut seen = BTreeSet::new();
        for s in series {
            if !seen.insert(s.name.as_str()) {
                return Err(DashboardError::data_format(format!(
                    "duplicate account '{}'",
                    s.name
                )));
            }
        }

        //sorted, deduplicated union of every account's dates
        let dates: Vec<NaiveDate> = series
            .iter()
            .flat_map(|s| s.records().iter().map(|r| r.date))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let accounts: Vec<AccountColumn> = series
            .iter()
            .map(|s| {
                let values = dates.iter().map(|&date| s.balance_on(date)).collect();
                AccountColumn::new(s.name.clone(), values)
            })
            .collect();

        let net_worth: Vec<Option<f64>> = (0..dates.len())
            .map(|row| sum_present(accounts.iter().map(|c| c.values[row])))
            .collect();

        let changes = ChangeLedger {
            accounts: accounts
                .iter()
                .map(|c| AccountColumn::new(c.name.clone(), gap_aware_diff(&c.values)))
                .collect(),
            net_worth: gap_aware_diff(&net_worth),
        };

        debug!(
            rows = dates.len(),
            accounts = accounts.len(),
            "merged account ledger"
        );

        Ok(MergedLedger {
            dates,
            accounts,
            net_worth,
            changes,
        })
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn account_names(&self) -> Vec<&str> {
        self.accounts.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn account(&self, name: &str) -> Option<&AccountColumn> {
        self.accounts.iter().find(|c| c.name == name)
    }

    //latest date with a known net worth, and that value
    pub fn last_valid_net_worth(&self) -> Option<(NaiveDate, f64)> {
        self.dates
            .iter()
            .zip(&self.net_worth)
            .rev()
            .find_map(|(date, value)| value.map(|v| (*date, v)))
    }

    //(date, net worth) pairs for rows where net worth is known
    pub fn valid_net_worth(&self) -> Vec<(NaiveDate, f64)> {
        self.dates
            .iter()
            .zip(&self.net_worth)
            .filter_map(|(date, value)| value.map(|v| (*date, v)))
            .collect()
    }

    //a copy with every column forward-filled, changes included
    pub fn forward_filled(&self) -> FilledLedger<'_> {
        FilledLedger {
            dates: &self.dates,
            accounts: self
                .accounts
                .iter()
                .map(|c| AccountColumn::new(c.name.clone(), forward_fill(&c.values)))
                .collect(),
            net_worth: forward_fill(&self.net_worth),
            account_changes: self
                .changes
                .accounts
                .iter()
                .map(|c| AccountColumn::new(c.name.clone(), forward_fill(&c.values)))
                .collect(),
            net_worth_change: forward_fill(&self.changes.net_worth),
        }
    }
}

//forward-filled view of a ledger, used for summary statistics
#[derive(Debug, Clone)]
pub struct FilledLedger<'a> {
    pub dates: &'a [NaiveDate],
    pub accounts: Vec<AccountColumn>,
    pub net_worth: Vec<Option<f64>>,
    pub account_changes: Vec<AccountColumn>,
    pub net_worth_change: Vec<Option<f64>>,
}

impl FilledLedger<'_> {
    pub fn account(&self, name: &str) -> Option<&AccountColumn> {
        self.accounts.iter().find(|c| c.name == name)
    }

    pub fn account_change(&self, name: &str) -> Option<&AccountColumn> {
        self.account_changes.iter().find(|c| c.name == name)
    }

    //last forward-filled net worth
    pub fn current_net_worth(&self) -> Option<f64> {
        self.net_worth.last().copied().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn sample() -> MergedLedger {
        let checking = AccountSeries::from_pairs(
            "Checking",
            &[
                (d(2024, 1, 1), Some(100.0)),
                (d(2024, 2, 1), Some(150.0)),
                (d(2024, 3, 1), Some(200.0)),
            ],
        );
        let savings = AccountSeries::from_pairs(
            "Savings",
            &[
                (d(2024, 1, 1), Some(50.0)),
                (d(2024, 2, 1), None),
                (d(2024, 3, 1), Some(150.0)),
            ],
        );
        MergedLedger::merge(&[checking, savings]).unwrap()
    }

    #[test]
    fn test_net_worth_excludes_missing_accounts() {
        let ledger = sample();
        assert_eq!(
            ledger.net_worth,
            vec![Some(150.0), Some(150.0), Some(350.0)]
        );
        assert_eq!(ledger.changes.net_worth, vec![None, Some(0.0), Some(200.0)]);
    }

    #[test]
    fn test_account_change_spans_gap() {
        let ledger = sample();
        let savings = ledger.changes.account("Savings").unwrap();
        assert_eq!(savings.values, vec![None, None, Some(100.0)]);
    }

    #[test]
    fn test_union_of_dates_with_missing_net_worth() {
        let a =
            AccountSeries::from_pairs("A", &[(d(2024, 1, 1), Some(1.0)), (d(2024, 3, 1), None)]);
        let b = AccountSeries::from_pairs(
            "B",
            &[(d(2024, 2, 1), Some(2.0)), (d(2024, 1, 1), Some(3.0))],
        );
        let ledger = MergedLedger::merge(&[a, b]).unwrap();

        assert_eq!(
            ledger.dates,
            vec![d(2024, 1, 1), d(2024, 2, 1), d(2024, 3, 1)]
        );
        assert_eq!(ledger.net_worth, vec![Some(4.0), Some(2.0), None]);
        assert_eq!(ledger.last_valid_net_worth(), Some((d(2024, 2, 1), 2.0)));
    }

    #[test]
    fn test_forward_filled_view() {
        let ledger = sample();
        let filled = ledger.forward_filled();

        assert_eq!(
            filled.account("Savings").unwrap().values,
            vec![Some(50.0), Some(50.0), Some(150.0)]
        );
        assert_eq!(filled.current_net_worth(), Some(350.0));
        assert_eq!(filled.net_worth_change[0], None);
    }

    #[test]
    fn test_duplicate_account_rejected() {
        let a = AccountSeries::from_pairs("A", &[(d(2024, 1, 1), Some(1.0))]);
        let err = MergedLedger::merge(&[a.clone(), a]).unwrap_err();
        assert!(matches!(err, DashboardError::DataFormat(_)));
    }
}
