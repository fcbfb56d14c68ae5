use crate::error::{DashboardError, Result};
use crate::ledger::series::{month_starts, months_between};
use crate::ledger::MergedLedger;
use crate::metrics::SeriesPoint;
use chrono::{Datelike, NaiveDate};
use prettytable::{Cell, Row, Table};
use serde::{Deserialize, Serialize};

pub const DEFAULT_TARGET_AMOUNT: f64 = 45_000.0;
pub const SCENARIO_FACTORS: [f64; 3] = [0.6, 1.0, 1.2];

//a target net worth to reach by a date
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SavingsGoal {
    pub target_amount: f64,
    pub target_date: NaiveDate,
}

//december 31 of this year, or of next year once the year is half over
pub fn default_target_date(today: NaiveDate) -> NaiveDate {
    let year = if today.month() < 6 {
        today.year()
    } else {
        today.year() + 1
    };
    NaiveDate::from_ymd_opt(year, 12, 31).unwrap_or(today)
}

//a savings pace expressed as a share of the required monthly amount
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GoalScenario {
    pub factor: f64,
    pub monthly: f64,
    pub path: Vec<SeriesPoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GoalPlan {
    pub current_net_worth: f64,
    pub projection_start: NaiveDate,
    pub months_remaining: u32,
    pub remaining: f64,
    pub required_monthly: f64,
    pub scenarios: Vec<GoalScenario>,
    //share of the target already reached, within [0, 1]
    pub progress: f64,
}

impl SavingsGoal {
    pub fn new(target_amount: f64, target_date: NaiveDate) -> Self {
        SavingsGoal {
            target_amount,
            target_date,
        }
    }

    pub fn with_default_date(target_amount: f64, today: NaiveDate) -> Self {
        Self::new(target_amount, default_target_date(today))
    }

    //monthly savings needed to hit the target, with slower and faster scenarios
    pub fn plan(&self, ledger: &MergedLedger) -> Result<GoalPlan> {
        let (projection_start, _) = ledger.last_valid_net_worth().ok_or_else(|| {
            DashboardError::data_format("no net worth observations to plan a goal from")
        })?;
        let current_net_worth = ledger
            .forward_filled()
            .current_net_worth()
            .ok_or_else(|| DashboardError::data_format("current net worth is unknown"))?;

        let months_remaining = months_between(projection_start, self.target_date).max(1) as u32;
        let remaining = (self.target_amount - current_net_worth).max(0.0);
        let required_monthly = if remaining > 0.0 {
            remaining / months_remaining as f64
        } else {
            0.0
        };

        let dates = month_starts(projection_start, months_remaining as usize + 1);
        let scenarios = SCENARIO_FACTORS
            .iter()
            .map(|&factor| {
                let monthly = required_monthly * factor;
                let path = dates
                    .iter()
                    .enumerate()
                    .map(|(i, &date)| {
                        SeriesPoint::new(date, current_net_worth + monthly * i as f64)
                    })
                    .collect();
                GoalScenario {
                    factor,
                    monthly,
                    path,
                }
            })
            .collect();

        let progress = if self.target_amount > 0.0 {
            (current_net_worth / self.target_amount).clamp(0.0, 1.0)
        } else {
            0.0
        };

        Ok(GoalPlan {
            current_net_worth,
            projection_start,
            months_remaining,
            remaining,
            required_monthly,
            scenarios,
            progress,
        })
    }
}

impl GoalPlan {
    pub fn to_table(&self) -> Table {
        let mut table = Table::new();
        table.add_row(Row::new(vec![Cell::new("Scenario"), Cell::new("Per Month")]));

        for scenario in &self.scenarios {
            table.add_row(Row::new(vec![
                Cell::new(&format!("{:.0}%", scenario.factor * 100.0)),
                Cell::new(&format!("€{:.2}", scenario.monthly)),
            ]));
        }

        table.add_row(Row::new(vec![
            Cell::new("Months Remaining"),
            Cell::new(&self.months_remaining.to_string()),
        ]));
        table.add_row(Row::new(vec![
            Cell::new("Goal Progress"),
            Cell::new(&format!("{:.1}%", self.progress * 100.0)),
        ]));

        table
    }
}
