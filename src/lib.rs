//a Rust-based personal net worth dashboard core

pub mod config;
pub mod dashboard;
pub mod data;
pub mod error;
pub mod forecast;
pub mod goal;
pub mod ledger;
pub mod metrics;

//prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{DashboardConfiguration, ForecastSettings, GoalSettings};
    pub use crate::dashboard::{build_dashboard, forecast_section, DashboardReport, ForecastSection};
    pub use crate::data::{
        load_sheet, load_workbook, read_workbook, AccountSeries, BalanceRecord, LedgerCache,
    };
    pub use crate::error::{DashboardError, Result};
    pub use crate::forecast::{
        build_monthly_forecast, forecaster_for, project_regressor_series, FittedModel,
        ForecastConfig, ForecastPoint, Forecaster, MonthlyForecast, ProjectMethod, TrendForecaster,
    };
    pub use crate::goal::{ExpectedPath, GoalPlan, ProgressReport, SavingsGoal};
    pub use crate::ledger::{write_ledger_csv, AccountColumn, ChangeLedger, MergedLedger};
    pub use crate::metrics::{
        account_saving_rates, compute_statistics, cumulative_savings, net_worth_trend,
        saving_rates_table, DashboardStats, SeriesPoint,
    };
}
