use crate::config::{DashboardConfiguration, ForecastSettings};
use crate::error::Result;
use crate::forecast::{build_monthly_forecast, forecaster_for, MonthlyForecast};
use crate::goal::{GoalPlan, ProgressReport, SavingsGoal};
use crate::ledger::MergedLedger;
use crate::metrics::{
    account_saving_rates, compute_statistics, cumulative_savings, net_worth_trend, DashboardStats,
    SeriesPoint,
};
use chrono::NaiveDate;
use indexmap::IndexMap;
use tracing::{info, warn};

//the forecast section is either built or switched off because its engine is missing
#[derive(Debug)]
pub enum ForecastSection {
    Ready(MonthlyForecast),
    Disabled(String),
}

impl ForecastSection {
    pub fn is_disabled(&self) -> bool {
        matches!(self, ForecastSection::Disabled(_))
    }

    pub fn forecast(&self) -> Option<&MonthlyForecast> {
        match self {
            ForecastSection::Ready(forecast) => Some(forecast),
            ForecastSection::Disabled(_) => None,
        }
    }
}

//every section of the dashboard computed from one ledger
#[derive(Debug)]
pub struct DashboardReport {
    pub stats: DashboardStats,
    pub saving_rates: IndexMap<String, Option<f64>>,
    pub cumulative_savings: Vec<SeriesPoint>,
    pub trend: Vec<SeriesPoint>,
    pub progress: ProgressReport,
    pub goal: SavingsGoal,
    pub plan: GoalPlan,
    pub forecast: ForecastSection,
}

//fits the configured engine; an unavailable engine disables the section, other errors abort
pub fn forecast_section(
    ledger: &MergedLedger,
    settings: &ForecastSettings,
) -> Result<ForecastSection> {
    let built = forecaster_for(&settings.engine).and_then(|engine| {
        build_monthly_forecast(
            ledger,
            settings.months_ahead,
            &settings.model,
            engine.as_ref(),
        )
    });

    match built {
        Ok(forecast) => Ok(ForecastSection::Ready(forecast)),
        Err(err) if err.is_dependency_unavailable() => {
            warn!(engine = %settings.engine, reason = %err, "forecast section disabled");
            Ok(ForecastSection::Disabled(err.to_string()))
        }
        Err(err) => Err(err),
    }
}

//computes every dashboard section; data format errors abort the whole report
pub fn build_dashboard(
    ledger: &MergedLedger,
    config: &DashboardConfiguration,
    today: NaiveDate,
) -> Result<DashboardReport> {
    let goal = config.goal.to_goal(today);

    let report = DashboardReport {
        stats: compute_statistics(ledger, today)?,
        saving_rates: account_saving_rates(ledger),
        cumulative_savings: cumulative_savings(ledger, today),
        trend: net_worth_trend(ledger),
        progress: config.expected.evaluate(ledger, today)?,
        plan: goal.plan(ledger)?,
        goal,
        forecast: forecast_section(ledger, &config.forecast)?,
    };

    info!(
        forecast_disabled = report.forecast.is_disabled(),
        "built dashboard"
    );
    Ok(report)
}
