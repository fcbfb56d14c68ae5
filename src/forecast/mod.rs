pub mod adapter;
pub mod linalg;
pub mod regressor;
pub mod trend;

pub use adapter::{build_monthly_forecast, monthly_history, MonthlyForecast};
pub use regressor::{project_regressor_series, ProjectMethod};
pub use trend::TrendForecaster;

use crate::error::{DashboardError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

//trend growth model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Growth {
    #[default]
    Linear,
}

//model hyperparameters passed through to the forecasting engine
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ForecastConfig {
    pub growth: Growth,
    pub yearly_seasonality: bool,
    pub weekly_seasonality: bool,
    pub daily_seasonality: bool,
    pub n_changepoints: usize,
    pub changepoint_prior_scale: f64,
    pub interval_width: f64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        ForecastConfig {
            growth: Growth::Linear,
            yearly_seasonality: false,
            weekly_seasonality: false,
            daily_seasonality: false,
            n_changepoints: 50,
            changepoint_prior_scale: 0.05,
            interval_width: 0.95,
        }
    }
}

impl ForecastConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.interval_width > 0.0 && self.interval_width < 1.0) {
            return Err(DashboardError::data_format(format!(
                "interval_width must be in (0, 1), got {}",
                self.interval_width
            )));
        }
        if !(self.changepoint_prior_scale > 0.0 && self.changepoint_prior_scale.is_finite()) {
            return Err(DashboardError::data_format(format!(
                "changepoint_prior_scale must be positive, got {}",
                self.changepoint_prior_scale
            )));
        }
        Ok(())
    }
}

//one training row: month start and net worth
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TrainingPoint {
    pub ds: NaiveDate,
    pub y: f64,
}

//point estimate and interval bounds for one date
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ForecastPoint {
    pub ds: NaiveDate,
    pub yhat: f64,
    pub yhat_lower: f64,
    pub yhat_upper: f64,
}

//a forecasting engine able to fit a model to a monthly series
pub trait Forecaster {
    //returns the engine name
    fn name(&self) -> &str;

    //fits a model to the training rows
    fn fit(
        &self,
        history: &[TrainingPoint],
        config: &ForecastConfig,
    ) -> Result<Box<dyn FittedModel>>;
}

//a fitted model handle
pub trait FittedModel: fmt::Debug {
    //history dates followed by `periods` further month starts
    fn make_future_dates(&self, periods: usize) -> Vec<NaiveDate>;

    //predictions for arbitrary dates
    fn predict(&self, dates: &[NaiveDate]) -> Vec<ForecastPoint>;
}

pub const BUILTIN_ENGINE: &str = "trend";

//engines that exist elsewhere but are not part of this build
const EXTERNAL_ENGINES: [&str; 1] = ["prophet"];

//resolves a forecasting engine by name; absent engines are reported up front
pub fn forecaster_for(engine: &str) -> Result<Box<dyn Forecaster>> {
    let name = engine.trim().to_lowercase();

    if name == BUILTIN_ENGINE {
        return Ok(Box::new(TrendForecaster::new()));
    }

    if EXTERNAL_ENGINES.contains(&name.as_str()) {
        return Err(DashboardError::DependencyUnavailable(format!(
            "forecasting engine '{}' is not available in this build; use '{}'",
            name, BUILTIN_ENGINE
        )));
    }

    Err(DashboardError::DependencyUnavailable(format!(
        "unknown forecasting engine '{}'",
        engine
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_engine_resolves() {
        let engine = forecaster_for("Trend").unwrap();
        assert_eq!(engine.name(), BUILTIN_ENGINE);
    }

    #[test]
    fn test_missing_engine_is_dependency_unavailable() {
        let err = forecaster_for("prophet").err().unwrap();
        assert!(err.is_dependency_unavailable());

        let err = forecaster_for("arima").err().unwrap();
        assert!(err.is_dependency_unavailable());
    }

    #[test]
    fn test_config_validation() {
        assert!(ForecastConfig::default().validate().is_ok());

        let bad = ForecastConfig {
            interval_width: 1.0,
            ..ForecastConfig::default()
        };
        assert!(matches!(bad.validate(), Err(DashboardError::DataFormat(_))));
    }
}
