use crate::error::{DashboardError, Result};
use crate::forecast::linalg::ridge_least_squares;
use crate::forecast::{FittedModel, ForecastConfig, ForecastPoint, Forecaster, TrainingPoint};
use crate::ledger::series::{add_months, month_start};
use chrono::{Datelike, NaiveDate};
use statrs::distribution::{ContinuousCDF, Normal};
use std::f64::consts::PI;
use tracing::debug;

//share of the history in which changepoints may be placed
const CHANGEPOINT_RANGE: f64 = 0.8;
const YEARLY_FOURIER_ORDER: usize = 3;
const YEARLY_PERIOD_DAYS: f64 = 365.25;
const SEASONALITY_PRIOR_SCALE: f64 = 10.0;
//keeps the unpenalised intercept and slope well conditioned
const BASE_PENALTY: f64 = 1e-10;
const MIN_VARIANCE: f64 = 1e-8;

//piecewise-linear trend engine with regularised changepoints and optional yearly seasonality
#[derive(Debug, Clone, Default)]
pub struct TrendForecaster;

impl TrendForecaster {
    pub fn new() -> Self {
        TrendForecaster
    }
}

//evenly spaced changepoint positions (in scaled time) over the first part of the history
fn changepoint_locations(t: &[f64], n_changepoints: usize) -> Vec<f64> {
    let hist_size = (t.len() as f64 * CHANGEPOINT_RANGE).floor() as usize;
    let count = n_changepoints.min(hist_size.saturating_sub(1));
    if count == 0 {
        return Vec::new();
    }

    let last = (hist_size - 1) as f64;
    let mut locations: Vec<f64> = (1..=count)
        .map(|i| {
            let idx = (last * i as f64 / count as f64).round() as usize;
            t[idx]
        })
        .collect();
    locations.dedup();
    locations
}

impl Forecaster for TrendForecaster {
    fn name(&self) -> &str {
        super::BUILTIN_ENGINE
    }

    fn fit(
        &self,
        history: &[TrainingPoint],
        config: &ForecastConfig,
    ) -> Result<Box<dyn FittedModel>> {
        config.validate()?;

        if history.len() < 2 {
            return Err(DashboardError::data_format(
                "forecasting needs at least two monthly observations",
            ));
        }
        if history.windows(2).any(|w| w[1].ds <= w[0].ds) {
            return Err(DashboardError::data_format(
                "forecast history dates must be strictly increasing",
            ));
        }

        let start = history[0].ds;
        let span_days = (history[history.len() - 1].ds - start).num_days() as f64;
        let y_scale = history
            .iter()
            .map(|p| p.y.abs())
            .fold(0.0, f64::max)
            .max(f64::MIN_POSITIVE);

        let mut model = TrendModel {
            start,
            span_days,
            y_scale,
            changepoints: Vec::new(),
            yearly: config.yearly_seasonality,
            beta: Vec::new(),
            sigma2: 0.0,
            future_rate: 0.0,
            mean_abs_delta: 0.0,
            z: 0.0,
            history_dates: history.iter().map(|p| p.ds).collect(),
        };

        let t: Vec<f64> = history.iter().map(|p| model.scaled_time(p.ds)).collect();
        let y: Vec<f64> = history.iter().map(|p| p.y / y_scale).collect();

        //plain line first; its residual variance calibrates the priors
        let line_design: Vec<Vec<f64>> = t.iter().map(|&ti| vec![1.0, ti]).collect();
        let line = ridge_least_squares(&line_design, &y, &[BASE_PENALTY, BASE_PENALTY])
            .ok_or_else(|| DashboardError::data_format("trend line could not be fitted"))?;
        let line_var = residual_variance(&line_design, &y, &line).max(MIN_VARIANCE);

        model.changepoints = changepoint_locations(&t, config.n_changepoints);

        let design: Vec<Vec<f64>> = history.iter().map(|p| model.features(p.ds)).collect();
        let mut penalty = vec![BASE_PENALTY, BASE_PENALTY];
        let tau = config.changepoint_prior_scale;
        penalty.extend(std::iter::repeat(line_var / (tau * tau)).take(model.changepoints.len()));
        if model.yearly {
            let lambda = line_var / (SEASONALITY_PRIOR_SCALE * SEASONALITY_PRIOR_SCALE);
            penalty.extend(std::iter::repeat(lambda).take(2 * YEARLY_FOURIER_ORDER));
        }

        model.beta = ridge_least_squares(&design, &y, &penalty)
            .ok_or_else(|| DashboardError::data_format("trend model could not be fitted"))?;
        model.sigma2 = residual_variance(&design, &y, &model.beta);

        let deltas = &model.beta[2..2 + model.changepoints.len()];
        if !deltas.is_empty() {
            let total: f64 = deltas.iter().map(|d| d.abs()).sum();
            model.mean_abs_delta = total / deltas.len() as f64;
            //changepoints per unit of scaled time, as observed in the history
            model.future_rate = deltas.len() as f64 / CHANGEPOINT_RANGE;
        }

        let normal = Normal::new(0.0, 1.0)
            .map_err(|e| DashboardError::data_format(format!("normal distribution: {}", e)))?;
        model.z = normal.inverse_cdf((1.0 + config.interval_width) / 2.0);

        debug!(
            points = history.len(),
            changepoints = model.changepoints.len(),
            sigma = model.sigma2.sqrt() * y_scale,
            "fitted trend model"
        );

        Ok(Box::new(model))
    }
}

fn residual_variance(design: &[Vec<f64>], y: &[f64], beta: &[f64]) -> f64 {
    let sse: f64 = design
        .iter()
        .zip(y)
        .map(|(row, &yi)| {
            let fitted: f64 = row.iter().zip(beta).map(|(x, b)| x * b).sum();
            (yi - fitted).powi(2)
        })
        .sum();
    let dof = y.len().saturating_sub(2).max(1);
    sse / dof as f64
}

//fitted piecewise-linear model; all coefficients are in scaled units
#[derive(Debug, Clone)]
pub struct TrendModel {
    start: NaiveDate,
    span_days: f64,
    y_scale: f64,
    changepoints: Vec<f64>,
    yearly: bool,
    beta: Vec<f64>,
    sigma2: f64,
    future_rate: f64,
    mean_abs_delta: f64,
    z: f64,
    history_dates: Vec<NaiveDate>,
}

impl TrendModel {
    fn scaled_time(&self, date: NaiveDate) -> f64 {
        (date - self.start).num_days() as f64 / self.span_days
    }

    fn features(&self, date: NaiveDate) -> Vec<f64> {
        let t = self.scaled_time(date);
        let mut row = vec![1.0, t];
        row.extend(self.changepoints.iter().map(|&s| (t - s).max(0.0)));

        if self.yearly {
            let x = date.num_days_from_ce() as f64 / YEARLY_PERIOD_DAYS;
            for k in 1..=YEARLY_FOURIER_ORDER {
                let angle = 2.0 * PI * k as f64 * x;
                row.push(angle.sin());
                row.push(angle.cos());
            }
        }
        row
    }

    //variance of simulated future slope changes at scaled horizon h past the history
    fn trend_variance(&self, t: f64) -> f64 {
        let h = t - 1.0;
        if h <= 0.0 {
            return 0.0;
        }
        //laplace deltas with scale mean_abs_delta have variance 2 * scale^2
        self.future_rate * 2.0 * self.mean_abs_delta.powi(2) * h.powi(3) / 3.0
    }
}

impl FittedModel for TrendModel {
    fn make_future_dates(&self, periods: usize) -> Vec<NaiveDate> {
        let mut dates = self.history_dates.clone();
        if let Some(&last) = self.history_dates.last() {
            let anchor = month_start(last);
            dates.extend((1..=periods).map(|i| add_months(anchor, i as u32)));
        }
        dates
    }

    fn predict(&self, dates: &[NaiveDate]) -> Vec<ForecastPoint> {
        dates
            .iter()
            .map(|&ds| {
                let row = self.features(ds);
                let yhat: f64 = row.iter().zip(&self.beta).map(|(x, b)| x * b).sum();
                let sd = (self.sigma2 + self.trend_variance(self.scaled_time(ds))).sqrt();

                ForecastPoint {
                    ds,
                    yhat: yhat * self.y_scale,
                    yhat_lower: (yhat - self.z * sd) * self.y_scale,
                    yhat_upper: (yhat + self.z * sd) * self.y_scale,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monthly(values: &[f64]) -> Vec<TrainingPoint> {
        let start = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, &y)| TrainingPoint {
                ds: add_months(start, i as u32),
                y,
            })
            .collect()
    }

    #[test]
    fn test_linear_history_continues_trend() {
        let values: Vec<f64> = (0..24).map(|i| 1000.0 + 100.0 * i as f64).collect();
        let model = TrendForecaster::new()
            .fit(&monthly(&values), &ForecastConfig::default())
            .unwrap();

        let dates = model.make_future_dates(3);
        assert_eq!(dates.len(), 27);
        assert_eq!(dates[24], NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());

        let forecast = model.predict(&dates);
        for (i, point) in forecast.iter().enumerate().skip(24) {
            let expected = 1000.0 + 100.0 * i as f64;
            assert!((point.yhat - expected).abs() < 50.0);
            assert!(point.yhat_lower <= point.yhat && point.yhat <= point.yhat_upper);
        }
    }

    #[test]
    fn test_intervals_widen_past_history() {
        let values: Vec<f64> = (0..30)
            .map(|i| 500.0 + 40.0 * i as f64 + if i % 3 == 0 { 60.0 } else { -30.0 })
            .collect();
        let model = TrendForecaster::new()
            .fit(&monthly(&values), &ForecastConfig::default())
            .unwrap();

        let forecast = model.predict(&model.make_future_dates(12));
        let width = |p: &ForecastPoint| p.yhat_upper - p.yhat_lower;
        assert!(width(&forecast[41]) >= width(&forecast[30]));
        assert!(width(&forecast[29]) > 0.0);
    }

    #[test]
    fn test_yearly_seasonality_fits() {
        let values: Vec<f64> = (0..36)
            .map(|i| 2000.0 + 50.0 * i as f64 + 300.0 * (2.0 * PI * i as f64 / 12.0).sin())
            .collect();
        let config = ForecastConfig {
            yearly_seasonality: true,
            ..ForecastConfig::default()
        };
        let model = TrendForecaster::new()
            .fit(&monthly(&values), &config)
            .unwrap();
        let forecast = model.predict(&model.make_future_dates(0));

        let max_err = forecast
            .iter()
            .zip(&values)
            .map(|(p, v)| (p.yhat - v).abs())
            .fold(0.0, f64::max);
        assert!(max_err < 150.0, "max error {}", max_err);
    }

    #[test]
    fn test_requires_two_points() {
        let err = TrendForecaster::new()
            .fit(&monthly(&[10.0]), &ForecastConfig::default())
            .unwrap_err();
        assert!(matches!(err, DashboardError::DataFormat(_)));
    }

    #[test]
    fn test_changepoints_limited_by_history() {
        let t: Vec<f64> = (0..10).map(|i| i as f64 / 9.0).collect();
        assert_eq!(changepoint_locations(&t, 50).len(), 7);
        assert!(changepoint_locations(&t[..2], 50).is_empty());
    }
}
