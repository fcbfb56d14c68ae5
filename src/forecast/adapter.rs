use crate::error::{DashboardError, Result};
use crate::forecast::{FittedModel, ForecastConfig, ForecastPoint, Forecaster, TrainingPoint};
use crate::ledger::series::{forward_fill, monthly_last};
use crate::ledger::MergedLedger;
use chrono::NaiveDate;
use tracing::info;

//the fitted model, its date scaffold and the predictions over it
#[derive(Debug)]
pub struct MonthlyForecast {
    pub model: Box<dyn FittedModel>,
    pub history: Vec<TrainingPoint>,
    pub future: Vec<NaiveDate>,
    pub forecast: Vec<ForecastPoint>,
    //last actual net worth minus the fitted value on the same month
    pub anchor_bias: Option<f64>,
}

impl MonthlyForecast {
    //predictions for the months after the training history
    pub fn future_only(&self) -> &[ForecastPoint] {
        let skip = self.history.len().min(self.forecast.len());
        &self.forecast[skip..]
    }
}

//one row per calendar month (labelled at month start) holding the latest known net worth,
//gaps forward-filled and leading empty months dropped.
//each month keeps its own last reading; this is not a reindex at the 1st, which would carry
//mid-month readings into the following month and lose the final month
pub fn monthly_history(ledger: &MergedLedger) -> Vec<TrainingPoint> {
    let monthly = monthly_last(&ledger.dates, &ledger.net_worth);
    let values: Vec<Option<f64>> = monthly.iter().map(|(_, v)| *v).collect();

    monthly
        .iter()
        .zip(forward_fill(&values))
        .filter_map(|((ds, _), y)| y.map(|y| TrainingPoint { ds: *ds, y }))
        .collect()
}

//fits the engine on monthly net worth and predicts `months_ahead` month starts past the history
pub fn build_monthly_forecast(
    ledger: &MergedLedger,
    months_ahead: usize,
    config: &ForecastConfig,
    forecaster: &dyn Forecaster,
) -> Result<MonthlyForecast> {
    let history = monthly_history(ledger);
    if history.len() < 2 {
        return Err(DashboardError::data_format(format!(
            "forecast needs at least two months of net worth, found {}",
            history.len()
        )));
    }

    let model = forecaster.fit(&history, config)?;
    let future = model.make_future_dates(months_ahead);
    let forecast = model.predict(&future);

    let anchor_bias = history.last().and_then(|last| {
        forecast
            .iter()
            .find(|p| p.ds == last.ds)
            .map(|p| last.y - p.yhat)
    });

    info!(
        engine = forecaster.name(),
        history = history.len(),
        months_ahead,
        "built monthly forecast"
    );

    Ok(MonthlyForecast {
        model,
        history,
        future,
        forecast,
        anchor_bias,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::AccountSeries;
    use crate::forecast::TrendForecaster;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_monthly_history_resamples_to_month_start() {
        let a = AccountSeries::from_pairs(
            "A",
            &[
                (d(2024, 1, 10), None),
                (d(2024, 2, 10), Some(100.0)),
                (d(2024, 2, 25), Some(120.0)),
                (d(2024, 4, 3), Some(160.0)),
            ],
        );
        let ledger = MergedLedger::merge(&[a]).unwrap();

        let history = monthly_history(&ledger);
        let rows: Vec<(NaiveDate, f64)> = history.iter().map(|p| (p.ds, p.y)).collect();
        assert_eq!(
            rows,
            vec![
                (d(2024, 2, 1), 120.0),
                (d(2024, 3, 1), 120.0),
                (d(2024, 4, 1), 160.0),
            ]
        );
    }

    #[test]
    fn test_forecast_scaffold_and_future_rows() {
        let pairs: Vec<(NaiveDate, Option<f64>)> = (0..12)
            .map(|i| {
                (
                    crate::ledger::series::add_months(d(2023, 1, 1), i),
                    Some(100.0 * i as f64),
                )
            })
            .collect();
        let ledger = MergedLedger::merge(&[AccountSeries::from_pairs("A", &pairs)]).unwrap();

        let result = build_monthly_forecast(
            &ledger,
            9,
            &ForecastConfig::default(),
            &TrendForecaster::new(),
        )
        .unwrap();

        assert_eq!(result.future.len(), 21);
        assert_eq!(result.forecast.len(), 21);
        assert_eq!(result.future_only().len(), 9);
        assert_eq!(result.future_only()[0].ds, d(2024, 1, 1));
        assert!(result.anchor_bias.unwrap().abs() < 50.0);
    }

    #[test]
    fn test_zero_horizon_predicts_history_only() {
        let pairs = [(d(2024, 1, 1), Some(1.0)), (d(2024, 2, 1), Some(2.0))];
        let ledger = MergedLedger::merge(&[AccountSeries::from_pairs("A", &pairs)]).unwrap();

        let result = build_monthly_forecast(
            &ledger,
            0,
            &ForecastConfig::default(),
            &TrendForecaster::new(),
        )
        .unwrap();
        assert_eq!(result.future, vec![d(2024, 1, 1), d(2024, 2, 1)]);
        assert!(result.future_only().is_empty());
    }

    #[test]
    fn test_single_month_is_data_format_error() {
        let pairs = [(d(2024, 1, 1), Some(1.0)), (d(2024, 1, 20), Some(2.0))];
        let ledger = MergedLedger::merge(&[AccountSeries::from_pairs("A", &pairs)]).unwrap();

        let err = build_monthly_forecast(
            &ledger,
            3,
            &ForecastConfig::default(),
            &TrendForecaster::new(),
        )
        .unwrap_err();
        assert!(matches!(err, DashboardError::DataFormat(_)));
    }
}
