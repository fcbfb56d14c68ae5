pub mod report;

pub use report::{build_dashboard, forecast_section, DashboardReport, ForecastSection};
