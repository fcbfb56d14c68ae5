pub mod savings_rate;
pub mod summary;
pub mod timeseries;

pub use savings_rate::{account_saving_rates, saving_rates_table};
pub use summary::{compute_statistics, DashboardStats};
pub use timeseries::{cumulative_savings, net_worth_trend, SeriesPoint};
