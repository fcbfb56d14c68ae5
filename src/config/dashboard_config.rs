use crate::forecast::{ForecastConfig, ProjectMethod, BUILTIN_ENGINE};
use crate::goal::savings_goal::DEFAULT_TARGET_AMOUNT;
use crate::goal::{default_target_date, ExpectedPath, SavingsGoal};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

//forecast section settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ForecastSettings {
    pub engine: String,
    pub months_ahead: usize,
    pub regressor_project_method: ProjectMethod,
    pub model: ForecastConfig,
}

impl Default for ForecastSettings {
    fn default() -> Self {
        ForecastSettings {
            engine: BUILTIN_ENGINE.to_string(),
            months_ahead: 9,
            regressor_project_method: ProjectMethod::Linear,
            model: ForecastConfig {
                n_changepoints: 20,
                changepoint_prior_scale: 0.5,
                ..ForecastConfig::default()
            },
        }
    }
}

//savings goal settings; the target date is derived from today when absent
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GoalSettings {
    pub target_amount: f64,
    pub target_date: Option<NaiveDate>,
}

impl Default for GoalSettings {
    fn default() -> Self {
        GoalSettings {
            target_amount: DEFAULT_TARGET_AMOUNT,
            target_date: None,
        }
    }
}

impl GoalSettings {
    pub fn to_goal(&self, today: NaiveDate) -> SavingsGoal {
        SavingsGoal::new(
            self.target_amount,
            self.target_date
                .unwrap_or_else(|| default_target_date(today)),
        )
    }
}

//complete dashboard configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DashboardConfiguration {
    //workbook directory, one csv sheet per account
    pub data_dir: PathBuf,

    pub forecast: ForecastSettings,
    pub goal: GoalSettings,
    pub expected: ExpectedPath,
}

impl Default for DashboardConfiguration {
    fn default() -> Self {
        DashboardConfiguration {
            data_dir: PathBuf::from("data"),
            forecast: ForecastSettings::default(),
            goal: GoalSettings::default(),
            expected: ExpectedPath::default(),
        }
    }
}

impl DashboardConfiguration {
    //load configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> crate::error::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: DashboardConfiguration = serde_json::from_str(&contents)?;
        config.forecast.model.validate()?;
        Ok(config)
    }

    //save configuration to a JSON file
    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> crate::error::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
