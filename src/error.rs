use thiserror::Error;

//errors surfaced by the dashboard core
#[derive(Error, Debug)]
pub enum DashboardError {
    //required column missing or a value could not be parsed; blocks rendering
    #[error("Data format error: {0}")]
    DataFormat(String),

    //an optional engine is not available in this build; only the dependent section is disabled
    #[error("Dependency unavailable: {0}")]
    DependencyUnavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DashboardError {
    pub fn data_format(msg: impl Into<String>) -> Self {
        DashboardError::DataFormat(msg.into())
    }

    //true when the caller should disable a section rather than abort
    pub fn is_dependency_unavailable(&self) -> bool {
        matches!(self, DashboardError::DependencyUnavailable(_))
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
