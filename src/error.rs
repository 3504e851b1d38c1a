#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("upload needs a header row and at least one data row")]
    EmptyUpload,

    #[error("no row has a week label and a positive install count")]
    NoValidRows,

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("target for {metric} must be positive, got {value}")]
    InvalidTarget { metric: &'static str, value: f64 },

    #[error("bid increase must be 5 to 100 in steps of 5, got {0}")]
    InvalidBidIncrease(f64),

    #[error("unknown campaign: {0}")]
    UnknownCampaign(String),

    #[error("unknown metric: {0}")]
    UnknownMetric(String),
}

pub type Result<T> = std::result::Result<T, SimError>;
