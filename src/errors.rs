use crate::error::SimError;
use crate::ingest::EXPECTED_COLUMNS;
use axum::http::StatusCode;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }
}

impl From<SimError> for AppError {
    fn from(err: SimError) -> Self {
        match err {
            SimError::UnknownCampaign(_) => Self::not_found(err.to_string()),
            SimError::EmptyUpload | SimError::NoValidRows | SimError::Csv(_) => {
                Self::bad_request(format!("Invalid CSV: {err}. {EXPECTED_COLUMNS}"))
            }
            _ => Self::bad_request(err.to_string()),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
