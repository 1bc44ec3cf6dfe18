use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Unknown provider '{0}'")]
    UnknownProvider(String),

    #[error("Invalid sign-in state")]
    InvalidState,

    #[error("Provider returned an error: {0}")]
    ProviderDenied(String),

    #[error("Provider request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::UnknownProvider(_) => StatusCode::NOT_FOUND,
            AppError::InvalidState | AppError::ProviderDenied(_) => StatusCode::BAD_REQUEST,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Config(_) | AppError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, self.to_string()).into_response()
    }
}
