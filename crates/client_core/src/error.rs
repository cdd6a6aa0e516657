use shared::error::ApiError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("scene controller has stopped")]
    ControllerStopped,
    #[error("scene loop task failed: {0}")]
    TaskFailed(String),
}

#[derive(Debug, Error)]
pub enum WebhookClientError {
    #[error("invalid webhook url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("webhook transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("webhook rejected request with status {status}")]
    Rejected {
        status: u16,
        error: Option<ApiError>,
    },
}
