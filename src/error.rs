//! Error handling

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::model::PredictError;
use crate::render;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("prediction failed: {0}")]
    Prediction(#[from] PredictError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::Prediction(err) => {
                tracing::error!("Prediction error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "The prediction could not be completed")
            }
        };

        (status, Html(render::error_page(error_message))).into_response()
    }
}
