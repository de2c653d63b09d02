//! Response envelope and error conversion
//!
//! Every response is HTTP 200 with `{success, message, ...payload}`. Domain
//! failures are reported in the body, never through the status code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use emolens_core::Error;
use serde::Serialize;
use serde_json::json;
use tracing::{error, warn};

/// Successful response body
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub message: String,
    #[serde(flatten)]
    pub payload: T,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(message: impl Into<String>, payload: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            payload,
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// A failed request, rendered as `{success: false, message}`
#[derive(Debug)]
pub struct ApiError {
    context: Option<&'static str>,
    error: Error,
}

impl ApiError {
    /// Prefix non-validation messages with the failing operation
    pub fn context(mut self, context: &'static str) -> Self {
        self.context = Some(context);
        self
    }

    pub fn message(&self) -> String {
        match (self.error.root(), self.context) {
            // Validation messages are written for the end user
            (Error::Validation(message), _) => message.clone(),
            (_, Some(context)) => format!("{}: {}", context, self.error),
            (_, None) => self.error.to_string(),
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        Self {
            context: None,
            error,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.error.kind();
        let message = self.message();
        metrics::counter!("emolens_errors_total", "kind" => kind).increment(1);

        if kind == "validation" {
            warn!("Request rejected: {}", message);
        } else {
            error!("Request failed ({}): {}", kind, message);
        }

        let body = json!({
            "success": false,
            "message": message,
        });

        (StatusCode::OK, Json(body)).into_response()
    }
}

/// Add a context prefix to a core result's error
pub trait ResultExt<T> {
    fn context(self, context: &'static str) -> Result<T, ApiError>;
}

impl<T> ResultExt<T> for emolens_core::Result<T> {
    fn context(self, context: &'static str) -> Result<T, ApiError> {
        self.map_err(|e| ApiError::from(e).context(context))
    }
}
