use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::application::usercases::{
    accounts::AccountError, dashboard::DashboardError, plans::PlanError,
    subscriptions::SubscriptionError, users::UserError,
};

const INTERNAL_MESSAGE: &str = "Internal server error";

#[derive(Debug, Serialize)]
pub struct SuccessResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    pub data: T,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub code: u16,
    pub kind: &'static str,
    pub message: String,
}

pub fn success_response<T: Serialize>(status: StatusCode, message: &str, data: T) -> Response {
    let body = Json(SuccessResponse {
        success: true,
        message: message.to_string(),
        data,
    });

    (status, body).into_response()
}

pub fn error_response(status: StatusCode, kind: &'static str, message: String) -> Response {
    let body = Json(ErrorResponse {
        success: false,
        code: status.as_u16(),
        kind,
        message,
    });

    (status, body).into_response()
}

/// Body for requests axum could not extract (malformed JSON, non-UUID path segment).
pub fn rejection_response(status: StatusCode, detail: String) -> Response {
    error_response(status, "validation_failure", detail)
}

impl IntoResponse for SubscriptionError {
    fn into_response(self) -> Response {
        let message = match &self {
            // Don't leak internal error detail to client
            SubscriptionError::Internal(_) => INTERNAL_MESSAGE.to_string(),
            other => other.to_string(),
        };
        error_response(self.status_code(), self.kind(), message)
    }
}

impl IntoResponse for PlanError {
    fn into_response(self) -> Response {
        let message = match &self {
            PlanError::Internal(_) => INTERNAL_MESSAGE.to_string(),
            other => other.to_string(),
        };
        error_response(self.status_code(), self.kind(), message)
    }
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let message = match &self {
            DashboardError::Internal(_) => INTERNAL_MESSAGE.to_string(),
            other => other.to_string(),
        };
        error_response(self.status_code(), self.kind(), message)
    }
}

impl IntoResponse for AccountError {
    fn into_response(self) -> Response {
        let message = match &self {
            AccountError::Internal(_) => INTERNAL_MESSAGE.to_string(),
            other => other.to_string(),
        };
        error_response(self.status_code(), self.kind(), message)
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let message = match &self {
            UserError::Internal(_) => INTERNAL_MESSAGE.to_string(),
            other => other.to_string(),
        };
        error_response(self.status_code(), self.kind(), message)
    }
}
