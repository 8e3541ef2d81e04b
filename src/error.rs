use crate::models::ApiResponse;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::DbErr),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// 支付网关通信/鉴权失败（含超时），可由调用方重试
    #[error("Payment gateway error: {0}")]
    GatewayError(String),

    /// 支付 reference 撞库，内部换新 reference 重试
    #[error("Duplicate payment reference: {0}")]
    DuplicateReference(String),

    #[error("Unknown payment reference: {0}")]
    UnknownReference(String),

    #[error("Invalid webhook signature")]
    InvalidSignature,

    #[error("Draw not ready: {0}")]
    NotReady(String),

    #[error("Winners already selected: {0}")]
    AlreadySelected(String),

    #[error("No eligible participants: {0}")]
    NoEligibleParticipants(String),

    #[error("Notification error: {0}")]
    NotificationError(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("HTTP request error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::GatewayError(_) | AppError::ReqwestError(_) => "GATEWAY_ERROR",
            AppError::DuplicateReference(_) => "DUPLICATE_REFERENCE",
            AppError::UnknownReference(_) => "UNKNOWN_REFERENCE",
            AppError::InvalidSignature => "INVALID_SIGNATURE",
            AppError::NotReady(_) => "DRAW_NOT_READY",
            AppError::AlreadySelected(_) => "WINNERS_ALREADY_SELECTED",
            AppError::NoEligibleParticipants(_) => "NO_ELIGIBLE_PARTICIPANTS",
            AppError::NotificationError(_) => "NOTIFICATION_ERROR",
            AppError::ConfigError(_) => "CONFIG_ERROR",
            AppError::InternalError(_) | AppError::SerdeJsonError(_) => "INTERNAL_ERROR",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::InvalidSignature => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) | AppError::UnknownReference(_) => StatusCode::NOT_FOUND,
            AppError::GatewayError(_) | AppError::ReqwestError(_) => StatusCode::BAD_GATEWAY,
            AppError::NotReady(_) | AppError::AlreadySelected(_) => StatusCode::CONFLICT,
            AppError::NoEligibleParticipants(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();
        let message = match self {
            AppError::ValidationError(msg)
            | AppError::NotFound(msg)
            | AppError::NotReady(msg)
            | AppError::AlreadySelected(msg)
            | AppError::NoEligibleParticipants(msg) => {
                log::warn!("{self}");
                msg.clone()
            }
            AppError::UnknownReference(reference) => {
                log::warn!("Unknown payment reference: {reference}");
                "Payment record not found".to_string()
            }
            AppError::InvalidSignature => {
                log::warn!("Rejected request with invalid webhook signature");
                "Invalid signature".to_string()
            }
            AppError::GatewayError(_) | AppError::ReqwestError(_) => {
                log::error!("Payment gateway error: {self}");
                "Payment provider unavailable, please try again".to_string()
            }
            AppError::DatabaseError(err) => {
                log::error!("Database error: {err}");
                "Database error".to_string()
            }
            _ => {
                log::error!("Internal error: {self}");
                "Internal server error".to_string()
            }
        };

        HttpResponse::build(status_code).json(ApiResponse::failure(self.code(), message))
    }
}
