use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use application::error::AppError;
use log::warn;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RpcError {
    /// Input rejected before reaching the store.
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Internal(String),
}

#[derive(Serialize, Debug)]
struct ErrorShape<'a> {
    code: &'static str,
    message: &'a str,
}

#[derive(Serialize, Debug)]
struct ErrorBody<'a> {
    error: ErrorShape<'a>,
}

impl RpcError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Internal(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    fn message(&self) -> &str {
        match self {
            Self::BadRequest(message) | Self::Internal(message) => message,
        }
    }
}

impl From<AppError> for RpcError {
    fn from(err: AppError) -> Self {
        if err.is_client_error() {
            RpcError::BadRequest(err.to_string())
        } else {
            RpcError::Internal(err.to_string())
        }
    }
}

impl ResponseError for RpcError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let Self::BadRequest(message) = self {
            warn!("rejected rpc input: {}", message);
        }
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: ErrorShape {
                code: self.code(),
                message: self.message(),
            },
        })
    }
}
