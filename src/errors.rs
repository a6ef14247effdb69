use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use jsonwebtoken::errors::Error as JWError;
use serde_json::json;
use surrealdb::Error as SError;

use thiserror::Error;
use tracing::error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Json web token Error: {0}")]
    JwTError(#[from] JWError),

    #[error("SurrealDb Error: {0}")]
    SurrealError(#[from] SError),

    #[error("Io Error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Validator Error: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Json Rejection Error: {0}")]
    AxumJsonRejection(#[from] axum::extract::rejection::JsonRejection),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Internal Server Error")]
    InternalServerError,

    #[error("Not Found")]
    NotFound,

    #[error("{0}")]
    Conflict(String),

    #[error("Forbidden access")]
    Forbidden,

    // ! Auth
    #[error("Missing authorization token")]
    MissingToken,
    #[error("Invalid authorization token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let internal = || {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Error".to_string(),
            )
        };
        let (status, message) = match self {
            Error::JwTError(error) => {
                error!("JWT Error:{:#?}", error);
                internal()
            }
            Error::SurrealError(error) => {
                error!("Surreal Error:{:#?}", error);
                internal()
            }
            Error::IoError(error) => {
                error!("Io Error:{:#?}", error);
                internal()
            }
            Error::Config(reason) => {
                error!("Configuration Error: {reason}");
                internal()
            }
            Error::InternalServerError => internal(),
            Error::ValidationError(error) => {
                let message = format!("Input validation error: [{}]", error).replace('\n', ", ");
                error!("Validation Error:{:#?}", error);
                (StatusCode::BAD_REQUEST, message)
            }
            Error::AxumJsonRejection(error) => {
                error!("Axum Json Rejection Error:{:#?}", error);
                (StatusCode::BAD_REQUEST, error.body_text())
            }
            Error::NotFound => (StatusCode::NOT_FOUND, "Not Found".to_string()),
            Error::Conflict(message) => (StatusCode::CONFLICT, message),
            Error::Forbidden => (StatusCode::FORBIDDEN, "Forbidden access".to_string()),
            Error::MissingToken | Error::InvalidToken | Error::TokenExpired => {
                (StatusCode::UNAUTHORIZED, "Unauthorized access".to_string())
            }
        };
        (status, Json(json!({ "message": message }))).into_response()
    }
}
