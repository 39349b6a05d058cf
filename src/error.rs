use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::{image_policy::ImageError, response::ApiResponse};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not Found")]
    NotFound,

    #[error("Bad Request {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("No identity could be resolved for this request")]
    NoIdentity,

    #[error("Cart could not be created, please retry")]
    CartCreationRace,

    #[error("Cart is already finalized")]
    CartFinalized,

    #[error("Unknown content type {0}")]
    UnknownContentType(String),

    #[error("Unknown category {0}")]
    UnknownCategory(String),

    #[error("Product not found")]
    ProductNotFound,

    #[error("Slug {0} is already taken")]
    SlugTaken(String),

    #[error(transparent)]
    Image(#[from] ImageError),

    #[error("Database error")]
    DbError(#[from] sqlx::Error),

    #[error("ORM error")]
    OrmError(#[from] sea_orm::DbErr),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound
            | AppError::UnknownContentType(_)
            | AppError::UnknownCategory(_)
            | AppError::ProductNotFound => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized | AppError::NoIdentity => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::CartCreationRace | AppError::CartFinalized | AppError::SlugTaken(_) => {
                StatusCode::CONFLICT
            }
            AppError::Image(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::DbError(_) | AppError::OrmError(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorData {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            AppError::DbError(err) => tracing::error!(error = %err, "database error"),
            AppError::OrmError(err) => tracing::error!(error = %err, "orm error"),
            AppError::Internal(err) => tracing::error!(error = %err, "internal error"),
            _ => {}
        }

        let body = ApiResponse::failure(
            self.to_string(),
            ErrorData {
                error: self.to_string(),
            },
        );

        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_failures_map_to_client_statuses() {
        assert_eq!(AppError::NoIdentity.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::CartCreationRace.status(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::UnknownContentType("tablet".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::UnknownCategory("tablets".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(AppError::ProductNotFound.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn image_errors_are_unprocessable() {
        let err: AppError = ImageError::ResolutionTooLow {
            width: 10,
            height: 10,
        }
        .into();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn storage_errors_hide_details() {
        let err = AppError::Internal(anyhow::anyhow!("secret detail"));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Internal Server Error");
    }
}
