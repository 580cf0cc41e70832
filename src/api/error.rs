use crate::application::catalog::{CatalogError, ErrorKind};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::types::ErrorResponse;

/// API層のエラー型
///
/// アプリケーション層のエラーをラップし、HTTPレスポンスへのマッピングを提供する。
/// ステータスコードはエラー種別（ErrorKind）の検査で決まり、
/// メッセージの文字列照合は行わない。
#[derive(Debug)]
pub struct ApiError(CatalogError);

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // 400 InvalidInput / 404 NotFound / 409 Conflict / 500 Internal
        let status = match self.0.kind() {
            ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let (error_type, message) = match &self.0 {
            CatalogError::InvalidId { .. } => ("INVALID_ID", self.0.to_string()),
            CatalogError::MissingField { .. } => ("MISSING_FIELD", self.0.to_string()),
            CatalogError::InvalidIsbn { .. } => ("INVALID_ISBN", self.0.to_string()),

            CatalogError::BookNotFound => ("BOOK_NOT_FOUND", self.0.to_string()),

            CatalogError::IsbnAlreadyExists => ("ISBN_ALREADY_EXISTS", self.0.to_string()),
            CatalogError::AlreadyBorrowed => ("ALREADY_BORROWED", self.0.to_string()),
            CatalogError::NotBorrowed => ("NOT_BORROWED", self.0.to_string()),
            CatalogError::CannotDeleteBorrowed => {
                ("CANNOT_DELETE_BORROWED", self.0.to_string())
            }

            // 内部エラーの詳細はログに記録し、クライアントには一般的なメッセージのみを返す
            CatalogError::Repository(e) => {
                tracing::error!("Repository error: {}", e);
                ("REPOSITORY_ERROR", "Internal server error".to_string())
            }
        };

        let body = Json(ErrorResponse::new(error_type, message));
        (status, body).into_response()
    }
}
