use crate::application::catalog::{
    ServiceDependencies, borrow_book as execute_borrow_book, create_book as execute_create_book,
    delete_book as execute_delete_book, get_all_books, get_book_by_id,
    return_book as execute_return_book, update_book as execute_update_book,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::{
    error::ApiError,
    types::{BookListResponse, BookRequest, BookResponse, ListBooksQuery, parse_status_filter},
};

// ============================================================================
// State
// ============================================================================

/// ハンドラー間で共有されるアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub service_deps: ServiceDependencies,
}

// ============================================================================
// Query handlers (GET)
// ============================================================================

/// GET /books - オプションフィルタ付き書籍一覧取得
///
/// クエリパラメータ:
/// - status: ステータスでフィルタリング（available, borrowed）（オプション）
///
/// 集計（available / borrowed / total）は返した一覧と同じ集合から計算される。
/// フィルタを指定した場合、集計もフィルタ後の集合を反映する。
pub async fn list_books(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListBooksQuery>,
) -> Result<Json<BookListResponse>, QueryError> {
    // ステータスフィルタが指定されている場合はパースして検証
    let status = match query.status.as_deref() {
        Some(raw) => Some(parse_status_filter(raw).map_err(QueryError::BadRequest)?),
        None => None,
    };

    let listing = get_all_books(&state.service_deps, status)
        .await
        .map_err(|e| QueryError::InternalError(e.to_string()))?;

    let response = BookListResponse {
        books: listing.books.into_iter().map(BookResponse::from).collect(),
        statistics: listing.statistics,
    };

    Ok(Json(response))
}

/// GET /books/:id - 書籍詳細をIDで取得
///
/// IDの検証はサービス層のバリデーターが行う。
/// 見つかった場合は書籍情報を返し、見つからない場合は404を返す。
pub async fn get_book(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<BookResponse>, ApiError> {
    let book = get_book_by_id(&state.service_deps, &id).await?;
    Ok(Json(BookResponse::from(book)))
}

// ============================================================================
// Command handlers (POST / PUT / DELETE)
// ============================================================================

/// POST /books - 書籍を新規登録
///
/// 強制されるビジネスルール:
/// - 必須フィールド（title, author, isbn）がすべて存在すること
/// - ISBNが書式ルールに合致すること
/// - ISBNが既存の書籍と衝突しないこと
pub async fn create_book(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BookRequest>,
) -> Result<(StatusCode, Json<BookResponse>), ApiError> {
    let book = execute_create_book(&state.service_deps, req.to_data()).await?;
    Ok((StatusCode::CREATED, Json(BookResponse::from(book))))
}

/// PUT /books/:id - 書籍の記述フィールドを更新
///
/// 強制されるビジネスルール:
/// - createと同じ3つの検証（ID、フィールド、ISBN書式）
/// - 貸出状態に関わらず更新可能。ステータスは変更されない
pub async fn update_book(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<BookRequest>,
) -> Result<Json<BookResponse>, ApiError> {
    let book = execute_update_book(&state.service_deps, &id, req.to_data()).await?;
    Ok(Json(BookResponse::from(book)))
}

/// POST /books/:id/borrow - 書籍を貸し出す
///
/// 強制されるビジネスルール:
/// - 書籍が存在すること
/// - 現在のステータスがavailableであること
pub async fn borrow_book(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<BookResponse>, ApiError> {
    let book = execute_borrow_book(&state.service_deps, &id).await?;
    Ok(Json(BookResponse::from(book)))
}

/// POST /books/:id/return - 書籍を返却する
///
/// 強制されるビジネスルール:
/// - 書籍が存在すること
/// - 現在のステータスがborrowedであること
pub async fn return_book(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<BookResponse>, ApiError> {
    let book = execute_return_book(&state.service_deps, &id).await?;
    Ok(Json(BookResponse::from(book)))
}

/// DELETE /books/:id - 書籍を削除する
///
/// 強制されるビジネスルール:
/// - 書籍が存在すること
/// - 貸出中の書籍は削除できない
pub async fn delete_book(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    execute_delete_book(&state.service_deps, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Error types
// ============================================================================

/// クエリハンドラー用のエラー型
#[derive(Debug)]
pub enum QueryError {
    BadRequest(String),
    InternalError(String),
}

impl IntoResponse for QueryError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            QueryError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            QueryError::InternalError(msg) => {
                // 内部エラーの詳細はログに記録し、クライアントには一般的なメッセージのみを返す
                tracing::error!("Internal error in query handler: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An unexpected error occurred".to_string(),
                )
            }
        };

        let body = Json(super::types::ErrorResponse::new(error_type, message));
        (status, body).into_response()
    }
}
