use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::catalog::Statistics;
use crate::domain::book::{Book, BookData, BookStatus};

/// 書籍一覧取得のクエリパラメータ
#[derive(Debug, Deserialize)]
pub struct ListBooksQuery {
    /// ステータスでフィルタリング（available, borrowed）
    pub status: Option<String>,
}

/// 書籍の作成・更新リクエスト（POST /books と PUT /books/:id）
#[derive(Debug, Deserialize)]
pub struct BookRequest {
    pub title: String,
    pub author: String,
    pub isbn: String,
}

impl BookRequest {
    /// サービス層の入力ペイロードへ変換する
    pub fn to_data(&self) -> BookData {
        BookData {
            title: self.title.clone(),
            author: self.author.clone(),
            isbn: self.isbn.clone(),
        }
    }
}

/// 書籍レスポンス
#[derive(Debug, Serialize)]
pub struct BookResponse {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self {
            id: book.id.value(),
            title: book.title,
            author: book.author,
            isbn: book.isbn.to_string(),
            status: book.status.as_str().to_string(),
            created_at: book.created_at,
            updated_at: book.updated_at,
        }
    }
}

/// 書籍一覧レスポンス（GET /books）
///
/// 集計は返した一覧と同じ集合から計算されたもの。
#[derive(Debug, Serialize)]
pub struct BookListResponse {
    pub books: Vec<BookResponse>,
    pub statistics: Statistics,
}

/// エラーレスポンス
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            error: message.into(),
        }
    }
}

/// ステータスクエリパラメータのパースとバリデーション
pub fn parse_status_filter(status: &str) -> Result<BookStatus, String> {
    status.parse::<BookStatus>()
}
