use crate::domain::book::{Book, BookData, BookStatus};
use crate::domain::value_objects::{BookId, Isbn};
use crate::ports::book_repository::{
    BookRepository as BookRepositoryTrait, RepositoryError, Result,
};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Row, postgres::PgRow};
use std::str::FromStr;

/// 行データの不整合をストレージエラーとして報告する
fn invalid_data(message: String) -> RepositoryError {
    RepositoryError::Storage(Box::new(std::io::Error::new(
        std::io::ErrorKind::InvalidData,
        message,
    )))
}

/// sqlxのエラーをリポジトリエラーへ変換する
///
/// 一意制約違反はドライバのエラー種別で判定する。
/// エラーメッセージの文字列照合は行わない。
fn map_sqlx_error(err: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return RepositoryError::UniqueViolation { field: "isbn" };
        }
    }
    RepositoryError::Storage(Box::new(err))
}

/// PostgreSQLの行データをBookに変換する
///
/// idの正値制約、ISBNの書式、ステータスの2値制約をここで検証し、
/// データベースから不正な値が来た場合はストレージエラーとする。
fn map_row_to_book(row: &PgRow) -> Result<Book> {
    let raw_id: i64 = row.get("id");
    let id = BookId::try_from(raw_id)
        .map_err(|_| invalid_data(format!("book id out of range: {}", raw_id)))?;

    let raw_isbn: String = row.get("isbn");
    let isbn = Isbn::parse(&raw_isbn)
        .map_err(|_| invalid_data(format!("invalid isbn in storage: {}", raw_isbn)))?;

    let status_str: &str = row.get("status");
    let status = BookStatus::from_str(status_str).map_err(invalid_data)?;

    Ok(Book {
        id,
        title: row.get("title"),
        author: row.get("author"),
        isbn,
        status,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

/// BookRepositoryのPostgreSQL実装
///
/// 条件付き遷移・削除は`WHERE id = $1 AND status = $2`の1文で行い、
/// check-then-actの競合をデータベース側で閉じる。
pub struct BookRepository {
    pool: PgPool,
}

impl BookRepository {
    /// PostgreSQLコネクションプールから新しいBookRepositoryを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 条件付きUPDATE/DELETEが0行だった原因を分類する
    ///
    /// レコード不在なら`NotFound`、存在するがステータス不一致なら
    /// `StatusConflict`を返す。
    async fn classify_conditional_miss(
        &self,
        id: BookId,
        expected: BookStatus,
    ) -> RepositoryError {
        let row = sqlx::query(
            r#"
            SELECT status
            FROM books
            WHERE id = $1
            "#,
        )
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await;

        match row {
            Ok(None) => RepositoryError::NotFound,
            Ok(Some(row)) => {
                let status_str: &str = row.get("status");
                match BookStatus::from_str(status_str) {
                    Ok(actual) => RepositoryError::StatusConflict { expected, actual },
                    Err(e) => invalid_data(e),
                }
            }
            Err(e) => map_sqlx_error(e),
        }
    }
}

#[async_trait]
impl BookRepositoryTrait for BookRepository {
    /// 全書籍を取得（オプションでステータスフィルタ）
    ///
    /// フィルタはSQL側で適用する。`$1`がNULLなら全件。
    async fn find_all(&self, status: Option<BookStatus>) -> Result<Vec<Book>> {
        let rows = sqlx::query(
            r#"
            SELECT
                id,
                title,
                author,
                isbn,
                status,
                created_at,
                updated_at
            FROM books
            WHERE $1::varchar IS NULL OR status = $1
            ORDER BY id ASC
            "#,
        )
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.iter().map(map_row_to_book).collect()
    }

    /// IDで書籍を取得
    async fn find_by_id(&self, id: BookId) -> Result<Option<Book>> {
        let row = sqlx::query(
            r#"
            SELECT
                id,
                title,
                author,
                isbn,
                status,
                created_at,
                updated_at
            FROM books
            WHERE id = $1
            "#,
        )
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref().map(map_row_to_book).transpose()
    }

    /// 書籍を新規作成（ステータスはavailableで初期化、IDは採番）
    async fn create(&self, data: BookData) -> Result<Book> {
        let now = Utc::now();

        let row = sqlx::query(
            r#"
            INSERT INTO books (title, author, isbn, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING
                id,
                title,
                author,
                isbn,
                status,
                created_at,
                updated_at
            "#,
        )
        .bind(&data.title)
        .bind(&data.author)
        .bind(&data.isbn)
        .bind(BookStatus::Available.as_str())
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        map_row_to_book(&row)
    }

    /// 記述フィールドのみを更新（ステータスは触らない）
    async fn update(&self, id: BookId, data: BookData) -> Result<Book> {
        let row = sqlx::query(
            r#"
            UPDATE books
            SET title = $2,
                author = $3,
                isbn = $4,
                updated_at = $5
            WHERE id = $1
            RETURNING
                id,
                title,
                author,
                isbn,
                status,
                created_at,
                updated_at
            "#,
        )
        .bind(id.value())
        .bind(&data.title)
        .bind(&data.author)
        .bind(&data.isbn)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        match row {
            Some(row) => map_row_to_book(&row),
            None => Err(RepositoryError::NotFound),
        }
    }

    /// 条件付きステータス遷移（原子的）
    ///
    /// `WHERE id = $1 AND status = $2`の条件付きUPDATE 1文で遷移する。
    /// 0行だった場合は不在かステータス不一致かを追加のSELECTで分類する
    /// （遷移自体の原子性には影響しない）。
    async fn transition_status(
        &self,
        id: BookId,
        from: BookStatus,
        to: BookStatus,
    ) -> Result<Book> {
        let row = sqlx::query(
            r#"
            UPDATE books
            SET status = $3,
                updated_at = $4
            WHERE id = $1 AND status = $2
            RETURNING
                id,
                title,
                author,
                isbn,
                status,
                created_at,
                updated_at
            "#,
        )
        .bind(id.value())
        .bind(from.as_str())
        .bind(to.as_str())
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        match row {
            Some(row) => map_row_to_book(&row),
            None => Err(self.classify_conditional_miss(id, from).await),
        }
    }

    /// 条件付き削除（原子的）
    async fn delete(&self, id: BookId, required: BookStatus) -> Result<()> {
        let row = sqlx::query(
            r#"
            DELETE FROM books
            WHERE id = $1 AND status = $2
            RETURNING id
            "#,
        )
        .bind(id.value())
        .bind(required.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        match row {
            Some(_) => Ok(()),
            None => Err(self.classify_conditional_miss(id, required).await),
        }
    }
}
