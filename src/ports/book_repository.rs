use crate::domain::book::{Book, BookData, BookStatus};
use crate::domain::value_objects::BookId;
use async_trait::async_trait;
use thiserror::Error;

/// リポジトリ層のエラー
///
/// ストレージ固有のエラーメッセージを文字列照合する代わりに、
/// サービス層が検査できる構造化されたシグナルとして表現する。
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// 指定IDのレコードが存在しない
    #[error("record not found")]
    NotFound,

    /// 一意制約違反（どのフィールドで衝突したかを保持）
    #[error("unique constraint violation on {field}")]
    UniqueViolation { field: &'static str },

    /// 条件付き更新の前提ステータスが一致しなかった
    #[error("status conflict: expected {expected}, actual {actual}")]
    StatusConflict {
        expected: BookStatus,
        actual: BookStatus,
    },

    /// その他のストレージ障害
    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T> = std::result::Result<T, RepositoryError>;

/// 書籍リポジトリポート
///
/// 永続化の詳細（スキーマ、クエリ言語）はアダプター側が所有する。
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// 全書籍を取得する。ステータスフィルタはリポジトリ側で適用される。
    async fn find_all(&self, status: Option<BookStatus>) -> Result<Vec<Book>>;

    /// IDで書籍を取得する
    async fn find_by_id(&self, id: BookId) -> Result<Option<Book>>;

    /// 書籍を新規作成する。ステータスはAvailableで初期化され、IDが採番される。
    ///
    /// ISBNが衝突した場合は`UniqueViolation`を返す。
    async fn create(&self, data: BookData) -> Result<Book>;

    /// 記述フィールドのみを更新する。ステータスはこの経路では変更されない。
    ///
    /// レコードが存在しない場合は`NotFound`、ISBN衝突は`UniqueViolation`を返す。
    async fn update(&self, id: BookId, data: BookData) -> Result<Book>;

    /// 条件付きステータス遷移（原子的）
    ///
    /// 現在のステータスが`from`の場合に限り`to`へ遷移し、更新後のレコードを返す。
    /// check-then-actを1回のストレージ操作に押し込むことで、
    /// 同一書籍への並行リクエストによる二重貸出を防ぐ。
    ///
    /// # エラー
    /// - `NotFound`: レコードが存在しない
    /// - `StatusConflict`: 現在のステータスが`from`でない
    async fn transition_status(&self, id: BookId, from: BookStatus, to: BookStatus)
    -> Result<Book>;

    /// 条件付き削除（原子的）
    ///
    /// 現在のステータスが`required`の場合に限り削除する。
    ///
    /// # エラー
    /// - `NotFound`: レコードが存在しない
    /// - `StatusConflict`: 現在のステータスが`required`でない
    async fn delete(&self, id: BookId, required: BookStatus) -> Result<()>;
}
