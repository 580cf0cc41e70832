use serde::Serialize;
use std::sync::Arc;

use crate::domain::book::{Book, BookData, BookStatus};
use crate::ports::book_repository::{BookRepository, RepositoryError};

use super::errors::{CatalogError, Result};
use super::validator;

/// サービスの依存関係
///
/// 関数型DDDの原則に従い、データ構造として定義。
/// 振る舞い（メソッド）は持たず、純粋な関数に依存関係を渡す。
///
/// インスタンスはプロセス起動時に一度だけ構築し、トランスポート層へ
/// 明示的に渡す。アンビエントなグローバル参照は使わない。
#[derive(Clone)]
pub struct ServiceDependencies {
    pub book_repository: Arc<dyn BookRepository>,
}

/// 書籍ステータスの集計
///
/// 永続化されない導出ビュー。常にその時点の書籍集合から計算されるため、
/// キャッシュの鮮度を気にする必要はない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Statistics {
    pub available: usize,
    pub borrowed: usize,
    pub total: usize,
}

/// 書籍一覧と集計のペア（`get_all_books`の戻り値）
#[derive(Debug, Clone)]
pub struct BookListing {
    pub books: Vec<Book>,
    pub statistics: Statistics,
}

/// 書籍集合からステータス集計を計算する（純粋な関数）
///
/// 集計は渡された集合に対して行う。フィルタ済みの集合が渡されれば
/// 集計もフィルタ済みの集合を反映する。
pub fn compute_statistics(books: &[Book]) -> Statistics {
    let available = books
        .iter()
        .filter(|b| b.status == BookStatus::Available)
        .count();
    let borrowed = books
        .iter()
        .filter(|b| b.status == BookStatus::Borrowed)
        .count();

    Statistics {
        available,
        borrowed,
        total: books.len(),
    }
}

/// 一意制約違反をConflictへ変換する（create/update共通）
///
/// 再タグ付けはここで一度だけ行い、それ以外のリポジトリ障害は
/// そのまま伝播させる。
fn map_unique_violation(err: RepositoryError) -> CatalogError {
    match err {
        RepositoryError::UniqueViolation { .. } => CatalogError::IsbnAlreadyExists,
        RepositoryError::NotFound => CatalogError::BookNotFound,
        other => CatalogError::Repository(other),
    }
}

/// 全書籍と集計を取得する
///
/// フィルタリングはリポジトリの責務であり、ここでは再計算しない。
/// 集計は返ってきた集合に対して計算する。
///
/// # 引数
/// * `deps` - サービスの依存関係
/// * `status` - ステータスフィルタ（Noneならフィルタなし）
pub async fn get_all_books(
    deps: &ServiceDependencies,
    status: Option<BookStatus>,
) -> Result<BookListing> {
    let books = deps
        .book_repository
        .find_all(status)
        .await
        .map_err(CatalogError::Repository)?;

    let statistics = compute_statistics(&books);

    Ok(BookListing { books, statistics })
}

/// IDで書籍を取得する
///
/// # エラー
/// - InvalidId: IDが正の整数でない
/// - BookNotFound: 書籍が存在しない
pub async fn get_book_by_id(deps: &ServiceDependencies, raw_id: &str) -> Result<Book> {
    let id = validator::validate_id(raw_id)?;

    deps.book_repository
        .find_by_id(id)
        .await
        .map_err(CatalogError::Repository)?
        .ok_or(CatalogError::BookNotFound)
}

/// 書籍を新規登録する
///
/// ビジネスルール：
/// - 必須フィールドがすべて存在すること
/// - ISBNが書式ルールに合致すること
/// - ISBNが既存の書籍と衝突しないこと（リポジトリの一意制約で検出）
/// - 新規書籍のステータスはAvailableで初期化される
pub async fn create_book(deps: &ServiceDependencies, data: BookData) -> Result<Book> {
    // 1. フィールドとISBN書式の検証（リポジトリ呼び出し前）
    validator::validate_book_data(&data)?;
    validator::validate_isbn(&data.isbn)?;

    // 2. 永続化。一意制約違反はConflictへ一度だけ再タグ付けする
    deps.book_repository
        .create(data)
        .await
        .map_err(map_unique_violation)
}

/// 書籍の記述フィールドを更新する
///
/// ビジネスルール：
/// - createと同じ3つの検証（ID、フィールド、ISBN書式）
/// - 貸出状態に関わらず内容の更新は許可される
/// - ステータスはこの経路では変更されない
pub async fn update_book(
    deps: &ServiceDependencies,
    raw_id: &str,
    data: BookData,
) -> Result<Book> {
    // 1. ID、フィールド、ISBN書式の検証
    let id = validator::validate_id(raw_id)?;
    validator::validate_book_data(&data)?;
    validator::validate_isbn(&data.isbn)?;

    // 2. 更新。存在しなければNotFound、ISBN衝突はConflict
    deps.book_repository
        .update(id, data)
        .await
        .map_err(map_unique_violation)
}

/// 書籍を貸し出す
///
/// ビジネスルール：
/// - 書籍が存在すること
/// - 現在のステータスがAvailableであること
///
/// ステータス確認と更新はリポジトリの条件付き遷移1回で行う。
/// 同一書籍への並行リクエストが両方Availableを観測して二重貸出になる
/// 競合は、この原子的な遷移で閉じられる。
pub async fn borrow_book(deps: &ServiceDependencies, raw_id: &str) -> Result<Book> {
    let id = validator::validate_id(raw_id)?;

    deps.book_repository
        .transition_status(id, BookStatus::Available, BookStatus::Borrowed)
        .await
        .map_err(|err| match err {
            RepositoryError::NotFound => CatalogError::BookNotFound,
            RepositoryError::StatusConflict { .. } => CatalogError::AlreadyBorrowed,
            other => CatalogError::Repository(other),
        })
}

/// 書籍を返却する
///
/// ビジネスルール：
/// - 書籍が存在すること
/// - 現在のステータスがBorrowedであること
///
/// 貸出と対称の条件付き遷移（Borrowed → Available）。
pub async fn return_book(deps: &ServiceDependencies, raw_id: &str) -> Result<Book> {
    let id = validator::validate_id(raw_id)?;

    deps.book_repository
        .transition_status(id, BookStatus::Borrowed, BookStatus::Available)
        .await
        .map_err(|err| match err {
            RepositoryError::NotFound => CatalogError::BookNotFound,
            RepositoryError::StatusConflict { .. } => CatalogError::NotBorrowed,
            other => CatalogError::Repository(other),
        })
}

/// 書籍を削除する
///
/// ビジネスルール：
/// - 書籍が存在すること
/// - 貸出中の書籍は削除できない
///
/// ステータス確認と削除はリポジトリの条件付き削除1回で行う。
pub async fn delete_book(deps: &ServiceDependencies, raw_id: &str) -> Result<()> {
    let id = validator::validate_id(raw_id)?;

    deps.book_repository
        .delete(id, BookStatus::Available)
        .await
        .map_err(|err| match err {
            RepositoryError::NotFound => CatalogError::BookNotFound,
            RepositoryError::StatusConflict { .. } => CatalogError::CannotDeleteBorrowed,
            other => CatalogError::Repository(other),
        })
}
