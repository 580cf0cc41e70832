use crate::domain::book::BookData;
use crate::domain::value_objects::{BookId, Isbn};

use super::errors::{CatalogError, Result};

/// 書籍IDとして渡された値を検証し、正規化したIDを返す（純粋な関数）
///
/// 正の整数としてパースできない値は`InvalidId`で拒否する。
/// リポジトリには触れない。
pub fn validate_id(raw: &str) -> Result<BookId> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .and_then(|n| BookId::try_from(n).ok())
        .ok_or_else(|| CatalogError::InvalidId {
            raw: raw.to_string(),
        })
}

/// 書籍データの必須フィールドを検証する（純粋な関数）
///
/// 欠落または空白のみのフィールドは`MissingField`で拒否する。
/// ISBNの書式はここでは検証しない（`validate_isbn`に分離されているため、
/// 呼び出し側がチェックを段階的に並べられる）。
pub fn validate_book_data(data: &BookData) -> Result<()> {
    for (field, value) in data.fields() {
        if value.trim().is_empty() {
            return Err(CatalogError::MissingField { field });
        }
    }
    Ok(())
}

/// ISBNの書式を検証する（純粋な関数）
///
/// 書式ルールは`Isbn::parse`が所有する。一意性の確認はリポジトリの
/// 責務であり、ここでは行わない。
pub fn validate_isbn(raw: &str) -> Result<()> {
    Isbn::parse(raw)
        .map(|_| ())
        .map_err(|_| CatalogError::InvalidIsbn {
            raw: raw.to_string(),
        })
}
