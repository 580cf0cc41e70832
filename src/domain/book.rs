use chrono::{DateTime, Utc};

use super::{BookId, Isbn};

/// 書籍の貸出ステータス
///
/// 不変条件：常にこの2値のいずれかであり、第三の状態は存在しない。
///
/// 状態遷移：
/// - Available --貸出--> Borrowed
/// - Borrowed  --返却--> Available
/// - 削除はAvailableからのみ許可
/// - 内容の更新はどちらの状態からも許可され、状態を変えない
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookStatus {
    /// 貸出可能
    Available,
    /// 貸出中
    Borrowed,
}

impl BookStatus {
    /// 文字列表現を取得する
    pub fn as_str(&self) -> &'static str {
        match self {
            BookStatus::Available => "available",
            BookStatus::Borrowed => "borrowed",
        }
    }
}

impl std::str::FromStr for BookStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "available" => Ok(BookStatus::Available),
            "borrowed" => Ok(BookStatus::Borrowed),
            _ => Err(format!("Invalid book status: {}", s)),
        }
    }
}

impl std::fmt::Display for BookStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Book集約 - カタログに登録された1冊の書籍
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    // 識別子（リポジトリが採番、以後不変）
    pub id: BookId,

    // 記述フィールド
    pub title: String,
    pub author: String,
    pub isbn: Isbn,

    // 貸出管理の責務
    pub status: BookStatus,

    // 監査情報
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 書籍の作成・更新ペイロード（未検証の入力データ）
///
/// 必須フィールドの集合は`fields()`が列挙し、バリデーターだけが消費する。
/// サービス層は個々のフィールド名を知らない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookData {
    pub title: String,
    pub author: String,
    pub isbn: String,
}

impl BookData {
    /// 必須フィールドを（名前, 値）の組で列挙する
    pub fn fields(&self) -> [(&'static str, &str); 3] {
        [
            ("title", self.title.as_str()),
            ("author", self.author.as_str()),
            ("isbn", self.isbn.as_str()),
        ]
    }
}
