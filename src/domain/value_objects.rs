use serde::{Deserialize, Serialize};

/// 書籍IDのエラー
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookIdError {
    /// 正の整数でない
    NotPositive,
}

/// 書籍ID - カタログ管理コンテキストの集約ID
///
/// 不変条件：正の整数であること。
/// IDはリポジトリが採番するため、`new()`は存在しない。
/// 既存の値からは`TryFrom<i64>`でのみ構築でき、不正な値（0以下）を作成できない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BookId(i64);

impl BookId {
    /// 現在の値
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for BookId {
    type Error = BookIdError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if value <= 0 {
            return Err(BookIdError::NotPositive);
        }
        Ok(Self(value))
    }
}

impl std::fmt::Display for BookId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// ISBNのエラー
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsbnError {
    /// 書式が不正
    InvalidFormat,
}

/// ISBN - 書籍の国際標準図書番号
///
/// 不変条件（採用した書式ルール）：
/// - ハイフンを取り除いた残りが13桁の数字、または
/// - 10文字で先頭9文字が数字、末尾が数字か`X`/`x`（ISBN-10のチェック文字）
///
/// チェックディジットの計算は行わない。値は入力されたまま（ハイフン込み）で
/// 保持し、一意性も保持した文字列に対して適用される。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Isbn(String);

impl Isbn {
    /// 書式を検証してISBNを構築する
    ///
    /// # エラー
    /// 書式ルールに合致しない場合は`IsbnError::InvalidFormat`を返す
    pub fn parse(raw: &str) -> Result<Self, IsbnError> {
        let chars: Vec<char> = raw.chars().filter(|c| *c != '-').collect();

        let valid = match chars.len() {
            13 => chars.iter().all(|c| c.is_ascii_digit()),
            10 => {
                chars[..9].iter().all(|c| c.is_ascii_digit())
                    && (chars[9].is_ascii_digit() || chars[9] == 'X' || chars[9] == 'x')
            }
            _ => false,
        };

        if !valid {
            return Err(IsbnError::InvalidFormat);
        }
        Ok(Self(raw.to_string()))
    }

    /// 保持している文字列表現（入力されたまま）
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Isbn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // TDD: BookId のテスト
    #[test]
    fn test_book_id_try_from_positive() {
        let id = BookId::try_from(1);
        assert!(id.is_ok());
        assert_eq!(id.unwrap().value(), 1);
    }

    #[test]
    fn test_book_id_try_from_zero() {
        let id = BookId::try_from(0);
        assert_eq!(id.unwrap_err(), BookIdError::NotPositive);
    }

    #[test]
    fn test_book_id_try_from_negative() {
        let id = BookId::try_from(-42);
        assert_eq!(id.unwrap_err(), BookIdError::NotPositive);
    }

    // TDD: Isbn のテスト
    #[test]
    fn test_isbn_13_digits() {
        assert!(Isbn::parse("9784873113944").is_ok());
    }

    #[test]
    fn test_isbn_13_digits_hyphenated() {
        assert!(Isbn::parse("978-4-87311-394-4").is_ok());
        assert!(Isbn::parse("111-1111111111").is_ok());
    }

    #[test]
    fn test_isbn_10_digits() {
        assert!(Isbn::parse("4873113946").is_ok());
        assert!(Isbn::parse("4-87311-394-6").is_ok());
    }

    #[test]
    fn test_isbn_10_with_check_character() {
        assert!(Isbn::parse("097522980X").is_ok());
        assert!(Isbn::parse("0-9752298-0-x").is_ok());
    }

    #[test]
    fn test_isbn_check_character_only_at_end() {
        assert_eq!(
            Isbn::parse("09752X2980").unwrap_err(),
            IsbnError::InvalidFormat
        );
    }

    #[test]
    fn test_isbn_wrong_length() {
        assert_eq!(Isbn::parse("12345").unwrap_err(), IsbnError::InvalidFormat);
        assert_eq!(
            Isbn::parse("123456789012").unwrap_err(),
            IsbnError::InvalidFormat
        );
        assert_eq!(Isbn::parse("").unwrap_err(), IsbnError::InvalidFormat);
    }

    #[test]
    fn test_isbn_rejects_non_digits() {
        assert_eq!(
            Isbn::parse("97848731139ab").unwrap_err(),
            IsbnError::InvalidFormat
        );
    }

    #[test]
    fn test_isbn_preserves_input_form() {
        let isbn = Isbn::parse("978-4-87311-394-4").unwrap();
        assert_eq!(isbn.as_str(), "978-4-87311-394-4");
    }
}
