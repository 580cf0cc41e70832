use crate::domain::book::{Book, BookData, BookStatus};
use crate::domain::value_objects::{BookId, Isbn};
use crate::ports::book_repository::{
    BookRepository as BookRepositoryTrait, RepositoryError, Result,
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;

/// インメモリの内部状態
///
/// 条件付き更新・削除をロック1回の中で行えるよう、
/// 書籍集合と採番カウンタを同じMutexで保護する。
struct State {
    books: HashMap<BookId, Book>,
    next_id: i64,
}

/// BookRepositoryのインメモリ実装
///
/// 統合テストとE2Eテストで実データベースの代わりに使う。
/// 一意制約と条件付き遷移の意味論はPostgreSQL実装と同じ。
pub struct BookRepository {
    state: Mutex<State>,
}

impl BookRepository {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                books: HashMap::new(),
                next_id: 1,
            }),
        }
    }
}

impl Default for BookRepository {
    fn default() -> Self {
        Self::new()
    }
}

/// 保存済みデータの不整合をストレージエラーとして報告する
fn storage_error(message: String) -> RepositoryError {
    RepositoryError::Storage(Box::new(std::io::Error::new(
        std::io::ErrorKind::InvalidData,
        message,
    )))
}

#[async_trait]
impl BookRepositoryTrait for BookRepository {
    async fn find_all(&self, status: Option<BookStatus>) -> Result<Vec<Book>> {
        let state = self.state.lock().unwrap();
        let mut books: Vec<Book> = state
            .books
            .values()
            .filter(|b| status.is_none_or(|s| b.status == s))
            .cloned()
            .collect();
        books.sort_by_key(|b| b.id);
        Ok(books)
    }

    async fn find_by_id(&self, id: BookId) -> Result<Option<Book>> {
        let state = self.state.lock().unwrap();
        Ok(state.books.get(&id).cloned())
    }

    async fn create(&self, data: BookData) -> Result<Book> {
        let mut state = self.state.lock().unwrap();

        // 一意制約：保持している文字列に対して適用
        if state.books.values().any(|b| b.isbn.as_str() == data.isbn) {
            return Err(RepositoryError::UniqueViolation { field: "isbn" });
        }

        let id = BookId::try_from(state.next_id)
            .map_err(|_| storage_error(format!("id counter overflow: {}", state.next_id)))?;
        state.next_id += 1;

        let isbn = Isbn::parse(&data.isbn)
            .map_err(|_| storage_error(format!("invalid isbn rejected by storage: {}", data.isbn)))?;

        let now = Utc::now();
        let book = Book {
            id,
            title: data.title,
            author: data.author,
            isbn,
            status: BookStatus::Available,
            created_at: now,
            updated_at: now,
        };

        state.books.insert(id, book.clone());
        Ok(book)
    }

    async fn update(&self, id: BookId, data: BookData) -> Result<Book> {
        let mut state = self.state.lock().unwrap();

        if !state.books.contains_key(&id) {
            return Err(RepositoryError::NotFound);
        }

        if state
            .books
            .values()
            .any(|b| b.id != id && b.isbn.as_str() == data.isbn)
        {
            return Err(RepositoryError::UniqueViolation { field: "isbn" });
        }

        let isbn = Isbn::parse(&data.isbn)
            .map_err(|_| storage_error(format!("invalid isbn rejected by storage: {}", data.isbn)))?;

        let book = state.books.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        book.title = data.title;
        book.author = data.author;
        book.isbn = isbn;
        book.updated_at = Utc::now();

        Ok(book.clone())
    }

    async fn transition_status(
        &self,
        id: BookId,
        from: BookStatus,
        to: BookStatus,
    ) -> Result<Book> {
        // 確認と更新を同じロック区間で行う（PostgreSQL実装の
        // 条件付きUPDATE 1文と同じ原子性）
        let mut state = self.state.lock().unwrap();

        let book = state.books.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        if book.status != from {
            return Err(RepositoryError::StatusConflict {
                expected: from,
                actual: book.status,
            });
        }

        book.status = to;
        book.updated_at = Utc::now();
        Ok(book.clone())
    }

    async fn delete(&self, id: BookId, required: BookStatus) -> Result<()> {
        let mut state = self.state.lock().unwrap();

        let book = state.books.get(&id).ok_or(RepositoryError::NotFound)?;
        if book.status != required {
            return Err(RepositoryError::StatusConflict {
                expected: required,
                actual: book.status,
            });
        }

        state.books.remove(&id);
        Ok(())
    }
}
