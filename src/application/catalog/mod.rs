mod book_service;
mod errors;
mod validator;

pub use book_service::{
    BookListing, ServiceDependencies, Statistics, borrow_book, compute_statistics, create_book,
    delete_book, get_all_books, get_book_by_id, return_book, update_book,
};
pub use errors::{CatalogError, ErrorKind, Result};
pub use validator::{validate_book_data, validate_id, validate_isbn};
