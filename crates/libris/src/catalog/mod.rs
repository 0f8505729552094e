//! Book catalog, categories and borrowing records.
//!
//! Plain data access; ownership is enforced by the HTTP layer before any
//! of these are called.

mod books;
mod borrowed;
mod categories;
mod models;

pub use books::BookRepository;
pub use borrowed::BorrowRepository;
pub use categories::CategoryRepository;
pub use models::{
    BEST_SELLER_TAG, Book, BookSummary, BookUpdate, BorrowRecord, Category, NewBook,
    NewBorrowRecord,
};
