//! API request handlers.
//!
//! Organized by domain:
//! - `auth`: Credential issuance, role lookup, logout
//! - `books`: Books and categories
//! - `borrowed`: Borrowing records (ownership-checked)
//! - `misc`: Greeting and health check

mod auth;
mod books;
mod borrowed;
mod misc;

pub use auth::{
    AdminLoginResponse, MessageResponse, RoleQuery, RoleResponse, check_admin, issue_admin_token,
    issue_token, logout,
};
pub use books::{
    BookIdsRequest, DeleteResult, InsertResult, UpdateResult, best_sellers, book_details,
    books_by_category, books_by_ids, create_book, list_books, list_categories, update_book,
};
pub use borrowed::{
    BorrowerQuery, ReturnQuery, create_borrowed, get_borrowed, list_borrowed, return_book,
};
pub use misc::{HealthResponse, health, root};
