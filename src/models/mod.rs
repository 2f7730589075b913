//! Data models for books, users and borrows

pub mod book;
pub mod borrow;
pub mod user;

pub use book::Book;
pub use borrow::Borrow;
pub use user::User;
