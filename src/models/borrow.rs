//! Borrow model and related types
//!
//! A borrow links one copy of a book to a user for a bounded period.
//! Overdue status is never persisted; it is derived from the clock at
//! read time so stored state can never disagree with reality.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Borrow record from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Borrow {
    pub id: Uuid,
    pub book_id: Uuid,
    /// Title of the book at borrow time
    pub book_title: String,
    pub user_id: Uuid,
    /// Name of the borrower at borrow time
    pub user_name: String,
    pub borrowed_at: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Borrow {
    /// An open borrow is overdue once its due date has passed.
    /// A returned borrow is never overdue, regardless of when it came back.
    pub fn is_overdue_at(&self, now: DateTime<Utc>) -> bool {
        self.returned_at.is_none() && now > self.due_date
    }

    /// Derive the wire representation at the given instant
    pub fn into_details(self, now: DateTime<Utc>) -> BorrowDetails {
        let is_overdue = self.is_overdue_at(now);
        BorrowDetails {
            id: self.id,
            book_id: self.book_id,
            book_title: self.book_title,
            user_id: self.user_id,
            user_name: self.user_name,
            borrowed_at: self.borrowed_at,
            due_date: self.due_date,
            returned_at: self.returned_at,
            is_overdue,
        }
    }
}

/// Borrow with overdue status derived for display
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BorrowDetails {
    pub id: Uuid,
    pub book_id: Uuid,
    pub book_title: String,
    pub user_id: Uuid,
    pub user_name: String,
    pub borrowed_at: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
    pub is_overdue: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn borrow(due_in: Duration, returned: Option<DateTime<Utc>>) -> Borrow {
        let now = Utc::now();
        Borrow {
            id: Uuid::new_v4(),
            book_id: Uuid::new_v4(),
            book_title: "The Rust Programming Language".to_string(),
            user_id: Uuid::new_v4(),
            user_name: "Alice".to_string(),
            borrowed_at: now - Duration::days(14) + due_in,
            due_date: now + due_in,
            returned_at: returned,
            created_at: now,
        }
    }

    #[test]
    fn open_borrow_past_due_date_is_overdue() {
        let b = borrow(Duration::days(-1), None);
        assert!(b.is_overdue_at(Utc::now()));
    }

    #[test]
    fn open_borrow_before_due_date_is_not_overdue() {
        let b = borrow(Duration::days(7), None);
        assert!(!b.is_overdue_at(Utc::now()));
    }

    #[test]
    fn returned_borrow_is_never_overdue() {
        // Returned well past the due date: still not overdue
        let b = borrow(Duration::days(-30), Some(Utc::now()));
        assert!(!b.is_overdue_at(Utc::now()));

        let details = b.into_details(Utc::now());
        assert!(!details.is_overdue);
    }
}
