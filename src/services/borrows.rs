//! Borrow lifecycle service
//!
//! Owns the open -> closed state machine for borrows and the rules for
//! who may act on them. The borrower is always derived from the
//! authenticated principal; client-supplied identity fields are only
//! honored for admins acting on a member's behalf.

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        borrow::BorrowDetails,
        user::UserClaims,
    },
    repository::Repository,
};

/// Fixed loan period for every borrow
pub const LOAN_PERIOD_DAYS: i64 = 14;

#[derive(Clone)]
pub struct BorrowsService {
    repository: Repository,
}

impl BorrowsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Borrow one copy of a book.
    ///
    /// Members always borrow for themselves. An admin may pass
    /// `member_id` to check a book out on a member's behalf.
    pub async fn borrow_book(
        &self,
        claims: &UserClaims,
        book_id: Uuid,
        member_id: Option<Uuid>,
    ) -> AppResult<BorrowDetails> {
        let borrower_id = match member_id {
            Some(id) if claims.is_admin() => id,
            Some(id) if id != claims.user_id => {
                return Err(AppError::Authorization(
                    "Members can only borrow books for themselves".to_string(),
                ));
            }
            _ => claims.user_id,
        };

        // The name snapshot comes from the user record, never from the client
        let borrower = self.repository.users.get_by_id(borrower_id).await?;

        let borrow = self
            .repository
            .borrows
            .create(book_id, &borrower, Duration::days(LOAN_PERIOD_DAYS))
            .await?;

        tracing::info!(
            "User {} borrowed '{}' (borrow {}, due {})",
            borrower.id,
            borrow.book_title,
            borrow.id,
            borrow.due_date
        );

        Ok(borrow.into_details(Utc::now()))
    }

    /// Return a borrowed book. Only the borrowing user or an admin may
    /// close a borrow; a borrow closes exactly once.
    pub async fn return_book(&self, claims: &UserClaims, borrow_id: Uuid) -> AppResult<BorrowDetails> {
        let borrow = self.repository.borrows.get_by_id(borrow_id).await?;

        if !claims.is_admin() && borrow.user_id != claims.user_id {
            return Err(AppError::Authorization(
                "Only the borrower or an administrator can return this book".to_string(),
            ));
        }

        let closed = self.repository.borrows.close(borrow_id).await?;

        tracing::info!("Borrow {} returned ('{}')", closed.id, closed.book_title);

        Ok(closed.into_details(Utc::now()))
    }

    /// List borrows visible to the caller.
    ///
    /// Members see their own history regardless of any filter they send.
    /// Admins see everything, optionally narrowed to one member.
    /// Overdue status is recomputed from the current clock for every
    /// record; stored state is never trusted for it.
    pub async fn list_borrows(
        &self,
        claims: &UserClaims,
        member_id: Option<Uuid>,
    ) -> AppResult<Vec<BorrowDetails>> {
        let filter = if claims.is_admin() {
            member_id
        } else {
            if let Some(requested) = member_id {
                if requested != claims.user_id {
                    return Err(AppError::Authorization(
                        "Members can only view their own borrows".to_string(),
                    ));
                }
            }
            Some(claims.user_id)
        };

        let borrows = self.repository.borrows.list(filter).await?;

        let now = Utc::now();
        Ok(borrows.into_iter().map(|b| b.into_details(now)).collect())
    }
}
