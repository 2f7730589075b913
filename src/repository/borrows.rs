//! Borrows repository for database operations
//!
//! Availability accounting happens here, always as conditional updates
//! inside a transaction. The check-and-decrement is a single statement,
//! never a read followed by a write in application code.

use chrono::{Duration, Utc};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{book::Book, borrow::Borrow, user::User},
};

#[derive(Clone)]
pub struct BorrowsRepository {
    pool: Pool<Postgres>,
}

impl BorrowsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get borrow by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Borrow> {
        sqlx::query_as::<_, Borrow>("SELECT * FROM borrows WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Borrow record with id {} not found", id)))
    }

    /// List borrows, optionally restricted to one user, newest first
    pub async fn list(&self, user_id: Option<Uuid>) -> AppResult<Vec<Borrow>> {
        let borrows = if let Some(user_id) = user_id {
            sqlx::query_as::<_, Borrow>(
                "SELECT * FROM borrows WHERE user_id = $1 ORDER BY created_at DESC",
            )
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, Borrow>("SELECT * FROM borrows ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?
        };
        Ok(borrows)
    }

    /// Create a borrow for one available copy of a book.
    ///
    /// The availability check and decrement are one conditional UPDATE:
    /// of two concurrent borrows against the last copy, exactly one sees
    /// a row. The borrow insert rides in the same transaction, so a
    /// failed insert rolls the decrement back rather than losing a copy.
    pub async fn create(&self, book_id: Uuid, user: &User, loan_period: Duration) -> AppResult<Borrow> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let book = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books SET available = available - 1
            WHERE id = $1 AND available > 0
            RETURNING *
            "#,
        )
        .bind(book_id)
        .fetch_optional(&mut *tx)
        .await?;

        let book = match book {
            Some(book) => book,
            None => {
                let exists: bool =
                    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE id = $1)")
                        .bind(book_id)
                        .fetch_one(&mut *tx)
                        .await?;
                if exists {
                    return Err(AppError::BusinessRule("Book is not available".to_string()));
                }
                return Err(AppError::NotFound(format!(
                    "Book with id {} not found",
                    book_id
                )));
            }
        };

        let borrow = sqlx::query_as::<_, Borrow>(
            r#"
            INSERT INTO borrows (id, book_id, book_title, user_id, user_name, borrowed_at, due_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(book.id)
        .bind(&book.title)
        .bind(user.id)
        .bind(&user.name)
        .bind(now)
        .bind(now + loan_period)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match &e {
            // The borrower can be deleted between the lookup and the
            // insert; the FK rejects the insert and the decrement rolls
            // back with the transaction.
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                AppError::NotFound(format!("User with id {} not found", user.id))
            }
            _ => AppError::from(e),
        })?;

        tx.commit().await?;

        Ok(borrow)
    }

    /// Close an open borrow and hand the copy back.
    ///
    /// Closing is conditional on `returned_at IS NULL`, so a borrow can
    /// transition open -> closed exactly once. The increment is clamped
    /// at `copies` in case the total was reduced while the copy was out.
    pub async fn close(&self, borrow_id: Uuid) -> AppResult<Borrow> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let borrow = sqlx::query_as::<_, Borrow>(
            r#"
            UPDATE borrows SET returned_at = $2
            WHERE id = $1 AND returned_at IS NULL
            RETURNING *
            "#,
        )
        .bind(borrow_id)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await?;

        let borrow = match borrow {
            Some(borrow) => borrow,
            None => {
                let exists: bool =
                    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM borrows WHERE id = $1)")
                        .bind(borrow_id)
                        .fetch_one(&mut *tx)
                        .await?;
                if exists {
                    return Err(AppError::BusinessRule("Book already returned".to_string()));
                }
                return Err(AppError::NotFound(format!(
                    "Borrow record with id {} not found",
                    borrow_id
                )));
            }
        };

        sqlx::query("UPDATE books SET available = LEAST(available + 1, copies) WHERE id = $1")
            .bind(borrow.book_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(borrow)
    }
}
