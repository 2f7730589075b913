//! Book (catalog entry) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Book model from database.
///
/// `available` counts the copies not currently held by an open borrow;
/// the repository keeps `0 <= available <= copies` at all times.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub category: String,
    pub copies: i32,
    pub available: i32,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Author is required"))]
    pub author: String,
    #[validate(length(min = 1, message = "ISBN is required"))]
    pub isbn: String,
    #[validate(length(min = 1, message = "Category is required"))]
    pub category: String,
    #[validate(range(min = 1, message = "Copies must be at least 1"))]
    pub copies: i32,
    pub description: Option<String>,
}

/// Partial update request for a book.
///
/// `description` tells an absent field apart from an explicit `null`:
/// absent keeps the stored value, `null` clears it.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "Author cannot be empty"))]
    pub author: Option<String>,
    #[validate(length(min = 1, message = "ISBN cannot be empty"))]
    pub isbn: Option<String>,
    #[validate(length(min = 1, message = "Category cannot be empty"))]
    pub category: Option<String>,
    #[validate(range(min = 1, message = "Copies must be at least 1"))]
    pub copies: Option<i32>,
    #[serde(default, deserialize_with = "nullable_field")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
}

/// Wraps a present field (even a `null` one) in `Some`; only an absent
/// field deserializes to the outer `None`.
fn nullable_field<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// Shift `available` by the same delta as `copies`, clamped to the
/// valid range. Reducing copies below the borrowed count leaves
/// available at 0 rather than letting it go negative.
pub fn adjust_available(available: i32, old_copies: i32, new_copies: i32) -> i32 {
    (available + (new_copies - old_copies)).clamp(0, new_copies)
}
