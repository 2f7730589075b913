//! Borrow/return endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{error::AppResult, models::borrow::BorrowDetails};

use super::AuthenticatedUser;

/// Borrow request.
///
/// `member_id` is only honored for admins borrowing on a member's
/// behalf; members always borrow for themselves no matter what the
/// client sends. Legacy clients also send a `member_name` field, which
/// is deliberately ignored: name snapshots come from the user record.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BorrowRequest {
    pub book_id: Uuid,
    pub member_id: Option<Uuid>,
}

/// Borrow listing filter
#[derive(Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct LoanQuery {
    pub member_id: Option<Uuid>,
}

/// List borrows (own, or all/filtered for admins)
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(LoanQuery),
    responses(
        (status = 200, description = "Borrow records with derived overdue status", body = Vec<BorrowDetails>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Members can only view their own borrows")
    )
)]
pub async fn list_loans(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<LoanQuery>,
) -> AppResult<Json<Vec<BorrowDetails>>> {
    let borrows = state
        .services
        .borrows
        .list_borrows(&claims, query.member_id)
        .await?;
    Ok(Json(borrows))
}

/// Borrow a book
#[utoipa::path(
    post,
    path = "/loans/borrow",
    tag = "loans",
    security(("bearer_auth" = [])),
    request_body = BorrowRequest,
    responses(
        (status = 201, description = "Borrow created", body = BorrowDetails),
        (status = 400, description = "Book is not available"),
        (status = 403, description = "Members can only borrow for themselves"),
        (status = 404, description = "Book or user not found")
    )
)]
pub async fn borrow_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<BorrowRequest>,
) -> AppResult<(StatusCode, Json<BorrowDetails>)> {
    let borrow = state
        .services
        .borrows
        .borrow_book(&claims, request.book_id, request.member_id)
        .await?;

    Ok((StatusCode::CREATED, Json(borrow)))
}

/// Return a borrowed book
#[utoipa::path(
    put,
    path = "/loans/{id}/return",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Borrow ID")
    ),
    responses(
        (status = 200, description = "Borrow closed", body = BorrowDetails),
        (status = 400, description = "Book already returned"),
        (status = 403, description = "Only the borrower or an admin can return this book"),
        (status = 404, description = "Borrow record not found")
    )
)]
pub async fn return_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<BorrowDetails>> {
    let borrow = state.services.borrows.return_book(&claims, id).await?;
    Ok(Json(borrow))
}
