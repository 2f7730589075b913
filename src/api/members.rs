//! Member roster endpoints (admin only)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::user::{AddMember, MemberSummary},
};

use super::{books::DeleteResponse, AuthenticatedUser};

/// List member accounts
#[utoipa::path(
    get,
    path = "/members",
    tag = "members",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All member-role users", body = Vec<MemberSummary>),
        (status = 403, description = "Administrator privileges required")
    )
)]
pub async fn list_members(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<MemberSummary>>> {
    claims.require_admin()?;

    let members = state.services.users.list_members().await?;
    Ok(Json(members))
}

/// Add a member account with the default password
#[utoipa::path(
    post,
    path = "/members",
    tag = "members",
    security(("bearer_auth" = [])),
    request_body = AddMember,
    responses(
        (status = 201, description = "Member created", body = MemberSummary),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Administrator privileges required"),
        (status = 409, description = "Email already in use")
    )
)]
pub async fn add_member(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<AddMember>,
) -> AppResult<(StatusCode, Json<MemberSummary>)> {
    claims.require_admin()?;

    let user = state.services.users.add_member(request).await?;
    Ok((StatusCode::CREATED, Json(MemberSummary::from(user))))
}

/// Delete a member and their borrow history
#[utoipa::path(
    delete,
    path = "/members/{id}",
    tag = "members",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User deleted", body = DeleteResponse),
        (status = 400, description = "User has active borrows"),
        (status = 403, description = "Administrator privileges required"),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_member(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<DeleteResponse>> {
    claims.require_admin()?;

    state.services.users.delete_user(id).await?;
    Ok(Json(DeleteResponse {
        message: "User and associated borrow history deleted successfully".to_string(),
    }))
}
