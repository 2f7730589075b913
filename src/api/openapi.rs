//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, books, health, loans, members};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "LeafStack API",
        version = "0.1.0",
        description = "Library Management System REST API",
        license(name = "MIT")
    ),
    servers(
        (url = "/api", description = "API root")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::register,
        auth::verify,
        // Books
        books::list_books,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Members
        members::list_members,
        members::add_member,
        members::delete_member,
        // Loans
        loans::list_loans,
        loans::borrow_book,
        loans::return_book,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::AuthResponse,
            auth::VerifyResponse,
            // Books
            crate::models::book::Book,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            books::DeleteResponse,
            // Users
            crate::models::user::UserInfo,
            crate::models::user::MemberSummary,
            crate::models::user::AddMember,
            crate::models::user::RegisterUser,
            crate::models::user::Role,
            // Loans
            loans::BorrowRequest,
            crate::models::borrow::BorrowDetails,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "books", description = "Catalog management"),
        (name = "members", description = "Member roster"),
        (name = "loans", description = "Borrow and return workflow")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
