//! Borrowing endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::borrowing::{
        Borrowing, BorrowingDetails, BorrowingQuery, BorrowingSummary, CreateBorrowing,
    },
};

use super::AuthenticatedUser;

/// Flat borrowing representation returned from write operations
#[derive(Serialize, ToSchema)]
pub struct BorrowingResponse {
    /// Borrowing ID
    pub id: i32,
    pub borrow_date: NaiveDate,
    pub expected_return_date: NaiveDate,
    pub actual_return_date: Option<NaiveDate>,
    /// Borrowed book ID
    pub book_id: i32,
    /// Owner user ID
    pub user_id: i32,
    /// Computed from the return state
    pub is_active: bool,
}

impl From<Borrowing> for BorrowingResponse {
    fn from(borrowing: Borrowing) -> Self {
        let is_active = borrowing.is_active();
        BorrowingResponse {
            id: borrowing.id,
            borrow_date: borrowing.borrow_date,
            expected_return_date: borrowing.expected_return_date,
            actual_return_date: borrowing.actual_return_date,
            book_id: borrowing.book_id,
            user_id: borrowing.user_id,
            is_active,
        }
    }
}

/// Return response with confirmation message
#[derive(Serialize, ToSchema)]
pub struct ReturnResponse {
    /// Status message
    pub message: String,
    /// The returned borrowing
    pub borrowing: BorrowingResponse,
}

/// List borrowings visible to the caller
#[utoipa::path(
    get,
    path = "/borrowings",
    tag = "borrowings",
    security(("bearer_auth" = [])),
    params(BorrowingQuery),
    responses(
        (status = 200, description = "Visible borrowings", body = Vec<BorrowingSummary>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_borrowings(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Query(query): Query<BorrowingQuery>,
) -> AppResult<Json<Vec<BorrowingSummary>>> {
    let borrowings = state
        .services
        .borrowings
        .list_visible(&principal, &query)
        .await?;
    Ok(Json(borrowings))
}

/// Get borrowing details by ID
#[utoipa::path(
    get,
    path = "/borrowings/{id}",
    tag = "borrowings",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Borrowing ID")
    ),
    responses(
        (status = 200, description = "Borrowing details", body = BorrowingDetails),
        (status = 404, description = "Borrowing not found or not visible to the caller")
    )
)]
pub async fn get_borrowing(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<BorrowingDetails>> {
    let details = state.services.borrowings.get_details(&principal, id).await?;
    Ok(Json(details))
}

/// Create a new borrowing (borrow a book)
#[utoipa::path(
    post,
    path = "/borrowings",
    tag = "borrowings",
    security(("bearer_auth" = [])),
    request_body = CreateBorrowing,
    responses(
        (status = 201, description = "Borrowing created", body = BorrowingResponse),
        (status = 400, description = "Inventory exhausted"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn create_borrowing(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Json(request): Json<CreateBorrowing>,
) -> AppResult<(StatusCode, Json<BorrowingResponse>)> {
    let created = state
        .services
        .borrowings
        .create(&principal, &request)
        .await?;

    Ok((StatusCode::CREATED, Json(created.into())))
}

/// Return a borrowed book
#[utoipa::path(
    post,
    path = "/borrowings/{id}/return",
    tag = "borrowings",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Borrowing ID")
    ),
    responses(
        (status = 200, description = "Book returned", body = ReturnResponse),
        (status = 400, description = "Already returned"),
        (status = 404, description = "Borrowing not found or not visible to the caller")
    )
)]
pub async fn return_borrowing(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ReturnResponse>> {
    let returned = state
        .services
        .borrowings
        .return_borrowing(&principal, id)
        .await?;

    Ok(Json(ReturnResponse {
        message: "The book has been successfully returned.".to_string(),
        borrowing: returned.into(),
    }))
}
