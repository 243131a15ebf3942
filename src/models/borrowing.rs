//! Borrowing model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use super::book::Book;
use super::user::PublicUser;

/// Return state of a borrowing.
///
/// A borrowing starts `Outstanding` and moves to `Returned` exactly once;
/// there is no transition back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnState {
    Outstanding,
    Returned(NaiveDate),
}

impl ReturnState {
    pub fn is_active(&self) -> bool {
        matches!(self, ReturnState::Outstanding)
    }

    /// The recorded return date, if any
    pub fn returned_on(&self) -> Option<NaiveDate> {
        match self {
            ReturnState::Outstanding => None,
            ReturnState::Returned(date) => Some(*date),
        }
    }
}

impl From<Option<NaiveDate>> for ReturnState {
    fn from(actual_return_date: Option<NaiveDate>) -> Self {
        match actual_return_date {
            None => ReturnState::Outstanding,
            Some(date) => ReturnState::Returned(date),
        }
    }
}

/// Borrowing model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Borrowing {
    pub id: i32,
    pub borrow_date: NaiveDate,
    pub expected_return_date: NaiveDate,
    pub actual_return_date: Option<NaiveDate>,
    pub book_id: i32,
    pub user_id: i32,
}

impl Borrowing {
    pub fn return_state(&self) -> ReturnState {
        ReturnState::from(self.actual_return_date)
    }

    pub fn is_active(&self) -> bool {
        self.return_state().is_active()
    }
}

/// Create borrowing request.
///
/// Owner and return state are never client-supplied: the owner is always
/// the authenticated principal and every borrowing starts outstanding.
/// Unknown fields are rejected rather than silently dropped.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateBorrowing {
    pub borrow_date: NaiveDate,
    pub expected_return_date: NaiveDate,
    pub book_id: i32,
}

/// Borrowing query parameters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct BorrowingQuery {
    /// "true" or "false" (case-insensitive); any other value is ignored
    pub is_active: Option<String>,
    /// Restrict to one owner; only applied for admin callers
    pub user_id: Option<i32>,
}

impl BorrowingQuery {
    /// Parse the `is_active` filter. Unrecognized values leave the result
    /// set unfiltered, they are not an error.
    pub fn active_filter(&self) -> Option<bool> {
        match self.is_active.as_deref().map(str::to_lowercase).as_deref() {
            Some("true") => Some(true),
            Some("false") => Some(false),
            _ => None,
        }
    }
}

/// Internal row structure for summary queries
#[derive(Debug, Clone, FromRow)]
pub struct BorrowingSummaryRow {
    pub id: i32,
    pub borrow_date: NaiveDate,
    pub expected_return_date: NaiveDate,
    pub actual_return_date: Option<NaiveDate>,
    pub book_title: String,
    pub user_email: String,
}

impl From<BorrowingSummaryRow> for BorrowingSummary {
    fn from(row: BorrowingSummaryRow) -> Self {
        let is_active = row.actual_return_date.is_none();
        BorrowingSummary {
            id: row.id,
            borrow_date: row.borrow_date,
            expected_return_date: row.expected_return_date,
            actual_return_date: row.actual_return_date,
            book: row.book_title,
            user: row.user_email,
            is_active,
        }
    }
}

/// Flat borrowing representation for list views: the book is shown as its
/// title and the user as their email
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BorrowingSummary {
    pub id: i32,
    pub borrow_date: NaiveDate,
    pub expected_return_date: NaiveDate,
    pub actual_return_date: Option<NaiveDate>,
    pub book: String,
    pub user: String,
    pub is_active: bool,
}

/// Borrowing with nested book and user records for detail views
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BorrowingDetails {
    pub id: i32,
    pub borrow_date: NaiveDate,
    pub expected_return_date: NaiveDate,
    pub actual_return_date: Option<NaiveDate>,
    pub book: Book,
    pub user: PublicUser,
    pub is_active: bool,
}
