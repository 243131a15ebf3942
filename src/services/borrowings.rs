//! Borrowing lifecycle service
//!
//! Owns the Active -> Returned state machine and the visibility scoping
//! rules: members only ever see and act on their own borrowings, admins
//! see everything.

use chrono::Utc;

use crate::{
    error::{AppError, AppResult},
    models::{
        borrowing::{Borrowing, BorrowingDetails, BorrowingQuery, BorrowingSummary, CreateBorrowing},
        user::Principal,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct BorrowingsService {
    repository: Repository,
}

impl BorrowingsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// True iff the principal may see and act on the borrowing
    pub fn can_access(principal: &Principal, borrowing: &Borrowing) -> bool {
        principal.is_admin() || borrowing.user_id == principal.id
    }

    /// Gate single-item access. Items outside the caller's scope surface
    /// as not-found so that existence is not leaked.
    fn authorize(principal: &Principal, borrowing: &Borrowing) -> AppResult<()> {
        if Self::can_access(principal, borrowing) {
            Ok(())
        } else {
            Err(AppError::NotFound(format!(
                "Borrowing with id {} not found",
                borrowing.id
            )))
        }
    }

    /// List borrowings visible to the principal.
    ///
    /// The `user_id` filter is admin-only; for members it is ignored and
    /// the result set stays scoped to their own borrowings.
    pub async fn list_visible(
        &self,
        principal: &Principal,
        query: &BorrowingQuery,
    ) -> AppResult<Vec<BorrowingSummary>> {
        let owner = if principal.is_admin() {
            query.user_id
        } else {
            Some(principal.id)
        };

        self.repository
            .borrowings
            .list(owner, query.active_filter())
            .await
    }

    /// Get one borrowing with nested book and user records
    pub async fn get_details(&self, principal: &Principal, id: i32) -> AppResult<BorrowingDetails> {
        let borrowing = self.repository.borrowings.get_by_id(id).await?;
        Self::authorize(principal, &borrowing)?;

        let book = self.repository.books.get_by_id(borrowing.book_id).await?;
        let user = self.repository.users.get_by_id(borrowing.user_id).await?;

        let is_active = borrowing.is_active();
        Ok(BorrowingDetails {
            id: borrowing.id,
            borrow_date: borrowing.borrow_date,
            expected_return_date: borrowing.expected_return_date,
            actual_return_date: borrowing.actual_return_date,
            book,
            user: user.into_public(),
            is_active,
        })
    }

    /// Create a borrowing owned by the principal, reserving one inventory
    /// unit of the book. The owner is always the authenticated caller.
    pub async fn create(
        &self,
        principal: &Principal,
        borrowing: &CreateBorrowing,
    ) -> AppResult<Borrowing> {
        let created = self
            .repository
            .borrowings
            .create(principal.id, borrowing)
            .await?;

        tracing::info!(
            "Borrowing {} created: book {} borrowed by user {}",
            created.id,
            created.book_id,
            created.user_id
        );

        Ok(created)
    }

    /// Return a borrowing: one-way Active -> Returned transition dated
    /// today, releasing the inventory unit
    pub async fn return_borrowing(&self, principal: &Principal, id: i32) -> AppResult<Borrowing> {
        let borrowing = self.repository.borrowings.get_by_id(id).await?;
        Self::authorize(principal, &borrowing)?;

        let returned = self
            .repository
            .borrowings
            .mark_returned(id, Utc::now().date_naive())
            .await?;

        tracing::info!(
            "Borrowing {} returned: book {} back in inventory",
            returned.id,
            returned.book_id
        );

        Ok(returned)
    }
}
