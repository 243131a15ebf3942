//! Borrowings repository for database operations

use chrono::NaiveDate;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::borrowing::{Borrowing, BorrowingSummary, BorrowingSummaryRow, CreateBorrowing},
};

#[derive(Clone)]
pub struct BorrowingsRepository {
    pool: Pool<Postgres>,
}

impl BorrowingsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get borrowing by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Borrowing> {
        sqlx::query_as::<_, Borrowing>("SELECT * FROM borrowings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Borrowing with id {} not found", id)))
    }

    /// List borrowings as flat summaries, newest-id last.
    ///
    /// `owner` restricts to one user's borrowings, `active` to the
    /// outstanding/returned partition; `None` leaves either unfiltered.
    pub async fn list(
        &self,
        owner: Option<i32>,
        active: Option<bool>,
    ) -> AppResult<Vec<BorrowingSummary>> {
        let rows = sqlx::query_as::<_, BorrowingSummaryRow>(
            r#"
            SELECT b.id, b.borrow_date, b.expected_return_date, b.actual_return_date,
                   bk.title AS book_title, u.email AS user_email
            FROM borrowings b
            JOIN books bk ON b.book_id = bk.id
            JOIN users u ON b.user_id = u.id
            WHERE ($1::int4 IS NULL OR b.user_id = $1)
              AND ($2::bool IS NULL OR (b.actual_return_date IS NULL) = $2)
            ORDER BY b.id
            "#,
        )
        .bind(owner)
        .bind(active)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(BorrowingSummary::from).collect())
    }

    /// Create a new borrowing, reserving one unit of book inventory.
    ///
    /// The decrement and the insert commit together or not at all. The
    /// conditional UPDATE is what keeps inventory non-negative under
    /// concurrent requests: of N simultaneous borrows against a single
    /// remaining copy, exactly one UPDATE matches a row.
    pub async fn create(&self, owner_id: i32, borrowing: &CreateBorrowing) -> AppResult<Borrowing> {
        let mut tx = self.pool.begin().await?;

        let book_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE id = $1)")
                .bind(borrowing.book_id)
                .fetch_one(&mut *tx)
                .await?;

        if !book_exists {
            return Err(AppError::NotFound(format!(
                "Book with id {} not found",
                borrowing.book_id
            )));
        }

        let reserved =
            sqlx::query("UPDATE books SET inventory = inventory - 1 WHERE id = $1 AND inventory > 0")
                .bind(borrowing.book_id)
                .execute(&mut *tx)
                .await?;

        if reserved.rows_affected() == 0 {
            return Err(AppError::Validation(
                "Inventory must be greater than 0.".to_string(),
            ));
        }

        let created = sqlx::query_as::<_, Borrowing>(
            r#"
            INSERT INTO borrowings (borrow_date, expected_return_date, book_id, user_id)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(borrowing.borrow_date)
        .bind(borrowing.expected_return_date)
        .bind(borrowing.book_id)
        .bind(owner_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(created)
    }

    /// Mark a borrowing as returned and release its inventory unit.
    ///
    /// The row lock makes a double return race resolve to exactly one
    /// success; the loser sees the already-set return date.
    pub async fn mark_returned(&self, id: i32, returned_on: NaiveDate) -> AppResult<Borrowing> {
        let mut tx = self.pool.begin().await?;

        let borrowing =
            sqlx::query_as::<_, Borrowing>("SELECT * FROM borrowings WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Borrowing with id {} not found", id)))?;

        if borrowing.actual_return_date.is_some() {
            return Err(AppError::Validation(
                "This book has already been returned.".to_string(),
            ));
        }

        let returned = sqlx::query_as::<_, Borrowing>(
            "UPDATE borrowings SET actual_return_date = $1 WHERE id = $2 RETURNING *",
        )
        .bind(returned_on)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE books SET inventory = inventory + 1 WHERE id = $1")
            .bind(borrowing.book_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(returned)
    }
}
