//! Review repository.
//!
//! Reviews and review likes are keyed by client IP. Appending a review and
//! toggling a like each run in one transaction together with the aggregate
//! they affect (product rating/count, review like count).

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};

use orchard_core::models::{NewReview, Review, ReviewLikeResult, ReviewPage, ReviewPageRequest, ReviewSort};
use orchard_core::{ProductId, ReviewId};

use super::RepositoryError;

const REVIEW_COLUMNS: &str = "id, product_id, user_name, rating, comment, likes, created_at";

#[derive(Debug, sqlx::FromRow)]
struct ReviewRow {
    id: ReviewId,
    product_id: ProductId,
    user_name: String,
    rating: i16,
    comment: String,
    likes: i32,
    created_at: DateTime<Utc>,
}

impl TryFrom<ReviewRow> for Review {
    type Error = RepositoryError;

    fn try_from(row: ReviewRow) -> Result<Self, Self::Error> {
        let rating = u8::try_from(row.rating).map_err(|_| {
            RepositoryError::DataCorruption(format!("review {} has rating {}", row.id, row.rating))
        })?;

        Ok(Self {
            id: row.id,
            product_id: row.product_id,
            user_name: row.user_name,
            rating,
            comment: row.comment,
            likes: row.likes,
            created_at: row.created_at,
        })
    }
}

const fn order_clause(sort: ReviewSort) -> &'static str {
    match sort {
        ReviewSort::Newest => "created_at DESC, id DESC",
        ReviewSort::Oldest => "created_at ASC, id ASC",
        ReviewSort::Highest => "rating DESC, created_at DESC",
        ReviewSort::Lowest => "rating ASC, created_at DESC",
        ReviewSort::MostLiked => "likes DESC, created_at DESC",
    }
}

/// Repository for review database operations.
pub struct ReviewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepository<'a> {
    /// Create a new review repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All reviews of a product, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_product(&self, product_id: ProductId) -> Result<Vec<Review>, RepositoryError> {
        let rows = sqlx::query_as::<_, ReviewRow>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM product_review WHERE product_id = $1 \
             ORDER BY {}",
            order_clause(ReviewSort::Newest)
        ))
        .bind(product_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// One page of a product's reviews.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn page(
        &self,
        product_id: ProductId,
        request: &ReviewPageRequest,
    ) -> Result<ReviewPage, RepositoryError> {
        let rows = sqlx::query_as::<_, ReviewRow>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM product_review WHERE product_id = $1 \
             ORDER BY {} LIMIT $2 OFFSET $3",
            order_clause(request.sort)
        ))
        .bind(product_id)
        .bind(request.limit)
        .bind(request.offset())
        .fetch_all(self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM product_review WHERE product_id = $1")
            .bind(product_id)
            .fetch_one(self.pool)
            .await?;

        let reviews = rows
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ReviewPage::new(reviews, total, request.offset()))
    }

    /// Whether `client_ip` has already reviewed the product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn has_reviewed(&self, product_id: ProductId, client_ip: &str) -> Result<bool, RepositoryError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM product_review WHERE product_id = $1 AND client_ip = $2)",
        )
        .bind(product_id)
        .bind(client_ip)
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }

    /// Append a review and recompute the product's rating and review count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    /// Returns `RepositoryError::Conflict` if `client_ip` already reviewed it.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        product_id: ProductId,
        client_ip: &str,
        review: &NewReview,
    ) -> Result<Review, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        lock_product(&mut tx, product_id).await?;

        let row = sqlx::query_as::<_, ReviewRow>(&format!(
            r"
            INSERT INTO product_review (product_id, user_name, rating, comment, client_ip)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {REVIEW_COLUMNS}
            "
        ))
        .bind(product_id)
        .bind(review.user_name.trim())
        .bind(i16::from(review.rating))
        .bind(review.comment.trim())
        .bind(client_ip)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "already reviewed"))?;

        sqlx::query(
            r"
            UPDATE product
            SET rating = agg.rating, num_reviews = agg.num_reviews, updated_at = NOW()
            FROM (
                SELECT COALESCE(AVG(rating), 0)::DOUBLE PRECISION AS rating,
                       COUNT(*)::INTEGER AS num_reviews
                FROM product_review
                WHERE product_id = $1
            ) AS agg
            WHERE product.id = $1
            ",
        )
        .bind(product_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        row.try_into()
    }

    /// Toggle `client_ip`'s like on a review.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the review does not exist.
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn toggle_like(
        &self,
        review_id: ReviewId,
        client_ip: &str,
    ) -> Result<ReviewLikeResult, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let exists: Option<i32> =
            sqlx::query_scalar("SELECT id FROM product_review WHERE id = $1 FOR UPDATE")
                .bind(review_id)
                .fetch_optional(&mut *tx)
                .await?;
        if exists.is_none() {
            return Err(RepositoryError::NotFound);
        }

        let removed = sqlx::query("DELETE FROM review_like WHERE review_id = $1 AND client_ip = $2")
            .bind(review_id)
            .bind(client_ip)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if removed == 0 {
            sqlx::query("INSERT INTO review_like (review_id, client_ip) VALUES ($1, $2)")
                .bind(review_id)
                .bind(client_ip)
                .execute(&mut *tx)
                .await?;
        }

        let row = sqlx::query_as::<_, ReviewRow>(&format!(
            r"
            UPDATE product_review
            SET likes = (SELECT COUNT(*)::INTEGER FROM review_like WHERE review_id = $1)
            WHERE id = $1
            RETURNING {REVIEW_COLUMNS}
            "
        ))
        .bind(review_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(ReviewLikeResult {
            review: row.try_into()?,
            has_liked: removed == 0,
        })
    }
}

async fn lock_product(
    tx: &mut Transaction<'_, Postgres>,
    product_id: ProductId,
) -> Result<(), RepositoryError> {
    let found: Option<i32> = sqlx::query_scalar("SELECT id FROM product WHERE id = $1 FOR UPDATE")
        .bind(product_id)
        .fetch_optional(&mut **tx)
        .await?;

    found.map(|_| ()).ok_or(RepositoryError::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_sort_orders_deterministically() {
        for sort in [
            ReviewSort::Newest,
            ReviewSort::Oldest,
            ReviewSort::Highest,
            ReviewSort::Lowest,
            ReviewSort::MostLiked,
        ] {
            assert!(order_clause(sort).contains(','), "{sort:?} needs a tiebreaker");
        }
    }
}
