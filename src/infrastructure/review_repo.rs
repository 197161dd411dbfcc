use bigdecimal::BigDecimal;
use chrono::Utc;
use diesel::dsl::{avg, count_star};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::upsert::excluded;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::ports::ReviewRepository;
use crate::domain::pricing::money;
use crate::domain::review::{Review, ReviewInput};
use crate::schema::{products, reviews, users};

use super::models::{NewReviewRow, ReviewRow};

pub struct DieselReviewRepository {
    pool: DbPool,
}

impl DieselReviewRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Recompute `rating` and `num_reviews` on the product from its reviews.
fn refresh_product_rating(conn: &mut PgConnection, product_id: Uuid) -> Result<(), DomainError> {
    let (average, count): (Option<BigDecimal>, i64) = reviews::table
        .filter(reviews::product_id.eq(product_id))
        .select((avg(reviews::rating), count_star()))
        .first(conn)?;

    let rating = money(average.unwrap_or_default());
    let num_reviews = i32::try_from(count)
        .map_err(|_| DomainError::Internal("review count overflow".to_string()))?;

    let updated = diesel::update(products::table.find(product_id))
        .set((
            products::rating.eq(rating),
            products::num_reviews.eq(num_reviews),
        ))
        .execute(conn)?;
    if updated == 0 {
        return Err(DomainError::NotFound("Product"));
    }
    Ok(())
}

impl ReviewRepository for DieselReviewRepository {
    fn upsert(
        &self,
        user_id: Uuid,
        input: &ReviewInput,
        verified: bool,
    ) -> Result<Review, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let exists: bool = diesel::select(diesel::dsl::exists(
                products::table.find(input.product_id),
            ))
            .get_result(conn)?;
            if !exists {
                return Err(DomainError::NotFound("Product"));
            }

            let row = diesel::insert_into(reviews::table)
                .values(&NewReviewRow {
                    id: Uuid::new_v4(),
                    user_id,
                    product_id: input.product_id,
                    rating: input.rating,
                    title: input.title.clone(),
                    description: input.description.clone(),
                    is_verified_purchase: verified,
                })
                .on_conflict((reviews::user_id, reviews::product_id))
                .do_update()
                .set((
                    reviews::rating.eq(excluded(reviews::rating)),
                    reviews::title.eq(excluded(reviews::title)),
                    reviews::description.eq(excluded(reviews::description)),
                    reviews::is_verified_purchase.eq(excluded(reviews::is_verified_purchase)),
                    reviews::created_at.eq(Utc::now()),
                ))
                .returning(ReviewRow::as_returning())
                .get_result(conn)?;

            refresh_product_rating(conn, input.product_id)?;

            let author: String = users::table
                .find(user_id)
                .select(users::name)
                .first(conn)?;

            Ok(row.with_author(author))
        })
    }

    fn list_for_product(&self, product_id: Uuid) -> Result<Vec<Review>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows: Vec<(ReviewRow, String)> = reviews::table
            .inner_join(users::table)
            .filter(reviews::product_id.eq(product_id))
            .select((ReviewRow::as_select(), users::name))
            .order(reviews::created_at.desc())
            .load(&mut conn)?;
        Ok(rows
            .into_iter()
            .map(|(row, name)| row.with_author(name))
            .collect())
    }

    fn find_for_user(&self, user_id: Uuid, product_id: Uuid) -> Result<Option<Review>, DomainError> {
        let mut conn = self.pool.get()?;
        let row: Option<(ReviewRow, String)> = reviews::table
            .inner_join(users::table)
            .filter(reviews::user_id.eq(user_id))
            .filter(reviews::product_id.eq(product_id))
            .select((ReviewRow::as_select(), users::name))
            .first(&mut conn)
            .optional()?;
        Ok(row.map(|(row, name)| row.with_author(name)))
    }
}
