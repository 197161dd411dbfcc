use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::cart::{Cart, CartIdentity, CartItem};
use crate::domain::errors::DomainError;
use crate::domain::ports::CartRepository;
use crate::domain::pricing::CartPrices;
use crate::schema::carts;

use super::models::{CartContents, CartRow, NewCartRow};

pub struct DieselCartRepository {
    pool: DbPool,
}

impl DieselCartRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl CartRepository for DieselCartRepository {
    fn find(&self, identity: &CartIdentity) -> Result<Option<Cart>, DomainError> {
        let mut conn = self.pool.get()?;

        let query = carts::table.select(CartRow::as_select()).into_boxed();
        let query = match identity.user_id {
            Some(user_id) => query.filter(carts::user_id.eq(user_id)),
            None => query.filter(carts::session_cart_id.eq(identity.session_cart_id.clone())),
        };

        query
            .order(carts::created_at.desc())
            .first(&mut conn)
            .optional()?
            .map(CartRow::into_domain)
            .transpose()
    }

    fn create(
        &self,
        identity: &CartIdentity,
        items: &[CartItem],
        prices: &CartPrices,
    ) -> Result<Cart, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::insert_into(carts::table)
            .values(&NewCartRow {
                id: Uuid::new_v4(),
                user_id: identity.user_id,
                session_cart_id: identity.session_cart_id.clone(),
                contents: CartContents::new(items, prices)?,
            })
            .returning(CartRow::as_returning())
            .get_result(&mut conn)?;
        row.into_domain()
    }

    fn save(&self, cart_id: Uuid, items: &[CartItem], prices: &CartPrices) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;
        let updated = diesel::update(carts::table.find(cart_id))
            .set(&CartContents::new(items, prices)?)
            .execute(&mut conn)?;
        if updated == 0 {
            return Err(DomainError::NotFound("Cart"));
        }
        Ok(())
    }

    fn assign_to_user(&self, session_cart_id: &str, user_id: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let session_cart: Option<Uuid> = carts::table
                .filter(carts::session_cart_id.eq(session_cart_id))
                .order(carts::created_at.desc())
                .select(carts::id)
                .first(conn)
                .optional()?;

            let Some(cart_id) = session_cart else {
                return Ok(false);
            };

            diesel::delete(
                carts::table
                    .filter(carts::user_id.eq(user_id))
                    .filter(carts::id.ne(cart_id)),
            )
            .execute(conn)?;

            diesel::update(carts::table.find(cart_id))
                .set(carts::user_id.eq(Some(user_id)))
                .execute(conn)?;

            Ok(true)
        })
    }
}
