use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::page::{ListResult, PageRequest};
use crate::domain::ports::{SessionRepository, UserRepository};
use crate::domain::user::{NewUser, Role, ShippingAddress, User, UserCredentials};
use crate::schema::{sessions, users};

use super::contains_pattern;
use super::models::{to_json, NewSessionRow, NewUserRow, UserRow};

pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn updated(row: Option<UserRow>) -> Result<User, DomainError> {
    row.ok_or(DomainError::NotFound("User"))?.into_domain()
}

impl UserRepository for DieselUserRepository {
    fn create(&self, user: NewUser) -> Result<User, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::insert_into(users::table)
            .values(&NewUserRow {
                id: Uuid::new_v4(),
                name: user.name,
                email: user.email,
                password_hash: Some(user.password_hash),
                role: user.role.as_str().to_string(),
            })
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .map_err(|e| match DomainError::from(e) {
                DomainError::Conflict(_) => {
                    DomainError::Conflict("User already exists".to_string())
                }
                other => other,
            })?;
        row.into_domain()
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        let mut conn = self.pool.get()?;
        users::table
            .find(id)
            .select(UserRow::as_select())
            .first(&mut conn)
            .optional()?
            .map(UserRow::into_domain)
            .transpose()
    }

    fn find_credentials(&self, email: &str) -> Result<Option<UserCredentials>, DomainError> {
        let mut conn = self.pool.get()?;
        users::table
            .filter(users::email.eq(email))
            .select(UserRow::as_select())
            .first(&mut conn)
            .optional()?
            .map(UserRow::into_credentials)
            .transpose()
    }

    fn update_name(&self, id: Uuid, name: &str) -> Result<User, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::update(users::table.find(id))
            .set((users::name.eq(name), users::updated_at.eq(Utc::now())))
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .optional()?;
        updated(row)
    }

    fn update_address(&self, id: Uuid, address: &ShippingAddress) -> Result<User, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::update(users::table.find(id))
            .set((
                users::address.eq(Some(to_json(address)?)),
                users::updated_at.eq(Utc::now()),
            ))
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .optional()?;
        updated(row)
    }

    fn update_payment_method(&self, id: Uuid, method: &str) -> Result<User, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::update(users::table.find(id))
            .set((
                users::payment_method.eq(Some(method)),
                users::updated_at.eq(Utc::now()),
            ))
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .optional()?;
        updated(row)
    }

    fn update_name_and_role(&self, id: Uuid, name: &str, role: Role) -> Result<User, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::update(users::table.find(id))
            .set((
                users::name.eq(name),
                users::role.eq(role.as_str()),
                users::updated_at.eq(Utc::now()),
            ))
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .optional()?;
        updated(row)
    }

    fn list(&self, query: Option<&str>, page: PageRequest) -> Result<ListResult<User>, DomainError> {
        let mut conn = self.pool.get()?;
        let pattern = query.map(contains_pattern);

        conn.transaction::<_, DomainError, _>(|conn| {
            let mut count = users::table.into_boxed();
            let mut rows = users::table.select(UserRow::as_select()).into_boxed();
            if let Some(pattern) = &pattern {
                count = count.filter(users::name.ilike(pattern.clone()));
                rows = rows.filter(users::name.ilike(pattern.clone()));
            }

            let total: i64 = count.count().get_result(conn)?;
            let items = rows
                .order(users::created_at.desc())
                .limit(page.limit)
                .offset(page.offset())
                .load(conn)?
                .into_iter()
                .map(UserRow::into_domain)
                .collect::<Result<Vec<_>, _>>()?;

            Ok(ListResult { items, total })
        })
    }

    fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;
        let deleted = diesel::delete(users::table.find(id)).execute(&mut conn)?;
        if deleted == 0 {
            return Err(DomainError::NotFound("User"));
        }
        Ok(())
    }
}

pub struct DieselSessionRepository {
    pool: DbPool,
}

impl DieselSessionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl SessionRepository for DieselSessionRepository {
    fn create(
        &self,
        token_hash: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;
        diesel::insert_into(sessions::table)
            .values(&NewSessionRow {
                token_hash,
                user_id,
                expires_at,
            })
            .execute(&mut conn)?;
        Ok(())
    }

    fn find_user(&self, token_hash: &str, now: DateTime<Utc>) -> Result<Option<User>, DomainError> {
        let mut conn = self.pool.get()?;
        sessions::table
            .inner_join(users::table)
            .filter(sessions::token_hash.eq(token_hash))
            .filter(sessions::expires_at.gt(now))
            .select(UserRow::as_select())
            .first(&mut conn)
            .optional()?
            .map(UserRow::into_domain)
            .transpose()
    }

    fn delete(&self, token_hash: &str) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;
        diesel::delete(sessions::table.filter(sessions::token_hash.eq(token_hash)))
            .execute(&mut conn)?;
        Ok(())
    }
}
