use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use log::{info, warn};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::cart_service::CartService;
use crate::domain::errors::DomainError;
use crate::domain::page::{Page, PageRequest};
use crate::domain::ports::{SessionRepository, UserRepository};
use crate::domain::user::{name_from_email, NewUser, Role, SignUp, User, NO_NAME};
use crate::domain::validation::require_min_len;

/// A freshly issued session. Only the SHA-256 of `token` is stored.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: User,
}

pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

fn new_token() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    sessions: Arc<dyn SessionRepository>,
    carts: Arc<CartService>,
    session_max_age: Duration,
    hash_cost: u32,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        sessions: Arc<dyn SessionRepository>,
        carts: Arc<CartService>,
        session_max_age_days: i64,
        hash_cost: u32,
    ) -> Self {
        Self {
            users,
            sessions,
            carts,
            session_max_age: Duration::days(session_max_age_days),
            hash_cost,
        }
    }

    pub fn sign_up(&self, form: SignUp) -> Result<User, DomainError> {
        form.validate()?;
        let password_hash = bcrypt::hash(&form.password, self.hash_cost)
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let user = self.users.create(NewUser {
            name: form.name,
            email: form.email.trim().to_lowercase(),
            password_hash,
            role: Role::User,
        })?;
        info!("User {} signed up", user.id);
        Ok(user)
    }

    /// Check credentials, open a session and adopt the visitor's session cart.
    pub fn sign_in(
        &self,
        email: &str,
        password: &str,
        session_cart_id: Option<&str>,
    ) -> Result<IssuedSession, DomainError> {
        let email = email.trim().to_lowercase();
        let credentials = self.users.find_credentials(&email)?;

        let Some(credentials) = credentials else {
            warn!("Sign-in attempt for unknown email");
            return Err(DomainError::Unauthorized);
        };
        let verified = match &credentials.password_hash {
            Some(hash) => bcrypt::verify(password, hash)
                .map_err(|e| DomainError::Internal(e.to_string()))?,
            None => false,
        };
        if !verified {
            warn!("Rejected password for user {}", credentials.user.id);
            return Err(DomainError::Unauthorized);
        }

        let mut user = credentials.user;
        if user.name == NO_NAME {
            user = self.users.update_name(user.id, &name_from_email(&user.email))?;
        }

        let token = new_token();
        let expires_at = Utc::now() + self.session_max_age;
        self.sessions.create(&hash_token(&token), user.id, expires_at)?;

        if let Some(session_cart_id) = session_cart_id {
            self.carts.merge(session_cart_id, user.id)?;
        }

        info!("User {} signed in", user.id);
        Ok(IssuedSession {
            token,
            expires_at,
            user,
        })
    }

    pub fn sign_out(&self, token: &str) -> Result<(), DomainError> {
        self.sessions.delete(&hash_token(token))
    }

    /// The user behind a session token, if the session is still valid.
    pub fn authenticate(&self, token: &str) -> Result<Option<User>, DomainError> {
        self.sessions.find_user(&hash_token(token), Utc::now())
    }

    pub fn user(&self, id: Uuid) -> Result<User, DomainError> {
        self.users.find_by_id(id)?.ok_or(DomainError::NotFound("User"))
    }

    pub fn update_profile(&self, id: Uuid, name: &str) -> Result<User, DomainError> {
        require_min_len("Name", name, 3)?;
        self.users.update_name(id, name.trim())
    }

    pub fn list_users(&self, query: Option<&str>, page: PageRequest) -> Result<Page<User>, DomainError> {
        let query = query.map(str::trim).filter(|q| !q.is_empty() && *q != "all");
        let list = self.users.list(query, page)?;
        Ok(Page::from_list(list, page))
    }

    pub fn update_user(&self, id: Uuid, name: &str, role: Role) -> Result<User, DomainError> {
        require_min_len("Name", name, 3)?;
        let user = self.users.update_name_and_role(id, name.trim(), role)?;
        info!("User {} updated with role {}", id, role);
        Ok(user)
    }

    pub fn delete_user(&self, id: Uuid) -> Result<(), DomainError> {
        self.users.delete(id)?;
        info!("User {} deleted", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::Store;
    use crate::domain::cart::CartIdentity;
    use crate::domain::ports::CartRepository;
    use crate::domain::pricing::CartPrices;

    fn service(store: &Store) -> AuthService {
        let carts = Arc::new(CartService::new(store.carts.clone(), store.products.clone()));
        AuthService::new(
            store.users.clone(),
            store.sessions.clone(),
            carts,
            30,
            4,
        )
    }

    fn form(name: &str, email: &str) -> SignUp {
        SignUp {
            name: name.to_string(),
            email: email.to_string(),
            password: "secret123".to_string(),
            confirm_password: "secret123".to_string(),
        }
    }

    #[test]
    fn token_hash_is_sha256_hex() {
        assert_eq!(
            hash_token("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn sign_up_then_sign_in_issues_working_session() {
        let store = Store::new();
        let svc = service(&store);

        let user = svc.sign_up(form("Jane Doe", "Jane@Example.com")).unwrap();
        assert_eq!(user.email, "jane@example.com");
        assert_eq!(user.role, Role::User);

        let session = svc.sign_in("jane@example.com", "secret123", None).unwrap();
        assert_eq!(session.user.id, user.id);
        assert_eq!(svc.authenticate(&session.token).unwrap().map(|u| u.id), Some(user.id));

        svc.sign_out(&session.token).unwrap();
        assert!(svc.authenticate(&session.token).unwrap().is_none());
    }

    #[test]
    fn wrong_password_is_unauthorized() {
        let store = Store::new();
        let svc = service(&store);
        svc.sign_up(form("Jane Doe", "jane@example.com")).unwrap();

        assert!(matches!(
            svc.sign_in("jane@example.com", "nope-nope", None),
            Err(DomainError::Unauthorized)
        ));
        assert!(matches!(
            svc.sign_in("ghost@example.com", "secret123", None),
            Err(DomainError::Unauthorized)
        ));
    }

    #[test]
    fn duplicate_sign_up_conflicts() {
        let store = Store::new();
        let svc = service(&store);
        svc.sign_up(form("Jane Doe", "jane@example.com")).unwrap();

        assert!(matches!(
            svc.sign_up(form("Jane Again", "jane@example.com")),
            Err(DomainError::Conflict(_))
        ));
    }

    #[test]
    fn nameless_account_is_named_after_email() {
        let store = Store::new();
        let svc = service(&store);
        svc.sign_up(form(NO_NAME, "jane@example.com")).unwrap();

        let session = svc.sign_in("jane@example.com", "secret123", None).unwrap();

        assert_eq!(session.user.name, "jane");
    }

    #[test]
    fn sign_in_adopts_session_cart() {
        let store = Store::new();
        let svc = service(&store);
        let user = svc.sign_up(form("Jane Doe", "jane@example.com")).unwrap();
        store
            .carts
            .create(
                &CartIdentity {
                    session_cart_id: "guest-cart".to_string(),
                    user_id: None,
                },
                &[],
                &CartPrices::zero(),
            )
            .unwrap();

        svc.sign_in("jane@example.com", "secret123", Some("guest-cart")).unwrap();

        let cart = store
            .carts
            .find(&CartIdentity {
                session_cart_id: String::new(),
                user_id: Some(user.id),
            })
            .unwrap();
        assert!(cart.is_some());
    }

    #[test]
    fn admin_can_promote_and_filter_users() {
        let store = Store::new();
        let svc = service(&store);
        let jane = svc.sign_up(form("Jane Doe", "jane@example.com")).unwrap();
        svc.sign_up(form("John Roe", "john@example.com")).unwrap();

        let promoted = svc.update_user(jane.id, "Jane Admin", Role::Admin).unwrap();
        assert!(promoted.is_admin());

        let page = svc.list_users(Some("admin"), PageRequest::new(None, None, 10)).unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(svc.list_users(Some("all"), PageRequest::new(None, None, 10)).unwrap().total, 2);

        svc.delete_user(jane.id).unwrap();
        assert!(matches!(svc.user(jane.id), Err(DomainError::NotFound("User"))));
    }
}
