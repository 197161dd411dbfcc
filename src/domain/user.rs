use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::errors::DomainError;
use super::validation::{is_valid_email, require_min_len};

/// Placeholder name given to accounts created without one.
pub const NO_NAME: &str = "NO_NAME";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(DomainError::InvalidInput(format!("Unknown role '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ShippingAddress {
    pub full_name: String,
    pub street_address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
}

impl ShippingAddress {
    pub fn validate(&self) -> Result<(), DomainError> {
        require_min_len("Name", &self.full_name, 3)?;
        require_min_len("Address", &self.street_address, 3)?;
        require_min_len("City", &self.city, 3)?;
        require_min_len("Postal code", &self.postal_code, 3)?;
        require_min_len("Country", &self.country, 3)
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub address: Option<ShippingAddress>,
    pub payment_method: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// A user row together with its stored password hash; never serialized.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

#[derive(Debug, Clone)]
pub struct SignUp {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl SignUp {
    pub fn validate(&self) -> Result<(), DomainError> {
        require_min_len("Name", &self.name, 3)?;
        if !is_valid_email(&self.email) {
            return Err(DomainError::InvalidInput("Invalid email address".to_string()));
        }
        if self.password.chars().count() < 6 {
            return Err(DomainError::InvalidInput(
                "Password must be at least 6 characters".to_string(),
            ));
        }
        if self.password != self.confirm_password {
            return Err(DomainError::InvalidInput("Passwords don't match".to_string()));
        }
        Ok(())
    }
}

/// Local part of an email, used to name accounts that were created nameless.
pub fn name_from_email(email: &str) -> String {
    email.split('@').next().unwrap_or(email).to_string()
}
