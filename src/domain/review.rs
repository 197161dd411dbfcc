use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::errors::DomainError;
use super::validation::require_min_len;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Review {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub rating: i32,
    pub title: String,
    pub description: String,
    pub is_verified_purchase: bool,
    pub created_at: DateTime<Utc>,
    /// Reviewer's display name.
    pub user_name: String,
}

#[derive(Debug, Clone)]
pub struct ReviewInput {
    pub product_id: Uuid,
    pub rating: i32,
    pub title: String,
    pub description: String,
}

impl ReviewInput {
    pub fn validate(&self) -> Result<(), DomainError> {
        require_min_len("Title", &self.title, 3)?;
        require_min_len("Description", &self.description, 3)?;
        if !(1..=5).contains(&self.rating) {
            return Err(DomainError::InvalidInput(
                "Rating must be between 1 and 5".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_must_be_one_to_five() {
        let mut input = ReviewInput {
            product_id: Uuid::new_v4(),
            rating: 5,
            title: "Great fit".to_string(),
            description: "Wore it all summer".to_string(),
        };
        assert!(input.validate().is_ok());
        input.rating = 0;
        assert!(input.validate().is_err());
        input.rating = 6;
        assert!(input.validate().is_err());
    }
}
