use std::sync::Arc;

use log::info;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::ports::{OrderRepository, ReviewRepository};
use crate::domain::review::{Review, ReviewInput};

pub struct ReviewService {
    reviews: Arc<dyn ReviewRepository>,
    orders: Arc<dyn OrderRepository>,
}

impl ReviewService {
    pub fn new(reviews: Arc<dyn ReviewRepository>, orders: Arc<dyn OrderRepository>) -> Self {
        Self { reviews, orders }
    }

    /// Create or replace `user_id`'s review of a product. The review is a verified
    /// purchase when the user has a paid order containing the product.
    pub fn create_or_update(&self, user_id: Uuid, input: ReviewInput) -> Result<Review, DomainError> {
        input.validate()?;
        let verified = self.orders.has_paid_purchase(user_id, input.product_id)?;
        let review = self.reviews.upsert(user_id, &input, verified)?;
        info!("Review {} saved for product {}", review.id, review.product_id);
        Ok(review)
    }

    pub fn list_for_product(&self, product_id: Uuid) -> Result<Vec<Review>, DomainError> {
        self.reviews.list_for_product(product_id)
    }

    pub fn mine(&self, user_id: Uuid, product_id: Uuid) -> Result<Option<Review>, DomainError> {
        self.reviews.find_for_user(user_id, product_id)
    }
}
