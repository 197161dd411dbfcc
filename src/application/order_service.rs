use std::sync::Arc;

use log::info;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{Order, OrderSummary, PaymentResult};
use crate::domain::page::{Page, PageRequest};
use crate::domain::ports::OrderRepository;
use crate::domain::user::User;

pub struct OrderService {
    repo: Arc<dyn OrderRepository>,
}

impl OrderService {
    pub fn new(repo: Arc<dyn OrderRepository>) -> Self {
        Self { repo }
    }

    pub fn find(&self, id: Uuid) -> Result<Order, DomainError> {
        self.repo.find_by_id(id)?.ok_or(DomainError::NotFound("Order"))
    }

    /// An order as seen by `viewer`: only its owner or an admin may read it.
    pub fn get_for(&self, viewer: &User, id: Uuid) -> Result<Order, DomainError> {
        let order = self.find(id)?;
        if order.user_id != viewer.id && !viewer.is_admin() {
            return Err(DomainError::Forbidden);
        }
        Ok(order)
    }

    pub fn list_for_user(&self, user_id: Uuid, page: PageRequest) -> Result<Page<Order>, DomainError> {
        let list = self.repo.list_for_user(user_id, page)?;
        Ok(Page::from_list(list, page))
    }

    pub fn list_all(
        &self,
        customer_query: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<Order>, DomainError> {
        let query = customer_query.map(str::trim).filter(|q| !q.is_empty() && *q != "all");
        let list = self.repo.list_all(query, page)?;
        Ok(Page::from_list(list, page))
    }

    /// Flag the order paid and take its items out of stock.
    pub fn mark_paid(&self, id: Uuid, result: Option<PaymentResult>) -> Result<(), DomainError> {
        self.repo.mark_paid(id, result)?;
        info!("Order {} marked as paid", id);
        Ok(())
    }

    pub fn mark_delivered(&self, id: Uuid) -> Result<(), DomainError> {
        self.repo.mark_delivered(id)?;
        info!("Order {} marked as delivered", id);
        Ok(())
    }

    pub fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        self.repo.delete(id)?;
        info!("Order {} deleted", id);
        Ok(())
    }

    pub fn summary(&self) -> Result<OrderSummary, DomainError> {
        self.repo.summary()
    }
}
