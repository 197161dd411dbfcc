use std::sync::Arc;

use log::info;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::page::{Page, PageRequest};
use crate::domain::ports::ProductRepository;
use crate::domain::product::{CategoryCount, Product, ProductFilter, ProductInput};

/// Number of products in the featured carousel.
pub const FEATURED_LIMIT: i64 = 4;

pub struct CatalogService {
    products: Arc<dyn ProductRepository>,
    latest_limit: i64,
    page_size: i64,
}

impl CatalogService {
    pub fn new(products: Arc<dyn ProductRepository>, latest_limit: i64, page_size: i64) -> Self {
        Self {
            products,
            latest_limit,
            page_size,
        }
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    pub fn latest(&self) -> Result<Vec<Product>, DomainError> {
        self.products.latest(self.latest_limit)
    }

    pub fn featured(&self) -> Result<Vec<Product>, DomainError> {
        self.products.featured(FEATURED_LIMIT)
    }

    pub fn by_slug(&self, slug: &str) -> Result<Product, DomainError> {
        self.products
            .find_by_slug(slug)?
            .ok_or(DomainError::NotFound("Product"))
    }

    pub fn by_id(&self, id: Uuid) -> Result<Product, DomainError> {
        self.products
            .find_by_id(id)?
            .ok_or(DomainError::NotFound("Product"))
    }

    pub fn search(
        &self,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> Result<Page<Product>, DomainError> {
        let list = self.products.search(filter, page)?;
        Ok(Page::from_list(list, page))
    }

    pub fn categories(&self) -> Result<Vec<CategoryCount>, DomainError> {
        self.products.categories()
    }

    pub fn create(&self, input: ProductInput) -> Result<Product, DomainError> {
        input.validate()?;
        let product = self.products.create(input)?;
        info!("Created product {} ({})", product.id, product.slug);
        Ok(product)
    }

    pub fn update(&self, id: Uuid, input: ProductInput) -> Result<Product, DomainError> {
        input.validate()?;
        let product = self.products.update(id, input)?;
        info!("Updated product {}", id);
        Ok(product)
    }

    pub fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        self.products.delete(id)?;
        info!("Deleted product {}", id);
        Ok(())
    }
}
