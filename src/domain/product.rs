use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::errors::DomainError;
use super::validation::require_min_len;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub category: String,
    pub images: Vec<String>,
    pub brand: String,
    pub description: String,
    pub stock: i32,
    #[schema(value_type = String, example = "59.99")]
    pub price: BigDecimal,
    #[schema(value_type = String, example = "4.50")]
    pub rating: BigDecimal,
    pub num_reviews: i32,
    pub is_featured: bool,
    pub banner: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Validated fields for creating or updating a product.
#[derive(Debug, Clone)]
pub struct ProductInput {
    pub name: String,
    pub slug: String,
    pub category: String,
    pub brand: String,
    pub description: String,
    pub stock: i32,
    pub images: Vec<String>,
    pub is_featured: bool,
    pub banner: Option<String>,
    pub price: BigDecimal,
}

impl ProductInput {
    pub fn validate(&self) -> Result<(), DomainError> {
        require_min_len("Name", &self.name, 3)?;
        require_min_len("Slug", &self.slug, 3)?;
        require_min_len("Category", &self.category, 3)?;
        require_min_len("Brand", &self.brand, 3)?;
        if self.images.is_empty() {
            return Err(DomainError::InvalidInput(
                "Product must have at least one image".to_string(),
            ));
        }
        if self.stock < 0 {
            return Err(DomainError::InvalidInput(
                "Stock must not be negative".to_string(),
            ));
        }
        if self.price < BigDecimal::from(0) || self.price.with_scale(2) != self.price {
            return Err(DomainError::InvalidInput(
                "Price must have two decimal places".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProductSort {
    #[default]
    Newest,
    Lowest,
    Highest,
    Rating,
}

impl ProductSort {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("lowest") => ProductSort::Lowest,
            Some("highest") => ProductSort::Highest,
            Some("rating") => ProductSort::Rating,
            _ => ProductSort::Newest,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub query: Option<String>,
    pub category: Option<String>,
    pub price_range: Option<(BigDecimal, BigDecimal)>,
    pub min_rating: Option<BigDecimal>,
    pub sort: ProductSort,
}

impl ProductFilter {
    /// Build a filter from raw query-string values. `all` and blanks mean "no filter".
    pub fn from_params(
        query: Option<&str>,
        category: Option<&str>,
        price: Option<&str>,
        rating: Option<&str>,
        sort: Option<&str>,
    ) -> Result<Self, DomainError> {
        let price_range = active(price).map(parse_price_range).transpose()?;
        let min_rating = active(rating)
            .map(|r| {
                BigDecimal::from_str(r)
                    .map_err(|_| DomainError::InvalidInput(format!("Invalid rating '{r}'")))
            })
            .transpose()?;

        Ok(Self {
            query: active(query).map(str::to_string),
            category: active(category).map(str::to_string),
            price_range,
            min_rating,
            sort: ProductSort::parse(sort),
        })
    }
}

fn active(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|v| !v.is_empty() && *v != "all")
}

/// Parse `"min-max"`, e.g. `"50-100"`.
pub fn parse_price_range(raw: &str) -> Result<(BigDecimal, BigDecimal), DomainError> {
    let invalid = || DomainError::InvalidInput(format!("Invalid price range '{raw}'"));
    let (min, max) = raw.split_once('-').ok_or_else(invalid)?;
    let min = BigDecimal::from_str(min.trim()).map_err(|_| invalid())?;
    let max = BigDecimal::from_str(max.trim()).map_err(|_| invalid())?;
    if min > max {
        return Err(invalid());
    }
    Ok((min, max))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CategoryCount {
    pub category: String,
    pub count: i64,
}
