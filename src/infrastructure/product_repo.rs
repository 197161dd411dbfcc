use diesel::dsl::count_star;
use diesel::pg::Pg;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::page::{ListResult, PageRequest};
use crate::domain::ports::ProductRepository;
use crate::domain::product::{CategoryCount, Product, ProductFilter, ProductInput, ProductSort};
use crate::schema::products;

use super::contains_pattern;
use super::models::{NewProductRow, ProductChangeset, ProductRow};

pub struct DieselProductRepository {
    pool: DbPool,
}

impl DieselProductRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl From<ProductInput> for ProductChangeset {
    fn from(input: ProductInput) -> Self {
        ProductChangeset {
            name: input.name,
            slug: input.slug,
            category: input.category,
            images: input.images,
            brand: input.brand,
            description: input.description,
            stock: input.stock,
            price: input.price,
            is_featured: input.is_featured,
            banner: input.banner,
        }
    }
}

fn filtered(filter: &ProductFilter) -> products::BoxedQuery<'static, Pg> {
    let mut query = products::table.into_boxed();

    if let Some(q) = &filter.query {
        query = query.filter(products::name.ilike(contains_pattern(q)));
    }
    if let Some(category) = &filter.category {
        query = query.filter(products::category.eq(category.clone()));
    }
    if let Some((min, max)) = &filter.price_range {
        query = query
            .filter(products::price.ge(min.clone()))
            .filter(products::price.le(max.clone()));
    }
    if let Some(rating) = &filter.min_rating {
        query = query.filter(products::rating.ge(rating.clone()));
    }
    query
}

impl ProductRepository for DieselProductRepository {
    fn latest(&self, limit: i64) -> Result<Vec<Product>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = products::table
            .select(ProductRow::as_select())
            .order(products::created_at.desc())
            .limit(limit)
            .load(&mut conn)?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    fn featured(&self, limit: i64) -> Result<Vec<Product>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = products::table
            .filter(products::is_featured.eq(true))
            .select(ProductRow::as_select())
            .order(products::created_at.desc())
            .limit(limit)
            .load(&mut conn)?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = products::table
            .find(id)
            .select(ProductRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(Product::from))
    }

    fn find_by_slug(&self, slug: &str) -> Result<Option<Product>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = products::table
            .filter(products::slug.eq(slug))
            .select(ProductRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(Product::from))
    }

    fn search(
        &self,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> Result<ListResult<Product>, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let total: i64 = filtered(filter).count().get_result(conn)?;

            let query = filtered(filter).select(ProductRow::as_select());
            let query = match filter.sort {
                ProductSort::Newest => query.order(products::created_at.desc()),
                ProductSort::Lowest => query.order(products::price.asc()),
                ProductSort::Highest => query.order(products::price.desc()),
                ProductSort::Rating => query.order(products::rating.desc()),
            };
            let rows = query
                .limit(page.limit)
                .offset(page.offset())
                .load(conn)?;

            Ok(ListResult {
                items: rows.into_iter().map(Product::from).collect(),
                total,
            })
        })
    }

    fn categories(&self) -> Result<Vec<CategoryCount>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows: Vec<(String, i64)> = products::table
            .group_by(products::category)
            .select((products::category, count_star()))
            .order(products::category.asc())
            .load(&mut conn)?;
        Ok(rows
            .into_iter()
            .map(|(category, count)| CategoryCount { category, count })
            .collect())
    }

    fn create(&self, input: ProductInput) -> Result<Product, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::insert_into(products::table)
            .values(&NewProductRow {
                id: Uuid::new_v4(),
                fields: input.into(),
            })
            .returning(ProductRow::as_returning())
            .get_result(&mut conn)?;
        Ok(row.into())
    }

    fn update(&self, id: Uuid, input: ProductInput) -> Result<Product, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::update(products::table.find(id))
            .set(&ProductChangeset::from(input))
            .returning(ProductRow::as_returning())
            .get_result(&mut conn)
            .optional()?;
        row.map(Product::from).ok_or(DomainError::NotFound("Product"))
    }

    fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;
        let deleted = diesel::delete(products::table.find(id)).execute(&mut conn)?;
        if deleted == 0 {
            return Err(DomainError::NotFound("Product"));
        }
        Ok(())
    }
}
