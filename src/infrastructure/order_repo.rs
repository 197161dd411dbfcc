use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::dsl::{exists, sum};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::sql_types::{Numeric, Text};
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::order::{
    LatestSale, MonthlySales, NewOrder, Order, OrderCustomer, OrderSummary, PaymentResult,
};
use crate::domain::page::{ListResult, PageRequest};
use crate::domain::ports::OrderRepository;
use crate::domain::pricing::CartPrices;
use crate::schema::{carts, order_items, orders, products, users};

use super::contains_pattern;
use super::models::{to_json, CartContents, CartRow, NewOrderRow, OrderItemRow, OrderRow};

const LATEST_SALES_LIMIT: i64 = 6;

pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

type OrderWithCustomer = (OrderRow, (String, String));

/// Load the items of every order in one query and stitch them back together.
fn with_items(
    conn: &mut PgConnection,
    rows: Vec<OrderWithCustomer>,
) -> Result<Vec<Order>, DomainError> {
    let (orders, customers): (Vec<OrderRow>, Vec<(String, String)>) = rows.into_iter().unzip();

    let items = OrderItemRow::belonging_to(&orders)
        .select(OrderItemRow::as_select())
        .load(conn)?
        .grouped_by(&orders);

    orders
        .into_iter()
        .zip(items)
        .zip(customers)
        .map(|((order, items), (name, email))| {
            order.into_domain(items, OrderCustomer { name, email })
        })
        .collect()
}

fn lock_order(conn: &mut PgConnection, id: Uuid) -> Result<OrderRow, DomainError> {
    orders::table
        .find(id)
        .select(OrderRow::as_select())
        .for_update()
        .first(conn)
        .optional()?
        .ok_or(DomainError::NotFound("Order"))
}

#[derive(QueryableByName)]
struct MonthlySalesRow {
    #[diesel(sql_type = Text)]
    month: String,
    #[diesel(sql_type = Numeric)]
    total_sales: BigDecimal,
}

impl OrderRepository for DieselOrderRepository {
    fn create_from_cart(&self, order: NewOrder) -> Result<Option<Uuid>, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            // 1. Lock the cart and snapshot what is in it now
            let cart = carts::table
                .find(order.cart_id)
                .select(CartRow::as_select())
                .for_update()
                .first(conn)
                .optional()?
                .ok_or(DomainError::NotFound("Cart"))?
                .into_domain()?;
            if cart.items.is_empty() {
                return Ok(None);
            }

            // 2. Insert the order
            let order_id = Uuid::new_v4();
            diesel::insert_into(orders::table)
                .values(&NewOrderRow {
                    id: order_id,
                    user_id: order.user_id,
                    shipping_address: to_json(&order.shipping_address)?,
                    payment_method: order.payment_method.clone(),
                    items_price: cart.prices.items_price.clone(),
                    shipping_price: cart.prices.shipping_price.clone(),
                    tax_price: cart.prices.tax_price.clone(),
                    total_price: cart.prices.total_price.clone(),
                })
                .execute(conn)?;

            // 3. Copy the cart lines onto the order
            let lines: Vec<OrderItemRow> = cart
                .items
                .iter()
                .map(|item| OrderItemRow {
                    order_id,
                    product_id: item.product_id,
                    qty: item.qty,
                    price: item.price.clone(),
                    name: item.name.clone(),
                    slug: item.slug.clone(),
                    image: item.image.clone(),
                })
                .collect();
            diesel::insert_into(order_items::table)
                .values(&lines)
                .execute(conn)?;

            // 4. Empty the cart in the same transaction
            diesel::update(carts::table.find(cart.id))
                .set(&CartContents::new(&[], &CartPrices::zero())?)
                .execute(conn)?;

            Ok(Some(order_id))
        })
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        let row: Option<OrderWithCustomer> = orders::table
            .inner_join(users::table)
            .filter(orders::id.eq(id))
            .select((OrderRow::as_select(), (users::name, users::email)))
            .first(&mut conn)
            .optional()?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(with_items(&mut conn, vec![row])?.pop())
    }

    fn list_for_user(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<ListResult<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let total: i64 = orders::table
                .filter(orders::user_id.eq(user_id))
                .count()
                .get_result(conn)?;

            let rows: Vec<OrderWithCustomer> = orders::table
                .inner_join(users::table)
                .filter(orders::user_id.eq(user_id))
                .select((OrderRow::as_select(), (users::name, users::email)))
                .order(orders::created_at.desc())
                .limit(page.limit)
                .offset(page.offset())
                .load(conn)?;

            Ok(ListResult {
                items: with_items(conn, rows)?,
                total,
            })
        })
    }

    fn list_all(
        &self,
        customer_query: Option<&str>,
        page: PageRequest,
    ) -> Result<ListResult<Order>, DomainError> {
        let mut conn = self.pool.get()?;
        let pattern = customer_query.map(contains_pattern);

        conn.transaction::<_, DomainError, _>(|conn| {
            let mut count = orders::table.inner_join(users::table).into_boxed();
            let mut rows = orders::table
                .inner_join(users::table)
                .select((OrderRow::as_select(), (users::name, users::email)))
                .into_boxed();
            if let Some(pattern) = &pattern {
                count = count.filter(users::name.ilike(pattern.clone()));
                rows = rows.filter(users::name.ilike(pattern.clone()));
            }

            let total: i64 = count.count().get_result(conn)?;
            let rows: Vec<OrderWithCustomer> = rows
                .order(orders::created_at.desc())
                .limit(page.limit)
                .offset(page.offset())
                .load(conn)?;

            Ok(ListResult {
                items: with_items(conn, rows)?,
                total,
            })
        })
    }

    fn set_payment_result(&self, id: Uuid, result: &PaymentResult) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;
        let updated = diesel::update(orders::table.find(id))
            .set(orders::payment_result.eq(Some(to_json(result)?)))
            .execute(&mut conn)?;
        if updated == 0 {
            return Err(DomainError::NotFound("Order"));
        }
        Ok(())
    }

    fn mark_paid(&self, id: Uuid, result: Option<PaymentResult>) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let order = lock_order(conn, id)?;
            if order.is_paid {
                return Err(DomainError::Conflict("Order already paid".to_string()));
            }

            let items = OrderItemRow::belonging_to(&order)
                .select(OrderItemRow::as_select())
                .load(conn)?;
            for item in &items {
                diesel::update(products::table.find(item.product_id))
                    .set(products::stock.eq(products::stock - item.qty))
                    .execute(conn)?;
            }

            let payment_result = match result {
                Some(r) => Some(to_json(&r)?),
                None => order.payment_result,
            };
            diesel::update(orders::table.find(id))
                .set((
                    orders::is_paid.eq(true),
                    orders::paid_at.eq(Some(Utc::now())),
                    orders::payment_result.eq(payment_result),
                ))
                .execute(conn)?;

            Ok(())
        })
    }

    fn mark_delivered(&self, id: Uuid) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let order = lock_order(conn, id)?;
            if !order.is_paid {
                return Err(DomainError::InvalidInput("Order is not paid".to_string()));
            }

            diesel::update(orders::table.find(id))
                .set((
                    orders::is_delivered.eq(true),
                    orders::delivered_at.eq(Some(Utc::now())),
                ))
                .execute(conn)?;
            Ok(())
        })
    }

    fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;
        let deleted = diesel::delete(orders::table.find(id)).execute(&mut conn)?;
        if deleted == 0 {
            return Err(DomainError::NotFound("Order"));
        }
        Ok(())
    }

    fn has_paid_purchase(&self, user_id: Uuid, product_id: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let purchased = diesel::select(exists(
            order_items::table
                .inner_join(orders::table)
                .filter(orders::user_id.eq(user_id))
                .filter(orders::is_paid.eq(true))
                .filter(order_items::product_id.eq(product_id)),
        ))
        .get_result(&mut conn)?;
        Ok(purchased)
    }

    fn summary(&self) -> Result<OrderSummary, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let orders_count: i64 = orders::table.count().get_result(conn)?;
            let products_count: i64 = products::table.count().get_result(conn)?;
            let users_count: i64 = users::table.count().get_result(conn)?;

            let total_sales: Option<BigDecimal> = orders::table
                .select(sum(orders::total_price))
                .first(conn)?;

            let sales_data = diesel::sql_query(
                "SELECT to_char(created_at, 'MM/YY') AS month, SUM(total_price) AS total_sales \
                 FROM orders GROUP BY month ORDER BY MIN(created_at)",
            )
            .load::<MonthlySalesRow>(conn)?
            .into_iter()
            .map(|row| MonthlySales {
                month: row.month,
                total_sales: row.total_sales,
            })
            .collect();

            let latest: Vec<(Uuid, String, BigDecimal, DateTime<Utc>)> = orders::table
                .inner_join(users::table)
                .select((
                    orders::id,
                    users::name,
                    orders::total_price,
                    orders::created_at,
                ))
                .order(orders::created_at.desc())
                .limit(LATEST_SALES_LIMIT)
                .load(conn)?;

            Ok(OrderSummary {
                orders_count,
                products_count,
                users_count,
                total_sales: total_sales.unwrap_or_default(),
                sales_data,
                latest_sales: latest
                    .into_iter()
                    .map(|(id, customer, total_price, created_at)| LatestSale {
                        id,
                        customer,
                        total_price,
                        created_at,
                    })
                    .collect(),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use diesel::prelude::*;
    use uuid::Uuid;

    use super::DieselOrderRepository;
    use crate::db::DbPool;
    use crate::domain::cart::{CartIdentity, CartItem};
    use crate::domain::errors::DomainError;
    use crate::domain::order::{NewOrder, PaymentResult};
    use crate::domain::page::PageRequest;
    use crate::domain::ports::{CartRepository, OrderRepository, ProductRepository};
    use crate::domain::pricing::calculate_cart_prices;
    use crate::domain::product::Product;
    use crate::domain::user::{ShippingAddress, User};
    use crate::infrastructure::cart_repo::DieselCartRepository;
    use crate::infrastructure::product_repo::DieselProductRepository;
    use crate::infrastructure::test_db::{seed_product, seed_user, setup_db};
    use crate::schema::{order_items, orders};

    fn address() -> ShippingAddress {
        ShippingAddress {
            full_name: "Jane Doe".to_string(),
            street_address: "1 Main St".to_string(),
            city: "Anytown".to_string(),
            postal_code: "12345".to_string(),
            country: "USA".to_string(),
            lat: None,
            lng: None,
        }
    }

    /// A fresh cart for `user` holding `qty` of `product`.
    fn fill_cart(pool: &DbPool, user: &User, product: &Product, qty: i32) -> Uuid {
        let items = vec![CartItem::from_product(product, qty)];
        let prices = calculate_cart_prices(&items);
        DieselCartRepository::new(pool.clone())
            .create(
                &CartIdentity {
                    session_cart_id: Uuid::new_v4().to_string(),
                    user_id: Some(user.id),
                },
                &items,
                &prices,
            )
            .expect("cart")
            .id
    }

    fn checkout(user: &User, cart_id: Uuid) -> NewOrder {
        NewOrder {
            user_id: user.id,
            cart_id,
            shipping_address: address(),
            payment_method: "PayPal".to_string(),
        }
    }

    /// Put `qty` of `product` in a fresh cart for `user` and place the order.
    fn place_order(pool: &DbPool, user: &User, product: &Product, qty: i32) -> Uuid {
        let cart_id = fill_cart(pool, user, product, qty);
        DieselOrderRepository::new(pool.clone())
            .create_from_cart(checkout(user, cart_id))
            .expect("create failed")
            .expect("cart should not be empty")
    }

    fn row_counts(pool: &DbPool) -> (i64, i64) {
        let mut conn = pool.get().unwrap();
        let orders: i64 = orders::table.count().get_result(&mut conn).unwrap();
        let items: i64 = order_items::table.count().get_result(&mut conn).unwrap();
        (orders, items)
    }

    fn stock_of(pool: &DbPool, product: &Product) -> i32 {
        DieselProductRepository::new(pool.clone())
            .find_by_id(product.id)
            .unwrap()
            .unwrap()
            .stock
    }

    #[tokio::test]
    async fn create_copies_items_and_empties_cart() {
        let (_container, pool) = setup_db().await;
        let user = seed_user(&pool, "jane@example.com");
        let product = seed_product(&pool, "Polo Shirt", "30.00", 5);

        let order_id = place_order(&pool, &user, &product, 2);

        let order = DieselOrderRepository::new(pool.clone())
            .find_by_id(order_id)
            .expect("find failed")
            .expect("order should exist");
        assert_eq!(order.user.email, "jane@example.com");
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].qty, 2);
        assert_eq!(order.prices.total_price.to_string(), "79.00");
        assert!(!order.is_paid);

        let cart = DieselCartRepository::new(pool)
            .find(&CartIdentity {
                session_cart_id: String::new(),
                user_id: Some(user.id),
            })
            .unwrap()
            .expect("cart survives");
        assert!(cart.items.is_empty());
        assert_eq!(cart.prices.total_price.to_string(), "0.00");
    }

    #[tokio::test]
    async fn emptied_cart_places_no_second_order() {
        let (_container, pool) = setup_db().await;
        let user = seed_user(&pool, "jane@example.com");
        let product = seed_product(&pool, "Polo Shirt", "30.00", 5);
        let cart_id = fill_cart(&pool, &user, &product, 1);
        let repo = DieselOrderRepository::new(pool.clone());

        assert!(repo.create_from_cart(checkout(&user, cart_id)).unwrap().is_some());
        assert_eq!(repo.create_from_cart(checkout(&user, cart_id)).unwrap(), None);

        assert_eq!(row_counts(&pool), (1, 1));
    }

    #[tokio::test]
    async fn concurrent_checkouts_of_one_cart_make_one_order() {
        let (_container, pool) = setup_db().await;
        let user = seed_user(&pool, "jane@example.com");
        let product = seed_product(&pool, "Polo Shirt", "30.00", 5);
        let cart_id = fill_cart(&pool, &user, &product, 2);
        let repo = &DieselOrderRepository::new(pool.clone());
        let user = &user;

        let placed: Vec<Option<Uuid>> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| s.spawn(move || repo.create_from_cart(checkout(user, cart_id)).unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(placed.iter().filter(|p| p.is_some()).count(), 1);
        assert_eq!(row_counts(&pool), (1, 1));
    }

    #[tokio::test]
    async fn unknown_cart_leaves_no_rows() {
        let (_container, pool) = setup_db().await;
        let user = seed_user(&pool, "jane@example.com");
        let repo = DieselOrderRepository::new(pool.clone());

        assert!(matches!(
            repo.create_from_cart(checkout(&user, Uuid::new_v4())),
            Err(DomainError::NotFound("Cart"))
        ));
        assert_eq!(row_counts(&pool), (0, 0));
    }

    #[tokio::test]
    async fn failed_item_copy_rolls_back_the_order() {
        let (_container, pool) = setup_db().await;
        let user = seed_user(&pool, "jane@example.com");
        let mut ghost = seed_product(&pool, "Polo Shirt", "30.00", 5);
        // Order lines reference products, so a line for a missing product fails after the order row is in.
        ghost.id = Uuid::new_v4();
        let cart_id = fill_cart(&pool, &user, &ghost, 1);
        let repo = DieselOrderRepository::new(pool.clone());

        assert!(matches!(
            repo.create_from_cart(checkout(&user, cart_id)),
            Err(DomainError::Internal(_))
        ));
        assert_eq!(row_counts(&pool), (0, 0));

        let cart = DieselCartRepository::new(pool)
            .find(&CartIdentity {
                session_cart_id: String::new(),
                user_id: Some(user.id),
            })
            .unwrap()
            .unwrap();
        assert_eq!(cart.items.len(), 1);
    }

    #[tokio::test]
    async fn concurrent_payments_decrement_stock_once() {
        let (_container, pool) = setup_db().await;
        let user = seed_user(&pool, "jane@example.com");
        let product = seed_product(&pool, "Polo Shirt", "30.00", 5);
        let order_id = place_order(&pool, &user, &product, 2);
        let repo = &DieselOrderRepository::new(pool.clone());

        let outcomes: Vec<Result<(), DomainError>> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| s.spawn(move || repo.mark_paid(order_id, None)))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(outcomes
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, DomainError::Conflict(_))));
        assert_eq!(stock_of(&pool, &product), 3);
    }

    #[tokio::test]
    async fn mark_paid_decrements_stock_once() {
        let (_container, pool) = setup_db().await;
        let user = seed_user(&pool, "jane@example.com");
        let product = seed_product(&pool, "Polo Shirt", "30.00", 5);
        let order_id = place_order(&pool, &user, &product, 2);
        let repo = DieselOrderRepository::new(pool.clone());

        let result = PaymentResult {
            id: "PAY-1".to_string(),
            status: "COMPLETED".to_string(),
            email_address: "jane@example.com".to_string(),
            price_paid: "79.00".to_string(),
        };
        repo.mark_paid(order_id, Some(result.clone())).expect("mark paid");

        let again = repo.mark_paid(order_id, None).unwrap_err();
        assert!(matches!(again, DomainError::Conflict(m) if m == "Order already paid"));

        let order = repo.find_by_id(order_id).unwrap().unwrap();
        assert!(order.is_paid);
        assert!(order.paid_at.is_some());
        assert_eq!(order.payment_result, Some(result));

        assert_eq!(stock_of(&pool, &product), 3);
    }

    #[tokio::test]
    async fn delivery_requires_payment() {
        let (_container, pool) = setup_db().await;
        let user = seed_user(&pool, "jane@example.com");
        let product = seed_product(&pool, "Polo Shirt", "30.00", 5);
        let order_id = place_order(&pool, &user, &product, 1);
        let repo = DieselOrderRepository::new(pool);

        assert!(matches!(
            repo.mark_delivered(order_id),
            Err(DomainError::InvalidInput(_))
        ));

        repo.mark_paid(order_id, None).unwrap();
        repo.mark_delivered(order_id).unwrap();

        let order = repo.find_by_id(order_id).unwrap().unwrap();
        assert!(order.is_delivered);
        assert!(order.delivered_at.is_some());
    }

    #[tokio::test]
    async fn unknown_order_is_not_found() {
        let (_container, pool) = setup_db().await;
        let repo = DieselOrderRepository::new(pool);

        assert!(repo.find_by_id(Uuid::new_v4()).unwrap().is_none());
        assert!(matches!(
            repo.mark_paid(Uuid::new_v4(), None),
            Err(DomainError::NotFound("Order"))
        ));
        assert!(matches!(
            repo.delete(Uuid::new_v4()),
            Err(DomainError::NotFound("Order"))
        ));
    }

    #[tokio::test]
    async fn listings_paginate_and_filter() {
        let (_container, pool) = setup_db().await;
        let jane = seed_user(&pool, "jane@example.com");
        let john = seed_user(&pool, "john@example.com");
        let product = seed_product(&pool, "Polo Shirt", "30.00", 50);
        for _ in 0..3 {
            place_order(&pool, &jane, &product, 1);
        }
        place_order(&pool, &john, &product, 1);
        let repo = DieselOrderRepository::new(pool);

        let mine = repo.list_for_user(jane.id, PageRequest::new(Some(1), Some(2), 10)).unwrap();
        assert_eq!(mine.total, 3);
        assert_eq!(mine.items.len(), 2);
        assert!(mine.items.iter().all(|o| o.items.len() == 1));

        let all = repo.list_all(None, PageRequest::new(None, None, 10)).unwrap();
        assert_eq!(all.total, 4);
        assert!(all.items[0].created_at >= all.items[3].created_at);
    }

    #[tokio::test]
    async fn purchase_check_and_summary() {
        let (_container, pool) = setup_db().await;
        let user = seed_user(&pool, "jane@example.com");
        let product = seed_product(&pool, "Polo Shirt", "30.00", 5);
        let order_id = place_order(&pool, &user, &product, 1);
        let repo = DieselOrderRepository::new(pool);

        assert!(!repo.has_paid_purchase(user.id, product.id).unwrap());
        repo.mark_paid(order_id, None).unwrap();
        assert!(repo.has_paid_purchase(user.id, product.id).unwrap());

        let summary = repo.summary().unwrap();
        assert_eq!(summary.orders_count, 1);
        assert_eq!(summary.products_count, 1);
        assert_eq!(summary.users_count, 1);
        assert_eq!(summary.total_sales.to_string(), "44.50");
        assert_eq!(summary.sales_data.len(), 1);
        assert_eq!(summary.latest_sales[0].customer, "Jane Doe");
    }
}
