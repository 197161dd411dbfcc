use std::sync::Arc;

use log::info;
use uuid::Uuid;

use crate::domain::cart::{add_item, remove_item, Cart, CartChange, CartIdentity};
use crate::domain::errors::DomainError;
use crate::domain::ports::{CartRepository, ProductRepository};
use crate::domain::pricing::calculate_cart_prices;
use crate::domain::product::Product;

pub struct CartService {
    carts: Arc<dyn CartRepository>,
    products: Arc<dyn ProductRepository>,
}

impl CartService {
    pub fn new(carts: Arc<dyn CartRepository>, products: Arc<dyn ProductRepository>) -> Self {
        Self { carts, products }
    }

    pub fn get(&self, identity: &CartIdentity) -> Result<Option<Cart>, DomainError> {
        self.carts.find(identity)
    }

    fn product(&self, product_id: Uuid) -> Result<Product, DomainError> {
        self.products
            .find_by_id(product_id)?
            .ok_or(DomainError::NotFound("Product"))
    }

    /// Add one unit of a product, creating the cart on first use.
    pub fn add(
        &self,
        identity: &CartIdentity,
        product_id: Uuid,
    ) -> Result<(Cart, CartChange, Product), DomainError> {
        let product = self.product(product_id)?;

        match self.carts.find(identity)? {
            None => {
                let mut items = Vec::new();
                let change = add_item(&mut items, &product)?;
                let cart = self
                    .carts
                    .create(identity, &items, &calculate_cart_prices(&items))?;
                Ok((cart, change, product))
            }
            Some(mut cart) => {
                let change = add_item(&mut cart.items, &product)?;
                cart.prices = calculate_cart_prices(&cart.items);
                self.carts.save(cart.id, &cart.items, &cart.prices)?;
                Ok((cart, change, product))
            }
        }
    }

    /// Take one unit of a product out of the cart.
    pub fn remove(
        &self,
        identity: &CartIdentity,
        product_id: Uuid,
    ) -> Result<(Cart, CartChange, Product), DomainError> {
        let product = self.product(product_id)?;
        let mut cart = self
            .carts
            .find(identity)?
            .ok_or(DomainError::NotFound("Cart"))?;

        let change = remove_item(&mut cart.items, product_id)?;
        cart.prices = calculate_cart_prices(&cart.items);
        self.carts.save(cart.id, &cart.items, &cart.prices)?;
        Ok((cart, change, product))
    }

    /// Hand the anonymous session cart over to a user who just signed in.
    pub fn merge(&self, session_cart_id: &str, user_id: Uuid) -> Result<bool, DomainError> {
        let merged = self.carts.assign_to_user(session_cart_id, user_id)?;
        if merged {
            info!("Merged session cart {} into user {}", session_cart_id, user_id);
        }
        Ok(merged)
    }
}

/// Human-readable outcome of a cart change.
pub fn change_message(change: CartChange, product: &Product) -> String {
    match change {
        CartChange::Added => format!("{} added to cart", product.name),
        CartChange::Incremented => format!("{} updated in cart", product.name),
        CartChange::Decremented | CartChange::Removed => {
            format!("{} was removed from cart", product.name)
        }
    }
}
