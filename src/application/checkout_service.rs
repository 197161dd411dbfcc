use std::sync::Arc;

use log::info;
use uuid::Uuid;

use crate::domain::cart::CartIdentity;
use crate::domain::errors::DomainError;
use crate::domain::order::NewOrder;
use crate::domain::ports::{CartRepository, OrderRepository, UserRepository};
use crate::domain::user::{ShippingAddress, User};

/// Result of trying to place an order: either an order, or the step the shopper must finish first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    Placed { order_id: Uuid },
    Incomplete {
        message: &'static str,
        redirect_to: &'static str,
    },
}

impl Placement {
    pub fn redirect_to(&self) -> String {
        match self {
            Placement::Placed { order_id } => format!("/order/{order_id}"),
            Placement::Incomplete { redirect_to, .. } => redirect_to.to_string(),
        }
    }
}

pub struct CheckoutService {
    users: Arc<dyn UserRepository>,
    carts: Arc<dyn CartRepository>,
    orders: Arc<dyn OrderRepository>,
    payment_methods: Vec<String>,
}

impl CheckoutService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        carts: Arc<dyn CartRepository>,
        orders: Arc<dyn OrderRepository>,
        payment_methods: Vec<String>,
    ) -> Self {
        Self {
            users,
            carts,
            orders,
            payment_methods,
        }
    }

    pub fn payment_methods(&self) -> &[String] {
        &self.payment_methods
    }

    pub fn update_address(
        &self,
        user_id: Uuid,
        address: ShippingAddress,
    ) -> Result<User, DomainError> {
        address.validate()?;
        self.users.update_address(user_id, &address)
    }

    pub fn update_payment_method(&self, user_id: Uuid, method: &str) -> Result<User, DomainError> {
        if !self.payment_methods.iter().any(|m| m == method) {
            return Err(DomainError::InvalidInput(format!(
                "Payment method must be one of: {}",
                self.payment_methods.join(", ")
            )));
        }
        self.users.update_payment_method(user_id, method)
    }

    /// Turn the user's cart into an order.
    pub fn place_order(&self, user_id: Uuid) -> Result<Placement, DomainError> {
        let user = self
            .users
            .find_by_id(user_id)?
            .ok_or(DomainError::NotFound("User"))?;
        let cart = self.carts.find(&CartIdentity {
            session_cart_id: String::new(),
            user_id: Some(user_id),
        })?;

        let Some(cart) = cart.filter(|c| !c.items.is_empty()) else {
            return Ok(Placement::Incomplete {
                message: "Your cart is empty",
                redirect_to: "/cart",
            });
        };
        let Some(shipping_address) = user.address else {
            return Ok(Placement::Incomplete {
                message: "No shipping address found",
                redirect_to: "/shipping-address",
            });
        };
        let Some(payment_method) = user.payment_method else {
            return Ok(Placement::Incomplete {
                message: "No payment method found",
                redirect_to: "/payment-method",
            });
        };

        let placed = self.orders.create_from_cart(NewOrder {
            user_id,
            cart_id: cart.id,
            shipping_address,
            payment_method,
        })?;
        // Another checkout emptied the cart after it was read above.
        let Some(order_id) = placed else {
            return Ok(Placement::Incomplete {
                message: "Your cart is empty",
                redirect_to: "/cart",
            });
        };

        info!("Order {} placed by user {}", order_id, user_id);
        Ok(Placement::Placed { order_id })
    }
}
