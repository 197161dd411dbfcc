pub mod auth_service;
pub mod cart_service;
pub mod catalog_service;
pub mod checkout_service;
pub mod order_service;
pub mod payment_service;
pub mod review_service;

#[cfg(test)]
pub(crate) mod testing;
