pub mod cart;
pub mod errors;
pub mod order;
pub mod page;
pub mod ports;
pub mod pricing;
pub mod product;
pub mod review;
pub mod user;
pub mod validation;
