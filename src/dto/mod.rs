pub mod auth;
pub mod cart;
pub mod catalog;
pub mod customers;
pub mod orders;
pub mod products;
