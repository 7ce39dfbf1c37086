pub mod auth;
pub mod employees;
pub mod orders;
pub mod products;
pub mod purchases;
pub mod system;
