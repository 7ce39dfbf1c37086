pub mod audit;
pub mod employee;
pub mod inventory;
pub mod orders;
pub mod product;
pub mod purchase;
pub mod rbac;
pub mod session;
