pub mod auth_service;
pub mod authz;
pub mod employee_service;
pub mod ledger_service;
pub mod order_service;
pub mod product_service;
pub mod purchase_service;
pub mod system_service;
