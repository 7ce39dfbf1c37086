pub mod audit_repo;
pub mod employee_repo;
pub mod ledger_repo;
pub mod order_repo;
pub mod product_repo;
pub mod purchase_repo;
pub mod rbac_repo;
pub mod session_repo;
