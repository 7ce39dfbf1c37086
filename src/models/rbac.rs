// src/models/rbac.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Closed catalog of permission codes, namespaced `module.action`.
///
/// Modeled as a sum type so a typo in a required permission is a compile
/// error. The string form is what gets seeded into the `permission` table
/// and matched exactly during authorization; there are no wildcards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PermissionCode {
    // System
    ViewDashboard,
    ViewAuditLog,
    ViewSessions,

    // Employees and roles
    EmployeesView,
    EmployeesCreate,
    EmployeesEdit,
    EmployeesDelete,
    RolesManage,

    // Products and stock
    ProductsView,
    ProductsCreate,
    ProductsEdit,
    ProductsDelete,
    StockMovement,
    PriceChange,

    // Orders
    OrdersView,
    OrdersCreate,
    OrdersEdit,
    OrdersCancel,

    // Purchases
    PurchasesView,
    PurchasesCreate,

    // Customers and suppliers
    CustomersView,
    CustomersManage,
    SuppliersView,
    SuppliersManage,

    // Reports
    ReportsView,
    ReportsExport,
}

impl PermissionCode {
    pub const ALL: [PermissionCode; 26] = [
        PermissionCode::ViewDashboard,
        PermissionCode::ViewAuditLog,
        PermissionCode::ViewSessions,
        PermissionCode::EmployeesView,
        PermissionCode::EmployeesCreate,
        PermissionCode::EmployeesEdit,
        PermissionCode::EmployeesDelete,
        PermissionCode::RolesManage,
        PermissionCode::ProductsView,
        PermissionCode::ProductsCreate,
        PermissionCode::ProductsEdit,
        PermissionCode::ProductsDelete,
        PermissionCode::StockMovement,
        PermissionCode::PriceChange,
        PermissionCode::OrdersView,
        PermissionCode::OrdersCreate,
        PermissionCode::OrdersEdit,
        PermissionCode::OrdersCancel,
        PermissionCode::PurchasesView,
        PermissionCode::PurchasesCreate,
        PermissionCode::CustomersView,
        PermissionCode::CustomersManage,
        PermissionCode::SuppliersView,
        PermissionCode::SuppliersManage,
        PermissionCode::ReportsView,
        PermissionCode::ReportsExport,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PermissionCode::ViewDashboard => "system.view_dashboard",
            PermissionCode::ViewAuditLog => "system.view_audit_log",
            PermissionCode::ViewSessions => "system.view_sessions",
            PermissionCode::EmployeesView => "employees.view",
            PermissionCode::EmployeesCreate => "employees.create",
            PermissionCode::EmployeesEdit => "employees.edit",
            PermissionCode::EmployeesDelete => "employees.delete",
            PermissionCode::RolesManage => "roles.manage",
            PermissionCode::ProductsView => "products.view",
            PermissionCode::ProductsCreate => "products.create",
            PermissionCode::ProductsEdit => "products.edit",
            PermissionCode::ProductsDelete => "products.delete",
            PermissionCode::StockMovement => "stock.movement",
            PermissionCode::PriceChange => "price.change",
            PermissionCode::OrdersView => "orders.view",
            PermissionCode::OrdersCreate => "orders.create",
            PermissionCode::OrdersEdit => "orders.edit",
            PermissionCode::OrdersCancel => "orders.cancel",
            PermissionCode::PurchasesView => "purchases.view",
            PermissionCode::PurchasesCreate => "purchases.create",
            PermissionCode::CustomersView => "customers.view",
            PermissionCode::CustomersManage => "customers.manage",
            PermissionCode::SuppliersView => "suppliers.view",
            PermissionCode::SuppliersManage => "suppliers.manage",
            PermissionCode::ReportsView => "reports.view",
            PermissionCode::ReportsExport => "reports.export",
        }
    }

    pub fn module(self) -> &'static str {
        self.as_str()
            .split_once('.')
            .map(|(module, _)| module)
            .unwrap_or("system")
    }

    pub fn parse(code: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.as_str() == code)
    }
}

impl core::fmt::Display for PermissionCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Seed source for role → permission assignments.
///
/// The administrator role gets every catalog code and is otherwise a regular
/// role; authorization never special-cases a role name.
pub const ROLE_MATRIX: &[(&str, &str, &[PermissionCode])] = &[
    ("Администратор", "Полный доступ ко всем функциям системы", &PermissionCode::ALL),
    (
        "Менеджер склада",
        "Управление товарами и закупками",
        &[
            PermissionCode::ProductsView,
            PermissionCode::ProductsCreate,
            PermissionCode::ProductsEdit,
            PermissionCode::StockMovement,
            PermissionCode::PurchasesView,
            PermissionCode::PurchasesCreate,
            PermissionCode::SuppliersView,
            PermissionCode::ViewDashboard,
        ],
    ),
    (
        "Продавец",
        "Работа с заказами и клиентами",
        &[
            PermissionCode::OrdersView,
            PermissionCode::OrdersCreate,
            PermissionCode::OrdersEdit,
            PermissionCode::CustomersView,
            PermissionCode::CustomersManage,
            PermissionCode::ProductsView,
            PermissionCode::ViewDashboard,
        ],
    ),
    (
        "Бухгалтер",
        "Финансовый учёт и отчётность",
        &[
            PermissionCode::ReportsView,
            PermissionCode::ReportsExport,
            PermissionCode::OrdersView,
            PermissionCode::PurchasesView,
            PermissionCode::PriceChange,
            PermissionCode::ProductsView,
            PermissionCode::ViewDashboard,
        ],
    ),
];

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub role_id: i64,
    pub role_name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    pub permission_id: i64,
    pub permission_code: String,
    pub description: Option<String>,
    pub module: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips_every_code() {
        for code in PermissionCode::ALL {
            assert_eq!(PermissionCode::parse(code.as_str()), Some(code));
        }
    }

    #[test]
    fn parse_rejects_unknown_codes() {
        assert_eq!(PermissionCode::parse("orders.destroy"), None);
        assert_eq!(PermissionCode::parse("*"), None);
    }

    #[test]
    fn codes_are_module_dot_action() {
        for code in PermissionCode::ALL {
            let s = code.as_str();
            assert!(s.contains('.'), "{s} is not namespaced");
            assert!(s.starts_with(code.module()));
        }
    }

    #[test]
    fn admin_role_holds_every_code() {
        let (_, _, admin) = ROLE_MATRIX[0];
        assert_eq!(admin.len(), PermissionCode::ALL.len());
    }

    #[test]
    fn seller_cannot_delete_products() {
        let (name, _, codes) = ROLE_MATRIX
            .iter()
            .find(|(name, _, _)| *name == "Продавец")
            .copied()
            .unwrap();
        assert_eq!(name, "Продавец");
        assert!(!codes.contains(&PermissionCode::ProductsDelete));
        assert!(codes.contains(&PermissionCode::OrdersCreate));
    }
}
