// Administration pages: user accounts and role permissions

use serde_json::{json, Value};
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::framework::aggregate::{Metric, MetricSpec};
use crate::framework::chart::ChartSpec;
use crate::framework::export::ColumnSpec;
use crate::framework::page::{PageSchema, Section};
use crate::framework::record::{Record, RecordId};
use crate::framework::record_list::ManagedRecordList;
use crate::framework::schema::{FieldDefinition, FieldValidator};

pub const USER_ROLES: [&str; 3] = ["Admin", "Manager", "Employee"];
pub const DEPARTMENTS: [&str; 5] = ["IT", "Sales", "HR", "Finance", "Inventory"];
pub const USER_STATUSES: [&str; 3] = ["Active", "Inactive", "Suspended"];
pub const HIERARCHIES: [&str; 3] = ["Top", "Mid", "Base"];

/// Modules a role can be granted access to.
pub const PERMISSION_MODULES: [&str; 6] = [
    "Financial",
    "HRM",
    "Inventory",
    "CRM",
    "Projects",
    "User Management",
];

pub struct UsersSchema;

impl PageSchema for UsersSchema {
    fn slug() -> &'static str {
        "users"
    }

    fn title() -> &'static str {
        "Users"
    }

    fn section() -> Section {
        Section::Administration
    }

    fn entity() -> &'static str {
        "user"
    }

    fn fields() -> Vec<FieldDefinition> {
        vec![
            FieldDefinition::text("name").label("Name").required(),
            FieldDefinition::text("email")
                .label("Email")
                .required()
                .validate(FieldValidator::Pattern(r"^[^\s@]+@[^\s@]+\.[^\s@]+$".to_string())),
            FieldDefinition::choice("role", &USER_ROLES).label("Role"),
            FieldDefinition::choice("department", &DEPARTMENTS).label("Department"),
            FieldDefinition::choice("status", &USER_STATUSES)
                .label("Status")
                .default_value("Active"),
            FieldDefinition::text("last_login")
                .label("Last Login")
                .default_value("Just Now"),
        ]
    }

    fn search_fields() -> Vec<&'static str> {
        vec!["name", "email"]
    }

    fn facets() -> Vec<&'static str> {
        vec!["role", "status", "department"]
    }

    fn columns() -> Vec<ColumnSpec> {
        vec![
            ColumnSpec::new("Name", "name"),
            ColumnSpec::new("Email", "email"),
            ColumnSpec::new("Role", "role"),
            ColumnSpec::new("Department", "department"),
            ColumnSpec::new("Status", "status"),
            ColumnSpec::new("Last Login", "last_login"),
        ]
    }

    fn metrics() -> Vec<MetricSpec> {
        vec![
            MetricSpec::new("total_users", Metric::Count),
            MetricSpec::new("active", Metric::count_eq("status", "Active")),
            MetricSpec::new("suspended", Metric::count_eq("status", "Suspended")),
        ]
    }

    fn chart() -> Option<ChartSpec> {
        Some(ChartSpec::count_by("role"))
    }

    fn export_filename() -> &'static str {
        "users.csv"
    }

    fn seed() -> Vec<Value> {
        vec![
            json!({"id": 1, "name": "John Doe", "email": "john@flyweis.com", "role": "Admin", "department": "IT", "status": "Active", "last_login": "2025-10-05"}),
            json!({"id": 2, "name": "Jane Smith", "email": "jane@flyweis.com", "role": "Manager", "department": "Sales", "status": "Active", "last_login": "2025-10-06"}),
            json!({"id": 3, "name": "Bob Johnson", "email": "bob@flyweis.com", "role": "Employee", "department": "HR", "status": "Suspended", "last_login": "2025-10-04"}),
        ]
    }
}

pub struct RolesSchema;

impl PageSchema for RolesSchema {
    fn slug() -> &'static str {
        "roles"
    }

    fn title() -> &'static str {
        "Roles & Permissions"
    }

    fn section() -> Section {
        Section::Administration
    }

    fn entity() -> &'static str {
        "role"
    }

    fn fields() -> Vec<FieldDefinition> {
        vec![
            FieldDefinition::text("name").label("Name").required(),
            FieldDefinition::choice("hierarchy", &HIERARCHIES)
                .label("Hierarchy")
                .default_value("Mid"),
            FieldDefinition::text_list("permissions").label("Permissions"),
            FieldDefinition::number("users_count").label("Users Count"),
        ]
    }

    fn search_fields() -> Vec<&'static str> {
        vec!["name"]
    }

    fn facets() -> Vec<&'static str> {
        vec!["hierarchy"]
    }

    fn columns() -> Vec<ColumnSpec> {
        vec![
            ColumnSpec::new("Name", "name"),
            ColumnSpec::new("Hierarchy", "hierarchy"),
            ColumnSpec::new("Permissions", "permissions"),
            ColumnSpec::new("Users Count", "users_count"),
        ]
    }

    fn metrics() -> Vec<MetricSpec> {
        vec![
            MetricSpec::new("total_roles", Metric::Count),
            MetricSpec::new("total_users", Metric::sum("users_count")),
        ]
    }

    fn export_filename() -> &'static str {
        "roles.csv"
    }

    fn seed() -> Vec<Value> {
        vec![
            json!({"id": 1, "name": "Admin", "hierarchy": "Top", "permissions": ["All Modules - Full Access"], "users_count": 5}),
            json!({"id": 2, "name": "Manager", "hierarchy": "Mid", "permissions": ["Finance (CRUD), CRM (Read/Update), Projects (Full)"], "users_count": 12}),
            json!({"id": 3, "name": "Employee", "hierarchy": "Base", "permissions": ["HR (Read), Inventory (Read)"], "users_count": 20}),
        ]
    }
}

/// Grant `module` to a role, or revoke it if already granted.
pub fn toggle_permission(list: &mut ManagedRecordList, role_id: RecordId, module: &str) -> AppResult<Record> {
    let module = module.trim();
    if !PERMISSION_MODULES.contains(&module) {
        return Err(AppError::Validation(format!(
            "Unknown module '{}', expected one of [{}]",
            module,
            PERMISSION_MODULES.join(", ")
        )));
    }

    let mut granted = false;
    let record = list.modify(role_id, |_, fields| {
        let label = Value::String(module.to_string());
        match fields.get_mut("permissions") {
            Some(Value::Array(permissions)) => {
                if let Some(pos) = permissions.iter().position(|p| *p == label) {
                    permissions.remove(pos);
                } else {
                    permissions.push(label);
                    granted = true;
                }
            }
            _ => {
                fields.insert("permissions".to_string(), Value::Array(vec![label]));
                granted = true;
            }
        }
        Ok(())
    })?;

    info!(
        "{} '{}' for role {}",
        if granted { "Granted" } else { "Revoked" },
        module,
        role_id
    );
    Ok(record)
}
