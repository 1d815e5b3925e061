// Page schema definitions - one declarative config per dashboard module

pub mod financial;
pub mod hrm;
pub mod inventory;
pub mod crm;
pub mod project;
pub mod manufacturing;
pub mod security;
pub mod administration;
pub mod ecommerce;
pub mod support;
pub mod reports;

use crate::framework::page::PageDefinition;

pub use administration::{RolesSchema, UsersSchema};
pub use ecommerce::{OnlineProductsSchema, PosCartSchema, PosProductsSchema};
pub use crm::{CustomerLogsSchema, LeadsSchema, SalesForecastsSchema};
pub use financial::{BudgetingSchema, LedgerSchema, TaxesSchema};
pub use hrm::{AttendanceSchema, EmployeesSchema, PayrollSchema, RecruitmentSchema};
pub use inventory::{InventorySchema, PurchaseOrdersSchema, ShipmentsSchema, VendorsSchema};
pub use manufacturing::{BomSchema, ProductionOrdersSchema, QualityInspectionsSchema};
pub use reports::{InventoryReportSchema, SalesReportSchema, VendorReportSchema};
pub use project::{ActivitiesSchema, MessagesSchema, ProjectsSchema, ResourcesSchema, TasksSchema};
pub use security::{IpAllowlistSchema, IpRequestsSchema};
pub use support::SupportTicketsSchema;

/// Every page module, in sidebar order.
pub fn all_pages() -> Vec<PageDefinition> {
    vec![
        PageDefinition::of::<LedgerSchema>(),
        PageDefinition::of::<BudgetingSchema>(),
        PageDefinition::of::<TaxesSchema>(),
        PageDefinition::of::<EmployeesSchema>(),
        PageDefinition::of::<AttendanceSchema>(),
        PageDefinition::of::<PayrollSchema>(),
        PageDefinition::of::<RecruitmentSchema>(),
        PageDefinition::of::<InventorySchema>(),
        PageDefinition::of::<VendorsSchema>(),
        PageDefinition::of::<PurchaseOrdersSchema>(),
        PageDefinition::of::<ShipmentsSchema>(),
        PageDefinition::of::<InventoryReportSchema>(),
        PageDefinition::of::<SalesReportSchema>(),
        PageDefinition::of::<VendorReportSchema>(),
        PageDefinition::of::<LeadsSchema>(),
        PageDefinition::of::<CustomerLogsSchema>(),
        PageDefinition::of::<SalesForecastsSchema>(),
        PageDefinition::of::<ProjectsSchema>(),
        PageDefinition::of::<TasksSchema>(),
        PageDefinition::of::<ResourcesSchema>(),
        PageDefinition::of::<ActivitiesSchema>(),
        PageDefinition::of::<MessagesSchema>(),
        PageDefinition::of::<ProductionOrdersSchema>(),
        PageDefinition::of::<QualityInspectionsSchema>(),
        PageDefinition::of::<BomSchema>(),
        PageDefinition::of::<IpAllowlistSchema>(),
        PageDefinition::of::<IpRequestsSchema>(),
        PageDefinition::of::<UsersSchema>(),
        PageDefinition::of::<RolesSchema>(),
        PageDefinition::of::<PosProductsSchema>(),
        PageDefinition::of::<PosCartSchema>(),
        PageDefinition::of::<OnlineProductsSchema>(),
        PageDefinition::of::<SupportTicketsSchema>(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::filter::FilterSpec;
    use crate::infrastructure::id_generator::RecordIdGenerator;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn test_every_page_instantiates() {
        let ids = Arc::new(RecordIdGenerator::new());
        let mut slugs = HashSet::new();

        for page in all_pages() {
            assert!(slugs.insert(page.slug), "duplicate slug {}", page.slug);
            let list = page.instantiate(ids.clone()).unwrap();

            for field in page.search_fields.iter().chain(page.facets.iter()) {
                assert!(page.schema.field(field).is_some(), "{} has no field {}", page.slug, field);
            }
            for column in &page.columns {
                assert!(
                    column.field == "id"
                        || column.computed.is_some()
                        || page.schema.field(&column.field).is_some(),
                    "{} column {} is not a field",
                    page.slug,
                    column.field
                );
            }

            let spec = FilterSpec::new();
            let summary = list.filter(&spec).aggregate(&page.metrics);
            assert_eq!(summary.len(), page.metrics.len());
        }
        assert_eq!(slugs.len(), 33);
    }
}
