// Help center: support tickets raised against a dashboard section

use crate::framework::aggregate::{Metric, MetricSpec};
use crate::framework::chart::ChartSpec;
use crate::framework::export::ColumnSpec;
use crate::framework::page::{PageSchema, Section};
use crate::framework::schema::FieldDefinition;

pub const HELP_SECTIONS: [&str; 9] = [
    "Dashboard & Analytics",
    "User & Role Management",
    "Financial Management",
    "Human Resource Management",
    "Inventory & Supply Chain",
    "Customer Relationship Management",
    "Project Management",
    "Manufacturing",
    "E-commerce & POS",
];
pub const TICKET_PRIORITIES: [&str; 3] = ["High", "Medium", "Low"];
pub const TICKET_STATUSES: [&str; 3] = ["Pending", "In Progress", "Resolved"];

pub struct SupportTicketsSchema;

impl PageSchema for SupportTicketsSchema {
    fn slug() -> &'static str {
        "support_tickets"
    }

    fn title() -> &'static str {
        "Help Center"
    }

    fn section() -> Section {
        Section::Support
    }

    fn entity() -> &'static str {
        "ticket"
    }

    fn fields() -> Vec<FieldDefinition> {
        vec![
            FieldDefinition::choice("section", &HELP_SECTIONS)
                .label("Section")
                .required(),
            FieldDefinition::choice("priority", &TICKET_PRIORITIES)
                .label("Priority")
                .default_value("Medium"),
            FieldDefinition::text("description").label("Description").required(),
            FieldDefinition::choice("status", &TICKET_STATUSES)
                .label("Status")
                .default_value("Pending"),
        ]
    }

    fn search_fields() -> Vec<&'static str> {
        vec!["description", "section"]
    }

    fn facets() -> Vec<&'static str> {
        vec!["status", "priority", "section"]
    }

    fn columns() -> Vec<ColumnSpec> {
        vec![
            ColumnSpec::new("Ticket", "id"),
            ColumnSpec::new("Section", "section"),
            ColumnSpec::new("Priority", "priority"),
            ColumnSpec::new("Status", "status"),
            ColumnSpec::new("Description", "description"),
        ]
    }

    fn metrics() -> Vec<MetricSpec> {
        vec![
            MetricSpec::new("total_tickets", Metric::Count),
            MetricSpec::new("pending", Metric::count_eq("status", "Pending")),
            MetricSpec::new("in_progress", Metric::count_eq("status", "In Progress")),
            MetricSpec::new("resolved", Metric::count_eq("status", "Resolved")),
            MetricSpec::new("high_priority", Metric::count_eq("priority", "High")),
        ]
    }

    fn chart() -> Option<ChartSpec> {
        Some(ChartSpec::count_by("priority"))
    }

    fn export_filename() -> &'static str {
        "support_tickets.csv"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::framework::filter::FilterSpec;
    use crate::framework::page::PageDefinition;
    use crate::framework::record::Draft;
    use crate::infrastructure::id_generator::RecordIdGenerator;
    use std::sync::Arc;

    #[test]
    fn test_ticket_defaults_and_required_fields() {
        let page = PageDefinition::of::<SupportTicketsSchema>();
        let mut list = page.instantiate(Arc::new(RecordIdGenerator::new())).unwrap();
        assert!(list.is_empty());

        let ticket = list
            .add(Draft::new().set("section", "Manufacturing").set("description", "BOM totals look off"))
            .unwrap();
        assert_eq!(ticket.text("priority"), "Medium");
        assert_eq!(ticket.text("status"), "Pending");

        assert!(matches!(
            list.add(Draft::new().set("section", "Manufacturing")),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            list.add(Draft::new().set("description", "no section")),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            list.add(Draft::new().set("section", "Payroll").set("description", "x")),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_ticket_summary_follows_status() {
        let page = PageDefinition::of::<SupportTicketsSchema>();
        let mut list = page.instantiate(Arc::new(RecordIdGenerator::new())).unwrap();
        let first = list
            .add(Draft::new().set("section", "Financial Management").set("description", "Ledger export").set("priority", "High"))
            .unwrap();
        list.add(Draft::new().set("section", "Project Management").set("description", "Mentions")).unwrap();
        list.update(first.id(), Draft::new().set("status", "Resolved")).unwrap();

        let all = FilterSpec::new();
        let summary = list.filter(&all).aggregate(&page.metrics);
        assert_eq!(summary["total_tickets"], 2.0);
        assert_eq!(summary["pending"], 1.0);
        assert_eq!(summary["resolved"], 1.0);
        assert_eq!(summary["high_priority"], 1.0);

        let pending = FilterSpec::new().facet("status", "Pending");
        assert_eq!(list.filter(&pending).len(), 1);

        assert!(list.remove(first.id()));
        assert_eq!(list.len(), 1);
    }
}
