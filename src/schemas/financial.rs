// Financial pages: general ledger, budgets and taxes

use serde_json::{json, Value};

use crate::framework::aggregate::{Metric, MetricSpec};
use crate::framework::chart::ChartSpec;
use crate::framework::export::ColumnSpec;
use crate::framework::page::{PageSchema, Section};
use crate::framework::schema::{FieldDefinition, FieldValidator};

pub const LEDGER_CATEGORIES: [&str; 4] = ["Revenue", "Expense", "Asset", "Liability"];

/// Double-entry ledger; the net balance is total credit minus total debit.
pub struct LedgerSchema;

impl PageSchema for LedgerSchema {
    fn slug() -> &'static str {
        "ledger"
    }

    fn title() -> &'static str {
        "General Ledger"
    }

    fn section() -> Section {
        Section::Financial
    }

    fn entity() -> &'static str {
        "ledger entry"
    }

    fn fields() -> Vec<FieldDefinition> {
        vec![
            FieldDefinition::date("date").label("Date").required(),
            FieldDefinition::text("description").label("Description").required(),
            FieldDefinition::number("debit").label("Debit"),
            FieldDefinition::number("credit").label("Credit"),
            FieldDefinition::choice("category", &LEDGER_CATEGORIES)
                .label("Category")
                .default_value("Uncategorized"),
        ]
    }

    fn search_fields() -> Vec<&'static str> {
        vec!["description"]
    }

    fn facets() -> Vec<&'static str> {
        vec!["category"]
    }

    fn columns() -> Vec<ColumnSpec> {
        vec![
            ColumnSpec::new("Date", "date"),
            ColumnSpec::new("Description", "description"),
            ColumnSpec::new("Category", "category"),
            ColumnSpec::new("Debit", "debit"),
            ColumnSpec::new("Credit", "credit"),
        ]
    }

    fn metrics() -> Vec<MetricSpec> {
        vec![
            MetricSpec::new("total_debit", Metric::sum("debit")),
            MetricSpec::new("total_credit", Metric::sum("credit")),
            MetricSpec::new(
                "net_balance",
                Metric::difference(Metric::sum("credit"), Metric::sum("debit")),
            ),
        ]
    }

    fn chart() -> Option<ChartSpec> {
        Some(ChartSpec::sum_by("category", "credit"))
    }

    fn export_filename() -> &'static str {
        "ledger.csv"
    }

    fn seed() -> Vec<Value> {
        vec![
            json!({"id": 1, "date": "2025-09-01", "description": "Sales Income", "debit": 1500, "credit": 5000, "category": "Revenue"}),
            json!({"id": 2, "date": "2025-09-02", "description": "Purchase Materials", "debit": 2000, "credit": 0, "category": "Expense"}),
            json!({"id": 3, "date": "2025-09-05", "description": "Consulting Income", "debit": 0, "credit": 3000, "category": "Revenue"}),
        ]
    }
}

pub struct BudgetingSchema;

impl PageSchema for BudgetingSchema {
    fn slug() -> &'static str {
        "budgeting"
    }

    fn title() -> &'static str {
        "Budgeting"
    }

    fn section() -> Section {
        Section::Financial
    }

    fn entity() -> &'static str {
        "budget"
    }

    fn fields() -> Vec<FieldDefinition> {
        vec![
            FieldDefinition::text("category").label("Category").required(),
            FieldDefinition::number("budget")
                .label("Budget")
                .required()
                .validate(FieldValidator::GreaterThan(0.0)),
            FieldDefinition::number("spent")
                .label("Spent")
                .validate(FieldValidator::Range(0.0, f64::MAX)),
        ]
    }

    fn search_fields() -> Vec<&'static str> {
        vec!["category"]
    }

    fn columns() -> Vec<ColumnSpec> {
        vec![
            ColumnSpec::new("Category", "category"),
            ColumnSpec::new("Budget", "budget"),
            ColumnSpec::new("Spent", "spent"),
        ]
    }

    fn metrics() -> Vec<MetricSpec> {
        vec![
            MetricSpec::new("total_budget", Metric::sum("budget")),
            MetricSpec::new("total_spent", Metric::sum("spent")),
            MetricSpec::new(
                "remaining",
                Metric::difference(Metric::sum("budget"), Metric::sum("spent")),
            ),
            MetricSpec::new(
                "utilization_pct",
                Metric::percentage(Metric::sum("spent"), Metric::sum("budget")),
            ),
        ]
    }

    fn chart() -> Option<ChartSpec> {
        Some(ChartSpec::sum_by("category", "spent"))
    }

    fn export_filename() -> &'static str {
        "budgeting.csv"
    }

    fn seed() -> Vec<Value> {
        vec![
            json!({"id": 1, "category": "Marketing", "budget": 5000, "spent": 3500}),
            json!({"id": 2, "category": "R&D", "budget": 7000, "spent": 4200}),
            json!({"id": 3, "category": "Operations", "budget": 6000, "spent": 5800}),
        ]
    }
}

pub struct TaxesSchema;

impl PageSchema for TaxesSchema {
    fn slug() -> &'static str {
        "taxes"
    }

    fn title() -> &'static str {
        "Taxes"
    }

    fn section() -> Section {
        Section::Financial
    }

    fn entity() -> &'static str {
        "tax"
    }

    fn fields() -> Vec<FieldDefinition> {
        vec![
            FieldDefinition::text("name").label("Tax Type").required(),
            FieldDefinition::number("value")
                .label("Amount")
                .required()
                .validate(FieldValidator::GreaterThan(0.0)),
        ]
    }

    fn search_fields() -> Vec<&'static str> {
        vec!["name"]
    }

    fn columns() -> Vec<ColumnSpec> {
        vec![
            ColumnSpec::new("Tax Type", "name"),
            ColumnSpec::new("Amount", "value"),
        ]
    }

    fn metrics() -> Vec<MetricSpec> {
        vec![
            MetricSpec::new("total_tax", Metric::sum("value")),
            MetricSpec::new("tax_count", Metric::Count),
        ]
    }

    fn chart() -> Option<ChartSpec> {
        Some(ChartSpec::sum_by("name", "value"))
    }

    fn export_filename() -> &'static str {
        "taxes.csv"
    }

    fn seed() -> Vec<Value> {
        vec![
            json!({"id": 1, "name": "Income Tax", "value": 5000}),
            json!({"id": 2, "name": "Sales Tax", "value": 2000}),
            json!({"id": 3, "name": "Corporate Tax", "value": 3000}),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::filter::FilterSpec;
    use crate::framework::page::PageDefinition;
    use crate::framework::record::Draft;
    use crate::infrastructure::id_generator::RecordIdGenerator;
    use std::sync::Arc;

    #[test]
    fn test_budget_rejects_non_positive_amounts() {
        let page = PageDefinition::of::<BudgetingSchema>();
        let mut list = page.instantiate(Arc::new(RecordIdGenerator::new())).unwrap();

        let zero_budget = Draft::new().set("category", "Travel").set("budget", "0").set("spent", "0");
        assert!(list.add(zero_budget).is_err());

        let negative_spent = Draft::new().set("category", "Travel").set("budget", "10").set("spent", "-1");
        assert!(list.add(negative_spent).is_err());
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn test_budget_utilization() {
        let page = PageDefinition::of::<BudgetingSchema>();
        let list = page.instantiate(Arc::new(RecordIdGenerator::new())).unwrap();
        let spec = FilterSpec::new().search("marketing");

        let summary = list.filter(&spec).aggregate(&page.metrics);
        assert_eq!(summary["utilization_pct"], 70.0);
        assert_eq!(summary["remaining"], 1500.0);
    }
}
