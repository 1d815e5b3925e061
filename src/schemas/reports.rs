// Inventory report pages: stock valuation, sales against purchases, vendor spend

use serde_json::{json, Value};

use crate::framework::aggregate::{Metric, MetricSpec};
use crate::framework::chart::ChartSpec;
use crate::framework::export::ColumnSpec;
use crate::framework::page::{PageSchema, Section};
use crate::framework::schema::FieldDefinition;

pub struct InventoryReportSchema;

impl PageSchema for InventoryReportSchema {
    fn slug() -> &'static str {
        "inventory_report"
    }

    fn title() -> &'static str {
        "Inventory Report"
    }

    fn section() -> Section {
        Section::Inventory
    }

    fn entity() -> &'static str {
        "report row"
    }

    fn fields() -> Vec<FieldDefinition> {
        vec![
            FieldDefinition::text("item").label("Item").required(),
            FieldDefinition::number("quantity").label("Quantity"),
            FieldDefinition::number("valuation").label("Valuation"),
        ]
    }

    fn search_fields() -> Vec<&'static str> {
        vec!["item"]
    }

    // Report files keep the raw field names as headers.
    fn columns() -> Vec<ColumnSpec> {
        vec![
            ColumnSpec::new("item", "item"),
            ColumnSpec::new("quantity", "quantity"),
            ColumnSpec::new("valuation", "valuation"),
        ]
    }

    fn metrics() -> Vec<MetricSpec> {
        vec![
            MetricSpec::new("total_inventory", Metric::Count),
            MetricSpec::new("total_quantity", Metric::sum("quantity")),
            MetricSpec::new("total_valuation", Metric::sum("valuation")),
        ]
    }

    fn chart() -> Option<ChartSpec> {
        Some(ChartSpec::sum_by("item", "quantity"))
    }

    fn export_filename() -> &'static str {
        "inventory_report.csv"
    }

    fn seed() -> Vec<Value> {
        vec![
            json!({"id": 1, "item": "Item A", "quantity": 120, "valuation": 3000}),
            json!({"id": 2, "item": "Item B", "quantity": 50, "valuation": 1500}),
            json!({"id": 3, "item": "Item C", "quantity": 200, "valuation": 8000}),
            json!({"id": 4, "item": "Item D", "quantity": 10, "valuation": 500}),
        ]
    }
}

pub struct SalesReportSchema;

impl PageSchema for SalesReportSchema {
    fn slug() -> &'static str {
        "sales_report"
    }

    fn title() -> &'static str {
        "Sales vs Purchase"
    }

    fn section() -> Section {
        Section::Inventory
    }

    fn entity() -> &'static str {
        "report row"
    }

    fn fields() -> Vec<FieldDefinition> {
        vec![
            FieldDefinition::text("month").label("Month").required(),
            FieldDefinition::number("sales").label("Sales"),
            FieldDefinition::number("purchases").label("Purchases"),
        ]
    }

    fn search_fields() -> Vec<&'static str> {
        vec!["month"]
    }

    fn columns() -> Vec<ColumnSpec> {
        vec![
            ColumnSpec::new("month", "month"),
            ColumnSpec::new("sales", "sales"),
            ColumnSpec::new("purchases", "purchases"),
        ]
    }

    fn metrics() -> Vec<MetricSpec> {
        vec![
            MetricSpec::new("total_sales", Metric::sum("sales")),
            MetricSpec::new("total_purchases", Metric::sum("purchases")),
            MetricSpec::new(
                "net",
                Metric::difference(Metric::sum("sales"), Metric::sum("purchases")),
            ),
        ]
    }

    fn chart() -> Option<ChartSpec> {
        Some(ChartSpec::sum_by("month", "sales"))
    }

    fn export_filename() -> &'static str {
        "sales_report.csv"
    }

    fn seed() -> Vec<Value> {
        vec![
            json!({"id": 1, "month": "Jan", "sales": 5000, "purchases": 7000}),
            json!({"id": 2, "month": "Feb", "sales": 6000, "purchases": 5000}),
            json!({"id": 3, "month": "Mar", "sales": 8000, "purchases": 9000}),
        ]
    }
}

pub struct VendorReportSchema;

impl PageSchema for VendorReportSchema {
    fn slug() -> &'static str {
        "vendor_report"
    }

    fn title() -> &'static str {
        "Vendor Spending"
    }

    fn section() -> Section {
        Section::Inventory
    }

    fn entity() -> &'static str {
        "report row"
    }

    fn fields() -> Vec<FieldDefinition> {
        vec![
            FieldDefinition::text("vendor").label("Vendor").required(),
            FieldDefinition::number("amount").label("Amount"),
        ]
    }

    fn search_fields() -> Vec<&'static str> {
        vec!["vendor"]
    }

    fn columns() -> Vec<ColumnSpec> {
        vec![
            ColumnSpec::new("vendor", "vendor"),
            ColumnSpec::new("amount", "amount"),
        ]
    }

    fn metrics() -> Vec<MetricSpec> {
        vec![
            MetricSpec::new("total_vendors", Metric::Count),
            MetricSpec::new("total_spend", Metric::sum("amount")),
        ]
    }

    fn chart() -> Option<ChartSpec> {
        Some(ChartSpec::sum_by("vendor", "amount"))
    }

    fn export_filename() -> &'static str {
        "vendor_report.csv"
    }

    fn seed() -> Vec<Value> {
        vec![
            json!({"id": 1, "vendor": "ABC Supplies", "amount": 12000}),
            json!({"id": 2, "vendor": "XYZ Traders", "amount": 8000}),
            json!({"id": 3, "vendor": "LMN Corp", "amount": 5000}),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::filter::FilterSpec;
    use crate::framework::page::PageDefinition;
    use crate::infrastructure::id_generator::RecordIdGenerator;
    use std::sync::Arc;

    #[test]
    fn test_report_summaries() {
        let ids = Arc::new(RecordIdGenerator::new());
        let all = FilterSpec::new();

        let inventory = PageDefinition::of::<InventoryReportSchema>();
        let summary = inventory.instantiate(ids.clone()).unwrap().filter(&all).aggregate(&inventory.metrics);
        assert_eq!(summary["total_inventory"], 4.0);
        assert_eq!(summary["total_valuation"], 13000.0);

        let sales = PageDefinition::of::<SalesReportSchema>();
        let summary = sales.instantiate(ids.clone()).unwrap().filter(&all).aggregate(&sales.metrics);
        assert_eq!(summary["total_sales"], 19000.0);
        assert_eq!(summary["total_purchases"], 21000.0);
        assert_eq!(summary["net"], -2000.0);

        let vendors = PageDefinition::of::<VendorReportSchema>();
        let summary = vendors.instantiate(ids).unwrap().filter(&all).aggregate(&vendors.metrics);
        assert_eq!(summary["total_vendors"], 3.0);
        assert_eq!(summary["total_spend"], 25000.0);
    }

    #[test]
    fn test_vendor_report_csv_uses_field_headers() {
        let page = PageDefinition::of::<VendorReportSchema>();
        let list = page.instantiate(Arc::new(RecordIdGenerator::new())).unwrap();
        let spec = FilterSpec::new().search("corp");

        assert_eq!(list.filter(&spec).export_csv(&page.columns), "vendor,amount\nLMN Corp,5000");
    }
}
