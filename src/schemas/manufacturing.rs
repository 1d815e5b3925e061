// Manufacturing pages: production planning, quality control and bills of materials

use serde_json::{json, Value};
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::framework::aggregate::{Metric, MetricSpec};
use crate::framework::chart::ChartSpec;
use crate::framework::export::ColumnSpec;
use crate::framework::page::{PageSchema, Section};
use crate::framework::record::{Draft, Record, RecordId};
use crate::framework::record_list::ManagedRecordList;
use crate::framework::schema::{FieldDefinition, FieldValidator};

pub const PRODUCTION_STATUSES: [&str; 3] = ["Planned", "In Progress", "Completed"];
pub const INSPECTION_STATUSES: [&str; 3] = ["Pass", "Fail", "Pending"];

pub struct ProductionOrdersSchema;

impl PageSchema for ProductionOrdersSchema {
    fn slug() -> &'static str {
        "production_orders"
    }

    fn title() -> &'static str {
        "Production Planning"
    }

    fn section() -> Section {
        Section::Manufacturing
    }

    fn entity() -> &'static str {
        "production order"
    }

    fn fields() -> Vec<FieldDefinition> {
        vec![
            FieldDefinition::text("product").label("Product").required(),
            FieldDefinition::number("quantity")
                .label("Quantity")
                .required()
                .validate(FieldValidator::GreaterThan(0.0)),
            FieldDefinition::date("start_date").label("Start Date"),
            FieldDefinition::date("end_date").label("End Date"),
            FieldDefinition::choice("status", &PRODUCTION_STATUSES)
                .label("Status")
                .default_value("Planned"),
        ]
    }

    fn search_fields() -> Vec<&'static str> {
        vec!["product"]
    }

    fn facets() -> Vec<&'static str> {
        vec!["status"]
    }

    fn columns() -> Vec<ColumnSpec> {
        vec![
            ColumnSpec::new("Product", "product"),
            ColumnSpec::new("Quantity", "quantity"),
            ColumnSpec::new("Start Date", "start_date"),
            ColumnSpec::new("End Date", "end_date"),
            ColumnSpec::new("Status", "status"),
        ]
    }

    fn metrics() -> Vec<MetricSpec> {
        vec![
            MetricSpec::new("total_orders", Metric::Count),
            MetricSpec::new("total_quantity", Metric::sum("quantity")),
            MetricSpec::new("planned", Metric::count_eq("status", "Planned")),
            MetricSpec::new("in_progress", Metric::count_eq("status", "In Progress")),
        ]
    }

    fn chart() -> Option<ChartSpec> {
        Some(ChartSpec::sum_by("product", "quantity"))
    }

    fn export_filename() -> &'static str {
        "production_orders.csv"
    }

    fn seed() -> Vec<Value> {
        vec![
            json!({"id": 1, "product": "Product A", "quantity": 100, "start_date": "2025-10-10", "end_date": "2025-10-15", "status": "Planned"}),
            json!({"id": 2, "product": "Product B", "quantity": 50, "start_date": "2025-10-12", "end_date": "2025-10-18", "status": "In Progress"}),
        ]
    }
}

pub struct QualityInspectionsSchema;

impl PageSchema for QualityInspectionsSchema {
    fn slug() -> &'static str {
        "quality_inspections"
    }

    fn title() -> &'static str {
        "Quality Control"
    }

    fn section() -> Section {
        Section::Manufacturing
    }

    fn entity() -> &'static str {
        "inspection"
    }

    fn fields() -> Vec<FieldDefinition> {
        vec![
            FieldDefinition::text("batch").label("Batch").required(),
            FieldDefinition::text("product").label("Product").required(),
            FieldDefinition::date("date").label("Date"),
            FieldDefinition::choice("status", &INSPECTION_STATUSES)
                .label("Status")
                .default_value("Pass"),
            FieldDefinition::number("defects").label("Defects"),
            FieldDefinition::text("inspector").label("Inspector"),
        ]
    }

    fn search_fields() -> Vec<&'static str> {
        vec!["batch", "product"]
    }

    fn facets() -> Vec<&'static str> {
        vec!["status"]
    }

    fn columns() -> Vec<ColumnSpec> {
        vec![
            ColumnSpec::new("Batch", "batch"),
            ColumnSpec::new("Product", "product"),
            ColumnSpec::new("Date", "date"),
            ColumnSpec::new("Status", "status"),
            ColumnSpec::new("Defects", "defects"),
            ColumnSpec::new("Inspector", "inspector"),
        ]
    }

    fn metrics() -> Vec<MetricSpec> {
        vec![
            MetricSpec::new("total", Metric::Count),
            MetricSpec::new("passed", Metric::count_eq("status", "Pass")),
            MetricSpec::new("failed", Metric::count_eq("status", "Fail")),
            MetricSpec::new("total_defects", Metric::sum("defects")),
            MetricSpec::new(
                "pass_rate",
                Metric::percentage(Metric::count_eq("status", "Pass"), Metric::Count),
            ),
        ]
    }

    fn chart() -> Option<ChartSpec> {
        Some(ChartSpec::count_by("status"))
    }

    fn export_filename() -> &'static str {
        "qc_inspections.csv"
    }

    fn seed() -> Vec<Value> {
        vec![
            json!({"id": 1, "batch": "Batch A", "product": "Product A", "date": "2025-10-10", "status": "Pass", "defects": 0, "inspector": "Alice"}),
            json!({"id": 2, "batch": "Batch B", "product": "Product B", "date": "2025-10-12", "status": "Fail", "defects": 3, "inspector": "Bob"}),
        ]
    }
}

/// Bill of materials: each product carries its own component list.
pub struct BomSchema;

impl BomSchema {
    pub fn product_cost() -> Metric {
        Metric::sum_product("components", "quantity", "cost_per_unit")
    }
}

impl PageSchema for BomSchema {
    fn slug() -> &'static str {
        "bom"
    }

    fn title() -> &'static str {
        "Bill of Materials"
    }

    fn section() -> Section {
        Section::Manufacturing
    }

    fn entity() -> &'static str {
        "product"
    }

    fn fields() -> Vec<FieldDefinition> {
        vec![
            FieldDefinition::text("product").label("Product").required(),
            FieldDefinition::number("quantity").label("Quantity"),
            FieldDefinition::number("cost_per_unit").label("Cost per Unit"),
            FieldDefinition::records(
                "components",
                vec![
                    FieldDefinition::text("name").label("Component").required(),
                    FieldDefinition::number("quantity").label("Quantity").default_value(1),
                    FieldDefinition::number("cost_per_unit").label("Cost per Unit"),
                ],
            )
            .label("Components"),
        ]
    }

    fn search_fields() -> Vec<&'static str> {
        vec!["product"]
    }

    fn columns() -> Vec<ColumnSpec> {
        vec![
            ColumnSpec::new("Product", "product"),
            ColumnSpec::new("Quantity", "quantity"),
            ColumnSpec::new("Cost per Unit", "cost_per_unit"),
            ColumnSpec::computed("Components", "component_count", Metric::list_length("components")),
            ColumnSpec::computed("Total Cost", "total_cost", Self::product_cost()),
        ]
    }

    fn metrics() -> Vec<MetricSpec> {
        vec![
            MetricSpec::new("total_products", Metric::Count),
            MetricSpec::new("total_components", Metric::list_length("components")),
            MetricSpec::new("total_cost", Self::product_cost()),
        ]
    }

    fn export_filename() -> &'static str {
        "bom.csv"
    }

    fn seed() -> Vec<Value> {
        vec![
            json!({
                "id": 1, "product": "Product A", "quantity": 100, "cost_per_unit": 50,
                "components": [
                    {"id": 11, "name": "Component X", "quantity": 2, "cost_per_unit": 10},
                    {"id": 12, "name": "Component Y", "quantity": 1, "cost_per_unit": 20}
                ]
            }),
            json!({
                "id": 2, "product": "Product B", "quantity": 50, "cost_per_unit": 80,
                "components": [
                    {"id": 21, "name": "Component Z", "quantity": 3, "cost_per_unit": 15}
                ]
            }),
        ]
    }
}

/// Append a component to a product; it gets its own fresh identifier.
pub fn add_component(list: &mut ManagedRecordList, product_id: RecordId, draft: Draft) -> AppResult<Record> {
    let component_id = list.next_id();
    let mut input = draft.into_fields();
    input.insert("id".to_string(), Value::from(component_id));

    let record = list.modify(product_id, |schema, fields| {
        let coerced = schema
            .field_or_err("components")?
            .coerce(&Value::Array(vec![Value::Object(input)]))?;
        let component = match coerced {
            Value::Array(mut items) if !items.is_empty() => items.remove(0),
            _ => return Err(AppError::Internal("component coercion produced nothing".to_string())),
        };

        match fields.get_mut("components") {
            Some(Value::Array(components)) => components.push(component),
            _ => {
                fields.insert("components".to_string(), Value::Array(vec![component]));
            }
        }
        Ok(())
    })?;

    info!("Added component {} to product {}", component_id, product_id);
    Ok(record)
}

/// Drop one component from a product; `false` when the product has no such component.
pub fn remove_component(
    list: &mut ManagedRecordList,
    product_id: RecordId,
    component_id: RecordId,
) -> AppResult<bool> {
    let mut removed = false;
    list.modify(product_id, |_, fields| {
        if let Some(Value::Array(components)) = fields.get_mut("components") {
            let before = components.len();
            components.retain(|c| c.get("id").and_then(Value::as_i64) != Some(component_id));
            removed = components.len() < before;
        }
        Ok(())
    })?;
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::filter::FilterSpec;
    use crate::framework::page::PageDefinition;
    use crate::infrastructure::id_generator::RecordIdGenerator;
    use std::sync::Arc;

    fn bom() -> (PageDefinition, ManagedRecordList) {
        let page = PageDefinition::of::<BomSchema>();
        let list = page.instantiate(Arc::new(RecordIdGenerator::new())).unwrap();
        (page, list)
    }

    #[test]
    fn test_seeded_costs() {
        let (page, list) = bom();
        let spec = FilterSpec::new();
        let summary = list.filter(&spec).aggregate(&page.metrics);

        assert_eq!(summary["total_products"], 2.0);
        assert_eq!(summary["total_components"], 3.0);
        assert_eq!(summary["total_cost"], 85.0);
    }

    #[test]
    fn test_add_and_remove_component() {
        let (_, mut list) = bom();

        let record = add_component(
            &mut list,
            2,
            Draft::new().set("name", "Component W").set("cost_per_unit", "5"),
        )
        .unwrap();
        let added = record.sub_records("components").last().cloned().unwrap();
        assert_eq!(added["quantity"], json!(1));
        let component_id = added["id"].as_i64().unwrap();

        assert_eq!(BomSchema::product_cost().evaluate(std::iter::once(&record)), 50.0);

        assert!(remove_component(&mut list, 2, component_id).unwrap());
        assert!(!remove_component(&mut list, 2, component_id).unwrap());
        assert_eq!(list.get(2).unwrap().sub_records("components").len(), 1);
    }

    #[test]
    fn test_component_requires_name() {
        let (_, mut list) = bom();
        let err = add_component(&mut list, 1, Draft::new().set("quantity", "3")).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(list.get(1).unwrap().sub_records("components").len(), 2);

        assert!(matches!(
            add_component(&mut list, 42, Draft::new().set("name", "X")),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_bom_csv_has_computed_columns() {
        let (page, list) = bom();
        let spec = FilterSpec::new().search("product b");

        assert_eq!(
            list.filter(&spec).export_csv(&page.columns),
            "Product,Quantity,Cost per Unit,Components,Total Cost\nProduct B,50,80,1,45"
        );
    }
}
