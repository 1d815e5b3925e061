// Inventory pages: stock items, vendors, purchase orders and shipments
// Stock adjustments and expiry checks live next to the item schema

use chrono::NaiveDate;
use serde_json::{json, Value};
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::framework::aggregate::{Metric, MetricSpec};
use crate::framework::chart::ChartSpec;
use crate::framework::export::ColumnSpec;
use crate::framework::page::{PageSchema, Section};
use crate::framework::record::{number_json, number_value, Record, RecordId};
use crate::framework::record_list::ManagedRecordList;
use crate::framework::schema::{parse_date, FieldDefinition};

/// Items below this quantity count as low stock.
pub const LOW_STOCK_THRESHOLD: f64 = 5.0;

/// Window used by the "expiring soon" card.
pub const EXPIRY_WARNING_DAYS: i64 = 30;

pub const ORDER_STATUSES: [&str; 5] = ["Draft", "Pending Approval", "Ordered", "Received", "Cancelled"];
pub const SHIPMENT_TYPES: [&str; 2] = ["incoming", "outgoing"];
pub const SHIPMENT_STATUSES: [&str; 4] = ["In Transit", "Delivered", "Delayed", "Returned"];

pub struct InventorySchema;

impl PageSchema for InventorySchema {
    fn slug() -> &'static str {
        "inventory"
    }

    fn title() -> &'static str {
        "Inventory"
    }

    fn section() -> Section {
        Section::Inventory
    }

    fn entity() -> &'static str {
        "item"
    }

    fn fields() -> Vec<FieldDefinition> {
        vec![
            FieldDefinition::text("code").label("Code").required(),
            FieldDefinition::text("name").label("Name").required(),
            FieldDefinition::text("category").label("Category"),
            FieldDefinition::number("quantity").label("Quantity"),
            FieldDefinition::text("unit").label("Unit"),
            FieldDefinition::text("location").label("Location"),
            FieldDefinition::text("lot").label("Lot"),
            FieldDefinition::date("mfg").label("Manufactured"),
            FieldDefinition::date("exp").label("Expiry"),
            FieldDefinition::text("supplier").label("Supplier"),
            FieldDefinition::records(
                "history",
                vec![
                    FieldDefinition::date("date").label("Date"),
                    FieldDefinition::number("change").label("Change"),
                    FieldDefinition::text("reason").label("Reason").required(),
                ],
            )
            .label("Adjustment history"),
        ]
    }

    fn search_fields() -> Vec<&'static str> {
        vec!["name", "code", "supplier"]
    }

    fn facets() -> Vec<&'static str> {
        vec!["category"]
    }

    fn columns() -> Vec<ColumnSpec> {
        vec![
            ColumnSpec::new("Code", "code"),
            ColumnSpec::new("Name", "name"),
            ColumnSpec::new("Category", "category"),
            ColumnSpec::new("Quantity", "quantity"),
            ColumnSpec::new("Unit", "unit"),
            ColumnSpec::new("Location", "location"),
            ColumnSpec::new("Lot", "lot"),
            ColumnSpec::new("Expiry", "exp"),
            ColumnSpec::new("Supplier", "supplier"),
        ]
    }

    fn metrics() -> Vec<MetricSpec> {
        vec![
            MetricSpec::new("total_items", Metric::Count),
            MetricSpec::new("total_quantity", Metric::sum("quantity")),
            MetricSpec::new("low_stock", Metric::count_below("quantity", LOW_STOCK_THRESHOLD)),
        ]
    }

    fn chart() -> Option<ChartSpec> {
        Some(ChartSpec::sum_by("category", "quantity"))
    }

    fn export_filename() -> &'static str {
        "inventory.csv"
    }

    fn seed() -> Vec<Value> {
        vec![
            json!({
                "id": 1, "code": "SKU1001", "name": "Paracetamol", "category": "Medicine",
                "quantity": 15, "unit": "Box", "location": "Rack A1", "lot": "L-12345",
                "mfg": "2025-01-10", "exp": "2026-01-10", "supplier": "ABC Pharma", "history": []
            }),
            json!({
                "id": 2, "code": "SKU1002", "name": "Glucose Powder", "category": "Supplements",
                "quantity": 3, "unit": "Packet", "location": "Rack B2", "lot": "L-98765",
                "mfg": "2024-07-05", "exp": "2025-07-05", "supplier": "XYZ Nutrition", "history": []
            }),
        ]
    }
}

/// Add `change` to an item's quantity and log the adjustment in its history.
pub fn adjust_stock(
    list: &mut ManagedRecordList,
    id: RecordId,
    change: &str,
    reason: &str,
    today: NaiveDate,
) -> AppResult<Record> {
    let change = change.trim();
    if change.is_empty() {
        return Err(AppError::Validation("Adjustment quantity is required".to_string()));
    }
    let change: f64 = change
        .parse()
        .ok()
        .filter(|n: &f64| n.is_finite())
        .ok_or_else(|| AppError::Validation(format!("Adjustment quantity must be a number, got '{}'", change)))?;
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(AppError::Validation("Adjustment reason is required".to_string()));
    }

    let record = list.modify(id, |_, fields| {
        let quantity = fields.get("quantity").map(number_value).unwrap_or(0.0) + change;
        if !quantity.is_finite() {
            return Err(AppError::Validation(format!("Adjustment of {} overflows the stock level", change)));
        }
        fields.insert("quantity".to_string(), number_json(quantity));

        let entry = json!({
            "date": today.format("%Y-%m-%d").to_string(),
            "change": number_json(change),
            "reason": reason,
        });
        match fields.get_mut("history") {
            Some(Value::Array(history)) => history.push(entry),
            _ => {
                fields.insert("history".to_string(), Value::Array(vec![entry]));
            }
        }
        Ok(())
    })?;

    info!("Adjusted stock of item {} by {} ({})", id, change, reason);
    Ok(record)
}

/// Whole days from `today` until the item's expiry date.
pub fn days_until_expiry(record: &Record, today: NaiveDate) -> Option<i64> {
    parse_date(&record.text("exp")).map(|exp| (exp - today).num_days())
}

/// Items expiring within `days` days of `today`, already-expired ones
/// included. Items without a readable expiry date are skipped.
pub fn expiring_within<'r, I>(records: I, days: i64, today: NaiveDate) -> usize
where
    I: IntoIterator<Item = &'r Record>,
{
    records
        .into_iter()
        .filter_map(|record| days_until_expiry(record, today))
        .filter(|remaining| *remaining <= days)
        .count()
}

pub struct VendorsSchema;

impl PageSchema for VendorsSchema {
    fn slug() -> &'static str {
        "vendors"
    }

    fn title() -> &'static str {
        "Vendors"
    }

    fn section() -> Section {
        Section::Inventory
    }

    fn entity() -> &'static str {
        "vendor"
    }

    fn fields() -> Vec<FieldDefinition> {
        vec![
            FieldDefinition::text("name").label("Name").required(),
            FieldDefinition::text("contact").label("Contact").required(),
            FieldDefinition::text("gst").label("GST"),
            FieldDefinition::text("terms").label("Payment Terms"),
            FieldDefinition::text("default_item").label("Default Item"),
        ]
    }

    fn search_fields() -> Vec<&'static str> {
        vec!["name", "contact"]
    }

    fn columns() -> Vec<ColumnSpec> {
        vec![
            ColumnSpec::new("Name", "name"),
            ColumnSpec::new("Contact", "contact"),
            ColumnSpec::new("GST", "gst"),
            ColumnSpec::new("Terms", "terms"),
            ColumnSpec::new("Default Item", "default_item"),
        ]
    }

    fn metrics() -> Vec<MetricSpec> {
        vec![MetricSpec::new("total_vendors", Metric::Count)]
    }

    fn export_filename() -> &'static str {
        "vendors.csv"
    }

    fn seed() -> Vec<Value> {
        vec![
            json!({"id": 1, "name": "ABC Supplies", "contact": "abc@example.com", "gst": "27AAAPL1234C1ZV", "terms": "30 Days", "default_item": "Laptop"}),
            json!({"id": 2, "name": "XYZ Traders", "contact": "xyz@example.com", "gst": "27AAAPL5678D1ZV", "terms": "45 Days", "default_item": "Monitor"}),
        ]
    }
}

/// Purchase orders reference a vendor by id; the reference is not checked.
pub struct PurchaseOrdersSchema;

impl PageSchema for PurchaseOrdersSchema {
    fn slug() -> &'static str {
        "purchase_orders"
    }

    fn title() -> &'static str {
        "Purchase Orders"
    }

    fn section() -> Section {
        Section::Inventory
    }

    fn entity() -> &'static str {
        "purchase order"
    }

    fn fields() -> Vec<FieldDefinition> {
        vec![
            FieldDefinition::number("vendor_id").label("Vendor").required(),
            FieldDefinition::records(
                "items",
                vec![
                    FieldDefinition::text("item_id").label("Item").required(),
                    FieldDefinition::number("quantity").label("Quantity"),
                    FieldDefinition::number("unit_cost").label("Unit Cost"),
                ],
            )
            .label("Items")
            .required(),
            FieldDefinition::choice("status", &ORDER_STATUSES)
                .label("Status")
                .default_value("Draft"),
            FieldDefinition::text("notes").label("Notes"),
        ]
    }

    fn search_fields() -> Vec<&'static str> {
        vec!["notes"]
    }

    fn facets() -> Vec<&'static str> {
        vec!["status"]
    }

    fn columns() -> Vec<ColumnSpec> {
        vec![
            ColumnSpec::new("Order", "id"),
            ColumnSpec::new("Vendor", "vendor_id"),
            ColumnSpec::new("Items", "items"),
            ColumnSpec::new("Status", "status"),
            ColumnSpec::new("Notes", "notes"),
        ]
    }

    fn metrics() -> Vec<MetricSpec> {
        ORDER_STATUSES
            .iter()
            .map(|status| {
                let name = status.to_lowercase().replace(' ', "_");
                MetricSpec::new(&name, Metric::count_eq("status", status))
            })
            .chain(std::iter::once(MetricSpec::new(
                "total_value",
                Metric::sum_product("items", "quantity", "unit_cost"),
            )))
            .collect()
    }

    fn chart() -> Option<ChartSpec> {
        Some(ChartSpec::count_by("status"))
    }

    fn export_filename() -> &'static str {
        "purchase_orders.csv"
    }
}

pub struct ShipmentsSchema;

impl PageSchema for ShipmentsSchema {
    fn slug() -> &'static str {
        "shipments"
    }

    fn title() -> &'static str {
        "Shipments"
    }

    fn section() -> Section {
        Section::Inventory
    }

    fn entity() -> &'static str {
        "shipment"
    }

    fn fields() -> Vec<FieldDefinition> {
        vec![
            FieldDefinition::choice("type", &SHIPMENT_TYPES)
                .label("Type")
                .default_value("incoming"),
            FieldDefinition::number("po_id").label("Purchase Order").required(),
            FieldDefinition::text("courier").label("Courier").required(),
            FieldDefinition::text("tracking").label("Tracking").required(),
            FieldDefinition::date("expected_date").label("Expected Date"),
            FieldDefinition::choice("status", &SHIPMENT_STATUSES)
                .label("Status")
                .default_value("In Transit"),
            FieldDefinition::text("notes").label("Notes"),
        ]
    }

    fn search_fields() -> Vec<&'static str> {
        vec!["courier", "tracking"]
    }

    fn facets() -> Vec<&'static str> {
        vec!["type", "status"]
    }

    fn columns() -> Vec<ColumnSpec> {
        vec![
            ColumnSpec::new("Type", "type"),
            ColumnSpec::new("PO", "po_id"),
            ColumnSpec::new("Courier", "courier"),
            ColumnSpec::new("Tracking", "tracking"),
            ColumnSpec::new("Expected Date", "expected_date"),
            ColumnSpec::new("Status", "status"),
        ]
    }

    fn metrics() -> Vec<MetricSpec> {
        vec![
            MetricSpec::new("total", Metric::Count),
            MetricSpec::new("incoming", Metric::count_eq("type", "incoming")),
            MetricSpec::new("outgoing", Metric::count_eq("type", "outgoing")),
        ]
    }

    fn export_filename() -> &'static str {
        "shipments.csv"
    }
}
