// E-commerce pages: point-of-sale cart and online store listings

use serde_json::{json, Value};
use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::framework::aggregate::{Metric, MetricSpec};
use crate::framework::chart::ChartSpec;
use crate::framework::export::ColumnSpec;
use crate::framework::page::{PageSchema, Section};
use crate::framework::record::{number_json, number_value, Draft, Fields, Record, RecordId};
use crate::framework::record_list::ManagedRecordList;
use crate::framework::schema::{FieldDefinition, FieldValidator};

pub const OUT_OF_STOCK: &str = "Out of stock!";
pub const DEFAULT_PLATFORM: &str = "Shopify";

fn non_negative(field: FieldDefinition) -> FieldDefinition {
    field.validate(FieldValidator::Range(0.0, f64::MAX))
}

/// Products on the shop floor, with the units left to sell.
pub struct PosProductsSchema;

impl PageSchema for PosProductsSchema {
    fn slug() -> &'static str {
        "pos_products"
    }

    fn title() -> &'static str {
        "POS Products"
    }

    fn section() -> Section {
        Section::Ecommerce
    }

    fn entity() -> &'static str {
        "product"
    }

    fn fields() -> Vec<FieldDefinition> {
        vec![
            FieldDefinition::text("name").label("Product").required(),
            non_negative(FieldDefinition::number("price").label("Price")),
            non_negative(FieldDefinition::number("stock").label("Stock")),
        ]
    }

    fn search_fields() -> Vec<&'static str> {
        vec!["name"]
    }

    fn columns() -> Vec<ColumnSpec> {
        vec![
            ColumnSpec::new("Product", "name"),
            ColumnSpec::new("Price", "price"),
            ColumnSpec::new("Stock", "stock"),
        ]
    }

    fn metrics() -> Vec<MetricSpec> {
        vec![
            MetricSpec::new("total_products", Metric::Count),
            MetricSpec::new("total_stock", Metric::sum("stock")),
            MetricSpec::new("out_of_stock", Metric::count_below("stock", 1.0)),
        ]
    }

    fn chart() -> Option<ChartSpec> {
        Some(ChartSpec::sum_by("name", "stock"))
    }

    fn export_filename() -> &'static str {
        "pos_products.csv"
    }

    fn seed() -> Vec<Value> {
        vec![
            json!({"id": 1, "name": "T-Shirt", "price": 25, "stock": 10}),
            json!({"id": 2, "name": "Jeans", "price": 40, "stock": 5}),
            json!({"id": 3, "name": "Jacket", "price": 70, "stock": 8}),
        ]
    }
}

/// One cart line per unit rung up; starts empty.
pub struct PosCartSchema;

impl PageSchema for PosCartSchema {
    fn slug() -> &'static str {
        "pos_cart"
    }

    fn title() -> &'static str {
        "POS Cart"
    }

    fn section() -> Section {
        Section::Ecommerce
    }

    fn entity() -> &'static str {
        "cart line"
    }

    fn fields() -> Vec<FieldDefinition> {
        vec![
            FieldDefinition::number("product_id").label("Product ID").required(),
            FieldDefinition::text("name").label("Product").required(),
            non_negative(FieldDefinition::number("price").label("Price")),
        ]
    }

    fn search_fields() -> Vec<&'static str> {
        vec!["name"]
    }

    fn columns() -> Vec<ColumnSpec> {
        vec![
            ColumnSpec::new("Product", "name"),
            ColumnSpec::new("Price", "price"),
        ]
    }

    fn metrics() -> Vec<MetricSpec> {
        vec![
            MetricSpec::new("items", Metric::Count),
            MetricSpec::new("total", Metric::sum("price")),
        ]
    }

    fn export_filename() -> &'static str {
        "pos_cart.csv"
    }
}

/// Products synced from an online storefront.
pub struct OnlineProductsSchema;

impl PageSchema for OnlineProductsSchema {
    fn slug() -> &'static str {
        "online_products"
    }

    fn title() -> &'static str {
        "Online Sales Integration"
    }

    fn section() -> Section {
        Section::Ecommerce
    }

    fn entity() -> &'static str {
        "online listing"
    }

    fn fields() -> Vec<FieldDefinition> {
        vec![
            FieldDefinition::text("platform")
                .label("Platform")
                .default_value(DEFAULT_PLATFORM),
            FieldDefinition::text("name").label("Product").required(),
            non_negative(FieldDefinition::number("stock").label("Stock")),
            non_negative(FieldDefinition::number("price").label("Price")),
        ]
    }

    fn search_fields() -> Vec<&'static str> {
        vec!["name"]
    }

    fn facets() -> Vec<&'static str> {
        vec!["platform"]
    }

    fn columns() -> Vec<ColumnSpec> {
        vec![
            ColumnSpec::new("Product", "name"),
            ColumnSpec::new("Stock", "stock"),
            ColumnSpec::new("Price", "price"),
        ]
    }

    fn metrics() -> Vec<MetricSpec> {
        vec![
            MetricSpec::new("total_stock", Metric::sum("stock")),
            MetricSpec::new("inventory_value", Metric::weighted_sum("stock", "price")),
        ]
    }

    fn chart() -> Option<ChartSpec> {
        Some(ChartSpec::sum_by("name", "stock"))
    }

    fn export_filename() -> &'static str {
        "online_products.csv"
    }

    fn seed() -> Vec<Value> {
        vec![
            json!({"id": 1, "platform": "Shopify", "name": "Shopify T-Shirt", "stock": 120, "price": 25}),
            json!({"id": 2, "platform": "Shopify", "name": "Shopify Jeans", "stock": 80, "price": 40}),
            json!({"id": 3, "platform": "Shopify", "name": "Shopify Jacket", "stock": 50, "price": 70}),
        ]
    }
}

fn shift_stock(fields: &mut Fields, delta: f64) {
    let stock = fields.get("stock").map(number_value).unwrap_or(0.0);
    fields.insert("stock".to_string(), number_json(stock + delta));
}

/// Ring one unit of a product into the cart, taking it out of stock.
pub fn add_to_cart(
    products: &mut ManagedRecordList,
    cart: &mut ManagedRecordList,
    product_id: RecordId,
) -> AppResult<Record> {
    let product = products
        .get(product_id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("Product {} not found", product_id)))?;
    if product.number("stock") <= 0.0 {
        return Err(AppError::Validation(OUT_OF_STOCK.to_string()));
    }

    let line = cart.add(
        Draft::new()
            .set("product_id", product_id)
            .set("name", product.text("name"))
            .set("price", product.get("price").cloned().unwrap_or(Value::from(0))),
    )?;
    products.modify(product_id, |_, fields| {
        shift_stock(fields, -1.0);
        Ok(())
    })?;

    info!("Added {} to cart as line {}", product.text("name"), line.id());
    Ok(line)
}

/// Take a line out of the cart and put its unit back on the shelf.
pub fn remove_from_cart(
    products: &mut ManagedRecordList,
    cart: &mut ManagedRecordList,
    line_id: RecordId,
) -> AppResult<()> {
    let product_id = cart
        .get(line_id)
        .map(|line| line.number("product_id") as RecordId)
        .ok_or_else(|| AppError::NotFound(format!("Cart line {} not found", line_id)))?;
    cart.remove(line_id);

    match products.modify(product_id, |_, fields| {
        shift_stock(fields, 1.0);
        Ok(())
    }) {
        Ok(_) => {}
        Err(AppError::NotFound(_)) => warn!("Product {} no longer listed, stock not restored", product_id),
        Err(e) => return Err(e),
    }

    info!("Removed cart line {}", line_id);
    Ok(())
}

/// Settle the cart and empty it. Returns the amount charged.
pub fn checkout(cart: &mut ManagedRecordList) -> AppResult<f64> {
    if cart.is_empty() {
        return Err(AppError::Validation("Cart is empty".to_string()));
    }

    let total = Metric::sum("price").evaluate(cart.records().iter());
    let lines: Vec<RecordId> = cart.records().iter().map(Record::id).collect();
    for line in &lines {
        cart.remove(*line);
    }

    info!("Checkout of {} items, total {}", lines.len(), total);
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::filter::FilterSpec;
    use crate::framework::page::PageDefinition;
    use crate::infrastructure::id_generator::RecordIdGenerator;
    use std::sync::Arc;

    fn shop() -> (PageDefinition, ManagedRecordList, ManagedRecordList) {
        let ids = Arc::new(RecordIdGenerator::new());
        let products = PageDefinition::of::<PosProductsSchema>().instantiate(ids.clone()).unwrap();
        let cart_page = PageDefinition::of::<PosCartSchema>();
        let cart = cart_page.instantiate(ids).unwrap();
        (cart_page, products, cart)
    }

    #[test]
    fn test_cart_moves_stock() {
        let (page, mut products, mut cart) = shop();

        let line = add_to_cart(&mut products, &mut cart, 2).unwrap();
        add_to_cart(&mut products, &mut cart, 3).unwrap();
        assert_eq!(products.get(2).unwrap().number("stock"), 4.0);
        assert_eq!(line.text("name"), "Jeans");

        let spec = FilterSpec::new();
        let summary = cart.filter(&spec).aggregate(&page.metrics);
        assert_eq!(summary["items"], 2.0);
        assert_eq!(summary["total"], 110.0);
        assert_eq!(cart.filter(&spec).export_csv(&page.columns), "Product,Price\nJeans,40\nJacket,70");

        remove_from_cart(&mut products, &mut cart, line.id()).unwrap();
        assert_eq!(products.get(2).unwrap().number("stock"), 5.0);
        assert_eq!(cart.len(), 1);
        assert!(matches!(
            remove_from_cart(&mut products, &mut cart, line.id()),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_out_of_stock_is_refused() {
        let (_, mut products, mut cart) = shop();
        for _ in 0..5 {
            add_to_cart(&mut products, &mut cart, 2).unwrap();
        }

        let err = add_to_cart(&mut products, &mut cart, 2).unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg == OUT_OF_STOCK));
        assert_eq!(cart.len(), 5);
        assert_eq!(products.get(2).unwrap().number("stock"), 0.0);

        assert!(matches!(add_to_cart(&mut products, &mut cart, 9), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_checkout_empties_cart() {
        let (_, mut products, mut cart) = shop();
        assert!(checkout(&mut cart).is_err());

        add_to_cart(&mut products, &mut cart, 1).unwrap();
        add_to_cart(&mut products, &mut cart, 1).unwrap();
        assert_eq!(checkout(&mut cart).unwrap(), 50.0);
        assert!(cart.is_empty());
        assert_eq!(products.get(1).unwrap().number("stock"), 8.0);
    }

    #[test]
    fn test_removing_delisted_product_still_clears_line() {
        let (_, mut products, mut cart) = shop();
        let line = add_to_cart(&mut products, &mut cart, 3).unwrap();
        products.remove(3);

        remove_from_cart(&mut products, &mut cart, line.id()).unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_online_listing_totals() {
        let page = PageDefinition::of::<OnlineProductsSchema>();
        let mut list = page.instantiate(Arc::new(RecordIdGenerator::new())).unwrap();
        let spec = FilterSpec::new().facet("platform", DEFAULT_PLATFORM);

        let summary = list.filter(&spec).aggregate(&page.metrics);
        assert_eq!(summary["total_stock"], 250.0);
        assert_eq!(summary["inventory_value"], 9700.0);

        let record = list.add(Draft::new().set("name", "Hoodie").set("stock", "4").set("price", "30")).unwrap();
        assert_eq!(record.text("platform"), DEFAULT_PLATFORM);
        assert!(list.add(Draft::new().set("name", "Bad").set("stock", "-1")).is_err());

        let csv = list.filter(&FilterSpec::new().search("hoodie")).export_csv(&page.columns);
        assert_eq!(csv, "Product,Stock,Price\nHoodie,4,30");
    }
}
