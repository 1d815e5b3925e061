use std::collections::HashSet;
use std::sync::Arc;

use serde_json::json;

use erp_dashboard::framework::{
    ColumnSpec, Draft, FieldDefinition, FilterSpec, ManagedRecordList, Metric, MetricSpec, RecordSchema,
};
use erp_dashboard::infrastructure::id_generator::MAX_SAFE_ID;
use erp_dashboard::infrastructure::RecordIdGenerator;
use erp_dashboard::AppError;

fn sales_list() -> ManagedRecordList {
    let schema = RecordSchema::new(
        "sale",
        vec![
            FieldDefinition::text("name").required(),
            FieldDefinition::number("value"),
            FieldDefinition::choice("cat", &["A", "B"]),
        ],
    );
    ManagedRecordList::new(schema, vec!["name".to_string()], Arc::new(RecordIdGenerator::new()))
}

fn sale(name: &str, value: i64, cat: &str) -> Draft {
    Draft::new().set("name", name).set("value", value).set("cat", cat)
}

#[test]
fn test_add_assigns_distinct_ids() {
    let mut list = sales_list();
    let mut ids = HashSet::new();

    for i in 0..200 {
        let record = list.add(sale(&format!("sale {}", i), i, "A")).unwrap();
        assert!(ids.insert(record.id()), "duplicate id {}", record.id());
    }
    assert_eq!(list.len(), 200);
}

#[test]
fn test_ids_round_trip_through_json_numbers() {
    let mut list = sales_list();

    for i in 0..500 {
        let record = list.add(sale("burst", i, "B")).unwrap();
        let id = record.id();
        assert!(id <= MAX_SAFE_ID, "id {} exceeds 2^53 - 1", id);
        assert_eq!(record.number("id") as i64, id);
    }
}

#[test]
fn test_update_keeps_id_and_position() {
    let mut list = sales_list();
    let first = list.add(sale("first", 1, "A")).unwrap();
    let second = list.add(sale("second", 2, "B")).unwrap();
    let third = list.add(sale("third", 3, "A")).unwrap();

    let updated = list
        .update(second.id(), Draft::new().set("value", "25").set("cat", "A"))
        .unwrap();
    assert_eq!(updated.id(), second.id());
    assert_eq!(updated.number("value"), 25.0);
    assert_eq!(updated.text("name"), "second");

    let order: Vec<_> = list.records().iter().map(|r| r.id()).collect();
    assert_eq!(order, vec![first.id(), second.id(), third.id()]);

    assert!(matches!(list.update(-1, Draft::new()), Err(AppError::NotFound(_))));
}

#[test]
fn test_failed_update_leaves_record_untouched() {
    let mut list = sales_list();
    let record = list.add(sale("keep", 5, "B")).unwrap();

    assert!(list.update(record.id(), Draft::new().set("name", "  ")).is_err());
    assert!(list.update(record.id(), Draft::new().set("cat", "Z")).is_err());
    assert_eq!(list.get(record.id()), Some(&record));
}

#[test]
fn test_remove_twice() {
    let mut list = sales_list();
    let record = list.add(sale("gone", 1, "A")).unwrap();
    list.add(sale("stays", 2, "B")).unwrap();

    assert!(list.remove(record.id()));
    assert_eq!(list.len(), 1);
    assert!(!list.remove(record.id()));
    assert_eq!(list.len(), 1);
}

#[test]
fn test_filter_is_pure_and_restartable() {
    let mut list = sales_list();
    list.add(sale("Alpha", 10, "A")).unwrap();
    list.add(sale("Beta", 20, "B")).unwrap();
    list.add(sale("alphabet", 30, "B")).unwrap();
    let before = list.records().to_vec();

    let spec = FilterSpec::new().search("ALPHA");
    let first: Vec<_> = list.filter(&spec).to_vec().into_iter().cloned().collect();
    let second: Vec<_> = list.filter(&spec).to_vec().into_iter().cloned().collect();

    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
    assert_eq!(list.records(), before.as_slice());

    let narrowed = FilterSpec::new().search("alpha").facet("cat", "B");
    let names: Vec<_> = list.filter(&narrowed).iter().map(|r| r.text("name")).collect();
    assert_eq!(names, vec!["alphabet"]);
}

#[test]
fn test_aggregate_uses_filtered_view() {
    let mut list = sales_list();
    list.add(sale("x", 10, "A")).unwrap();
    list.add(sale("y", 20, "B")).unwrap();
    let metrics = vec![MetricSpec::new("total", Metric::sum("value"))];

    let only_a = FilterSpec::new().facet("cat", "A");
    assert_eq!(list.filter(&only_a).aggregate(&metrics)["total"], 10.0);

    let all = FilterSpec::new().facet("cat", "All");
    assert_eq!(list.filter(&all).aggregate(&metrics)["total"], 30.0);
}

#[test]
fn test_percentage_of_empty_view_is_zero() {
    let list = sales_list();
    let metrics = vec![
        MetricSpec::new("share", Metric::percentage(Metric::count_eq("cat", "A"), Metric::Count)),
        MetricSpec::new("mean", Metric::average("value")),
    ];

    let summary = list.filter(&FilterSpec::new()).aggregate(&metrics);
    assert_eq!(summary["share"], 0.0);
    assert_eq!(summary["mean"], 0.0);
    assert!(summary.values().all(|v| v.is_finite()));
}

#[test]
fn test_csv_export_of_simple_data() {
    let schema = RecordSchema::new(
        "account",
        vec![FieldDefinition::text("name"), FieldDefinition::number("amount")],
    );
    let mut list = ManagedRecordList::new(schema, Vec::new(), Arc::new(RecordIdGenerator::new()));
    list.add(Draft::new().set("name", "Acme").set("amount", 100)).unwrap();

    let columns = vec![ColumnSpec::new("name", "name"), ColumnSpec::new("amount", "amount")];
    assert_eq!(list.filter(&FilterSpec::new()).export_csv(&columns), "name,amount\nAcme,100");
}

#[test]
fn test_seed_ids_are_never_reissued() {
    let schema = RecordSchema::new("item", vec![FieldDefinition::text("name")]);
    let list = ManagedRecordList::new(schema, Vec::new(), Arc::new(RecordIdGenerator::new()))
        .with_seed(vec![json!({"id": 1, "name": "a"}), json!({"id": 2, "name": "b"})]);
    let mut list = list.unwrap();

    let added = list.add(Draft::new().set("name", "c")).unwrap();
    assert!(added.id() > 2);

    list.remove(1);
    list.reset();
    assert_eq!(list.len(), 2);
    assert!(list.get(added.id()).is_none());
}
