// CRM pages: leads pipeline, customer interaction log and sales forecasts

use serde_json::{json, Value};

use crate::framework::aggregate::{Metric, MetricSpec};
use crate::framework::chart::ChartSpec;
use crate::framework::export::ColumnSpec;
use crate::framework::page::{PageSchema, Section};
use crate::framework::schema::{FieldDefinition, FieldValidator};

pub const LEAD_STAGES: [&str; 4] = ["New", "Qualified", "Proposal", "Closed"];
pub const INTERACTION_TYPES: [&str; 3] = ["email", "call", "meeting"];

pub struct LeadsSchema;

impl PageSchema for LeadsSchema {
    fn slug() -> &'static str {
        "leads"
    }

    fn title() -> &'static str {
        "Leads"
    }

    fn section() -> Section {
        Section::Crm
    }

    fn entity() -> &'static str {
        "lead"
    }

    fn fields() -> Vec<FieldDefinition> {
        vec![
            FieldDefinition::text("name").label("Name").required(),
            FieldDefinition::text("email")
                .label("Email")
                .required()
                .validate(FieldValidator::Pattern(r"^[^\s@]+@[^\s@]+\.[^\s@]+$".to_string())),
            FieldDefinition::text("company").label("Company"),
            FieldDefinition::choice("stage", &LEAD_STAGES).label("Stage"),
            FieldDefinition::number("score").label("Score"),
            FieldDefinition::number("value").label("Value"),
            FieldDefinition::date("close_date").label("Close Date"),
            FieldDefinition::text("owner").label("Owner"),
        ]
    }

    fn search_fields() -> Vec<&'static str> {
        vec!["name", "company"]
    }

    fn facets() -> Vec<&'static str> {
        vec!["stage", "owner"]
    }

    fn columns() -> Vec<ColumnSpec> {
        vec![
            ColumnSpec::new("Name", "name"),
            ColumnSpec::new("Email", "email"),
            ColumnSpec::new("Company", "company"),
            ColumnSpec::new("Stage", "stage"),
            ColumnSpec::new("Score", "score"),
            ColumnSpec::new("Value", "value"),
            ColumnSpec::new("Close Date", "close_date"),
            ColumnSpec::new("Owner", "owner"),
        ]
    }

    fn metrics() -> Vec<MetricSpec> {
        vec![
            MetricSpec::new("total_value", Metric::sum("value")),
            MetricSpec::new("average_score", Metric::average("score")),
            MetricSpec::new("qualified_count", Metric::count_eq("stage", "Qualified")),
        ]
    }

    fn chart() -> Option<ChartSpec> {
        Some(ChartSpec::sum_by("stage", "value"))
    }

    fn export_filename() -> &'static str {
        "leads.csv"
    }

    fn seed() -> Vec<Value> {
        vec![
            json!({"id": 1, "name": "John Doe", "email": "john@example.com", "company": "Acme Corp", "stage": "Qualified", "score": 75, "value": 5000, "close_date": "2025-10-15", "owner": "Alice"}),
            json!({"id": 2, "name": "Jane Smith", "email": "jane@example.com", "company": "Beta Inc", "stage": "Proposal", "score": 90, "value": 12000, "close_date": "2025-10-20", "owner": "Bob"}),
            json!({"id": 3, "name": "Bob Johnson", "email": "bob@example.com", "company": "Gamma Ltd", "stage": "New", "score": 40, "value": 3000, "close_date": "2025-11-01", "owner": "Alice"}),
        ]
    }
}

/// Interaction history with one customer account.
pub struct CustomerLogsSchema;

impl PageSchema for CustomerLogsSchema {
    fn slug() -> &'static str {
        "customer_logs"
    }

    fn title() -> &'static str {
        "Customer History"
    }

    fn section() -> Section {
        Section::Crm
    }

    fn entity() -> &'static str {
        "interaction"
    }

    fn fields() -> Vec<FieldDefinition> {
        vec![
            FieldDefinition::choice("type", &INTERACTION_TYPES).label("Type"),
            FieldDefinition::date("timestamp").label("Timestamp"),
            FieldDefinition::text("content").label("Content").required(),
            FieldDefinition::text("user").label("User"),
        ]
    }

    fn search_fields() -> Vec<&'static str> {
        vec!["content"]
    }

    fn facets() -> Vec<&'static str> {
        vec!["type"]
    }

    fn columns() -> Vec<ColumnSpec> {
        vec![
            ColumnSpec::new("Type", "type"),
            ColumnSpec::new("Timestamp", "timestamp"),
            ColumnSpec::new("Content", "content"),
            ColumnSpec::new("User", "user"),
        ]
    }

    fn metrics() -> Vec<MetricSpec> {
        vec![
            MetricSpec::new("total_interactions", Metric::Count),
            MetricSpec::new("emails", Metric::count_eq("type", "email")),
            MetricSpec::new("calls", Metric::count_eq("type", "call")),
            MetricSpec::new("meetings", Metric::count_eq("type", "meeting")),
        ]
    }

    fn chart() -> Option<ChartSpec> {
        Some(ChartSpec::count_by("type"))
    }

    fn export_filename() -> &'static str {
        "customer-logs.csv"
    }

    fn seed() -> Vec<Value> {
        vec![
            json!({"id": 1, "type": "email", "timestamp": "2025-10-01T10:00:00", "content": "Follow-up on proposal sent", "user": "Alice"}),
            json!({"id": 2, "type": "call", "timestamp": "2025-10-03T14:30:00", "content": "Discussed requirements and next steps", "user": "Bob"}),
            json!({"id": 3, "type": "meeting", "timestamp": "2025-10-05T09:00:00", "content": "In-person demo scheduled", "user": "Alice"}),
        ]
    }
}

pub struct SalesForecastsSchema;

impl PageSchema for SalesForecastsSchema {
    fn slug() -> &'static str {
        "sales_forecasts"
    }

    fn title() -> &'static str {
        "Sales Forecasting"
    }

    fn section() -> Section {
        Section::Crm
    }

    fn entity() -> &'static str {
        "forecast"
    }

    fn fields() -> Vec<FieldDefinition> {
        vec![
            FieldDefinition::text("period").label("Period").required(),
            FieldDefinition::number("expected").label("Expected"),
            FieldDefinition::number("actual").label("Actual"),
            FieldDefinition::text("rep").label("Rep"),
        ]
    }

    fn search_fields() -> Vec<&'static str> {
        vec!["period", "rep"]
    }

    fn facets() -> Vec<&'static str> {
        vec!["rep"]
    }

    fn columns() -> Vec<ColumnSpec> {
        vec![
            ColumnSpec::new("Period", "period"),
            ColumnSpec::new("Expected", "expected"),
            ColumnSpec::new("Actual", "actual"),
            ColumnSpec::new("Rep", "rep"),
        ]
    }

    fn metrics() -> Vec<MetricSpec> {
        vec![
            MetricSpec::new("total_expected", Metric::sum("expected")),
            MetricSpec::new("total_actual", Metric::sum("actual")),
            MetricSpec::new(
                "variance",
                Metric::difference(Metric::sum("actual"), Metric::sum("expected")),
            ),
            MetricSpec::new(
                "accuracy_pct",
                Metric::percentage(Metric::sum("actual"), Metric::sum("expected")),
            ),
        ]
    }

    fn chart() -> Option<ChartSpec> {
        Some(ChartSpec::sum_by("period", "actual"))
    }

    fn export_filename() -> &'static str {
        "forecasts.csv"
    }

    fn seed() -> Vec<Value> {
        vec![
            json!({"id": 1, "period": "Oct 2025", "expected": 20000, "actual": 18000, "rep": "Alice"}),
            json!({"id": 2, "period": "Nov 2025", "expected": 30000, "actual": 28000, "rep": "Bob"}),
            json!({"id": 3, "period": "Dec 2025", "expected": 40000, "actual": 35000, "rep": "Alice"}),
        ]
    }
}
