// HRM pages: employees, attendance, payroll and recruitment

use serde_json::{json, Value};

use crate::framework::aggregate::{Metric, MetricSpec};
use crate::framework::chart::ChartSpec;
use crate::framework::export::ColumnSpec;
use crate::framework::page::{PageSchema, Section};
use crate::framework::schema::FieldDefinition;

pub const ATTENDANCE_STATUSES: [&str; 2] = ["Present", "Absent"];
pub const CANDIDATE_STATUSES: [&str; 4] = ["Applied", "Interview", "Hired", "Rejected"];

pub struct EmployeesSchema;

impl PageSchema for EmployeesSchema {
    fn slug() -> &'static str {
        "employees"
    }

    fn title() -> &'static str {
        "Employees"
    }

    fn section() -> Section {
        Section::Hrm
    }

    fn entity() -> &'static str {
        "employee"
    }

    fn fields() -> Vec<FieldDefinition> {
        vec![
            FieldDefinition::text("name").label("Name").required(),
            FieldDefinition::text("position").label("Position").required(),
            FieldDefinition::text("department").label("Department").required(),
        ]
    }

    fn search_fields() -> Vec<&'static str> {
        vec!["name", "position", "department"]
    }

    fn facets() -> Vec<&'static str> {
        vec!["department"]
    }

    fn columns() -> Vec<ColumnSpec> {
        vec![
            ColumnSpec::new("Name", "name"),
            ColumnSpec::new("Position", "position"),
            ColumnSpec::new("Department", "department"),
        ]
    }

    fn metrics() -> Vec<MetricSpec> {
        vec![MetricSpec::new("headcount", Metric::Count)]
    }

    fn chart() -> Option<ChartSpec> {
        Some(ChartSpec::count_by("department"))
    }

    fn export_filename() -> &'static str {
        "employees.csv"
    }

    fn seed() -> Vec<Value> {
        vec![
            json!({"id": 1, "name": "John Doe", "position": "Developer", "department": "IT"}),
            json!({"id": 2, "name": "Jane Smith", "position": "Manager", "department": "HR"}),
        ]
    }
}

/// Daily attendance; newly added people start out absent.
pub struct AttendanceSchema;

impl PageSchema for AttendanceSchema {
    fn slug() -> &'static str {
        "attendance"
    }

    fn title() -> &'static str {
        "Attendance"
    }

    fn section() -> Section {
        Section::Hrm
    }

    fn entity() -> &'static str {
        "attendance entry"
    }

    fn fields() -> Vec<FieldDefinition> {
        vec![
            FieldDefinition::text("name").label("Name").required(),
            FieldDefinition::choice("status", &ATTENDANCE_STATUSES)
                .label("Status")
                .default_value("Absent"),
        ]
    }

    fn search_fields() -> Vec<&'static str> {
        vec!["name"]
    }

    fn facets() -> Vec<&'static str> {
        vec!["status"]
    }

    fn columns() -> Vec<ColumnSpec> {
        vec![
            ColumnSpec::new("Name", "name"),
            ColumnSpec::new("Status", "status"),
        ]
    }

    fn metrics() -> Vec<MetricSpec> {
        vec![
            MetricSpec::new("total", Metric::Count),
            MetricSpec::new("present", Metric::count_eq("status", "Present")),
            MetricSpec::new("absent", Metric::count_eq("status", "Absent")),
            MetricSpec::new(
                "attendance_rate",
                Metric::percentage(Metric::count_eq("status", "Present"), Metric::Count),
            ),
        ]
    }

    fn chart() -> Option<ChartSpec> {
        Some(ChartSpec::count_by("status"))
    }

    fn export_filename() -> &'static str {
        "attendance.csv"
    }

    fn seed() -> Vec<Value> {
        vec![
            json!({"id": 1, "name": "John Doe", "status": "Present"}),
            json!({"id": 2, "name": "Jane Smith", "status": "Absent"}),
            json!({"id": 3, "name": "Alice Johnson", "status": "Present"}),
        ]
    }
}

pub struct PayrollSchema;

impl PageSchema for PayrollSchema {
    fn slug() -> &'static str {
        "payroll"
    }

    fn title() -> &'static str {
        "Payroll"
    }

    fn section() -> Section {
        Section::Hrm
    }

    fn entity() -> &'static str {
        "payroll entry"
    }

    fn fields() -> Vec<FieldDefinition> {
        vec![
            FieldDefinition::text("name").label("Name").required(),
            FieldDefinition::number("salary").label("Salary").required(),
        ]
    }

    fn search_fields() -> Vec<&'static str> {
        vec!["name"]
    }

    fn columns() -> Vec<ColumnSpec> {
        vec![
            ColumnSpec::new("Name", "name"),
            ColumnSpec::new("Salary", "salary"),
        ]
    }

    fn metrics() -> Vec<MetricSpec> {
        vec![
            MetricSpec::new("total_salary", Metric::sum("salary")),
            MetricSpec::new("headcount", Metric::Count),
            MetricSpec::new("average_salary", Metric::average("salary")),
        ]
    }

    fn export_filename() -> &'static str {
        "payroll.csv"
    }

    fn seed() -> Vec<Value> {
        vec![
            json!({"id": 1, "name": "John Doe", "salary": 50000}),
            json!({"id": 2, "name": "Jane Smith", "salary": 60000}),
        ]
    }
}

pub struct RecruitmentSchema;

impl PageSchema for RecruitmentSchema {
    fn slug() -> &'static str {
        "recruitment"
    }

    fn title() -> &'static str {
        "Recruitment"
    }

    fn section() -> Section {
        Section::Hrm
    }

    fn entity() -> &'static str {
        "candidate"
    }

    fn fields() -> Vec<FieldDefinition> {
        vec![
            FieldDefinition::text("name").label("Name").required(),
            FieldDefinition::text("position").label("Position").required(),
            FieldDefinition::choice("status", &CANDIDATE_STATUSES)
                .label("Status")
                .default_value("Applied"),
        ]
    }

    fn search_fields() -> Vec<&'static str> {
        vec!["name", "position"]
    }

    fn facets() -> Vec<&'static str> {
        vec!["status"]
    }

    fn columns() -> Vec<ColumnSpec> {
        vec![
            ColumnSpec::new("Name", "name"),
            ColumnSpec::new("Position", "position"),
            ColumnSpec::new("Status", "status"),
        ]
    }

    fn metrics() -> Vec<MetricSpec> {
        std::iter::once(MetricSpec::new("total", Metric::Count))
            .chain(
                CANDIDATE_STATUSES
                    .iter()
                    .map(|status| MetricSpec::new(&status.to_lowercase(), Metric::count_eq("status", status))),
            )
            .collect()
    }

    fn chart() -> Option<ChartSpec> {
        Some(ChartSpec::count_by("status"))
    }

    fn export_filename() -> &'static str {
        "recruitment.csv"
    }

    fn seed() -> Vec<Value> {
        vec![
            json!({"id": 1, "name": "Alice Johnson", "position": "Developer", "status": "Interview"}),
            json!({"id": 2, "name": "Bob Williams", "position": "Designer", "status": "Applied"}),
        ]
    }
}
