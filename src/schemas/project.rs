// Project pages: projects, tasks, resources and the collaboration feeds

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;
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

pub const PROJECT_STATUSES: [&str; 3] = ["Ongoing", "Upcoming", "Completed"];
pub const TASK_STATUSES: [&str; 4] = ["todo", "in-progress", "completed", "on-hold"];
pub const TASK_PRIORITIES: [&str; 3] = ["low", "medium", "high"];
pub const MILESTONES: [&str; 4] = ["Planning", "Development", "Testing", "Launch"];
pub const RESOURCE_ROLES: [&str; 4] = ["Developer", "Designer", "PM", "QA"];
pub const ACTIVITY_TYPES: [&str; 3] = ["upload", "comment", "assignment"];

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

static MENTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"@(\w+)").expect("mention pattern is valid"));

pub struct ProjectsSchema;

impl PageSchema for ProjectsSchema {
    fn slug() -> &'static str {
        "projects"
    }

    fn title() -> &'static str {
        "Projects"
    }

    fn section() -> Section {
        Section::Project
    }

    fn entity() -> &'static str {
        "project"
    }

    fn fields() -> Vec<FieldDefinition> {
        vec![
            FieldDefinition::text("name").label("Name").required(),
            FieldDefinition::choice("status", &PROJECT_STATUSES)
                .label("Status")
                .default_value("Upcoming"),
            FieldDefinition::date("start_date").label("Start Date"),
            FieldDefinition::date("end_date").label("End Date"),
            FieldDefinition::number("completion")
                .label("Completion %")
                .validate(FieldValidator::Range(0.0, 100.0)),
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
            ColumnSpec::new("Start Date", "start_date"),
            ColumnSpec::new("End Date", "end_date"),
            ColumnSpec::new("Completion %", "completion"),
        ]
    }

    fn metrics() -> Vec<MetricSpec> {
        vec![
            MetricSpec::new("total", Metric::Count),
            MetricSpec::new("average_completion", Metric::average("completion")),
        ]
    }

    fn export_filename() -> &'static str {
        "projects.csv"
    }

    fn seed() -> Vec<Value> {
        vec![
            json!({"id": 1, "name": "Website Redesign", "status": "Ongoing", "start_date": "2025-09-01", "end_date": "2025-11-01", "completion": 60}),
            json!({"id": 2, "name": "Mobile App Launch", "status": "Upcoming", "start_date": "2025-11-15", "end_date": "2026-02-15", "completion": 0}),
            json!({"id": 3, "name": "Q4 Audit", "status": "Completed", "start_date": "2025-08-01", "end_date": "2025-09-30", "completion": 100}),
        ]
    }
}

pub struct TasksSchema;

impl PageSchema for TasksSchema {
    fn slug() -> &'static str {
        "tasks"
    }

    fn title() -> &'static str {
        "Tasks"
    }

    fn section() -> Section {
        Section::Project
    }

    fn entity() -> &'static str {
        "task"
    }

    fn fields() -> Vec<FieldDefinition> {
        vec![
            FieldDefinition::text("title").label("Title").required(),
            FieldDefinition::text("description").label("Description"),
            FieldDefinition::choice("priority", &TASK_PRIORITIES).label("Priority"),
            FieldDefinition::choice("status", &TASK_STATUSES).label("Status"),
            FieldDefinition::text("assignee").label("Assignee"),
            FieldDefinition::choice("milestone", &MILESTONES).label("Milestone"),
            FieldDefinition::date("due_date").label("Due Date"),
            FieldDefinition::number("hours").label("Hours"),
            FieldDefinition::text_list("comments").label("Comments"),
        ]
    }

    fn search_fields() -> Vec<&'static str> {
        vec!["title"]
    }

    fn facets() -> Vec<&'static str> {
        vec!["status", "priority", "milestone"]
    }

    fn columns() -> Vec<ColumnSpec> {
        vec![
            ColumnSpec::new("Title", "title"),
            ColumnSpec::new("Description", "description"),
            ColumnSpec::new("Priority", "priority"),
            ColumnSpec::new("Status", "status"),
            ColumnSpec::new("Assignee", "assignee"),
            ColumnSpec::new("Milestone", "milestone"),
            ColumnSpec::new("Due Date", "due_date"),
            ColumnSpec::new("Hours", "hours"),
        ]
    }

    fn metrics() -> Vec<MetricSpec> {
        vec![
            MetricSpec::new("total", Metric::Count),
            MetricSpec::new("completed", Metric::count_eq("status", "completed")),
            MetricSpec::new("in_progress", Metric::count_eq("status", "in-progress")),
            MetricSpec::new("total_hours", Metric::sum("hours")),
            MetricSpec::new(
                "completion_pct",
                Metric::percentage(Metric::count_eq("status", "completed"), Metric::Count),
            ),
        ]
    }

    fn chart() -> Option<ChartSpec> {
        Some(ChartSpec::sum_by("milestone", "hours"))
    }

    fn export_filename() -> &'static str {
        "tasks.csv"
    }

    fn seed() -> Vec<Value> {
        vec![
            json!({"id": 1, "title": "Design UI Mockups", "description": "Create wireframes", "priority": "high", "status": "in-progress", "assignee": "Alice", "milestone": "Planning", "due_date": "2025-10-10", "hours": 8, "comments": []}),
            json!({"id": 2, "title": "Code Backend API", "description": "Implement endpoints", "priority": "medium", "status": "todo", "assignee": "Bob", "milestone": "Development", "due_date": "2025-10-20", "hours": 0, "comments": []}),
            json!({"id": 3, "title": "Review Code", "description": "QA testing", "priority": "low", "status": "completed", "assignee": "Charlie", "milestone": "Development", "due_date": "2025-10-05", "hours": 4, "comments": ["Approved by PM"]}),
        ]
    }
}

/// Append a comment to a task's discussion.
pub fn add_comment(list: &mut ManagedRecordList, task_id: RecordId, text: &str) -> AppResult<Record> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AppError::Validation("Comment text is required".to_string()));
    }

    list.modify(task_id, |_, fields| {
        match fields.get_mut("comments") {
            Some(Value::Array(comments)) => comments.push(Value::String(text.to_string())),
            _ => {
                fields.insert("comments".to_string(), json!([text]));
            }
        }
        Ok(())
    })
}

pub struct ResourcesSchema;

impl PageSchema for ResourcesSchema {
    fn slug() -> &'static str {
        "resources"
    }

    fn title() -> &'static str {
        "Resources"
    }

    fn section() -> Section {
        Section::Project
    }

    fn entity() -> &'static str {
        "resource"
    }

    fn fields() -> Vec<FieldDefinition> {
        vec![
            FieldDefinition::text("name").label("Name").required(),
            FieldDefinition::choice("role", &RESOURCE_ROLES).label("Role"),
            FieldDefinition::text_list("skills").label("Skills"),
            FieldDefinition::number("utilization").label("Utilization %"),
            FieldDefinition::number("budget").label("Budget"),
        ]
    }

    fn search_fields() -> Vec<&'static str> {
        vec!["name"]
    }

    fn facets() -> Vec<&'static str> {
        vec!["role"]
    }

    fn columns() -> Vec<ColumnSpec> {
        vec![
            ColumnSpec::new("Name", "name"),
            ColumnSpec::new("Role", "role"),
            ColumnSpec::new("Skills", "skills"),
            ColumnSpec::new("Utilization %", "utilization"),
            ColumnSpec::new("Budget", "budget"),
        ]
    }

    fn metrics() -> Vec<MetricSpec> {
        vec![
            MetricSpec::new("average_utilization", Metric::average("utilization")),
            MetricSpec::new("total_budget", Metric::sum("budget")),
        ]
    }

    fn chart() -> Option<ChartSpec> {
        Some(ChartSpec::sum_by("name", "utilization"))
    }

    fn export_filename() -> &'static str {
        "resources.csv"
    }

    fn seed() -> Vec<Value> {
        vec![
            json!({"id": 1, "name": "Alice Johnson", "role": "Developer", "skills": ["React", "Node.js"], "utilization": 80, "budget": 5000}),
            json!({"id": 2, "name": "Bob Smith", "role": "Designer", "skills": ["UI/UX", "Figma"], "utilization": 60, "budget": 3000}),
            json!({"id": 3, "name": "Charlie Lee", "role": "PM", "skills": ["Agile", "Budgeting"], "utilization": 90, "budget": 4000}),
        ]
    }
}

pub struct ActivitiesSchema;

impl PageSchema for ActivitiesSchema {
    fn slug() -> &'static str {
        "activities"
    }

    fn title() -> &'static str {
        "Activity Feed"
    }

    fn section() -> Section {
        Section::Project
    }

    fn entity() -> &'static str {
        "activity"
    }

    fn fields() -> Vec<FieldDefinition> {
        vec![
            FieldDefinition::choice("type", &ACTIVITY_TYPES).label("Type"),
            FieldDefinition::text("user").label("User"),
            FieldDefinition::date("timestamp").label("Timestamp"),
            FieldDefinition::text("description").label("Description").required(),
        ]
    }

    fn search_fields() -> Vec<&'static str> {
        vec!["description"]
    }

    fn facets() -> Vec<&'static str> {
        vec!["type"]
    }

    fn columns() -> Vec<ColumnSpec> {
        vec![
            ColumnSpec::new("Type", "type"),
            ColumnSpec::new("Timestamp", "timestamp"),
            ColumnSpec::new("Description", "description"),
        ]
    }

    fn metrics() -> Vec<MetricSpec> {
        vec![MetricSpec::new("total_activities", Metric::Count)]
    }

    fn export_filename() -> &'static str {
        "activities.csv"
    }

    fn seed() -> Vec<Value> {
        vec![
            json!({"id": 1, "type": "upload", "user": "Alice", "timestamp": "2025-10-06T09:00", "description": "Uploaded design-mockup-v1.pdf"}),
            json!({"id": 2, "type": "comment", "user": "Bob", "timestamp": "2025-10-06T10:30", "description": "Commented on task #123"}),
        ]
    }
}

/// Team chat; mentions are extracted when a message is posted.
pub struct MessagesSchema;

impl PageSchema for MessagesSchema {
    fn slug() -> &'static str {
        "messages"
    }

    fn title() -> &'static str {
        "Team Chat"
    }

    fn section() -> Section {
        Section::Project
    }

    fn entity() -> &'static str {
        "message"
    }

    fn fields() -> Vec<FieldDefinition> {
        vec![
            FieldDefinition::text("user").label("User").required(),
            FieldDefinition::text("text").label("Message").required(),
            FieldDefinition::date("timestamp").label("Timestamp"),
            FieldDefinition::text_list("mentions").label("Mentions"),
        ]
    }

    fn search_fields() -> Vec<&'static str> {
        vec!["text", "user"]
    }

    fn facets() -> Vec<&'static str> {
        vec!["user"]
    }

    fn columns() -> Vec<ColumnSpec> {
        vec![
            ColumnSpec::new("User", "user"),
            ColumnSpec::new("Timestamp", "timestamp"),
            ColumnSpec::new("Message", "text"),
            ColumnSpec::new("Mentions", "mentions"),
        ]
    }

    fn metrics() -> Vec<MetricSpec> {
        vec![MetricSpec::new("total_messages", Metric::Count)]
    }

    fn chart() -> Option<ChartSpec> {
        Some(ChartSpec::count_by("user"))
    }

    fn export_filename() -> &'static str {
        "messages.csv"
    }

    fn seed() -> Vec<Value> {
        vec![
            json!({"id": 1, "user": "Alice", "text": "Hey team, updated the design doc @bob", "timestamp": "2025-10-06T09:00:00", "mentions": ["bob"]}),
            json!({"id": 2, "user": "Bob", "text": "Looks great! Starting implementation.", "timestamp": "2025-10-06T10:30:00", "mentions": []}),
        ]
    }
}

/// `@handle` mentions, lower-cased, first occurrence only.
pub fn extract_mentions(text: &str) -> Vec<String> {
    let mut mentions: Vec<String> = Vec::new();
    for capture in MENTION.captures_iter(text) {
        let handle = capture[1].to_lowercase();
        if !mentions.contains(&handle) {
            mentions.push(handle);
        }
    }
    mentions
}

pub fn post_message(
    list: &mut ManagedRecordList,
    user: &str,
    text: &str,
    now: NaiveDateTime,
) -> AppResult<Record> {
    let draft = Draft::new()
        .set("user", user)
        .set("text", text)
        .set("timestamp", now.format(TIMESTAMP_FORMAT).to_string())
        .set("mentions", extract_mentions(text));

    let record = list.add(draft)?;
    info!("{} posted message {}", user, record.id());
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::filter::FilterSpec;
    use crate::framework::page::PageDefinition;
    use crate::infrastructure::id_generator::RecordIdGenerator;
    use std::sync::Arc;

    fn list_of<S: PageSchema>() -> ManagedRecordList {
        PageDefinition::of::<S>()
            .instantiate(Arc::new(RecordIdGenerator::new()))
            .unwrap()
    }

    #[test]
    fn test_extract_mentions() {
        assert_eq!(
            extract_mentions("@Bob can you sync with @alice and @bob? mail me@home"),
            vec!["bob", "alice", "home"]
        );
        assert!(extract_mentions("no handles here").is_empty());
    }

    #[test]
    fn test_post_message_stores_mentions() {
        let mut list = list_of::<MessagesSchema>();
        let now = NaiveDateTime::parse_from_str("2025-10-06T11:00:00", TIMESTAMP_FORMAT).unwrap();

        let record = post_message(&mut list, "Charlie", "Ping @Alice", now).unwrap();
        assert_eq!(record.get("mentions"), Some(&json!(["alice"])));
        assert_eq!(record.text("timestamp"), "2025-10-06T11:00:00");

        assert!(post_message(&mut list, "Charlie", "   ", now).is_err());
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn test_add_comment() {
        let mut list = list_of::<TasksSchema>();

        let record = add_comment(&mut list, 3, "Merged").unwrap();
        assert_eq!(record.get("comments"), Some(&json!(["Approved by PM", "Merged"])));
        assert!(matches!(add_comment(&mut list, 3, ""), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_task_completion() {
        let page = PageDefinition::of::<TasksSchema>();
        let list = list_of::<TasksSchema>();
        let spec = FilterSpec::new().facet("milestone", "Development");

        let summary = list.filter(&spec).aggregate(&page.metrics);
        assert_eq!(summary["total"], 2.0);
        assert_eq!(summary["completion_pct"], 50.0);
        assert_eq!(summary["total_hours"], 4.0);
    }
}
