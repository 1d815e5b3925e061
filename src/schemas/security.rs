// Security pages: IP allow-list and pending allow-list requests

use serde_json::{json, Value};
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::framework::aggregate::{Metric, MetricSpec};
use crate::framework::export::ColumnSpec;
use crate::framework::page::{PageSchema, Section};
use crate::framework::record::{Draft, Record, RecordId};
use crate::framework::record_list::ManagedRecordList;
use crate::framework::schema::{FieldDefinition, FieldValidator};

pub const REQUEST_STATUSES: [&str; 3] = ["Pending", "Approved", "Rejected"];

fn ip_field() -> FieldDefinition {
    FieldDefinition::text("ip")
        .label("IP Address")
        .required()
        .validate(FieldValidator::IpAddress)
}

pub struct IpAllowlistSchema;

impl PageSchema for IpAllowlistSchema {
    fn slug() -> &'static str {
        "ip_allowlist"
    }

    fn title() -> &'static str {
        "IP Allow-list"
    }

    fn section() -> Section {
        Section::Security
    }

    fn entity() -> &'static str {
        "allowed address"
    }

    fn fields() -> Vec<FieldDefinition> {
        vec![ip_field()]
    }

    fn search_fields() -> Vec<&'static str> {
        vec!["ip"]
    }

    fn columns() -> Vec<ColumnSpec> {
        vec![ColumnSpec::new("IP Address", "ip")]
    }

    fn metrics() -> Vec<MetricSpec> {
        vec![MetricSpec::new("allowlisted", Metric::Count)]
    }

    fn export_filename() -> &'static str {
        "ip_allowlist.csv"
    }

    fn seed() -> Vec<Value> {
        vec![
            json!({"id": 1, "ip": "192.168.1.10"}),
            json!({"id": 2, "ip": "10.0.0.5"}),
            json!({"id": 3, "ip": "172.16.0.12"}),
        ]
    }
}

pub struct IpRequestsSchema;

impl PageSchema for IpRequestsSchema {
    fn slug() -> &'static str {
        "ip_requests"
    }

    fn title() -> &'static str {
        "IP Requests"
    }

    fn section() -> Section {
        Section::Security
    }

    fn entity() -> &'static str {
        "allow-list request"
    }

    fn fields() -> Vec<FieldDefinition> {
        vec![
            ip_field(),
            FieldDefinition::choice("status", &REQUEST_STATUSES)
                .label("Status")
                .default_value("Pending"),
        ]
    }

    fn search_fields() -> Vec<&'static str> {
        vec!["ip"]
    }

    fn facets() -> Vec<&'static str> {
        vec!["status"]
    }

    fn columns() -> Vec<ColumnSpec> {
        vec![
            ColumnSpec::new("IP Address", "ip"),
            ColumnSpec::new("Status", "status"),
        ]
    }

    fn metrics() -> Vec<MetricSpec> {
        vec![MetricSpec::new("pending", Metric::count_eq("status", "Pending"))]
    }

    fn export_filename() -> &'static str {
        "ip_requests.csv"
    }

    fn seed() -> Vec<Value> {
        vec![
            json!({"id": 1, "ip": "203.0.113.25", "status": "Pending"}),
            json!({"id": 2, "ip": "198.51.100.42", "status": "Pending"}),
        ]
    }
}

/// Move a requested address onto the allow-list. Returns the new
/// allow-list entry.
pub fn approve_request(
    requests: &mut ManagedRecordList,
    allowlist: &mut ManagedRecordList,
    request_id: RecordId,
) -> AppResult<Record> {
    let ip = requests
        .get(request_id)
        .map(|r| r.text("ip"))
        .ok_or_else(|| AppError::NotFound(format!("IP request {} not found", request_id)))?;

    let entry = allowlist.add(Draft::new().set("ip", ip.as_str()))?;
    requests.remove(request_id);

    info!("Approved IP request {} for {}", request_id, ip);
    Ok(entry)
}

pub fn reject_request(requests: &mut ManagedRecordList, request_id: RecordId) -> AppResult<()> {
    if !requests.remove(request_id) {
        return Err(AppError::NotFound(format!("IP request {} not found", request_id)));
    }
    info!("Rejected IP request {}", request_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::page::PageDefinition;
    use crate::infrastructure::id_generator::RecordIdGenerator;
    use std::sync::Arc;

    fn lists() -> (ManagedRecordList, ManagedRecordList) {
        let ids = Arc::new(RecordIdGenerator::new());
        let requests = PageDefinition::of::<IpRequestsSchema>().instantiate(ids.clone()).unwrap();
        let allowlist = PageDefinition::of::<IpAllowlistSchema>().instantiate(ids).unwrap();
        (requests, allowlist)
    }

    #[test]
    fn test_approve_moves_address() {
        let (mut requests, mut allowlist) = lists();

        let entry = approve_request(&mut requests, &mut allowlist, 1).unwrap();
        assert_eq!(entry.text("ip"), "203.0.113.25");
        assert_eq!(allowlist.len(), 4);
        assert_eq!(requests.len(), 1);

        assert!(matches!(
            approve_request(&mut requests, &mut allowlist, 1),
            Err(AppError::NotFound(_))
        ));
        assert_eq!(allowlist.len(), 4);
    }

    #[test]
    fn test_reject_drops_request() {
        let (mut requests, allowlist) = lists();

        reject_request(&mut requests, 2).unwrap();
        assert!(reject_request(&mut requests, 2).is_err());
        assert_eq!(requests.len(), 1);
        assert_eq!(allowlist.len(), 3);
    }

    #[test]
    fn test_request_needs_plausible_address() {
        let (mut requests, _) = lists();
        for bad in ["not an ip", "...", "beef", "300.1.2.3"] {
            assert!(requests.add(Draft::new().set("ip", bad)).is_err(), "{} accepted", bad);
        }
        assert!(requests.add(Draft::new().set("ip", "fe80::1")).is_ok());
        let record = requests.add(Draft::new().set("ip", "10.1.2.3")).unwrap();
        assert_eq!(record.text("status"), "Pending");
    }
}
