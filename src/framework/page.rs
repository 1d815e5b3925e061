// Page Schema - declarative configuration for one dashboard module
// A module declares its fields, filters, columns and metrics; the framework does the rest

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AppResult;
use crate::framework::aggregate::MetricSpec;
use crate::framework::chart::ChartSpec;
use crate::framework::export::ColumnSpec;
use crate::framework::filter::ALL;
use crate::framework::record_list::ManagedRecordList;
use crate::framework::schema::{FieldDefinition, RecordSchema};
use crate::infrastructure::id_generator::RecordIdGenerator;

/// Sidebar groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Section {
    Financial,
    #[serde(rename = "HRM")]
    Hrm,
    Inventory,
    #[serde(rename = "CRM")]
    Crm,
    Project,
    Manufacturing,
    Security,
    Administration,
    #[serde(rename = "E-commerce")]
    Ecommerce,
    Support,
}

/// Schema definition trait implemented by every page module.
pub trait PageSchema {
    fn slug() -> &'static str;

    fn title() -> &'static str;

    fn section() -> Section;

    /// Singular noun for one record, used in messages.
    fn entity() -> &'static str;

    fn fields() -> Vec<FieldDefinition>;

    /// Text fields the search box matches against.
    fn search_fields() -> Vec<&'static str>;

    /// Fields offered as exact-match dropdown filters.
    fn facets() -> Vec<&'static str> {
        Vec::new()
    }

    fn columns() -> Vec<ColumnSpec>;

    fn metrics() -> Vec<MetricSpec>;

    fn chart() -> Option<ChartSpec> {
        None
    }

    fn export_filename() -> &'static str;

    fn seed() -> Vec<Value> {
        Vec::new()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PageDefinition {
    pub slug: &'static str,
    pub title: &'static str,
    pub section: Section,
    pub schema: RecordSchema,
    pub search_fields: Vec<String>,
    pub facets: Vec<String>,
    pub columns: Vec<ColumnSpec>,
    pub metrics: Vec<MetricSpec>,
    pub chart: Option<ChartSpec>,
    pub export_filename: &'static str,
    #[serde(skip)]
    pub seed: Vec<Value>,
}

/// Dropdown options for one facet, `All` first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FacetOptions {
    pub field: String,
    pub options: Vec<String>,
}

impl PageDefinition {
    pub fn of<S: PageSchema>() -> Self {
        Self {
            slug: S::slug(),
            title: S::title(),
            section: S::section(),
            schema: RecordSchema::new(S::entity(), S::fields()),
            search_fields: S::search_fields().into_iter().map(String::from).collect(),
            facets: S::facets().into_iter().map(String::from).collect(),
            columns: S::columns(),
            metrics: S::metrics(),
            chart: S::chart(),
            export_filename: S::export_filename(),
            seed: S::seed(),
        }
    }

    /// Build the page's collection, loaded with its seed records.
    pub fn instantiate(&self, ids: Arc<RecordIdGenerator>) -> AppResult<ManagedRecordList> {
        ManagedRecordList::new(self.schema.clone(), self.search_fields.clone(), ids)
            .with_seed(self.seed.clone())
    }

    /// Enumerated facets list their declared choices; free-text facets list
    /// the distinct values currently present.
    pub fn facet_options(&self, list: &ManagedRecordList) -> Vec<FacetOptions> {
        self.facets
            .iter()
            .map(|field| {
                let choices = self
                    .schema
                    .field(field)
                    .map(|f| f.choices().to_vec())
                    .unwrap_or_default();
                let values = if choices.is_empty() {
                    let mut seen = BTreeSet::new();
                    list.records()
                        .iter()
                        .map(|r| r.text(field))
                        .filter(|v| !v.is_empty() && seen.insert(v.clone()))
                        .collect()
                } else {
                    choices
                };

                FacetOptions {
                    field: field.clone(),
                    options: std::iter::once(ALL.to_string()).chain(values).collect(),
                }
            })
            .collect()
    }
}
