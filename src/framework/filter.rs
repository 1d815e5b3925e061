// Search and facet filtering over a collection

use serde::{Deserialize, Serialize};

use crate::framework::record::Record;

/// Facet value meaning "no constraint".
pub const ALL: &str = "All";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facet {
    pub field: String,
    pub value: String,
}

/// A search term plus exact-match facet constraints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub search: String,
    pub facets: Vec<Facet>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, term: &str) -> Self {
        self.search = term.to_string();
        self
    }

    pub fn facet(mut self, field: &str, value: &str) -> Self {
        self.facets.push(Facet {
            field: field.to_string(),
            value: value.to_string(),
        });
        self
    }

    /// Case-insensitive substring search over `search_fields`, then every facet.
    pub fn matches(&self, record: &Record, search_fields: &[String]) -> bool {
        let term = self.search.trim().to_lowercase();
        let search_hit = term.is_empty()
            || search_fields
                .iter()
                .any(|field| record.text(field).to_lowercase().contains(&term));

        search_hit
            && self.facets.iter().all(|facet| {
                facet.value.is_empty() || facet.value == ALL || record.text(&facet.field) == facet.value
            })
    }
}

/// Lazy, restartable view of the records matching a [`FilterSpec`].
///
/// Iterating never mutates the collection and keeps insertion order.
#[derive(Debug, Clone, Copy)]
pub struct FilteredView<'a> {
    records: &'a [Record],
    spec: &'a FilterSpec,
    search_fields: &'a [String],
}

impl<'a> FilteredView<'a> {
    pub(crate) fn new(records: &'a [Record], spec: &'a FilterSpec, search_fields: &'a [String]) -> Self {
        Self {
            records,
            spec,
            search_fields,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Record> + Clone + 'a {
        let spec = self.spec;
        let search_fields = self.search_fields;
        self.records
            .iter()
            .filter(move |record| spec.matches(record, search_fields))
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    pub fn to_vec(&self) -> Vec<&'a Record> {
        self.iter().collect()
    }
}
