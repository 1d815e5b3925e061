// Managed Record List - one page's collection with add/update/remove/filter

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::framework::filter::{FilterSpec, FilteredView};
use crate::framework::record::{Draft, Fields, Record, RecordId};
use crate::framework::schema::RecordSchema;
use crate::infrastructure::id_generator::RecordIdGenerator;

/// An ordered, schema-checked collection of records.
///
/// Records keep insertion order. Every mutation either fully applies or
/// leaves the collection untouched.
#[derive(Debug)]
pub struct ManagedRecordList {
    schema: RecordSchema,
    search_fields: Vec<String>,
    seed: Vec<Record>,
    records: Vec<Record>,
    ids: Arc<RecordIdGenerator>,
}

impl ManagedRecordList {
    pub fn new(schema: RecordSchema, search_fields: Vec<String>, ids: Arc<RecordIdGenerator>) -> Self {
        Self {
            schema,
            search_fields,
            seed: Vec::new(),
            records: Vec::new(),
            ids,
        }
    }

    /// Load example records; each may carry its own numeric `id`.
    pub fn with_seed(mut self, seed: Vec<Value>) -> AppResult<Self> {
        let mut seen = HashSet::new();
        let mut records = Vec::with_capacity(seed.len());

        for value in seed {
            let draft = Draft::from_value(value)?;
            let id = match draft.get("id").and_then(Value::as_i64) {
                Some(id) => {
                    self.ids.observe(id);
                    id
                }
                None => self.ids.next_id(),
            };
            if !seen.insert(id) {
                return Err(AppError::ConfigurationError(format!(
                    "duplicate seed id {} in {}",
                    id, self.schema.entity
                )));
            }
            let fields = self.schema.materialize(draft).map_err(|e| {
                AppError::ConfigurationError(format!("invalid seed for {}: {}", self.schema.entity, e))
            })?;
            records.push(Record::new(id, fields));
        }

        self.seed = records.clone();
        self.records = records;
        Ok(self)
    }

    pub fn schema(&self) -> &RecordSchema {
        &self.schema
    }

    pub fn search_fields(&self) -> &[String] {
        &self.search_fields
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: RecordId) -> Option<&Record> {
        self.records.iter().find(|r| r.id() == id)
    }

    /// Fresh identifier from the shared generator, for nested entries.
    pub fn next_id(&self) -> RecordId {
        self.ids.next_id()
    }

    /// Validate, coerce and append a new record.
    pub fn add(&mut self, draft: Draft) -> AppResult<Record> {
        let fields = self.schema.materialize(draft)?;
        let record = Record::new(self.ids.next_id(), fields);
        info!("{}: added record {}", self.schema.entity, record.id());
        self.records.push(record.clone());
        Ok(record)
    }

    /// Shallow-merge the draft's fields into an existing record.
    pub fn update(&mut self, id: RecordId, draft: Draft) -> AppResult<Record> {
        let changes = self.schema.coerce_partial(draft)?;
        let index = self.index_of(id)?;
        let record = &mut self.records[index];
        for (name, value) in changes {
            record.fields_mut().insert(name, value);
        }
        let updated = record.clone();
        info!("{}: updated record {}", self.schema.entity, id);
        Ok(updated)
    }

    /// Remove a record; `false` when no record had that id.
    pub fn remove(&mut self, id: RecordId) -> bool {
        let before = self.records.len();
        self.records.retain(|r| r.id() != id);
        let removed = self.records.len() < before;
        if removed {
            info!("{}: removed record {}", self.schema.entity, id);
        } else {
            debug!("{}: remove of unknown record {}", self.schema.entity, id);
        }
        removed
    }

    /// Apply a module-specific edit to one record's fields.
    ///
    /// The closure works on a copy; the record only changes when it
    /// returns `Ok`.
    pub fn modify<F>(&mut self, id: RecordId, edit: F) -> AppResult<Record>
    where
        F: FnOnce(&RecordSchema, &mut Fields) -> AppResult<()>,
    {
        let index = self.index_of(id)?;
        let mut fields = self.records[index].fields().clone();
        edit(&self.schema, &mut fields)?;

        let record = &mut self.records[index];
        *record.fields_mut() = fields;
        let modified = record.clone();
        info!("{}: modified record {}", self.schema.entity, id);
        Ok(modified)
    }

    pub fn filter<'a>(&'a self, spec: &'a FilterSpec) -> FilteredView<'a> {
        FilteredView::new(&self.records, spec, &self.search_fields)
    }

    /// Discard every change and restore the seed records.
    pub fn reset(&mut self) {
        self.records = self.seed.clone();
        info!("{}: reset to {} seed records", self.schema.entity, self.records.len());
    }

    fn index_of(&self, id: RecordId) -> AppResult<usize> {
        self.records
            .iter()
            .position(|r| r.id() == id)
            .ok_or_else(|| not_found(&self.schema, id))
    }
}

fn not_found(schema: &RecordSchema, id: RecordId) -> AppError {
    AppError::NotFound(format!("{} with id {} not found", schema.entity, id))
}
