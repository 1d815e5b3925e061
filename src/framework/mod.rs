// Managed record framework - generic CRUD, filtering, metrics and export

pub mod aggregate;
pub mod chart;
pub mod export;
pub mod filter;
pub mod page;
pub mod record;
pub mod record_list;
pub mod schema;

pub use aggregate::{Condition, Metric, MetricSpec, Summary};
pub use chart::{ChartPoint, ChartSpec, ChartValue};
pub use export::{render_csv, ColumnSpec, CsvExport, CSV_MIME_TYPE};
pub use filter::{Facet, FilterSpec, FilteredView, ALL};
pub use page::{FacetOptions, PageDefinition, PageSchema, Section};
pub use record::{Draft, Fields, Record, RecordId};
pub use record_list::ManagedRecordList;
pub use schema::{FieldDefinition, FieldType, FieldValidator, RecordSchema};
