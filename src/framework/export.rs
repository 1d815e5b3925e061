// CSV export of a filtered view

use axum::{
    http::header,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::framework::aggregate::Metric;
use crate::framework::filter::FilteredView;
use crate::framework::record::{display_value, number_json, Record};
use crate::infrastructure::download::DownloadSink;

pub const CSV_MIME_TYPE: &str = "text/csv";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub label: String,
    pub field: String,
    /// Per-row value derived from the record instead of read from `field`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub computed: Option<Metric>,
}

impl ColumnSpec {
    pub fn new(label: &str, field: &str) -> Self {
        Self {
            label: label.to_string(),
            field: field.to_string(),
            computed: None,
        }
    }

    /// Column whose cell is `metric` evaluated over the row's record alone.
    pub fn computed(label: &str, name: &str, metric: Metric) -> Self {
        Self {
            label: label.to_string(),
            field: name.to_string(),
            computed: Some(metric),
        }
    }

    pub fn cell(&self, record: &Record) -> String {
        match &self.computed {
            Some(metric) => display_value(&number_json(metric.evaluate(std::iter::once(record)))),
            None => record.text(&self.field),
        }
    }
}

/// Header row of labels, then one row per record; fields are joined with
/// commas and rows with `\n`.
///
/// Cells are not quoted or escaped, so a value containing a comma shifts
/// the columns of its row.
pub fn render_csv<'r, I>(records: I, columns: &[ColumnSpec]) -> String
where
    I: Iterator<Item = &'r Record>,
{
    let header = columns
        .iter()
        .map(|c| c.label.as_str())
        .collect::<Vec<_>>()
        .join(",");

    std::iter::once(header)
        .chain(records.map(|record| {
            columns
                .iter()
                .map(|c| c.cell(record))
                .collect::<Vec<_>>()
                .join(",")
        }))
        .collect::<Vec<_>>()
        .join("\n")
}

impl<'a> FilteredView<'a> {
    pub fn export_csv(&self, columns: &[ColumnSpec]) -> String {
        let csv = render_csv(self.iter(), columns);
        debug!("exported {} rows", self.len());
        csv
    }
}

/// A rendered file ready to hand to a download collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvExport {
    pub filename: String,
    pub mime_type: &'static str,
    pub content: String,
}

impl CsvExport {
    pub fn new(filename: &str, content: String) -> Self {
        Self {
            filename: filename.to_string(),
            mime_type: CSV_MIME_TYPE,
            content,
        }
    }

    pub fn deliver(&self, sink: &dyn DownloadSink) {
        sink.download(&self.filename, self.mime_type, &self.content);
    }
}

impl IntoResponse for CsvExport {
    fn into_response(self) -> Response {
        let disposition = format!("attachment; filename=\"{}\"", self.filename);
        (
            [
                (header::CONTENT_TYPE, self.mime_type.to_string()),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            self.content,
        )
            .into_response()
    }
}
