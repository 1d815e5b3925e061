// Chart series: {label, value} pairs for the charting client

use serde::{Deserialize, Serialize};

use crate::framework::filter::FilteredView;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ChartValue {
    Count,
    Sum(String),
}

/// Group records by `label_field` and reduce each group to one value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub label_field: String,
    pub value: ChartValue,
}

impl ChartSpec {
    pub fn count_by(label_field: &str) -> Self {
        Self {
            label_field: label_field.to_string(),
            value: ChartValue::Count,
        }
    }

    pub fn sum_by(label_field: &str, value_field: &str) -> Self {
        Self {
            label_field: label_field.to_string(),
            value: ChartValue::Sum(value_field.to_string()),
        }
    }
}

impl<'a> FilteredView<'a> {
    /// Points in order of each label's first appearance.
    pub fn chart(&self, spec: &ChartSpec) -> Vec<ChartPoint> {
        let mut points: Vec<ChartPoint> = Vec::new();
        for record in self.iter() {
            let label = record.text(&spec.label_field);
            let value = match &spec.value {
                ChartValue::Count => 1.0,
                ChartValue::Sum(field) => record.number(field),
            };
            match points.iter_mut().find(|p| p.label == label) {
                Some(point) => point.value += value,
                None => points.push(ChartPoint { label, value }),
            }
        }
        points
    }
}
