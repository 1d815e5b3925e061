// Summary metrics computed over a filtered view

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::framework::filter::FilteredView;
use crate::framework::record::{number_value, Record};

/// Metric name to value, as shown on the summary cards.
pub type Summary = BTreeMap<String, f64>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Condition {
    Equals(String),
    LessThan(f64),
}

impl Condition {
    fn holds(&self, record: &Record, field: &str) -> bool {
        match self {
            Condition::Equals(expected) => record.text(field) == *expected,
            Condition::LessThan(limit) => record.number(field) < *limit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Metric {
    Count,
    CountWhere { field: String, condition: Condition },
    Sum(String),
    /// Mean of a numeric field; zero over an empty view.
    Average(String),
    /// Sum over every record of its own `left * right`.
    WeightedSum { left: String, right: String },
    /// Sum over every record of `left * right` across its sub-records.
    SumProduct { list: String, left: String, right: String },
    /// Total number of sub-records held in a list field.
    ListLength(String),
    Difference(Box<Metric>, Box<Metric>),
    /// `part / whole * 100`; zero when `whole` is zero.
    Percentage { part: Box<Metric>, whole: Box<Metric> },
}

impl Metric {
    pub fn sum(field: &str) -> Self {
        Metric::Sum(field.to_string())
    }

    pub fn average(field: &str) -> Self {
        Metric::Average(field.to_string())
    }

    pub fn count_eq(field: &str, value: &str) -> Self {
        Metric::CountWhere {
            field: field.to_string(),
            condition: Condition::Equals(value.to_string()),
        }
    }

    pub fn count_below(field: &str, limit: f64) -> Self {
        Metric::CountWhere {
            field: field.to_string(),
            condition: Condition::LessThan(limit),
        }
    }

    pub fn weighted_sum(left: &str, right: &str) -> Self {
        Metric::WeightedSum {
            left: left.to_string(),
            right: right.to_string(),
        }
    }

    pub fn sum_product(list: &str, left: &str, right: &str) -> Self {
        Metric::SumProduct {
            list: list.to_string(),
            left: left.to_string(),
            right: right.to_string(),
        }
    }

    pub fn list_length(list: &str) -> Self {
        Metric::ListLength(list.to_string())
    }

    pub fn difference(minuend: Metric, subtrahend: Metric) -> Self {
        Metric::Difference(Box::new(minuend), Box::new(subtrahend))
    }

    pub fn percentage(part: Metric, whole: Metric) -> Self {
        Metric::Percentage {
            part: Box::new(part),
            whole: Box::new(whole),
        }
    }

    pub fn evaluate<'r, I>(&self, records: I) -> f64
    where
        I: Iterator<Item = &'r Record> + Clone,
    {
        match self {
            Metric::Count => records.count() as f64,
            Metric::CountWhere { field, condition } => {
                records.filter(|r| condition.holds(r, field)).count() as f64
            }
            Metric::Sum(field) => records.map(|r| r.number(field)).sum(),
            Metric::Average(field) => {
                let (total, count) = records.fold((0.0, 0usize), |(total, count), r| {
                    (total + r.number(field), count + 1)
                });
                if count == 0 {
                    0.0
                } else {
                    total / count as f64
                }
            }
            Metric::WeightedSum { left, right } => records.map(|r| r.number(left) * r.number(right)).sum(),
            Metric::SumProduct { list, left, right } => records
                .flat_map(|r| r.sub_records(list).iter())
                .map(|item| {
                    let lhs = item.get(left).map(number_value).unwrap_or(0.0);
                    let rhs = item.get(right).map(number_value).unwrap_or(0.0);
                    lhs * rhs
                })
                .sum(),
            Metric::ListLength(list) => records.map(|r| r.sub_records(list).len() as f64).sum(),
            Metric::Difference(minuend, subtrahend) => {
                minuend.evaluate(records.clone()) - subtrahend.evaluate(records)
            }
            Metric::Percentage { part, whole } => {
                let whole = whole.evaluate(records.clone());
                if whole == 0.0 {
                    0.0
                } else {
                    part.evaluate(records) / whole * 100.0
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSpec {
    pub name: String,
    pub metric: Metric,
}

impl MetricSpec {
    pub fn new(name: &str, metric: Metric) -> Self {
        Self {
            name: name.to_string(),
            metric,
        }
    }
}

impl<'a> FilteredView<'a> {
    /// Evaluate each metric over the records this view currently shows.
    pub fn aggregate(&self, metrics: &[MetricSpec]) -> Summary {
        metrics
            .iter()
            .map(|spec| (spec.name.clone(), spec.metric.evaluate(self.iter())))
            .collect()
    }
}
