// Records and drafts - the dynamic field bags every page module stores

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::error::{AppError, AppResult};

/// Record identifier, unique within a collection and never reassigned.
pub type RecordId = i64;

/// Field name to value mapping shared by records and drafts.
pub type Fields = Map<String, Value>;

/// Separator used when a list value is rendered as a single cell.
pub const LIST_SEPARATOR: &str = "; ";

/// One entity in a page's collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    id: RecordId,
    #[serde(flatten)]
    fields: Fields,
}

impl Record {
    pub(crate) fn new(id: RecordId, fields: Fields) -> Self {
        Self { id, fields }
    }

    pub fn id(&self) -> RecordId {
        self.id
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub(crate) fn fields_mut(&mut self) -> &mut Fields {
        &mut self.fields
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Numeric view of a field; absent or non-numeric values read as zero.
    pub fn number(&self, name: &str) -> f64 {
        if name == "id" {
            return self.id as f64;
        }
        self.fields.get(name).map(number_value).unwrap_or(0.0)
    }

    /// Display text of a field, as shown in tables and CSV cells.
    pub fn text(&self, name: &str) -> String {
        if name == "id" {
            return self.id.to_string();
        }
        self.fields.get(name).map(display_value).unwrap_or_default()
    }

    /// Sub-records held in a list field.
    pub fn sub_records(&self, name: &str) -> &[Value] {
        match self.fields.get(name) {
            Some(Value::Array(items)) => items,
            _ => &[],
        }
    }
}

/// Staged, editable input for a record that is being created or edited.
///
/// Values are kept as the user typed them (usually text) and are only
/// coerced into their schema types when the draft is committed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Draft {
    fields: Fields,
}

impl Draft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: impl Into<Value>) {
        self.fields.insert(name.to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn into_fields(self) -> Fields {
        self.fields
    }

    /// Accept a JSON object as a draft.
    pub fn from_value(value: Value) -> AppResult<Self> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(AppError::BadRequest(format!(
                "record input must be a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Stage an existing record for editing: scalars become text.
    pub fn from_record(record: &Record) -> Self {
        let fields = record
            .fields()
            .iter()
            .map(|(name, value)| {
                let staged = match value {
                    Value::Number(_) | Value::Bool(_) => Value::String(display_value(value)),
                    other => other.clone(),
                };
                (name.clone(), staged)
            })
            .collect();
        Self { fields }
    }
}

impl From<Fields> for Draft {
    fn from(fields: Fields) -> Self {
        Self { fields }
    }
}

/// "Convert to number, or zero."
pub fn number_value(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed.parse::<f64>().unwrap_or(0.0)
            }
        }
        Value::Bool(true) => 1.0,
        _ => 0.0,
    };
    if parsed.is_finite() {
        parsed
    } else {
        0.0
    }
}

/// JSON number for `n`, keeping whole numbers integral.
pub fn number_json(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < 9.0e15 {
        Value::Number(Number::from(n as i64))
    } else {
        Number::from_f64(n).map(Value::Number).unwrap_or_else(|| Value::from(0))
    }
}

pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_i64() {
            Some(i) => i.to_string(),
            None => n.as_f64().map(|f| f.to_string()).unwrap_or_default(),
        },
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(display_value)
            .collect::<Vec<_>>()
            .join(LIST_SEPARATOR),
        Value::Object(fields) => fields
            .iter()
            .map(|(k, v)| format!("{}={}", k, display_value(v)))
            .collect::<Vec<_>>()
            .join(" "),
    }
}

/// Empty for the purpose of required-field checks.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
