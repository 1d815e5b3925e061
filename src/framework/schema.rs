// Record Schema - declarative field definitions for page collections
// Drafts are coerced and validated against a schema before they touch a collection

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::RwLock;

use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::framework::record::{
    display_value, is_blank, json_kind, number_json, number_value, Draft, Fields,
};

/// Semantic field types a page can declare.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldType {
    Text,
    /// Integer or decimal; coerced with "parse as number, default 0".
    Number,
    /// `YYYY-MM-DD`, optionally with a `THH:MM[:SS]` time part.
    Date,
    /// One of a fixed set of labels.
    Enum(Vec<String>),
    Bool,
    /// Short labels such as skills or permissions.
    TextList,
    /// Nested records such as purchase order line items.
    Records(Vec<FieldDefinition>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValidator {
    Pattern(String),
    /// IPv4 or IPv6 address.
    IpAddress,
    Range(f64, f64),
    GreaterThan(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    pub label: String,
    pub field_type: FieldType,
    pub required: bool,
    pub default: Option<Value>,
    pub validators: Vec<FieldValidator>,
}

impl FieldDefinition {
    pub fn new(name: &str, field_type: FieldType) -> Self {
        Self {
            name: name.to_string(),
            label: name.to_string(),
            field_type,
            required: false,
            default: None,
            validators: Vec::new(),
        }
    }

    pub fn text(name: &str) -> Self {
        Self::new(name, FieldType::Text)
    }

    pub fn number(name: &str) -> Self {
        Self::new(name, FieldType::Number)
    }

    pub fn date(name: &str) -> Self {
        Self::new(name, FieldType::Date)
    }

    pub fn choice(name: &str, choices: &[&str]) -> Self {
        Self::new(
            name,
            FieldType::Enum(choices.iter().map(|c| c.to_string()).collect()),
        )
    }

    pub fn boolean(name: &str) -> Self {
        Self::new(name, FieldType::Bool)
    }

    pub fn text_list(name: &str) -> Self {
        Self::new(name, FieldType::TextList)
    }

    pub fn records(name: &str, fields: Vec<FieldDefinition>) -> Self {
        Self::new(name, FieldType::Records(fields))
    }

    pub fn label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    /// Must be non-empty when a record is created.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default_value(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn validate(mut self, validator: FieldValidator) -> Self {
        self.validators.push(validator);
        self
    }

    /// Value stored when a new record's draft omits this field.
    pub fn empty_value(&self) -> Value {
        if let Some(default) = &self.default {
            return default.clone();
        }
        match &self.field_type {
            FieldType::Number => Value::from(0),
            FieldType::Bool => Value::Bool(false),
            FieldType::TextList | FieldType::Records(_) => Value::Array(Vec::new()),
            FieldType::Text | FieldType::Date | FieldType::Enum(_) => Value::String(String::new()),
        }
    }

    /// Choices for an enumerated field; empty for every other type.
    pub fn choices(&self) -> &[String] {
        match &self.field_type {
            FieldType::Enum(choices) => choices,
            _ => &[],
        }
    }

    /// Convert raw draft input into this field's stored representation.
    pub fn coerce(&self, raw: &Value) -> AppResult<Value> {
        let value = match &self.field_type {
            FieldType::Text => Value::String(display_value(raw)),
            FieldType::Number => number_json(number_value(raw)),
            FieldType::Bool => Value::Bool(match raw {
                Value::Bool(b) => *b,
                Value::String(s) => matches!(
                    s.trim().to_ascii_lowercase().as_str(),
                    "true" | "yes" | "1" | "on"
                ),
                other => number_value(other) != 0.0,
            }),
            FieldType::Date => {
                let text = display_value(raw).trim().to_string();
                if !text.is_empty() && parse_date(&text).is_none() {
                    return Err(AppError::Validation(format!(
                        "{} must be a date (YYYY-MM-DD), got '{}'",
                        self.label, text
                    )));
                }
                Value::String(text)
            }
            FieldType::Enum(choices) => {
                let text = display_value(raw);
                if is_blank(&Value::String(text.clone())) {
                    self.empty_value()
                } else if choices.iter().any(|c| *c == text)
                    || self.default.as_ref().map(display_value).as_deref() == Some(text.as_str())
                {
                    Value::String(text)
                } else {
                    return Err(AppError::Validation(format!(
                        "{} must be one of [{}], got '{}'",
                        self.label,
                        choices.join(", "),
                        text
                    )));
                }
            }
            FieldType::TextList => {
                let items: Vec<Value> = match raw {
                    Value::Null => Vec::new(),
                    Value::Array(items) => items
                        .iter()
                        .map(|item| display_value(item).trim().to_string())
                        .filter(|item| !item.is_empty())
                        .map(Value::String)
                        .collect(),
                    other => display_value(other)
                        .split(',')
                        .map(str::trim)
                        .filter(|item| !item.is_empty())
                        .map(|item| Value::String(item.to_string()))
                        .collect(),
                };
                Value::Array(items)
            }
            FieldType::Records(sub_fields) => {
                let items = match raw {
                    Value::Null => Vec::new(),
                    Value::Array(items) => items
                        .iter()
                        .map(|item| coerce_sub_record(&self.label, sub_fields, item))
                        .collect::<AppResult<Vec<_>>>()?,
                    other => {
                        return Err(AppError::Validation(format!(
                            "{} must be a list of entries, got {}",
                            self.label,
                            json_kind(other)
                        )))
                    }
                };
                Value::Array(items)
            }
        };

        self.check_validators(&value)?;
        Ok(value)
    }

    fn check_validators(&self, value: &Value) -> AppResult<()> {
        for validator in &self.validators {
            match validator {
                FieldValidator::Pattern(pattern) => {
                    let regex = compiled_pattern(pattern).map_err(|e| {
                        AppError::ConfigurationError(format!(
                            "invalid pattern for {}: {}",
                            self.name, e
                        ))
                    })?;
                    let text = display_value(value);
                    if !text.is_empty() && !regex.is_match(&text) {
                        return Err(AppError::Validation(format!(
                            "{} has an invalid format: '{}'",
                            self.label, text
                        )));
                    }
                }
                FieldValidator::IpAddress => {
                    let text = display_value(value);
                    if !text.is_empty() && text.parse::<IpAddr>().is_err() {
                        return Err(AppError::Validation(format!(
                            "{} is not a valid IP address: '{}'",
                            self.label, text
                        )));
                    }
                }
                FieldValidator::Range(min, max) => {
                    let n = number_value(value);
                    if n < *min || n > *max {
                        return Err(AppError::Validation(format!(
                            "{} must be between {} and {}",
                            self.label, min, max
                        )));
                    }
                }
                FieldValidator::GreaterThan(min) => {
                    if number_value(value) <= *min {
                        return Err(AppError::Validation(format!(
                            "{} must be greater than {}",
                            self.label, min
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Compiled validator patterns, keyed by source text.
static COMPILED_PATTERNS: Lazy<RwLock<HashMap<String, Regex>>> = Lazy::new(Default::default);

fn compiled_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    if let Some(regex) = COMPILED_PATTERNS
        .read()
        .ok()
        .and_then(|cache| cache.get(pattern).cloned())
    {
        return Ok(regex);
    }

    let regex = Regex::new(pattern)?;
    if let Ok(mut cache) = COMPILED_PATTERNS.write() {
        cache.insert(pattern.to_string(), regex.clone());
    }
    Ok(regex)
}

fn coerce_sub_record(label: &str, fields: &[FieldDefinition], raw: &Value) -> AppResult<Value> {
    let Value::Object(input) = raw else {
        return Err(AppError::Validation(format!(
            "{} entries must be objects, got {}",
            label,
            json_kind(raw)
        )));
    };

    let mut out = materialize_fields(fields, input)?;
    // Sub-records keep their own identifiers (e.g. BOM components).
    if let Some(id) = input.get("id").filter(|id| id.is_number()) {
        out.insert("id".to_string(), id.clone());
    }
    Ok(Value::Object(out))
}

/// Fill every declared field, coercing present values and defaulting the rest.
fn materialize_fields(fields: &[FieldDefinition], input: &Fields) -> AppResult<Fields> {
    let mut out = Fields::new();
    for field in fields {
        let value = match input.get(&field.name) {
            Some(raw) => {
                if field.required && is_blank(raw) {
                    return Err(missing(field));
                }
                field.coerce(raw)?
            }
            None if field.required => return Err(missing(field)),
            None => field.empty_value(),
        };
        out.insert(field.name.clone(), value);
    }
    Ok(out)
}

fn missing(field: &FieldDefinition) -> AppError {
    AppError::Validation(format!("{} is required", field.label))
}

/// Parse the date formats page inputs produce.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| {
            NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M")
                .ok()
                .map(|dt| dt.date())
        })
}

/// Field layout shared by every record in one collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordSchema {
    pub entity: String,
    pub fields: Vec<FieldDefinition>,
}

impl RecordSchema {
    pub fn new(entity: &str, fields: Vec<FieldDefinition>) -> Self {
        Self {
            entity: entity.to_string(),
            fields,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_or_err(&self, name: &str) -> AppResult<&FieldDefinition> {
        self.field(name).ok_or_else(|| {
            AppError::ConfigurationError(format!("{} has no field '{}'", self.entity, name))
        })
    }

    /// Turn a creation draft into a complete field set.
    ///
    /// Undeclared draft keys (including `id`) are dropped so every record
    /// in the collection keeps the same layout.
    pub fn materialize(&self, draft: Draft) -> AppResult<Fields> {
        materialize_fields(&self.fields, draft.fields())
    }

    /// Coerce only the fields an edit draft carries, for a shallow merge.
    pub fn coerce_partial(&self, draft: Draft) -> AppResult<Fields> {
        let mut out = Fields::new();
        for (name, raw) in draft.into_fields() {
            let Some(field) = self.field(&name) else {
                continue;
            };
            if field.required && is_blank(&raw) {
                return Err(missing(field));
            }
            out.insert(name, field.coerce(&raw)?);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ledger_like() -> RecordSchema {
        RecordSchema::new(
            "entry",
            vec![
                FieldDefinition::date("date").required(),
                FieldDefinition::text("description").required(),
                FieldDefinition::number("debit"),
                FieldDefinition::choice("category", &["Revenue", "Expense"])
                    .default_value("Uncategorized"),
            ],
        )
    }

    #[test]
    fn test_materialize_fills_defaults() {
        let fields = ledger_like()
            .materialize(
                Draft::new()
                    .set("date", "2025-09-01")
                    .set("description", "Rent")
                    .set("debit", "abc")
                    .set("unknown", "dropped"),
            )
            .unwrap();

        assert_eq!(fields["debit"], json!(0));
        assert_eq!(fields["category"], json!("Uncategorized"));
        assert!(!fields.contains_key("unknown"));
    }

    #[test]
    fn test_missing_required_field_is_validation_error() {
        let err = ledger_like()
            .materialize(Draft::new().set("date", "2025-09-01").set("description", "  "))
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("description")));
    }

    #[test]
    fn test_enum_rejects_unknown_label() {
        let err = ledger_like()
            .materialize(
                Draft::new()
                    .set("date", "2025-09-01")
                    .set("description", "x")
                    .set("category", "Bogus"),
            )
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_date_must_parse() {
        let field = FieldDefinition::date("due");
        assert!(field.coerce(&json!("2025-10-06T09:00")).is_ok());
        assert!(field.coerce(&json!("")).is_ok());
        assert!(field.coerce(&json!("next tuesday")).is_err());
    }

    #[test]
    fn test_text_list_splits_commas() {
        let field = FieldDefinition::text_list("skills");
        assert_eq!(
            field.coerce(&json!("React, Node.js ,")).unwrap(),
            json!(["React", "Node.js"])
        );
    }

    #[test]
    fn test_sub_records_coerce_numbers() {
        let field = FieldDefinition::records(
            "items",
            vec![
                FieldDefinition::text("item_id").required(),
                FieldDefinition::number("quantity"),
            ],
        );
        let value = field
            .coerce(&json!([{"item_id": "1", "quantity": "3", "id": 44}]))
            .unwrap();
        assert_eq!(value, json!([{"item_id": "1", "quantity": 3, "id": 44}]));
        assert!(field.coerce(&json!([{"quantity": 1}])).is_err());
    }

    #[test]
    fn test_greater_than_validator() {
        let field = FieldDefinition::number("budget").validate(FieldValidator::GreaterThan(0.0));
        assert!(field.coerce(&json!("0")).is_err());
        assert!(field.coerce(&json!("10")).is_ok());
    }

    #[test]
    fn test_partial_coercion_skips_absent_fields() {
        let fields = ledger_like()
            .coerce_partial(Draft::new().set("debit", "25"))
            .unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields["debit"], json!(25));

        assert!(ledger_like()
            .coerce_partial(Draft::new().set("description", ""))
            .is_err());
    }

    #[test]
    fn test_pattern_compiled_once_and_reused() {
        let pattern = r"^SKU\d{4}$";
        let field = FieldDefinition::text("code").validate(FieldValidator::Pattern(pattern.to_string()));

        assert!(field.coerce(&json!("SKU1001")).is_ok());
        let cached = COMPILED_PATTERNS.read().unwrap().get(pattern).cloned().unwrap();
        assert_eq!(cached.as_str(), pattern);

        assert!(field.coerce(&json!("sku-1")).is_err());
        assert!(field.coerce(&json!("")).is_ok());
    }

    #[test]
    fn test_invalid_pattern_is_configuration_error() {
        let field = FieldDefinition::text("code").validate(FieldValidator::Pattern("(".to_string()));
        assert!(matches!(field.coerce(&json!("x")), Err(AppError::ConfigurationError(_))));
    }

    #[test]
    fn test_ip_address_validator() {
        let field = FieldDefinition::text("ip").validate(FieldValidator::IpAddress);

        for good in ["192.168.1.10", "::1", "2001:db8::8a2e:370:7334"] {
            assert!(field.coerce(&json!(good)).is_ok(), "{} rejected", good);
        }
        for bad in ["...", "beef", "256.1.1.1", "10.0.0"] {
            assert!(field.coerce(&json!(bad)).is_err(), "{} accepted", bad);
        }
    }
}
