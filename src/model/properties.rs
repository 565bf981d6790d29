//! Writable page property values.
//!
//! Property updates arrive either typed (from library callers) or as raw
//! `{"type": value}` JSON (from configuration files or scripts). Both paths go through
//! [`PropertyPatch::from_raw`] or the typed constructors, so a computed or
//! unknown property type is rejected here, before any request is built.

use crate::error::SchemaError;
use crate::types::{PropertyName, TextSpan, ValidatedUrl};
use serde_json::Value;
use std::collections::BTreeMap;

/// Property types the store computes itself; writes to them are always rejected.
const COMPUTED_PROPERTY_TYPES: &[&str] = &[
    "formula",
    "rollup",
    "created_time",
    "created_by",
    "last_edited_time",
    "last_edited_by",
    "unique_id",
    "verification",
    "button",
];

/// A single property value to write onto a page.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyPatch {
    Title(Vec<TextSpan>),
    RichText(Vec<TextSpan>),
    Number(Option<f64>),
    Select(Option<String>),
    MultiSelect(Vec<String>),
    Status(Option<String>),
    Date {
        start: String,
        end: Option<String>,
    },
    Checkbox(bool),
    Url(Option<ValidatedUrl>),
    Email(Option<String>),
    PhoneNumber(Option<String>),
}

/// Property updates keyed by property name, in a stable order.
pub type PropertyPatches = BTreeMap<PropertyName, PropertyPatch>;

impl PropertyPatch {
    /// The store's type tag for this value.
    pub fn property_type(&self) -> &'static str {
        match self {
            PropertyPatch::Title(_) => "title",
            PropertyPatch::RichText(_) => "rich_text",
            PropertyPatch::Number(_) => "number",
            PropertyPatch::Select(_) => "select",
            PropertyPatch::MultiSelect(_) => "multi_select",
            PropertyPatch::Status(_) => "status",
            PropertyPatch::Date { .. } => "date",
            PropertyPatch::Checkbox(_) => "checkbox",
            PropertyPatch::Url(_) => "url",
            PropertyPatch::Email(_) => "email",
            PropertyPatch::PhoneNumber(_) => "phone_number",
        }
    }

    /// Builds a patch from a type tag and a loosely shaped JSON value.
    ///
    /// Text types accept a plain string; select types accept an option name;
    /// dates accept `"2024-01-01"` or `{"start": .., "end": ..}`.
    pub fn from_raw(property: &str, property_type: &str, value: &Value) -> Result<Self, SchemaError> {
        if COMPUTED_PROPERTY_TYPES.contains(&property_type) {
            return Err(SchemaError::ComputedProperty {
                property: property.to_string(),
                property_type: property_type.to_string(),
            });
        }

        let invalid = |reason: &str| SchemaError::InvalidField {
            field: property.to_string(),
            reason: format!("{} value {}", property_type, reason),
        };

        let patch = match property_type {
            "title" => PropertyPatch::Title(text_value(value).ok_or_else(|| invalid("must be a string"))?),
            "rich_text" => {
                PropertyPatch::RichText(text_value(value).ok_or_else(|| invalid("must be a string"))?)
            }
            "number" => match value {
                Value::Null => PropertyPatch::Number(None),
                Value::Number(n) => {
                    let n = n.as_f64().ok_or_else(|| invalid("is out of range"))?;
                    PropertyPatch::Number(Some(n))
                }
                _ => return Err(invalid("must be a number or null")),
            },
            "select" => PropertyPatch::Select(optional_string(value).map_err(|_| invalid("must be an option name"))?),
            "status" => PropertyPatch::Status(optional_string(value).map_err(|_| invalid("must be an option name"))?),
            "multi_select" => match value {
                Value::Array(items) => PropertyPatch::MultiSelect(
                    items
                        .iter()
                        .map(|item| item.as_str().map(str::to_string))
                        .collect::<Option<Vec<_>>>()
                        .ok_or_else(|| invalid("must be a list of option names"))?,
                ),
                _ => return Err(invalid("must be a list of option names")),
            },
            "date" => match value {
                Value::String(start) => PropertyPatch::Date {
                    start: start.clone(),
                    end: None,
                },
                Value::Object(map) => {
                    let start = map
                        .get("start")
                        .and_then(Value::as_str)
                        .ok_or_else(|| invalid("needs a 'start' date"))?;
                    PropertyPatch::Date {
                        start: start.to_string(),
                        end: map.get("end").and_then(Value::as_str).map(str::to_string),
                    }
                }
                _ => return Err(invalid("must be a date string or {start, end}")),
            },
            "checkbox" => PropertyPatch::Checkbox(value.as_bool().ok_or_else(|| invalid("must be a boolean"))?),
            "url" => match optional_string(value).map_err(|_| invalid("must be a string"))? {
                Some(url) => {
                    let url = ValidatedUrl::parse(&url).map_err(|e| invalid(&e.to_string()))?;
                    PropertyPatch::Url(Some(url))
                }
                None => PropertyPatch::Url(None),
            },
            "email" => PropertyPatch::Email(optional_string(value).map_err(|_| invalid("must be a string"))?),
            "phone_number" => {
                PropertyPatch::PhoneNumber(optional_string(value).map_err(|_| invalid("must be a string"))?)
            }
            other => {
                return Err(SchemaError::UnsupportedPropertyType {
                    property: property.to_string(),
                    property_type: other.to_string(),
                })
            }
        };

        patch.validate(property)?;
        Ok(patch)
    }

    /// Checks constraints the type alone doesn't capture.
    pub fn validate(&self, property: &str) -> Result<(), SchemaError> {
        match self {
            PropertyPatch::Number(Some(n)) if !n.is_finite() => Err(SchemaError::InvalidField {
                field: property.to_string(),
                reason: "number value must be finite".to_string(),
            }),
            PropertyPatch::Date { start, .. } if start.trim().is_empty() => Err(SchemaError::InvalidField {
                field: property.to_string(),
                reason: "date value needs a start".to_string(),
            }),
            _ => Ok(()),
        }
    }
}

/// Parses a `{"Name": {"type": value}}` object into typed patches.
pub fn parse_property_patches(raw: &Value) -> Result<PropertyPatches, SchemaError> {
    let object = raw.as_object().ok_or_else(|| SchemaError::InvalidField {
        field: "properties".to_string(),
        reason: "must be a JSON object keyed by property name".to_string(),
    })?;

    let mut patches = PropertyPatches::new();
    for (name, entry) in object {
        let typed = entry.as_object().filter(|m| m.len() == 1).ok_or_else(|| SchemaError::InvalidField {
            field: name.clone(),
            reason: "must be an object with exactly one type key".to_string(),
        })?;
        if let Some((property_type, value)) = typed.iter().next() {
            let patch = PropertyPatch::from_raw(name, property_type, value)?;
            patches.insert(PropertyName::new(name.clone()), patch);
        }
    }
    Ok(patches)
}

fn text_value(value: &Value) -> Option<Vec<TextSpan>> {
    match value {
        Value::String(s) => Some(vec![TextSpan::plain(s.clone())]),
        Value::Null => Some(Vec::new()),
        _ => None,
    }
}

fn optional_string(value: &Value) -> Result<Option<String>, ()> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        _ => Err(()),
    }
}
