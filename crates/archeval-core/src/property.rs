use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Protocols considered transport-encrypted.
pub const PROTOCOLS_SUPPORTING_TLS: &[&str] = &["https", "sftp"];

/// Endpoint kinds answered synchronously.
pub const SYNCHRONOUS_ENDPOINT_KINDS: &[&str] = &["query", "command"];

/// Endpoint kinds consumed asynchronously.
pub const ASYNCHRONOUS_ENDPOINT_KINDS: &[&str] = &["event"];

/// Current value of a property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Text(String),
    Number(f64),
    Bool(bool),
}

impl PropertyValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

/// Declared datatype of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    Text,
    Number,
    Boolean,
    List,
}

/// A typed, named attribute descriptor carried by an entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityProperty {
    pub key: String,
    pub name: String,
    pub description: String,
    pub example: String,
    pub required: bool,
    pub datatype: PropertyType,
    /// Allowed values when `datatype` is `List`.
    pub options: Vec<String>,
    pub value: PropertyValue,
}

impl EntityProperty {
    pub fn text(key: &str, name: &str, default: &str) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
            description: String::new(),
            example: String::new(),
            required: false,
            datatype: PropertyType::Text,
            options: Vec::new(),
            value: PropertyValue::Text(default.to_string()),
        }
    }

    pub fn number(key: &str, name: &str, default: f64) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
            description: String::new(),
            example: String::new(),
            required: false,
            datatype: PropertyType::Number,
            options: Vec::new(),
            value: PropertyValue::Number(default),
        }
    }

    pub fn boolean(key: &str, name: &str, default: bool) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
            description: String::new(),
            example: String::new(),
            required: false,
            datatype: PropertyType::Boolean,
            options: Vec::new(),
            value: PropertyValue::Bool(default),
        }
    }

    pub fn list(key: &str, name: &str, options: &[&str], default: &str) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
            description: String::new(),
            example: String::new(),
            required: false,
            datatype: PropertyType::List,
            options: options.iter().map(|o| o.to_string()).collect(),
            value: PropertyValue::Text(default.to_string()),
        }
    }
}

/// Ordered collection of declared properties for one entity.
///
/// The declared set is fixed at construction; only values change afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PropertySet(Vec<EntityProperty>);

impl PropertySet {
    pub fn new(properties: Vec<EntityProperty>) -> Self {
        Self(properties)
    }

    pub fn get(&self, key: &str) -> Option<&EntityProperty> {
        self.0.iter().find(|p| p.key == key)
    }

    pub fn value_of(&self, key: &str) -> Option<&PropertyValue> {
        self.get(key).map(|p| &p.value)
    }

    pub fn text_of(&self, key: &str) -> Option<&str> {
        self.value_of(key).and_then(|v| v.as_text())
    }

    pub fn number_of(&self, key: &str) -> Option<f64> {
        self.value_of(key).and_then(|v| v.as_number())
    }

    pub fn bool_of(&self, key: &str) -> Option<bool> {
        self.value_of(key).and_then(|v| v.as_bool())
    }

    /// Set the value of a declared property. Setting an undeclared key is an
    /// integrity error, not an insertion.
    pub fn set_value(&mut self, key: &str, value: PropertyValue) -> Result<()> {
        match self.0.iter_mut().find(|p| p.key == key) {
            Some(prop) => {
                prop.value = value;
                Ok(())
            }
            None => Err(ModelError::UnknownProperty {
                key: key.to_string(),
            }),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntityProperty> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Properties every component variant declares.
pub fn component_properties(stateless_default: bool) -> PropertySet {
    PropertySet::new(vec![
        EntityProperty::boolean("managed", "Managed", false),
        EntityProperty::boolean("stateless", "Stateless", stateless_default),
    ])
}

/// Extra properties of storage backing services.
pub fn storage_properties() -> Vec<EntityProperty> {
    vec![EntityProperty::number("shards", "Number of shards", 1.0)]
}

pub fn endpoint_properties() -> PropertySet {
    PropertySet::new(vec![
        EntityProperty::text("protocol", "Protocol", "http"),
        EntityProperty::text("url_path", "Endpoint path", ""),
        EntityProperty::text("port", "Port", ""),
        EntityProperty::list("kind", "Endpoint kind", &["query", "command", "event"], "query"),
        EntityProperty::boolean("health_check", "Health check endpoint", false),
        EntityProperty::boolean("readiness_check", "Readiness check endpoint", false),
    ])
}

pub fn infrastructure_properties() -> PropertySet {
    PropertySet::new(vec![EntityProperty::list(
        "environment_access",
        "Environment access",
        &["full", "limited", "none"],
        "full",
    )])
}

pub fn deployment_mapping_properties() -> PropertySet {
    PropertySet::new(vec![
        EntityProperty::number("replicas", "Replicas", 1.0),
        EntityProperty::list(
            "update_strategy",
            "Update strategy",
            &["rolling", "blue-green"],
            "rolling",
        ),
    ])
}

pub fn data_usage_properties() -> PropertySet {
    PropertySet::new(vec![EntityProperty::list(
        "usage_relation",
        "Usage relation",
        &["usage", "cached-usage", "persistence"],
        "usage",
    )])
}

pub fn backing_data_properties() -> PropertySet {
    PropertySet::new(vec![EntityProperty::text("kind", "Kind of data", "config")])
}
