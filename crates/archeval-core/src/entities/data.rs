use serde::{Deserialize, Serialize};

use super::DataId;
use crate::property::{backing_data_properties, data_usage_properties, PropertySet, PropertyValue};

/// How a component or endpoint relates to a piece of data.
///
/// Ordered by how strongly the holder replicates the data: persisting it
/// outweighs working with it, which outweighs merely caching it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DataUsageKind {
    Usage,
    CachedUsage,
    Persistence,
}

impl DataUsageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataUsageKind::Usage => "usage",
            DataUsageKind::CachedUsage => "cached-usage",
            DataUsageKind::Persistence => "persistence",
        }
    }

    /// Numeric replication weight used by data-replication measures.
    pub fn weight(&self) -> f64 {
        match self {
            DataUsageKind::Persistence => 1.0,
            DataUsageKind::Usage => 0.75,
            DataUsageKind::CachedUsage => 0.25,
        }
    }

    fn from_property(value: &str) -> Self {
        match value {
            "persistence" => DataUsageKind::Persistence,
            "cached-usage" => DataUsageKind::CachedUsage,
            _ => DataUsageKind::Usage,
        }
    }
}

/// The typed relation record attached to each data usage. The relation owns
/// a property list of its own so that usage metadata can evolve without
/// touching the data entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataUsageRelation {
    pub id: String,
    pub properties: PropertySet,
}

impl DataUsageRelation {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            properties: data_usage_properties(),
        }
    }

    pub fn with_kind(id: &str, kind: DataUsageKind) -> Self {
        let mut relation = Self::new(id);
        // the declared key always exists on a fresh property set
        let _ = relation
            .properties
            .set_value("usage_relation", PropertyValue::Text(kind.as_str().into()));
        relation
    }

    pub fn usage_kind(&self) -> DataUsageKind {
        self.properties
            .text_of("usage_relation")
            .map(DataUsageKind::from_property)
            .unwrap_or(DataUsageKind::Usage)
    }
}

/// One data reference held by a component, endpoint, or infrastructure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataUse {
    pub data: DataId,
    pub relation: DataUsageRelation,
}

impl DataUse {
    pub fn new(data: DataId, relation: DataUsageRelation) -> Self {
        Self { data, relation }
    }
}

/// A logical unit of domain data, referenced (never owned) by components.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataAggregate {
    pub id: DataId,
    pub name: String,
}

impl DataAggregate {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: DataId::new(id),
            name: name.to_string(),
        }
    }
}

/// Non-domain data a component or infrastructure depends on, such as
/// configuration or credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackingData {
    pub id: DataId,
    pub name: String,
    pub properties: PropertySet,
}

impl BackingData {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: DataId::new(id),
            name: name.to_string(),
            properties: backing_data_properties(),
        }
    }
}
