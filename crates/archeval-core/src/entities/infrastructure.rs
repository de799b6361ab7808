use serde::{Deserialize, Serialize};

use super::{DataUse, InfrastructureId};
use crate::property::{infrastructure_properties, PropertySet};

/// Compute or platform resource that components and other infrastructure
/// entities are deployed on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Infrastructure {
    pub id: InfrastructureId,
    pub name: String,
    pub properties: PropertySet,
    pub backing_data_uses: Vec<DataUse>,
}

impl Infrastructure {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: InfrastructureId::new(id),
            name: name.to_string(),
            properties: infrastructure_properties(),
            backing_data_uses: Vec::new(),
        }
    }

    pub fn add_backing_data_use(&mut self, data_use: DataUse) {
        self.backing_data_uses.push(data_use);
    }

    pub fn environment_access(&self) -> &str {
        self.properties.text_of("environment_access").unwrap_or("full")
    }
}
