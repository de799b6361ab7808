use serde::{Deserialize, Serialize};

use super::{ComponentId, DeploymentMappingId, InfrastructureId};
use crate::property::{deployment_mapping_properties, PropertySet};

/// The entity placed on a host by a deployment mapping. Infrastructure may
/// itself be hosted on other infrastructure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeployedEntity {
    Component(ComponentId),
    Infrastructure(InfrastructureId),
}

/// Ternary relation: deployed entity, underlying infrastructure, and the
/// deployment properties (replica count, update strategy).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentMapping {
    pub id: DeploymentMappingId,
    pub deployed: DeployedEntity,
    pub host: InfrastructureId,
    pub properties: PropertySet,
}

impl DeploymentMapping {
    pub fn new(id: &str, deployed: DeployedEntity, host: InfrastructureId) -> Self {
        Self {
            id: DeploymentMappingId::new(id),
            deployed,
            host,
            properties: deployment_mapping_properties(),
        }
    }

    pub fn replicas(&self) -> f64 {
        self.properties.number_of("replicas").unwrap_or(1.0)
    }
}
