use serde::{Deserialize, Serialize};

use super::{ComponentId, EndpointId, LinkId};
use crate::property::PropertySet;

/// A directed, design-time potential invocation from a component to another
/// component's endpoint.
///
/// The target endpoint is a non-owning reference; resolving it to its owning
/// component goes through the system's endpoint index and failing to resolve
/// is a data-integrity error there.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    pub id: LinkId,
    pub source: ComponentId,
    pub target_endpoint: EndpointId,
    pub properties: PropertySet,
}

impl Link {
    pub fn new(id: &str, source: ComponentId, target_endpoint: EndpointId) -> Self {
        Self {
            id: LinkId::new(id),
            source,
            target_endpoint,
            properties: PropertySet::default(),
        }
    }
}
