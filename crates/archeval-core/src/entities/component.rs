use std::fmt;

use serde::{Deserialize, Serialize};

use super::{ComponentId, DataUse, Endpoint};
use crate::property::{component_properties, storage_properties, PropertySet};

/// Kind tag carried by every component instance.
///
/// Measures and the interchange conversion switch on this value instead of
/// relying on type identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComponentKind {
    Generic,
    Service,
    BackingService,
    StorageBackingService,
    ProxyBackingService,
    BrokerBackingService,
}

impl ComponentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentKind::Generic => "component",
            ComponentKind::Service => "service",
            ComponentKind::BackingService => "backing-service",
            ComponentKind::StorageBackingService => "storage-backing-service",
            ComponentKind::ProxyBackingService => "proxy-backing-service",
            ComponentKind::BrokerBackingService => "broker-backing-service",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ComponentKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "component" => Ok(ComponentKind::Generic),
            "service" => Ok(ComponentKind::Service),
            "backing-service" => Ok(ComponentKind::BackingService),
            "storage-backing-service" => Ok(ComponentKind::StorageBackingService),
            "proxy-backing-service" => Ok(ComponentKind::ProxyBackingService),
            "broker-backing-service" => Ok(ComponentKind::BrokerBackingService),
            _ => Err(anyhow::anyhow!("unknown component kind: {s}")),
        }
    }
}

/// An architectural unit corresponding to a deployable process.
///
/// Owns its endpoints exclusively; data entities are referenced through
/// typed usage relations, never owned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Component {
    pub id: ComponentId,
    pub name: String,
    pub kind: ComponentKind,
    endpoints: Vec<Endpoint>,
    external_endpoints: Vec<Endpoint>,
    pub data_uses: Vec<DataUse>,
    pub backing_data_uses: Vec<DataUse>,
    pub properties: PropertySet,
}

impl Component {
    pub fn new(id: &str, name: &str, kind: ComponentKind) -> Self {
        // Storage backing services hold state by nature; everything else is
        // presumed stateless until declared otherwise.
        let stateless_default = kind != ComponentKind::StorageBackingService;
        let mut properties = component_properties(stateless_default);
        if kind == ComponentKind::StorageBackingService {
            properties = PropertySet::new(
                properties
                    .iter()
                    .cloned()
                    .chain(storage_properties())
                    .collect(),
            );
        }
        Self {
            id: ComponentId::new(id),
            name: name.to_string(),
            kind,
            endpoints: Vec::new(),
            external_endpoints: Vec::new(),
            data_uses: Vec::new(),
            backing_data_uses: Vec::new(),
            properties,
        }
    }

    /// Add an endpoint, routing on its `external` tag. An endpoint id
    /// already present on this component is silently ignored, so the same
    /// endpoint can never appear twice or in both lists.
    pub fn add_endpoint(&mut self, endpoint: Endpoint) {
        if self.all_endpoints().any(|e| e.id == endpoint.id) {
            return;
        }
        if endpoint.external {
            self.external_endpoints.push(endpoint);
        } else {
            self.endpoints.push(endpoint);
        }
    }

    pub fn add_data_use(&mut self, data_use: DataUse) {
        self.data_uses.push(data_use);
    }

    pub fn add_backing_data_use(&mut self, data_use: DataUse) {
        self.backing_data_uses.push(data_use);
    }

    /// Internal (non-external) endpoints in insertion order.
    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    /// External endpoints in insertion order.
    pub fn external_endpoints(&self) -> &[Endpoint] {
        &self.external_endpoints
    }

    /// Internal endpoints followed by external endpoints.
    pub fn all_endpoints(&self) -> impl Iterator<Item = &Endpoint> {
        self.endpoints.iter().chain(self.external_endpoints.iter())
    }

    pub fn endpoint(&self, id: &super::EndpointId) -> Option<&Endpoint> {
        self.all_endpoints().find(|e| &e.id == id)
    }

    pub fn endpoint_mut(&mut self, id: &super::EndpointId) -> Option<&mut Endpoint> {
        self.endpoints
            .iter_mut()
            .chain(self.external_endpoints.iter_mut())
            .find(|e| &e.id == id)
    }

    pub fn is_stateless(&self) -> bool {
        self.properties.bool_of("stateless").unwrap_or(true)
    }

    pub fn shards(&self) -> f64 {
        self.properties.number_of("shards").unwrap_or(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_routed_by_external_tag() {
        let mut component = Component::new("s1", "service A", ComponentKind::Service);
        component.add_endpoint(Endpoint::new("e1", "endpoint 1"));
        component.add_endpoint(Endpoint::new_external("ee1", "external endpoint 1"));

        assert_eq!(component.endpoints().len(), 1);
        assert_eq!(component.external_endpoints().len(), 1);
        assert_eq!(component.all_endpoints().count(), 2);
    }

    #[test]
    fn test_duplicate_endpoint_ignored() {
        let mut component = Component::new("s1", "service A", ComponentKind::Service);
        component.add_endpoint(Endpoint::new("e1", "endpoint 1"));
        component.add_endpoint(Endpoint::new("e1", "endpoint 1"));
        // same id with a different tag must not land in the other list either
        component.add_endpoint(Endpoint::new_external("e1", "endpoint 1"));

        assert_eq!(component.all_endpoints().count(), 1);
    }

    #[test]
    fn test_statelessness_defaults_per_kind() {
        assert!(Component::new("s1", "a", ComponentKind::Service).is_stateless());
        assert!(Component::new("b1", "b", ComponentKind::BackingService).is_stateless());
        assert!(!Component::new("st1", "c", ComponentKind::StorageBackingService).is_stateless());
    }

    #[test]
    fn test_storage_declares_shards() {
        let storage = Component::new("st1", "storage", ComponentKind::StorageBackingService);
        assert_eq!(storage.shards(), 1.0);

        let service = Component::new("s1", "service", ComponentKind::Service);
        assert!(service.properties.get("shards").is_none());
    }

    #[test]
    fn test_kind_round_trips_through_str() {
        for kind in [
            ComponentKind::Generic,
            ComponentKind::Service,
            ComponentKind::BackingService,
            ComponentKind::StorageBackingService,
            ComponentKind::ProxyBackingService,
            ComponentKind::BrokerBackingService,
        ] {
            assert_eq!(kind.as_str().parse::<ComponentKind>().unwrap(), kind);
        }
    }
}
