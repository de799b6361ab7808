use serde::{Deserialize, Serialize};

use super::{DataUse, EndpointId};
use crate::property::{
    endpoint_properties, PropertySet, ASYNCHRONOUS_ENDPOINT_KINDS, PROTOCOLS_SUPPORTING_TLS,
    SYNCHRONOUS_ENDPOINT_KINDS,
};

/// A communication entry point owned by exactly one component.
///
/// External endpoints share the same shape and are distinguished only by the
/// `external` tag; links and request traces need the distinction to tell
/// outside-reachable entry points from internal ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Endpoint {
    pub id: EndpointId,
    pub name: String,
    pub external: bool,
    pub properties: PropertySet,
    pub data_uses: Vec<DataUse>,
}

impl Endpoint {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: EndpointId::new(id),
            name: name.to_string(),
            external: false,
            properties: endpoint_properties(),
            data_uses: Vec::new(),
        }
    }

    pub fn new_external(id: &str, name: &str) -> Self {
        Self {
            external: true,
            ..Self::new(id, name)
        }
    }

    pub fn add_data_use(&mut self, data_use: DataUse) {
        self.data_uses.push(data_use);
    }

    pub fn protocol(&self) -> &str {
        self.properties.text_of("protocol").unwrap_or("http")
    }

    pub fn kind(&self) -> &str {
        self.properties.text_of("kind").unwrap_or("query")
    }

    pub fn supports_tls(&self) -> bool {
        PROTOCOLS_SUPPORTING_TLS.contains(&self.protocol())
    }

    pub fn is_synchronous(&self) -> bool {
        SYNCHRONOUS_ENDPOINT_KINDS.contains(&self.kind())
    }

    pub fn is_asynchronous(&self) -> bool {
        ASYNCHRONOUS_ENDPOINT_KINDS.contains(&self.kind())
    }

    pub fn has_health_check(&self) -> bool {
        self.properties.bool_of("health_check").unwrap_or(false)
    }

    pub fn has_readiness_check(&self) -> bool {
        self.properties.bool_of("readiness_check").unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::PropertyValue;

    #[test]
    fn test_default_endpoint_is_plain_synchronous() {
        let endpoint = Endpoint::new("e1", "endpoint 1");
        assert!(!endpoint.external);
        assert!(!endpoint.supports_tls());
        assert!(endpoint.is_synchronous());
        assert!(!endpoint.is_asynchronous());
    }

    #[test]
    fn test_tls_protocols() {
        let mut endpoint = Endpoint::new("e1", "endpoint 1");
        endpoint
            .properties
            .set_value("protocol", PropertyValue::Text("https".into()))
            .unwrap();
        assert!(endpoint.supports_tls());

        endpoint
            .properties
            .set_value("protocol", PropertyValue::Text("sftp".into()))
            .unwrap();
        assert!(endpoint.supports_tls());

        endpoint
            .properties
            .set_value("protocol", PropertyValue::Text("http".into()))
            .unwrap();
        assert!(!endpoint.supports_tls());
    }

    #[test]
    fn test_event_kind_is_asynchronous() {
        let mut endpoint = Endpoint::new_external("ee1", "external endpoint");
        assert!(endpoint.external);
        endpoint
            .properties
            .set_value("kind", PropertyValue::Text("event".into()))
            .unwrap();
        assert!(endpoint.is_asynchronous());
        assert!(!endpoint.is_synchronous());
    }
}
