//! Serde shapes of the TOSCA-style service template and the fixed node and
//! relationship type keys of the modeling profile.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const TOSCA_DEFINITIONS_VERSION: &str = "tosca_simple_yaml_1_3";

pub const COMPONENT_TYPE: &str = "cna.qualityModel.entities.Root.Component";
pub const SERVICE_TYPE: &str = "cna.qualityModel.entities.SoftwareComponent.Service";
pub const BACKING_SERVICE_TYPE: &str = "cna.qualityModel.entities.BackingService";
pub const STORAGE_BACKING_SERVICE_TYPE: &str = "cna.qualityModel.entities.StorageBackingService";
pub const PROXY_BACKING_SERVICE_TYPE: &str = "cna.qualityModel.entities.ProxyBackingService";
pub const BROKER_BACKING_SERVICE_TYPE: &str = "cna.qualityModel.entities.BrokerBackingService";
pub const ENDPOINT_TYPE: &str = "cna.qualityModel.entities.Endpoint";
pub const EXTERNAL_ENDPOINT_TYPE: &str = "cna.qualityModel.entities.Endpoint.External";
pub const DATA_AGGREGATE_TYPE: &str = "cna.qualityModel.entities.DataAggregate";
pub const BACKING_DATA_TYPE: &str = "cna.qualityModel.entities.BackingData";
pub const INFRASTRUCTURE_TYPE: &str = "cna.qualityModel.entities.Infrastructure";
pub const REQUEST_TRACE_TYPE: &str = "cna.qualityModel.entities.RequestTrace";

pub const LINK_RELATIONSHIP_TYPE: &str = "cna.qualityModel.relationships.ConnectsTo.Link";
pub const DEPLOYMENT_MAPPING_RELATIONSHIP_TYPE: &str =
    "cna.qualityModel.relationships.HostedOn.DeploymentMapping";
pub const DATA_AGGREGATE_ATTACHMENT_TYPE: &str =
    "cna.qualityModel.relationships.AttachesTo.DataAggregate";
pub const BACKING_DATA_ATTACHMENT_TYPE: &str =
    "cna.qualityModel.relationships.AttachesTo.BackingData";
pub const PROVIDES_ENDPOINT_RELATIONSHIP_TYPE: &str =
    "cna.qualityModel.relationships.Provides.Endpoint";

pub const PROVIDES_ENDPOINT: &str = "provides_endpoint";
pub const PROVIDES_EXTERNAL_ENDPOINT: &str = "provides_external_endpoint";
pub const USES_DATA: &str = "uses_data";
pub const USES_BACKING_DATA: &str = "uses_backing_data";
pub const HOST: &str = "host";
pub const ENDPOINT_LINK: &str = "endpoint_link";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceTemplate {
    pub tosca_definitions_version: String,
    pub metadata: TemplateMetadata,
    pub description: String,
    pub topology_template: TopologyTemplate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateMetadata {
    pub template_author: String,
    pub template_name: String,
    pub template_version: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopologyTemplate {
    pub node_templates: BTreeMap<String, NodeTemplate>,
    pub relationship_templates: BTreeMap<String, RelationshipTemplate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeTemplate {
    #[serde(rename = "type")]
    pub type_key: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub capabilities: BTreeMap<String, Capability>,
    /// TOSCA requirements are a list of single-entry maps: requirement name
    /// to assignment.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requirements: Vec<BTreeMap<String, RequirementAssignment>>,
}

impl NodeTemplate {
    pub fn new(type_key: &str) -> Self {
        Self {
            type_key: type_key.to_string(),
            metadata: BTreeMap::new(),
            properties: BTreeMap::new(),
            capabilities: BTreeMap::new(),
            requirements: Vec::new(),
        }
    }

    pub fn add_requirement(&mut self, name: &str, assignment: RequirementAssignment) {
        let mut entry = BTreeMap::new();
        entry.insert(name.to_string(), assignment);
        self.requirements.push(entry);
    }

    /// Assignments of every requirement with the given name, in order.
    pub fn requirements_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a RequirementAssignment> {
        self.requirements.iter().filter_map(move |entry| entry.get(name))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Capability {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequirementAssignment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capability: Option<String>,
    pub node: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationship: Option<String>,
}

impl RequirementAssignment {
    pub fn to_node(node: &str) -> Self {
        Self {
            capability: None,
            node: node.to_string(),
            relationship: None,
        }
    }

    pub fn with_relationship(node: &str, relationship: &str) -> Self {
        Self {
            capability: None,
            node: node.to_string(),
            relationship: Some(relationship.to_string()),
        }
    }

    pub fn with_capability(node: &str, capability: &str, relationship: &str) -> Self {
        Self {
            capability: Some(capability.to_string()),
            node: node.to_string(),
            relationship: Some(relationship.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipTemplate {
    #[serde(rename = "type")]
    pub type_key: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Value>,
}

impl RelationshipTemplate {
    pub fn new(type_key: &str) -> Self {
        Self {
            type_key: type_key.to_string(),
            properties: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requirements_serialize_as_named_list() {
        let mut node = NodeTemplate::new(SERVICE_TYPE);
        node.add_requirement(
            PROVIDES_ENDPOINT,
            RequirementAssignment::with_capability(
                "endpoint_a",
                "tosca.capabilities.Endpoint",
                PROVIDES_ENDPOINT_RELATIONSHIP_TYPE,
            ),
        );
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["type"], SERVICE_TYPE);
        assert_eq!(
            json["requirements"][0]["provides_endpoint"]["node"],
            "endpoint_a"
        );
    }

    #[test]
    fn test_requirements_named_filters() {
        let mut node = NodeTemplate::new(SERVICE_TYPE);
        node.add_requirement(USES_DATA, RequirementAssignment::to_node("orders"));
        node.add_requirement(HOST, RequirementAssignment::to_node("cluster"));
        node.add_requirement(USES_DATA, RequirementAssignment::to_node("customers"));

        let uses: Vec<_> = node.requirements_named(USES_DATA).map(|r| r.node.as_str()).collect();
        assert_eq!(uses, vec!["orders", "customers"]);
    }
}
