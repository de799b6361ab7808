//! Projection of a [`System`] into a service template and back.
//!
//! The forward pass assigns every entity a normalized, collision-free
//! template key and records the key/id pairing in a [`TwoWayKeyIdMap`];
//! the reverse pass uses that same map to reconstruct the original entity
//! ids and relation structure.

use std::collections::BTreeMap;

use anyhow::{anyhow, Result};
use serde_json::Value;

use archeval_core::entities::{
    BackingData, Component, ComponentId, ComponentKind, DataAggregate, DataId, DataUsageRelation,
    DataUse, DeployedEntity, DeploymentMapping, Endpoint, EndpointId, Infrastructure,
    InfrastructureId, Link, LinkId, RequestTrace,
};
use archeval_core::property::{PropertySet, PropertyValue};
use archeval_core::System;

use crate::keys::{transform_to_key, TwoWayKeyIdMap, UniqueKeyManager};
use crate::template::{
    Capability, NodeTemplate, RelationshipTemplate, RequirementAssignment, ServiceTemplate,
    TemplateMetadata, TopologyTemplate, BACKING_DATA_ATTACHMENT_TYPE, BACKING_DATA_TYPE,
    BACKING_SERVICE_TYPE, BROKER_BACKING_SERVICE_TYPE, COMPONENT_TYPE,
    DATA_AGGREGATE_ATTACHMENT_TYPE, DATA_AGGREGATE_TYPE,
    DEPLOYMENT_MAPPING_RELATIONSHIP_TYPE, ENDPOINT_LINK, ENDPOINT_TYPE,
    EXTERNAL_ENDPOINT_TYPE, HOST, INFRASTRUCTURE_TYPE, LINK_RELATIONSHIP_TYPE,
    PROVIDES_ENDPOINT, PROVIDES_ENDPOINT_RELATIONSHIP_TYPE, PROVIDES_EXTERNAL_ENDPOINT,
    PROXY_BACKING_SERVICE_TYPE, REQUEST_TRACE_TYPE, SERVICE_TYPE,
    STORAGE_BACKING_SERVICE_TYPE, TOSCA_DEFINITIONS_VERSION, USES_BACKING_DATA, USES_DATA,
};

/// Result of one forward conversion pass: the template plus the key/id map
/// needed to go back.
#[derive(Debug, Clone)]
pub struct ToscaConversion {
    pub template: ServiceTemplate,
    pub key_id_map: TwoWayKeyIdMap,
}

fn type_key_for(kind: ComponentKind) -> &'static str {
    match kind {
        ComponentKind::Generic => COMPONENT_TYPE,
        ComponentKind::Service => SERVICE_TYPE,
        ComponentKind::BackingService => BACKING_SERVICE_TYPE,
        ComponentKind::StorageBackingService => STORAGE_BACKING_SERVICE_TYPE,
        ComponentKind::ProxyBackingService => PROXY_BACKING_SERVICE_TYPE,
        ComponentKind::BrokerBackingService => BROKER_BACKING_SERVICE_TYPE,
    }
}

fn kind_for_type_key(type_key: &str) -> Option<ComponentKind> {
    match type_key {
        COMPONENT_TYPE => Some(ComponentKind::Generic),
        SERVICE_TYPE => Some(ComponentKind::Service),
        BACKING_SERVICE_TYPE => Some(ComponentKind::BackingService),
        STORAGE_BACKING_SERVICE_TYPE => Some(ComponentKind::StorageBackingService),
        PROXY_BACKING_SERVICE_TYPE => Some(ComponentKind::ProxyBackingService),
        BROKER_BACKING_SERVICE_TYPE => Some(ComponentKind::BrokerBackingService),
        _ => None,
    }
}

fn json_value(value: &PropertyValue) -> Value {
    match value {
        PropertyValue::Text(text) => Value::from(text.as_str()),
        PropertyValue::Number(number) => Value::from(*number),
        PropertyValue::Bool(flag) => Value::from(*flag),
    }
}

fn property_values(properties: &PropertySet) -> BTreeMap<String, Value> {
    properties
        .iter()
        .map(|property| (property.key.clone(), json_value(&property.value)))
        .collect()
}

fn property_value_from_json(value: &Value) -> Option<PropertyValue> {
    match value {
        Value::String(text) => Some(PropertyValue::Text(text.clone())),
        Value::Bool(flag) => Some(PropertyValue::Bool(*flag)),
        Value::Number(number) => number.as_f64().map(PropertyValue::Number),
        _ => None,
    }
}

/// Restore declared property values from template properties. Keys the
/// entity does not declare are left alone.
fn apply_properties(properties: &mut PropertySet, values: &BTreeMap<String, Value>) {
    for (key, value) in values {
        if properties.get(key).is_none() {
            continue;
        }
        if let Some(value) = property_value_from_json(value) {
            // key existence was checked above
            let _ = properties.set_value(key, value);
        }
    }
}

struct Converter<'a> {
    system: &'a System,
    keys: UniqueKeyManager,
    map: TwoWayKeyIdMap,
    topology: TopologyTemplate,
}

impl<'a> Converter<'a> {
    fn new(system: &'a System) -> Self {
        Self {
            system,
            keys: UniqueKeyManager::new(),
            map: TwoWayKeyIdMap::new(),
            topology: TopologyTemplate::default(),
        }
    }

    fn node_key(&mut self, name: &str, id: &str) -> String {
        let key = self.keys.ensure_unique(transform_to_key(name));
        self.map.add(&key, id);
        key
    }

    /// Data-usage attachment: a relationship template plus a requirement on
    /// the using node.
    fn attach_data_use(
        &mut self,
        node: &mut NodeTemplate,
        node_key: &str,
        requirement: &str,
        attachment_type: &str,
        data_use: &DataUse,
    ) {
        let data_key = self
            .map
            .key_of(data_use.data.as_str())
            .unwrap_or(data_use.data.as_str())
            .to_string();
        let relationship_key = self
            .keys
            .ensure_unique(format!("{node_key}_uses_{data_key}"));
        let mut relationship = RelationshipTemplate::new(attachment_type);
        relationship.properties = property_values(&data_use.relation.properties);
        self.map.add(&relationship_key, &data_use.relation.id);
        self.topology
            .relationship_templates
            .insert(relationship_key.clone(), relationship);
        node.add_requirement(
            requirement,
            RequirementAssignment::with_relationship(&data_key, &relationship_key),
        );
    }

    fn endpoint_node(&mut self, endpoint: &Endpoint) -> (String, NodeTemplate) {
        let key = self.node_key(&endpoint.name, endpoint.id.as_str());
        let type_key = if endpoint.external {
            EXTERNAL_ENDPOINT_TYPE
        } else {
            ENDPOINT_TYPE
        };
        let mut node = NodeTemplate::new(type_key);
        node.metadata
            .insert("name".to_string(), endpoint.name.clone());
        let capability_name = if endpoint.external {
            "external_endpoint"
        } else {
            "endpoint"
        };
        node.capabilities.insert(
            capability_name.to_string(),
            Capability {
                properties: property_values(&endpoint.properties),
            },
        );
        for data_use in &endpoint.data_uses {
            self.attach_data_use(
                &mut node,
                &key,
                USES_DATA,
                DATA_AGGREGATE_ATTACHMENT_TYPE,
                data_use,
            );
        }
        (key, node)
    }

    fn convert(mut self, version: &str) -> ToscaConversion {
        for data in self.system.data_aggregates() {
            let key = self.node_key(&data.name, data.id.as_str());
            let mut node = NodeTemplate::new(DATA_AGGREGATE_TYPE);
            node.metadata.insert("name".to_string(), data.name.clone());
            node.capabilities
                .insert("provides_data".to_string(), Capability::default());
            self.topology.node_templates.insert(key, node);
        }

        for data in self.system.backing_data() {
            let key = self.node_key(&data.name, data.id.as_str());
            let mut node = NodeTemplate::new(BACKING_DATA_TYPE);
            node.metadata.insert("name".to_string(), data.name.clone());
            node.capabilities
                .insert("provides_data".to_string(), Capability::default());
            node.properties = property_values(&data.properties);
            self.topology.node_templates.insert(key, node);
        }

        for infrastructure in self.system.infrastructures() {
            let key = self.node_key(&infrastructure.name, infrastructure.id.as_str());
            let mut node = NodeTemplate::new(INFRASTRUCTURE_TYPE);
            node.metadata
                .insert("name".to_string(), infrastructure.name.clone());
            node.properties = property_values(&infrastructure.properties);
            for data_use in &infrastructure.backing_data_uses {
                self.attach_data_use(
                    &mut node,
                    &key,
                    USES_BACKING_DATA,
                    BACKING_DATA_ATTACHMENT_TYPE,
                    data_use,
                );
            }
            self.topology.node_templates.insert(key, node);
        }

        for component in self.system.components() {
            let key = self.node_key(&component.name, component.id.as_str());
            let mut node = NodeTemplate::new(type_key_for(component.kind));
            node.metadata
                .insert("name".to_string(), component.name.clone());
            node.properties = property_values(&component.properties);

            for endpoint in component.endpoints() {
                let (endpoint_key, endpoint_node) = self.endpoint_node(endpoint);
                self.topology
                    .node_templates
                    .insert(endpoint_key.clone(), endpoint_node);
                node.add_requirement(
                    PROVIDES_ENDPOINT,
                    RequirementAssignment::with_capability(
                        &endpoint_key,
                        "tosca.capabilities.Endpoint",
                        PROVIDES_ENDPOINT_RELATIONSHIP_TYPE,
                    ),
                );
            }
            for endpoint in component.external_endpoints() {
                let (endpoint_key, endpoint_node) = self.endpoint_node(endpoint);
                self.topology
                    .node_templates
                    .insert(endpoint_key.clone(), endpoint_node);
                node.add_requirement(
                    PROVIDES_EXTERNAL_ENDPOINT,
                    RequirementAssignment::with_capability(
                        &endpoint_key,
                        "tosca.capabilities.Endpoint.Public",
                        PROVIDES_ENDPOINT_RELATIONSHIP_TYPE,
                    ),
                );
            }
            for data_use in &component.data_uses {
                self.attach_data_use(
                    &mut node,
                    &key,
                    USES_DATA,
                    DATA_AGGREGATE_ATTACHMENT_TYPE,
                    data_use,
                );
            }
            for data_use in &component.backing_data_uses {
                self.attach_data_use(
                    &mut node,
                    &key,
                    USES_BACKING_DATA,
                    BACKING_DATA_ATTACHMENT_TYPE,
                    data_use,
                );
            }
            self.topology.node_templates.insert(key, node);
        }

        for mapping in self.system.deployment_mappings() {
            let deployed_id = match &mapping.deployed {
                DeployedEntity::Component(id) => id.as_str(),
                DeployedEntity::Infrastructure(id) => id.as_str(),
            };
            let (Some(hosted_key), Some(host_key)) = (
                self.map.key_of(deployed_id).map(str::to_string),
                self.map.key_of(mapping.host.as_str()).map(str::to_string),
            ) else {
                continue;
            };
            let relationship_key = self
                .keys
                .ensure_unique(format!("{host_key}_hosts_{hosted_key}"));
            let mut relationship = RelationshipTemplate::new(DEPLOYMENT_MAPPING_RELATIONSHIP_TYPE);
            relationship.properties = property_values(&mapping.properties);
            self.map.add(&relationship_key, mapping.id.as_str());
            self.topology
                .relationship_templates
                .insert(relationship_key.clone(), relationship);
            if let Some(hosted_node) = self.topology.node_templates.get_mut(&hosted_key) {
                hosted_node.add_requirement(
                    HOST,
                    RequirementAssignment::with_relationship(&host_key, &relationship_key),
                );
            }
        }

        for link in self.system.links() {
            let (Some(source_key), Some(target_key)) = (
                self.map.key_of(link.source.as_str()).map(str::to_string),
                self.map
                    .key_of(link.target_endpoint.as_str())
                    .map(str::to_string),
            ) else {
                continue;
            };
            let relationship_key = self
                .keys
                .ensure_unique(format!("{source_key}_linksTo_{target_key}"));
            let relationship = RelationshipTemplate::new(LINK_RELATIONSHIP_TYPE);
            self.map.add(&relationship_key, link.id.as_str());
            self.topology
                .relationship_templates
                .insert(relationship_key.clone(), relationship);
            if let Some(source_node) = self.topology.node_templates.get_mut(&source_key) {
                source_node.add_requirement(
                    ENDPOINT_LINK,
                    RequirementAssignment::with_relationship(&target_key, &relationship_key),
                );
            }
        }

        for trace in self.system.request_traces() {
            let key = self.node_key(&trace.name, trace.id.as_str());
            let mut node = NodeTemplate::new(REQUEST_TRACE_TYPE);
            node.metadata.insert("name".to_string(), trace.name.clone());
            if let Some(entry_key) = self.map.key_of(trace.external_endpoint.as_str()) {
                node.properties.insert(
                    "referred_endpoint".to_string(),
                    Value::from(entry_key),
                );
            }

            let steps: Vec<Value> = trace
                .links()
                .iter()
                .map(|step| {
                    Value::from(
                        step.iter()
                            .filter_map(|link| self.map.key_of(link.as_str()))
                            .map(Value::from)
                            .collect::<Vec<_>>(),
                    )
                })
                .collect();
            node.properties
                .insert("involved_links".to_string(), Value::from(steps));

            let mut involved_nodes: Vec<String> = Vec::new();
            for link_id in trace.flattened_links() {
                let Some(link) = self.system.link(link_id) else {
                    continue;
                };
                let mut push = |id: &str| {
                    if let Some(node_key) = self.map.key_of(id) {
                        if !involved_nodes.iter().any(|k| k == node_key) {
                            involved_nodes.push(node_key.to_string());
                        }
                    }
                };
                push(link.source.as_str());
                if let Some(target) = self.system.link_target(link) {
                    push(target.id.as_str());
                }
            }
            node.properties.insert(
                "nodes".to_string(),
                Value::from(involved_nodes),
            );
            self.topology.node_templates.insert(key, node);
        }

        let template = ServiceTemplate {
            tosca_definitions_version: TOSCA_DEFINITIONS_VERSION.to_string(),
            metadata: TemplateMetadata {
                template_author: "archeval".to_string(),
                template_name: self.system.name().to_string(),
                template_version: version.to_string(),
            },
            description: "Service template generated from an archeval model".to_string(),
            topology_template: self.topology,
        };
        ToscaConversion {
            template,
            key_id_map: self.map,
        }
    }
}

/// Project a system into a service template, returning the template plus
/// the key/id map of the pass.
pub fn system_to_template(system: &System, version: &str) -> ToscaConversion {
    Converter::new(system).convert(version)
}

fn node_name(key: &str, node: &NodeTemplate) -> String {
    node.metadata
        .get("name")
        .cloned()
        .unwrap_or_else(|| key.to_string())
}

fn data_use_from(
    requirement: &RequirementAssignment,
    topology: &TopologyTemplate,
    map: &TwoWayKeyIdMap,
) -> Result<DataUse> {
    let data_id = map
        .id_of(&requirement.node)
        .ok_or_else(|| anyhow!("no id recorded for data key '{}'", requirement.node))?;
    let relationship_key = requirement
        .relationship
        .as_deref()
        .ok_or_else(|| anyhow!("data usage of '{}' lacks a relationship", requirement.node))?;
    let relation_id = map
        .id_of(relationship_key)
        .ok_or_else(|| anyhow!("no id recorded for relationship '{relationship_key}'"))?;
    let mut relation = DataUsageRelation::new(relation_id);
    if let Some(template) = topology.relationship_templates.get(relationship_key) {
        apply_properties(&mut relation.properties, &template.properties);
    }
    Ok(DataUse::new(DataId::new(data_id), relation))
}

fn endpoint_from(
    endpoint_key: &str,
    external: bool,
    topology: &TopologyTemplate,
    map: &TwoWayKeyIdMap,
) -> Result<Endpoint> {
    let node = topology
        .node_templates
        .get(endpoint_key)
        .ok_or_else(|| anyhow!("endpoint node '{endpoint_key}' missing from template"))?;
    let id = map
        .id_of(endpoint_key)
        .ok_or_else(|| anyhow!("no id recorded for endpoint key '{endpoint_key}'"))?;
    let name = node_name(endpoint_key, node);
    let mut endpoint = if external {
        Endpoint::new_external(id, &name)
    } else {
        Endpoint::new(id, &name)
    };
    let capability_name = if external { "external_endpoint" } else { "endpoint" };
    if let Some(capability) = node.capabilities.get(capability_name) {
        apply_properties(&mut endpoint.properties, &capability.properties);
    }
    for requirement in node.requirements_named(USES_DATA) {
        endpoint.add_data_use(data_use_from(requirement, topology, map)?);
    }
    Ok(endpoint)
}

/// Rebuild a system from a template and the key/id map of its conversion
/// pass. The reconstructed system carries the same entity ids and relation
/// structure the template was generated from.
pub fn template_to_system(template: &ServiceTemplate, map: &TwoWayKeyIdMap) -> Result<System> {
    let topology = &template.topology_template;
    let mut system = System::new(&template.metadata.template_name);

    let id_for = |key: &str| -> Result<&str> {
        map.id_of(key)
            .ok_or_else(|| anyhow!("no id recorded for template key '{key}'"))
    };

    for (key, node) in &topology.node_templates {
        match node.type_key.as_str() {
            DATA_AGGREGATE_TYPE => {
                system.add_data_aggregate(DataAggregate::new(id_for(key)?, &node_name(key, node)));
            }
            BACKING_DATA_TYPE => {
                let mut data = BackingData::new(id_for(key)?, &node_name(key, node));
                apply_properties(&mut data.properties, &node.properties);
                system.add_backing_data(data);
            }
            INFRASTRUCTURE_TYPE => {
                let mut infrastructure =
                    Infrastructure::new(id_for(key)?, &node_name(key, node));
                apply_properties(&mut infrastructure.properties, &node.properties);
                for requirement in node.requirements_named(USES_BACKING_DATA) {
                    infrastructure.add_backing_data_use(data_use_from(requirement, topology, map)?);
                }
                system.add_infrastructure(infrastructure);
            }
            _ => {}
        }
    }

    for (key, node) in &topology.node_templates {
        let Some(kind) = kind_for_type_key(&node.type_key) else {
            continue;
        };
        let mut component = Component::new(id_for(key)?, &node_name(key, node), kind);
        apply_properties(&mut component.properties, &node.properties);
        for requirement in node.requirements_named(PROVIDES_ENDPOINT) {
            component.add_endpoint(endpoint_from(&requirement.node, false, topology, map)?);
        }
        for requirement in node.requirements_named(PROVIDES_EXTERNAL_ENDPOINT) {
            component.add_endpoint(endpoint_from(&requirement.node, true, topology, map)?);
        }
        for requirement in node.requirements_named(USES_DATA) {
            component.add_data_use(data_use_from(requirement, topology, map)?);
        }
        for requirement in node.requirements_named(USES_BACKING_DATA) {
            component.add_backing_data_use(data_use_from(requirement, topology, map)?);
        }
        system.add_component(component);
    }

    for (key, node) in &topology.node_templates {
        let deployed = if kind_for_type_key(&node.type_key).is_some() {
            Some(DeployedEntity::Component(ComponentId::new(id_for(key)?)))
        } else if node.type_key == INFRASTRUCTURE_TYPE {
            Some(DeployedEntity::Infrastructure(InfrastructureId::new(
                id_for(key)?,
            )))
        } else {
            None
        };

        if let Some(deployed) = &deployed {
            for requirement in node.requirements_named(HOST) {
                let relationship_key = requirement.relationship.as_deref().ok_or_else(|| {
                    anyhow!("host requirement of '{key}' lacks a relationship")
                })?;
                let mut mapping = DeploymentMapping::new(
                    id_for(relationship_key)?,
                    deployed.clone(),
                    InfrastructureId::new(id_for(&requirement.node)?),
                );
                if let Some(template) = topology.relationship_templates.get(relationship_key) {
                    apply_properties(&mut mapping.properties, &template.properties);
                }
                system.add_deployment_mapping(mapping);
            }
        }

        if kind_for_type_key(&node.type_key).is_some() {
            for requirement in node.requirements_named(ENDPOINT_LINK) {
                let relationship_key = requirement.relationship.as_deref().ok_or_else(|| {
                    anyhow!("link requirement of '{key}' lacks a relationship")
                })?;
                system.add_link(Link::new(
                    id_for(relationship_key)?,
                    ComponentId::new(id_for(key)?),
                    EndpointId::new(id_for(&requirement.node)?),
                ));
            }
        }
    }

    for (key, node) in &topology.node_templates {
        if node.type_key != REQUEST_TRACE_TYPE {
            continue;
        }
        let entry_key = node
            .properties
            .get("referred_endpoint")
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow!("request trace '{key}' lacks a referred endpoint"))?;
        let entry_id = id_for(entry_key)?;

        let mut steps: Vec<Vec<LinkId>> = Vec::new();
        if let Some(raw_steps) = node.properties.get("involved_links").and_then(Value::as_array) {
            for raw_step in raw_steps {
                let step: Vec<LinkId> = raw_step
                    .as_array()
                    .into_iter()
                    .flatten()
                    .filter_map(Value::as_str)
                    .filter_map(|link_key| map.id_of(link_key))
                    .map(LinkId::new)
                    .collect();
                steps.push(step);
            }
        }

        system.add_request_trace(RequestTrace::new(
            id_for(key)?,
            &node_name(key, node),
            EndpointId::new(entry_id),
            steps,
        ))?;
    }

    Ok(system)
}

#[cfg(test)]
mod tests {
    use super::*;
    use archeval_core::entities::RequestTraceId;

    fn data_use(data: &str, relation: &str, kind: &str) -> DataUse {
        let mut relation = DataUsageRelation::new(relation);
        relation
            .properties
            .set_value("usage_relation", PropertyValue::Text(kind.to_string()))
            .unwrap();
        DataUse::new(DataId::new(data), relation)
    }

    fn sample_system() -> System {
        let mut system = System::new("webshop");

        system.add_data_aggregate(DataAggregate::new("da1", "Orders"));
        system.add_backing_data(BackingData::new("bd1", "Service Config"));

        let mut cluster = Infrastructure::new("i1", "Cluster");
        cluster.add_backing_data_use(data_use("bd1", "rb1", "usage"));
        system.add_infrastructure(cluster);
        system.add_infrastructure(Infrastructure::new("i2", "Cloud Account"));

        let mut orders = Component::new("s1", "Order Service", ComponentKind::Service);
        let mut internal = Endpoint::new("e1", "get order");
        internal
            .properties
            .set_value("protocol", PropertyValue::Text("https".to_string()))
            .unwrap();
        internal.add_data_use(data_use("da1", "r2", "usage"));
        orders.add_endpoint(internal);
        orders.add_endpoint(Endpoint::new_external("ee1", "place order"));
        orders.add_data_use(data_use("da1", "r1", "persistence"));
        system.add_component(orders);

        // same display name as s1, forcing key disambiguation
        let mut orders_v2 = Component::new("s2", "Order Service", ComponentKind::Service);
        orders_v2.add_endpoint(Endpoint::new("e2", "get order v2"));
        system.add_component(orders_v2);

        let mut order_db =
            Component::new("sdb", "Order DB", ComponentKind::StorageBackingService);
        order_db.add_endpoint(Endpoint::new("e3", "query orders"));
        system.add_component(order_db);

        system.add_link(Link::new("l1", ComponentId::new("s1"), EndpointId::new("e2")));
        system.add_link(Link::new("l2", ComponentId::new("s2"), EndpointId::new("e3")));

        let mut deployment = DeploymentMapping::new(
            "dm1",
            DeployedEntity::Component(ComponentId::new("s1")),
            InfrastructureId::new("i1"),
        );
        deployment
            .properties
            .set_value("replicas", PropertyValue::Number(2.0))
            .unwrap();
        system.add_deployment_mapping(deployment);
        system.add_deployment_mapping(DeploymentMapping::new(
            "dm2",
            DeployedEntity::Infrastructure(InfrastructureId::new("i1")),
            InfrastructureId::new("i2"),
        ));

        system
            .add_request_trace(RequestTrace::new(
                "rq1",
                "order placement",
                EndpointId::new("ee1"),
                vec![vec![LinkId::new("l1")], vec![LinkId::new("l2")]],
            ))
            .unwrap();

        system
    }

    #[test]
    fn test_name_collisions_get_disambiguated_keys() {
        let conversion = system_to_template(&sample_system(), "0.1.0");
        let nodes = &conversion.template.topology_template.node_templates;
        assert!(nodes.contains_key("order_service"));
        assert!(nodes.contains_key("order_service_2"));
        assert_eq!(conversion.key_id_map.id_of("order_service"), Some("s1"));
        assert_eq!(conversion.key_id_map.id_of("order_service_2"), Some("s2"));
    }

    #[test]
    fn test_every_entity_gets_exactly_one_key() {
        let system = sample_system();
        let conversion = system_to_template(&system, "0.1.0");
        let map = &conversion.key_id_map;

        for component in system.components() {
            assert!(map.key_of(component.id.as_str()).is_some());
            for endpoint in component.all_endpoints() {
                assert!(map.key_of(endpoint.id.as_str()).is_some());
            }
        }
        for link in system.links() {
            assert!(map.key_of(link.id.as_str()).is_some());
        }
        for mapping in system.deployment_mappings() {
            assert!(map.key_of(mapping.id.as_str()).is_some());
        }
        assert!(map.key_of("da1").is_some());
        assert!(map.key_of("bd1").is_some());
        assert!(map.key_of("rq1").is_some());
    }

    #[test]
    fn test_round_trip_preserves_ids_and_relations() {
        let original = sample_system();
        let conversion = system_to_template(&original, "0.1.0");
        let rebuilt = template_to_system(&conversion.template, &conversion.key_id_map).unwrap();

        let ids = |system: &System| -> Vec<String> {
            let mut ids: Vec<String> = system
                .components()
                .iter()
                .map(|c| c.id.to_string())
                .collect();
            ids.sort();
            ids
        };
        assert_eq!(ids(&original), ids(&rebuilt));

        for component in original.components() {
            let twin = rebuilt.component(&component.id).unwrap();
            assert_eq!(twin.kind, component.kind);
            assert_eq!(twin.name, component.name);
            let endpoint_ids = |c: &Component| -> Vec<String> {
                let mut ids: Vec<String> =
                    c.all_endpoints().map(|e| e.id.to_string()).collect();
                ids.sort();
                ids
            };
            assert_eq!(endpoint_ids(twin), endpoint_ids(component));
        }

        // typed relations survive
        let endpoint = rebuilt.endpoint(&EndpointId::new("e1")).unwrap();
        assert_eq!(endpoint.protocol(), "https");
        assert_eq!(endpoint.data_uses.len(), 1);
        assert_eq!(endpoint.data_uses[0].relation.id, "r2");

        let orders = rebuilt.component(&ComponentId::new("s1")).unwrap();
        assert_eq!(orders.data_uses.len(), 1);
        assert_eq!(orders.data_uses[0].relation.id, "r1");
        assert_eq!(
            orders.data_uses[0].relation.usage_kind().as_str(),
            "persistence"
        );

        assert_eq!(rebuilt.links().len(), original.links().len());
        for link in original.links() {
            let twin = rebuilt.link(&link.id).unwrap();
            assert_eq!(twin.source, link.source);
            assert_eq!(twin.target_endpoint, link.target_endpoint);
        }

        assert_eq!(
            rebuilt.deployment_mappings().len(),
            original.deployment_mappings().len()
        );
        for mapping in original.deployment_mappings() {
            let twin = rebuilt
                .deployment_mappings()
                .iter()
                .find(|m| m.id == mapping.id)
                .unwrap();
            assert_eq!(twin.deployed, mapping.deployed);
            assert_eq!(twin.host, mapping.host);
            assert_eq!(twin.replicas(), mapping.replicas());
        }

        let infrastructure = rebuilt
            .infrastructure(&InfrastructureId::new("i1"))
            .unwrap();
        assert_eq!(infrastructure.backing_data_uses.len(), 1);
        assert_eq!(infrastructure.backing_data_uses[0].relation.id, "rb1");

        let trace = rebuilt
            .request_trace(&RequestTraceId::new("rq1"))
            .unwrap();
        assert_eq!(trace.external_endpoint, EndpointId::new("ee1"));
        let original_trace = original
            .request_trace(&RequestTraceId::new("rq1"))
            .unwrap();
        assert_eq!(trace.links(), original_trace.links());

        assert_eq!(rebuilt.data_aggregates().len(), 1);
        assert_eq!(rebuilt.backing_data().len(), 1);
    }

    #[test]
    fn test_template_serializes_to_json() {
        let conversion = system_to_template(&sample_system(), "0.1.0");
        let json = serde_json::to_value(&conversion.template).unwrap();
        assert_eq!(json["tosca_definitions_version"], TOSCA_DEFINITIONS_VERSION);
        assert_eq!(json["metadata"]["template_name"], "webshop");
        assert!(json["topology_template"]["node_templates"]
            .as_object()
            .is_some_and(|nodes| !nodes.is_empty()));
    }
}
