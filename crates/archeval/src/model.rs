//! Model-file loading: a serde JSON document describing one architecture,
//! turned into a populated [`System`]. Unknown references warn and are
//! skipped; the load itself only fails on unreadable or unparsable input.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

use archeval_core::entities::{
    BackingData, Component, ComponentId, ComponentKind, DataAggregate, DataId, DataUsageRelation,
    DataUse, DeployedEntity, DeploymentMapping, Endpoint, EndpointId, Infrastructure,
    InfrastructureId, Link, LinkId, RequestTrace,
};
use archeval_core::property::{PropertySet, PropertyValue};
use archeval_core::System;

#[derive(Debug, Deserialize)]
pub struct ModelFile {
    pub name: String,
    #[serde(default)]
    pub data_aggregates: Vec<DataAggregateSpec>,
    #[serde(default)]
    pub backing_data: Vec<BackingDataSpec>,
    #[serde(default)]
    pub infrastructures: Vec<InfrastructureSpec>,
    #[serde(default)]
    pub components: Vec<ComponentSpec>,
    #[serde(default)]
    pub links: Vec<LinkSpec>,
    #[serde(default)]
    pub deployment_mappings: Vec<DeploymentMappingSpec>,
    #[serde(default)]
    pub request_traces: Vec<RequestTraceSpec>,
}

#[derive(Debug, Deserialize)]
pub struct DataAggregateSpec {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct BackingDataSpec {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub properties: BTreeMap<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct InfrastructureSpec {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub properties: BTreeMap<String, Value>,
    #[serde(default)]
    pub backing_data_uses: Vec<DataUseSpec>,
}

#[derive(Debug, Deserialize)]
pub struct ComponentSpec {
    pub id: String,
    pub name: String,
    #[serde(default = "default_kind")]
    pub kind: String,
    #[serde(default)]
    pub properties: BTreeMap<String, Value>,
    #[serde(default)]
    pub endpoints: Vec<EndpointSpec>,
    #[serde(default)]
    pub data_uses: Vec<DataUseSpec>,
    #[serde(default)]
    pub backing_data_uses: Vec<DataUseSpec>,
}

fn default_kind() -> String {
    "service".to_string()
}

#[derive(Debug, Deserialize)]
pub struct EndpointSpec {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub external: bool,
    #[serde(default)]
    pub properties: BTreeMap<String, Value>,
    #[serde(default)]
    pub data_uses: Vec<DataUseSpec>,
}

#[derive(Debug, Deserialize)]
pub struct DataUseSpec {
    pub data: String,
    #[serde(default)]
    pub relation: Option<String>,
    #[serde(default)]
    pub usage_relation: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LinkSpec {
    pub id: String,
    pub source: String,
    pub target_endpoint: String,
}

#[derive(Debug, Deserialize)]
pub struct DeploymentMappingSpec {
    pub id: String,
    #[serde(default)]
    pub component: Option<String>,
    #[serde(default)]
    pub infrastructure: Option<String>,
    pub host: String,
    #[serde(default)]
    pub properties: BTreeMap<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct RequestTraceSpec {
    pub id: String,
    pub name: String,
    pub external_endpoint: String,
    #[serde(default)]
    pub links: Vec<Vec<String>>,
}

pub fn load_model(path: &Path) -> Result<System> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read model file {}", path.display()))?;
    let file: ModelFile = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse model file {}", path.display()))?;
    Ok(build_system(file))
}

fn property_value(value: &Value) -> Option<PropertyValue> {
    match value {
        Value::String(text) => Some(PropertyValue::Text(text.clone())),
        Value::Bool(flag) => Some(PropertyValue::Bool(*flag)),
        Value::Number(number) => number.as_f64().map(PropertyValue::Number),
        _ => None,
    }
}

fn apply_properties(context: &str, properties: &mut PropertySet, values: &BTreeMap<String, Value>) {
    for (key, value) in values {
        let Some(value) = property_value(value) else {
            eprintln!("Warning: unsupported value for property '{key}' of {context}, skipping");
            continue;
        };
        if properties.set_value(key, value).is_err() {
            eprintln!("Warning: unknown property '{key}' of {context}, skipping");
        }
    }
}

fn data_use(owner: &str, spec: &DataUseSpec) -> DataUse {
    let relation_id = spec
        .relation
        .clone()
        .unwrap_or_else(|| format!("{owner}.{}", spec.data));
    let mut relation = DataUsageRelation::new(&relation_id);
    if let Some(kind) = &spec.usage_relation {
        if relation
            .properties
            .set_value("usage_relation", PropertyValue::Text(kind.clone()))
            .is_err()
        {
            eprintln!("Warning: invalid usage relation on '{relation_id}', using default");
        }
    }
    DataUse::new(DataId::new(&spec.data), relation)
}

fn build_system(file: ModelFile) -> System {
    let mut system = System::new(&file.name);

    for spec in &file.data_aggregates {
        system.add_data_aggregate(DataAggregate::new(&spec.id, &spec.name));
    }
    for spec in &file.backing_data {
        let mut data = BackingData::new(&spec.id, &spec.name);
        apply_properties(
            &format!("backing data '{}'", spec.id),
            &mut data.properties,
            &spec.properties,
        );
        system.add_backing_data(data);
    }

    let known_data = |system: &System, id: &str| system.data_aggregate(&DataId::new(id)).is_some();
    let known_backing_data =
        |system: &System, id: &str| system.backing_data().iter().any(|d| d.id.as_str() == id);

    for spec in &file.infrastructures {
        let mut infrastructure = Infrastructure::new(&spec.id, &spec.name);
        apply_properties(
            &format!("infrastructure '{}'", spec.id),
            &mut infrastructure.properties,
            &spec.properties,
        );
        for use_spec in &spec.backing_data_uses {
            if !known_backing_data(&system, &use_spec.data) {
                eprintln!(
                    "Warning: infrastructure '{}' references unknown backing data '{}', skipping",
                    spec.id, use_spec.data
                );
                continue;
            }
            infrastructure.add_backing_data_use(data_use(&spec.id, use_spec));
        }
        system.add_infrastructure(infrastructure);
    }

    for spec in &file.components {
        let kind = match spec.kind.parse::<ComponentKind>() {
            Ok(kind) => kind,
            Err(_) => {
                eprintln!(
                    "Warning: unknown component kind '{}' for '{}', treating as generic",
                    spec.kind, spec.id
                );
                ComponentKind::Generic
            }
        };
        let mut component = Component::new(&spec.id, &spec.name, kind);
        apply_properties(
            &format!("component '{}'", spec.id),
            &mut component.properties,
            &spec.properties,
        );

        for endpoint_spec in &spec.endpoints {
            let mut endpoint = if endpoint_spec.external {
                Endpoint::new_external(&endpoint_spec.id, &endpoint_spec.name)
            } else {
                Endpoint::new(&endpoint_spec.id, &endpoint_spec.name)
            };
            apply_properties(
                &format!("endpoint '{}'", endpoint_spec.id),
                &mut endpoint.properties,
                &endpoint_spec.properties,
            );
            for use_spec in &endpoint_spec.data_uses {
                if !known_data(&system, &use_spec.data) {
                    eprintln!(
                        "Warning: endpoint '{}' references unknown data aggregate '{}', skipping",
                        endpoint_spec.id, use_spec.data
                    );
                    continue;
                }
                endpoint.add_data_use(data_use(&endpoint_spec.id, use_spec));
            }
            component.add_endpoint(endpoint);
        }

        for use_spec in &spec.data_uses {
            if !known_data(&system, &use_spec.data) {
                eprintln!(
                    "Warning: component '{}' references unknown data aggregate '{}', skipping",
                    spec.id, use_spec.data
                );
                continue;
            }
            component.add_data_use(data_use(&spec.id, use_spec));
        }
        for use_spec in &spec.backing_data_uses {
            if !known_backing_data(&system, &use_spec.data) {
                eprintln!(
                    "Warning: component '{}' references unknown backing data '{}', skipping",
                    spec.id, use_spec.data
                );
                continue;
            }
            component.add_backing_data_use(data_use(&spec.id, use_spec));
        }
        system.add_component(component);
    }

    for spec in &file.links {
        if system.component(&ComponentId::new(&spec.source)).is_none() {
            eprintln!(
                "Warning: link '{}' has unknown source component '{}', skipping",
                spec.id, spec.source
            );
            continue;
        }
        if system.endpoint(&EndpointId::new(&spec.target_endpoint)).is_none() {
            eprintln!(
                "Warning: link '{}' has unknown target endpoint '{}', skipping",
                spec.id, spec.target_endpoint
            );
            continue;
        }
        system.add_link(Link::new(
            &spec.id,
            ComponentId::new(&spec.source),
            EndpointId::new(&spec.target_endpoint),
        ));
    }

    for spec in &file.deployment_mappings {
        let deployed = match (&spec.component, &spec.infrastructure) {
            (Some(component), None) => {
                if system.component(&ComponentId::new(component)).is_none() {
                    eprintln!(
                        "Warning: deployment mapping '{}' references unknown component '{}', skipping",
                        spec.id, component
                    );
                    continue;
                }
                DeployedEntity::Component(ComponentId::new(component))
            }
            (None, Some(infrastructure)) => {
                if system
                    .infrastructure(&InfrastructureId::new(infrastructure))
                    .is_none()
                {
                    eprintln!(
                        "Warning: deployment mapping '{}' references unknown infrastructure '{}', skipping",
                        spec.id, infrastructure
                    );
                    continue;
                }
                DeployedEntity::Infrastructure(InfrastructureId::new(infrastructure))
            }
            _ => {
                eprintln!(
                    "Warning: deployment mapping '{}' must name exactly one of component or infrastructure, skipping",
                    spec.id
                );
                continue;
            }
        };
        if system
            .infrastructure(&InfrastructureId::new(&spec.host))
            .is_none()
        {
            eprintln!(
                "Warning: deployment mapping '{}' has unknown host '{}', skipping",
                spec.id, spec.host
            );
            continue;
        }
        let mut mapping =
            DeploymentMapping::new(&spec.id, deployed, InfrastructureId::new(&spec.host));
        apply_properties(
            &format!("deployment mapping '{}'", spec.id),
            &mut mapping.properties,
            &spec.properties,
        );
        system.add_deployment_mapping(mapping);
    }

    for spec in &file.request_traces {
        let mut steps: Vec<Vec<LinkId>> = Vec::new();
        for step in &spec.links {
            let resolved: Vec<LinkId> = step
                .iter()
                .filter(|link_id| {
                    let known = system.link(&LinkId::new(link_id)).is_some();
                    if !known {
                        eprintln!(
                            "Warning: request trace '{}' references unknown link '{}', skipping",
                            spec.id, link_id
                        );
                    }
                    known
                })
                .map(|link_id| LinkId::new(link_id))
                .collect();
            steps.push(resolved);
        }
        let trace = RequestTrace::new(
            &spec.id,
            &spec.name,
            EndpointId::new(&spec.external_endpoint),
            steps,
        );
        if let Err(e) = system.add_request_trace(trace) {
            eprintln!("Warning: request trace '{}' rejected: {e}, skipping", spec.id);
        }
    }

    system
}
