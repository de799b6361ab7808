//! System-scoped measure calculators.
//!
//! Every calculator is a total pure function over the entity graph. Ratios
//! with a structurally empty denominator return `NotApplicable`; the two
//! documented exceptions (the non-symmetric SSL ratio with everything
//! secured, and potential coupling below three components) return 0.

use std::collections::{BTreeMap, HashMap, HashSet};

use super::MeasureValue;
use crate::entities::{ComponentId, ComponentKind, DeployedEntity, EndpointId};
use crate::system::System;

fn average(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

fn ratio(numerator: f64, denominator: f64) -> MeasureValue {
    if denominator == 0.0 {
        MeasureValue::NotApplicable
    } else {
        MeasureValue::Value(numerator / denominator)
    }
}

fn replication_level(system: &System, kind: ComponentKind) -> MeasureValue {
    let mut replicas_per_component: BTreeMap<&ComponentId, f64> = BTreeMap::new();
    for mapping in system.deployment_mappings() {
        let DeployedEntity::Component(component_id) = &mapping.deployed else {
            continue;
        };
        let Some(component) = system.component(component_id) else {
            continue;
        };
        if component.kind != kind {
            continue;
        }
        *replicas_per_component.entry(&component.id).or_insert(0.0) += mapping.replicas();
    }
    let totals: Vec<f64> = replicas_per_component.into_values().collect();
    match average(&totals) {
        Some(level) => MeasureValue::Value(level),
        None => MeasureValue::NotApplicable,
    }
}

/// Average replica count over all deployed services.
pub fn service_replication_level(system: &System) -> MeasureValue {
    replication_level(system, ComponentKind::Service)
}

/// Average replica count over all deployed storage backing services.
pub fn storage_replication_level(system: &System) -> MeasureValue {
    replication_level(system, ComponentKind::StorageBackingService)
}

pub fn externally_available_endpoints(system: &System) -> MeasureValue {
    system
        .components()
        .iter()
        .map(|c| c.external_endpoints().len())
        .sum::<usize>()
        .into()
}

/// Average shard count over all storage backing services.
pub fn data_sharding_level(system: &System) -> MeasureValue {
    let shards: Vec<f64> = system
        .components()
        .iter()
        .filter(|c| c.kind == ComponentKind::StorageBackingService)
        .map(|c| c.shards())
        .collect();
    match average(&shards) {
        Some(level) => MeasureValue::Value(level),
        None => MeasureValue::NotApplicable,
    }
}

/// Secured endpoints over unsecured endpoints, `k / (|E| - k)`.
///
/// The formula is deliberately non-symmetric; when every endpoint is
/// secured the measure is 0, not infinity.
pub fn ratio_of_endpoints_supporting_ssl(system: &System) -> MeasureValue {
    let mut total = 0usize;
    let mut secured = 0usize;
    for component in system.components() {
        for endpoint in component.all_endpoints() {
            total += 1;
            if endpoint.supports_tls() {
                secured += 1;
            }
        }
    }
    if total == 0 {
        return MeasureValue::NotApplicable;
    }
    if total == secured {
        return MeasureValue::Value(0.0);
    }
    MeasureValue::Value(secured as f64 / (total - secured) as f64)
}

pub fn ratio_of_external_endpoints_supporting_tls(system: &System) -> MeasureValue {
    let mut total = 0usize;
    let mut secured = 0usize;
    for component in system.components() {
        for endpoint in component.external_endpoints() {
            total += 1;
            if endpoint.supports_tls() {
                secured += 1;
            }
        }
    }
    ratio(secured as f64, total as f64)
}

pub fn ratio_of_secured_links(system: &System) -> MeasureValue {
    let secured = system
        .links()
        .iter()
        .filter(|link| {
            system
                .endpoint(&link.target_endpoint)
                .is_some_and(|e| e.supports_tls())
        })
        .count();
    ratio(secured as f64, system.links().len() as f64)
}

pub fn data_aggregate_scope(system: &System) -> MeasureValue {
    system.data_aggregates().len().into()
}

pub fn ratio_of_stateful_components(system: &System) -> MeasureValue {
    let stateful = system
        .components()
        .iter()
        .filter(|c| !c.is_stateless())
        .count();
    ratio(stateful as f64, system.components().len() as f64)
}

pub fn ratio_of_stateless_components(system: &System) -> MeasureValue {
    let stateless = system
        .components()
        .iter()
        .filter(|c| c.is_stateless())
        .count();
    ratio(stateless as f64, system.components().len() as f64)
}

/// Per component, the number of distinct stateful components it links to,
/// averaged over all components.
pub fn degree_linked_to_stateful_components(system: &System) -> MeasureValue {
    if system.components().is_empty() {
        return MeasureValue::NotApplicable;
    }
    let mut total_connections = 0usize;
    for component in system.components() {
        let mut stateful_targets: HashSet<&ComponentId> = HashSet::new();
        for link in system.outgoing_links_of(&component.id) {
            if let Some(target) = system.link_target(link) {
                if !target.is_stateless() {
                    stateful_targets.insert(&target.id);
                }
            }
        }
        total_connections += stateful_targets.len();
    }
    MeasureValue::Value(total_connections as f64 / system.components().len() as f64)
}

/// Average, over components with endpoints, of the share of asynchronous
/// endpoints they offer.
pub fn degree_of_asynchronous_communication(system: &System) -> MeasureValue {
    let mut degrees: Vec<f64> = Vec::new();
    for component in system.components() {
        let total = component.all_endpoints().count();
        if total == 0 {
            continue;
        }
        let asynchronous = component.all_endpoints().filter(|e| e.is_asynchronous()).count();
        degrees.push(asynchronous as f64 / total as f64);
    }
    match average(&degrees) {
        Some(degree) => MeasureValue::Value(degree),
        None => MeasureValue::NotApplicable,
    }
}

pub fn asynchronous_communication_utilization(system: &System) -> MeasureValue {
    let asynchronous = system
        .links()
        .iter()
        .filter(|link| {
            system
                .endpoint(&link.target_endpoint)
                .is_some_and(|e| e.is_asynchronous())
        })
        .count();
    ratio(asynchronous as f64, system.links().len() as f64)
}

/// Share of services offering both a health and a readiness endpoint.
pub fn ratio_of_services_that_provide_health_endpoints(system: &System) -> MeasureValue {
    let services: Vec<_> = system
        .components()
        .iter()
        .filter(|c| c.kind == ComponentKind::Service)
        .collect();
    let monitored = services
        .iter()
        .filter(|service| {
            let has_health = service.endpoints().iter().any(|e| e.has_health_check());
            let has_readiness = service.endpoints().iter().any(|e| e.has_readiness_check());
            has_health && has_readiness
        })
        .count();
    ratio(monitored as f64, services.len() as f64)
}

/// Normalized all-pairs path-length sum, `(max - observed) / (max - min)`.
///
/// An unreachable ordered pair is charged the worst-case length of N - 1,
/// the same constant the disconnected-hypothetical bound uses. Below three
/// components max equals min, so the measure is defined as 0.
pub fn coupling_degree_based_on_potential_coupling(system: &System) -> MeasureValue {
    let n = system.components().len();
    if n < 3 {
        return MeasureValue::Value(0.0);
    }
    let graph = system.component_graph();
    let mut path_sum = 0usize;
    for from in system.components() {
        for to in system.components() {
            if from.id == to.id {
                continue;
            }
            path_sum += graph
                .shortest_path_length(&from.id, &to.id)
                .unwrap_or(n - 1);
        }
    }
    let max = n * (n - 1) * (n - 1);
    let min = n * (n - 1);
    MeasureValue::Value((max - path_sum) as f64 / (max - min) as f64)
}

pub fn interaction_density_based_on_components(system: &System) -> MeasureValue {
    ratio(
        system.links().len() as f64,
        system.components().len() as f64,
    )
}

pub fn interaction_density_based_on_links(system: &System) -> MeasureValue {
    let endpoints: usize = system
        .components()
        .iter()
        .map(|c| c.all_endpoints().count())
        .sum();
    ratio(
        system.links().len() as f64,
        (system.components().len() * endpoints) as f64,
    )
}

/// Sum over components of the mean endpoint entropy `log10(1 + incoming)`,
/// measuring how much incoming traffic concentrates on each interface.
pub fn system_coupling_based_on_endpoint_entropy(system: &System) -> MeasureValue {
    let mut incoming_per_endpoint: HashMap<&EndpointId, usize> = HashMap::new();
    for link in system.links() {
        *incoming_per_endpoint.entry(&link.target_endpoint).or_insert(0) += 1;
    }

    let mut sum = 0.0;
    for component in system.components() {
        let entropies: Vec<f64> = component
            .all_endpoints()
            .map(|endpoint| {
                let incoming = incoming_per_endpoint.get(&endpoint.id).copied().unwrap_or(0);
                -(1.0 / (1.0 + incoming as f64)).log10()
            })
            .collect();
        sum += average(&entropies).unwrap_or(0.0);
    }
    MeasureValue::Value(sum)
}

fn connected_component_pairs(system: &System) -> HashSet<(ComponentId, ComponentId)> {
    let mut pairs = HashSet::new();
    for link in system.links() {
        if let Some(target) = system.link_target(link) {
            if link.source != target.id {
                pairs.insert((link.source.clone(), target.id.clone()));
            }
        }
    }
    pairs
}

/// Number of component pairs that call each other in both directions.
pub fn services_interdependence_in_the_system(system: &System) -> MeasureValue {
    let pairs = connected_component_pairs(system);
    let interdependent = pairs
        .iter()
        .filter(|(a, b)| a < b && pairs.contains(&(b.clone(), a.clone())))
        .count();
    MeasureValue::Value(interdependent as f64)
}

/// Distinct directed connected pairs over all possible ordered pairs.
pub fn aggregate_service_coupling(system: &System) -> MeasureValue {
    let n = system.components().len();
    ratio(
        connected_component_pairs(system).len() as f64,
        (n * n.saturating_sub(1)) as f64,
    )
}

/// Per-component count of distinct dependency targets, summed and
/// normalized by all possible ordered pairs.
pub fn degree_of_coupling(system: &System) -> MeasureValue {
    let n = system.components().len();
    let mut dependency_sum = 0usize;
    for component in system.components() {
        let targets: HashSet<&ComponentId> = system
            .outgoing_links_of(&component.id)
            .iter()
            .filter_map(|link| system.link_target(link))
            .map(|target| &target.id)
            .filter(|target| **target != component.id)
            .collect();
        dependency_sum += targets.len();
    }
    ratio(dependency_sum as f64, (n * n.saturating_sub(1)) as f64)
}

/// Share of components with at least one outgoing dependency.
pub fn simple_degree_of_coupling(system: &System) -> MeasureValue {
    let coupled = system
        .components()
        .iter()
        .filter(|c| !system.outgoing_links_of(&c.id).is_empty())
        .count();
    ratio(coupled as f64, system.components().len() as f64)
}

fn consumers_per_component(system: &System) -> HashMap<ComponentId, HashSet<ComponentId>> {
    let mut consumers: HashMap<ComponentId, HashSet<ComponentId>> = HashMap::new();
    for link in system.links() {
        if let Some(target) = system.link_target(link) {
            if link.source != target.id {
                consumers
                    .entry(target.id.clone())
                    .or_default()
                    .insert(link.source.clone());
            }
        }
    }
    consumers
}

/// Mean of the shared-component ratio and the shared-endpoint ratio, where
/// "shared" means consumed by more than one distinct component.
pub fn direct_service_sharing(system: &System) -> MeasureValue {
    let n = system.components().len();
    let links = system.links().len();
    if n == 0 || links == 0 {
        return MeasureValue::NotApplicable;
    }

    let shared_components = consumers_per_component(system)
        .values()
        .filter(|consumers| consumers.len() > 1)
        .count();

    let mut consumers_per_endpoint: HashMap<&EndpointId, HashSet<&ComponentId>> = HashMap::new();
    for link in system.links() {
        consumers_per_endpoint
            .entry(&link.target_endpoint)
            .or_default()
            .insert(&link.source);
    }
    let shared_endpoints = consumers_per_endpoint
        .values()
        .filter(|consumers| consumers.len() > 1)
        .count();

    MeasureValue::Value(
        (shared_components as f64 / n as f64 + shared_endpoints as f64 / links as f64) / 2.0,
    )
}

/// Like [`direct_service_sharing`], but a component counts as shared when it
/// is reachable from more than one other component over directed paths.
pub fn transitively_shared_services(system: &System) -> MeasureValue {
    let n = system.components().len();
    let links = system.links().len();
    if n == 0 || links == 0 {
        return MeasureValue::NotApplicable;
    }

    let graph = system.component_graph();
    let mut reached_by: HashMap<&ComponentId, usize> = HashMap::new();
    for component in system.components() {
        for reached in graph.reachable_from(&component.id) {
            *reached_by.entry(reached).or_insert(0) += 1;
        }
    }
    let shared: HashSet<&ComponentId> = reached_by
        .iter()
        .filter(|(_, sources)| **sources > 1)
        .map(|(id, _)| *id)
        .collect();

    let links_to_shared = system
        .links()
        .iter()
        .filter(|link| {
            system
                .link_target(link)
                .is_some_and(|target| shared.contains(&target.id))
        })
        .count();

    MeasureValue::Value(
        (shared.len() as f64 / n as f64 + links_to_shared as f64 / links as f64) / 2.0,
    )
}

/// Share of components consumed by more than one distinct component.
pub fn ratio_of_shared_components(system: &System) -> MeasureValue {
    let shared = consumers_per_component(system)
        .values()
        .filter(|consumers| consumers.len() > 1)
        .count();
    ratio(shared as f64, system.components().len() as f64)
}

/// Distinct consumer/shared-target dependency pairs over the squared
/// component count.
pub fn ratio_of_shared_dependencies(system: &System) -> MeasureValue {
    let n = system.components().len();
    let consumers = consumers_per_component(system);
    let shared_dependencies: usize = consumers
        .values()
        .filter(|consumers| consumers.len() > 1)
        .map(|consumers| consumers.len())
        .sum();
    ratio(shared_dependencies as f64, (n * n) as f64)
}
