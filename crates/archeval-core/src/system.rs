use std::collections::HashMap;

use petgraph::algo::dijkstra;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::entities::{
    BackingData, Component, ComponentId, DataAggregate, DataId, DeploymentMapping,
    DeploymentMappingId, Endpoint, EndpointId, Infrastructure, InfrastructureId, Link, LinkId,
    RequestTrace, RequestTraceId,
};
use crate::error::{ModelError, Result};

/// Aggregate root owning every entity of one modeled architecture.
///
/// Entities live in insertion-ordered vectors with id indices beside them;
/// the endpoint-owner index and the outgoing-link adjacency are maintained
/// incrementally on every addition. Mutation is additive only.
#[derive(Debug, Clone, Default)]
pub struct System {
    name: String,
    components: Vec<Component>,
    component_index: HashMap<ComponentId, usize>,
    links: Vec<Link>,
    link_index: HashMap<LinkId, usize>,
    data_aggregates: Vec<DataAggregate>,
    backing_data: Vec<BackingData>,
    infrastructures: Vec<Infrastructure>,
    infrastructure_index: HashMap<InfrastructureId, usize>,
    deployment_mappings: Vec<DeploymentMapping>,
    request_traces: Vec<RequestTrace>,
    endpoint_owner: HashMap<EndpointId, ComponentId>,
    outgoing: HashMap<ComponentId, Vec<usize>>,
}

impl System {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a component, registering all its endpoints in the owner index.
    /// A component id already present is ignored.
    pub fn add_component(&mut self, component: Component) {
        if self.component_index.contains_key(&component.id) {
            return;
        }
        for endpoint in component.all_endpoints() {
            self.endpoint_owner
                .insert(endpoint.id.clone(), component.id.clone());
        }
        self.component_index
            .insert(component.id.clone(), self.components.len());
        self.components.push(component);
    }

    /// Add a link and record it in the source component's adjacency.
    /// Target resolution is checked lazily at query time.
    pub fn add_link(&mut self, link: Link) {
        if self.link_index.contains_key(&link.id) {
            return;
        }
        self.outgoing
            .entry(link.source.clone())
            .or_default()
            .push(self.links.len());
        self.link_index.insert(link.id.clone(), self.links.len());
        self.links.push(link);
    }

    pub fn add_data_aggregate(&mut self, data: DataAggregate) {
        if self.data_aggregates.iter().any(|d| d.id == data.id) {
            return;
        }
        self.data_aggregates.push(data);
    }

    pub fn add_backing_data(&mut self, data: BackingData) {
        if self.backing_data.iter().any(|d| d.id == data.id) {
            return;
        }
        self.backing_data.push(data);
    }

    pub fn add_infrastructure(&mut self, infrastructure: Infrastructure) {
        if self.infrastructure_index.contains_key(&infrastructure.id) {
            return;
        }
        self.infrastructure_index
            .insert(infrastructure.id.clone(), self.infrastructures.len());
        self.infrastructures.push(infrastructure);
    }

    pub fn add_deployment_mapping(&mut self, mapping: DeploymentMapping) {
        if self.deployment_mappings.iter().any(|m| m.id == mapping.id) {
            return;
        }
        self.deployment_mappings.push(mapping);
    }

    /// Add a request trace. The entry endpoint must be registered and must
    /// carry the external tag.
    pub fn add_request_trace(&mut self, trace: RequestTrace) -> Result<()> {
        let owner = self
            .endpoint_owner
            .get(&trace.external_endpoint)
            .ok_or_else(|| ModelError::UnknownEndpoint(trace.external_endpoint.to_string()))?;
        let component = &self.components[self.component_index[owner]];
        let endpoint = component
            .endpoint(&trace.external_endpoint)
            .ok_or_else(|| ModelError::UnknownEndpoint(trace.external_endpoint.to_string()))?;
        if !endpoint.external {
            return Err(ModelError::WrongEntityKind {
                context: format!("request trace '{}' entry point", trace.id),
                expected: "external endpoint".to_string(),
                actual: "endpoint".to_string(),
            });
        }
        if self.request_traces.iter().any(|t| t.id == trace.id) {
            return Ok(());
        }
        self.request_traces.push(trace);
        Ok(())
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn data_aggregates(&self) -> &[DataAggregate] {
        &self.data_aggregates
    }

    pub fn backing_data(&self) -> &[BackingData] {
        &self.backing_data
    }

    pub fn infrastructures(&self) -> &[Infrastructure] {
        &self.infrastructures
    }

    pub fn deployment_mappings(&self) -> &[DeploymentMapping] {
        &self.deployment_mappings
    }

    pub fn request_traces(&self) -> &[RequestTrace] {
        &self.request_traces
    }

    pub fn component(&self, id: &ComponentId) -> Option<&Component> {
        self.component_index.get(id).map(|&i| &self.components[i])
    }

    pub fn link(&self, id: &LinkId) -> Option<&Link> {
        self.link_index.get(id).map(|&i| &self.links[i])
    }

    pub fn infrastructure(&self, id: &InfrastructureId) -> Option<&Infrastructure> {
        self.infrastructure_index
            .get(id)
            .map(|&i| &self.infrastructures[i])
    }

    pub fn request_trace(&self, id: &RequestTraceId) -> Option<&RequestTrace> {
        self.request_traces.iter().find(|t| &t.id == id)
    }

    pub fn data_aggregate(&self, id: &DataId) -> Option<&DataAggregate> {
        self.data_aggregates.iter().find(|d| &d.id == id)
    }

    /// Look up an endpoint anywhere in the system.
    pub fn endpoint(&self, id: &EndpointId) -> Option<&Endpoint> {
        let owner = self.endpoint_owner.get(id)?;
        self.component(owner).and_then(|c| c.endpoint(id))
    }

    /// Resolve an endpoint to its owning component. An endpoint not
    /// registered on any component is a data-integrity error.
    pub fn component_of_endpoint(&self, endpoint: &EndpointId) -> Result<&Component> {
        let owner = self
            .endpoint_owner
            .get(endpoint)
            .ok_or_else(|| ModelError::UnknownEndpoint(endpoint.to_string()))?;
        self.component(owner)
            .ok_or_else(|| ModelError::UnknownComponent(owner.to_string()))
    }

    /// All links whose source is the given component.
    pub fn outgoing_links_of(&self, component: &ComponentId) -> Vec<&Link> {
        self.outgoing
            .get(component)
            .map(|indices| indices.iter().map(|&i| &self.links[i]).collect())
            .unwrap_or_default()
    }

    /// All links whose target endpoint resolves to the given component.
    pub fn incoming_links_of(&self, component: &ComponentId) -> Vec<&Link> {
        self.links
            .iter()
            .filter(|link| self.endpoint_owner.get(&link.target_endpoint) == Some(component))
            .collect()
    }

    /// The component reached by a link, if its target endpoint resolves.
    pub fn link_target(&self, link: &Link) -> Option<&Component> {
        self.component_of_endpoint(&link.target_endpoint).ok()
    }

    /// Snapshot of the directed component call graph.
    pub fn component_graph(&self) -> ComponentGraph {
        let mut graph = DiGraph::new();
        let mut index = HashMap::new();
        for component in &self.components {
            let idx = graph.add_node(component.id.clone());
            index.insert(component.id.clone(), idx);
        }
        for link in &self.links {
            let Some(target) = self.endpoint_owner.get(&link.target_endpoint) else {
                continue;
            };
            if let (Some(&from), Some(&to)) = (index.get(&link.source), index.get(target)) {
                if from != to {
                    graph.update_edge(from, to, ());
                }
            }
        }
        ComponentGraph { graph, index }
    }

    /// Unweighted shortest-path length over the directed call graph.
    /// `None` means the target is unreachable; callers decide the penalty.
    pub fn shortest_path_length(&self, from: &ComponentId, to: &ComponentId) -> Option<usize> {
        self.component_graph().shortest_path_length(from, to)
    }
}

/// Directed call graph between components, built on demand from the links.
pub struct ComponentGraph {
    graph: DiGraph<ComponentId, ()>,
    index: HashMap<ComponentId, NodeIndex>,
}

impl ComponentGraph {
    pub fn shortest_path_length(&self, from: &ComponentId, to: &ComponentId) -> Option<usize> {
        let (&from, &to) = (self.index.get(from)?, self.index.get(to)?);
        let distances = dijkstra(&self.graph, from, Some(to), |_| 1usize);
        distances.get(&to).copied()
    }

    /// Component ids reachable from `from` via directed edges, excluding
    /// `from` itself.
    pub fn reachable_from(&self, from: &ComponentId) -> Vec<&ComponentId> {
        let Some(&start) = self.index.get(from) else {
            return Vec::new();
        };
        let distances = dijkstra(&self.graph, start, None, |_| 1usize);
        distances
            .keys()
            .filter(|&&idx| idx != start)
            .map(|&idx| &self.graph[idx])
            .collect()
    }
}
