pub mod component;
pub mod request_trace;
pub mod system;

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};

use crate::entities::{Component, RequestTrace};
use crate::system::System;

/// Result of one measure calculation: a number, or the sentinel for a
/// calculation whose denominator is structurally absent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MeasureValue {
    Value(f64),
    NotApplicable,
}

impl MeasureValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MeasureValue::Value(v) => Some(*v),
            MeasureValue::NotApplicable => None,
        }
    }

    pub fn is_applicable(&self) -> bool {
        matches!(self, MeasureValue::Value(_))
    }
}

impl From<f64> for MeasureValue {
    fn from(value: f64) -> Self {
        MeasureValue::Value(value)
    }
}

impl From<usize> for MeasureValue {
    fn from(value: usize) -> Self {
        MeasureValue::Value(value as f64)
    }
}

impl Serialize for MeasureValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MeasureValue::Value(v) => serializer.serialize_f64(*v),
            MeasureValue::NotApplicable => serializer.serialize_str("n/a"),
        }
    }
}

pub type SystemMeasureFn = fn(&System) -> MeasureValue;
pub type ComponentMeasureFn = fn(&Component, &System) -> MeasureValue;
pub type RequestTraceMeasureFn = fn(&RequestTrace, &System) -> MeasureValue;

/// System-scoped calculators keyed by measure name.
pub fn system_measures() -> BTreeMap<&'static str, SystemMeasureFn> {
    let mut table: BTreeMap<&'static str, SystemMeasureFn> = BTreeMap::new();
    table.insert("serviceReplicationLevel", system::service_replication_level);
    table.insert("storageReplicationLevel", system::storage_replication_level);
    table.insert(
        "externallyAvailableEndpoints",
        system::externally_available_endpoints,
    );
    table.insert("dataShardingLevel", system::data_sharding_level);
    table.insert(
        "ratioOfEndpointsSupportingSsl",
        system::ratio_of_endpoints_supporting_ssl,
    );
    table.insert(
        "ratioOfExternalEndpointsSupportingTls",
        system::ratio_of_external_endpoints_supporting_tls,
    );
    table.insert("ratioOfSecuredLinks", system::ratio_of_secured_links);
    table.insert("dataAggregateScope", system::data_aggregate_scope);
    table.insert(
        "ratioOfStatefulComponents",
        system::ratio_of_stateful_components,
    );
    table.insert(
        "ratioOfStatelessComponents",
        system::ratio_of_stateless_components,
    );
    table.insert(
        "degreeToWhichComponentsAreLinkedToStatefulComponents",
        system::degree_linked_to_stateful_components,
    );
    table.insert(
        "degreeOfAsynchronousCommunication",
        system::degree_of_asynchronous_communication,
    );
    table.insert(
        "asynchronousCommunicationUtilization",
        system::asynchronous_communication_utilization,
    );
    table.insert(
        "ratioOfServicesThatProvideHealthEndpoints",
        system::ratio_of_services_that_provide_health_endpoints,
    );
    table.insert(
        "couplingDegreeBasedOnPotentialCoupling",
        system::coupling_degree_based_on_potential_coupling,
    );
    table.insert(
        "interactionDensityBasedOnComponents",
        system::interaction_density_based_on_components,
    );
    table.insert(
        "interactionDensityBasedOnLinks",
        system::interaction_density_based_on_links,
    );
    table.insert(
        "systemCouplingBasedOnEndpointEntropy",
        system::system_coupling_based_on_endpoint_entropy,
    );
    table.insert(
        "servicesInterdependenceInTheSystem",
        system::services_interdependence_in_the_system,
    );
    table.insert(
        "aggregateSystemMetricToMeasureServiceCoupling",
        system::aggregate_service_coupling,
    );
    table.insert("degreeOfCouplingInASystem", system::degree_of_coupling);
    table.insert(
        "simpleDegreeOfCouplingInASystem",
        system::simple_degree_of_coupling,
    );
    table.insert("directServiceSharing", system::direct_service_sharing);
    table.insert(
        "transitivelySharedServices",
        system::transitively_shared_services,
    );
    table.insert(
        "ratioOfSharedNonExternalComponentsToNonExternalComponents",
        system::ratio_of_shared_components,
    );
    table.insert(
        "ratioOfSharedDependenciesOfNonExternalComponentsToPossibleDependencies",
        system::ratio_of_shared_dependencies,
    );
    table
}

/// Component-scoped calculators keyed by measure name.
pub fn component_measures() -> BTreeMap<&'static str, ComponentMeasureFn> {
    let mut table: BTreeMap<&'static str, ComponentMeasureFn> = BTreeMap::new();
    table.insert(
        "serviceInterfaceDataCohesion",
        component::service_interface_data_cohesion,
    );
    table.insert(
        "serviceInterfaceUsageCohesion",
        component::service_interface_usage_cohesion,
    );
    table.insert(
        "totalServiceInterfaceCohesion",
        component::total_service_interface_cohesion,
    );
    table.insert(
        "cohesionBetweenEndpointsBasedOnDataAggregateUsage",
        component::cohesion_between_endpoints_based_on_data_aggregate_usage,
    );
    table.insert(
        "numberOfProvidedSynchronousAndAsynchronousEndpoints",
        component::number_of_provided_endpoints,
    );
    table.insert(
        "numberOfSynchronousEndpointsOfferedByAService",
        component::number_of_synchronous_endpoints,
    );
    table.insert(
        "numberOfAsynchronousEndpointsOfferedByAService",
        component::number_of_asynchronous_endpoints,
    );
    table.insert(
        "numberOfSynchronousOutgoingLinks",
        component::number_of_synchronous_outgoing_links,
    );
    table.insert(
        "numberOfAsynchronousOutgoingLinks",
        component::number_of_asynchronous_outgoing_links,
    );
    table.insert(
        "ratioOfAsynchronousOutgoingLinks",
        component::ratio_of_asynchronous_outgoing_links,
    );
    table.insert("numberOfLinksPerComponent", component::number_of_links);
    table.insert(
        "numberOfConsumedEndpoints",
        component::number_of_consumed_endpoints,
    );
    table.insert(
        "incomingOutgoingRatioOfAComponent",
        component::incoming_outgoing_ratio,
    );
    table.insert(
        "ratioOfOutgoingLinksOfAService",
        component::ratio_of_outgoing_links,
    );
    table
}

/// Request-trace-scoped calculators keyed by measure name.
pub fn request_trace_measures() -> BTreeMap<&'static str, RequestTraceMeasureFn> {
    let mut table: BTreeMap<&'static str, RequestTraceMeasureFn> = BTreeMap::new();
    table.insert("requestTraceLength", request_trace::request_trace_length);
    table.insert(
        "numberOfCyclesInRequestTraces",
        request_trace::number_of_cycles,
    );
    table.insert(
        "dataReplicationAlongRequestTrace",
        request_trace::data_replication_along_request_trace,
    );
    table
}

/// Run every system-scoped measure against a system.
pub fn calculate_system_measures(system: &System) -> BTreeMap<String, MeasureValue> {
    system_measures()
        .into_iter()
        .map(|(name, calculate)| (name.to_string(), calculate(system)))
        .collect()
}

/// Run every component-scoped measure against one component.
pub fn calculate_component_measures(
    component: &Component,
    system: &System,
) -> BTreeMap<String, MeasureValue> {
    component_measures()
        .into_iter()
        .map(|(name, calculate)| (name.to_string(), calculate(component, system)))
        .collect()
}

/// Run every request-trace-scoped measure against one trace.
pub fn calculate_request_trace_measures(
    trace: &RequestTrace,
    system: &System,
) -> BTreeMap<String, MeasureValue> {
    request_trace_measures()
        .into_iter()
        .map(|(name, calculate)| (name.to_string(), calculate(trace, system)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_value_serializes_as_number_or_sentinel() {
        assert_eq!(
            serde_json::to_string(&MeasureValue::Value(0.5)).unwrap(),
            "0.5"
        );
        assert_eq!(
            serde_json::to_string(&MeasureValue::NotApplicable).unwrap(),
            "\"n/a\""
        );
    }

    #[test]
    fn test_registries_are_disjoint() {
        let system_keys: Vec<_> = system_measures().into_keys().collect();
        let component_keys: Vec<_> = component_measures().into_keys().collect();
        let trace_keys: Vec<_> = request_trace_measures().into_keys().collect();

        for key in &system_keys {
            assert!(!component_keys.contains(key), "{key} in two registries");
            assert!(!trace_keys.contains(key), "{key} in two registries");
        }
        for key in &component_keys {
            assert!(!trace_keys.contains(key), "{key} in two registries");
        }
    }

    #[test]
    fn test_zero_component_system_yields_no_division_errors() {
        let system = System::new("empty");
        for (name, value) in calculate_system_measures(&system) {
            if let Some(v) = value.as_f64() {
                assert!(v.is_finite(), "measure {name} produced {v}");
            }
        }
    }
}
