//! Component-scoped measure calculators.

use std::collections::{HashMap, HashSet};

use super::MeasureValue;
use crate::entities::{Component, ComponentId, DataId, EndpointId};
use crate::system::System;

/// Share of this component's data aggregates touched by more than one of
/// its endpoints, relative to the number of data aggregates it uses.
pub fn service_interface_data_cohesion(component: &Component, _system: &System) -> MeasureValue {
    let mut usage: HashMap<&DataId, Vec<&EndpointId>> = component
        .data_uses
        .iter()
        .map(|data_use| (&data_use.data, Vec::new()))
        .collect();
    if usage.is_empty() {
        return MeasureValue::NotApplicable;
    }

    for endpoint in component.all_endpoints() {
        for data_use in &endpoint.data_uses {
            if let Some(endpoints) = usage.get_mut(&data_use.data) {
                endpoints.push(&endpoint.id);
            }
        }
    }

    let mut endpoints_sharing_data: HashSet<&EndpointId> = HashSet::new();
    for endpoints in usage.values() {
        if endpoints.len() > 1 {
            endpoints_sharing_data.extend(endpoints);
        }
    }
    MeasureValue::Value(endpoints_sharing_data.len() as f64 / usage.len() as f64)
}

/// Actual endpoint consumptions over possible client/endpoint pairings.
pub fn service_interface_usage_cohesion(component: &Component, system: &System) -> MeasureValue {
    let endpoint_ids: HashSet<&EndpointId> =
        component.endpoints().iter().map(|e| &e.id).collect();

    let mut total_usage = 0usize;
    let mut clients: HashSet<&ComponentId> = HashSet::new();
    for link in system.links() {
        if endpoint_ids.contains(&link.target_endpoint) {
            clients.insert(&link.source);
            total_usage += 1;
        }
    }

    let possible = endpoint_ids.len() * clients.len();
    if possible == 0 {
        return MeasureValue::NotApplicable;
    }
    MeasureValue::Value(total_usage as f64 / possible as f64)
}

/// Mean of data cohesion and usage cohesion.
pub fn total_service_interface_cohesion(component: &Component, system: &System) -> MeasureValue {
    let data = service_interface_data_cohesion(component, system);
    let usage = service_interface_usage_cohesion(component, system);
    match (data.as_f64(), usage.as_f64()) {
        (Some(data), Some(usage)) => MeasureValue::Value((data + usage) / 2.0),
        _ => MeasureValue::NotApplicable,
    }
}

/// Mean Jaccard similarity of data-aggregate usage over all endpoint pairs.
pub fn cohesion_between_endpoints_based_on_data_aggregate_usage(
    component: &Component,
    _system: &System,
) -> MeasureValue {
    let endpoints: Vec<_> = component.all_endpoints().collect();
    if endpoints.len() < 2 {
        return MeasureValue::NotApplicable;
    }

    let data_of: Vec<HashSet<&DataId>> = endpoints
        .iter()
        .map(|endpoint| endpoint.data_uses.iter().map(|u| &u.data).collect())
        .collect();

    let mut shared_usages: Vec<f64> = Vec::new();
    for (i, first) in data_of.iter().enumerate() {
        for second in data_of.iter().skip(i + 1) {
            let union = first.union(second).count();
            if union == 0 {
                shared_usages.push(0.0);
            } else {
                let intersection = first.intersection(second).count();
                shared_usages.push(intersection as f64 / union as f64);
            }
        }
    }
    MeasureValue::Value(shared_usages.iter().sum::<f64>() / shared_usages.len() as f64)
}

pub fn number_of_provided_endpoints(component: &Component, _system: &System) -> MeasureValue {
    component.all_endpoints().count().into()
}

pub fn number_of_synchronous_endpoints(component: &Component, _system: &System) -> MeasureValue {
    component
        .all_endpoints()
        .filter(|e| e.is_synchronous())
        .count()
        .into()
}

pub fn number_of_asynchronous_endpoints(component: &Component, _system: &System) -> MeasureValue {
    component
        .all_endpoints()
        .filter(|e| e.is_asynchronous())
        .count()
        .into()
}

fn outgoing_links_by_target_kind(
    component: &Component,
    system: &System,
    asynchronous: bool,
) -> usize {
    system
        .outgoing_links_of(&component.id)
        .iter()
        .filter(|link| {
            system
                .endpoint(&link.target_endpoint)
                .is_some_and(|e| e.is_asynchronous() == asynchronous)
        })
        .count()
}

pub fn number_of_synchronous_outgoing_links(
    component: &Component,
    system: &System,
) -> MeasureValue {
    outgoing_links_by_target_kind(component, system, false).into()
}

pub fn number_of_asynchronous_outgoing_links(
    component: &Component,
    system: &System,
) -> MeasureValue {
    outgoing_links_by_target_kind(component, system, true).into()
}

pub fn ratio_of_asynchronous_outgoing_links(
    component: &Component,
    system: &System,
) -> MeasureValue {
    let outgoing = system.outgoing_links_of(&component.id).len();
    if outgoing == 0 {
        return MeasureValue::NotApplicable;
    }
    let asynchronous = outgoing_links_by_target_kind(component, system, true);
    MeasureValue::Value(asynchronous as f64 / outgoing as f64)
}

pub fn number_of_links(component: &Component, system: &System) -> MeasureValue {
    (system.outgoing_links_of(&component.id).len() + system.incoming_links_of(&component.id).len())
        .into()
}

pub fn number_of_consumed_endpoints(component: &Component, system: &System) -> MeasureValue {
    system.outgoing_links_of(&component.id).len().into()
}

pub fn incoming_outgoing_ratio(component: &Component, system: &System) -> MeasureValue {
    let incoming = system.incoming_links_of(&component.id).len();
    if incoming == 0 {
        return MeasureValue::NotApplicable;
    }
    let outgoing = system.outgoing_links_of(&component.id).len();
    MeasureValue::Value(outgoing as f64 / incoming as f64)
}

/// Outgoing links as a percentage of all links incident to the component.
pub fn ratio_of_outgoing_links(component: &Component, system: &System) -> MeasureValue {
    let incoming = system.incoming_links_of(&component.id).len();
    let outgoing = system.outgoing_links_of(&component.id).len();
    if incoming + outgoing == 0 {
        return MeasureValue::NotApplicable;
    }
    MeasureValue::Value(outgoing as f64 / (incoming + outgoing) as f64 * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{
        ComponentKind, DataAggregate, DataUsageRelation, DataUse, Endpoint, Link,
    };
    use crate::property::PropertyValue;

    fn assert_close(value: MeasureValue, expected: f64) {
        let value = value.as_f64().expect("expected an applicable value");
        assert!(
            (value - expected).abs() < 1e-6,
            "expected {expected}, got {value}"
        );
    }

    fn data_use(data: &str, relation: &str) -> DataUse {
        DataUse::new(DataId::new(data), DataUsageRelation::new(relation))
    }

    /// Provider with two endpoints sharing one of two data aggregates,
    /// consumed by two clients over three links.
    fn cohesion_fixture() -> System {
        let mut system = System::new("testSystem");

        let mut provider = Component::new("s1", "provider", ComponentKind::Service);
        provider.add_data_use(data_use("da1", "r1"));
        provider.add_data_use(data_use("da2", "r2"));

        let mut endpoint_a = Endpoint::new("e1", "endpoint 1");
        endpoint_a.add_data_use(data_use("da1", "r3"));
        provider.add_endpoint(endpoint_a);

        let mut endpoint_b = Endpoint::new("e2", "endpoint 2");
        endpoint_b.add_data_use(data_use("da1", "r4"));
        endpoint_b.add_data_use(data_use("da2", "r5"));
        provider.add_endpoint(endpoint_b);

        let mut client_x = Component::new("s2", "client X", ComponentKind::Service);
        client_x.add_endpoint(Endpoint::new("e3", "endpoint 3"));
        let client_y = Component::new("s3", "client Y", ComponentKind::Service);

        system.add_component(provider);
        system.add_component(client_x);
        system.add_component(client_y);
        system.add_data_aggregate(DataAggregate::new("da1", "Data A"));
        system.add_data_aggregate(DataAggregate::new("da2", "Data B"));
        system.add_link(Link::new("l1", ComponentId::new("s2"), EndpointId::new("e1")));
        system.add_link(Link::new("l2", ComponentId::new("s2"), EndpointId::new("e2")));
        system.add_link(Link::new("l3", ComponentId::new("s3"), EndpointId::new("e2")));
        system
    }

    fn provider(system: &System) -> &Component {
        system.component(&ComponentId::new("s1")).unwrap()
    }

    #[test]
    fn test_service_interface_data_cohesion() {
        let system = cohesion_fixture();
        // da1 is touched by both endpoints, da2 by only one: 2 endpoints / 2 aggregates
        assert_close(service_interface_data_cohesion(provider(&system), &system), 1.0);
    }

    #[test]
    fn test_data_cohesion_without_data_is_not_applicable() {
        let system = cohesion_fixture();
        let client = system.component(&ComponentId::new("s2")).unwrap();
        assert_eq!(
            service_interface_data_cohesion(client, &system),
            MeasureValue::NotApplicable
        );
    }

    #[test]
    fn test_service_interface_usage_cohesion() {
        let system = cohesion_fixture();
        // 3 consumptions over 2 endpoints x 2 clients
        assert_close(service_interface_usage_cohesion(provider(&system), &system), 3.0 / 4.0);
    }

    #[test]
    fn test_total_service_interface_cohesion() {
        let system = cohesion_fixture();
        assert_close(
            total_service_interface_cohesion(provider(&system), &system),
            (1.0 + 3.0 / 4.0) / 2.0,
        );
    }

    #[test]
    fn test_cohesion_between_endpoints() {
        let system = cohesion_fixture();
        // single pair: intersection {da1}, union {da1, da2}
        assert_close(
            cohesion_between_endpoints_based_on_data_aggregate_usage(provider(&system), &system),
            0.5,
        );
    }

    #[test]
    fn test_cohesion_between_endpoints_needs_a_pair() {
        let system = cohesion_fixture();
        let client = system.component(&ComponentId::new("s2")).unwrap();
        assert_eq!(
            cohesion_between_endpoints_based_on_data_aggregate_usage(client, &system),
            MeasureValue::NotApplicable
        );
    }

    #[test]
    fn test_endpoint_counts_by_kind() {
        let mut component = Component::new("s1", "service", ComponentKind::Service);
        component.add_endpoint(Endpoint::new("e1", "query endpoint"));
        let mut command = Endpoint::new("e2", "command endpoint");
        command
            .properties
            .set_value("kind", PropertyValue::Text("command".into()))
            .unwrap();
        component.add_endpoint(command);
        let mut event = Endpoint::new_external("ee1", "event endpoint");
        event
            .properties
            .set_value("kind", PropertyValue::Text("event".into()))
            .unwrap();
        component.add_endpoint(event);

        let mut system = System::new("testSystem");
        system.add_component(component);
        let component = system.component(&ComponentId::new("s1")).unwrap();

        assert_close(number_of_provided_endpoints(component, &system), 3.0);
        assert_close(number_of_synchronous_endpoints(component, &system), 2.0);
        assert_close(number_of_asynchronous_endpoints(component, &system), 1.0);
    }

    #[test]
    fn test_outgoing_link_measures() {
        let mut system = System::new("testSystem");

        let mut provider = Component::new("s1", "provider", ComponentKind::Service);
        provider.add_endpoint(Endpoint::new("e1", "query endpoint"));
        let mut event = Endpoint::new("e2", "event endpoint");
        event
            .properties
            .set_value("kind", PropertyValue::Text("event".into()))
            .unwrap();
        provider.add_endpoint(event);

        let mut consumer = Component::new("s2", "consumer", ComponentKind::Service);
        consumer.add_endpoint(Endpoint::new("e3", "endpoint 3"));

        system.add_component(provider);
        system.add_component(consumer);
        system.add_link(Link::new("l1", ComponentId::new("s2"), EndpointId::new("e1")));
        system.add_link(Link::new("l2", ComponentId::new("s2"), EndpointId::new("e2")));
        system.add_link(Link::new("l3", ComponentId::new("s1"), EndpointId::new("e3")));

        let consumer = system.component(&ComponentId::new("s2")).unwrap();
        assert_close(number_of_synchronous_outgoing_links(consumer, &system), 1.0);
        assert_close(number_of_asynchronous_outgoing_links(consumer, &system), 1.0);
        assert_close(ratio_of_asynchronous_outgoing_links(consumer, &system), 0.5);
        assert_close(number_of_consumed_endpoints(consumer, &system), 2.0);
        assert_close(number_of_links(consumer, &system), 3.0);
        assert_close(incoming_outgoing_ratio(consumer, &system), 2.0);
        assert_close(ratio_of_outgoing_links(consumer, &system), 2.0 / 3.0 * 100.0);
    }

    #[test]
    fn test_isolated_component_ratios_are_not_applicable() {
        let mut system = System::new("testSystem");
        system.add_component(Component::new("s1", "isolated", ComponentKind::Service));
        let component = system.component(&ComponentId::new("s1")).unwrap();

        assert_eq!(
            ratio_of_asynchronous_outgoing_links(component, &system),
            MeasureValue::NotApplicable
        );
        assert_eq!(
            incoming_outgoing_ratio(component, &system),
            MeasureValue::NotApplicable
        );
        assert_eq!(
            ratio_of_outgoing_links(component, &system),
            MeasureValue::NotApplicable
        );
        assert_eq!(
            service_interface_usage_cohesion(component, &system),
            MeasureValue::NotApplicable
        );
    }
}
