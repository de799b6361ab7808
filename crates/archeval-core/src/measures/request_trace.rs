//! Request-trace-scoped measure calculators.

use std::collections::HashSet;

use super::MeasureValue;
use crate::entities::{ComponentId, ComponentKind, DataId, RequestTrace};
use crate::system::System;

/// Number of steps in the trace.
pub fn request_trace_length(trace: &RequestTrace, _system: &System) -> MeasureValue {
    trace.length().into()
}

/// Counts revisits of an already-traversed component along the trace.
///
/// The visited set resets after each detected cycle, so a trace looping
/// twice through the same component reports two cycles.
pub fn number_of_cycles(trace: &RequestTrace, system: &System) -> MeasureValue {
    let mut visited: HashSet<ComponentId> = HashSet::new();
    if let Ok(entry) = system.component_of_endpoint(&trace.external_endpoint) {
        visited.insert(entry.id.clone());
    }

    let mut cycles = 0usize;
    for link_id in trace.flattened_links() {
        let Some(link) = system.link(link_id) else {
            continue;
        };
        let Some(target) = system.link_target(link) else {
            continue;
        };
        if !visited.insert(target.id.clone()) {
            cycles += 1;
            visited.clear();
            visited.insert(target.id.clone());
        }
    }
    MeasureValue::Value(cycles as f64)
}

/// Weighted data-replication ratio along the trace.
///
/// For every data aggregate referenced by an endpoint involved in the trace
/// and every component the trace touches, the component's strongest usage
/// relation to that aggregate contributes its weight. The sum is normalized
/// by the maximum achievable: every non-storage component persisting every
/// tracked aggregate (a storage service is the replication target itself,
/// not a replica holder).
pub fn data_replication_along_request_trace(
    trace: &RequestTrace,
    system: &System,
) -> MeasureValue {
    let mut components: Vec<ComponentId> = Vec::new();
    let mut seen: HashSet<ComponentId> = HashSet::new();
    let mut tracked_data: HashSet<DataId> = HashSet::new();

    let mut touch = |id: &ComponentId, components: &mut Vec<ComponentId>| {
        if seen.insert(id.clone()) {
            components.push(id.clone());
        }
    };

    if let Ok(entry) = system.component_of_endpoint(&trace.external_endpoint) {
        touch(&entry.id, &mut components);
    }
    if let Some(endpoint) = system.endpoint(&trace.external_endpoint) {
        tracked_data.extend(endpoint.data_uses.iter().map(|u| u.data.clone()));
    }

    for link_id in trace.flattened_links() {
        let Some(link) = system.link(link_id) else {
            continue;
        };
        touch(&link.source, &mut components);
        if let Some(target) = system.link_target(link) {
            touch(&target.id, &mut components);
        }
        if let Some(endpoint) = system.endpoint(&link.target_endpoint) {
            tracked_data.extend(endpoint.data_uses.iter().map(|u| u.data.clone()));
        }
    }

    let replica_holders = components
        .iter()
        .filter_map(|id| system.component(id))
        .filter(|c| c.kind != ComponentKind::StorageBackingService)
        .count();
    let maximum = (replica_holders * tracked_data.len()) as f64;
    if maximum == 0.0 {
        return MeasureValue::NotApplicable;
    }

    let mut sum = 0.0;
    for component_id in &components {
        let Some(component) = system.component(component_id) else {
            continue;
        };
        for data_id in &tracked_data {
            let weight = component
                .data_uses
                .iter()
                .filter(|data_use| &data_use.data == data_id)
                .map(|data_use| data_use.relation.usage_kind().weight())
                .fold(None::<f64>, |best, w| Some(best.map_or(w, |b| b.max(w))));
            if let Some(weight) = weight {
                sum += weight;
            }
        }
    }
    MeasureValue::Value(sum / maximum)
}
