use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::{EndpointId, LinkId, RequestTraceId};

/// The ordered, possibly branching set of links triggered end-to-end by
/// invoking one external endpoint.
///
/// Each inner set holds the links fanned out at one step of the trace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestTrace {
    pub id: RequestTraceId,
    pub name: String,
    pub external_endpoint: EndpointId,
    links: Vec<Vec<LinkId>>,
}

impl RequestTrace {
    /// Build a trace from ordered link sets. A link appearing more than once
    /// across the sets is kept only at its first position; duplicates are
    /// dropped silently, preserving order.
    pub fn new(id: &str, name: &str, external_endpoint: EndpointId, links: Vec<Vec<LinkId>>) -> Self {
        let mut seen: HashSet<LinkId> = HashSet::new();
        let deduplicated = links
            .into_iter()
            .map(|step| {
                step.into_iter()
                    .filter(|link| seen.insert(link.clone()))
                    .collect::<Vec<_>>()
            })
            .filter(|step| !step.is_empty())
            .collect();
        Self {
            id: RequestTraceId::new(id),
            name: name.to_string(),
            external_endpoint,
            links: deduplicated,
        }
    }

    /// Ordered link sets, one per step of the trace.
    pub fn links(&self) -> &[Vec<LinkId>] {
        &self.links
    }

    /// Number of steps in the trace.
    pub fn length(&self) -> usize {
        self.links.len()
    }

    /// All links of the trace in step order.
    pub fn flattened_links(&self) -> impl Iterator<Item = &LinkId> {
        self.links.iter().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_links_deduplicated() {
        let trace = RequestTrace::new(
            "rq1",
            "request trace 1",
            EndpointId::new("ee1"),
            vec![
                vec![LinkId::new("l1")],
                vec![LinkId::new("l2"), LinkId::new("l1")],
                vec![LinkId::new("l2")],
            ],
        );
        assert_eq!(trace.length(), 2);
        let flattened: Vec<_> = trace.flattened_links().map(|l| l.as_str()).collect();
        assert_eq!(flattened, vec!["l1", "l2"]);
    }

    #[test]
    fn test_trace_length_counts_steps() {
        let trace = RequestTrace::new(
            "rq1",
            "request trace 1",
            EndpointId::new("ee1"),
            vec![
                vec![LinkId::new("l1")],
                vec![LinkId::new("l2"), LinkId::new("l3")],
                vec![LinkId::new("l4")],
            ],
        );
        assert_eq!(trace.length(), 3);
    }
}
