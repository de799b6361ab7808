//! Static quality-model catalog: product factors, quality aspects, the
//! impact edges between them, and the measure descriptions the factors
//! draw on. The catalog is data, loaded once; evaluating it against a
//! concrete system happens in [`crate::evaluation`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FactorId(pub String);

impl FactorId {
    pub fn new(id: &str) -> Self {
        Self(id.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FactorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for FactorId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// An architectural quality concern that cannot be observed directly but is
/// judged from measures and from other product factors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductFactor {
    pub id: FactorId,
    pub name: String,
    pub description: String,
}

impl ProductFactor {
    pub fn new(id: &str, name: &str, description: &str) -> Self {
        Self {
            id: FactorId::new(id),
            name: name.to_string(),
            description: description.to_string(),
        }
    }
}

/// A top-level quality concern, grouped under a coarse high-level aspect
/// such as "security" or "performance efficiency".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityAspect {
    pub id: FactorId,
    pub name: String,
    pub high_level_aspect: String,
    pub description: String,
}

impl QualityAspect {
    pub fn new(id: &str, name: &str, high_level_aspect: &str, description: &str) -> Self {
        Self {
            id: FactorId::new(id),
            name: name.to_string(),
            high_level_aspect: high_level_aspect.to_string(),
            description: description.to_string(),
        }
    }
}

/// Qualitative sign and strength of one impact edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImpactWeight {
    StronglyPositive,
    Positive,
    Negative,
    StronglyNegative,
}

impl ImpactWeight {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImpactWeight::StronglyPositive => "++",
            ImpactWeight::Positive => "+",
            ImpactWeight::Negative => "-",
            ImpactWeight::StronglyNegative => "--",
        }
    }
}

/// Directed edge from a product factor to another factor or to a quality
/// aspect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Impact {
    pub source: FactorId,
    pub target: FactorId,
    pub weight: ImpactWeight,
}

impl Impact {
    pub fn new(source: &str, target: &str, weight: ImpactWeight) -> Self {
        Self {
            source: FactorId::new(source),
            target: FactorId::new(target),
            weight,
        }
    }
}

/// Which kind of model element a measure is calculated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MeasureScope {
    System,
    Component,
    RequestTrace,
}

/// Catalog entry describing one measure: what it expresses and how it is
/// calculated, in prose. The executable calculator lives in
/// [`crate::measures`] under the same key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeasureSpec {
    pub key: String,
    pub name: String,
    pub calculation: String,
    pub scope: MeasureScope,
}

impl MeasureSpec {
    fn new(key: &str, name: &str, calculation: &str, scope: MeasureScope) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
            calculation: calculation.to_string(),
            scope,
        }
    }
}

/// The whole static catalog. Factor-graph cycles among product factors are
/// permitted; dangling impact references are not.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QualityModel {
    pub product_factors: Vec<ProductFactor>,
    pub quality_aspects: Vec<QualityAspect>,
    pub impacts: Vec<Impact>,
    pub measures: Vec<MeasureSpec>,
}

impl QualityModel {
    pub fn product_factor(&self, id: &FactorId) -> Option<&ProductFactor> {
        self.product_factors.iter().find(|f| &f.id == id)
    }

    pub fn quality_aspect(&self, id: &FactorId) -> Option<&QualityAspect> {
        self.quality_aspects.iter().find(|a| &a.id == id)
    }

    pub fn measure(&self, key: &str) -> Option<&MeasureSpec> {
        self.measures.iter().find(|m| m.key == key)
    }

    /// Impacts whose target is the given factor or aspect.
    pub fn impacts_into(&self, target: &FactorId) -> Vec<&Impact> {
        self.impacts.iter().filter(|i| &i.target == target).collect()
    }

    /// Every impact edge must connect ids that exist in the catalog.
    /// Sources are always product factors; targets may be factors or
    /// aspects.
    pub fn validate(&self) -> Result<()> {
        for impact in &self.impacts {
            if self.product_factor(&impact.source).is_none() {
                return Err(ModelError::UnknownFactor(impact.source.to_string()));
            }
            if self.product_factor(&impact.target).is_none()
                && self.quality_aspect(&impact.target).is_none()
            {
                return Err(ModelError::UnknownFactor(impact.target.to_string()));
            }
        }
        Ok(())
    }

    /// Measure descriptions keyed for lookup.
    pub fn measures_by_key(&self) -> BTreeMap<&str, &MeasureSpec> {
        self.measures.iter().map(|m| (m.key.as_str(), m)).collect()
    }

    /// The built-in cloud-native quality catalog.
    pub fn default_model() -> Self {
        use ImpactWeight::{Negative, Positive, StronglyPositive};
        use MeasureScope::{Component, RequestTrace, System};

        let quality_aspects = vec![
            QualityAspect::new(
                "confidentiality",
                "Confidentiality",
                "security",
                "Data is accessible only to those authorized to have access.",
            ),
            QualityAspect::new(
                "availability",
                "Availability",
                "reliability",
                "The system is operational and accessible when required for use.",
            ),
            QualityAspect::new(
                "recoverability",
                "Recoverability",
                "reliability",
                "Data and system state can be re-established after an interruption.",
            ),
            QualityAspect::new(
                "modifiability",
                "Modifiability",
                "maintainability",
                "The system can be changed without introducing defects elsewhere.",
            ),
            QualityAspect::new(
                "analysability",
                "Analysability",
                "maintainability",
                "The impact of an intended change can be assessed effectively.",
            ),
            QualityAspect::new(
                "timeBehaviour",
                "Time-behaviour",
                "performance efficiency",
                "Response and processing times meet requirements under load.",
            ),
            QualityAspect::new(
                "elasticity",
                "Elasticity",
                "performance efficiency",
                "Provisioned resources match the current amount of demand.",
            ),
        ];

        let product_factors = vec![
            ProductFactor::new(
                "dataEncryptionInTransit",
                "Data encryption in transit",
                "Communication between components and from outside the system uses \
                 protocols that encrypt traffic.",
            ),
            ProductFactor::new(
                "serviceReplication",
                "Service replication",
                "Service instances run in multiple replicas so that single-instance \
                 failures do not make the functionality unavailable.",
            ),
            ProductFactor::new(
                "horizontalDataReplication",
                "Horizontal data replication",
                "Data is replicated horizontally across storage instances.",
            ),
            ProductFactor::new(
                "shardedDataStoreReplication",
                "Sharded data store replication",
                "Data is partitioned into shards distributed over storage instances.",
            ),
            ProductFactor::new(
                "looseCoupling",
                "Loose coupling",
                "Components depend on as few other components as possible, and on \
                 stable interfaces rather than internals.",
            ),
            ProductFactor::new(
                "asynchronousCommunication",
                "Asynchronous communication",
                "Components communicate through asynchronous, event-based endpoints \
                 that decouple sender and receiver in time.",
            ),
            ProductFactor::new(
                "functionalDecentralization",
                "Functional decentralization",
                "Business functionality is distributed over several components so \
                 that no single component concentrates unrelated concerns.",
            ),
            ProductFactor::new(
                "limitedFunctionalScope",
                "Limited functional scope",
                "Each component covers one cohesive slice of functionality, visible \
                 as cohesive service interfaces.",
            ),
            ProductFactor::new(
                "serviceIndependence",
                "Service independence",
                "Services can be changed and operated with minimal coordination, \
                 avoiding shared and transitively shared dependencies.",
            ),
            ProductFactor::new(
                "mostlyStatelessServices",
                "Mostly stateless services",
                "Services keep no instance-local state, so instances are disposable \
                 and interchangeable.",
            ),
            ProductFactor::new(
                "healthAndReadinessChecks",
                "Health and readiness checks",
                "Services expose endpoints through which their liveness and \
                 readiness can be observed.",
            ),
            ProductFactor::new(
                "simplicity",
                "Simplicity",
                "Request paths through the system stay short and free of cycles.",
            ),
        ];

        let impacts = vec![
            Impact::new("dataEncryptionInTransit", "confidentiality", StronglyPositive),
            Impact::new("serviceReplication", "availability", StronglyPositive),
            Impact::new("serviceReplication", "elasticity", Positive),
            Impact::new("horizontalDataReplication", "recoverability", StronglyPositive),
            Impact::new("horizontalDataReplication", "availability", Positive),
            Impact::new("shardedDataStoreReplication", "timeBehaviour", Positive),
            Impact::new("asynchronousCommunication", "looseCoupling", StronglyPositive),
            Impact::new("looseCoupling", "modifiability", StronglyPositive),
            Impact::new("looseCoupling", "analysability", Positive),
            Impact::new("functionalDecentralization", "looseCoupling", Positive),
            Impact::new("limitedFunctionalScope", "modifiability", Positive),
            Impact::new("limitedFunctionalScope", "analysability", Positive),
            Impact::new("serviceIndependence", "modifiability", StronglyPositive),
            Impact::new("mostlyStatelessServices", "serviceReplication", Positive),
            Impact::new("mostlyStatelessServices", "elasticity", Positive),
            Impact::new("healthAndReadinessChecks", "availability", Positive),
            Impact::new("simplicity", "analysability", Positive),
            Impact::new("simplicity", "timeBehaviour", Positive),
            Impact::new("mostlyStatelessServices", "looseCoupling", Positive),
            Impact::new("asynchronousCommunication", "timeBehaviour", Negative),
        ];

        let measures = vec![
            MeasureSpec::new(
                "serviceReplicationLevel",
                "Service replication level",
                "Average replica count over all deployment mappings of services.",
                System,
            ),
            MeasureSpec::new(
                "storageReplicationLevel",
                "Storage replication level",
                "Average replica count over all deployment mappings of storage \
                 backing services.",
                System,
            ),
            MeasureSpec::new(
                "externallyAvailableEndpoints",
                "Externally available endpoints",
                "Total number of external endpoints in the system.",
                System,
            ),
            MeasureSpec::new(
                "dataShardingLevel",
                "Data sharding level",
                "Average number of shards over all storage backing services.",
                System,
            ),
            MeasureSpec::new(
                "ratioOfEndpointsSupportingSsl",
                "Ratio of endpoints that support SSL",
                "Number of non-external endpoints with a TLS-capable protocol \
                 divided by the number of non-external endpoints without one.",
                System,
            ),
            MeasureSpec::new(
                "ratioOfExternalEndpointsSupportingTls",
                "Ratio of external endpoints that support TLS",
                "Number of external endpoints with a TLS-capable protocol divided \
                 by the total number of external endpoints.",
                System,
            ),
            MeasureSpec::new(
                "ratioOfSecuredLinks",
                "Ratio of secured links",
                "Number of links targeting a TLS-capable endpoint divided by the \
                 total number of links.",
                System,
            ),
            MeasureSpec::new(
                "dataAggregateScope",
                "Data aggregate scope",
                "Total number of data aggregates in the system.",
                System,
            ),
            MeasureSpec::new(
                "ratioOfStatefulComponents",
                "Ratio of stateful components",
                "Number of components not marked stateless divided by the total \
                 number of components.",
                System,
            ),
            MeasureSpec::new(
                "ratioOfStatelessComponents",
                "Ratio of stateless components",
                "Number of components marked stateless divided by the total number \
                 of components.",
                System,
            ),
            MeasureSpec::new(
                "degreeToWhichComponentsAreLinkedToStatefulComponents",
                "Degree to which components are linked to stateful components",
                "For each component, the share of its targeted components that are \
                 stateful; averaged over all components.",
                System,
            ),
            MeasureSpec::new(
                "degreeOfAsynchronousCommunication",
                "Degree of asynchronous communication",
                "Per component, the share of its endpoints that are event-based; \
                 averaged over all components.",
                System,
            ),
            MeasureSpec::new(
                "asynchronousCommunicationUtilization",
                "Asynchronous communication utilization",
                "Number of links targeting an event-based endpoint divided by the \
                 total number of links.",
                System,
            ),
            MeasureSpec::new(
                "ratioOfServicesThatProvideHealthEndpoints",
                "Ratio of services that provide health endpoints",
                "Share of services providing at least one endpoint marked as a \
                 health or readiness check.",
                System,
            ),
            MeasureSpec::new(
                "couplingDegreeBasedOnPotentialCoupling",
                "Coupling degree based on potential coupling",
                "Sum of all-pairs shortest path lengths, normalized between the \
                 fully connected minimum and the fully disconnected maximum where \
                 an unreachable pair counts N-1.",
                System,
            ),
            MeasureSpec::new(
                "interactionDensityBasedOnComponents",
                "Interaction density based on components",
                "Number of links divided by the number of components.",
                System,
            ),
            MeasureSpec::new(
                "interactionDensityBasedOnLinks",
                "Interaction density based on links",
                "Number of links divided by the product of component count and \
                 endpoint count.",
                System,
            ),
            MeasureSpec::new(
                "systemCouplingBasedOnEndpointEntropy",
                "System coupling based on endpoint entropy",
                "Per component, the mean base-10 entropy of incoming links per \
                 endpoint; summed over all components.",
                System,
            ),
            MeasureSpec::new(
                "servicesInterdependenceInTheSystem",
                "Services interdependence in the system",
                "Number of unordered component pairs that call each other in both \
                 directions.",
                System,
            ),
            MeasureSpec::new(
                "aggregateSystemMetricToMeasureServiceCoupling",
                "Aggregate system metric to measure service coupling",
                "Number of distinct ordered component pairs connected by at least \
                 one link, divided by N*(N-1).",
                System,
            ),
            MeasureSpec::new(
                "degreeOfCouplingInASystem",
                "Degree of coupling in a system",
                "Sum over components of their distinct call targets, divided by \
                 N*(N-1).",
                System,
            ),
            MeasureSpec::new(
                "simpleDegreeOfCouplingInASystem",
                "Simple degree of coupling in a system",
                "Sum over components of their distinct call targets, divided by N.",
                System,
            ),
            MeasureSpec::new(
                "directServiceSharing",
                "Direct service sharing",
                "Average of the share of components consumed by more than one \
                 component and the share of links targeting endpoints consumed by \
                 more than one component.",
                System,
            ),
            MeasureSpec::new(
                "transitivelySharedServices",
                "Transitively shared services",
                "Average of the share of components transitively reachable from \
                 more than one component and the share of links targeting them.",
                System,
            ),
            MeasureSpec::new(
                "ratioOfSharedNonExternalComponentsToNonExternalComponents",
                "Ratio of shared components",
                "Number of components with more than one distinct consumer divided \
                 by the total number of components.",
                System,
            ),
            MeasureSpec::new(
                "ratioOfSharedDependenciesOfNonExternalComponentsToPossibleDependencies",
                "Ratio of shared dependencies to possible dependencies",
                "Sum of consumer counts of shared components divided by N squared.",
                System,
            ),
            MeasureSpec::new(
                "serviceInterfaceDataCohesion",
                "Service interface data cohesion",
                "Number of endpoints sharing at least one data aggregate with \
                 another endpoint of the same component, divided by the number of \
                 distinct data aggregates used by its endpoints.",
                Component,
            ),
            MeasureSpec::new(
                "serviceInterfaceUsageCohesion",
                "Service interface usage cohesion",
                "Actual consumer-endpoint pairings of a component divided by the \
                 number of possible pairings.",
                Component,
            ),
            MeasureSpec::new(
                "totalServiceInterfaceCohesion",
                "Total service interface cohesion",
                "Arithmetic mean of data cohesion and usage cohesion.",
                Component,
            ),
            MeasureSpec::new(
                "cohesionBetweenEndpointsBasedOnDataAggregateUsage",
                "Cohesion between endpoints based on data aggregate usage",
                "Average Jaccard similarity of the data-aggregate sets of every \
                 endpoint pair of the component.",
                Component,
            ),
            MeasureSpec::new(
                "numberOfProvidedSynchronousAndAsynchronousEndpoints",
                "Number of provided endpoints",
                "Total number of endpoints provided by the component.",
                Component,
            ),
            MeasureSpec::new(
                "numberOfSynchronousEndpointsOfferedByAService",
                "Number of synchronous endpoints",
                "Number of the component's endpoints with a query or command kind.",
                Component,
            ),
            MeasureSpec::new(
                "numberOfAsynchronousEndpointsOfferedByAService",
                "Number of asynchronous endpoints",
                "Number of the component's endpoints with an event kind.",
                Component,
            ),
            MeasureSpec::new(
                "numberOfSynchronousOutgoingLinks",
                "Number of synchronous outgoing links",
                "Number of the component's outgoing links targeting a synchronous \
                 endpoint.",
                Component,
            ),
            MeasureSpec::new(
                "numberOfAsynchronousOutgoingLinks",
                "Number of asynchronous outgoing links",
                "Number of the component's outgoing links targeting an event-based \
                 endpoint.",
                Component,
            ),
            MeasureSpec::new(
                "ratioOfAsynchronousOutgoingLinks",
                "Ratio of asynchronous outgoing links",
                "Asynchronous outgoing links divided by all outgoing links of the \
                 component.",
                Component,
            ),
            MeasureSpec::new(
                "numberOfLinksPerComponent",
                "Number of links per component",
                "Outgoing plus incoming links of the component.",
                Component,
            ),
            MeasureSpec::new(
                "numberOfConsumedEndpoints",
                "Number of consumed endpoints",
                "Number of distinct endpoints the component's outgoing links \
                 target.",
                Component,
            ),
            MeasureSpec::new(
                "incomingOutgoingRatioOfAComponent",
                "Incoming/outgoing ratio of a component",
                "Incoming links of the component divided by its outgoing links.",
                Component,
            ),
            MeasureSpec::new(
                "ratioOfOutgoingLinksOfAService",
                "Ratio of outgoing links of a service",
                "Outgoing links divided by all links of the component, times 100.",
                Component,
            ),
            MeasureSpec::new(
                "requestTraceLength",
                "Request trace length",
                "Number of steps in the trace's ordered link-set sequence.",
                RequestTrace,
            ),
            MeasureSpec::new(
                "numberOfCyclesInRequestTraces",
                "Number of cycles in request traces",
                "Number of times the trace's flattened link sequence revisits an \
                 already-visited component.",
                RequestTrace,
            ),
            MeasureSpec::new(
                "dataReplicationAlongRequestTrace",
                "Data replication along request trace",
                "Usage-relation weights of the trace's components for every data \
                 aggregate referenced in the trace, divided by the maximum weighted \
                 sum over its non-storage components.",
                RequestTrace,
            ),
        ];

        Self {
            product_factors,
            quality_aspects,
            impacts,
            measures,
        }
    }
}
