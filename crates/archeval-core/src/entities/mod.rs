pub mod component;
pub mod data;
pub mod deployment;
pub mod endpoint;
pub mod infrastructure;
pub mod link;
pub mod request_trace;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use component::{Component, ComponentKind};
pub use data::{BackingData, DataAggregate, DataUsageKind, DataUsageRelation, DataUse};
pub use deployment::{DeployedEntity, DeploymentMapping};
pub use endpoint::Endpoint;
pub use infrastructure::Infrastructure;
pub use link::Link;
pub use request_trace::RequestTrace;

macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: &str) -> Self {
                Self(id.to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }
    };
}

entity_id!(
    /// Unique identifier of a component within a system.
    ComponentId
);
entity_id!(
    /// System-wide unique identifier of an endpoint.
    EndpointId
);
entity_id!(
    /// Unique identifier of a link.
    LinkId
);
entity_id!(
    /// Unique identifier of a data aggregate or backing data entity.
    DataId
);
entity_id!(
    /// Unique identifier of an infrastructure entity.
    InfrastructureId
);
entity_id!(
    /// Unique identifier of a deployment mapping.
    DeploymentMappingId
);
entity_id!(
    /// Unique identifier of a request trace.
    RequestTraceId
);
