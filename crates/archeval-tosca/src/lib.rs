pub mod convert;
pub mod keys;
pub mod template;

pub use convert::{system_to_template, template_to_system, ToscaConversion};
pub use keys::{transform_to_key, TwoWayKeyIdMap, UniqueKeyManager};
pub use template::{ServiceTemplate, TopologyTemplate};
