use thiserror::Error;

/// Integrity errors raised by the entity graph and the factor catalog.
///
/// Computation gaps (an empty denominator, a measure a factor needs but
/// cannot get) are not errors; they surface as `MeasureValue::NotApplicable`
/// or `Rating::Unknown` instead.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("endpoint '{0}' is not registered on any component")]
    UnknownEndpoint(String),

    #[error("component '{0}' does not exist in this system")]
    UnknownComponent(String),

    #[error("property '{key}' is not declared for this entity")]
    UnknownProperty { key: String },

    #[error("impact references unknown factor '{0}'")]
    UnknownFactor(String),

    #[error("{context}: expected {expected}, got {actual}")]
    WrongEntityKind {
        context: String,
        expected: String,
        actual: String,
    },
}

pub type Result<T> = std::result::Result<T, ModelError>;
