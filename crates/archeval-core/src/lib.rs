pub mod entities;
pub mod error;
pub mod evaluation;
pub mod measures;
pub mod property;
pub mod quamoco;
pub mod system;

pub use entities::*;
pub use error::{ModelError, Result};
pub use evaluation::{EvaluationReport, Evaluator, Rating};
pub use measures::MeasureValue;
pub use quamoco::QualityModel;
pub use system::System;
