// Pipeline error taxonomy
use thiserror::Error;

/// Local failures raised while processing one data-received event.
///
/// None of these abort the event: each one skips only the series, link or
/// layer it was raised for.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    #[error("layer {layer_id} is not initialized yet")]
    MissingCapability { layer_id: String },

    #[error("series {target} does not match any link")]
    NoMatch { target: String },

    #[error("series {target} has no valid samples")]
    EmptyAggregate { target: String },

    #[error("invalid color domain [{min}, {max}]")]
    InvalidDomain { min: f64, max: f64 },

    #[error("data feed error: {0}")]
    DataFeed(String),
}
