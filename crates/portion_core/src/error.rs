//! Domain errors raised by the portioning engine.

use thiserror::Error;

use crate::Scalar;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PortionError {
    /// A scalar input is non-finite or outside its domain. Raised before any
    /// sampling happens.
    #[error("invalid input `{field}`: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    /// The integrated loaf volume came out non-positive. Depends on the sampled
    /// cross-sections, not only on the inputs.
    #[error("degenerate loaf geometry: integrated volume {volume} is not positive")]
    DegenerateVolume { volume: Scalar },
}

impl PortionError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }
}
