/// Convenience result type used across reelcast.
pub type ReelResult<T> = Result<T, ReelError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Configuration errors are raised while scheduling and composing a timeline, before any
/// frame is evaluated. Frame evaluation itself never fails for in-range timelines.
#[derive(thiserror::Error, Debug)]
pub enum ReelError {
    /// Malformed descriptor, inputs, keyframe table, profile, schedule, or overlay placement.
    #[error("configuration error: {field}: {constraint}")]
    Configuration {
        /// Path of the offending field, e.g. `overlays[2]` or `input_range`.
        field: String,
        /// The constraint that was violated.
        constraint: String,
    },

    /// Errors while driving frame evaluation from a host renderer.
    #[error("evaluation error: {0}")]
    Evaluation(String),

    /// Errors raised by a frame sink while writing output.
    #[error("encode error: {0}")]
    Encode(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReelError {
    /// Build a [`ReelError::Configuration`] value.
    pub fn config(field: impl Into<String>, constraint: impl Into<String>) -> Self {
        Self::Configuration {
            field: field.into(),
            constraint: constraint.into(),
        }
    }

    /// Build a [`ReelError::Evaluation`] value.
    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }

    /// Build a [`ReelError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`ReelError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Offending field for configuration errors.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Configuration { field, .. } => Some(field),
            _ => None,
        }
    }

    /// Prefix every configuration field path with `parent`, e.g. `params` -> `profiles[1].params`.
    pub fn within(self, parent: &str) -> Self {
        match self {
            Self::Configuration { field, constraint } => Self::Configuration {
                field: format!("{parent}.{field}"),
                constraint,
            },
            other => other,
        }
    }
}

impl From<serde_json::Error> for ReelError {
    fn from(e: serde_json::Error) -> Self {
        Self::serde(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
