//! Error types for the payroll engine.
//!
//! Every fallible operation returns [`EngineError`]. Workflow, calculation and
//! adjustment errors are request-scoped: they are returned to the caller as-is
//! and never retried by the engine.

use thiserror::Error;

/// The main error type for the payroll engine.
///
/// # Example
///
/// ```
/// use payroll_engine::error::EngineError;
///
/// let error = EngineError::NotFound {
///     entity: "salary record".to_string(),
///     id: "42".to_string(),
/// };
/// assert_eq!(error.to_string(), "salary record not found: 42");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// Configuration parsed but violates an invariant.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// What is wrong with the configuration.
        message: String,
    },

    /// Missing or malformed input.
    #[error("Invalid field '{field}': {message}")]
    Validation {
        /// The offending field.
        field: String,
        /// Why it was rejected.
        message: String,
    },

    /// Referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of entity, e.g. "salary record".
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// A workflow transition was attempted from a state that does not allow it.
    #[error("Cannot {action} {entity} in status '{from}'")]
    InvalidTransition {
        /// Kind of entity, e.g. "salary record" or "salary advance".
        entity: String,
        /// The attempted action.
        action: String,
        /// The status the entity was in.
        from: String,
    },

    /// Recalculation attempted on an approved or paid record.
    #[error("Salary record {record_id} is already {status} and cannot be recalculated")]
    AlreadyFinalized {
        /// The finalized record.
        record_id: String,
        /// Its current status.
        status: String,
    },

    /// Adjustment attempted on a paid or rejected record.
    #[error("Salary record {record_id} is {status} and locked for adjustments")]
    RecordLocked {
        /// The locked record.
        record_id: String,
        /// Its current status.
        status: String,
    },

    /// The actor lacks the role required for the action.
    #[error("Actor '{actor}' is not allowed to {action}")]
    Forbidden {
        /// The acting user.
        actor: String,
        /// The attempted action.
        action: String,
    },

    /// Some entries of a batch failed while others succeeded.
    #[error("{failed} of {total} batch entries failed")]
    PartialBatchFailure {
        /// Number of failed entries.
        failed: usize,
        /// Number of entries processed.
        total: usize,
    },
}

impl EngineError {
    /// Shorthand for a [`EngineError::Validation`] error.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Shorthand for a [`EngineError::NotFound`] error.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        EngineError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
