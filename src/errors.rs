//! Error taxonomy for contract runs.

use crate::reflect::ReflectError;
use crate::type_generation::TypeGenerationError;

/// Everything a contract run can report.
///
/// Violations found while probing a subject are recoverable and may be
/// collected (see [`ErrorHandler`](crate::ErrorHandler)). Caller misuse
/// ([`ContractError::ArgumentNull`], [`ContractError::InvalidSubject`],
/// [`ContractError::InvalidConfig`]) is always returned immediately.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ContractError {
    #[error("Cannot create an instance of the type '{type_name}': {reason}")]
    UnsynthesizableType { type_name: String, reason: String },

    #[error("{0}")]
    PropertyContract(String),

    #[error("{0}")]
    EqualityContract(String),

    #[error("{0}")]
    ConstructorMapping(String),

    #[error("Constructor {type_name}{signature} failed: {reason}")]
    ConstructorFailed { type_name: String, signature: String, reason: String },

    #[error("{context} has a null parameter")]
    ArgumentNull { context: String },

    #[error("Invalid subject: {0}")]
    InvalidSubject(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Could not load configuration: {0}")]
    Config(String),

    #[error(transparent)]
    TypeGeneration(#[from] TypeGenerationError),

    #[error(transparent)]
    Reflect(#[from] ReflectError),
}

impl ContractError {
    pub fn unsynthesizable(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        ContractError::UnsynthesizableType { type_name: type_name.into(), reason: reason.into() }
    }

    /// Caller misuse, never collected into a diagnostic list.
    pub fn is_misuse(&self) -> bool {
        matches!(
            self,
            ContractError::ArgumentNull { .. }
                | ContractError::InvalidSubject(_)
                | ContractError::InvalidConfig(_)
                | ContractError::Config(_)
        )
    }
}
