//! Error types for graphql-authz.
//!
//! Two families of errors exist:
//!
//! - [`PolicyError`]: raised while an [`crate::Ability`] is being built from
//!   a policy. These are fatal to the request; nothing executes.
//! - [`Unauthorized`]: raised by a wrapped resolver when the request's
//!   ability denies a field. The executor surfaces it as the request's error.
//!
//! [`Error`] flattens both, together with engine errors, into the categories
//! callers usually branch on.

use graphql_authz_engine::{ExecutionError, FieldError, SchemaError};
use thiserror::Error;

/// Errors raised while declaring permission rules.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// `only` and `except` were both given for one type.
    #[error("cannot specify both an allow-list and a deny-list for type '{type_name}'")]
    ConflictingRules { type_name: String },

    /// Field access was declared on a union type, which has no fields.
    #[error("cannot declare field access on union type '{type_name}'")]
    UnionAccess { type_name: String },

    /// The type already has a permission record in this ability.
    #[error("duplicate permission declaration for type '{type_name}'")]
    DuplicateDeclaration { type_name: String },

    /// The policy never overrode `define_policy`.
    #[error("policy must implement define_policy")]
    NotImplemented,
}

impl PolicyError {
    /// Returns true for self-contradictory or structurally invalid rules.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::ConflictingRules { .. } | Self::UnionAccess { .. })
    }

    pub fn is_duplicate_declaration(&self) -> bool {
        matches!(self, Self::DuplicateDeclaration { .. })
    }

    pub fn is_not_implemented(&self) -> bool {
        matches!(self, Self::NotImplemented)
    }
}

/// A field resolution denied by the request's ability.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Unauthorized {
    /// The identity may not request values of the field's result type.
    #[error("not authorized to execute {type_name}")]
    Execute { type_name: String },

    /// The identity may not read this field on the parent type.
    #[error("not authorized to access {field} on {parent_type}")]
    Access { field: String, parent_type: String },

    /// The request context carries neither an ability nor root access.
    #[error("not authorized: no ability in request context")]
    MissingAbility,
}

impl From<Unauthorized> for FieldError {
    fn from(err: Unauthorized) -> Self {
        FieldError::extension(err)
    }
}

/// Top-level error type for graphql-authz operations.
///
/// - [`Error::Policy`]: fix the policy definition
/// - [`Error::Unauthorized`]: the request was denied
/// - [`Error::Execution`]: the request failed for another reason
/// - [`Error::Schema`]: fix the schema definition
/// - [`Error::Config`]: fix the configuration document
#[derive(Debug, Error)]
pub enum Error {
    #[error("policy error: {0}")]
    Policy(#[from] PolicyError),

    #[error(transparent)]
    Unauthorized(Unauthorized),

    #[error("execution error: {0}")]
    Execution(ExecutionError),

    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

impl Error {
    pub fn is_policy(&self) -> bool {
        matches!(self, Self::Policy(_))
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }

    pub fn is_execution(&self) -> bool {
        matches!(self, Self::Execution(_))
    }

    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

impl From<Unauthorized> for Error {
    fn from(err: Unauthorized) -> Self {
        Self::Unauthorized(err)
    }
}

impl From<ExecutionError> for Error {
    fn from(err: ExecutionError) -> Self {
        match err.downcast_ref::<Unauthorized>() {
            Some(denied) => Self::Unauthorized(denied.clone()),
            None => Self::Execution(err),
        }
    }
}

/// Result type for graphql-authz operations
pub type Result<T> = std::result::Result<T, Error>;
