//! Error types for schema assembly and query execution.

use thiserror::Error;

use crate::execute::OperationType;

/// Errors raised by a single field resolver.
#[derive(Debug, Error)]
pub enum FieldError {
    /// The resolver itself failed (record not found, bad input, ...)
    #[error("{0}")]
    Resolver(String),

    /// An error raised by a layer wrapped around the resolver, such as
    /// an authorization check.
    #[error(transparent)]
    Extension(Box<dyn std::error::Error + Send + Sync>),
}

impl FieldError {
    /// Create a resolver error from a message.
    pub fn resolver(message: impl Into<String>) -> Self {
        Self::Resolver(message.into())
    }

    /// Wrap an error raised by an instrumentation layer.
    pub fn extension(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Extension(Box::new(err))
    }

    /// Returns the wrapped extension error if it is of type `E`.
    pub fn downcast_ref<E: std::error::Error + 'static>(&self) -> Option<&E> {
        match self {
            Self::Extension(err) => err.downcast_ref::<E>(),
            Self::Resolver(_) => None,
        }
    }
}

impl From<String> for FieldError {
    fn from(s: String) -> Self {
        Self::Resolver(s)
    }
}

impl From<&str> for FieldError {
    fn from(s: &str) -> Self {
        Self::Resolver(s.to_string())
    }
}

/// Errors raised while assembling a [`crate::Schema`].
#[derive(Debug, Error)]
pub enum SchemaError {
    /// No query root type was supplied.
    #[error("schema has no query root type")]
    MissingQueryType,

    /// A root operation type is not an object type.
    #[error("root type '{0}' must be an object type")]
    InvalidRoot(String),

    /// Two different types were registered under the same name.
    #[error("type '{0}' is registered more than once")]
    DuplicateType(String),

    /// A field, interface or union member references an unregistered type.
    #[error("type '{type_name}' referenced by '{referenced_by}' is not registered")]
    UnknownType {
        type_name: String,
        referenced_by: String,
    },
}

/// Errors that abort a request. Any failing field fails the whole request.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// A field resolver returned an error.
    #[error("field '{path}' failed: {source}")]
    Field {
        path: String,
        #[source]
        source: FieldError,
    },

    /// The selection names a field the parent type does not define.
    #[error("unknown field '{field}' on type '{type_name}'")]
    UnknownField { field: String, type_name: String },

    /// A non-null position resolved to null.
    #[error("non-null field '{0}' resolved to null")]
    NullValue(String),

    /// A list position resolved to something other than a list.
    #[error("field '{0}' expected a list value")]
    NotAList(String),

    /// The concrete type of an abstract (union/interface) value could not
    /// be determined.
    #[error("cannot resolve concrete type of '{path}' for abstract type '{type_name}'")]
    UnresolvedType { path: String, type_name: String },

    /// The schema has no root type for the requested operation.
    #[error("schema does not define a {0} root type")]
    MissingRoot(OperationType),
}

impl ExecutionError {
    /// The resolver error behind this failure, if any.
    pub fn field_error(&self) -> Option<&FieldError> {
        match self {
            Self::Field { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Returns the extension error of type `E` that aborted the request.
    pub fn downcast_ref<E: std::error::Error + 'static>(&self) -> Option<&E> {
        self.field_error().and_then(FieldError::downcast_ref::<E>)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error, PartialEq)]
    #[error("nope")]
    struct Nope;

    #[test]
    fn test_field_error_downcast() {
        let err = FieldError::extension(Nope);
        assert_eq!(err.downcast_ref::<Nope>(), Some(&Nope));
        assert_eq!(err.to_string(), "nope");

        let err = FieldError::resolver("missing");
        assert!(err.downcast_ref::<Nope>().is_none());
    }

    #[test]
    fn test_execution_error_downcast() {
        let err = ExecutionError::Field {
            path: "session.id".to_string(),
            source: FieldError::extension(Nope),
        };
        assert!(err.downcast_ref::<Nope>().is_some());
        assert_eq!(err.to_string(), "field 'session.id' failed: nope");

        let err = ExecutionError::NullValue("session".to_string());
        assert!(err.downcast_ref::<Nope>().is_none());
        assert!(err.field_error().is_none());
    }
}
