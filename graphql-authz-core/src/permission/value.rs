//! Permission values.
//!
//! A permission is either a fixed boolean or a predicate evaluated at query
//! time. Predicates come in a closed set of shapes; the caller supplies a
//! positional argument list and each shape takes as many leading entries
//! as it declares:
//!
//! | Check | Positional list |
//! |-------|-----------------|
//! | execute | `[args]` |
//! | access | `[object, args]` |
//!
//! So a [`Predicate::unary`] execute rule sees the arguments, while a
//! [`Predicate::unary`] access rule sees the parent object.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

static NULL: Value = Value::Null;

type NoArgsFn = dyn Fn() -> bool + Send + Sync;
type UnaryFn = dyn Fn(&Value) -> bool + Send + Sync;
type BinaryFn = dyn Fn(&Value, &Value) -> bool + Send + Sync;
type VariadicFn = dyn Fn(&[&Value]) -> bool + Send + Sync;

/// A permission predicate of a fixed shape.
#[derive(Clone)]
pub enum Predicate {
    /// Ignores every supplied argument.
    NoArgs(Arc<NoArgsFn>),
    /// Receives the first positional argument.
    Unary(Arc<UnaryFn>),
    /// Receives the first two positional arguments.
    Binary(Arc<BinaryFn>),
    /// Receives the full positional list unmodified.
    Variadic(Arc<VariadicFn>),
}

impl Predicate {
    /// Predicate that takes no positional arguments.
    pub fn no_args(f: impl Fn() -> bool + Send + Sync + 'static) -> Self {
        Self::NoArgs(Arc::new(f))
    }

    /// Predicate over the first positional argument.
    pub fn unary(f: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        Self::Unary(Arc::new(f))
    }

    /// Predicate over the first two positional arguments.
    pub fn binary(f: impl Fn(&Value, &Value) -> bool + Send + Sync + 'static) -> Self {
        Self::Binary(Arc::new(f))
    }

    /// Predicate over the whole positional list.
    pub fn variadic(f: impl Fn(&[&Value]) -> bool + Send + Sync + 'static) -> Self {
        Self::Variadic(Arc::new(f))
    }

    /// Number of positional arguments consumed; `None` for variadic.
    pub fn arity(&self) -> Option<usize> {
        match self {
            Self::NoArgs(_) => Some(0),
            Self::Unary(_) => Some(1),
            Self::Binary(_) => Some(2),
            Self::Variadic(_) => None,
        }
    }

    /// Evaluate with `supplied` truncated to this predicate's arity.
    /// Positions past the end of `supplied` are bound to `null`.
    pub fn evaluate(&self, supplied: &[&Value]) -> bool {
        let at = |index: usize| supplied.get(index).copied().unwrap_or(&NULL);
        match self {
            Self::NoArgs(f) => f(),
            Self::Unary(f) => f(at(0)),
            Self::Binary(f) => f(at(0), at(1)),
            Self::Variadic(f) => f(supplied),
        }
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shape = match self {
            Self::NoArgs(_) => "NoArgs",
            Self::Unary(_) => "Unary",
            Self::Binary(_) => "Binary",
            Self::Variadic(_) => "Variadic",
        };
        write!(f, "Predicate::{}(..)", shape)
    }
}

/// A stored permission: a fixed answer or a predicate.
#[derive(Debug, Clone)]
pub enum Permission {
    Allow(bool),
    Predicate(Predicate),
}

impl Permission {
    /// Resolve the permission against a positional argument list.
    pub fn evaluate(&self, supplied: &[&Value]) -> bool {
        match self {
            Self::Allow(allowed) => *allowed,
            Self::Predicate(predicate) => predicate.evaluate(supplied),
        }
    }

    /// Shorthand for a [`Predicate::no_args`] permission.
    pub fn no_args(f: impl Fn() -> bool + Send + Sync + 'static) -> Self {
        Self::Predicate(Predicate::no_args(f))
    }

    /// Shorthand for a [`Predicate::unary`] permission.
    pub fn unary(f: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        Self::Predicate(Predicate::unary(f))
    }

    /// Shorthand for a [`Predicate::binary`] permission.
    pub fn binary(f: impl Fn(&Value, &Value) -> bool + Send + Sync + 'static) -> Self {
        Self::Predicate(Predicate::binary(f))
    }

    /// Shorthand for a [`Predicate::variadic`] permission.
    pub fn variadic(f: impl Fn(&[&Value]) -> bool + Send + Sync + 'static) -> Self {
        Self::Predicate(Predicate::variadic(f))
    }
}

impl From<bool> for Permission {
    fn from(allowed: bool) -> Self {
        Self::Allow(allowed)
    }
}

impl From<Predicate> for Permission {
    fn from(predicate: Predicate) -> Self {
        Self::Predicate(predicate)
    }
}
