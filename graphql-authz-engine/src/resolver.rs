//! Field resolvers.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::context::Context;
use crate::error::FieldError;

/// Field arguments, keyed by argument name.
pub type Arguments = serde_json::Map<String, Value>;

/// Object-safe resolver for a single field.
///
/// Resolvers receive the parent object, the field's arguments and the
/// request context, and produce the field's raw value. Object-typed
/// results are plain JSON objects whose sub-fields are resolved in turn.
#[async_trait]
pub trait Resolve: Send + Sync {
    async fn resolve(
        &self,
        object: &Value,
        args: &Arguments,
        ctx: &Context,
    ) -> Result<Value, FieldError>;
}

/// Convert a synchronous closure into a shared resolver.
///
/// ```rust
/// use graphql_authz_engine::{resolver_fn, Arguments, Context, Resolve};
/// use serde_json::json;
///
/// # tokio_test::block_on(async {
/// let resolver = resolver_fn(|obj, _args, _ctx| Ok(obj["id"].clone()));
/// let value = resolver
///     .resolve(&json!({"id": 7}), &Arguments::new(), &Context::new())
///     .await
///     .unwrap();
/// assert_eq!(value, json!(7));
/// # });
/// ```
pub fn resolver_fn<F>(f: F) -> Arc<dyn Resolve>
where
    F: Fn(&Value, &Arguments, &Context) -> Result<Value, FieldError> + Send + Sync + 'static,
{
    Arc::new(FnResolver(f))
}

struct FnResolver<F>(F);

#[async_trait]
impl<F> Resolve for FnResolver<F>
where
    F: Fn(&Value, &Arguments, &Context) -> Result<Value, FieldError> + Send + Sync,
{
    async fn resolve(
        &self,
        object: &Value,
        args: &Arguments,
        ctx: &Context,
    ) -> Result<Value, FieldError> {
        (self.0)(object, args, ctx)
    }
}

/// Default resolver: reads the property named after the field from the
/// parent object, yielding `null` when absent.
#[derive(Debug, Clone)]
pub struct PropertyResolver {
    key: String,
}

impl PropertyResolver {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

#[async_trait]
impl Resolve for PropertyResolver {
    async fn resolve(
        &self,
        object: &Value,
        _args: &Arguments,
        _ctx: &Context,
    ) -> Result<Value, FieldError> {
        Ok(object.get(&self.key).cloned().unwrap_or(Value::Null))
    }
}
