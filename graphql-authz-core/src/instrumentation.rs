//! Resolver interceptor enforcing the request ability on every field.

use std::sync::Arc;

use async_trait::async_trait;
use graphql_authz_engine::{
    Arguments, Context, FieldDef, FieldError, FieldInstrumentation, Resolve, TypeDef,
};
use serde_json::Value;

use crate::config::AuthorizationConfig;
use crate::context::{ContextAbilityExt, RequestAbility};
use crate::error::Unauthorized;

/// Field instrumentation that wraps each resolver in an authorization check.
///
/// Before the original resolver runs, the wrapped resolver asks the
/// request's ability two questions, in order:
///
/// 1. May the identity execute the field's result type (lists and non-null
///    wrappers removed), given the field arguments?
/// 2. May it access this field on the parent type, given the parent object
///    and the arguments?
///
/// A "no" fails the field with [`Unauthorized`] and the original resolver
/// never runs. A context marked with root access skips both checks.
///
/// ```rust
/// use std::sync::Arc;
/// use graphql_authz_core::AuthorizationInstrumentation;
/// use graphql_authz_engine::{FieldDef, Schema, TypeDef, TypeRef};
///
/// let query = TypeDef::object("Query").field(FieldDef::new("name", TypeRef::named("String")));
/// let schema = Schema::builder()
///     .query(Arc::new(query))
///     .instrument(AuthorizationInstrumentation::new())
///     .build()
///     .unwrap();
/// assert!(schema.query_type().is_some());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthorizationInstrumentation {
    always_allow_execute: bool,
}

impl AuthorizationInstrumentation {
    /// Instrumentation that runs both checks on every field.
    pub fn new() -> Self {
        Self::default()
    }

    /// Instrumentation configured from an [`AuthorizationConfig`].
    pub fn from_config(config: &AuthorizationConfig) -> Self {
        Self {
            always_allow_execute: config.always_allow_execute,
        }
    }

    /// Skip the execute check. The access check still runs.
    pub fn with_always_allow_execute(mut self, enabled: bool) -> Self {
        self.always_allow_execute = enabled;
        self
    }

    pub fn always_allow_execute(&self) -> bool {
        self.always_allow_execute
    }
}

impl FieldInstrumentation for AuthorizationInstrumentation {
    fn instrument(&self, parent: &TypeDef, field: FieldDef) -> FieldDef {
        let resolver = AuthorizedResolver {
            parent_type: parent.name().to_string(),
            field_name: field.name().to_string(),
            result_type: field.ty().named_type().to_string(),
            always_allow_execute: self.always_allow_execute,
            inner: field.resolver().clone(),
        };
        field.with_resolver(Arc::new(resolver))
    }
}

struct AuthorizedResolver {
    parent_type: String,
    field_name: String,
    result_type: String,
    always_allow_execute: bool,
    inner: Arc<dyn Resolve>,
}

impl AuthorizedResolver {
    fn authorize(
        &self,
        object: &Value,
        args: &Arguments,
        ctx: &Context,
    ) -> Result<(), Unauthorized> {
        let ability = match ctx.request_ability() {
            Some(RequestAbility::Root) => {
                log::trace!(
                    "root access: skipping checks for {}.{}",
                    self.parent_type,
                    self.field_name
                );
                return Ok(());
            }
            Some(RequestAbility::Scoped(ability)) => ability,
            None => {
                log::warn!(
                    "no ability in context while resolving {}.{}",
                    self.parent_type,
                    self.field_name
                );
                return Err(Unauthorized::MissingAbility);
            }
        };

        if !self.always_allow_execute && !ability.can_execute(&self.result_type, args) {
            log::debug!(
                "denied execute of {} via {}.{}",
                self.result_type,
                self.parent_type,
                self.field_name
            );
            return Err(Unauthorized::Execute {
                type_name: self.result_type.clone(),
            });
        }

        if !ability.can_access(&self.parent_type, &self.field_name, object, args) {
            log::debug!("denied access to {}.{}", self.parent_type, self.field_name);
            return Err(Unauthorized::Access {
                field: self.field_name.clone(),
                parent_type: self.parent_type.clone(),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl Resolve for AuthorizedResolver {
    async fn resolve(
        &self,
        object: &Value,
        args: &Arguments,
        ctx: &Context,
    ) -> Result<Value, FieldError> {
        self.authorize(object, args, ctx)?;
        self.inner.resolve(object, args, ctx).await
    }
}
