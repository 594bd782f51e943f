//! # graphql-authz-core
//!
//! Field-level authorization for schemas built with `graphql-authz-engine`.
//!
//! An application describes its rules once, as a [`Policy`]. For each
//! request an [`Ability`] is built from the policy and the caller's
//! identity and placed in the request [`Context`](graphql_authz_engine::Context).
//! The [`AuthorizationInstrumentation`] wraps every field resolver of the
//! schema so that each field checks the ability before it resolves.
//!
//! Everything not explicitly declared is denied.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use graphql_authz_core::{
//!     Ability, AuthorizationInstrumentation, ContextAbilityExt, Declare, Error, Policy,
//!     PolicyError, Rules,
//! };
//! use graphql_authz_engine::{
//!     Context, FieldDef, OperationType, Schema, Selection, TypeDef, TypeRef,
//! };
//! use serde_json::json;
//!
//! let user = Arc::new(
//!     TypeDef::object("User")
//!         .field(FieldDef::new("name", TypeRef::named("String")))
//!         .field(FieldDef::new("email", TypeRef::named("String"))),
//! );
//! let query = Arc::new(TypeDef::object("Query").field(
//!     FieldDef::new("me", TypeRef::named("User"))
//!         .resolve_with(|_, _, _| Ok(json!({"name": "ada", "email": "ada@example.com"}))),
//! ));
//!
//! struct AppPolicy {
//!     query: Arc<TypeDef>,
//!     user: Arc<TypeDef>,
//! }
//!
//! impl Policy for AppPolicy {
//!     type Identity = str;
//!
//!     fn define_policy(&self, rules: &mut Rules, _who: &str) -> Result<(), PolicyError> {
//!         rules.declare_allowed(&self.query)?;
//!         rules.declare(&self.user, Declare::new().execute(true).except(["email"]))
//!     }
//! }
//!
//! let schema = Schema::builder()
//!     .query(query.clone())
//!     .register(user.clone())
//!     .instrument(AuthorizationInstrumentation::new())
//!     .build()
//!     .unwrap();
//! let policy = AppPolicy { query, user };
//!
//! # tokio_test::block_on(async {
//! let ctx = Context::new().with_ability(Ability::new(&policy, "ada").unwrap());
//! let me = |field: &str| -> Vec<Selection> {
//!     vec![Selection::field("me").select([Selection::field(field)]).into()]
//! };
//! let name = me("name");
//! let data = schema.execute(OperationType::Query, &name, ctx.clone()).await.unwrap();
//! assert_eq!(data, json!({"me": {"name": "ada"}}));
//!
//! let email = me("email");
//! let err: Error = schema.execute(OperationType::Query, &email, ctx).await.unwrap_err().into();
//! assert!(err.is_unauthorized());
//! # });
//! ```

pub mod ability;
pub mod config;
pub mod context;
pub mod error;
pub mod instrumentation;
pub mod permission;

pub use ability::{Ability, Declare, Policy, Rules};
pub use config::AuthorizationConfig;
pub use context::{ContextAbilityExt, RequestAbility, ABILITY_KEY};
pub use error::{Error, PolicyError, Result, Unauthorized};
pub use instrumentation::AuthorizationInstrumentation;
pub use permission::{AccessSpec, All, Permission, PermissionRecord, Predicate};
