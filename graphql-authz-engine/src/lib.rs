//! # graphql-authz-engine
//!
//! A small typed query-execution engine: a type graph of scalar, object,
//! interface and union types, per-field async resolvers, a per-request
//! [`Context`], and an executor that walks a pre-built selection tree.
//!
//! It exists to host field-level middleware. Every field passes through the
//! registered [`FieldInstrumentation`] hooks once, when the schema is built:
//!
//! ```rust
//! use std::sync::Arc;
//! use graphql_authz_engine::{
//!     Context, FieldDef, OperationType, Schema, Selection, TypeDef, TypeRef,
//! };
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let query = TypeDef::object("Query").field(
//!     FieldDef::new("greeting", TypeRef::named("String").non_null())
//!         .resolve_with(|_obj, _args, _ctx| Ok(json!("hello"))),
//! );
//! let schema = Schema::builder().query(Arc::new(query)).build().unwrap();
//!
//! let data = schema
//!     .execute(
//!         OperationType::Query,
//!         &[Selection::from(Selection::field("greeting"))],
//!         Context::new(),
//!     )
//!     .await
//!     .unwrap();
//! assert_eq!(data, json!({"greeting": "hello"}));
//! # });
//! ```
//!
//! Query parsing and validation are not part of this crate; callers build
//! [`Selection`] trees directly.

pub mod context;
pub mod error;
pub mod execute;
pub mod resolver;
pub mod schema;

pub use context::Context;
pub use error::{ExecutionError, FieldError, SchemaError};
pub use execute::{FieldSelection, OperationType, Selection};
pub use resolver::{resolver_fn, Arguments, PropertyResolver, Resolve};
pub use schema::{
    ArgumentDef, FieldDef, FieldInstrumentation, Schema, SchemaBuilder, TypeDef, TypeKind,
    TypeRef, BUILTIN_SCALARS, TYPENAME_KEY,
};
