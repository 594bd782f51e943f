//! Permission records and values.
//!
//! - **[`PermissionRecord`]**: execute and per-field access permissions for one type
//! - **[`Permission`]**: a boolean or a [`Predicate`]
//! - **[`AccessSpec`]**: which fields an access rule targets, with the [`All`] sentinel
//!
//! # Default Behavior
//!
//! Everything is **denied** unless declared: a record starts with no execute
//! permission and an empty access table.
//!
//! # Example
//!
//! ```rust
//! use graphql_authz_core::permission::{All, Permission, PermissionRecord};
//! use graphql_authz_engine::{FieldDef, TypeDef, TypeRef};
//!
//! let book = TypeDef::object("Book")
//!     .field(FieldDef::new("id", TypeRef::named("ID").non_null()))
//!     .field(FieldDef::new("pages", TypeRef::named("Int")));
//!
//! let mut record = PermissionRecord::new(&book);
//! record.set_execute(true);
//! record.set_access(All).unwrap();
//! record
//!     .set_access_with("pages", Permission::unary(|book| book["public"] == true))
//!     .unwrap();
//!
//! assert_eq!(record.accessible_fields(), vec!["id", "pages"]);
//! ```

mod record;
mod value;

pub use record::{AccessSpec, AccessTable, All, PermissionRecord};
pub use value::{Permission, Predicate};
