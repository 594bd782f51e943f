//! Per-request abilities built from an application policy.

use std::collections::HashMap;

use graphql_authz_engine::{Arguments, TypeDef, BUILTIN_SCALARS};
use serde_json::Value;

use crate::error::PolicyError;
use crate::permission::{AccessSpec, All, Permission, PermissionRecord};

/// Application authorization policy.
///
/// Implement [`Policy::define_policy`] to declare, for one identity, which
/// types it may execute and which fields it may access. The provided body
/// fails with [`PolicyError::NotImplemented`].
///
/// ```rust
/// use graphql_authz_core::{Ability, Declare, Policy, PolicyError, Rules};
/// use graphql_authz_engine::{Arguments, FieldDef, TypeDef, TypeRef};
///
/// let book = TypeDef::object("Book")
///     .field(FieldDef::new("id", TypeRef::named("ID").non_null()))
///     .field(FieldDef::new("created_at", TypeRef::named("String")));
///
/// struct BookPolicy<'a> {
///     book: &'a TypeDef,
/// }
///
/// impl Policy for BookPolicy<'_> {
///     type Identity = u64;
///
///     fn define_policy(&self, rules: &mut Rules, _user: &u64) -> Result<(), PolicyError> {
///         rules.declare(self.book, Declare::new().execute(true).only(["id"]))
///     }
/// }
///
/// let ability = Ability::new(&BookPolicy { book: &book }, &1).unwrap();
/// let no_args = Arguments::new();
/// assert!(ability.can_execute(&book, &no_args));
/// assert!(ability.can_access(&book, "id", &serde_json::Value::Null, &no_args));
/// assert!(!ability.can_access(&book, "created_at", &serde_json::Value::Null, &no_args));
/// ```
pub trait Policy {
    /// The identity an ability is built for (a user, a token, ...).
    type Identity: ?Sized;

    fn define_policy(
        &self,
        rules: &mut Rules,
        identity: &Self::Identity,
    ) -> Result<(), PolicyError> {
        let _ = (rules, identity);
        Err(PolicyError::NotImplemented)
    }
}

/// Options for [`Rules::declare`].
#[derive(Debug, Clone, Default)]
pub struct Declare {
    execute: Option<Permission>,
    only: Option<AccessSpec>,
    except: Option<Vec<String>>,
}

impl Declare {
    pub fn new() -> Self {
        Self::default()
    }

    /// Execute permission for the type. Unset denies.
    pub fn execute(mut self, value: impl Into<Permission>) -> Self {
        self.execute = Some(value.into());
        self
    }

    /// Allow-list: grant access to exactly these fields.
    pub fn only(mut self, fields: impl Into<AccessSpec>) -> Self {
        self.only = Some(fields.into());
        self
    }

    /// Deny-list: grant access to every field of the type except these.
    pub fn except<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.except = Some(fields.into_iter().map(Into::into).collect());
        self
    }
}

/// Rule set under construction, handed to [`Policy::define_policy`].
#[derive(Debug)]
pub struct Rules {
    records: HashMap<String, PermissionRecord>,
}

impl Rules {
    /// Rules with the built-in scalars executable and field-less.
    fn seeded() -> Self {
        let mut records = HashMap::new();
        for name in BUILTIN_SCALARS {
            let mut record = PermissionRecord::new(&TypeDef::scalar(name));
            record.set_execute(true);
            records.insert(name.to_string(), record);
        }
        Self { records }
    }

    /// Declare the permissions of `ty`. Each type may be declared once.
    pub fn declare(&mut self, ty: &TypeDef, options: Declare) -> Result<(), PolicyError> {
        self.declare_with(ty, options, |_| Ok(()))
    }

    /// Declare the permissions of `ty`, then refine the record in `rules`.
    ///
    /// The closure runs after `execute`, `only` and `except` are applied, so
    /// it can override them or attach predicates.
    ///
    /// ```rust
    /// # use graphql_authz_core::{Declare, Permission, PolicyError, Rules};
    /// # use graphql_authz_engine::TypeDef;
    /// # fn define(rules: &mut Rules, store: &TypeDef, user: i64) -> Result<(), PolicyError> {
    /// rules.declare_with(store, Declare::new(), |record| {
    ///     record.set_execute(Permission::unary(move |args| user > 0 && args["big"] == true));
    ///     record.set_access_with("id", Permission::binary(|obj, args| obj == args))?;
    ///     record.set_access("books")?;
    ///     Ok(())
    /// })
    /// # }
    /// ```
    pub fn declare_with<F>(
        &mut self,
        ty: &TypeDef,
        options: Declare,
        rules: F,
    ) -> Result<(), PolicyError>
    where
        F: FnOnce(&mut PermissionRecord) -> Result<(), PolicyError>,
    {
        let type_name = ty.name();
        if self.records.contains_key(type_name) {
            return Err(PolicyError::DuplicateDeclaration {
                type_name: type_name.to_string(),
            });
        }
        if options.only.is_some() && options.except.is_some() {
            return Err(PolicyError::ConflictingRules {
                type_name: type_name.to_string(),
            });
        }

        let mut record = PermissionRecord::new(ty);
        if let Some(except) = options.except {
            let allowed: Vec<String> = ty
                .own_field_names()
                .into_iter()
                .filter(|field| !except.contains(field))
                .collect();
            record.set_access(allowed)?;
        } else if let Some(only) = options.only {
            record.set_access(only)?;
        }
        if let Some(execute) = options.execute {
            record.set_execute(execute);
        }
        rules(&mut record)?;

        log::trace!(
            "declared permissions for {}: {} accessible field(s)",
            type_name,
            record.accessible_fields().len()
        );
        self.records.insert(type_name.to_string(), record);
        Ok(())
    }

    /// Allow execution of `ty` and access to all of its fields.
    /// Unions get execute only, having no fields.
    pub fn declare_allowed(&mut self, ty: &TypeDef) -> Result<(), PolicyError> {
        let options = if ty.is_union() {
            Declare::new().execute(true)
        } else {
            Declare::new().execute(true).only(All)
        };
        self.declare(ty, options)
    }

    /// Whether `ty` already has a permission record.
    pub fn is_declared(&self, ty: impl AsRef<str>) -> bool {
        self.records.contains_key(ty.as_ref())
    }
}

/// The permissions of one identity, for one request.
///
/// Built once by [`Ability::new`] and read-only afterwards, so it can be
/// shared between concurrently resolving fields. Every question about an
/// undeclared type or field is answered "no".
#[derive(Debug)]
pub struct Ability {
    records: HashMap<String, PermissionRecord>,
}

impl Ability {
    /// Build the ability of `identity` under `policy`.
    pub fn new<P>(policy: &P, identity: &P::Identity) -> Result<Self, PolicyError>
    where
        P: Policy + ?Sized,
    {
        let mut rules = Rules::seeded();
        policy.define_policy(&mut rules, identity)?;
        log::debug!("ability built with {} permission records", rules.records.len());
        Ok(Self {
            records: rules.records,
        })
    }

    /// Whether the identity may request values of type `ty`.
    ///
    /// Predicates receive `[args]`.
    pub fn can_execute(&self, ty: impl AsRef<str>, args: &Arguments) -> bool {
        let Some(permission) = self
            .records
            .get(ty.as_ref())
            .and_then(PermissionRecord::execute_permission)
        else {
            return false;
        };
        let args = Value::Object(args.clone());
        permission.evaluate(&[&args])
    }

    /// Whether the identity may read `field` of `object`, an instance of `ty`.
    ///
    /// Predicates receive `[object, args]`.
    pub fn can_access(
        &self,
        ty: impl AsRef<str>,
        field: &str,
        object: &Value,
        args: &Arguments,
    ) -> bool {
        let Some(permission) = self
            .records
            .get(ty.as_ref())
            .and_then(|record| record.access_permission(field))
        else {
            return false;
        };
        let args = Value::Object(args.clone());
        permission.evaluate(&[object, &args])
    }

    /// The permission record of `ty`, if declared.
    pub fn record(&self, ty: impl AsRef<str>) -> Option<&PermissionRecord> {
        self.records.get(ty.as_ref())
    }

    /// Names of all types with a permission record, built-in scalars included.
    pub fn declared_types(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.records.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
