//! Per-type permission records.

use std::collections::{BTreeMap, HashMap};

use graphql_authz_engine::{TypeDef, TypeKind};

use super::value::Permission;
use crate::error::PolicyError;

/// Sentinel meaning "every field of the type".
///
/// Resolved against the type's field list (including fields inherited from
/// interfaces) at the moment the rule is declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct All;

/// Which fields an access rule applies to.
#[derive(Debug, Clone)]
pub enum AccessSpec {
    All,
    Fields(Vec<String>),
    Field(String),
    /// Explicit per-field permissions, merged into the record.
    Map(BTreeMap<String, Permission>),
}

impl From<All> for AccessSpec {
    fn from(_: All) -> Self {
        AccessSpec::All
    }
}

impl From<&str> for AccessSpec {
    fn from(field: &str) -> Self {
        AccessSpec::Field(field.to_string())
    }
}

impl From<String> for AccessSpec {
    fn from(field: String) -> Self {
        AccessSpec::Field(field)
    }
}

impl From<Vec<String>> for AccessSpec {
    fn from(fields: Vec<String>) -> Self {
        AccessSpec::Fields(fields)
    }
}

impl From<Vec<&str>> for AccessSpec {
    fn from(fields: Vec<&str>) -> Self {
        AccessSpec::Fields(fields.into_iter().map(String::from).collect())
    }
}

impl From<&[&str]> for AccessSpec {
    fn from(fields: &[&str]) -> Self {
        AccessSpec::Fields(fields.iter().map(|f| f.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for AccessSpec {
    fn from(fields: [&str; N]) -> Self {
        AccessSpec::Fields(fields.iter().map(|f| f.to_string()).collect())
    }
}

impl From<BTreeMap<String, Permission>> for AccessSpec {
    fn from(map: BTreeMap<String, Permission>) -> Self {
        AccessSpec::Map(map)
    }
}

impl From<HashMap<String, Permission>> for AccessSpec {
    fn from(map: HashMap<String, Permission>) -> Self {
        AccessSpec::Map(map.into_iter().collect())
    }
}

/// Field access table of a record.
#[derive(Debug, Clone)]
pub enum AccessTable {
    /// Per-field permissions; absent fields deny.
    Fields(BTreeMap<String, Permission>),
    /// Union types have no fields, so there is nothing to grant.
    Unavailable,
}

/// Execute and access permissions declared for one type.
#[derive(Debug, Clone)]
pub struct PermissionRecord {
    type_name: String,
    field_names: Vec<String>,
    execute: Option<Permission>,
    access: AccessTable,
}

impl PermissionRecord {
    /// Create an empty record for `ty`. Nothing is permitted until set.
    pub fn new(ty: &TypeDef) -> Self {
        let access = match ty.kind() {
            TypeKind::Union { .. } => AccessTable::Unavailable,
            TypeKind::Scalar | TypeKind::Object { .. } | TypeKind::Interface { .. } => {
                AccessTable::Fields(BTreeMap::new())
            }
        };
        Self {
            type_name: ty.name().to_string(),
            field_names: ty.field_names(),
            execute: None,
            access,
        }
    }

    /// Overwrite the execute permission.
    pub fn set_execute(&mut self, value: impl Into<Permission>) -> &mut Self {
        self.execute = Some(value.into());
        self
    }

    /// Grant access to the fields named by `spec`.
    pub fn set_access(&mut self, spec: impl Into<AccessSpec>) -> Result<&mut Self, PolicyError> {
        self.set_access_with(spec, true)
    }

    /// Set access for the fields named by `spec` to `value`.
    ///
    /// For [`AccessSpec::Map`] the map's own permissions are merged and
    /// `value` is ignored. Later rules for a field replace earlier ones.
    pub fn set_access_with(
        &mut self,
        spec: impl Into<AccessSpec>,
        value: impl Into<Permission>,
    ) -> Result<&mut Self, PolicyError> {
        let table = match &mut self.access {
            AccessTable::Fields(table) => table,
            AccessTable::Unavailable => {
                return Err(PolicyError::UnionAccess {
                    type_name: self.type_name.clone(),
                })
            }
        };

        let value = value.into();
        match spec.into() {
            AccessSpec::All => {
                for field in &self.field_names {
                    table.insert(field.clone(), value.clone());
                }
            }
            AccessSpec::Fields(fields) => {
                for field in fields {
                    table.insert(field, value.clone());
                }
            }
            AccessSpec::Field(field) => {
                table.insert(field, value);
            }
            AccessSpec::Map(map) => table.extend(map),
        }
        Ok(self)
    }

    /// Name of the type this record governs.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Field names of the type as seen when the record was created.
    pub fn type_field_names(&self) -> &[String] {
        &self.field_names
    }

    /// The execute permission, or `None` if never set.
    pub fn execute_permission(&self) -> Option<&Permission> {
        self.execute.as_ref()
    }

    /// The access permission of `field`, or `None` if undeclared.
    pub fn access_permission(&self, field: &str) -> Option<&Permission> {
        match &self.access {
            AccessTable::Fields(table) => table.get(field),
            AccessTable::Unavailable => None,
        }
    }

    /// The per-field access table. Unions have none.
    pub fn access_table(&self) -> &AccessTable {
        &self.access
    }

    /// Fields with a declared access permission, in name order.
    pub fn accessible_fields(&self) -> Vec<&str> {
        match &self.access {
            AccessTable::Fields(table) => table.keys().map(String::as_str).collect(),
            AccessTable::Unavailable => Vec::new(),
        }
    }
}
