//! Type graph: named types, wrapped type references, fields, and schema
//! assembly with field instrumentation.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::context::Context;
use crate::error::{FieldError, SchemaError};
use crate::resolver::{resolver_fn, Arguments, PropertyResolver, Resolve};

/// Names of the built-in scalar types every schema carries.
pub const BUILTIN_SCALARS: [&str; 5] = ["String", "Int", "Float", "ID", "Boolean"];

/// Object key read to find the concrete type of a union or interface value.
pub const TYPENAME_KEY: &str = "__typename";

/// A reference to a type as written in a field or argument definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    Named(String),
    List(Box<TypeRef>),
    NonNull(Box<TypeRef>),
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// Wrap this reference in a list.
    pub fn list(self) -> Self {
        Self::List(Box::new(self))
    }

    /// Wrap this reference in a non-null marker.
    pub fn non_null(self) -> Self {
        Self::NonNull(Box::new(self))
    }

    /// The innermost named type, with every list and non-null layer removed.
    pub fn named_type(&self) -> &str {
        match self {
            Self::Named(name) => name,
            Self::List(inner) | Self::NonNull(inner) => inner.named_type(),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => write!(f, "{}", name),
            Self::List(inner) => write!(f, "[{}]", inner),
            Self::NonNull(inner) => write!(f, "{}!", inner),
        }
    }
}

/// A declared field argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentDef {
    pub name: String,
    pub ty: TypeRef,
}

/// A field of an object or interface type.
#[derive(Clone)]
pub struct FieldDef {
    name: String,
    description: Option<String>,
    ty: TypeRef,
    arguments: Vec<ArgumentDef>,
    resolver: Arc<dyn Resolve>,
}

impl FieldDef {
    /// Create a field resolved by reading the property of the same name
    /// from the parent object.
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        let name = name.into();
        Self {
            resolver: Arc::new(PropertyResolver::new(name.clone())),
            name,
            description: None,
            ty,
            arguments: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_argument(mut self, name: impl Into<String>, ty: TypeRef) -> Self {
        self.arguments.push(ArgumentDef {
            name: name.into(),
            ty,
        });
        self
    }

    /// Return an equivalent field that resolves through `resolver`.
    ///
    /// Name, type, arguments and description are kept as they are.
    pub fn with_resolver(mut self, resolver: Arc<dyn Resolve>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Resolve this field with a synchronous closure.
    pub fn resolve_with<F>(self, f: F) -> Self
    where
        F: Fn(&Value, &Arguments, &Context) -> Result<Value, FieldError> + Send + Sync + 'static,
    {
        self.with_resolver(resolver_fn(f))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn ty(&self) -> &TypeRef {
        &self.ty
    }

    pub fn arguments(&self) -> &[ArgumentDef] {
        &self.arguments
    }

    pub fn resolver(&self) -> &Arc<dyn Resolve> {
        &self.resolver
    }
}

impl fmt::Debug for FieldDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDef")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .field("arguments", &self.arguments)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// What kind of node a [`TypeDef`] is.
#[derive(Debug, Clone)]
pub enum TypeKind {
    Scalar,
    Object {
        fields: Vec<FieldDef>,
        interfaces: Vec<Arc<TypeDef>>,
    },
    Interface {
        fields: Vec<FieldDef>,
    },
    /// Unions have no fields of their own; values resolve to one of the
    /// possible object types.
    Union {
        possible_types: Vec<String>,
    },
}

/// A named type in the graph.
///
/// Type names are unique within a schema and serve as the type's identity.
#[derive(Debug, Clone)]
pub struct TypeDef {
    name: String,
    description: Option<String>,
    kind: TypeKind,
}

impl TypeDef {
    pub fn scalar(name: impl Into<String>) -> Self {
        Self::with_kind(name, TypeKind::Scalar)
    }

    pub fn object(name: impl Into<String>) -> Self {
        Self::with_kind(
            name,
            TypeKind::Object {
                fields: Vec::new(),
                interfaces: Vec::new(),
            },
        )
    }

    pub fn interface(name: impl Into<String>) -> Self {
        Self::with_kind(name, TypeKind::Interface { fields: Vec::new() })
    }

    pub fn union<I, S>(name: impl Into<String>, possible_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_kind(
            name,
            TypeKind::Union {
                possible_types: possible_types.into_iter().map(Into::into).collect(),
            },
        )
    }

    fn with_kind(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            description: None,
            kind,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a field. Ignored on scalars and unions, which have no fields.
    pub fn field(mut self, field: FieldDef) -> Self {
        match &mut self.kind {
            TypeKind::Object { fields, .. } | TypeKind::Interface { fields } => fields.push(field),
            TypeKind::Scalar | TypeKind::Union { .. } => {}
        }
        self
    }

    /// Declare that this object type implements `interface`, inheriting
    /// the interface's fields it does not define itself.
    pub fn implements(mut self, interface: Arc<TypeDef>) -> Self {
        if let TypeKind::Object { interfaces, .. } = &mut self.kind {
            interfaces.push(interface);
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    pub fn is_union(&self) -> bool {
        matches!(self.kind, TypeKind::Union { .. })
    }

    /// All fields of the type, own fields first, then inherited interface
    /// fields not shadowed by an own field.
    pub fn fields(&self) -> Vec<&FieldDef> {
        match &self.kind {
            TypeKind::Object { fields, interfaces } => {
                let mut all: Vec<&FieldDef> = fields.iter().collect();
                for interface in interfaces {
                    for inherited in interface.fields() {
                        if !all.iter().any(|f| f.name() == inherited.name()) {
                            all.push(inherited);
                        }
                    }
                }
                all
            }
            TypeKind::Interface { fields } => fields.iter().collect(),
            TypeKind::Scalar | TypeKind::Union { .. } => Vec::new(),
        }
    }

    /// Names of [`Self::fields`].
    pub fn field_names(&self) -> Vec<String> {
        self.fields().iter().map(|f| f.name().to_string()).collect()
    }

    /// Names of the fields declared on this type itself, without those
    /// inherited from interfaces. Empty for scalars and unions.
    pub fn own_field_names(&self) -> Vec<String> {
        match &self.kind {
            TypeKind::Object { fields, .. } | TypeKind::Interface { fields } => {
                fields.iter().map(|f| f.name().to_string()).collect()
            }
            TypeKind::Scalar | TypeKind::Union { .. } => Vec::new(),
        }
    }

    pub fn find_field(&self, name: &str) -> Option<&FieldDef> {
        self.fields().into_iter().find(|f| f.name() == name)
    }

    pub fn interfaces(&self) -> &[Arc<TypeDef>] {
        match &self.kind {
            TypeKind::Object { interfaces, .. } => interfaces,
            _ => &[],
        }
    }

    pub fn implements_interface(&self, name: &str) -> bool {
        self.interfaces().iter().any(|i| i.name() == name)
    }

    pub fn possible_types(&self) -> &[String] {
        match &self.kind {
            TypeKind::Union { possible_types } => possible_types,
            _ => &[],
        }
    }
}

impl AsRef<str> for TypeDef {
    fn as_ref(&self) -> &str {
        &self.name
    }
}

/// Hook applied to every `(parent type, field)` pair when a schema is built.
///
/// Implementations return a replacement field, usually the same field with
/// a wrapped resolver.
pub trait FieldInstrumentation: Send + Sync {
    fn instrument(&self, parent: &TypeDef, field: FieldDef) -> FieldDef;
}

/// An assembled, instrumented schema.
#[derive(Debug, Clone)]
pub struct Schema {
    types: BTreeMap<String, Arc<TypeDef>>,
    query: String,
    mutation: Option<String>,
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    pub fn get_type(&self, name: &str) -> Option<&Arc<TypeDef>> {
        self.types.get(name)
    }

    pub fn types(&self) -> impl Iterator<Item = &Arc<TypeDef>> {
        self.types.values()
    }

    pub fn query_type(&self) -> Option<&Arc<TypeDef>> {
        self.types.get(&self.query)
    }

    pub fn mutation_type(&self) -> Option<&Arc<TypeDef>> {
        self.mutation.as_ref().and_then(|name| self.types.get(name))
    }
}

/// Collects types and instrumentation, then assembles a [`Schema`].
///
/// Building is a pure transformation: the registered type definitions are
/// left untouched and the schema owns instrumented copies.
///
/// A type is identified by its `Arc`. Every object implementing an
/// interface, and every registration of a type, must share the same `Arc`.
/// A second, separately built definition under an existing name is rejected
/// with [`SchemaError::DuplicateType`], even when the two are identical.
#[derive(Default)]
pub struct SchemaBuilder {
    types: Vec<Arc<TypeDef>>,
    query: Option<String>,
    mutation: Option<String>,
    instrumentation: Vec<Box<dyn FieldInstrumentation>>,
}

impl SchemaBuilder {
    /// Register the query root type.
    pub fn query(mut self, ty: Arc<TypeDef>) -> Self {
        self.query = Some(ty.name().to_string());
        self.register(ty)
    }

    /// Register the mutation root type.
    pub fn mutation(mut self, ty: Arc<TypeDef>) -> Self {
        self.mutation = Some(ty.name().to_string());
        self.register(ty)
    }

    /// Register a type reachable from the roots.
    pub fn register(mut self, ty: Arc<TypeDef>) -> Self {
        self.types.push(ty);
        self
    }

    pub fn register_all(mut self, types: impl IntoIterator<Item = Arc<TypeDef>>) -> Self {
        self.types.extend(types);
        self
    }

    /// Add a field instrumentation. Instrumentations run in the order they
    /// were added, each receiving the previous one's output.
    pub fn instrument(mut self, instrumentation: impl FieldInstrumentation + 'static) -> Self {
        self.instrumentation.push(Box::new(instrumentation));
        self
    }

    pub fn build(self) -> Result<Schema, SchemaError> {
        let query = self.query.clone().ok_or(SchemaError::MissingQueryType)?;

        let mut types: BTreeMap<String, Arc<TypeDef>> = BUILTIN_SCALARS
            .iter()
            .map(|name| (name.to_string(), Arc::new(TypeDef::scalar(*name))))
            .collect();

        let mut pending: Vec<Arc<TypeDef>> = self.types.clone();
        while let Some(ty) = pending.pop() {
            pending.extend(ty.interfaces().iter().cloned());
            match types.get(ty.name()) {
                Some(existing) if Arc::ptr_eq(existing, &ty) => {}
                Some(existing) if BUILTIN_SCALARS.contains(&existing.name()) => {
                    if !matches!(ty.kind(), TypeKind::Scalar) {
                        return Err(SchemaError::DuplicateType(ty.name().to_string()));
                    }
                }
                Some(_) => return Err(SchemaError::DuplicateType(ty.name().to_string())),
                None => {
                    types.insert(ty.name().to_string(), ty);
                }
            }
        }

        for root in std::iter::once(&query).chain(self.mutation.as_ref()) {
            match types.get(root).map(|t| t.kind()) {
                Some(TypeKind::Object { .. }) => {}
                _ => return Err(SchemaError::InvalidRoot(root.clone())),
            }
        }

        validate_references(&types)?;

        let types = types
            .into_iter()
            .map(|(name, ty)| {
                let instrumented = self.instrument_type(&ty);
                (name, Arc::new(instrumented))
            })
            .collect();

        Ok(Schema {
            types,
            query,
            mutation: self.mutation,
        })
    }

    /// Produce a copy of `ty` whose fields have passed through every
    /// instrumentation. Inherited interface fields are materialized on the
    /// object so they are instrumented with the object as their parent.
    fn instrument_type(&self, ty: &TypeDef) -> TypeDef {
        let apply = |field: FieldDef| {
            self.instrumentation
                .iter()
                .fold(field, |field, hook| hook.instrument(ty, field))
        };

        let kind = match ty.kind() {
            TypeKind::Object { interfaces, .. } => TypeKind::Object {
                fields: ty.fields().into_iter().cloned().map(apply).collect(),
                interfaces: interfaces.clone(),
            },
            TypeKind::Interface { fields } => TypeKind::Interface {
                fields: fields.iter().cloned().map(apply).collect(),
            },
            other => other.clone(),
        };

        TypeDef {
            name: ty.name.clone(),
            description: ty.description.clone(),
            kind,
        }
    }
}

fn validate_references(types: &BTreeMap<String, Arc<TypeDef>>) -> Result<(), SchemaError> {
    let unknown = |type_name: &str, referenced_by: String| SchemaError::UnknownType {
        type_name: type_name.to_string(),
        referenced_by,
    };

    for ty in types.values() {
        for field in ty.fields() {
            let target = field.ty().named_type();
            if !types.contains_key(target) {
                return Err(unknown(target, format!("{}.{}", ty.name(), field.name())));
            }
            for arg in field.arguments() {
                let target = arg.ty.named_type();
                if !types.contains_key(target) {
                    return Err(unknown(
                        target,
                        format!("{}.{}({})", ty.name(), field.name(), arg.name),
                    ));
                }
            }
        }
        for member in ty.possible_types() {
            if !types.contains_key(member) {
                return Err(unknown(member, ty.name().to_string()));
            }
        }
    }
    Ok(())
}
