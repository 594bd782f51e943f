//! Selection-tree executor.
//!
//! The executor walks a pre-built selection tree against a [`Schema`],
//! calling each field's resolver and completing the result according to
//! the field's declared type. Sibling query fields resolve concurrently;
//! mutation root fields resolve one after another. The first failing field
//! aborts the whole request.

use std::fmt;

use futures::future::{self, BoxFuture};
use serde_json::{Map, Value};

use crate::context::Context;
use crate::error::ExecutionError;
use crate::resolver::Arguments;
use crate::schema::{Schema, TypeDef, TypeKind, TypeRef, TYPENAME_KEY};

/// Root operation being executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationType {
    Query,
    Mutation,
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationType::Query => write!(f, "query"),
            OperationType::Mutation => write!(f, "mutation"),
        }
    }
}

/// A node of a selection set.
#[derive(Debug, Clone)]
pub enum Selection {
    Field(FieldSelection),
    /// `... on TypeName { ... }`
    InlineFragment {
        type_condition: String,
        selections: Vec<Selection>,
    },
}

impl Selection {
    /// Start a field selection.
    ///
    /// ```rust
    /// use graphql_authz_engine::Selection;
    ///
    /// let selection: Selection = Selection::field("session")
    ///     .arg("id", 1)
    ///     .select([Selection::field("id"), Selection::field("field")])
    ///     .into();
    /// ```
    pub fn field(name: impl Into<String>) -> FieldSelection {
        FieldSelection {
            name: name.into(),
            alias: None,
            arguments: Arguments::new(),
            selections: Vec::new(),
        }
    }

    /// An inline fragment applying `selections` when the concrete type
    /// matches `type_condition`.
    pub fn on<I, S>(type_condition: impl Into<String>, selections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Selection>,
    {
        Selection::InlineFragment {
            type_condition: type_condition.into(),
            selections: selections.into_iter().map(Into::into).collect(),
        }
    }
}

/// A selected field with its arguments and sub-selections.
#[derive(Debug, Clone)]
pub struct FieldSelection {
    pub name: String,
    pub alias: Option<String>,
    pub arguments: Arguments,
    pub selections: Vec<Selection>,
}

impl FieldSelection {
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn arg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.arguments.insert(name.into(), value.into());
        self
    }

    pub fn select<I, S>(mut self, selections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Selection>,
    {
        self.selections
            .extend(selections.into_iter().map(Into::into));
        self
    }

    /// Key under which the field's value appears in the response.
    pub fn response_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

impl From<FieldSelection> for Selection {
    fn from(field: FieldSelection) -> Self {
        Selection::Field(field)
    }
}

impl Schema {
    /// Execute `selections` against the root type of `operation`.
    ///
    /// Returns the response data object, or the first error raised by any
    /// field.
    pub async fn execute(
        &self,
        operation: OperationType,
        selections: &[Selection],
        context: Context,
    ) -> Result<Value, ExecutionError> {
        let root = match operation {
            OperationType::Query => self.query_type(),
            OperationType::Mutation => self.mutation_type(),
        }
        .ok_or(ExecutionError::MissingRoot(operation))?;

        let serial = operation == OperationType::Mutation;
        self.resolve_object(root, &Value::Null, selections, &context, String::new(), serial)
            .await
    }

    fn resolve_object<'a>(
        &'a self,
        ty: &'a TypeDef,
        object: &'a Value,
        selections: &'a [Selection],
        ctx: &'a Context,
        path: String,
        serial: bool,
    ) -> BoxFuture<'a, Result<Value, ExecutionError>> {
        Box::pin(async move {
            let fields = self.collect_fields(ty, selections);

            let resolve = |selection: &'a FieldSelection| {
                let path = join_path(&path, selection.response_key());
                async move {
                    let value = self
                        .resolve_field(ty, object, selection, ctx, path)
                        .await?;
                    Ok::<_, ExecutionError>((selection.response_key().to_string(), value))
                }
            };

            let entries = if serial {
                let mut entries = Vec::with_capacity(fields.len());
                for selection in fields {
                    entries.push(resolve(selection).await?);
                }
                entries
            } else {
                future::try_join_all(fields.into_iter().map(resolve)).await?
            };

            Ok(Value::Object(entries.into_iter().collect::<Map<_, _>>()))
        })
    }

    async fn resolve_field(
        &self,
        parent: &TypeDef,
        object: &Value,
        selection: &FieldSelection,
        ctx: &Context,
        path: String,
    ) -> Result<Value, ExecutionError> {
        if selection.name == TYPENAME_KEY {
            return Ok(Value::String(parent.name().to_string()));
        }

        let field = parent
            .find_field(&selection.name)
            .ok_or_else(|| ExecutionError::UnknownField {
                field: selection.name.clone(),
                type_name: parent.name().to_string(),
            })?;

        let raw = field
            .resolver()
            .resolve(object, &selection.arguments, ctx)
            .await
            .map_err(|source| ExecutionError::Field {
                path: path.clone(),
                source,
            })?;

        self.complete_value(field.ty(), raw, &selection.selections, ctx, path)
            .await
    }

    fn complete_value<'a>(
        &'a self,
        ty: &'a TypeRef,
        value: Value,
        selections: &'a [Selection],
        ctx: &'a Context,
        path: String,
    ) -> BoxFuture<'a, Result<Value, ExecutionError>> {
        Box::pin(async move {
            match ty {
                TypeRef::NonNull(inner) => {
                    let completed = self
                        .complete_value(inner, value, selections, ctx, path.clone())
                        .await?;
                    if completed.is_null() {
                        return Err(ExecutionError::NullValue(path));
                    }
                    Ok(completed)
                }
                _ if value.is_null() => Ok(Value::Null),
                TypeRef::List(inner) => {
                    let items = match value {
                        Value::Array(items) => items,
                        _ => return Err(ExecutionError::NotAList(path)),
                    };
                    let completions = items.into_iter().enumerate().map(|(index, item)| {
                        let path = format!("{}[{}]", path, index);
                        self.complete_value(inner, item, selections, ctx, path)
                    });
                    Ok(Value::Array(future::try_join_all(completions).await?))
                }
                TypeRef::Named(name) => {
                    let Some(def) = self.get_type(name) else {
                        return Err(ExecutionError::UnresolvedType {
                            path,
                            type_name: name.clone(),
                        });
                    };
                    match def.kind() {
                        TypeKind::Scalar => Ok(value),
                        TypeKind::Object { .. } => {
                            self.resolve_object(def, &value, selections, ctx, path, false)
                                .await
                        }
                        TypeKind::Interface { .. } | TypeKind::Union { .. } => {
                            let concrete = self.concrete_type(def, &value).ok_or_else(|| {
                                ExecutionError::UnresolvedType {
                                    path: path.clone(),
                                    type_name: name.clone(),
                                }
                            })?;
                            self.resolve_object(concrete, &value, selections, ctx, path, false)
                                .await
                        }
                    }
                }
            }
        })
    }

    /// The object type an abstract value belongs to, read from its
    /// `__typename` property.
    fn concrete_type(&self, abstract_type: &TypeDef, value: &Value) -> Option<&TypeDef> {
        let name = value.get(TYPENAME_KEY)?.as_str()?;
        let concrete = self.get_type(name)?;
        let belongs = match abstract_type.kind() {
            TypeKind::Union { possible_types } => possible_types.iter().any(|t| t == name),
            TypeKind::Interface { .. } => concrete.implements_interface(abstract_type.name()),
            _ => false,
        };
        belongs.then_some(&**concrete)
    }

    /// Flatten inline fragments that apply to `ty` into a field list.
    fn collect_fields<'s>(
        &self,
        ty: &TypeDef,
        selections: &'s [Selection],
    ) -> Vec<&'s FieldSelection> {
        let mut fields = Vec::new();
        for selection in selections {
            match selection {
                Selection::Field(field) => fields.push(field),
                Selection::InlineFragment {
                    type_condition,
                    selections,
                } => {
                    if self.fragment_applies(ty, type_condition) {
                        fields.extend(self.collect_fields(ty, selections));
                    }
                }
            }
        }
        fields
    }

    fn fragment_applies(&self, ty: &TypeDef, type_condition: &str) -> bool {
        if ty.name() == type_condition || ty.implements_interface(type_condition) {
            return true;
        }
        self.get_type(type_condition)
            .map(|condition| condition.possible_types().iter().any(|t| t == ty.name()))
            .unwrap_or(false)
    }
}

fn join_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", parent, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldDef;
    use serde_json::json;
    use std::sync::Arc;

    fn schema() -> Schema {
        let book = TypeDef::object("Book")
            .field(FieldDef::new("id", TypeRef::named("ID").non_null()))
            .field(FieldDef::new("title", TypeRef::named("String")));
        let query = TypeDef::object("Query")
            .field(
                FieldDef::new("book", TypeRef::named("Book"))
                    .with_argument("id", TypeRef::named("ID").non_null())
                    .resolve_with(|_obj, args, _ctx| {
                        Ok(match args.get("id").and_then(Value::as_i64) {
                            Some(1) => json!({"id": 1, "title": "Dune"}),
                            _ => Value::Null,
                        })
                    }),
            )
            .field(
                FieldDef::new("books", TypeRef::named("Book").non_null().list())
                    .resolve_with(|_obj, _args, _ctx| {
                        Ok(json!([{"id": 1, "title": "Dune"}, {"id": 2}]))
                    }),
            )
            .field(
                FieldDef::new("broken", TypeRef::named("Book").non_null())
                    .resolve_with(|_obj, _args, _ctx| Ok(Value::Null)),
            );

        Schema::builder()
            .query(Arc::new(query))
            .register(Arc::new(book))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_execute_nested_selection() {
        let selections: Vec<Selection> = vec![Selection::field("book")
            .arg("id", 1)
            .select([Selection::field("id"), Selection::field("title").alias("name")])
            .into()];
        let data = schema()
            .execute(OperationType::Query, &selections, Context::new())
            .await
            .unwrap();
        assert_eq!(data, json!({"book": {"id": 1, "name": "Dune"}}));
    }

    #[tokio::test]
    async fn test_execute_nullable_miss() {
        let selections: Vec<Selection> = vec![Selection::field("book")
            .arg("id", 9)
            .select([Selection::field("id")])
            .into()];
        let data = schema()
            .execute(OperationType::Query, &selections, Context::new())
            .await
            .unwrap();
        assert_eq!(data, json!({"book": null}));
    }

    #[tokio::test]
    async fn test_execute_list() {
        let selections: Vec<Selection> = vec![Selection::field("books")
            .select([Selection::field("id"), Selection::field("title")])
            .into()];
        let data = schema()
            .execute(OperationType::Query, &selections, Context::new())
            .await
            .unwrap();
        assert_eq!(
            data,
            json!({"books": [{"id": 1, "title": "Dune"}, {"id": 2, "title": null}]})
        );
    }

    #[tokio::test]
    async fn test_execute_non_null_violation() {
        let selections: Vec<Selection> = vec![Selection::field("broken")
            .select([Selection::field("id")])
            .into()];
        let err = schema()
            .execute(OperationType::Query, &selections, Context::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ExecutionError::NullValue(path) if path == "broken"));
    }

    #[tokio::test]
    async fn test_execute_unknown_field() {
        let selections: Vec<Selection> = vec![Selection::field("book")
            .arg("id", 1)
            .select([Selection::field("isbn")])
            .into()];
        let err = schema()
            .execute(OperationType::Query, &selections, Context::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ExecutionError::UnknownField { field, .. } if field == "isbn"));
    }

    #[tokio::test]
    async fn test_execute_missing_mutation_root() {
        let err = schema()
            .execute(OperationType::Mutation, &[], Context::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ExecutionError::MissingRoot(OperationType::Mutation)));
        assert_eq!(err.to_string(), "schema does not define a mutation root type");
    }
}
