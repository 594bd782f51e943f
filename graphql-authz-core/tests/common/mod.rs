//! Common test fixtures shared across test files.
//!
//! Items here may not be used by all test files, hence the module-level allow.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use graphql_authz_core::{
    Ability, AuthorizationInstrumentation, Error, Policy, PolicyError, Rules,
};
use graphql_authz_engine::{
    Arguments, Context, FieldDef, FieldError, OperationType, Schema, Selection, TypeDef, TypeRef,
};
use serde_json::{json, Value};

// ===== Closure Policy =====

/// A policy whose rules come from a closure over an integer user id.
pub struct FnPolicy<F>(pub F);

impl<F> Policy for FnPolicy<F>
where
    F: Fn(&mut Rules, &i64) -> Result<(), PolicyError>,
{
    type Identity = i64;

    fn define_policy(&self, rules: &mut Rules, user: &i64) -> Result<(), PolicyError> {
        (self.0)(rules, user)
    }
}

pub fn ability_for<F>(user: i64, rules: F) -> Result<Ability, PolicyError>
where
    F: Fn(&mut Rules, &i64) -> Result<(), PolicyError>,
{
    Ability::new(&FnPolicy(rules), &user)
}

pub fn args(value: Value) -> Arguments {
    match value {
        Value::Object(map) => map,
        other => panic!("arguments must be an object, got {}", other),
    }
}

// ===== Catalog Types =====

/// Book store types: objects, an interface and a union.
pub struct Catalog {
    pub book: Arc<TypeDef>,
    pub coffee: Arc<TypeDef>,
    pub priceable: Arc<TypeDef>,
    pub store: Arc<TypeDef>,
    pub items: Arc<TypeDef>,
}

impl Catalog {
    pub fn new() -> Self {
        let book = Arc::new(
            TypeDef::object("Book")
                .with_description("A book")
                .field(FieldDef::new("id", TypeRef::named("ID").non_null()))
                .field(FieldDef::new("created_at", TypeRef::named("String").non_null()))
                .field(FieldDef::new("updated_at", TypeRef::named("String").non_null()))
                .field(FieldDef::new("pages", TypeRef::named("Int").non_null())),
        );
        let priceable = Arc::new(
            TypeDef::interface("Priceable")
                .with_description("A priceable item")
                .field(FieldDef::new("price", TypeRef::named("Float").non_null())),
        );
        let coffee = Arc::new(
            TypeDef::object("Coffee")
                .implements(priceable.clone())
                .field(FieldDef::new("id", TypeRef::named("ID").non_null()))
                .field(FieldDef::new("sugar", TypeRef::named("Int").non_null())),
        );
        let store = Arc::new(
            TypeDef::object("Store")
                .with_description("A book store")
                .field(FieldDef::new("id", TypeRef::named("ID").non_null()))
                .field(FieldDef::new("created_at", TypeRef::named("String").non_null()))
                .field(FieldDef::new("updated_at", TypeRef::named("String").non_null()))
                .field(FieldDef::new("books", TypeRef::named("Book").list()))
                .field(FieldDef::new("items", TypeRef::named("Items").list())),
        );
        let items = Arc::new(TypeDef::union("Items", ["Store", "Book"]));

        Self {
            book,
            coffee,
            priceable,
            store,
            items,
        }
    }
}

// ===== Chat Schema =====

fn lookup_id(args: &Arguments) -> Option<i64> {
    let id = args.get("id")?;
    id.as_i64().or_else(|| id.as_str()?.parse().ok())
}

fn session_data(id: i64) -> Value {
    match id {
        1 => json!({"id": 1, "field": "test", "chat_messages": [1]}),
        2 => json!({"id": 2, "field": "data2", "chat_messages": []}),
        _ => Value::Null,
    }
}

fn chat_message_data(id: i64) -> Value {
    match id {
        1 => json!({"id": 1, "session_id": 1, "content": "test content"}),
        _ => Value::Null,
    }
}

/// Sessions with chat messages, plus a `createFile` mutation that counts
/// how many times its resolver actually ran.
pub struct ChatFixture {
    pub query: Arc<TypeDef>,
    pub mutation: Arc<TypeDef>,
    pub session: Arc<TypeDef>,
    pub chat_message: Arc<TypeDef>,
    pub file_create: Arc<TypeDef>,
    pub files_created: Arc<AtomicUsize>,
}

impl ChatFixture {
    pub fn new() -> Self {
        let chat_message = Arc::new(
            TypeDef::object("ChatMessage")
                .with_description("A session chat message")
                .field(FieldDef::new("id", TypeRef::named("ID").non_null()))
                .field(FieldDef::new("session_id", TypeRef::named("ID").non_null()))
                .field(FieldDef::new("content", TypeRef::named("String").non_null())),
        );

        let session = Arc::new(
            TypeDef::object("Session")
                .with_description("A chat session")
                .field(FieldDef::new("id", TypeRef::named("ID").non_null()))
                .field(FieldDef::new("field", TypeRef::named("String").non_null()))
                .field(
                    FieldDef::new("chat_messages", TypeRef::named("ChatMessage").list())
                        .resolve_with(|obj, _args, _ctx| {
                            let ids = obj["chat_messages"].as_array().cloned().unwrap_or_default();
                            Ok(Value::Array(
                                ids.iter()
                                    .filter_map(Value::as_i64)
                                    .map(chat_message_data)
                                    .collect(),
                            ))
                        }),
                ),
        );

        let query = Arc::new(
            TypeDef::object("Query")
                .with_description("The query root of this schema")
                .field(
                    FieldDef::new("session", TypeRef::named("Session"))
                        .with_argument("id", TypeRef::named("ID").non_null())
                        .with_description("Find a session by ID")
                        .resolve_with(|_obj, args, _ctx| {
                            Ok(lookup_id(args).map(session_data).unwrap_or(Value::Null))
                        }),
                )
                .field(
                    FieldDef::new("chat_message", TypeRef::named("ChatMessage"))
                        .with_argument("id", TypeRef::named("ID").non_null())
                        .with_description("Find a chat message by ID")
                        .resolve_with(|_obj, args, _ctx| {
                            Ok(lookup_id(args).map(chat_message_data).unwrap_or(Value::Null))
                        }),
                ),
        );

        let file_create = Arc::new(
            TypeDef::object("FileCreate")
                .with_description("A created file")
                .field(FieldDef::new("id", TypeRef::named("ID").non_null())),
        );

        let files_created = Arc::new(AtomicUsize::new(0));
        let counter = files_created.clone();
        let mutation = Arc::new(
            TypeDef::object("Mutation")
                .with_description("The mutation root of this schema")
                .field(
                    FieldDef::new("createFile", TypeRef::named("FileCreate"))
                        .with_argument("content", TypeRef::named("Int").non_null())
                        .resolve_with(move |_obj, _args, _ctx| {
                            let id = counter.fetch_add(1, Ordering::SeqCst) + 1;
                            Ok(json!({"id": id}))
                        }),
                ),
        );

        Self {
            query,
            mutation,
            session,
            chat_message,
            file_create,
            files_created,
        }
    }

    pub fn schema(&self, instrumentation: AuthorizationInstrumentation) -> Schema {
        Schema::builder()
            .query(self.query.clone())
            .mutation(self.mutation.clone())
            .register_all([
                self.session.clone(),
                self.chat_message.clone(),
                self.file_create.clone(),
            ])
            .instrument(instrumentation)
            .build()
            .expect("chat schema is valid")
    }

    pub fn files_created(&self) -> usize {
        self.files_created.load(Ordering::SeqCst)
    }
}

// ===== Selections =====

pub fn session_query(id: i64, fields: Vec<Selection>) -> Vec<Selection> {
    vec![Selection::field("session").arg("id", id).select(fields).into()]
}

pub fn leaf(names: &[&str]) -> Vec<Selection> {
    names.iter().map(|name| Selection::field(*name).into()).collect()
}

pub fn create_file(content: i64) -> Vec<Selection> {
    vec![Selection::field("createFile")
        .arg("content", content)
        .select([Selection::field("id")])
        .into()]
}

/// Run an operation and flatten failures into the crate error type.
pub async fn run(
    schema: &Schema,
    operation: OperationType,
    selections: &[Selection],
    ctx: Context,
) -> Result<Value, Error> {
    schema
        .execute(operation, selections, ctx)
        .await
        .map_err(Error::from)
}

/// Fails the field with a plain resolver error.
pub fn failing_field(name: &str) -> FieldDef {
    FieldDef::new(name, TypeRef::named("String"))
        .resolve_with(|_, _, _| Err(FieldError::resolver("backend unavailable")))
}
