//! Todo CRUD dispatcher.
//!
//! A request is first turned into a [`TodoPlan`] by [`plan`], which does
//! all validation and builds the single Data API operation. Nothing is
//! sent until [`execute`] runs the plan, so rejected requests never reach
//! the backend.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value, json};
use tracing::{debug, instrument};
use uuid::Uuid;

use atlas_core::operation::{deleted_count, document, documents, modified_count};
use atlas_core::types::timestamp;
use atlas_core::{DataApi, Namespace, Operation, Todo};

use crate::body::{is_truthy, json_object};
use crate::{Result, ServiceError, ServiceResponse};

/// Default todos database.
pub const DEFAULT_DATABASE: &str = "todos";

/// Default todos collection.
pub const DEFAULT_COLLECTION: &str = "items";

/// Default field name for application-assigned ids.
pub const DEFAULT_ID_FIELD: &str = "todo_id";

/// Fields a client may change with `PUT`.
const UPDATABLE_FIELDS: [&str; 3] = ["title", "description", "completed"];

const NOT_FOUND: &str = "Todo not found";

/// How a todo id from the URL is matched against stored documents.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum IdStrategy {
    /// `{"_id": id}`, the id compared as a plain string.
    #[default]
    Native,
    /// `{"_id": {"$oid": id}}`, for database-generated ObjectIds.
    ObjectId,
    /// A UUID written to the named field at create time and used as the key.
    Field(String),
}

impl IdStrategy {
    /// Field strategy with the default field name.
    pub fn field() -> Self {
        IdStrategy::Field(DEFAULT_ID_FIELD.to_string())
    }

    /// Filter selecting the todo with this id.
    pub fn filter(&self, id: &str) -> Value {
        match self {
            IdStrategy::Native => json!({ "_id": id }),
            IdStrategy::ObjectId => json!({ "_id": { "$oid": id } }),
            IdStrategy::Field(name) => {
                let mut filter = Map::new();
                filter.insert(name.clone(), json!(id));
                Value::Object(filter)
            }
        }
    }

    /// Name of the field written at create time, if any.
    pub fn assigned_field(&self) -> Option<&str> {
        match self {
            IdStrategy::Field(name) => Some(name),
            _ => None,
        }
    }
}

impl FromStr for IdStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "native" => Ok(IdStrategy::Native),
            "object_id" => Ok(IdStrategy::ObjectId),
            "field" => Ok(IdStrategy::field()),
            other => Err(format!(
                "unknown id strategy '{}' (expected native, object_id or field)",
                other
            )),
        }
    }
}

impl fmt::Display for IdStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdStrategy::Native => write!(f, "native"),
            IdStrategy::ObjectId => write!(f, "object_id"),
            IdStrategy::Field(name) => write!(f, "field({})", name),
        }
    }
}

/// Where todos live and how they are addressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoSettings {
    pub namespace: Namespace,
    pub id_strategy: IdStrategy,
}

impl Default for TodoSettings {
    fn default() -> Self {
        Self {
            namespace: Namespace::new(DEFAULT_DATABASE, DEFAULT_COLLECTION)
                .expect("default todos namespace is valid"),
            id_strategy: IdStrategy::default(),
        }
    }
}

/// A validated todo request, ready to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum TodoPlan {
    List(Operation),
    Get(Operation),
    /// Insert, plus the application-assigned id when the strategy has one.
    Create {
        operation: Operation,
        assigned: Option<(String, String)>,
    },
    Update(Operation),
    Delete(Operation),
}

impl TodoPlan {
    /// The operation this plan will issue.
    pub fn operation(&self) -> &Operation {
        match self {
            TodoPlan::List(op)
            | TodoPlan::Get(op)
            | TodoPlan::Update(op)
            | TodoPlan::Delete(op) => op,
            TodoPlan::Create { operation, .. } => operation,
        }
    }
}

fn required_id(id: Option<&str>) -> Result<&str> {
    id.ok_or_else(|| ServiceError::Validation("todo id is required".to_string()))
}

/// Validate a request and build its operation.
///
/// `id` is the `{id}` path segment; an empty segment counts as absent.
pub fn plan(
    settings: &TodoSettings,
    method: &str,
    id: Option<&str>,
    body: Option<&str>,
    now: DateTime<Utc>,
) -> Result<TodoPlan> {
    let id = id.filter(|id| !id.is_empty());
    let target = settings.namespace.clone();

    match method {
        "GET" => Ok(match id {
            Some(id) => TodoPlan::Get(Operation::FindOne {
                target,
                filter: settings.id_strategy.filter(id),
            }),
            None => TodoPlan::List(Operation::Find {
                target,
                filter: json!({}),
            }),
        }),

        "POST" if id.is_some() => Err(ServiceError::MethodNotAllowed),

        "POST" => {
            let body = json_object(body)?;
            let title = match body.get("title") {
                Some(Value::String(title)) if !title.is_empty() => title.clone(),
                _ => return Err(ServiceError::Validation("title is required".to_string())),
            };
            let description = body.get("description").filter(|d| is_truthy(d)).cloned();
            let mut document = Todo::new(title, description, now).into_document();

            let assigned = settings.id_strategy.assigned_field().map(|field| {
                let id = Uuid::new_v4().to_string();
                document.insert(field.to_string(), json!(id));
                (field.to_string(), id)
            });

            Ok(TodoPlan::Create {
                operation: Operation::InsertOne {
                    target,
                    document: Value::Object(document),
                },
                assigned,
            })
        }

        "PUT" => {
            let id = required_id(id)?;
            let body = json_object(body)?;

            let mut fields = Map::new();
            for name in UPDATABLE_FIELDS {
                if let Some(value) = body.get(name) {
                    fields.insert(name.to_string(), value.clone());
                }
            }
            if fields.is_empty() {
                return Err(ServiceError::Validation("No fields to update".to_string()));
            }
            fields.insert("updated_at".into(), json!(timestamp(now)));

            Ok(TodoPlan::Update(Operation::UpdateOne {
                target,
                filter: settings.id_strategy.filter(id),
                update: json!({ "$set": fields }),
            }))
        }

        "DELETE" => {
            let id = required_id(id)?;
            Ok(TodoPlan::Delete(Operation::DeleteOne {
                target,
                filter: settings.id_strategy.filter(id),
            }))
        }

        _ => Err(ServiceError::MethodNotAllowed),
    }
}

/// Run a plan against the Data API and shape the response.
#[instrument(skip_all, fields(op = plan.operation().name()))]
pub async fn execute(plan: TodoPlan, api: &dyn DataApi) -> Result<ServiceResponse> {
    match plan {
        TodoPlan::List(operation) => {
            let result = api.execute(&operation).await?;
            let todos = documents(&result)?;
            debug!(count = todos.len(), "listed todos");
            Ok(ServiceResponse::ok(json!({ "todos": todos })))
        }

        TodoPlan::Get(operation) => {
            let result = api.execute(&operation).await?;
            match document(&result) {
                Some(todo) => Ok(ServiceResponse::ok(todo)),
                None => Err(ServiceError::NotFound(NOT_FOUND.to_string())),
            }
        }

        TodoPlan::Create {
            operation,
            assigned,
        } => {
            let mut result = api.execute(&operation).await?;
            if let (Some((field, id)), Value::Object(map)) = (assigned, &mut result) {
                map.insert(field, json!(id));
            }
            Ok(ServiceResponse::created(result))
        }

        TodoPlan::Update(operation) => {
            let result = api.execute(&operation).await?;
            if modified_count(&result) > 0 {
                Ok(ServiceResponse::ok(result))
            } else {
                Err(ServiceError::NotFound(NOT_FOUND.to_string()))
            }
        }

        TodoPlan::Delete(operation) => {
            let result = api.execute(&operation).await?;
            if deleted_count(&result) > 0 {
                Ok(ServiceResponse::ok(
                    json!({ "message": "Todo deleted successfully" }),
                ))
            } else {
                Err(ServiceError::NotFound(NOT_FOUND.to_string()))
            }
        }
    }
}

/// Plan and execute one todos request.
pub async fn handle(
    settings: &TodoSettings,
    api: &dyn DataApi,
    method: &str,
    id: Option<&str>,
    body: Option<&str>,
) -> Result<ServiceResponse> {
    let plan = plan(settings, method, id, body, Utc::now())?;
    execute(plan, api).await
}
