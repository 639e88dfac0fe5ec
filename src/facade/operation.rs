//! Operation identity passed to fault policies and emitted in events.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::EntityKind;

/// The five CRUD-shaped operations every resource exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    GetAll,
    GetById,
    Create,
    Update,
    Delete,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::GetAll,
        Operation::GetById,
        Operation::Create,
        Operation::Update,
        Operation::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::GetAll => "get_all",
            Operation::GetById => "get_by_id",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }

    /// HTTP method a real transport would use.
    pub fn method(&self) -> &'static str {
        match self {
            Operation::GetAll | Operation::GetById => "GET",
            Operation::Create => "POST",
            Operation::Update => "PUT",
            Operation::Delete => "DELETE",
        }
    }
}

/// Everything known about a call before it runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationContext {
    pub entity: EntityKind,
    pub operation: Operation,
    /// Target record id, for operations that address one.
    pub target: Option<u64>,
    pub request_id: Uuid,
}

impl OperationContext {
    pub fn new(entity: EntityKind, operation: Operation, target: Option<u64>) -> Self {
        Self {
            entity,
            operation,
            target,
            request_id: Uuid::new_v4(),
        }
    }

    /// Request path a real transport would hit, e.g. `/users/3`.
    pub fn path(&self) -> String {
        match self.target {
            Some(id) => format!("/{}/{}", self.entity.collection(), id),
            None => format!("/{}", self.entity.collection()),
        }
    }
}
