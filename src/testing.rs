//! In-memory task API used by unit tests.

use crate::api::TaskApi;
use crate::error::TransportError;
use crate::task::{Task, TaskCreate, TaskMove, TaskStatus, TaskUpdate};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Fetch,
    Create,
    Update,
    Move,
    Delete,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Fetch,
    Create(TaskCreate),
    Update { id: String, payload: TaskUpdate },
    Move {
        id: String,
        status: Option<TaskStatus>,
        order: Option<i64>,
    },
    Delete(String),
}

/// Behaves like the task server: assigns ids and orders on create and
/// applies moves verbatim. Any operation can be made to fail.
#[derive(Debug, Default)]
pub struct FakeApi {
    tasks: Mutex<Vec<Task>>,
    failing: Mutex<HashSet<Op>>,
    calls: Mutex<Vec<Call>>,
    next_id: Mutex<u32>,
}

impl FakeApi {
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        Self {
            tasks: Mutex::new(tasks),
            ..Self::default()
        }
    }

    pub fn fail(&self, op: Op) {
        self.failing.lock().unwrap().insert(op);
    }

    pub fn recover(&self, op: Op) {
        self.failing.lock().unwrap().remove(&op);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn server_tasks(&self) -> Vec<Task> {
        self.tasks.lock().unwrap().clone()
    }

    fn record(&self, op: Op, call: Call) -> Result<(), TransportError> {
        self.calls.lock().unwrap().push(call);
        if self.failing.lock().unwrap().contains(&op) {
            return Err(TransportError::Status {
                operation: format!("{op:?}"),
                status: 500,
                body: "{\"detail\":\"boom\"}".to_string(),
            });
        }
        Ok(())
    }

    fn not_found(id: &str) -> TransportError {
        TransportError::Status {
            operation: format!("task {id}"),
            status: 404,
            body: "{\"detail\":\"Task not found\"}".to_string(),
        }
    }
}

#[async_trait]
impl TaskApi for FakeApi {
    async fn fetch_tasks(&self) -> Result<Vec<Task>, TransportError> {
        self.record(Op::Fetch, Call::Fetch)?;
        Ok(self.server_tasks())
    }

    async fn create_task(&self, payload: &TaskCreate) -> Result<Task, TransportError> {
        self.record(Op::Create, Call::Create(payload.clone()))?;
        let mut tasks = self.tasks.lock().unwrap();
        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        let order = tasks
            .iter()
            .filter(|t| t.status == payload.status)
            .map(|t| t.order)
            .max()
            .map_or(1, |max| max + 1);
        let task = Task {
            id: format!("created-{next_id}"),
            title: payload.title.clone(),
            description: payload.description.clone(),
            status: payload.status.clone(),
            order,
        };
        tasks.push(task.clone());
        Ok(task)
    }

    async fn update_task(&self, id: &str, payload: &TaskUpdate) -> Result<Task, TransportError> {
        self.record(
            Op::Update,
            Call::Update {
                id: id.to_string(),
                payload: payload.clone(),
            },
        )?;
        let mut tasks = self.tasks.lock().unwrap();
        let task = tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| Self::not_found(id))?;
        if let Some(title) = &payload.title {
            task.title = title.clone();
        }
        if let Some(description) = &payload.description {
            task.description = description.clone();
        }
        Ok(task.clone())
    }

    async fn move_task(&self, id: &str, payload: &TaskMove) -> Result<Task, TransportError> {
        self.record(
            Op::Move,
            Call::Move {
                id: id.to_string(),
                status: payload.status.clone(),
                order: payload.order,
            },
        )?;
        let mut tasks = self.tasks.lock().unwrap();
        let task = tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| Self::not_found(id))?;
        if let Some(status) = &payload.status {
            task.status = status.clone();
        }
        if let Some(order) = payload.order {
            task.order = order;
        }
        Ok(task.clone())
    }

    async fn delete_task(&self, id: &str) -> Result<(), TransportError> {
        self.record(Op::Delete, Call::Delete(id.to_string()))?;
        let mut tasks = self.tasks.lock().unwrap();
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        if tasks.len() == before {
            return Err(Self::not_found(id));
        }
        Ok(())
    }
}
