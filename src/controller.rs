//! Orchestration between user gestures, the board store and the task API.
//!
//! Drags are applied locally first and persisted afterwards. Create and edit
//! wait for the server before touching the board. Whenever a persisted
//! change fails after the board may already reflect it, the controller
//! reloads every task from the server and rebuilds the board from that.

use crate::api::TaskApi;
use crate::drag::{plan_drag, DragResult};
use crate::error::{BoardError, TransportError};
use crate::form::TaskForm;
use crate::kanban_board::{Action, Board, BoardStore};
use crate::task::{Task, TaskMove, TaskStatus};
use chrono::{DateTime, Local};
use std::collections::VecDeque;
use tracing::{debug, error, info, warn};

pub const LOAD_FAILED_MESSAGE: &str =
    "Failed to load tasks. Please ensure the backend is running and accessible.";
pub const REORDER_FAILED_MESSAGE: &str = "Error saving task order. Reverting changes.";
pub const MOVE_FAILED_MESSAGE: &str = "Error saving moved task. Reverting changes.";
pub const DELETE_FAILED_MESSAGE: &str =
    "Failed to delete task. Please try again. The board will be refreshed.";
pub const RECOVERY_FAILED_MESSAGE: &str =
    "Critical error: Failed to refresh board data. Please reload the board.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Ready,
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    /// Local and server state may disagree until a reload.
    Critical,
}

/// A message the user must see and acknowledge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub severity: Severity,
    pub message: String,
    pub raised_at: DateTime<Local>,
}

/// A drag already shown on the board whose new slot is not yet saved.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingMove {
    pub task_id: String,
    pub movement: TaskMove,
    pub cross_column: bool,
}

pub struct BoardController<A> {
    api: A,
    store: BoardStore,
    load_state: LoadState,
    alerts: VecDeque<Alert>,
}

impl<A: TaskApi> BoardController<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            store: BoardStore::new(),
            load_state: LoadState::Loading,
            alerts: VecDeque::new(),
        }
    }

    pub fn board(&self) -> &Board {
        self.store.state()
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    /// Oldest alert the user has not dismissed yet.
    pub fn current_alert(&self) -> Option<&Alert> {
        self.alerts.front()
    }

    pub fn pending_alerts(&self) -> usize {
        self.alerts.len()
    }

    pub fn dismiss_alert(&mut self) -> Option<Alert> {
        self.alerts.pop_front()
    }

    fn raise(&mut self, severity: Severity, message: impl Into<String>) {
        self.alerts.push_back(Alert {
            severity,
            message: message.into(),
            raised_at: Local::now(),
        });
    }

    /// Fetch every task and rebuild the board. On failure the board shows an
    /// error state until the next successful load.
    pub async fn load(&mut self) -> Result<(), TransportError> {
        self.load_state = LoadState::Loading;
        match self.api.fetch_tasks().await {
            Ok(tasks) => {
                info!(count = tasks.len(), "loaded tasks");
                self.store.dispatch(Action::SetBoardData(tasks));
                self.load_state = LoadState::Ready;
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "failed to load tasks");
                self.load_state = LoadState::Failed(LOAD_FAILED_MESSAGE.to_string());
                Err(e)
            }
        }
    }

    /// Apply a finished drag locally, then persist the moved task's new slot.
    pub async fn on_drag_end(&mut self, drag: DragResult) -> Result<(), BoardError> {
        match self.apply_drag(&drag) {
            Some(pending) => self.persist_drag(pending).await,
            None => Ok(()),
        }
    }

    /// Put the optimistic columns on the board without touching the server.
    ///
    /// The returned move has to be handed to [`Self::persist_drag`]. Callers
    /// that render in between show the new order before the request is sent.
    pub fn apply_drag(&mut self, drag: &DragResult) -> Option<PendingMove> {
        if drag.destination.is_none() {
            debug!(task_id = %drag.task_id, "drag abandoned");
            return None;
        }
        let Some(plan) = plan_drag(&self.board().columns, drag) else {
            warn!(?drag, "drag does not match the board, ignoring");
            return None;
        };

        self.store
            .dispatch(Action::MoveTaskLocally { columns: plan.columns });

        Some(PendingMove {
            task_id: plan.task_id,
            movement: plan.movement,
            cross_column: plan.cross_column,
        })
    }

    /// Send a locally applied move to the server, resynchronizing on failure.
    pub async fn persist_drag(&mut self, pending: PendingMove) -> Result<(), BoardError> {
        let failure_message = if pending.cross_column {
            MOVE_FAILED_MESSAGE
        } else {
            REORDER_FAILED_MESSAGE
        };
        let outcome = self.api.move_task(&pending.task_id, &pending.movement).await;
        let moved = self.settle_or_resync(failure_message, outcome).await?;
        debug!(task_id = %moved.id, status = %moved.status, order = moved.order, "move persisted");
        Ok(())
    }

    /// Validate the form, create the task on the server, then add it to the board.
    pub async fn create_task(
        &mut self,
        form: &TaskForm,
        status: TaskStatus,
    ) -> Result<Task, BoardError> {
        let payload = form.validate()?.into_create(status);
        match self.api.create_task(&payload).await {
            Ok(task) => {
                info!(task_id = %task.id, status = %task.status, "task created");
                self.store.dispatch(Action::AddTask(task.clone()));
                Ok(task)
            }
            Err(e) => {
                error!(error = %e, "failed to create task");
                self.raise(Severity::Warning, format!("Failed to create task: {e}"));
                Err(e.into())
            }
        }
    }

    /// Validate the form, update title and description on the server, then
    /// replace the task on the board.
    pub async fn edit_task(&mut self, task_id: &str, form: &TaskForm) -> Result<Task, BoardError> {
        let payload = form.validate()?.into_update();
        if self.board().find_task(task_id).is_none() {
            return Err(BoardError::TaskNotFound {
                id: task_id.to_string(),
            });
        }
        match self.api.update_task(task_id, &payload).await {
            Ok(task) => {
                info!(task_id = %task.id, "task updated");
                self.store.dispatch(Action::UpdateTask(task.clone()));
                Ok(task)
            }
            Err(e) => {
                error!(error = %e, "failed to update task");
                self.raise(Severity::Warning, format!("Failed to update task: {e}"));
                Err(e.into())
            }
        }
    }

    /// Delete on the server, then drop the task from its column.
    pub async fn delete_task(&mut self, task_id: &str) -> Result<(), BoardError> {
        let status = self
            .board()
            .find_task(task_id)
            .map(|t| t.status.clone())
            .ok_or_else(|| BoardError::TaskNotFound {
                id: task_id.to_string(),
            })?;

        let outcome = self.api.delete_task(task_id).await;
        self.settle_or_resync(DELETE_FAILED_MESSAGE, outcome).await?;
        info!(%task_id, "task deleted");
        self.store.dispatch(Action::DeleteTask {
            task_id: task_id.to_string(),
            status,
        });
        Ok(())
    }

    /// Pass a successful persistence result through. On failure, alert the
    /// user and rebuild the board from the server; if that fetch fails too,
    /// raise a critical alert and give up.
    async fn settle_or_resync<T>(
        &mut self,
        failure_message: &str,
        outcome: Result<T, TransportError>,
    ) -> Result<T, BoardError> {
        let original = match outcome {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };
        error!(error = %original, "persisting change failed, resynchronizing");
        self.raise(Severity::Warning, failure_message);

        match self.api.fetch_tasks().await {
            Ok(tasks) => {
                warn!(count = tasks.len(), "board reset to server state");
                self.store.dispatch(Action::SetBoardData(tasks));
                Err(BoardError::Transport(original))
            }
            Err(recovery) => {
                error!(error = %recovery, "refetch after failed change also failed");
                self.raise(Severity::Critical, RECOVERY_FAILED_MESSAGE);
                Err(BoardError::RecoveryFailed { original, recovery })
            }
        }
    }
}
