//! Terminal kanban board over a remote task API.
//!
//! The board keeps tasks in three fixed columns. Drag results are applied
//! locally before the server confirms them, and a failed write is reconciled
//! by reloading every task from the server.

pub mod api;
pub mod config;
pub mod controller;
pub mod drag;
pub mod error;
pub mod form;
pub mod kanban_board;
pub mod logging;
pub mod task;
pub mod ui;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{ApiClient, TaskApi};
pub use controller::{Alert, BoardController, LoadState, PendingMove, Severity};
pub use drag::{DragPosition, DragResult};
pub use error::{BoardError, TransportError, ValidationErrors};
pub use form::TaskForm;
pub use kanban_board::{Action, Board, BoardStore, Column};
pub use task::{Task, TaskStatus};
