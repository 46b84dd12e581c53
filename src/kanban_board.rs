use crate::task::{Task, TaskStatus};
use tracing::{debug, warn};

/// One column of the board: every task sharing a status, ranked by `order`.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub id: TaskStatus,
    pub title: String,
    pub tasks: Vec<Task>,
}

impl Column {
    fn empty(id: TaskStatus) -> Self {
        Self {
            title: id.as_str().to_string(),
            id,
            tasks: Vec::new(),
        }
    }

    fn sort_by_order(&mut self) {
        // Stable, so equal orders keep their arrival sequence.
        self.tasks.sort_by_key(|t| t.order);
    }

    pub fn position_of(&self, task_id: &str) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == task_id)
    }
}

/// The three columns, always in [`TaskStatus::COLUMN_ORDER`].
#[derive(Debug, Clone, PartialEq)]
pub struct Columns([Column; 3]);

impl Default for Columns {
    fn default() -> Self {
        Self(TaskStatus::COLUMN_ORDER.map(Column::empty))
    }
}

impl Columns {
    pub fn get(&self, status: &TaskStatus) -> Option<&Column> {
        status.column_index().map(|i| &self.0[i])
    }

    pub fn get_mut(&mut self, status: &TaskStatus) -> Option<&mut Column> {
        status.column_index().map(move |i| &mut self.0[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Column> {
        self.0.iter()
    }

    /// Replace the task list of one column.
    pub fn set_tasks(&mut self, status: &TaskStatus, tasks: Vec<Task>) {
        if let Some(column) = self.get_mut(status) {
            column.tasks = tasks;
        }
    }

    /// Column currently holding the task with `task_id`.
    pub fn locate(&self, task_id: &str) -> Option<(TaskStatus, usize)> {
        self.0.iter().find_map(|column| {
            column
                .position_of(task_id)
                .map(|index| (column.id.clone(), index))
        })
    }

    pub fn task_count(&self) -> usize {
        self.0.iter().map(|c| c.tasks.len()).sum()
    }
}

/// Client-side projection of the flat task list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Board {
    pub columns: Columns,
}

impl Board {
    pub fn column_order(&self) -> [TaskStatus; 3] {
        TaskStatus::COLUMN_ORDER
    }

    pub fn column(&self, status: &TaskStatus) -> Option<&Column> {
        self.columns.get(status)
    }

    pub fn find_task(&self, task_id: &str) -> Option<&Task> {
        self.columns
            .locate(task_id)
            .and_then(|(status, index)| self.columns.get(&status).map(|c| &c.tasks[index]))
    }
}

/// Every state transition the board accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Rebuild all columns from a freshly fetched task list.
    SetBoardData(Vec<Task>),
    AddTask(Task),
    UpdateTask(Task),
    DeleteTask { task_id: String, status: TaskStatus },
    /// Apply a locally computed drag result ahead of server confirmation.
    MoveTaskLocally { columns: Columns },
}

pub fn reduce(state: Board, action: Action) -> Board {
    match action {
        Action::SetBoardData(tasks) => {
            let mut columns = Columns::default();
            for task in tasks {
                match columns.get_mut(&task.status) {
                    Some(column) => column.tasks.push(task),
                    None => warn!(
                        task_id = %task.id,
                        status = %task.status,
                        "task has an unknown status, not added to the board"
                    ),
                }
            }
            for column in columns.0.iter_mut() {
                column.sort_by_order();
            }
            Board { columns }
        }

        Action::AddTask(task) => {
            let mut state = state;
            match state.columns.get_mut(&task.status) {
                Some(column) => {
                    column.tasks.push(task);
                    column.sort_by_order();
                }
                None => warn!(task_id = %task.id, status = %task.status, "cannot add task with unknown status"),
            }
            state
        }

        Action::UpdateTask(task) => {
            let mut state = state;
            if !task.status.is_recognized() {
                warn!(task_id = %task.id, status = %task.status, "cannot place updated task with unknown status");
                return state;
            }
            // Trust the board over the payload for where the task lives now.
            match state.columns.locate(&task.id) {
                Some((current, index)) if current == task.status => {
                    if let Some(column) = state.columns.get_mut(&current) {
                        column.tasks[index] = task;
                        column.sort_by_order();
                    }
                }
                Some((current, index)) => {
                    debug!(task_id = %task.id, from = %current, to = %task.status, "updated task changed column");
                    if let Some(old) = state.columns.get_mut(&current) {
                        old.tasks.remove(index);
                    }
                    if let Some(new) = state.columns.get_mut(&task.status) {
                        new.tasks.push(task);
                        new.sort_by_order();
                    }
                }
                None => warn!(task_id = %task.id, "updated task is not on the board, ignoring"),
            }
            state
        }

        Action::DeleteTask { task_id, status } => {
            let mut state = state;
            if let Some(column) = state.columns.get_mut(&status) {
                let before = column.tasks.len();
                column.tasks.retain(|t| t.id != task_id);
                if column.tasks.len() == before {
                    warn!(%task_id, %status, "deleted task was not found in its column");
                }
            }
            state
        }

        Action::MoveTaskLocally { columns } => Board { columns },
    }
}

/// Owner of the board state. `dispatch` is the only way to change it.
#[derive(Debug, Default)]
pub struct BoardStore {
    state: Board,
}

impl BoardStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &Board {
        &self.state
    }

    pub fn dispatch(&mut self, action: Action) {
        let state = std::mem::take(&mut self.state);
        self.state = reduce(state, action);
    }
}

#[cfg(test)]
pub(crate) fn task(id: &str, status: TaskStatus, order: i64) -> Task {
    Task {
        id: id.to_string(),
        title: format!("Task {id}"),
        description: None,
        status,
        order,
    }
}
