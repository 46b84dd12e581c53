//! Reordering and moving cards in response to a finished drag gesture.
//!
//! Every mutation renumbers the affected columns to dense 1-based positions,
//! so `order` is always a task's rank within its column.

use crate::kanban_board::Columns;
use crate::task::{Task, TaskMove, TaskStatus};

/// A card slot: column plus index within that column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragPosition {
    pub column: TaskStatus,
    pub index: usize,
}

impl DragPosition {
    pub fn new(column: TaskStatus, index: usize) -> Self {
        Self { column, index }
    }
}

/// Normalized outcome of a drag gesture, independent of how it was performed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragResult {
    pub task_id: String,
    pub source: DragPosition,
    /// `None` when the gesture was abandoned.
    pub destination: Option<DragPosition>,
}

/// Local result of a drop and the single request that persists it.
#[derive(Debug, Clone, PartialEq)]
pub struct DragPlan {
    pub columns: Columns,
    pub task_id: String,
    pub movement: TaskMove,
    pub cross_column: bool,
}

fn renumber(tasks: &mut [Task]) {
    for (index, task) in tasks.iter_mut().enumerate() {
        task.order = index as i64 + 1;
    }
}

/// Move the task at `from` to `to` within one column.
///
/// Returns `None` if `from` is out of range. `to` is clamped to the end.
pub fn reorder(list: &[Task], from: usize, to: usize) -> Option<Vec<Task>> {
    if from >= list.len() {
        return None;
    }
    let mut result = list.to_vec();
    let removed = result.remove(from);
    let to = to.min(result.len());
    result.insert(to, removed);
    renumber(&mut result);
    Some(result)
}

/// Move the task at `from` in `source` to index `to` in `destination`,
/// taking on `destination_status`.
///
/// Returns the new `(source, destination)` lists, or `None` if `from` is out
/// of range. `to` is clamped to the end of the destination.
pub fn move_between(
    source: &[Task],
    destination: &[Task],
    from: usize,
    to: usize,
    destination_status: &TaskStatus,
) -> Option<(Vec<Task>, Vec<Task>)> {
    if from >= source.len() {
        return None;
    }
    let mut source = source.to_vec();
    let mut destination = destination.to_vec();

    let mut moved = source.remove(from);
    moved.status = destination_status.clone();
    let to = to.min(destination.len());
    destination.insert(to, moved);

    renumber(&mut source);
    renumber(&mut destination);
    Some((source, destination))
}

/// Compute the optimistic columns for a finished drag.
///
/// Returns `None` for abandoned gestures, unknown columns, out-of-range
/// source indices, and drags whose task id is not the one at the source slot.
pub fn plan_drag(columns: &Columns, drag: &DragResult) -> Option<DragPlan> {
    let destination = drag.destination.as_ref()?;
    let source_column = columns.get(&drag.source.column)?;
    if source_column.tasks.get(drag.source.index)?.id != drag.task_id {
        return None;
    }
    let mut next = columns.clone();

    if drag.source.column == destination.column {
        let tasks = reorder(&source_column.tasks, drag.source.index, destination.index)?;
        let order = tasks.iter().find(|t| t.id == drag.task_id)?.order;
        next.set_tasks(&destination.column, tasks);
        Some(DragPlan {
            columns: next,
            task_id: drag.task_id.clone(),
            movement: TaskMove {
                status: None,
                order: Some(order),
            },
            cross_column: false,
        })
    } else {
        let destination_column = columns.get(&destination.column)?;
        let (source_tasks, destination_tasks) = move_between(
            &source_column.tasks,
            &destination_column.tasks,
            drag.source.index,
            destination.index,
            &destination.column,
        )?;
        let order = destination_tasks
            .iter()
            .find(|t| t.id == drag.task_id)?
            .order;
        next.set_tasks(&drag.source.column, source_tasks);
        next.set_tasks(&destination.column, destination_tasks);
        Some(DragPlan {
            columns: next,
            task_id: drag.task_id.clone(),
            movement: TaskMove {
                status: Some(destination.column.clone()),
                order: Some(order),
            },
            cross_column: true,
        })
    }
}
