use serde::{Deserialize, Serialize};

/// Task status, which is also the column a task lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "inProgress",
            TaskStatus::Done => "done",
        }
    }

    /// Column header text
    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "TODO",
            TaskStatus::InProgress => "IN PROGRESS",
            TaskStatus::Done => "DONE",
        }
    }

    /// Columns in display order
    pub fn columns() -> &'static [TaskStatus] {
        &[TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Done]
    }

    /// Forward transitions offered from this column.
    /// Moves themselves are unrestricted; this only drives which controls are shown.
    pub fn advance_targets(&self) -> &'static [TaskStatus] {
        match self {
            TaskStatus::Todo => &[TaskStatus::InProgress, TaskStatus::Done],
            TaskStatus::InProgress => &[TaskStatus::Done],
            TaskStatus::Done => &[],
        }
    }
}

fn new_task_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// A task on the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Generated at creation; older stored boards without ids get one on load
    #[serde(default = "new_task_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: TaskStatus,
}

impl Task {
    pub fn new(title: impl Into<String>, description: impl Into<String>, status: TaskStatus) -> Self {
        Self {
            id: new_task_id(),
            title: title.into(),
            description: description.into(),
            status,
        }
    }
}

/// Immutable snapshot of the three columns.
///
/// Mutations never touch `self`; each returns the next snapshot. Tasks are
/// matched by id within the column named by their own `status`, and a
/// reference to a task that is not there leaves the board as it was.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    #[serde(default)]
    pub todo: Vec<Task>,
    #[serde(default, rename = "inProgress")]
    pub in_progress: Vec<Task>,
    #[serde(default)]
    pub done: Vec<Task>,
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tasks in a column, in insertion order
    pub fn tasks(&self, status: TaskStatus) -> &[Task] {
        match status {
            TaskStatus::Todo => &self.todo,
            TaskStatus::InProgress => &self.in_progress,
            TaskStatus::Done => &self.done,
        }
    }

    fn tasks_mut(&mut self, status: TaskStatus) -> &mut Vec<Task> {
        match status {
            TaskStatus::Todo => &mut self.todo,
            TaskStatus::InProgress => &mut self.in_progress,
            TaskStatus::Done => &mut self.done,
        }
    }

    /// Total number of tasks across all columns
    pub fn len(&self) -> usize {
        self.todo.len() + self.in_progress.len() + self.done.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append a new task to the end of `status`
    pub fn add_task(&self, status: TaskStatus, title: &str, description: &str) -> Board {
        let mut next = self.clone();
        next.tasks_mut(status).push(Task::new(title, description, status));
        next
    }

    /// Remove `task` from the column named by its status
    pub fn delete_task(&self, task: &Task) -> Board {
        let mut next = self.clone();
        let column = next.tasks_mut(task.status);
        if let Some(pos) = column.iter().position(|t| t.id == task.id) {
            column.remove(pos);
        }
        next
    }

    /// Take `task` out of its column and append a copy with `status = to` onto `to`
    pub fn move_task(&self, task: &Task, to: TaskStatus) -> Board {
        let mut next = self.clone();
        let column = next.tasks_mut(task.status);
        let Some(pos) = column.iter().position(|t| t.id == task.id) else {
            return next;
        };
        let mut moved = column.remove(pos);
        moved.status = to;
        next.tasks_mut(to).push(moved);
        next
    }

    /// Force every task's status to match the column it is stored under.
    /// Returns how many tasks were repaired.
    pub fn normalize(&mut self) -> usize {
        let mut repaired = 0;
        for status in TaskStatus::columns() {
            for task in self.tasks_mut(*status) {
                if task.status != *status {
                    task.status = *status;
                    repaired += 1;
                }
            }
        }
        repaired
    }
}

/// Input buffer for a task being created in the modal
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
}

impl Draft {
    /// Empty draft targeting `status`
    pub fn new(status: TaskStatus) -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            status,
        }
    }
}
