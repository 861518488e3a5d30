use crate::db::{Board, StoreError, Task, TaskStatus};
use crate::operations::BoardStore;

/// A change requested against the board
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardCommand {
    Add {
        status: TaskStatus,
        title: String,
        description: String,
    },
    Delete(Task),
    Move { task: Task, to: TaskStatus },
}

impl BoardCommand {
    fn name(&self) -> &'static str {
        match self {
            BoardCommand::Add { .. } => "add",
            BoardCommand::Delete(_) => "delete",
            BoardCommand::Move { .. } => "move",
        }
    }
}

/// Owns the current board snapshot and the store that observes it
pub struct BoardManager {
    snapshot: Board,
    store: Box<dyn BoardStore>,
}

impl BoardManager {
    /// Start from whatever the store holds
    pub fn load(store: Box<dyn BoardStore>) -> Self {
        let snapshot = store.load();
        Self { snapshot, store }
    }

    pub fn snapshot(&self) -> &Board {
        &self.snapshot
    }

    /// Apply a command, replacing the snapshot.
    ///
    /// Returns whether the board changed. A changed board is written to the
    /// store exactly once; an unchanged one is not written at all. If the
    /// write fails the new snapshot is still kept in memory.
    pub fn apply(&mut self, command: BoardCommand) -> Result<bool, StoreError> {
        let name = command.name();
        let next = match &command {
            BoardCommand::Add {
                status,
                title,
                description,
            } => self.snapshot.add_task(*status, title, description),
            BoardCommand::Delete(task) => self.snapshot.delete_task(task),
            BoardCommand::Move { task, to } => self.snapshot.move_task(task, *to),
        };

        if next == self.snapshot {
            tracing::debug!(command = name, "command matched no task");
            return Ok(false);
        }

        self.snapshot = next;
        tracing::info!(
            command = name,
            todo = self.snapshot.todo.len(),
            in_progress = self.snapshot.in_progress.len(),
            done = self.snapshot.done.len(),
            "board updated"
        );
        self.store.save(&self.snapshot)?;
        Ok(true)
    }

    pub fn add_task(&mut self, status: TaskStatus, title: &str, description: &str) -> Result<bool, StoreError> {
        self.apply(BoardCommand::Add {
            status,
            title: title.to_string(),
            description: description.to_string(),
        })
    }

    pub fn delete_task(&mut self, task: &Task) -> Result<bool, StoreError> {
        self.apply(BoardCommand::Delete(task.clone()))
    }

    pub fn move_task(&mut self, task: &Task, to: TaskStatus) -> Result<bool, StoreError> {
        self.apply(BoardCommand::Move {
            task: task.clone(),
            to,
        })
    }
}
