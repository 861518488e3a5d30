use crate::db::{Board, Task, TaskStatus};

/// Cursor over the board. The board itself is owned by the manager;
/// every method reads the current snapshot passed in.
#[derive(Debug, Default)]
pub struct BoardView {
    pub selected_column: usize,
    pub selected_row: usize,
}

impl BoardView {
    pub fn new() -> Self {
        Self {
            selected_column: 0,
            selected_row: 0,
        }
    }

    /// Status of the selected column
    pub fn selected_status(&self) -> TaskStatus {
        TaskStatus::columns()
            .get(self.selected_column)
            .copied()
            .unwrap_or_default()
    }

    /// Get the currently selected task
    pub fn selected_task<'a>(&self, board: &'a Board) -> Option<&'a Task> {
        board.tasks(self.selected_status()).get(self.selected_row)
    }

    /// Move selection left
    pub fn move_left(&mut self, board: &Board) {
        if self.selected_column > 0 {
            self.selected_column -= 1;
            self.clamp_row(board);
        }
    }

    /// Move selection right
    pub fn move_right(&mut self, board: &Board) {
        if self.selected_column < TaskStatus::columns().len() - 1 {
            self.selected_column += 1;
            self.clamp_row(board);
        }
    }

    /// Move selection up
    pub fn move_up(&mut self) {
        if self.selected_row > 0 {
            self.selected_row -= 1;
        }
    }

    /// Move selection down
    pub fn move_down(&mut self, board: &Board) {
        let column_count = board.tasks(self.selected_status()).len();
        if self.selected_row < column_count.saturating_sub(1) {
            self.selected_row += 1;
        }
    }

    /// Ensure selected_row is valid for current column
    pub fn clamp_row(&mut self, board: &Board) {
        let column_count = board.tasks(self.selected_status()).len();
        if column_count == 0 {
            self.selected_row = 0;
        } else if self.selected_row >= column_count {
            self.selected_row = column_count - 1;
        }
    }
}
