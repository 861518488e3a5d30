//! Traits at the persistence seam so the board manager can be tested with mocks.

use crate::db::{Board, StoreError};

#[cfg(any(test, feature = "test-mocks"))]
use mockall::automock;

/// Durable home of the board snapshot.
///
/// `load` never fails: absent or unreadable data yields an empty board.
#[cfg_attr(any(test, feature = "test-mocks"), automock)]
pub trait BoardStore {
    /// Read the stored board, or an empty one
    fn load(&self) -> Board;

    /// Replace the stored board with `board`
    fn save(&self, board: &Board) -> Result<(), StoreError>;
}
