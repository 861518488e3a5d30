//! Unit tests for app.rs key handling

use super::*;
use crate::db::Board;
use crate::db::StoreError;
use crate::operations::MockBoardStore;

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn press(state: &mut AppState, code: KeyCode) {
    state.handle_key(key(code));
}

fn type_str(state: &mut AppState, s: &str) {
    for c in s.chars() {
        press(state, KeyCode::Char(c));
    }
}

/// State over a store that starts with `board` and accepts every save
fn state_with(board: Board) -> AppState {
    let mut store = MockBoardStore::new();
    store.expect_load().return_once(move || board);
    store.expect_save().returning(|_| Ok(()));
    AppState::new(BoardManager::load(Box::new(store)), GlobalConfig::default())
}

fn sample_board() -> Board {
    Board::new()
        .add_task(TaskStatus::Todo, "Write spec", "Draft the design doc")
        .add_task(TaskStatus::InProgress, "Build", "")
}

// =============================================================================
// Footer and controls
// =============================================================================

#[test]
fn test_task_controls_per_column() {
    assert_eq!(task_controls(TaskStatus::Todo), "[p] in progress  [d] done  [x] delete");
    assert_eq!(task_controls(TaskStatus::InProgress), "[d] done  [x] delete");
    assert_eq!(task_controls(TaskStatus::Done), "[x] delete");
}

#[test]
fn test_footer_text() {
    let normal = build_footer_text(InputMode::Normal, Some(TaskStatus::Todo), false);
    assert!(normal.contains("[o] new"));
    assert!(normal.contains("[p] in progress"));

    let done = build_footer_text(InputMode::Normal, Some(TaskStatus::Done), false);
    assert!(!done.contains("[p]"));
    assert!(!done.contains("[d]"));
    assert!(done.contains("[x] delete"));

    let confirming = build_footer_text(InputMode::Normal, Some(TaskStatus::Todo), true);
    assert!(confirming.contains("[y] delete"));

    let title = build_footer_text(InputMode::InputTitle, None, false);
    assert!(title.contains("task title"));

    let description = build_footer_text(InputMode::InputDescription, None, false);
    assert!(description.contains("[Alt+Enter] newline"));
}

#[test]
fn test_footer_hides_task_controls_without_selection() {
    let empty = build_footer_text(InputMode::Normal, None, false);

    assert!(empty.contains("[o] new"));
    assert!(!empty.contains("[p]"));
    assert!(!empty.contains("[d]"));
    assert!(!empty.contains("[x]"));
}

// =============================================================================
// New-task modal
// =============================================================================

#[test]
fn test_open_modal_targets_selected_column() {
    let mut state = state_with(Board::new());
    press(&mut state, KeyCode::Char('l'));
    press(&mut state, KeyCode::Char('o'));

    assert_eq!(state.input_mode, InputMode::InputTitle);
    assert_eq!(state.draft.status, TaskStatus::InProgress);
    assert!(state.draft.title.is_empty());
}

#[test]
fn test_modal_saves_task() {
    let mut state = state_with(Board::new());
    press(&mut state, KeyCode::Char('o'));
    type_str(&mut state, "Write spec");
    press(&mut state, KeyCode::Enter);
    assert_eq!(state.input_mode, InputMode::InputDescription);
    type_str(&mut state, "Draft the design doc");
    press(&mut state, KeyCode::Enter);

    assert_eq!(state.input_mode, InputMode::Normal);
    assert_eq!(state.draft, Draft::default());

    let todo = &state.manager.snapshot().todo;
    assert_eq!(todo.len(), 1);
    assert_eq!(todo[0].title, "Write spec");
    assert_eq!(todo[0].description, "Draft the design doc");
    assert_eq!(todo[0].status, TaskStatus::Todo);
}

#[test]
fn test_modal_selects_new_task() {
    let mut state = state_with(sample_board());
    press(&mut state, KeyCode::Char('o'));
    type_str(&mut state, "Second");
    press(&mut state, KeyCode::Enter);
    press(&mut state, KeyCode::Enter);

    assert_eq!(state.view.selected_column, 0);
    assert_eq!(state.view.selected_row, 1);
    let selected = state.view.selected_task(state.manager.snapshot()).unwrap();
    assert_eq!(selected.title, "Second");
}

#[test]
fn test_modal_cancel_discards_draft() {
    let mut store = MockBoardStore::new();
    store.expect_load().returning(Board::default);
    store.expect_save().times(0);
    let mut state = AppState::new(BoardManager::load(Box::new(store)), GlobalConfig::default());

    press(&mut state, KeyCode::Char('o'));
    type_str(&mut state, "Never mind");
    press(&mut state, KeyCode::Esc);

    assert_eq!(state.input_mode, InputMode::Normal);
    assert_eq!(state.draft, Draft::default());
    assert!(state.manager.snapshot().is_empty());
}

#[test]
fn test_modal_accepts_empty_title() {
    let mut state = state_with(Board::new());
    press(&mut state, KeyCode::Char('o'));
    press(&mut state, KeyCode::Enter);
    assert_eq!(state.input_mode, InputMode::InputDescription);

    type_str(&mut state, "details");
    press(&mut state, KeyCode::Enter);

    assert_eq!(state.input_mode, InputMode::Normal);
    let todo = &state.manager.snapshot().todo;
    assert_eq!(todo.len(), 1);
    assert_eq!(todo[0].title, "");
    assert_eq!(todo[0].description, "details");
}

#[test]
fn test_modal_multiline_description() {
    let mut state = state_with(Board::new());
    press(&mut state, KeyCode::Char('o'));
    type_str(&mut state, "Notes");
    press(&mut state, KeyCode::Enter);
    type_str(&mut state, "line one");
    state.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::ALT));
    type_str(&mut state, "line two");
    state.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::SHIFT));
    type_str(&mut state, "three");

    // Still editing until a plain Enter
    assert_eq!(state.input_mode, InputMode::InputDescription);
    press(&mut state, KeyCode::Enter);

    let todo = &state.manager.snapshot().todo;
    assert_eq!(todo[0].description, "line one\nline two\nthree");
}

#[test]
fn test_alt_enter_in_title_moves_on() {
    let mut state = state_with(Board::new());
    press(&mut state, KeyCode::Char('o'));
    type_str(&mut state, "Title");
    state.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::ALT));

    assert_eq!(state.input_mode, InputMode::InputDescription);
    assert_eq!(state.draft.title, "Title");
}

#[test]
fn test_modal_tab_switches_field() {
    let mut state = state_with(Board::new());
    press(&mut state, KeyCode::Char('o'));
    type_str(&mut state, "abc");
    press(&mut state, KeyCode::Tab);
    assert_eq!(state.input_mode, InputMode::InputDescription);
    assert_eq!(state.input_cursor, 0);

    press(&mut state, KeyCode::Tab);
    assert_eq!(state.input_mode, InputMode::InputTitle);
    assert_eq!(state.input_cursor, 3);
}

#[test]
fn test_letters_in_modal_are_text() {
    let mut state = state_with(Board::new());
    press(&mut state, KeyCode::Char('o'));
    type_str(&mut state, "quit");

    assert!(!state.should_quit);
    assert_eq!(state.draft.title, "quit");
}

// =============================================================================
// Advancing tasks
// =============================================================================

#[test]
fn test_advance_todo_to_in_progress() {
    let mut state = state_with(sample_board());
    press(&mut state, KeyCode::Char('p'));

    let board = state.manager.snapshot();
    assert!(board.todo.is_empty());
    assert_eq!(board.in_progress.len(), 2);
    assert_eq!(board.in_progress[1].title, "Write spec");
    assert_eq!(board.in_progress[1].status, TaskStatus::InProgress);
}

#[test]
fn test_advance_todo_to_done() {
    let mut state = state_with(sample_board());
    press(&mut state, KeyCode::Char('d'));

    let board = state.manager.snapshot();
    assert!(board.todo.is_empty());
    assert_eq!(board.done.len(), 1);
    assert_eq!(board.done[0].status, TaskStatus::Done);
}

#[test]
fn test_in_progress_cannot_advance_to_in_progress() {
    let mut store = MockBoardStore::new();
    store.expect_load().returning(sample_board);
    store.expect_save().times(0);
    let mut state = AppState::new(BoardManager::load(Box::new(store)), GlobalConfig::default());

    press(&mut state, KeyCode::Char('l'));
    press(&mut state, KeyCode::Char('p'));

    assert_eq!(state.manager.snapshot().in_progress.len(), 1);
}

#[test]
fn test_done_has_no_advance() {
    let board = Board::new().add_task(TaskStatus::Done, "Finished", "");
    let mut state = state_with(board);
    press(&mut state, KeyCode::Char('l'));
    press(&mut state, KeyCode::Char('l'));
    press(&mut state, KeyCode::Char('d'));

    assert_eq!(state.manager.snapshot().done.len(), 1);
}

#[test]
fn test_advance_on_empty_column_is_noop() {
    let mut state = state_with(Board::new());
    press(&mut state, KeyCode::Char('p'));
    assert!(state.manager.snapshot().is_empty());
}

// =============================================================================
// Deleting tasks
// =============================================================================

#[test]
fn test_delete_asks_for_confirmation() {
    let mut state = state_with(sample_board());
    press(&mut state, KeyCode::Char('x'));

    let popup = state.delete_confirm_popup.as_ref().unwrap();
    assert_eq!(popup.task.title, "Write spec");
    assert_eq!(state.manager.snapshot().todo.len(), 1);

    press(&mut state, KeyCode::Char('y'));
    assert!(state.delete_confirm_popup.is_none());
    assert!(state.manager.snapshot().todo.is_empty());
}

#[test]
fn test_delete_cancelled() {
    let mut state = state_with(sample_board());
    press(&mut state, KeyCode::Char('x'));
    press(&mut state, KeyCode::Char('n'));

    assert!(state.delete_confirm_popup.is_none());
    assert_eq!(state.manager.snapshot().todo.len(), 1);
}

#[test]
fn test_popup_swallows_other_keys() {
    let mut state = state_with(sample_board());
    press(&mut state, KeyCode::Char('x'));
    press(&mut state, KeyCode::Char('q'));

    assert!(!state.should_quit);
    assert!(state.delete_confirm_popup.is_some());
}

#[test]
fn test_delete_without_confirmation() {
    let mut state = state_with(sample_board());
    state.config.confirm_delete = false;
    press(&mut state, KeyCode::Char('x'));

    assert!(state.delete_confirm_popup.is_none());
    assert!(state.manager.snapshot().todo.is_empty());
}

#[test]
fn test_delete_clamps_selection() {
    let board = Board::new()
        .add_task(TaskStatus::Todo, "One", "")
        .add_task(TaskStatus::Todo, "Two", "");
    let mut state = state_with(board);
    state.config.confirm_delete = false;
    press(&mut state, KeyCode::Char('j'));
    press(&mut state, KeyCode::Char('x'));

    assert_eq!(state.view.selected_row, 0);
    assert_eq!(state.manager.snapshot().todo[0].title, "One");
}

// =============================================================================
// Misc
// =============================================================================

#[test]
fn test_quit() {
    let mut state = state_with(Board::new());
    press(&mut state, KeyCode::Char('q'));
    assert!(state.should_quit);
}

#[test]
fn test_ctrl_c_quits_from_modal() {
    let mut state = state_with(Board::new());
    press(&mut state, KeyCode::Char('o'));
    state.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
    assert!(state.should_quit);
}

#[test]
fn test_store_failure_keeps_board() {
    let mut store = MockBoardStore::new();
    store.expect_load().returning(Board::default);
    store
        .expect_save()
        .times(1)
        .returning(|_| Err(StoreError::Sqlite(rusqlite::Error::InvalidQuery)));
    let mut state = AppState::new(BoardManager::load(Box::new(store)), GlobalConfig::default());

    press(&mut state, KeyCode::Char('o'));
    type_str(&mut state, "Offline");
    press(&mut state, KeyCode::Enter);
    press(&mut state, KeyCode::Enter);

    assert_eq!(state.manager.snapshot().todo.len(), 1);
}

#[test]
fn test_undo_on_error_runs_undo_on_failure() {
    let mut undone = false;
    let result: Result<(), &str> = undo_on_error(|| Err("no tty"), || undone = true);

    assert_eq!(result, Err("no tty"));
    assert!(undone);
}

#[test]
fn test_undo_on_error_skips_undo_on_success() {
    let mut undone = false;
    let result: Result<u8, &str> = undo_on_error(|| Ok(7), || undone = true);

    assert_eq!(result, Ok(7));
    assert!(!undone);
}
