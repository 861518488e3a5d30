use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{prelude::*, widgets::*};
use std::io::{self, Stdout};
use std::path::Path;

use crate::config::{GlobalConfig, ThemeConfig};
use crate::db::{Database, Draft, Task, TaskStatus};
use crate::manager::{BoardCommand, BoardManager};

use super::board::BoardView;
use super::input::{self, EditOutcome, InputMode};

/// Helper to convert hex color string to ratatui Color
fn hex_to_color(hex: &str) -> Color {
    ThemeConfig::parse_hex(hex)
        .map(|(r, g, b)| Color::Rgb(r, g, b))
        .unwrap_or(Color::White)
}

/// Key that advances a task into `to`
fn advance_key(to: TaskStatus) -> Option<char> {
    match to {
        TaskStatus::Todo => None,
        TaskStatus::InProgress => Some('p'),
        TaskStatus::Done => Some('d'),
    }
}

/// Control hints shown on every card in a column
fn task_controls(status: TaskStatus) -> String {
    let mut parts: Vec<String> = status
        .advance_targets()
        .iter()
        .filter_map(|to| advance_key(*to).map(|k| format!("[{}] {}", k, to.label().to_lowercase())))
        .collect();
    parts.push("[x] delete".to_string());
    parts.join("  ")
}

/// Build footer help text based on current UI state.
/// `selected` is the status of the task under the cursor, if any.
fn build_footer_text(input_mode: InputMode, selected: Option<TaskStatus>, confirming_delete: bool) -> String {
    if confirming_delete {
        return " [y] delete  [n] keep ".to_string();
    }
    match input_mode {
        InputMode::Normal => match selected {
            Some(status) => format!(
                " [o] new  {}  [h/l] column  [j/k] task  [q] quit ",
                task_controls(status)
            ),
            None => " [o] new  [h/l] column  [j/k] task  [q] quit ".to_string(),
        },
        InputMode::InputTitle => " Enter task title... [Tab] description [Enter] next [Esc] cancel ".to_string(),
        InputMode::InputDescription => {
            " Enter description... [Alt+Enter] newline [Tab] title [Enter] save [Esc] cancel ".to_string()
        }
    }
}

type Terminal = ratatui::Terminal<CrosstermBackend<Stdout>>;

/// Height of a task card: borders, title, two description lines, controls
const CARD_HEIGHT: u16 = 6;

/// Application state (separate from terminal for borrow checker)
struct AppState {
    should_quit: bool,
    manager: BoardManager,
    view: BoardView,
    input_mode: InputMode,
    // New-task modal
    draft: Draft,
    input_cursor: usize, // Cursor position (in chars) within the active draft field
    // Confirmation popup for deleting a task
    delete_confirm_popup: Option<DeleteConfirmPopup>,
    config: GlobalConfig,
}

/// State for delete confirmation popup
#[derive(Debug, Clone)]
struct DeleteConfirmPopup {
    task: Task,
}

pub struct App {
    terminal: Terminal,
    state: AppState,
}

impl App {
    /// Open the store and take over the terminal
    pub fn new(config: GlobalConfig, store_override: Option<&Path>) -> Result<Self> {
        let store_path = config.storage_path(store_override)?;
        let db = Database::open_or_reset(&store_path, config.storage_key.clone())
            .with_context(|| format!("Failed to open board store at {:?}", store_path))?;
        tracing::info!(path = %store_path.display(), key = %db.key(), "using board store");

        let manager = BoardManager::load(Box::new(db));
        let state = AppState::new(manager, config);

        enable_raw_mode()?;
        let terminal = undo_on_error(enter_alternate_screen, restore_terminal)
            .context("Failed to set up terminal")?;

        Ok(Self { terminal, state })
    }

    pub async fn run(&mut self) -> Result<()> {
        while !self.state.should_quit {
            self.draw()?;

            if event::poll(std::time::Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.state.handle_key(key);
                    }
                }
            }
        }

        tracing::info!("quitting");
        Ok(())
    }

    fn draw(&mut self) -> Result<()> {
        let state = &self.state;
        self.terminal.draw(|frame| {
            let area = frame.area();
            Self::draw_board(state, frame, area);
        })?;

        Ok(())
    }

    fn draw_board(state: &AppState, frame: &mut Frame, area: Rect) {
        let board = state.manager.snapshot();
        let theme = &state.config.theme;

        // Main layout: header, board, footer
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Board
                Constraint::Length(3), // Footer
            ])
            .split(area);

        let header = Paragraph::new(format!(" To-Do List ({} tasks) ", board.len()))
            .style(Style::default().fg(hex_to_color(&theme.color_text)).bold())
            .alignment(ratatui::layout::Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(header, chunks[0]);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
            ])
            .split(chunks[1]);

        for (i, status) in TaskStatus::columns().iter().enumerate() {
            let tasks = board.tasks(*status);
            let is_selected_column = state.view.selected_column == i;
            let column_color = hex_to_color(theme.column_color(*status));

            let border_type = if is_selected_column {
                BorderType::Thick
            } else {
                BorderType::Plain
            };

            let column_block = Block::default()
                .title(Line::from(format!(" {} ", status.label())).centered())
                .title_style(Style::default().fg(column_color).bold())
                .title_bottom(Line::from(format!(" Tasks: {} ", tasks.len())).centered())
                .borders(Borders::ALL)
                .border_type(border_type)
                .border_style(Style::default().fg(column_color));
            let inner_area = column_block.inner(columns[i]);
            frame.render_widget(column_block, columns[i]);

            let max_visible_cards = (inner_area.height / CARD_HEIGHT).max(1) as usize;

            // Calculate scroll offset to keep selected task visible
            let scroll_offset = if is_selected_column && state.view.selected_row >= max_visible_cards {
                state.view.selected_row - max_visible_cards + 1
            } else {
                0
            };

            for (j, task) in tasks.iter().skip(scroll_offset).take(max_visible_cards).enumerate() {
                let actual_index = scroll_offset + j;
                let is_selected = is_selected_column && state.view.selected_row == actual_index;

                let card_area = Rect {
                    x: inner_area.x,
                    y: inner_area.y + (j as u16 * CARD_HEIGHT),
                    width: inner_area.width,
                    height: CARD_HEIGHT.min(inner_area.height.saturating_sub(j as u16 * CARD_HEIGHT)),
                };

                if card_area.height < 3 {
                    break;
                }

                Self::draw_task_card(frame, task, card_area, is_selected, theme);
            }
        }

        let footer_text = build_footer_text(
            state.input_mode,
            state.view.selected_task(board).map(|t| t.status),
            state.delete_confirm_popup.is_some(),
        );
        let footer = Paragraph::new(footer_text)
            .style(Style::default().fg(hex_to_color(&theme.color_dimmed)))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(footer, chunks[2]);

        if state.input_mode != InputMode::Normal {
            Self::draw_task_modal(state, frame, area);
        }

        if let Some(ref popup) = state.delete_confirm_popup {
            let popup_area = centered_rect(50, 25, area);
            frame.render_widget(Clear, popup_area);

            let block = Block::default()
                .title(" Delete Task ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(hex_to_color(&theme.color_todo)));
            let inner = block.inner(popup_area);
            frame.render_widget(block, popup_area);

            let text = format!("Delete \"{}\"?\n\n[y] Delete    [n] Keep", popup.task.title);
            let content = Paragraph::new(text)
                .style(Style::default().fg(hex_to_color(&theme.color_text)))
                .alignment(ratatui::layout::Alignment::Center)
                .wrap(Wrap { trim: false });
            frame.render_widget(content, inner);
        }
    }

    fn draw_task_card(frame: &mut Frame, task: &Task, area: Rect, is_selected: bool, theme: &ThemeConfig) {
        let border_style = if is_selected {
            Style::default().fg(hex_to_color(&theme.color_selected))
        } else {
            Style::default().fg(hex_to_color(&theme.color_normal))
        };

        let title_style = if is_selected {
            Style::default().fg(hex_to_color(&theme.color_selected)).bold()
        } else {
            Style::default().fg(hex_to_color(&theme.color_text)).bold()
        };

        // Truncate title to fit (char-safe for UTF-8)
        let max_title_len = area.width.saturating_sub(4) as usize;
        let title: String = if task.title.chars().count() > max_title_len {
            let truncated: String = task.title.chars().take(max_title_len.saturating_sub(3)).collect();
            format!("{}...", truncated)
        } else {
            task.title.clone()
        };

        let border_type = if is_selected {
            BorderType::Thick
        } else {
            BorderType::Plain
        };

        let card_block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .border_type(border_type);
        let inner = card_block.inner(area);
        frame.render_widget(card_block, area);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Title
                Constraint::Min(0),    // Description
                Constraint::Length(1), // Controls
            ])
            .split(inner);

        frame.render_widget(Paragraph::new(title).style(title_style), rows[0]);

        let preview_text = if task.description.is_empty() {
            "No description"
        } else {
            task.description.as_str()
        };
        let max_chars = (rows[1].width as usize) * (rows[1].height as usize);
        let truncated: String = if preview_text.chars().count() > max_chars {
            format!("{}...", preview_text.chars().take(max_chars.saturating_sub(3)).collect::<String>())
        } else {
            preview_text.to_string()
        };
        let preview = Paragraph::new(truncated)
            .style(Style::default().fg(hex_to_color(&theme.color_description)).italic())
            .wrap(Wrap { trim: true });
        frame.render_widget(preview, rows[1]);

        let controls = Paragraph::new(task_controls(task.status))
            .style(Style::default().fg(hex_to_color(&theme.color_dimmed)));
        frame.render_widget(controls, rows[2]);
    }

    fn draw_task_modal(state: &AppState, frame: &mut Frame, area: Rect) {
        let theme = &state.config.theme;
        let popup_area = centered_rect(60, 50, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(format!(" New Task · {} ", state.draft.status.label()))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(hex_to_color(&theme.color_popup_border)));
        let inner = block.inner(popup_area);
        frame.render_widget(block, popup_area);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Title field
                Constraint::Min(3),    // Description field
                Constraint::Length(1), // Hint
            ])
            .split(inner);

        let fields = [
            (InputMode::InputTitle, " Title ", &state.draft.title),
            (InputMode::InputDescription, " Description ", &state.draft.description),
        ];
        for (row, (mode, label, value)) in rows.iter().zip(fields) {
            let active = state.input_mode == mode;
            let text = if active {
                let (before, after) = input::split_at_cursor(value, state.input_cursor);
                format!("{}█{}", before, after)
            } else {
                value.to_string()
            };
            let border_color = if active {
                hex_to_color(&theme.color_selected)
            } else {
                hex_to_color(&theme.color_normal)
            };
            let field = Paragraph::new(text)
                .style(Style::default().fg(hex_to_color(&theme.color_text)))
                .wrap(Wrap { trim: false })
                .block(
                    Block::default()
                        .title(label)
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(border_color)),
                );
            frame.render_widget(field, *row);
        }

        let hint = Paragraph::new("[Enter] save  [Alt+Enter] newline  [Esc] cancel")
            .style(Style::default().fg(hex_to_color(&theme.color_dimmed)))
            .alignment(ratatui::layout::Alignment::Center);
        frame.render_widget(hint, rows[2]);
    }
}

impl AppState {
    fn new(manager: BoardManager, config: GlobalConfig) -> Self {
        Self {
            should_quit: false,
            manager,
            view: BoardView::new(),
            input_mode: InputMode::Normal,
            draft: Draft::default(),
            input_cursor: 0,
            delete_confirm_popup: None,
            config,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        // Handle Delete confirmation popup if open
        if self.delete_confirm_popup.is_some() {
            return self.handle_delete_confirm_key(key);
        }

        match self.input_mode {
            InputMode::Normal => self.handle_normal_key(key.code),
            InputMode::InputTitle | InputMode::InputDescription => self.handle_modal_key(key),
        }
    }

    fn handle_delete_confirm_key(&mut self, key: KeyEvent) {
        if let Some(popup) = self.delete_confirm_popup.clone() {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => {
                    // Confirmed - delete the task
                    self.delete_confirm_popup = None;
                    self.perform_delete_task(&popup.task);
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    // Cancelled
                    self.delete_confirm_popup = None;
                }
                _ => {}
            }
        }
    }

    fn handle_normal_key(&mut self, key: KeyCode) {
        let board = self.manager.snapshot();
        match key {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('h') | KeyCode::Left => self.view.move_left(board),
            KeyCode::Char('l') | KeyCode::Right => self.view.move_right(board),
            KeyCode::Char('j') | KeyCode::Down => self.view.move_down(board),
            KeyCode::Char('k') | KeyCode::Up => self.view.move_up(),
            KeyCode::Char('o') | KeyCode::Char('n') => self.open_task_modal(),
            KeyCode::Char('p') => self.advance_selected_task(TaskStatus::InProgress),
            KeyCode::Char('d') => self.advance_selected_task(TaskStatus::Done),
            KeyCode::Char('x') => self.delete_selected_task(),
            _ => {}
        }
    }

    fn handle_modal_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.close_task_modal(),
            KeyCode::Tab | KeyCode::BackTab => {
                let next = match self.input_mode {
                    InputMode::InputTitle => InputMode::InputDescription,
                    _ => InputMode::InputTitle,
                };
                self.focus_field(next);
            }
            KeyCode::Enter
                if self.input_mode == InputMode::InputDescription
                    && key.modifiers.intersects(KeyModifiers::ALT | KeyModifiers::SHIFT) =>
            {
                // Newline in the description
                input::insert_char(&mut self.draft.description, &mut self.input_cursor, '\n');
            }
            KeyCode::Enter => match self.input_mode {
                InputMode::InputTitle => self.focus_field(InputMode::InputDescription),
                _ => self.save_task(),
            },
            _ => {
                let field = match self.input_mode {
                    InputMode::InputTitle => &mut self.draft.title,
                    _ => &mut self.draft.description,
                };
                if input::edit_text(field, &mut self.input_cursor, key) == EditOutcome::Ignored {
                    tracing::trace!(?key, "ignored key in task modal");
                }
            }
        }
    }

    fn focus_field(&mut self, mode: InputMode) {
        self.input_mode = mode;
        self.input_cursor = match mode {
            InputMode::InputTitle => self.draft.title.chars().count(),
            _ => self.draft.description.chars().count(),
        };
    }

    /// Open the modal with a fresh draft targeting the selected column
    fn open_task_modal(&mut self) {
        self.draft = Draft::new(self.view.selected_status());
        self.focus_field(InputMode::InputTitle);
    }

    /// Discard the draft
    fn close_task_modal(&mut self) {
        self.draft = Draft::default();
        self.input_cursor = 0;
        self.input_mode = InputMode::Normal;
    }

    fn save_task(&mut self) {
        let draft = std::mem::take(&mut self.draft);
        self.close_task_modal();

        let status = draft.status;
        let changed = self.dispatch(BoardCommand::Add {
            status,
            title: draft.title,
            description: draft.description,
        });

        if changed {
            // Select the new task, which sits at the end of its column
            if let Some(column) = TaskStatus::columns().iter().position(|s| *s == status) {
                self.view.selected_column = column;
                self.view.selected_row = self.manager.snapshot().tasks(status).len().saturating_sub(1);
            }
        }
    }

    fn advance_selected_task(&mut self, to: TaskStatus) {
        let Some(task) = self.view.selected_task(self.manager.snapshot()).cloned() else {
            return;
        };
        if !task.status.advance_targets().contains(&to) {
            tracing::debug!(from = task.status.as_str(), to = to.as_str(), "transition not offered");
            return;
        }
        self.dispatch(BoardCommand::Move { task, to });
    }

    fn delete_selected_task(&mut self) {
        if let Some(task) = self.view.selected_task(self.manager.snapshot()).cloned() {
            if self.config.confirm_delete {
                // Show confirmation popup
                self.delete_confirm_popup = Some(DeleteConfirmPopup { task });
            } else {
                self.perform_delete_task(&task);
            }
        }
    }

    fn perform_delete_task(&mut self, task: &Task) {
        self.dispatch(BoardCommand::Delete(task.clone()));
        self.delete_confirm_popup = None;
    }

    /// Send a command to the manager and keep the cursor on a real task.
    /// Store failures are logged; the board in memory stays updated.
    fn dispatch(&mut self, command: BoardCommand) -> bool {
        let changed = match self.manager.apply(command) {
            Ok(changed) => changed,
            Err(err) => {
                tracing::error!(error = %err, "failed to persist board");
                true
            }
        };
        self.view.clamp_row(self.manager.snapshot());
        changed
    }
}

impl Drop for App {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
    }
}

fn enter_alternate_screen() -> io::Result<Terminal> {
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Terminal::new(CrosstermBackend::new(stdout))
}

/// Leave raw mode when setup fails before `App` (and its `Drop`) exists
fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
}

/// Run `setup`; if it fails, run `undo` before returning the error
fn undo_on_error<T, E>(setup: impl FnOnce() -> Result<T, E>, undo: impl FnOnce()) -> Result<T, E> {
    setup().inspect_err(|_| undo())
}

/// Helper function to create a centered rect
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
#[path = "app_tests.rs"]
mod tests;
