use crate::api::TaskApi;
use crate::controller::{BoardController, LoadState, PendingMove, Severity};
use crate::drag::{DragPosition, DragResult};
use crate::error::{BoardError, FormField, ValidationErrors};
use crate::form::TaskForm;
use crate::task::{Task, TaskStatus};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io;
use tracing::debug;

const DESCRIPTION_PREVIEW_CHARS: usize = 40;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormKind {
    Add(TaskStatus),
    Edit(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormModal {
    pub kind: FormKind,
    pub form: TaskForm,
    pub focus: FormField,
    /// Shown once the user has typed something or tried to submit.
    pub errors: Option<ValidationErrors>,
}

impl FormModal {
    fn add(status: TaskStatus) -> Self {
        Self {
            kind: FormKind::Add(status),
            form: TaskForm::default(),
            focus: FormField::Title,
            errors: None,
        }
    }

    fn edit(task: &Task) -> Self {
        Self {
            kind: FormKind::Edit(task.id.clone()),
            form: TaskForm::new(task.title.clone(), task.description.clone().unwrap_or_default()),
            focus: FormField::Title,
            errors: None,
        }
    }

    fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            FormField::Title => &mut self.form.title,
            FormField::Description => &mut self.form.description,
        }
    }

    fn revalidate(&mut self) {
        self.errors = self.form.validate().err();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Browse,
    /// A card is picked up and `target` is where it would land.
    Carrying {
        task_id: String,
        source: DragPosition,
        target: DragPosition,
    },
    Form(FormModal),
    ConfirmDelete {
        task_id: String,
        title: String,
    },
}

pub struct App<A> {
    pub controller: BoardController<A>,
    pub api_url: String,
    pub selected_status: usize,
    pub selected_task: usize,
    pub mode: Mode,
    /// Dropped card already on the board, saved on the next loop turn.
    pub pending_move: Option<PendingMove>,
    pub should_quit: bool,
}

impl<A: TaskApi> App<A> {
    pub fn new(controller: BoardController<A>, api_url: impl Into<String>) -> Self {
        Self {
            controller,
            api_url: api_url.into(),
            selected_status: 0,
            selected_task: 0,
            mode: Mode::Browse,
            pending_move: None,
            should_quit: false,
        }
    }

    fn focused_status(&self) -> TaskStatus {
        TaskStatus::COLUMN_ORDER[self.selected_status].clone()
    }

    fn column_len(&self, status: &TaskStatus) -> usize {
        self.controller
            .board()
            .column(status)
            .map_or(0, |c| c.tasks.len())
    }

    fn selected(&self) -> Option<&Task> {
        self.controller
            .board()
            .column(&self.focused_status())
            .and_then(|c| c.tasks.get(self.selected_task))
    }

    fn clamp_selection(&mut self) {
        let len = self.column_len(&self.focused_status());
        self.selected_task = self.selected_task.min(len.saturating_sub(1));
    }

    fn select_task(&mut self, task_id: &str) {
        if let Some((status, index)) = self.controller.board().columns.locate(task_id) {
            if let Some(column) = status.column_index() {
                self.selected_status = column;
                self.selected_task = index;
            }
        }
    }

    /// Save the last dropped card, if any. The board is resynchronized by the
    /// controller when the server refuses the move.
    pub async fn persist_pending_move(&mut self) {
        let Some(pending) = self.pending_move.take() else {
            return;
        };
        let task_id = pending.task_id.clone();
        if let Err(e) = self.controller.persist_drag(pending).await {
            debug!(error = %e, "drop was not persisted");
        }
        self.select_task(&task_id);
        self.clamp_selection();
    }

    pub async fn handle_key(&mut self, key: KeyEvent) {
        // An open alert swallows the next key.
        if self.controller.current_alert().is_some() {
            self.controller.dismiss_alert();
            return;
        }

        if !matches!(self.controller.load_state(), LoadState::Ready) {
            match key.code {
                KeyCode::Char('q') => self.should_quit = true,
                KeyCode::Char('r') => {
                    let _ = self.controller.load().await;
                }
                _ => {}
            }
            return;
        }

        match std::mem::replace(&mut self.mode, Mode::Browse) {
            Mode::Browse => self.handle_browse(key).await,
            Mode::Carrying {
                task_id,
                source,
                target,
            } => self.handle_carrying(key, task_id, source, target).await,
            Mode::Form(modal) => self.handle_form(key, modal).await,
            Mode::ConfirmDelete { task_id, title } => {
                self.handle_confirm_delete(key, task_id, title).await
            }
        }
    }

    async fn handle_browse(&mut self, key: KeyEvent) {
        let columns = TaskStatus::COLUMN_ORDER.len();
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Left | KeyCode::Char('h') => {
                if self.selected_status > 0 {
                    self.selected_status -= 1;
                }
                self.clamp_selection();
            }
            KeyCode::Right | KeyCode::Char('l') => {
                if self.selected_status < columns - 1 {
                    self.selected_status += 1;
                }
                self.clamp_selection();
            }
            KeyCode::Up | KeyCode::Char('k') => {
                if self.selected_task > 0 {
                    self.selected_task -= 1;
                }
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let max_tasks = self.column_len(&self.focused_status());
                if self.selected_task + 1 < max_tasks {
                    self.selected_task += 1;
                }
            }
            KeyCode::Char('a') => self.mode = Mode::Form(FormModal::add(self.focused_status())),
            KeyCode::Char('e') => {
                if let Some(modal) = self.selected().map(FormModal::edit) {
                    self.mode = Mode::Form(modal);
                }
            }
            KeyCode::Char('d') => {
                if let Some((task_id, title)) =
                    self.selected().map(|t| (t.id.clone(), t.title.clone()))
                {
                    self.mode = Mode::ConfirmDelete { task_id, title };
                }
            }
            KeyCode::Char(' ') => {
                if let Some(task_id) = self.selected().map(|t| t.id.clone()) {
                    let source = DragPosition::new(self.focused_status(), self.selected_task);
                    self.mode = Mode::Carrying {
                        task_id,
                        target: source.clone(),
                        source,
                    };
                }
            }
            KeyCode::Char('r') => {
                let _ = self.controller.load().await;
                self.clamp_selection();
            }
            _ => {}
        }
    }

    async fn handle_carrying(
        &mut self,
        key: KeyEvent,
        task_id: String,
        source: DragPosition,
        mut target: DragPosition,
    ) {
        match key.code {
            KeyCode::Esc => {
                let drag = DragResult {
                    task_id,
                    source,
                    destination: None,
                };
                let _ = self.controller.on_drag_end(drag).await;
                return;
            }
            KeyCode::Char(' ') | KeyCode::Enter => {
                let drag = DragResult {
                    task_id: task_id.clone(),
                    source,
                    destination: Some(target),
                };
                self.pending_move = self.controller.apply_drag(&drag);
                self.select_task(&task_id);
                self.clamp_selection();
                return;
            }
            KeyCode::Left | KeyCode::Char('h') => {
                if let Some(index) = target.column.column_index().filter(|i| *i > 0) {
                    target.column = TaskStatus::COLUMN_ORDER[index - 1].clone();
                }
            }
            KeyCode::Right | KeyCode::Char('l') => {
                if let Some(index) = target
                    .column
                    .column_index()
                    .filter(|i| *i + 1 < TaskStatus::COLUMN_ORDER.len())
                {
                    target.column = TaskStatus::COLUMN_ORDER[index + 1].clone();
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                target.index = target.index.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => target.index += 1,
            _ => {}
        }
        // A foreign column has one more slot than cards; the home column
        // does not, since the carried card leaves it.
        let len = self.column_len(&target.column);
        let slots = if target.column == source.column {
            len
        } else {
            len + 1
        };
        target.index = target.index.min(slots.saturating_sub(1));
        self.mode = Mode::Carrying {
            task_id,
            source,
            target,
        };
    }

    async fn handle_form(&mut self, key: KeyEvent, mut modal: FormModal) {
        match key.code {
            KeyCode::Esc => return,
            KeyCode::Tab | KeyCode::BackTab => {
                modal.focus = match modal.focus {
                    FormField::Title => FormField::Description,
                    FormField::Description => FormField::Title,
                };
            }
            KeyCode::Backspace => {
                modal.focused_mut().pop();
                modal.revalidate();
            }
            KeyCode::Char(c) => {
                modal.focused_mut().push(c);
                modal.revalidate();
            }
            KeyCode::Enter => {
                if let Err(errors) = modal.form.validate() {
                    modal.errors = Some(errors);
                    self.mode = Mode::Form(modal);
                    return;
                }
                let result = match &modal.kind {
                    FormKind::Add(status) => self
                        .controller
                        .create_task(&modal.form, status.clone())
                        .await,
                    FormKind::Edit(task_id) => self.controller.edit_task(task_id, &modal.form).await,
                };
                match result {
                    Ok(task) => {
                        self.select_task(&task.id);
                        return;
                    }
                    Err(BoardError::Validation(errors)) => modal.errors = Some(errors),
                    // Already surfaced as an alert; keep the modal so input is not lost.
                    Err(_) => {}
                }
            }
            _ => {}
        }
        self.mode = Mode::Form(modal);
    }

    async fn handle_confirm_delete(&mut self, key: KeyEvent, task_id: String, title: String) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                if let Err(e) = self.controller.delete_task(&task_id).await {
                    debug!(error = %e, "delete was not persisted");
                }
                self.clamp_selection();
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {}
            _ => self.mode = Mode::ConfirmDelete { task_id, title },
        }
    }
}

pub async fn run_app<B: Backend, A: TaskApi>(
    terminal: &mut Terminal<B>,
    app: &mut App<A>,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| draw(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            app.handle_key(key).await;
            if app.should_quit {
                return Ok(());
            }
            if app.pending_move.is_some() {
                terminal.draw(|f| draw(f, app))?;
                app.persist_pending_move().await;
            }
        }
    }
}

pub fn draw<A: TaskApi>(f: &mut Frame, app: &App<A>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(f.area());

    draw_header(f, chunks[0], app);

    match app.controller.load_state() {
        LoadState::Loading => {
            f.render_widget(
                Paragraph::new("Loading board...").style(Style::default().fg(Color::Gray)),
                chunks[1],
            );
        }
        LoadState::Failed(message) => {
            f.render_widget(
                Paragraph::new(message.as_str())
                    .style(Style::default().fg(Color::Red))
                    .wrap(Wrap { trim: true }),
                chunks[1],
            );
        }
        LoadState::Ready => draw_columns(f, chunks[1], app),
    }

    f.render_widget(Paragraph::new(help_line(&app.mode)), chunks[2]);

    match &app.mode {
        Mode::Form(modal) => draw_form(f, modal),
        Mode::ConfirmDelete { title, .. } => draw_confirm(f, title),
        _ => {}
    }

    if let Some(alert) = app.controller.current_alert() {
        let color = match alert.severity {
            Severity::Warning => Color::Yellow,
            Severity::Critical => Color::Red,
        };
        let area = centered_rect(60, 7, f.area());
        f.render_widget(Clear, area);
        f.render_widget(
            Paragraph::new(vec![
                Line::from(alert.message.as_str()),
                Line::from(""),
                Line::from(Span::styled(
                    format!("{}  (press any key)", alert.raised_at.format("%H:%M:%S")),
                    Style::default().fg(Color::DarkGray),
                )),
            ])
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .title(" Alert ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(color)),
            ),
            area,
        );
    }
}

fn draw_header<A: TaskApi>(f: &mut Frame, area: Rect, app: &App<A>) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled("Taskboard", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(format!("  {}", app.api_url)),
    ]))
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, area);
}

fn help_line(mode: &Mode) -> &'static str {
    match mode {
        Mode::Browse => {
            "arrows move  a add  e edit  d delete  space pick up  r reload  q quit"
        }
        Mode::Carrying { .. } => "arrows choose slot  space/enter drop  esc cancel",
        Mode::Form(_) => "tab switch field  enter save  esc cancel",
        Mode::ConfirmDelete { .. } => "y delete  n cancel",
    }
}

fn card(task: &Task, dimmed: bool) -> ListItem<'_> {
    let title_style = if dimmed {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::White)
    };
    let mut lines = vec![Line::from(Span::styled(task.title.as_str(), title_style))];
    if let Some(description) = task.description.as_deref().filter(|d| !d.is_empty()) {
        let mut preview: String = description.chars().take(DESCRIPTION_PREVIEW_CHARS).collect();
        if description.chars().count() > DESCRIPTION_PREVIEW_CHARS {
            preview.push_str("...");
        }
        lines.push(Line::from(Span::styled(
            format!("  {preview}"),
            Style::default().fg(Color::Gray),
        )));
    }
    ListItem::new(lines)
}

fn draw_columns<A: TaskApi>(f: &mut Frame, area: Rect, app: &App<A>) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![
            Constraint::Percentage(33),
            Constraint::Percentage(33),
            Constraint::Percentage(34),
        ])
        .split(area);

    let board = app.controller.board();
    for (i, status) in board.column_order().iter().enumerate() {
        let Some(column) = board.column(status) else {
            continue;
        };

        let mut items: Vec<ListItem> = Vec::with_capacity(column.tasks.len() + 1);
        let mut highlighted = (app.selected_status == i && !column.tasks.is_empty())
            .then_some(app.selected_task);

        match &app.mode {
            Mode::Carrying {
                task_id, target, ..
            } => {
                highlighted = None;
                // Show the drop marker where the card would land.
                let visible: Vec<&Task> = if target.column == *status {
                    column.tasks.iter().filter(|t| &t.id != task_id).collect()
                } else {
                    column.tasks.iter().collect()
                };
                let visible_len = visible.len();
                for (index, task) in visible.into_iter().enumerate() {
                    if target.column == *status && target.index == index {
                        items.push(drop_marker());
                    }
                    items.push(card(task, false));
                }
                if target.column == *status && target.index >= visible_len {
                    items.push(drop_marker());
                }
                if target.column != *status {
                    if let Some(index) = column.position_of(task_id) {
                        items[index] = card(&column.tasks[index], true);
                    }
                }
            }
            _ => items.extend(column.tasks.iter().map(|t| card(t, false))),
        }

        let list = List::new(items)
            .block(
                Block::default()
                    .title(format!(" {} ({}) ", column.title, column.tasks.len()))
                    .borders(Borders::ALL)
                    .border_style(if app.selected_status == i {
                        Style::default().fg(Color::Cyan)
                    } else {
                        Style::default()
                    }),
            )
            .highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray));

        let mut state = ListState::default();
        state.select(highlighted);
        f.render_stateful_widget(list, chunks[i], &mut state);
    }
}

fn drop_marker() -> ListItem<'static> {
    ListItem::new(Line::from(Span::styled(
        "> drop here",
        Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
    )))
}

fn draw_form(f: &mut Frame, modal: &FormModal) {
    let title = match &modal.kind {
        FormKind::Add(status) => format!(" Add task to {status} "),
        FormKind::Edit(_) => " Edit task ".to_string(),
    };
    let area = centered_rect(60, 12, f.area());
    f.render_widget(Clear, area);

    let field_style = |field: FormField| {
        if modal.focus == field {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        }
    };
    let error_line = |field: FormField| {
        let message = modal
            .errors
            .as_ref()
            .and_then(|e| e.for_field(field))
            .unwrap_or_default();
        Line::from(Span::styled(message.to_string(), Style::default().fg(Color::Red)))
    };

    let lines = vec![
        Line::from(Span::styled("Title", field_style(FormField::Title))),
        Line::from(modal.form.title.as_str()),
        error_line(FormField::Title),
        Line::from(""),
        Line::from(Span::styled("Description", field_style(FormField::Description))),
        Line::from(modal.form.description.as_str()),
        error_line(FormField::Description),
    ];

    f.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(Block::default().title(title).borders(Borders::ALL)),
        area,
    );
}

fn draw_confirm(f: &mut Frame, title: &str) {
    let area = centered_rect(50, 5, f.area());
    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(format!(
            "Delete \"{title}\"? This action cannot be undone. (y/n)"
        ))
        .wrap(Wrap { trim: true })
        .block(Block::default().title(" Delete task ").borders(Borders::ALL)),
        area,
    );
}

fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let width = u32::from(area.width) * u32::from(percent_x.min(100)) / 100;
    let width = u16::try_from(width).unwrap_or(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
