use std::{cmp, io, thread, time::Duration};

use anyhow::{Context, Result};
use chrono::Local;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};
use requi_core::{
    export,
    models::{ALL_CATEGORIES, ARMOR_LIMIT, GRENADE_LIMIT, WEAPON_WEIGHT_LIMIT},
    Catalog, Category, Item, Metadata, MetadataStore, Selection, SortColumn, SortState,
};
use tokio::{spawn, sync::mpsc};
use tracing::{error, info, warn};

use crate::clipboard;

const TICK_RATE: Duration = Duration::from_millis(250);
const SPLASH_TICKS: u8 = 8;
const MAX_INPUT_LEN: usize = 64;

#[derive(Debug, Clone)]
struct Theme {
    primary_fg: Color,
    accent: Color,
    muted: Color,
    selection_bg: Color,
    selection_fg: Color,
    warning: Color,
    danger: Color,
}

impl Default for Theme {
    fn default() -> Self {
        // Green-on-dark terminal palette carried over from the original
        // desktop skin.
        Self {
            primary_fg: Color::White,
            accent: Color::Rgb(0, 255, 136),
            muted: Color::DarkGray,
            selection_bg: Color::Rgb(0, 255, 136),
            selection_fg: Color::Black,
            warning: Color::Yellow,
            danger: Color::Red,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Browse,
    Filter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pane {
    Catalog,
    Loadout,
}

#[derive(Debug)]
enum AppEvent {
    Input(Event),
    Tick,
    ClipboardDone(Result<&'static str>),
}

/// Single-line text editor shared by the modal inputs.
#[derive(Debug, Clone, Default)]
struct LineInput {
    value: String,
    cursor: usize,
}

impl LineInput {
    fn move_cursor(&mut self, delta: isize) {
        let len = self.value.len() as isize;
        let mut next = self.cursor as isize + delta;
        if next < 0 {
            next = 0;
        } else if next > len {
            next = len;
        }
        self.cursor = next as usize;
    }

    fn move_home(&mut self) {
        self.cursor = 0;
    }

    fn move_end(&mut self) {
        self.cursor = self.value.len();
    }

    fn insert(&mut self, ch: char) {
        if self.value.len() >= MAX_INPUT_LEN {
            return;
        }
        if ch.is_ascii() && !ch.is_ascii_control() {
            self.value.insert(self.cursor, ch);
            self.cursor += ch.len_utf8();
        }
    }

    fn backspace(&mut self) {
        if self.cursor > 0 && self.cursor <= self.value.len() {
            self.cursor -= 1;
            self.value.remove(self.cursor);
        }
    }

    fn delete(&mut self) {
        if self.cursor < self.value.len() {
            self.value.remove(self.cursor);
        }
    }

    fn trimmed(&self) -> &str {
        self.value.trim()
    }
}

/// First-run modal collecting the display name.
#[derive(Debug, Clone, Default)]
struct UsernamePrompt {
    input: LineInput,
    error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormField {
    Name,
    Category,
    Points,
    Description,
}

impl FormField {
    fn next(self) -> Self {
        match self {
            Self::Name => Self::Category,
            Self::Category => Self::Points,
            Self::Points => Self::Description,
            Self::Description => Self::Name,
        }
    }

    fn previous(self) -> Self {
        match self {
            Self::Name => Self::Description,
            Self::Category => Self::Name,
            Self::Points => Self::Category,
            Self::Description => Self::Points,
        }
    }
}

/// Modal form for defining a personal item.
#[derive(Debug, Clone)]
struct ItemForm {
    name: LineInput,
    category_index: usize,
    points: LineInput,
    description: LineInput,
    focus: FormField,
    error: Option<String>,
}

impl ItemForm {
    fn new() -> Self {
        let default_category = ALL_CATEGORIES
            .iter()
            .position(|category| *category == Category::Utility)
            .unwrap_or(0);
        Self {
            name: LineInput::default(),
            category_index: default_category,
            points: LineInput::default(),
            description: LineInput::default(),
            focus: FormField::Name,
            error: None,
        }
    }

    fn category(&self) -> &Category {
        &ALL_CATEGORIES[self.category_index]
    }

    fn cycle_category(&mut self, delta: isize) {
        let len = ALL_CATEGORIES.len() as isize;
        let next = (self.category_index as isize + delta).rem_euclid(len);
        self.category_index = next as usize;
    }

    fn focused_input(&mut self) -> Option<&mut LineInput> {
        match self.focus {
            FormField::Name => Some(&mut self.name),
            FormField::Points => Some(&mut self.points),
            FormField::Description => Some(&mut self.description),
            FormField::Category => None,
        }
    }

    /// Validate the form. Nothing is persisted when this fails.
    fn submit(&self) -> Result<Item, String> {
        let name = self.name.trimmed();
        let points = match self.points.trimmed().parse::<u32>() {
            Ok(points) if !name.is_empty() => points,
            _ => return Err("Please fill all fields correctly.".to_string()),
        };
        let description = self.description.trimmed();
        Ok(Item {
            name: name.to_string(),
            category: self.category().clone(),
            points,
            description: if description.is_empty() {
                None
            } else {
                Some(description.to_string())
            },
        })
    }
}

struct UiState {
    all_items: Vec<Item>,
    visible: Vec<Item>,
    cursor: usize,
    offset: usize,
    list_height: usize,
    filter: String,
    status: String,
    mode: Mode,
    should_quit: bool,
    loadout_cursor: usize,
    loadout_offset: usize,
    loadout_height: usize,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            all_items: Vec::new(),
            visible: Vec::new(),
            cursor: 0,
            offset: 0,
            list_height: 1,
            filter: String::new(),
            status: "Ready".to_string(),
            mode: Mode::Browse,
            should_quit: false,
            loadout_cursor: 0,
            loadout_offset: 0,
            loadout_height: 1,
        }
    }
}

impl UiState {
    fn set_items(&mut self, items: Vec<Item>) {
        self.all_items = items;
        self.apply_filter();
    }

    fn apply_filter(&mut self) {
        if self.filter.trim().is_empty() {
            self.visible = self.all_items.clone();
        } else {
            let needle = self.filter.to_lowercase();
            self.visible = self
                .all_items
                .iter()
                .filter(|item| item_matches(item, &needle))
                .cloned()
                .collect();
        }
        self.cursor = 0;
        self.offset = 0;
    }

    fn move_cursor(&mut self, delta: isize) {
        if self.visible.is_empty() {
            return;
        }
        let len = self.visible.len() as isize;
        let mut idx = self.cursor as isize + delta;
        if idx < 0 {
            idx = 0;
        } else if idx >= len {
            idx = len - 1;
        }
        self.cursor = idx as usize;
        self.ensure_cursor_visible();
    }

    fn move_to(&mut self, index: usize) {
        if self.visible.is_empty() {
            return;
        }
        self.cursor = index.min(self.visible.len() - 1);
        self.ensure_cursor_visible();
    }

    fn move_to_end(&mut self) {
        if self.visible.is_empty() {
            return;
        }
        self.cursor = self.visible.len() - 1;
        self.ensure_cursor_visible();
    }

    fn page(&mut self, direction: isize) {
        if self.visible.is_empty() || self.list_height == 0 {
            return;
        }
        let delta = self.list_height.min(self.visible.len()) as isize;
        self.move_cursor(delta * direction);
    }

    fn visible_window(&self, height: usize) -> &[Item] {
        if self.visible.is_empty() {
            return &[];
        }
        let end = (self.offset + height).min(self.visible.len());
        &self.visible[self.offset..end]
    }

    fn current_item(&self) -> Option<&Item> {
        self.visible.get(self.cursor)
    }

    fn set_status(&mut self, message: String) {
        self.status = message;
    }

    fn clamp_cursor(&mut self) {
        if self.visible.is_empty() {
            self.cursor = 0;
            self.offset = 0;
        } else if self.cursor >= self.visible.len() {
            self.cursor = self.visible.len() - 1;
        }
    }

    fn ensure_cursor_visible(&mut self) {
        if self.visible.is_empty() || self.list_height == 0 {
            self.offset = 0;
            return;
        }
        let height = self.list_height;
        let max_offset = self.visible.len().saturating_sub(height);

        if self.cursor < self.offset {
            self.offset = self.cursor;
        } else if self.cursor >= self.offset + height {
            self.offset = self.cursor + 1 - height;
        }

        if self.offset > max_offset {
            self.offset = max_offset;
        }
    }

    fn move_loadout_cursor(&mut self, delta: isize, total: usize) {
        if total == 0 {
            self.loadout_cursor = 0;
            self.loadout_offset = 0;
            return;
        }
        let mut idx = self.loadout_cursor as isize + delta;
        if idx < 0 {
            idx = 0;
        } else if idx >= total as isize {
            idx = (total as isize) - 1;
        }
        self.loadout_cursor = idx as usize;

        let visible = self.loadout_height.max(1);
        if self.loadout_cursor < self.loadout_offset {
            self.loadout_offset = self.loadout_cursor;
        } else if self.loadout_cursor >= self.loadout_offset + visible {
            self.loadout_offset = self.loadout_cursor + 1 - visible;
        }
        let max_offset = total.saturating_sub(visible);
        if self.loadout_offset > max_offset {
            self.loadout_offset = max_offset;
        }
    }
}

fn item_matches(item: &Item, needle: &str) -> bool {
    item.name.to_lowercase().contains(needle)
        || item.category.label().to_lowercase().contains(needle)
        || item
            .description
            .as_ref()
            .map(|text| text.to_lowercase().contains(needle))
            .unwrap_or(false)
}

/// High-level application state for the planner TUI.
pub struct RequisitionApp {
    catalog: Catalog,
    metadata_store: MetadataStore,
    metadata: Metadata,
    selection: Selection,
    state: UiState,
    pane: Pane,
    sort: SortState,
    username_prompt: Option<UsernamePrompt>,
    item_form: Option<ItemForm>,
    details: Option<Item>,
    splash_ticks: u8,
    exporting: bool,
    event_tx: Option<mpsc::Sender<AppEvent>>,
    theme: Theme,
}

impl RequisitionApp {
    pub fn new(catalog: Catalog, metadata_store: MetadataStore, metadata: Metadata) -> Self {
        // The username is collected once on first run and persisted
        // immediately; afterwards the welcome splash greets the user.
        let first_run = metadata.username.trim().is_empty();
        Self {
            catalog,
            metadata_store,
            metadata,
            selection: Selection::new(),
            state: UiState::default(),
            pane: Pane::Catalog,
            sort: SortState::default(),
            username_prompt: first_run.then(UsernamePrompt::default),
            item_form: None,
            details: None,
            splash_ticks: if first_run { 0 } else { SPLASH_TICKS },
            exporting: false,
            event_tx: None,
            theme: Theme::default(),
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        self.reload_items();
        self.state
            .set_status(format!("Loaded {} items", self.state.visible.len()));

        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
        terminal.hide_cursor()?;
        terminal.clear()?;

        let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(128);
        spawn_input_thread(event_tx.clone());
        self.event_tx = Some(event_tx);

        loop {
            terminal.draw(|frame| self.draw(frame))?;
            if self.state.should_quit {
                break;
            }

            let maybe_event = event_rx.recv().await;
            if !self.process_app_event(maybe_event) {
                break;
            }

            if self.state.should_quit {
                break;
            }
        }

        restore_terminal(&mut terminal)?;
        self.event_tx = None;
        Ok(())
    }

    fn reload_items(&mut self) {
        self.state.set_items(self.catalog.items());
    }

    fn process_app_event(&mut self, maybe_event: Option<AppEvent>) -> bool {
        match maybe_event {
            Some(AppEvent::Input(event)) => {
                if let Event::Key(key) = event {
                    if self.splash_ticks > 0 {
                        // Any key dismisses the welcome splash.
                        self.splash_ticks = 0;
                        return true;
                    }
                    let result = if self.username_prompt.is_some() {
                        self.handle_username_key(key)
                    } else if self.item_form.is_some() {
                        self.handle_form_key(key)
                    } else if self.details.is_some() {
                        self.details = None;
                        Ok(())
                    } else {
                        self.handle_key(key)
                    };
                    if let Err(err) = result {
                        error!(?err, "Input handling failed");
                        self.state.set_status(format!("Error: {err}"));
                    }
                }
                true
            }
            Some(AppEvent::Tick) => {
                self.handle_tick();
                true
            }
            Some(AppEvent::ClipboardDone(result)) => {
                self.exporting = false;
                match result {
                    Ok(tool) => {
                        info!(tool, "Loadout copied to clipboard");
                        self.state.set_status(format!(
                            "Loadout copied to clipboard via {tool} at {}",
                            Local::now().format("%H:%M:%S")
                        ));
                    }
                    Err(err) => {
                        error!(?err, "Clipboard copy failed");
                        self.state.set_status(format!("Clipboard copy failed: {err}"));
                    }
                }
                true
            }
            None => false,
        }
    }

    fn handle_tick(&mut self) {
        if self.splash_ticks > 0 {
            self.splash_ticks -= 1;
        }
        if self.state.mode == Mode::Filter {
            self.state
                .set_status(format!("Filter: {}", self.state.filter));
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if self.state.mode == Mode::Filter {
            return self.handle_filter_key(key);
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.state.should_quit = true;
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.state.should_quit = true;
            }
            KeyCode::Tab => {
                self.pane = match self.pane {
                    Pane::Catalog => Pane::Loadout,
                    Pane::Loadout => Pane::Catalog,
                };
            }
            KeyCode::Down | KeyCode::Char('j') => match self.pane {
                Pane::Catalog => self.state.move_cursor(1),
                Pane::Loadout => self.state.move_loadout_cursor(1, self.selection.len()),
            },
            KeyCode::Up | KeyCode::Char('k') => match self.pane {
                Pane::Catalog => self.state.move_cursor(-1),
                Pane::Loadout => self.state.move_loadout_cursor(-1, self.selection.len()),
            },
            KeyCode::PageDown => self.state.page(1),
            KeyCode::PageUp => self.state.page(-1),
            KeyCode::Home | KeyCode::Char('g') => self.state.move_to(0),
            KeyCode::End | KeyCode::Char('G') => self.state.move_to_end(),
            KeyCode::Enter | KeyCode::Char('a') => self.add_current_item(),
            KeyCode::Char('d') | KeyCode::Delete => self.remove_current_loadout_item(),
            KeyCode::Char('i') => {
                self.details = self.state.current_item().cloned();
            }
            KeyCode::Char('n') => {
                self.item_form = Some(ItemForm::new());
            }
            KeyCode::Char('/') => {
                self.state.mode = Mode::Filter;
                self.state
                    .set_status(format!("Filter: {}", self.state.filter));
            }
            KeyCode::Char('1') => self.sort_catalog(SortColumn::Name),
            KeyCode::Char('2') => self.sort_catalog(SortColumn::Category),
            KeyCode::Char('3') => self.sort_catalog(SortColumn::Points),
            KeyCode::Char('e') => self.export_loadout(),
            _ => {}
        }
        Ok(())
    }

    fn handle_filter_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Esc => {
                self.state.filter.clear();
                self.state.apply_filter();
                self.state.mode = Mode::Browse;
                self.state.set_status("Filter cleared".to_string());
            }
            KeyCode::Enter => {
                self.state.mode = Mode::Browse;
                self.state.set_status(format!(
                    "{} items match '{}'",
                    self.state.visible.len(),
                    self.state.filter
                ));
            }
            KeyCode::Backspace => {
                self.state.filter.pop();
                self.state.apply_filter();
            }
            KeyCode::Char(ch) => {
                if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT {
                    self.state.filter.push(ch);
                    self.state.apply_filter();
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_username_key(&mut self, key: KeyEvent) -> Result<()> {
        let Some(prompt) = self.username_prompt.as_mut() else {
            return Ok(());
        };

        match key.code {
            KeyCode::Esc => {
                // A name is required before the planner can run.
                self.state.should_quit = true;
                return Ok(());
            }
            KeyCode::Enter => {
                let name = prompt.input.trimmed().to_string();
                if name.is_empty() {
                    prompt.error = Some("Please enter a valid name.".to_string());
                    return Ok(());
                }
                self.metadata_store
                    .set_username(&mut self.metadata, &name)
                    .context("failed to persist username")?;
                info!(username = %name, "Username recorded");
                self.username_prompt = None;
                self.splash_ticks = SPLASH_TICKS;
                return Ok(());
            }
            KeyCode::Left => prompt.input.move_cursor(-1),
            KeyCode::Right => prompt.input.move_cursor(1),
            KeyCode::Home => prompt.input.move_home(),
            KeyCode::End => prompt.input.move_end(),
            KeyCode::Backspace => prompt.input.backspace(),
            KeyCode::Delete => prompt.input.delete(),
            KeyCode::Char(ch) => {
                if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT {
                    prompt.input.insert(ch);
                    prompt.error = None;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> Result<()> {
        let mut submitted: Option<Item> = None;
        let mut cancelled = false;

        if let Some(form) = self.item_form.as_mut() {
            match key.code {
                KeyCode::Esc => cancelled = true,
                KeyCode::Tab | KeyCode::Down => form.focus = form.focus.next(),
                KeyCode::BackTab | KeyCode::Up => form.focus = form.focus.previous(),
                KeyCode::Enter => match form.submit() {
                    Ok(item) => submitted = Some(item),
                    Err(message) => form.error = Some(message),
                },
                KeyCode::Left => match form.focused_input() {
                    Some(input) => input.move_cursor(-1),
                    None => form.cycle_category(-1),
                },
                KeyCode::Right => match form.focused_input() {
                    Some(input) => input.move_cursor(1),
                    None => form.cycle_category(1),
                },
                KeyCode::Home => {
                    if let Some(input) = form.focused_input() {
                        input.move_home();
                    }
                }
                KeyCode::End => {
                    if let Some(input) = form.focused_input() {
                        input.move_end();
                    }
                }
                KeyCode::Backspace => {
                    if let Some(input) = form.focused_input() {
                        input.backspace();
                    }
                }
                KeyCode::Delete => {
                    if let Some(input) = form.focused_input() {
                        input.delete();
                    }
                }
                KeyCode::Char(ch) => {
                    if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT {
                        if let Some(input) = form.focused_input() {
                            input.insert(ch);
                            form.error = None;
                        }
                    }
                }
                _ => {}
            }
        }

        if cancelled {
            self.item_form = None;
            self.state.set_status("Personal item cancelled".to_string());
            return Ok(());
        }

        if let Some(item) = submitted {
            self.metadata_store
                .add_personal_item(&mut self.metadata, item.clone())
                .context("failed to persist personal item")?;
            self.catalog.append(item.clone());
            self.reload_items();
            info!(name = %item.name, category = %item.category, "Personal item added");
            self.item_form = None;
            self.state
                .set_status(format!("Added personal item {}", item.name));
        }

        Ok(())
    }

    fn add_current_item(&mut self) {
        let Some(item) = self.state.current_item().cloned() else {
            self.state.set_status("No item selected".to_string());
            return;
        };

        match self.selection.add(item.clone()) {
            Ok(()) => {
                self.state.set_status(format!("Added {}", item.display_label()));
            }
            Err(reject) => {
                warn!(name = %item.name, %reject, "Selection rejected");
                self.state.set_status(reject.to_string());
            }
        }
    }

    fn remove_current_loadout_item(&mut self) {
        if self.selection.is_empty() {
            self.state.set_status("Loadout is empty".to_string());
            return;
        }

        let index = self.state.loadout_cursor.min(self.selection.len() - 1);
        match self.selection.remove(index) {
            Ok(item) => {
                self.state.set_status(format!("Removed {}", item.name));
                self.state.move_loadout_cursor(0, self.selection.len());
            }
            Err(err) => self.state.set_status(format!("Error: {err}")),
        }
    }

    fn sort_catalog(&mut self, column: SortColumn) {
        self.sort = self.catalog.sort_by(column);
        self.reload_items();
        let direction = if self.sort.descending {
            "descending"
        } else {
            "ascending"
        };
        self.state
            .set_status(format!("Sorted by {} ({direction})", column.label()));
    }

    fn export_loadout(&mut self) {
        if self.exporting {
            self.state.set_status("Export already in progress".to_string());
            return;
        }
        let Some(sender) = self.event_tx.clone() else {
            return;
        };

        let report = export::render_report(&self.selection, &self.metadata.username);
        info!(items = self.selection.len(), "Exporting loadout");
        self.exporting = true;
        self.state.set_status("Copying loadout to clipboard...".to_string());
        spawn(async move {
            let result = clipboard::copy(report).await;
            let _ = sender.send(AppEvent::ClipboardDone(result)).await;
        });
    }

    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.size();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(8), Constraint::Length(5)])
            .split(area);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(chunks[0]);

        self.render_catalog(frame, body[0]);
        self.render_loadout(frame, body[1]);
        self.render_status(frame, chunks[1]);

        if self.splash_ticks > 0 {
            self.render_splash(frame);
        } else if let Some(prompt) = self.username_prompt.clone() {
            self.render_username_prompt(frame, &prompt);
        } else if let Some(form) = self.item_form.clone() {
            self.render_item_form(frame, &form);
        } else if let Some(item) = self.details.clone() {
            self.render_details(frame, &item);
        }
    }

    fn render_catalog(&mut self, frame: &mut Frame, area: Rect) {
        // Two border rows plus the header row.
        self.state.list_height = area.height.saturating_sub(3) as usize;
        self.state.clamp_cursor();
        self.state.ensure_cursor_visible();

        let height = self.state.list_height;
        let window = self.state.visible_window(height);

        let mut table_state = TableState::default();
        if !window.is_empty() {
            let selected = self
                .state
                .cursor
                .saturating_sub(self.state.offset)
                .min(window.len().saturating_sub(1));
            table_state.select(Some(selected));
        }

        let header_cell = |column: SortColumn| {
            let mut label = column.label().to_string();
            if self.sort.column == Some(column) {
                label.push_str(if self.sort.descending { " ▼" } else { " ▲" });
            }
            label
        };
        let header = Row::new(vec![
            header_cell(SortColumn::Name),
            header_cell(SortColumn::Category),
            header_cell(SortColumn::Points),
        ])
        .style(
            Style::default()
                .fg(self.theme.accent)
                .add_modifier(Modifier::BOLD),
        );

        let rows: Vec<Row> = window
            .iter()
            .map(|item| {
                Row::new(vec![
                    item.name.clone(),
                    item.category.label().to_string(),
                    item.points.to_string(),
                ])
            })
            .collect();

        let title = if self.state.filter.trim().is_empty() {
            format!("Catalog ({})", self.state.visible.len())
        } else {
            format!(
                "Catalog ({} / {} · filter '{}')",
                self.state.visible.len(),
                self.state.all_items.len(),
                self.state.filter
            )
        };
        let border_style = if self.pane == Pane::Catalog {
            Style::default().fg(self.theme.accent)
        } else {
            Style::default().fg(self.theme.muted)
        };

        let table = Table::new(
            rows,
            [
                Constraint::Percentage(45),
                Constraint::Percentage(35),
                Constraint::Percentage(20),
            ],
        )
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(title),
        )
        .highlight_style(
            Style::default()
                .bg(self.theme.selection_bg)
                .fg(self.theme.selection_fg),
        );

        frame.render_stateful_widget(table, area, &mut table_state);
    }

    fn render_loadout(&mut self, frame: &mut Frame, area: Rect) {
        self.state.loadout_height = area.height.saturating_sub(2) as usize;
        let total = self.selection.len();
        self.state.move_loadout_cursor(0, total);

        let visible = self.state.loadout_height.max(1);
        let mut list_state = ListState::default();
        if total > 0 {
            list_state.select(Some(
                self.state
                    .loadout_cursor
                    .saturating_sub(self.state.loadout_offset)
                    .min(total.saturating_sub(1)),
            ));
        }

        let items: Vec<ListItem> = if total == 0 {
            vec![ListItem::new(Line::from(Span::styled(
                "  Loadout is empty",
                Style::default().fg(self.theme.muted),
            )))]
        } else {
            let end = cmp::min(self.state.loadout_offset + visible, total);
            self.selection.items()[self.state.loadout_offset..end]
                .iter()
                .enumerate()
                .map(|(idx, item)| {
                    let absolute = self.state.loadout_offset + idx;
                    let marker = if absolute == self.state.loadout_cursor
                        && self.pane == Pane::Loadout
                    {
                        Span::styled("▶ ", Style::default().fg(self.theme.accent))
                    } else {
                        Span::raw("  ")
                    };
                    ListItem::new(Line::from(vec![
                        marker,
                        Span::styled(
                            item.display_label(),
                            Style::default().fg(self.theme.primary_fg),
                        ),
                    ]))
                })
                .collect()
        };

        let border_style = if self.pane == Pane::Loadout {
            Style::default().fg(self.theme.accent)
        } else {
            Style::default().fg(self.theme.muted)
        };
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(border_style)
                    .title(format!("Loadout ({total})")),
            )
            .highlight_style(
                Style::default()
                    .bg(self.theme.selection_bg)
                    .fg(self.theme.selection_fg),
            );

        frame.render_stateful_widget(list, area, &mut list_state);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let totals = self.selection.totals();
        let totals_line = Line::from(Span::styled(
            format!(
                "Total: {} pts | Grenades: {}/{GRENADE_LIMIT} | Weapons: {}/{WEAPON_WEIGHT_LIMIT} | Armor: {}/{ARMOR_LIMIT}",
                totals.points, totals.grenades, totals.weapon_weight, totals.armor
            ),
            Style::default()
                .fg(self.theme.accent)
                .add_modifier(Modifier::BOLD),
        ));

        let message = if self.state.mode == Mode::Filter {
            format!("Filter: {}", self.state.filter)
        } else {
            self.state.status.clone()
        };
        let message_style = if message.starts_with("Error")
            || message.starts_with("Clipboard copy failed")
        {
            Style::default().fg(self.theme.danger)
        } else if message.starts_with("Maximum")
            || message.starts_with("Exceeded")
            || message.starts_with("You may only")
        {
            Style::default().fg(self.theme.warning)
        } else {
            Style::default().fg(self.theme.primary_fg)
        };

        let keys_line = Line::from(Span::styled(
            "Tab pane  j/k move  Enter add  d remove  n new item  i details  / filter  1/2/3 sort  e export  q quit",
            Style::default().fg(self.theme.muted),
        ));

        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("Requisition Planner - {}", self.metadata.username));
        let paragraph = Paragraph::new(vec![
            totals_line,
            Line::from(Span::styled(message, message_style)),
            keys_line,
        ])
        .block(block)
        .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn render_splash(&self, frame: &mut Frame) {
        let area = centered_rect(46, 7, frame.size());
        frame.render_widget(Clear, area);

        let username = self.metadata.username.to_uppercase();
        let lines = vec![
            Line::from(Span::styled(
                ">> SERVITOR-ACCESS VERIFIED",
                Style::default().fg(self.theme.accent),
            )),
            Line::from(Span::styled(
                format!(">> WELCOME, BROTHER {username}"),
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                ">> PREPARE FOR DEPLOYMENT",
                Style::default().fg(self.theme.accent),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Deployment Protocol"),
            )
            .alignment(Alignment::Left);
        frame.render_widget(paragraph, area);
    }

    fn render_username_prompt(&self, frame: &mut Frame, prompt: &UsernamePrompt) {
        let frame_area = frame.size();
        let mut width = cmp::min(50_u16, frame_area.width.saturating_sub(4));
        width = cmp::max(width, 24_u16);
        let area = centered_rect(width, 7, frame_area);

        frame.render_widget(Clear, area);

        let input_line = Line::from(vec![
            Span::styled("> ", Style::default().fg(self.theme.accent)),
            Span::raw(prompt.input.value.clone()),
        ]);
        let feedback = match &prompt.error {
            Some(message) => Line::from(Span::styled(
                message.clone(),
                Style::default().fg(self.theme.danger),
            )),
            None => Line::from(""),
        };
        let helper = Line::from(vec![
            Span::styled("Enter", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" confirm  "),
            Span::styled("Esc", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" quit"),
        ]);

        let paragraph = Paragraph::new(vec![
            Line::from("IDENTIFY YOURSELF:"),
            input_line,
            feedback,
            helper,
        ])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("BROTHER UNRECOGNIZED"),
        )
        .wrap(Wrap { trim: true });

        frame.render_widget(paragraph, area);

        let cursor_x = (area.x + 3 + prompt.input.cursor as u16)
            .min(area.x + area.width.saturating_sub(2));
        let cursor_y = area.y + 2;
        frame.set_cursor(cursor_x, cursor_y);
    }

    fn render_item_form(&self, frame: &mut Frame, form: &ItemForm) {
        let frame_area = frame.size();
        let mut width = cmp::min(60_u16, frame_area.width.saturating_sub(4));
        width = cmp::max(width, 30_u16);
        let area = centered_rect(width, 12, frame_area);

        frame.render_widget(Clear, area);

        let field_line = |label: &str, value: &str, focused: bool| {
            let marker = if focused { "▶ " } else { "  " };
            Line::from(vec![
                Span::styled(
                    format!("{marker}{label:<12}"),
                    if focused {
                        Style::default()
                            .fg(self.theme.accent)
                            .add_modifier(Modifier::BOLD)
                    } else {
                        Style::default().fg(self.theme.primary_fg)
                    },
                ),
                Span::raw(value.to_string()),
            ])
        };

        let category_value = if form.focus == FormField::Category {
            format!("◀ {} ▶", form.category().label())
        } else {
            form.category().label().to_string()
        };

        let feedback = match &form.error {
            Some(message) => Line::from(Span::styled(
                message.clone(),
                Style::default().fg(self.theme.danger),
            )),
            None => Line::from(""),
        };
        let helper = Line::from(vec![
            Span::styled("Tab", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" next field  "),
            Span::styled("Enter", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" add item  "),
            Span::styled("Esc", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" cancel"),
        ]);

        let paragraph = Paragraph::new(vec![
            field_line("Name", &form.name.value, form.focus == FormField::Name),
            field_line("Category", &category_value, form.focus == FormField::Category),
            field_line("Points", &form.points.value, form.focus == FormField::Points),
            field_line(
                "Description",
                &form.description.value,
                form.focus == FormField::Description,
            ),
            Line::from(""),
            feedback,
            helper,
        ])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Add Personal Item"),
        )
        .wrap(Wrap { trim: true });

        frame.render_widget(paragraph, area);
    }

    fn render_details(&self, frame: &mut Frame, item: &Item) {
        let frame_area = frame.size();
        let mut width = cmp::min(60_u16, frame_area.width.saturating_sub(4));
        width = cmp::max(width, 30_u16);
        let height = 12_u16.min(frame_area.height.saturating_sub(2)).max(6_u16);
        let area = centered_rect(width, height, frame_area);

        frame.render_widget(Clear, area);

        let description = item
            .description
            .as_deref()
            .unwrap_or("No description provided.");
        let lines = vec![
            Line::from(vec![
                Span::styled("Name: ", Style::default().fg(self.theme.accent)),
                Span::raw(item.name.clone()),
            ]),
            Line::from(vec![
                Span::styled("Category: ", Style::default().fg(self.theme.accent)),
                Span::raw(item.category.label().to_string()),
            ]),
            Line::from(vec![
                Span::styled("Points: ", Style::default().fg(self.theme.accent)),
                Span::raw(item.points.to_string()),
            ]),
            Line::from(""),
            Line::from(Span::styled(
                "Description:",
                Style::default().fg(self.theme.accent),
            )),
            Line::from(description.to_string()),
            Line::from(""),
            Line::from(Span::styled(
                "Press any key to close",
                Style::default().fg(self.theme.muted),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title(item.name.clone()))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor()?;
    Ok(())
}

fn spawn_input_thread(sender: mpsc::Sender<AppEvent>) {
    thread::spawn(move || loop {
        match event::poll(TICK_RATE) {
            Ok(true) => match event::read() {
                Ok(evt) => {
                    if sender.blocking_send(AppEvent::Input(evt)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            },
            Ok(false) => {
                if sender.blocking_send(AppEvent::Tick).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    });
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use requi_core::models::Category;

    #[test]
    fn line_input_editing() {
        let mut input = LineInput::default();
        for ch in "Frag".chars() {
            input.insert(ch);
        }
        assert_eq!(input.value, "Frag");
        input.move_home();
        input.delete();
        assert_eq!(input.value, "rag");
        input.move_end();
        input.backspace();
        assert_eq!(input.value, "ra");
        input.insert('\n');
        assert_eq!(input.value, "ra");
    }

    #[test]
    fn form_rejects_invalid_input() {
        let mut form = ItemForm::new();
        assert!(form.submit().is_err());

        for ch in "Lucky Charm".chars() {
            form.name.insert(ch);
        }
        for ch in "one".chars() {
            form.points.insert(ch);
        }
        assert_eq!(
            form.submit().unwrap_err(),
            "Please fill all fields correctly."
        );
    }

    #[test]
    fn form_builds_item() {
        let mut form = ItemForm::new();
        for ch in "Lucky Charm".chars() {
            form.name.insert(ch);
        }
        for ch in "1".chars() {
            form.points.insert(ch);
        }
        let item = form.submit().unwrap();
        assert_eq!(item.name, "Lucky Charm");
        assert_eq!(item.category, Category::Utility);
        assert_eq!(item.points, 1);
        assert_eq!(item.description, None);
    }

    #[test]
    fn form_category_cycles_through_fixed_set() {
        let mut form = ItemForm::new();
        assert_eq!(form.category(), &Category::Utility);
        for _ in 0..ALL_CATEGORIES.len() {
            form.cycle_category(1);
        }
        assert_eq!(form.category(), &Category::Utility);
        form.cycle_category(-1);
        assert_eq!(form.category(), &Category::Grenade);
    }

    #[test]
    fn filter_matches_name_category_description() {
        let mut item = Item::new("Bolt Pistol", Category::Pistol, 5);
        item.description = Some("Reliable sidearm".to_string());
        assert!(item_matches(&item, "bolt"));
        assert!(item_matches(&item, "pistol"));
        assert!(item_matches(&item, "sidearm"));
        assert!(!item_matches(&item, "plasma"));
    }
}
