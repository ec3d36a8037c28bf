use std::{io, thread, time::Duration};

use anyhow::{Context, Result};
use chrono::Local;
use crossterm::{
    cursor::Show,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use parklot_core::{Category, Level, ParkingLot, Vehicle};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, Borders, Cell, List, ListItem, ListState, Paragraph, Row, Table, TableState, Wrap,
    },
    Frame, Terminal,
};
use tokio::sync::mpsc;
use tracing::info;

const POLL_INTERVAL: Duration = Duration::from_millis(250);
const PAGE_SIZE: usize = 10;

#[derive(Debug, Clone)]
struct Theme {
    primary_fg: Color,
    accent: Color,
    muted: Color,
    selection_bg: Color,
    success: Color,
    danger: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary_fg: Color::White,
            accent: Color::Cyan,
            muted: Color::DarkGray,
            selection_bg: Color::DarkGray,
            success: Color::Green,
            danger: Color::Red,
        }
    }
}

/// Interactive dashboard over a parking lot.
pub struct ParklotApp {
    lot: ParkingLot,
    state: UiState,
    theme: Theme,
}

impl ParklotApp {
    pub fn new(lot: ParkingLot) -> Self {
        Self {
            lot,
            state: UiState::default(),
            theme: Theme::default(),
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        self.state.set_status(format!(
            "{} levels, {} spots",
            self.lot.levels().len(),
            self.lot.capacity()
        ));

        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
        terminal.hide_cursor()?;
        terminal.clear()?;

        let (event_tx, mut event_rx) = mpsc::channel::<Event>(128);
        spawn_input_thread(event_tx);

        let result = self.event_loop(&mut terminal, &mut event_rx).await;
        restore_terminal(&mut terminal)?;
        result
    }

    async fn event_loop<B: Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
        events: &mut mpsc::Receiver<Event>,
    ) -> Result<()> {
        loop {
            terminal.draw(|frame| self.draw(frame))?;
            if self.state.should_quit {
                break;
            }
            match events.recv().await {
                Some(Event::Key(key)) => self.handle_key(key),
                Some(_) => {}
                None => break,
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
            self.state.should_quit = true;
            return;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.state.should_quit = true,
            KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => self.move_level(1),
            KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => self.move_level(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_spot(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_spot(-1),
            KeyCode::PageDown => self.move_spot(PAGE_SIZE as isize),
            KeyCode::PageUp => self.move_spot(-(PAGE_SIZE as isize)),
            KeyCode::Home => self.state.spot_cursor = 0,
            KeyCode::End => {
                let total = self.current_level().map(Level::len).unwrap_or(0);
                self.state.spot_cursor = total.saturating_sub(1);
            }
            KeyCode::Char('c') => self.park_generated(Category::Car),
            KeyCode::Char('t') => self.park_generated(Category::Truck),
            KeyCode::Char('m') => self.park_generated(Category::Motorcycle),
            KeyCode::Enter | KeyCode::Char('d') => self.release_selected(),
            _ => {}
        }
    }

    fn current_level(&self) -> Option<&Level> {
        self.lot.levels().get(self.state.level_cursor)
    }

    fn move_level(&mut self, delta: isize) {
        let total = self.lot.levels().len();
        if total == 0 {
            return;
        }
        let next = (self.state.level_cursor as isize + delta).rem_euclid(total as isize);
        self.state.level_cursor = next as usize;
        self.state.spot_cursor = 0;
    }

    fn move_spot(&mut self, delta: isize) {
        let total = self.current_level().map(Level::len).unwrap_or(0);
        if total == 0 {
            self.state.spot_cursor = 0;
            return;
        }
        let next = (self.state.spot_cursor as isize + delta).clamp(0, total as isize - 1);
        self.state.spot_cursor = next as usize;
    }

    fn park_generated(&mut self, category: Category) {
        let vehicle = self.state.next_vehicle(category);
        match self.lot.allocate(&vehicle) {
            Some(location) => {
                if let Some(position) = self
                    .lot
                    .levels()
                    .iter()
                    .position(|level| level.floor() == location.floor)
                {
                    self.state.level_cursor = position;
                    self.state.spot_cursor = location.index - 1;
                }
                self.state
                    .set_status(format!("Parked {} at {location}", vehicle.plate()));
            }
            None => self.state.set_status(format!(
                "No free {category} spot for {}",
                vehicle.plate()
            )),
        }
    }

    fn release_selected(&mut self) {
        let plate = self
            .current_level()
            .and_then(|level| level.spots().get(self.state.spot_cursor))
            .and_then(|spot| spot.occupant())
            .map(|vehicle| vehicle.plate().to_string());
        let Some(plate) = plate else {
            self.state.set_status("Selected spot is empty".to_string());
            return;
        };
        match self.lot.release_plate(&plate) {
            Some((location, _)) => {
                info!(%plate, %location, "released from dashboard");
                self.state.set_status(format!("Released {plate} from {location}"));
            }
            None => self.state.set_status(format!("{plate} is not parked")),
        }
    }

    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.size();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(4),
            ])
            .split(area);

        self.render_summary(frame, chunks[0]);
        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
            .split(chunks[1]);
        self.render_levels(frame, body[0]);
        self.render_spots(frame, body[1]);
        self.render_status(frame, chunks[2]);
    }

    fn render_summary(&self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![Span::styled(
            "Free  ",
            Style::default()
                .fg(self.theme.accent)
                .add_modifier(Modifier::BOLD),
        )];
        for category in Category::ALL {
            spans.push(Span::styled(
                format!("{category}: {}  ", self.lot.available(category)),
                Style::default().fg(self.theme.primary_fg),
            ));
        }
        let paragraph = Paragraph::new(Line::from(spans))
            .block(Block::default().borders(Borders::ALL).title("Parking Lot"));
        frame.render_widget(paragraph, area);
    }

    fn render_levels(&self, frame: &mut Frame, area: Rect) {
        let items: Vec<ListItem> = self
            .lot
            .levels()
            .iter()
            .map(|level| {
                let counts: Vec<String> = Category::ALL
                    .iter()
                    .map(|category| {
                        format!(
                            "{} {}/{}",
                            initial(*category),
                            level.available(*category),
                            level.capacity(*category)
                        )
                    })
                    .collect();
                ListItem::new(format!("Level {:>3}  {}", level.floor(), counts.join("  ")))
            })
            .collect();

        let mut list_state = ListState::default();
        if !items.is_empty() {
            list_state.select(Some(self.state.level_cursor));
        }
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title("Levels"))
            .highlight_style(
                Style::default()
                    .bg(self.theme.selection_bg)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");
        frame.render_stateful_widget(list, area, &mut list_state);
    }

    fn render_spots(&mut self, frame: &mut Frame, area: Rect) {
        let title = self
            .current_level()
            .map(|level| format!("Level {} Spots", level.floor()))
            .unwrap_or_else(|| "Spots".to_string());
        let report = self.current_level().map(Level::report).unwrap_or_default();

        let rows: Vec<Row> = report
            .iter()
            .map(|spot| {
                let (status, color) = if spot.occupied {
                    ("Occupied", self.theme.danger)
                } else {
                    ("Available", self.theme.success)
                };
                let since = spot
                    .since
                    .map(|at| at.with_timezone(&Local).format("%H:%M:%S").to_string())
                    .unwrap_or_default();
                Row::new(vec![
                    Cell::from(spot.index.to_string()),
                    Cell::from(spot.category.to_string()),
                    Cell::from(Span::styled(status, Style::default().fg(color))),
                    Cell::from(spot.plate.clone().unwrap_or_default()),
                    Cell::from(Span::styled(since, Style::default().fg(self.theme.muted))),
                ])
            })
            .collect();

        let widths = [
            Constraint::Length(5),
            Constraint::Length(11),
            Constraint::Length(10),
            Constraint::Min(8),
            Constraint::Length(9),
        ];
        let table = Table::new(rows, widths)
            .header(
                Row::new(vec!["Spot", "Category", "Status", "Plate", "Since"])
                    .style(Style::default().fg(self.theme.accent).add_modifier(Modifier::BOLD)),
            )
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(Style::default().bg(self.theme.selection_bg))
            .highlight_symbol("▶ ");

        if report.is_empty() {
            self.state.table.select(None);
        } else {
            self.state.table.select(Some(self.state.spot_cursor));
        }
        frame.render_stateful_widget(table, area, &mut self.state.table);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Status");
        let help = Line::from(Span::styled(
            "c/t/m park car/truck/motorcycle • Enter release • Tab level • q quit",
            Style::default().fg(self.theme.muted),
        ));
        let paragraph = Paragraph::new(vec![Line::from(self.state.status.clone()), help])
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }
}

fn restore_terminal<B: Backend + io::Write>(terminal: &mut Terminal<B>) -> Result<()> {
    // Undo both steps even when the first one fails.
    let raw = disable_raw_mode().context("failed to disable raw mode");
    let screen = execute!(terminal.backend_mut(), LeaveAlternateScreen, Show)
        .context("failed to leave alternate screen");
    raw.and(screen)
}

/// Forward redraw-worthy terminal events until the receiver goes away.
fn spawn_input_thread(sender: mpsc::Sender<Event>) {
    thread::spawn(move || {
        while !sender.is_closed() {
            match event::poll(POLL_INTERVAL) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(_) => break,
            }
            let Ok(event) = event::read() else {
                break;
            };
            if needs_redraw(&event) && sender.blocking_send(event).is_err() {
                break;
            }
        }
    });
}

fn needs_redraw(event: &Event) -> bool {
    match event {
        Event::Key(key) => key.kind == KeyEventKind::Press,
        Event::Resize(_, _) => true,
        _ => false,
    }
}

struct UiState {
    level_cursor: usize,
    spot_cursor: usize,
    table: TableState,
    status: String,
    should_quit: bool,
    issued: u32,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            level_cursor: 0,
            spot_cursor: 0,
            table: TableState::default(),
            status: "Ready".to_string(),
            should_quit: false,
            issued: 0,
        }
    }
}

impl UiState {
    fn set_status(&mut self, message: String) {
        self.status = message;
    }

    fn next_vehicle(&mut self, category: Category) -> Vehicle {
        self.issued += 1;
        Vehicle::new(format!("{}-{:04}", initial(category), self.issued), category)
    }
}

fn initial(category: Category) -> char {
    match category {
        Category::Car => 'C',
        Category::Truck => 'T',
        Category::Motorcycle => 'M',
    }
}
