use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use numlist_config::Config;
use numlist_engine::editing::{EditOutcome, ListEditor, ListType};
use numlist_engine::host::{LayoutMetrics, MemoryHost};
use numlist_engine::{EditorHost, Point};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use std::{
    env,
    fs::OpenOptions,
    io::{Stdout, stdout},
    path::{Path, PathBuf},
    process,
};

struct App {
    editor: ListEditor<MemoryHost>,
    /// First visible row of the document.
    scroll: u16,
    /// Outcome of the last edit, for the status line.
    last_edit: Option<EditOutcome>,
}

impl App {
    fn new(config: &Config, text_width: u16) -> Result<Self> {
        let metrics = fit_to_width(&config.layout, text_width);
        let host = MemoryHost::new(metrics)?;
        Ok(Self {
            editor: ListEditor::new(host, config.list.clone()),
            scroll: 0,
            last_edit: None,
        })
    }

    /// Returns false when the user asked to quit.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        let control = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => return false,
            KeyCode::Char('q') if control => return false,
            KeyCode::Char(c) if !control => {
                let mut buf = [0u8; 4];
                self.last_edit = Some(self.editor.insert_text(c.encode_utf8(&mut buf)));
            }
            KeyCode::Enter => self.last_edit = Some(self.editor.press_return()),
            KeyCode::Backspace => self.last_edit = Some(self.editor.backspace()),
            KeyCode::Left => self.editor.move_left(),
            KeyCode::Right => self.editor.move_right(),
            KeyCode::Up => self.editor.move_up(),
            KeyCode::Down => self.editor.move_down(),
            _ => {}
        }
        true
    }

    /// Caret position in cells, relative to the document's first row.
    fn caret_cell(&self) -> (u16, u16) {
        let host = self.editor.host();
        to_cell(host.metrics(), host.point_for_offset(host.caret_offset()))
    }

    /// Keep the caret row inside a viewport `height` rows tall.
    fn scroll_to_caret(&mut self, height: u16) {
        let (_, row) = self.caret_cell();
        if row < self.scroll {
            self.scroll = row;
        } else if height > 0 && row >= self.scroll + height {
            self.scroll = row + 1 - height;
        }
    }

    fn status(&self) -> String {
        let tracker = self.editor.tracker();
        let list_type = match tracker.list_type() {
            ListType::None => "plain",
            ListType::Text => "left list",
            ListType::Numbered => "numbered",
        };
        let suppressed = match self.last_edit {
            Some(EditOutcome::Suppressed) => " | return swallowed",
            _ => "",
        };
        format!(
            "{list_type} | {} items | offset {}{suppressed}",
            tracker.registry().len(),
            self.editor.host().caret_offset(),
        )
    }
}

/// Host metrics with the wrap width set so rows fit `text_width` cells.
fn fit_to_width(layout: &LayoutMetrics, text_width: u16) -> LayoutMetrics {
    let columns = f64::from(text_width.saturating_sub(1).max(1));
    LayoutMetrics {
        wrap_width: columns * layout.char_width + 2.0 * layout.line_fragment_padding,
        ..layout.clone()
    }
}

/// Map a host point to a (column, row) cell: one character wide, one line high.
fn to_cell(metrics: &LayoutMetrics, point: Point) -> (u16, u16) {
    let column = (point.x - metrics.origin.x) / metrics.char_width;
    let row = (point.y - metrics.origin.y) / metrics.line_height;
    (
        column.round().clamp(0.0, f64::from(u16::MAX)) as u16,
        row.round().clamp(0.0, f64::from(u16::MAX)) as u16,
    )
}

fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(log::LevelFilter::Warn).parse_default_env();

    if let Some(path) = log_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder.init();
    Ok(())
}

fn load_config(args: &[String]) -> Config {
    let program = args.first().map(String::as_str).unwrap_or("numlist-cli");

    let loaded = match args {
        [_] => Config::load(),
        [_, path] => match Config::load_from_path(PathBuf::from(path)) {
            Ok(None) => {
                eprintln!("Error: Config file '{path}' not found");
                process::exit(1);
            }
            other => other,
        },
        _ => {
            eprintln!("Usage: {program} [config-file]");
            process::exit(1);
        }
    };

    match loaded {
        Ok(Some(config)) => config,
        Ok(None) => Config::default(),
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            eprintln!("Usage: {program} [config-file]");
            process::exit(1);
        }
    }
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let config = load_config(&args);

    init_logging(config.log_file.as_deref())?;
    log::info!("numlist starting up");

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let width = terminal.size()?.width.saturating_sub(2);
    let res = App::new(&config, width).and_then(|mut app| run_app(&mut terminal, &mut app));

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
            && !app.handle_key(key)
        {
            return Ok(());
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)].as_ref())
        .split(f.area());

    let block = Block::default().borders(Borders::ALL).title("numlist");
    let inner = block.inner(chunks[0]);
    f.render_widget(block, chunks[0]);

    app.scroll_to_caret(inner.height);
    draw_document(f, app, inner);

    let (column, row) = app.caret_cell();
    if row >= app.scroll && row - app.scroll < inner.height && column < inner.width {
        f.set_cursor_position((inner.x + column, inner.y + row - app.scroll));
    }

    let help = Line::from(vec![
        Span::styled(app.status(), Style::default().fg(Color::Yellow)),
        Span::raw(" | type \"1. \" to start a list | Esc/Ctrl-Q: Quit"),
    ]);
    f.render_widget(Paragraph::new(help), chunks[1]);
}

fn draw_document(f: &mut Frame, app: &App, area: Rect) {
    let host = app.editor.host();
    let metrics = host.metrics();
    let text = host.text_string();
    let visible = |row: u16| row >= app.scroll && row - app.scroll < area.height;
    let buf = f.buffer_mut();

    for line in host.visual_lines() {
        let (column, row) = to_cell(metrics, line.origin);
        if !visible(row) || column >= area.width {
            continue;
        }
        let content = text.get(line.range.clone()).unwrap_or_default();
        buf.set_stringn(
            area.x + column,
            area.y + row - app.scroll,
            content,
            usize::from(area.width - column),
            Style::default(),
        );
    }

    // Labels are right-aligned against the edge of their frame, next to the
    // text they number.
    for (_, label) in host.labels() {
        let frame = label.frame;
        let (right, row) = to_cell(metrics, Point::new(frame.max_x(), frame.y));
        let prefix = label.text.trim_start();
        let width = u16::try_from(prefix.chars().count()).unwrap_or(u16::MAX);
        let left = right.saturating_sub(width);
        if !visible(row) || left >= area.width {
            continue;
        }
        buf.set_stringn(
            area.x + left,
            area.y + row - app.scroll,
            prefix,
            usize::from(area.width - left),
            Style::default().fg(Color::Cyan),
        );
    }
}
