mod app;
mod bridge;
mod config;
mod engine;
mod event;
mod store;
mod ui;

use std::io;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::event::{
    DisableBracketedPaste, EnableBracketedPaste, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};

use app::App;
use event::{AppEvent, EventHandler};
use store::json_store::JsonStore;
use ui::components::pet_panel::PetPanel;
use ui::components::scratchpad::ScratchpadView;
use ui::components::xp_bar::XpBar;

#[derive(Parser)]
#[command(
    name = "codepet",
    version,
    about = "Terminal companion pet that levels up as you type"
)]
struct Cli {
    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(long, help = "Directory for the profile file")]
    data_dir: Option<std::path::PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = config::Config::load().unwrap_or_default();
    if let Some(theme_name) = cli.theme {
        config.theme = theme_name;
    }
    let store = match cli.data_dir {
        Some(dir) => JsonStore::with_base_dir(dir).ok(),
        None => JsonStore::new().ok(),
    };
    let mut app = App::with_store(config, store);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(Duration::from_millis(100));

    let result = run_app(&mut terminal, &mut app, &events);

    // Best-effort final snapshot; abrupt teardown may skip it.
    app.flush();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableBracketedPaste, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Paste(text) => {
                let count = text.chars().filter(|c| *c != '\r').count() as u64;
                app.pad.push_str(&text);
                app.on_text_change(count, Instant::now());
            }
            AppEvent::Tick => app.on_tick(Instant::now()),
            AppEvent::Resize(_, _) => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Ignore Release/Repeat to avoid inflating the character count.
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') => app.should_quit = true,
            KeyCode::Char('p') => app.toggle_panel(),
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Esc => app.should_quit = true,
        KeyCode::Backspace => {
            // Deletions insert nothing, so no notification.
            app.pad.backspace();
        }
        KeyCode::Enter => {
            app.pad.newline();
            app.on_text_change(1, Instant::now());
        }
        KeyCode::Char(ch) => {
            app.pad.push_char(ch);
            app.on_text_change(1, Instant::now());
        }
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    let header_info = format!(
        " Level {} | {} XP | {} chars this session",
        app.xp.level(),
        app.xp.total_xp(),
        app.pad.session_chars,
    );
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " codepet ",
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            header_info,
            Style::default()
                .fg(colors.text_dim())
                .bg(colors.header_bg()),
        ),
    ]))
    .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, layout[0]);

    render_body(frame, app, layout[1]);

    let footer = Paragraph::new(Line::from(Span::styled(
        " [Ctrl+P] Toggle pet  [Esc] Quit ",
        Style::default().fg(colors.text_dim()),
    )));
    frame.render_widget(footer, layout[2]);
}

fn render_body(frame: &mut ratatui::Frame, app: &App, area: ratatui::layout::Rect) {
    let show_panel = app.bridge.is_attached() && area.width >= 50;

    let constraints = if show_panel {
        vec![Constraint::Min(20), Constraint::Length(26)]
    } else {
        vec![Constraint::Min(20)]
    };
    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    frame.render_widget(ScratchpadView::new(&app.pad, app.theme), body[0]);

    if show_panel {
        if let Some(display) = app.bridge.surface() {
            let sidebar = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(9), Constraint::Length(3)])
                .split(body[1]);

            frame.render_widget(PetPanel::new(display, app.theme), sidebar[0]);
            // Bar tracks what the surface was told, not the accumulator:
            // the panel is a message consumer like any other.
            let ratio = (display.experience % 100) as f64 / 100.0;
            frame.render_widget(XpBar::new(ratio, app.theme), sidebar[1]);
        }
    }
}
