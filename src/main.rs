mod app;
mod bank;
mod config;
mod event;
mod session;
mod store;
mod ui;

use std::io;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
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

use app::{App, AppScreen};
use bank::Category;
use config::Config;
use event::{AppEvent, EventHandler};
use ui::components::progress_bar::ProgressBar;
use ui::components::question_view::QuestionView;
use ui::components::report_view::ReportView;
use ui::components::scoreboard::Scoreboard;
use ui::layout::{AppLayout, centered_rect};

#[derive(Parser)]
#[command(
    name = "quizr",
    version,
    about = "Terminal quiz trainer with timed questions and score tracking"
)]
struct Cli {
    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(short, long, help = "Profile the attempts belong to")]
    profile: Option<String>,

    #[arg(short, long, help = "Start directly in a category (info, proba, mathgen)")]
    category: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // CLI overrides land in the config before the App exists: the profile
    // keys the snapshot restore and the one-attempt guard.
    let mut config = Config::load().unwrap_or_default();
    let overridden = cli.profile.is_some() || cli.theme.is_some();
    if let Some(profile) = cli.profile {
        config.profile = profile;
    }
    if let Some(theme) = cli.theme {
        config.theme = theme;
    }
    config.normalize();
    if overridden {
        // Remember the choice for next launch; a read-only config dir only
        // loses that convenience.
        let _ = config.save();
    }

    let mut app = App::new(config)?;

    // Jump straight into a category unless a stored session already resumed.
    if let Some(ref name) = cli.category {
        if let Some(category) = Category::from_str(name) {
            if !app.has_session_in_progress() {
                app.start_session(category);
            }
        }
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(Duration::from_millis(200));

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
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
            AppEvent::Tick => app.on_tick(),
            AppEvent::Resize => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match app.screen {
        AppScreen::Menu => handle_menu_key(app, key),
        AppScreen::Question => handle_question_key(app, key),
        AppScreen::Report => handle_report_key(app, key),
        AppScreen::Scores => handle_scores_key(app, key),
    }
}

fn handle_menu_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Up | KeyCode::Char('k') => app.menu.prev(),
        KeyCode::Down | KeyCode::Char('j') => app.menu.next(),
        KeyCode::Enter => {
            if let Some(category) = app.menu.selected_category() {
                app.start_session(category);
            }
        }
        KeyCode::Char('r') => app.resume_session(),
        KeyCode::Char('s') => app.go_to_scores(),
        _ => {}
    }
}

fn handle_question_key(app: &mut App, key: KeyEvent) {
    match key.code {
        // The session stays in progress; the menu offers [r] to resume.
        KeyCode::Esc => app.go_to_menu(),
        KeyCode::Up | KeyCode::Char('k') => app.cursor_up(),
        KeyCode::Down | KeyCode::Char('j') => app.cursor_down(),
        KeyCode::Char(' ') => app.lock_selection(),
        KeyCode::Enter => app.submit_answer(),
        _ => {}
    }
}

fn handle_report_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.go_to_menu(),
        KeyCode::Up | KeyCode::Char('k') => app.scroll_report_up(),
        KeyCode::Down | KeyCode::Char('j') => app.scroll_report_down(),
        KeyCode::Char('s') => app.go_to_scores(),
        _ => {}
    }
}

fn handle_scores_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.go_to_menu(),
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    match app.screen {
        AppScreen::Menu => render_menu(frame, app),
        AppScreen::Question => render_question(frame, app),
        AppScreen::Report => render_report(frame, app),
        AppScreen::Scores => render_scores(frame, app),
    }
}

fn render_menu(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    let header_info = format!(" Profil : {}", app.config.profile);
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " quizr ",
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            &*header_info,
            Style::default().fg(colors.dim()).bg(colors.header_bg()),
        ),
    ]))
    .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, layout[0]);

    let menu_area = centered_rect(50, 80, layout[1]);
    frame.render_widget(&app.menu, menu_area);

    let footer_text = if app.has_session_in_progress() {
        " [Enter] Commencer  [r] Reprendre  [s] Scores  [q] Quitter "
    } else {
        " [Enter] Commencer  [s] Scores  [q] Quitter "
    };
    let footer = Paragraph::new(Line::from(Span::styled(
        footer_text,
        Style::default().fg(colors.dim()),
    )));
    frame.render_widget(footer, layout[2]);
}

fn render_question(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let Some(session) = app.state.session() else {
        return;
    };

    let app_layout = AppLayout::new(area);
    let question = session.current_question();

    let low_time = session.remaining_secs <= 10;
    let timer_color = if low_time { colors.error() } else { colors.header_fg() };
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            format!(
                " {} {} ",
                session.category.icon(),
                session.category.display_name()
            ),
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(
                "Question {}/{}",
                session.current_index + 1,
                session.total_questions()
            ),
            Style::default().fg(colors.dim()).bg(colors.header_bg()),
        ),
        Span::styled(
            format!("   ⏱ {}s", session.remaining_secs),
            Style::default()
                .fg(timer_color)
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
    ]))
    .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, app_layout.header);

    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(8),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(app_layout.main);

    let question_view = QuestionView::new(session, app.option_cursor, app.theme);
    frame.render_widget(question_view, main_layout[0]);

    let time_ratio = session.remaining_secs as f64 / question.time_limit_secs as f64;
    let mut time_bar = ProgressBar::new("Temps restant", time_ratio, app.theme);
    if low_time {
        time_bar = time_bar.fill_color(colors.error());
    }
    frame.render_widget(time_bar, main_layout[1]);

    let progress = ProgressBar::new("Progression", session.progress(), app.theme);
    frame.render_widget(progress, main_layout[2]);

    let footer = Paragraph::new(Line::from(Span::styled(
        " [↑/↓] Naviguer  [Espace] Sélectionner  [Entrée] Valider  [Esc] Menu ",
        Style::default().fg(colors.dim()),
    )));
    frame.render_widget(footer, app_layout.footer);
}

fn render_report(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let Some(report) = app.state.report() else {
        return;
    };

    let app_layout = AppLayout::new(area);
    let view_area = centered_rect(80, 100, app_layout.main);
    let view = ReportView::new(report, app.report_scroll, app.theme);
    frame.render_widget(view, view_area);

    let footer = Paragraph::new(Line::from(Span::styled(
        " [↑/↓] Corrigé  [s] Scores  [q] Menu ",
        Style::default().fg(colors.dim()),
    )));
    frame.render_widget(footer, app_layout.footer);
}

fn render_scores(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let app_layout = AppLayout::new(area);
    let board = Scoreboard::new(&app.attempts, app.theme);
    frame.render_widget(board, app_layout.main);

    let footer = Paragraph::new(Line::from(Span::styled(
        " [q] Menu ",
        Style::default().fg(colors.dim()),
    )));
    frame.render_widget(footer, app_layout.footer);
}
