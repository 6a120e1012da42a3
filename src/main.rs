mod app;
mod components;
mod event;
mod notes;
mod theme;
mod tui;

use std::time::Duration;

use app::{App, InputMode, ViewMode};
use chrono::Local;
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::layout::{Constraint, Layout, Rect};
use tracing_subscriber::EnvFilter;

use notes::NoteStore;

fn main() -> Result<()> {
    color_eyre::install()?;
    let _log_guard = init_logging();

    let mut app = App::new()?;

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = tui::restore();
        original_hook(panic_info);
    }));

    let mut terminal = tui::init()?;
    let result = run(&mut terminal, &mut app);
    tui::restore()?;
    result
}

/// Logs go to a file in the data directory so they never write over the
/// alternate screen.
fn init_logging() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let dir = NoteStore::default_dir()?;
    std::fs::create_dir_all(&dir).ok()?;
    let appender = tracing_appender::rolling::never(dir, "agenda-tui.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Some(guard)
}

fn run(terminal: &mut tui::Tui, app: &mut App) -> Result<()> {
    while app.running {
        app.tick();

        terminal.draw(|frame| {
            let area = frame.area();
            let w = area.width;

            // Main layout: content + status bar
            let layout = Layout::vertical([
                Constraint::Min(1),
                Constraint::Length(1),
            ])
            .split(area);

            let content_area = layout[0];

            match app.view_mode {
                ViewMode::Month => render_month_layout(frame, content_area, app, w),
                ViewMode::Day => render_day_layout(frame, content_area, app),
            }

            // Note form overlay
            if let Some(ref form) = app.form_state {
                components::NoteForm::render(frame, area, form);
            }

            // Detail popup overlay
            if app.show_detail {
                if let Some(note) = app.day_notes.get(app.day_selected) {
                    components::day_view::render_detail_popup(frame, area, note);
                }
            }

            if app.show_help {
                render_help(frame, area);
            }

            render_status_bar(frame, layout[1], app, w);
        })?;

        if let Some(key) = event::next_key_event(Duration::from_millis(100))? {
            // Clear status message on any key
            app.status_message = None;

            // Help overlay takes priority
            if app.show_help {
                if key.code == KeyCode::Esc || key.code == KeyCode::Char('?') {
                    app.show_help = false;
                }
                continue;
            }

            // Detail popup takes priority
            if app.show_detail {
                if key.code == KeyCode::Esc {
                    app.close_detail();
                }
                continue;
            }

            match app.input_mode {
                InputMode::Form => handle_form_input(app, key.code),
                InputMode::Normal => handle_normal_input(app, key.code, key.modifiers),
            }
        }
    }

    Ok(())
}

fn handle_normal_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    match (code, modifiers) {
        (KeyCode::Char('q'), _) | (KeyCode::Char('c'), KeyModifiers::CONTROL) => {
            app.running = false;
        }
        (KeyCode::Char('1'), _) => app.view_mode = ViewMode::Month,
        (KeyCode::Char('2'), _) => app.view_mode = ViewMode::Day,
        (KeyCode::Char('t'), _) => app.go_to_today(),
        (KeyCode::Char('T'), _) => app.toggle_theme(),
        (KeyCode::Char('u'), _) => {
            app.refresh_reminders(Local::now());
            app.status_message = Some("Reminders re-checked".to_string());
        }
        (KeyCode::Char('n'), _) => app.open_note_form(),
        (KeyCode::Char('d'), _) => app.delete_selected_note(),
        (KeyCode::Enter, _) => app.open_detail(),
        (KeyCode::Left, _) | (KeyCode::Char('h'), _) => app.prev_day(),
        (KeyCode::Right, _) | (KeyCode::Char('l'), _) => app.next_day(),
        (KeyCode::Up, _) | (KeyCode::Char('k'), _) => app.select_prev(),
        (KeyCode::Down, _) | (KeyCode::Char('j'), _) => app.select_next(),
        (KeyCode::Char('['), _) => app.prev_month(),
        (KeyCode::Char(']'), _) => app.next_month(),
        (KeyCode::Char('?'), _) => app.show_help = true,
        _ => {}
    }
}

fn handle_form_input(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Esc => app.close_note_form(),
        KeyCode::Enter => app.submit_note_form(),
        KeyCode::Tab => app.form_tab(),
        KeyCode::BackTab => app.form_backtab(),
        KeyCode::Backspace => app.form_backspace(),
        KeyCode::Char(' ') => {
            // Space cycles the color tag when that field is active
            let on_color = app
                .form_state
                .as_ref()
                .map(|f| f.active_field == components::note_form::FormField::Color)
                .unwrap_or(false);
            if on_color {
                app.form_next_color();
            } else {
                app.form_input_char(' ');
            }
        }
        KeyCode::Char(c) => app.form_input_char(c),
        _ => {}
    }
}

fn render_month_layout(frame: &mut ratatui::Frame, area: Rect, app: &App, total_width: u16) {
    if total_width < 60 {
        components::MonthView::render(
            frame,
            area,
            app.selected_date,
            app.today,
            &app.days_with_notes,
        );
    } else {
        let month_w = if total_width >= 100 { 44 } else { 30 };
        let content = Layout::horizontal([
            Constraint::Length(month_w),
            Constraint::Min(20),
        ])
        .split(area);

        components::MonthView::render(
            frame,
            content[0],
            app.selected_date,
            app.today,
            &app.days_with_notes,
        );

        let right = Layout::vertical([
            Constraint::Min(8),
            Constraint::Length(8),
        ])
        .split(content[1]);

        components::DayView::render(
            frame,
            right[0],
            app.selected_date,
            &app.day_notes,
            app.day_selected,
            app.day_scroll,
        );
        components::ReminderList::render(frame, right[1], &app.upcoming, Local::now());
    }
}

fn render_day_layout(frame: &mut ratatui::Frame, area: Rect, app: &App) {
    let rows = Layout::vertical([
        Constraint::Min(8),
        Constraint::Length(8),
    ])
    .split(area);

    components::DayView::render(
        frame,
        rows[0],
        app.selected_date,
        &app.day_notes,
        app.day_selected,
        app.day_scroll,
    );
    components::ReminderList::render(frame, rows[1], &app.upcoming, Local::now());
}

fn render_status_bar(frame: &mut ratatui::Frame, area: Rect, app: &App, w: u16) {
    use ratatui::text::{Line, Span};
    use ratatui::widgets::Paragraph;

    let t = theme::current();
    let w = w as usize;

    let mode_str = match app.view_mode {
        ViewMode::Month => "[1]Month",
        ViewMode::Day => "[2]Day",
    };

    let focus_indicator = match app.input_mode {
        InputMode::Form => " [New Note]",
        InputMode::Normal => "",
    };

    // Show status message if present, otherwise show context-aware hints
    let right_text = if let Some(ref msg) = app.status_message {
        format!(" {} ", msg)
    } else if w >= 90 {
        " hjkl:Nav [/]:Mon t:Today Enter:Detail n:New d:Del T:Theme u:Remind ?:Help q:Quit"
            .to_string()
    } else if w >= 50 {
        " jk:Select Enter:Detail n:New d:Del q:Quit".to_string()
    } else {
        " ?:Help q:Quit".to_string()
    };

    let left = format!(" {}{} ", mode_str, focus_indicator);
    let padding_len = w.saturating_sub(left.len() + right_text.len());
    let padding = " ".repeat(padding_len);

    let line = Line::from(vec![
        Span::styled(left, t.status),
        Span::styled(padding, t.status),
        Span::styled(right_text, t.status),
    ]);

    let bar = Paragraph::new(line).style(t.status);
    frame.render_widget(bar, area);
}

fn render_help(frame: &mut ratatui::Frame, area: Rect) {
    use ratatui::style::{Color, Modifier, Style};
    use ratatui::text::{Line, Span};
    use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

    let t = theme::current();

    let popup_w = area.width.min(52).max(30);
    let popup_h = area.height.min(22).max(12);
    let x = area.x + (area.width.saturating_sub(popup_w)) / 2;
    let y = area.y + (area.height.saturating_sub(popup_h)) / 2;
    let popup_area = Rect::new(x, y, popup_w, popup_h);

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(" Keybindings ")
        .title_style(Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let key_style = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let desc_style = Style::default();
    let section_style = Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED);

    let lines = vec![
        Line::from(Span::styled("Navigation", section_style)),
        Line::from(vec![
            Span::styled("  h/l ", key_style),
            Span::styled("or ", t.dim),
            Span::styled("\u{2190}/\u{2192}  ", key_style),
            Span::styled("Previous/next day", desc_style),
        ]),
        Line::from(vec![
            Span::styled("  j/k ", key_style),
            Span::styled("or ", t.dim),
            Span::styled("\u{2191}/\u{2193}  ", key_style),
            Span::styled("Select note in day list", desc_style),
        ]),
        Line::from(vec![
            Span::styled("  [/]       ", key_style),
            Span::styled("Previous/next month", desc_style),
        ]),
        Line::from(vec![
            Span::styled("  t         ", key_style),
            Span::styled("Jump to today", desc_style),
        ]),
        Line::from(""),
        Line::from(Span::styled("Views", section_style)),
        Line::from(vec![
            Span::styled("  1/2       ", key_style),
            Span::styled("Month / Day view", desc_style),
        ]),
        Line::from(""),
        Line::from(Span::styled("Actions", section_style)),
        Line::from(vec![
            Span::styled("  Enter     ", key_style),
            Span::styled("View note details", desc_style),
        ]),
        Line::from(vec![
            Span::styled("  n         ", key_style),
            Span::styled("Create new meeting note", desc_style),
        ]),
        Line::from(vec![
            Span::styled("  d         ", key_style),
            Span::styled("Delete selected note", desc_style),
        ]),
        Line::from(vec![
            Span::styled("  T         ", key_style),
            Span::styled("Toggle light/dark theme", desc_style),
        ]),
        Line::from(vec![
            Span::styled("  u         ", key_style),
            Span::styled("Re-check reminders now", desc_style),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  q", key_style),
            Span::styled(" / ", t.dim),
            Span::styled("Esc     ", key_style),
            Span::styled("Quit / close popup", desc_style),
        ]),
    ];

    let para = Paragraph::new(lines).wrap(Wrap { trim: false });
    frame.render_widget(para, inner);
}
