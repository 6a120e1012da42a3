use chrono::NaiveDate;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::notes::NoteColor;
use crate::theme;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FormField {
    Title,
    Date,
    StartTime,
    EndTime,
    Location,
    Participants,
    Notes,
    Color,
}

impl FormField {
    pub fn next(&self) -> Self {
        match self {
            FormField::Title => FormField::Date,
            FormField::Date => FormField::StartTime,
            FormField::StartTime => FormField::EndTime,
            FormField::EndTime => FormField::Location,
            FormField::Location => FormField::Participants,
            FormField::Participants => FormField::Notes,
            FormField::Notes => FormField::Color,
            FormField::Color => FormField::Title,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            FormField::Title => FormField::Color,
            FormField::Date => FormField::Title,
            FormField::StartTime => FormField::Date,
            FormField::EndTime => FormField::StartTime,
            FormField::Location => FormField::EndTime,
            FormField::Participants => FormField::Location,
            FormField::Notes => FormField::Participants,
            FormField::Color => FormField::Notes,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NoteFormState {
    pub title: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub location: String,
    pub participants: String,
    pub notes: String,
    pub color_index: usize,
    pub active_field: FormField,
}

impl NoteFormState {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            title: String::new(),
            date: date.format("%Y-%m-%d").to_string(),
            start_time: "09:00".to_string(),
            end_time: "10:00".to_string(),
            location: String::new(),
            participants: String::new(),
            notes: String::new(),
            color_index: 0,
            active_field: FormField::Title,
        }
    }

    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").ok()
    }

    pub fn parsed_start_time(&self) -> Option<chrono::NaiveTime> {
        chrono::NaiveTime::parse_from_str(&self.start_time, "%H:%M").ok()
    }

    pub fn parsed_end_time(&self) -> Option<chrono::NaiveTime> {
        chrono::NaiveTime::parse_from_str(&self.end_time, "%H:%M").ok()
    }

    /// Comma-separated contacts, trimmed, empties dropped. Order kept,
    /// duplicates allowed.
    pub fn parsed_participants(&self) -> Vec<String> {
        self.participants
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Index 0 means no color tag.
    pub fn selected_color(&self) -> Option<NoteColor> {
        if self.color_index == 0 {
            None
        } else {
            NoteColor::ALL.get(self.color_index - 1).copied()
        }
    }

    pub fn input_char(&mut self, c: char) {
        match self.active_field {
            FormField::Title => self.title.push(c),
            FormField::Date => self.date.push(c),
            FormField::StartTime => self.start_time.push(c),
            FormField::EndTime => self.end_time.push(c),
            FormField::Location => self.location.push(c),
            FormField::Participants => self.participants.push(c),
            FormField::Notes => self.notes.push(c),
            FormField::Color => {}
        }
    }

    pub fn backspace(&mut self) {
        match self.active_field {
            FormField::Title => { self.title.pop(); }
            FormField::Date => { self.date.pop(); }
            FormField::StartTime => { self.start_time.pop(); }
            FormField::EndTime => { self.end_time.pop(); }
            FormField::Location => { self.location.pop(); }
            FormField::Participants => { self.participants.pop(); }
            FormField::Notes => { self.notes.pop(); }
            FormField::Color => {}
        }
    }

    pub fn next_color(&mut self) {
        self.color_index = (self.color_index + 1) % (NoteColor::ALL.len() + 1);
    }

    /// The body is the only required text; times may be blank (all day)
    /// but must parse when present.
    pub fn is_valid(&self) -> bool {
        !self.notes.is_empty()
            && self.parsed_date().is_some()
            && (self.start_time.is_empty() || self.parsed_start_time().is_some())
            && (self.end_time.is_empty() || self.parsed_end_time().is_some())
    }
}

pub struct NoteForm;

impl NoteForm {
    pub fn render(frame: &mut Frame, area: Rect, state: &NoteFormState) {
        let t = theme::current();

        // Center the form popup
        let form_w = area.width.min(54).max(32);
        let form_h = area.height.min(16).max(12);
        let x = area.x + (area.width.saturating_sub(form_w)) / 2;
        let y = area.y + (area.height.saturating_sub(form_h)) / 2;
        let form_area = Rect::new(x, y, form_w, form_h);

        frame.render_widget(Clear, form_area);

        let block = Block::default()
            .title(" New Meeting Note ")
            .title_style(
                Style::default()
                    .fg(ratatui::style::Color::Green)
                    .add_modifier(Modifier::BOLD),
            )
            .borders(Borders::ALL)
            .border_style(Style::default().fg(ratatui::style::Color::Green));

        let inner = block.inner(form_area);
        frame.render_widget(block, form_area);

        let rows = Layout::vertical([
            Constraint::Length(1), // title
            Constraint::Length(1), // date
            Constraint::Length(1), // start time
            Constraint::Length(1), // end time
            Constraint::Length(1), // location
            Constraint::Length(1), // participants
            Constraint::Length(1), // notes
            Constraint::Length(1), // color
            Constraint::Length(1), // spacer
            Constraint::Length(1), // help
            Constraint::Min(0),
        ])
        .split(inner);

        render_field(frame, rows[0], "Title:", &state.title, state.active_field == FormField::Title);
        render_field(frame, rows[1], "Date:", &state.date, state.active_field == FormField::Date);
        render_field(frame, rows[2], "Start:", &state.start_time, state.active_field == FormField::StartTime);
        render_field(frame, rows[3], "End:", &state.end_time, state.active_field == FormField::EndTime);
        render_field(frame, rows[4], "Where:", &state.location, state.active_field == FormField::Location);
        render_field(frame, rows[5], "Who:", &state.participants, state.active_field == FormField::Participants);
        render_field(frame, rows[6], "Notes:", &state.notes, state.active_field == FormField::Notes);

        let color_active = state.active_field == FormField::Color;
        match state.selected_color() {
            Some(color) => {
                let label_span = Span::styled(format!("{:<7}", "Color:"), t.dim);
                let swatch = Span::styled("  ", Style::default().bg(color.as_color()));
                let name = Span::styled(
                    format!(" {}", color.label()),
                    if color_active {
                        Style::default().fg(ratatui::style::Color::Cyan)
                    } else {
                        Style::default()
                    },
                );
                frame.render_widget(
                    Paragraph::new(Line::from(vec![label_span, swatch, name])),
                    rows[7],
                );
            }
            None => render_field(frame, rows[7], "Color:", "none", color_active),
        }

        let help = Line::from(vec![
            Span::styled("Tab", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(":Next ", t.dim),
            Span::styled("Space", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(":Color ", t.dim),
            Span::styled("Enter", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(":Save ", t.dim),
            Span::styled("Esc", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(":Cancel", t.dim),
        ]);
        frame.render_widget(Paragraph::new(help), rows[9]);
    }
}

fn render_field(frame: &mut Frame, area: Rect, label: &str, value: &str, active: bool) {
    let cursor = if active { "_" } else { "" };

    let style = if active {
        Style::default().fg(ratatui::style::Color::Cyan)
    } else {
        Style::default()
    };

    let spans = vec![
        Span::styled(format!("{:<7}", label), theme::current().dim),
        Span::styled(format!("{}{}", value, cursor), style),
    ];

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
