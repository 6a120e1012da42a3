use chrono::{DateTime, Local, NaiveTime};
use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Delivery channel tag for a reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderChannel {
    Email,
    Notification,
    Custom,
}

/// Fixed display palette for note tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteColor {
    Blue,
    Green,
    Yellow,
    Red,
    Purple,
    Teal,
}

impl NoteColor {
    pub const ALL: [NoteColor; 6] = [
        NoteColor::Blue,
        NoteColor::Green,
        NoteColor::Yellow,
        NoteColor::Red,
        NoteColor::Purple,
        NoteColor::Teal,
    ];

    pub fn as_color(&self) -> Color {
        match self {
            NoteColor::Blue => Color::Blue,
            NoteColor::Green => Color::Green,
            NoteColor::Yellow => Color::Yellow,
            NoteColor::Red => Color::Red,
            NoteColor::Purple => Color::Magenta,
            NoteColor::Teal => Color::Cyan,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            NoteColor::Blue => "blue",
            NoteColor::Green => "green",
            NoteColor::Yellow => "yellow",
            NoteColor::Red => "red",
            NoteColor::Purple => "purple",
            NoteColor::Teal => "teal",
        }
    }
}

/// Recurrence is a display label only. It is never expanded into
/// additional note instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrencePattern {
    Daily,
    Weekly,
    Biweekly,
    Monthly,
}

impl RecurrencePattern {
    pub fn label(&self) -> &'static str {
        match self {
            RecurrencePattern::Daily => "Daily",
            RecurrencePattern::Weekly => "Weekly",
            RecurrencePattern::Biweekly => "Every 2 weeks",
            RecurrencePattern::Monthly => "Monthly",
        }
    }
}

/// An absolute reminder time plus its delivery channel. The time is not
/// validated against the note's start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReminderSpec {
    pub time: DateTime<Local>,
    pub channel: ReminderChannel,
}

/// One scheduled meeting note. `id` is assigned at creation and is the
/// only identity used for deletion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetingNote {
    #[serde(default = "generate_id")]
    pub id: String,
    pub date: DateTime<Local>,
    pub note: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub start_time: Option<NaiveTime>,
    #[serde(default)]
    pub end_time: Option<NaiveTime>,
    #[serde(default)]
    pub participants: Vec<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub color: Option<NoteColor>,
    #[serde(default)]
    pub recurring: Option<RecurrencePattern>,
    #[serde(default)]
    pub reminders: Vec<ReminderSpec>,
}

fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

impl MeetingNote {
    pub fn new(date: DateTime<Local>, note: impl Into<String>) -> Self {
        Self {
            id: generate_id(),
            date,
            note: note.into(),
            title: None,
            start_time: None,
            end_time: None,
            participants: Vec::new(),
            location: None,
            color: None,
            recurring: None,
            reminders: Vec::new(),
        }
    }

    /// Title if set, otherwise the first line of the body.
    pub fn display_title(&self) -> &str {
        match self.title.as_deref() {
            Some(t) if !t.is_empty() => t,
            _ => self.note.lines().next().unwrap_or(""),
        }
    }

    /// The note's start as a concrete instant: its day plus `start_time`,
    /// or midnight when no start time is set.
    pub fn start_instant(&self) -> DateTime<Local> {
        match self.start_time {
            Some(t) => self
                .date
                .date_naive()
                .and_time(t)
                .and_local_timezone(Local)
                .single()
                .unwrap_or(self.date),
            None => self
                .date
                .date_naive()
                .and_hms_opt(0, 0, 0)
                .and_then(|dt| dt.and_local_timezone(Local).single())
                .unwrap_or(self.date),
        }
    }

    pub fn time_display(&self) -> String {
        match (self.start_time, self.end_time) {
            (Some(s), Some(e)) => format!("{} - {}", s.format("%H:%M"), e.format("%H:%M")),
            (Some(s), None) => s.format("%H:%M").to_string(),
            _ => "All day".to_string(),
        }
    }
}
