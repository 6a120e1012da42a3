use std::collections::HashSet;
use std::time::{Duration as StdDuration, Instant};

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, TimeZone};
use color_eyre::Result;
use tracing::{error, info};

use crate::components::note_form::NoteFormState;
use crate::notes::{
    query, reminder, MeetingNote, NoteStore, RecurrencePattern, ReminderChannel, ReminderSpec,
    ReminderWindow,
};
use crate::theme::{self, Theme, ThemeMode, ThemePreference};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewMode {
    Month,
    Day,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputMode {
    Normal,
    Form,
}

/// How often reminders are re-evaluated while the app runs. The check
/// rides the event-loop poll tick.
const REMINDER_RECHECK: StdDuration = StdDuration::from_secs(60 * 60);

/// Rows kept visible around the day-list selection.
const DAY_VISIBLE_ROWS: usize = 12;

pub struct App {
    pub running: bool,
    pub view_mode: ViewMode,
    pub input_mode: InputMode,
    pub selected_date: NaiveDate,
    pub today: NaiveDate,
    /// The authoritative collection. Every mutation persists it whole.
    pub notes: Vec<MeetingNote>,
    /// Snapshot of the selected day's notes; deletion indexes resolve
    /// against this view, never against `notes` directly.
    pub day_notes: Vec<MeetingNote>,
    pub days_with_notes: HashSet<u32>,
    pub upcoming: Vec<MeetingNote>,
    pub day_selected: usize,
    pub day_scroll: usize,
    pub show_help: bool,
    pub show_detail: bool,
    pub status_message: Option<String>,
    pub form_state: Option<NoteFormState>,
    pub theme_mode: ThemeMode,
    fired: HashSet<String>,
    store: NoteStore,
    prefs: ThemePreference,
    last_reminder_check: Instant,
}

impl App {
    pub fn new() -> Result<Self> {
        let store = NoteStore::new()?;
        let prefs = ThemePreference::at(store.dir().clone());
        Ok(Self::from_parts(store, prefs))
    }

    fn from_parts(store: NoteStore, prefs: ThemePreference) -> Self {
        let today = Local::now().date_naive();

        let mut notes = store.load();
        if notes.is_empty() {
            notes = seed_notes(today);
            if let Err(err) = store.save(&notes) {
                error!(error = %err, "failed to persist seeded notes");
            } else {
                info!(count = notes.len(), "seeded example notes into empty store");
            }
        }

        let theme_mode = prefs.get();
        theme::set_active(Theme::load(theme_mode));

        let mut app = Self {
            running: true,
            view_mode: ViewMode::Month,
            input_mode: InputMode::Normal,
            selected_date: today,
            today,
            notes,
            day_notes: Vec::new(),
            days_with_notes: HashSet::new(),
            upcoming: Vec::new(),
            day_selected: 0,
            day_scroll: 0,
            show_help: false,
            show_detail: false,
            status_message: None,
            form_state: None,
            theme_mode,
            fired: HashSet::new(),
            store,
            prefs,
            last_reminder_check: Instant::now(),
        };

        app.refresh_views();
        app.refresh_reminders(Local::now());
        app
    }

    // ── views ──

    pub fn refresh_views(&mut self) {
        self.day_notes = query::notes_on(&self.notes, self.selected_date)
            .into_iter()
            .cloned()
            .collect();

        let year = self.selected_date.year();
        let month = self.selected_date.month();
        self.days_with_notes.clear();
        for note in &self.notes {
            let day = note.date.date_naive();
            if day.year() == year && day.month() == month {
                self.days_with_notes.insert(day.day());
            }
        }

        if self.day_selected >= self.day_notes.len() {
            self.day_selected = self.day_notes.len().saturating_sub(1);
        }
        self.day_scroll = self.day_scroll.min(self.day_selected);
    }

    // ── reminders ──

    pub fn refresh_reminders(&mut self, now: DateTime<Local>) {
        let eval = reminder::evaluate(
            &self.notes,
            now,
            ReminderWindow::ThroughTomorrow,
            &self.fired,
        );
        if let Some(first) = eval.due.first() {
            self.status_message = Some(if eval.due.len() == 1 {
                format!("Upcoming: {}", first.display_title())
            } else {
                format!("{} meetings coming up", eval.due.len())
            });
        }
        self.fired = eval.fired;

        self.upcoming = reminder::upcoming(&self.notes, now, ReminderWindow::ThroughTomorrow)
            .into_iter()
            .cloned()
            .collect();
    }

    /// Called on every poll tick; re-evaluates on the hourly schedule.
    pub fn tick(&mut self) {
        if self.last_reminder_check.elapsed() >= REMINDER_RECHECK {
            self.today = Local::now().date_naive();
            self.refresh_reminders(Local::now());
            self.last_reminder_check = Instant::now();
        }
    }

    // ── mutations ──

    pub fn add_note(&mut self, note: MeetingNote) {
        self.notes.push(note);
        self.form_state = None;
        self.input_mode = InputMode::Normal;
        self.persist();
        self.refresh_views();
        self.refresh_reminders(Local::now());
    }

    /// Remove the note at `index` of the current day view. The index is
    /// resolved to the note's id first; the full collection is only ever
    /// touched by id.
    pub fn delete_note(&mut self, index: usize) {
        let Some(target) = self.day_notes.get(index) else {
            self.status_message = Some("Nothing to delete".to_string());
            return;
        };
        let id = target.id.clone();
        let title = target.display_title().to_string();

        self.notes.retain(|n| n.id != id);
        self.upcoming.retain(|n| n.id != id);
        self.persist();
        self.refresh_views();
        self.status_message = Some(format!("Deleted \"{}\"", title));
    }

    pub fn delete_selected_note(&mut self) {
        self.delete_note(self.day_selected);
    }

    fn persist(&mut self) {
        if let Err(err) = self.store.save(&self.notes) {
            error!(error = %err, "failed to save notes");
            self.status_message = Some("Failed to save notes".to_string());
        }
    }

    // ── theme ──

    pub fn toggle_theme(&mut self) {
        self.theme_mode = self.theme_mode.toggled();
        let theme = Theme::load(self.theme_mode);
        self.status_message = Some(format!("Theme: {}", theme.mode.as_str()));
        theme::set_active(theme);
        if let Err(err) = self.prefs.set(self.theme_mode) {
            error!(error = %err, "failed to save theme preference");
        }
    }

    // ── note form ──

    pub fn open_note_form(&mut self) {
        self.form_state = Some(NoteFormState::new(self.selected_date));
        self.input_mode = InputMode::Form;
    }

    pub fn close_note_form(&mut self) {
        self.form_state = None;
        self.input_mode = InputMode::Normal;
    }

    pub fn submit_note_form(&mut self) {
        let Some(form) = self.form_state.clone() else {
            return;
        };
        if !form.is_valid() {
            self.status_message = Some("Note needs a body and a valid date".to_string());
            return;
        }
        let Some(date) = form.parsed_date() else {
            return;
        };

        let mut note = MeetingNote::new(local_midnight(date), form.notes.clone());
        if !form.title.is_empty() {
            note.title = Some(form.title.clone());
        }
        note.start_time = form.parsed_start_time();
        note.end_time = form.parsed_end_time();
        if !form.location.is_empty() {
            note.location = Some(form.location.clone());
        }
        note.participants = form.parsed_participants();
        note.color = form.selected_color();
        if note.start_time.is_some() {
            note.reminders.push(ReminderSpec {
                time: note.start_instant() - Duration::hours(1),
                channel: ReminderChannel::Notification,
            });
        }

        self.add_note(note);
        self.status_message = Some("Note saved".to_string());
    }

    pub fn form_tab(&mut self) {
        if let Some(ref mut form) = self.form_state {
            form.active_field = form.active_field.next();
        }
    }

    pub fn form_backtab(&mut self) {
        if let Some(ref mut form) = self.form_state {
            form.active_field = form.active_field.prev();
        }
    }

    pub fn form_input_char(&mut self, c: char) {
        if let Some(ref mut form) = self.form_state {
            form.input_char(c);
        }
    }

    pub fn form_backspace(&mut self) {
        if let Some(ref mut form) = self.form_state {
            form.backspace();
        }
    }

    pub fn form_next_color(&mut self) {
        if let Some(ref mut form) = self.form_state {
            form.next_color();
        }
    }

    // ── selection ──

    pub fn select_next(&mut self) {
        if self.day_selected + 1 < self.day_notes.len() {
            self.day_selected += 1;
            if self.day_selected >= self.day_scroll + DAY_VISIBLE_ROWS {
                self.day_scroll += 1;
            }
        }
    }

    pub fn select_prev(&mut self) {
        if self.day_selected > 0 {
            self.day_selected -= 1;
            self.day_scroll = self.day_scroll.min(self.day_selected);
        }
    }

    pub fn open_detail(&mut self) {
        if self.day_notes.get(self.day_selected).is_some() {
            self.show_detail = true;
        }
    }

    pub fn close_detail(&mut self) {
        self.show_detail = false;
    }

    // ── navigation ──

    pub fn next_day(&mut self) {
        self.selected_date = self.selected_date.succ_opt().unwrap_or(self.selected_date);
        self.on_date_changed();
    }

    pub fn prev_day(&mut self) {
        self.selected_date = self.selected_date.pred_opt().unwrap_or(self.selected_date);
        self.on_date_changed();
    }

    pub fn next_month(&mut self) {
        let month = self.selected_date.month();
        let year = self.selected_date.year();
        let (new_year, new_month) = if month == 12 {
            (year + 1, 1)
        } else {
            (year, month + 1)
        };
        let day = self
            .selected_date
            .day()
            .min(days_in_month(new_year, new_month));
        self.selected_date = NaiveDate::from_ymd_opt(new_year, new_month, day)
            .unwrap_or(self.selected_date);
        self.on_date_changed();
    }

    pub fn prev_month(&mut self) {
        let month = self.selected_date.month();
        let year = self.selected_date.year();
        let (new_year, new_month) = if month == 1 {
            (year - 1, 12)
        } else {
            (year, month - 1)
        };
        let day = self
            .selected_date
            .day()
            .min(days_in_month(new_year, new_month));
        self.selected_date = NaiveDate::from_ymd_opt(new_year, new_month, day)
            .unwrap_or(self.selected_date);
        self.on_date_changed();
    }

    pub fn go_to_today(&mut self) {
        self.today = Local::now().date_naive();
        self.selected_date = self.today;
        self.on_date_changed();
    }

    fn on_date_changed(&mut self) {
        self.day_selected = 0;
        self.day_scroll = 0;
        self.refresh_views();
    }
}

/// Three example notes for a first run: today, tomorrow, one week out.
fn seed_notes(today: NaiveDate) -> Vec<MeetingNote> {
    let tomorrow = today.succ_opt().unwrap_or(today);
    let next_week = today + Duration::days(7);

    let mut kickoff = MeetingNote::new(
        local_midnight(today),
        "Walk through sprint goals and blockers.",
    );
    kickoff.title = Some("Team kickoff".to_string());
    kickoff.start_time = chrono::NaiveTime::from_hms_opt(10, 0, 0);
    kickoff.end_time = chrono::NaiveTime::from_hms_opt(10, 30, 0);
    kickoff.participants = vec!["ana@example.com".to_string(), "bo@example.com".to_string()];
    kickoff.color = Some(crate::notes::NoteColor::Blue);
    kickoff.reminders.push(ReminderSpec {
        time: kickoff.start_instant() - Duration::hours(1),
        channel: ReminderChannel::Notification,
    });

    let mut review = MeetingNote::new(
        local_midnight(tomorrow),
        "Review the new dashboard mockups.",
    );
    review.title = Some("Design review".to_string());
    review.start_time = chrono::NaiveTime::from_hms_opt(14, 0, 0);
    review.end_time = chrono::NaiveTime::from_hms_opt(15, 0, 0);
    review.location = Some("Room 4".to_string());
    review.color = Some(crate::notes::NoteColor::Green);

    let mut planning = MeetingNote::new(
        local_midnight(next_week),
        "Draft objectives for next quarter.",
    );
    planning.title = Some("Quarterly planning".to_string());
    planning.start_time = chrono::NaiveTime::from_hms_opt(9, 0, 0);
    planning.end_time = chrono::NaiveTime::from_hms_opt(11, 0, 0);
    planning.recurring = Some(RecurrencePattern::Monthly);
    planning.color = Some(crate::notes::NoteColor::Purple);

    vec![kickoff, review, planning]
}

fn local_midnight(day: NaiveDate) -> DateTime<Local> {
    day.and_hms_opt(0, 0, 0)
        .and_then(|midnight| Local.from_local_datetime(&midnight).earliest())
        // midnight can be skipped by a DST jump; noon never is
        .or_else(|| {
            day.and_hms_opt(12, 0, 0)
                .and_then(|noon| Local.from_local_datetime(&noon).earliest())
        })
        .unwrap_or_else(Local::now)
}

fn days_in_month(year: i32, month: u32) -> u32 {
    if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .unwrap_or(NaiveDate::MAX)
    .signed_duration_since(NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MIN))
    .num_days() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn temp_app() -> App {
        let dir = env::temp_dir().join(format!("agenda_tui_test_{}", uuid::Uuid::new_v4()));
        let store = NoteStore::at(dir.clone());
        let prefs = ThemePreference::at(dir);
        App::from_parts(store, prefs)
    }

    #[test]
    fn empty_store_is_seeded_with_three_notes() {
        let app = temp_app();

        assert_eq!(app.notes.len(), 3);
        let days: Vec<NaiveDate> = app.notes.iter().map(|n| n.date.date_naive()).collect();
        assert_eq!(days[0], app.today);
        assert_eq!(days[1], app.today.succ_opt().unwrap());
        assert_eq!(days[2], app.today + Duration::days(7));

        // And they were persisted, not just held in memory.
        assert_eq!(app.store.load(), app.notes);
    }

    #[test]
    fn existing_notes_are_not_reseeded() {
        let dir = env::temp_dir().join(format!("agenda_tui_test_{}", uuid::Uuid::new_v4()));
        let store = NoteStore::at(dir.clone());
        let date = Local.with_ymd_and_hms(2025, 1, 10, 0, 0, 0).unwrap();
        store.save(&[MeetingNote::new(date, "only note")]).unwrap();

        let app = App::from_parts(store, ThemePreference::at(dir));
        assert_eq!(app.notes.len(), 1);
        assert_eq!(app.notes[0].note, "only note");
    }

    #[test]
    fn add_then_delete_via_day_view_round_trips_through_the_store() {
        let mut app = temp_app();
        app.notes.clear();
        app.persist();

        let day = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        let mut note = MeetingNote::new(local_midnight(day), "Daily standup");
        note.title = Some("Standup".to_string());
        app.add_note(note);

        app.selected_date = day;
        app.refresh_views();
        assert_eq!(app.day_notes.len(), 1);
        assert_eq!(app.day_notes[0].display_title(), "Standup");

        app.delete_note(0);
        assert!(query::notes_on(&app.notes, day).is_empty());
        assert!(app.store.load().is_empty());
    }

    #[test]
    fn delete_with_stale_index_is_a_soft_no_op() {
        let mut app = temp_app();
        app.selected_date = app.today + Duration::days(100);
        app.refresh_views();
        let before = app.notes.len();

        app.delete_note(99);

        assert_eq!(app.notes.len(), before);
        assert_eq!(app.status_message.as_deref(), Some("Nothing to delete"));
    }

    #[test]
    fn delete_resolves_by_id_not_by_collection_position() {
        let mut app = temp_app();
        app.notes.clear();

        let day = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        let other_day = NaiveDate::from_ymd_opt(2025, 1, 9).unwrap();
        // Collection order: a note on another day first, so index 0 of
        // the day view is not index 0 of the collection.
        app.notes.push(MeetingNote::new(local_midnight(other_day), "keep me"));
        app.notes.push(MeetingNote::new(local_midnight(day), "delete me"));
        app.selected_date = day;
        app.refresh_views();

        app.delete_note(0);

        assert_eq!(app.notes.len(), 1);
        assert_eq!(app.notes[0].note, "keep me");
    }

    #[test]
    fn submitting_the_form_appends_and_closes_it() {
        let mut app = temp_app();
        let before = app.notes.len();

        app.open_note_form();
        assert_eq!(app.input_mode, InputMode::Form);
        if let Some(ref mut form) = app.form_state {
            form.notes = "Agenda: hiring".to_string();
            form.title = "Sync".to_string();
        }
        app.submit_note_form();

        assert_eq!(app.notes.len(), before + 1);
        assert!(app.form_state.is_none());
        assert_eq!(app.input_mode, InputMode::Normal);
        let added = app.notes.last().unwrap();
        assert_eq!(added.display_title(), "Sync");
        // A start time was present, so a one-hour-before reminder rides along.
        assert_eq!(added.reminders.len(), 1);
    }

    #[test]
    fn invalid_form_is_rejected_and_stays_open() {
        let mut app = temp_app();
        let before = app.notes.len();

        app.open_note_form();
        app.submit_note_form(); // empty body

        assert_eq!(app.notes.len(), before);
        assert!(app.form_state.is_some());
    }

    #[test]
    fn toggle_theme_persists_the_choice() {
        let mut app = temp_app();
        let flipped = app.theme_mode.toggled();

        app.toggle_theme();

        assert_eq!(app.theme_mode, flipped);
        assert_eq!(app.prefs.get_with(|| None), flipped);
    }

    #[test]
    fn toggle_theme_reports_the_new_mode() {
        let mut app = temp_app();
        app.toggle_theme();
        let expected = format!("Theme: {}", app.theme_mode.as_str());
        assert_eq!(app.status_message.as_deref(), Some(expected.as_str()));
    }

    #[test]
    fn local_midnight_starts_the_day() {
        let day = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();
        let instant = local_midnight(day);

        assert_eq!(instant.date_naive(), day);
        assert_eq!(instant.time(), chrono::NaiveTime::from_hms_opt(0, 0, 0).unwrap());
    }

    #[test]
    fn upcoming_reflects_the_day_boundary_window() {
        let mut app = temp_app();
        app.notes.clear();
        let now = Local::now();
        let soon = now + Duration::hours(1);
        let far = now + Duration::days(10);
        app.notes.push(MeetingNote::new(soon, "soon"));
        app.notes.push(MeetingNote::new(far, "far"));

        app.refresh_reminders(now);

        assert_eq!(app.upcoming.len(), 1);
        assert_eq!(app.upcoming[0].note, "soon");
    }
}
