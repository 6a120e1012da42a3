use std::collections::HashSet;

use chrono::{DateTime, Duration, Local, TimeZone};

use super::note::MeetingNote;

/// Window policy deciding which notes count as "upcoming". One policy
/// type, injected by callers, instead of window math duplicated at each
/// call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderWindow {
    /// `[now, end of the calendar day after now's day]`, inclusive.
    /// Compares the note's stored timestamp against day boundaries, so
    /// the span is up to two calendar days, not a rolling 48 hours.
    ThroughTomorrow,
    /// Start-time-adjusted: qualifies iff `0 < hours_until <= n`.
    WithinHours(i64),
}

impl ReminderWindow {
    pub fn contains(&self, note: &MeetingNote, now: DateTime<Local>) -> bool {
        match self {
            ReminderWindow::ThroughTomorrow => {
                note.date >= now && note.date < start_of_day_after_tomorrow(now)
            }
            ReminderWindow::WithinHours(limit) => {
                let hours = hours_until(note, now);
                hours > 0.0 && hours <= *limit as f64
            }
        }
    }
}

/// Result of a reminder evaluation: the notes newly due this pass and
/// the updated set of fired note ids.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub due: Vec<MeetingNote>,
    pub fired: HashSet<String>,
}

/// Notes inside the window, in collection order.
pub fn upcoming<'a>(
    notes: &'a [MeetingNote],
    now: DateTime<Local>,
    window: ReminderWindow,
) -> Vec<&'a MeetingNote> {
    notes.iter().filter(|n| window.contains(n, now)).collect()
}

/// Evaluate the window against the collection, skipping notes whose ids
/// have already fired. Re-running with the returned set yields nothing
/// new, so a reminder surfaces exactly once per set lifetime.
pub fn evaluate(
    notes: &[MeetingNote],
    now: DateTime<Local>,
    window: ReminderWindow,
    fired: &HashSet<String>,
) -> Evaluation {
    let mut updated = fired.clone();
    let mut due = Vec::new();

    for note in notes {
        if window.contains(note, now) && updated.insert(note.id.clone()) {
            due.push(note.clone());
        }
    }

    Evaluation {
        due,
        fired: updated,
    }
}

/// Fractional hours from `now` to the note's day-plus-start-time instant.
/// Negative when the start has passed.
pub fn hours_until(note: &MeetingNote, now: DateTime<Local>) -> f64 {
    let delta = note.start_instant() - now;
    delta.num_seconds() as f64 / 3600.0
}

fn start_of_day_after_tomorrow(now: DateTime<Local>) -> DateTime<Local> {
    let day = now.date_naive() + Duration::days(2);
    day.and_hms_opt(0, 0, 0)
        .and_then(|midnight| Local.from_local_datetime(&midnight).earliest())
        // midnight can be skipped by a DST jump
        .unwrap_or(now + Duration::days(2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn note_at(dt: DateTime<Local>, body: &str) -> MeetingNote {
        MeetingNote::new(dt, body)
    }

    #[test]
    fn note_dated_exactly_now_is_upcoming() {
        let now = Local.with_ymd_and_hms(2025, 1, 10, 14, 0, 0).unwrap();
        let notes = vec![note_at(now, "starts right now")];

        let hits = upcoming(&notes, now, ReminderWindow::ThroughTomorrow);
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn window_runs_through_end_of_tomorrow() {
        let now = Local.with_ymd_and_hms(2025, 1, 10, 14, 0, 0).unwrap();
        let last_included = Local.with_ymd_and_hms(2025, 1, 11, 23, 59, 59).unwrap();
        let first_excluded = Local.with_ymd_and_hms(2025, 1, 12, 0, 0, 0).unwrap();
        let notes = vec![
            note_at(last_included, "late tomorrow"),
            note_at(first_excluded, "day after"),
        ];

        let hits = upcoming(&notes, now, ReminderWindow::ThroughTomorrow);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].note, "late tomorrow");
    }

    #[test]
    fn past_notes_are_not_upcoming() {
        let now = Local.with_ymd_and_hms(2025, 1, 10, 14, 0, 0).unwrap();
        let earlier = Local.with_ymd_and_hms(2025, 1, 10, 13, 59, 59).unwrap();
        let notes = vec![note_at(earlier, "already started")];

        assert!(upcoming(&notes, now, ReminderWindow::ThroughTomorrow).is_empty());
    }

    #[test]
    fn within_hours_gates_on_start_time() {
        let now = Local.with_ymd_and_hms(2025, 1, 10, 14, 0, 0).unwrap();

        let mut tomorrow_morning = note_at(
            Local.with_ymd_and_hms(2025, 1, 11, 0, 0, 0).unwrap(),
            "within a day",
        );
        tomorrow_morning.start_time = NaiveTime::from_hms_opt(10, 0, 0);

        let mut tomorrow_late = note_at(
            Local.with_ymd_and_hms(2025, 1, 11, 0, 0, 0).unwrap(),
            "just past a day",
        );
        tomorrow_late.start_time = NaiveTime::from_hms_opt(14, 30, 0);

        let notes = vec![tomorrow_morning, tomorrow_late];
        let hits = upcoming(&notes, now, ReminderWindow::WithinHours(24));

        // The two windows deliberately disagree between 24h and the end
        // of tomorrow: both notes are ThroughTomorrow, only one is
        // WithinHours(24).
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].note, "within a day");
        assert_eq!(
            upcoming(&notes, now, ReminderWindow::ThroughTomorrow).len(),
            2
        );
    }

    #[test]
    fn within_hours_excludes_started_notes() {
        let now = Local.with_ymd_and_hms(2025, 1, 10, 14, 0, 0).unwrap();
        let mut note = note_at(now, "in progress");
        note.start_time = NaiveTime::from_hms_opt(14, 0, 0);

        // hours_until == 0, and the gate is strictly positive.
        assert!(upcoming(&[note], now, ReminderWindow::WithinHours(24)).is_empty());
    }

    #[test]
    fn evaluate_fires_each_note_once() {
        let now = Local.with_ymd_and_hms(2025, 1, 10, 14, 0, 0).unwrap();
        let soon = Local.with_ymd_and_hms(2025, 1, 10, 16, 0, 0).unwrap();
        let notes = vec![note_at(soon, "sync")];

        let first = evaluate(&notes, now, ReminderWindow::ThroughTomorrow, &HashSet::new());
        assert_eq!(first.due.len(), 1);
        assert!(first.fired.contains(&notes[0].id));

        let second = evaluate(&notes, now, ReminderWindow::ThroughTomorrow, &first.fired);
        assert!(second.due.is_empty());
        assert_eq!(second.fired, first.fired);
    }

    #[test]
    fn evaluate_picks_up_notes_entering_the_window() {
        let now = Local.with_ymd_and_hms(2025, 1, 10, 14, 0, 0).unwrap();
        let later_now = Local.with_ymd_and_hms(2025, 1, 12, 14, 0, 0).unwrap();
        let far = Local.with_ymd_and_hms(2025, 1, 13, 9, 0, 0).unwrap();
        let notes = vec![note_at(far, "planning")];

        let first = evaluate(&notes, now, ReminderWindow::ThroughTomorrow, &HashSet::new());
        assert!(first.due.is_empty());

        // Two days later the note's day is "tomorrow" and inside the window.
        let second = evaluate(&notes, later_now, ReminderWindow::ThroughTomorrow, &first.fired);
        assert_eq!(second.due.len(), 1);
    }

    #[test]
    fn hours_until_uses_start_time() {
        let now = Local.with_ymd_and_hms(2025, 1, 10, 14, 0, 0).unwrap();
        let mut note = note_at(Local.with_ymd_and_hms(2025, 1, 10, 0, 0, 0).unwrap(), "sync");
        note.start_time = NaiveTime::from_hms_opt(16, 30, 0);

        assert!((hours_until(&note, now) - 2.5).abs() < 1e-9);
    }
}
