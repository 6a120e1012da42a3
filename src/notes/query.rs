use chrono::NaiveDate;

use super::note::MeetingNote;

/// Notes occurring on `day`, by calendar-day equality only. Time of day
/// and `start_time` never affect the match. Input order is preserved.
pub fn notes_on(notes: &[MeetingNote], day: NaiveDate) -> Vec<&MeetingNote> {
    notes
        .iter()
        .filter(|n| n.date.date_naive() == day)
        .collect()
}

pub fn has_note_on(notes: &[MeetingNote], day: NaiveDate) -> bool {
    notes.iter().any(|n| n.date.date_naive() == day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, NaiveTime, TimeZone};

    #[test]
    fn matches_by_calendar_day_regardless_of_time() {
        let morning = Local.with_ymd_and_hms(2025, 1, 10, 8, 0, 0).unwrap();
        let evening = Local.with_ymd_and_hms(2025, 1, 10, 22, 30, 0).unwrap();
        let next_day = Local.with_ymd_and_hms(2025, 1, 11, 0, 0, 0).unwrap();

        let mut early = MeetingNote::new(morning, "early");
        early.start_time = NaiveTime::from_hms_opt(8, 0, 0);
        let late = MeetingNote::new(evening, "late");
        let other = MeetingNote::new(next_day, "other");
        let notes = vec![early, late, other];

        let day = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        let matched = notes_on(&notes, day);
        assert_eq!(matched.len(), 2);
        assert_eq!(matched[0].note, "early");
        assert_eq!(matched[1].note, "late");
    }

    #[test]
    fn has_note_on_reports_presence() {
        let date = Local.with_ymd_and_hms(2025, 1, 10, 0, 0, 0).unwrap();
        let notes = vec![MeetingNote::new(date, "standup")];

        assert!(has_note_on(
            &notes,
            NaiveDate::from_ymd_opt(2025, 1, 10).unwrap()
        ));
        assert!(!has_note_on(
            &notes,
            NaiveDate::from_ymd_opt(2025, 1, 11).unwrap()
        ));
    }

    #[test]
    fn empty_collection_matches_nothing() {
        let day = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        assert!(notes_on(&[], day).is_empty());
        assert!(!has_note_on(&[], day));
    }
}
