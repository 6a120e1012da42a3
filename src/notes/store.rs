use std::fs;
use std::path::PathBuf;

use color_eyre::eyre::{eyre, Result, WrapErr};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::note::MeetingNote;

const NOTES_FILE: &str = "calendar_notes.json";
const SCHEMA_VERSION: u32 = 1;

/// Versioned on-disk layout. Older installs wrote a bare JSON array;
/// `StoredBlob` still accepts that shape on load.
#[derive(Deserialize)]
struct Envelope {
    #[allow(dead_code)]
    schema_version: u32,
    notes: Vec<MeetingNote>,
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    schema_version: u32,
    notes: &'a [MeetingNote],
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredBlob {
    Versioned(Envelope),
    Legacy(Vec<MeetingNote>),
}

/// Persists the whole note collection as a single JSON blob inside an
/// app-namespaced directory. Last writer wins; there is no cross-process
/// locking.
pub struct NoteStore {
    dir: PathBuf,
}

impl NoteStore {
    pub fn new() -> Result<Self> {
        let dir = Self::default_dir()
            .ok_or_else(|| eyre!("could not determine a data directory for notes"))?;
        Ok(Self { dir })
    }

    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn default_dir() -> Option<PathBuf> {
        dirs::data_dir().map(|d| d.join("agenda-tui"))
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    fn notes_path(&self) -> PathBuf {
        self.dir.join(NOTES_FILE)
    }

    /// Load the full collection. A missing file (first run) or an
    /// unreadable blob both yield an empty collection; the latter is
    /// logged, never propagated.
    pub fn load(&self) -> Vec<MeetingNote> {
        let path = self.notes_path();
        if !path.exists() {
            return Vec::new();
        }

        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to read notes file");
                return Vec::new();
            }
        };

        match serde_json::from_str::<StoredBlob>(&text) {
            Ok(StoredBlob::Versioned(envelope)) => envelope.notes,
            Ok(StoredBlob::Legacy(notes)) => {
                info!(path = %path.display(), "loaded pre-envelope notes blob");
                notes
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "discarding unreadable notes blob");
                Vec::new()
            }
        }
    }

    /// Serialize and rewrite the entire blob. No merge, no append.
    pub fn save(&self, notes: &[MeetingNote]) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .wrap_err_with(|| format!("creating data directory {}", self.dir.display()))?;

        let envelope = EnvelopeRef {
            schema_version: SCHEMA_VERSION,
            notes,
        };
        let text = serde_json::to_string_pretty(&envelope)?;

        let path = self.notes_path();
        fs::write(&path, text).wrap_err_with(|| format!("writing {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notes::note::{ReminderChannel, ReminderSpec};
    use chrono::{Local, NaiveTime, TimeZone};
    use std::env;

    fn temp_store() -> NoteStore {
        let dir = env::temp_dir().join(format!("agenda_tui_test_{}", uuid::Uuid::new_v4()));
        NoteStore::at(dir)
    }

    fn sample_note() -> MeetingNote {
        let date = Local.with_ymd_and_hms(2025, 1, 10, 0, 0, 0).unwrap();
        let mut note = MeetingNote::new(date, "Discuss roadmap");
        note.title = Some("Standup".to_string());
        note.start_time = NaiveTime::from_hms_opt(9, 0, 0);
        note.end_time = NaiveTime::from_hms_opt(9, 30, 0);
        note.participants = vec!["ana@example.com".to_string(), "bo@example.com".to_string()];
        note.location = Some("Room 4".to_string());
        note.reminders = vec![ReminderSpec {
            time: Local.with_ymd_and_hms(2025, 1, 10, 8, 0, 0).unwrap(),
            channel: ReminderChannel::Email,
        }];
        note
    }

    #[test]
    fn load_from_missing_file_is_empty() {
        let store = temp_store();
        assert!(store.load().is_empty());
    }

    #[test]
    fn save_then_load_round_trips_every_field() {
        let store = temp_store();
        let notes = vec![sample_note(), {
            let date = Local.with_ymd_and_hms(2025, 3, 2, 0, 0, 0).unwrap();
            MeetingNote::new(date, "1:1 with Sam")
        }];

        store.save(&notes).unwrap();
        let loaded = store.load();

        assert_eq!(loaded, notes);
        // Same instant, not just same calendar day.
        assert_eq!(loaded[0].reminders[0].time, notes[0].reminders[0].time);
    }

    #[test]
    fn double_save_is_idempotent() {
        let store = temp_store();
        let notes = vec![sample_note()];

        store.save(&notes).unwrap();
        store.save(&notes).unwrap();

        assert_eq!(store.load(), notes);
    }

    #[test]
    fn corrupt_blob_loads_as_empty() {
        let store = temp_store();
        fs::create_dir_all(store.dir()).unwrap();
        fs::write(store.dir().join(NOTES_FILE), "{not json").unwrap();

        assert!(store.load().is_empty());
    }

    #[test]
    fn legacy_bare_array_still_loads() {
        let store = temp_store();
        let notes = vec![sample_note()];
        fs::create_dir_all(store.dir()).unwrap();
        fs::write(
            store.dir().join(NOTES_FILE),
            serde_json::to_string(&notes).unwrap(),
        )
        .unwrap();

        assert_eq!(store.load(), notes);
    }

    #[test]
    fn missing_optional_fields_deserialize_as_absent() {
        let store = temp_store();
        // A blob written before reminders/participants existed.
        let blob = r#"[{"date": "2025-01-10T00:00:00+00:00", "note": "Standup"}]"#;
        fs::create_dir_all(store.dir()).unwrap();
        fs::write(store.dir().join(NOTES_FILE), blob).unwrap();

        let loaded = store.load();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].note, "Standup");
        assert!(loaded[0].title.is_none());
        assert!(loaded[0].reminders.is_empty());
        assert!(loaded[0].participants.is_empty());
        // Legacy notes get a fresh id so deletion still works.
        assert!(!loaded[0].id.is_empty());
    }
}
