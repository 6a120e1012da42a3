pub mod note;
pub mod query;
pub mod reminder;
pub mod store;

pub use note::{MeetingNote, NoteColor, RecurrencePattern, ReminderChannel, ReminderSpec};
pub use reminder::ReminderWindow;
pub use store::NoteStore;
