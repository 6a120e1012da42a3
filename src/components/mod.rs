pub mod day_view;
pub mod month_view;
pub mod note_form;
pub mod reminder_list;

pub use day_view::DayView;
pub use month_view::MonthView;
pub use note_form::NoteForm;
pub use reminder_list::ReminderList;
