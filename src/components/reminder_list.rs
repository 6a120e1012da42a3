use chrono::{DateTime, Local};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::notes::{reminder, MeetingNote, ReminderWindow};
use crate::theme;

/// Notes inside the day-boundary lookahead window, soonest first. The
/// "in Nh" tag only shows for notes inside the stricter 24-hour window.
pub struct ReminderList;

impl ReminderList {
    pub fn render(frame: &mut Frame, area: Rect, upcoming: &[MeetingNote], now: DateTime<Local>) {
        let t = theme::current();
        let w = area.width as usize;

        let title = if w >= 25 {
            format!(" Upcoming ({}) ", upcoming.len())
        } else {
            " Upcoming ".to_string()
        };

        let block = Block::default()
            .title(title)
            .title_style(t.header)
            .borders(Borders::ALL)
            .border_style(t.border);

        if upcoming.is_empty() {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            let msg = Paragraph::new("Nothing in the next two days").style(t.dim);
            frame.render_widget(msg, inner);
            return;
        }

        let inner_w = area.width.saturating_sub(2) as usize;

        let mut sorted: Vec<&MeetingNote> = upcoming.iter().collect();
        sorted.sort_by_key(|n| n.start_instant());

        let items: Vec<ListItem> = sorted
            .into_iter()
            .map(|note| format_upcoming(note, now, inner_w))
            .collect();

        let list = List::new(items).block(block);
        frame.render_widget(list, area);
    }
}

fn format_upcoming(note: &MeetingNote, now: DateTime<Local>, inner_w: usize) -> ListItem<'static> {
    let t = theme::current();

    let tag_color = note
        .color
        .map(|c| c.as_color())
        .unwrap_or(Color::DarkGray);
    let tag = Span::styled("  ", Style::default().bg(tag_color));

    let when = format!(" {} {} ", note.date.format("%a"), note.time_display());
    let when_span = Span::styled(when.clone(), Style::default().add_modifier(Modifier::DIM));

    let title = note.display_title().to_string();
    let title_span = Span::styled(title.clone(), Style::default());

    let mut spans = vec![tag, when_span, title_span];

    if ReminderWindow::WithinHours(24).contains(note, now) {
        let hours = reminder::hours_until(note, now);
        let tag = format!(" in {:.0}h", hours.ceil());
        if 2 + when.len() + title.len() + tag.len() <= inner_w {
            spans.push(Span::styled(tag, t.dim));
        }
    }

    ListItem::new(Line::from(spans))
}
