use chrono::NaiveDate;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::notes::MeetingNote;
use crate::theme;

pub struct DayView;

impl DayView {
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        date: NaiveDate,
        notes: &[MeetingNote],
        selected: usize,
        scroll: usize,
    ) {
        let t = theme::current();
        let w = area.width as usize;

        let title = if w >= 30 {
            format!(" {} ", date.format("%A, %B %d, %Y"))
        } else if w >= 18 {
            format!(" {} ", date.format("%b %d, %Y"))
        } else {
            format!(" {} ", date.format("%m/%d"))
        };

        let count_str = if notes.is_empty() {
            String::new()
        } else {
            let n = notes.len();
            format!(" {} meeting{} ", n, if n == 1 { "" } else { "s" })
        };

        let block = Block::default()
            .title(title)
            .title_style(t.header)
            .title_bottom(Line::from(Span::styled(count_str, t.dim)))
            .borders(Borders::ALL)
            .border_style(t.border);

        if notes.is_empty() {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            let msg = Paragraph::new("No meetings").style(t.dim);
            frame.render_widget(msg, inner);
            return;
        }

        let inner_w = area.width.saturating_sub(2) as usize;

        let items: Vec<ListItem> = notes
            .iter()
            .enumerate()
            .skip(scroll)
            .map(|(i, note)| format_note(note, inner_w, i == selected))
            .collect();

        let list = List::new(items).block(block);
        frame.render_widget(list, area);
    }
}

fn format_note(note: &MeetingNote, max_width: usize, selected: bool) -> ListItem<'static> {
    let t = theme::current();

    let tag_color = note
        .color
        .map(|c| c.as_color())
        .unwrap_or(Color::DarkGray);
    let tag = Span::styled("  ", Style::default().bg(tag_color));

    let time_str = format!(" {} ", note.time_display());
    let time_span = Span::styled(time_str.clone(), Style::default().add_modifier(Modifier::DIM));

    let title = note.display_title().to_string();
    let title_span = Span::styled(
        title.clone(),
        if selected { t.selected } else { Style::default() },
    );

    let mut spans = vec![tag, time_span, title_span];

    let mut used = 2 + time_str.len() + title.len();
    if let Some(ref loc) = note.location {
        if !loc.is_empty() && used + 4 + loc.len() <= max_width {
            spans.push(Span::styled(format!(" @ {}", loc), t.dim));
            used += 4 + loc.len();
        }
    }
    if let Some(pattern) = note.recurring {
        let label = format!(" ({})", pattern.label());
        if used + label.len() <= max_width {
            spans.push(Span::styled(label, t.dim));
        }
    }

    ListItem::new(Line::from(spans))
}

/// Centered popup showing every field of one note.
pub fn render_detail_popup(frame: &mut Frame, area: Rect, note: &MeetingNote) {
    let t = theme::current();

    let popup_w = area.width.min(60).max(30);
    let popup_h = area.height.min(18).max(8);
    let x = area.x + (area.width.saturating_sub(popup_w)) / 2;
    let y = area.y + (area.height.saturating_sub(popup_h)) / 2;
    let popup_area = Rect::new(x, y, popup_w, popup_h);

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(format!(" {} ", note.display_title()))
        .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let mut lines: Vec<Line> = Vec::new();

    if let Some(color) = note.color {
        lines.push(Line::from(vec![
            Span::styled("  ", Style::default().bg(color.as_color())),
            Span::styled(format!(" {}", color.label()), t.dim),
        ]));
        lines.push(Line::from(""));
    }

    lines.push(Line::from(vec![
        Span::styled("Date: ", t.dim),
        Span::styled(note.date.format("%A, %B %d, %Y").to_string(), Style::default()),
    ]));
    lines.push(Line::from(vec![
        Span::styled("Time: ", t.dim),
        Span::styled(note.time_display(), Style::default()),
    ]));

    if let Some(ref loc) = note.location {
        if !loc.is_empty() {
            lines.push(Line::from(vec![
                Span::styled("Location: ", t.dim),
                Span::styled(loc.clone(), Style::default()),
            ]));
        }
    }

    if !note.participants.is_empty() {
        lines.push(Line::from(vec![
            Span::styled("Participants: ", t.dim),
            Span::styled(note.participants.join(", "), Style::default()),
        ]));
    }

    if let Some(pattern) = note.recurring {
        lines.push(Line::from(vec![
            Span::styled("Repeats: ", t.dim),
            Span::styled(pattern.label(), Style::default()),
        ]));
    }

    if !note.reminders.is_empty() {
        lines.push(Line::from(Span::styled("Reminders:", t.dim)));
        for reminder in &note.reminders {
            lines.push(Line::from(format!(
                "  {} ({:?})",
                reminder.time.format("%m/%d %H:%M"),
                reminder.channel
            )));
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Notes:", t.dim)));
    for line in note.note.lines() {
        lines.push(Line::from(line.to_string()));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Press Esc to close", t.dim)));

    let para = Paragraph::new(lines).wrap(Wrap { trim: false });
    frame.render_widget(para, inner);
}
