// Guide list rendering.
// Sidebar of guides plus the shared loading, error and empty states.

use ratatui::{prelude::*, widgets::*};

use crate::docs::model::DocumentRecord;
use crate::state::{LoadStatus, SiteView};

/// Render a loading indicator.
pub fn render_loading(frame: &mut Frame, area: Rect, message: &str) {
    let text = Paragraph::new(format!("⏳ {}...", message))
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Yellow));
    frame.render_widget(text, area);
}

/// Render an error message, with a retry hint when the error is retryable.
pub fn render_error(frame: &mut Frame, area: Rect, error: &str, retryable: bool) {
    let mut lines = vec![Line::styled(
        format!("❌ {}", error),
        Style::default().fg(Color::Red),
    )];
    if retryable {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("Press ", Style::default().fg(Color::DarkGray)),
            Span::styled("r", Style::default().fg(Color::Yellow)),
            Span::styled(" to retry", Style::default().fg(Color::DarkGray)),
        ]));
    }
    let text = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(text, area);
}

/// Render an empty state message.
pub fn render_empty(frame: &mut Frame, area: Rect, message: &str) {
    let text = Paragraph::new(message)
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(text, area);
}

/// Render the guide list.
pub fn render_guides(
    frame: &mut Frame,
    view: SiteView<'_, Vec<DocumentRecord>>,
    active_slug: Option<&str>,
    list_state: &mut ListState,
    area: Rect,
) {
    let block = Block::default().borders(Borders::ALL).title(" Guides ");
    let inner = block.inner(area);

    match (view.status, view.data) {
        (LoadStatus::Success, Some(docs)) if docs.is_empty() => {
            frame.render_widget(block, area);
            render_empty(frame, inner, "No guides found");
        }
        (LoadStatus::Success, Some(docs)) => {
            let items: Vec<ListItem> = docs
                .iter()
                .map(|doc| {
                    let is_active = active_slug == Some(doc.slug.as_str());
                    let (marker, style) = if is_active {
                        (
                            "● ",
                            Style::default()
                                .fg(Color::Green)
                                .add_modifier(Modifier::BOLD),
                        )
                    } else {
                        ("  ", Style::default())
                    };
                    ListItem::new(Line::from(vec![
                        Span::styled(marker, Style::default().fg(Color::Green)),
                        Span::styled(doc.title.clone(), style),
                    ]))
                })
                .collect();

            let list_widget = List::new(items)
                .block(block)
                .highlight_style(
                    Style::default()
                        .bg(Color::DarkGray)
                        .add_modifier(Modifier::BOLD),
                )
                .highlight_symbol("> ");

            frame.render_stateful_widget(list_widget, area, list_state);
        }
        (LoadStatus::Error, _) => {
            frame.render_widget(block, area);
            render_error(
                frame,
                inner,
                view.error.unwrap_or("Failed to load guides"),
                view.retry.is_some(),
            );
        }
        _ => {
            frame.render_widget(block, area);
            render_loading(frame, inner, "Loading guides");
        }
    }
}
