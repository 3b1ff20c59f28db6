// Content pane for the active document.

use ratatui::{prelude::*, widgets::*};

use crate::app::App;
use crate::state::LoadStatus;

use super::list::{render_empty, render_error, render_loading};

/// Draw the active document, or the state of its load.
pub fn draw_document(frame: &mut Frame, app: &mut App, area: Rect) {
    let view = app.controller.document_view();
    let title = view
        .data
        .map(|doc| doc.title.clone())
        .or_else(|| app.controller.active_slug().map(str::to_string))
        .unwrap_or_else(|| "Document".to_string());

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", title));
    let inner = block.inner(area);

    match view.status {
        LoadStatus::Idle => {
            frame.render_widget(block, area);
            render_empty(frame, inner, "Select a guide and press Enter");
        }
        LoadStatus::Loading => {
            frame.render_widget(block, area);
            render_loading(frame, inner, "Loading document");
        }
        LoadStatus::Error => {
            frame.render_widget(block, area);
            render_error(
                frame,
                inner,
                view.error.unwrap_or("Failed to load document"),
                view.retry.is_some(),
            );
        }
        LoadStatus::Success => {
            app.viewport_height = inner.height;
            let total = app.rendered.len();
            let top = app.scroll as usize;
            let bottom = (top + inner.height as usize).min(total);
            let position = format!(" {}-{}/{} ", (top + 1).min(total), bottom, total);

            let text = Paragraph::new(app.rendered.clone())
                .block(block.title_bottom(Line::from(position).right_aligned()))
                .wrap(Wrap { trim: false })
                .scroll((app.scroll, 0));
            frame.render_widget(text, area);
        }
    }
}
