// UI module for rendering the TUI.
// Header, guide sidebar, content pane, status bar and help overlay.

mod document;
mod list;
pub mod markdown;

use ratatui::{prelude::*, widgets::*};

use crate::app::App;

const SIDEBAR_WIDTH: u16 = 32;

/// Main draw function that renders the entire UI.
pub fn draw(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(1),    // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    draw_header(frame, app, chunks[0]);

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(1)])
        .split(chunks[1]);

    let active = app.controller.active_slug().map(str::to_string);
    list::render_guides(
        frame,
        app.controller.listing_view(),
        active.as_deref(),
        &mut app.sidebar,
        panes[0],
    );
    document::draw_document(frame, app, panes[1]);

    draw_status_bar(frame, app, chunks[2]);

    // Help overlay (rendered last, on top of everything)
    if app.show_help {
        draw_help_overlay(frame);
    }
}

/// Draw the title line with the source repository and current route.
fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let location = app.controller.route().path(app.controller.route_prefix());
    let mut header = vec![
        Span::styled(
            " docview ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(app.source_label.clone(), Style::default().fg(Color::Cyan)),
        Span::styled(format!("  {}", location), Style::default().fg(Color::DarkGray)),
    ];
    if app.controller.is_busy() {
        header.push(Span::styled("  ⟳ loading", Style::default().fg(Color::Yellow)));
    }
    frame.render_widget(Paragraph::new(Line::from(header)), area);
}

/// Draw the status bar with keybinding hints and rate limit.
fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let retryable = app
        .controller
        .document_view()
        .retry
        .or(app.controller.listing_view().retry)
        .is_some();
    let r_hint = if retryable { "Retry" } else { "Refresh" };

    let mut hints = vec![
        Span::raw(" ↑↓ "),
        Span::styled("Navigate", Style::default().fg(Color::DarkGray)),
        Span::raw("  ↵ "),
        Span::styled("Open", Style::default().fg(Color::DarkGray)),
        Span::raw("  PgUp/Dn "),
        Span::styled("Scroll", Style::default().fg(Color::DarkGray)),
    ];
    if app.controller.can_go_back() {
        hints.push(Span::raw("  Esc "));
        hints.push(Span::styled("Back", Style::default().fg(Color::DarkGray)));
    }
    hints.extend([
        Span::raw("  r "),
        Span::styled(r_hint, Style::default().fg(Color::DarkGray)),
        Span::raw("  ? "),
        Span::styled("Help", Style::default().fg(Color::DarkGray)),
        Span::raw("  q "),
        Span::styled("Quit", Style::default().fg(Color::DarkGray)),
    ]);

    if app.controller.listing().is_error() {
        hints.push(Span::styled(
            "  guides unavailable",
            Style::default().fg(Color::Red),
        ));
    }

    // Add rate limit info on the right if available
    if let Some(rate) = app.controller.rate_limit() {
        let rate_color = if rate.remaining < 10 {
            Color::Red
        } else if rate.remaining < 30 {
            Color::Yellow
        } else {
            Color::DarkGray
        };
        hints.push(Span::styled(
            format!("  API: {}/{}", rate.remaining, rate.limit),
            Style::default().fg(rate_color),
        ));
    }

    let status = Paragraph::new(Line::from(hints));
    frame.render_widget(status, area);
}

/// Draw the help overlay.
fn draw_help_overlay(frame: &mut Frame) {
    let area = frame.area();

    // Create a centered popup
    let popup_width = 50.min(area.width);
    let popup_height = 17.min(area.height);
    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;

    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let key = |keys: &'static str, action: &'static str| {
        Line::from(vec![
            Span::styled(keys, Style::default().fg(Color::Cyan)),
            Span::raw(action),
        ])
    };

    let help_text = vec![
        Line::from(vec![Span::styled(
            "Keyboard Shortcuts",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        key("  ↑/↓ or j/k    ", "Select guide"),
        key("  Enter         ", "Open selected guide"),
        key("  PgUp/Dn ^u/^d ", "Scroll document"),
        key("  Home/End g/G  ", "Jump to top/bottom"),
        key("  Esc/Backspace ", "Previous document"),
        key("  r             ", "Retry failed load / refresh"),
        key("  ?             ", "Show/hide this help"),
        key("  q             ", "Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Guides are cached; r refreshes them.",
            Style::default().fg(Color::DarkGray),
        )]),
        Line::from(""),
        Line::from(vec![
            Span::styled("Press ", Style::default().fg(Color::DarkGray)),
            Span::styled("Esc", Style::default().fg(Color::Yellow)),
            Span::styled(" or ", Style::default().fg(Color::DarkGray)),
            Span::styled("?", Style::default().fg(Color::Yellow)),
            Span::styled(" to close", Style::default().fg(Color::DarkGray)),
        ]),
    ];

    let help_paragraph = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Help ")
                .title_style(
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
        )
        .alignment(Alignment::Left);

    frame.render_widget(help_paragraph, popup_area);
}
