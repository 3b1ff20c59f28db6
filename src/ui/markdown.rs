// Markdown to styled terminal text.
// Walks pulldown-cmark events and builds ratatui lines.

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::prelude::*;

const RULE_WIDTH: usize = 40;

/// Render a markdown body into styled lines.
pub fn render(markdown: &str) -> Vec<Line<'static>> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut renderer = Renderer::default();
    for event in Parser::new_ext(markdown, options) {
        renderer.event(event);
    }
    renderer.finish()
}

fn heading_style(level: HeadingLevel) -> Style {
    let style = Style::default().add_modifier(Modifier::BOLD);
    match level {
        HeadingLevel::H1 => style.fg(Color::Cyan),
        HeadingLevel::H2 => style.fg(Color::Blue),
        HeadingLevel::H3 => style.fg(Color::Magenta),
        _ => style,
    }
}

fn code_style() -> Style {
    Style::default().fg(Color::Yellow)
}

fn dim_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

#[derive(Default)]
struct Table {
    rows: Vec<Vec<String>>,
    row: Vec<String>,
    cell: String,
    header_rows: usize,
}

#[derive(Default)]
struct Renderer {
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
    styles: Vec<Style>,
    /// Next number for ordered lists, `None` for bullets.
    lists: Vec<Option<u64>>,
    quote_depth: usize,
    in_code_block: bool,
    links: Vec<String>,
    /// Destination and alt text of the image being read.
    image: Option<(String, String)>,
    table: Option<Table>,
}

impl Renderer {
    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => {
                if let Some(table) = &mut self.table {
                    table.cell.push_str(&code);
                } else if let Some((_, alt)) = &mut self.image {
                    alt.push_str(&code);
                } else {
                    self.push_span(code.to_string(), code_style());
                }
            }
            Event::Html(html) | Event::InlineHtml(html) => {
                for line in html.lines() {
                    self.push_span(line.to_string(), dim_style());
                    if html.contains('\n') {
                        self.flush();
                    }
                }
            }
            Event::SoftBreak => self.text(" "),
            Event::HardBreak => self.flush(),
            Event::Rule => {
                self.flush();
                self.lines
                    .push(Line::from(Span::styled("─".repeat(RULE_WIDTH), dim_style())));
                self.blank();
            }
            Event::TaskListMarker(checked) => {
                let marker = if checked { "[x] " } else { "[ ] " };
                self.push_span(marker.to_string(), dim_style());
            }
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {}
            Tag::Heading { level, .. } => {
                self.flush();
                let style = heading_style(level);
                self.push_span(format!("{} ", "#".repeat(level as usize)), style);
                self.styles.push(style);
            }
            Tag::BlockQuote => {
                self.flush();
                self.quote_depth += 1;
            }
            Tag::CodeBlock(_) => {
                self.flush();
                self.in_code_block = true;
            }
            Tag::List(start) => {
                self.flush();
                self.lists.push(start);
            }
            Tag::Item => {
                self.flush();
                let depth = self.lists.len().saturating_sub(1);
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{}. ", n);
                        *n += 1;
                        marker
                    }
                    _ => "• ".to_string(),
                };
                self.push_span(format!("{}{}", "  ".repeat(depth), marker), dim_style());
            }
            Tag::Emphasis => self.push_style(Style::default().add_modifier(Modifier::ITALIC)),
            Tag::Strong => self.push_style(Style::default().add_modifier(Modifier::BOLD)),
            Tag::Strikethrough => {
                self.push_style(Style::default().add_modifier(Modifier::CROSSED_OUT))
            }
            Tag::Link { dest_url, .. } => {
                self.links.push(dest_url.to_string());
                self.push_style(
                    Style::default()
                        .fg(Color::Blue)
                        .add_modifier(Modifier::UNDERLINED),
                );
            }
            Tag::Image { dest_url, .. } => {
                self.image = Some((dest_url.to_string(), String::new()));
            }
            Tag::Table(_) => {
                self.flush();
                self.table = Some(Table::default());
            }
            Tag::TableCell => {
                if let Some(table) = &mut self.table {
                    table.cell.clear();
                }
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                self.flush();
                if self.lists.is_empty() {
                    self.blank();
                }
            }
            TagEnd::Heading(_) => {
                self.styles.pop();
                self.flush();
                self.blank();
            }
            TagEnd::BlockQuote => {
                self.flush();
                self.quote_depth = self.quote_depth.saturating_sub(1);
                self.blank();
            }
            TagEnd::CodeBlock => {
                self.in_code_block = false;
                self.blank();
            }
            TagEnd::List(_) => {
                self.flush();
                self.lists.pop();
                if self.lists.is_empty() {
                    self.blank();
                }
            }
            TagEnd::Item => self.flush(),
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => {
                self.styles.pop();
            }
            TagEnd::Link => {
                self.styles.pop();
                if let Some(dest) = self.links.pop() {
                    self.push_span(format!(" <{}>", dest), dim_style());
                }
            }
            TagEnd::Image => {
                if let Some((dest, alt)) = self.image.take() {
                    let label = format!("[image: {}]", alt);
                    self.push_span(label, Style::default().fg(Color::Magenta));
                    self.push_span(format!(" <{}>", dest), dim_style());
                }
            }
            TagEnd::TableCell => {
                if let Some(table) = &mut self.table {
                    let cell = std::mem::take(&mut table.cell);
                    table.row.push(cell.trim().to_string());
                }
            }
            TagEnd::TableHead => {
                if let Some(table) = &mut self.table {
                    let row = std::mem::take(&mut table.row);
                    table.rows.push(row);
                    table.header_rows = table.rows.len();
                }
            }
            TagEnd::TableRow => {
                if let Some(table) = &mut self.table {
                    let row = std::mem::take(&mut table.row);
                    table.rows.push(row);
                }
            }
            TagEnd::Table => {
                if let Some(table) = self.table.take() {
                    self.emit_table(table);
                    self.blank();
                }
            }
            TagEnd::HtmlBlock => {
                self.flush();
                self.blank();
            }
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if let Some(table) = &mut self.table {
            table.cell.push_str(text);
            return;
        }
        if let Some((_, alt)) = &mut self.image {
            alt.push_str(text);
            return;
        }
        if self.in_code_block {
            for line in text.strip_suffix('\n').unwrap_or(text).split('\n') {
                self.push_span(format!("  {}", line), code_style());
                self.flush();
            }
            return;
        }
        let style = self.style();
        self.push_span(text.to_string(), style);
    }

    fn emit_table(&mut self, table: Table) {
        let columns = table.rows.iter().map(Vec::len).max().unwrap_or(0);
        let widths: Vec<usize> = (0..columns)
            .map(|col| {
                table
                    .rows
                    .iter()
                    .filter_map(|row| row.get(col))
                    .map(|cell| cell.chars().count())
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        for (index, row) in table.rows.iter().enumerate() {
            let is_header = index < table.header_rows;
            let mut text = String::from("│");
            for (col, width) in widths.iter().enumerate() {
                let cell = row.get(col).map(String::as_str).unwrap_or_default();
                let pad = width.saturating_sub(cell.chars().count());
                text.push_str(&format!(" {}{} │", cell, " ".repeat(pad)));
            }
            let style = if is_header {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            self.push_span(text, style);
            self.flush();

            if is_header && index + 1 == table.header_rows {
                let bars: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
                self.push_span(format!("├{}┤", bars.join("┼")), dim_style());
                self.flush();
            }
        }
    }

    fn style(&self) -> Style {
        self.styles.last().copied().unwrap_or_default()
    }

    fn push_style(&mut self, style: Style) {
        let combined = self.style().patch(style);
        self.styles.push(combined);
    }

    fn push_span(&mut self, text: String, style: Style) {
        self.current.push(Span::styled(text, style));
    }

    /// End the current line, prefixing block quote bars.
    fn flush(&mut self) {
        if self.current.is_empty() {
            return;
        }
        let mut spans = Vec::with_capacity(self.current.len() + 1);
        if self.quote_depth > 0 {
            spans.push(Span::styled("│ ".repeat(self.quote_depth), dim_style()));
        }
        spans.append(&mut self.current);
        self.lines.push(Line::from(spans));
    }

    /// Add one empty separator line, never two in a row.
    fn blank(&mut self) {
        let last_is_blank = self.lines.last().is_none_or(|line| line.spans.is_empty());
        if !last_is_blank {
            self.lines.push(Line::default());
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.flush();
        while self.lines.last().is_some_and(|line| line.spans.is_empty()) {
            self.lines.pop();
        }
        self.lines
    }
}
