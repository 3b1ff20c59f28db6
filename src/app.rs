// App state and main event loop.
// Owns the docs controller and the view state of the sidebar and content pane.

use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::ListState;

use crate::state::DocsController;
use crate::ui;
use crate::ui::markdown;

/// Main application state.
pub struct App {
    pub controller: DocsController,
    /// `owner/repo@branch` shown in the header.
    pub source_label: String,
    /// Selection in the guide list.
    pub sidebar: ListState,
    /// First visible line of the content pane.
    pub scroll: u16,
    /// Height of the content pane at the last draw, used for paging.
    pub viewport_height: u16,
    /// Rendered body of the document on screen.
    pub rendered: Vec<Line<'static>>,
    /// Slug the rendered body belongs to.
    rendered_slug: Option<String>,
    pub show_help: bool,
    pub should_quit: bool,
}

impl App {
    pub fn new(controller: DocsController, source_label: impl Into<String>) -> Self {
        Self {
            controller,
            source_label: source_label.into(),
            sidebar: ListState::default(),
            scroll: 0,
            viewport_height: 0,
            rendered: Vec::new(),
            rendered_slug: None,
            show_help: false,
            should_quit: false,
        }
    }

    /// Main event loop.
    pub fn run(&mut self, terminal: &mut Terminal<impl Backend>) -> io::Result<()> {
        self.controller.mount();
        while !self.should_quit {
            self.controller.poll_settled();
            self.sync_view();
            terminal.draw(|frame| ui::draw(frame, self))?;
            self.handle_events()?;
        }
        Ok(())
    }

    /// Keep the rendered body and sidebar selection in line with the controller.
    pub fn sync_view(&mut self) {
        let document = self.controller.document().data();
        let slug = document.map(|doc| doc.slug.clone());
        if slug != self.rendered_slug {
            self.rendered = document
                .and_then(|doc| doc.content.as_deref())
                .map(markdown::render)
                .unwrap_or_default();
            self.rendered_slug = slug;
            self.scroll = 0;
        }

        let guides = self.controller.listing().data().map(Vec::len).unwrap_or(0);
        if guides == 0 {
            self.sidebar.select(None);
            return;
        }
        let active = self.controller.active_slug().and_then(|slug| {
            self.controller
                .listing()
                .data()
                .and_then(|docs| docs.iter().position(|doc| doc.slug == slug))
        });
        match (self.sidebar.selected(), active) {
            (None, Some(index)) => self.sidebar.select(Some(index)),
            (None, None) => self.sidebar.select(Some(0)),
            (Some(index), _) if index >= guides => self.sidebar.select(Some(guides - 1)),
            _ => {}
        }
    }

    /// Handle keyboard and other events.
    #[allow(clippy::collapsible_if)]
    fn handle_events(&mut self) -> io::Result<()> {
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    self.handle_key(key);
                }
            }
        }
        Ok(())
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if self.show_help {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                self.show_help = false;
            }
            return;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('c') if ctrl => self.should_quit = true,
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Char('j') | KeyCode::Down => self.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.select_previous(),
            KeyCode::Enter => self.open_selected(),
            KeyCode::Char('d') if ctrl => self.scroll_down(self.page()),
            KeyCode::Char('u') if ctrl => self.scroll_up(self.page()),
            KeyCode::PageDown => self.scroll_down(self.page()),
            KeyCode::PageUp => self.scroll_up(self.page()),
            KeyCode::Char('g') | KeyCode::Home => self.scroll = 0,
            KeyCode::Char('G') | KeyCode::End => self.scroll = self.max_scroll(),
            KeyCode::Char('r') => {
                if !self.controller.retry() {
                    self.controller.refresh();
                }
            }
            KeyCode::Esc | KeyCode::Backspace => {
                self.controller.go_back();
                self.sidebar.select(None);
            }
            _ => {}
        }
    }

    fn select_next(&mut self) {
        let count = self.guide_count();
        if count == 0 {
            return;
        }
        let next = match self.sidebar.selected() {
            Some(i) if i + 1 < count => i + 1,
            Some(i) => i,
            None => 0,
        };
        self.sidebar.select(Some(next));
    }

    fn select_previous(&mut self) {
        if self.guide_count() == 0 {
            return;
        }
        let prev = self.sidebar.selected().map_or(0, |i| i.saturating_sub(1));
        self.sidebar.select(Some(prev));
    }

    fn open_selected(&mut self) {
        let slug = self.sidebar.selected().and_then(|index| {
            self.controller
                .listing()
                .data()
                .and_then(|docs| docs.get(index))
                .map(|doc| doc.slug.clone())
        });
        if let Some(slug) = slug {
            self.controller.open(&slug);
        }
    }

    fn guide_count(&self) -> usize {
        self.controller.listing().data().map(Vec::len).unwrap_or(0)
    }

    fn page(&self) -> u16 {
        (self.viewport_height / 2).max(1)
    }

    fn max_scroll(&self) -> u16 {
        let total = u16::try_from(self.rendered.len()).unwrap_or(u16::MAX);
        total.saturating_sub(self.viewport_height)
    }

    fn scroll_down(&mut self, by: u16) {
        self.scroll = self.scroll.saturating_add(by).min(self.max_scroll());
    }

    fn scroll_up(&mut self, by: u16) {
        self.scroll = self.scroll.saturating_sub(by);
    }
}
