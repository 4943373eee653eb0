//! TUI application state management.

use crate::bridge::{RenderedOutcome, RunStatus};
use crate::catalog::{self, ExampleSelector, EXAMPLES};
use crate::consent::ConsentBanner;
use crate::error::{BridgeError, LoadError};
use crate::share;
use crate::utils::unicode::{char_to_byte_index, display_column};

/// Spaces inserted by the Tab key.
pub const TAB_INDENT: &str = "    ";

/// A row of tabs, exactly one of which is active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabBar {
    titles: Vec<String>,
    active: usize,
}

impl TabBar {
    pub fn new<I, S>(titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { titles: titles.into_iter().map(Into::into).collect(), active: 0 }
    }

    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    pub fn active(&self) -> usize {
        self.active
    }

    pub fn is_active(&self, idx: usize) -> bool {
        self.active == idx
    }

    pub fn select(&mut self, idx: usize) -> bool {
        if idx < self.titles.len() {
            self.active = idx;
            true
        } else {
            false
        }
    }

    pub fn next(&mut self) {
        if !self.titles.is_empty() {
            self.active = (self.active + 1) % self.titles.len();
        }
    }

    pub fn prev(&mut self) {
        if !self.titles.is_empty() {
            self.active = (self.active + self.titles.len() - 1) % self.titles.len();
        }
    }
}

/// Side navigation menu: open or closed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavMenu {
    open: bool,
}

impl NavMenu {
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn toggle(&mut self) {
        self.open = !self.open;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Playground = 0,
    Examples = 1,
}

/// Overlay drawn above the main screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    None,
    Help,
    Share { link: String },
}

/// Multi-line source buffer with a byte-indexed cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Editor {
    text: String,
    cursor: usize,
}

impl Editor {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let cursor = text.len();
        Self { text, cursor }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Replace the whole buffer and move the cursor to the end.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.cursor = self.text.len();
    }

    pub fn insert_char(&mut self, c: char) {
        self.text.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn insert_str(&mut self, s: &str) {
        self.text.insert_str(self.cursor, s);
        self.cursor += s.len();
    }

    pub fn newline(&mut self) {
        self.insert_char('\n');
    }

    pub fn backspace(&mut self) {
        if let Some(c) = self.text[..self.cursor].chars().next_back() {
            self.cursor -= c.len_utf8();
            self.text.remove(self.cursor);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.text.len() {
            self.text.remove(self.cursor);
        }
    }

    pub fn move_left(&mut self) {
        if let Some(c) = self.text[..self.cursor].chars().next_back() {
            self.cursor -= c.len_utf8();
        }
    }

    pub fn move_right(&mut self) {
        if let Some(c) = self.text[self.cursor..].chars().next() {
            self.cursor += c.len_utf8();
        }
    }

    fn line_start(&self) -> usize {
        self.text[..self.cursor].rfind('\n').map(|i| i + 1).unwrap_or(0)
    }

    fn line_end(&self) -> usize {
        self.text[self.cursor..].find('\n').map(|i| self.cursor + i).unwrap_or(self.text.len())
    }

    pub fn move_home(&mut self) {
        self.cursor = self.line_start();
    }

    pub fn move_end(&mut self) {
        self.cursor = self.line_end();
    }

    pub fn move_up(&mut self) {
        let start = self.line_start();
        if start == 0 {
            return;
        }
        let col = self.text[start..self.cursor].chars().count();
        let prev_start = self.text[..start - 1].rfind('\n').map(|i| i + 1).unwrap_or(0);
        let prev_line = &self.text[prev_start..start - 1];
        self.cursor = prev_start + char_to_byte_index(prev_line, col);
    }

    pub fn move_down(&mut self) {
        let end = self.line_end();
        if end == self.text.len() {
            return;
        }
        let col = self.text[self.line_start()..self.cursor].chars().count();
        let next_start = end + 1;
        let next_end = self.text[next_start..].find('\n').map(|i| next_start + i).unwrap_or(self.text.len());
        let next_line = &self.text[next_start..next_end];
        self.cursor = next_start + char_to_byte_index(next_line, col);
    }

    /// Cursor as (row, display column) for terminal placement.
    pub fn cursor_position(&self) -> (usize, usize) {
        let before = &self.text[..self.cursor];
        let row = before.matches('\n').count();
        let line = &before[self.line_start()..];
        (row, display_column(line))
    }
}

/// Application state for the playground TUI
pub struct App {
    pub editor: Editor,
    pub output: RenderedOutcome,
    pub status: RunStatus,
    /// A run is in flight; the run control is disabled until it finishes.
    pub running: bool,
    /// Whether a run may retry a failed engine load.
    pub retry_load: bool,
    pub selector: ExampleSelector,
    pub tabs: TabBar,
    pub gallery: TabBar,
    pub nav: NavMenu,
    pub overlay: Overlay,
    pub consent: ConsentBanner,
    pub playground_url: String,
    pub output_scroll: u16,
}

impl App {
    pub fn new(source: String, consent: ConsentBanner, playground_url: String, retry_load: bool) -> Self {
        Self {
            editor: Editor::new(source),
            output: RenderedOutcome::cleared(),
            status: RunStatus::Loading,
            running: false,
            retry_load,
            selector: ExampleSelector::new(),
            tabs: TabBar::new(["Playground", "Examples"]),
            gallery: TabBar::new(EXAMPLES.iter().map(|ex| ex.name)),
            nav: NavMenu::default(),
            overlay: Overlay::None,
            consent,
            playground_url,
            output_scroll: 0,
        }
    }

    pub fn view(&self) -> View {
        if self.tabs.is_active(View::Examples as usize) {
            View::Examples
        } else {
            View::Playground
        }
    }

    pub fn show_view(&mut self, view: View) {
        self.tabs.select(view as usize);
    }

    /// Replace the editor with example `idx` and clear the output.
    ///
    /// Unsaved edits are overwritten without confirmation.
    pub fn select_example(&mut self, idx: usize) -> bool {
        match self.selector.select_index(idx) {
            Some(example) => {
                self.editor.set_text(example.code);
                self.clear_output();
                true
            }
            None => false,
        }
    }

    pub fn next_example(&mut self) {
        let idx = (self.selector.index() + 1) % EXAMPLES.len();
        self.select_example(idx);
    }

    pub fn prev_example(&mut self) {
        let idx = (self.selector.index() + EXAMPLES.len() - 1) % EXAMPLES.len();
        self.select_example(idx);
    }

    /// Load the example shown in the gallery into the playground.
    pub fn open_gallery_example(&mut self) {
        let idx = self.gallery.active();
        if self.select_example(idx) {
            self.show_view(View::Playground);
        }
    }

    pub fn clear_output(&mut self) {
        self.output = RenderedOutcome::cleared();
        self.output_scroll = 0;
    }

    pub fn can_run(&self) -> bool {
        if self.running {
            return false;
        }
        !matches!(self.status, RunStatus::LoadFailed(_)) || self.retry_load
    }

    /// Claim the run control. Returns the source to submit, or `None` while
    /// the control is disabled.
    pub fn begin_run(&mut self) -> Option<String> {
        if !self.can_run() {
            return None;
        }
        self.running = true;
        Some(self.editor.text().to_string())
    }

    pub fn finish_run(&mut self, result: Result<RenderedOutcome, BridgeError>) {
        self.running = false;
        match result {
            Ok(outcome) => {
                self.output = outcome;
                self.output_scroll = 0;
            }
            // Load failures are already on the status bar; a not-ready
            // refusal leaves everything as it was.
            Err(BridgeError::Load(_)) | Err(BridgeError::NotReady) => {}
        }
    }

    pub fn set_status(&mut self, status: RunStatus) {
        self.status = status;
    }

    pub fn share_link(&self) -> String {
        share::share_url(&self.playground_url, self.editor.text())
    }

    pub fn show_share(&mut self) {
        self.overlay = Overlay::Share { link: self.share_link() };
    }

    pub fn toggle_help(&mut self) {
        self.overlay = match self.overlay {
            Overlay::Help => Overlay::None,
            _ => Overlay::Help,
        };
    }

    pub fn hide_overlay(&mut self) {
        self.overlay = Overlay::None;
    }

    pub fn is_overlay_shown(&self) -> bool {
        self.overlay != Overlay::None
    }

    pub fn scroll_output_up(&mut self) {
        self.output_scroll = self.output_scroll.saturating_sub(1);
    }

    pub fn scroll_output_down(&mut self) {
        self.output_scroll = self.output_scroll.saturating_add(1);
    }

    /// Name of the example the editor holds, unchanged. `None` once the
    /// buffer has been edited or came from a share link.
    pub fn current_example_name(&self) -> Option<&'static str> {
        example_name_for(self.editor.text())
    }

    /// Background engine load finished. A run that joined the same load is
    /// already reporting its own status, which must not be overwritten.
    pub fn engine_loaded(&mut self, result: Result<(), LoadError>) {
        match result {
            Ok(()) if self.running => {}
            Ok(()) => self.set_status(RunStatus::Ready),
            Err(err) => self.set_status(RunStatus::LoadFailed(err.to_string())),
        }
    }
}

fn example_name_for(source: &str) -> Option<&'static str> {
    catalog::EXAMPLES.iter().find(|ex| ex.code == source).map(|ex| ex.name)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::bridge::OutputClass;
    use crate::consent::{DataLayer, MemoryConsentStore};

    fn app() -> App {
        let banner = ConsentBanner::new(
            Arc::new(MemoryConsentStore::default()),
            Arc::new(DataLayer::new()),
            true,
        );
        App::new(catalog::default_example().code.to_string(), banner, String::new(), true)
    }

    #[test]
    fn test_tab_bar_exclusive() {
        let mut tabs = TabBar::new(["a", "b", "c"]);
        assert!(tabs.is_active(0));
        tabs.next();
        assert!(tabs.is_active(1) && !tabs.is_active(0));
        tabs.prev();
        tabs.prev();
        assert_eq!(tabs.active(), 2);
        assert!(!tabs.select(3));
        assert_eq!(tabs.active(), 2);
    }

    #[test]
    fn test_nav_toggle() {
        let mut nav = NavMenu::default();
        assert!(!nav.is_open());
        nav.toggle();
        assert!(nav.is_open());
        nav.toggle();
        assert!(!nav.is_open());
    }

    #[test]
    fn test_editor_editing() {
        let mut ed = Editor::new("ab");
        ed.move_left();
        ed.insert_char('é');
        assert_eq!(ed.text(), "aéb");
        ed.backspace();
        assert_eq!(ed.text(), "ab");
        ed.insert_str(TAB_INDENT);
        assert_eq!(ed.text(), "a    b");
        ed.delete();
        assert_eq!(ed.text(), "a    ");
        ed.move_home();
        ed.delete();
        assert_eq!(ed.text(), "    ");
    }

    #[test]
    fn test_editor_vertical_movement() {
        let mut ed = Editor::new("abcd\nx\nwxyz");
        assert_eq!(ed.cursor_position(), (2, 4));
        ed.move_up();
        assert_eq!(ed.cursor_position(), (1, 1));
        ed.move_up();
        assert_eq!(ed.cursor_position(), (0, 1));
        ed.move_end();
        ed.move_down();
        assert_eq!(ed.cursor_position(), (1, 1));
        ed.move_down();
        assert_eq!(ed.cursor_position(), (2, 1));
        ed.move_down();
        assert_eq!(ed.cursor_position(), (2, 1));
    }

    #[test]
    fn test_select_example_overwrites_and_clears() {
        let mut app = app();
        app.editor.set_text("unsaved work");
        app.output = RenderedOutcome { text: "old".into(), class: OutputClass::Error, failed: true };
        assert!(app.select_example(2));
        assert_eq!(app.editor.text(), EXAMPLES[2].code);
        assert_eq!(app.output, RenderedOutcome::cleared());
        assert_eq!(app.current_example_name(), Some("FizzBuzz"));
    }

    #[test]
    fn test_gallery_opens_in_playground() {
        let mut app = app();
        app.show_view(View::Examples);
        app.gallery.select(4);
        app.open_gallery_example();
        assert_eq!(app.view(), View::Playground);
        assert_eq!(app.current_example_name(), Some("Kitty & Groom"));
    }

    #[test]
    fn test_run_control_disabled_while_running() {
        let mut app = app();
        assert!(app.begin_run().is_some());
        assert!(app.begin_run().is_none());
        app.finish_run(Ok(RenderedOutcome { text: "Hello, World!\n".into(), class: OutputClass::Plain, ..Default::default() }));
        assert!(!app.running);
        assert_eq!(app.output.text, "Hello, World!\n");
        assert!(app.can_run());
    }

    #[test]
    fn test_load_failure_keeps_output() {
        let mut app = app();
        app.output = RenderedOutcome { text: "previous".into(), class: OutputClass::Plain, ..Default::default() };
        app.begin_run();
        app.finish_run(Err(BridgeError::Load(LoadError::MissingBootstrap)));
        assert_eq!(app.output.text, "previous");
    }

    #[test]
    fn test_failed_load_disables_run_without_retry() {
        let mut app = app();
        app.retry_load = false;
        app.set_status(RunStatus::LoadFailed("gone".into()));
        assert!(!app.can_run());
        app.retry_load = true;
        assert!(app.can_run());
    }

    #[test]
    fn test_edited_buffer_has_no_example_name() {
        let mut app = app();
        assert_eq!(app.current_example_name(), Some("Hello World"));
        app.editor.insert_char('!');
        assert_eq!(app.current_example_name(), None);
    }

    #[test]
    fn test_engine_loaded_keeps_running_status() {
        let mut app = app();
        app.begin_run();
        app.set_status(RunStatus::Running);
        app.engine_loaded(Ok(()));
        assert_eq!(app.status, RunStatus::Running);

        app.finish_run(Ok(RenderedOutcome::cleared()));
        app.set_status(RunStatus::Loading);
        app.engine_loaded(Ok(()));
        assert_eq!(app.status, RunStatus::Ready);

        app.engine_loaded(Err(LoadError::MissingBootstrap));
        assert!(matches!(app.status, RunStatus::LoadFailed(_)));
    }

    #[test]
    fn test_share_overlay() {
        let mut app = app();
        app.editor.set_text("x");
        app.show_share();
        assert_eq!(app.overlay, Overlay::Share { link: "#code=eA==".into() });
        app.hide_overlay();
        assert!(!app.is_overlay_shown());
    }
}
