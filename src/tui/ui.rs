//! UI layout and rendering logic for the TUI.

use ratatui::{
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Tabs, Wrap},
    Frame,
};

use super::app::{App, Overlay, View};
use crate::bridge::OutputClass;
use crate::catalog::EXAMPLES;
use crate::utils::unicode::truncate_to_width;

const NAV_WIDTH: u16 = 24;

/// Render the main UI
pub fn render_ui(frame: &mut Frame, app: &App) {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tabs
            Constraint::Min(5),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    render_tabs(frame, app, main_layout[0]);

    let content = if app.nav.is_open() {
        let split = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(NAV_WIDTH), Constraint::Min(10)])
            .split(main_layout[1]);
        render_nav(frame, app, split[0]);
        split[1]
    } else {
        main_layout[1]
    };

    match app.view() {
        View::Playground => render_playground(frame, app, content),
        View::Examples => render_gallery(frame, app, content),
    }

    render_status_bar(frame, app, main_layout[2]);

    match &app.overlay {
        Overlay::Help => render_help_overlay(frame),
        Overlay::Share { link } => render_share_popup(frame, link),
        Overlay::None => {}
    }

    if app.consent.is_visible() {
        render_consent_banner(frame);
    }
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = app.tabs.titles().iter().map(|t| Line::from(t.as_str())).collect();
    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL).title("Meow Playground"))
        .select(app.tabs.active())
        .highlight_style(Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD));
    frame.render_widget(tabs, area);
}

fn render_nav(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = EXAMPLES
        .iter()
        .enumerate()
        .map(|(i, ex)| {
            let style = if i == app.selector.index() {
                Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(Line::from(Span::styled(ex.name, style)))
        })
        .collect();
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title("Examples (^N/^P)"));
    frame.render_widget(list, area);
}

fn render_playground(frame: &mut Frame, app: &App, area: Rect) {
    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    let editor_title = match app.current_example_name() {
        Some(name) => format!("Editor - {}", name),
        None => "Editor".to_string(),
    };
    let editor = Paragraph::new(app.editor.text())
        .block(Block::default().borders(Borders::ALL).title(editor_title));

    // Keep the cursor row visible.
    let (row, col) = app.editor.cursor_position();
    let inner_height = panes[0].height.saturating_sub(2) as usize;
    let scroll = row.saturating_sub(inner_height.saturating_sub(1));
    frame.render_widget(editor.scroll((scroll as u16, 0)), panes[0]);

    if !app.consent.is_visible() && !app.is_overlay_shown() {
        let x = panes[0].x + 1 + col.min(panes[0].width.saturating_sub(3) as usize) as u16;
        let y = panes[0].y + 1 + (row - scroll) as u16;
        frame.set_cursor_position(Position::new(x, y));
    }

    let output_style = match app.output.class {
        OutputClass::Plain => Style::default(),
        OutputClass::Error => Style::default().fg(Color::Red),
    };
    let run_hint = if app.can_run() { "Output (F5 run)" } else { "Output (running...)" };
    let output = Paragraph::new(Text::styled(app.output.text.as_str(), output_style))
        .block(Block::default().borders(Borders::ALL).title(run_hint))
        .wrap(Wrap { trim: false })
        .scroll((app.output_scroll, 0));
    frame.render_widget(output, panes[1]);
}

fn render_gallery(frame: &mut Frame, app: &App, area: Rect) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(area);

    let titles: Vec<Line> = app.gallery.titles().iter().map(|t| Line::from(t.as_str())).collect();
    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL))
        .select(app.gallery.active())
        .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
    frame.render_widget(tabs, layout[0]);

    let example = &EXAMPLES[app.gallery.active()];
    let panel = Paragraph::new(example.code)
        .block(Block::default().borders(Borders::ALL).title(format!("{} (Enter: open in playground)", example.name)));
    frame.render_widget(panel, layout[1]);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let hints = " | F1 help";
    let width = (area.width as usize).saturating_sub(hints.len());
    let status = truncate_to_width(&app.status.text(), width);
    let line = Line::from(vec![
        Span::styled(status, Style::default().fg(app.status.color()).add_modifier(Modifier::BOLD)),
        Span::raw(hints),
    ]);
    let paragraph = Paragraph::new(line).style(Style::default().bg(Color::DarkGray).fg(Color::White));
    frame.render_widget(paragraph, area);
}

fn render_help_overlay(frame: &mut Frame) {
    let popup_area = centered_rect(70, 70, frame.area());
    frame.render_widget(Clear, popup_area);

    let help_lines = vec![
        Line::from("Meow Playground Help"),
        Line::from(""),
        Line::from("Run:"),
        Line::from("  F5 / Ctrl+R  - Run the program"),
        Line::from("  Ctrl+L       - Clear output"),
        Line::from("  PgUp/PgDn    - Scroll output"),
        Line::from(""),
        Line::from("Examples:"),
        Line::from("  Ctrl+N/P     - Next/previous example (replaces the editor)"),
        Line::from("  F3           - Switch Playground/Examples tab"),
        Line::from("  F2           - Toggle example menu"),
        Line::from(""),
        Line::from("Other:"),
        Line::from("  Ctrl+S       - Share link"),
        Line::from("  Tab          - Indent four spaces"),
        Line::from("  Ctrl+C/Q     - Quit"),
    ];

    let help = Paragraph::new(help_lines)
        .block(Block::default().borders(Borders::ALL).title("Help (any key to close)"))
        .wrap(Wrap { trim: false });
    frame.render_widget(help, popup_area);
}

fn render_share_popup(frame: &mut Frame, link: &str) {
    let popup_area = centered_rect(80, 40, frame.area());
    frame.render_widget(Clear, popup_area);
    let popup = Paragraph::new(link)
        .block(Block::default().borders(Borders::ALL).title("Share link (any key to close)"))
        .wrap(Wrap { trim: false });
    frame.render_widget(popup, popup_area);
}

fn render_consent_banner(frame: &mut Frame) {
    let area = frame.area();
    let height = 5.min(area.height);
    let banner_area = Rect::new(area.x, area.y + area.height - height, area.width, height);
    frame.render_widget(Clear, banner_area);
    let lines = vec![
        Line::from("We use analytics to learn how the playground is used."),
        Line::from(vec![
            Span::styled("[a] Accept", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
            Span::raw("   "),
            Span::styled("[r] Reject", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
        ]),
    ];
    let banner = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Analytics consent"))
        .wrap(Wrap { trim: true });
    frame.render_widget(banner, banner_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    use super::*;
    use crate::bridge::{RenderedOutcome, RunStatus};
    use crate::catalog;
    use crate::consent::{ConsentBanner, DataLayer, MemoryConsentStore};

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        buffer.content().iter().map(|cell| cell.symbol()).collect()
    }

    fn app(dnt: bool) -> App {
        let mut banner = ConsentBanner::new(
            Arc::new(MemoryConsentStore::default()),
            Arc::new(DataLayer::new()),
            dnt,
        );
        banner.initialize();
        App::new(catalog::default_example().code.to_string(), banner, String::new(), true)
    }

    #[test]
    fn test_renders_editor_output_and_status() {
        let mut app = app(true);
        app.output = RenderedOutcome { text: "Hello, World!".into(), class: OutputClass::Plain, ..Default::default() };
        app.set_status(RunStatus::Ready);

        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();
        terminal.draw(|frame| render_ui(frame, &app)).unwrap();
        let text = buffer_text(&terminal);
        assert!(text.contains("nya(\"Hello, World!\")"));
        assert!(text.contains("Hello, World!"));
        assert!(text.contains("Ready"));
        assert!(!text.contains("Analytics consent"));
    }

    #[test]
    fn test_renders_consent_banner_when_unset() {
        let app = app(false);
        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();
        terminal.draw(|frame| render_ui(frame, &app)).unwrap();
        assert!(buffer_text(&terminal).contains("Analytics consent"));
    }

    #[test]
    fn test_centered_rect_inside_parent() {
        let parent = Rect::new(0, 0, 100, 50);
        let popup = centered_rect(80, 40, parent);
        assert!(popup.x >= parent.x && popup.right() <= parent.right());
        assert!(popup.y >= parent.y && popup.bottom() <= parent.bottom());
    }
}
