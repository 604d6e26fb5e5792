//! Terminal UI rendering.
//!
//! All drawing logic lives here, separated from application state ([`App`])
//! and input handling ([`crate::input`]).  Rendering only reads the store and
//! the search term; the visible subset is recomputed on every frame.
//!
//! ## For contributors
//!
//! * The layout is a three-row split: search box on top, the story list in
//!   the middle and a one-line status bar at the bottom.
//! * Colours and styles are defined inline.
//! * [`ratatui`] is the TUI framework; see its docs for widget details.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::app::App;
use crate::source::Story;

/// Draw the complete UI for one frame.
pub fn draw(app: &mut App, frame: &mut Frame) {
    let [search_area, main_area, status_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    draw_search_box(app, frame, search_area);
    draw_story_list(app, frame, main_area);
    draw_status_bar(app, frame, status_area);
}

fn draw_search_box(app: &App, frame: &mut Frame, area: Rect) {
    let title = if app.search_is_saved() {
        " Search "
    } else {
        " Search (not saved) "
    };
    let search = Paragraph::new(Line::from(vec![
        Span::styled(app.search_term().to_string(), Style::default().fg(Color::White)),
        Span::styled("▏", Style::default().fg(Color::DarkGray)),
    ]))
    .block(Block::default().title(title).borders(Borders::ALL));
    frame.render_widget(search, area);
}

/// Render the story list, or the loading / error placeholder.
fn draw_story_list(app: &mut App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .title(" My Hacker Stories ")
        .borders(Borders::ALL);

    let state = app.state();
    if state.is_error {
        let message = Paragraph::new(Line::styled(
            "Something went wrong ...",
            Style::default().fg(Color::Red),
        ))
        .block(block);
        frame.render_widget(message, area);
        return;
    }
    if state.is_loading && state.items.is_empty() {
        let message = Paragraph::new(Line::styled(
            "Loading ...",
            Style::default().fg(Color::Yellow),
        ))
        .block(block);
        frame.render_widget(message, area);
        return;
    }

    let list_items: Vec<ListItem> = app
        .visible()
        .into_iter()
        .map(|story| ListItem::new(story_line(story)))
        .collect();

    let list = List::new(list_items)
        .block(block)
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(Color::DarkGray),
        )
        .highlight_symbol("▸ ");

    frame.render_stateful_widget(list, area, &mut app.list_state);
}

fn story_line(story: &Story) -> Line<'static> {
    Line::from(vec![
        Span::styled(story.title.clone(), Style::default().fg(Color::White)),
        Span::raw("  "),
        Span::styled(story.author.clone(), Style::default().fg(Color::Cyan)),
        Span::raw("  "),
        Span::styled(
            format!("{} comments", story.num_comments),
            Style::default().fg(Color::DarkGray),
        ),
        Span::raw("  "),
        Span::styled(
            format!("{} points", story.points),
            Style::default().fg(Color::Green),
        ),
        Span::raw("  "),
        Span::styled(story.url.clone(), Style::default().fg(Color::Blue)),
    ])
}

fn status_text(app: &App) -> String {
    let state = app.state();
    if state.is_loading {
        "Loading…".to_string()
    } else if state.is_error {
        "Fetch failed, F5 to retry".to_string()
    } else if let Some(at) = app.last_fetched {
        format!("Fetched at {}", at.format("%H:%M:%S"))
    } else {
        "Ready".to_string()
    }
}

/// Render the bottom status bar.
fn draw_status_bar(app: &App, frame: &mut Frame, area: Rect) {
    let status = Paragraph::new(Line::from(vec![
        Span::styled(" ", Style::default()),
        Span::styled(status_text(app), Style::default().fg(Color::Yellow)),
        Span::raw("  "),
        Span::styled(
            format!("{}/{} stories", app.visible().len(), app.state().items.len()),
            Style::default().fg(Color::Green),
        ),
        Span::raw("  Esc: quit  Del: remove  F5: refresh"),
    ]));
    frame.render_widget(status, area);
}

// ---------------------------------------------------------------------------
// Tests (smoke tests against an in-memory terminal)
// ---------------------------------------------------------------------------
