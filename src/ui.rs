//! Terminal UI rendering.
//!
//! All drawing logic lives here, separated from application state ([`App`])
//! and input handling ([`crate::input`]).
//!
//! ## For contributors
//!
//! * The layout is a three-row split: the scrollable post list, a one-line
//!   footer for the loading / end-of-feed / error indicator, and a status bar.
//! * Every post is exactly [`ITEM_HEIGHT`] rows tall.  The visible window the
//!   sentinel sees is derived from that, so keep them in sync if you change
//!   the card layout.  A list with room for less than one card falls back to
//!   one-line cards so the last post can still come into view.
//! * "Read more" draws the selected post in full over the list.  The list
//!   underneath keeps its layout, so the viewport is unaffected.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::loader::LoadState;
use crate::source::Post;

/// Rows per rendered post.
pub const ITEM_HEIGHT: u16 = 2;

/// Draw the complete UI for one frame.
pub fn draw(app: &mut App, frame: &mut Frame) {
    let [main_area, footer_area, status_area] = Layout::vertical([
        Constraint::Min(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    draw_feed_list(app, frame, main_area);
    draw_read_more(app, frame, main_area);
    draw_footer(app, frame, footer_area);
    draw_status_bar(app, frame, status_area);
}

fn post_heading(post: &Post) -> Line<'_> {
    Line::from(vec![
        Span::styled(
            post.title(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            format!("By User {}", post.user_id()),
            Style::default().fg(Color::Cyan),
        ),
    ])
}

fn post_card(post: &Post) -> ListItem<'_> {
    let body = Line::from(Span::styled(
        format!("  {}", post.body().replace('\n', " ")),
        Style::default().fg(Color::DarkGray),
    ));
    ListItem::new(vec![post_heading(post), body])
}

/// Render the scrollable post list and record how many posts fit.
fn draw_feed_list(app: &mut App, frame: &mut Frame, area: Rect) {
    let inner_height = area.height.saturating_sub(2);
    let compact = inner_height > 0 && inner_height < ITEM_HEIGHT;

    let posts = app.loader.items().iter();
    let list_items: Vec<ListItem> = if compact {
        posts.map(|post| ListItem::new(post_heading(post))).collect()
    } else {
        posts.map(post_card).collect()
    };

    let list = List::new(list_items)
        .block(
            Block::default()
                .title(" Latest Blog Posts ")
                .borders(Borders::ALL),
        )
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("▸ ");

    app.viewport_rows = if compact {
        inner_height as usize
    } else {
        (inner_height / ITEM_HEIGHT) as usize
    };

    frame.render_stateful_widget(list, area, &mut app.list_state);
}

/// Render the full text of the post being read over the list.
fn draw_read_more(app: &App, frame: &mut Frame, area: Rect) {
    let Some(post) = app.reading_post() else {
        return;
    };

    let mut lines = vec![post_heading(post), Line::default()];
    lines.extend(post.body().lines().map(Line::from));

    let popup = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .title(" Read More ")
                .title_bottom(" Enter: back to feed ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        );
    frame.render_widget(Clear, area);
    frame.render_widget(popup, area);
}

/// Render the loading / end-of-feed / error indicator.
fn draw_footer(app: &App, frame: &mut Frame, area: Rect) {
    let line = match (app.loader.state(), app.loader.last_error()) {
        (LoadState::Loading, _) => {
            let page = app.loader.in_flight().map_or(app.loader.cursor(), |r| r.page);
            Line::from(Span::styled(
                format!(" ⟳ Loading more posts... (page {page})"),
                Style::default().fg(Color::Yellow),
            ))
        }
        (LoadState::Exhausted, _) => Line::from(Span::styled(
            " No more posts to load.",
            Style::default().fg(Color::DarkGray),
        )),
        (LoadState::Idle, Some(err)) => Line::from(Span::styled(
            format!(
                " Failed to load page {}: {err}  (r to retry)",
                app.loader.cursor()
            ),
            Style::default().fg(Color::Red),
        )),
        (LoadState::Idle, None) if app.viewport_rows == 0 && !app.loader.items().is_empty() => {
            Line::from(Span::styled(
                " Window too small to show posts; enlarge it or press r to load more",
                Style::default().fg(Color::Yellow),
            ))
        }
        (LoadState::Idle, None) => Line::default(),
    };
    frame.render_widget(Paragraph::new(line), area);
}

/// Render the bottom status bar.
fn draw_status_bar(app: &App, frame: &mut Frame, area: Rect) {
    let updated = app
        .last_update
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "--:--:--".into());

    let status = Paragraph::new(Line::from(vec![
        Span::styled(" ", Style::default()),
        Span::styled(&app.status, Style::default().fg(Color::Yellow)),
        Span::raw("  "),
        Span::styled(
            format!("{} items", app.loader.items().len()),
            Style::default().fg(Color::Green),
        ),
        Span::raw("  "),
        Span::styled(
            format!("page {} @ {updated}", app.loader.cursor()),
            Style::default().fg(Color::DarkGray),
        ),
        Span::raw("  q: quit  ↑/↓: scroll  PgUp/PgDn: page  Enter: read more  r: retry"),
    ]));
    frame.render_widget(status, area);
}

// ---------------------------------------------------------------------------
// Tests (rendering smoke tests)
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FailureKind, FetchError};
    use crate::fetch::Completion;
    use crate::source::Post;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn render(app: &mut App, width: u16, height: u16) -> String {
        let backend = TestBackend::new(width, height);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw(app, f)).unwrap();
        let buf = terminal.backend().buffer().clone();
        buf.content()
            .iter()
            .map(|c| c.symbol().chars().next().unwrap_or(' '))
            .collect()
    }

    fn complete_first_page(app: &mut App, result: Result<Vec<Post>, FetchError>) {
        app.start();
        let request = app.take_request().unwrap();
        app.apply(Completion { request, result });
    }

    fn posts(count: u64) -> Vec<Post> {
        (1..=count)
            .map(|id| Post::new(id, format!("Title {id}"), "first line\nsecond line", 7))
            .collect()
    }

    #[test]
    fn draw_does_not_panic_with_no_items() {
        let mut app = App::new("test");
        render(&mut app, 80, 24);
    }

    #[test]
    fn draw_does_not_panic_on_tiny_terminal() {
        let mut app = App::new("test");
        complete_first_page(&mut app, Ok(posts(3)));
        render(&mut app, 10, 3);
        assert_eq!(app.viewport_rows, 0);
    }

    #[test]
    fn draw_shows_post_cards() {
        let mut app = App::new("test");
        complete_first_page(&mut app, Ok(posts(3)));

        let text = render(&mut app, 80, 24);
        assert!(text.contains("Title 2"));
        assert!(text.contains("By User 7"));
        assert!(text.contains("first line second line"), "body is flattened");
        assert!(text.contains("3 items"));
        assert!(text.contains("Latest Blog Posts"));
    }

    #[test]
    fn read_more_shows_full_body_of_selected_post() {
        let mut app = App::new("test");
        complete_first_page(
            &mut app,
            Ok(vec![Post::new(1, "Only post", "opening paragraph\nclosing paragraph", 4)]),
        );
        app.select_first();
        app.toggle_read_more();

        let text = render(&mut app, 80, 24);
        assert!(text.contains("Read More"));
        assert!(text.contains("opening paragraph"));
        assert!(text.contains("closing paragraph"));
        assert_eq!(app.viewport_rows, 10, "list layout is kept underneath");

        app.toggle_read_more();
        let text = render(&mut app, 80, 24);
        assert!(!text.contains("Read More"));
    }

    #[test]
    fn one_row_list_uses_compact_cards_and_keeps_paging() {
        let mut app = App::new("test");
        complete_first_page(&mut app, Ok(posts(1)));

        // 5 rows - footer - status - borders leaves a single list row.
        let text = render(&mut app, 80, 5);
        assert_eq!(app.viewport_rows, 1);
        assert!(text.contains("Title 1"));

        app.after_draw();
        assert_eq!(app.take_request().map(|r| r.page), Some(2));
    }

    #[test]
    fn footer_explains_when_no_post_fits() {
        let mut app = App::new("test");
        complete_first_page(&mut app, Ok(posts(3)));

        let text = render(&mut app, 80, 4);
        assert_eq!(app.viewport_rows, 0);
        assert!(text.contains("Window too small"));
    }

    #[test]
    fn draw_records_viewport_rows() {
        let mut app = App::new("test");
        render(&mut app, 80, 24);
        // 24 rows - footer - status - two border rows = 20 rows = 10 posts.
        assert_eq!(app.viewport_rows, 10);
    }

    #[test]
    fn footer_shows_loading_indicator() {
        let mut app = App::new("test");
        app.start();
        let text = render(&mut app, 80, 24);
        assert!(text.contains("Loading more posts..."));
    }

    #[test]
    fn footer_shows_end_of_feed() {
        let mut app = App::new("test");
        complete_first_page(&mut app, Ok(Vec::new()));
        let text = render(&mut app, 80, 24);
        assert!(text.contains("No more posts to load."));
    }

    #[test]
    fn footer_shows_retry_hint_after_failure() {
        let mut app = App::new("test");
        complete_first_page(
            &mut app,
            Err(FetchError::new(FailureKind::HttpStatus(502), "Bad Gateway")),
        );
        let text = render(&mut app, 100, 24);
        assert!(text.contains("Failed to load page 1"));
        assert!(text.contains("(r to retry)"));
    }

    #[test]
    fn short_feed_on_screen_asks_for_more_after_draw() {
        let mut app = App::new("test");
        complete_first_page(&mut app, Ok(posts(3)));

        render(&mut app, 80, 24);
        app.after_draw();
        assert_eq!(app.take_request().map(|r| r.page), Some(2));
    }
}
