use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph, Wrap};
use ratatui::Frame;
use time::OffsetDateTime;
use vox_core::itinerary::narrative_or_default;
use vox_core::{StoryView, Theme};
use vox_notify::Level;

use super::app::App;

struct Palette {
    base: Style,
    accent: Color,
    muted: Color,
}

fn palette(theme: Theme) -> Palette {
    match theme {
        Theme::Dark => Palette {
            base: Style::default().fg(Color::White).bg(Color::Black),
            accent: Color::Cyan,
            muted: Color::DarkGray,
        },
        Theme::Light => Palette {
            base: Style::default().fg(Color::Black).bg(Color::White),
            accent: Color::Blue,
            muted: Color::Gray,
        },
    }
}

/// Render the full TUI frame.
pub fn render(f: &mut Frame, app: &App) {
    let p = palette(app.store.theme());
    f.render_widget(Block::default().style(p.base), f.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // header
            Constraint::Min(5),    // main area
            Constraint::Length(1), // status bar
        ])
        .split(f.area());

    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(60), // story
            Constraint::Percentage(40), // itinerary
        ])
        .split(chunks[1]);

    render_header(f, app, &p, chunks[0]);
    render_story(f, app, &p, main_chunks[0]);
    render_itinerary(f, app, &p, main_chunks[1]);
    render_status_bar(f, app, &p, chunks[2]);
}

fn render_header(f: &mut Frame, app: &App, p: &Palette, area: Rect) {
    let state = app.store.state();
    let title = state
        .trip_constraints
        .destination
        .as_deref()
        .unwrap_or("Untitled trip");
    let text = format!(
        " vox | {title} | {} days, {} stops",
        state.itinerary.len(),
        state.stops.len()
    );
    let header = Paragraph::new(Line::from(Span::styled(
        text,
        Style::default().fg(p.accent).add_modifier(Modifier::BOLD),
    )));
    f.render_widget(header, area);
}

fn render_story(f: &mut Frame, app: &App, p: &Palette, area: Rect) {
    let block = Block::default()
        .title(" Story ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(p.accent));

    let lines = match app.store.story_view() {
        StoryView::Inactive => vec![Line::from(Span::styled(
            "Story mode is off. Press m to start.",
            Style::default().fg(p.muted),
        ))],
        StoryView::Empty => vec![Line::from("Itinerary is empty.")],
        StoryView::Stop(frame) => {
            let position = match (frame.is_first, frame.is_last) {
                (true, true) => "only stop",
                (true, false) => "first stop",
                (false, true) => "last stop",
                (false, false) => "",
            };
            vec![
                Line::from(Span::styled(
                    format!("Day {}  {}", frame.day.day, frame.time_label()),
                    Style::default().fg(p.muted),
                )),
                Line::from(Span::styled(
                    frame.stop.name.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from(frame.caption().to_string()),
                Line::from(""),
                Line::from(Span::styled(
                    format!("{}  {position}", frame.stop.coordinates),
                    Style::default().fg(p.muted),
                )),
            ]
        }
    };

    let story = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: true });
    f.render_widget(story, area);
}

fn render_itinerary(f: &mut Frame, app: &App, p: &Palette, area: Rect) {
    let block = Block::default()
        .title(" Itinerary ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(p.muted));

    let active = app.store.active_stop().map(|s| s.id.as_str());
    let items: Vec<ListItem> = app
        .store
        .itinerary()
        .iter()
        .flat_map(|day| {
            let header = format!(" Day {}: {}", day.day, narrative_or_default(day));
            let mut lines = vec![ListItem::new(Line::from(Span::styled(
                header,
                Style::default().fg(p.accent),
            )))];
            for stop in &day.stops {
                let (marker, style) = if Some(stop.id.as_str()) == active {
                    (">", Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED))
                } else {
                    (" ", Style::default())
                };
                lines.push(ListItem::new(Line::from(Span::styled(
                    format!("  {marker} {}", stop.name),
                    style,
                ))));
            }
            lines
        })
        .collect();

    f.render_widget(List::new(items).block(block), area);
}

fn render_status_bar(f: &mut Frame, app: &App, p: &Palette, area: Rect) {
    let (text, style) = match app.notices.latest(OffsetDateTime::now_utc()) {
        Some(n) => {
            let bg = match n.level {
                Level::Error => Color::Red,
                Level::Success => Color::Green,
                Level::Info => p.accent,
            };
            (
                format!(" {}: {}  (x:dismiss)", n.level.label(), n.message),
                Style::default().fg(Color::Black).bg(bg),
            )
        }
        None => (
            format!(
                " theme:{} | ←/→:stop  m:story  s:save  t:theme  q:quit",
                app.store.theme().as_str()
            ),
            Style::default().fg(Color::White).bg(Color::DarkGray),
        ),
    };
    let bar = Paragraph::new(Line::from(Span::styled(text, style)));
    f.render_widget(bar, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use vox_core::{Coordinates, ItineraryStore, NewStop};
    use vox_trips::UnavailableTripStore;

    fn screen(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 16)).unwrap();
        terminal.draw(|f| render(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn shows_active_stop_and_itinerary() {
        let mut store = ItineraryStore::new();
        store.add_stop(
            NewStop::new("Charles Bridge", Coordinates { lng: 14.41, lat: 50.09 })
                .with_notes("Sunrise walk"),
        );
        store.add_stop(NewStop::new("Vysehrad", Coordinates { lng: 14.42, lat: 50.06 }).on_day(2));
        let app = App::new(store, Arc::new(UnavailableTripStore)).unwrap();

        let text = screen(&app);
        assert!(text.contains("Charles Bridge"));
        assert!(text.contains("Sunrise walk"));
        assert!(text.contains("9:00 AM"));
        assert!(text.contains("Day 2: Day 2"));
        assert!(text.contains("Vysehrad"));
    }

    #[test]
    fn empty_trip_says_so() {
        let app = App::new(ItineraryStore::new(), Arc::new(UnavailableTripStore)).unwrap();
        assert!(screen(&app).contains("Itinerary is empty."));
    }
}
