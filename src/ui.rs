//! TUI rendering for the Spark Clock
//!
//! This module handles all drawing with the `ratatui` crate: the loading
//! screen, the three pages (clock, forecast, mascot), the info banner, the
//! status line and the page indicator dots.

use crate::app::{App, FetchStatus};
use crate::mascot::{bob_offset, Variant, FRAME_HEIGHT, FRAME_WIDTH};
use crate::models::{DailyForecastEntry, IconKey};
use crate::pager::Page;
use chrono::{Local, Timelike};
use ratatui::{prelude::*, widgets::*};

const DOT_WIDTH: u16 = 3;

// 3x5 block font for the clock face.
const DIGITS: [[&str; 5]; 10] = [
    ["███", "█ █", "█ █", "█ █", "███"],
    ["  █", "  █", "  █", "  █", "  █"],
    ["███", "  █", "███", "█  ", "███"],
    ["███", "  █", "███", "  █", "███"],
    ["█ █", "█ █", "███", "  █", "  █"],
    ["███", "█  ", "███", "  █", "███"],
    ["███", "█  ", "███", "█ █", "███"],
    ["███", "  █", "  █", "  █", "  █"],
    ["███", "█ █", "███", "█ █", "███"],
    ["███", "█ █", "███", "  █", "███"],
];

/// Renders one frame of the TUI based on current application state.
///
/// While the loading screen is up nothing else is drawn. Otherwise the
/// current page fills the screen above a status line and the page dots,
/// with the info banner on top when visible.
///
/// # Arguments
///
/// * `f` - The ratatui frame to draw into (from `terminal.draw()`).
/// * `app` - Current application state.
pub fn render(f: &mut Frame, app: &App) {
    let area = f.size();

    if app.is_loading() {
        render_loading_screen(f, app, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(1), // Status line
            Constraint::Length(1), // Page dots
        ])
        .split(area);

    match app.pager.page() {
        Page::Clock => render_clock_view(f, app, chunks[0]),
        Page::Forecast => render_forecast_view(f, app, chunks[0]),
        Page::Mascot => render_mascot_view(f, app, chunks[0]),
    }

    render_status_line(f, app, chunks[1]);
    render_page_indicator(f, app, area);

    if app.show_banner {
        render_banner(f, area);
    }
}

/// Where the page dots sit: the bottom row, centered.
pub fn indicator_area(area: Rect) -> Rect {
    let width = (DOT_WIDTH * Page::ALL.len() as u16).min(area.width);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + area.height.saturating_sub(1),
        width,
        1.min(area.height),
    )
}

/// Column of the dot glyph for page `index`.
pub fn indicator_dot_column(dots: Rect, index: usize) -> u16 {
    dots.x + DOT_WIDTH * index as u16 + 1
}

/// Which page dot, if any, is under the given cell.
pub fn indicator_index_at(area: Rect, column: u16, row: u16) -> Option<usize> {
    let dots = indicator_area(area);
    if dots.height == 0 || row != dots.y || column < dots.x || column >= dots.right() {
        return None;
    }
    let index = usize::from((column - dots.x) / DOT_WIDTH);
    (index < Page::ALL.len()).then_some(index)
}

/// How many forecast cards fit across a terminal `width` columns wide.
pub fn visible_days(width: u16) -> usize {
    if width < 60 {
        3
    } else if width < 100 {
        5
    } else {
        7
    }
}

/// Lays `text` out in the block font. Non-digit characters other than ':'
/// are skipped; the colon is blank when `colon_on` is false.
pub fn big_text(text: &str, colon_on: bool) -> Vec<String> {
    let mut rows = vec![String::new(); 5];
    for ch in text.chars() {
        let glyph: [&str; 5] = match ch {
            ':' if colon_on => [" ", "█", " ", "█", " "],
            ':' => [" "; 5],
            d => match d.to_digit(10) {
                Some(n) => DIGITS[n as usize],
                None => continue,
            },
        };
        for (row, part) in rows.iter_mut().zip(glyph) {
            if !row.is_empty() {
                row.push(' ');
            }
            row.push_str(part);
        }
    }
    rows
}

pub fn icon_color(icon: IconKey) -> Color {
    match icon {
        IconKey::Clear => Color::Yellow,
        IconKey::PartlyCloudy => Color::Gray,
        IconKey::Cloudy => Color::DarkGray,
        IconKey::Rainy => Color::LightBlue,
        IconKey::Thunderstorm => Color::Magenta,
    }
}

fn mascot_lines(app: &App, variant: Variant) -> Vec<Line<'static>> {
    let style = Style::default()
        .fg(variant.color(app.tick_count))
        .add_modifier(Modifier::BOLD);
    app.mascot
        .frame()
        .into_iter()
        .map(|l| Line::from(Span::styled(l, style)))
        .collect()
}

/// Centers a `width` x `height` box inside `area`, clamped to fit.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect::new(
        area.x + (area.width - w) / 2,
        area.y + (area.height - h) / 2,
        w,
        h,
    )
}

/// Clock page: mascot, big HH:MM, seconds and date on the left; the current
/// weather card on the right.
fn render_clock_view(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    let now = Local::now();
    let hhmm = format!("{:02}:{:02}", now.hour(), now.minute());
    let colon_on = now.second() % 2 == 0;
    let clock_style = Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD);

    let mut left: Vec<Line> = Vec::new();
    for _ in 0..bob_offset(app.elapsed()) {
        left.push(Line::from(""));
    }
    left.extend(mascot_lines(app, Variant::Classic));
    left.push(Line::from(""));
    left.extend(
        big_text(&hhmm, colon_on)
            .into_iter()
            .map(|row| Line::from(Span::styled(row, clock_style))),
    );
    left.push(Line::from(Span::styled(
        format!("{:02}", now.second()),
        Style::default().fg(Color::Gray),
    )));
    left.push(Line::from(""));
    left.push(Line::from(Span::styled(
        now.format("%a, %b %-d, %Y").to_string(),
        Style::default().fg(Color::Gray),
    )));

    let height = left.len() as u16;
    let left_area = centered(chunks[0], chunks[0].width, height + 1);
    f.render_widget(
        Paragraph::new(left).alignment(Alignment::Center),
        left_area,
    );

    render_current_weather_card(f, app, chunks[1]);
}

fn render_current_weather_card(f: &mut Frame, app: &App, area: Rect) {
    let w = &app.weather.current;
    let icon_style = Style::default().fg(icon_color(w.icon));
    let bold = Style::default().add_modifier(Modifier::BOLD);

    let mut lines = vec![
        Line::from(vec![
            Span::styled("⌖ ", Style::default().fg(Color::Cyan)),
            Span::styled(w.location_label.as_str(), bold),
        ]),
        Line::from(""),
    ];
    lines.extend(
        w.icon
            .art()
            .into_iter()
            .map(|row| Line::from(Span::styled(row, icon_style))),
    );
    lines.extend([
        Line::from(""),
        Line::from(Span::styled(
            format!("{}°C", w.temperature),
            bold.fg(Color::White),
        )),
        Line::from(w.condition_label.as_str()),
        Line::from(""),
        Line::from(vec![
            Span::styled("Sunrise ", Style::default().fg(Color::DarkGray)),
            Span::styled(w.sunrise.as_str(), Style::default().fg(Color::Yellow)),
            Span::raw("   "),
            Span::styled("Sunset ", Style::default().fg(Color::DarkGray)),
            Span::styled(w.sunset.as_str(), Style::default().fg(Color::Rgb(255, 140, 0))),
        ]),
    ]);

    let card_area = centered(area, area.width.saturating_sub(2).max(30), lines.len() as u16 + 4);
    let card = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .title(format!(" Now {} ", w.icon.glyph()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .padding(Padding::new(1, 1, 1, 0)),
    );
    f.render_widget(card, card_area);
}

/// Forecast page: "N-Day Forecast" header and one card per visible day.
fn render_forecast_view(f: &mut Frame, app: &App, area: Rect) {
    let days = visible_days(area.width).min(app.weather.forecast.len());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(0)])
        .split(area);

    let header = Line::from(vec![
        Span::styled(
            format!(" {}-Day Forecast ", days),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" {}", app.weather.current.location_label),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    f.render_widget(Paragraph::new(header), chunks[0]);

    if days == 0 {
        return;
    }

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Ratio(1, days as u32); days])
        .split(chunks[1]);

    for (day, slot) in app.weather.forecast.iter().take(days).zip(columns.iter()) {
        render_forecast_card(f, day, *slot);
    }
}

fn render_forecast_card(f: &mut Frame, day: &DailyForecastEntry, area: Rect) {
    let icon_style = Style::default().fg(icon_color(day.icon));

    let mut lines = vec![
        Line::from(Span::styled(
            day.day_name.as_str(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            day.date_label.as_str(),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
    ];
    lines.extend(
        day.icon
            .art()
            .into_iter()
            .map(|row| Line::from(Span::styled(row, icon_style))),
    );
    lines.extend([
        Line::from(""),
        Line::from(Span::styled(
            format!("{}°", day.high),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!("{}°", day.low),
            Style::default().fg(Color::Gray),
        )),
        Line::from(""),
        Line::from(day.condition_label.as_str()),
        Line::from(""),
        Line::from(vec![
            Span::styled("↑ ", Style::default().fg(Color::Yellow)),
            Span::raw(day.sunrise.as_str()),
        ]),
        Line::from(vec![
            Span::styled("↓ ", Style::default().fg(Color::Rgb(255, 140, 0))),
            Span::raw(day.sunset.as_str()),
        ]),
    ]);

    let card = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded),
        );
    f.render_widget(card, area);
}

/// Mascot page: three colour variants side by side with twinkling sparkles.
fn render_mascot_view(f: &mut Frame, app: &App, area: Rect) {
    render_sparkles(f, app, area);

    let block_height = 2 + 1 + FRAME_HEIGHT + 3 + 1 + 3;
    let inner = centered(area, area.width, block_height);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Length(FRAME_HEIGHT + 3),
            Constraint::Length(1),
            Constraint::Length(3),
        ])
        .split(inner);

    let title = Paragraph::new(vec![
        Line::from(Span::styled(
            "✦ Mascot Friends ✦",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Keeping you company!",
            Style::default().fg(Color::Gray),
        )),
    ])
    .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    let row = centered(chunks[2], (FRAME_WIDTH + 6) * 3, FRAME_HEIGHT + 3);
    let slots = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 3); 3])
        .split(row);

    for (variant, slot) in [Variant::Rainbow, Variant::Classic, Variant::Nature]
        .into_iter()
        .zip(slots.iter())
    {
        let mut lines = mascot_lines(app, variant);
        lines.push(Line::from(Span::styled(
            variant.name(),
            Style::default().add_modifier(Modifier::BOLD),
        )));
        f.render_widget(Clear, *slot);
        f.render_widget(
            Paragraph::new(lines).alignment(Alignment::Center).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(Color::DarkGray)),
            ),
            *slot,
        );
    }

    let shout = centered(chunks[4], 24, 3);
    f.render_widget(Clear, shout);
    f.render_widget(
        Paragraph::new(Span::styled(
            "ϟ Pika Pika! ϟ",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded),
        ),
        shout,
    );
}

fn render_sparkles(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 4 || area.height < 4 {
        return;
    }
    let buf = f.buffer_mut();
    for i in 0..8u32 {
        // Fixed scatter, each sparkle on its own phase
        let x = area.x + ((i * 37 + 11) % u32::from(area.width)) as u16;
        let y = area.y + ((i * 23 + 5) % u32::from(area.height)) as u16;
        let lit = (app.tick_count / 5 + i as usize) % 3 != 0;
        let (symbol, color) = if lit {
            ("✦", Color::Yellow)
        } else {
            ("·", Color::DarkGray)
        };
        buf.get_mut(x, y).set_symbol(symbol).set_fg(color);
    }
}

/// Shown for the first moments after start: bouncing mascot, title and
/// three pulsing dots.
fn render_loading_screen(f: &mut Frame, app: &App, area: Rect) {
    let mut lines: Vec<Line> = Vec::new();
    for _ in 0..(1 - bob_offset(app.elapsed() * 2)) {
        lines.push(Line::from(""));
    }
    lines.extend(mascot_lines(app, Variant::Classic));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Spark Weather Clock",
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(""));

    let active = (app.tick_count / 3) % 3;
    let dots: Vec<Span> = (0..3)
        .map(|i| {
            let style = if i == active {
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            Span::styled(" ● ", style)
        })
        .collect();
    lines.push(Line::from(dots));

    let height = lines.len() as u16;
    f.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        centered(area, area.width, height),
    );
}

fn render_status_line(f: &mut Frame, app: &App, area: Rect) {
    let (text, color) = match &app.fetch_status {
        FetchStatus::Fetching => ("Fetching weather…".to_string(), Color::Yellow),
        FetchStatus::Live => {
            let coords = app
                .position
                .map(|p| format!(" ({:.2}, {:.2})", p.latitude, p.longitude))
                .unwrap_or_default();
            let updated = app
                .last_update
                .map(|t| format!(" • updated {}", t.format("%H:%M")))
                .unwrap_or_default();
            (format!("Live{}{}", coords, updated), Color::Green)
        }
        FetchStatus::Failed(msg) => (
            format!("Weather unavailable: {} • r to retry", msg),
            Color::Red,
        ),
    };

    f.render_widget(
        Paragraph::new(Span::styled(text, Style::default().fg(color)))
            .alignment(Alignment::Center),
        area,
    );
}

fn render_page_indicator(f: &mut Frame, app: &App, area: Rect) {
    let dots = indicator_area(area);
    let spans: Vec<Span> = (0..Page::ALL.len())
        .map(|i| {
            if i == app.pager.index() {
                Span::styled(" ● ", Style::default().fg(Color::White))
            } else {
                Span::styled(" ○ ", Style::default().fg(Color::DarkGray))
            }
        })
        .collect();
    f.render_widget(Paragraph::new(Line::from(spans)), dots);
}

fn render_banner(f: &mut Frame, area: Rect) {
    let banner_area = Rect::new(
        area.x + 1,
        area.y,
        area.width.saturating_sub(2),
        4.min(area.height),
    );
    let text = vec![
        Line::from(Span::styled(
            "Spark Weather Clock! ϟ",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from("←/→ or drag to change view • 1/2/3 jump • r refresh • i info • q quit"),
    ];
    f.render_widget(Clear, banner_area);
    f.render_widget(
        Paragraph::new(text)
            .style(Style::default().fg(Color::White).bg(Color::Blue))
            .block(Block::default().borders(Borders::ALL).border_type(BorderType::Rounded)),
        banner_area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visible_days_follow_width() {
        assert_eq!(visible_days(40), 3);
        assert_eq!(visible_days(80), 5);
        assert_eq!(visible_days(100), 7);
    }

    #[test]
    fn big_text_renders_five_rows() {
        let rows = big_text("12:05", true);
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0], "  █ ███   ███ ███");
        assert_eq!(rows[1], "  █   █ █ █ █ █  ");
    }

    #[test]
    fn colon_can_blink_off() {
        let on = big_text("1:2", true);
        let off = big_text("1:2", false);
        assert_ne!(on[1], off[1]);
        assert_eq!(on[1].chars().count(), off[1].chars().count());
    }

    #[test]
    fn indicator_hit_testing() {
        let area = Rect::new(0, 0, 120, 40);
        let dots = indicator_area(area);
        assert_eq!(dots.y, 39);
        for i in 0..3 {
            let col = indicator_dot_column(dots, i);
            assert_eq!(indicator_index_at(area, col, 39), Some(i));
        }
        assert_eq!(indicator_index_at(area, 0, 39), None);
        assert_eq!(indicator_index_at(area, dots.x, 38), None);
    }

    #[test]
    fn indicator_survives_tiny_terminals() {
        let area = Rect::new(0, 0, 0, 0);
        assert_eq!(indicator_index_at(area, 0, 0), None);
    }
}
