use crate::config::Config;
use crate::error::FetchError;
use crate::mascot::Mascot;
use crate::mock;
use crate::models::{GeoPosition, WeatherReport};
use crate::pager::{Page, Pager};
use crate::ui;
use chrono::{DateTime, Local, NaiveDate};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Where the weather on screen came from.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchStatus {
    /// Pipeline running; placeholder or previous data on screen.
    Fetching,
    /// Showing a live report.
    Live,
    /// Last run failed; whatever was on screen stays.
    Failed(String),
}

pub struct App {
    pub config: Config,
    pub pager: Pager,
    pub weather: WeatherReport,
    pub fetch_status: FetchStatus,
    pub position: Option<GeoPosition>,
    pub last_update: Option<DateTime<Local>>,
    pub mascot: Mascot,
    pub tick_count: usize,
    pub started: Instant,
    pub now: Instant,
    pub show_banner: bool,
    pub should_quit: bool,
    refresh_requested: bool,
    fetch_in_flight: bool,
}

impl App {
    pub fn new(config: Config, now: Instant, today: NaiveDate) -> Self {
        let start_page = Page::from_name(&config.ui.default_view).unwrap_or_else(|| {
            warn!(
                "Unknown default_view '{}', starting on the clock.",
                config.ui.default_view
            );
            Page::Clock
        });

        Self {
            config,
            pager: Pager::new(start_page),
            weather: mock::placeholder_report(today),
            fetch_status: FetchStatus::Fetching,
            position: None,
            last_update: None,
            mascot: Mascot::new(now),
            tick_count: 0,
            started: now,
            now,
            show_banner: true,
            should_quit: false,
            // The first pipeline run goes through the same path as a refresh.
            refresh_requested: true,
            fetch_in_flight: false,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.now.saturating_duration_since(self.started)
    }

    pub fn is_loading(&self) -> bool {
        self.elapsed() < Duration::from_millis(self.config.ui.loading_screen_ms)
    }

    pub fn on_tick(&mut self, now: Instant) {
        self.tick_count += 1;
        self.now = now;
        self.mascot.update(now);

        if self.show_banner && self.elapsed() >= Duration::from_secs(self.config.ui.banner_secs) {
            self.show_banner = false;
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        // Only quitting is allowed behind the loading screen
        if self.is_loading() {
            if let KeyCode::Char('q') = key.code {
                self.should_quit = true;
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Left | KeyCode::Char('h') => {
                self.pager.prev();
            }
            KeyCode::Right | KeyCode::Char('l') => {
                self.pager.next();
            }
            KeyCode::Char(c @ '1'..='3') => {
                self.pager.go_to(c as usize - '1' as usize);
            }
            KeyCode::Char('r') => self.request_refresh(),
            KeyCode::Char('i') => self.show_banner = !self.show_banner,
            KeyCode::Esc => self.show_banner = false,
            _ => {}
        }
    }

    /// Mouse drags swipe between pages; a click on a page dot jumps there.
    /// `area` is the full terminal area the last frame was drawn into.
    pub fn handle_mouse(&mut self, mouse: MouseEvent, area: Rect, now: Instant) {
        if self.is_loading() {
            return;
        }

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                match ui::indicator_index_at(area, mouse.column, mouse.row) {
                    Some(index) => {
                        self.pager.go_to(index);
                    }
                    None => self.pager.begin_drag(mouse.column, now),
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => self.pager.drag_to(mouse.column),
            MouseEventKind::Up(MouseButton::Left) => {
                self.pager.end_drag(mouse.column, now);
            }
            _ => {}
        }
    }

    pub fn request_refresh(&mut self) {
        self.refresh_requested = true;
    }

    /// Returns true once per requested refresh. A request made while a run
    /// is in flight waits for that run to finish. The caller is expected to
    /// start a pipeline run whenever this returns true.
    pub fn take_refresh_request(&mut self) -> bool {
        if !self.refresh_requested || self.fetch_in_flight {
            return false;
        }
        self.refresh_requested = false;
        self.fetch_in_flight = true;
        self.fetch_status = FetchStatus::Fetching;
        true
    }

    pub fn apply_position(&mut self, pos: GeoPosition) {
        self.position = Some(pos);
    }

    /// A failed run keeps whatever weather is already displayed.
    pub fn apply_weather(&mut self, result: Result<WeatherReport, FetchError>) {
        self.fetch_in_flight = false;
        match result {
            Ok(report) => {
                info!(
                    "Displaying live weather for {}",
                    report.current.location_label
                );
                self.weather = report;
                self.fetch_status = FetchStatus::Live;
                self.last_update = Some(Local::now());
            }
            Err(e) => {
                warn!("Weather fetch failed: {}", e);
                self.fetch_status = FetchStatus::Failed(e.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::placeholder_current;
    use reqwest::StatusCode;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn ready_app() -> App {
        let t0 = Instant::now();
        let mut app = App::new(Config::default(), t0, today());
        app.on_tick(t0 + Duration::from_secs(2));
        app
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn starts_on_configured_page() {
        let mut config = Config::default();
        config.ui.default_view = "mascot".to_string();
        let app = App::new(config, Instant::now(), today());
        assert_eq!(app.pager.page(), Page::Mascot);
    }

    #[test]
    fn loading_screen_blocks_navigation() {
        let mut app = App::new(Config::default(), Instant::now(), today());
        assert!(app.is_loading());
        app.handle_key(press(KeyCode::Right));
        assert_eq!(app.pager.page(), Page::Clock);
        app.handle_key(press(KeyCode::Char('q')));
        assert!(app.should_quit);
    }

    #[test]
    fn arrow_keys_and_digits_page() {
        let mut app = ready_app();
        app.handle_key(press(KeyCode::Right));
        assert_eq!(app.pager.page(), Page::Forecast);
        app.handle_key(press(KeyCode::Char('3')));
        assert_eq!(app.pager.page(), Page::Mascot);
        app.handle_key(press(KeyCode::Char('h')));
        assert_eq!(app.pager.page(), Page::Forecast);
    }

    #[test]
    fn banner_hides_after_timeout() {
        let t0 = Instant::now();
        let mut app = App::new(Config::default(), t0, today());
        app.on_tick(t0 + Duration::from_secs(4));
        assert!(app.show_banner);
        app.on_tick(t0 + Duration::from_secs(5));
        assert!(!app.show_banner);
    }

    #[test]
    fn first_tick_requests_a_fetch_once() {
        let mut app = ready_app();
        assert!(app.take_refresh_request());
        assert!(!app.take_refresh_request());
    }

    #[test]
    fn refresh_key_triggers_another_run_after_completion() {
        let mut app = ready_app();
        assert!(app.take_refresh_request());
        app.apply_weather(Err(FetchError::Status(StatusCode::INTERNAL_SERVER_ERROR)));
        app.handle_key(press(KeyCode::Char('r')));
        assert!(app.take_refresh_request());
        assert_eq!(app.fetch_status, FetchStatus::Fetching);
    }

    #[test]
    fn refresh_during_a_run_waits_for_it() {
        let mut app = ready_app();
        assert!(app.take_refresh_request());
        app.handle_key(press(KeyCode::Char('r')));
        assert!(!app.take_refresh_request());
        app.apply_weather(Ok(mock::placeholder_report(today())));
        assert!(app.take_refresh_request());
    }

    #[test]
    fn failed_fetch_keeps_placeholder() {
        let mut app = ready_app();
        app.apply_weather(Err(FetchError::Status(StatusCode::INTERNAL_SERVER_ERROR)));
        assert!(matches!(app.fetch_status, FetchStatus::Failed(_)));
        assert_eq!(app.weather.current, placeholder_current());
        assert!(app.last_update.is_none());
    }

    #[test]
    fn successful_fetch_replaces_weather() {
        let mut app = ready_app();
        let mut report = mock::placeholder_report(today());
        report.current.location_label = "Springfield, US".to_string();
        app.apply_weather(Ok(report.clone()));
        assert_eq!(app.weather, report);
        assert_eq!(app.fetch_status, FetchStatus::Live);
    }

    #[test]
    fn mouse_drag_swipes_pages() {
        let mut app = ready_app();
        let area = Rect::new(0, 0, 120, 40);
        let t0 = app.now;

        app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 80, 10), area, t0);
        app.handle_mouse(mouse(MouseEventKind::Drag(MouseButton::Left), 60, 10), area, t0);
        app.handle_mouse(
            mouse(MouseEventKind::Up(MouseButton::Left), 50, 10),
            area,
            t0 + Duration::from_secs(2),
        );
        assert_eq!(app.pager.page(), Page::Forecast);
    }

    #[test]
    fn clicking_a_page_dot_jumps() {
        let mut app = ready_app();
        let area = Rect::new(0, 0, 120, 40);
        let dots = ui::indicator_area(area);

        let third = ui::indicator_dot_column(dots, 2);
        app.handle_mouse(
            mouse(MouseEventKind::Down(MouseButton::Left), third, dots.y),
            area,
            app.now,
        );
        assert_eq!(app.pager.page(), Page::Mascot);
    }
}
