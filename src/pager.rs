//! Page navigation: keyboard stepping and mouse-drag swipes between the
//! Clock, Forecast and Mascot pages.

use std::time::{Duration, Instant};

/// Columns a slow drag must travel before it turns the page.
pub const DRAG_THRESHOLD_COLS: i32 = 8;
/// Columns per second above which a release counts as a fling.
pub const FLING_VELOCITY_COLS: f64 = 50.0;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum Page {
    #[default]
    Clock,
    Forecast,
    Mascot,
}

impl Page {
    pub const ALL: [Page; 3] = [Page::Clock, Page::Forecast, Page::Mascot];

    pub fn index(self) -> usize {
        match self {
            Page::Clock => 0,
            Page::Forecast => 1,
            Page::Mascot => 2,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Page::Clock => "Clock",
            Page::Forecast => "Forecast",
            Page::Mascot => "Mascot",
        }
    }

    /// Case-insensitive lookup by title, as written in config.toml.
    pub fn from_name(name: &str) -> Option<Page> {
        Page::ALL
            .into_iter()
            .find(|p| p.title().eq_ignore_ascii_case(name.trim()))
    }
}

#[derive(Debug, Clone, Copy)]
struct Drag {
    start_col: u16,
    last_col: u16,
    started: Instant,
}

#[derive(Debug, Default)]
pub struct Pager {
    current: usize,
    drag: Option<Drag>,
}

impl Pager {
    pub fn new(start: Page) -> Self {
        Self {
            current: start.index(),
            drag: None,
        }
    }

    pub fn page(&self) -> Page {
        Page::ALL[self.current]
    }

    pub fn index(&self) -> usize {
        self.current
    }

    /// Jumps to `index` if it exists. Returns whether the page changed.
    pub fn go_to(&mut self, index: usize) -> bool {
        self.drag = None;
        if index >= Page::ALL.len() || index == self.current {
            return false;
        }
        self.current = index;
        true
    }

    pub fn next(&mut self) -> bool {
        self.go_to(self.current + 1)
    }

    pub fn prev(&mut self) -> bool {
        match self.current.checked_sub(1) {
            Some(i) => self.go_to(i),
            None => false,
        }
    }

    pub fn begin_drag(&mut self, col: u16, now: Instant) {
        self.drag = Some(Drag {
            start_col: col,
            last_col: col,
            started: now,
        });
    }

    pub fn drag_to(&mut self, col: u16) {
        if let Some(drag) = self.drag.as_mut() {
            drag.last_col = col;
        }
    }

    /// Horizontal travel of the drag in progress, in columns.
    pub fn drag_offset(&self) -> i32 {
        self.drag
            .map(|d| i32::from(d.last_col) - i32::from(d.start_col))
            .unwrap_or(0)
    }

    /// Finishes a drag at `col`. A fling pages by direction of travel; a
    /// slow drag pages once it passes [`DRAG_THRESHOLD_COLS`]. Returns
    /// whether the page changed.
    pub fn end_drag(&mut self, col: u16, now: Instant) -> bool {
        let Some(drag) = self.drag.take() else {
            return false;
        };

        let offset = i32::from(col) - i32::from(drag.start_col);
        let elapsed = now
            .saturating_duration_since(drag.started)
            .max(Duration::from_millis(1));
        let velocity = f64::from(offset) / elapsed.as_secs_f64();

        if velocity.abs() > FLING_VELOCITY_COLS {
            if velocity < 0.0 {
                self.next()
            } else {
                self.prev()
            }
        } else if offset < -DRAG_THRESHOLD_COLS {
            self.next()
        } else if offset > DRAG_THRESHOLD_COLS {
            self.prev()
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slow(now: Instant) -> Instant {
        now + Duration::from_secs(2)
    }

    #[test]
    fn keyboard_steps_are_clamped() {
        let mut pager = Pager::new(Page::Clock);
        assert!(!pager.prev());
        assert!(pager.next());
        assert!(pager.next());
        assert_eq!(pager.page(), Page::Mascot);
        assert!(!pager.next());
        assert_eq!(pager.page(), Page::Mascot);
    }

    #[test]
    fn go_to_rejects_unknown_pages() {
        let mut pager = Pager::new(Page::Forecast);
        assert!(!pager.go_to(3));
        assert!(!pager.go_to(1));
        assert!(pager.go_to(0));
        assert_eq!(pager.page(), Page::Clock);
    }

    #[test]
    fn slow_long_drag_left_turns_forward() {
        let t0 = Instant::now();
        let mut pager = Pager::new(Page::Clock);
        pager.begin_drag(60, t0);
        pager.drag_to(45);
        assert_eq!(pager.drag_offset(), -15);
        assert!(pager.end_drag(40, slow(t0)));
        assert_eq!(pager.page(), Page::Forecast);
        assert_eq!(pager.drag_offset(), 0);
    }

    #[test]
    fn slow_short_drag_snaps_back() {
        let t0 = Instant::now();
        let mut pager = Pager::new(Page::Forecast);
        pager.begin_drag(40, t0);
        assert!(!pager.end_drag(45, slow(t0)));
        assert_eq!(pager.page(), Page::Forecast);
    }

    #[test]
    fn quick_flick_right_turns_back() {
        let t0 = Instant::now();
        let mut pager = Pager::new(Page::Forecast);
        pager.begin_drag(40, t0);
        assert!(pager.end_drag(45, t0 + Duration::from_millis(50)));
        assert_eq!(pager.page(), Page::Clock);
    }

    #[test]
    fn fling_past_the_edge_stays_put() {
        let t0 = Instant::now();
        let mut pager = Pager::new(Page::Mascot);
        pager.begin_drag(60, t0);
        assert!(!pager.end_drag(20, t0 + Duration::from_millis(100)));
        assert_eq!(pager.page(), Page::Mascot);
    }

    #[test]
    fn release_without_press_is_ignored() {
        let mut pager = Pager::new(Page::Clock);
        assert!(!pager.end_drag(0, Instant::now()));
    }

    #[test]
    fn page_names_parse_case_insensitively() {
        assert_eq!(Page::from_name("forecast"), Some(Page::Forecast));
        assert_eq!(Page::from_name(" MASCOT "), Some(Page::Mascot));
        assert_eq!(Page::from_name("Radar"), None);
    }
}
