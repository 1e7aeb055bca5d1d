//! The animated electric-mouse mascot: poses, blinking, bobbing and colour
//! variants.

use ratatui::style::Color;
use std::time::{Duration, Instant};

pub const POSE_INTERVAL: Duration = Duration::from_secs(60);
pub const BLINK_DURATION: Duration = Duration::from_millis(200);
const BLINK_GAPS_MS: [u64; 4] = [3000, 4200, 3600, 4800];
const BOB_PERIOD_MS: u128 = 3000;

// '•' marks the eyes so blinking can close them.
const POSES: [(&str, [&str; 6]); 4] = [
    (
        "Happy",
        [
            "  /\\   /\\   ",
            " (  \\_/  )  ",
            " | •   • |  ",
            " |@  ‿  @|  ",
            "  \\_____/ ϟ ",
            "   /   \\    ",
        ],
    ),
    (
        "Waving",
        [
            "  /\\   /\\  /",
            " (  \\_/  )/ ",
            " | •   • |  ",
            " |@  ᴗ  @|  ",
            "  \\_____/ ϟ ",
            "   /   \\    ",
        ],
    ),
    (
        "Excited",
        [
            "\\ /\\   /\\ / ",
            " (  \\_/  )  ",
            " | •   • |  ",
            " |@  ▽  @|  ",
            "  \\_____/ ϟ ",
            "   /   \\    ",
        ],
    ),
    (
        "Sitting",
        [
            "            ",
            "  /\\   /\\   ",
            " (  \\_/  )  ",
            " | •   • |  ",
            " |@  ‿  @|ϟ ",
            " (__)_(__)  ",
        ],
    ),
];

pub const FRAME_HEIGHT: u16 = 6;
pub const FRAME_WIDTH: u16 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Classic,
    Rainbow,
    Nature,
}

impl Variant {
    pub fn name(self) -> &'static str {
        match self {
            Variant::Classic => "Classic",
            Variant::Rainbow => "Rainbow",
            Variant::Nature => "Nature",
        }
    }

    /// Body colour; the rainbow variant cycles with `tick`.
    pub fn color(self, tick: usize) -> Color {
        const RAINBOW: [Color; 6] = [
            Color::Red,
            Color::Rgb(255, 140, 0),
            Color::Yellow,
            Color::Green,
            Color::Blue,
            Color::Magenta,
        ];
        match self {
            Variant::Classic => Color::Yellow,
            Variant::Rainbow => RAINBOW[(tick / 3) % RAINBOW.len()],
            Variant::Nature => Color::LightGreen,
        }
    }
}

/// Animation state for one mascot.
#[derive(Debug)]
pub struct Mascot {
    pose: usize,
    pose_since: Instant,
    blink_started: Option<Instant>,
    next_blink: Instant,
    gap_cursor: usize,
}

impl Mascot {
    pub fn new(now: Instant) -> Self {
        Self {
            pose: 0,
            pose_since: now,
            blink_started: None,
            next_blink: now + Duration::from_millis(BLINK_GAPS_MS[0]),
            gap_cursor: 1,
        }
    }

    pub fn update(&mut self, now: Instant) {
        while now.saturating_duration_since(self.pose_since) >= POSE_INTERVAL {
            self.pose = (self.pose + 1) % POSES.len();
            self.pose_since += POSE_INTERVAL;
        }

        if let Some(started) = self.blink_started {
            if now.saturating_duration_since(started) >= BLINK_DURATION {
                self.blink_started = None;
            }
        }

        if now >= self.next_blink {
            self.blink_started = Some(now);
            let gap = BLINK_GAPS_MS[self.gap_cursor % BLINK_GAPS_MS.len()];
            self.gap_cursor += 1;
            self.next_blink = now + Duration::from_millis(gap);
        }
    }

    pub fn is_blinking(&self) -> bool {
        self.blink_started.is_some()
    }

    pub fn pose_name(&self) -> &'static str {
        POSES[self.pose].0
    }

    pub fn frame(&self) -> Vec<String> {
        let eye = if self.is_blinking() { "-" } else { "•" };
        POSES[self.pose]
            .1
            .iter()
            .map(|line| line.replace('•', eye))
            .collect()
    }
}

/// Rows of headroom above the mascot; it floats up for the middle half of
/// each bob period.
pub fn bob_offset(elapsed: Duration) -> u16 {
    let phase = elapsed.as_millis() % BOB_PERIOD_MS;
    if (BOB_PERIOD_MS / 4..BOB_PERIOD_MS * 3 / 4).contains(&phase) {
        0
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pose_rotates_every_minute() {
        let t0 = Instant::now();
        let mut m = Mascot::new(t0);
        assert_eq!(m.pose_name(), "Happy");

        m.update(t0 + Duration::from_secs(59));
        assert_eq!(m.pose_name(), "Happy");

        m.update(t0 + Duration::from_secs(60));
        assert_eq!(m.pose_name(), "Waving");

        m.update(t0 + Duration::from_secs(240));
        assert_eq!(m.pose_name(), "Happy");
    }

    #[test]
    fn blink_closes_eyes_briefly() {
        let t0 = Instant::now();
        let mut m = Mascot::new(t0);
        assert!(!m.is_blinking());

        let blink_at = t0 + Duration::from_millis(3000);
        m.update(blink_at);
        assert!(m.is_blinking());
        assert!(m.frame().iter().all(|l| !l.contains('•')));

        m.update(blink_at + Duration::from_millis(250));
        assert!(!m.is_blinking());
        assert!(m.frame().iter().any(|l| l.contains('•')));
    }

    #[test]
    fn blink_gaps_stay_between_three_and_five_seconds() {
        assert!(BLINK_GAPS_MS.iter().all(|g| (3000..=5000).contains(g)));
    }

    #[test]
    fn frames_have_uniform_size() {
        for (_, lines) in POSES {
            assert_eq!(lines.len(), FRAME_HEIGHT as usize);
            for line in lines {
                assert_eq!(line.chars().count(), FRAME_WIDTH as usize, "{line:?}");
            }
        }
    }

    #[test]
    fn bob_rises_mid_period() {
        assert_eq!(bob_offset(Duration::from_millis(0)), 1);
        assert_eq!(bob_offset(Duration::from_millis(1500)), 0);
        assert_eq!(bob_offset(Duration::from_millis(2900)), 1);
    }
}
