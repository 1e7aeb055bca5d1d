//! Event types and the main event loop driver for the Spark Clock.
//!
//! This module defines the [`Event`] enum (keyboard and mouse input, ticks,
//! pipeline results) and the [`EventHandler`], which runs a background task
//! that polls crossterm for terminal events and emits periodic
//! [`Event::Tick`]s. The main loop in `main.rs` receives events via
//! [`EventHandler::next`]; the weather pipeline task posts its result through
//! [`EventHandler::tx`].

use crate::error::FetchError;
use crate::models::{GeoPosition, WeatherReport};
use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind, MouseEvent};
use std::io;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::error;

/// Events processed by the application event loop.
#[derive(Debug)]
pub enum Event {
    /// Periodic tick used for the clock and animations.
    Tick,
    /// User key press from the terminal.
    Input(KeyEvent),
    /// Mouse press, drag or release, used for swiping between pages.
    Mouse(MouseEvent),
    /// The pipeline settled on a position for this run.
    LocationResolved(GeoPosition),
    /// Outcome of one weather pipeline run.
    WeatherUpdate(Result<WeatherReport, FetchError>),
    /// Terminal input failed and the input task has stopped. No more ticks
    /// or keys will arrive.
    InputClosed,
}

/// Multiplexes terminal input and ticks into a single event stream.
///
/// Holds an unbounded channel: the sender ([`tx`](EventHandler::tx)) can be
/// cloned and given to other tasks, while the receiver is consumed by
/// [`next`](EventHandler::next) in the main loop.
pub struct EventHandler {
    /// Sender for posting events (e.g. from the weather pipeline).
    pub tx: mpsc::UnboundedSender<Event>,
    rx: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
    /// Creates a new event handler reading from the real terminal.
    ///
    /// # Arguments
    ///
    /// * `tick_rate_ms` - Interval in milliseconds between [`Event::Tick`] emissions.
    pub fn new(tick_rate_ms: u64) -> Self {
        Self::with_reader(tick_rate_ms, read_terminal)
    }

    /// Spawns the input/tick task around `read`, which waits up to the given
    /// timeout and yields `Ok(None)` when nothing arrived.
    ///
    /// Key presses become [`Event::Input`], mouse activity becomes
    /// [`Event::Mouse`], and each elapsed interval sends [`Event::Tick`].
    /// If `read` fails the task logs the error, sends [`Event::InputClosed`]
    /// and exits. The handler keeps a sender of its own, so the stream
    /// itself never ends; callers must treat `InputClosed` as the end.
    pub fn with_reader<F>(tick_rate_ms: u64, mut read: F) -> Self
    where
        F: FnMut(Duration) -> io::Result<Option<CrosstermEvent>> + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let event_tx = tx.clone();

        tokio::spawn(async move {
            let tick_rate = Duration::from_millis(tick_rate_ms);
            let mut last_tick = Instant::now();
            loop {
                let timeout = tick_rate
                    .checked_sub(last_tick.elapsed())
                    .unwrap_or(Duration::from_secs(0));

                match read(timeout) {
                    Ok(Some(CrosstermEvent::Key(key))) if key.kind == KeyEventKind::Press => {
                        event_tx.send(Event::Input(key)).ok();
                    }
                    Ok(Some(CrosstermEvent::Mouse(mouse))) => {
                        event_tx.send(Event::Mouse(mouse)).ok();
                    }
                    Ok(_) => {}
                    Err(e) => {
                        error!("Terminal input failed: {}", e);
                        event_tx.send(Event::InputClosed).ok();
                        break;
                    }
                }

                if last_tick.elapsed() >= tick_rate {
                    if event_tx.send(Event::Tick).is_err() {
                        break;
                    }
                    last_tick = Instant::now();
                }
            }
        });

        Self { tx, rx }
    }

    /// Receives the next event from the channel.
    ///
    /// Returns `None` only if the channel closes, which cannot happen while
    /// the handler holds `tx`.
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}

fn read_terminal(timeout: Duration) -> io::Result<Option<CrosstermEvent>> {
    if event::poll(timeout)? {
        event::read().map(Some)
    } else {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};
    use std::collections::VecDeque;

    async fn next_non_tick(events: &mut EventHandler) -> Event {
        loop {
            let event = tokio::time::timeout(Duration::from_secs(2), events.next())
                .await
                .expect("event stream stalled")
                .expect("event stream ended");
            if !matches!(event, Event::Tick) {
                return event;
            }
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn read_failure_reports_input_closed() {
        let mut events = EventHandler::with_reader(20, |_| {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "terminal gone"))
        });

        assert!(matches!(next_non_tick(&mut events).await, Event::InputClosed));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn forwards_presses_then_closes() {
        let mut queue: VecDeque<CrosstermEvent> = VecDeque::from([
            CrosstermEvent::Key(KeyEvent::new_with_kind(
                KeyCode::Char('x'),
                KeyModifiers::NONE,
                KeyEventKind::Release,
            )),
            CrosstermEvent::Key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE)),
            CrosstermEvent::FocusGained,
        ]);
        let mut events = EventHandler::with_reader(1_000, move |_| match queue.pop_front() {
            Some(ev) => Ok(Some(ev)),
            None => Err(io::Error::new(io::ErrorKind::UnexpectedEof, "closed")),
        });

        match next_non_tick(&mut events).await {
            Event::Input(key) => assert_eq!(key.code, KeyCode::Char('q')),
            other => panic!("expected key input, got {other:?}"),
        }
        assert!(matches!(next_non_tick(&mut events).await, Event::InputClosed));
    }
}
