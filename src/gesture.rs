//! Swipe and double-tap detection
//!
//! Plain state, no timers: the detector remembers where a touch started and
//! when the last tap happened, and compares each new input against fixed
//! thresholds. The terminal front end feeds Enter presses on an empty line in
//! as taps. A line-based terminal has no pointer, so nothing in this crate
//! calls the swipe half (`touch_start` / `touch_end`); it is exported for
//! front ends that receive touch or pointer events.

use std::time::{Duration, Instant};

/// Minimum horizontal travel for a swipe
pub const SWIPE_THRESHOLD: f32 = 50.0;

/// Maximum gap between the two taps of a double tap
pub const DOUBLE_TAP_INTERVAL: Duration = Duration::from_millis(300);

/// A position in whatever units the front end uses
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Recognized gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    SwipeLeft,
    SwipeRight,
    DoubleTap,
}

/// Tracks touches and taps between input events
#[derive(Debug, Default)]
pub struct GestureDetector {
    touch_start: Option<Point>,
    last_tap: Option<Instant>,
}

impl GestureDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// A touch began at `point`
    ///
    /// Library hook for pointer-driven front ends; the terminal front end
    /// never calls it.
    pub fn touch_start(&mut self, point: Point) {
        self.touch_start = Some(point);
    }

    /// A touch ended at `point`; reports a swipe when it travelled far enough
    ///
    /// Mostly-vertical movement (scrolling) is never a swipe.
    pub fn touch_end(&mut self, point: Point) -> Option<Gesture> {
        let start = self.touch_start.take()?;
        let dx = point.x - start.x;
        let dy = point.y - start.y;

        if dx.abs() <= SWIPE_THRESHOLD || dx.abs() <= dy.abs() {
            return None;
        }

        Some(if dx < 0.0 {
            Gesture::SwipeLeft
        } else {
            Gesture::SwipeRight
        })
    }

    /// A tap happened at `at`; reports a double tap when the previous tap
    /// was recent enough
    ///
    /// The two taps of a double tap are consumed, so a third quick tap starts
    /// a new pair.
    pub fn tap(&mut self, at: Instant) -> Option<Gesture> {
        match self.last_tap.take() {
            Some(previous) if at.saturating_duration_since(previous) < DOUBLE_TAP_INTERVAL => {
                Some(Gesture::DoubleTap)
            }
            _ => {
                self.last_tap = Some(at);
                None
            }
        }
    }

    /// Forget any half-finished gesture
    pub fn reset(&mut self) {
        self.touch_start = None;
        self.last_tap = None;
    }
}
