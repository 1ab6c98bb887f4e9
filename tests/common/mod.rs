//! Shared test infrastructure for licht integration tests

#![allow(dead_code)] // Items used across multiple test files; Rust analyzes per-file

use std::sync::{Arc, Mutex};
use std::time::Duration;

use licht::{Light, PwmDriver, PwmError, RestoreStyle, RgbLed, Scheduler, Srgb};
use tokio::time::Instant;

// ============================================================================
// Mock LED
// ============================================================================

struct MockState {
    output: Srgb,
    history: Vec<(Instant, Srgb)>,
    fail: bool,
}

/// Mock fixture that records every color written, with the time of the write.
///
/// Clones share the same record, so a test keeps one clone while the light
/// owns the other.
#[derive(Clone)]
pub struct MockLed {
    state: Arc<Mutex<MockState>>,
}

impl MockLed {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                output: BLACK,
                history: Vec::new(),
                fail: false,
            })),
        }
    }

    /// All colors written so far, oldest first.
    pub fn color_history(&self) -> Vec<Srgb> {
        self.state.lock().unwrap().history.iter().map(|(_, c)| *c).collect()
    }

    /// All writes with their timestamps.
    pub fn timed_history(&self) -> Vec<(Instant, Srgb)> {
        self.state.lock().unwrap().history.clone()
    }

    pub fn get_last_color(&self) -> Srgb {
        self.state.lock().unwrap().output
    }

    pub fn write_count(&self) -> usize {
        self.state.lock().unwrap().history.len()
    }

    pub fn clear_history(&self) {
        self.state.lock().unwrap().history.clear();
    }

    /// Makes every following write fail until reset.
    pub fn fail_writes(&self, fail: bool) {
        self.state.lock().unwrap().fail = fail;
    }
}

impl RgbLed for MockLed {
    fn set_color(&mut self, color: Srgb) -> Result<(), PwmError> {
        let mut state = self.state.lock().unwrap();
        if state.fail {
            return Err(PwmError::WriteFailed {
                pin: 0,
                reason: "mock failure".into(),
            });
        }
        state.output = color;
        state.history.push((Instant::now(), color));
        Ok(())
    }

    fn output(&self) -> Srgb {
        self.state.lock().unwrap().output
    }
}

// ============================================================================
// Mock PWM driver
// ============================================================================

/// Driver recording raw `(pin, duty)` writes.
#[derive(Clone, Default)]
pub struct RecordingDriver {
    writes: Arc<Mutex<Vec<(u8, u32)>>>,
}

impl RecordingDriver {
    pub fn writes(&self) -> Vec<(u8, u32)> {
        self.writes.lock().unwrap().clone()
    }
}

impl PwmDriver for RecordingDriver {
    fn write(&mut self, pin: u8, duty: u32) -> Result<(), PwmError> {
        self.writes.lock().unwrap().push((pin, duty));
        Ok(())
    }
}

// ============================================================================
// Setup helpers
// ============================================================================

/// Builds a scheduler over a mock fixture with `base` as the base color.
pub fn scheduler_with(base: Srgb, restore: RestoreStyle) -> (Scheduler, MockLed) {
    let led = MockLed::new();
    let light = Light::new(led.clone(), base);
    (Scheduler::new(light, restore), led)
}

pub fn smooth_scheduler(base: Srgb) -> (Scheduler, MockLed) {
    scheduler_with(base, RestoreStyle::Smooth)
}

/// Durations between consecutive writes.
pub fn write_gaps(led: &MockLed) -> Vec<Duration> {
    led.timed_history()
        .windows(2)
        .map(|pair| pair[1].0 - pair[0].0)
        .collect()
}

// ============================================================================
// Colors
// ============================================================================

pub const BLACK: Srgb = Srgb::new(0.0, 0.0, 0.0);
pub const WHITE: Srgb = Srgb::new(1.0, 1.0, 1.0);
pub const RED: Srgb = Srgb::new(1.0, 0.0, 0.0);
pub const GREEN: Srgb = Srgb::new(0.0, 1.0, 0.0);
pub const BLUE: Srgb = Srgb::new(0.0, 0.0, 1.0);

// ============================================================================
// Test Helper Functions
// ============================================================================

/// Compare two colors with floating-point tolerance
pub fn colors_equal(a: Srgb, b: Srgb) -> bool {
    const EPSILON: f32 = 0.001;
    (a.red - b.red).abs() < EPSILON
        && (a.green - b.green).abs() < EPSILON
        && (a.blue - b.blue).abs() < EPSILON
}

/// Compare two durations, allowing for timer granularity
pub fn roughly(actual: Duration, expected: Duration) -> bool {
    const SLACK: Duration = Duration::from_millis(2);
    actual + SLACK >= expected && actual <= expected + SLACK
}
