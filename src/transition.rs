//! Frame generator for smooth color transitions.
//!
//! A [`Transition`] walks from one color to another in equal increments, one
//! frame per [`FRAME_INTERVAL`]. The increments are accumulated, so the last
//! frame carries some floating point drift; callers finish by writing
//! [`Transition::target`] exactly.

use core::time::Duration;

use palette::Srgb;

/// Time between two transition frames.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(20);

/// Default duration of an `on`/`off` transition.
pub const DEFAULT_DURATION: Duration = Duration::from_millis(500);

/// Returns how many frames a transition of `duration` produces.
///
/// Durations shorter than one frame interval produce no frames.
pub fn step_count(duration: Duration) -> u32 {
    let steps = duration.as_micros() / FRAME_INTERVAL.as_micros();
    u32::try_from(steps).unwrap_or(u32::MAX)
}

/// Resumable sequence of intermediate colors between two endpoints.
///
/// Iterating yields the running color after each increment. Dropping the
/// iterator halfway is how a cancelled transition stops.
#[derive(Debug, Clone)]
pub struct Transition {
    current: Srgb,
    delta: Srgb,
    target: Srgb,
    remaining: u32,
}

impl Transition {
    /// Plans a transition from `from` to `target` over `duration`.
    pub fn new(from: Srgb, target: Srgb, duration: Duration) -> Self {
        let steps = step_count(duration);
        let delta = if steps == 0 {
            Srgb::new(0.0, 0.0, 0.0)
        } else {
            (target - from) / steps as f32
        };

        Self {
            current: from,
            delta,
            target,
            remaining: steps,
        }
    }

    /// The exact color to commit once all frames are written.
    pub fn target(&self) -> Srgb {
        self.target
    }

    /// Per-frame increment.
    pub fn delta(&self) -> Srgb {
        self.delta
    }

    /// Frames not yet produced.
    pub fn remaining(&self) -> u32 {
        self.remaining
    }
}

impl Iterator for Transition {
    type Item = Srgb;

    fn next(&mut self) -> Option<Srgb> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        self.current += self.delta;
        Some(self.current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Transition {}
