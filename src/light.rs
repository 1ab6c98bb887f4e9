//! Shared handle to the fixture and the base color record.
//!
//! Every write to the hardware goes through [`Light`]. The scheduler
//! guarantees a single writer at a time; the mutex here only serializes the
//! synchronous write itself and is never held across a suspension point.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use log::trace;
use palette::Srgb;

use crate::pwm::{PwmError, RgbLed};
use crate::transition::{FRAME_INTERVAL, Transition};

struct LightState {
    led: Box<dyn RgbLed>,
    base: Srgb,
}

/// Cloneable handle to the fixture plus the last committed base color.
#[derive(Clone)]
pub struct Light {
    state: Arc<Mutex<LightState>>,
}

impl Light {
    /// Wraps `led`, recording `base` as the base color without writing it.
    pub fn new<L: RgbLed + 'static>(led: L, base: Srgb) -> Self {
        Self {
            state: Arc::new(Mutex::new(LightState {
                led: Box::new(led),
                base,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LightState> {
        // A panic mid-write leaves nothing half-updated worth refusing over.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Writes a transient frame. The base color is left alone.
    pub fn write(&self, color: Srgb) -> Result<(), PwmError> {
        trace!("frame {:?}", color);
        self.lock().led.set_color(color)
    }

    /// Writes `color` and records it as the new base color.
    pub fn commit(&self, color: Srgb) -> Result<(), PwmError> {
        let mut state = self.lock();
        state.led.set_color(color)?;
        state.base = color;
        Ok(())
    }

    /// The last committed base color.
    pub fn base(&self) -> Srgb {
        self.lock().base
    }

    /// Overwrites the base color record without touching the hardware.
    pub fn set_base(&self, color: Srgb) {
        self.lock().base = color;
    }

    /// The color currently on the fixture, as last written.
    pub fn output(&self) -> Srgb {
        self.lock().led.output()
    }

    async fn play(&self, frames: &mut Transition) -> Result<(), PwmError> {
        for frame in frames {
            self.write(frame)?;
            suspend(FRAME_INTERVAL).await;
        }
        Ok(())
    }

    /// Runs the frames of a transition, ending with an exact write of `target`.
    ///
    /// The base color is not updated.
    pub async fn fade(&self, from: Srgb, target: Srgb, duration: Duration) -> Result<(), PwmError> {
        let mut frames = Transition::new(from, target, duration);
        self.play(&mut frames).await?;
        self.write(frames.target())
    }

    /// Transitions to `target` and commits it as the base color.
    ///
    /// Starts from `from`, or from the current base color when `None`.
    pub async fn transition(
        &self,
        target: Srgb,
        from: Option<Srgb>,
        duration: Duration,
    ) -> Result<(), PwmError> {
        let from = from.unwrap_or_else(|| self.base());
        let mut frames = Transition::new(from, target, duration);
        self.play(&mut frames).await?;
        self.commit(frames.target())
    }
}

/// Timed wait between two writes. Cancellation takes effect here.
pub async fn suspend(duration: Duration) {
    tokio::time::sleep(duration).await;
}
