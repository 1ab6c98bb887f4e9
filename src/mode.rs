//! Animation modes.
//!
//! A [`Mode`] is an inert description of an animation. Running it produces
//! timed writes to a [`Light`] until it finishes on its own or the task
//! driving it is dropped at one of its timed waits.

use std::time::Duration;

use log::debug;
use palette::Srgb;
use tokio::time::Instant;

use crate::colors::{DIM_RED, OFF, RED, WHITE};
use crate::light::{Light, suspend};
use crate::morse;
use crate::pwm::PwmError;
use crate::types::Channel;

/// Lower bound of the alarm oscillation, in percent.
pub const ALARM_LOW: f32 = 20.0;

/// Upper bound of the alarm oscillation, in percent.
pub const ALARM_HIGH: f32 = 100.0;

/// Parameters of the alarm mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Alarm {
    /// Channel that pulses; the others stay dark.
    pub channel: Channel,
    /// Total run time. Zero runs until cancelled.
    pub duration: Duration,
    /// Wait between two intensity steps.
    pub speed: Duration,
    /// Intensity change per step, in percent.
    pub step: f32,
}

/// Parameters of the alert mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alert {
    /// Number of bright/dim pulses.
    pub times: u32,
    /// Length of one full pulse.
    pub speed: Duration,
}

/// A parameterized animation, not yet started.
#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    /// Smoothly move to `target` and commit it as the base color.
    Transition { target: Srgb, duration: Duration },

    /// Oscillate a single channel between [`ALARM_LOW`] and [`ALARM_HIGH`].
    Alarm(Alarm),

    /// Pulse between bright and dim red, then fall back to the previous base.
    Alert(Alert),

    /// Flash an encoded Morse message in white.
    Morse { code: String },
}

impl Mode {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Transition { .. } => "transition",
            Mode::Alarm(_) => "alarm",
            Mode::Alert(_) => "alert",
            Mode::Morse { .. } => "morse",
        }
    }

    /// Runs the mode to completion against `light`.
    pub async fn run(self, light: Light) -> Result<(), PwmError> {
        match self {
            Mode::Transition { target, duration } => light.transition(target, None, duration).await,
            Mode::Alarm(alarm) => alarm.run(&light).await,
            Mode::Alert(alert) => alert.run(&light).await,
            Mode::Morse { code } => run_morse(&code, &light).await,
        }
    }
}

/// Intensity sweep of the alarm mode.
///
/// Direction flips when the intensity reaches a bound, so values can pass a
/// bound by less than one step before turning around.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlarmSweep {
    intensity: f32,
    rising: bool,
    step: f32,
}

impl AlarmSweep {
    /// Starts dark, about to rise.
    pub fn new(step: f32) -> Self {
        Self {
            intensity: 0.0,
            rising: true,
            step,
        }
    }

    /// Advances one step and returns the new intensity in percent.
    pub fn advance(&mut self) -> f32 {
        if self.intensity >= ALARM_HIGH {
            self.rising = false;
        }
        if self.intensity <= ALARM_LOW {
            self.rising = true;
        }

        if self.rising {
            self.intensity += self.step;
        } else {
            self.intensity -= self.step;
        }
        self.intensity
    }
}

impl Alarm {
    async fn run(self, light: &Light) -> Result<(), PwmError> {
        // Zero, or too long for the clock to represent, runs until cancelled.
        let deadline = if self.duration.is_zero() {
            None
        } else {
            Instant::now().checked_add(self.duration)
        };
        let mut sweep = AlarmSweep::new(self.step);

        while deadline.is_none_or(|end| Instant::now() <= end) {
            let intensity = sweep.advance();
            light.write(self.channel.solo(intensity))?;
            suspend(self.speed).await;
        }
        Ok(())
    }
}

impl Alert {
    async fn run(self, light: &Light) -> Result<(), PwmError> {
        let original = light.base();
        let half = self.speed / 2;

        // Pulses are transient so the base record never leaves `original`,
        // even if the alert is cancelled between two pulses.
        let mut from = original;
        for pulse in 0..self.times {
            debug!("alert pulse {}/{}", pulse + 1, self.times);
            light.fade(from, RED, half).await?;
            light.fade(RED, DIM_RED, half).await?;
            from = DIM_RED;
        }

        light.set_base(original);
        Ok(())
    }
}

async fn run_morse(code: &str, light: &Light) -> Result<(), PwmError> {
    for symbol in code.chars() {
        let Some(hold) = morse::duration(symbol) else {
            continue;
        };

        if morse::is_mark(symbol) {
            light.write(WHITE)?;
            suspend(hold).await;
            light.write(OFF)?;
            suspend(morse::SYMBOL_PAUSE).await;
        } else {
            light.write(OFF)?;
            suspend(hold).await;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sweep_rises_from_dark() {
        let mut sweep = AlarmSweep::new(10.0);
        assert_eq!(sweep.advance(), 10.0);
        assert_eq!(sweep.advance(), 20.0);
        assert_eq!(sweep.advance(), 30.0);
    }

    #[test]
    fn sweep_turns_at_upper_bound() {
        let mut sweep = AlarmSweep::new(30.0);
        let values: Vec<f32> = (0..8).map(|_| sweep.advance()).collect();
        // 120 overshoots the upper bound and 0 undershoots the lower one.
        assert_eq!(values, vec![30.0, 60.0, 90.0, 120.0, 90.0, 60.0, 30.0, 0.0]);
    }

    #[test]
    fn sweep_turns_at_lower_bound() {
        let mut sweep = AlarmSweep {
            intensity: 100.0,
            rising: true,
            step: 40.0,
        };
        assert_eq!(sweep.advance(), 60.0);
        assert_eq!(sweep.advance(), 20.0);
        assert_eq!(sweep.advance(), 60.0);
    }

    #[test]
    fn mode_names() {
        assert_eq!(Mode::Morse { code: String::new() }.name(), "morse");
        assert_eq!(
            Mode::Alert(Alert {
                times: 1,
                speed: Duration::from_millis(300)
            })
            .name(),
            "alert"
        );
    }
}
