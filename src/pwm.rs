//! PWM output boundary.
//!
//! The physical driver is an external collaborator behind [`PwmDriver`]; it
//! only knows raw duty values for a pin. [`PwmChannel`] adapts a 0-100 percent
//! value to a channel's native duty range, and [`Fixture`] groups three
//! channels into an [`RgbLed`].

use log::debug;
use palette::Srgb;

use crate::colors;

/// Raw PWM driver for a set of pins.
///
/// Implement this for your hardware (sysfs PWM, soft-PWM library, a GPIO
/// expander, ...). `duty` is already in the pin's native range.
pub trait PwmDriver: Send {
    /// Writes a raw duty value to `pin`.
    fn write(&mut self, pin: u8, duty: u32) -> Result<(), PwmError>;
}

/// Errors raised by a PWM driver.
#[derive(Debug, thiserror::Error)]
pub enum PwmError {
    /// The driver rejected or could not complete the write.
    #[error("pwm write to pin {pin} failed: {reason}")]
    WriteFailed { pin: u8, reason: String },

    /// The underlying device file or bus failed.
    #[error("pwm device error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for abstracting an RGB fixture.
///
/// Colors use the 0.0-1.0 range and may be out of bounds; implementations
/// clamp before touching hardware and never modify the caller's value.
pub trait RgbLed: Send {
    /// Writes `color` to the fixture.
    fn set_color(&mut self, color: Srgb) -> Result<(), PwmError>;

    /// The last color written, before clamping.
    fn output(&self) -> Srgb;
}

/// One PWM output with its clamp/invert/rescale configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PwmChannel {
    pin: u8,
    range: u32,
    inverted: bool,
    value: f32,
}

impl PwmChannel {
    /// Creates a channel on `pin` whose native duty range is `0..=range`.
    pub fn new(pin: u8, range: u32, inverted: bool) -> Self {
        Self {
            pin,
            range,
            inverted,
            value: 0.0,
        }
    }

    /// Last percent written, unclamped.
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Maps a percent value to the native duty range.
    ///
    /// Clamps to 0-100, inverts for common-anode wiring, then rescales.
    pub fn duty(&self, percent: f32) -> u32 {
        let mut percent = percent.clamp(0.0, 100.0);
        if self.inverted {
            percent = 100.0 - percent;
        }
        (percent / 100.0 * self.range as f32) as u32
    }

    /// Writes `percent` through `driver`.
    pub fn write<D: PwmDriver + ?Sized>(
        &mut self,
        driver: &mut D,
        percent: f32,
    ) -> Result<(), PwmError> {
        self.value = percent;
        driver.write(self.pin, self.duty(percent))
    }
}

/// A three-channel RGB fixture driven through a [`PwmDriver`].
pub struct Fixture<D: PwmDriver> {
    driver: D,
    channels: [PwmChannel; 3],
}

impl<D: PwmDriver> Fixture<D> {
    /// Creates a fixture from red, green and blue channels.
    pub fn new(driver: D, red: PwmChannel, green: PwmChannel, blue: PwmChannel) -> Self {
        Self {
            driver,
            channels: [red, green, blue],
        }
    }
}

impl<D: PwmDriver> RgbLed for Fixture<D> {
    fn set_color(&mut self, color: Srgb) -> Result<(), PwmError> {
        let percents = colors::to_percent(color);
        for (channel, percent) in self.channels.iter_mut().zip(percents) {
            channel.write(&mut self.driver, percent)?;
        }
        Ok(())
    }

    fn output(&self) -> Srgb {
        let [r, g, b] = self.channels.map(|c| c.value());
        colors::percent(r, g, b)
    }
}

/// Driver that only logs the duty values it is given.
///
/// Used when no PWM hardware is present.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDriver;

impl PwmDriver for LogDriver {
    fn write(&mut self, pin: u8, duty: u32) -> Result<(), PwmError> {
        debug!("pwm: pin {} duty {}", pin, duty);
        Ok(())
    }
}
