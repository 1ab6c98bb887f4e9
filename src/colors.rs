//! Color model helpers.
//!
//! Colors are `palette::Srgb<f32>` with components in the 0.0-1.0 range. The
//! command grammar and every mode parameter speak percent (0-100), so this
//! module provides the conversions used at those edges.
//!
//! Stored colors are never clamped. Interpolation may overshoot slightly and
//! that is a legal intermediate state; each channel clamps its own duty at the
//! hardware boundary (see [`crate::pwm`]).

use palette::Srgb;

/// All channels off.
pub const OFF: Srgb = Srgb::new(0.0, 0.0, 0.0);

/// Full-brightness white.
pub const WHITE: Srgb = Srgb::new(1.0, 1.0, 1.0);

/// Full-brightness red, the bright end of an alert pulse.
pub const RED: Srgb = Srgb::new(1.0, 0.0, 0.0);

/// Dim red, the low end of an alert pulse.
pub const DIM_RED: Srgb = Srgb::new(0.3, 0.0, 0.0);

/// Creates a color from percent components (0-100).
#[inline]
pub fn percent(r: f32, g: f32, b: f32) -> Srgb {
    Srgb::new(r / 100.0, g / 100.0, b / 100.0)
}

/// Returns the percent components (0-100) of a color, unclamped.
#[inline]
pub fn to_percent(color: Srgb) -> [f32; 3] {
    [color.red * 100.0, color.green * 100.0, color.blue * 100.0]
}

/// Scales every channel by a brightness percent, clamped to 0-100.
#[inline]
pub fn scale_brightness(color: Srgb, brightness: f32) -> Srgb {
    color * (brightness.clamp(0.0, 100.0) / 100.0)
}
