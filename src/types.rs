//! Core types shared across modes, configuration and commands.

use core::str::FromStr;

use palette::Srgb;
use serde::Deserialize;

/// One of the fixture's three color channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Red output.
    Red,

    /// Green output.
    Green,

    /// Blue output.
    Blue,
}

impl Channel {
    /// Builds a color where only this channel is lit, at `percent` intensity.
    ///
    /// The other channels are forced to 0.
    pub fn solo(self, percent: f32) -> Srgb {
        let value = percent / 100.0;
        match self {
            Channel::Red => Srgb::new(value, 0.0, 0.0),
            Channel::Green => Srgb::new(0.0, value, 0.0),
            Channel::Blue => Srgb::new(0.0, 0.0, value),
        }
    }
}

impl core::fmt::Display for Channel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let letter = match self {
            Channel::Red => "r",
            Channel::Green => "g",
            Channel::Blue => "b",
        };
        f.write_str(letter)
    }
}

/// Error returned when a channel name is not one of `r`, `g`, `b`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown channel `{0}`, expected one of r, g, b")]
pub struct ParseChannelError(pub String);

impl FromStr for Channel {
    type Err = ParseChannelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "r" => Ok(Channel::Red),
            "g" => Ok(Channel::Green),
            "b" => Ok(Channel::Blue),
            other => Err(ParseChannelError(other.to_owned())),
        }
    }
}

/// How the scheduler returns to the base color once its queue runs dry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RestoreStyle {
    /// Transition from the observed output back to the base color.
    #[default]
    Smooth,

    /// Write the base color immediately.
    Snap,
}
