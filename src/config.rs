//! Process configuration.
//!
//! Loaded once at startup from an optional TOML file. Every field has a
//! default, so an empty file (or no file) gives a working setup for a
//! common-anode fixture on soft PWM:
//!
//! ```toml
//! listen = "0.0.0.0:39382"
//! pwm_range = 100
//! inverted = true
//! default_color = [80, 10, 0]
//! shutdown_color = [100, 100, 100]
//! restore = "smooth"
//!
//! [pins]
//! red = 2
//! green = 3
//! blue = 0
//! ```

use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use palette::Srgb;
use serde::Deserialize;

use crate::colors;
use crate::protocol::DEFAULT_PORT;
use crate::pwm::{Fixture, PwmChannel, PwmDriver};
use crate::types::RestoreStyle;

/// Errors raised while loading the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Pin identifiers of the three channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Pins {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Default for Pins {
    fn default() -> Self {
        Self {
            red: 2,
            green: 3,
            blue: 0,
        }
    }
}

/// Daemon configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Address the command server listens on.
    pub listen: SocketAddr,
    /// Channel pins.
    pub pins: Pins,
    /// Native duty range of every channel.
    pub pwm_range: u32,
    /// Invert duty cycles (common-anode wiring).
    pub inverted: bool,
    /// Startup color and default for `on`, in percent.
    pub default_color: [f32; 3],
    /// Color set on shutdown, in percent.
    pub shutdown_color: [f32; 3],
    /// How to return to the base color after the queue drains.
    pub restore: RestoreStyle,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
            pins: Pins::default(),
            pwm_range: 100,
            inverted: true,
            default_color: [80.0, 10.0, 0.0],
            shutdown_color: [100.0, 100.0, 100.0],
            restore: RestoreStyle::Smooth,
        }
    }
}

impl Config {
    /// Parses a TOML document.
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Reads and parses the file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;
        Self::from_toml(&source)
    }

    /// Startup color.
    pub fn default_color(&self) -> Srgb {
        let [r, g, b] = self.default_color;
        colors::percent(r, g, b)
    }

    /// Color written when the daemon exits.
    pub fn shutdown_color(&self) -> Srgb {
        let [r, g, b] = self.shutdown_color;
        colors::percent(r, g, b)
    }

    /// Builds the fixture described by this configuration on top of `driver`.
    pub fn fixture<D: PwmDriver>(&self, driver: D) -> Fixture<D> {
        let channel = |pin| PwmChannel::new(pin, self.pwm_range, self.inverted);
        Fixture::new(
            driver,
            channel(self.pins.red),
            channel(self.pins.green),
            channel(self.pins.blue),
        )
    }
}
