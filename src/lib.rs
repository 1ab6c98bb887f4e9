#![doc = include_str!("../README.md")]

//! # Core Concepts
//!
//! - **`Mode`**: A parameterized animation (transition, alarm, alert, morse), inert until scheduled
//! - **`Scheduler`**: Runs queued modes one at a time, supports cancel and restores the base color
//! - **`Light`**: Shared handle to the fixture and the last committed base color
//! - **`Transition`**: Resumable frame generator moving between two colors at a fixed frame rate
//! - **`Command`**: One parsed text command line, executed against a scheduler
//! - **`Server`**: Length-prefixed, one-request-per-connection TCP front end
//! - **`RgbLed`** / **`PwmDriver`**: Traits to implement for your fixture hardware
//!
//! The library uses `Srgb<f32>` (0.0-1.0 range) for all color operations and interpolation.
//! Commands and mode parameters speak percent (0-100); see [`colors::percent`].

// Re-export Srgb from palette for user convenience
pub use palette::Srgb;

pub mod client;
pub mod colors;
pub mod command;
pub mod config;
pub mod light;
pub mod mode;
pub mod morse;
pub mod protocol;
pub mod pwm;
pub mod scheduler;
pub mod server;
pub mod transition;
pub mod types;

pub use command::{Command, CommandError};
pub use config::{Config, ConfigError};
pub use light::Light;
pub use mode::{Alarm, Alert, Mode};
pub use protocol::Reply;
pub use pwm::{Fixture, LogDriver, PwmChannel, PwmDriver, PwmError, RgbLed};
pub use scheduler::{Completion, ModeOutcome, Scheduler, SchedulerError, SchedulerState};
pub use server::Server;
pub use transition::{FRAME_INTERVAL, Transition};
pub use types::{Channel, RestoreStyle};
