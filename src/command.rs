//! Text command interpreter.
//!
//! A command line is split on whitespace; the first token is the verb and the
//! remaining tokens are positional arguments. Missing trailing arguments take
//! their defaults, surplus arguments are ignored.
//!
//! | Verb | Arguments |
//! |---|---|
//! | `on` | `[r] [g] [b] [brightness] [_] [duration_ms]` |
//! | `off` | |
//! | `alarm` | `<duration_s> [channel=r] [speed_ms=2] [step=1]` |
//! | `alert` | `[times=3] [speed_ms=300]` |
//! | `morse` | `<text...>` |
//! | `cancel` | |
//!
//! For `on`, brightness is only read when the line has exactly five tokens,
//! and the duration sits at index 6, so the two cannot be combined.

use core::str::FromStr;
use std::time::Duration;

use log::{debug, info};
use palette::Srgb;

use crate::colors::{self, OFF};
use crate::mode::{Alarm, Alert, Mode};
use crate::morse::{self, MorseError};
use crate::scheduler::{Completion, Scheduler, SchedulerError};
use crate::transition::DEFAULT_DURATION;
use crate::types::{Channel, ParseChannelError};

/// Errors produced while parsing a command line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// The line contained no tokens.
    #[error("empty command")]
    Empty,

    /// The verb is not implemented.
    #[error("unknown command `{0}`")]
    Unknown(String),

    /// A required argument was not given.
    #[error("missing argument: {0}")]
    MissingArgument(&'static str),

    /// An argument could not be parsed as a number.
    #[error("invalid {name}: `{value}`")]
    InvalidNumber { name: &'static str, value: String },

    /// The alarm channel is not one of `r`, `g`, `b`.
    #[error(transparent)]
    Channel(#[from] ParseChannelError),

    /// The morse text contains an unencodable character.
    #[error(transparent)]
    Morse(#[from] MorseError),
}

/// A parsed command, ready to be executed against a [`Scheduler`].
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Transition to `color` over `duration`.
    On { color: Srgb, duration: Duration },
    /// Transition to black over the default duration.
    Off,
    /// Queue an alarm.
    Alarm(Alarm),
    /// Queue an alert.
    Alert(Alert),
    /// Queue a Morse message, already encoded.
    Morse { text: String, code: String },
    /// Cancel the running mode.
    Cancel,
}

fn arg<T: FromStr>(
    tokens: &[&str],
    index: usize,
    name: &'static str,
) -> Result<Option<T>, CommandError> {
    tokens
        .get(index)
        .map(|value| {
            value.parse::<T>().map_err(|_| CommandError::InvalidNumber {
                name,
                value: (*value).to_owned(),
            })
        })
        .transpose()
}

impl Command {
    /// Parses one command line. `default_color` fills in missing `on` channels.
    pub fn parse(line: &str, default_color: Srgb) -> Result<Self, CommandError> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let verb = *tokens.first().ok_or(CommandError::Empty)?;

        match verb {
            "on" => {
                let [dr, dg, db] = colors::to_percent(default_color);
                let r = arg(&tokens, 1, "red")?.unwrap_or(dr);
                let g = arg(&tokens, 2, "green")?.unwrap_or(dg);
                let b = arg(&tokens, 3, "blue")?.unwrap_or(db);
                let mut color = colors::percent(r, g, b);

                if tokens.len() == 5 {
                    let brightness: i64 = arg(&tokens, 4, "brightness")?.unwrap_or(100);
                    color = colors::scale_brightness(color, brightness.clamp(0, 100) as f32);
                }

                let duration = arg(&tokens, 6, "duration")?
                    .map(Duration::from_millis)
                    .unwrap_or(DEFAULT_DURATION);

                Ok(Command::On { color, duration })
            }
            "off" => Ok(Command::Off),
            "alarm" => {
                let seconds: u64 =
                    arg(&tokens, 1, "duration")?.ok_or(CommandError::MissingArgument("duration"))?;
                let channel = match tokens.get(2) {
                    Some(name) => name.parse::<Channel>()?,
                    None => Channel::Red,
                };
                let speed: u64 = arg(&tokens, 3, "speed")?.unwrap_or(2);
                let step: u32 = arg(&tokens, 4, "step")?.unwrap_or(1);

                Ok(Command::Alarm(Alarm {
                    channel,
                    duration: Duration::from_secs(seconds),
                    speed: Duration::from_millis(speed),
                    step: step as f32,
                }))
            }
            "alert" => {
                let times = arg(&tokens, 1, "times")?.unwrap_or(3);
                let speed: u64 = arg(&tokens, 2, "speed")?.unwrap_or(300);

                Ok(Command::Alert(Alert {
                    times,
                    speed: Duration::from_millis(speed),
                }))
            }
            "morse" => {
                let text = tokens[1..].join(" ");
                let code = morse::text_to_morse(&text)?;
                Ok(Command::Morse { text, code })
            }
            "cancel" => Ok(Command::Cancel),
            other => Err(CommandError::Unknown(other.to_owned())),
        }
    }

    /// The verb this command was parsed from.
    pub fn verb(&self) -> &'static str {
        match self {
            Command::On { .. } => "on",
            Command::Off => "off",
            Command::Alarm(_) => "alarm",
            Command::Alert(_) => "alert",
            Command::Morse { .. } => "morse",
            Command::Cancel => "cancel",
        }
    }

    /// Hands the command to `scheduler`.
    ///
    /// `on` and `off` return the completion of their transition so the caller
    /// can wait for it. The other verbs return as soon as the mode is queued
    /// or the cancel request is made.
    pub fn execute(self, scheduler: &Scheduler) -> Result<Option<Completion>, SchedulerError> {
        debug!("executing {:?}", self);
        match self {
            Command::On { color, duration } => scheduler
                .enqueue(Mode::Transition {
                    target: color,
                    duration,
                })
                .map(Some),
            Command::Off => scheduler
                .enqueue(Mode::Transition {
                    target: OFF,
                    duration: DEFAULT_DURATION,
                })
                .map(Some),
            Command::Alarm(alarm) => scheduler.enqueue(Mode::Alarm(alarm)).map(|_| None),
            Command::Alert(alert) => scheduler.enqueue(Mode::Alert(alert)).map(|_| None),
            Command::Morse { text, code } => {
                info!("queueing morse {:?}", text);
                scheduler.enqueue(Mode::Morse { code }).map(|_| None)
            }
            Command::Cancel => {
                scheduler.cancel();
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULT: Srgb = Srgb::new(0.8, 0.1, 0.0);

    fn parse(line: &str) -> Result<Command, CommandError> {
        Command::parse(line, DEFAULT)
    }

    fn colors_equal(a: Srgb, b: Srgb) -> bool {
        const EPSILON: f32 = 0.0001;
        (a.red - b.red).abs() < EPSILON
            && (a.green - b.green).abs() < EPSILON
            && (a.blue - b.blue).abs() < EPSILON
    }

    #[test]
    fn bare_on_uses_default_color() {
        let Command::On { color, duration } = parse("on").unwrap() else {
            panic!("expected on");
        };
        assert!(colors_equal(color, DEFAULT));
        assert_eq!(duration, DEFAULT_DURATION);
    }

    #[test]
    fn on_reads_channels_by_position() {
        let Command::On { color, .. } = parse("on 100 50").unwrap() else {
            panic!("expected on");
        };
        assert!(colors_equal(color, Srgb::new(1.0, 0.5, 0.0)));
    }

    #[test]
    fn on_brightness_only_with_exactly_five_tokens() {
        let Command::On { color, .. } = parse("on 100 50 0 50").unwrap() else {
            panic!("expected on");
        };
        assert!(colors_equal(color, Srgb::new(0.5, 0.25, 0.0)));

        // Six tokens: position 4 is not read as brightness.
        let Command::On { color, .. } = parse("on 100 50 0 50 x").unwrap() else {
            panic!("expected on");
        };
        assert!(colors_equal(color, Srgb::new(1.0, 0.5, 0.0)));
    }

    #[test]
    fn on_brightness_is_clamped() {
        let Command::On { color, .. } = parse("on 100 100 100 250").unwrap() else {
            panic!("expected on");
        };
        assert!(colors_equal(color, Srgb::new(1.0, 1.0, 1.0)));
    }

    #[test]
    fn on_reads_duration_at_index_six() {
        let Command::On { duration, .. } = parse("on 10 10 10 x y 1200").unwrap() else {
            panic!("expected on");
        };
        assert_eq!(duration, Duration::from_millis(1200));
    }

    #[test]
    fn on_rejects_non_numeric_channel() {
        assert!(matches!(
            parse("on red"),
            Err(CommandError::InvalidNumber { name: "red", .. })
        ));
    }

    #[test]
    fn alarm_requires_duration() {
        assert_eq!(parse("alarm"), Err(CommandError::MissingArgument("duration")));
    }

    #[test]
    fn alarm_defaults() {
        let Command::Alarm(alarm) = parse("alarm 10").unwrap() else {
            panic!("expected alarm");
        };
        assert_eq!(alarm.channel, Channel::Red);
        assert_eq!(alarm.duration, Duration::from_secs(10));
        assert_eq!(alarm.speed, Duration::from_millis(2));
        assert_eq!(alarm.step, 1.0);
    }

    #[test]
    fn alarm_rejects_unknown_channel() {
        assert!(matches!(parse("alarm 10 x"), Err(CommandError::Channel(_))));
    }

    #[test]
    fn alert_defaults() {
        assert_eq!(
            parse("alert").unwrap(),
            Command::Alert(Alert {
                times: 3,
                speed: Duration::from_millis(300),
            })
        );
    }

    #[test]
    fn morse_joins_remaining_tokens() {
        let Command::Morse { text, code } = parse("morse sos  sos").unwrap() else {
            panic!("expected morse");
        };
        assert_eq!(text, "sos sos");
        assert_eq!(code, "... --- ... / ... --- ...");
    }

    #[test]
    fn morse_rejects_unencodable_text() {
        assert_eq!(parse("morse ok?"), Err(CommandError::Morse(MorseError('?'))));
    }

    #[test]
    fn unknown_and_empty_verbs_fail() {
        assert_eq!(parse("dance"), Err(CommandError::Unknown("dance".into())));
        assert_eq!(parse("   "), Err(CommandError::Empty));
    }
}
