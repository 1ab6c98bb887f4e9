//! Morse code table and timing.
//!
//! Encoded text is a string of `.` and `-` symbols. Letters are separated by a
//! single space and words by `/`.

use core::time::Duration;

/// Length of a dit.
pub const DIT: Duration = Duration::from_millis(250);

/// Length of a dah, three dits.
pub const DAH: Duration = Duration::from_millis(750);

/// Pause after every lit symbol, and the gap between letters.
pub const SYMBOL_PAUSE: Duration = DIT;

/// Gap between words.
///
/// Five dits plus the surrounding letter gaps make the customary seven.
pub const WORD_PAUSE: Duration = Duration::from_millis(1250);

/// Error returned when text contains a character with no Morse encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("character {0:?} has no morse encoding")]
pub struct MorseError(pub char);

/// Returns the dot-dash pattern for an uppercase character.
pub fn encode_char(c: char) -> Option<&'static str> {
    let code = match c {
        'A' => ".-",
        'B' => "-...",
        'C' => "-.-.",
        'D' => "-..",
        'E' => ".",
        'F' => "..-.",
        'G' => "--.",
        'H' => "....",
        'I' => "..",
        'J' => ".---",
        'K' => "-.-",
        'L' => ".-..",
        'M' => "--",
        'N' => "-.",
        'O' => "---",
        'P' => ".--.",
        'Q' => "--.-",
        'R' => ".-.",
        'S' => "...",
        'T' => "-",
        'U' => "..-",
        'V' => "...-",
        'W' => ".--",
        'X' => "-..-",
        'Y' => "-.--",
        'Z' => "--..",
        '1' => ".----",
        '2' => "..---",
        '3' => "...--",
        '4' => "....-",
        '5' => ".....",
        '6' => "-....",
        '7' => "--...",
        '8' => "---..",
        '9' => "----.",
        '0' => "-----",
        'Ä' => ".-.-",
        'Ö' => "---.",
        'Ü' => "..--",
        'ß' => "...--..",
        ' ' => "/",
        _ => return None,
    };
    Some(code)
}

/// Encodes `text` as Morse code.
///
/// Lowercase letters are encoded as their uppercase form. Fails on the first
/// character without an encoding.
pub fn text_to_morse(text: &str) -> Result<String, MorseError> {
    let mut encoded = String::new();
    for c in text.chars() {
        // `ß` has no single-char uppercase, so try it as given first.
        let code = encode_char(c)
            .or_else(|| c.to_uppercase().next().and_then(encode_char))
            .ok_or(MorseError(c))?;
        if !encoded.is_empty() {
            encoded.push(' ');
        }
        encoded.push_str(code);
    }
    Ok(encoded)
}

/// How long the fixture stays in the state a symbol selects.
///
/// Returns `None` for characters that are not Morse symbols.
pub fn duration(symbol: char) -> Option<Duration> {
    match symbol {
        '.' => Some(DIT),
        '-' => Some(DAH),
        ' ' => Some(SYMBOL_PAUSE),
        '/' => Some(WORD_PAUSE),
        _ => None,
    }
}

/// Returns true for symbols that light the fixture.
pub fn is_mark(symbol: char) -> bool {
    matches!(symbol, '.' | '-')
}
