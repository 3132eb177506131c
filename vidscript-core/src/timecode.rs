//! Parsing of the time values accepted by `trim`.
//!
//! Accepted forms are `SS`, `MM:SS` and `HH:MM:SS`, each optionally followed by
//! a `.fraction`. Every field is one or two digits and must stay inside its
//! clock range (hours < 24, minutes < 60, seconds < 60).

use regex::Regex;
use std::sync::LazyLock;

static TIME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(?:(\d{1,2}):)?(\d{1,2}):)?(\d{1,2})(?:\.(\d+))?$")
        .expect("time regex is valid")
});

/// Convert a time value into total seconds, or `None` if it is malformed or
/// out of range.
pub fn parse_seconds(value: &str) -> Option<f64> {
    let caps = TIME_REGEX.captures(value)?;

    let field = |idx: usize| -> Option<u32> {
        match caps.get(idx) {
            Some(m) => m.as_str().parse().ok(),
            None => Some(0),
        }
    };

    let hours = field(1)?;
    let minutes = field(2)?;
    let seconds = field(3)?;
    if hours >= 24 || minutes >= 60 || seconds >= 60 {
        return None;
    }

    let fraction = match caps.get(4) {
        Some(m) => format!("0.{}", m.as_str()).parse::<f64>().ok()?,
        None => 0.0,
    };

    Some(f64::from(hours) * 3600.0 + f64::from(minutes) * 60.0 + f64::from(seconds) + fraction)
}
