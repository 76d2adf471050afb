// Fake Frog — Serial clock prompt
//
// Optional startup dialogue on the console: a yes/no question, then one line
// per field (year, month, day, hour, minute, second). The input blocks; on
// the board it is the USB serial console, on the host it is stdin.

use std::io::BufRead;

use crate::clock::{TimeField, Timestamp};
use crate::error::ClockError;

/// Bad answers tolerated per field before the prompt gives up.
const MAX_ATTEMPTS: u8 = 3;

fn range(field: TimeField) -> (u16, u16) {
    match field {
        TimeField::Year => (2000, 2099),
        TimeField::Month => (1, 12),
        TimeField::Day => (1, 31),
        TimeField::Hour => (0, 23),
        TimeField::Minute => (0, 59),
        TimeField::Second => (0, 59),
    }
}

/// Next trimmed line, or `None` at end of input.
fn read_answer<R: BufRead + ?Sized>(input: &mut R) -> Result<Option<String>, ClockError> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_owned()))
}

fn ask_field<R: BufRead + ?Sized>(input: &mut R, field: TimeField) -> Result<Option<u16>, ClockError> {
    let (min, max) = range(field);
    for _ in 0..MAX_ATTEMPTS {
        log::info!("Enter {} ({}-{}):", field.name(), min, max);
        let Some(answer) = read_answer(input)? else {
            return Ok(None);
        };
        match answer.parse::<u16>() {
            Ok(value) if (min..=max).contains(&value) => return Ok(Some(value)),
            _ => log::warn!("'{}' is not a {} between {} and {}", answer, field.name(), min, max),
        }
    }
    Ok(None)
}

/// Ask whether to set the clock and, if so, read a full timestamp.
///
/// Returns `Ok(None)` when the user declines, input ends, or a field keeps
/// being answered out of range. A date that does not exist (30 February) is
/// an error.
pub fn prompt_clock<R: BufRead + ?Sized>(input: &mut R) -> Result<Option<Timestamp>, ClockError> {
    log::info!("Set the real-time clock? [y/N]");
    let Some(answer) = read_answer(input)? else {
        return Ok(None);
    };
    if !matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes") {
        return Ok(None);
    }

    let mut values = [0u16; 6];
    for (slot, field) in values.iter_mut().zip(TimeField::ALL) {
        match ask_field(input, field)? {
            Some(v) => *slot = v,
            None => {
                log::warn!("Clock left unchanged");
                return Ok(None);
            }
        }
    }

    let [year, month, day, hour, minute, second] = values;
    Timestamp::new(
        year,
        month as u8,
        day as u8,
        hour as u8,
        minute as u8,
        second as u8,
    )
    .map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run(input: &str) -> Result<Option<Timestamp>, ClockError> {
        prompt_clock(&mut Cursor::new(input.as_bytes()))
    }

    #[test]
    fn declining_leaves_clock_alone() {
        assert_eq!(run("n\n").unwrap(), None);
        assert_eq!(run("\n").unwrap(), None);
        assert_eq!(run("").unwrap(), None);
    }

    #[test]
    fn reads_all_six_fields() {
        let ts = run("yes\n2024\n2\n29\n13\n45\n30\n").unwrap().unwrap();
        assert_eq!(ts, Timestamp::new(2024, 2, 29, 13, 45, 30).unwrap());
    }

    #[test]
    fn out_of_range_answer_is_asked_again() {
        let ts = run("Y\n2024\n13\nmay\n5\n1\n0\n0\n0\n").unwrap().unwrap();
        assert_eq!(ts.to_string(), "2024-05-01T00:00:00");
    }

    #[test]
    fn gives_up_after_repeated_bad_answers() {
        assert_eq!(run("y\n1999\n1800\nsoon\n").unwrap(), None);
    }

    #[test]
    fn truncated_input_gives_up() {
        assert_eq!(run("y\n2024\n6\n").unwrap(), None);
    }

    #[test]
    fn impossible_date_is_rejected() {
        let err = run("y\n2023\n2\n30\n0\n0\n0\n").unwrap_err();
        assert!(matches!(err, ClockError::InvalidTimestamp { month: 2, day: 30, .. }));
    }
}
