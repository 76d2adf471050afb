// Fake Frog — Calendar timestamps (battery-backed RTC)
//
// A `Timestamp` is captured once per sampling cycle and is immutable for
// that cycle. Calendar validity (month lengths, leap years) is delegated to
// `chrono`; the RTC chip itself stores its fields as packed BCD.

use core::fmt;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

use crate::error::ClockError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl Timestamp {
    /// Start of the range the RTC editor wraps within.
    pub const EPOCH: Timestamp = Timestamp {
        year: 2000,
        month: 1,
        day: 1,
        hour: 0,
        minute: 0,
        second: 0,
    };

    /// Validated constructor.
    pub fn new(
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
    ) -> Result<Self, ClockError> {
        let ts = Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        };
        match ts.to_naive() {
            Some(_) => Ok(ts),
            None => Err(ClockError::InvalidTimestamp {
                year,
                month,
                day,
                hour,
                minute,
                second,
            }),
        }
    }

    pub fn to_naive(&self) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(self.year as i32, self.month as u32, self.day as u32)?.and_hms_opt(
            self.hour as u32,
            self.minute as u32,
            self.second as u32,
        )
    }

    pub fn from_naive(dt: &NaiveDateTime) -> Self {
        Self {
            year: dt.year().clamp(0, u16::MAX as i32) as u16,
            month: dt.month() as u8,
            day: dt.day() as u8,
            hour: dt.hour() as u8,
            minute: dt.minute() as u8,
            second: dt.second().min(59) as u8,
        }
    }

    /// Value of one editable field.
    pub fn field(&self, field: TimeField) -> u16 {
        match field {
            TimeField::Year => self.year,
            TimeField::Month => self.month as u16,
            TimeField::Day => self.day as u16,
            TimeField::Hour => self.hour as u16,
            TimeField::Minute => self.minute as u16,
            TimeField::Second => self.second as u16,
        }
    }

    /// Advance one field by one, wrapping within its range. The day wraps at
    /// the length of the current month; a day that no longer exists after a
    /// month/year change is clamped to the last day of that month.
    pub fn increment(&self, field: TimeField) -> Self {
        let mut next = *self;
        match field {
            TimeField::Year => next.year = if self.year >= 2099 { 2000 } else { self.year + 1 },
            TimeField::Month => next.month = self.month % 12 + 1,
            TimeField::Day => next.day = self.day % days_in_month(self.year, self.month) + 1,
            TimeField::Hour => next.hour = (self.hour + 1) % 24,
            TimeField::Minute => next.minute = (self.minute + 1) % 60,
            TimeField::Second => next.second = (self.second + 1) % 60,
        }
        next.day = next.day.min(days_in_month(next.year, next.month));
        next
    }
}

impl fmt::Display for Timestamp {
    /// Fixed-width `YYYY-MM-DDTHH:MM:SS`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

/// Editable fields in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeField {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
}

impl TimeField {
    pub const ALL: [TimeField; 6] = [
        TimeField::Year,
        TimeField::Month,
        TimeField::Day,
        TimeField::Hour,
        TimeField::Minute,
        TimeField::Second,
    ];

    /// The following field, or `None` after seconds.
    pub fn next(self) -> Option<Self> {
        let idx = Self::ALL.iter().position(|f| *f == self)?;
        Self::ALL.get(idx + 1).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            TimeField::Year => "year",
            TimeField::Month => "month",
            TimeField::Day => "day",
            TimeField::Hour => "hour",
            TimeField::Minute => "minute",
            TimeField::Second => "second",
        }
    }
}

pub fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        _ => {
            let leap = (year % 4 == 0 && year % 100 != 0) || year % 400 == 0;
            if leap {
                29
            } else {
                28
            }
        }
    }
}

/// Packed BCD byte → binary.
pub fn bcd_to_bin(bcd: u8) -> u8 {
    (bcd >> 4) * 10 + (bcd & 0x0F)
}

/// Binary (0..=99) → packed BCD byte.
pub fn bin_to_bcd(bin: u8) -> u8 {
    ((bin / 10) << 4) | (bin % 10)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_zero_padded() {
        let ts = Timestamp::new(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(ts.to_string(), "2024-01-02T03:04:05");
    }

    #[test]
    fn rejects_impossible_dates() {
        assert!(Timestamp::new(2023, 2, 29, 0, 0, 0).is_err());
        assert!(Timestamp::new(2024, 2, 29, 0, 0, 0).is_ok());
        assert!(Timestamp::new(2024, 13, 1, 0, 0, 0).is_err());
        assert!(Timestamp::new(2024, 1, 1, 24, 0, 0).is_err());
    }

    #[test]
    fn naive_conversion_keeps_fields() {
        let ts = Timestamp::new(1999, 12, 31, 23, 59, 59).unwrap();
        let naive = ts.to_naive().unwrap();
        assert_eq!(Timestamp::from_naive(&naive), ts);
    }

    #[test]
    fn increment_wraps_each_field() {
        let ts = Timestamp::new(2024, 12, 31, 23, 59, 59).unwrap();
        assert_eq!(ts.increment(TimeField::Month).month, 1);
        assert_eq!(ts.increment(TimeField::Day).day, 1);
        assert_eq!(ts.increment(TimeField::Hour).hour, 0);
        assert_eq!(ts.increment(TimeField::Minute).minute, 0);
        assert_eq!(ts.increment(TimeField::Second).second, 0);
        assert_eq!(ts.increment(TimeField::Year).year, 2025);
    }

    #[test]
    fn increment_clamps_day_to_new_month() {
        let ts = Timestamp::new(2024, 1, 31, 0, 0, 0).unwrap();
        let feb = ts.increment(TimeField::Month);
        assert_eq!((feb.month, feb.day), (2, 29));
        assert!(feb.to_naive().is_some());
    }

    #[test]
    fn field_order_ends_at_seconds() {
        assert_eq!(TimeField::Year.next(), Some(TimeField::Month));
        assert_eq!(TimeField::Second.next(), None);
    }

    #[test]
    fn bcd_codec() {
        assert_eq!(bcd_to_bin(0x59), 59);
        assert_eq!(bin_to_bcd(59), 0x59);
        assert_eq!(bin_to_bcd(7), 0x07);
        assert_eq!(bcd_to_bin(bin_to_bcd(42)), 42);
    }
}
