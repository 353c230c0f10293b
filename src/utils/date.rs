//! UTC datetime utilities without timezone dependencies.
//!
//! Post dates only need three things: parsing the front-matter value,
//! ordering posts chronologically, and formatting for templates and feeds.
//!
//! ```ignore
//! let dt = DateTimeUtc::parse("2020-12-07").unwrap();
//! assert_eq!(dt.format("%B %e, %Y"), "December  7, 2020");
//! assert_eq!(dt.to_rfc2822(), "Mon, 07 Dec 2020 00:00:00 GMT");
//! ```

use anyhow::{Result, bail};

const WEEKDAYS: [&str; 7] = [
    "Saturday",
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
];

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// UTC datetime without timezone complexity.
///
/// Field order makes the derived `Ord` chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateTimeUtc {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl DateTimeUtc {
    pub const fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }

    #[cfg(test)]
    pub const fn from_ymd(year: u16, month: u8, day: u8) -> Self {
        Self::new(year, month, day, 0, 0, 0)
    }

    /// Parse from "YYYY-MM-DD", "YYYY-MM-DD HH:MM:SS" or "YYYY-MM-DDTHH:MM:SSZ".
    pub fn parse(s: &str) -> Option<Self> {
        let bytes = s.trim().as_bytes();

        if bytes.len() < 10 {
            return None;
        }

        let year = parse_u16(&bytes[0..4])?;
        if bytes[4] != b'-' {
            return None;
        }
        let month = parse_u8(&bytes[5..7])?;
        if bytes[7] != b'-' {
            return None;
        }
        let day = parse_u8(&bytes[8..10])?;

        let (hour, minute, second) = match bytes.len() {
            10 => (0, 0, 0),
            19 | 20 if matches!(bytes[10], b'T' | b' ') => {
                if bytes[13] != b':' || bytes[16] != b':' {
                    return None;
                }
                if bytes.len() == 20 && bytes[19] != b'Z' {
                    return None;
                }
                (
                    parse_u8(&bytes[11..13])?,
                    parse_u8(&bytes[14..16])?,
                    parse_u8(&bytes[17..19])?,
                )
            }
            _ => return None,
        };

        let dt = Self::new(year, month, day, hour, minute, second);
        dt.validate().ok()?;
        Some(dt)
    }

    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub fn validate(&self) -> Result<()> {
        let Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        } = *self;

        if !(1..=12).contains(&month) {
            bail!("month is invalid: {month}");
        }

        let max_days = Self::days_in_month(year, month);
        if day == 0 || day > max_days {
            bail!("day is invalid: {day}");
        }
        if hour > 23 {
            bail!("hour is invalid: {hour}");
        }
        if minute > 59 {
            bail!("minute is invalid: {minute}");
        }
        if second > 59 {
            bail!("second is invalid: {second}");
        }

        Ok(())
    }

    #[inline]
    #[allow(clippy::manual_is_multiple_of)] // Manual impl for const fn
    const fn is_leap_year(year: u16) -> bool {
        year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
    }

    #[inline]
    const fn days_in_month(year: u16, month: u8) -> u8 {
        match month {
            1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
            4 | 6 | 9 | 11 => 30,
            2 if Self::is_leap_year(year) => 29,
            2 => 28,
            _ => 0,
        }
    }

    /// Format as `YYYY-MM-DD`.
    pub fn to_iso_date(self) -> String {
        format!("{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }

    /// Format as RFC 2822 for RSS feeds.
    pub fn to_rfc2822(self) -> String {
        format!(
            "{}, {:02} {} {:04} {:02}:{:02}:{:02} GMT",
            &self.weekday_name()[..3],
            self.day,
            &self.month_name()[..3],
            self.year,
            self.hour,
            self.minute,
            self.second
        )
    }

    /// Format with a strftime-like pattern.
    ///
    /// Supported: `%Y %m %d %e %B %b %A %a %H %M %S %%`. Unknown
    /// specifiers are emitted verbatim.
    pub fn format(self, pattern: &str) -> String {
        let mut out = String::with_capacity(pattern.len() + 8);
        let mut chars = pattern.chars();

        while let Some(c) = chars.next() {
            if c != '%' {
                out.push(c);
                continue;
            }
            match chars.next() {
                Some('Y') => out.push_str(&format!("{:04}", self.year)),
                Some('m') => out.push_str(&format!("{:02}", self.month)),
                Some('d') => out.push_str(&format!("{:02}", self.day)),
                Some('e') => out.push_str(&format!("{:>2}", self.day)),
                Some('B') => out.push_str(self.month_name()),
                Some('b') => out.push_str(&self.month_name()[..3]),
                Some('A') => out.push_str(self.weekday_name()),
                Some('a') => out.push_str(&self.weekday_name()[..3]),
                Some('H') => out.push_str(&format!("{:02}", self.hour)),
                Some('M') => out.push_str(&format!("{:02}", self.minute)),
                Some('S') => out.push_str(&format!("{:02}", self.second)),
                Some('%') => out.push('%'),
                Some(other) => {
                    out.push('%');
                    out.push(other);
                }
                None => out.push('%'),
            }
        }

        out
    }

    #[inline]
    fn month_name(self) -> &'static str {
        MONTHS[usize::from(self.month - 1)]
    }

    #[inline]
    fn weekday_name(self) -> &'static str {
        WEEKDAYS[self.weekday_index()]
    }

    /// Zeller's congruence, 0 = Saturday.
    #[inline]
    #[allow(clippy::cast_sign_loss)] // Result of % 7 is always 0-6
    fn weekday_index(self) -> usize {
        let (y, m) = if self.month < 3 {
            (i32::from(self.year) - 1, i32::from(self.month) + 12)
        } else {
            (i32::from(self.year), i32::from(self.month))
        };
        let d = i32::from(self.day);
        ((d + (13 * (m + 1)) / 5 + y + y / 4 - y / 100 + y / 400) % 7) as usize
    }
}

/// Parse 2-digit ASCII number
#[inline]
fn parse_u8(bytes: &[u8]) -> Option<u8> {
    if bytes.len() != 2 {
        return None;
    }
    let d1 = bytes[0].wrapping_sub(b'0');
    let d2 = bytes[1].wrapping_sub(b'0');
    if d1 > 9 || d2 > 9 {
        return None;
    }
    Some(d1 * 10 + d2)
}

/// Parse 4-digit ASCII number
#[inline]
fn parse_u16(bytes: &[u8]) -> Option<u16> {
    if bytes.len() != 4 {
        return None;
    }
    let mut result = 0u16;
    for &b in bytes {
        let d = b.wrapping_sub(b'0');
        if d > 9 {
            return None;
        }
        result = result * 10 + u16::from(d);
    }
    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_only() {
        let dt = DateTimeUtc::parse("2020-12-07").unwrap();
        assert_eq!(dt, DateTimeUtc::from_ymd(2020, 12, 7));
    }

    #[test]
    fn test_parse_with_time() {
        let dt = DateTimeUtc::parse("2021-01-05T09:15:00Z").unwrap();
        assert_eq!(dt, DateTimeUtc::new(2021, 1, 5, 9, 15, 0));

        let dt = DateTimeUtc::parse("2021-01-05 09:15:00").unwrap();
        assert_eq!(dt.hour, 9);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(DateTimeUtc::parse("").is_none());
        assert!(DateTimeUtc::parse("yesterday").is_none());
        assert!(DateTimeUtc::parse("2020/12/07").is_none());
        assert!(DateTimeUtc::parse("2020-13-07").is_none());
        assert!(DateTimeUtc::parse("2023-02-29").is_none());
        assert!(DateTimeUtc::parse("2020-12-07T10:00").is_none());
    }

    #[test]
    fn test_ordering_is_chronological() {
        let a = DateTimeUtc::parse("2020-12-07").unwrap();
        let b = DateTimeUtc::parse("2021-01-05").unwrap();
        let c = DateTimeUtc::parse("2021-01-05T00:00:01Z").unwrap();
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn test_validate_leap_year() {
        assert!(DateTimeUtc::new(2024, 2, 29, 12, 0, 0).validate().is_ok());
        assert!(DateTimeUtc::new(2000, 2, 29, 12, 0, 0).validate().is_ok());
        assert!(DateTimeUtc::new(1900, 2, 29, 12, 0, 0).validate().is_err());
    }

    #[test]
    fn test_validate_invalid_fields() {
        assert!(DateTimeUtc::new(2024, 0, 15, 12, 0, 0).validate().is_err());
        assert!(DateTimeUtc::new(2024, 4, 31, 12, 0, 0).validate().is_err());
        assert!(DateTimeUtc::new(2024, 6, 15, 24, 0, 0).validate().is_err());
        assert!(DateTimeUtc::new(2024, 6, 15, 12, 60, 0).validate().is_err());
    }

    #[test]
    fn test_to_rfc2822() {
        // 2020-12-07 was a Monday
        let dt = DateTimeUtc::from_ymd(2020, 12, 7);
        assert_eq!(dt.to_rfc2822(), "Mon, 07 Dec 2020 00:00:00 GMT");
    }

    #[test]
    fn test_format_pattern() {
        let dt = DateTimeUtc::new(2021, 1, 5, 9, 3, 7);
        assert_eq!(dt.format("%Y-%m-%d"), "2021-01-05");
        assert_eq!(dt.format("%B %e, %Y"), "January  5, 2021");
        assert_eq!(dt.format("%a %d %b"), "Tue 05 Jan");
        assert_eq!(dt.format("%A"), "Tuesday");
        assert_eq!(dt.format("%H:%M:%S"), "09:03:07");
        assert_eq!(dt.format("100%% at %q"), "100% at %q");
        assert_eq!(dt.format("trailing %"), "trailing %");
    }

    #[test]
    fn test_to_iso_date() {
        let dt = DateTimeUtc::new(2021, 1, 5, 9, 3, 7);
        assert_eq!(dt.to_iso_date(), "2021-01-05");
    }
}
