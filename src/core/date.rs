use chrono::NaiveDate;
use std::fmt;
use thiserror::Error;

/// Three-letter month abbreviations, in calendar order.
const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// The string encodings dates arrive in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFormat {
    /// `MMDDYYYY`, as typed for the settlement date. Leading zeros may be
    /// dropped: seven digits read as `MDDYYYY`, six as `MDYYYY`.
    Compact,
    /// `M/D/YYYY`, as found in the Treasury price file.
    SlashDelimited,
    /// `D-Mon-YYYY`, as found in the liability file.
    DashAbbrevMonth,
}

impl fmt::Display for DateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateFormat::Compact => write!(f, "MMDDYYYY"),
            DateFormat::SlashDelimited => write!(f, "M/D/YYYY"),
            DateFormat::DashAbbrevMonth => write!(f, "D-Mon-YYYY"),
        }
    }
}

/// Errors raised while parsing input fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("'{input}' is not a {format} date")]
    Malformed { input: String, format: DateFormat },
    #[error("unknown month abbreviation '{0}'")]
    UnknownMonth(String),
    #[error("{year:04}-{month:02}-{day:02} is not a calendar date")]
    InvalidCalendarDate { year: i32, month: u32, day: u32 },
    #[error("unknown instrument type '{0}'")]
    UnknownInstrumentType(String),
    #[error("{field} value '{input}' is not a number")]
    InvalidNumber { field: &'static str, input: String },
}

/// Parse a date string in the given format.
///
/// # Examples
///
/// ```
/// use dedicated_portfolio::core::date::{parse_date, DateFormat};
/// use chrono::NaiveDate;
///
/// let settlement = parse_date("01152024", DateFormat::Compact).unwrap();
/// assert_eq!(settlement, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
///
/// let due = parse_date("1-Aug-2025", DateFormat::DashAbbrevMonth).unwrap();
/// assert_eq!(due, NaiveDate::from_ymd_opt(2025, 8, 1).unwrap());
/// ```
pub fn parse_date(raw: &str, format: DateFormat) -> Result<NaiveDate, ParseError> {
    let raw = raw.trim();
    let malformed = || ParseError::Malformed {
        input: raw.to_string(),
        format,
    };

    let (year, month, day) = match format {
        DateFormat::Compact => {
            if !raw.bytes().all(|b| b.is_ascii_digit()) {
                return Err(malformed());
            }
            let (month_len, day_len) = match raw.len() {
                8 => (2, 2),
                7 => (1, 2),
                6 => (1, 1),
                _ => return Err(malformed()),
            };
            let (month, rest) = raw.split_at(month_len);
            let (day, year) = rest.split_at(day_len);
            (
                parse_field(year, malformed)?,
                parse_field(month, malformed)?,
                parse_field(day, malformed)?,
            )
        }
        DateFormat::SlashDelimited => {
            let parts: Vec<&str> = raw.split('/').collect();
            if parts.len() != 3 {
                return Err(malformed());
            }
            (
                parse_field(parts[2], malformed)?,
                parse_field(parts[0], malformed)?,
                parse_field(parts[1], malformed)?,
            )
        }
        DateFormat::DashAbbrevMonth => {
            let parts: Vec<&str> = raw.split('-').collect();
            if parts.len() != 3 {
                return Err(malformed());
            }
            let month = month_from_abbreviation(parts[1])?;
            let year_field = parts[2].trim();
            let mut year: i32 = parse_field(year_field, malformed)?;
            if year_field.len() == 2 {
                year += 2000;
            }
            (year, month, parse_field(parts[0], malformed)?)
        }
    };

    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or(ParseError::InvalidCalendarDate { year, month, day })
}

/// Look up a month number (1-12) by its three-letter abbreviation.
pub fn month_from_abbreviation(abbreviation: &str) -> Result<u32, ParseError> {
    let abbreviation = abbreviation.trim();
    MONTH_ABBREVIATIONS
        .iter()
        .position(|m| m.eq_ignore_ascii_case(abbreviation))
        .map(|i| i as u32 + 1)
        .ok_or_else(|| ParseError::UnknownMonth(abbreviation.to_string()))
}

/// Render a date in `D-Mon-YYYY` form.
pub fn format_dash_abbrev(date: NaiveDate) -> String {
    use chrono::Datelike;
    format!(
        "{}-{}-{}",
        date.day(),
        MONTH_ABBREVIATIONS[date.month0() as usize],
        date.year()
    )
}

fn parse_field<T: std::str::FromStr>(
    field: &str,
    malformed: impl Fn() -> ParseError,
) -> Result<T, ParseError> {
    let field = field.trim();
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }
    field.parse().map_err(|_| malformed())
}
