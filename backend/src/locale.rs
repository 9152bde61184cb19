//! Long-form date formatting for letter bodies.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Indonesian,
    English,
}

const HARI: [&str; 7] = [
    "Senin", "Selasa", "Rabu", "Kamis", "Jumat", "Sabtu", "Minggu",
];
const BULAN: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

const DAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
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

/// Parses the `YYYY-MM-DD` value produced by a date input.
pub fn parse_date_value(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// `"Rabu, 20 Maret 2024"` for `Locale::Indonesian`.
pub fn format_long_date(date: NaiveDate, locale: Locale) -> String {
    let (days, months) = match locale {
        Locale::Indonesian => (&HARI, &BULAN),
        Locale::English => (&DAYS, &MONTHS),
    };
    format!(
        "{}, {} {} {}",
        days[weekday_index(date.weekday())],
        date.day(),
        months[date.month0() as usize],
        date.year()
    )
}

fn weekday_index(day: Weekday) -> usize {
    day.num_days_from_monday() as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_indonesian_long_date() {
        let date = parse_date_value("2024-03-20").unwrap();
        assert_eq!(format_long_date(date, Locale::Indonesian), "Rabu, 20 Maret 2024");
    }

    #[test]
    fn formats_english_long_date() {
        let date = parse_date_value("2024-03-20").unwrap();
        assert_eq!(
            format_long_date(date, Locale::English),
            "Wednesday, 20 March 2024"
        );
    }

    #[test]
    fn single_digit_days_are_not_padded() {
        let date = parse_date_value("2025-01-05").unwrap();
        assert_eq!(format_long_date(date, Locale::Indonesian), "Minggu, 5 Januari 2025");
    }

    #[test]
    fn rejects_non_iso_values() {
        assert!(parse_date_value("20/03/2024").is_none());
        assert!(parse_date_value("").is_none());
        assert!(parse_date_value("2024-02-30").is_none());
    }
}
