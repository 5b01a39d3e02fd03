use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;

/// Tried in order, the first successful parse wins. Day-first comes before
/// month-first, so `03/04/2023` is the 3rd of April.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%B %d, %Y", "%d %B %Y"];

lazy_static! {
    static ref YEAR_PATTERN: Regex = Regex::new(r"20\d{2}").expect("Invalid year regex");
}

/// Normalizes a publish date to `YYYY-MM-DD`.
///
/// ISO timestamps (`2023-01-15T10:30:00Z`, with or without offset) keep only
/// their date part. When no format matches, a bare `20xx` year found anywhere
/// in the text becomes `20xx-01-01`.
pub fn parse_date(text: &str) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let date_part = date_portion(text);
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(date_part, format).ok())
        .map(|date| date.format("%Y-%m-%d").to_string())
        .or_else(|| {
            YEAR_PATTERN
                .find(text)
                .map(|year| format!("{}-01-01", year.as_str()))
        })
}

/// Cuts the time part off an ISO timestamp, leaves anything else untouched.
fn date_portion(text: &str) -> &str {
    match text.split_once('T') {
        Some((date, _)) if !date.is_empty() && date.chars().all(|c| c.is_ascii_digit() || c == '-') => {
            date
        }
        _ => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_date() {
        assert_eq!(parse_date("2023-01-15"), Some("2023-01-15".to_string()));
    }

    #[test]
    fn parses_iso_timestamp() {
        assert_eq!(parse_date("2023-01-15T10:30:00Z"), Some("2023-01-15".to_string()));
        assert_eq!(
            parse_date("2022-11-03T23:59:59+02:00"),
            Some("2022-11-03".to_string())
        );
        assert_eq!(parse_date("2021-06-30T08:00:00"), Some("2021-06-30".to_string()));
    }

    #[test]
    fn parses_long_month_formats() {
        assert_eq!(parse_date("January 15, 2023"), Some("2023-01-15".to_string()));
        assert_eq!(parse_date("15 October 2021"), Some("2021-10-15".to_string()));
    }

    #[test]
    fn ambiguous_slash_dates_are_day_first() {
        assert_eq!(parse_date("03/04/2023"), Some("2023-04-03".to_string()));
    }

    #[test]
    fn falls_through_to_month_first() {
        assert_eq!(parse_date("12/31/2023"), Some("2023-12-31".to_string()));
    }

    #[test]
    fn bare_year_becomes_first_of_january() {
        assert_eq!(parse_date("2023"), Some("2023-01-01".to_string()));
        assert_eq!(
            parse_date("Released sometime in 2019, probably"),
            Some("2019-01-01".to_string())
        );
    }

    #[test]
    fn unparseable_without_year_is_none() {
        assert_eq!(parse_date("yesterday"), None);
        assert_eq!(parse_date("sometime in 1999"), None);
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("   "), None);
    }

    #[test]
    fn invalid_calendar_date_falls_back_to_year() {
        assert_eq!(parse_date("2023-02-30"), Some("2023-01-01".to_string()));
    }
}
