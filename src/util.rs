// Forgiving parsers for the loosely typed cells of an uploaded CSV.
//
// Nothing in here fails loudly: a cell that cannot be read becomes `None`
// and the aggregations simply skip it.
use chrono::{NaiveDate, NaiveDateTime};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Parse a numeric cell, tolerating surrounding whitespace, thousands
/// separators and exponents. A comma that is not a thousands separator
/// (`1,5`) makes the cell unreadable rather than shifting the value.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if s
        .chars()
        .any(|c| c.is_ascii_alphabetic() && !matches!(c, 'e' | 'E'))
    {
        return None;
    }
    let value = strip_thousands(s)?.parse::<f64>().ok()?;
    value.is_finite().then_some(value)
}

/// Remove commas only when every one of them groups the integer part into
/// blocks of three digits.
fn strip_thousands(s: &str) -> Option<String> {
    if !s.contains(',') {
        return Some(s.to_string());
    }
    let end = s.find(['.', 'e', 'E']).unwrap_or(s.len());
    let (integer, rest) = s.split_at(end);
    if rest.contains(',') {
        return None;
    }
    let mut groups = integer.trim_start_matches(['+', '-']).split(',');
    let all_digits = |g: &str| g.bytes().all(|b| b.is_ascii_digit());
    let head = groups.next()?;
    let head_ok = (1..=3).contains(&head.len()) && all_digits(head);
    let tail_ok = groups.all(|g| g.len() == 3 && all_digits(g));
    (head_ok && tail_ok).then(|| s.replace(',', ""))
}

/// Parse a date cell. Year-month values (`2024-03`) land on the first day
/// of the month.
pub fn parse_date_safe(s: Option<&str>) -> Option<NaiveDate> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(ts.date());
        }
    }
    // `YYYY-MM`
    NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d").ok()
}

pub fn average(v: &[f64]) -> f64 {
    if v.is_empty() {
        return 0.0;
    }
    v.iter().sum::<f64>() / v.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_accept_separators_and_reject_text() {
        assert_eq!(parse_f64_safe(Some(" 1,250.5 ")), Some(1250.5));
        assert_eq!(parse_f64_safe(Some("-3")), Some(-3.0));
        assert_eq!(parse_f64_safe(Some("n/a")), None);
        assert_eq!(parse_f64_safe(Some("")), None);
        assert_eq!(parse_f64_safe(None), None);
    }

    #[test]
    fn commas_must_be_thousands_separators() {
        assert_eq!(parse_f64_safe(Some("1,000,000")), Some(1_000_000.0));
        assert_eq!(parse_f64_safe(Some("-12,345.75")), Some(-12345.75));
        assert_eq!(parse_f64_safe(Some("1,5")), None);
        assert_eq!(parse_f64_safe(Some("12,34,567")), None);
        assert_eq!(parse_f64_safe(Some("1.000,5")), None);
    }

    #[test]
    fn numbers_accept_exponents_but_not_words() {
        assert_eq!(parse_f64_safe(Some("1e3")), Some(1000.0));
        assert_eq!(parse_f64_safe(Some("2.5E-2")), Some(0.025));
        assert_eq!(parse_f64_safe(Some("e")), None);
        assert_eq!(parse_f64_safe(Some("inf")), None);
        assert_eq!(parse_f64_safe(Some("NaN")), None);
    }

    #[test]
    fn dates_accept_common_layouts() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 15);
        assert_eq!(parse_date_safe(Some("2024-03-15")), expected);
        assert_eq!(parse_date_safe(Some("2024/03/15")), expected);
        assert_eq!(parse_date_safe(Some("15.03.2024")), expected);
        assert_eq!(parse_date_safe(Some("2024-03-15T08:30:00")), expected);
        assert_eq!(
            parse_date_safe(Some("2024-03")),
            NaiveDate::from_ymd_opt(2024, 3, 1)
        );
    }

    #[test]
    fn unparsable_dates_become_none() {
        assert_eq!(parse_date_safe(Some("someday")), None);
        assert_eq!(parse_date_safe(Some("2024-13-01")), None);
        assert_eq!(parse_date_safe(Some("  ")), None);
    }

    #[test]
    fn average_of_empty_slice_is_zero() {
        assert_eq!(average(&[]), 0.0);
        assert_eq!(average(&[10.0, 10.0, 10.0, 100.0]), 32.5);
    }
}
