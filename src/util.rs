use crate::error::TimeParseError;
use crate::stats::{Average, Penalty, SolveRecord};

pub fn mean(data: &[f64]) -> Option<f64> {
    let sum = data.iter().sum::<f64>();
    let count = data.len();

    match count {
        positive if positive > 0 => Some(sum / count as f64),
        _ => None,
    }
}

/// `m:ss.cc` from one minute up, `s.cc` below. Centiseconds are truncated,
/// never rounded up into the next second.
pub fn format_time(ms: u64) -> String {
    let minutes = ms / 60_000;
    let seconds = (ms % 60_000) / 1000;
    let centis = (ms % 1000) / 10;

    if minutes > 0 {
        format!("{minutes}:{seconds:02}.{centis:02}")
    } else {
        format!("{seconds}.{centis:02}")
    }
}

pub fn format_average(average: &Average) -> String {
    match average {
        Average::Time(ms) => format_time(ms.round() as u64),
        Average::Dnf => "DNF".to_string(),
    }
}

/// A solve as shown in the history list: `DNF`, or the counted time with a
/// trailing `+` for a +2.
pub fn format_solve(record: &SolveRecord) -> String {
    match (record.penalty, record.effective_ms()) {
        (Penalty::PlusTwo, Some(ms)) => format!("{}+", format_time(ms)),
        (_, Some(ms)) => format_time(ms),
        (_, None) => "DNF".to_string(),
    }
}

/// Longest time a solve may be entered with.
pub const MAX_TIME_MS: u64 = 24 * 60 * 60 * 1000;

/// Parse a typed time: `9.43`, `65.4` or `1:05.43`.
pub fn parse_time_input(input: &str) -> Result<u64, TimeParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(TimeParseError::Empty);
    }

    let not_numeric = || TimeParseError::NotNumeric(trimmed.to_string());

    let (minutes, seconds) = match trimmed.split_once(':') {
        Some((minutes, seconds)) => {
            let minutes: u64 = minutes.parse().map_err(|_| not_numeric())?;
            let seconds: f64 = seconds.parse().map_err(|_| not_numeric())?;
            if !(0.0..60.0).contains(&seconds) {
                return Err(not_numeric());
            }
            (minutes, seconds)
        }
        None => (0, trimmed.parse::<f64>().map_err(|_| not_numeric())?),
    };

    if !seconds.is_finite() {
        return Err(not_numeric());
    }

    let total_ms = ((minutes as f64 * 60.0 + seconds) * 1000.0).round();
    if total_ms < 1.0 {
        return Err(TimeParseError::NonPositive);
    }
    if total_ms >= MAX_TIME_MS as f64 {
        return Err(TimeParseError::TooLong);
    }

    Ok(total_ms as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[10., 20., 30., 15., 22.]), Some(19.4));
        assert_eq!(mean(&[15., 7., 55., 12., 4.]), Some(18.6));
    }

    #[test]
    fn test_mean_empty_slice() {
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(65432), "1:05.43");
        assert_eq!(format_time(9430), "9.43");
        assert_eq!(format_time(0), "0.00");
        assert_eq!(format_time(59_999), "59.99");
        assert_eq!(format_time(60_000), "1:00.00");
        assert_eq!(format_time(754_321), "12:34.32");
    }

    #[test]
    fn test_format_average() {
        assert_eq!(format_average(&Average::Time(9429.6)), "9.43");
        assert_eq!(format_average(&Average::Dnf), "DNF");
    }

    #[test]
    fn test_format_solve() {
        let mut record = SolveRecord::new(1, 9430);
        assert_eq!(format_solve(&record), "9.43");
        record.penalty = Penalty::PlusTwo;
        assert_eq!(format_solve(&record), "11.43+");
        record.penalty = Penalty::Dnf;
        assert_eq!(format_solve(&record), "DNF");
    }

    #[test]
    fn test_parse_time_input() {
        assert_eq!(parse_time_input("9.43"), Ok(9430));
        assert_eq!(parse_time_input(" 12 "), Ok(12000));
        assert_eq!(parse_time_input("1:05.43"), Ok(65430));
        assert_eq!(parse_time_input("0.001"), Ok(1));
    }

    #[test]
    fn test_parse_time_input_rejects() {
        assert_matches!(parse_time_input(""), Err(TimeParseError::Empty));
        assert_matches!(parse_time_input("   "), Err(TimeParseError::Empty));
        assert_matches!(parse_time_input("abc"), Err(TimeParseError::NotNumeric(_)));
        assert_matches!(parse_time_input("1:75"), Err(TimeParseError::NotNumeric(_)));
        assert_matches!(parse_time_input("NaN"), Err(TimeParseError::NotNumeric(_)));
        assert_matches!(parse_time_input("inf"), Err(TimeParseError::NotNumeric(_)));
        assert_matches!(parse_time_input("0"), Err(TimeParseError::NonPositive));
        assert_matches!(parse_time_input("-3.2"), Err(TimeParseError::NonPositive));
        assert_matches!(parse_time_input("0:00.0001"), Err(TimeParseError::NonPositive));
    }

    #[test]
    fn test_parse_time_input_upper_bound() {
        assert_eq!(parse_time_input("1439:59.99"), Ok(MAX_TIME_MS - 10));
        assert_matches!(parse_time_input("1440:00"), Err(TimeParseError::TooLong));
        assert_matches!(parse_time_input("86400"), Err(TimeParseError::TooLong));
        assert_matches!(
            parse_time_input("99999999999999999999999"),
            Err(TimeParseError::TooLong)
        );
        assert_matches!(
            parse_time_input("99999999999999999999999:00"),
            Err(TimeParseError::NotNumeric(_))
        );
    }
}
