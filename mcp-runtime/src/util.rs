use chrono::{NaiveDate, TimeDelta};

use crate::error::Error;

pub const API_KEY_ENV: &str = "ATTENTION_API_KEY";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Resolve the API key (priority order):
/// 1. explicit value (`--api-key`)
/// 2. ATTENTION_API_KEY env var, looked up by the caller
/// 3. Error
pub(crate) fn pick_api_key(explicit: Option<&str>, from_env: Option<&str>) -> Result<String, Error> {
    explicit
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .or_else(|| from_env.map(str::trim).filter(|key| !key.is_empty()))
        .map(ToString::to_string)
        .ok_or_else(|| Error::Config(format!("{API_KEY_ENV} must be set")))
}

/// `(from, to)` calendar dates covering the last `days_back` days up to
/// `today`. Negative values are passed through and yield `from > to`.
pub fn recent_window(today: NaiveDate, days_back: i64) -> Result<(String, String), Error> {
    let from = TimeDelta::try_days(days_back)
        .and_then(|delta| today.checked_sub_signed(delta))
        .ok_or(Error::DaysBackOutOfRange(days_back))?;
    Ok((
        from.format(DATE_FORMAT).to_string(),
        today.format(DATE_FORMAT).to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_key_wins_over_environment() {
        assert_eq!(pick_api_key(Some("explicit"), Some("env")).unwrap(), "explicit");
        assert_eq!(pick_api_key(Some("  "), Some("env")).unwrap(), "env");
        assert_eq!(pick_api_key(None, Some(" env ")).unwrap(), "env");
    }

    #[test]
    fn missing_key_is_a_config_error() {
        let err = pick_api_key(None, None).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert_eq!(err.to_string(), "ATTENTION_API_KEY must be set");
        assert!(matches!(pick_api_key(Some(""), Some("")), Err(Error::Config(_))));
    }

    #[test]
    fn recent_window_spans_days_back() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 3).unwrap();
        assert_eq!(
            recent_window(today, 7).unwrap(),
            ("2024-02-25".to_string(), "2024-03-03".to_string())
        );
        assert_eq!(
            recent_window(today, 0).unwrap(),
            ("2024-03-03".to_string(), "2024-03-03".to_string())
        );
    }

    #[test]
    fn negative_days_back_moves_start_after_end() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 3).unwrap();
        assert_eq!(
            recent_window(today, -2).unwrap(),
            ("2024-03-05".to_string(), "2024-03-03".to_string())
        );
    }

    #[test]
    fn absurd_days_back_is_rejected() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 3).unwrap();
        assert!(matches!(
            recent_window(today, i64::MAX),
            Err(Error::DaysBackOutOfRange(_))
        ));
    }
}
