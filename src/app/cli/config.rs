//! TOML configuration file loading
//!
//! Settings come from built-in defaults, then the configuration file, then
//! command line flags, each layer overriding the previous one.

use std::path::{Path, PathBuf};

use chrono::{FixedOffset, NaiveDate, NaiveTime};

use super::args::Args;
use crate::feed::{
    EmptyTextPolicy, FeedError, FeedResult, Millis, Normalizer, TradingHoursCalendar,
    MILLIS_PER_MINUTE,
};

/// Effective settings for one run
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub bucket_minutes: i64,
    pub tolerance_minutes: i64,
    pub days_to_sync: u32,
    pub market_hours_only: bool,
    pub empty_text: EmptyTextPolicy,
    pub decode_entities: bool,
    pub market_open: NaiveTime,
    pub market_close: NaiveTime,
    pub utc_offset: FixedOffset,
    pub holidays: Vec<NaiveDate>,
    pub log_level: Option<String>,
    pub log_format: Option<String>,
    pub log_file: Option<PathBuf>,
    pub color: Option<bool>,
}

impl Default for Settings {
    fn default() -> Self {
        let calendar = TradingHoursCalendar::us_equities();
        Self {
            bucket_minutes: 5,
            tolerance_minutes: 5,
            days_to_sync: 7,
            market_hours_only: false,
            empty_text: EmptyTextPolicy::default(),
            decode_entities: false,
            market_open: NaiveTime::from_hms_opt(9, 30, 0).unwrap_or(NaiveTime::MIN),
            market_close: NaiveTime::from_hms_opt(16, 0, 0).unwrap_or(NaiveTime::MIN),
            utc_offset: calendar.offset(),
            holidays: Vec::new(),
            log_level: None,
            log_format: None,
            log_file: None,
            color: None,
        }
    }
}

/// Default configuration file location, `<config_dir>/Tweetbucket/tweetbucket.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("Tweetbucket").join("tweetbucket.toml"))
}

/// Read and parse a configuration file.
///
/// An explicitly requested file must exist. Without one, the default location
/// is used if present; otherwise `Ok(None)`.
pub fn load_config_file(config_file: Option<&Path>) -> FeedResult<Option<toml::Table>> {
    let path = match config_file {
        Some(path) if !path.exists() => {
            return Err(FeedError::configuration(format!(
                "The specified configuration file does not exist: {}",
                path.display()
            )));
        }
        Some(path) => path.to_path_buf(),
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(None),
        },
    };

    let contents = std::fs::read_to_string(&path).map_err(|source| FeedError::Io {
        path: path.clone(),
        source,
    })?;
    let table = toml::from_str::<toml::Table>(&contents).map_err(|e| {
        FeedError::configuration(format!(
            "Error parsing configuration file {}: {}",
            path.display(),
            e
        ))
    })?;
    log::debug!("Loaded configuration from {}", path.display());
    Ok(Some(table))
}

impl Settings {
    /// Defaults, overridden by the config file (if any), overridden by `args`
    pub fn resolve(args: &Args) -> FeedResult<Self> {
        let mut settings = Settings::default();
        if let Some(config) = load_config_file(args.config_file.as_deref())? {
            settings.apply_toml_values(&config)?;
        }
        settings.apply_args(args)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Apply TOML configuration values
    pub fn apply_toml_values(&mut self, config: &toml::Table) -> FeedResult<()> {
        if let Some(value) = config.get("bucket-minutes") {
            self.bucket_minutes = expect_integer(value, "bucket-minutes")?;
        }
        if let Some(value) = config.get("tolerance-minutes") {
            self.tolerance_minutes = expect_integer(value, "tolerance-minutes")?;
        }
        if let Some(value) = config.get("days-to-sync") {
            let days = expect_integer(value, "days-to-sync")?;
            self.days_to_sync = u32::try_from(days).map_err(|_| {
                FeedError::configuration(format!("days-to-sync out of range: {}", days))
            })?;
        }
        if let Some(value) = config.get("market-hours-only") {
            self.market_hours_only = expect_bool(value, "market-hours-only")?;
        }
        if let Some(value) = config.get("decode-entities") {
            self.decode_entities = expect_bool(value, "decode-entities")?;
        }
        if let Some(value) = config.get("empty-text") {
            self.empty_text = parse_empty_text(expect_str(value, "empty-text")?)?;
        }
        if let Some(value) = config.get("market-open") {
            self.market_open = parse_time(expect_str(value, "market-open")?, "market-open")?;
        }
        if let Some(value) = config.get("market-close") {
            self.market_close = parse_time(expect_str(value, "market-close")?, "market-close")?;
        }
        if let Some(value) = config.get("utc-offset") {
            self.utc_offset = parse_offset(expect_str(value, "utc-offset")?)?;
        }

        // Holidays accept a single date or an array of dates
        if let Some(value) = config.get("holidays") {
            let mut dates = Vec::new();
            if let Some(date_str) = value.as_str() {
                dates.push(parse_holiday(date_str)?);
            } else if let Some(array) = value.as_array() {
                for item in array {
                    dates.push(parse_holiday(expect_str(item, "holidays")?)?);
                }
            } else {
                return Err(FeedError::configuration(
                    "holidays must be a date string or an array of date strings",
                ));
            }
            self.holidays.extend(dates);
            self.holidays.sort();
            self.holidays.dedup();
        }

        if let Some(log_level) = config.get("log-level").and_then(|v| v.as_str()) {
            self.log_level = Some(log_level.to_string());
        }
        if let Some(log_format) = config.get("log-format").and_then(|v| v.as_str()) {
            self.log_format = Some(log_format.to_string());
        }
        if let Some(log_file) = config.get("log-file").and_then(|v| v.as_str()) {
            // "none" and "-" disable file logging
            if log_file.eq_ignore_ascii_case("none") || log_file == "-" {
                self.log_file = None;
            } else {
                self.log_file = Some(PathBuf::from(log_file));
            }
        }
        if let Some(color) = config.get("color").and_then(|v| v.as_bool()) {
            self.color = Some(color);
        }
        Ok(())
    }

    /// Apply command line overrides
    pub fn apply_args(&mut self, args: &Args) -> FeedResult<()> {
        if let Some(minutes) = args.bucket_minutes {
            self.bucket_minutes = minutes;
        }
        if let Some(policy) = args.empty_text.as_deref() {
            self.empty_text = parse_empty_text(policy)?;
        }
        if args.decode_entities {
            self.decode_entities = true;
        }
        if args.log_level.is_some() {
            self.log_level = args.log_level.clone();
        }
        if args.log_format.is_some() {
            self.log_format = args.log_format.clone();
        }
        if let Some(log_file) = &args.log_file {
            if log_file.as_os_str().eq_ignore_ascii_case("none") || log_file.as_os_str() == "-" {
                self.log_file = None;
            } else {
                self.log_file = Some(log_file.clone());
            }
        }
        if let Some(color) = args.color_override() {
            self.color = Some(color);
        }
        Ok(())
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> FeedResult<()> {
        if self.bucket_minutes <= 0 {
            return Err(FeedError::configuration(format!(
                "bucket-minutes must be greater than 0, got {}",
                self.bucket_minutes
            )));
        }
        minutes_to_millis(self.bucket_minutes, "bucket-minutes")?;
        minutes_to_millis(self.tolerance_minutes, "tolerance-minutes")?;
        if self.market_open >= self.market_close {
            return Err(FeedError::configuration(format!(
                "market-open ({}) must be earlier than market-close ({})",
                self.market_open, self.market_close
            )));
        }
        Ok(())
    }

    /// Bucket width in milliseconds; saturates for settings that skipped `validate`
    pub fn bucket_width(&self) -> Millis {
        self.bucket_minutes.saturating_mul(MILLIS_PER_MINUTE)
    }

    pub fn tolerance(&self) -> Millis {
        self.tolerance_minutes.saturating_mul(MILLIS_PER_MINUTE)
    }

    pub fn normalizer(&self) -> Normalizer {
        Normalizer::new(self.empty_text, self.decode_entities)
    }

    pub fn calendar(&self) -> TradingHoursCalendar {
        TradingHoursCalendar::new(
            self.utc_offset,
            self.market_open,
            self.market_close,
            self.holidays.iter().copied(),
        )
    }
}

/// Convert a non-negative minute count to milliseconds, rejecting values
/// that do not fit
pub fn minutes_to_millis(minutes: i64, key: &str) -> FeedResult<Millis> {
    if minutes < 0 {
        return Err(FeedError::configuration(format!(
            "{} cannot be negative, got {}",
            key, minutes
        )));
    }
    minutes.checked_mul(MILLIS_PER_MINUTE).ok_or_else(|| {
        FeedError::configuration(format!("{} is too large, got {}", key, minutes))
    })
}

fn expect_integer(value: &toml::Value, key: &str) -> FeedResult<i64> {
    value
        .as_integer()
        .ok_or_else(|| FeedError::configuration(format!("{} must be an integer", key)))
}

fn expect_bool(value: &toml::Value, key: &str) -> FeedResult<bool> {
    value
        .as_bool()
        .ok_or_else(|| FeedError::configuration(format!("{} must be true or false", key)))
}

fn expect_str<'a>(value: &'a toml::Value, key: &str) -> FeedResult<&'a str> {
    value
        .as_str()
        .ok_or_else(|| FeedError::configuration(format!("{} must be a string", key)))
}

fn parse_empty_text(policy: &str) -> FeedResult<EmptyTextPolicy> {
    policy.parse::<EmptyTextPolicy>().map_err(|_| {
        FeedError::configuration(format!(
            "empty-text must be 'original' or 'empty', got '{}'",
            policy
        ))
    })
}

fn parse_time(time_str: &str, key: &str) -> FeedResult<NaiveTime> {
    NaiveTime::parse_from_str(time_str, "%H:%M").map_err(|_| {
        FeedError::configuration(format!("{} must be HH:MM, got '{}'", key, time_str))
    })
}

fn parse_holiday(date_str: &str) -> FeedResult<NaiveDate> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|_| {
        FeedError::configuration(format!("holidays must be YYYY-MM-DD, got '{}'", date_str))
    })
}

/// Parse `+HH:MM` / `-HH:MM` (or `Z`) into a fixed offset
fn parse_offset(offset_str: &str) -> FeedResult<FixedOffset> {
    let invalid = || {
        FeedError::configuration(format!(
            "utc-offset must look like +HH:MM or -HH:MM, got '{}'",
            offset_str
        ))
    };
    if offset_str.eq_ignore_ascii_case("z") || offset_str.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0).ok_or_else(invalid);
    }

    let (sign, rest) = if let Some(rest) = offset_str.strip_prefix('+') {
        (1, rest)
    } else if let Some(rest) = offset_str.strip_prefix('-') {
        (-1, rest)
    } else {
        return Err(invalid());
    };
    let (hours, minutes) = rest.split_once(':').ok_or_else(invalid)?;
    let hours: i32 = hours.parse().map_err(|_| invalid())?;
    let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
    if !(0..60).contains(&minutes) {
        return Err(invalid());
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use toml::Table;

    fn table(source: &str) -> Table {
        toml::from_str(source).unwrap()
    }

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        settings.validate().unwrap();
        assert_eq!(settings.bucket_width(), 300_000);
        assert_eq!(settings.utc_offset, FixedOffset::west_opt(5 * 3600).unwrap());
        assert_eq!(settings.normalizer(), Normalizer::default());
    }

    #[test]
    fn test_apply_toml_values() {
        let mut settings = Settings::default();
        settings
            .apply_toml_values(&table(
                r#"
bucket-minutes = 15
tolerance-minutes = 30
days-to-sync = 3
market-hours-only = true
empty-text = "empty"
decode-entities = true
market-open = "08:00"
market-close = "17:30"
utc-offset = "+01:00"
holidays = ["2015-12-25", "2015-01-01", "2015-12-25"]
log-level = "debug"
log-file = "none"
"#,
            ))
            .unwrap();

        assert_eq!(settings.bucket_width(), 15 * MILLIS_PER_MINUTE);
        assert_eq!(settings.tolerance(), 30 * MILLIS_PER_MINUTE);
        assert_eq!(settings.days_to_sync, 3);
        assert!(settings.market_hours_only);
        assert_eq!(settings.empty_text, EmptyTextPolicy::AllowEmpty);
        assert!(settings.decode_entities);
        assert_eq!(settings.market_open, NaiveTime::from_hms_opt(8, 0, 0).unwrap());
        assert_eq!(settings.utc_offset, FixedOffset::east_opt(3600).unwrap());
        assert_eq!(
            settings.holidays,
            vec![
                NaiveDate::from_ymd_opt(2015, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2015, 12, 25).unwrap()
            ]
        );
        assert_eq!(settings.log_level.as_deref(), Some("debug"));
        assert!(settings.log_file.is_none());
        settings.validate().unwrap();
    }

    #[test]
    fn test_single_holiday_string() {
        let mut settings = Settings::default();
        settings
            .apply_toml_values(&table(r#"holidays = "2015-07-03""#))
            .unwrap();
        assert_eq!(settings.holidays.len(), 1);
    }

    #[test]
    fn test_invalid_toml_values() {
        let cases = [
            r#"bucket-minutes = "five""#,
            r#"market-hours-only = 1"#,
            r#"empty-text = "sometimes""#,
            r#"market-open = "9am""#,
            r#"utc-offset = "0500""#,
            r#"utc-offset = "+05:75""#,
            r#"holidays = ["2015-02-30"]"#,
            r#"holidays = 2015"#,
            r#"days-to-sync = -1"#,
        ];
        for case in cases {
            let mut settings = Settings::default();
            assert!(
                settings.apply_toml_values(&table(case)).is_err(),
                "expected error for {case}"
            );
        }
    }

    #[test]
    fn test_validate_rejects_bad_combinations() {
        let mut settings = Settings::default();
        settings.bucket_minutes = 0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings
            .apply_toml_values(&table(r#"market-open = "17:00""#))
            .unwrap();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_overflowing_minutes() {
        let mut settings = Settings::default();
        settings.bucket_minutes = 1 << 59;
        assert!(matches!(
            settings.validate(),
            Err(FeedError::Configuration { .. })
        ));
        assert_eq!(settings.bucket_width(), Millis::MAX);

        let mut settings = Settings::default();
        settings.tolerance_minutes = i64::MAX / 1_000;
        assert!(settings.validate().is_err());

        assert_eq!(minutes_to_millis(2, "tolerance-minutes").unwrap(), 2 * MILLIS_PER_MINUTE);
        assert!(minutes_to_millis(-1, "tolerance-minutes").is_err());
    }

    #[test]
    fn test_cli_overrides_config() {
        let mut settings = Settings::default();
        settings
            .apply_toml_values(&table("bucket-minutes = 15\ncolor = true"))
            .unwrap();

        let args = Args::try_parse_from([
            "tweetbucket",
            "--bucket-minutes",
            "1",
            "--no-color",
            "--empty-text",
            "empty",
            "canonicalize",
        ])
        .unwrap();
        settings.apply_args(&args).unwrap();

        assert_eq!(settings.bucket_minutes, 1);
        assert_eq!(settings.color, Some(false));
        assert_eq!(settings.empty_text, EmptyTextPolicy::AllowEmpty);
    }

    #[test]
    fn test_missing_explicit_config_file() {
        let result = load_config_file(Some(Path::new("/no/such/tweetbucket.toml")));
        assert!(matches!(result, Err(FeedError::Configuration { .. })));
    }

    #[test]
    fn test_parse_offset() {
        assert_eq!(parse_offset("Z").unwrap(), FixedOffset::east_opt(0).unwrap());
        assert_eq!(
            parse_offset("-05:00").unwrap(),
            FixedOffset::west_opt(5 * 3600).unwrap()
        );
        assert_eq!(
            parse_offset("+05:30").unwrap(),
            FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap()
        );
        assert!(parse_offset("+25:00").is_err());
    }
}
