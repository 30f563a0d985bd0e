//! Text config-file loader: `key=value` lines, `#`-prefixed comments,
//! open/close times in `HH:MM:SS am|pm` — grounded in
//! `original_source::Config`, including its unconventional am/pm
//! arithmetic (see [`parse_time_offset`]).

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use gateway_core::Config;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed config line (expected key=value): {line:?}")]
    MalformedLine { line: String },
    #[error("missing required config key: {key}")]
    MissingKey { key: &'static str },
    #[error("config key {key} has an unparseable value {value:?}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
    #[error(transparent)]
    Validation(#[from] gateway_core::ConfigValidationError),
}

/// Parses `HH:MM:SS am|pm` the way `original_source::Config::getTime`
/// does: everything before the first `am`/`pm` substring is split on
/// `:` into hours/minutes/seconds, and then `pm` always adds 12 hours
/// while `am` adds nothing. The 12 o'clock boundary is not
/// special-cased — `12:00:00 am` comes out as hour 12, not midnight,
/// and `12:00:00 pm` comes out as hour 24. Config authors are expected
/// to keep the trading window away from that boundary, matching
/// `Config.h`'s own documented assumption that the session never
/// crosses midnight.
fn parse_time_offset(key: &'static str, raw: &str) -> Result<u64, ConfigError> {
    let lower = raw.to_ascii_lowercase();
    let (clock_part, is_am) = if let Some(pos) = lower.find("am") {
        (&raw[..pos], true)
    } else if let Some(pos) = lower.find("pm") {
        (&raw[..pos], false)
    } else {
        return Err(ConfigError::InvalidValue {
            key,
            value: raw.to_string(),
            reason: "missing am or pm".to_string(),
        });
    };

    let invalid = |reason: &str| ConfigError::InvalidValue {
        key,
        value: raw.to_string(),
        reason: reason.to_string(),
    };

    let tokens: Vec<&str> = clock_part.trim().split(':').collect();
    if tokens.len() != 3 {
        return Err(invalid("expected HH:MM:SS"));
    }
    let mut hours: u64 = tokens[0]
        .trim()
        .parse()
        .map_err(|_| invalid("hours is not an integer"))?;
    let mins: u64 = tokens[1]
        .trim()
        .parse()
        .map_err(|_| invalid("minutes is not an integer"))?;
    let secs: u64 = tokens[2]
        .trim()
        .parse()
        .map_err(|_| invalid("seconds is not an integer"))?;

    if !is_am {
        hours += 12;
    }

    Ok(1_000_000_000u64 * (hours * 3600 + mins * 60 + secs))
}

fn parse_lines(contents: &str) -> Result<HashMap<String, String>, ConfigError> {
    let mut params = HashMap::new();
    for line in contents.lines() {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let pos = line
            .find('=')
            .ok_or_else(|| ConfigError::MalformedLine {
                line: line.to_string(),
            })?;
        let key = line[..pos].to_string();
        let value = line[pos + 1..].to_string();
        params.insert(key, value);
    }
    Ok(params)
}

fn required<'a>(
    params: &'a HashMap<String, String>,
    key: &'static str,
) -> Result<&'a str, ConfigError> {
    params
        .get(key)
        .map(String::as_str)
        .ok_or(ConfigError::MissingKey { key })
}

/// Loads and validates a gateway [`Config`] from a config file on disk.
pub fn load(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path_ref = path.as_ref();
    let contents = fs::read_to_string(path_ref).map_err(|source| ConfigError::Io {
        path: path_ref.display().to_string(),
        source,
    })?;

    let params = parse_lines(&contents)?;

    let open_offset_ns = parse_time_offset("Open", required(&params, "Open")?)?;
    let close_offset_ns = parse_time_offset("Close", required(&params, "Close")?)?;

    let window_sec: u64 = required(&params, "MonitorWindowSec")?
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue {
            key: "MonitorWindowSec",
            value: params["MonitorWindowSec"].clone(),
            reason: "not an unsigned integer".to_string(),
        })?;
    let rate: u64 = required(&params, "Rate")?
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue {
            key: "Rate",
            value: params["Rate"].clone(),
            reason: "not an unsigned integer".to_string(),
        })?;
    let username = required(&params, "Username")?.to_string();
    let password = required(&params, "Password")?.to_string();

    let config = Config::new(open_offset_ns, close_offset_ns, window_sec, rate, username, password)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn am_hours_pass_through_unadjusted() {
        // 09:30:15 am -> hour 9 untouched.
        let offset = parse_time_offset("Open", "09:30:15am").unwrap();
        assert_eq!(offset, 1_000_000_000 * (9 * 3600 + 30 * 60 + 15));
    }

    #[test]
    fn pm_hours_always_get_plus_twelve() {
        // 04:00:00 pm -> hour 16, and 12:00:00 pm -> hour 24 (the
        // original's unguarded +12, not a "noon" special case).
        let offset = parse_time_offset("Close", "04:00:00pm").unwrap();
        assert_eq!(offset, 1_000_000_000 * 16 * 3600);

        let noon = parse_time_offset("Close", "12:00:00pm").unwrap();
        assert_eq!(noon, 1_000_000_000 * 24 * 3600);
    }

    #[test]
    fn missing_am_pm_marker_is_an_error() {
        let err = parse_time_offset("Open", "09:30:15").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn parses_full_param_map() {
        let contents = "\
# sample config
Open=09:00:00am
Close=04:00:00pm
MonitorWindowSec=1
Rate=10
Username=trader
Password=secret
";
        let params = parse_lines(contents).unwrap();
        assert_eq!(params.get("Username").map(String::as_str), Some("trader"));
        assert_eq!(params.len(), 6);
    }

    #[test]
    fn malformed_line_without_equals_is_rejected() {
        let err = parse_lines("Open 09:00:00am\n").unwrap_err();
        assert!(matches!(err, ConfigError::MalformedLine { .. }));
    }
}
