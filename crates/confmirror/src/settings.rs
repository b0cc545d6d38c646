//! Command-line configuration.
//!
//! All tunables are carried in one [`Settings`] struct constructed once at
//! startup and passed by reference into the components that need them; no
//! component reads flags or ambient globals on its own.

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser};

/// Runtime configuration for the sidecar, parsed from the command line.
#[derive(Debug, Clone, Parser)]
#[command(name = "confmirror", version, about, long_about = None)]
pub struct Settings {
    /// Root path to observe for configuration changes.
    #[arg(long, default_value = "/config")]
    pub watch_path: PathBuf,

    /// Expand ${VAR} / $VAR environment references found in files.
    #[arg(long, action = ArgAction::Set, default_value_t = true)]
    pub expand_vars: bool,

    /// Copy processed files to the target path.
    #[arg(long, action = ArgAction::Set, default_value_t = true)]
    pub copy_files: bool,

    /// Destination root for processed files.
    #[arg(long, default_value = "/processed-config")]
    pub target_path: PathBuf,

    /// Url to POST to for the downstream service to reload its config.
    #[arg(long, default_value = "http://localhost:9090/-/reload")]
    pub prometheus_url: String,

    /// Quiet period after a detected change before files are processed.
    ///
    /// Allows capturing multiple close-timed changes in a single update.
    /// Accepts `ms`, `s` or `m` suffixes, or a bare number of seconds.
    #[arg(long, default_value = "5s", value_parser = parse_delay)]
    pub process_delay_time: Duration,

    /// Enable debug log output.
    #[arg(long)]
    pub debug: bool,
}

/// Parse a human-friendly delay value (`200ms`, `5s`, `1m`, or bare seconds).
fn parse_delay(value: &str) -> Result<Duration, String> {
    let value = value.trim();

    // Check `ms` before the single-letter suffixes so `200ms` is not read
    // as `200m` + trailing garbage.
    let (digits, unit): (&str, fn(u64) -> Duration) =
        if let Some(rest) = value.strip_suffix("ms") {
            (rest, Duration::from_millis)
        } else if let Some(rest) = value.strip_suffix('s') {
            (rest, Duration::from_secs)
        } else if let Some(rest) = value.strip_suffix('m') {
            (rest, |n| Duration::from_secs(n * 60))
        } else {
            (value, Duration::from_secs)
        };

    digits
        .trim()
        .parse::<u64>()
        .map(unit)
        .map_err(|_| format!("invalid duration '{value}': expected e.g. 200ms, 5s or 1m"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::try_parse_from(["confmirror"]).unwrap();

        assert_eq!(settings.watch_path, PathBuf::from("/config"));
        assert!(settings.expand_vars);
        assert!(settings.copy_files);
        assert_eq!(settings.target_path, PathBuf::from("/processed-config"));
        assert_eq!(settings.prometheus_url, "http://localhost:9090/-/reload");
        assert_eq!(settings.process_delay_time, Duration::from_secs(5));
        assert!(!settings.debug);
    }

    #[test]
    fn test_flags_override_defaults() {
        let settings = Settings::try_parse_from([
            "confmirror",
            "--watch-path",
            "/etc/prom",
            "--expand-vars=false",
            "--copy-files=false",
            "--target-path",
            "/var/prom",
            "--prometheus-url",
            "http://prom:9090/-/reload",
            "--process-delay-time",
            "200ms",
            "--debug",
        ])
        .unwrap();

        assert_eq!(settings.watch_path, PathBuf::from("/etc/prom"));
        assert!(!settings.expand_vars);
        assert!(!settings.copy_files);
        assert_eq!(settings.target_path, PathBuf::from("/var/prom"));
        assert_eq!(settings.prometheus_url, "http://prom:9090/-/reload");
        assert_eq!(settings.process_delay_time, Duration::from_millis(200));
        assert!(settings.debug);
    }

    #[test]
    fn test_parse_delay_units() {
        assert_eq!(parse_delay("200ms").unwrap(), Duration::from_millis(200));
        assert_eq!(parse_delay("5s").unwrap(), Duration::from_secs(5));
        assert_eq!(parse_delay("2m").unwrap(), Duration::from_secs(120));
        assert_eq!(parse_delay("30").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_delay(" 10s ").unwrap(), Duration::from_secs(10));
    }

    #[test]
    fn test_parse_delay_rejects_garbage() {
        assert!(parse_delay("fast").is_err());
        assert!(parse_delay("").is_err());
        assert!(parse_delay("5h").is_err());
        assert!(parse_delay("-1s").is_err());
    }
}
