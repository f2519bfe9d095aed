//! Configuration and CLI argument handling

use std::{env, path::PathBuf, time::Duration};

use chrono::NaiveTime;
use clap::Parser;

/// File name of the usage log
pub const LOG_FILE_NAME: &str = "usage_stats.csv";

/// CLI argument parsing structure
#[derive(Parser)]
#[command(name = "sleep-countdown")]
#[command(about = "Counts down, then suspends, shuts down or reboots the machine unless cancelled")]
#[command(version)]
pub struct Cli {
    /// Log a computer-started event and exit without counting down
    #[arg(long, conflicts_with = "shutdown")]
    pub startup: bool,

    /// Log a computer-shutdown event and exit without counting down
    #[arg(long)]
    pub shutdown: bool,

    /// Print the chosen power action instead of executing it
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "warn" }
    }
}

/// Time-of-day rule that upgrades the default sleep to a shutdown
#[derive(Debug, Clone)]
pub struct EscalationPolicy {
    /// Inclusive start of the window
    pub window_start: NaiveTime,
    /// Exclusive end of the window
    pub window_end: NaiveTime,
    /// Case-insensitive name fragments of processes that block escalation
    pub blocked_processes: Vec<String>,
}

impl EscalationPolicy {
    /// Whether `time` falls inside `[window_start, window_end)`
    pub fn in_window(&self, time: NaiveTime) -> bool {
        if self.window_start <= self.window_end {
            time >= self.window_start && time < self.window_end
        } else {
            // Window wraps past midnight.
            time >= self.window_start || time < self.window_end
        }
    }

    /// Names from `running` that match any block-list entry
    pub fn blocking<'a>(&self, running: &'a [String]) -> Vec<&'a str> {
        let blocked: Vec<String> = self
            .blocked_processes
            .iter()
            .map(|fragment| fragment.to_lowercase())
            .collect();

        running
            .iter()
            .filter(|name| {
                let name = name.to_lowercase();
                blocked.iter().any(|fragment| name.contains(fragment.as_str()))
            })
            .map(String::as_str)
            .collect()
    }
}

impl Default for EscalationPolicy {
    fn default() -> Self {
        Self {
            window_start: NaiveTime::from_hms_opt(0, 30, 0).unwrap_or(NaiveTime::MIN),
            window_end: NaiveTime::from_hms_opt(8, 0, 0).unwrap_or(NaiveTime::MIN),
            blocked_processes: vec!["steam".to_string(), "rider".to_string()],
        }
    }
}

/// Fixed settings of a countdown run
#[derive(Debug, Clone)]
pub struct CountdownConfig {
    /// Time until the selected action fires
    pub timeout: Duration,
    /// Delay between keyboard polls
    pub poll_interval: Duration,
    /// Append-only event log
    pub log_path: PathBuf,
    pub escalation: EscalationPolicy,
}

impl CountdownConfig {
    /// Default log location: `~/Documents/usage_stats.csv`
    pub fn default_log_path() -> PathBuf {
        let home = env::var_os("HOME").or_else(|| env::var_os("USERPROFILE"));
        match home {
            Some(home) => PathBuf::from(home).join("Documents").join(LOG_FILE_NAME),
            None => PathBuf::from(LOG_FILE_NAME),
        }
    }
}

impl Default for CountdownConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(2),
            poll_interval: Duration::from_millis(50),
            log_path: Self::default_log_path(),
            escalation: EscalationPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn window_is_half_open() {
        let policy = EscalationPolicy::default();
        assert!(!policy.in_window(at(0, 29)));
        assert!(policy.in_window(at(0, 30)));
        assert!(policy.in_window(at(7, 59)));
        assert!(!policy.in_window(at(8, 0)));
        assert!(!policy.in_window(at(23, 0)));
    }

    #[test]
    fn window_may_wrap_midnight() {
        let policy = EscalationPolicy {
            window_start: at(22, 0),
            window_end: at(2, 0),
            blocked_processes: Vec::new(),
        };
        assert!(policy.in_window(at(23, 30)));
        assert!(policy.in_window(at(1, 0)));
        assert!(!policy.in_window(at(12, 0)));
    }

    #[test]
    fn block_list_matches_case_insensitive_substrings() {
        let policy = EscalationPolicy::default();
        let running = vec![
            "bash".to_string(),
            "Steam.exe".to_string(),
            "steamwebhelper".to_string(),
            "JetBrains.Rider".to_string(),
        ];
        assert_eq!(
            policy.blocking(&running),
            vec!["Steam.exe", "steamwebhelper", "JetBrains.Rider"]
        );
        assert!(policy.blocking(&["firefox".to_string()]).is_empty());
    }

    #[test]
    fn defaults() {
        let config = CountdownConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(2));
        assert_eq!(config.poll_interval, Duration::from_millis(50));
        assert!(config.log_path.ends_with(LOG_FILE_NAME));
    }

    #[test]
    fn cli_flags() {
        let cli = Cli::try_parse_from(["sleep-countdown", "--startup", "-v"]).unwrap();
        assert!(cli.startup && cli.verbose && !cli.shutdown);
        assert_eq!(cli.log_level(), "debug");

        assert!(Cli::try_parse_from(["sleep-countdown", "--startup", "--shutdown"]).is_err());
    }
}
