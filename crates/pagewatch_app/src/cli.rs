//! Command line interface.

use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use pagewatch_core::{DiffStyle, ScheduleParams};
use pagewatch_engine::{FetchSettings, ReportMode, WatchConfig, DEFAULT_STATE_DIR};

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorWhen {
    Auto,
    Always,
    Never,
}

/// Monitors URLs for updates and outputs diffs.
#[derive(Parser, Debug)]
#[command(name = "pagewatch")]
#[command(version, about, long_about = None)]
#[command(
    after_help = "EXAMPLE:\n  # Check major news outlets every 5 minutes:\n  pagewatch --repeat-every=5m --log-full-diff https://theguardian.com https://nytimes.com"
)]
pub struct Cli {
    /// URLs to watch
    #[arg(required = true, value_name = "URLS")]
    pub urls: Vec<String>,

    /// Directory where site contents are cached
    #[arg(long, default_value = DEFAULT_STATE_DIR)]
    pub state_dir: String,

    /// Keep running, checking at this interval (0 checks once)
    #[arg(long, value_parser = humantime::parse_duration, default_value = "0s")]
    pub repeat_every: Duration,

    /// Random jitter added to every interval, if --repeat-every is used
    #[arg(long, value_parser = humantime::parse_duration, default_value = "2m")]
    pub jitter: Duration,

    /// Timeout for each HTTP GET request (0 to disable)
    #[arg(long, value_parser = humantime::parse_duration, default_value = "30s")]
    pub request_timeout: Duration,

    /// Write the full diff to the log (otherwise write it to stdout)
    #[arg(long)]
    pub log_full_diff: bool,

    /// Display a desktop notification when a site is updated (default)
    #[arg(long, overrides_with = "no_desktop_notify")]
    pub desktop_notify: bool,

    /// Do not display a desktop notification when a site is updated
    #[arg(long, overrides_with = "desktop_notify")]
    pub no_desktop_notify: bool,

    /// Put the latest updated URL in the clipboard
    #[arg(long)]
    pub clipboard: bool,

    /// Color the diff output
    #[arg(long, value_enum, default_value_t = ColorWhen::Auto)]
    pub color: ColorWhen,

    /// Largest response body accepted, in bytes
    #[arg(long, default_value_t = FetchSettings::default().max_bytes)]
    pub max_bytes: u64,

    /// Redirects followed before a fetch fails
    #[arg(long, default_value_t = FetchSettings::default().redirect_limit)]
    pub redirect_limit: usize,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log warnings and errors (-q), or errors only (-qq)
    #[arg(short, long, action = clap::ArgAction::Count, conflicts_with = "verbose")]
    pub quiet: u8,

    /// Also write the log to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    pub fn watch_config(&self) -> WatchConfig {
        let schedule = ScheduleParams::every(self.repeat_every, self.jitter);
        let diff_style = self.diff_style(
            std::io::stdout().is_terminal(),
            std::io::stderr().is_terminal(),
        );

        WatchConfig {
            state_dir: self.state_dir.clone(),
            schedule,
            request_timeout: self.request_timeout,
            fetch: FetchSettings {
                max_bytes: self.max_bytes,
                redirect_limit: self.redirect_limit,
                ..FetchSettings::default()
            },
            report_mode: if self.log_full_diff {
                ReportMode::Verbose
            } else {
                ReportMode::Compact
            },
            diff_style,
            desktop_notify: !self.no_desktop_notify,
            clipboard: self.clipboard,
        }
    }

    /// `auto` colours only when every destination of the diff is a terminal.
    fn diff_style(&self, stdout_is_terminal: bool, stderr_is_terminal: bool) -> DiffStyle {
        let to_terminal = if self.log_full_diff {
            // Full diffs go through the logger: stderr, plus the log file if any.
            stderr_is_terminal && self.log_file.is_none()
        } else {
            stdout_is_terminal
        };
        match self.color {
            ColorWhen::Always => DiffStyle::Ansi,
            ColorWhen::Never => DiffStyle::Plain,
            ColorWhen::Auto if to_terminal => DiffStyle::Ansi,
            ColorWhen::Auto => DiffStyle::Plain,
        }
    }
}
