use std::sync::Arc;
use std::time::Duration;

use pagewatch_core::{DiffStyle, ScheduleParams};

use crate::desktop::{SystemClipboard, SystemNotifier};
use crate::extract::HtmlTextExtractor;
use crate::fetch::{FetchSettings, ReqwestFetcher};
use crate::pipeline::FetchPipeline;
use crate::report::{ConsoleReporter, ReportMode, ReportSink};
use crate::store::StateStore;
use crate::FetchError;

pub const DEFAULT_STATE_DIR: &str = "~/.pagewatch/";

/// Immutable process configuration, built once from the command line.
#[derive(Debug, Clone)]
pub struct WatchConfig {
    pub state_dir: String,
    pub schedule: ScheduleParams,
    /// Zero disables the per-request deadline.
    pub request_timeout: Duration,
    pub fetch: FetchSettings,
    pub report_mode: ReportMode,
    pub diff_style: DiffStyle,
    pub desktop_notify: bool,
    pub clipboard: bool,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            state_dir: DEFAULT_STATE_DIR.to_string(),
            schedule: ScheduleParams::once(),
            request_timeout: Duration::from_secs(30),
            fetch: FetchSettings::default(),
            report_mode: ReportMode::Compact,
            diff_style: DiffStyle::Ansi,
            desktop_notify: false,
            clipboard: false,
        }
    }
}

/// Services shared read-only by every watch loop.
pub struct WatchContext {
    pub schedule: ScheduleParams,
    pub diff_style: DiffStyle,
    pub pipeline: FetchPipeline,
    pub store: StateStore,
    pub reporter: Arc<dyn ReportSink>,
}

impl WatchContext {
    /// Wires the production fetcher, extractor, store and reporter.
    pub fn from_config(config: &WatchConfig) -> Result<Self, FetchError> {
        let fetcher = Arc::new(ReqwestFetcher::new(config.fetch.clone())?);
        let pipeline = FetchPipeline::new(
            fetcher,
            Arc::new(HtmlTextExtractor),
            config.request_timeout,
        );

        let mut reporter = ConsoleReporter::stdout(config.report_mode);
        if config.desktop_notify {
            if let Some(notifier) = SystemNotifier::detect() {
                reporter = reporter.with_notifier(Arc::new(notifier));
            }
        }
        if config.clipboard {
            if let Some(clipboard) = SystemClipboard::detect() {
                reporter = reporter.with_clipboard(Arc::new(clipboard));
            }
        }

        Ok(Self {
            schedule: config.schedule,
            diff_style: config.diff_style,
            pipeline,
            store: StateStore::new(config.state_dir.clone()),
            reporter: Arc::new(reporter),
        })
    }
}
