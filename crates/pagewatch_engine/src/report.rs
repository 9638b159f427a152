use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pagewatch_core::EditReport;
use tokio::time::timeout;
use watch_logging::{watch_info, watch_warn};

use crate::desktop::{ClipboardWriter, DesktopNotifier};

/// Longest wait for a notification or clipboard helper before giving up on it.
pub const HELPER_TIMEOUT: Duration = Duration::from_secs(10);

/// Where the diff body of a report goes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ReportMode {
    /// Diff on the console, one-line summary in the log.
    #[default]
    Compact,
    /// Full diff in the log only.
    Verbose,
}

/// Receives every report produced by a watch loop.
#[async_trait::async_trait]
pub trait ReportSink: Send + Sync {
    async fn deliver(&self, url: &str, report: &EditReport);
}

pub struct ConsoleReporter {
    mode: ReportMode,
    console: Mutex<Box<dyn Write + Send>>,
    notifier: Option<Arc<dyn DesktopNotifier>>,
    clipboard: Option<Arc<dyn ClipboardWriter>>,
    helper_timeout: Duration,
}

impl ConsoleReporter {
    /// Reporter writing diffs to stdout.
    pub fn stdout(mode: ReportMode) -> Self {
        Self::with_console(mode, Box::new(io::stdout()))
    }

    pub fn with_console(mode: ReportMode, console: Box<dyn Write + Send>) -> Self {
        Self {
            mode,
            console: Mutex::new(console),
            notifier: None,
            clipboard: None,
            helper_timeout: HELPER_TIMEOUT,
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn DesktopNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn with_clipboard(mut self, clipboard: Arc<dyn ClipboardWriter>) -> Self {
        self.clipboard = Some(clipboard);
        self
    }

    pub fn with_helper_timeout(mut self, helper_timeout: Duration) -> Self {
        self.helper_timeout = helper_timeout;
        self
    }

    fn print(&self, url: &str, report: &EditReport) {
        let Ok(mut console) = self.console.lock() else {
            watch_warn!("Console writer poisoned; dropping diff of {}", url);
            return;
        };
        let written = writeln!(console, "Site {url} diff:\n{}", report.text)
            .and_then(|()| console.flush());
        if let Err(err) = written {
            watch_warn!("Writing diff of {} to console: {}", url, err);
        }
    }
}

#[async_trait::async_trait]
impl ReportSink for ConsoleReporter {
    async fn deliver(&self, url: &str, report: &EditReport) {
        match self.mode {
            ReportMode::Verbose => watch_info!(
                "Site {} updated ({} edits):\n{}",
                url,
                report.edits,
                report.text
            ),
            ReportMode::Compact => {
                self.print(url, report);
                watch_info!("Site {} updated ({} edits)", url, report.edits);
            }
        }

        if let Some(notifier) = &self.notifier {
            let body = format!("{} edits (check console output)", report.edits);
            match timeout(self.helper_timeout, notifier.notify("Site updated", url, &body)).await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => watch_warn!("Desktop notification for {} failed: {}", url, err),
                Err(_) => watch_warn!(
                    "Desktop notification for {} timed out after {:?}",
                    url,
                    self.helper_timeout
                ),
            }
        }
        if let Some(clipboard) = &self.clipboard {
            match timeout(self.helper_timeout, clipboard.set_text(url)).await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => watch_warn!("Copying {} to the clipboard failed: {}", url, err),
                Err(_) => watch_warn!(
                    "Copying {} to the clipboard timed out after {:?}",
                    url,
                    self.helper_timeout
                ),
            }
        }
    }
}
