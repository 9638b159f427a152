use std::sync::Arc;
use std::time::Duration;

use pagewatch_core::Comparison;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use watch_logging::{watch_debug, watch_info, watch_warn};

use crate::config::WatchContext;
use crate::{ErrorKind, FetchError, TickOutcome, WatchError};

/// Stand-in deadline for delays past the end of the clock's range.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// How a watch loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// One-shot mode finished its single check.
    Completed,
    Cancelled,
}

/// Watch loop for a single URL. Owns the URL's snapshot exclusively.
pub struct Watcher {
    url: String,
    context: Arc<WatchContext>,
    rng: StdRng,
}

impl Watcher {
    pub fn new(url: impl Into<String>, context: Arc<WatchContext>) -> Self {
        Self {
            url: url.into(),
            context,
            rng: StdRng::from_entropy(),
        }
    }

    /// Replaces the jitter source, e.g. with a seeded generator.
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// One fetch-compare-persist-report cycle.
    ///
    /// Nothing is written once `cancel` has fired, even if the fetch itself
    /// completed.
    pub async fn tick(&self, cancel: &CancellationToken) -> Result<TickOutcome, WatchError> {
        let text = self.context.pipeline.fetch_text(&self.url, cancel).await?;
        if cancel.is_cancelled() {
            return Err(FetchError::cancelled().into());
        }

        let store = &self.context.store;
        let previous = store.read(&self.url)?;
        if previous.is_none() {
            watch_info!("First time checking {} (no previous state)", self.url);
        }

        let comparison = Comparison::between(previous.as_deref(), &text);
        if comparison.needs_persist() {
            store.write(&self.url, &text)?;
        }

        let Some(report) = comparison.report(&text, self.context.diff_style) else {
            watch_debug!("No change in {}", self.url);
            return Ok(TickOutcome::Unchanged);
        };
        // The snapshot is already written; only the delivery is abandoned.
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(FetchError::cancelled().into()),
            () = self.context.reporter.deliver(&self.url, &report) => {}
        }

        Ok(match comparison {
            Comparison::Initial => TickOutcome::Initial,
            _ => TickOutcome::Changed {
                edits: report.edits,
            },
        })
    }

    /// Ticks immediately, then every `interval + jitter` measured from the
    /// start of the previous tick, until cancelled. In one-shot mode it returns
    /// after the first tick whether or not that tick succeeded.
    pub async fn run(mut self, cancel: CancellationToken) -> Termination {
        let schedule = self.context.schedule;
        let mut next_tick = Instant::now();

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return self.stopped(),
                _ = sleep_until(next_tick) => {}
            }

            if schedule.is_repeating() {
                let delay = schedule.next_delay(&mut self.rng);
                let now = Instant::now();
                next_tick = now.checked_add(delay).unwrap_or_else(|| now + FAR_FUTURE);
                watch_debug!(
                    "Fetching {}, then next fetch in {:?} (jitter up to {:?})",
                    self.url,
                    delay,
                    schedule.jitter
                );
            }

            match self.tick(&cancel).await {
                Ok(_) => {}
                Err(err) => {
                    watch_warn!("Checking {}: {}", self.url, err);
                    if err.kind() == ErrorKind::Cancelled {
                        return self.stopped();
                    }
                }
            }

            if !schedule.is_repeating() {
                watch_info!(
                    "Finished checking {} (use --repeat-every to keep checking)",
                    self.url
                );
                return Termination::Completed;
            }
        }
    }

    fn stopped(&self) -> Termination {
        watch_debug!("Stopped watching {}", self.url);
        Termination::Cancelled
    }
}
