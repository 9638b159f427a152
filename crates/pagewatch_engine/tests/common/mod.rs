#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pagewatch_core::{DiffStyle, EditReport, ScheduleParams};
use pagewatch_engine::{
    Extractor, FailureKind, FetchError, FetchMetadata, FetchOutput, FetchPipeline, Fetcher,
    ReportSink, StateStore, WatchContext,
};
use tokio_util::sync::CancellationToken;

pub fn init_logging() {
    watch_logging::initialize_for_tests();
}

/// Serves queued bodies in order, repeating the last one when the queue runs dry.
#[derive(Default)]
pub struct ScriptedFetcher {
    bodies: Mutex<VecDeque<String>>,
    last: Mutex<Option<String>>,
    calls: AtomicUsize,
    delay: Option<Duration>,
    cancel_on_call: Option<(usize, CancellationToken)>,
}

impl ScriptedFetcher {
    pub fn new<I, S>(bodies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            bodies: Mutex::new(bodies.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Cancels `token` from inside the `call`-th fetch (1-based).
    pub fn cancelling_on(mut self, call: usize, token: CancellationToken) -> Self {
        self.cancel_on_call = Some((call, token));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchOutput, FetchError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some((target, token)) = &self.cancel_on_call {
            if call == *target {
                token.cancel();
            }
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let next = self.bodies.lock().unwrap().pop_front();
        let body = match next {
            Some(body) => {
                *self.last.lock().unwrap() = Some(body.clone());
                body
            }
            None => self
                .last
                .lock()
                .unwrap()
                .clone()
                .ok_or_else(|| FetchError::new(FailureKind::Network, "no scripted body"))?,
        };

        Ok(FetchOutput {
            metadata: FetchMetadata {
                original_url: url.to_string(),
                final_url: url.to_string(),
                status: 200,
                content_type: Some("text/plain; charset=utf-8".to_string()),
                byte_len: body.len() as u64,
            },
            bytes: body.into_bytes(),
        })
    }
}

/// Keeps the decoded body as-is.
pub struct PassthroughExtractor;

impl Extractor for PassthroughExtractor {
    fn extract_text(&self, html: &str) -> String {
        html.to_string()
    }
}

#[derive(Default)]
pub struct RecordingReporter {
    reports: Mutex<Vec<(String, EditReport)>>,
}

impl RecordingReporter {
    pub fn reports(&self) -> Vec<(String, EditReport)> {
        self.reports.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ReportSink for RecordingReporter {
    async fn deliver(&self, url: &str, report: &EditReport) {
        self.reports
            .lock()
            .unwrap()
            .push((url.to_string(), report.clone()));
    }
}

pub struct Harness {
    pub context: Arc<WatchContext>,
    pub reporter: Arc<RecordingReporter>,
    pub store: StateStore,
}

pub fn harness(
    state_dir: &Path,
    fetcher: Arc<dyn Fetcher>,
    schedule: ScheduleParams,
    request_timeout: Duration,
) -> Harness {
    harness_with_store(
        StateStore::new(state_dir.to_string_lossy().into_owned()),
        fetcher,
        schedule,
        request_timeout,
    )
}

pub fn harness_with_store(
    store: StateStore,
    fetcher: Arc<dyn Fetcher>,
    schedule: ScheduleParams,
    request_timeout: Duration,
) -> Harness {
    let reporter = Arc::new(RecordingReporter::default());
    let context = Arc::new(WatchContext {
        schedule,
        diff_style: DiffStyle::Plain,
        pipeline: FetchPipeline::new(fetcher, Arc::new(PassthroughExtractor), request_timeout),
        store: store.clone(),
        reporter: reporter.clone(),
    });
    Harness {
        context,
        reporter,
        store,
    }
}
