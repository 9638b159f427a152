use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use watch_logging::watch_trace;

use crate::decode::decode_html;
use crate::extract::Extractor;
use crate::fetch::Fetcher;
use crate::{FailureKind, FetchError, FetchOutput};

/// Fetch, decode and extract: URL in, normalized text out.
#[derive(Clone)]
pub struct FetchPipeline {
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<dyn Extractor>,
    timeout: Option<Duration>,
}

impl FetchPipeline {
    /// A zero `request_timeout` disables the per-request deadline.
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        extractor: Arc<dyn Extractor>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            timeout: (!request_timeout.is_zero()).then_some(request_timeout),
        }
    }

    /// Fetches `url` and returns its visible text.
    ///
    /// Resolves early with a `Cancelled` error once `cancel` fires, and with
    /// `Timeout` when the request outlives the configured deadline.
    pub async fn fetch_text(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<String, FetchError> {
        if cancel.is_cancelled() {
            return Err(FetchError::cancelled());
        }

        let output = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(FetchError::cancelled()),
            result = self.fetch_within_deadline(url) => result?,
        };

        let decoded = decode_html(&output.bytes, output.metadata.content_type.as_deref());
        watch_trace!(
            "Fetched {} (status {}, {} bytes, {})",
            output.metadata.final_url,
            output.metadata.status,
            output.metadata.byte_len,
            decoded.encoding_label
        );
        Ok(self.extractor.extract_text(&decoded.html))
    }

    async fn fetch_within_deadline(&self, url: &str) -> Result<FetchOutput, FetchError> {
        let Some(limit) = self.timeout else {
            return self.fetcher.fetch(url).await;
        };
        match tokio::time::timeout(limit, self.fetcher.fetch(url)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::new(
                FailureKind::Timeout,
                format!("no response within {limit:?}"),
            )),
        }
    }
}
