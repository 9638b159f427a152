//! Pagewatch engine: fetch pipeline, snapshot store and watch loops.
mod config;
mod decode;
mod desktop;
mod extract;
mod fetch;
mod key;
mod persist;
mod pipeline;
mod report;
mod store;
mod supervisor;
mod types;
mod watch;

pub use config::{WatchConfig, WatchContext, DEFAULT_STATE_DIR};
pub use decode::{decode_html, DecodedHtml};
pub use desktop::{ClipboardWriter, DesktopNotifier, SystemClipboard, SystemNotifier};
pub use extract::{Extractor, HtmlTextExtractor};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher};
pub use key::{derive_key, MAX_KEY_LEN};
pub use persist::{ensure_state_dir, AtomicFileWriter, PersistError};
pub use pipeline::FetchPipeline;
pub use report::{ConsoleReporter, ReportMode, ReportSink, HELPER_TIMEOUT};
pub use store::{StateError, StateStore};
pub use supervisor::{Supervisor, SupervisorExit};
pub use types::{
    ErrorKind, FailureKind, FetchError, FetchMetadata, FetchOutput, TickOutcome, WatchError,
};
pub use watch::{Termination, Watcher};
