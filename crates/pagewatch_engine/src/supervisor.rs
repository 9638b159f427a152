use std::future::Future;
use std::sync::Arc;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use watch_logging::{watch_error, watch_info};

use crate::config::WatchContext;
use crate::watch::{Termination, Watcher};

/// Why [`Supervisor::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorExit {
    /// Every watch loop finished on its own (one-shot mode).
    Completed,
    /// Shutdown was requested; every loop has stopped since.
    Interrupted,
}

/// Runs one watch loop per target under a shared cancellation token.
pub struct Supervisor {
    context: Arc<WatchContext>,
    cancel: CancellationToken,
}

impl Supervisor {
    pub fn new(context: Arc<WatchContext>) -> Self {
        Self {
            context,
            cancel: CancellationToken::new(),
        }
    }

    /// Token observed by every loop started by this supervisor.
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Spawns the loops and waits for whichever comes first: all loops
    /// terminating, or `shutdown` resolving. On shutdown the loops are
    /// cancelled and awaited before returning.
    pub async fn run<S>(&self, targets: Vec<String>, shutdown: S) -> SupervisorExit
    where
        S: Future<Output = ()>,
    {
        let mut loops = JoinSet::new();
        for url in targets {
            let watcher = Watcher::new(url, self.context.clone());
            loops.spawn(watcher.run(self.cancel.clone()));
        }

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                joined = loops.join_next() => match joined {
                    None => return SupervisorExit::Completed,
                    Some(result) => log_join(result),
                },
                () = &mut shutdown => break,
            }
        }

        watch_info!("Shutting down...");
        self.cancel.cancel();
        while let Some(result) = loops.join_next().await {
            log_join(result);
        }
        SupervisorExit::Interrupted
    }
}

fn log_join(result: Result<Termination, tokio::task::JoinError>) {
    if let Err(err) = result {
        watch_error!("Watch task failed: {}", err);
    }
}
