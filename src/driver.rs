//! Driver spawns and manages the receive task

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::events::LinkEvent;
use crate::ingest::{Ingest, IngestOutcome};
use crate::provider::DatagramSource;

/// Consecutive receive errors after which the link is reported as degraded.
const MAX_ERRORS: u32 = 10;

/// Handle to a running receive task
#[derive(Debug)]
pub struct DriverHandle {
    cancel: CancellationToken,
    join: JoinHandle<()>,
}

impl DriverHandle {
    /// Token observed by the task; cancelling it stops the receive loop.
    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Signal the task to stop without waiting for it.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Stop the task and wait until it has released its source.
    ///
    /// An in-flight receive is abandoned; the source's `next_datagram` is cancel-safe.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.join.await {
            warn!("Receive task ended abnormally: {}", e);
        }
    }
}

/// Driver spawns the task that pumps datagrams from a source into the ingest path
pub struct Driver;

impl Driver {
    /// Spawn a receive task owning `source`.
    pub fn spawn<S>(source: S, ingest: Arc<Ingest>) -> DriverHandle
    where
        S: DatagramSource,
    {
        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();

        let join = tokio::spawn(async move {
            Self::receive_task(source, ingest, task_cancel).await;
        });

        DriverHandle { cancel, join }
    }

    async fn receive_task<S>(mut source: S, ingest: Arc<Ingest>, cancel: CancellationToken)
    where
        S: DatagramSource,
    {
        let description = source.describe();
        info!(source = %description, "Receive task started");
        let mut datagram_count = 0u64;
        let mut queued_count = 0u64;
        let mut error_count = 0u32;

        loop {
            let result = tokio::select! {
                _ = cancel.cancelled() => {
                    debug!(source = %description, "Receive task cancelled");
                    break;
                }
                result = source.next_datagram() => result,
            };

            match result {
                Ok(Some(datagram)) => {
                    datagram_count += 1;
                    if error_count >= MAX_ERRORS {
                        info!(source = %description, "Receive path recovered");
                        let _ = ingest.events().send(LinkEvent::status("Receive path recovered"));
                    }
                    error_count = 0;
                    if let IngestOutcome::Queued { .. } = ingest.process(datagram) {
                        queued_count += 1;
                    }
                }
                Ok(None) => {
                    info!(source = %description, "Datagram source closed");
                    break;
                }
                Err(e) => {
                    // Transient socket errors (e.g. ICMP port unreachable surfacing on
                    // recv) must not take the link down
                    error_count = error_count.saturating_add(1);
                    warn!("Receive error ({}): {}", error_count, e);

                    if error_count == MAX_ERRORS {
                        error!(source = %description, "Repeated receive errors, still retrying");
                        let _ = ingest
                            .events()
                            .send(LinkEvent::status(format!("Receive errors: {}", e)));
                    }

                    // Exponential backoff: 50ms, 100ms, 200ms, ... capped at 1.6s
                    let backoff = Duration::from_millis(50 * (1 << error_count.min(5)));
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = tokio::time::sleep(backoff) => {}
                    }
                }
            }
        }

        info!(
            source = %description,
            datagrams = datagram_count,
            queued = queued_count,
            "Receive task ended"
        );
    }
}
