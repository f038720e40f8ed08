//! Fan-in of every kind lister into one consumption stream
//!
//! Each lister runs in its own task and pushes into a shared bounded queue,
//! so a slow or stalled kind never holds back the others. The merged stream
//! ends once every lister task has finished.

use crate::error::ListError;
use crate::lister::{KindLister, Listed, ResourceSink};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// Queue depth shared by all listers
pub const DEFAULT_CAPACITY: usize = 64;

pub struct FanIn {
    tx: mpsc::Sender<Listed>,
    rx: mpsc::Receiver<Listed>,
    tasks: JoinSet<()>,
    cancel: CancellationToken,
}

impl FanIn {
    pub fn new(capacity: usize, cancel: CancellationToken) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        Self {
            tx,
            rx,
            tasks: JoinSet::new(),
            cancel,
        }
    }

    /// Start a lister as an independent producer
    pub fn spawn(&mut self, lister: Box<dyn KindLister>) {
        let kind = lister.kind();
        let sink = ResourceSink::new(kind, self.tx.clone());
        let cancel = self.cancel.clone();
        let span = tracing::info_span!("lister", kind = %kind);

        self.tasks.spawn(
            async move {
                let outcome = tokio::select! {
                    _ = cancel.cancelled() => {
                        tracing::warn!(
                            "Listing of {} cancelled after {} resources",
                            kind,
                            sink.emitted()
                        );
                        sink.incomplete("cancelled".to_string()).await;
                        return;
                    }
                    outcome = lister.list(&sink) => outcome,
                };

                match outcome {
                    Ok(()) => {
                        tracing::debug!("Listed {} {} resources", sink.emitted(), kind);
                    }
                    Err(ListError::Service(e)) if e.is_endpoint_not_found() => {
                        tracing::info!("Skipping {} listing because the endpoint was not found", kind);
                    }
                    Err(ListError::Closed) => {
                        tracing::debug!("Consumer stopped before {} listing finished", kind);
                    }
                    Err(ListError::Service(e)) => {
                        tracing::warn!(
                            "Listing of {} stopped early after {} resources: {}",
                            kind,
                            sink.emitted(),
                            e
                        );
                        sink.incomplete(e.to_string()).await;
                    }
                }
            }
            .instrument(span),
        );
    }

    /// Stop accepting listers and hand out the merged stream
    pub fn merge(self) -> Merged {
        // Dropping our own sender lets the queue close once every task is done.
        drop(self.tx);
        Merged {
            rx: self.rx,
            tasks: self.tasks,
        }
    }
}

/// Interleaved output of all listers
pub struct Merged {
    rx: mpsc::Receiver<Listed>,
    tasks: JoinSet<()>,
}

impl Merged {
    /// Next item from whichever lister produced one, `None` when all are done
    pub async fn next(&mut self) -> Option<Listed> {
        let item = self.rx.recv().await;
        if item.is_none() {
            self.reap().await;
        }
        item
    }

    async fn reap(&mut self) {
        while let Some(joined) = self.tasks.join_next().await {
            if let Err(e) = joined {
                if e.is_panic() {
                    tracing::error!("Lister task panicked: {}", e);
                }
            }
        }
    }
}
