//! Kind listers and the sink they emit into

use crate::error::{ListError, ServiceResult};
use crate::resource::{BoxedResource, Kind};
use async_trait::async_trait;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc;

/// One page of a remote catalog
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,

    /// Marker for the following page, `None` on the last page
    pub next_marker: Option<String>,
}

impl<T> Page<T> {
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_marker: None,
        }
    }
}

/// What travels from the listers to the consumer
#[derive(Debug)]
pub enum Listed {
    Resource(BoxedResource),

    /// A lister stopped before the end of its catalog
    Incomplete {
        kind: Kind,
        listed: usize,
        error: String,
    },
}

/// Producer of a lazy, finite sequence of resources of one kind
///
/// `list` pages through the backing catalog and emits resources in catalog
/// order. Returning an error ends the sequence early; the fan-in reports it.
#[async_trait]
pub trait KindLister: Send + Sync {
    fn kind(&self) -> Kind;

    async fn list(&self, sink: &ResourceSink) -> Result<(), ListError>;
}

/// Handle a lister pushes its resources through
pub struct ResourceSink {
    kind: Kind,
    tx: mpsc::Sender<Listed>,
    emitted: AtomicUsize,
}

impl ResourceSink {
    pub fn new(kind: Kind, tx: mpsc::Sender<Listed>) -> Self {
        Self {
            kind,
            tx,
            emitted: AtomicUsize::new(0),
        }
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Hand one resource to the consumer, waiting while the queue is full
    pub async fn emit(&self, resource: BoxedResource) -> Result<(), ListError> {
        self.tx
            .send(Listed::Resource(resource))
            .await
            .map_err(|_| ListError::Closed)?;
        self.emitted.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Number of resources emitted so far
    pub fn emitted(&self) -> usize {
        self.emitted.load(Ordering::Relaxed)
    }

    pub(crate) async fn incomplete(&self, error: String) {
        let _ = self
            .tx
            .send(Listed::Incomplete {
                kind: self.kind,
                listed: self.emitted(),
                error,
            })
            .await;
    }
}

pub type PageFuture<'a, T> = Pin<Box<dyn Future<Output = ServiceResult<Page<T>>> + Send + 'a>>;

/// Walk a marker-paged catalog, converting each record and emitting it
///
/// `convert` returning `None` drops the record (kind-intrinsic exclusions).
pub async fn paginate<'a, T, F, C>(
    sink: &ResourceSink,
    mut fetch: F,
    mut convert: C,
) -> Result<(), ListError>
where
    F: FnMut(Option<String>) -> PageFuture<'a, T>,
    C: FnMut(T) -> Option<BoxedResource>,
{
    let mut marker = None;
    loop {
        let page = fetch(marker.take()).await?;
        for record in page.items {
            if let Some(resource) = convert(record) {
                sink.emit(resource).await?;
            }
        }
        match page.next_marker {
            Some(next) => marker = Some(next),
            None => return Ok(()),
        }
    }
}
