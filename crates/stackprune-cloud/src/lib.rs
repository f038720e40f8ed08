//! Stackprune core
//!
//! Cloud-agnostic half of the pruner: the resource abstraction, the filter
//! pipeline, the concurrent fan-in of per-kind listers and the run report.
//! Concrete kinds live in provider crates such as `stackprune-openstack`.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐ ┌──────────┐       ┌──────────┐
//! │ lister A │ │ lister B │  ...  │ lister N │   one task per kind
//! └────┬─────┘ └────┬─────┘       └────┬─────┘
//!      └────────────┼──────────────────┘
//!                   ▼
//!            bounded queue (FanIn)
//!                   │
//!                   ▼
//!     Pipeline: kind filter → run filter → delete
//!                   │
//!                   ▼
//!               RunReport
//! ```

pub mod error;
pub mod fanin;
pub mod filter;
pub mod ignore;
pub mod lister;
pub mod pipeline;
pub mod report;
pub mod resource;

#[cfg(test)]
mod testing;

// Re-exports
pub use error::{CloudError, DeleteError, ListError, Result, ServiceError, ServiceResult};
pub use fanin::{FanIn, Merged, DEFAULT_CAPACITY};
pub use filter::{Filter, Predicate};
pub use ignore::{IgnoreEntry, IgnoreSet};
pub use lister::{paginate, KindLister, Listed, Page, PageFuture, ResourceSink};
pub use pipeline::{Disposition, Mode, Pipeline};
pub use report::{IncompleteKind, ResourceSummary, RunReport};
pub use resource::{cluster_from_tags, BoxedResource, Kind, Resource, CLUSTER_TAG_PREFIXES};
