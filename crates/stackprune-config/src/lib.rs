//! Run configuration for stackprune
//!
//! Everything here is resolved before the first network call, so a bad flag
//! or ignore file aborts the run without touching the cloud.

pub mod duration;
pub mod error;
pub mod ignore;
pub mod selection;

pub use duration::{format_duration, parse_duration, parse_ttl};
pub use error::*;
pub use ignore::{IGNORE_FILE_ENV, find_ignore_file, load_ignore_file, resolve_ignore_set};
pub use selection::KindSelection;

use chrono::{DateTime, Duration, Utc};
use stackprune_cloud::{Filter, IgnoreSet, Mode, Predicate};
use std::path::PathBuf;
use std::sync::Arc;

/// Default minimum age of a deletable resource
pub const DEFAULT_RESOURCE_TTL: &str = "7h";

/// Tag that exempts a resource from deletion
pub const DEFAULT_KEEP_TAG: &str = "shiftstack-prune=keep";

/// stackprune's config directory (`~/.config/stackprune`)
pub fn get_config_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .ok_or(ConfigError::ConfigDirNotFound)?
        .join("stackprune"))
}

/// Where to send a notification when deletions fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlackConfig {
    pub hook: String,
    /// Printed as `Cluster <label>` above the failures
    pub cluster_label: Option<String>,
}

/// Raw run options, as they come off the command line
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub resource_ttl: String,
    pub no_dry_run: bool,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub keep_tag: String,
    pub ignore_file: Option<PathBuf>,
    pub exclude_ids: Vec<String>,
    pub exclude_names: Vec<String>,
    pub slack_hook: Option<String>,
    pub cluster_label: Option<String>,
}

/// Validated configuration of one run
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub ttl: Duration,
    pub mode: Mode,
    pub kinds: KindSelection,
    pub keep_tag: String,
    pub ignore: Arc<IgnoreSet>,
    pub exclude_ids: Vec<String>,
    pub exclude_names: Vec<String>,
    pub slack: Option<SlackConfig>,
}

impl RunConfig {
    pub fn from_options(options: RunOptions) -> Result<Self> {
        let ttl = parse_ttl(&options.resource_ttl)?;
        let kinds = KindSelection::new(&options.include, &options.exclude)?;
        let ignore = resolve_ignore_set(options.ignore_file.as_deref())?;

        let slack = options
            .slack_hook
            .filter(|hook| !hook.is_empty())
            .map(|hook| SlackConfig {
                hook,
                cluster_label: options.cluster_label.filter(|l| !l.is_empty()),
            });

        Ok(Self {
            ttl,
            mode: Mode::from_dry_run(!options.no_dry_run),
            kinds,
            keep_tag: options.keep_tag,
            ignore: Arc::new(ignore),
            exclude_ids: options.exclude_ids,
            exclude_names: options.exclude_names,
            slack,
        })
    }

    /// Resources created at or after this instant are too young to delete
    pub fn threshold(&self, run_timestamp: DateTime<Utc>) -> DateTime<Utc> {
        run_timestamp - self.ttl
    }

    /// Run-wide filter, cheapest checks first
    pub fn filter(&self, run_timestamp: DateTime<Utc>) -> Filter {
        let mut filter = Filter::new();
        if !self.exclude_ids.is_empty() {
            filter = filter.then(Predicate::id_excludes(self.exclude_ids.iter().cloned()));
        }
        if !self.exclude_names.is_empty() {
            filter = filter.then(Predicate::name_excludes(self.exclude_names.iter().cloned()));
        }
        if !self.ignore.is_empty() {
            filter = filter.then(Predicate::not_ignored(Arc::clone(&self.ignore)));
        }
        filter
            .then(Predicate::lacks_protection_tag(self.keep_tag.clone()))
            .then(Predicate::older_than(self.threshold(run_timestamp)))
    }
}
