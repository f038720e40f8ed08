//! `--include` / `--exclude` resolution

use crate::error::{ConfigError, Result};
use stackprune_cloud::Kind;

/// The kinds a run lists, in lister start order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindSelection {
    kinds: Vec<Kind>,
}

fn parse_selectors<S: AsRef<str>>(selectors: &[S]) -> Result<Vec<Kind>> {
    selectors
        .iter()
        .map(|s| s.as_ref().trim())
        .filter(|s| !s.is_empty())
        .map(|s| Kind::from_selector(s).ok_or_else(|| ConfigError::UnknownKind(s.to_string(), Kind::selectors())))
        .collect()
}

impl KindSelection {
    /// Resolve the selection
    ///
    /// A non-empty include list selects exactly those kinds; otherwise the
    /// exclude list is subtracted from every kind. Naming a kind in both
    /// lists is an error, as is any unknown selector.
    pub fn new<S: AsRef<str>>(include: &[S], exclude: &[S]) -> Result<Self> {
        let include = parse_selectors(include)?;
        let exclude = parse_selectors(exclude)?;

        if let Some(both) = include.iter().find(|k| exclude.contains(k)) {
            return Err(ConfigError::ConflictingKind(both.selector().to_string()));
        }

        let kinds = Kind::ALL
            .into_iter()
            .filter(|k| {
                if include.is_empty() {
                    !exclude.contains(k)
                } else {
                    include.contains(k)
                }
            })
            .collect();
        Ok(Self { kinds })
    }

    pub fn all() -> Self {
        Self {
            kinds: Kind::ALL.to_vec(),
        }
    }

    pub fn includes(&self, kind: Kind) -> bool {
        self.kinds.contains(&kind)
    }

    pub fn kinds(&self) -> &[Kind] {
        &self.kinds
    }
}

impl Default for KindSelection {
    fn default() -> Self {
        Self::all()
    }
}
