//! Predicate pipeline deciding which resources are stale and deletable
//!
//! A [`Filter`] is an ordered list of [`Predicate`]s. A resource passes when
//! every predicate accepts it; evaluation stops at the first rejection, so
//! cheap exact-match checks belong in front of pattern matching.

use crate::error::Result;
use crate::ignore::IgnoreSet;
use crate::resource::Resource;
use chrono::{DateTime, Utc};
use regex::Regex;
use std::fmt;
use std::sync::Arc;

/// A single kind-independent check
#[derive(Clone)]
pub enum Predicate {
    /// Timestamp strictly before the threshold
    OlderThan(DateTime<Utc>),
    /// Name is none of these
    NameExcludes(Vec<String>),
    /// ID is none of these
    IdExcludes(Vec<String>),
    /// Name contains none of these substrings
    NameDoesNotContain(Vec<String>),
    /// Name matches at least one pattern
    NameMatchesAnyOf(Vec<Regex>),
    /// Resource does not carry this tag
    LacksProtectionTag(String),
    /// Resource is not in the ignore set
    NotIgnored(Arc<IgnoreSet>),
}

impl Predicate {
    pub fn older_than(threshold: DateTime<Utc>) -> Self {
        Predicate::OlderThan(threshold)
    }

    pub fn name_excludes<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        Predicate::NameExcludes(names.into_iter().map(Into::into).collect())
    }

    pub fn id_excludes<S: Into<String>>(ids: impl IntoIterator<Item = S>) -> Self {
        Predicate::IdExcludes(ids.into_iter().map(Into::into).collect())
    }

    pub fn name_does_not_contain<S: Into<String>>(substrings: impl IntoIterator<Item = S>) -> Self {
        Predicate::NameDoesNotContain(substrings.into_iter().map(Into::into).collect())
    }

    /// Compile the patterns up front; an invalid pattern is a configuration error
    pub fn name_matches_any_of<S: AsRef<str>>(patterns: impl IntoIterator<Item = S>) -> Result<Self> {
        let compiled = patterns
            .into_iter()
            .map(|p| Regex::new(p.as_ref()))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Predicate::NameMatchesAnyOf(compiled))
    }

    pub fn lacks_protection_tag(tag: impl Into<String>) -> Self {
        Predicate::LacksProtectionTag(tag.into())
    }

    pub fn not_ignored(ignore: Arc<IgnoreSet>) -> Self {
        Predicate::NotIgnored(ignore)
    }

    pub fn accepts(&self, resource: &dyn Resource) -> bool {
        match self {
            Predicate::OlderThan(threshold) => resource.timestamp() < *threshold,
            Predicate::NameExcludes(names) => !names.iter().any(|n| n == resource.name()),
            Predicate::IdExcludes(ids) => !ids.iter().any(|i| i == resource.id()),
            Predicate::NameDoesNotContain(substrings) => {
                let name = resource.name();
                !substrings.iter().any(|s| name.contains(s.as_str()))
            }
            Predicate::NameMatchesAnyOf(patterns) => {
                let name = resource.name();
                patterns.iter().any(|p| p.is_match(name))
            }
            // Kinds without tags can never be protected by tag.
            Predicate::LacksProtectionTag(tag) => resource
                .tags()
                .is_none_or(|tags| !tags.iter().any(|t| t == tag)),
            Predicate::NotIgnored(ignore) => !ignore.contains(resource),
        }
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::OlderThan(t) => write!(f, "OlderThan({})", t.to_rfc3339()),
            Predicate::NameExcludes(n) => write!(f, "NameExcludes({n:?})"),
            Predicate::IdExcludes(i) => write!(f, "IdExcludes({i:?})"),
            Predicate::NameDoesNotContain(s) => write!(f, "NameDoesNotContain({s:?})"),
            Predicate::NameMatchesAnyOf(p) => {
                let patterns: Vec<&str> = p.iter().map(Regex::as_str).collect();
                write!(f, "NameMatchesAnyOf({patterns:?})")
            }
            Predicate::LacksProtectionTag(t) => write!(f, "LacksProtectionTag({t:?})"),
            Predicate::NotIgnored(set) => write!(f, "NotIgnored({} entries)", set.len()),
        }
    }
}

/// Ordered conjunction of predicates
#[derive(Debug, Clone, Default)]
pub struct Filter {
    predicates: Vec<Predicate>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a predicate, evaluated after the ones already present
    pub fn then(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Append every predicate of `other`
    pub fn chain(mut self, other: Filter) -> Self {
        self.predicates.extend(other.predicates);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn accepts(&self, resource: &dyn Resource) -> bool {
        self.rejected_by(resource).is_none()
    }

    /// First predicate that rejects the resource, if any
    pub fn rejected_by(&self, resource: &dyn Resource) -> Option<&Predicate> {
        self.predicates.iter().find(|p| !p.accepts(resource))
    }
}

impl FromIterator<Predicate> for Filter {
    fn from_iter<I: IntoIterator<Item = Predicate>>(iter: I) -> Self {
        Self {
            predicates: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ignore::IgnoreEntry;
    use crate::resource::Kind;
    use crate::testing::StubResource;
    use chrono::Duration;

    #[test]
    fn test_older_than_is_strict() {
        let now = Utc::now();
        let at_threshold = StubResource::new(Kind::Port, "p", Duration::zero()).at(now);
        let before = StubResource::new(Kind::Port, "p", Duration::zero())
            .at(now - Duration::milliseconds(1));
        let p = Predicate::older_than(now);
        assert!(!p.accepts(&at_threshold));
        assert!(p.accepts(&before));
    }

    #[test]
    fn test_name_and_id_exclusion() {
        let metrics = StubResource::new(Kind::Server, "s1", Duration::hours(8)).named("metrics");
        let worker = StubResource::new(Kind::Server, "s2", Duration::hours(8)).named("worker-0");

        let by_name = Predicate::name_excludes(["metrics"]);
        assert!(!by_name.accepts(&metrics));
        assert!(by_name.accepts(&worker));

        let by_id = Predicate::id_excludes(["s2"]);
        assert!(by_id.accepts(&metrics));
        assert!(!by_id.accepts(&worker));
    }

    #[test]
    fn test_name_does_not_contain() {
        let p = Predicate::name_does_not_contain(["external", "lb-mgmt-net"]);
        let ext = StubResource::new(Kind::Network, "n1", Duration::hours(8)).named("my-external-net");
        let ci = StubResource::new(Kind::Network, "n2", Duration::hours(8)).named("ci-op-abc-network");
        assert!(!p.accepts(&ext));
        assert!(p.accepts(&ci));
    }

    #[test]
    fn test_name_matches_any_of() {
        let p = Predicate::name_matches_any_of([r".{8}-.{5}-.{5}-rhcos", r"rhcos-.{7,8}-.{5}"]).unwrap();
        let installer =
            StubResource::new(Kind::Image, "i1", Duration::hours(8)).named("ci-op-abc-x1y2z-q9w8e-rhcos");
        let user = StubResource::new(Kind::Image, "i2", Duration::hours(8)).named("cirros");
        assert!(p.accepts(&installer));
        assert!(!p.accepts(&user));
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(Predicate::name_matches_any_of(["(unclosed"]).is_err());
    }

    #[test]
    fn test_protection_tag() {
        let p = Predicate::lacks_protection_tag("shiftstack-prune=keep");
        let kept = StubResource::new(Kind::Router, "r1", Duration::hours(30))
            .tagged(&["openshiftClusterID=x", "shiftstack-prune=keep"]);
        let plain = StubResource::new(Kind::Router, "r2", Duration::hours(30)).tagged(&["a=b"]);
        let untaggable = StubResource::new(Kind::Volume, "v1", Duration::hours(30));
        assert!(!p.accepts(&kept));
        assert!(p.accepts(&plain));
        assert!(p.accepts(&untaggable));
    }

    #[test]
    fn test_not_ignored() {
        let set = IgnoreSet::from_entries([IgnoreEntry {
            kind: "trunk".to_string(),
            id: Some("t1".to_string()),
            name: None,
        }])
        .unwrap();
        let p = Predicate::not_ignored(Arc::new(set));
        assert!(!p.accepts(&StubResource::new(Kind::Trunk, "t1", Duration::hours(9))));
        assert!(p.accepts(&StubResource::new(Kind::Trunk, "t2", Duration::hours(9))));
    }

    #[test]
    fn test_filter_order_does_not_change_outcome() {
        let threshold = Utc::now() - Duration::hours(7);
        let resources = [
            StubResource::new(Kind::Router, "a", Duration::hours(10)),
            StubResource::new(Kind::Router, "b", Duration::hours(10)).named("dualstack"),
            StubResource::new(Kind::Router, "c", Duration::hours(2)),
            StubResource::new(Kind::Router, "d", Duration::hours(10)).tagged(&["keep"]),
        ];
        let forward = Filter::new()
            .then(Predicate::name_excludes(["dualstack"]))
            .then(Predicate::lacks_protection_tag("keep"))
            .then(Predicate::older_than(threshold));
        let backward: Filter = [
            Predicate::older_than(threshold),
            Predicate::lacks_protection_tag("keep"),
            Predicate::name_excludes(["dualstack"]),
        ]
        .into_iter()
        .collect();

        for r in &resources {
            assert_eq!(forward.accepts(r), backward.accepts(r), "{}", r.id);
        }
        let passing: Vec<&str> = resources
            .iter()
            .filter(|r| forward.accepts(*r))
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(passing, vec!["a"]);
    }

    #[test]
    fn test_rejected_by_reports_first_failure() {
        let filter = Filter::new()
            .then(Predicate::id_excludes(["x"]))
            .chain(Filter::new().then(Predicate::name_excludes(["x"])));
        assert_eq!(filter.len(), 2);
        let r = StubResource::new(Kind::Port, "x", Duration::hours(1));
        assert!(matches!(filter.rejected_by(&r), Some(Predicate::IdExcludes(_))));
        assert!(Filter::new().accepts(&r));
    }
}
