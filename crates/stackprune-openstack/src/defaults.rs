//! Per-kind name rules that keep shared infrastructure out of reach
//!
//! These run before the run-wide filter, for every run.

use stackprune_cloud::{Filter, Kind, Predicate, Result};

/// Servers that host the CI metrics stack
pub const KEEP_SERVER_NAMES: &[&str] = &["metrics"];

/// The router of the dual-stack test network
pub const KEEP_ROUTER_NAMES: &[&str] = &["dualstack"];

/// Fragments of provider and management network names
pub const KEEP_NETWORK_FRAGMENTS: &[&str] = &[
    "lb-mgmt-net",
    "octavia-provider-net",
    "hostonly",
    "external",
    "sahara-access",
    "mellanox",
    "intel",
    "public",
    "provider",
];

pub const KEEP_SECURITY_GROUP_NAMES: &[&str] = &["default", "ssh", "allow_ssh", "allow_ping"];

pub const KEEP_CONTAINER_NAMES: &[&str] = &["shiftstack-metrics", "shiftstack-bot"];

/// Only images the installer uploads are candidates
pub const INSTALLER_IMAGE_PATTERNS: &[&str] = &[
    ".{8}-.{5}-.{5}-ignition",
    ".{8}-.{5}-.{5}-rhcos",
    "bootstrap-ign-.{8}-.{5}-.{5}",
    "rhcos-.{7,8}-.{5}",
];

/// The default rules, one filter per affected kind
pub fn default_rules() -> Result<Vec<(Kind, Filter)>> {
    Ok(vec![
        (
            Kind::Server,
            Filter::new().then(Predicate::name_excludes(KEEP_SERVER_NAMES.iter().copied())),
        ),
        (
            Kind::Router,
            Filter::new().then(Predicate::name_excludes(KEEP_ROUTER_NAMES.iter().copied())),
        ),
        (
            Kind::Network,
            Filter::new().then(Predicate::name_does_not_contain(
                KEEP_NETWORK_FRAGMENTS.iter().copied(),
            )),
        ),
        (
            Kind::SecurityGroup,
            Filter::new().then(Predicate::name_excludes(
                KEEP_SECURITY_GROUP_NAMES.iter().copied(),
            )),
        ),
        (
            Kind::Container,
            Filter::new().then(Predicate::name_excludes(KEEP_CONTAINER_NAMES.iter().copied())),
        ),
        (
            Kind::Image,
            Filter::new().then(Predicate::name_matches_any_of(INSTALLER_IMAGE_PATTERNS)?),
        ),
    ])
}
