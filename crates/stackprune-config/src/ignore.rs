//! Ignore file discovery and loading
//!
//! The ignore file is a YAML (or JSON) list of `{type, id?, name?}` entries.
//! Lookup order:
//! 1. An explicit path (`--ignore-file`), which must exist
//! 2. `STACKPRUNE_IGNORE_FILE`, which must exist when set
//! 3. `~/.config/stackprune/ignore.yaml`, used only if present

use crate::error::{ConfigError, Result};
use crate::get_config_dir;
use stackprune_cloud::{IgnoreEntry, IgnoreSet};
use std::path::{Path, PathBuf};

pub const IGNORE_FILE_ENV: &str = "STACKPRUNE_IGNORE_FILE";
const DEFAULT_IGNORE_FILE: &str = "ignore.yaml";

/// Locate the ignore file; `Ok(None)` means the run has no ignore set
pub fn find_ignore_file(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        return existing(path.to_path_buf()).map(Some);
    }

    if let Ok(path) = std::env::var(IGNORE_FILE_ENV) {
        if !path.is_empty() {
            return existing(PathBuf::from(path)).map(Some);
        }
    }

    if let Ok(config_dir) = get_config_dir() {
        let default = config_dir.join(DEFAULT_IGNORE_FILE);
        if default.exists() {
            return Ok(Some(default));
        }
    }

    Ok(None)
}

fn existing(path: PathBuf) -> Result<PathBuf> {
    if path.exists() {
        Ok(path)
    } else {
        Err(ConfigError::IgnoreFileNotFound(path))
    }
}

/// Parse an ignore file into a validated set
pub fn load_ignore_file(path: &Path) -> Result<IgnoreSet> {
    let content = std::fs::read_to_string(path)?;
    parse_ignore(&content, path)
}

fn parse_ignore(content: &str, path: &Path) -> Result<IgnoreSet> {
    // An empty file is an empty list.
    if content.trim().is_empty() {
        return Ok(IgnoreSet::new());
    }
    let entries: Vec<IgnoreEntry> =
        serde_yaml::from_str(content).map_err(|source| ConfigError::IgnoreFileParse {
            path: path.to_path_buf(),
            source,
        })?;
    IgnoreSet::from_entries(entries).map_err(|source| ConfigError::IgnoreFileInvalid {
        path: path.to_path_buf(),
        source,
    })
}

/// Find and load the ignore set in one step
pub fn resolve_ignore_set(explicit: Option<&Path>) -> Result<IgnoreSet> {
    match find_ignore_file(explicit)? {
        Some(path) => {
            let set = load_ignore_file(&path)?;
            tracing::info!("Loaded {} ignore entries from {}", set.len(), path.display());
            Ok(set)
        }
        None => Ok(IgnoreSet::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    #[test]
    fn test_load_yaml() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("ignore.yaml");
        fs::write(
            &path,
            "- type: volumes\n  id: 0b6c4e1a\n- type: server\n  name: bastion\n",
        )
        .unwrap();

        let set = load_ignore_file(&path).unwrap();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_load_json() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("ignore.json");
        fs::write(
            &path,
            r#"[{"type": "trunk", "id": "t1"}, {"type": "images", "name": "cirros", "id": "i1"}]"#,
        )
        .unwrap();

        let set = load_ignore_file(&path).unwrap();
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_empty_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("ignore.yaml");
        fs::write(&path, "\n").unwrap();
        assert!(load_ignore_file(&path).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("ignore.yaml");
        fs::write(&path, "- type: buckets\n  id: b1\n").unwrap();
        assert!(matches!(
            load_ignore_file(&path),
            Err(ConfigError::IgnoreFileInvalid { .. })
        ));
    }

    #[test]
    fn test_malformed_file_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("ignore.yaml");
        fs::write(&path, "type: volumes\n").unwrap();
        assert!(matches!(
            load_ignore_file(&path),
            Err(ConfigError::IgnoreFileParse { .. })
        ));
    }

    #[test]
    #[serial]
    fn test_explicit_path_must_exist() {
        let temp_dir = tempfile::tempdir().unwrap();
        let missing = temp_dir.path().join("nope.yaml");
        let result = find_ignore_file(Some(&missing));
        assert!(matches!(result, Err(ConfigError::IgnoreFileNotFound(_))));
    }

    #[test]
    #[serial]
    fn test_env_var_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("custom.yaml");
        fs::write(&path, "- type: port\n  name: keepme\n").unwrap();

        temp_env::with_var(IGNORE_FILE_ENV, Some(path.as_os_str()), || {
            let found = find_ignore_file(None).unwrap();
            assert_eq!(found, Some(path.clone()));
            assert_eq!(resolve_ignore_set(None).unwrap().len(), 1);
        });
    }

    #[test]
    #[serial]
    fn test_explicit_path_beats_env_var() {
        let temp_dir = tempfile::tempdir().unwrap();
        let explicit = temp_dir.path().join("explicit.yaml");
        fs::write(&explicit, "").unwrap();

        temp_env::with_var(IGNORE_FILE_ENV, Some("/does/not/exist.yaml"), || {
            assert_eq!(find_ignore_file(Some(&explicit)).unwrap(), Some(explicit.clone()));
        });
    }

    #[test]
    #[serial]
    fn test_default_ignore_file_in_config_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        temp_env::with_vars(
            [
                (IGNORE_FILE_ENV, None),
                ("HOME", Some(temp_dir.path().as_os_str())),
                ("XDG_CONFIG_HOME", Some(temp_dir.path().as_os_str())),
            ],
            || {
                let config_dir = get_config_dir().unwrap();
                assert!(config_dir.ends_with("stackprune"));
                fs::create_dir_all(&config_dir).unwrap();
                fs::write(config_dir.join("ignore.yaml"), "- type: network\n  name: shared\n").unwrap();

                let found = find_ignore_file(None).unwrap();
                assert_eq!(found, Some(config_dir.join("ignore.yaml")));
                assert_eq!(resolve_ignore_set(None).unwrap().len(), 1);
            },
        );
    }

    #[test]
    #[serial]
    fn test_no_ignore_file_anywhere() {
        let temp_dir = tempfile::tempdir().unwrap();
        temp_env::with_vars(
            [
                (IGNORE_FILE_ENV, None),
                ("HOME", Some(temp_dir.path().as_os_str())),
                ("XDG_CONFIG_HOME", Some(temp_dir.path().as_os_str())),
            ],
            || {
                assert_eq!(find_ignore_file(None).unwrap(), None);
                assert!(resolve_ignore_set(None).unwrap().is_empty());
            },
        );
    }
}
