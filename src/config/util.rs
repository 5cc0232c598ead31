//! Configuration utility functions.

use std::path::{Path, PathBuf};

/// Find config file by searching upward from the current directory.
///
/// An absolute `config_name` is used as is.
///
/// # Example
/// ```text
/// /home/user/app/pages/fixtures/  ← cwd
/// /home/user/app/live.toml        ← found!
/// ```
pub fn find_config_file(config_name: &Path) -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    find_config_file_from(&cwd, config_name)
}

/// Walk up from `start` looking for `config_name`.
pub fn find_config_file_from(start: &Path, config_name: &Path) -> Option<PathBuf> {
    if config_name.is_absolute() {
        return config_name.exists().then(|| config_name.to_path_buf());
    }

    let mut current = start;
    loop {
        let candidate = current.join(config_name);
        if candidate.is_file() {
            return Some(candidate);
        }

        match current.parent() {
            Some(parent) => current = parent,
            None => return None,
        }
    }
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn test_find_in_parent() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("pages/fixtures");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join("live.toml"), "").unwrap();

        let found = find_config_file_from(&nested, Path::new("live.toml")).unwrap();
        assert_eq!(found, dir.path().join("live.toml"));
    }

    #[test]
    fn test_nearest_wins() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("app");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join("live.toml"), "").unwrap();
        fs::write(nested.join("live.toml"), "").unwrap();

        let found = find_config_file_from(&nested, Path::new("live.toml")).unwrap();
        assert_eq!(found, nested.join("live.toml"));
    }

    #[test]
    fn test_absolute_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        assert_eq!(find_config_file_from(dir.path(), &path), None);

        fs::write(&path, "").unwrap();
        assert_eq!(find_config_file_from(Path::new("/"), &path), Some(path));
    }

    #[test]
    fn test_directory_is_not_a_config() {
        let dir = tempfile::tempdir().unwrap();
        let start = dir.path().join("a");
        fs::create_dir_all(start.join("live.toml")).unwrap();
        let found = find_config_file_from(&start, Path::new("live.toml"));
        assert_ne!(found, Some(start.join("live.toml")));
    }
}
