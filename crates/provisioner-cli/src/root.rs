use anyhow::Context;
use std::path::{Path, PathBuf};

/// Marker file of an engine project directory.
pub const PROJECT_FILE: &str = "Pulumi.yaml";

/// Resolve the working directory for a run.
///
/// Priority:
/// 1. `--workdir` flag / `PROVISIONER_WORKDIR` env var (passed in as `explicit`)
/// 2. Walk upward from `cwd` looking for `Pulumi.yaml`
/// 3. Fall back to `cwd`
///
/// The result is absolute so relative program paths resolve predictably.
pub fn resolve_workdir(explicit: Option<&Path>) -> anyhow::Result<PathBuf> {
    if let Some(p) = explicit {
        return std::fs::canonicalize(p)
            .with_context(|| format!("working directory '{}' not found", p.display()));
    }

    let cwd = std::env::current_dir().context("cannot determine current directory")?;
    Ok(find_project_root(&cwd).unwrap_or(cwd))
}

/// Nearest directory at or above `start` containing [`PROJECT_FILE`].
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(PROJECT_FILE).is_file())
        .map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_workdir_wins() {
        let dir = TempDir::new().unwrap();
        let result = resolve_workdir(Some(dir.path())).unwrap();
        assert_eq!(result, std::fs::canonicalize(dir.path()).unwrap());
    }

    #[test]
    fn explicit_workdir_must_exist() {
        let dir = TempDir::new().unwrap();
        assert!(resolve_workdir(Some(&dir.path().join("missing"))).is_err());
    }

    #[test]
    fn finds_project_file_above() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(PROJECT_FILE), "name: mysql\n").unwrap();
        let deep = dir.path().join("infra/stacks");
        std::fs::create_dir_all(&deep).unwrap();
        assert_eq!(find_project_root(&deep).unwrap(), dir.path());
    }

    #[test]
    fn no_project_file() {
        let dir = TempDir::new().unwrap();
        let deep = dir.path().join("a/b");
        std::fs::create_dir_all(&deep).unwrap();
        // An ancestor of the temp dir could in theory hold the marker; only
        // check that the temp tree itself is not reported.
        let found = find_project_root(&deep);
        assert!(found.map_or(true, |p| !p.starts_with(dir.path())));
    }
}
