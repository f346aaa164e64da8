//! Filesystem utilities for code generation

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{GenerateError, Result};

/// Write content to a file, creating parent directories if needed
pub fn write_file<P: AsRef<Path>, C: AsRef<[u8]>>(path: P, contents: C) -> io::Result<()> {
    let path = path.as_ref();

    // Create parent directories if they don't exist
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, contents)
}

/// Create a directory and its parents; an existing directory is not an error
pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    match fs::create_dir_all(path) {
        Ok(()) => Ok(()),
        // Lost a race with another creator of the same path
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && path.is_dir() => Ok(()),
        Err(e) => Err(GenerateError::io(path, e)),
    }
}

/// Write `files` below `root` all-or-nothing.
///
/// Everything is first written to a staging directory inside `root`; only when
/// every file is staged are they moved to their final paths, replacing existing
/// files of the same name. On failure the staging directory is removed and
/// `root` keeps its previous contents.
pub fn commit_files<'a, I>(root: &Path, files: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    ensure_dir(root)?;
    let staging = tempfile::Builder::new()
        .prefix(".crudforge-staging-")
        .tempdir_in(root)
        .map_err(|e| GenerateError::io(root, e))?;

    let mut staged = Vec::new();
    for (relative_path, content) in files {
        let staged_path = staging.path().join(relative_path);
        write_file(&staged_path, content).map_err(|e| GenerateError::io(&staged_path, e))?;
        staged.push((staged_path, root.join(relative_path)));
    }

    let mut written = Vec::with_capacity(staged.len());
    for (from, to) in staged {
        if let Some(parent) = to.parent() {
            ensure_dir(parent)?;
        }
        if cfg!(windows) && to.is_file() {
            fs::remove_file(&to).map_err(|e| GenerateError::io(&to, e))?;
        }
        fs::rename(&from, &to).map_err(|e| GenerateError::io(&to, e))?;
        written.push(to);
    }

    staging.close().map_err(|e| GenerateError::io(root, e))?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_ensure_dir_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("a/b");
        ensure_dir(&dir).unwrap();
        ensure_dir(&dir).unwrap();
        assert!(dir.is_dir());
    }

    #[test]
    fn test_commit_files_overwrites_and_cleans_staging() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("out");
        write_file(root.join("user/user.service.ts"), "old").unwrap();

        let written = commit_files(
            &root,
            vec![
                ("user/user.service.ts", "new"),
                ("user/dto/create-user.dto.ts", "dto"),
            ],
        )
        .unwrap();

        assert_eq!(written.len(), 2);
        assert_eq!(fs::read_to_string(root.join("user/user.service.ts")).unwrap(), "new");
        assert_eq!(fs::read_to_string(root.join("user/dto/create-user.dto.ts")).unwrap(), "dto");

        let leftovers: Vec<_> = fs::read_dir(&root)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with(".crudforge-staging-"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
