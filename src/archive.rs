//! Archive packaging of generated output.
//!
//! After on-disk generation the output directory can be bundled into a single
//! gzip-compressed tarball and removed. Cleanup is best-effort: a directory that
//! cannot be removed is logged and left behind.

use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use crate::codegen::{CrudPipeline, GenerationReport};
use crate::error::{GenerateError, Result};

/// Location and size of a written archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSummary {
    pub path: PathBuf,
    pub bytes: u64,
}

/// Archive name used by [`generate_and_archive`]: `generated-crud-<epoch millis>.tar.gz`
pub fn default_archive_name() -> String {
    format!("generated-crud-{}.tar.gz", chrono::Utc::now().timestamp_millis())
}

/// Write the contents of `source_dir` (not the directory itself) to `archive_path`.
///
/// A relative `archive_path` is resolved against the current directory.
pub fn create_archive(source_dir: &Path, archive_path: &Path) -> Result<ArchiveSummary> {
    if !source_dir.is_dir() {
        return Err(GenerateError::Archive(format!(
            "Nothing to archive, {} is not a directory",
            source_dir.display()
        )));
    }

    let path = if archive_path.is_absolute() {
        archive_path.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|e| GenerateError::io(archive_path, e))?
            .join(archive_path)
    };

    let file = File::create(&path).map_err(|e| GenerateError::io(&path, e))?;
    let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::best()));
    builder
        .append_dir_all(".", source_dir)
        .map_err(|e| GenerateError::Archive(format!("Failed to add {}: {}", source_dir.display(), e)))?;
    builder
        .into_inner()
        .and_then(|encoder| encoder.finish())
        .map_err(|e| GenerateError::Archive(format!("Failed to finish {}: {}", path.display(), e)))?;

    let bytes = fs::metadata(&path)
        .map_err(|e| GenerateError::io(&path, e))?
        .len();
    tracing::info!("Archive created: {} ({} bytes)", path.display(), bytes);

    Ok(ArchiveSummary { path, bytes })
}

/// Remove a generated output directory, logging instead of failing
pub fn remove_output_dir(dir: &Path) -> bool {
    match fs::remove_dir_all(dir) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Could not remove {}: {}", dir.display(), e);
            false
        }
    }
}

/// Generate to disk, archive the output directory, then remove it
pub fn generate_and_archive(
    pipeline: &CrudPipeline<'_>,
    archive_path: Option<&Path>,
) -> Result<(GenerationReport, ArchiveSummary)> {
    let report = pipeline.generate_to_disk()?;

    let name = archive_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(default_archive_name()));
    let summary = create_archive(&report.output_dir, &name)?;

    remove_output_dir(&report.output_dir);
    Ok((report, summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use tempfile::TempDir;

    fn entry_names(archive: &Path) -> Vec<String> {
        let mut archive = tar::Archive::new(GzDecoder::new(File::open(archive).unwrap()));
        let mut names: Vec<String> = archive
            .entries()
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.header().entry_type().is_file())
            .map(|e| e.path().unwrap().to_string_lossy().trim_start_matches("./").to_string())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_archive_contains_directory_contents() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("out");
        fs::create_dir_all(source.join("user/dto")).unwrap();
        fs::write(source.join("user/user.module.ts"), "module").unwrap();
        fs::write(source.join("user/dto/create-user.dto.ts"), "dto").unwrap();

        let summary = create_archive(&source, &temp_dir.path().join("out.tar.gz")).unwrap();
        assert!(summary.bytes > 0);
        assert_eq!(
            entry_names(&summary.path),
            vec!["user/dto/create-user.dto.ts", "user/user.module.ts"]
        );
    }

    #[test]
    fn test_missing_source_dir_is_an_archive_error() {
        let temp_dir = TempDir::new().unwrap();
        let err = create_archive(&temp_dir.path().join("missing"), &temp_dir.path().join("a.tar.gz"))
            .unwrap_err();
        assert!(matches!(err, GenerateError::Archive(_)));
    }

    #[test]
    fn test_default_archive_name_shape() {
        let name = default_archive_name();
        assert!(name.starts_with("generated-crud-"));
        assert!(name.ends_with(".tar.gz"));
    }

    #[test]
    fn test_remove_missing_dir_is_not_fatal() {
        let temp_dir = TempDir::new().unwrap();
        assert!(!remove_output_dir(&temp_dir.path().join("missing")));
    }
}
