//! Error types for schema loading, rendering and output.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Error type for a generation run
#[derive(Debug)]
pub enum GenerateError {
    /// Generation configuration could not be parsed or holds an unknown choice
    Config(String),
    /// Schema model is missing, unreadable or violates an entity invariant
    Schema(String),
    /// A template failed to compile or render
    Template {
        template: String,
        entity: String,
        message: String,
    },
    /// Filesystem failure while staging or writing output
    Io {
        path: PathBuf,
        source: io::Error,
    },
    /// Archive packaging failed
    Archive(String),
}

impl GenerateError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        GenerateError::Io {
            path: path.into(),
            source,
        }
    }
}

impl fmt::Display for GenerateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerateError::Config(msg) => write!(f, "Configuration error: {}", msg),
            GenerateError::Schema(msg) => write!(f, "Schema error: {}", msg),
            GenerateError::Template {
                template,
                entity,
                message,
            } => write!(
                f,
                "Failed to render template '{}' for entity '{}': {}",
                template, entity, message
            ),
            GenerateError::Io { path, source } => {
                write!(f, "I/O error at {}: {}", path.display(), source)
            }
            GenerateError::Archive(msg) => write!(f, "Archive error: {}", msg),
        }
    }
}

impl std::error::Error for GenerateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GenerateError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, GenerateError>;

/// Error returned by a source formatter.
///
/// Never surfaced to callers of the pipeline; the raw rendered text is used instead.
#[derive(Debug, Clone)]
pub struct FormatError(pub String);

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Format error: {}", self.0)
    }
}

impl std::error::Error for FormatError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_error_display() {
        let err = GenerateError::Template {
            template: "service.ts".to_string(),
            entity: "User".to_string(),
            message: "unexpected end of input".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to render template 'service.ts' for entity 'User': unexpected end of input"
        );
    }

    #[test]
    fn test_io_error_exposes_source() {
        use std::error::Error;

        let err = GenerateError::io("/tmp/out", io::Error::new(io::ErrorKind::Other, "disk full"));
        assert!(err.to_string().contains("/tmp/out"));
        assert!(err.source().is_some());
    }
}
