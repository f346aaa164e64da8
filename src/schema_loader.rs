//! Loader for introspected schema models.
//!
//! The introspection engine is external; it hands over its model as YAML or JSON.
//! Supported layouts:
//! - a single file holding a list of entities
//! - a single file with an `entities:` key
//! - a directory of such files (read in file-name order)

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{GenerateError, Result};
use crate::schema::Entity;

/// Wrapper for documents that nest entities under a key
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SchemaDocument {
    List(Vec<Entity>),
    Wrapped { entities: Vec<Entity> },
}

impl SchemaDocument {
    fn into_entities(self) -> Vec<Entity> {
        match self {
            SchemaDocument::List(entities) => entities,
            SchemaDocument::Wrapped { entities } => entities,
        }
    }
}

/// Load a schema model from a file or directory
///
/// # Example
///
/// ```ignore
/// use crudforge::load_schema;
///
/// let entities = load_schema("config/examples/blog/schema.yaml").unwrap();
/// ```
pub fn load_schema<P: AsRef<Path>>(path: P) -> Result<Vec<Entity>> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(GenerateError::Schema(format!(
            "Schema path does not exist: {}",
            path.display()
        )));
    }

    let entities = if path.is_dir() {
        let mut entities = Vec::new();
        for file in schema_files(path)? {
            entities.extend(load_schema_file(&file)?);
        }
        entities
    } else {
        load_schema_file(path)?
    };

    tracing::debug!("Loaded {} entities from {}", entities.len(), path.display());
    Ok(entities)
}

/// Parse a schema model from YAML text.
///
/// JSON is valid YAML, so this accepts both.
pub fn parse_schema(contents: &str) -> Result<Vec<Entity>> {
    let document: SchemaDocument = serde_yaml::from_str(contents)
        .map_err(|e| GenerateError::Schema(format!("Failed to parse schema: {}", e)))?;

    let entities = document.into_entities();
    for entity in &entities {
        entity.validate()?;
    }
    Ok(entities)
}

fn load_schema_file(path: &Path) -> Result<Vec<Entity>> {
    let contents = fs::read_to_string(path).map_err(|e| GenerateError::io(path, e))?;

    parse_schema(&contents).map_err(|e| match e {
        GenerateError::Schema(msg) => {
            GenerateError::Schema(format!("{}: {}", path.display(), msg))
        }
        other => other,
    })
}

fn schema_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let read_dir = fs::read_dir(dir).map_err(|e| GenerateError::io(dir, e))?;

    let mut files = Vec::new();
    for entry in read_dir {
        let path = entry.map_err(|e| GenerateError::io(dir, e))?.path();
        if !path.is_file() {
            continue;
        }
        if let Some(ext) = path.extension().and_then(|ext| ext.to_str()) {
            if matches!(ext, "yaml" | "yml" | "json") {
                files.push(path);
            }
        }
    }
    files.sort();
    Ok(files)
}
