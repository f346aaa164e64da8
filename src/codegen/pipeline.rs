//! Generation pipeline across all entities.
//!
//! A [`CrudPipeline`] renders file groups for every entity in input order and
//! exposes the two output modes as separate operations: computing sources in
//! memory, and generating them to disk. Each operation builds its own renderer,
//! so helpers are registered exactly once per call and never shared with
//! another invocation.
//!
//! A render failure for any entity aborts the whole operation; nothing is
//! written to disk in that case.

use indexmap::IndexMap;
use minijinja::context;
use serde::Serialize;
use std::borrow::Cow;
use std::path::PathBuf;

use crate::codegen::file_group::{FileGroupGenerator, GeneratedFile};
use crate::codegen::format::{format_or_raw, PassthroughFormatter, SourceFormatter};
use crate::codegen::fs_utils;
use crate::codegen::helpers::Diagnostic;
use crate::codegen::render::Renderer;
use crate::codegen::templates::{TemplateKind, TemplateSet};
use crate::config::GenerationConfig;
use crate::error::Result;
use crate::schema::{strip_relations, Entity};

/// File name (or relative path) to formatted content, in generation order
pub type SourceMap = IndexMap<String, String>;

/// Relative path of the barrel file written when `indexFile` is enabled
pub const INDEX_FILE: &str = "index.ts";

/// Every file of one invocation, keyed by path relative to the output root
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeneratedFileSet {
    files: SourceMap,
    diagnostics: Vec<Diagnostic>,
}

impl GeneratedFileSet {
    /// Insert a file; an existing entry with the same path is replaced
    pub fn insert(&mut self, path: impl Into<String>, content: impl Into<String>) -> Option<String> {
        insert_last_wins(&mut self.files, path.into(), content.into())
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.files.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Missing-data diagnostics recorded by helpers while rendering
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_files(self) -> SourceMap {
        self.files
    }
}

/// Entity sources and CRUD sources computed in one pass
#[derive(Debug, Clone, Default)]
pub struct GeneratedSources {
    /// `<name>.entity.ts` to content
    pub entity_source: SourceMap,
    /// DTO, service, controller and module file names to content
    pub crud_source: SourceMap,
    pub diagnostics: Vec<Diagnostic>,
}

/// Outcome of an on-disk generation
#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub output_dir: PathBuf,
    pub entity_count: usize,
    pub written: Vec<PathBuf>,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Serialize)]
struct IndexEntry {
    #[serde(rename = "entityName")]
    entity_name: String,
    #[serde(rename = "fileName")]
    file_name: String,
}

struct RenderedRun {
    files: Vec<GeneratedFile>,
    index: Option<String>,
    diagnostics: Vec<Diagnostic>,
}

/// Code generation pipeline over a list of entities
pub struct CrudPipeline<'a> {
    entities: &'a [Entity],
    config: &'a GenerationConfig,
    formatter: Box<dyn SourceFormatter>,
    templates: TemplateSet,
}

impl<'a> CrudPipeline<'a> {
    /// Create a pipeline with built-in templates and no formatting
    pub fn new(entities: &'a [Entity], config: &'a GenerationConfig) -> Self {
        Self {
            entities,
            config,
            formatter: Box::new(PassthroughFormatter),
            templates: TemplateSet::builtin(),
        }
    }

    pub fn with_formatter(mut self, formatter: impl SourceFormatter + 'static) -> Self {
        self.formatter = Box::new(formatter);
        self
    }

    pub fn with_templates(mut self, templates: TemplateSet) -> Self {
        self.templates = templates;
        self
    }

    pub fn config(&self) -> &GenerationConfig {
        self.config
    }

    /// Entities as the templates will see them
    ///
    /// Relation data is stripped here when related tables are excluded.
    /// Every operation validates them with [`Entity::validate`] before rendering.
    pub fn prepared_entities(&self) -> Cow<'a, [Entity]> {
        if self.config.include_related_tables {
            Cow::Borrowed(self.entities)
        } else {
            let mut entities = self.entities.to_vec();
            strip_relations(&mut entities);
            Cow::Owned(entities)
        }
    }

    /// CRUD sources keyed by file name: three DTOs, service, controller and module per entity
    pub fn compute_crud_sources(&self) -> Result<SourceMap> {
        let run = self.render(&TemplateKind::CRUD, false)?;
        Ok(by_file_name(run.files))
    }

    /// Entity definitions keyed by `<name>.entity.ts`
    pub fn compute_entity_sources(&self) -> Result<SourceMap> {
        let run = self.render(&[TemplateKind::Entity], false)?;
        Ok(by_file_name(run.files))
    }

    /// Entity and CRUD sources from a single rendering pass
    pub fn compute_sources(&self) -> Result<GeneratedSources> {
        let run = self.render(&TemplateKind::ALL, false)?;
        let (entity_files, crud_files): (Vec<_>, Vec<_>) = run
            .files
            .into_iter()
            .partition(|file| file.kind == TemplateKind::Entity);

        Ok(GeneratedSources {
            entity_source: by_file_name(entity_files),
            crud_source: by_file_name(crud_files),
            diagnostics: run.diagnostics,
        })
    }

    /// Every file of the on-disk layout, keyed by relative path, without touching disk
    pub fn compute_file_set(&self) -> Result<GeneratedFileSet> {
        let run = self.render(&TemplateKind::ALL, true)?;

        let mut set = GeneratedFileSet::default();
        for file in run.files {
            set.insert(file.relative_path, file.content);
        }
        if let Some(index) = run.index {
            set.insert(INDEX_FILE, index);
        }
        set.diagnostics = run.diagnostics;
        Ok(set)
    }

    /// Render every file group and write it below `config.results_path`.
    ///
    /// Nothing is written unless every entity rendered successfully.
    pub fn generate_to_disk(&self) -> Result<GenerationReport> {
        let set = self.compute_file_set()?;
        let root = &self.config.results_path;

        let written = fs_utils::commit_files(root, set.iter())?;
        tracing::info!("Wrote {} files to {}", written.len(), root.display());

        Ok(GenerationReport {
            output_dir: root.clone(),
            entity_count: self.entities.len(),
            written,
            diagnostics: set.diagnostics,
        })
    }

    fn render(&self, kinds: &[TemplateKind], with_index: bool) -> Result<RenderedRun> {
        let entities = self.prepared_entities();
        // Names become directory and file names; reject them before anything is rendered
        for entity in entities.iter() {
            entity.validate()?;
        }

        let renderer = Renderer::new(self.config, &self.templates)?;
        let generator = FileGroupGenerator::new(&renderer, self.config, self.formatter.as_ref());

        let mut files = Vec::with_capacity(entities.len() * kinds.len());
        for entity in entities.iter() {
            tracing::info!("Generating {} file(s) for {}", kinds.len(), entity.tsc_name);
            files.extend(generator.generate(entity, kinds)?);
        }

        let index = if with_index && self.config.index_file {
            let entries: Vec<IndexEntry> = entities
                .iter()
                .map(|entity| IndexEntry {
                    entity_name: generator.entity_name(entity),
                    file_name: generator.file_base(entity),
                })
                .collect();
            let rendered = renderer.render_index(context! {
                entities => entries,
                generationConfig => self.config,
            })?;
            Some(format_or_raw(
                self.formatter.as_ref(),
                rendered,
                self.config.convert_eol,
                INDEX_FILE,
            ))
        } else {
            None
        };

        Ok(RenderedRun {
            files,
            index,
            diagnostics: renderer.diagnostics().snapshot(),
        })
    }
}

fn by_file_name(files: Vec<GeneratedFile>) -> SourceMap {
    let mut map = SourceMap::with_capacity(files.len());
    for file in files {
        insert_last_wins(&mut map, file.file_name, file.content);
    }
    map
}

/// Entities whose names transform to the same file name overwrite each other
fn insert_last_wins(map: &mut SourceMap, key: String, content: String) -> Option<String> {
    let previous = map.insert(key.clone(), content);
    if previous.is_some() {
        tracing::warn!("Generated file {} was produced more than once; keeping the last one", key);
    }
    previous
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_set_insert_is_last_write_wins() {
        let mut set = GeneratedFileSet::default();
        assert!(set.insert("a/a.service.ts", "first").is_none());
        assert_eq!(set.insert("a/a.service.ts", "second").as_deref(), Some("first"));
        assert_eq!(set.len(), 1);
        assert_eq!(set.get("a/a.service.ts"), Some("second"));
    }

    #[test]
    fn test_prepared_entities_borrow_when_relations_kept() {
        let entities = vec![Entity::new("users", "User")];
        let config = GenerationConfig::default();
        let pipeline = CrudPipeline::new(&entities, &config);
        assert!(matches!(pipeline.prepared_entities(), Cow::Borrowed(_)));
    }

    #[test]
    fn test_empty_entity_list_produces_nothing() {
        let config = GenerationConfig::default();
        let pipeline = CrudPipeline::new(&[], &config);
        assert!(pipeline.compute_crud_sources().unwrap().is_empty());
        assert!(pipeline.compute_file_set().unwrap().is_empty());
    }
}
