//! Per-entity file group generation.
//!
//! For one entity, renders each requested template kind against the context
//! `{ entity, entityName, primaryKey, generationConfig }` and passes the result
//! through the formatter. Writing is left to the caller so in-memory and on-disk output share
//! exactly the same content.

use minijinja::context;

use crate::codegen::format::{format_or_raw, SourceFormatter};
use crate::codegen::helpers::{to_entity_name, to_file_name};
use crate::codegen::render::Renderer;
use crate::codegen::templates::TemplateKind;
use crate::config::GenerationConfig;
use crate::error::Result;
use crate::schema::Entity;

/// One rendered and formatted file
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedFile {
    pub kind: TemplateKind,
    /// Bare file name, e.g. `create-user-profile.dto.ts`
    pub file_name: String,
    /// Path below the output root, e.g. `user-profile/dto/create-user-profile.dto.ts`
    pub relative_path: String,
    pub content: String,
}

pub struct FileGroupGenerator<'a> {
    renderer: &'a Renderer,
    config: &'a GenerationConfig,
    formatter: &'a dyn SourceFormatter,
}

impl<'a> FileGroupGenerator<'a> {
    pub fn new(
        renderer: &'a Renderer,
        config: &'a GenerationConfig,
        formatter: &'a dyn SourceFormatter,
    ) -> Self {
        Self {
            renderer,
            config,
            formatter,
        }
    }

    /// Render `kinds` for `entity`, stopping at the first render failure
    pub fn generate(&self, entity: &Entity, kinds: &[TemplateKind]) -> Result<Vec<GeneratedFile>> {
        kinds
            .iter()
            .map(|kind| self.render_file(entity, *kind))
            .collect()
    }

    pub fn render_file(&self, entity: &Entity, kind: TemplateKind) -> Result<GeneratedFile> {
        let entity_name = self.entity_name(entity);
        let base = self.file_base(entity);
        let file_name = kind.file_name(&base);

        let rendered = self.renderer.render(
            kind,
            &entity.tsc_name,
            context! {
                entity => entity,
                entityName => &entity_name,
                primaryKey => entity.primary_column(),
                generationConfig => self.config,
            },
        )?;
        let content = format_or_raw(self.formatter, rendered, self.config.convert_eol, &file_name);
        tracing::debug!("Rendered {} ({} bytes)", file_name, content.len());

        Ok(GeneratedFile {
            kind,
            relative_path: kind.relative_path(&base),
            file_name,
            content,
        })
    }

    /// Class name derived from the entity's canonical name
    pub fn entity_name(&self, entity: &Entity) -> String {
        to_entity_name(self.config, &entity.tsc_name)
    }

    /// File-case name used for the entity directory and file names
    pub fn file_base(&self, entity: &Entity) -> String {
        to_file_name(self.config, &entity.tsc_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::format::PassthroughFormatter;
    use crate::codegen::templates::TemplateSet;

    #[test]
    fn test_context_shape_reaches_template() {
        let templates = TemplateSet::builtin().with_override(
            TemplateKind::Module,
            "{{ entity.tscName }}|{{ entityName }}|{{ generationConfig.convertCaseFile }}",
        );
        let config = GenerationConfig::default();
        let renderer = Renderer::new(&config, &templates).unwrap();
        let generator = FileGroupGenerator::new(&renderer, &config, &PassthroughFormatter);

        let file = generator
            .render_file(&Entity::new("user_profile", "user_profile"), TemplateKind::Module)
            .unwrap();
        assert_eq!(file.content, "user_profile|UserProfile|param");
        assert_eq!(file.file_name, "user-profile.module.ts");
        assert_eq!(file.relative_path, "user-profile/user-profile.module.ts");
    }

    #[test]
    fn test_primary_key_in_context() {
        let templates = TemplateSet::builtin().with_override(
            TemplateKind::Module,
            "{{ primaryKey.tscName if primaryKey else 'none' }}",
        );
        let config = GenerationConfig::default();
        let renderer = Renderer::new(&config, &templates).unwrap();
        let generator = FileGroupGenerator::new(&renderer, &config, &PassthroughFormatter);

        let mut entity = Entity::new("tags", "tag");
        let without = generator.render_file(&entity, TemplateKind::Module).unwrap();
        assert_eq!(without.content, "none");

        let mut slug = crate::schema::Column::new("slug", "string", "varchar");
        slug.is_primary = true;
        entity.columns = vec![crate::schema::Column::new("label", "string", "varchar"), slug];
        let with = generator.render_file(&entity, TemplateKind::Module).unwrap();
        assert_eq!(with.content, "slug");
    }

    #[test]
    fn test_generate_renders_kinds_in_order() {
        let config = GenerationConfig::default();
        let renderer = Renderer::new(&config, &TemplateSet::builtin()).unwrap();
        let generator = FileGroupGenerator::new(&renderer, &config, &PassthroughFormatter);

        let files = generator
            .generate(&Entity::new("posts", "Post"), &TemplateKind::CRUD)
            .unwrap();
        let kinds: Vec<_> = files.iter().map(|f| f.kind).collect();
        assert_eq!(kinds, TemplateKind::CRUD.to_vec());
    }
}
