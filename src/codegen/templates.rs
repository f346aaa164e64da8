//! Template kinds and their sources.
//!
//! Built-in templates live under `templates/` and are compiled into the binary.
//! A [`TemplateSet`] can override any of them, either one at a time or from a
//! directory that mirrors the built-in layout.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{GenerateError, Result};

/// Kind of file generated for an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateKind {
    CreateDto,
    UpdateDto,
    PaginationDto,
    Service,
    Controller,
    Module,
    Entity,
}

/// Name of the template that renders the `index.ts` barrel
pub const INDEX_TEMPLATE: &str = "index.ts.jinja";

const INDEX_SOURCE: &str = include_str!("../../templates/index.ts.jinja");

impl TemplateKind {
    /// CRUD scaffolding kinds, in generation order
    pub const CRUD: [TemplateKind; 6] = [
        TemplateKind::CreateDto,
        TemplateKind::UpdateDto,
        TemplateKind::PaginationDto,
        TemplateKind::Service,
        TemplateKind::Controller,
        TemplateKind::Module,
    ];

    /// Every kind of a complete file group
    pub const ALL: [TemplateKind; 7] = [
        TemplateKind::Entity,
        TemplateKind::CreateDto,
        TemplateKind::UpdateDto,
        TemplateKind::PaginationDto,
        TemplateKind::Service,
        TemplateKind::Controller,
        TemplateKind::Module,
    ];

    /// Template name, relative to the templates directory
    pub fn template_name(&self) -> &'static str {
        match self {
            TemplateKind::CreateDto => "dto/create.dto.ts.jinja",
            TemplateKind::UpdateDto => "dto/update.dto.ts.jinja",
            TemplateKind::PaginationDto => "dto/pagination.dto.ts.jinja",
            TemplateKind::Service => "service.ts.jinja",
            TemplateKind::Controller => "controller.ts.jinja",
            TemplateKind::Module => "module.ts.jinja",
            TemplateKind::Entity => "entity.ts.jinja",
        }
    }

    pub fn builtin_source(&self) -> &'static str {
        match self {
            TemplateKind::CreateDto => include_str!("../../templates/dto/create.dto.ts.jinja"),
            TemplateKind::UpdateDto => include_str!("../../templates/dto/update.dto.ts.jinja"),
            TemplateKind::PaginationDto => {
                include_str!("../../templates/dto/pagination.dto.ts.jinja")
            }
            TemplateKind::Service => include_str!("../../templates/service.ts.jinja"),
            TemplateKind::Controller => include_str!("../../templates/controller.ts.jinja"),
            TemplateKind::Module => include_str!("../../templates/module.ts.jinja"),
            TemplateKind::Entity => include_str!("../../templates/entity.ts.jinja"),
        }
    }

    /// Generated file name for an entity whose file-case name is `base`
    pub fn file_name(&self, base: &str) -> String {
        match self {
            TemplateKind::CreateDto => format!("create-{}.dto.ts", base),
            TemplateKind::UpdateDto => format!("update-{}.dto.ts", base),
            TemplateKind::PaginationDto => format!("pagination-{}.dto.ts", base),
            TemplateKind::Service => format!("{}.service.ts", base),
            TemplateKind::Controller => format!("{}.controller.ts", base),
            TemplateKind::Module => format!("{}.module.ts", base),
            TemplateKind::Entity => format!("{}.entity.ts", base),
        }
    }

    /// Subdirectory inside the entity directory, if any
    pub fn subdirectory(&self) -> Option<&'static str> {
        match self {
            TemplateKind::CreateDto | TemplateKind::UpdateDto | TemplateKind::PaginationDto => {
                Some("dto")
            }
            TemplateKind::Entity => Some("entity"),
            TemplateKind::Service | TemplateKind::Controller | TemplateKind::Module => None,
        }
    }

    /// Output path relative to the output root, always `/`-separated
    pub fn relative_path(&self, base: &str) -> String {
        match self.subdirectory() {
            Some(sub) => format!("{}/{}/{}", base, sub, self.file_name(base)),
            None => format!("{}/{}", base, self.file_name(base)),
        }
    }
}

/// Template sources used by one invocation
#[derive(Debug, Clone, Default)]
pub struct TemplateSet {
    overrides: HashMap<TemplateKind, String>,
    index_override: Option<String>,
}

impl TemplateSet {
    /// The compiled-in templates
    pub fn builtin() -> Self {
        Self::default()
    }

    /// Replace the source of one template kind
    pub fn with_override(mut self, kind: TemplateKind, source: impl Into<String>) -> Self {
        self.overrides.insert(kind, source.into());
        self
    }

    /// Read overrides from a directory laid out like `templates/`.
    ///
    /// Kinds with no file in `dir` keep the built-in source.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(GenerateError::Config(format!(
                "Template directory does not exist: {}",
                dir.display()
            )));
        }

        let mut set = Self::builtin();
        for kind in TemplateKind::ALL {
            let path = dir.join(kind.template_name());
            if path.is_file() {
                let source = fs::read_to_string(&path).map_err(|e| GenerateError::io(&path, e))?;
                tracing::debug!("Using template override {}", path.display());
                set.overrides.insert(kind, source);
            }
        }
        let index_path = dir.join(INDEX_TEMPLATE);
        if index_path.is_file() {
            let source =
                fs::read_to_string(&index_path).map_err(|e| GenerateError::io(&index_path, e))?;
            set.index_override = Some(source);
        }
        Ok(set)
    }

    pub fn source(&self, kind: TemplateKind) -> &str {
        self.overrides
            .get(&kind)
            .map(String::as_str)
            .unwrap_or_else(|| kind.builtin_source())
    }

    pub fn index_source(&self) -> &str {
        self.index_override.as_deref().unwrap_or(INDEX_SOURCE)
    }
}
