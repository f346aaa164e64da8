//! Template-driven code generation.
//!
//! Entities flow through the [`pipeline`] one at a time: the [`file_group`]
//! generator renders every template kind with helpers bound to the invocation's
//! configuration, the [`format`] stage canonicalizes the text, and the result is
//! either returned in memory or committed to disk by [`fs_utils`].

pub mod file_group;
pub mod format;
pub mod fs_utils;
pub mod helpers;
pub mod naming;
pub mod pipeline;
pub mod render;
pub mod templates;

pub use file_group::{FileGroupGenerator, GeneratedFile};
pub use format::{convert_eol, PassthroughFormatter, PrettierFormatter, SourceFormatter};
pub use helpers::{Diagnostic, Diagnostics, HelperRegistry};
pub use pipeline::{
    CrudPipeline, GeneratedFileSet, GeneratedSources, GenerationReport, SourceMap, INDEX_FILE,
};
pub use render::Renderer;
pub use templates::{TemplateKind, TemplateSet};
