//! # Crudforge: NestJS CRUD scaffolding from database schemas
//!
//! Crudforge turns an introspected schema model into a complete NestJS module per
//! table: TypeORM entity, create/update/pagination DTOs, service, controller and
//! module, all sharing the same naming, typing and annotation choices.
//!
//! ## Features
//!
//! - **Deterministic file groups**: every entity yields the same set of files with
//!   consistent case conventions across all of them
//! - **Per-invocation helpers**: template helpers are bound to one configuration and
//!   never leak into another run
//! - **Two output modes**: compute sources in memory, or write them atomically to disk
//! - **Pluggable formatting**: prettier by default in the CLI, any closure in code
//!
//! ## Example: schema
//!
//! ```yaml
//! entities:
//!   - sqlName: user_profile
//!     tscName: user_profile
//!     columns:
//!       - tscName: id
//!         tscType: number
//!         dbType: int
//!         isPrimary: true
//!         isGenerated: true
//!       - tscName: display_name
//!         tscType: string
//!         dbType: varchar
//! ```
//!
//! ## Example: generation
//!
//! ```rust,no_run
//! use crudforge::{load_schema, CrudPipeline, GenerationConfig};
//!
//! let entities = load_schema("schema.yaml")?;
//! let config = GenerationConfig::from_file("generation.yaml")?;
//! let sources = CrudPipeline::new(&entities, &config).compute_crud_sources()?;
//! for name in sources.keys() {
//!     println!("{}", name);
//! }
//! # Ok::<(), crudforge::GenerateError>(())
//! ```

pub mod archive;
pub mod codegen;
pub mod config;
pub mod error;
pub mod schema;
pub mod schema_loader;

pub use archive::{create_archive, generate_and_archive, ArchiveSummary};
pub use codegen::{
    CrudPipeline, Diagnostic, GeneratedFileSet, GeneratedSources, GenerationReport,
    PassthroughFormatter, PrettierFormatter, SourceFormatter, SourceMap, TemplateKind, TemplateSet,
};
pub use config::{
    EntityCase, EolStyle, ExportType, FileCase, GenerationConfig, PropertyCase,
    PropertyVisibility, StrictMode,
};
pub use error::{FormatError, GenerateError, Result};
pub use schema::{filter_tables, strip_relations, Column, Entity, Relation, RelationId, RelationKind};
pub use schema_loader::{load_schema, parse_schema};
