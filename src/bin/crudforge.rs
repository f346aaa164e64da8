//! crudforge CLI - NestJS CRUD scaffolding from introspected schemas
//!
//! Reads a schema model (YAML or JSON, as produced by the introspection step)
//! plus an optional generation config, and writes one module per table.

use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process;

use crudforge::{
    filter_tables, generate_and_archive, load_schema, CrudPipeline, Entity, GenerationConfig,
    PrettierFormatter, TemplateSet,
};

#[derive(Parser)]
#[command(name = "crudforge")]
#[command(version, about = "Generate NestJS CRUD modules from database schemas", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Clone)]
struct SchemaArgs {
    /// Schema file or directory of schema files (prompted for when omitted)
    #[arg(short, long, env = "CRUDFORGE_SCHEMA")]
    schema: Option<PathBuf>,

    /// Generation config (YAML or JSON); defaults apply to missing keys
    #[arg(short, long, env = "CRUDFORGE_CONFIG")]
    config: Option<PathBuf>,

    /// Only process these tables (comma-separated)
    #[arg(long, value_delimiter = ',')]
    only_tables: Vec<String>,

    /// Tables to skip (comma-separated)
    #[arg(long, value_delimiter = ',')]
    skip_tables: Vec<String>,

    /// Add Swagger decorators to controllers and DTOs
    #[arg(long)]
    swagger: bool,

    /// Directory of template overrides laid out like the built-in templates
    #[arg(long)]
    templates: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate files to disk
    Generate {
        #[command(flatten)]
        schema: SchemaArgs,

        /// Output directory (overrides resultsPath from the config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip prettier and keep rendered sources as-is
        #[arg(long)]
        no_format: bool,

        /// Bundle the output into a .tar.gz and remove the directory
        #[arg(long)]
        archive: bool,
    },

    /// Render in memory and list the files that would be generated
    Preview {
        #[command(flatten)]
        schema: SchemaArgs,

        /// Print the content of one generated file instead of the listing
        #[arg(short, long)]
        file: Option<String>,
    },
}

fn main() {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate {
            schema,
            output,
            no_format,
            archive,
        } => generate(schema, output, no_format, archive),
        Commands::Preview { schema, file } => preview(schema, file),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn generate(
    args: SchemaArgs,
    output: Option<PathBuf>,
    no_format: bool,
    archive: bool,
) -> Result<(), String> {
    let (entities, mut config, templates) = load_inputs(&args)?;
    if let Some(output) = output {
        config = config.with_results_path(output);
    }
    println!("🔧 Generating {} entities into {}...", entities.len(), config.results_path.display());

    let mut pipeline = CrudPipeline::new(&entities, &config).with_templates(templates);
    if !no_format {
        pipeline = pipeline.with_formatter(PrettierFormatter::default());
    }

    let report = if archive {
        let (report, summary) = generate_and_archive(&pipeline, None).map_err(|e| e.to_string())?;
        println!("  📦 Archive created: {} ({} bytes)", summary.path.display(), summary.bytes);
        report
    } else {
        pipeline.generate_to_disk().map_err(|e| e.to_string())?
    };

    println!("  ✓ Wrote {} files for {} entities", report.written.len(), report.entity_count);
    for diagnostic in &report.diagnostics {
        println!("  ⚠ {}: {}", diagnostic.helper, diagnostic.message);
    }
    println!("✨ Generation complete!");
    Ok(())
}

fn preview(args: SchemaArgs, file: Option<String>) -> Result<(), String> {
    let (entities, config, templates) = load_inputs(&args)?;
    let set = CrudPipeline::new(&entities, &config)
        .with_templates(templates)
        .compute_file_set()
        .map_err(|e| e.to_string())?;

    if let Some(name) = file {
        let content = set
            .iter()
            .find(|(path, _)| *path == name || path.rsplit('/').next() == Some(name.as_str()))
            .map(|(_, content)| content)
            .ok_or_else(|| format!("No generated file named {}", name))?;
        print!("{}", content);
        return Ok(());
    }

    println!("🔍 {} files for {} entities:", set.len(), entities.len());
    for (path, content) in set.iter() {
        println!("  {} ({} bytes)", path, content.len());
    }
    Ok(())
}

fn load_inputs(args: &SchemaArgs) -> Result<(Vec<Entity>, GenerationConfig, TemplateSet), String> {
    let schema_path = match &args.schema {
        Some(path) => path.clone(),
        None => prompt_for_schema()?,
    };

    let entities = load_schema(&schema_path).map_err(|e| e.to_string())?;
    println!("  ✓ Loaded {} entities from {}", entities.len(), schema_path.display());
    let entities = filter_tables(entities, &args.only_tables, &args.skip_tables);
    if entities.is_empty() {
        println!("  ℹ No tables left after filtering");
    }

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => GenerationConfig::default(),
    };
    if args.swagger {
        config.add_swagger_identifier = true;
    }

    let templates = match &args.templates {
        Some(dir) => TemplateSet::from_dir(dir).map_err(|e| e.to_string())?,
        None => TemplateSet::builtin(),
    };

    Ok((entities, config, templates))
}

fn load_config(path: &Path) -> Result<GenerationConfig, String> {
    let config = GenerationConfig::from_file(path).map_err(|e| e.to_string())?;
    println!("  ✓ Loaded generation config from {}", path.display());
    Ok(config)
}

fn prompt_for_schema() -> Result<PathBuf, String> {
    print!("📄 Path to schema file or directory: ");
    io::stdout().flush().map_err(|e| e.to_string())?;

    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .map_err(|e| format!("Failed to read schema path: {}", e))?;

    let answer = answer.trim();
    if answer.is_empty() {
        return Err("A schema path is required".to_string());
    }
    Ok(PathBuf::from(answer))
}
