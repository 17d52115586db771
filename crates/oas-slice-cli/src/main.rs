use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use indexmap::IndexMap;
use serde::Serialize;

use oas_slice_core::classify::classify;
use oas_slice_core::config::{self, CONFIG_FILE_NAME, OutputFormat};
use oas_slice_core::{Document, ResolveOptions, SchemaResolver, extract_subset};

#[derive(Parser)]
#[command(
    name = "oas-slice",
    about = "Extract endpoint-scoped subsets of OpenAPI 3.x documents",
    version
)]
struct Cli {
    /// Path to the OpenAPI document (YAML or JSON). Defaults to the config's `input`.
    #[arg(short, long, global = true)]
    input: Option<PathBuf>,

    /// Output format. Defaults to the config's `format`.
    #[arg(long, global = true)]
    format: Option<FormatArg>,

    /// Fail on inline allOf members instead of skipping them
    #[arg(long, global = true)]
    strict_composition: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every endpoint path, sorted
    Endpoints,

    /// Show the tags of an endpoint's operation
    Tags {
        /// Endpoint path or path suffix
        endpoint: String,
    },

    /// Print the schemas reachable from the given endpoints
    Schemas {
        /// Endpoint paths or path suffixes
        #[arg(required = true)]
        endpoints: Vec<String>,
    },

    /// Print the operation selected for each endpoint
    Operations {
        /// Endpoint paths or path suffixes
        #[arg(required = true)]
        endpoints: Vec<String>,
    },

    /// Write a standalone document containing only the given endpoints
    Extract {
        /// Endpoint paths or path suffixes. Defaults to the config's `endpoints`.
        endpoints: Vec<String>,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Initialize a new oas-slice configuration
    Init {
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Yaml,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Yaml => OutputFormat::Yaml,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

/// Settings merged from the config file and command-line flags.
struct Settings {
    input: PathBuf,
    format: OutputFormat,
    options: ResolveOptions,
    endpoints: Vec<String>,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Init { force } => cmd_init(*force),

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(*shell, &mut cmd, "oas-slice", &mut std::io::stdout());
            Ok(())
        }

        Commands::Endpoints => with_document(&cli, |doc, settings| {
            emit(&doc.list_endpoints(), settings.format)
        }),
        Commands::Tags { endpoint } => with_document(&cli, |doc, settings| {
            emit(&doc.tags_for_endpoint(endpoint), settings.format)
        }),
        Commands::Schemas { endpoints } => {
            with_document(&cli, |doc, settings| cmd_schemas(doc, settings, endpoints))
        }
        Commands::Operations { endpoints } => {
            with_document(&cli, |doc, settings| cmd_operations(doc, settings, endpoints))
        }
        Commands::Extract { endpoints, output } => with_document(&cli, |doc, settings| {
            cmd_extract(doc, settings, endpoints, output.as_deref())
        }),
    }
}

/// Resolve settings, load the input document and hand both to `run`.
fn with_document<F>(cli: &Cli, run: F) -> Result<()>
where
    F: FnOnce(&Document, &Settings) -> Result<()>,
{
    let settings = settings(cli)?;
    let doc = load_document(&settings.input)?;
    run(&doc, &settings)
}

/// Merge the project config file with command-line overrides.
fn settings(cli: &Cli) -> Result<Settings> {
    let cfg = config::load_config(Path::new(CONFIG_FILE_NAME))?.unwrap_or_default();
    let mut options = ResolveOptions::from(&cfg.resolve);
    options.strict_composition |= cli.strict_composition;

    log::debug!("resolve options: {options:?}");

    Ok(Settings {
        input: cli.input.clone().unwrap_or_else(|| PathBuf::from(&cfg.input)),
        format: cli.format.map(OutputFormat::from).unwrap_or(cfg.format),
        options,
        endpoints: cfg.endpoints,
    })
}

fn load_document(path: &Path) -> Result<Document> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("yaml");

    let doc = match ext {
        "json" => Document::load_json(&content),
        _ => Document::load(&content),
    }
    .with_context(|| format!("failed to load {}", path.display()))?;

    log::info!(
        "loaded OpenAPI {} document with {} paths",
        doc.version(),
        doc.spec().paths.len()
    );
    Ok(doc)
}

fn render<T: Serialize + ?Sized>(value: &T, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Yaml => serde_yaml_ng::to_string(value)?,
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(value)?;
            json.push('\n');
            json
        }
    })
}

fn emit<T: Serialize + ?Sized>(value: &T, format: OutputFormat) -> Result<()> {
    print!("{}", render(value, format)?);
    Ok(())
}

fn cmd_schemas(doc: &Document, settings: &Settings, endpoints: &[String]) -> Result<()> {
    let resolver = SchemaResolver::with_options(doc, settings.options);
    let schemas = resolver.schemas_for_endpoints(endpoints)?;
    eprintln!("Resolved {} schemas", schemas.len());
    for (name, schema) in &schemas {
        eprintln!("  {name} ({})", classify(schema).kind());
    }
    emit(&schemas, settings.format)
}

fn cmd_operations(doc: &Document, settings: &Settings, endpoints: &[String]) -> Result<()> {
    let resolver = SchemaResolver::with_options(doc, settings.options);
    let operations = resolver.operations_for_endpoints(endpoints);

    // Report which path and method each endpoint landed on.
    let summary: IndexMap<&str, serde_json::Value> = operations
        .iter()
        .filter_map(|(endpoint, op)| {
            let resolved = doc.resolve_endpoint(endpoint)?;
            Some((
                endpoint.as_str(),
                serde_json::json!({
                    "path": resolved.path,
                    "method": resolved.method.as_str(),
                    "operation": op,
                }),
            ))
        })
        .collect();
    emit(&summary, settings.format)
}

fn cmd_extract(
    doc: &Document,
    settings: &Settings,
    endpoints: &[String],
    output: Option<&Path>,
) -> Result<()> {
    let endpoints = if endpoints.is_empty() {
        settings.endpoints.as_slice()
    } else {
        endpoints
    };
    if endpoints.is_empty() {
        anyhow::bail!(
            "no endpoints given. Pass them as arguments or list them under `endpoints` in {}",
            CONFIG_FILE_NAME
        );
    }

    let subset = extract_subset(doc, endpoints, settings.options)?;
    let schema_count = subset
        .components
        .as_ref()
        .map_or(0, |c| c.schemas.len());
    let rendered = render(&subset, settings.format)?;

    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create directory {}", parent.display()))?;
            }
            fs::write(path, rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("  wrote {}", path.display());
        }
        None => print!("{rendered}"),
    }

    eprintln!(
        "Extracted {} paths and {} schemas",
        subset.paths.len(),
        schema_count
    );
    Ok(())
}

fn cmd_init(force: bool) -> Result<()> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, config::default_config_content())?;
    eprintln!("Created {}", config_path.display());
    Ok(())
}
