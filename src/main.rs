use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use catalog_callgraph::analysis::{object_dependencies, PathAnalyzer};
use catalog_callgraph::builder::{GraphBuilder, InMemoryCatalog, NodeCreation};
use catalog_callgraph::config::{load_config, EngineConfig};
use catalog_callgraph::export::{self, ExportData, ExportFormat};
use catalog_callgraph::graph::{DependencyGraph, NodeKey};
use catalog_callgraph::parser::{self, DependencyReference, ObjectDescriptor};

#[derive(Parser)]
#[command(name = "catalog-callgraph")]
#[command(author = "Zachary Woods <143150513+zach-fau@users.noreply.github.com>")]
#[command(version)]
#[command(about = "Call graphs and dependency reports for catalog objects", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Options shared by every command that reads a catalog dump.
#[derive(Args)]
struct InputArgs {
    /// JSON catalog dump to read
    #[arg(short, long)]
    input: PathBuf,

    /// TOML engine configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Restrict the sources to one bucket
    #[arg(short, long)]
    bucket: Option<String>,

    /// Restrict the sources to these objects of --bucket (comma separated)
    #[arg(long, value_delimiter = ',', requires = "bucket")]
    objects: Vec<String>,

    /// Create a node for every object, not only for objects with dependencies
    #[arg(long)]
    all_objects: bool,

    /// Skip malformed dependency references instead of failing
    #[arg(long)]
    skip_malformed: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the call graph of every root object
    Callgraph {
        #[command(flatten)]
        input: InputArgs,

        /// Output format (json, csv, markdown)
        #[arg(short, long, default_value = "markdown")]
        format: ExportFormat,
    },
    /// Print what every object calls and is called by
    Calls {
        #[command(flatten)]
        input: InputArgs,

        /// Output format (json, csv, markdown)
        #[arg(short, long, default_value = "markdown")]
        format: ExportFormat,
    },
    /// Print the direct dependencies and dependents of one object as JSON
    Dependencies {
        #[command(flatten)]
        input: InputArgs,

        /// The object, as <bucket><separator><name>
        #[arg(short, long)]
        object: String,
    },
    /// Show version information
    Version,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("catalog_callgraph=info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Callgraph { input, format }) => {
            let (graph, _) = load_graph(&input, false)?;
            let analysis = PathAnalyzer::new(&graph).analyze();
            write_report(format, &ExportData::call_graph(&graph, analysis))
        }
        Some(Commands::Calls { input, format }) => {
            let (graph, _) = load_graph(&input, false)?;
            write_report(format, &ExportData::call_listings(&graph))
        }
        Some(Commands::Dependencies { input, object }) => {
            let (graph, config) = load_graph(&input, true)?;
            let reference = DependencyReference::parse(&object, &config.separator)?;
            let key = NodeKey::new(reference.bucket_name, reference.object_name);
            let view = object_dependencies(&graph, &key, &config.separator)?;

            let json = serde_json::to_string_pretty(&view)?;
            println!("{}", json);
            Ok(())
        }
        Some(Commands::Version) => {
            println!("catalog-callgraph v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        None => {
            println!("catalog-callgraph - call graphs for catalog objects");
            println!("Run 'catalog-callgraph callgraph --input <dump.json>' to analyze a catalog");
            println!("Run 'catalog-callgraph --help' for more information");
            Ok(())
        }
    }
}

/// Applies command-line overrides on top of the loaded configuration.
fn effective_config(input: &InputArgs, every_object: bool) -> Result<EngineConfig> {
    let mut config = load_config(input.config.as_deref())?;
    if input.all_objects || every_object {
        config.node_creation = NodeCreation::AllObjects;
    }
    if input.skip_malformed {
        config.skip_malformed_references = true;
    }
    Ok(config)
}

fn load_objects(input: &InputArgs) -> Result<Vec<ObjectDescriptor>> {
    let objects = parser::parse_file(&input.input)
        .with_context(|| format!("Failed to load catalog dump {}", input.input.display()))?;
    parser::validate(&objects)?;
    tracing::debug!(objects = objects.len(), "Loaded catalog dump");
    Ok(objects)
}

fn load_graph(input: &InputArgs, every_object: bool) -> Result<(DependencyGraph, EngineConfig)> {
    let config = effective_config(input, every_object)?;
    let objects = load_objects(input)?;
    let catalog = InMemoryCatalog::from_descriptors(&objects);

    let sources = match &input.bucket {
        Some(bucket) => parser::select_objects(&objects, bucket, &input.objects),
        None => objects,
    };

    let builder = GraphBuilder::new(config.clone());
    let graph = if config.skip_malformed_references {
        let build = builder.build_lenient(&sources, &catalog)?;
        if !build.rejected.is_empty() {
            tracing::warn!(
                count = build.rejected.len(),
                "Skipped malformed dependency references"
            );
        }
        build.graph
    } else {
        builder.build(&sources, &catalog)?
    };

    tracing::info!(
        objects = graph.order(),
        dependencies = graph.size(),
        "Built dependency graph"
    );
    Ok((graph, config))
}

fn write_report(format: ExportFormat, data: &ExportData) -> Result<()> {
    let stdout = std::io::stdout();
    let mut writer = stdout.lock();
    export::export(format, data, &mut writer).context("Failed to write report")?;
    writer.flush()?;
    Ok(())
}
