//! Flowdeck - workflow project records for your terminal.
//!
//! Creates, validates, exports and publishes workflow projects kept as JSON
//! records under a root directory.

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use flowdeck::core::{
    docs, load_workflow_file, validate, Config, CreateOptions, ExportFormat, ListMode,
    ProjectStore, StoreLayout, StoreOptions,
};
use flowdeck::templates::{self, Discovery, MemoryTemplateStore, Query, TemplateStore};

/// Workflow project records for your terminal
#[derive(Parser)]
#[command(name = "flowdeck")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Root directory holding projects/ and workflows/
    #[arg(long, global = true)]
    root: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new project, optionally from a workflow file
    Create {
        /// Project name
        name: String,

        /// Workflow JSON file
        payload: Option<PathBuf>,

        /// Replace an existing project
        #[arg(short, long)]
        force: bool,

        /// Project description
        #[arg(short, long)]
        description: Option<String>,

        /// Tag to attach (repeatable)
        #[arg(short, long)]
        tag: Vec<String>,
    },

    /// Attach a workflow to an existing project
    Update {
        /// Project name
        name: String,

        /// Workflow JSON file
        payload: PathBuf,
    },

    /// Show a project record
    Show {
        /// Project name
        name: String,
    },

    /// List all projects
    List {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,

        /// Skip unreadable records instead of failing
        #[arg(long)]
        lenient: bool,
    },

    /// Export a project's workflow to workflows/
    Export {
        /// Project name
        name: String,

        /// Export format (json, yaml)
        #[arg(default_value = "json")]
        format: String,
    },

    /// Validate a workflow file
    Validate {
        /// Workflow JSON file
        file: PathBuf,
    },

    /// Publish the root directory to a git remote
    #[cfg(feature = "git")]
    Sync {
        /// Project name
        name: String,

        /// Remote repository URL
        remote_url: String,

        /// Attach this workflow file before publishing
        #[arg(short, long)]
        workflow: Option<PathBuf>,
    },

    /// Initialize git in the root directory and point it at a remote
    #[cfg(feature = "git")]
    SetupRemote {
        /// Remote repository URL
        remote_url: String,
    },

    /// Write editor rules describing the project layout
    Rules {
        /// Rules directory (defaults to ~/.cursor/rules)
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Template discovery data store
    Templates {
        /// Templates operation
        #[command(subcommand)]
        operation: TemplatesOperation,

        /// Use an in-memory store seeded with sample rows
        #[arg(long, global = true)]
        offline: bool,
    },

    /// Show configuration
    Config {
        /// Show config file path
        #[arg(long)]
        path: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum TemplatesOperation {
    /// Insert the sample templates and analyses
    Populate,

    /// Search templates or analyzed workflows
    Discover {
        /// Search analyzed workflows instead of templates
        #[arg(long)]
        analyses: bool,

        /// Complexity level
        #[arg(long)]
        complexity: Option<String>,

        /// Target audience
        #[arg(long)]
        audience: Option<String>,

        /// Required feature or tag
        #[arg(long)]
        feature: Option<String>,

        /// Full-text search terms
        #[arg(long)]
        search: Option<String>,
    },

    /// Show complexity, audience and service distribution
    Stats,

    /// Remove the sample rows
    Clear,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose { EnvFilter::new("debug") } else { EnvFilter::new("warn") };

    tracing_subscriber::registry().with(fmt::layer().with_target(false)).with(filter).init();

    let root = cli.root.as_deref();
    match cli.command {
        Commands::Create { name, payload, force, description, tag } => {
            let options = CreateOptions { overwrite: force, description, tags: tag };
            cmd_create(root, &name, payload.as_deref(), options)?;
        }
        Commands::Update { name, payload } => {
            cmd_update(root, &name, &payload)?;
        }
        Commands::Show { name } => {
            cmd_show(root, &name)?;
        }
        Commands::List { format, lenient } => {
            cmd_list(root, &format, lenient)?;
        }
        Commands::Export { name, format } => {
            cmd_export(root, &name, &format)?;
        }
        Commands::Validate { file } => {
            cmd_validate(&file)?;
        }
        #[cfg(feature = "git")]
        Commands::Sync { name, remote_url, workflow } => {
            cmd_sync(root, &name, &remote_url, workflow.as_deref())?;
        }
        #[cfg(feature = "git")]
        Commands::SetupRemote { remote_url } => {
            cmd_setup_remote(root, &remote_url)?;
        }
        Commands::Rules { dir } => {
            cmd_rules(root, dir)?;
        }
        Commands::Templates { operation, offline } => {
            cmd_templates(operation, offline)?;
        }
        Commands::Config { path } => {
            cmd_config(path)?;
        }
        Commands::Completions { shell } => {
            cmd_completions(shell);
        }
    }

    Ok(())
}

/// Resolve the store layout, with `--root` taking precedence over configuration.
fn resolve_layout(config: &Config, root: Option<&Path>) -> StoreLayout {
    root.map_or_else(|| config.layout(), StoreLayout::new)
}

/// Load configuration and open the project store.
fn open_store(root: Option<&Path>) -> Result<(Config, ProjectStore)> {
    let config = Config::load()?;
    let layout = resolve_layout(&config, root);
    let store = ProjectStore::new(layout, StoreOptions::from_config(&config))
        .context("Failed to open project store")?;
    Ok((config, store))
}

/// Create a project.
fn cmd_create(
    root: Option<&Path>,
    name: &str,
    payload: Option<&Path>,
    options: CreateOptions,
) -> Result<()> {
    let (_, store) = open_store(root)?;
    let workflow = payload.map(load_workflow_file).transpose()?;

    let record = store.create(name, workflow, options)?;

    println!("Created project '{}' ({})", record.name, record.id);
    println!("  Record:  {}", store.layout().record_path(name).display());
    if record.has_workflow() {
        println!(
            "  Workflow: {} nodes, {} connections",
            record.metadata.node_count, record.metadata.connection_count
        );
    }
    Ok(())
}

/// Attach a workflow to a project.
fn cmd_update(root: Option<&Path>, name: &str, payload: &Path) -> Result<()> {
    let (_, store) = open_store(root)?;
    let workflow = load_workflow_file(payload)?;

    let record = store.update(name, workflow)?;

    println!("Updated project '{}' to v{}", record.name, record.metadata.version);
    Ok(())
}

/// Print a project record.
fn cmd_show(root: Option<&Path>, name: &str) -> Result<()> {
    let (_, store) = open_store(root)?;
    let record = store.load(name)?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

/// List projects.
fn cmd_list(root: Option<&Path>, format: &str, lenient: bool) -> Result<()> {
    let (_, store) = open_store(root)?;
    let mode = if lenient { ListMode::Lenient } else { ListMode::Strict };
    let listing = store.list(mode)?;

    for skipped in &listing.skipped {
        eprintln!("Skipped {}: {}", skipped.path.display(), skipped.error);
    }

    match format {
        "json" => {
            let json = serde_json::to_string_pretty(&listing.rows)?;
            println!("{json}");
        }
        "text" => {
            if listing.rows.is_empty() {
                println!("No projects found in {}", store.layout().projects_dir.display());
                return Ok(());
            }
            print!("{}", listing.to_table());
            println!("\nTotal: {} projects", listing.rows.len());
        }
        other => anyhow::bail!("Unsupported list format: {other}. Supported: text, json"),
    }

    Ok(())
}

/// Export a project's workflow.
fn cmd_export(root: Option<&Path>, name: &str, format: &str) -> Result<()> {
    let format: ExportFormat = format.parse()?;
    let (_, store) = open_store(root)?;

    let path = store.export_workflow(name, format)?;

    println!("Exported '{name}' to {}", path.display());
    Ok(())
}

/// Validate a workflow file and print the report.
fn cmd_validate(file: &Path) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let workflow: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", file.display()))?;

    let report = validate(Some(&workflow));
    println!("{}", serde_json::to_string_pretty(&report)?);

    if !report.valid {
        anyhow::bail!("Workflow is invalid: {} problem(s)", report.errors.len());
    }
    Ok(())
}

/// Refresh a project's artifacts and publish the root.
#[cfg(feature = "git")]
fn cmd_sync(
    root: Option<&Path>,
    name: &str,
    remote_url: &str,
    workflow: Option<&Path>,
) -> Result<()> {
    use flowdeck::git::{sync_commit_message, GitPublisher, PublishOptions};

    let (config, store) = open_store(root)?;

    let record = match workflow {
        Some(path) => store.update(name, load_workflow_file(path)?)?,
        None => store.load(name)?,
    };
    store.refresh_artifacts(&record)?;

    let publisher = GitPublisher::new(&store.layout().root, PublishOptions::from_config(&config));
    let message = sync_commit_message(name, &record.metadata.version);
    let outcome = publisher.publish(remote_url, &message)?;

    let record = store.record_publish(name, remote_url, &outcome.branch)?;

    match outcome.commit {
        Some(oid) => println!("Committed {oid}"),
        None => println!("Nothing to commit"),
    }
    println!(
        "Published '{}' v{} to {} ({})",
        record.name, record.metadata.version, remote_url, outcome.branch
    );
    Ok(())
}

/// Prepare the root directory for publishing.
#[cfg(feature = "git")]
fn cmd_setup_remote(root: Option<&Path>, remote_url: &str) -> Result<()> {
    use flowdeck::git::{GitPublisher, PublishOptions};

    let config = Config::load()?;
    let layout = resolve_layout(&config, root);

    let publisher = GitPublisher::new(&layout.root, PublishOptions::from_config(&config));
    let outcome = publisher.setup_remote(remote_url)?;

    if outcome.initialized {
        println!("Initialized repository in {}", layout.root.display());
    }
    println!("Remote {}: {remote_url} ({:?})", config.git.remote, outcome.remote_change);
    if outcome.wrote_gitignore {
        println!("Wrote .gitignore");
    }
    if let Some(oid) = outcome.commit {
        println!("Committed {oid}");
    }
    Ok(())
}

/// Write editor rules.
fn cmd_rules(root: Option<&Path>, dir: Option<PathBuf>) -> Result<()> {
    let config = Config::load()?;
    let layout = resolve_layout(&config, root);

    let dir = match dir {
        Some(dir) => dir,
        None => dirs::home_dir()
            .map(|home| home.join(".cursor").join("rules"))
            .context("No home directory; pass --dir")?,
    };

    let (path, written) = docs::write_editor_rules(&dir, &layout)
        .with_context(|| format!("Failed to write rules to {}", dir.display()))?;

    if written {
        println!("Wrote {}", path.display());
    } else {
        println!("Rules already exist at {}", path.display());
    }
    Ok(())
}

/// Open the template store.
///
/// The offline store starts with the sample rows, except for `populate`,
/// which inserts them itself.
fn template_store(offline: bool, operation: &TemplatesOperation) -> Result<Box<dyn TemplateStore>> {
    if offline {
        let store = if matches!(operation, TemplatesOperation::Populate) {
            MemoryTemplateStore::new()
        } else {
            MemoryTemplateStore::seeded()
        };
        return Ok(Box::new(store));
    }
    remote_template_store()
}

#[cfg(feature = "templates")]
fn remote_template_store() -> Result<Box<dyn TemplateStore>> {
    let config = Config::load()?;
    Ok(Box::new(flowdeck::templates::SupabaseClient::from_config(&config)?))
}

#[cfg(not(feature = "templates"))]
fn remote_template_store() -> Result<Box<dyn TemplateStore>> {
    anyhow::bail!("Template store support not compiled in; use --offline")
}

/// Handle template commands.
fn cmd_templates(operation: TemplatesOperation, offline: bool) -> Result<()> {
    let store = template_store(offline, &operation)?;

    match operation {
        TemplatesOperation::Populate => {
            let inserted = templates::populate(store.as_ref())?;
            let count = |table| -> Result<usize> {
                Ok(store.select(table, &Query::new().columns(&["name"]))?.len())
            };
            println!("Inserted {inserted} rows");
            println!(
                "Total: {} templates, {} analyses",
                count(templates::TEMPLATES_TABLE)?,
                count(templates::ANALYSES_TABLE)?
            );
        }
        TemplatesOperation::Discover { analyses, complexity, audience, feature, search } => {
            let discovery = Discovery { analyses, complexity, audience, feature, search };
            let rows = templates::discover(store.as_ref(), &discovery)?;

            if rows.is_empty() {
                println!("No matches in {}", discovery.table());
                return Ok(());
            }
            for row in &rows {
                let name = row.get("name").and_then(|v| v.as_str()).unwrap_or("(unnamed)");
                let description = row.get("description").and_then(|v| v.as_str()).unwrap_or("");
                println!("{name} - {description}");
            }
            println!("\nTotal: {} matches", rows.len());
        }
        TemplatesOperation::Stats => {
            let stats = templates::collect_stats(store.as_ref())?;
            print!("{}", stats.to_text());
        }
        TemplatesOperation::Clear => {
            templates::clear_samples(store.as_ref())?;
            println!("Removed sample rows");
        }
    }

    Ok(())
}

/// Show configuration.
fn cmd_config(show_path: bool) -> Result<()> {
    if show_path {
        if let Some(path) = Config::config_dir() {
            println!("{}", path.display());
        }
        return Ok(());
    }

    let config = Config::load()?;
    let toml = toml::to_string_pretty(&config)?;
    println!("{toml}");

    Ok(())
}

/// Generate shell completions.
fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "flowdeck", &mut io::stdout());
}
