//! stagehand - run workspace package scripts in dependency-ordered stages.
//!
//! Usage:
//!   stagehand run <script>       Run the script across the workspace in stages
//!   stagehand parallel <script>  Run the script everywhere, ignoring dependencies
//!   stagehand list               Show packages and the computed stage plan

use clap::{Args, Parser, Subcommand};
use stagehand::{DependencyGraph, Executor, Package, WorkspaceConfig, DEFAULT_CONCURRENCY};
use std::path::{Path, PathBuf};
use tracing::info;

/// stagehand - a workspace script runner
#[derive(Parser)]
#[command(name = "stagehand")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every subcommand.
#[derive(Args)]
struct WorkspaceArgs {
    /// Path to the workspace manifest
    #[arg(short, long, default_value = "workspace.yaml")]
    manifest: PathBuf,

    /// Only include packages whose name contains this value (repeatable)
    #[arg(long = "filter", value_name = "SUBSTRING")]
    filters: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a script across the workspace in dependency-ordered stages
    Run {
        /// Name of the script to run in each package
        #[arg(value_name = "SCRIPT")]
        script: String,

        #[command(flatten)]
        workspace: WorkspaceArgs,

        /// Maximum packages to process simultaneously (default: 3)
        #[arg(short = 'j', long)]
        concurrency: Option<usize>,
    },

    /// Run a script across all packages at once, ignoring dependency order
    Parallel {
        /// Name of the script to run in each package
        #[arg(value_name = "SCRIPT")]
        script: String,

        #[command(flatten)]
        workspace: WorkspaceArgs,

        /// Maximum packages to process simultaneously (default: 3)
        #[arg(short = 'j', long)]
        concurrency: Option<usize>,
    },

    /// List packages, their scripts, and the computed stage plan
    List {
        #[command(flatten)]
        workspace: WorkspaceArgs,
    },
}

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            script,
            workspace,
            concurrency,
        } => run_script(&script, &workspace, concurrency, true).await,
        Commands::Parallel {
            script,
            workspace,
            concurrency,
        } => run_script(&script, &workspace, concurrency, false).await,
        Commands::List { workspace } => list_packages(&workspace),
    };

    if let Err(message) = result {
        eprintln!("{}", message);
        std::process::exit(1);
    }
}

/// Load the manifest and apply the package-name filters.
fn load_workspace(args: &WorkspaceArgs) -> Result<(Vec<Package>, Option<usize>), String> {
    let config = WorkspaceConfig::from_file(&args.manifest)
        .map_err(|e| format!("{}: {}", args.manifest.display(), e))?;
    let concurrency = config.concurrency;

    let root = args
        .manifest
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."))
        .to_path_buf();
    let mut packages = config.into_packages(&root);

    if !args.filters.is_empty() {
        packages.retain(|pkg| {
            args.filters
                .iter()
                .any(|f| pkg.name().as_str().contains(f.as_str()))
        });
    }

    Ok((packages, concurrency))
}

/// Run `script` across the workspace, staged or flat.
async fn run_script(
    script: &str,
    workspace: &WorkspaceArgs,
    concurrency: Option<usize>,
    staged: bool,
) -> Result<(), String> {
    let (packages, manifest_concurrency) = load_workspace(workspace)?;
    let concurrency = concurrency
        .or(manifest_concurrency)
        .unwrap_or(DEFAULT_CONCURRENCY);

    info!(
        script = script,
        packages = packages.len(),
        concurrency = concurrency,
        "starting run (fail-fast)"
    );

    let executor = Executor::new(concurrency);
    let outcome = if staged {
        executor.execute_stages(&packages, script).await
    } else {
        executor.execute(&packages, script).await.map(|_| ())
    };

    match outcome {
        Ok(()) => {
            info!(script = script, "completed successfully");
            Ok(())
        }
        Err(e) => Err(format!("{} failed (fail-fast): {}", script, e)),
    }
}

/// List packages and the stage plan without running anything.
fn list_packages(workspace: &WorkspaceArgs) -> Result<(), String> {
    let (packages, _) = load_workspace(workspace)?;

    if packages.is_empty() {
        println!("No packages matched.");
        return Ok(());
    }

    println!("Packages:");
    for pkg in &packages {
        println!("  {}", pkg.name());
        println!("    path: {}", pkg.path().display());
        if !pkg.dependencies().is_empty() {
            let deps: Vec<&str> = pkg.dependencies().iter().map(|d| d.as_str()).collect();
            println!("    depends on: {}", deps.join(", "));
        }
    }

    let graph = DependencyGraph::build(&packages);
    let sorted = graph.topological_sort(&packages);
    let stages = graph
        .partition_into_stages(&sorted)
        .map_err(|e| e.to_string())?;

    println!();
    println!("Stage plan:");
    for (index, stage) in stages.iter().enumerate() {
        let members: Vec<&str> = stage.iter().map(|p| p.name().as_str()).collect();
        println!("  Stage {}: {}", index + 1, members.join(", "));
    }

    Ok(())
}
