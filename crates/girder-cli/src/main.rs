use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use girder_build::{executor, ninja, GraphBuilder, NinjaWriter};
use girder_package::{discover, manifest::MANIFEST_FILE, Manifest, Package};
use std::path::{Path, PathBuf};
use std::process::{ExitCode, ExitStatus};

/// girder build description compiler.
///
/// Compiles a declarative package tree into dependency-ordered build
/// graph files and hands them to an external executor (ninja by
/// default) for parallel, incremental compilation.
///
/// EXAMPLES:
///     girder                      Configure and build
///     girder configure            Only emit the graph files
///     girder install              Build, then install to the prefix
///     girder --discover build     Infer packages from the tree layout
///
/// ENVIRONMENT VARIABLES:
///     NINJA    Override the build-executor binary
#[derive(Parser)]
#[command(name = "girder")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Build root directory (defaults to the current directory)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Manifest file, relative to the build root
    #[arg(long, global = true, default_value = MANIFEST_FILE)]
    manifest: PathBuf,

    /// Discover packages by directory layout instead of reading a
    /// manifest
    #[arg(long, global = true)]
    discover: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Clone, Copy, PartialEq, Eq)]
enum Commands {
    /// Generate the build, install and package graphs
    Configure,
    /// Generate the graphs and run the executor (default)
    Build,
    /// Build, then install artifacts under the prefix
    Install,
    /// Build, then stage artifacts for distribution
    Package,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(error) => {
            eprintln!("{} {error:#}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Build);

    let root = match &cli.root {
        Some(root) => root.clone(),
        None => std::env::current_dir().context("cannot determine current directory")?,
    };

    let package = load_tree(&cli, &root)?;
    let writer = NinjaWriter::new(root.join(ninja::BUILD_DIR));
    configure(&root, &package, &writer)?;

    if command == Commands::Configure {
        return Ok(ExitCode::SUCCESS);
    }

    let status = executor::run_from(&root, &writer.build_graph_path())?;
    if !status.success() || command == Commands::Build {
        return Ok(exit_code(status));
    }

    let graph = match command {
        Commands::Install => writer.install_graph_path(),
        Commands::Package => writer.package_graph_path(),
        Commands::Configure | Commands::Build => unreachable!(),
    };

    let status = executor::run_from(&root, &graph)?;
    Ok(exit_code(status))
}

/// Construct the package tree from the manifest, or from the
/// directory layout when discovery is requested
fn load_tree(cli: &Cli, root: &Path) -> Result<Package> {
    if cli.discover {
        let (package, warnings) = discover(root)?;
        for warning in &warnings {
            warn(warning);
        }
        return Ok(package);
    }

    let manifest_path = root.join(&cli.manifest);
    let manifest = Manifest::from_file(&manifest_path)
        .with_context(|| format!("cannot load manifest {}", manifest_path.display()))?;
    Ok(manifest.into_package()?)
}

/// Build the rule map and write the graph files
fn configure(root: &Path, package: &Package, writer: &NinjaWriter) -> Result<()> {
    let ruleset = GraphBuilder::new(root)
        .generate(package)
        .context("graph construction failed")?;

    for warning in &ruleset.warnings {
        warn(warning);
    }

    writer
        .write_all(&ruleset.rules)
        .context("cannot write graph files")?;
    Ok(())
}

fn warn(warning: &impl std::fmt::Display) {
    eprintln!("{} {warning}", "warning:".yellow().bold());
}

/// Propagate the executor's exit status verbatim
fn exit_code(status: ExitStatus) -> ExitCode {
    match status.code() {
        Some(code) => ExitCode::from(code.clamp(0, 255) as u8),
        // killed by signal
        None => ExitCode::FAILURE,
    }
}
