mod config;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use taskpack_core::archive::{ArchiveBuilder, TfxArchiveBuilder};
use taskpack_core::execution::TokioProcessExecutor;
use taskpack_core::linking::DependencyLinker;
use taskpack_core::models::InternalDependencyMap;
use taskpack_core::packager::{self, PackageReport, TaskPackager};
use taskpack_core::registry::{DependencyRegistry, load_internal_dependencies};
use tracing_subscriber::EnvFilter;

use crate::config::PackagingConfig;

const TASK_FILE_NAME: &str = "task.json";
const MODULE_FILE_NAME: &str = "module.json";

/// taskpack - pipeline task packaging tool
#[derive(Parser)]
#[command(name = "taskpack")]
#[command(about = "Validate, localize and package pipeline tasks", long_about = None)]
struct Cli {
    /// JSON config file; unset fields use built-in defaults
    #[arg(short, long, env = "TASKPACK_CONFIG")]
    config: Option<PathBuf>,

    /// Override the tasks folder
    #[arg(long)]
    tasks_root: Option<PathBuf>,

    /// Override the package layout folder
    #[arg(long)]
    package_root: Option<PathBuf>,

    /// Override the library staging folder
    #[arg(long)]
    staging_root: Option<PathBuf>,

    /// Override the external library version registry
    #[arg(long)]
    registry: Option<PathBuf>,

    /// Override the internal dependency map
    #[arg(long)]
    internal_deps: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate every task descriptor
    Validate,

    /// Write resource files for shared modules
    #[command(name = "loc-common")]
    LocCommon,

    /// Package every task into the layout folder
    Package,

    /// Bundle the manifest folder into archives
    Archive {
        /// Manifest folder
        #[arg(long)]
        manifest_dir: Option<PathBuf>,

        /// Archive output folder
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// loc-common, package, then archive when nothing failed
    Build,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(error) => {
            tracing::error!(error = %error, "taskpack failed");
            ExitCode::from(2)
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

async fn run(cli: Cli) -> Result<bool, Box<dyn std::error::Error>> {
    let mut config = PackagingConfig::load(cli.config.as_deref())?;
    apply_overrides(&mut config, &cli);

    match cli.command {
        Commands::Validate => {
            let tasks = discover(&config.tasks_root, TASK_FILE_NAME)?;
            let report = packager::validate_all(&tasks).await;
            Ok(print_report("validated", &report))
        }
        Commands::LocCommon => loc_common(&config).await,
        Commands::Package => package(&config).await,
        Commands::Archive {
            manifest_dir,
            output,
        } => {
            if let Some(manifest_dir) = manifest_dir {
                config.manifest_dir = manifest_dir;
            }
            if let Some(output) = output {
                config.archive_output = output;
            }
            archive(&config).await
        }
        Commands::Build => {
            let modules_ok = loc_common(&config).await?;
            let tasks_ok = package(&config).await?;
            if !(modules_ok && tasks_ok) {
                tracing::warn!("skipping archive because packaging failed");
                return Ok(false);
            }
            archive(&config).await
        }
    }
}

fn apply_overrides(config: &mut PackagingConfig, cli: &Cli) {
    if let Some(path) = &cli.tasks_root {
        config.tasks_root = path.clone();
    }
    if let Some(path) = &cli.package_root {
        config.package_root = path.clone();
    }
    if let Some(path) = &cli.staging_root {
        config.staging_root = path.clone();
    }
    if let Some(path) = &cli.registry {
        config.registry_path = path.clone();
    }
    if let Some(path) = &cli.internal_deps {
        config.internal_deps_path = Some(path.clone());
    }
}

async fn loc_common(config: &PackagingConfig) -> Result<bool, Box<dyn std::error::Error>> {
    let modules = discover(&config.common_root, MODULE_FILE_NAME)?;
    let report = packager::localize_modules(&modules).await;
    Ok(print_report("localized", &report))
}

async fn package(config: &PackagingConfig) -> Result<bool, Box<dyn std::error::Error>> {
    let registry = DependencyRegistry::load(&config.registry_path).await?;
    let internal = match &config.internal_deps_path {
        Some(path) => load_internal_dependencies(path).await?,
        None => InternalDependencyMap::new(),
    };

    let linker = DependencyLinker::new(
        config.linker_config(),
        Arc::new(registry),
        Arc::new(internal),
    );
    let packager = TaskPackager::new(&config.package_root, linker);

    let tasks = discover(&config.tasks_root, TASK_FILE_NAME)?;
    let report = packager.package_all(&tasks).await;
    Ok(print_report("packaged", &report))
}

async fn archive(config: &PackagingConfig) -> Result<bool, Box<dyn std::error::Error>> {
    let builder = TfxArchiveBuilder::new(Arc::new(TokioProcessExecutor), config.tool_invocation());
    let archives = builder
        .build(&config.archive_output, &config.manifest_dir)
        .await?;
    for path in &archives {
        println!("{}", path.display());
    }
    Ok(true)
}

/// `<root>/*/<file_name>`, sorted.
fn discover(root: &Path, file_name: &str) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    let pattern = format!(
        "{}/*/{file_name}",
        glob::Pattern::escape(&root.to_string_lossy())
    );
    let mut paths: Vec<PathBuf> = glob::glob(&pattern)?
        .filter_map(Result::ok)
        .filter(|path| path.is_file())
        .collect();
    paths.sort();
    Ok(paths)
}

fn print_report<T>(verb: &str, report: &PackageReport<T>) -> bool {
    let failed = report.failures().count();
    println!(
        "{verb} {} of {} item(s)",
        report.len() - failed,
        report.len()
    );
    for (source, error) in report.failures() {
        println!("  FAILED {}: {error}", source.display());
    }
    report.is_success()
}
