use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;

use crate::execution::{CommandSpec, ProcessExecutor, ProcessExitStatus, run_to_completion};
use crate::layout;
use crate::models::{CoreError, CoreErrorKind, CoreResult};

pub const DEFAULT_MANIFEST_NAME: &str = "extension-manifest.json";
pub const ARCHIVE_EXTENSION: &str = "vsix";

pub type ArchiveFuture<'a> = Pin<Box<dyn Future<Output = CoreResult<Vec<PathBuf>>> + Send + 'a>>;

pub trait ArchiveBuilder: Send + Sync {
    fn build<'a>(&'a self, output_dir: &'a Path, manifest_dir: &'a Path) -> ArchiveFuture<'a>;
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ToolInvocation {
    pub runtime: PathBuf,
    pub tool_path: PathBuf,
    pub manifest_name: String,
}

impl Default for ToolInvocation {
    fn default() -> Self {
        Self {
            runtime: PathBuf::from("node"),
            tool_path: Path::new("node_modules")
                .join("tfx-cli")
                .join("_build")
                .join("app.js"),
            manifest_name: DEFAULT_MANIFEST_NAME.to_string(),
        }
    }
}

/// Runs `<runtime> <tool> extension create --manifest-globs <manifest>` with
/// the manifest directory as the child's working directory.
pub struct TfxArchiveBuilder {
    executor: Arc<dyn ProcessExecutor>,
    invocation: ToolInvocation,
}

impl TfxArchiveBuilder {
    pub fn new(executor: Arc<dyn ProcessExecutor>, invocation: ToolInvocation) -> Self {
        Self {
            executor,
            invocation,
        }
    }

    pub fn command(&self, manifest_dir: &Path) -> CoreResult<CommandSpec> {
        // The child runs elsewhere, so a relative tool path must be pinned now.
        let tool_path = std::path::absolute(&self.invocation.tool_path).map_err(|error| {
            CoreError::new(
                CoreErrorKind::Configuration,
                format!(
                    "could not resolve tool path {}: {error}",
                    self.invocation.tool_path.display()
                ),
            )
        })?;

        Ok(CommandSpec::new(&self.invocation.runtime)
            .arg(tool_path.to_string_lossy())
            .args(["extension", "create", "--manifest-globs"])
            .arg(self.invocation.manifest_name.as_str())
            .working_dir(manifest_dir))
    }

    async fn run(&self, output_dir: &Path, manifest_dir: &Path) -> CoreResult<Vec<PathBuf>> {
        layout::create_dir_all(output_dir).await?;

        let command = self.command(manifest_dir)?;
        tracing::info!(command = %command.display_line(), "running packaging tool");

        let output = run_to_completion(self.executor.as_ref(), command).await?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.trim().is_empty() {
            tracing::info!(stream = "stdout", "{}", stdout.trim_end());
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            tracing::info!(stream = "stderr", "{}", stderr.trim_end());
        }

        if !output.succeeded() {
            let message = match output.status {
                ProcessExitStatus::ExitCode(code) => {
                    format!("packaging tool exited with code {code}: {}", stderr.trim())
                }
                ProcessExitStatus::Terminated => {
                    "packaging tool was terminated by signal".to_string()
                }
            };
            return Err(CoreError::new(CoreErrorKind::ExternalTool, message));
        }

        relocate_archives(manifest_dir, output_dir).await
    }
}

impl ArchiveBuilder for TfxArchiveBuilder {
    fn build<'a>(&'a self, output_dir: &'a Path, manifest_dir: &'a Path) -> ArchiveFuture<'a> {
        Box::pin(self.run(output_dir, manifest_dir))
    }
}

pub async fn relocate_archives(manifest_dir: &Path, output_dir: &Path) -> CoreResult<Vec<PathBuf>> {
    let pattern = format!(
        "{}/*.{ARCHIVE_EXTENSION}",
        glob::Pattern::escape(&manifest_dir.to_string_lossy())
    );
    let mut archives: Vec<PathBuf> = glob::glob(&pattern)
        .map_err(|error| {
            CoreError::new(
                CoreErrorKind::Io,
                format!("invalid archive pattern {pattern}: {error}"),
            )
        })?
        .filter_map(Result::ok)
        .filter(|path| path.is_file())
        .collect();
    archives.sort();

    if archives.is_empty() {
        return Err(CoreError::new(
            CoreErrorKind::ExternalTool,
            format!(
                "packaging tool produced no .{ARCHIVE_EXTENSION} in {}",
                manifest_dir.display()
            ),
        ));
    }

    let mut relocated = Vec::with_capacity(archives.len());
    for archive in archives {
        let Some(file_name) = archive.file_name() else {
            continue;
        };
        let dest = output_dir.join(file_name);
        layout::move_file(&archive, &dest).await?;
        tracing::info!(archive = %dest.display(), "archive created");
        relocated.push(dest);
    }

    Ok(relocated)
}
