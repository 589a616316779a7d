use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::layout;
use crate::models::{
    CoreError, CoreErrorKind, CoreResult, InternalDependencyMap, LibraryDependency, PackageStage,
    TaskDescriptor,
};
use crate::registry::DependencyRegistry;

pub const NODE_RUNTIMES: &[&str] = &["Node", "Node10", "Node16", "Node20_1"];
pub const POWERSHELL_RUNTIME: &str = "PowerShell3";

pub const TASK_LIB: &str = "azure-pipelines-task-lib";
pub const TOOL_LIB: &str = "azure-pipelines-tool-lib";
pub const TASK_SDK: &str = "vsts-task-sdk";

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LinkerConfig {
    /// Pre-populated `<name>/<version>/...` payloads. Read-only.
    pub staging_root: PathBuf,
    pub common_src_root: PathBuf,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum LinkKind {
    External,
    Internal,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LinkedDependency {
    pub kind: LinkKind,
    pub name: String,
    pub version: Option<String>,
    pub destination: PathBuf,
}

/// Libraries a task needs, based on the execution handlers it declares.
/// Node libraries come first, then the PowerShell SDK.
pub fn required_libraries(descriptor: &TaskDescriptor) -> Vec<LibraryDependency> {
    let mut libraries = Vec::new();

    if NODE_RUNTIMES
        .iter()
        .any(|runtime| descriptor.declares_runtime(runtime))
    {
        libraries.push(LibraryDependency::new(TASK_LIB, "node_modules", "node_modules"));
        libraries.push(LibraryDependency::new(TOOL_LIB, "node_modules", "node_modules"));
    }

    if descriptor.declares_runtime(POWERSHELL_RUNTIME) {
        libraries.push(LibraryDependency::new(
            TASK_SDK,
            Path::new("node_modules").join(TASK_SDK).join("VstsTaskSdk"),
            Path::new("ps_modules").join("VstsTaskSdk"),
        ));
    }

    libraries
}

#[derive(Clone)]
pub struct DependencyLinker {
    config: LinkerConfig,
    registry: Arc<DependencyRegistry>,
    internal: Arc<InternalDependencyMap>,
}

impl DependencyLinker {
    pub fn new(
        config: LinkerConfig,
        registry: Arc<DependencyRegistry>,
        internal: Arc<InternalDependencyMap>,
    ) -> Self {
        Self {
            config,
            registry,
            internal,
        }
    }

    /// Copies external libraries, then internal modules, into `target_dir`.
    pub async fn link(
        &self,
        task_name: &str,
        descriptor: &TaskDescriptor,
        target_dir: &Path,
    ) -> CoreResult<Vec<LinkedDependency>> {
        let mut linked = Vec::new();

        for library in required_libraries(descriptor) {
            let version = self.registry.version(&library.name).map_err(|error| {
                error.attribute(task_name, PackageStage::Linking)
            })?;

            tracing::info!(
                task = %task_name,
                dependency = %library.name,
                version = %version,
                "linking external library"
            );

            let source = self
                .config
                .staging_root
                .join(&library.name)
                .join(version)
                .join(&library.source);
            if !layout::is_dir(&source).await {
                return Err(CoreError::new(
                    CoreErrorKind::Io,
                    format!("{} not found: {}", library.name, source.display()),
                )
                .attribute(task_name, PackageStage::Linking));
            }

            let destination = target_dir.join(&library.destination);
            layout::copy_dir_contents(&source, &destination)
                .await
                .map_err(|error| error.attribute(task_name, PackageStage::Linking))?;

            linked.push(LinkedDependency {
                kind: LinkKind::External,
                name: library.name,
                version: Some(version.to_string()),
                destination,
            });
        }

        for dep in self.internal.for_task(task_name) {
            tracing::info!(task = %task_name, module = %dep.module, "linking internal module");

            let source = self.config.common_src_root.join(&dep.module);
            let dest_parent = target_dir.join(&dep.dest);
            layout::create_dir_all(&dest_parent)
                .await
                .map_err(|error| error.attribute(task_name, PackageStage::Linking))?;
            let destination = layout::copy_dir_into(&source, &dest_parent)
                .await
                .map_err(|error| error.attribute(task_name, PackageStage::Linking))?;

            linked.push(LinkedDependency {
                kind: LinkKind::Internal,
                name: dep.module.clone(),
                version: None,
                destination,
            });
        }

        Ok(linked)
    }
}
