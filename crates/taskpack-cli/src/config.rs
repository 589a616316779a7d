use std::path::{Path, PathBuf};

use serde::Deserialize;
use taskpack_core::archive::{DEFAULT_MANIFEST_NAME, ToolInvocation};
use taskpack_core::linking::LinkerConfig;

/// Build layout and tool locations. Every field has a default, so a config
/// file only needs the entries that differ.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct PackagingConfig {
    /// Folder whose `*/task.json` files are packaged.
    pub tasks_root: PathBuf,

    /// Folder whose `*/module.json` files are localized, and the root that
    /// internal dependency module paths are relative to.
    pub common_root: PathBuf,

    pub package_root: PathBuf,

    pub staging_root: PathBuf,

    /// JSON map of external library name to pinned version.
    pub registry_path: PathBuf,

    /// JSON map of task name to `[{ "module", "dest" }]`. Optional.
    pub internal_deps_path: Option<PathBuf>,

    pub manifest_dir: PathBuf,

    pub archive_output: PathBuf,

    pub tool_runtime: PathBuf,
    pub tool_path: PathBuf,
    pub manifest_name: String,
}

impl Default for PackagingConfig {
    fn default() -> Self {
        let tool = ToolInvocation::default();
        Self {
            tasks_root: PathBuf::from("Tasks"),
            common_root: Path::new("Tasks").join("Common"),
            package_root: Path::new("_build").join("Tasks"),
            staging_root: PathBuf::from("_temp"),
            registry_path: PathBuf::from("externals.json"),
            internal_deps_path: None,
            manifest_dir: PathBuf::from("."),
            archive_output: Path::new("_build").join("Package"),
            tool_runtime: tool.runtime,
            tool_path: tool.tool_path,
            manifest_name: DEFAULT_MANIFEST_NAME.to_string(),
        }
    }
}

impl PackagingConfig {
    pub fn from_json(contents: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(contents)
    }

    pub fn load(path: Option<&Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let contents = std::fs::read_to_string(path)
            .map_err(|error| format!("could not read config {}: {error}", path.display()))?;
        let config = Self::from_json(&contents)
            .map_err(|error| format!("invalid config {}: {error}", path.display()))?;
        Ok(config)
    }

    pub fn linker_config(&self) -> LinkerConfig {
        LinkerConfig {
            staging_root: self.staging_root.clone(),
            common_src_root: self.common_root.clone(),
        }
    }

    pub fn tool_invocation(&self) -> ToolInvocation {
        ToolInvocation {
            runtime: self.tool_runtime.clone(),
            tool_path: self.tool_path.clone(),
            manifest_name: self.manifest_name.clone(),
        }
    }
}
