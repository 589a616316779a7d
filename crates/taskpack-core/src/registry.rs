use std::collections::BTreeMap;
use std::path::Path;

use crate::models::{CoreError, CoreErrorKind, CoreResult, InternalDependencyMap};

const DEFAULT_SOURCE: &str = "externals.json";

/// Pinned versions of the third-party libraries tasks link against.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DependencyRegistry {
    source: String,
    versions: BTreeMap<String, String>,
}

impl DependencyRegistry {
    pub fn from_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            source: DEFAULT_SOURCE.to_string(),
            versions: entries
                .into_iter()
                .map(|(name, version)| (name.into(), version.into()))
                .collect(),
        }
    }

    pub fn from_json(source: impl Into<String>, contents: &str) -> CoreResult<Self> {
        let source = source.into();
        let versions: BTreeMap<String, String> =
            serde_json::from_str(contents).map_err(|error| {
                CoreError::new(
                    CoreErrorKind::Parse,
                    format!("{source} parse error: {error}"),
                )
            })?;
        Ok(Self { source, versions })
    }

    pub async fn load(path: &Path) -> CoreResult<Self> {
        let contents = read_config_file(path).await?;
        Self::from_json(path.display().to_string(), &contents)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.versions.get(name).map(String::as_str)
    }

    pub fn version(&self, name: &str) -> CoreResult<&str> {
        self.get(name).ok_or_else(|| {
            CoreError::new(
                CoreErrorKind::Configuration,
                format!("external {name} not defined in {}", self.source),
            )
        })
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }
}

pub async fn load_internal_dependencies(path: &Path) -> CoreResult<InternalDependencyMap> {
    let contents = read_config_file(path).await?;
    InternalDependencyMap::from_json(&contents).map_err(|error| {
        CoreError::new(
            CoreErrorKind::Parse,
            format!("{} parse error: {error}", path.display()),
        )
    })
}

async fn read_config_file(path: &Path) -> CoreResult<String> {
    tokio::fs::read_to_string(path).await.map_err(|error| {
        CoreError::new(
            CoreErrorKind::Configuration,
            format!("could not read {}: {error}", path.display()),
        )
    })
}
