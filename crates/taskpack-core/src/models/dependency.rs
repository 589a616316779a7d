use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

/// One third-party library statically linked into a packaged task.
///
/// `source` is relative to `<staging>/<name>/<version>`, `destination` is
/// relative to the packaged task folder.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LibraryDependency {
    pub name: String,
    pub source: PathBuf,
    pub destination: PathBuf,
}

impl LibraryDependency {
    pub fn new(
        name: impl Into<String>,
        source: impl Into<PathBuf>,
        destination: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            destination: destination.into(),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
pub struct InternalDependency {
    pub module: String,
    pub dest: String,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct InternalDependencyMap {
    entries: BTreeMap<String, Vec<InternalDependency>>,
}

impl InternalDependencyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(contents: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(contents)
    }

    pub fn insert(&mut self, task_name: impl Into<String>, deps: Vec<InternalDependency>) {
        self.entries.insert(task_name.into(), deps);
    }

    pub fn for_task(&self, task_name: &str) -> &[InternalDependency] {
        self.entries
            .get(task_name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}
