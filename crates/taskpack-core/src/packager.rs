use std::path::{Path, PathBuf};

use crate::layout;
use crate::linking::{DependencyLinker, LinkedDependency};
use crate::models::{
    CoreError, CoreErrorKind, CoreResult, PackageStage, ResourceTable, TaskDescriptor,
};
use crate::strings::{self, LocalizationOutputs};
use crate::validation::validate_task;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PackagedTask {
    pub name: String,
    pub source_dir: PathBuf,
    pub package_dir: PathBuf,
    pub linked: Vec<LinkedDependency>,
    pub resources: ResourceTable,
    pub outputs: LocalizationOutputs,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ItemOutcome<T> {
    pub source: PathBuf,
    pub result: CoreResult<T>,
}

/// Per-item results of a run, in input order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PackageReport<T> {
    outcomes: Vec<ItemOutcome<T>>,
}

impl<T> Default for PackageReport<T> {
    fn default() -> Self {
        Self {
            outcomes: Vec::new(),
        }
    }
}

impl<T> PackageReport<T> {
    pub fn push(&mut self, source: PathBuf, result: CoreResult<T>) {
        self.outcomes.push(ItemOutcome { source, result });
    }

    pub fn outcomes(&self) -> &[ItemOutcome<T>] {
        &self.outcomes
    }

    pub fn successes(&self) -> impl Iterator<Item = &T> {
        self.outcomes
            .iter()
            .filter_map(|outcome| outcome.result.as_ref().ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = (&Path, &CoreError)> {
        self.outcomes.iter().filter_map(|outcome| {
            outcome
                .result
                .as_ref()
                .err()
                .map(|error| (outcome.source.as_path(), error))
        })
    }

    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(|outcome| outcome.result.is_ok())
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

struct Progress {
    label: String,
    stage: PackageStage,
}

impl Progress {
    fn new(label: String) -> Self {
        Self {
            label,
            stage: PackageStage::Pending,
        }
    }

    fn advance(&mut self) {
        self.stage = self.stage.advance();
        tracing::debug!(task = %self.label, stage = %self.stage, "task stage");
    }

    fn fail(&self, error: CoreError) -> CoreError {
        error.attribute(&self.label, self.stage)
    }
}

/// Validates, copies, links and localizes task folders into a package root.
#[derive(Clone)]
pub struct TaskPackager {
    package_root: PathBuf,
    linker: DependencyLinker,
}

impl TaskPackager {
    pub fn new(package_root: impl Into<PathBuf>, linker: DependencyLinker) -> Self {
        Self {
            package_root: package_root.into(),
            linker,
        }
    }

    pub fn package_root(&self) -> &Path {
        &self.package_root
    }

    pub async fn package_all<I>(&self, task_jsons: I) -> PackageReport<PackagedTask>
    where
        I: IntoIterator,
        I::Item: AsRef<Path>,
    {
        let mut report = PackageReport::default();
        for task_json in task_jsons {
            let task_json = task_json.as_ref();
            let result = self.package_task(task_json).await;
            if let Err(error) = &result {
                tracing::error!(
                    source = %task_json.display(),
                    task = error.subject.as_deref().unwrap_or_default(),
                    stage = ?error.stage,
                    kind = ?error.kind,
                    message = %error.message,
                    "failed to package task"
                );
            }
            report.push(task_json.to_path_buf(), result);
        }
        report
    }

    pub async fn package_task(&self, task_json: &Path) -> CoreResult<PackagedTask> {
        let source_dir = parent_dir(task_json);
        let mut progress = Progress::new(folder_name(&source_dir));

        progress.advance();
        let descriptor = read_descriptor(task_json, &progress.label)
            .await
            .map_err(|error| progress.fail(error))?;
        validate_task(&progress.label, &descriptor)
            .map_err(|failure| progress.fail(failure.into()))?;
        // Validation guarantees a usable name from here on.
        progress.label = descriptor.display_label(&progress.label);
        let name = progress.label.clone();

        progress.advance();
        tracing::info!(task = %name, "packaging");
        let package_dir = self.package_root.join(&name);
        layout::copy_task_folder(&source_dir, &package_dir)
            .await
            .map_err(|error| progress.fail(error))?;

        progress.advance();
        let linked = self
            .linker
            .link(&name, &descriptor, &package_dir)
            .await
            .map_err(|error| progress.fail(error))?;

        progress.advance();
        let (rewritten, resources) =
            strings::externalize(descriptor).map_err(|error| progress.fail(error))?;
        let outputs =
            strings::write_task_localization(&rewritten, &resources, &package_dir, &source_dir)
                .await
                .map_err(|error| progress.fail(error))?;

        progress.advance();
        Ok(PackagedTask {
            name,
            source_dir,
            package_dir,
            linked,
            resources,
            outputs,
        })
    }
}

pub async fn validate_all<I>(task_jsons: I) -> PackageReport<TaskDescriptor>
where
    I: IntoIterator,
    I::Item: AsRef<Path>,
{
    let mut report = PackageReport::default();
    for task_json in task_jsons {
        let task_json = task_json.as_ref();
        report.push(task_json.to_path_buf(), check_task(task_json).await);
    }
    report
}

pub async fn check_task(task_json: &Path) -> CoreResult<TaskDescriptor> {
    let label = folder_name(&parent_dir(task_json));
    let descriptor = read_descriptor(task_json, &label)
        .await
        .map_err(|error| error.attribute(&label, PackageStage::Validating))?;
    validate_task(&label, &descriptor)?;
    Ok(descriptor)
}

pub async fn localize_modules<I>(module_jsons: I) -> PackageReport<PathBuf>
where
    I: IntoIterator,
    I::Item: AsRef<Path>,
{
    let mut report = PackageReport::default();
    for module_json in module_jsons {
        let module_json = module_json.as_ref();
        let result = strings::localize_module(module_json).await;
        if let Err(error) = &result {
            tracing::error!(
                source = %module_json.display(),
                kind = ?error.kind,
                message = %error.message,
                "failed to localize module"
            );
        }
        report.push(module_json.to_path_buf(), result);
    }
    report
}

async fn read_descriptor(task_json: &Path, label: &str) -> CoreResult<TaskDescriptor> {
    let contents = tokio::fs::read_to_string(task_json)
        .await
        .map_err(|error| CoreError::io(task_json, "read", error))?;

    TaskDescriptor::from_json(&contents).map_err(|error| {
        CoreError::new(CoreErrorKind::Parse, format!("parse error: {error}")).subject(label)
    })
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn folder_name(dir: &Path) -> String {
    dir.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| dir.display().to_string())
}
