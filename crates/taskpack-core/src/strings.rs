use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::layout::{self, resources_path, task_loc_path};
use crate::models::descriptor::{
    KEY_DESCRIPTION, KEY_DISPLAY_NAME, KEY_FRIENDLY_NAME, KEY_HELP_MARKDOWN,
    KEY_INSTANCE_NAME_FORMAT, KEY_LABEL, KEY_NAME, non_empty,
};
use crate::models::resources::{
    LOC_DESCRIPTION, LOC_FRIENDLY_NAME, LOC_GROUP_DISPLAY_NAME, LOC_HELP_MARKDOWN,
    LOC_INPUT_HELP, LOC_INPUT_LABEL, LOC_INSTANCE_NAME_FORMAT, LOC_MESSAGES,
};
use crate::models::{
    CoreError, CoreErrorKind, CoreResult, ModuleDescriptor, PackageStage, ResourceTable,
    TaskDescriptor, resource_ref,
};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LocalizationOutputs {
    pub resources: PathBuf,
    pub task_loc: PathBuf,
    pub source_resources: PathBuf,
    pub source_task_loc: PathBuf,
}

/// Moves every localizable literal into a resource table and rewrites the
/// field in place as an `ms-resource:` token. Absent or empty literals and
/// unnamed groups or inputs are left alone.
pub fn externalize(mut descriptor: TaskDescriptor) -> CoreResult<(TaskDescriptor, ResourceTable)> {
    let mut table = ResourceTable::new();
    let label = descriptor.display_label("task");

    for (field, key) in [
        (KEY_FRIENDLY_NAME, LOC_FRIENDLY_NAME),
        (KEY_HELP_MARKDOWN, LOC_HELP_MARKDOWN),
        (KEY_DESCRIPTION, LOC_DESCRIPTION),
        (KEY_INSTANCE_NAME_FORMAT, LOC_INSTANCE_NAME_FORMAT),
    ] {
        move_literal(&mut table, &label, field, key, descriptor.get_mut(field))?;
    }

    for group in descriptor.groups_mut() {
        let Some(name) = item_name(group) else {
            continue;
        };
        let key = format!("{LOC_GROUP_DISPLAY_NAME}{name}");
        let slot = group.get_mut(KEY_DISPLAY_NAME);
        move_literal(&mut table, &label, KEY_DISPLAY_NAME, &key, slot)?;
    }

    for input in descriptor.inputs_mut() {
        let Some(name) = item_name(input) else {
            continue;
        };
        let label_key = format!("{LOC_INPUT_LABEL}{name}");
        let help_key = format!("{LOC_INPUT_HELP}{name}");

        move_literal(&mut table, &label, KEY_LABEL, &label_key, input.get_mut(KEY_LABEL))?;
        move_literal(
            &mut table,
            &label,
            KEY_HELP_MARKDOWN,
            &help_key,
            input.get_mut(KEY_HELP_MARKDOWN),
        )?;
    }

    if let Some(messages) = descriptor.messages_mut() {
        externalize_messages(&mut table, &label, messages)?;
    }

    Ok((descriptor, table))
}

pub fn module_resources(label: &str, module: &ModuleDescriptor) -> CoreResult<ResourceTable> {
    let mut table = ResourceTable::new();
    for (key, value) in module.messages.iter().flatten() {
        let text = message_text(label, key, value)?;
        insert_unique(&mut table, label, format!("{LOC_MESSAGES}{key}"), text)?;
    }
    Ok(table)
}

/// Writes both localization files into the package, then mirrors them to the source folder.
pub async fn write_task_localization(
    descriptor: &TaskDescriptor,
    table: &ResourceTable,
    package_dir: &Path,
    source_dir: &Path,
) -> CoreResult<LocalizationOutputs> {
    let outputs = LocalizationOutputs {
        resources: resources_path(package_dir),
        task_loc: task_loc_path(package_dir),
        source_resources: resources_path(source_dir),
        source_task_loc: task_loc_path(source_dir),
    };

    let resources_json = table.to_pretty_json().map_err(|error| {
        CoreError::new(
            CoreErrorKind::Parse,
            format!("could not serialize resources: {error}"),
        )
    })?;
    layout::write_file(&outputs.resources, &resources_json).await?;

    let descriptor_json = descriptor.to_pretty_json().map_err(|error| {
        CoreError::new(
            CoreErrorKind::Parse,
            format!("could not serialize task.loc.json: {error}"),
        )
    })?;
    layout::write_file(&outputs.task_loc, &descriptor_json).await?;

    layout::copy_file(&outputs.resources, &outputs.source_resources).await?;
    layout::copy_file(&outputs.task_loc, &outputs.source_task_loc).await?;

    Ok(outputs)
}

pub async fn localize_module(module_json: &Path) -> CoreResult<PathBuf> {
    let contents = tokio::fs::read_to_string(module_json)
        .await
        .map_err(|error| CoreError::io(module_json, "read", error))?;

    let module = ModuleDescriptor::from_json(&contents).map_err(|error| {
        CoreError::new(
            CoreErrorKind::Parse,
            format!(
                "common module {} parse error: {error}",
                module_json.display()
            ),
        )
    })?;

    let module_dir = module_json.parent().unwrap_or_else(|| Path::new("."));
    let label = module_dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| module_json.display().to_string());

    let table = module_resources(&label, &module)?;
    let resources = resources_path(module_dir);
    let json = table.to_pretty_json().map_err(|error| {
        CoreError::new(
            CoreErrorKind::Parse,
            format!("could not serialize resources: {error}"),
        )
    })?;
    layout::write_file(&resources, &json)
        .await
        .map_err(|error| error.subject(label))?;

    Ok(resources)
}

fn move_literal(
    table: &mut ResourceTable,
    label: &str,
    field: &str,
    key: &str,
    slot: Option<&mut Value>,
) -> CoreResult<()> {
    let literal = match slot {
        Some(Value::String(literal)) if !literal.is_empty() => literal,
        None | Some(Value::Null) | Some(Value::String(_)) => return Ok(()),
        Some(other) => {
            return Err(CoreError::new(
                CoreErrorKind::Validation,
                format!("{field} must be a string, found {other}"),
            )
            .subject(label)
            .stage(PackageStage::Externalizing));
        }
    };
    let text = std::mem::replace(literal, resource_ref(key));
    insert_unique(table, label, key.to_string(), text)
}

fn item_name(item: &Map<String, Value>) -> Option<String> {
    non_empty(item.get(KEY_NAME).and_then(Value::as_str)).map(str::to_string)
}

fn externalize_messages(
    table: &mut ResourceTable,
    label: &str,
    messages: &mut Map<String, Value>,
) -> CoreResult<()> {
    for (key, value) in messages.iter_mut() {
        let text = message_text(label, key, value)?;
        let resource_key = format!("{LOC_MESSAGES}{key}");
        insert_unique(table, label, resource_key.clone(), text)?;
        *value = Value::String(resource_ref(&resource_key));
    }
    Ok(())
}

fn message_text(label: &str, key: &str, value: &Value) -> CoreResult<String> {
    match value {
        Value::String(text) => Ok(text.clone()),
        other => Err(CoreError::new(
            CoreErrorKind::Validation,
            format!("messages.{key} must be a string, found {other}"),
        )
        .subject(label)
        .stage(PackageStage::Externalizing)),
    }
}

fn insert_unique(
    table: &mut ResourceTable,
    label: &str,
    key: String,
    value: String,
) -> CoreResult<()> {
    if table.contains_key(&key) {
        return Err(CoreError::new(
            CoreErrorKind::Validation,
            format!("resource key {key} is produced by more than one field"),
        )
        .subject(label)
        .stage(PackageStage::Externalizing));
    }
    table.insert(key, value);
    Ok(())
}
