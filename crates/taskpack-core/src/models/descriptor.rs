use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const KEY_ID: &str = "id";
pub const KEY_NAME: &str = "name";
pub const KEY_FRIENDLY_NAME: &str = "friendlyName";
pub const KEY_DESCRIPTION: &str = "description";
pub const KEY_HELP_MARKDOWN: &str = "helpMarkDown";
pub const KEY_INSTANCE_NAME_FORMAT: &str = "instanceNameFormat";
pub const KEY_GROUPS: &str = "groups";
pub const KEY_INPUTS: &str = "inputs";
pub const KEY_EXECUTION: &str = "execution";
pub const KEY_MESSAGES: &str = "messages";
pub const KEY_DISPLAY_NAME: &str = "displayName";
pub const KEY_LABEL: &str = "label";

/// A pipeline task manifest (`task.json`) held as an ordered JSON object.
/// Rewriting a field keeps its position.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskDescriptor {
    fields: Map<String, Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messages: Option<Map<String, Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TaskDescriptor {
    pub fn from_json(contents: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(contents)
    }

    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.fields.get_mut(key)
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.fields.insert(key.to_string(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.shift_remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// String value of a top-level field. Other JSON types read as absent.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn id(&self) -> Option<&str> {
        self.text(KEY_ID)
    }

    pub fn name(&self) -> Option<&str> {
        self.text(KEY_NAME)
    }

    pub fn friendly_name(&self) -> Option<&str> {
        self.text(KEY_FRIENDLY_NAME)
    }

    pub fn instance_name_format(&self) -> Option<&str> {
        self.text(KEY_INSTANCE_NAME_FORMAT)
    }

    /// Name used in diagnostics: the declared name, else the folder name.
    pub fn display_label(&self, folder_name: &str) -> String {
        match non_empty(self.name()) {
            Some(name) => name.to_string(),
            None => folder_name.to_string(),
        }
    }

    pub fn runtimes(&self) -> impl Iterator<Item = &str> {
        self.get(KEY_EXECUTION)
            .and_then(Value::as_object)
            .into_iter()
            .flat_map(|execution| execution.keys().map(String::as_str))
    }

    pub fn declares_runtime(&self, runtime: &str) -> bool {
        self.runtimes().any(|declared| declared == runtime)
    }

    pub fn groups(&self) -> impl Iterator<Item = &Map<String, Value>> {
        self.objects(KEY_GROUPS)
    }

    pub fn inputs(&self) -> impl Iterator<Item = &Map<String, Value>> {
        self.objects(KEY_INPUTS)
    }

    pub fn groups_mut(&mut self) -> impl Iterator<Item = &mut Map<String, Value>> {
        self.objects_mut(KEY_GROUPS)
    }

    pub fn inputs_mut(&mut self) -> impl Iterator<Item = &mut Map<String, Value>> {
        self.objects_mut(KEY_INPUTS)
    }

    pub fn messages_mut(&mut self) -> Option<&mut Map<String, Value>> {
        self.get_mut(KEY_MESSAGES).and_then(Value::as_object_mut)
    }

    fn objects(&self, key: &'static str) -> impl Iterator<Item = &Map<String, Value>> {
        self.get(key)
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_object)
    }

    fn objects_mut(&mut self, key: &'static str) -> impl Iterator<Item = &mut Map<String, Value>> {
        self.get_mut(key)
            .and_then(Value::as_array_mut)
            .into_iter()
            .flatten()
            .filter_map(Value::as_object_mut)
    }
}

impl ModuleDescriptor {
    pub fn from_json(contents: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(contents)
    }
}

pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::TaskDescriptor;

    #[test]
    fn rendering_keeps_authored_key_order() {
        let descriptor = TaskDescriptor::from_json(
            r#"{
                "id": "123e4567-e89b-12d3-a456-426614174000",
                "category": "Utility",
                "name": "SampleTask",
                "version": { "Major": 1, "Minor": 2, "Patch": 3 },
                "inputs": [{ "name": "x", "type": "string", "label": "X", "required": true }]
            }"#,
        )
        .expect("descriptor should parse");

        let rendered = descriptor.to_pretty_json().expect("descriptor should render");
        let value: serde_json::Value =
            serde_json::from_str(&rendered).expect("rendered descriptor should parse");

        assert_eq!(
            descriptor.keys().collect::<Vec<_>>(),
            vec!["id", "category", "name", "version", "inputs"]
        );
        assert_eq!(value["version"]["Minor"], 2);
        let input_keys: Vec<_> = value["inputs"][0]
            .as_object()
            .expect("input is an object")
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(input_keys, vec!["name", "type", "label", "required"]);
    }

    #[test]
    fn display_label_falls_back_to_folder_name() {
        let mut descriptor = TaskDescriptor::default();
        assert_eq!(descriptor.display_label("CopyFiles"), "CopyFiles");

        descriptor.set("name", "CopyFilesV2");
        assert_eq!(descriptor.display_label("CopyFiles"), "CopyFilesV2");

        descriptor.set("name", 7);
        assert_eq!(descriptor.display_label("CopyFiles"), "CopyFiles");
    }

    #[test]
    fn runtimes_lists_execution_keys() {
        let descriptor = TaskDescriptor::from_json(
            r#"{ "execution": { "Node10": { "target": "index.js" }, "PowerShell3": {} } }"#,
        )
        .expect("descriptor should parse");

        assert_eq!(
            descriptor.runtimes().collect::<Vec<_>>(),
            vec!["Node10", "PowerShell3"]
        );
        assert!(descriptor.declares_runtime("PowerShell3"));
        assert!(!descriptor.declares_runtime("Node16"));
    }

    #[test]
    fn malformed_sections_yield_nothing() {
        let mut descriptor = TaskDescriptor::from_json(
            r#"{ "execution": [], "inputs": { "name": "x" }, "groups": ["a", { "name": "g" }] }"#,
        )
        .expect("descriptor should parse");

        assert_eq!(descriptor.runtimes().count(), 0);
        assert_eq!(descriptor.inputs_mut().count(), 0);
        assert_eq!(descriptor.groups_mut().count(), 1);
        assert!(descriptor.messages_mut().is_none());
    }

    #[test]
    fn non_object_documents_are_rejected() {
        assert!(TaskDescriptor::from_json("[1, 2]").is_err());
    }
}
