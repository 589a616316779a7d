use serde::ser::{Serialize, SerializeMap, Serializer};

pub const RESOURCE_REF_PREFIX: &str = "ms-resource:";

pub const LOC_FRIENDLY_NAME: &str = "loc.friendlyName";
pub const LOC_HELP_MARKDOWN: &str = "loc.helpMarkDown";
pub const LOC_DESCRIPTION: &str = "loc.description";
pub const LOC_INSTANCE_NAME_FORMAT: &str = "loc.instanceNameFormat";
pub const LOC_GROUP_DISPLAY_NAME: &str = "loc.group.displayName.";
pub const LOC_INPUT_LABEL: &str = "loc.input.label.";
pub const LOC_INPUT_HELP: &str = "loc.input.help.";
pub const LOC_MESSAGES: &str = "loc.messages.";

pub fn resource_ref(key: &str) -> String {
    format!("{RESOURCE_REF_PREFIX}{key}")
}

/// Ordered resource key to literal string mapping. Keys are unique.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ResourceTable {
    entries: Vec<(String, String)>,
}

impl ResourceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` and leaves the table untouched when `key` already exists.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> bool {
        let key = key.into();
        if self.contains_key(&key) {
            return false;
        }
        self.entries.push((key, value.into()));
        true
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(existing, _)| existing == key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl Serialize for ResourceTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
