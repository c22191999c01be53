// src/models/binding.rs
// OSC address -> host field bindings, and their JSON persistence format

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use crate::error::{BindingFileError, BindingResolutionError};

// `["name"]`
static CUSTOM_ID: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r#"^\[\s*["']([^"']+)["']\s*\]$"#).ok());
// `name[N]`
static COMPONENT_ID: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)\[(\d+)\]$").ok());
// `0`, `(0, 1, 2)`, `[3, 2, 1, 0]`
static SELECTOR_LIST: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[\(\[]?\s*(\d+\s*(,\s*\d+\s*)*,?)?\s*[\)\]]?$").ok());

/// One configured binding, in the shape it is persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub address: String,
    /// path of the host object, e.g. `objects['Cube']`
    pub data_path: String,
    /// field expression: `location`, `location[2]` or `["custom"]`
    pub id: String,
    pub osc_type: String,
    /// argument slots to read, e.g. `(0, 1, 2)`
    pub osc_index: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct BindingRecord {
    data_path: String,
    id: String,
    #[serde(default)]
    osc_type: String,
    #[serde(default)]
    osc_index: String,
}

/// Parsed form of `Binding::id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSpec {
    /// `["name"]`: custom property
    Custom(String),
    /// `name[N]`: one component of a compound field
    Component { name: String, index: usize },
    /// plain attribute, scalar or vector typed
    Attribute(String),
}

impl FieldSpec {
    pub fn parse(id: &str) -> Self {
        let id = id.trim();
        if let Some(name) = Self::parse_custom(id) {
            return FieldSpec::Custom(name);
        }
        if let Some((name, index)) = Self::parse_component(id) {
            return FieldSpec::Component { name, index };
        }
        FieldSpec::Attribute(id.to_string())
    }

    fn parse_custom(id: &str) -> Option<String> {
        let caps = CUSTOM_ID.as_ref()?.captures(id)?;
        Some(caps[1].to_string())
    }

    fn parse_component(id: &str) -> Option<(String, usize)> {
        let caps = COMPONENT_ID.as_ref()?.captures(id)?;
        let index = caps[2].parse().ok()?;
        Some((caps[1].to_string(), index))
    }

    pub fn name(&self) -> &str {
        match self {
            FieldSpec::Custom(name) | FieldSpec::Attribute(name) => name,
            FieldSpec::Component { name, .. } => name,
        }
    }

    pub fn component(&self) -> Option<usize> {
        match self {
            FieldSpec::Component { index, .. } => Some(*index),
            _ => None,
        }
    }
}

impl Binding {
    pub fn new(address: &str, data_path: &str, id: &str, osc_index: &str) -> Self {
        Self {
            address: address.to_string(),
            data_path: data_path.to_string(),
            id: id.to_string(),
            osc_type: String::new(),
            osc_index: osc_index.to_string(),
        }
    }

    pub fn field(&self) -> FieldSpec {
        FieldSpec::parse(&self.id)
    }

    /// Argument slot indices in `osc_index`. An empty list means "use the
    /// default slots for the field's arity".
    pub fn selectors(&self) -> Result<Vec<usize>, BindingResolutionError> {
        let invalid = || BindingResolutionError::InvalidSelectors {
            address: self.address.clone(),
            osc_index: self.osc_index.clone(),
        };

        let shape = SELECTOR_LIST.as_ref().ok_or_else(|| invalid())?;
        let text = self.osc_index.trim();
        if !shape.is_match(text) {
            return Err(invalid());
        }

        text.split(|c: char| c == ',' || c == '(' || c == ')' || c == '[' || c == ']')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<usize>().map_err(|_| invalid()))
            .collect()
    }
}

/// Ordered set of bindings, unique by address.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BindingTable {
    bindings: Vec<Binding>,
}

impl BindingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a binding. A binding already registered for the same address is
    /// replaced in place.
    pub fn insert(&mut self, binding: Binding) {
        match self.bindings.iter_mut().find(|b| b.address == binding.address) {
            Some(existing) => *existing = binding,
            None => self.bindings.push(binding),
        }
    }

    pub fn remove(&mut self, address: &str) -> Option<Binding> {
        let pos = self.bindings.iter().position(|b| b.address == address)?;
        Some(self.bindings.remove(pos))
    }

    pub fn clear(&mut self) {
        self.bindings.clear();
    }

    pub fn get(&self, address: &str) -> Option<&Binding> {
        self.bindings.iter().find(|b| b.address == address)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.iter()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Re-address the binding at `current` to the last received address.
    /// Ignored unless `last_seen` looks like an OSC address.
    pub fn pick_address(&mut self, current: &str, last_seen: &str) -> bool {
        if last_seen.len() <= 1 || !last_seen.starts_with('/') {
            return false;
        }
        if current != last_seen && self.get(last_seen).is_some() {
            // would shadow another binding
            return false;
        }
        match self.bindings.iter_mut().find(|b| b.address == current) {
            Some(binding) => {
                binding.address = last_seen.to_string();
                true
            }
            None => false,
        }
    }

    pub fn to_json(&self) -> Result<String, BindingFileError> {
        let mut table = serde_json::Map::new();
        for binding in &self.bindings {
            let record = BindingRecord {
                data_path: binding.data_path.clone(),
                id: binding.id.clone(),
                osc_type: binding.osc_type.clone(),
                osc_index: binding.osc_index.clone(),
            };
            table.insert(binding.address.clone(), serde_json::to_value(record)?);
        }
        Ok(serde_json::to_string_pretty(&serde_json::Value::Object(table))?)
    }

    pub fn from_json(content: &str) -> Result<Self, BindingFileError> {
        let parsed: serde_json::Value = serde_json::from_str(content)?;
        let entries = parsed.as_object().ok_or(BindingFileError::NotAnObject)?;

        let mut table = Self::new();
        for (address, value) in entries {
            let record: BindingRecord = serde_json::from_value(value.clone())?;
            table.insert(Binding {
                address: address.clone(),
                data_path: record.data_path,
                id: record.id,
                osc_type: record.osc_type,
                osc_index: record.osc_index,
            });
        }
        Ok(table)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, BindingFileError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), BindingFileError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patterns_compile() {
        assert!(CUSTOM_ID.is_some());
        assert!(COMPONENT_ID.is_some());
        assert!(SELECTOR_LIST.is_some());
    }

    #[test]
    fn test_parse_field_shapes() {
        assert_eq!(FieldSpec::parse(r#"["glow"]"#), FieldSpec::Custom("glow".to_string()));
        assert_eq!(
            FieldSpec::parse("location[2]"),
            FieldSpec::Component {
                name: "location".to_string(),
                index: 2
            }
        );
        assert_eq!(
            FieldSpec::parse("scale[12]").component(),
            Some(12),
        );
        assert_eq!(
            FieldSpec::parse("rotation_quaternion"),
            FieldSpec::Attribute("rotation_quaternion".to_string())
        );
    }

    #[test]
    fn test_selectors() {
        assert_eq!(Binding::new("/a", "p", "x", "(0, 1, 2)").selectors(), Ok(vec![0, 1, 2]));
        assert_eq!(Binding::new("/a", "p", "x", "3").selectors(), Ok(vec![3]));
        assert_eq!(Binding::new("/a", "p", "x", "[1,0]").selectors(), Ok(vec![1, 0]));
        assert_eq!(Binding::new("/a", "p", "x", "(4,)").selectors(), Ok(vec![4]));
        assert_eq!(Binding::new("/a", "p", "x", "").selectors(), Ok(vec![]));
    }

    #[test]
    fn test_invalid_selectors() {
        let binding = Binding::new("/a", "p", "x", "(0, one)");
        assert!(matches!(
            binding.selectors(),
            Err(BindingResolutionError::InvalidSelectors { .. })
        ));
    }

    #[test]
    fn test_later_binding_replaces_earlier() {
        let mut table = BindingTable::new();
        table.insert(Binding::new("/obj/x", "objects['A']", "location[0]", "0"));
        table.insert(Binding::new("/obj/y", "objects['A']", "location[1]", "0"));
        table.insert(Binding::new("/obj/x", "objects['B']", "location[0]", "1"));

        assert_eq!(table.len(), 2);
        let first = table.iter().next().map(|b| b.data_path.as_str());
        assert_eq!(first, Some("objects['B']"));
    }

    #[test]
    fn test_json_preserves_order_and_fields() {
        let mut table = BindingTable::new();
        table.insert(Binding::new("/z", "objects['Cube']", "location", "(0,1,2)"));
        table.insert(Binding::new("/a", "objects['Cube']", r#"["glow"]"#, "0"));

        let json = table.to_json().unwrap();
        let restored = BindingTable::from_json(&json).unwrap();
        assert_eq!(restored, table);
        assert!(json.find("\"/z\"").unwrap() < json.find("\"/a\"").unwrap());
    }

    #[test]
    fn test_import_legacy_format() {
        let json = r#"{
            "/cube/loc": {"data_path": "objects['Cube']", "id": "location", "osc_type": "f", "osc_index": "(0, 1, 2)"}
        }"#;
        let table = BindingTable::from_json(json).unwrap();
        let binding = table.get("/cube/loc").unwrap();
        assert_eq!(binding.osc_type, "f");
        assert_eq!(binding.selectors(), Ok(vec![0, 1, 2]));
    }

    #[test]
    fn test_import_rejects_non_object() {
        assert!(matches!(
            BindingTable::from_json("[1, 2]"),
            Err(BindingFileError::NotAnObject)
        ));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bindings.json");
        let mut table = BindingTable::new();
        table.insert(Binding::new("/a", "objects['Cube']", "scale", "(0,1,2)"));
        table.save(&path).unwrap();
        assert_eq!(BindingTable::load(&path).unwrap(), table);
    }

    #[test]
    fn test_pick_address() {
        let mut table = BindingTable::new();
        table.insert(Binding::new("/old", "objects['Cube']", "location[0]", "0"));
        table.insert(Binding::new("/taken", "objects['Cube']", "location[1]", "0"));

        assert!(!table.pick_address("/old", "/"));
        assert!(!table.pick_address("/old", "noslash"));
        assert!(!table.pick_address("/old", "/taken"));
        assert!(table.pick_address("/old", "/fader/1"));
        assert!(table.get("/fader/1").is_some());
        assert!(table.get("/old").is_none());
    }
}
