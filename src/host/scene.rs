// src/host/scene.rs
// in-memory scene graph implementing `Host`, used headless and in tests

use std::collections::HashMap;

use super::{Host, ObjectRef};
use crate::error::WriteError;
use crate::models::Value;

#[derive(Debug, Default)]
struct SceneObject {
    fields: HashMap<String, Value>,
}

#[derive(Debug, Default)]
pub struct SceneHost {
    paths: HashMap<String, ObjectRef>,
    objects: HashMap<ObjectRef, SceneObject>,
    next_id: u64,
}

impl SceneHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object at `path`, replacing whatever lived there before.
    pub fn add_object<'a, I>(&mut self, path: &str, fields: I) -> ObjectRef
    where
        I: IntoIterator<Item = (&'a str, Value)>,
    {
        self.remove_object(path);

        let target = ObjectRef(self.next_id);
        self.next_id += 1;

        let object = SceneObject {
            fields: fields
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
        };
        self.paths.insert(path.to_string(), target);
        self.objects.insert(target, object);
        target
    }

    /// Delete an object. Handles to it become stale.
    pub fn remove_object(&mut self, path: &str) -> bool {
        match self.paths.remove(path) {
            Some(target) => self.objects.remove(&target).is_some(),
            None => false,
        }
    }

    /// Host-side edit, bypassing type checks.
    pub fn set_field(&mut self, target: ObjectRef, field: &str, value: Value) -> bool {
        match self.objects.get_mut(&target) {
            Some(object) => {
                object.fields.insert(field.to_string(), value);
                true
            }
            None => false,
        }
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }
}

fn coerce(field: &str, current: &Value, value: Value) -> Result<Value, WriteError> {
    let mismatch = |found: &'static str| WriteError::TypeMismatch {
        field: field.to_string(),
        expected: current.kind(),
        found,
    };

    match (current, value) {
        (Value::Int(_), Value::Int(i)) => Ok(Value::Int(i)),
        (Value::Int(_), Value::Float(f)) => Ok(Value::Int(f as i32)),
        (Value::Int(_), Value::Bool(b)) => Ok(Value::Int(b as i32)),
        (Value::Float(_), v) => v.as_f32().map(Value::Float).ok_or_else(|| mismatch(v.kind())),
        (Value::Bool(_), v) => v
            .as_f32()
            .map(|f| Value::Bool(f != 0.0))
            .ok_or_else(|| mismatch(v.kind())),
        (Value::Str(_), Value::Str(s)) => Ok(Value::Str(s)),
        (Value::Vector(old), Value::Vector(new)) if old.len() == new.len() => Ok(Value::Vector(new)),
        (_, v) => Err(mismatch(v.kind())),
    }
}

impl Host for SceneHost {
    fn resolve_target(&self, path: &str) -> Option<ObjectRef> {
        self.paths.get(path).copied()
    }

    fn read_field(&self, target: ObjectRef, field: &str, index: Option<usize>) -> Option<Value> {
        let value = self.objects.get(&target)?.fields.get(field)?;
        match (index, value) {
            (None, value) => Some(value.clone()),
            (Some(i), Value::Vector(components)) => components.get(i).copied().map(Value::Float),
            (Some(_), _) => None,
        }
    }

    fn write_field(
        &mut self,
        target: ObjectRef,
        field: &str,
        index: Option<usize>,
        value: Value,
    ) -> Result<(), WriteError> {
        let object = self
            .objects
            .get_mut(&target)
            .ok_or(WriteError::StaleTarget(target))?;
        let current = object
            .fields
            .get_mut(field)
            .ok_or_else(|| WriteError::UnknownField(field.to_string()))?;

        match index {
            Some(index) => {
                let found = current.kind();
                let Value::Vector(components) = current else {
                    return Err(WriteError::TypeMismatch {
                        field: field.to_string(),
                        expected: "vector",
                        found,
                    });
                };
                let len = components.len();
                let component = value.as_f32().ok_or_else(|| WriteError::TypeMismatch {
                    field: field.to_string(),
                    expected: "number",
                    found: value.kind(),
                })?;
                let slot = components
                    .get_mut(index)
                    .ok_or_else(|| WriteError::ComponentOutOfRange {
                        field: field.to_string(),
                        index,
                        len,
                    })?;
                *slot = component;
            }
            None => {
                let next = coerce(field, current, value)?;
                *current = next;
            }
        }
        Ok(())
    }

    fn write_custom(&mut self, target: ObjectRef, name: &str, value: Value) -> Result<(), WriteError> {
        let object = self
            .objects
            .get_mut(&target)
            .ok_or(WriteError::StaleTarget(target))?;
        if !object.fields.contains_key(name) {
            object.fields.insert(name.to_string(), value);
            return Ok(());
        }
        self.write_field(target, name, None, value)
    }
}
