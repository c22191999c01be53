// src/host/mod.rs
//
// The interface the engine consumes from the host application. All calls are
// made from the main turn only.

pub mod scene;

pub use scene::SceneHost;

use crate::error::WriteError;
use crate::models::Value;

/// Non-owning handle to a live host object, resolved once per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectRef(pub u64);

pub trait Host {
    fn resolve_target(&self, path: &str) -> Option<ObjectRef>;

    /// Current value of `field`, or of one of its components when `index` is set.
    fn read_field(&self, target: ObjectRef, field: &str, index: Option<usize>) -> Option<Value>;

    fn write_field(
        &mut self,
        target: ObjectRef,
        field: &str,
        index: Option<usize>,
        value: Value,
    ) -> Result<(), WriteError>;

    /// Assign a user-defined property, creating it when the target lacks it.
    fn write_custom(&mut self, target: ObjectRef, name: &str, value: Value) -> Result<(), WriteError> {
        self.write_field(target, name, None, value)
    }
}
