// src/models/callback.rs
// routed callback descriptors, produced by the dispatcher and applied on the main turn

use nannou_osc as osc;

use crate::host::ObjectRef;

#[derive(Debug, Clone, PartialEq)]
pub enum Callback {
    /// No binding for the address. Only updates diagnostics.
    Unmatched {
        address: String,
        args: Vec<osc::Type>,
    },
    /// Whole-field assign from one argument slot.
    ScalarWrite {
        address: String,
        target: ObjectRef,
        field: String,
        /// user-defined property, created by the host on first write
        custom: bool,
        selectors: Vec<usize>,
        args: Vec<osc::Type>,
    },
    /// Assign one component of a compound field.
    ComponentWrite {
        address: String,
        target: ObjectRef,
        field: String,
        component: usize,
        selectors: Vec<usize>,
        args: Vec<osc::Type>,
    },
    /// Assign all 3 or 4 components of a vector/quaternion field.
    VectorWrite {
        address: String,
        target: ObjectRef,
        field: String,
        selectors: Vec<usize>,
        args: Vec<osc::Type>,
    },
}

impl Callback {
    pub fn address(&self) -> &str {
        match self {
            Callback::Unmatched { address, .. }
            | Callback::ScalarWrite { address, .. }
            | Callback::ComponentWrite { address, .. }
            | Callback::VectorWrite { address, .. } => address,
        }
    }

    pub fn args(&self) -> &[osc::Type] {
        match self {
            Callback::Unmatched { args, .. }
            | Callback::ScalarWrite { args, .. }
            | Callback::ComponentWrite { args, .. }
            | Callback::VectorWrite { args, .. } => args,
        }
    }

    pub fn target(&self) -> Option<ObjectRef> {
        match self {
            Callback::Unmatched { .. } => None,
            Callback::ScalarWrite { target, .. }
            | Callback::ComponentWrite { target, .. }
            | Callback::VectorWrite { target, .. } => Some(*target),
        }
    }
}
