pub mod binding;
pub mod callback;
pub mod value;

pub use binding::{Binding, BindingTable, FieldSpec};
pub use callback::Callback;
pub use value::Value;
