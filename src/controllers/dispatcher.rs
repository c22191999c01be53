// src/controllers/dispatcher.rs
//
// Compiles the binding table once per session into pre-classified routes, then
// turns incoming (address, args) pairs into callback descriptors. Routing never
// touches the host.

use nannou_osc as osc;
use std::collections::HashMap;

use crate::error::BindingResolutionError;
use crate::host::{Host, ObjectRef};
use crate::models::{Binding, BindingTable, Callback, FieldSpec, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Scalar,
    Custom,
    Component(usize),
    Vector,
}

#[derive(Debug, Clone)]
struct Route {
    target: ObjectRef,
    field: String,
    shape: Shape,
    selectors: Vec<usize>,
}

/// A successfully compiled binding, in table order. Shared with the outbound poller.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundField {
    pub address: String,
    pub target: ObjectRef,
    pub field: String,
    pub component: Option<usize>,
}

#[derive(Debug, Default)]
pub struct Dispatcher {
    routes: HashMap<String, Route>,
    bound: Vec<BoundField>,
}

impl Dispatcher {
    /// Compile every binding against the host. Bindings that fail are skipped
    /// and returned so the caller can report them once.
    pub fn compile<H: Host>(table: &BindingTable, host: &H) -> (Self, Vec<BindingResolutionError>) {
        let mut dispatcher = Self::default();
        let mut errors = Vec::new();

        for binding in table.iter() {
            match Self::compile_binding(binding, host) {
                Ok(route) => {
                    dispatcher.bound.push(BoundField {
                        address: binding.address.clone(),
                        target: route.target,
                        field: route.field.clone(),
                        component: match route.shape {
                            Shape::Component(index) => Some(index),
                            _ => None,
                        },
                    });
                    dispatcher.routes.insert(binding.address.clone(), route);
                }
                Err(e) => errors.push(e),
            }
        }

        (dispatcher, errors)
    }

    fn compile_binding<H: Host>(binding: &Binding, host: &H) -> Result<Route, BindingResolutionError> {
        let target = host.resolve_target(&binding.data_path).ok_or_else(|| {
            BindingResolutionError::TargetNotFound {
                address: binding.address.clone(),
                path: binding.data_path.clone(),
            }
        })?;
        let selectors = binding.selectors()?;
        let unknown_field = |field: &str| BindingResolutionError::UnknownField {
            address: binding.address.clone(),
            path: binding.data_path.clone(),
            field: field.to_string(),
        };

        let field = binding.field();
        let (shape, arity) = match &field {
            // custom properties may be created by the host on first write
            FieldSpec::Custom(_) => (Shape::Custom, 1),
            FieldSpec::Component { name, index } => match host.read_field(target, name, None) {
                None => return Err(unknown_field(name)),
                Some(Value::Vector(components)) if *index < components.len() => {
                    (Shape::Component(*index), 1)
                }
                Some(_) => {
                    return Err(BindingResolutionError::UnrecognizedField {
                        address: binding.address.clone(),
                        field: binding.id.clone(),
                    })
                }
            },
            FieldSpec::Attribute(name) => match host.read_field(target, name, None) {
                None => return Err(unknown_field(name)),
                Some(Value::Vector(components)) if matches!(components.len(), 3 | 4) => {
                    (Shape::Vector, components.len())
                }
                Some(Value::Vector(_)) => {
                    return Err(BindingResolutionError::UnrecognizedField {
                        address: binding.address.clone(),
                        field: binding.id.clone(),
                    })
                }
                Some(_) => (Shape::Scalar, 1),
            },
        };

        let selectors = match selectors.len() {
            0 => (0..arity).collect(),
            n if n == arity => selectors,
            n => {
                return Err(BindingResolutionError::SelectorArity {
                    address: binding.address.clone(),
                    expected: arity,
                    actual: n,
                })
            }
        };

        Ok(Route {
            target,
            field: field.name().to_string(),
            shape,
            selectors,
        })
    }

    pub fn route(&self, address: &str, args: Vec<osc::Type>) -> Callback {
        let Some(route) = self.routes.get(address) else {
            return Callback::Unmatched {
                address: address.to_string(),
                args,
            };
        };

        let address = address.to_string();
        let target = route.target;
        let field = route.field.clone();
        let selectors = route.selectors.clone();
        match route.shape {
            Shape::Scalar | Shape::Custom => Callback::ScalarWrite {
                address,
                target,
                field,
                custom: route.shape == Shape::Custom,
                selectors,
                args,
            },
            Shape::Component(component) => Callback::ComponentWrite {
                address,
                target,
                field,
                component,
                selectors,
                args,
            },
            Shape::Vector => Callback::VectorWrite {
                address,
                target,
                field,
                selectors,
                args,
            },
        }
    }

    pub fn bound_fields(&self) -> &[BoundField] {
        &self.bound
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::SceneHost;

    fn scene() -> (SceneHost, ObjectRef) {
        let mut host = SceneHost::new();
        let cube = host.add_object(
            "objects['Cube']",
            [
                ("location", Value::Vector(vec![0.0; 3])),
                ("rotation_quaternion", Value::Vector(vec![1.0, 0.0, 0.0, 0.0])),
                ("uv", Value::Vector(vec![0.0; 2])),
                ("hide", Value::Bool(false)),
            ],
        );
        (host, cube)
    }

    fn compile(bindings: &[Binding]) -> (Dispatcher, Vec<BindingResolutionError>, ObjectRef) {
        let (host, cube) = scene();
        let mut table = BindingTable::new();
        for binding in bindings {
            table.insert(binding.clone());
        }
        let (dispatcher, errors) = Dispatcher::compile(&table, &host);
        (dispatcher, errors, cube)
    }

    #[test]
    fn test_unmatched_address() {
        let (dispatcher, _, _) = compile(&[]);
        let args = vec![osc::Type::Float(0.5)];
        assert_eq!(
            dispatcher.route("/nobody", args.clone()),
            Callback::Unmatched {
                address: "/nobody".to_string(),
                args
            }
        );
    }

    #[test]
    fn test_classifies_field_shapes() {
        let (dispatcher, errors, cube) = compile(&[
            Binding::new("/glow", "objects['Cube']", r#"["glow"]"#, "2"),
            Binding::new("/x", "objects['Cube']", "location[0]", "0"),
            Binding::new("/loc", "objects['Cube']", "location", "(2, 1, 0)"),
            Binding::new("/rot", "objects['Cube']", "rotation_quaternion", ""),
            Binding::new("/hide", "objects['Cube']", "hide", "0"),
        ]);
        assert!(errors.is_empty());
        assert_eq!(dispatcher.len(), 5);

        assert!(matches!(
            dispatcher.route("/glow", vec![]),
            Callback::ScalarWrite { ref field, ref selectors, custom: true, .. } if field == "glow" && selectors == &vec![2]
        ));
        assert!(matches!(
            dispatcher.route("/x", vec![]),
            Callback::ComponentWrite { component: 0, ref field, target, .. } if field == "location" && target == cube
        ));
        assert!(matches!(
            dispatcher.route("/loc", vec![]),
            Callback::VectorWrite { ref selectors, .. } if selectors == &vec![2, 1, 0]
        ));
        assert!(matches!(
            dispatcher.route("/rot", vec![]),
            Callback::VectorWrite { ref selectors, .. } if selectors == &vec![0, 1, 2, 3]
        ));
        assert!(matches!(
            dispatcher.route("/hide", vec![]),
            Callback::ScalarWrite { custom: false, .. }
        ));
    }

    #[test]
    fn test_unresolvable_bindings_are_skipped() {
        let (dispatcher, errors, _) = compile(&[
            Binding::new("/missing", "objects['Sphere']", "location", ""),
            Binding::new("/nofield", "objects['Cube']", "scale", ""),
            Binding::new("/uv", "objects['Cube']", "uv", ""),
            Binding::new("/arity", "objects['Cube']", "location", "(0, 1)"),
            Binding::new("/ok", "objects['Cube']", "location[2]", "0"),
            Binding::new("/slot", "objects['Cube']", "location[7]", "0"),
            Binding::new("/flag", "objects['Cube']", "hide[0]", "0"),
        ]);

        assert_eq!(dispatcher.len(), 1);
        assert_eq!(errors.len(), 6);
        assert!(matches!(errors[0], BindingResolutionError::TargetNotFound { .. }));
        assert!(matches!(errors[1], BindingResolutionError::UnknownField { .. }));
        assert!(matches!(errors[2], BindingResolutionError::UnrecognizedField { .. }));
        assert!(matches!(
            errors[3],
            BindingResolutionError::SelectorArity { expected: 3, actual: 2, .. }
        ));
        assert!(matches!(
            &errors[4],
            BindingResolutionError::UnrecognizedField { address, .. } if address == "/slot"
        ));
        assert!(matches!(
            &errors[5],
            BindingResolutionError::UnrecognizedField { address, .. } if address == "/flag"
        ));
        assert!(matches!(dispatcher.route("/slot", vec![]), Callback::Unmatched { .. }));
        assert!(matches!(dispatcher.route("/missing", vec![]), Callback::Unmatched { .. }));
    }

    #[test]
    fn test_bound_fields_follow_table_order() {
        let (dispatcher, _, cube) = compile(&[
            Binding::new("/b", "objects['Cube']", "location[1]", "0"),
            Binding::new("/a", "objects['Cube']", "location", ""),
        ]);
        let bound = dispatcher.bound_fields();
        assert_eq!(bound[0].address, "/b");
        assert_eq!(bound[0].component, Some(1));
        assert_eq!(bound[1].target, cube);
        assert_eq!(bound[1].component, None);
    }
}
