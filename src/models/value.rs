// src/models/value.rs
// host-side values and their OSC argument mapping

use nannou_osc as osc;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i32),
    Float(f32),
    Bool(bool),
    Str(String),
    /// 3 components for vectors, 4 for quaternions
    Vector(Vec<f32>),
}

impl Value {
    /// Convert one incoming OSC argument. Types without a host equivalent
    /// (blobs, time tags, colors, midi, nil, arrays) yield `None`.
    pub fn from_osc(arg: &osc::Type) -> Option<Self> {
        match arg {
            osc::Type::Int(i) => Some(Value::Int(*i)),
            osc::Type::Long(l) => i32::try_from(*l).ok().map(Value::Int),
            osc::Type::Float(f) => Some(Value::Float(*f)),
            osc::Type::Double(d) => Some(Value::Float(*d as f32)),
            osc::Type::Bool(b) => Some(Value::Bool(*b)),
            osc::Type::String(s) => Some(Value::Str(s.clone())),
            osc::Type::Char(c) => Some(Value::Str(c.to_string())),
            _ => None,
        }
    }

    pub fn to_osc_args(&self) -> Vec<osc::Type> {
        match self {
            Value::Int(i) => vec![osc::Type::Int(*i)],
            Value::Float(f) => vec![osc::Type::Float(*f)],
            Value::Bool(b) => vec![osc::Type::Bool(*b)],
            Value::Str(s) => vec![osc::Type::String(s.clone())],
            Value::Vector(components) => components.iter().map(|c| osc::Type::Float(*c)).collect(),
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Value::Int(i) => Some(*i as f32),
            Value::Float(f) => Some(*f),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Str(_) | Value::Vector(_) => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::Str(_) => "string",
            Value::Vector(c) if c.len() == 4 => "quaternion",
            Value::Vector(_) => "vector",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{}", v),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Vector(c) => write!(f, "{:?}", c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_osc_numeric() {
        assert_eq!(Value::from_osc(&osc::Type::Int(3)), Some(Value::Int(3)));
        assert_eq!(Value::from_osc(&osc::Type::Double(0.5)), Some(Value::Float(0.5)));
        assert_eq!(Value::from_osc(&osc::Type::Long(i64::MAX)), None);
    }

    #[test]
    fn test_blob_has_no_host_value() {
        assert_eq!(Value::from_osc(&osc::Type::Blob(vec![1, 2, 3])), None);
        assert_eq!(Value::from_osc(&osc::Type::Nil), None);
    }

    #[test]
    fn test_vector_decomposes_to_components() {
        let args = Value::Vector(vec![1.0, 2.0, 3.0]).to_osc_args();
        assert_eq!(
            args,
            vec![osc::Type::Float(1.0), osc::Type::Float(2.0), osc::Type::Float(3.0)]
        );
    }

    #[test]
    fn test_kind_distinguishes_quaternion() {
        assert_eq!(Value::Vector(vec![1.0, 0.0, 0.0, 0.0]).kind(), "quaternion");
        assert_eq!(Value::Vector(vec![0.0; 3]).kind(), "vector");
    }
}
