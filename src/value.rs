//! Runtime values handed to signature validators.
//!
//! Hosts translate their own value representation into [`Value`] before calling
//! [`Validator::validate`](crate::Validator::validate). The enum is closed: every
//! variant maps to exactly one [`Symbol`](crate::Symbol), anything the host cannot
//! describe goes into [`Value::Opaque`].

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use im::HashMap;
use serde::ser::{Error as _, SerializeMap};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::diagnostics::SignetError;

// ============================================================================
// CORE DATA STRUCTURES
// ============================================================================

/// Signature of a native function body.
pub type NativeFn = dyn Fn(&[Value]) -> Result<Value, SignetError> + Send + Sync;

/// Represents a value crossing the host boundary.
///
/// # Examples
///
/// ```rust
/// use signet::Value;
/// let n = Value::Float(3.14);
/// assert_eq!(n.type_name(), "Float");
/// let s = Value::from("hello");
/// assert_eq!(s.type_name(), "String");
/// let nil = Value::default();
/// assert!(nil.is_nil());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Nil,
    Int(i64),
    Float(f64),
    String(String),
    Bool(bool),
    Function(Function),
    List(Vec<Value>),
    /// Native homogeneous string array.
    Strings(Vec<String>),
    /// Native homogeneous integer array.
    Integers(Vec<i64>),
    /// Native homogeneous float array.
    Floats(Vec<f64>),
    Map(HashMap<String, Value>),
    Record(Record),
    Opaque(Opaque),
}

/// A callable value. Equality is identity of the underlying body.
#[derive(Clone)]
pub struct Function {
    name: Arc<str>,
    body: Arc<NativeFn>,
}

impl Function {
    pub fn new<F>(name: impl Into<Arc<str>>, body: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, SignetError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            body: Arc::new(body),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invokes the body with already-validated arguments.
    pub fn call(&self, args: &[Value]) -> Result<Value, SignetError> {
        (self.body)(args)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(
            Arc::as_ptr(&self.body) as *const (),
            Arc::as_ptr(&other.body) as *const (),
        )
    }
}

/// A struct-like value with named fields.
///
/// Only exported fields are visible to [`for_each`](crate::walk::for_each).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    pub type_name: String,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub value: Value,
    pub exported: bool,
}

impl Record {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: Vec::new(),
        }
    }

    /// Adds an exported field.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.push(Field {
            name: name.into(),
            value: value.into(),
            exported: true,
        });
        self
    }

    /// Adds a field hidden from structural iteration.
    pub fn with_private_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.push(Field {
            name: name.into(),
            value: value.into(),
            exported: false,
        });
        self
    }

    pub fn exported_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|field| field.exported)
    }
}

/// A host payload with no validation-relevant kind. Classifies as `m`.
#[derive(Clone)]
pub struct Opaque {
    type_name: &'static str,
    payload: Arc<dyn Any + Send + Sync>,
}

impl Opaque {
    pub fn new<T: Any + Send + Sync>(payload: T) -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            payload: Arc::new(payload),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.payload.downcast_ref::<T>()
    }
}

impl fmt::Debug for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Opaque").field(&self.type_name).finish()
    }
}

impl PartialEq for Opaque {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(
            Arc::as_ptr(&self.payload) as *const (),
            Arc::as_ptr(&other.payload) as *const (),
        )
    }
}

// ============================================================================
// PUBLIC API IMPLEMENTATION
// ============================================================================

impl Value {
    /// Returns the type name of the value as a string.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use signet::Value;
    /// assert_eq!(Value::Bool(true).type_name(), "Bool");
    /// assert_eq!(Value::Strings(vec![]).type_name(), "Strings");
    /// ```
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "Nil",
            Value::Int(_) => "Int",
            Value::Float(_) => "Float",
            Value::String(_) => "String",
            Value::Bool(_) => "Bool",
            Value::Function(_) => "Function",
            Value::List(_) => "List",
            Value::Strings(_) => "Strings",
            Value::Integers(_) => "Integers",
            Value::Floats(_) => "Floats",
            Value::Map(_) => "Map",
            Value::Record(_) => "Record",
            Value::Opaque(_) => "Opaque",
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the numeric value widened to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Converts to JSON. Fails for functions and opaque payloads.
    pub fn to_json(&self) -> Option<serde_json::Value> {
        serde_json::to_value(self).ok()
    }

    // ------------------------------------------------------------------------
    // Display formatting helpers
    // ------------------------------------------------------------------------

    fn fmt_seq<T: fmt::Display>(
        f: &mut fmt::Formatter<'_>,
        items: impl IntoIterator<Item = T>,
    ) -> fmt::Result {
        write!(f, "[")?;
        for (i, item) in items.into_iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", item)?;
        }
        write!(f, "]")
    }

    fn fmt_map(f: &mut fmt::Formatter<'_>, map: &HashMap<String, Value>) -> fmt::Result {
        write!(f, "{{")?;
        let mut first = true;
        for (k, v) in map.iter() {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{:?}: {}", k, v)?;
            first = false;
        }
        write!(f, "}}")
    }

    fn fmt_float(f: &mut fmt::Formatter<'_>, n: f64) -> fmt::Result {
        if n.fract() == 0.0 && n.abs() < 1e15 {
            write!(f, "{}", n as i64)
        } else {
            write!(f, "{}", n)
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "null"),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(n) => Value::fmt_float(f, *n),
            Value::String(s) => write!(f, "{:?}", s),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Function(func) => write!(f, "<function {}>", func.name()),
            Value::List(items) => Value::fmt_seq(f, items),
            Value::Strings(items) => Value::fmt_seq(f, items.iter().map(|s| format!("{:?}", s))),
            Value::Integers(items) => Value::fmt_seq(f, items),
            Value::Floats(items) => Value::fmt_seq(f, items.iter().map(|n| Value::Float(*n))),
            Value::Map(map) => Value::fmt_map(f, map),
            Value::Record(record) => {
                write!(f, "{} {{", record.type_name)?;
                for (i, field) in record.exported_fields().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, " {}: {}", field.name, field.value)?;
                }
                write!(f, " }}")
            }
            Value::Opaque(opaque) => write!(f, "<opaque {}>", opaque.type_name()),
        }
    }
}

// ============================================================================
// CONVERSIONS
// ============================================================================

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Nil,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(entries) => Value::Map(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n.into())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<Function> for Value {
    fn from(func: Function) -> Self {
        Value::Function(func)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Record(record)
    }
}

impl From<Opaque> for Value {
    fn from(opaque: Opaque) -> Self {
        Value::Opaque(opaque)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Nil => serializer.serialize_unit(),
            Value::Int(n) => serializer.serialize_i64(*n),
            Value::Float(n) => serializer.serialize_f64(*n),
            Value::String(s) => serializer.serialize_str(s),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::List(items) => items.serialize(serializer),
            Value::Strings(items) => items.serialize(serializer),
            Value::Integers(items) => items.serialize(serializer),
            Value::Floats(items) => items.serialize(serializer),
            Value::Map(map) => {
                let mut state = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map.iter() {
                    state.serialize_entry(k, v)?;
                }
                state.end()
            }
            Value::Record(record) => {
                let mut state = serializer.serialize_map(None)?;
                for field in record.exported_fields() {
                    state.serialize_entry(&field.name, &field.value)?;
                }
                state.end()
            }
            Value::Function(func) => Err(S::Error::custom(format!(
                "function '{}' cannot be serialized",
                func.name()
            ))),
            Value::Opaque(opaque) => Err(S::Error::custom(format!(
                "opaque value of type {} cannot be serialized",
                opaque.type_name()
            ))),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_numbers_keep_integer_precision() {
        assert_eq!(Value::from(json!(7)), Value::Int(7));
        assert_eq!(Value::from(json!(7.5)), Value::Float(7.5));
        assert_eq!(Value::from(json!(u64::MAX)), Value::Float(u64::MAX as f64));
    }

    #[test]
    fn json_containers_convert_recursively() {
        let value = Value::from(json!({"tags": ["a", null], "ok": true}));
        let Value::Map(map) = &value else {
            panic!("expected a map, got {value:?}");
        };
        assert_eq!(
            map.get("tags"),
            Some(&Value::List(vec![Value::from("a"), Value::Nil]))
        );
        assert_eq!(map.get("ok"), Some(&Value::Bool(true)));
        assert_eq!(value.to_json(), Some(json!({"tags": ["a", null], "ok": true})));
    }

    #[test]
    fn records_serialize_exported_fields_only() {
        let record = Record::new("Point")
            .with_field("x", 1)
            .with_private_field("cache", "hidden");
        assert_eq!(Value::from(record).to_json(), Some(json!({"x": 1})));
    }

    #[test]
    fn deserializes_through_json() {
        let value: Value = serde_json::from_str(r#"{"xs": [1, 2.5], "name": "n"}"#).unwrap();
        let Value::Map(map) = &value else {
            panic!("expected a map, got {value}");
        };
        assert_eq!(map.get("xs"), Some(&Value::List(vec![Value::Int(1), Value::Float(2.5)])));
        assert_eq!(map.get("name"), Some(&Value::from("n")));
    }

    #[test]
    fn functions_and_opaque_values_do_not_serialize() {
        let func = Function::new("noop", |_| Ok(Value::Nil));
        assert_eq!(Value::from(func).to_json(), None);
        assert_eq!(Value::from(Opaque::new(3u8)).to_json(), None);
    }

    #[test]
    fn function_equality_is_identity() {
        let a = Function::new("same", |_| Ok(Value::Nil));
        let b = Function::new("same", |_| Ok(Value::Nil));
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn display_is_json_like() {
        let value = Value::List(vec![Value::from("x"), Value::Float(2.0), Value::Nil]);
        assert_eq!(value.to_string(), r#"["x", 2, null]"#);
        assert_eq!(Value::Strings(vec!["a".into()]).to_string(), r#"["a"]"#);
        let record = Record::new("P").with_field("x", 1).with_field("y", 2);
        assert_eq!(Value::from(record).to_string(), "P { x: 1, y: 2 }");
    }

    #[test]
    fn opaque_payload_round_trips_through_downcast() {
        let opaque = Opaque::new(42u16);
        assert_eq!(opaque.downcast_ref::<u16>(), Some(&42));
        assert_eq!(opaque.downcast_ref::<u32>(), None);
        assert_eq!(opaque.type_name(), "u16");
    }
}
