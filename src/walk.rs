//! Structural iteration and the value predicates built on it.
//!
//! [`for_each`] walks arrays, maps and records without the caller needing to
//! know which concrete container it holds. The element-kind check in the call
//! validator uses it, as do the `is_array_of_*` predicates below.

use std::borrow::Cow;
use std::fmt;

use crate::symbol::Symbol;
use crate::value::Value;

/// Position of an element inside its container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key<'a> {
    Index(usize),
    Name(&'a str),
}

impl fmt::Display for Key<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Index(i) => write!(f, "{}", i),
            Key::Name(name) => write!(f, "{}", name),
        }
    }
}

/// Visits the elements of a container until `visit` returns `false`.
///
/// Arrays yield `(index, element)`, maps `(key, value)` and records
/// `(field name, value)` for exported fields only. Scalars yield nothing.
/// Native arrays hand out owned elements; everything else is borrowed.
///
/// # Examples
///
/// ```rust
/// use signet::Value;
/// use signet::walk::for_each;
/// let list = Value::Integers(vec![1, 2, 3, 4]);
/// let mut seen = Vec::new();
/// for_each(&list, |_, item| {
///     seen.push(item.into_owned());
///     seen.len() < 2
/// });
/// assert_eq!(seen, vec![Value::Int(1), Value::Int(2)]);
/// ```
pub fn for_each<'a, F>(container: &'a Value, mut visit: F)
where
    F: FnMut(Key<'a>, Cow<'a, Value>) -> bool,
{
    match container {
        Value::List(items) => {
            for (i, item) in items.iter().enumerate() {
                if !visit(Key::Index(i), Cow::Borrowed(item)) {
                    return;
                }
            }
        }
        Value::Strings(items) => {
            for (i, item) in items.iter().enumerate() {
                if !visit(Key::Index(i), Cow::Owned(Value::String(item.clone()))) {
                    return;
                }
            }
        }
        Value::Integers(items) => {
            for (i, item) in items.iter().enumerate() {
                if !visit(Key::Index(i), Cow::Owned(Value::Int(*item))) {
                    return;
                }
            }
        }
        Value::Floats(items) => {
            for (i, item) in items.iter().enumerate() {
                if !visit(Key::Index(i), Cow::Owned(Value::Float(*item))) {
                    return;
                }
            }
        }
        Value::Map(map) => {
            for (k, v) in map.iter() {
                if !visit(Key::Name(k), Cow::Borrowed(v)) {
                    return;
                }
            }
        }
        Value::Record(record) => {
            for field in record.exported_fields() {
                if !visit(Key::Name(&field.name), Cow::Borrowed(&field.value)) {
                    return;
                }
            }
        }
        _ => {}
    }
}

/// Returns true if every visited element satisfies `predicate`.
pub fn all_elements(container: &Value, mut predicate: impl FnMut(&Value) -> bool) -> bool {
    let mut ok = true;
    for_each(container, |_, item| {
        ok = predicate(&item);
        ok
    });
    ok
}

// ============================================================================
// PREDICATES
// ============================================================================

/// True for integers and for floats that are neither NaN nor infinite.
pub fn is_finite_number(value: &Value) -> bool {
    match value {
        Value::Int(_) => true,
        Value::Float(n) => n.is_finite(),
        _ => false,
    }
}

/// True for `Nil`, native string arrays, and lists holding only strings.
pub fn is_array_of_strings(value: &Value) -> bool {
    match value {
        Value::Nil | Value::Strings(_) => true,
        Value::List(_) => all_elements(value, |item| Symbol::of(item) == Symbol::String),
        _ => false,
    }
}

/// True for `Nil`, and for arrays whose every element is a finite number.
pub fn is_array_of_numbers(value: &Value) -> bool {
    match value {
        Value::Nil | Value::Integers(_) => true,
        Value::Floats(_) | Value::List(_) => all_elements(value, is_finite_number),
        _ => false,
    }
}
