//! Element-kind checks for `a<...>` annotations.

use crate::symbol::Symbol;
use crate::value::Value;
use crate::walk;

/// True if `value` itself satisfies the element kind `kind`.
///
/// The first character of `kind` decides: a plain symbol must match exactly,
/// `j` admits the JSON scalar and object kinds plus unclassified values, the
/// same set as a `j` parameter. `x` admits anything, and a
/// `(...)` choice admits any enumerated symbol. `a<...>` recurses into the
/// element's own contents.
pub(crate) fn matches(kind: &str, value: &Value) -> bool {
    let symbol = Symbol::of(value);
    let mut chars = kind.chars();
    match chars.next() {
        None | Some('x') => true,
        Some('j') => matches!(
            symbol,
            Symbol::String
                | Symbol::Number
                | Symbol::Boolean
                | Symbol::Null
                | Symbol::Object
                | Symbol::Unclassified
        ),
        Some('(') => {
            let choice = chars.as_str();
            let choice = choice.split(')').next().unwrap_or(choice);
            choice.contains(symbol.as_char())
        }
        Some('a') => {
            symbol == Symbol::Array
                && match nested(chars.as_str()) {
                    Some(inner) => all_match(inner, value),
                    None => true,
                }
        }
        Some(c) => Symbol::from_char(c) == Some(symbol),
    }
}

/// True if every element of the array `value` satisfies `kind`.
/// Empty arrays pass.
pub(crate) fn all_match(kind: &str, value: &Value) -> bool {
    walk::all_elements(value, |item| matches(kind, item))
}

/// Human-readable plural for error messages.
pub(crate) fn describe(kind: &str) -> String {
    let name = match kind.chars().next() {
        Some('a') => "arrays",
        Some('b') => "booleans",
        Some('f') => "functions",
        Some('n') => "numbers",
        Some('o') => "objects",
        Some('s') => "strings",
        _ => return kind.to_string(),
    };
    name.to_string()
}

/// Body of a leading `<...>` annotation.
fn nested(rest: &str) -> Option<&str> {
    rest.strip_prefix('<')?.strip_suffix('>')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_kinds_match_exactly() {
        assert!(matches("n", &Value::Int(1)));
        assert!(matches("n", &Value::Float(f64::NAN)));
        assert!(!matches("n", &Value::from("1")));
        assert!(matches("s", &Value::from("x")));
        assert!(matches("o", &Value::from(serde_json::json!({}))));
        assert!(!matches("b", &Value::Nil));
    }

    #[test]
    fn json_any_and_choice_kinds() {
        assert!(matches("j", &Value::Nil));
        assert!(!matches("j", &Value::List(vec![])));
        assert!(matches("j", &Value::Opaque(crate::value::Opaque::new(1u8))));
        assert!(!matches("n", &Value::Opaque(crate::value::Opaque::new(1u8))));
        assert!(matches("x", &Value::List(vec![])));
        assert!(matches("(sn)", &Value::Int(3)));
        assert!(!matches("(sn)", &Value::Bool(true)));
    }

    #[test]
    fn nested_arrays_recurse() {
        let grid = Value::List(vec![
            Value::Integers(vec![1, 2]),
            Value::List(vec![3.into()]),
        ]);
        assert!(all_match("a<n>", &grid));
        assert!(all_match("a", &grid));
        let ragged = Value::List(vec![Value::Integers(vec![1]), Value::Strings(vec!["x".into()])]);
        assert!(!all_match("a<n>", &ragged));
        assert!(!all_match("a<n>", &Value::List(vec![1.into()])));
    }

    #[test]
    fn empty_arrays_pass_vacuously() {
        assert!(all_match("s", &Value::List(vec![])));
        assert!(all_match("n", &Value::Floats(vec![])));
    }

    #[test]
    fn describe_uses_plural_names() {
        assert_eq!(describe("n"), "numbers");
        assert_eq!(describe("a<s>"), "arrays");
        assert_eq!(describe("j"), "j");
        assert_eq!(describe("(sn)"), "(sn)");
    }
}
