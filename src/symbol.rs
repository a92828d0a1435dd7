//! The symbol alphabet and the runtime type classifier.
//!
//! Every [`Value`] maps to exactly one [`Symbol`]. Signatures are compiled into
//! patterns over this alphabet and a call's arguments are classified into a
//! string of the same alphabet before matching.

use std::fmt;

use crate::value::Value;

/// Validation-relevant kind of a runtime value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol {
    String,
    Number,
    Boolean,
    Function,
    Array,
    Object,
    Null,
    /// Present, but of no further-checkable kind. Acts as a wildcard.
    Unclassified,
}

impl Symbol {
    pub const ALL: [Symbol; 8] = [
        Symbol::String,
        Symbol::Number,
        Symbol::Boolean,
        Symbol::Function,
        Symbol::Array,
        Symbol::Object,
        Symbol::Null,
        Symbol::Unclassified,
    ];

    /// Classifies a value. Total: never fails.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use signet::{Symbol, Value};
    /// assert_eq!(Symbol::of(&Value::Int(1)), Symbol::Number);
    /// assert_eq!(Symbol::of(&Value::Nil).as_char(), 'l');
    /// ```
    pub fn of(value: &Value) -> Symbol {
        match value {
            Value::Nil => Symbol::Null,
            Value::Int(_) | Value::Float(_) => Symbol::Number,
            Value::Bool(_) => Symbol::Boolean,
            Value::String(_) => Symbol::String,
            Value::Function(_) => Symbol::Function,
            Value::List(_) | Value::Strings(_) | Value::Integers(_) | Value::Floats(_) => {
                Symbol::Array
            }
            Value::Map(_) | Value::Record(_) => Symbol::Object,
            Value::Opaque(_) => Symbol::Unclassified,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Symbol::String => 's',
            Symbol::Number => 'n',
            Symbol::Boolean => 'b',
            Symbol::Function => 'f',
            Symbol::Array => 'a',
            Symbol::Object => 'o',
            Symbol::Null => 'l',
            Symbol::Unclassified => 'm',
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Symbol::String => "s",
            Symbol::Number => "n",
            Symbol::Boolean => "b",
            Symbol::Function => "f",
            Symbol::Array => "a",
            Symbol::Object => "o",
            Symbol::Null => "l",
            Symbol::Unclassified => "m",
        }
    }

    pub fn from_char(c: char) -> Option<Symbol> {
        Symbol::ALL.into_iter().find(|symbol| symbol.as_char() == c)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Free-function form of [`Symbol::of`].
pub fn classify(value: &Value) -> Symbol {
    Symbol::of(value)
}

/// Concatenates the symbols of an argument list, one character per argument.
pub fn supplied_signature(args: &[Value]) -> String {
    args.iter().map(|arg| Symbol::of(arg).as_char()).collect()
}
