//! Declared parameters and the per-argument coercion step.

use regex::Regex;

use crate::diagnostics::CallError;
use crate::signature::element;
use crate::symbol::Symbol;
use crate::value::Value;

/// One declared positional parameter of a compiled signature.
#[derive(Debug, Clone)]
pub struct Param {
    /// Single-position class over the symbol alphabet, without modifiers.
    pub(crate) class: String,
    /// `class` plus any `?`/`+` suffix.
    pub(crate) pattern: Regex,
    pub(crate) kind: String,
    pub(crate) is_array: bool,
    pub(crate) element_kind: Option<String>,
    /// Set by a trailing `-`: the class the context value must satisfy.
    pub(crate) context_pattern: Option<Regex>,
}

impl Param {
    pub(crate) fn new(class: String, kind: String, pattern: Regex) -> Self {
        Self {
            is_array: kind == "a",
            class,
            pattern,
            kind,
            element_kind: None,
            context_pattern: None,
        }
    }

    /// Matching expression for this parameter, including modifiers.
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Declared kind tag: one of `s n b l o a f j x` or a `(...)` choice.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn is_array(&self) -> bool {
        self.is_array
    }

    /// Text of the `<...>` annotation, if any.
    pub fn element_kind(&self) -> Option<&str> {
        self.element_kind.as_deref()
    }

    pub fn context_fallback(&self) -> bool {
        self.context_pattern.is_some()
    }

    pub fn context_pattern(&self) -> Option<&str> {
        self.context_pattern.as_ref().map(Regex::as_str)
    }

    pub(crate) fn accepts_context(&self, symbol: Symbol) -> bool {
        self.context_pattern
            .as_ref()
            .is_some_and(|pattern| pattern.is_match(symbol.as_str()))
    }

    /// Resolves one captured argument. `index` is 1-based.
    ///
    /// Array parameters wrap every non-array argument, unclassified ones
    /// included, into a singleton array after checking it against the element
    /// kind. Everything else passes through unchanged.
    pub(crate) fn resolve(
        &self,
        arg: &Value,
        symbol: Symbol,
        index: usize,
    ) -> Result<Value, CallError> {
        if !self.is_array {
            return Ok(arg.clone());
        }
        if let Some(kind) = &self.element_kind {
            let ok = if symbol == Symbol::Array {
                element::all_match(kind, arg)
            } else {
                element::matches(kind, arg)
            };
            if !ok {
                return Err(CallError::ArrayElementKindMismatch {
                    value: arg.clone(),
                    index,
                    expected: element::describe(kind),
                });
            }
        }
        if symbol == Symbol::Array {
            Ok(arg.clone())
        } else {
            Ok(Value::List(vec![arg.clone()]))
        }
    }
}
