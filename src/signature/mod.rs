//! # Function Signatures
//!
//! A signature is a compact description of a function's parameters, e.g.
//! `<s-nn?:s>`: a string that falls back to the context value, a required
//! number, an optional number, returning a string.
//!
//! ## Grammar
//!
//! | Symbol | Meaning |
//! |--------|---------|
//! | `s n b l o` | string, number, boolean, null, object |
//! | `a` | array; scalars are wrapped into a singleton array |
//! | `f` | function |
//! | `j` | any JSON scalar or object |
//! | `x` | any value |
//! | `(..)` | choice between the enclosed kinds |
//! | `<..>` | element kind of the preceding `a` or `f` |
//! | `?` `+` | optional, one or more |
//! | `-` | take the context value when omitted |
//! | `:..` | return type (recorded, not enforced) |
//!
//! ## Module Structure
//!
//! - **`compiler`**: signature text → [`Validator`]
//! - **`validator`**: argument list → resolved argument list
//! - **`param`**: declared parameters and per-argument coercion
//! - **`element`**: `a<...>` element-kind checks

mod compiler;
mod element;
mod param;
mod validator;

use std::str::FromStr;

use regex::Regex;

use crate::diagnostics::CompileError;

pub use compiler::compile;
pub use param::Param;

/// A compiled signature. Immutable; safe to share across threads.
#[derive(Debug, Clone)]
pub struct Validator {
    definition: String,
    params: Vec<Param>,
    /// `^(p1)(p2)...(pn)$`
    pattern: Regex,
    /// `^p1`, `^p1p2`, ... used to localize a failed match.
    prefixes: Vec<Regex>,
    return_kind: Option<String>,
}

impl Validator {
    /// The signature text exactly as compiled.
    pub fn definition(&self) -> &str {
        &self.definition
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// The anchored whole-call pattern.
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// The `:`-annotation, if the signature declared one.
    pub fn return_kind(&self) -> Option<&str> {
        self.return_kind.as_deref()
    }
}

impl FromStr for Validator {
    type Err = CompileError;

    fn from_str(signature: &str) -> Result<Self, Self::Err> {
        compile(signature)
    }
}
