//! Error model for signature compilation and call validation.
//!
//! # Overview
//!
//! Two phases, two closed taxonomies:
//!
//! - [`CompileError`]: the signature text itself is malformed. Carries the
//!   signature as a `miette` source so a rendered report underlines the
//!   offending character.
//! - [`CallError`]: a well-formed signature rejected a concrete argument list.
//!   Carries the offending value and its 1-based argument index.
//!
//! [`SignetError`] wraps both for callers that go through the
//! [`FunctionRegistry`](crate::FunctionRegistry), and also covers lookup and
//! implementation failures.
//!
//! Every error reports a stable [`ErrorCode`] through `miette`'s `code()`.

use std::fmt;
use std::sync::Arc;

use miette::{Diagnostic, LabeledSpan, NamedSource, SourceCode};
use thiserror::Error;

use crate::value::Value;

pub type SourceArc = Arc<NamedSource<String>>;

// ============================================================================
// ERROR CODES
// ============================================================================

/// Type-safe classification of every error this crate produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Generic compile failure: bad character class, unterminated bracket,
    /// modifier with nothing to modify.
    MalformedSignature,
    /// A `<...>` annotation follows a parameter that is not `a` or `f`.
    ParameterMisapplied,
    /// A `(...)` choice contains a `<...>` annotation.
    UnionNotSupported,
    ArgumentTypeMismatch,
    ContextIncompatible,
    ArrayElementKindMismatch,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::MalformedSignature => "S0400",
            ErrorCode::ParameterMisapplied => "S0401",
            ErrorCode::UnionNotSupported => "S0402",
            ErrorCode::ArgumentTypeMismatch => "T0410",
            ErrorCode::ContextIncompatible => "T0411",
            ErrorCode::ArrayElementKindMismatch => "T0412",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ErrorCode::MalformedSignature => "malformed-signature",
            ErrorCode::ParameterMisapplied => "parameter-misapplied",
            ErrorCode::UnionNotSupported => "union-not-supported",
            ErrorCode::ArgumentTypeMismatch => "argument-type-mismatch",
            ErrorCode::ContextIncompatible => "context-incompatible",
            ErrorCode::ArrayElementKindMismatch => "array-element-kind-mismatch",
        }
    }

    /// True for errors raised while compiling signature text.
    pub fn is_compile_time(&self) -> bool {
        matches!(
            self,
            ErrorCode::MalformedSignature
                | ErrorCode::ParameterMisapplied
                | ErrorCode::UnionNotSupported
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// COMPILE-TIME ERRORS
// ============================================================================

/// The signature text could not be compiled. No validator is produced.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("type parameters can only be applied to arrays and functions, not '{kind}' (offset {offset})")]
    ParameterMisapplied {
        kind: String,
        offset: usize,
        src: SourceArc,
    },
    #[error("choice groups containing parameterized types are not supported: '({choice})' (offset {offset})")]
    UnionNotSupported {
        choice: String,
        offset: usize,
        src: SourceArc,
    },
    #[error("malformed signature: {message} (offset {offset})")]
    Malformed {
        message: String,
        offset: usize,
        src: SourceArc,
        #[source]
        source: Option<regex::Error>,
    },
}

impl CompileError {
    pub fn code(&self) -> ErrorCode {
        match self {
            CompileError::ParameterMisapplied { .. } => ErrorCode::ParameterMisapplied,
            CompileError::UnionNotSupported { .. } => ErrorCode::UnionNotSupported,
            CompileError::Malformed { .. } => ErrorCode::MalformedSignature,
        }
    }

    /// Character offset into the signature text.
    pub fn offset(&self) -> usize {
        match self {
            CompileError::ParameterMisapplied { offset, .. }
            | CompileError::UnionNotSupported { offset, .. }
            | CompileError::Malformed { offset, .. } => *offset,
        }
    }

    /// The offending text: the misapplied kind, the choice body, or the message.
    pub fn value(&self) -> &str {
        match self {
            CompileError::ParameterMisapplied { kind, .. } => kind,
            CompileError::UnionNotSupported { choice, .. } => choice,
            CompileError::Malformed { message, .. } => message,
        }
    }

    /// The signature text that failed to compile.
    pub fn signature(&self) -> &str {
        self.src().inner()
    }

    fn src(&self) -> &SourceArc {
        match self {
            CompileError::ParameterMisapplied { src, .. }
            | CompileError::UnionNotSupported { src, .. }
            | CompileError::Malformed { src, .. } => src,
        }
    }

    /// Byte range of the label, converted from the character offset.
    fn label_range(&self) -> (usize, usize) {
        let text = self.signature();
        let start = text
            .char_indices()
            .nth(self.offset())
            .map_or(text.len(), |(i, _)| i);
        let len = match self {
            // Underline the whole `(...)` group.
            CompileError::UnionNotSupported { choice, .. } => choice.len() + 2,
            _ => text[start..].chars().next().map_or(0, char::len_utf8),
        };
        (start, len.min(text.len() - start))
    }
}

impl Diagnostic for CompileError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.code().as_str()))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match self {
            CompileError::ParameterMisapplied { .. } => {
                "write the type parameter directly after an 'a' or 'f' parameter, e.g. a<n>"
            }
            CompileError::UnionNotSupported { .. } => {
                "use a plain choice such as (sn) or move the parameterized type out of the group"
            }
            CompileError::Malformed { .. } => return None,
        };
        Some(Box::new(help))
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        Some(self.src().as_ref() as &dyn SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let (start, len) = self.label_range();
        let text = match self {
            CompileError::ParameterMisapplied { .. } => "type parameter here",
            CompileError::UnionNotSupported { .. } => "parameterized choice",
            CompileError::Malformed { .. } => "here",
        };
        Some(Box::new(std::iter::once(LabeledSpan::new(
            Some(text.to_string()),
            start,
            len,
        ))))
    }
}

// ============================================================================
// CALL-TIME ERRORS
// ============================================================================

/// A concrete call did not satisfy a compiled signature.
///
/// The validator that produced it is unaffected and stays reusable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CallError {
    #[error("argument {index} does not match the function signature")]
    ArgumentTypeMismatch {
        /// `None` when the argument was missing from the call.
        value: Option<Value>,
        index: usize,
    },
    #[error("context value is not a compatible type with argument {index}")]
    ContextIncompatible {
        /// `None` when no context value was available.
        value: Option<Value>,
        index: usize,
    },
    #[error("argument {index} must be an array of {expected}")]
    ArrayElementKindMismatch {
        value: Value,
        index: usize,
        expected: String,
    },
}

impl CallError {
    pub fn code(&self) -> ErrorCode {
        match self {
            CallError::ArgumentTypeMismatch { .. } => ErrorCode::ArgumentTypeMismatch,
            CallError::ContextIncompatible { .. } => ErrorCode::ContextIncompatible,
            CallError::ArrayElementKindMismatch { .. } => ErrorCode::ArrayElementKindMismatch,
        }
    }

    /// 1-based index of the offending argument.
    pub fn index(&self) -> usize {
        match self {
            CallError::ArgumentTypeMismatch { index, .. }
            | CallError::ContextIncompatible { index, .. }
            | CallError::ArrayElementKindMismatch { index, .. } => *index,
        }
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            CallError::ArgumentTypeMismatch { value, .. }
            | CallError::ContextIncompatible { value, .. } => value.as_ref(),
            CallError::ArrayElementKindMismatch { value, .. } => Some(value),
        }
    }

    /// Human-readable element kind, for array-content errors only.
    pub fn expected_kind(&self) -> Option<&str> {
        match self {
            CallError::ArrayElementKindMismatch { expected, .. } => Some(expected),
            _ => None,
        }
    }
}

impl Diagnostic for CallError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.code().as_str()))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match self {
            CallError::ArgumentTypeMismatch { value: None, .. } => {
                "the argument is required but was not supplied".to_string()
            }
            CallError::ArgumentTypeMismatch {
                value: Some(value), ..
            } => format!("received {} ({})", value, value.type_name()),
            CallError::ContextIncompatible { value, .. } => match value {
                Some(value) => format!("the context value was {}", value),
                None => "no context value was available".to_string(),
            },
            CallError::ArrayElementKindMismatch { value, .. } => {
                format!("received {}", value)
            }
        };
        Some(Box::new(help))
    }
}

// ============================================================================
// REGISTRY-LEVEL ERRORS
// ============================================================================

/// Unified error type for registry dispatch and native function bodies.
#[derive(Debug, Error)]
pub enum SignetError {
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error("function '{function}': {source}")]
    Call {
        function: String,
        #[source]
        source: CallError,
    },
    #[error("unknown function '{0}'")]
    UnknownFunction(String),
    #[error("{message}")]
    Failed { message: String },
}

impl SignetError {
    /// Error raised by a native function body.
    pub fn failed(message: impl Into<String>) -> Self {
        SignetError::Failed {
            message: message.into(),
        }
    }

    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            SignetError::Compile(err) => Some(err.code()),
            SignetError::Call { source, .. } => Some(source.code()),
            SignetError::UnknownFunction(_) | SignetError::Failed { .. } => None,
        }
    }

    pub fn as_call_error(&self) -> Option<&CallError> {
        match self {
            SignetError::Call { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl Diagnostic for SignetError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.code()
            .map(|code| Box::new(code.as_str()) as Box<dyn fmt::Display + 'a>)
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            SignetError::Compile(err) => Diagnostic::help(err),
            SignetError::Call { source, .. } => Diagnostic::help(source),
            SignetError::UnknownFunction(_) | SignetError::Failed { .. } => None,
        }
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        match self {
            SignetError::Compile(err) => err.source_code(),
            _ => None,
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        match self {
            SignetError::Compile(err) => err.labels(),
            _ => None,
        }
    }
}

/// Wraps signature text as a `miette` source.
pub fn to_error_source(signature: &str) -> SourceArc {
    Arc::new(NamedSource::new("signature", signature.to_string()))
}

#[cfg(test)]
mod diagnostics_tests {
    use miette::Report;

    use super::*;

    #[test]
    fn compile_error_report_shows_code_label_and_help() {
        let err = CompileError::ParameterMisapplied {
            kind: "s".to_string(),
            offset: 2,
            src: to_error_source("<s<n>>"),
        };
        assert_eq!(err.label_range(), (2, 1));
        let output = format!("{:?}", Report::new(err));
        assert!(output.contains("S0401"));
        assert!(output.contains("type parameter here"));
        assert!(output.contains("a<n>"));
    }

    #[test]
    fn union_label_spans_the_group() {
        let err = CompileError::UnionNotSupported {
            choice: "a<n>s".to_string(),
            offset: 1,
            src: to_error_source("<(a<n>s)>"),
        };
        assert_eq!(err.label_range(), (1, 7));
        assert_eq!(err.value(), "a<n>s");
        assert_eq!(err.signature(), "<(a<n>s)>");
    }

    #[test]
    fn label_offset_is_clamped_to_the_text() {
        let err = CompileError::Malformed {
            message: "unterminated '('".to_string(),
            offset: 10,
            src: to_error_source("<(s"),
            source: None,
        };
        assert_eq!(err.label_range(), (3, 0));
    }

    #[test]
    fn call_errors_expose_structured_fields() {
        let err = CallError::ArrayElementKindMismatch {
            value: Value::List(vec![1.into(), "x".into()]),
            index: 1,
            expected: "numbers".to_string(),
        };
        assert_eq!(err.code(), ErrorCode::ArrayElementKindMismatch);
        assert_eq!(err.index(), 1);
        assert_eq!(err.expected_kind(), Some("numbers"));
        assert_eq!(err.to_string(), "argument 1 must be an array of numbers");
        let output = format!("{:?}", Report::new(err));
        assert!(output.contains("T0412"));
    }

    #[test]
    fn missing_argument_help() {
        let err = CallError::ArgumentTypeMismatch {
            value: None,
            index: 2,
        };
        assert_eq!(err.value(), None);
        let output = format!("{:?}", Report::new(err));
        assert!(output.contains("required but was not supplied"));
    }

    #[test]
    fn signet_error_delegates_codes() {
        let call = SignetError::Call {
            function: "substring".to_string(),
            source: CallError::ContextIncompatible {
                value: Some(Value::Int(42)),
                index: 1,
            },
        };
        assert_eq!(call.code(), Some(ErrorCode::ContextIncompatible));
        assert!(call.to_string().starts_with("function 'substring': "));
        assert_eq!(SignetError::UnknownFunction("x".into()).code(), None);
        assert!(!ErrorCode::ContextIncompatible.is_compile_time());
        assert!(ErrorCode::UnionNotSupported.is_compile_time());
    }
}
