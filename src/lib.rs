//! Signet: compact function signatures, compiled into reusable call validators.
//!
//! An embedding engine declares each native function with a signature such as
//! `<s-nn?:s>`, compiles it once with [`compile`], and calls
//! [`Validator::validate`] before every dispatch. Validation either returns the
//! argument list to dispatch with (scalars wrapped for array parameters,
//! omitted context parameters filled in) or a [`CallError`] naming the first
//! offending argument.

pub use crate::diagnostics::{CallError, CompileError, ErrorCode, SignetError};
pub use crate::registry::FunctionRegistry;
pub use crate::signature::{compile, Param, Validator};
pub use crate::symbol::{classify, Symbol};
pub use crate::value::{Field, Function, Opaque, Record, Value};

pub mod diagnostics;
pub mod registry;
pub mod signature;
pub mod symbol;
pub mod value;
pub mod walk;
