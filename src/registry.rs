//! # Function Registry
//!
//! Plays the host side of the signature contract: a function is registered
//! together with its signature text, the signature is compiled once, and every
//! call is validated before the implementation sees its arguments.
//!
//! ## Usage Workflow
//! ```rust
//! use signet::{FunctionRegistry, Value, SignetError};
//! let mut registry = FunctionRegistry::new();
//! registry
//!     .register("length", "<s-:n>", |args| match args {
//!         [Value::String(s)] => Ok(Value::Int(s.chars().count() as i64)),
//!         _ => Err(SignetError::failed("unreachable after validation")),
//!     })
//!     .expect("signature should compile");
//! let context = Value::from("héllo");
//! let length = registry.call("length", &[], Some(&context)).unwrap();
//! assert_eq!(length, Value::Int(5));
//! ```
//!
//! ## Registry Invariant
//! The registry is built once at startup and then only read. It holds no
//! interior mutability, so a shared reference can be handed to any number of
//! threads.

use std::fmt;

use im::HashMap;
use tracing::debug;

use crate::diagnostics::{CompileError, SignetError};
use crate::signature::{compile, Validator};
use crate::value::{Function, Value};

/// A registered function and its compiled signature, if it declared one.
#[derive(Debug, Clone)]
pub struct Registered {
    pub function: Function,
    pub validator: Option<Validator>,
}

/// Registry of callable functions keyed by name.
#[derive(Default, Clone)]
pub struct FunctionRegistry {
    functions: HashMap<String, Registered>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a function whose calls are validated against `signature`.
    ///
    /// A signature that fails to compile leaves the registry unchanged.
    pub fn register<F>(&mut self, name: &str, signature: &str, body: F) -> Result<(), CompileError>
    where
        F: Fn(&[Value]) -> Result<Value, SignetError> + Send + Sync + 'static,
    {
        let validator = compile(signature)?;
        debug!(function = name, signature, "registered function");
        self.insert(Function::new(name, body), Some(validator));
        Ok(())
    }

    /// Registers a function that receives its arguments unchecked.
    pub fn register_unchecked<F>(&mut self, name: &str, body: F)
    where
        F: Fn(&[Value]) -> Result<Value, SignetError> + Send + Sync + 'static,
    {
        debug!(function = name, "registered function without signature");
        self.insert(Function::new(name, body), None);
    }

    /// Registers an existing function value under its own name.
    pub fn register_function(
        &mut self,
        function: Function,
        signature: Option<&str>,
    ) -> Result<(), CompileError> {
        let validator = signature.map(compile).transpose()?;
        self.insert(function, validator);
        Ok(())
    }

    fn insert(&mut self, function: Function, validator: Option<Validator>) {
        self.functions.insert(
            function.name().to_string(),
            Registered {
                function,
                validator,
            },
        );
    }

    /// Validates `args` and invokes the named function with the resolved list.
    pub fn call(&self, name: &str, args: &[Value], context: Option<&Value>) -> Result<Value, SignetError> {
        let registered = self
            .functions
            .get(name)
            .ok_or_else(|| SignetError::UnknownFunction(name.to_string()))?;
        let Some(validator) = &registered.validator else {
            debug!(function = name, argc = args.len(), "dispatching unchecked call");
            return registered.function.call(args);
        };
        let resolved = validator
            .validate(args, context)
            .map_err(|source| SignetError::Call {
                function: name.to_string(),
                source,
            })?;
        debug!(function = name, argc = resolved.len(), "dispatching validated call");
        registered.function.call(&resolved)
    }

    pub fn get(&self, name: &str) -> Option<&Function> {
        self.functions.get(name).map(|r| &r.function)
    }

    pub fn validator(&self, name: &str) -> Option<&Validator> {
        self.functions.get(name).and_then(|r| r.validator.as_ref())
    }

    /// The declared signature text of a function.
    pub fn signature(&self, name: &str) -> Option<&str> {
        self.validator(name).map(Validator::definition)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// All function names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.functions.keys().map(|s| s.as_str()).collect();
        names.sort();
        names
    }

    pub fn remove(&mut self, name: &str) -> Option<Registered> {
        self.functions.remove(name)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("functions", &self.names())
            .finish()
    }
}
