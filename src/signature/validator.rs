//! Call-time validation against a compiled [`Validator`].

use tracing::trace;

use crate::diagnostics::CallError;
use crate::signature::Validator;
use crate::symbol::{supplied_signature, Symbol};
use crate::value::Value;

impl Validator {
    /// Validates a call and returns the arguments to dispatch with.
    ///
    /// Scalars passed to array parameters come back wrapped in a singleton
    /// list, and omitted context-fallback parameters are filled from
    /// `context`. Omitted optional parameters contribute nothing.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use signet::{compile, Value};
    /// let validator = compile("<s-n>").unwrap();
    /// let resolved = validator
    ///     .validate(&[Value::Int(5)], Some(&Value::from("ctx")))
    ///     .unwrap();
    /// assert_eq!(resolved, vec![Value::from("ctx"), Value::Int(5)]);
    /// ```
    pub fn validate(&self, args: &[Value], context: Option<&Value>) -> Result<Vec<Value>, CallError> {
        let supplied = supplied_signature(args);
        let Some(captures) = self.pattern.captures(&supplied) else {
            let err = self.localize(args, &supplied);
            trace!(signature = %self.definition, %supplied, index = err.index(), "call rejected");
            return Err(err);
        };

        let mut resolved = Vec::with_capacity(args.len().max(self.params.len()));
        let mut cursor = 0;
        for (index, param) in self.params.iter().enumerate() {
            let matched = captures.get(index + 1).map_or("", |m| m.as_str());
            if matched.is_empty() {
                if param.context_fallback() {
                    let symbol = context.map_or(Symbol::Null, Symbol::of);
                    if !param.accepts_context(symbol) {
                        return Err(CallError::ContextIncompatible {
                            value: context.cloned(),
                            index: cursor + 1,
                        });
                    }
                    resolved.push(context.cloned().unwrap_or_default());
                }
                continue;
            }

            // A `+` parameter captures one symbol per argument it consumed.
            for single in matched.chars() {
                let (Some(arg), Some(symbol)) = (args.get(cursor), Symbol::from_char(single)) else {
                    return Err(CallError::ArgumentTypeMismatch {
                        value: None,
                        index: cursor + 1,
                    });
                };
                resolved.push(param.resolve(arg, symbol, cursor + 1)?);
                cursor += 1;
            }
        }

        trace!(signature = %self.definition, %supplied, "call accepted");
        Ok(resolved)
    }

    /// Finds the first argument the signature could not account for.
    ///
    /// Matches successively longer prefixes of the parameter list; the first
    /// prefix that fails points at the argument after the previous match. If
    /// every prefix matches, the call has trailing arguments and the first of
    /// them is reported.
    fn localize(&self, args: &[Value], supplied: &str) -> CallError {
        let mut good_to = 0;
        for prefix in &self.prefixes {
            match prefix.find(supplied) {
                Some(m) => good_to = m.end(),
                None => break,
            }
        }
        CallError::ArgumentTypeMismatch {
            value: args.get(good_to).cloned(),
            index: good_to + 1,
        }
    }
}
