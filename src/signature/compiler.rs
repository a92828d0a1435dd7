//! Signature text → [`Validator`].
//!
//! A single forward scan over the characters of the signature. Each kind symbol
//! closes a new [`Param`] with a character class over the symbol alphabet;
//! modifiers (`?`, `+`, `-`, `<...>`) adjust the most recently closed one. The
//! classes are then joined into one anchored pattern with a capture group per
//! parameter.

use regex::Regex;
use tracing::debug;

use crate::diagnostics::{to_error_source, CompileError, SourceArc};
use crate::signature::{Param, Validator};

/// Compiles signature text into a reusable validator.
///
/// The first character is the framing delimiter and is skipped. Everything
/// after a `:` is the return type, which is kept but never enforced.
///
/// # Examples
///
/// ```rust
/// use signet::compile;
/// let validator = compile("<s-nn?:s>").expect("valid signature");
/// assert_eq!(validator.params().len(), 3);
/// assert_eq!(validator.return_kind(), Some("s"));
/// ```
pub fn compile(signature: &str) -> Result<Validator, CompileError> {
    let result = Compiler::new(signature).run();
    match &result {
        Ok(validator) => debug!(
            signature,
            params = validator.params().len(),
            pattern = validator.pattern(),
            "compiled signature"
        ),
        Err(err) => debug!(signature, code = %err.code(), error = %err, "signature rejected"),
    }
    result
}

struct Compiler<'a> {
    text: &'a str,
    chars: Vec<char>,
    src: SourceArc,
    params: Vec<Param>,
}

impl<'a> Compiler<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            chars: text.chars().collect(),
            src: to_error_source(text),
            params: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Validator, CompileError> {
        let mut return_kind = None;
        let mut position = 1;
        while position < self.chars.len() {
            let symbol = self.chars[position];
            match symbol {
                ':' => {
                    return_kind = self.return_annotation(position + 1);
                    break;
                }
                's' | 'n' | 'b' | 'l' | 'o' => {
                    self.close(format!("[{symbol}m]"), symbol.to_string(), position)?
                }
                // Any kind: scalars are wrapped into singleton arrays.
                'a' => self.close("[asnblfom]".to_string(), "a".to_string(), position)?,
                'f' => self.close("f".to_string(), "f".to_string(), position)?,
                'j' => self.close("[snblom]".to_string(), "j".to_string(), position)?,
                'x' => self.close("[asnblfom]".to_string(), "x".to_string(), position)?,
                '(' => {
                    let end = self.closing(position, '(', ')')?;
                    let choice: String = self.chars[position + 1..end].iter().collect();
                    if choice.contains('<') {
                        return Err(CompileError::UnionNotSupported {
                            choice,
                            offset: position,
                            src: self.src.clone(),
                        });
                    }
                    self.close(format!("[{choice}m]"), format!("({choice})"), position)?;
                    position = end;
                }
                '<' => {
                    let kind = self.params.last().map(|p| p.kind.clone()).unwrap_or_default();
                    if kind != "a" && kind != "f" {
                        return Err(CompileError::ParameterMisapplied {
                            kind,
                            offset: position,
                            src: self.src.clone(),
                        });
                    }
                    let end = self.closing(position, '<', '>')?;
                    let element: String = self.chars[position + 1..end].iter().collect();
                    if let Some(prev) = self.params.last_mut() {
                        prev.element_kind = Some(element);
                    }
                    position = end;
                }
                '-' => {
                    let class = self.previous(symbol, position)?.class.clone();
                    let context = self.regex(&class, position)?;
                    self.previous(symbol, position)?.context_pattern = Some(context);
                    self.optional(position)?;
                }
                '?' | '+' => self.suffix(symbol, position)?,
                _ => {}
            }
            position += 1;
        }

        let mut whole = String::from("^");
        let mut prefix = String::from("^");
        let mut prefixes = Vec::with_capacity(self.params.len());
        for param in &self.params {
            whole.push_str(&format!("({})", param.pattern()));
            prefix.push_str(param.pattern());
            prefixes.push(self.regex(&prefix, 0)?);
        }
        whole.push('$');
        let pattern = self.regex(&whole, 0)?;

        Ok(Validator {
            definition: self.text.to_string(),
            params: self.params,
            pattern,
            prefixes,
            return_kind,
        })
    }

    /// Completes a parameter with the given class.
    fn close(&mut self, class: String, kind: String, position: usize) -> Result<(), CompileError> {
        let pattern = self.regex(&class, position)?;
        self.params.push(Param::new(class, kind, pattern));
        Ok(())
    }

    fn previous(&mut self, modifier: char, position: usize) -> Result<&mut Param, CompileError> {
        let src = self.src.clone();
        self.params.last_mut().ok_or_else(|| CompileError::Malformed {
            message: format!("modifier '{modifier}' has no parameter to apply to"),
            offset: position,
            src,
            source: None,
        })
    }

    /// Appends a repetition suffix to the most recent parameter.
    fn suffix(&mut self, modifier: char, position: usize) -> Result<(), CompileError> {
        let extended = format!("{}{}", self.previous(modifier, position)?.pattern(), modifier);
        let pattern = self.regex(&extended, position)?;
        self.previous(modifier, position)?.pattern = pattern;
        Ok(())
    }

    /// Makes the most recent parameter omittable.
    ///
    /// A pattern that already ends in a quantifier is grouped first, since a
    /// bare `?` after it would make that quantifier lazy instead.
    fn optional(&mut self, position: usize) -> Result<(), CompileError> {
        let current = self.previous('-', position)?.pattern().to_string();
        let extended = if current.ends_with(['?', '+', '*']) {
            format!("(?:{current})?")
        } else {
            format!("{current}?")
        };
        let pattern = self.regex(&extended, position)?;
        self.previous('-', position)?.pattern = pattern;
        Ok(())
    }

    /// Position of the bracket balancing the one at `start`.
    fn closing(&self, start: usize, open: char, close: char) -> Result<usize, CompileError> {
        let mut depth = 1;
        for (position, &symbol) in self.chars.iter().enumerate().skip(start + 1) {
            if symbol == close {
                depth -= 1;
                if depth == 0 {
                    return Ok(position);
                }
            } else if symbol == open {
                depth += 1;
            }
        }
        Err(CompileError::Malformed {
            message: format!("unterminated '{open}'"),
            offset: start,
            src: self.src.clone(),
            source: None,
        })
    }

    /// Text after `:` without the closing framing delimiter.
    fn return_annotation(&self, start: usize) -> Option<String> {
        let rest: String = self.chars.get(start..)?.iter().collect();
        let rest = rest.strip_suffix('>').unwrap_or(&rest);
        (!rest.is_empty()).then(|| rest.to_string())
    }

    fn regex(&self, pattern: &str, position: usize) -> Result<Regex, CompileError> {
        Regex::new(pattern).map_err(|err| CompileError::Malformed {
            message: format!("invalid pattern '{pattern}'"),
            offset: position,
            src: self.src.clone(),
            source: Some(err),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::ErrorCode;

    fn kinds(validator: &Validator) -> Vec<&str> {
        validator.params().iter().map(Param::kind).collect()
    }

    #[test]
    fn base_kinds_get_wildcard_classes() {
        let validator = compile("<snblo>").unwrap();
        assert_eq!(kinds(&validator), vec!["s", "n", "b", "l", "o"]);
        assert_eq!(validator.params()[0].pattern(), "[sm]");
        assert_eq!(validator.pattern(), "^([sm])([nm])([bm])([lm])([om])$");
    }

    #[test]
    fn special_kinds() {
        let validator = compile("<afjx>").unwrap();
        let patterns: Vec<&str> = validator.params().iter().map(Param::pattern).collect();
        assert_eq!(patterns, vec!["[asnblfom]", "f", "[snblom]", "[asnblfom]"]);
        assert!(validator.params()[0].is_array());
        assert!(!validator.params()[3].is_array());
    }

    #[test]
    fn modifiers_apply_to_previous_param() {
        let validator = compile("<s-n+b?>").unwrap();
        let [s, n, b] = validator.params() else {
            panic!("expected three params");
        };
        assert!(s.context_fallback());
        assert_eq!(s.context_pattern(), Some("[sm]"));
        assert_eq!(s.pattern(), "[sm]?");
        assert_eq!(n.pattern(), "[nm]+");
        assert!(!n.context_fallback());
        assert_eq!(b.pattern(), "[bm]?");
    }

    #[test]
    fn context_pattern_excludes_repetition_suffix() {
        let validator = compile("<n+->").unwrap();
        let param = &validator.params()[0];
        assert_eq!(param.context_pattern(), Some("[nm]"));
        assert_eq!(param.pattern(), "(?:[nm]+)?");
        assert_eq!(validator.pattern(), "^((?:[nm]+)?)$");
    }

    #[test]
    fn context_marker_groups_any_quantified_pattern() {
        let validator = compile("<s?-b+-n>").unwrap();
        let patterns: Vec<&str> = validator.params().iter().map(Param::pattern).collect();
        assert_eq!(patterns, vec!["(?:[sm]?)?", "(?:[bm]+)?", "[nm]"]);
        assert_eq!(compile("<s->").unwrap().params()[0].pattern(), "[sm]?");
    }

    #[test]
    fn choice_becomes_a_literal_class() {
        let validator = compile("<(sn)b>").unwrap();
        assert_eq!(kinds(&validator), vec!["(sn)", "b"]);
        assert_eq!(validator.params()[0].pattern(), "[snm]");
    }

    #[test]
    fn type_parameters_attach_to_arrays_and_functions() {
        let validator = compile("<a<a<n>>f<n:n>s>").unwrap();
        assert_eq!(validator.params()[0].element_kind(), Some("a<n>"));
        assert_eq!(validator.params()[1].element_kind(), Some("n:n"));
        assert_eq!(validator.params()[2].element_kind(), None);
        assert_eq!(kinds(&validator), vec!["a", "f", "s"]);
    }

    #[test]
    fn return_type_is_captured_not_compiled() {
        let validator = compile("<a<o>:a<o>>").unwrap();
        assert_eq!(validator.params().len(), 1);
        assert_eq!(validator.return_kind(), Some("a<o>"));
        assert_eq!(compile("<n>").unwrap().return_kind(), None);
    }

    #[test]
    fn misapplied_type_parameter() {
        let err = compile("<s<n>>").unwrap_err();
        assert_eq!(err.code(), ErrorCode::ParameterMisapplied);
        assert_eq!(err.value(), "s");
        assert_eq!(err.offset(), 2);

        let err = compile("<<n>>").unwrap_err();
        assert_eq!(err.code(), ErrorCode::ParameterMisapplied);
        assert_eq!(err.value(), "");
    }

    #[test]
    fn parameterized_choice_is_rejected() {
        let err = compile("<s(a<n>o)>").unwrap_err();
        assert_eq!(err.code(), ErrorCode::UnionNotSupported);
        assert_eq!(err.value(), "a<n>o");
        assert_eq!(err.offset(), 2);
    }

    #[test]
    fn malformed_signatures() {
        for (text, offset) in [("<(sn>", 1), ("<a<n>", 2), ("<?s>", 1), ("<-s>", 1)] {
            let err = compile(text).unwrap_err();
            assert_eq!(err.code(), ErrorCode::MalformedSignature, "for {text}");
            assert_eq!(err.offset(), offset, "for {text}");
        }
    }

    #[test]
    fn invalid_choice_class_propagates_regex_error() {
        let err = compile(r"<(\q)>").unwrap_err();
        assert_eq!(err.code(), ErrorCode::MalformedSignature);
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn unknown_characters_are_ignored() {
        let validator = compile("< s , n >").unwrap();
        assert_eq!(kinds(&validator), vec!["s", "n"]);
        assert_eq!(compile("").unwrap().pattern(), "^$");
    }
}
