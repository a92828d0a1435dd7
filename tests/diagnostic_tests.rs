//! Rendered diagnostic output.
//!
//! Renders errors through miette's graphical handler without color and checks
//! that codes, labels and help survive into the text a user sees.

use miette::{Diagnostic, GraphicalReportHandler, GraphicalTheme};
use signet::{compile, CallError, FunctionRegistry, SignetError, Value};

/// Test helper to capture diagnostic output as a string.
fn render(diagnostic: &dyn Diagnostic) -> String {
    let mut out = String::new();
    GraphicalReportHandler::new_themed(GraphicalTheme::unicode_nocolor())
        .with_width(200)
        .render_report(&mut out, diagnostic)
        .unwrap();
    out
}

#[test]
fn test_misapplied_parameter_underlines_offset() {
    let err = compile("<n<s>>").unwrap_err();
    let output = render(&err);
    assert!(output.contains("S0401"), "{output}");
    assert!(output.contains("<n<s>>"), "{output}");
    assert!(output.contains("type parameter here"), "{output}");
    assert!(output.contains("not 'n'"), "{output}");
}

#[test]
fn test_union_diagnostic_has_help() {
    let err = compile("<(a<n>s)>").unwrap_err();
    let output = render(&err);
    assert!(output.contains("S0402"), "{output}");
    assert!(output.contains("parameterized choice"), "{output}");
    assert!(output.contains("use a plain choice"), "{output}");
}

#[test]
fn test_malformed_diagnostic() {
    let err = compile("<(sn").unwrap_err();
    let output = render(&err);
    assert!(output.contains("S0400"), "{output}");
    assert!(output.contains("unterminated '('"), "{output}");
}

#[test]
fn test_call_error_help_shows_received_value() {
    let err = compile("<sn>")
        .unwrap()
        .validate(&[Value::from("x"), Value::from("y")], None)
        .unwrap_err();
    assert_eq!(
        err,
        CallError::ArgumentTypeMismatch {
            value: Some(Value::from("y")),
            index: 2
        }
    );
    let output = render(&err);
    assert!(output.contains("T0410"), "{output}");
    assert!(output.contains("argument 2 does not match"), "{output}");
    assert!(output.contains("received \"y\" (String)"), "{output}");
}

#[test]
fn test_registry_error_delegates_to_call_error() {
    let mut registry = FunctionRegistry::new();
    registry
        .register("len", "<s-:n>", |_| Ok(Value::Int(0)))
        .unwrap();
    let err = registry
        .call("len", &[], Some(&Value::Int(3)))
        .unwrap_err();
    assert!(matches!(err, SignetError::Call { .. }));
    let output = render(&err);
    assert!(output.contains("T0411"), "{output}");
    assert!(output.contains("function 'len'"), "{output}");
    assert!(output.contains("the context value was 3"), "{output}");
}
