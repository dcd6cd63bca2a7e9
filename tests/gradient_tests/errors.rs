use super::*;

fn error(input: &str) -> EvaluationError {
  evaluate(input, Point::new(1.0, 1.0)).unwrap_err()
}

#[test]
fn unbalanced_parenthesis() {
  let err = error("x**2 + (y");
  assert!(matches!(err, EvaluationError::ParseError { .. }));
  assert!(err.to_string().contains("x**2 + (y"));
}

#[test]
fn empty_input() {
  assert!(matches!(error(""), EvaluationError::EmptyInput));
  assert!(matches!(error("   "), EvaluationError::EmptyInput));
}

#[test]
fn third_variable_is_rejected() {
  match error("x + z") {
    EvaluationError::DisallowedSymbol { input, symbol } => {
      assert_eq!(input, "x + z");
      assert_eq!(symbol, "z");
    }
    other => panic!("unexpected error: {other}"),
  }
}

#[test]
fn unknown_function_is_rejected() {
  let err = error("foo(x)");
  assert!(matches!(err, EvaluationError::UnknownFunction { .. }));
  assert!(err.to_string().contains("foo"));
}

#[test]
fn wrong_arity_is_rejected() {
  assert!(matches!(
    error("sin(x, y)"),
    EvaluationError::WrongArity { found: 2, .. }
  ));
  assert!(matches!(
    error("log(x, y, 2)"),
    EvaluationError::WrongArity { found: 3, .. }
  ));
}

#[test]
fn value_undefined_at_point() {
  let err = evaluate("1/x", Point::new(0.0, 1.0)).unwrap_err();
  match &err {
    EvaluationError::Undefined { quantity, x, y, .. } => {
      assert_eq!(quantity, "f(x, y)");
      assert_eq!((*x, *y), (0.0, 1.0));
    }
    other => panic!("unexpected error: {other}"),
  }
  assert!(err.to_string().contains("1/x"));
}

#[test]
fn partial_undefined_at_point() {
  // f itself is 0 at the origin, but its partials divide by zero
  let err = evaluate("sqrt(x**2 + y**2)", Point::new(0.0, 0.0)).unwrap_err();
  match err {
    EvaluationError::Undefined { quantity, .. } => assert_eq!(quantity, "∂f/∂x"),
    other => panic!("unexpected error: {other}"),
  }
}

#[test]
fn complex_value_is_undefined() {
  let err = evaluate("sqrt(x)", Point::new(-1.0, 0.0)).unwrap_err();
  assert!(matches!(err, EvaluationError::Undefined { .. }));
}

#[test]
fn extreme_integer_quotient_is_evaluated() {
  let report = evaluate(
    "x*((-9223372036854775807 - 1)/(-1))",
    Point::new(1.0, 1.0),
  )
  .unwrap();
  assert_eq!(report.value, 9.223372036854775808e18);
  assert_eq!(report.gradient.dx, 9.223372036854775808e18);
  assert_eq!(report.gradient.dy, 0.0);
}
