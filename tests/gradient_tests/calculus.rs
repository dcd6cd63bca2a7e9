use super::*;

fn partials(input: &str) -> (String, String) {
  let expr = parse_expression(input).unwrap();
  (
    partial_derivative(&expr, Variable::X).to_string(),
    partial_derivative(&expr, Variable::Y).to_string(),
  )
}

mod polynomials {
  use super::*;

  #[test]
  fn saddle() {
    assert_eq!(partials("x**2 - y**2"), ("2*x".into(), "-2*y".into()));
  }

  #[test]
  fn caret_is_power() {
    assert_eq!(partials("x^2 + y^2"), ("2*x".into(), "2*y".into()));
  }

  #[test]
  fn mixed_product() {
    assert_eq!(partials("x*y"), ("y".into(), "x".into()));
  }

  #[test]
  fn constant_function() {
    assert_eq!(partials("7"), ("0".into(), "0".into()));
    assert_eq!(partials("pi*E"), ("0".into(), "0".into()));
  }

  #[test]
  fn linear_function() {
    assert_eq!(partials("3*x - 2*y + 1"), ("3".into(), "-2".into()));
  }
}

mod transcendental {
  use super::*;

  #[test]
  fn sin_cos_product() {
    assert_eq!(
      partials("sin(x)*cos(y)"),
      ("cos(x)*cos(y)".into(), "-sin(x)*sin(y)".into())
    );
  }

  #[test]
  fn exp_of_variable() {
    assert_eq!(partials("exp(x)"), ("exp(x)".into(), "0".into()));
  }

  #[test]
  fn sqrt_of_sum() {
    let (dx, dy) = partials("sqrt(x**2 + y**2)");
    assert_eq!(dx, "x/sqrt(x**2 + y**2)");
    assert_eq!(dy, "y/sqrt(x**2 + y**2)");
  }

  #[test]
  fn ln_is_log() {
    assert_eq!(partials("ln(x)"), partials("log(x)"));
  }
}

mod latex {
  use super::*;

  fn tex(input: &str, var: Variable) -> String {
    let expr = parse_expression(input).unwrap();
    to_tex(&partial_derivative(&expr, var))
  }

  #[test]
  fn saddle_partials() {
    assert_eq!(tex("x**2 - y**2", Variable::X), "2 x");
    assert_eq!(tex("x**2 - y**2", Variable::Y), "- 2 y");
  }

  #[test]
  fn trig_partials() {
    assert_eq!(
      tex("sin(x)*cos(y)", Variable::X),
      "\\cos{\\left(x \\right)} \\cos{\\left(y \\right)}"
    );
  }
}
