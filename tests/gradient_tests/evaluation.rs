use super::*;

#[test]
fn saddle_at_one_one() {
  let report = evaluate("x**2 - y**2", Point::new(1.0, 1.0)).unwrap();
  assert_eq!(report.partial_x.to_string(), "2*x");
  assert_eq!(report.partial_y.to_string(), "-2*y");
  assert_eq!(report.value, 0.0);
  assert_eq!((report.gradient.dx, report.gradient.dy), (2.0, -2.0));
  assert_close(report.magnitude, 8f64.sqrt());
  assert_close(report.display.ux, 1.0607);
  assert_close(report.display.uy, -1.0607);
}

#[test]
fn sin_cos_at_origin() {
  let report = evaluate("sin(x)*cos(y)", Point::new(0.0, 0.0)).unwrap();
  assert_eq!(report.partial_x.to_string(), "cos(x)*cos(y)");
  assert_eq!(report.partial_y.to_string(), "-sin(x)*sin(y)");
  assert_eq!(report.value, 0.0);
  assert_eq!(report.gradient.dx, 1.0);
  assert_eq!(report.gradient.dy, 0.0);
  assert_close(report.display.ux, 1.5);
  assert_close(report.display.uy, 0.0);
}

#[test]
fn exact_zeros_are_unsigned() {
  // -sin(0)*sin(0) is -0.0 in floating point
  let report = evaluate("sin(x)*cos(y)", Point::new(0.0, 0.0)).unwrap();
  assert!(report.gradient.dy.is_sign_positive());
  assert!(report.display.uy.is_sign_positive());

  let json = report.to_json();
  assert_eq!(json["gradient"]["dy"].to_string(), "0.0");
  assert_eq!(json["display_vector"]["uy"].to_string(), "0.0");

  let report = evaluate("-x*y", Point::new(0.0, 2.0)).unwrap();
  assert!(report.value.is_sign_positive());
  assert_eq!(format!("{:.2}", report.value), "0.00");
}

#[test]
fn constant_function_has_zero_arrow() {
  let report = evaluate("3", Point::new(2.0, -1.0)).unwrap();
  assert_eq!(report.value, 3.0);
  assert_eq!(report.magnitude, 0.0);
  assert_eq!((report.display.ux, report.display.uy), (0.0, 0.0));
}

#[test]
fn power_is_right_associative() {
  // 2**3**2 = 2**9
  let report = evaluate("2**3**2 + 0*x", Point::new(0.0, 0.0)).unwrap();
  assert_eq!(report.value, 512.0);
}

#[test]
fn unary_minus_binds_looser_than_power() {
  let report = evaluate("-x**2", Point::new(3.0, 0.0)).unwrap();
  assert_eq!(report.value, -9.0);
  assert_eq!(report.gradient.dx, -6.0);
}

#[test]
fn log_with_base() {
  let report = evaluate("log(x, 2)", Point::new(4.0, 0.0)).unwrap();
  assert_close(report.value, 2.0);
  assert_close(report.gradient.dx, 1.0 / (4.0 * 2f64.ln()));
}

#[test]
fn constants_evaluate() {
  let report = evaluate("pi*x + E*y", Point::new(1.0, 1.0)).unwrap();
  assert_close(report.value, std::f64::consts::PI + std::f64::consts::E);
  assert_close(report.gradient.dx, std::f64::consts::PI);
  assert_close(report.gradient.dy, std::f64::consts::E);
}

#[test]
fn configured_display_length() {
  let mut options = gradviz::EvaluatorOptions::default();
  options.display_length = 3.0;
  let report = GradientEvaluator::new(options)
    .evaluate("x + y", Point::new(0.0, 0.0))
    .unwrap();
  assert_close(report.display.length(), 3.0);
  assert_close(report.display.ux, 3.0 / 2f64.sqrt());
}

#[test]
fn repeated_evaluation_is_identical() {
  let evaluator = GradientEvaluator::default();
  let a = evaluator.evaluate("x*y**2", Point::new(1.5, -2.0)).unwrap();
  let b = evaluator.evaluate("x*y**2", Point::new(1.5, -2.0)).unwrap();
  assert_eq!(a, b);
}
