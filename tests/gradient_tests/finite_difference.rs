//! Symbolic partials checked against central differences of f.

use super::*;

const H: f64 = 1e-5;

const EXPRESSIONS: [&str; 14] = [
  "x**2 - y**2",
  "sin(x)*cos(y)",
  "exp(-(x**2 + y**2)/4)",
  "x*y**3 - 2*x/y",
  "log(x**2 + y**2 + 1)",
  "sqrt(x**2 + y**2 + 1)",
  "atan(y/x)",
  "(x**2 + 1)**y",
  "tan(x*y/10)",
  "cosh(x/3) - sinh(y/3)*tanh(x)",
  "2**x + E**(y/2)",
  "Abs(x)*y",
  "asin(x/6) + acos(y/6)",
  "sec(x/4) + csc(y/4 + 2) + cot(x/4 + 1)",
];

const POINTS: [(f64, f64); 4] =
  [(1.0, 1.0), (-2.0, 0.5), (3.0, -2.5), (-4.5, -4.0)];

fn f(input: &str, x: f64, y: f64) -> f64 {
  evaluate(input, Point::new(x, y)).unwrap().value
}

#[test]
fn partials_match_central_differences() {
  for input in EXPRESSIONS {
    for (x, y) in POINTS {
      let report = evaluate(input, Point::new(x, y)).unwrap();
      let dx = (f(input, x + H, y) - f(input, x - H, y)) / (2.0 * H);
      let dy = (f(input, x, y + H) - f(input, x, y - H)) / (2.0 * H);
      let tolerance = 1e-3 * report.magnitude.max(1.0);
      assert!(
        (report.gradient.dx - dx).abs() < tolerance,
        "∂/∂x of {input} at ({x}, {y}): {} vs {dx}",
        report.gradient.dx
      );
      assert!(
        (report.gradient.dy - dy).abs() < tolerance,
        "∂/∂y of {input} at ({x}, {y}): {} vs {dy}",
        report.gradient.dy
      );
    }
  }
}
