use super::*;

const POINTS: [(f64, f64); 5] =
  [(1.0, 1.0), (-2.0, 0.5), (3.0, -2.5), (-4.5, -4.0), (0.25, 4.75)];

#[test]
fn arrow_has_configured_length_and_gradient_direction() {
  for input in ["x**2 - y**2", "sin(x)*cos(y) + x", "x*y**3 - y", "exp(x/5)*y"]
  {
    for (x, y) in POINTS {
      let report = evaluate(input, Point::new(x, y)).unwrap();
      let (g, d) = (report.gradient, report.display);
      if report.magnitude == 0.0 {
        assert_eq!((d.ux, d.uy), (0.0, 0.0));
        continue;
      }
      assert_close(d.length(), 1.5);
      // Parallel and pointing the same way
      assert!((d.ux * g.dy - d.uy * g.dx).abs() < 1e-9, "{input} at {x},{y}");
      assert!(d.ux * g.dx + d.uy * g.dy > 0.0, "{input} at {x},{y}");
    }
  }
}

#[test]
fn magnitude_matches_components() {
  let report = evaluate("3*x + 4*y", Point::new(0.0, 0.0)).unwrap();
  assert_close(report.magnitude, 5.0);
  assert_close(report.display.ux, 0.9);
  assert_close(report.display.uy, 1.2);
}

#[test]
fn stationary_point_gives_zero_arrow() {
  let report = evaluate("x**2 + y**2", Point::new(0.0, 0.0)).unwrap();
  assert_eq!(report.magnitude, 0.0);
  assert_eq!((report.display.ux, report.display.uy), (0.0, 0.0));
}
