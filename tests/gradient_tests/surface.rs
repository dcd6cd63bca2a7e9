use super::*;

#[test]
fn default_grid_is_fifty_by_fifty() {
  let report = evaluate("x**2 - y**2", Point::new(1.0, 1.0)).unwrap();
  let grid = &report.surface;
  assert_eq!(grid.xs.len(), 50);
  assert_eq!(grid.ys.len(), 50);
  assert_eq!(grid.z.len(), 50);
  assert!(grid.z.iter().all(|row| row.len() == 50));
  assert_eq!(grid.xs.first(), Some(&-5.0));
  assert_eq!(grid.xs.last(), Some(&5.0));
  assert_eq!(grid.undefined_cells(), 0);
}

#[test]
fn rows_are_indexed_by_y() {
  let report = evaluate("x - 2*y", Point::new(0.0, 0.0)).unwrap();
  let grid = &report.surface;
  let (row, col) = (3, 40);
  let expected = grid.xs[col] - 2.0 * grid.ys[row];
  assert_close(grid.z[row][col].unwrap(), expected);
}

#[test]
fn undefined_cells_are_none() {
  // log(x) is undefined for the left half of the domain
  let report = evaluate("log(x)", Point::new(1.0, 1.0)).unwrap();
  let grid = &report.surface;
  assert_eq!(grid.undefined_cells(), 25 * 50);
  assert!(grid.z.iter().all(|row| row[0].is_none() && row[49].is_some()));
}

#[test]
fn json_bundle_shape() {
  let report = evaluate("sin(x)*cos(y)", Point::new(0.0, 0.0)).unwrap();
  let json = report.to_json();
  assert_eq!(json["expression"], "sin(x)*cos(y)");
  assert_eq!(json["partials"]["x"]["text"], "cos(x)*cos(y)");
  assert_eq!(json["partials"]["y"]["text"], "-sin(x)*sin(y)");
  assert!(json["partials"]["y"]["latex"].as_str().unwrap().starts_with("- "));
  assert_eq!(json["point"]["x"], 0.0);
  assert_eq!(json["gradient"]["dx"], 1.0);
  assert_eq!(json["display_vector"]["ux"], 1.5);
  assert_eq!(json["surface"]["z"].as_array().unwrap().len(), 50);
}

#[test]
fn undefined_cells_serialize_as_null() {
  let report = evaluate("1/x", Point::new(1.0, 1.0)).unwrap();
  // Resolution 50 never samples x = 0 exactly
  assert_eq!(report.surface.undefined_cells(), 0);

  let report = evaluate("sqrt(x)", Point::new(1.0, 1.0)).unwrap();
  let json = report.to_json();
  assert!(json["surface"]["z"][0][0].is_null());
}
