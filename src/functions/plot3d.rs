//! Surface sampling and SVG rendering of f(x, y) with the steepest-ascent
//! arrow.

use serde::Serialize;
use tracing::debug;

use crate::EvaluationError;
use crate::functions::plot::{format_tick, nice_step};
use crate::gradient::{GradientReport, Point};
use crate::syntax::Expr;

/// Cube aspect: the z extent is drawn as tall as the x and y extents.
const Z_SCALE: f64 = 1.0;
const ARROW_COLOR: &str = "#f5d400";

/// Where and how densely to sample the surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceOptions {
  pub domain_min: f64,
  pub domain_max: f64,
  /// Samples per axis, both ends included.
  pub resolution: usize,
}

impl Default for SurfaceOptions {
  fn default() -> Self {
    SurfaceOptions {
      domain_min: -5.0,
      domain_max: 5.0,
      resolution: 50,
    }
  }
}

/// `resolution` evenly spaced samples from `start` to `end` inclusive.
pub fn linspace(start: f64, end: f64, resolution: usize) -> Vec<f64> {
  match resolution {
    0 => Vec::new(),
    1 => vec![start],
    n => {
      let step = (end - start) / (n - 1) as f64;
      (0..n)
        .map(|i| if i == n - 1 { end } else { start + i as f64 * step })
        .collect()
    }
  }
}

/// f sampled on a square grid. `z[row][col]` is f(xs[col], ys[row]);
/// `None` marks points where f is undefined.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurfaceGrid {
  pub xs: Vec<f64>,
  pub ys: Vec<f64>,
  pub z: Vec<Vec<Option<f64>>>,
}

impl SurfaceGrid {
  pub fn sample(expr: &Expr, options: &SurfaceOptions) -> Self {
    let xs = linspace(options.domain_min, options.domain_max, options.resolution);
    let ys = xs.clone();
    let z: Vec<Vec<Option<f64>>> = ys
      .iter()
      .map(|&y| xs.iter().map(|&x| expr.eval(Point { x, y }).ok()).collect())
      .collect();

    let grid = SurfaceGrid { xs, ys, z };
    let undefined = grid.undefined_cells();
    if undefined > 0 {
      debug!(undefined, %expr, "surface has undefined cells");
    }
    grid
  }

  pub fn undefined_cells(&self) -> usize {
    self.z.iter().flatten().filter(|cell| cell.is_none()).count()
  }

  /// Smallest and largest defined value, if any cell is defined.
  pub fn z_range(&self) -> Option<(f64, f64)> {
    self.z.iter().flatten().flatten().fold(None, |acc, &v| match acc {
      None => Some((v, v)),
      Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
  }

  fn at(&self, col: usize, row: usize) -> Option<f64> {
    self.z[row][col]
  }
}

/// SVG output settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
  pub width: u32,
  pub height: u32,
  /// Arrow head length in data units.
  pub cone_size: f64,
  pub mesh: bool,
}

impl Default for RenderOptions {
  fn default() -> Self {
    RenderOptions {
      width: 700,
      height: 700,
      cone_size: 0.5,
      mesh: true,
    }
  }
}

// --- 3D math types and helpers ---

#[derive(Clone, Copy)]
struct Point3D {
  x: f64,
  y: f64,
  z: f64,
}

struct Camera {
  azimuth: f64,
  elevation: f64,
}

impl Default for Camera {
  fn default() -> Self {
    Camera {
      azimuth: -1.07,
      elevation: 0.63,
    }
  }
}

struct Triangle {
  projected: [(f64, f64); 3],
  depth: f64,
  color: (u8, u8, u8),
}

/// Orthographic projection from a camera at spherical (azimuth, elevation).
fn project(p: Point3D, cam: &Camera) -> (f64, f64) {
  let (sa, ca) = cam.azimuth.sin_cos();
  let (se, ce) = cam.elevation.sin_cos();
  let screen_x = -p.x * sa + p.y * ca;
  let screen_y = -p.x * ca * se - p.y * sa * se + p.z * ce;
  (screen_x, screen_y)
}

/// Depth along the camera direction. Positive = further from viewer.
fn depth(p: Point3D, cam: &Camera) -> f64 {
  let (sa, ca) = cam.azimuth.sin_cos();
  let (se, ce) = cam.elevation.sin_cos();
  -(p.x * ce * ca + p.y * ce * sa + p.z * se)
}

fn triangle_normal(v0: Point3D, v1: Point3D, v2: Point3D) -> [f64; 3] {
  let (ux, uy, uz) = (v1.x - v0.x, v1.y - v0.y, v1.z - v0.z);
  let (vx, vy, vz) = (v2.x - v0.x, v2.y - v0.y, v2.z - v0.z);
  let nx = uy * vz - uz * vy;
  let ny = uz * vx - ux * vz;
  let nz = ux * vy - uy * vx;
  let len = (nx * nx + ny * ny + nz * nz).sqrt();
  if len < 1e-15 {
    [0.0, 0.0, 1.0]
  } else {
    [nx / len, ny / len, nz / len]
  }
}

/// Viridis-like ramp: dark purple at the bottom, yellow at the top
fn height_color(t: f64) -> (u8, u8, u8) {
  const STOPS: [(f64, f64, f64); 5] = [
    (0.267, 0.005, 0.329),
    (0.231, 0.322, 0.545),
    (0.129, 0.569, 0.549),
    (0.369, 0.788, 0.384),
    (0.993, 0.906, 0.144),
  ];
  let t = t.clamp(0.0, 1.0) * (STOPS.len() - 1) as f64;
  let i = (t.floor() as usize).min(STOPS.len() - 2);
  let s = t - i as f64;
  let (a, b) = (STOPS[i], STOPS[i + 1]);
  let mix = |p: f64, q: f64| ((p * (1.0 - s) + q * s) * 255.0).round() as u8;
  (mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

/// Diffuse + ambient lighting
fn apply_lighting(color: (u8, u8, u8), normal: [f64; 3]) -> (u8, u8, u8) {
  let (lx, ly, lz) = (0.4_f64, -0.5_f64, 0.76_f64);
  let len = (lx * lx + ly * ly + lz * lz).sqrt();
  let dot = (normal[0] * lx + normal[1] * ly + normal[2] * lz) / len;
  let ambient = 0.35;
  let intensity = (ambient + (1.0 - ambient) * dot.abs()).clamp(0.0, 1.0);
  let shade = |c: u8| (c as f64 * intensity).round() as u8;
  (shade(color.0), shade(color.1), shade(color.2))
}

/// Maps data coordinates into the normalized [-1, 1]² × [-Z_SCALE, Z_SCALE]
/// drawing box.
struct Normalizer {
  domain: (f64, f64),
  z_lo: f64,
  z_span: f64,
}

impl Normalizer {
  fn coord(&self, v: f64) -> f64 {
    (v - self.domain.0) / (self.domain.1 - self.domain.0) * 2.0 - 1.0
  }

  fn height(&self, z: f64) -> f64 {
    ((z - self.z_lo) / self.z_span) * 2.0 * Z_SCALE - Z_SCALE
  }

  fn point(&self, x: f64, y: f64, z: f64) -> Point3D {
    Point3D {
      x: self.coord(x),
      y: self.coord(y),
      z: self.height(z),
    }
  }
}

fn shaded_triangle(
  vertices: [Point3D; 3],
  heights: [f64; 3],
  camera: &Camera,
) -> Triangle {
  let [v0, v1, v2] = vertices;
  let avg = heights.iter().sum::<f64>() / 3.0;
  let color = apply_lighting(height_color(avg), triangle_normal(v0, v1, v2));
  let center = Point3D {
    x: (v0.x + v1.x + v2.x) / 3.0,
    y: (v0.y + v1.y + v2.y) / 3.0,
    z: (v0.z + v1.z + v2.z) / 3.0,
  };
  Triangle {
    projected: [project(v0, camera), project(v1, camera), project(v2, camera)],
    depth: depth(center, camera),
    color,
  }
}

fn build_triangles(
  grid: &SurfaceGrid,
  norm: &Normalizer,
  camera: &Camera,
) -> Vec<Triangle> {
  let n = grid.xs.len();
  let mut triangles = Vec::with_capacity(2 * n * n);
  let vertex = |col: usize, row: usize, z: f64| {
    norm.point(grid.xs[col], grid.ys[row], z)
  };
  let level = |z: f64| (z - norm.z_lo) / norm.z_span;

  for row in 0..n.saturating_sub(1) {
    for col in 0..n - 1 {
      let z00 = grid.at(col, row);
      let z10 = grid.at(col + 1, row);
      let z01 = grid.at(col, row + 1);
      let z11 = grid.at(col + 1, row + 1);

      if let (Some(a), Some(b), Some(c)) = (z00, z10, z01) {
        triangles.push(shaded_triangle(
          [vertex(col, row, a), vertex(col + 1, row, b), vertex(col, row + 1, c)],
          [level(a), level(b), level(c)],
          camera,
        ));
      }
      if let (Some(a), Some(b), Some(c)) = (z11, z01, z10) {
        triangles.push(shaded_triangle(
          [
            vertex(col + 1, row + 1, a),
            vertex(col, row + 1, b),
            vertex(col + 1, row, c),
          ],
          [level(a), level(b), level(c)],
          camera,
        ));
      }
    }
  }
  triangles
}

fn escape(text: &str) -> String {
  text
    .replace('&', "&amp;")
    .replace('<', "&lt;")
    .replace('>', "&gt;")
}

/// Render the surface of `report` with its steepest-ascent arrow as SVG.
pub fn render_svg(
  report: &GradientReport,
  options: &RenderOptions,
) -> Result<String, EvaluationError> {
  let grid = &report.surface;
  let (z_min, z_max) = grid.z_range().ok_or_else(|| {
    EvaluationError::NoSurface(format!(
      "f(x, y) = {} has no finite values on the plotted domain",
      report.expression
    ))
  })?;
  let (z_lo, z_hi) = if (z_max - z_min).abs() < 1e-15 {
    (z_min - 0.5, z_max + 0.5)
  } else {
    (z_min, z_max)
  };

  let domain = match (grid.xs.first(), grid.xs.last()) {
    (Some(&lo), Some(&hi)) if hi > lo => (lo, hi),
    _ => {
      return Err(EvaluationError::NoSurface(
        "surface domain is empty".to_string(),
      ));
    }
  };
  let norm = Normalizer {
    domain,
    z_lo,
    z_span: z_hi - z_lo,
  };
  let camera = Camera::default();

  let mut triangles = build_triangles(grid, &norm, &camera);
  // Painter's algorithm: sort back-to-front (largest depth first)
  triangles.sort_by(|a, b| b.depth.total_cmp(&a.depth));
  debug!(triangles = triangles.len(), "rendering surface");

  // Fit the bounding box of the drawing box into the canvas
  let corners = bounding_box_corners();
  let (mut px_min, mut px_max) = (f64::INFINITY, f64::NEG_INFINITY);
  let (mut py_min, mut py_max) = (f64::INFINITY, f64::NEG_INFINITY);
  for &corner in &corners {
    let (px, py) = project(corner, &camera);
    px_min = px_min.min(px);
    px_max = px_max.max(px);
    py_min = py_min.min(py);
    py_max = py_max.max(py);
  }

  let margin = 50.0;
  let draw_w = options.width as f64 - 2.0 * margin;
  let draw_h = options.height as f64 - 2.0 * margin;
  let scale = (draw_w / (px_max - px_min)).min(draw_h / (py_max - py_min));
  let cx = margin + draw_w / 2.0;
  let cy = margin + draw_h / 2.0;
  let p_cx = (px_min + px_max) / 2.0;
  let p_cy = (py_min + py_max) / 2.0;
  let to_svg = |p: Point3D| -> (f64, f64) {
    let (px, py) = project(p, &camera);
    (cx + (px - p_cx) * scale, cy - (py - p_cy) * scale)
  };

  let mut svg = String::with_capacity(triangles.len() * 120 + 2000);
  svg.push_str(&format!(
    "<svg width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
    w = options.width,
    h = options.height
  ));
  svg.push_str(&format!(
    "<rect width=\"{}\" height=\"{}\" fill=\"white\"/>\n",
    options.width, options.height
  ));

  let mesh_attrs = if options.mesh {
    " stroke=\"#00000018\" stroke-width=\"0.5\""
  } else {
    " stroke=\"none\""
  };
  for tri in &triangles {
    let points: Vec<String> = tri
      .projected
      .iter()
      .map(|&(px, py)| {
        let (sx, sy) = (cx + (px - p_cx) * scale, cy - (py - p_cy) * scale);
        format!("{sx:.1},{sy:.1}")
      })
      .collect();
    let (r, g, b) = tri.color;
    svg.push_str(&format!(
      "<polygon points=\"{}\" fill=\"rgb({r},{g},{b})\"{mesh_attrs}/>\n",
      points.join(" ")
    ));
  }

  draw_axes(
    &mut svg,
    &camera,
    &to_svg,
    domain,
    (z_lo, z_hi),
  );
  draw_arrow(&mut svg, report, &norm, options.cone_size, &to_svg);

  svg.push_str(&format!(
    "<text x=\"{:.1}\" y=\"24\" font-size=\"14\" text-anchor=\"middle\">f(x, y) = {}</text>\n",
    options.width as f64 / 2.0,
    escape(&report.expression.to_string())
  ));
  svg.push_str(&format!(
    "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"12\" text-anchor=\"middle\">∇f({:?}, {:?}) = ⟨{:.2}, {:.2}⟩</text>\n",
    options.width as f64 / 2.0,
    options.height as f64 - 16.0,
    report.point.x,
    report.point.y,
    report.gradient.dx,
    report.gradient.dy
  ));

  svg.push_str("</svg>");
  Ok(svg)
}

/// Shaft from (x0, y0, f0) to the tip plus a flat triangular head, both
/// drawn at the height of f at the point.
fn draw_arrow(
  svg: &mut String,
  report: &GradientReport,
  norm: &Normalizer,
  cone_size: f64,
  to_svg: &dyn Fn(Point3D) -> (f64, f64),
) {
  let Point { x: x0, y: y0 } = report.point;
  let z0 = report.value;
  let (bx, by) = to_svg(norm.point(x0, y0, z0));
  svg.push_str(&format!(
    "<circle cx=\"{bx:.1}\" cy=\"{by:.1}\" r=\"4\" fill=\"{ARROW_COLOR}\" stroke=\"black\" stroke-width=\"0.5\"/>\n"
  ));

  let (ux, uy) = (report.display.ux, report.display.uy);
  let length = (ux * ux + uy * uy).sqrt();
  if length == 0.0 {
    return;
  }

  let (tx, ty) = (x0 + ux, y0 + uy);
  let (sx, sy) = to_svg(norm.point(tx, ty, z0));
  svg.push_str(&format!(
    "<line x1=\"{bx:.1}\" y1=\"{by:.1}\" x2=\"{sx:.1}\" y2=\"{sy:.1}\" stroke=\"{ARROW_COLOR}\" stroke-width=\"5\" stroke-linecap=\"round\"/>\n"
  ));

  // Head of length `cone_size`, centred on the end of the shaft
  let (dx, dy) = (ux / length, uy / length);
  let half = cone_size / 2.0;
  let (base_x, base_y) = (tx - dx * half, ty - dy * half);
  let left = to_svg(norm.point(base_x - dy * half, base_y + dx * half, z0));
  let right = to_svg(norm.point(base_x + dy * half, base_y - dx * half, z0));
  let tip = to_svg(norm.point(tx + dx * half, ty + dy * half, z0));
  svg.push_str(&format!(
    "<polygon points=\"{:.1},{:.1} {:.1},{:.1} {:.1},{:.1}\" fill=\"{ARROW_COLOR}\" stroke=\"black\" stroke-width=\"0.5\"/>\n",
    tip.0, tip.1, left.0, left.1, right.0, right.1
  ));
}

/// The 8 corners of the normalized drawing box
fn bounding_box_corners() -> [Point3D; 8] {
  let mut corners = [Point3D {
    x: 0.0,
    y: 0.0,
    z: 0.0,
  }; 8];
  for (i, corner) in corners.iter_mut().enumerate() {
    corner.x = if i & 1 == 0 { -1.0 } else { 1.0 };
    corner.y = if i & 2 == 0 { -1.0 } else { 1.0 };
    corner.z = if i & 4 == 0 { -Z_SCALE } else { Z_SCALE };
  }
  corners
}

/// Draw 3D axis lines with ticks and labels
fn draw_axes(
  svg: &mut String,
  camera: &Camera,
  to_svg: &dyn Fn(Point3D) -> (f64, f64),
  domain: (f64, f64),
  z_range: (f64, f64),
) {
  let axis_color = "#666666";
  let font_size = 10;

  // The bottom corner closest to the viewer anchors all three axes
  let origin = bounding_box_corners()
    .into_iter()
    .filter(|c| c.z < 0.0)
    .min_by(|a, b| depth(*a, camera).total_cmp(&depth(*b, camera)))
    .unwrap_or(Point3D {
      x: -1.0,
      y: -1.0,
      z: -Z_SCALE,
    });

  let x_end = Point3D {
    x: -origin.x,
    ..origin
  };
  let y_end = Point3D {
    y: -origin.y,
    ..origin
  };
  let z_end = Point3D {
    z: Z_SCALE,
    ..origin
  };

  // (endpoint, value range, whether the axis runs from +1 to -1)
  let axes: [(Point3D, (f64, f64), bool); 3] = [
    (x_end, domain, origin.x > x_end.x),
    (y_end, domain, origin.y > y_end.y),
    (z_end, z_range, false),
  ];

  let (sx0, sy0) = to_svg(origin);
  for &(end, (val_min, val_max), flipped) in &axes {
    let (sx1, sy1) = to_svg(end);
    svg.push_str(&format!(
      "<line x1=\"{sx0:.1}\" y1=\"{sy0:.1}\" x2=\"{sx1:.1}\" y2=\"{sy1:.1}\" stroke=\"{axis_color}\" stroke-width=\"1\"/>\n"
    ));

    let step = nice_step(val_max - val_min, 4);
    if step <= 0.0 {
      continue;
    }
    let (dx, dy) = (sx1 - sx0, sy1 - sy0);
    let len = (dx * dx + dy * dy).sqrt();
    if len <= 1.0 {
      continue;
    }
    let (perpx, perpy) = (-dy / len * 4.0, dx / len * 4.0);

    let mut tick_val = (val_min / step).ceil() * step;
    while tick_val <= val_max + step * 0.01 {
      let t_raw = ((tick_val - val_min) / (val_max - val_min)).clamp(0.0, 1.0);
      let t = if flipped { 1.0 - t_raw } else { t_raw };
      let (tx, ty) = to_svg(Point3D {
        x: origin.x + (end.x - origin.x) * t,
        y: origin.y + (end.y - origin.y) * t,
        z: origin.z + (end.z - origin.z) * t,
      });

      svg.push_str(&format!(
        "<line x1=\"{tx:.1}\" y1=\"{ty:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"{axis_color}\" stroke-width=\"0.5\"/>\n",
        tx + perpx,
        ty + perpy
      ));
      svg.push_str(&format!(
        "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"{font_size}\" fill=\"{axis_color}\" text-anchor=\"middle\" dominant-baseline=\"middle\">{}</text>\n",
        tx + perpx * 3.0,
        ty + perpy * 3.0,
        format_tick(tick_val)
      ));

      tick_val += step;
    }
  }
}
