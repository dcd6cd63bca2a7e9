//! The gradient pipeline: parse → differentiate → evaluate → rescale.

use serde::Serialize;
use tracing::debug;

use crate::EvaluationError;
use crate::functions::calculus::partial_derivative;
use crate::functions::plot3d::{SurfaceGrid, SurfaceOptions};
use crate::functions::tex_form::to_tex;
use crate::syntax::{Expr, Variable, parse_expression};

pub const DEFAULT_EXPRESSION: &str = "x**2 - y**2";
pub const DEFAULT_DISPLAY_LENGTH: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
  pub x: f64,
  pub y: f64,
}

impl Point {
  pub fn new(x: f64, y: f64) -> Self {
    Point { x, y }
  }
}

/// (∂f/∂x, ∂f/∂y) at a point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GradientVector {
  pub dx: f64,
  pub dy: f64,
}

impl GradientVector {
  pub fn magnitude(&self) -> f64 {
    self.dx.hypot(self.dy)
  }

  /// Rescale to `length`, keeping the direction. The zero vector stays
  /// zero.
  pub fn display_vector(&self, length: f64) -> DisplayVector {
    let magnitude = self.magnitude();
    if magnitude > 0.0 {
      let k = length / magnitude;
      DisplayVector {
        ux: self.dx * k,
        uy: self.dy * k,
      }
    } else {
      DisplayVector { ux: 0.0, uy: 0.0 }
    }
  }
}

/// Arrow vector of constant length, used only for drawing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DisplayVector {
  pub ux: f64,
  pub uy: f64,
}

impl DisplayVector {
  pub fn length(&self) -> f64 {
    self.ux.hypot(self.uy)
  }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvaluatorOptions {
  pub display_length: f64,
  pub surface: SurfaceOptions,
}

impl Default for EvaluatorOptions {
  fn default() -> Self {
    EvaluatorOptions {
      display_length: DEFAULT_DISPLAY_LENGTH,
      surface: SurfaceOptions::default(),
    }
  }
}

/// Everything computed for one (expression, point) input.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientReport {
  pub expression: Expr,
  pub partial_x: Expr,
  pub partial_y: Expr,
  pub point: Point,
  pub value: f64,
  pub gradient: GradientVector,
  pub magnitude: f64,
  pub display: DisplayVector,
  pub surface: SurfaceGrid,
}

impl GradientReport {
  /// The bundle handed to a charting front-end.
  pub fn to_json(&self) -> serde_json::Value {
    serde_json::json!({
      "expression": self.expression.to_string(),
      "partials": {
        "x": {
          "text": self.partial_x.to_string(),
          "latex": to_tex(&self.partial_x),
        },
        "y": {
          "text": self.partial_y.to_string(),
          "latex": to_tex(&self.partial_y),
        },
      },
      "point": self.point,
      "value": self.value,
      "gradient": self.gradient,
      "magnitude": self.magnitude,
      "display_vector": self.display,
      "surface": self.surface,
    })
  }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GradientEvaluator {
  options: EvaluatorOptions,
}

impl GradientEvaluator {
  pub fn new(options: EvaluatorOptions) -> Self {
    GradientEvaluator { options }
  }

  pub fn options(&self) -> &EvaluatorOptions {
    &self.options
  }

  /// Run the full pipeline. Either every part of the report is produced
  /// or an error is returned.
  pub fn evaluate(
    &self,
    input: &str,
    point: Point,
  ) -> Result<GradientReport, EvaluationError> {
    let expression = parse_expression(input)?;
    let partial_x = partial_derivative(&expression, Variable::X);
    let partial_y = partial_derivative(&expression, Variable::Y);
    debug!(%expression, %partial_x, %partial_y, "partial derivatives");

    // `+ 0.0` turns -0.0 into 0.0 so that exact zeros print unsigned
    let at = |quantity: &str, expr: &Expr| {
      expr.eval(point).map(|v| v + 0.0).map_err(|reason| {
        EvaluationError::Undefined {
          quantity: quantity.to_string(),
          expression: expr.to_string(),
          x: point.x,
          y: point.y,
          reason: reason.to_string(),
        }
      })
    };
    let value = at("f(x, y)", &expression)?;
    let gradient = GradientVector {
      dx: at("∂f/∂x", &partial_x)?,
      dy: at("∂f/∂y", &partial_y)?,
    };

    let magnitude = gradient.magnitude();
    let arrow = gradient.display_vector(self.options.display_length);
    debug!(
      x = point.x,
      y = point.y,
      value,
      magnitude,
      ux = arrow.ux,
      uy = arrow.uy,
      "evaluated gradient"
    );

    let surface = SurfaceGrid::sample(&expression, &self.options.surface);

    Ok(GradientReport {
      expression,
      partial_x,
      partial_y,
      point,
      value,
      gradient,
      magnitude,
      display: arrow,
      surface,
    })
  }
}
