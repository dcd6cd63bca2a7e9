//! Numeric evaluation of expressions at a point.
//!
//! Every operation is checked: a result that is not a finite real number
//! is reported as [`Undefined`] instead of leaking NaN or infinity.

use thiserror::Error;

use crate::gradient::Point;
use crate::syntax::{BinaryOperator, Expr, Function, Variable};

/// Why an expression has no finite real value at a point.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Undefined {
  #[error("division by zero")]
  DivisionByZero,
  #[error("{0} is outside the real domain")]
  Domain(String),
  #[error("result is not finite")]
  Overflow,
}

fn finite(value: f64) -> Result<f64, Undefined> {
  if value.is_finite() {
    Ok(value)
  } else {
    Err(Undefined::Overflow)
  }
}

fn nonzero_divisor(value: f64) -> Result<f64, Undefined> {
  if value == 0.0 {
    Err(Undefined::DivisionByZero)
  } else {
    Ok(value)
  }
}

impl Expr {
  /// Evaluate at `point`, substituting `x` and `y`.
  pub fn eval(&self, point: Point) -> Result<f64, Undefined> {
    match self {
      Expr::Number(n) => Ok(n.to_f64()),
      Expr::Constant(c) => Ok(c.value()),
      Expr::Variable(Variable::X) => Ok(point.x),
      Expr::Variable(Variable::Y) => Ok(point.y),
      Expr::Neg(operand) => Ok(-operand.eval(point)?),
      Expr::BinaryOp { op, left, right } => {
        let a = left.eval(point)?;
        let b = right.eval(point)?;
        match op {
          BinaryOperator::Plus => finite(a + b),
          BinaryOperator::Minus => finite(a - b),
          BinaryOperator::Times => finite(a * b),
          BinaryOperator::Divide => finite(a / nonzero_divisor(b)?),
          BinaryOperator::Power => power(a, b),
        }
      }
      Expr::FunctionCall { func, arg } => apply(*func, arg.eval(point)?),
    }
  }
}

fn power(base: f64, exp: f64) -> Result<f64, Undefined> {
  if base == 0.0 && exp < 0.0 {
    return Err(Undefined::DivisionByZero);
  }
  if base < 0.0 && exp.fract() != 0.0 {
    return Err(Undefined::Domain(format!(
      "({base})**{exp} (complex result)"
    )));
  }
  finite(base.powf(exp))
}

fn apply(func: Function, u: f64) -> Result<f64, Undefined> {
  let domain = |what: &str| Undefined::Domain(format!("{what}({u})"));
  let value = match func {
    Function::Sin => u.sin(),
    Function::Cos => u.cos(),
    Function::Tan => u.tan(),
    Function::Sec => 1.0 / nonzero_divisor(u.cos())?,
    Function::Csc => 1.0 / nonzero_divisor(u.sin())?,
    Function::Cot => u.cos() / nonzero_divisor(u.sin())?,
    Function::Asin | Function::Acos if !(-1.0..=1.0).contains(&u) => {
      return Err(domain(func.name()));
    }
    Function::Asin => u.asin(),
    Function::Acos => u.acos(),
    Function::Atan => u.atan(),
    Function::Sinh => u.sinh(),
    Function::Cosh => u.cosh(),
    Function::Tanh => u.tanh(),
    Function::Exp => u.exp(),
    Function::Log if u == 0.0 => return Err(Undefined::DivisionByZero),
    Function::Log if u < 0.0 => return Err(domain("log")),
    Function::Log => u.ln(),
    Function::Sqrt if u < 0.0 => return Err(domain("sqrt")),
    Function::Sqrt => u.sqrt(),
    Function::Abs => u.abs(),
    Function::Sign => {
      if u == 0.0 {
        0.0
      } else {
        u.signum()
      }
    }
  };
  finite(value)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::parse_expression;

  fn eval(input: &str, x: f64, y: f64) -> Result<f64, Undefined> {
    parse_expression(input).unwrap().eval(Point { x, y })
  }

  #[test]
  fn evaluates_polynomials_and_constants() {
    assert_eq!(eval("x**2 - y**2", 1.0, 1.0), Ok(0.0));
    assert_eq!(eval("2*x + 3*y", 2.0, -1.0), Ok(1.0));
    assert!((eval("pi", 0.0, 0.0).unwrap() - std::f64::consts::PI).abs() < 1e-15);
  }

  #[test]
  fn division_by_zero() {
    assert_eq!(eval("1/x", 0.0, 0.0), Err(Undefined::DivisionByZero));
    assert_eq!(eval("x**-1", 0.0, 0.0), Err(Undefined::DivisionByZero));
    assert_eq!(eval("log(x)", 0.0, 1.0), Err(Undefined::DivisionByZero));
  }

  #[test]
  fn complex_results_are_rejected() {
    assert!(matches!(eval("sqrt(x)", -1.0, 0.0), Err(Undefined::Domain(_))));
    assert!(matches!(eval("log(y)", 0.0, -2.0), Err(Undefined::Domain(_))));
    assert!(matches!(eval("x**0.5", -4.0, 0.0), Err(Undefined::Domain(_))));
    assert!(matches!(eval("asin(x)", 2.0, 0.0), Err(Undefined::Domain(_))));
  }

  #[test]
  fn negative_base_with_integer_exponent_is_fine() {
    assert_eq!(eval("x**3", -2.0, 0.0), Ok(-8.0));
  }

  #[test]
  fn overflow_is_rejected() {
    assert_eq!(eval("exp(x*1000)", 5.0, 0.0), Err(Undefined::Overflow));
  }
}
