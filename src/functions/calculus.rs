//! Symbolic differentiation and simplification of `Expr` trees.

use tracing::trace;

use crate::syntax::BinaryOperator::{self, *};
use crate::syntax::{Constant, Expr, Function, Num, Variable};

/// Check if expression is constant with respect to a variable
pub fn is_constant_wrt(expr: &Expr, var: Variable) -> bool {
  match expr {
    Expr::Number(_) | Expr::Constant(_) => true,
    Expr::Variable(v) => *v != var,
    Expr::Neg(operand) => is_constant_wrt(operand, var),
    Expr::BinaryOp { left, right, .. } => {
      is_constant_wrt(left, var) && is_constant_wrt(right, var)
    }
    Expr::FunctionCall { arg, .. } => is_constant_wrt(arg, var),
  }
}

/// ∂expr/∂var, simplified.
pub fn partial_derivative(expr: &Expr, var: Variable) -> Expr {
  let derivative = simplify(differentiate(expr, var));
  trace!(%expr, var = var.name(), %derivative, "differentiated");
  derivative
}

fn binary(op: BinaryOperator, left: Expr, right: Expr) -> Expr {
  Expr::binary(op, left, right)
}

fn call(func: Function, arg: &Expr) -> Expr {
  Expr::call(func, arg.clone())
}

fn square(expr: Expr) -> Expr {
  binary(Power, expr, Expr::int(2))
}

/// Differentiate an expression with respect to a variable. The result is
/// correct but unsimplified; see [`partial_derivative`].
pub fn differentiate(expr: &Expr, var: Variable) -> Expr {
  match expr {
    Expr::Number(_) | Expr::Constant(_) => Expr::int(0),
    Expr::Variable(v) => {
      if *v == var {
        Expr::int(1)
      } else {
        Expr::int(0)
      }
    }
    Expr::Neg(operand) => Expr::neg(differentiate(operand, var)),
    Expr::BinaryOp { op, left, right } => {
      let (a, b) = (left.as_ref(), right.as_ref());
      match op {
        Plus | Minus => {
          binary(*op, differentiate(a, var), differentiate(b, var))
        }
        Times => {
          // Product rule: (a*b)' = a'*b + a*b'
          binary(
            Plus,
            binary(Times, differentiate(a, var), b.clone()),
            binary(Times, a.clone(), differentiate(b, var)),
          )
        }
        Divide => {
          // Quotient rule: (a/b)' = (a'*b - a*b') / b^2
          binary(
            Divide,
            binary(
              Minus,
              binary(Times, differentiate(a, var), b.clone()),
              binary(Times, a.clone(), differentiate(b, var)),
            ),
            square(b.clone()),
          )
        }
        Power => differentiate_power(expr, a, b, var),
      }
    }
    Expr::FunctionCall { func, arg } => {
      let du = differentiate(arg, var);
      binary(Times, function_derivative(*func, arg), du)
    }
  }
}

fn differentiate_power(
  expr: &Expr,
  base: &Expr,
  exp: &Expr,
  var: Variable,
) -> Expr {
  if is_constant_wrt(exp, var) {
    // d/dx[f^n] = n * f^(n-1) * f'
    binary(
      Times,
      binary(
        Times,
        exp.clone(),
        binary(Power, base.clone(), binary(Minus, exp.clone(), Expr::int(1))),
      ),
      differentiate(base, var),
    )
  } else if matches!(base, Expr::Constant(Constant::E)) {
    // d/dx[E^g] = E^g * g'
    binary(Times, expr.clone(), differentiate(exp, var))
  } else if is_constant_wrt(base, var) {
    // d/dx[a^g] = a^g * log(a) * g'
    binary(
      Times,
      binary(Times, expr.clone(), call(Function::Log, base)),
      differentiate(exp, var),
    )
  } else {
    // d/dx[f^g] = f^g * (g' * log(f) + g * f'/f)
    binary(
      Times,
      expr.clone(),
      binary(
        Plus,
        binary(Times, differentiate(exp, var), call(Function::Log, base)),
        binary(
          Times,
          exp.clone(),
          binary(Divide, differentiate(base, var), base.clone()),
        ),
      ),
    )
  }
}

/// Outer derivative f'(u) for a call f(u); the caller applies the chain rule.
fn function_derivative(func: Function, u: &Expr) -> Expr {
  let one_minus_u_squared =
    || binary(Minus, Expr::int(1), square(u.clone()));
  match func {
    Function::Sin => call(Function::Cos, u),
    Function::Cos => Expr::neg(call(Function::Sin, u)),
    Function::Tan => binary(Plus, square(call(Function::Tan, u)), Expr::int(1)),
    Function::Sec => {
      binary(Times, call(Function::Sec, u), call(Function::Tan, u))
    }
    Function::Csc => Expr::neg(binary(
      Times,
      call(Function::Csc, u),
      call(Function::Cot, u),
    )),
    Function::Cot => Expr::neg(square(call(Function::Csc, u))),
    Function::Asin => binary(
      Divide,
      Expr::int(1),
      Expr::call(Function::Sqrt, one_minus_u_squared()),
    ),
    Function::Acos => Expr::neg(binary(
      Divide,
      Expr::int(1),
      Expr::call(Function::Sqrt, one_minus_u_squared()),
    )),
    Function::Atan => binary(
      Divide,
      Expr::int(1),
      binary(Plus, square(u.clone()), Expr::int(1)),
    ),
    Function::Sinh => call(Function::Cosh, u),
    Function::Cosh => call(Function::Sinh, u),
    Function::Tanh => {
      binary(Minus, Expr::int(1), square(call(Function::Tanh, u)))
    }
    Function::Exp => call(Function::Exp, u),
    Function::Log => binary(Divide, Expr::int(1), u.clone()),
    Function::Sqrt => binary(
      Divide,
      Expr::int(1),
      binary(Times, Expr::int(2), call(Function::Sqrt, u)),
    ),
    Function::Abs => call(Function::Sign, u),
    // Piecewise constant; the jump at 0 is ignored
    Function::Sign => Expr::int(0),
  }
}

/// Split an expression into its numeric coefficient and the remaining
/// factor, e.g. `-3*x` into `(-3, Some(x))` and `4` into `(4, None)`.
fn split_coefficient(expr: &Expr) -> (Num, Option<Expr>) {
  match expr {
    Expr::Number(n) => (*n, None),
    Expr::Neg(operand) => {
      let (c, rest) = split_coefficient(operand);
      (-c, rest)
    }
    Expr::BinaryOp {
      op: Times,
      left,
      right,
    } => {
      let (ca, ra) = split_coefficient(left);
      let (cb, rb) = split_coefficient(right);
      (ca * cb, multiply_rests(ra, rb))
    }
    _ => (Num::Int(1), Some(expr.clone())),
  }
}

fn multiply_rests(a: Option<Expr>, b: Option<Expr>) -> Option<Expr> {
  match (a, b) {
    (None, rest) | (rest, None) => rest,
    (Some(a), Some(b)) => Some(multiply_factors(a, b)),
  }
}

/// Multiply two coefficient-free factors, merging equal bases.
fn multiply_factors(a: Expr, b: Expr) -> Expr {
  if a == b {
    return square(a);
  }
  if let Some(merged) = merge_powers(&a, &b).or_else(|| merge_powers(&b, &a))
  {
    return merged;
  }
  binary(Times, a, b)
}

/// `f**n * f` becomes `f**(n + 1)` for a numeric `n`.
fn merge_powers(power: &Expr, other: &Expr) -> Option<Expr> {
  if let Expr::BinaryOp {
    op: Power,
    left,
    right,
  } = power
  {
    if left.as_ref() == other {
      if let Some(n) = right.as_number() {
        return Some(simplify_power(
          left.as_ref().clone(),
          Expr::Number(n + Num::Int(1)),
        ));
      }
    }
  }
  None
}

/// Rebuild `coefficient * rest` in canonical form.
fn with_coefficient(coefficient: Num, rest: Option<Expr>) -> Expr {
  match rest {
    None => Expr::Number(coefficient),
    Some(_) if coefficient.is_zero() => Expr::int(0),
    Some(rest) if coefficient.is_one() => rest,
    Some(rest) if (-coefficient).is_one() => Expr::neg(rest),
    Some(rest) => binary(Times, Expr::Number(coefficient), rest),
  }
}

fn negate(expr: Expr) -> Expr {
  let (c, rest) = split_coefficient(&expr);
  with_coefficient(-c, rest)
}

/// Simplify an expression
pub fn simplify(expr: Expr) -> Expr {
  match expr {
    Expr::Number(_) | Expr::Constant(_) | Expr::Variable(_) => expr,
    Expr::Neg(operand) => negate(simplify(*operand)),
    Expr::BinaryOp { op, left, right } => {
      let left = simplify(*left);
      let right = simplify(*right);
      match op {
        Plus => simplify_plus(left, right),
        Minus => simplify_minus(left, right),
        Times => simplify_times(left, right),
        Divide => simplify_divide(left, right),
        Power => simplify_power(left, right),
      }
    }
    Expr::FunctionCall { func, arg } => simplify_call(func, simplify(*arg)),
  }
}

fn simplify_plus(left: Expr, right: Expr) -> Expr {
  // 0 + x = x, x + 0 = x
  if left.is_number(0.0) {
    return right;
  }
  if right.is_number(0.0) {
    return left;
  }
  if let (Some(a), Some(b)) = (left.as_number(), right.as_number()) {
    return Expr::Number(a + b);
  }

  let (ca, ra) = split_coefficient(&left);
  let (cb, rb) = split_coefficient(&right);
  // 2*x + 3*x = 5*x
  if ra.is_some() && ra == rb {
    return with_coefficient(ca + cb, ra);
  }
  // Constants go last: 1 + x = x + 1
  if left.as_number().is_some() {
    return simplify_plus(right, left);
  }
  // x + (-2*y) = x - 2*y
  if cb.is_negative() {
    return binary(Minus, left, with_coefficient(-cb, rb));
  }
  binary(Plus, left, right)
}

fn simplify_minus(left: Expr, right: Expr) -> Expr {
  if right.is_number(0.0) {
    return left;
  }
  // 0 - x = -x
  if left.is_number(0.0) {
    return negate(right);
  }
  if let (Some(a), Some(b)) = (left.as_number(), right.as_number()) {
    return Expr::Number(a - b);
  }

  let (ca, ra) = split_coefficient(&left);
  let (cb, rb) = split_coefficient(&right);
  if ra.is_some() && ra == rb {
    return with_coefficient(ca - cb, ra);
  }
  // x - (-y) = x + y
  if cb.is_negative() {
    return simplify_plus(left, with_coefficient(-cb, rb));
  }
  binary(Minus, left, right)
}

fn simplify_times(left: Expr, right: Expr) -> Expr {
  let (ca, ra) = split_coefficient(&left);
  let (cb, rb) = split_coefficient(&right);
  let coefficient = ca * cb;
  match (ra, rb) {
    // a * (n/d) = (a*n)/d
    (
      Some(Expr::BinaryOp {
        op: Divide,
        left: n,
        right: d,
      }),
      other,
    )
    | (
      other,
      Some(Expr::BinaryOp {
        op: Divide,
        left: n,
        right: d,
      }),
    ) => {
      let numerator = simplify_times(with_coefficient(coefficient, other), *n);
      simplify_divide(numerator, *d)
    }
    (ra, rb) => with_coefficient(coefficient, multiply_rests(ra, rb)),
  }
}

fn gcd(a: i64, b: i64) -> i64 {
  let (mut a, mut b) = (a.unsigned_abs(), b.unsigned_abs());
  while b != 0 {
    (a, b) = (b, a % b);
  }
  a as i64
}

/// `a/b` in lowest terms as (sign, |numerator|, positive denominator).
/// `None` when a step would overflow `i64`.
fn reduce_fraction(a: i64, b: i64) -> Option<(bool, i64, i64)> {
  let g = gcd(a, b).max(1);
  let (a, b) = (a.checked_div(g)?, b.checked_div(g)?);
  let (a, b) = if b < 0 {
    (a.checked_neg()?, b.checked_neg()?)
  } else {
    (a, b)
  };
  Some((a < 0, a.checked_abs()?, b))
}

fn simplify_divide(left: Expr, right: Expr) -> Expr {
  // x / 1 = x
  if right.is_number(1.0) {
    return left;
  }
  // A literal zero divisor is kept so that evaluation reports it
  if right.is_number(0.0) {
    return binary(Divide, left, right);
  }
  if left.is_number(0.0) {
    return Expr::int(0);
  }

  let (ca, ra) = split_coefficient(&left);
  let (cb, rb) = split_coefficient(&right);
  if ra.is_some() && ra == rb {
    return simplify_divide(Expr::Number(ca), Expr::Number(cb));
  }

  if let Some(q) = ca.checked_div(cb) {
    return match rb {
      None => with_coefficient(q, ra),
      Some(den) => {
        let num = ra.unwrap_or_else(|| Expr::int(1));
        with_coefficient(q, Some(binary(Divide, num, den)))
      }
    };
  }

  // Inexact integer ratio: reduce and keep the sign on the numerator
  if let (Num::Int(a), Num::Int(b)) = (ca, cb) {
    if let Some((negative, a, b)) = reduce_fraction(a, b) {
      let num = with_coefficient(Num::Int(a), ra);
      let den = with_coefficient(Num::Int(b), rb);
      let quotient = binary(Divide, num, den);
      return if negative { Expr::neg(quotient) } else { quotient };
    }
  }

  binary(Divide, left, right)
}

fn simplify_power(base: Expr, exp: Expr) -> Expr {
  // x^0 = 1
  if exp.is_number(0.0) {
    return Expr::int(1);
  }
  // x^1 = x
  if exp.is_number(1.0) {
    return base;
  }
  // 1^n = 1
  if base.is_number(1.0) {
    return Expr::int(1);
  }
  if let (Some(b), Some(e)) = (base.as_number(), exp.as_number()) {
    // 0^n = 0 (for n > 0)
    if b.is_zero() && !e.is_negative() {
      return Expr::int(0);
    }
    if let Some(n) = b.checked_pow(e) {
      return Expr::Number(n);
    }
  }
  // (f^n)^m = f^(n*m) for integer m
  if let Expr::BinaryOp {
    op: Power,
    left: inner_base,
    right: inner_exp,
  } = &base
  {
    if let (Some(n), Some(m @ Num::Int(_))) =
      (inner_exp.as_number(), exp.as_number())
    {
      return simplify_power(inner_base.as_ref().clone(), Expr::Number(n * m));
    }
  }
  binary(Power, base, exp)
}

fn simplify_call(func: Function, arg: Expr) -> Expr {
  let folded = match (func, arg.as_number()) {
    (
      Function::Sin
      | Function::Tan
      | Function::Asin
      | Function::Atan
      | Function::Sinh
      | Function::Tanh
      | Function::Sqrt
      | Function::Abs
      | Function::Sign,
      Some(n),
    ) if n.is_zero() => Some(Expr::int(0)),
    (Function::Cos | Function::Cosh | Function::Exp, Some(n)) if n.is_zero() => {
      Some(Expr::int(1))
    }
    (Function::Log, Some(n)) if n.is_one() => Some(Expr::int(0)),
    (Function::Abs, Some(Num::Int(n))) => Some(Expr::int(n.abs())),
    (Function::Log, None) if arg == Expr::Constant(Constant::E) => {
      Some(Expr::int(1))
    }
    _ => None,
  };
  folded.unwrap_or_else(|| Expr::call(func, arg))
}
