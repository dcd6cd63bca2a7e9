//! Expression AST for functions of `x` and `y`, plus conversion from the
//! pest parse tree.

use std::fmt;

use pest::iterators::Pair;

use crate::{EvaluationError, GradientParser, Rule};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Num {
  Int(i64),
  Float(f64),
}

impl std::ops::Add for Num {
  type Output = Self;

  fn add(self, rhs: Self) -> Self {
    match (self, rhs) {
      (Self::Int(a), Self::Int(b)) => match a.checked_add(b) {
        Some(n) => Self::Int(n),
        None => Self::Float(a as f64 + b as f64),
      },
      (a, b) => Self::Float(a.to_f64() + b.to_f64()),
    }
  }
}

impl std::ops::Mul for Num {
  type Output = Self;

  fn mul(self, rhs: Self) -> Self {
    match (self, rhs) {
      (Self::Int(a), Self::Int(b)) => match a.checked_mul(b) {
        Some(n) => Self::Int(n),
        None => Self::Float(a as f64 * b as f64),
      },
      (a, b) => Self::Float(a.to_f64() * b.to_f64()),
    }
  }
}

impl std::ops::Sub for Num {
  type Output = Self;

  fn sub(self, rhs: Self) -> Self {
    self + (-rhs)
  }
}

impl std::ops::Neg for Num {
  type Output = Self;

  fn neg(self) -> Self {
    match self {
      Self::Int(i) => match i.checked_neg() {
        Some(n) => Self::Int(n),
        None => Self::Float(-(i as f64)),
      },
      Self::Float(f) => Self::Float(-f),
    }
  }
}

impl Num {
  pub fn to_f64(self) -> f64 {
    match self {
      Num::Int(i) => i as f64,
      Num::Float(f) => f,
    }
  }

  pub fn is_zero(self) -> bool {
    self.to_f64() == 0.0
  }

  pub fn is_one(self) -> bool {
    self.to_f64() == 1.0
  }

  pub fn is_negative(self) -> bool {
    self.to_f64() < 0.0
  }

  /// Exact quotient: integers only divide when the result is an integer.
  /// `None` for a zero divisor or an inexact integer quotient.
  pub fn checked_div(self, rhs: Self) -> Option<Self> {
    if rhs.is_zero() {
      return None;
    }
    match (self, rhs) {
      (Num::Int(a), Num::Int(b)) => match a.checked_rem(b) {
        Some(0) => a.checked_div(b).map(Num::Int),
        Some(_) => None,
        // i64::MIN / -1
        None => Some(Num::Float(a as f64 / b as f64)),
      },
      (a, b) => Some(Num::Float(a.to_f64() / b.to_f64())),
    }
  }

  /// Power folding that keeps integers exact. Negative integer exponents
  /// and non-real results are left to the caller.
  pub fn checked_pow(self, exp: Self) -> Option<Self> {
    match (self, exp) {
      (Num::Int(b), Num::Int(e)) => {
        let e = u32::try_from(e).ok()?;
        b.checked_pow(e).map(Num::Int)
      }
      (b, e) => {
        let r = b.to_f64().powf(e.to_f64());
        if r.is_finite() { Some(Num::Float(r)) } else { None }
      }
    }
  }
}

impl fmt::Display for Num {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Num::Int(i) => write!(f, "{i}"),
      Num::Float(x) => write!(f, "{x:?}"),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variable {
  X,
  Y,
}

impl Variable {
  pub fn name(self) -> &'static str {
    match self {
      Variable::X => "x",
      Variable::Y => "y",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constant {
  Pi,
  E,
}

impl Constant {
  pub fn value(self) -> f64 {
    match self {
      Constant::Pi => std::f64::consts::PI,
      Constant::E => std::f64::consts::E,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
  Sin,
  Cos,
  Tan,
  Sec,
  Csc,
  Cot,
  Asin,
  Acos,
  Atan,
  Sinh,
  Cosh,
  Tanh,
  Exp,
  Log,
  Sqrt,
  Abs,
  Sign,
}

impl Function {
  /// Look up a function by the name a user would type.
  pub fn from_name(name: &str) -> Option<Self> {
    let func = match name {
      "sin" => Function::Sin,
      "cos" => Function::Cos,
      "tan" => Function::Tan,
      "sec" => Function::Sec,
      "csc" => Function::Csc,
      "cot" => Function::Cot,
      "asin" => Function::Asin,
      "acos" => Function::Acos,
      "atan" => Function::Atan,
      "sinh" => Function::Sinh,
      "cosh" => Function::Cosh,
      "tanh" => Function::Tanh,
      "exp" => Function::Exp,
      "log" | "ln" => Function::Log,
      "sqrt" => Function::Sqrt,
      "Abs" | "abs" => Function::Abs,
      "sign" => Function::Sign,
      _ => return None,
    };
    Some(func)
  }

  pub fn name(self) -> &'static str {
    match self {
      Function::Sin => "sin",
      Function::Cos => "cos",
      Function::Tan => "tan",
      Function::Sec => "sec",
      Function::Csc => "csc",
      Function::Cot => "cot",
      Function::Asin => "asin",
      Function::Acos => "acos",
      Function::Atan => "atan",
      Function::Sinh => "sinh",
      Function::Cosh => "cosh",
      Function::Tanh => "tanh",
      Function::Exp => "exp",
      Function::Log => "log",
      Function::Sqrt => "sqrt",
      Function::Abs => "Abs",
      Function::Sign => "sign",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
  Plus,
  Minus,
  Times,
  Divide,
  Power,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
  Number(Num),
  Constant(Constant),
  Variable(Variable),
  Neg(Box<Expr>),
  BinaryOp {
    op: BinaryOperator,
    left: Box<Expr>,
    right: Box<Expr>,
  },
  FunctionCall {
    func: Function,
    arg: Box<Expr>,
  },
}

impl Expr {
  pub fn int(n: i64) -> Self {
    Expr::Number(Num::Int(n))
  }

  pub fn binary(op: BinaryOperator, left: Expr, right: Expr) -> Self {
    Expr::BinaryOp {
      op,
      left: Box::new(left),
      right: Box::new(right),
    }
  }

  pub fn call(func: Function, arg: Expr) -> Self {
    Expr::FunctionCall {
      func,
      arg: Box::new(arg),
    }
  }

  pub fn neg(operand: Expr) -> Self {
    Expr::Neg(Box::new(operand))
  }

  pub fn as_number(&self) -> Option<Num> {
    match self {
      Expr::Number(n) => Some(*n),
      _ => None,
    }
  }

  pub fn is_number(&self, value: f64) -> bool {
    matches!(self, Expr::Number(n) if n.to_f64() == value)
  }

  /// Binding strength when printed: 1 for sums, 2 for products,
  /// 3 for a leading minus, 4 for powers, 5 for atoms.
  fn precedence(&self) -> u8 {
    match self {
      Expr::Number(n) if n.is_negative() => 3,
      Expr::Number(_) | Expr::Constant(_) | Expr::Variable(_) => 5,
      Expr::FunctionCall { .. } => 5,
      Expr::Neg(operand) => {
        // `-x*y` prints without parentheses and binds like the product
        let inner = operand.precedence();
        if inner < 2 { 3 } else { inner.min(3) }
      }
      Expr::BinaryOp { op, .. } => match op {
        BinaryOperator::Plus | BinaryOperator::Minus => 1,
        BinaryOperator::Times | BinaryOperator::Divide => 2,
        BinaryOperator::Power => 4,
      },
    }
  }
}

fn write_operand(
  f: &mut fmt::Formatter<'_>,
  expr: &Expr,
  min_precedence: u8,
) -> fmt::Result {
  if expr.precedence() < min_precedence {
    write!(f, "({expr})")
  } else {
    write!(f, "{expr}")
  }
}

/// Python-style text form, e.g. `-2*y` or `x**(-1)`. Re-parses to an
/// equivalent expression.
impl fmt::Display for Expr {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Expr::Number(n) => write!(f, "{n}"),
      Expr::Constant(Constant::Pi) => write!(f, "pi"),
      Expr::Constant(Constant::E) => write!(f, "E"),
      Expr::Variable(v) => write!(f, "{}", v.name()),
      Expr::Neg(operand) => {
        write!(f, "-")?;
        // A second sign always gets parentheses: `-(-x)`, `-(-2)`
        let nested_sign = matches!(operand.as_ref(), Expr::Neg(_))
          || operand.as_number().is_some_and(Num::is_negative);
        let min = if nested_sign { 4 } else { 2 };
        write_operand(f, operand, min)
      }
      Expr::FunctionCall { func, arg } => write!(f, "{}({arg})", func.name()),
      Expr::BinaryOp { op, left, right } => match op {
        BinaryOperator::Plus => {
          write_operand(f, left, 1)?;
          write!(f, " + ")?;
          write_operand(f, right, 1)
        }
        BinaryOperator::Minus => {
          write_operand(f, left, 1)?;
          write!(f, " - ")?;
          write_operand(f, right, 2)
        }
        BinaryOperator::Times => {
          write_operand(f, left, 2)?;
          write!(f, "*")?;
          write_operand(f, right, 2)
        }
        BinaryOperator::Divide => {
          write_operand(f, left, 2)?;
          write!(f, "/")?;
          write_operand(f, right, 3)
        }
        BinaryOperator::Power => {
          write_operand(f, left, 5)?;
          write!(f, "**")?;
          write_operand(f, right, 4)
        }
      },
    }
  }
}

/// Parse user text into an expression over `x` and `y`.
pub fn parse_expression(input: &str) -> Result<Expr, EvaluationError> {
  if input.trim().is_empty() {
    return Err(EvaluationError::EmptyInput);
  }

  let mut pairs = GradientParser::parse_program(input).map_err(|source| {
    EvaluationError::ParseError {
      input: input.to_string(),
      source,
    }
  })?;

  // Program = SOI ~ Expression ~ EOI; SOI is implicit
  let expression = pairs
    .next()
    .and_then(|program| program.into_inner().next())
    .ok_or(EvaluationError::EmptyInput)?;

  build_expr(expression, input)
}

fn build_expr(pair: Pair<Rule>, input: &str) -> Result<Expr, EvaluationError> {
  match pair.as_rule() {
    Rule::Expression => {
      let mut inner = pair.into_inner();
      let mut result = match inner.next() {
        Some(first) => build_expr(first, input)?,
        None => return Err(EvaluationError::EmptyInput),
      };
      while let (Some(op), Some(term)) = (inner.next(), inner.next()) {
        let op = if op.as_str() == "+" {
          BinaryOperator::Plus
        } else {
          BinaryOperator::Minus
        };
        result = Expr::binary(op, result, build_expr(term, input)?);
      }
      Ok(result)
    }
    Rule::Term => {
      let mut inner = pair.into_inner();
      let mut result = match inner.next() {
        Some(first) => build_expr(first, input)?,
        None => return Err(EvaluationError::EmptyInput),
      };
      while let (Some(op), Some(factor)) = (inner.next(), inner.next()) {
        let op = if op.as_str() == "*" {
          BinaryOperator::Times
        } else {
          BinaryOperator::Divide
        };
        result = Expr::binary(op, result, build_expr(factor, input)?);
      }
      Ok(result)
    }
    Rule::Factor => {
      let mut negative = false;
      let mut operand = None;
      for inner in pair.into_inner() {
        match inner.as_rule() {
          Rule::Sign => {
            if inner.as_str() == "-" {
              negative = !negative;
            }
          }
          _ => operand = Some(build_expr(inner, input)?),
        }
      }
      let operand = operand.ok_or(EvaluationError::EmptyInput)?;
      if !negative {
        return Ok(operand);
      }
      // Fold `-2` into a literal; `-2**2` stays a negated power
      Ok(match operand {
        Expr::Number(n) => Expr::Number(-n),
        other => Expr::neg(other),
      })
    }
    Rule::Power => {
      let mut inner = pair.into_inner();
      let base = match inner.next() {
        Some(base) => build_expr(base, input)?,
        None => return Err(EvaluationError::EmptyInput),
      };
      // PowOp is followed by the exponent Factor
      match (inner.next(), inner.next()) {
        (Some(_), Some(exponent)) => Ok(Expr::binary(
          BinaryOperator::Power,
          base,
          build_expr(exponent, input)?,
        )),
        _ => Ok(base),
      }
    }
    Rule::Integer => {
      let text = pair.as_str();
      match text.parse::<i64>() {
        Ok(n) => Ok(Expr::int(n)),
        Err(_) => parse_real(text, input),
      }
    }
    Rule::Real => parse_real(pair.as_str(), input),
    Rule::Identifier => identifier_to_expr(pair.as_str(), input),
    Rule::Call => {
      let mut inner = pair.into_inner();
      let name = inner.next().map(|p| p.as_str()).unwrap_or_default();
      let func = Function::from_name(name).ok_or_else(|| {
        EvaluationError::UnknownFunction {
          input: input.to_string(),
          name: name.to_string(),
        }
      })?;
      let args = inner
        .map(|arg| build_expr(arg, input))
        .collect::<Result<Vec<_>, _>>()?;

      match (func, args.len()) {
        (_, 1) => {
          let arg = args.into_iter().next().ok_or(EvaluationError::EmptyInput)?;
          Ok(Expr::call(func, arg))
        }
        // log(a, b) is the base-b logarithm
        (Function::Log, 2) => {
          let mut args = args.into_iter();
          match (args.next(), args.next()) {
            (Some(value), Some(base)) => Ok(Expr::binary(
              BinaryOperator::Divide,
              Expr::call(Function::Log, value),
              Expr::call(Function::Log, base),
            )),
            _ => Err(EvaluationError::EmptyInput),
          }
        }
        (_, found) => Err(EvaluationError::WrongArity {
          input: input.to_string(),
          name: name.to_string(),
          expected: if func == Function::Log { "1 or 2" } else { "1" },
          found,
        }),
      }
    }
    _ => Err(EvaluationError::ParseError {
      input: input.to_string(),
      source: Box::new(pest::error::Error::new_from_span(
        pest::error::ErrorVariant::CustomError {
          message: format!("unexpected {:?}", pair.as_rule()),
        },
        pair.as_span(),
      )),
    }),
  }
}

fn parse_real(text: &str, input: &str) -> Result<Expr, EvaluationError> {
  text.parse::<f64>().map(|f| Expr::Number(Num::Float(f))).map_err(|_| {
    EvaluationError::DisallowedSymbol {
      input: input.to_string(),
      symbol: text.to_string(),
    }
  })
}

fn identifier_to_expr(name: &str, input: &str) -> Result<Expr, EvaluationError> {
  match name {
    "x" => Ok(Expr::Variable(Variable::X)),
    "y" => Ok(Expr::Variable(Variable::Y)),
    "pi" => Ok(Expr::Constant(Constant::Pi)),
    "E" => Ok(Expr::Constant(Constant::E)),
    _ => Err(EvaluationError::DisallowedSymbol {
      input: input.to_string(),
      symbol: name.to_string(),
    }),
  }
}
