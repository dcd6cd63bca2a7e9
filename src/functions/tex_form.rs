//! LaTeX rendering of expressions, used for the step-by-step derivative
//! display.

use crate::syntax::{BinaryOperator, Constant, Expr, Function};

/// Render an expression as LaTeX, e.g. `- \sin{\left(x \right)} \sin{\left(y \right)}`.
pub fn to_tex(expr: &Expr) -> String {
  match expr {
    Expr::Number(n) => n.to_string(),
    Expr::Constant(Constant::Pi) => "\\pi".to_string(),
    Expr::Constant(Constant::E) => "e".to_string(),
    Expr::Variable(v) => v.name().to_string(),
    Expr::Neg(operand) => format!("- {}", factor_tex(operand)),
    Expr::FunctionCall { func, arg } => function_tex(*func, arg, None),
    Expr::BinaryOp { op, left, right } => match op {
      BinaryOperator::Plus => format!("{} + {}", to_tex(left), to_tex(right)),
      BinaryOperator::Minus => {
        format!("{} - {}", to_tex(left), factor_tex(right))
      }
      BinaryOperator::Times => {
        let r = factor_tex(right);
        // A leading negative coefficient is written `- 2 y`
        let l = match left.as_number() {
          Some(n) if n.is_negative() => format!("- {}", -n),
          _ => factor_tex(left),
        };
        // Two adjacent numbers need an explicit dot
        if r.starts_with(|c: char| c.is_ascii_digit() || c == '-') {
          format!("{l} \\cdot {r}")
        } else {
          format!("{l} {r}")
        }
      }
      BinaryOperator::Divide => {
        format!("\\frac{{{}}}{{{}}}", to_tex(left), to_tex(right))
      }
      BinaryOperator::Power => power_tex(left, right),
    },
  }
}

/// Operands of products and differences: sums get parentheses.
fn factor_tex(expr: &Expr) -> String {
  match expr {
    Expr::BinaryOp {
      op: BinaryOperator::Plus | BinaryOperator::Minus,
      ..
    } => format!("\\left({}\\right)", to_tex(expr)),
    _ => to_tex(expr),
  }
}

fn power_tex(base: &Expr, exp: &Expr) -> String {
  let exp_tex = to_tex(exp);
  match base {
    // sin(x)**2 is written \sin^{2}{\left(x \right)}
    Expr::FunctionCall { func, arg } if is_trig_like(*func) => {
      function_tex(*func, arg, Some(&exp_tex))
    }
    Expr::Number(_) | Expr::Constant(_) | Expr::Variable(_) => {
      format!("{}^{{{exp_tex}}}", to_tex(base))
    }
    _ => format!("\\left({}\\right)^{{{exp_tex}}}", to_tex(base)),
  }
}

fn is_trig_like(func: Function) -> bool {
  matches!(
    func,
    Function::Sin
      | Function::Cos
      | Function::Tan
      | Function::Sec
      | Function::Csc
      | Function::Cot
      | Function::Sinh
      | Function::Cosh
      | Function::Tanh
      | Function::Log
  )
}

fn function_tex(func: Function, arg: &Expr, power: Option<&str>) -> String {
  let arg_tex = to_tex(arg);
  match func {
    Function::Exp => format!("e^{{{arg_tex}}}"),
    Function::Sqrt => format!("\\sqrt{{{arg_tex}}}"),
    Function::Abs => format!("\\left|{{{arg_tex}}}\\right|"),
    _ => {
      let name = match func {
        Function::Asin => "\\operatorname{asin}".to_string(),
        Function::Acos => "\\operatorname{acos}".to_string(),
        Function::Atan => "\\operatorname{atan}".to_string(),
        Function::Sign => "\\operatorname{sign}".to_string(),
        other => format!("\\{}", other.name()),
      };
      let sup = power.map(|p| format!("^{{{p}}}")).unwrap_or_default();
      format!("{name}{sup}{{\\left({arg_tex} \\right)}}")
    }
  }
}
