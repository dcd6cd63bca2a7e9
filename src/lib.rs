use pest::Parser;
use pest_derive::Parser;
use thiserror::Error;

pub mod config;
pub mod evaluator;
pub mod functions;
pub mod gradient;
pub mod syntax;

pub use gradient::{
  DisplayVector, EvaluatorOptions, GradientEvaluator, GradientReport,
  GradientVector, Point,
};
pub use syntax::{Expr, Variable, parse_expression};

#[derive(Parser)]
#[grammar = "gradient.pest"]
pub struct GradientParser;

/// Everything that can go wrong between the user's text and a finished
/// gradient report. Each variant carries the text that caused it.
#[derive(Error, Debug)]
pub enum EvaluationError {
  #[error("could not parse `{input}`\n{source}")]
  ParseError {
    input: String,
    source: Box<pest::error::Error<Rule>>,
  },
  #[error("Empty input")]
  EmptyInput,
  #[error(
    "`{symbol}` in `{input}` is not a permitted variable (only x and y are)"
  )]
  DisallowedSymbol { input: String, symbol: String },
  #[error("unknown function `{name}` in `{input}`")]
  UnknownFunction { input: String, name: String },
  #[error("`{name}` expects {expected} argument(s), got {found} in `{input}`")]
  WrongArity {
    input: String,
    name: String,
    expected: &'static str,
    found: usize,
  },
  #[error("{quantity} = {expression} is undefined at ({x}, {y}): {reason}")]
  Undefined {
    quantity: String,
    expression: String,
    x: f64,
    y: f64,
    reason: String,
  },
  #[error("{0}")]
  NoSurface(String),
}

impl GradientParser {
  pub fn parse_program(
    input: &str,
  ) -> Result<pest::iterators::Pairs<'_, Rule>, Box<pest::error::Error<Rule>>>
  {
    Self::parse(Rule::Program, input).map_err(Box::new)
  }
}

pub fn parse(
  input: &str,
) -> Result<pest::iterators::Pairs<'_, Rule>, Box<pest::error::Error<Rule>>> {
  GradientParser::parse_program(input)
}

/// Run the whole pipeline with the default options.
pub fn evaluate(
  input: &str,
  point: Point,
) -> Result<GradientReport, EvaluationError> {
  GradientEvaluator::default().evaluate(input, point)
}
