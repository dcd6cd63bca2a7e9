use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand, ValueEnum};
use gradviz::config::{Config, load_config, show_config_path};
use gradviz::functions::{render_svg, to_tex};
use gradviz::{GradientEvaluator, GradientReport, Point};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Path to a TOML configuration file
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
  Text,
  Json,
  Latex,
}

#[derive(clap::Args)]
struct Input {
  /// The function f(x, y) in Python syntax, e.g. "x**2 - y**2"
  #[arg(allow_hyphen_values = true)]
  expression: Option<String>,
  /// x coordinate of the point
  #[arg(long)]
  x: Option<f64>,
  /// y coordinate of the point
  #[arg(long)]
  y: Option<f64>,
  /// Length of the drawn steepest-ascent arrow
  #[arg(long)]
  display_length: Option<f64>,
}

#[derive(Subcommand)]
enum Commands {
  /// Compute the partial derivatives and gradient of f at a point
  #[command(allow_negative_numbers = true)]
  Eval {
    #[command(flatten)]
    input: Input,
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
  },
  /// Render the surface of f with the direction of steepest ascent as SVG
  #[command(allow_negative_numbers = true)]
  Plot {
    #[command(flatten)]
    input: Input,
    /// Output file (stdout if omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,
  },
  /// Show the active configuration
  Config,
}

fn main() {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into()),
    )
    .init();

  let cli = Cli::parse();
  if let Err(e) = run(cli) {
    eprintln!("Error: {e:#}");
    std::process::exit(1);
  }
}

fn run(cli: Cli) -> Result<()> {
  let config = load_config(cli.config.as_deref())?;

  match cli.command {
    Commands::Eval { input, format } => {
      let report = evaluate(&config, &input)?;
      match format {
        Format::Text => print!("{}", step_by_step(&report)),
        Format::Json => {
          println!("{}", serde_json::to_string_pretty(&report.to_json())?)
        }
        Format::Latex => {
          println!(
            "\\frac{{\\partial f}}{{\\partial x}} = {}",
            to_tex(&report.partial_x)
          );
          println!(
            "\\frac{{\\partial f}}{{\\partial y}} = {}",
            to_tex(&report.partial_y)
          );
          println!(
            "\\nabla f({:?}, {:?}) = \\langle {:.2}, {:.2} \\rangle",
            report.point.x,
            report.point.y,
            report.gradient.dx,
            report.gradient.dy
          );
        }
      }
    }
    Commands::Plot { input, output } => {
      let report = evaluate(&config, &input)?;
      let svg =
        render_svg(&report, &config.render_options()).map_err(with_hint)?;
      match output {
        Some(path) => std::fs::write(&path, svg)
          .with_context(|| format!("writing {}", path.display()))?,
        None => println!("{svg}"),
      }
    }
    Commands::Config => {
      println!("{}", show_config_path(cli.config.as_deref()));
      print_config(&config);
    }
  }
  Ok(())
}

fn with_hint(e: gradviz::EvaluationError) -> anyhow::Error {
  anyhow!("{e}. Please use Python syntax (e.g., x**2 for x^2)")
}

fn evaluate(config: &Config, input: &Input) -> Result<GradientReport> {
  let expression = input
    .expression
    .as_deref()
    .unwrap_or(&config.evaluator.default_expression);
  let default = config.default_point();
  let point = Point::new(input.x.unwrap_or(default.x), input.y.unwrap_or(default.y));

  // The point is bounded by the input surface, not by the evaluator
  let (lo, hi) = (config.surface.domain_min, config.surface.domain_max);
  for (name, v) in [("x", point.x), ("y", point.y)] {
    if !(lo..=hi).contains(&v) {
      bail!("point {name} = {v} is outside [{lo}, {hi}]");
    }
  }

  let mut options = config.evaluator_options();
  if let Some(length) = input.display_length {
    if !(length.is_finite() && length > 0.0) {
      bail!("--display-length must be positive, got {length}");
    }
    options.display_length = length;
  }

  GradientEvaluator::new(options)
    .evaluate(expression, point)
    .map_err(with_hint)
}

fn step_by_step(report: &GradientReport) -> String {
  let (x, y) = (report.point.x, report.point.y);
  let mut out = String::new();
  out.push_str(&format!("f(x, y) = {}\n\n", report.expression));
  out.push_str("1. Partial derivatives:\n");
  out.push_str(&format!("   ∂f/∂x = {}\n", report.partial_x));
  out.push_str(&format!("   ∂f/∂y = {}\n\n", report.partial_y));
  out.push_str("2. Gradient vector at point:\n");
  out.push_str(&format!(
    "   ∇f({x:?}, {y:?}) = ⟨{:.2}, {:.2}⟩\n",
    report.gradient.dx, report.gradient.dy
  ));
  out.push_str(&format!(
    "   This vector points in the direction of steepest ascent at z = {:.2}\n",
    report.value
  ));
  out.push_str(&format!(
    "   |∇f| = {:.4}, arrow = ⟨{:.4}, {:.4}⟩\n",
    report.magnitude, report.display.ux, report.display.uy
  ));
  out
}

fn print_config(config: &Config) {
  println!();
  println!("[evaluator]");
  println!(
    "default_expression = {:?}",
    config.evaluator.default_expression
  );
  println!("display_length = {:?}", config.evaluator.display_length);
  println!();
  println!("[point]");
  println!("x = {:?}", config.point.x);
  println!("y = {:?}", config.point.y);
  println!();
  println!("[surface]");
  println!("domain_min = {:?}", config.surface.domain_min);
  println!("domain_max = {:?}", config.surface.domain_max);
  println!("resolution = {}", config.surface.resolution);
  println!();
  println!("[render]");
  println!("width = {}", config.render.width);
  println!("height = {}", config.render.height);
  println!("cone_size = {:?}", config.render.cone_size);
  println!("mesh = {}", config.render.mesh);
}
