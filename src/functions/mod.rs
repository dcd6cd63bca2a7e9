// Functions are organized by categories
pub mod calculus;
pub mod plot;
pub mod plot3d;
pub mod tex_form;

pub use calculus::{differentiate, partial_derivative, simplify};
pub use plot3d::{RenderOptions, SurfaceGrid, SurfaceOptions, render_svg};
pub use tex_form::to_tex;
