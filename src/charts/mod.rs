//! Charts module - Chart rendering

mod plotter;
mod renderer;

pub use plotter::ChartPlotter;
pub use renderer::{map_bounds, RenderError, StaticChartRenderer, DEFAULT_SIZE};
