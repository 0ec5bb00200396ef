//! Charts module - Chart rendering

mod plotter;
mod renderer;

pub use plotter::{ChartPlotter, CITY_PALETTE, STATE_PALETTE};
pub use renderer::StaticChartRenderer;
