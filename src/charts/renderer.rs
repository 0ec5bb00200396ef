//! Static Chart Renderer
//! Writes the state and city/county bar charts side by side into one PNG.
//!
//! Layout:
//! 1. Left: state casualties by year (red/green)
//! 2. Right: city/county casualties by year (orange/blue)
//! Each bar carries its integer value on top.

use crate::charts::plotter::{BarPalette, ChartPlotter, BAR_WIDTH, CITY_PALETTE, STATE_PALETTE};
use crate::data::{Casualty, YearTotals, YEAR_MAX, YEAR_MIN};
use crate::stats::DashboardData;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to draw chart: {0}")]
    Draw(String),
}

fn draw_err<E: std::error::Error + Send + Sync>(e: DrawingAreaErrorKind<E>) -> RenderError {
    RenderError::Draw(e.to_string())
}

fn rgb(color: egui::Color32) -> RGBColor {
    RGBColor(color.r(), color.g(), color.b())
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render both bar charts for the current selection into a PNG file.
    pub fn render_bar_figure(
        path: &Path,
        data: &DashboardData,
        width: u32,
        height: u32,
    ) -> Result<(), RenderError> {
        let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;

        let (left, right) = root.split_horizontally(width / 2);

        Self::draw_panel(
            &left,
            &ChartPlotter::state_title(&data.selection.state),
            &data.state_totals,
            STATE_PALETTE,
        )?;
        Self::draw_panel(
            &right,
            &ChartPlotter::city_title(&data.selection.city_or_county),
            &data.city_totals,
            CITY_PALETTE,
        )?;

        root.present().map_err(draw_err)?;
        tracing::info!(path = %path.display(), width, height, "bar figure exported");
        Ok(())
    }

    fn draw_panel(
        area: &DrawingArea<BitMapBackend<'_>, Shift>,
        title: &str,
        totals: &[YearTotals],
        palette: BarPalette,
    ) -> Result<(), RenderError> {
        let (x_min, x_max) = year_axis_range(totals);
        let y_max = value_axis_max(totals);
        let killed_color = rgb(palette.killed);
        let injured_color = rgb(palette.injured);

        let mut chart = ChartBuilder::on(area)
            .caption(title, ("sans-serif", 22))
            .margin(15)
            .x_label_area_size(45)
            .y_label_area_size(65)
            .build_cartesian_2d(x_min..x_max, 0f64..y_max)
            .map_err(draw_err)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(((x_max - x_min).round() as usize).max(1) * 2)
            .x_label_formatter(&|v| year_label(*v))
            .x_desc("YEAR")
            .y_desc("NO. OF CASUALTIES")
            .axis_desc_style(("sans-serif", 14))
            .draw()
            .map_err(draw_err)?;

        let series = [
            (killed_color, -BAR_WIDTH, Casualty::Killed),
            (injured_color, 0.0, Casualty::Injured),
        ];

        for (color, offset, casualty) in series {
            chart
                .draw_series(totals.iter().map(|t| {
                    let x0 = t.year as f64 + offset;
                    Rectangle::new([(x0, 0.0), (x0 + BAR_WIDTH, t.value(casualty) as f64)], color.filled())
                }))
                .map_err(draw_err)?
                .label(casualty.label())
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], color.filled()));

            let value_style = TextStyle::from(("sans-serif", 12).into_font())
                .pos(Pos::new(HPos::Center, VPos::Bottom));
            chart
                .draw_series(totals.iter().map(|t| {
                    let x = t.year as f64 + offset + BAR_WIDTH / 2.0;
                    Text::new(t.value(casualty).to_string(), (x, t.value(casualty) as f64), value_style.clone())
                }))
                .map_err(draw_err)?;
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .label_font(("sans-serif", 13))
            .draw()
            .map_err(draw_err)?;

        Ok(())
    }
}

/// Half a year of padding either side of the covered years.
fn year_axis_range(totals: &[YearTotals]) -> (f64, f64) {
    let first = totals.iter().map(|t| t.year).min().unwrap_or(YEAR_MIN);
    let last = totals.iter().map(|t| t.year).max().unwrap_or(YEAR_MAX);
    (first as f64 - 0.5, last as f64 + 0.5)
}

/// Leaves headroom above the tallest bar for its value label.
fn value_axis_max(totals: &[YearTotals]) -> f64 {
    let tallest = totals
        .iter()
        .map(|t| t.n_killed.max(t.n_injured))
        .max()
        .unwrap_or(0);
    (tallest as f64 * 1.15).max(1.0)
}

fn year_label(v: f64) -> String {
    if (v - v.round()).abs() < 1e-6 {
        format!("{}", v.round() as i64)
    } else {
        String::new()
    }
}
