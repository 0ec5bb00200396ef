//! Chart Plotter Module
//! Interactive casualty bar charts and location maps using egui_plot.

use crate::data::{Casualty, MapPoint, YearTotals};
use egui::{Align2, Color32, RichText};
use egui_plot::{Bar, BarChart, Legend, Plot, PlotPoint, PlotPoints, Points, Text};
use std::collections::BTreeMap;

/// Width of a single bar in year units.
pub const BAR_WIDTH: f64 = 0.3;

/// Sequential sunset scale, low to high.
pub const SUNSET_SCALE: [Color32; 7] = [
    Color32::from_rgb(75, 41, 145),
    Color32::from_rgb(135, 44, 162),
    Color32::from_rgb(192, 54, 157),
    Color32::from_rgb(234, 79, 136),
    Color32::from_rgb(250, 120, 118),
    Color32::from_rgb(246, 169, 122),
    Color32::from_rgb(237, 217, 163),
];

const MIN_MARKER_RADIUS: f32 = 3.0;
const MAX_MARKER_RADIUS: f32 = 12.0;

/// Killed/injured bar colours for one chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarPalette {
    pub killed: Color32,
    pub injured: Color32,
}

/// State chart: red/green.
pub const STATE_PALETTE: BarPalette = BarPalette {
    killed: Color32::from_rgb(220, 38, 38),
    injured: Color32::from_rgb(34, 139, 34),
};

/// City/county chart: orange/blue.
pub const CITY_PALETTE: BarPalette = BarPalette {
    killed: Color32::from_rgb(255, 140, 0),
    injured: Color32::from_rgb(31, 119, 180),
};

/// Creates the dashboard charts using egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Title above the state bar chart.
    pub fn state_title(state: &str) -> String {
        format!("STATE DEATH/INJURY BY YEAR: {}", state.to_uppercase())
    }

    /// Title above the city/county bar chart.
    pub fn city_title(city: &str) -> String {
        format!("CITY/COUNTY DEATH/INJURY BY YEAR: {}", city.to_uppercase())
    }

    /// Draw grouped killed/injured bars per year.
    /// X-axis: year, Y-axis: casualties
    pub fn draw_casualty_bars(
        ui: &mut egui::Ui,
        id: &str,
        totals: &[YearTotals],
        palette: BarPalette,
        height: f32,
    ) {
        let killed: Vec<Bar> = totals
            .iter()
            .map(|t| {
                Bar::new(t.year as f64 - BAR_WIDTH / 2.0, t.n_killed as f64)
                    .width(BAR_WIDTH)
                    .name(format!("{} killed", t.year))
            })
            .collect();
        let injured: Vec<Bar> = totals
            .iter()
            .map(|t| {
                Bar::new(t.year as f64 + BAR_WIDTH / 2.0, t.n_injured as f64)
                    .width(BAR_WIDTH)
                    .name(format!("{} injured", t.year))
            })
            .collect();

        let label_color = ui.visuals().text_color();

        Plot::new(id)
            .height(height)
            .legend(Legend::default())
            .allow_scroll(false)
            .allow_drag(false)
            .allow_zoom(false)
            .include_y(0.0)
            .x_axis_label("YEAR")
            .y_axis_label("NO. OF CASUALTIES")
            .x_axis_formatter(|mark, _range| {
                let v = mark.value;
                if (v - v.round()).abs() < 1e-6 {
                    format!("{}", v.round() as i64)
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(killed).color(palette.killed).name("Killed"));
                plot_ui.bar_chart(BarChart::new(injured).color(palette.injured).name("Injured"));

                for t in totals {
                    for (offset, value) in [(-BAR_WIDTH / 2.0, t.n_killed), (BAR_WIDTH / 2.0, t.n_injured)] {
                        plot_ui.text(
                            Text::new(
                                PlotPoint::new(t.year as f64 + offset, value as f64),
                                RichText::new(value.to_string()).size(10.0),
                            )
                            .anchor(Align2::CENTER_BOTTOM)
                            .color(label_color),
                        );
                    }
                }
            });
    }

    /// Draw incident locations coloured and sized by casualty count.
    pub fn draw_casualty_map(
        ui: &mut egui::Ui,
        id: &str,
        points: &[MapPoint],
        casualty: Casualty,
        height: f32,
    ) {
        if points.is_empty() {
            ui.allocate_ui(egui::vec2(ui.available_width(), height), |ui| {
                ui.centered_and_justified(|ui| {
                    ui.label(RichText::new("No incidents").size(16.0).color(Color32::GRAY));
                });
            });
            return;
        }

        let max_count = points.iter().map(|p| p.count).max().unwrap_or(1);
        let min_count = points.iter().map(|p| p.count).min().unwrap_or(1);
        let ref_lat = reference_latitude(points);
        let scale = ref_lat.to_radians().cos().max(0.01);

        // One series per distinct count so every series has a single colour
        let mut by_count: BTreeMap<i64, Vec<[f64; 2]>> = BTreeMap::new();
        for p in points {
            by_count
                .entry(p.count)
                .or_default()
                .push(project(p.latitude, p.longitude, scale));
        }

        let label = casualty.label();

        Plot::new(id)
            .height(height)
            .data_aspect(1.0)
            .allow_scroll(false)
            .show_grid(true)
            .x_axis_label("Longitude")
            .y_axis_label("Latitude")
            .x_axis_formatter(move |mark, _range| format!("{:.2}", mark.value / scale))
            .y_axis_formatter(|mark, _range| format!("{:.2}", mark.value))
            .label_formatter(move |name, value| {
                let lon = value.x / scale;
                if name.is_empty() {
                    format!("lat {:.4}\nlon {:.4}", value.y, lon)
                } else {
                    format!("{}\nlat {:.4}\nlon {:.4}", name, value.y, lon)
                }
            })
            .show(ui, |plot_ui| {
                for (count, coords) in by_count {
                    let t = normalize(count, min_count, max_count);
                    plot_ui.points(
                        Points::new(PlotPoints::new(coords))
                            .radius(marker_radius(count, max_count))
                            .color(sunset_color(t).gamma_multiply(0.85))
                            .name(format!("{}: {}", label, count)),
                    );
                }
            });

        Self::draw_color_bar(ui, label, min_count, max_count);
    }

    /// Horizontal colour bar explaining the map colours.
    pub fn draw_color_bar(ui: &mut egui::Ui, label: &str, min: i64, max: i64) {
        ui.horizontal(|ui| {
            ui.label(RichText::new(format!("{} {}", label, min)).size(11.0));

            let (rect, _) = ui.allocate_exact_size(egui::vec2(160.0, 12.0), egui::Sense::hover());
            let steps = 32;
            let step_w = rect.width() / steps as f32;
            for i in 0..steps {
                let t = i as f64 / (steps - 1) as f64;
                let x0 = rect.left() + i as f32 * step_w;
                let cell = egui::Rect::from_min_max(
                    egui::pos2(x0, rect.top()),
                    egui::pos2(x0 + step_w + 0.5, rect.bottom()),
                );
                ui.painter().rect_filled(cell, 0.0, sunset_color(t));
            }

            ui.label(RichText::new(max.to_string()).size(11.0));
        });
    }
}

/// Interpolate the sunset scale at `t` in [0, 1].
pub fn sunset_color(t: f64) -> Color32 {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let span = (SUNSET_SCALE.len() - 1) as f64;
    let pos = t * span;
    let lower = pos.floor() as usize;
    let upper = (lower + 1).min(SUNSET_SCALE.len() - 1);
    let frac = (pos - lower as f64) as f32;

    let a = SUNSET_SCALE[lower];
    let b = SUNSET_SCALE[upper];
    let mix = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * frac).round() as u8;
    Color32::from_rgb(mix(a.r(), b.r()), mix(a.g(), b.g()), mix(a.b(), b.b()))
}

/// Marker radius grows with the square root of the count (area-proportional).
pub fn marker_radius(count: i64, max_count: i64) -> f32 {
    if max_count <= 0 || count <= 0 {
        return MIN_MARKER_RADIUS;
    }
    let ratio = (count.min(max_count) as f32 / max_count as f32).sqrt();
    MIN_MARKER_RADIUS + (MAX_MARKER_RADIUS - MIN_MARKER_RADIUS) * ratio
}

/// Position of `count` between `min` and `max`; a single value maps to the top.
pub fn normalize(count: i64, min: i64, max: i64) -> f64 {
    if max <= min {
        1.0
    } else {
        (count - min) as f64 / (max - min) as f64
    }
}

/// Local equirectangular projection: longitude shrinks by cos(reference latitude).
pub fn project(latitude: f64, longitude: f64, lon_scale: f64) -> [f64; 2] {
    [longitude * lon_scale, latitude]
}

fn reference_latitude(points: &[MapPoint]) -> f64 {
    if points.is_empty() {
        return 0.0;
    }
    points.iter().map(|p| p.latitude).sum::<f64>() / points.len() as f64
}
