//! Chart Viewer Widget
//! Central scrollable panel: introduction, dataset table, casualty bar charts and maps.

use crate::charts::{ChartPlotter, CITY_PALETTE, STATE_PALETTE};
use crate::data::{Casualty, IncidentRecord};
use crate::stats::DashboardData;
use egui::{Color32, RichText, ScrollArea};

const CHART_SPACING: f32 = 15.0;
const BAR_CHART_HEIGHT: f32 = 300.0;
const MAP_HEIGHT: f32 = 380.0;
const TABLE_HEIGHT: f32 = 260.0;
const TABLE_ROW_HEIGHT: f32 = 18.0;

const ARCHIVE_URL: &str = "https://www.gunviolencearchive.org/";
const KAGGLE_URL: &str = "https://www.kaggle.com/datasets/jameslko/gun-violence-data";

/// Scrollable dashboard body.
#[derive(Default)]
pub struct ChartViewer {
    /// Views for the current selection
    pub data: Option<DashboardData>,
    /// Full dataset for the table view
    pub records: Vec<IncidentRecord>,
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear everything (a new file is being loaded)
    pub fn clear(&mut self) {
        self.data = None;
        self.records.clear();
    }

    pub fn set_records(&mut self, records: Vec<IncidentRecord>) {
        self.records = records;
    }

    pub fn set_data(&mut self, data: DashboardData) {
        self.data = Some(data);
    }

    pub fn show(&mut self, ui: &mut egui::Ui) {
        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                Self::draw_introduction(ui);
                ui.add_space(CHART_SPACING);

                if self.records.is_empty() {
                    ui.separator();
                    ui.add_space(40.0);
                    ui.vertical_centered(|ui| {
                        ui.label(RichText::new("No Data").size(20.0));
                        ui.label(
                            RichText::new("Browse for the incident CSV to begin")
                                .size(12.0)
                                .color(Color32::GRAY),
                        );
                    });
                    return;
                }

                egui::CollapsingHeader::new(format!("Dataset ({} incidents)", self.records.len()))
                    .default_open(false)
                    .show(ui, |ui| Self::draw_table(ui, &self.records));

                ui.add_space(CHART_SPACING);

                if let Some(data) = &self.data {
                    Self::draw_casualty_section(ui, data);
                }
            });
    }

    fn draw_introduction(ui: &mut egui::Ui) {
        ui.label(RichText::new("GUN VIOLENCE DATA").size(26.0).strong());
        ui.label(
            "Casualties from gun violence in the United States from 2013 - 2018. \
             Travelling through a location or planning a move? Use this dashboard to \
             learn about the gun violence incidents recorded there.",
        );
        ui.add_space(8.0);

        ui.label(RichText::new("Data").size(15.0).strong());
        ui.horizontal_wrapped(|ui| {
            ui.label("The original data is from the");
            ui.hyperlink_to("Gun Violence Archive", ARCHIVE_URL);
            ui.label("and was downloaded from");
            ui.hyperlink_to("Kaggle: Gun Violence Data", KAGGLE_URL);
            ui.label(".");
        });
        ui.add_space(8.0);

        ui.label(RichText::new("Application").size(15.0).strong());
        ui.label("Choose the following parameters in the left panel:");
        ui.label("  • State of interest");
        ui.label("  • City/County of interest");
        ui.label("  • Year of interest");
    }

    /// Virtualised incident table.
    fn draw_table(ui: &mut egui::Ui, records: &[IncidentRecord]) {
        const HEADERS: [&str; 7] = [
            "Year",
            "State",
            "City/County",
            "Killed",
            "Injured",
            "Latitude",
            "Longitude",
        ];
        let column_widths = [50.0, 140.0, 200.0, 60.0, 60.0, 90.0, 90.0];

        ui.horizontal(|ui| {
            for (header, width) in HEADERS.iter().zip(column_widths) {
                ui.add_sized([width, TABLE_ROW_HEIGHT], egui::Label::new(RichText::new(*header).strong()));
            }
        });
        ui.separator();

        ScrollArea::vertical()
            .id_salt("dataset_table")
            .max_height(TABLE_HEIGHT)
            .auto_shrink([false, true])
            .show_rows(ui, TABLE_ROW_HEIGHT, records.len(), |ui, row_range| {
                for record in &records[row_range] {
                    let coord = |v: Option<f64>| v.map(|v| format!("{:.4}", v)).unwrap_or_default();
                    let cells = [
                        record.year.to_string(),
                        record.state.clone(),
                        record.city_or_county.clone(),
                        record.n_killed.to_string(),
                        record.n_injured.to_string(),
                        coord(record.latitude),
                        coord(record.longitude),
                    ];
                    ui.horizontal(|ui| {
                        for (cell, width) in cells.iter().zip(column_widths) {
                            ui.add_sized(
                                [width, TABLE_ROW_HEIGHT],
                                egui::Label::new(RichText::new(cell).size(12.0)).truncate(),
                            );
                        }
                    });
                }
            });
    }

    fn draw_casualty_section(ui: &mut egui::Ui, data: &DashboardData) {
        let selection = &data.selection;
        let (killed, injured) = data.grand_totals();
        let year = data.selected_year_totals();

        ui.label(RichText::new("Death/Injury Information").size(20.0).strong());
        ui.label(
            RichText::new(format!(
                "{}, {}: {} killed and {} injured in 2013 - 2018; {} killed and {} injured in {}",
                selection.city_or_county,
                selection.state,
                killed,
                injured,
                year.n_killed,
                year.n_injured,
                selection.year
            ))
            .size(12.0)
            .color(Color32::GRAY),
        );
        ui.add_space(8.0);

        ui.label(RichText::new("Death/Injury Graphs").size(14.0).italics());
        ui.columns(2, |columns| {
            columns[0].label(
                RichText::new(ChartPlotter::state_title(&selection.state))
                    .size(14.0)
                    .strong(),
            );
            ChartPlotter::draw_casualty_bars(
                &mut columns[0],
                "state_bars",
                &data.state_totals,
                STATE_PALETTE,
                BAR_CHART_HEIGHT,
            );

            columns[1].label(
                RichText::new(ChartPlotter::city_title(&selection.city_or_county))
                    .size(14.0)
                    .strong(),
            );
            ChartPlotter::draw_casualty_bars(
                &mut columns[1],
                "city_bars",
                &data.city_totals,
                CITY_PALETTE,
                BAR_CHART_HEIGHT,
            );
        });

        ui.add_space(CHART_SPACING);

        ui.columns(2, |columns| {
            for (column, casualty, title) in [
                (0usize, Casualty::Killed, "Death Locations"),
                (1usize, Casualty::Injured, "Injury Locations"),
            ] {
                let ui = &mut columns[column];
                ui.label(RichText::new(format!("{}: {}", title, selection.year)).size(14.0).italics());
                ChartPlotter::draw_casualty_map(
                    ui,
                    &format!("{}_map", casualty.column()),
                    data.points(casualty),
                    casualty,
                    MAP_HEIGHT,
                );
            }
        });
    }
}
