//! Control Panel Widget
//! Left side panel with the data source and the state/city/year selectors.

use crate::data::{Selection, YEAR_MAX, YEAR_MIN};
use egui::{Color32, ComboBox, RichText};
use std::path::PathBuf;

/// Current selector values
#[derive(Clone, Debug)]
pub struct UserSettings {
    pub csv_path: Option<PathBuf>,
    pub state: String,
    pub city_or_county: String,
    pub year: i32,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            csv_path: None,
            state: String::new(),
            city_or_county: String::new(),
            year: YEAR_MIN,
        }
    }
}

/// Left side control panel with file selection and parameter selectors.
pub struct ControlPanel {
    pub settings: UserSettings,
    pub states: Vec<String>,
    pub cities: Vec<String>,
    pub status: String,
    pub export_enabled: bool,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            settings: UserSettings::default(),
            states: Vec::new(),
            cities: Vec::new(),
            status: "Ready".to_string(),
            export_enabled: false,
        }
    }
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update available states after CSV load and select the first one
    pub fn update_states(&mut self, states: Vec<String>) {
        self.states = states;
        if !self.states.contains(&self.settings.state) {
            self.settings.state = self.states.first().cloned().unwrap_or_default();
        }
        self.cities.clear();
        self.settings.city_or_county.clear();
    }

    /// Update cities for the selected state and reset the city to the first entry
    pub fn update_cities(&mut self, cities: Vec<String>) {
        self.cities = cities;
        self.settings.city_or_county = self.cities.first().cloned().unwrap_or_default();
    }

    pub fn set_year(&mut self, year: i32) {
        self.settings.year = year.clamp(YEAR_MIN, YEAR_MAX);
    }

    /// Selection built from the current widget values.
    pub fn selection(&self) -> Selection {
        Selection::new(
            self.settings.state.clone(),
            self.settings.city_or_county.clone(),
            self.settings.year,
        )
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("Gun Violence Data")
                    .size(22.0)
                    .color(Color32::from_rgb(220, 38, 38)),
            );
            ui.label(
                RichText::new("United States, 2013 - 2018")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== CSV File Section =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let path_text = self
                        .settings
                        .csv_path
                        .as_ref()
                        .and_then(|p| p.file_name())
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| "No file selected".to_string());

                    let path_color = if self.settings.csv_path.is_some() {
                        ui.visuals().strong_text_color()
                    } else {
                        Color32::GRAY
                    };
                    ui.label(RichText::new(&path_text).size(12.0).color(path_color));

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("📂 Browse").clicked() {
                            action = ControlPanelAction::BrowseCsv;
                        }
                    });
                });
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Parameter Selector Section =====
        ui.label(RichText::new("🔧 Parameter Selector").size(14.0).strong());
        ui.add_space(8.0);

        let label_width = 110.0;
        let combo_width = 170.0;

        ui.horizontal(|ui| {
            ui.add_sized([label_width, 20.0], egui::Label::new("Select State:"));
            ComboBox::from_id_salt("state")
                .width(combo_width)
                .selected_text(&self.settings.state)
                .show_ui(ui, |ui| {
                    for state in &self.states {
                        if ui
                            .selectable_label(self.settings.state == *state, state)
                            .clicked()
                            && self.settings.state != *state
                        {
                            self.settings.state = state.clone();
                            action = ControlPanelAction::StateChanged;
                        }
                    }
                });
        });

        ui.add_space(5.0);

        ui.horizontal(|ui| {
            ui.add_sized([label_width, 20.0], egui::Label::new("Select City/County:"));
            ComboBox::from_id_salt("city_or_county")
                .width(combo_width)
                .selected_text(&self.settings.city_or_county)
                .show_ui(ui, |ui| {
                    for city in &self.cities {
                        if ui
                            .selectable_label(self.settings.city_or_county == *city, city)
                            .clicked()
                            && self.settings.city_or_county != *city
                        {
                            self.settings.city_or_county = city.clone();
                            action = ControlPanelAction::SelectionChanged;
                        }
                    }
                });
        });

        ui.add_space(5.0);

        ui.horizontal(|ui| {
            ui.add_sized([label_width, 20.0], egui::Label::new("Year:"));
            let slider = egui::Slider::new(&mut self.settings.year, YEAR_MIN..=YEAR_MAX)
                .step_by(1.0)
                .integer();
            if ui.add(slider).changed() {
                action = ControlPanelAction::SelectionChanged;
            }
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Action Buttons =====
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(self.export_enabled, |ui| {
                let button = egui::Button::new(RichText::new("🖼 Export PNG").size(14.0))
                    .min_size(egui::vec2(150.0, 30.0));
                if ui.add(button).clicked() {
                    action = ControlPanelAction::ExportPng;
                }
            });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Status Section =====
        let status_color = if self.status.starts_with("Error") {
            Color32::from_rgb(220, 53, 69)
        } else if self.status.starts_with("Loaded") || self.status.starts_with("Exported") {
            Color32::from_rgb(40, 167, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }

    /// Set status line
    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseCsv,
    StateChanged,
    SelectionChanged,
    ExportPng,
}
